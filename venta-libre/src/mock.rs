//! Client-side catalog generator used when no product API is available.

use crate::model::{Condition, Product, CATEGORIES, ALL_CATEGORIES};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SELLERS: &[&str] = &[
    "Carlos Mamani",
    "Tienda El Prado",
    "María Quispe",
    "Electro Sopocachi",
    "Jorge Vargas",
    "Feria 16 de Julio",
];

const CITIES: &[&str] = &["La Paz", "El Alto", "Cochabamba", "Santa Cruz", "Sucre", "Oruro"];

fn titles_for(category: &str) -> &'static [&'static str] {
    match category {
        "electronics" => &["Celular Samsung A54", "Laptop Lenovo i5", "Audífonos Sony", "Smart TV 50\""],
        "vehicles" => &["Toyota Corolla 2012", "Moto Honda 150cc", "Bicicleta montañera", "Suzuki Vitara"],
        "home" => &["Juego de living", "Refrigerador LG", "Mesa de madera", "Cocina 4 hornallas"],
        "fashion" => &["Chamarra de cuero", "Zapatillas Nike", "Aguayo artesanal", "Mochila Totto"],
        "sports" => &["Pelota Mikasa", "Raqueta de tenis", "Pesas 10 kg", "Carpa 4 personas"],
        _ => &["Lego Classic", "Muñeca Barbie", "Autito a control", "Rompecabezas 1000"],
    }
}

/// `count` products with ids `1..=count`. The same seed yields the same list.
pub fn generate_products(count: usize, seed: u64) -> Vec<Product> {
    let mut rng = StdRng::seed_from_u64(seed);
    let categories: Vec<&str> = CATEGORIES
        .iter()
        .map(|c| c.id)
        .filter(|id| *id != ALL_CATEGORIES)
        .collect();

    (1..=count as u64)
        .map(|id| {
            let category = categories[rng.gen_range(0..categories.len())];
            let titles = titles_for(category);
            let title = titles[rng.gen_range(0..titles.len())];
            let condition = if rng.gen_bool(0.4) { Condition::New } else { Condition::Used };
            let price = (rng.gen_range(20.0..9_500.0_f64) * 100.0).round() / 100.0;
            let distance = (rng.gen_range(0.2..45.0_f64) * 10.0).round() / 10.0;

            Product {
                id,
                title: title.to_string(),
                description: format!("{title} en {} estado, entrega inmediata", match condition {
                    Condition::New => "nuevo",
                    Condition::Used => "buen",
                }),
                price,
                category: category.to_string(),
                condition,
                seller: SELLERS[rng.gen_range(0..SELLERS.len())].to_string(),
                location: CITIES[rng.gen_range(0..CITIES.len())].to_string(),
                distance: format!("{distance} km"),
                image: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_is_deterministic_per_seed() {
        assert_eq!(generate_products(10, 7), generate_products(10, 7));
        assert_ne!(generate_products(10, 7), generate_products(10, 8));
    }

    #[test]
    fn test_generated_products_are_well_formed() {
        let products = generate_products(30, 1);
        assert_eq!(products.len(), 30);
        for (i, p) in products.iter().enumerate() {
            assert_eq!(p.id, i as u64 + 1);
            assert!(p.price >= 20.0 && p.price <= 9_500.0);
            assert!(p.distance_km().is_some_and(|km| km <= 45.0));
            assert!(CATEGORIES.iter().any(|c| c.id == p.category && c.id != ALL_CATEGORIES));
        }
    }
}
