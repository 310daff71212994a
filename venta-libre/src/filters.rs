//! Product filtering and sorting for the home page.
//!
//! Pure functions over an in-memory list. Every sort is stable, so products
//! with equal keys keep their input order.

use crate::model::{Condition, Product, ALL_CATEGORIES};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    /// Ascending id, i.e. publication order.
    #[default]
    Recent,
    PriceLow,
    PriceHigh,
    Distance,
}

impl SortBy {
    pub const ALL: [SortBy; 4] = [SortBy::Recent, SortBy::PriceLow, SortBy::PriceHigh, SortBy::Distance];

    pub fn label(&self) -> &'static str {
        match self {
            SortBy::Recent => "Más recientes",
            SortBy::PriceLow => "Menor precio",
            SortBy::PriceHigh => "Mayor precio",
            SortBy::Distance => "Más cercanos",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SortBy::Recent => SortBy::PriceLow,
            SortBy::PriceLow => SortBy::PriceHigh,
            SortBy::PriceHigh => SortBy::Distance,
            SortBy::Distance => SortBy::Recent,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConditionFilter {
    #[default]
    All,
    Only(Condition),
}

impl ConditionFilter {
    pub fn matches(&self, condition: Condition) -> bool {
        match self {
            ConditionFilter::All => true,
            ConditionFilter::Only(wanted) => *wanted == condition,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ConditionFilter::All => ConditionFilter::Only(Condition::New),
            ConditionFilter::Only(Condition::New) => ConditionFilter::Only(Condition::Used),
            ConditionFilter::Only(Condition::Used) => ConditionFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConditionFilter::All => "Todos",
            ConditionFilter::Only(c) => c.label(),
        }
    }
}

/// The filter panel record.
#[derive(Debug, Clone, PartialEq)]
pub struct Filters {
    /// km
    pub max_distance: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub condition: ConditionFilter,
    pub sort_by: SortBy,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            max_distance: 50.0,
            min_price: 0.0,
            max_price: 10_000.0,
            condition: ConditionFilter::All,
            sort_by: SortBy::Recent,
        }
    }
}

impl Filters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything that narrows the product list.
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    /// Category id, or "all".
    pub category: String,
    pub search: String,
    pub filters: Filters,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORIES.to_string(),
            search: String::new(),
            filters: Filters::default(),
        }
    }
}

impl Criteria {
    pub fn matches(&self, product: &Product) -> bool {
        let filters = &self.filters;
        let category_ok = self.category == ALL_CATEGORIES || product.category == self.category;
        let price_ok = product.price >= filters.min_price && product.price <= filters.max_price;
        let distance_ok = product
            .distance_km()
            .map_or(true, |km| km <= filters.max_distance);

        category_ok
            && price_ok
            && distance_ok
            && filters.condition.matches(product.condition)
            && matches_search(product, &self.search)
    }
}

/// Case-insensitive substring match on title, description or seller.
/// A blank term matches everything.
pub fn matches_search(product: &Product, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    [&product.title, &product.description, &product.seller]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
}

/// Filter then sort. The result is a new list; `products` is untouched.
pub fn filter_products(products: &[Product], criteria: &Criteria) -> Vec<Product> {
    let mut result: Vec<Product> = products
        .iter()
        .filter(|p| criteria.matches(p))
        .cloned()
        .collect();
    sort_products(&mut result, criteria.filters.sort_by);
    result
}

pub fn sort_products(products: &mut [Product], sort_by: SortBy) {
    match sort_by {
        SortBy::Recent => products.sort_by_key(|p| p.id),
        SortBy::PriceLow => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortBy::PriceHigh => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortBy::Distance => products.sort_by(by_distance),
    }
}

/// Unparseable distances go last.
fn by_distance(a: &Product, b: &Product) -> Ordering {
    match (a.distance_km(), b.distance_km()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: u64, category: &str, price: f64, distance: &str) -> Product {
        Product {
            id,
            title: format!("Producto {id}"),
            description: "Buen estado".to_string(),
            price,
            category: category.to_string(),
            condition: Condition::Used,
            seller: "Tienda".to_string(),
            location: "La Paz".to_string(),
            distance: distance.to_string(),
            image: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(3, "electronics", 1500.0, "4 km"),
            product(1, "home", 200.0, "1.5 km"),
            product(5, "electronics", 200.0, "12 km"),
            product(2, "vehicles", 9000.0, "0.8 km"),
            product(4, "electronics", 50.0, "2 km"),
        ]
    }

    fn ids(products: &[Product]) -> Vec<u64> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_category_keeps_relative_order() {
        let criteria = Criteria {
            category: "electronics".to_string(),
            ..Criteria::default()
        };
        // filter_products re-sorts by id, so an unsorted input is checked
        // through the predicate alone.
        let filtered: Vec<Product> = catalog().into_iter().filter(|p| criteria.matches(p)).collect();
        assert_eq!(ids(&filtered), vec![3, 5, 4]);
        assert!(filtered.iter().all(|p| p.category == "electronics"));

        let mut in_id_order = catalog();
        in_id_order.sort_by_key(|p| p.id);
        let expected: Vec<u64> = in_id_order
            .iter()
            .filter(|p| p.category == "electronics")
            .map(|p| p.id)
            .collect();
        assert_eq!(ids(&filter_products(&in_id_order, &criteria)), expected);
        assert_eq!(expected, vec![3, 4, 5]);

        let all = filter_products(&catalog(), &Criteria::default());
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_search_is_case_insensitive_over_three_fields() {
        let mut products = catalog();
        products[0].title = "Celular SAMSUNG".to_string();
        products[1].description = "Mesa de samsung? no, de madera".to_string();
        products[2].seller = "SamSung Store".to_string();

        let criteria = Criteria {
            search: "samsung".to_string(),
            ..Criteria::default()
        };
        assert_eq!(ids(&filter_products(&products, &criteria)), vec![1, 3, 5]);

        let criteria = Criteria {
            search: "   ".to_string(),
            ..Criteria::default()
        };
        assert_eq!(filter_products(&products, &criteria).len(), 5);
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let criteria = Criteria {
            filters: Filters {
                min_price: 200.0,
                max_price: 1500.0,
                ..Filters::default()
            },
            ..Criteria::default()
        };
        assert_eq!(ids(&filter_products(&catalog(), &criteria)), vec![1, 3, 5]);
    }

    #[test]
    fn test_distance_and_condition_filters() {
        let mut products = catalog();
        products[3].condition = Condition::New;
        products.push(product(6, "home", 10.0, "sin dato"));

        let criteria = Criteria {
            filters: Filters {
                max_distance: 3.0,
                ..Filters::default()
            },
            ..Criteria::default()
        };
        assert_eq!(ids(&filter_products(&products, &criteria)), vec![1, 2, 4, 6]);

        let criteria = Criteria {
            filters: Filters {
                condition: ConditionFilter::Only(Condition::New),
                ..Filters::default()
            },
            ..Criteria::default()
        };
        assert_eq!(ids(&filter_products(&products, &criteria)), vec![2]);
    }

    #[test]
    fn test_sort_orders() {
        let products = catalog();
        let sorted = |sort_by| {
            let criteria = Criteria {
                filters: Filters { sort_by, ..Filters::default() },
                ..Criteria::default()
            };
            filter_products(&products, &criteria)
        };

        let low = sorted(SortBy::PriceLow);
        assert!(low.windows(2).all(|w| w[0].price <= w[1].price));
        // 1 and 5 share a price; input order is 1 then 5.
        assert_eq!(ids(&low), vec![4, 1, 5, 3, 2]);

        let high = sorted(SortBy::PriceHigh);
        assert!(high.windows(2).all(|w| w[0].price >= w[1].price));
        assert_eq!(ids(&high), vec![2, 3, 1, 5, 4]);

        let near = sorted(SortBy::Distance);
        assert_eq!(ids(&near), vec![2, 1, 4, 3, 5]);

        let recent = sorted(SortBy::Recent);
        assert_eq!(ids(&recent), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_unparseable_distance_sorts_last() {
        let mut products = vec![product(1, "home", 1.0, "?"), product(2, "home", 1.0, "9 km")];
        sort_products(&mut products, SortBy::Distance);
        assert_eq!(ids(&products), vec![2, 1]);
    }

    #[test]
    fn test_reset_filters_restores_defaults() {
        let mut filters = Filters {
            max_distance: 5.0,
            min_price: 100.0,
            max_price: 200.0,
            condition: ConditionFilter::Only(Condition::Used),
            sort_by: SortBy::PriceHigh,
        };
        filters.reset();
        assert_eq!(
            filters,
            Filters {
                max_distance: 50.0,
                min_price: 0.0,
                max_price: 10_000.0,
                condition: ConditionFilter::All,
                sort_by: SortBy::Recent,
            }
        );
    }

    #[test]
    fn test_cycles_visit_every_option() {
        let mut sort = SortBy::Recent;
        for expected in SortBy::ALL.iter().skip(1) {
            sort = sort.next();
            assert_eq!(sort, *expected);
        }
        assert_eq!(sort.next(), SortBy::Recent);
        assert_eq!(ConditionFilter::All.next().next().next(), ConditionFilter::All);
    }
}
