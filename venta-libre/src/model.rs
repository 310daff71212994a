//! Marketplace records as the API serves them.

use serde::{Deserialize, Serialize};

/// A user as listed by `GET /users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Body of `POST /users`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body of `PUT /users/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
}

impl Condition {
    pub fn label(&self) -> &'static str {
        match self {
            Condition::New => "Nuevo",
            Condition::Used => "Usado",
        }
    }
}

/// A listing on the home page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub condition: Condition,
    pub seller: String,
    pub location: String,
    /// Human text such as "2.5 km".
    pub distance: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Product {
    /// Leading number of `distance`, in km. `None` when it does not parse.
    pub fn distance_km(&self) -> Option<f64> {
        parse_distance(&self.distance)
    }
}

/// "2.5 km" -> 2.5, "800 m" -> 0.8, "3,2km" -> 3.2
pub fn parse_distance(text: &str) -> Option<f64> {
    let text = text.trim();
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(text.len());
    let value: f64 = text[..end].replace(',', ".").parse().ok()?;
    let unit = text[end..].trim().to_lowercase();
    match unit.as_str() {
        "m" => Some(value / 1000.0),
        _ => Some(value),
    }
}

/// Formats a price in bolivianos.
pub fn format_price(price: f64) -> String {
    format!("Bs. {price:.2}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

/// Category id that matches every product.
pub const ALL_CATEGORIES: &str = "all";

pub const CATEGORIES: &[Category] = &[
    Category { id: ALL_CATEGORIES, name: "Todas", icon: "*" },
    Category { id: "electronics", name: "Electrónica", icon: "E" },
    Category { id: "vehicles", name: "Vehículos", icon: "V" },
    Category { id: "home", name: "Hogar", icon: "H" },
    Category { id: "fashion", name: "Moda", icon: "M" },
    Category { id: "sports", name: "Deportes", icon: "D" },
    Category { id: "toys", name: "Juguetes", icon: "J" },
];

pub fn category_name(id: &str) -> &str {
    CATEGORIES
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name)
        .unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_distance() {
        assert_eq!(parse_distance("2.5 km"), Some(2.5));
        assert_eq!(parse_distance("12km"), Some(12.0));
        assert_eq!(parse_distance("800 m"), Some(0.8));
        assert_eq!(parse_distance("3,5 km"), Some(3.5));
        assert_eq!(parse_distance("cerca"), None);
        assert_eq!(parse_distance(""), None);
    }

    #[test]
    fn test_user_optional_fields_default() {
        let user: User = serde_json::from_str(r#"{"id":1,"name":"Ana","email":"ana@vl.bo"}"#).unwrap();
        assert!(!user.is_admin);
        assert!(user.is_active);
        assert!(user.created_at.is_none());
    }

    #[test]
    fn test_user_update_skips_absent_fields() {
        let update = UserUpdate {
            name: Some("Luis".to_string()),
            ..UserUpdate::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"name":"Luis"}"#);
    }

    #[test]
    fn test_category_name_falls_back_to_id() {
        assert_eq!(category_name("vehicles"), "Vehículos");
        assert_eq!(category_name("boats"), "boats");
    }
}
