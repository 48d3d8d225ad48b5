//! Request DTOs for the order tracker API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::models::{Customer, Meal, OrderStatus};
use crate::repository::EntityId;

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 100;
const PRICE_MIN: f64 = 0.01;
const PRICE_MAX: f64 = 9999.99;
const COOKING_TIME_MAX: u32 = 1440;

/// Checks a customer or meal name: 2-100 letters, digits or spaces.
fn validate_name(name: &str) -> Option<String> {
    let len = name.chars().count();
    if name.trim().is_empty() {
        return Some("Name is required".to_string());
    }
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Some(format!(
            "Name must be between {} and {} characters",
            NAME_MIN_CHARS, NAME_MAX_CHARS
        ));
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == ' ') {
        return Some("Name can only contain letters, numbers and spaces".to_string());
    }
    None
}

/// Request body for creating or updating a customer
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    pub name: String,
    pub phone_number: String,
}

impl CustomerRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(error) = validate_name(&self.name) {
            return Some(error);
        }
        let digits = self.phone_number.strip_prefix('+').unwrap_or(&self.phone_number);
        if !(7..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Some("Phone number must contain 7 to 15 digits".to_string());
        }
        None
    }

    pub fn into_customer(self) -> Customer {
        Customer::new(self.name, self.phone_number)
    }
}

/// Request body for creating or updating a meal
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRequest {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub name: String,
    pub price: f64,
    pub cooking_time: u32,
}

impl MealRequest {
    pub fn validate(&self) -> Option<String> {
        if let Some(error) = validate_name(&self.name) {
            return Some(error);
        }
        if !(PRICE_MIN..=PRICE_MAX).contains(&self.price) {
            return Some(format!("Price must be between {} and {}", PRICE_MIN, PRICE_MAX));
        }
        if !(1..=COOKING_TIME_MAX).contains(&self.cooking_time) {
            return Some(format!(
                "Cooking time must be between 1 and {} minutes",
                COOKING_TIME_MAX
            ));
        }
        None
    }

    pub fn into_meal(self) -> Meal {
        Meal {
            id: self.id,
            ..Meal::new(self.name, self.price, self.cooking_time)
        }
    }
}

/// `?customerId=`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerIdQuery {
    pub customer_id: EntityId,
}

/// `?mealId=`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealIdQuery {
    pub meal_id: EntityId,
}

/// `?status=`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusQuery {
    pub status: OrderStatus,
}

/// `?name=`
#[derive(Debug, Clone, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

/// `?status=&mealName=`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealFilterQuery {
    pub status: OrderStatus,
    pub meal_name: String,
}

/// `?url=`
#[derive(Debug, Clone, Deserialize)]
pub struct UrlQuery {
    pub url: String,
}

/// `?cache=` for flushing a single cache; flushes all when absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlushQuery {
    #[serde(default)]
    pub cache: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal_request(name: &str, price: f64, cooking_time: u32) -> MealRequest {
        MealRequest {
            id: None,
            name: name.to_string(),
            price,
            cooking_time,
        }
    }

    #[test]
    fn test_customer_request_deserialize() {
        let json = r#"{"name": "Anna", "phoneNumber": "+375291234567"}"#;
        let req: CustomerRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.name, "Anna");
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_customer_request_bad_phone() {
        let req = CustomerRequest {
            name: "Anna".to_string(),
            phone_number: "12-34".to_string(),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("Borscht 2").is_none());
        assert!(validate_name("A").is_some());
        assert!(validate_name("   ").is_some());
        assert!(validate_name("Fish & Chips").is_some());
        assert!(validate_name(&"x".repeat(101)).is_some());
    }

    #[test]
    fn test_meal_request_limits() {
        assert!(meal_request("Pasta", 12.5, 20).validate().is_none());
        assert!(meal_request("Pasta", 0.0, 20).validate().is_some());
        assert!(meal_request("Pasta", 10000.0, 20).validate().is_some());
        assert!(meal_request("Pasta", 12.5, 0).validate().is_some());
        assert!(meal_request("Pasta", 12.5, 1441).validate().is_some());
    }

    #[test]
    fn test_filter_query_deserialize() {
        let json = r#"{"status": "READY", "mealName": "Soup"}"#;
        let query: MealFilterQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.status, OrderStatus::Ready);
        assert_eq!(query.meal_name, "Soup");
    }
}
