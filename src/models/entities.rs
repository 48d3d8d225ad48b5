//! Domain entities
//!
//! Customers, meals and orders as persisted by the store and held by the caches.

use serde::{Deserialize, Serialize};

use crate::cache::{string_cost, EstimateSize, BASE_ENTRY_COST};
use crate::repository::{Entity, EntityId};

/// Maximum number of meals one order may hold.
pub const MAX_MEALS_PER_ORDER: usize = 25;

// == Order Status ==
/// Lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Accepted,
    Cooking,
    Ready,
}

// == Customer ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub name: String,
    pub phone_number: String,
}

impl Customer {
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            phone_number: phone_number.into(),
        }
    }
}

impl Entity for Customer {
    const KIND: &'static str = "Customer";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

impl EstimateSize for Customer {
    fn estimated_size(&self) -> u64 {
        BASE_ENTRY_COST + string_cost(&self.name) + string_cost(&self.phone_number)
    }
}

// == Meal ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub name: String,
    pub price: f64,
    /// Cooking time in minutes
    pub cooking_time: u32,
}

impl Meal {
    pub fn new(name: impl Into<String>, price: f64, cooking_time: u32) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
            cooking_time,
        }
    }
}

impl Entity for Meal {
    const KIND: &'static str = "Meal";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

impl EstimateSize for Meal {
    fn estimated_size(&self) -> u64 {
        BASE_ENTRY_COST + string_cost(&self.name)
    }
}

// == Order ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub customer_id: EntityId,
    #[serde(default)]
    pub meals: Vec<Meal>,
    pub status: OrderStatus,
}

impl Order {
    /// A fresh, empty order for `customer_id`.
    pub fn accepted(customer_id: EntityId) -> Self {
        Self {
            id: None,
            customer_id,
            meals: Vec::new(),
            status: OrderStatus::Accepted,
        }
    }

    pub fn contains_meal(&self, meal_id: EntityId) -> bool {
        self.meals.iter().any(|m| m.id == Some(meal_id))
    }

    /// Removes every copy of the meal, returning whether anything was removed.
    pub fn remove_meal(&mut self, meal_id: EntityId) -> bool {
        let before = self.meals.len();
        self.meals.retain(|m| m.id != Some(meal_id));
        self.meals.len() != before
    }
}

impl Entity for Order {
    const KIND: &'static str = "Order";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

impl EstimateSize for Order {
    /// Meals are charged a flat 30 bytes each; their names are not counted.
    fn estimated_size(&self) -> u64 {
        // customer reference + meal list header
        BASE_ENTRY_COST + 50 + 50 + self.meals.len() as u64 * 30
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_size_estimate() {
        let customer = Customer::new("Anna", "+375291234567");
        assert_eq!(customer.estimated_size(), 100 + 8 + 26);
    }

    #[test]
    fn test_meal_size_estimate() {
        assert_eq!(Meal::new("Pasta", 9.5, 15).estimated_size(), 110);
    }

    #[test]
    fn test_order_size_grows_with_meals() {
        let mut order = Order::accepted(1);
        assert_eq!(order.estimated_size(), 200);

        order.meals.push(Meal::new("Soup", 3.0, 10));
        order.meals.push(Meal::new("Tea", 1.0, 2));
        assert_eq!(order.estimated_size(), 260);
    }

    #[test]
    fn test_order_remove_meal() {
        let mut meal = Meal::new("Soup", 3.0, 10);
        meal.id = Some(4);
        let mut order = Order::accepted(1);
        order.meals.push(meal.clone());
        order.meals.push(meal);

        assert!(order.contains_meal(4));
        assert!(order.remove_meal(4));
        assert!(!order.contains_meal(4));
        assert!(!order.remove_meal(4));
    }

    #[test]
    fn test_wire_format() {
        let mut order = Order::accepted(3);
        order.id = Some(8);
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["customerId"], 3);
        assert_eq!(json["status"], "ACCEPTED");

        let status: OrderStatus = serde_json::from_str("\"COOKING\"").unwrap();
        assert_eq!(status, OrderStatus::Cooking);
    }
}
