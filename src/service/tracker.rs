//! Order Tracker Service
//!
//! Customer, meal and order operations on top of the three cached facades,
//! including the cross-entity rules between them.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cache::CacheStats;
use crate::config::Config;
use crate::error::{Result, TrackerError};
use crate::models::{Customer, Meal, Order, OrderStatus, MAX_MEALS_PER_ORDER};
use crate::repository::{Entity, EntityId, InMemoryRepository, Repository};
use crate::service::CachedRepository;
use crate::tasks::PeriodicSweeper;

/// Shared handle to a durable store.
pub type SharedStore<V> = Arc<dyn Repository<V>>;

/// Cache names, as reported in stats and accepted by flush.
pub const CUSTOMER_CACHE: &str = "customers";
pub const MEAL_CACHE: &str = "meals";
pub const ORDER_CACHE: &str = "orders";

// == Stores ==
/// The three durable stores the tracker works against.
#[derive(Clone)]
pub struct Stores {
    pub customers: SharedStore<Customer>,
    pub meals: SharedStore<Meal>,
    pub orders: SharedStore<Order>,
}

impl Stores {
    /// Fresh, empty in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            customers: Arc::new(InMemoryRepository::<Customer>::new()),
            meals: Arc::new(InMemoryRepository::<Meal>::new()),
            orders: Arc::new(InMemoryRepository::<Order>::new()),
        }
    }
}

// == Order Tracker ==
#[derive(Debug)]
pub struct OrderTracker {
    customers: CachedRepository<Customer, SharedStore<Customer>>,
    meals: CachedRepository<Meal, SharedStore<Meal>>,
    orders: CachedRepository<Order, SharedStore<Order>>,
}

impl OrderTracker {
    // == Constructor ==
    /// Builds the tracker with one cache per entity, each bounded to
    /// `max_memory_bytes`. No sweepers are attached.
    pub fn new(stores: Stores, max_memory_bytes: u64) -> Self {
        Self {
            customers: CachedRepository::new(CUSTOMER_CACHE, stores.customers, max_memory_bytes),
            meals: CachedRepository::new(MEAL_CACHE, stores.meals, max_memory_bytes),
            orders: CachedRepository::new(ORDER_CACHE, stores.orders, max_memory_bytes),
        }
    }

    /// Attaches an independent sweeper task to every cache.
    pub fn with_sweeper(self, sweeper: &PeriodicSweeper) -> Self {
        info!(
            "Attaching cache sweepers with interval of {} seconds",
            sweeper.interval().as_secs()
        );
        Self {
            customers: self.customers.with_sweeper(sweeper),
            meals: self.meals.with_sweeper(sweeper),
            orders: self.orders.with_sweeper(sweeper),
        }
    }

    /// In-memory stores, configured ceilings and running sweepers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &Config) -> Self {
        let sweeper = PeriodicSweeper::new(Duration::from_secs(config.sweep_interval));
        Self::new(Stores::in_memory(), config.max_memory_bytes).with_sweeper(&sweeper)
    }

    /// Stops every sweeper and waits for them to exit.
    pub async fn shutdown(&self) {
        self.customers.shutdown().await;
        self.meals.shutdown().await;
        self.orders.shutdown().await;
        info!("All cache sweepers stopped");
    }

    // == Customers ==
    pub fn list_customers(&self) -> Result<Vec<Customer>> {
        Ok(self.customers.find_all()?)
    }

    pub fn customer(&self, id: EntityId) -> Result<Customer> {
        self.customers
            .lookup_by_id(id)?
            .ok_or_else(|| TrackerError::not_found(Customer::KIND, id))
    }

    pub fn customer_by_name(&self, name: &str) -> Result<Customer> {
        self.customers
            .find_all()?
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| TrackerError::NotFound(format!("Customer not found with name: {name}")))
    }

    pub fn customer_by_phone(&self, phone_number: &str) -> Result<Customer> {
        self.customers
            .find_all()?
            .into_iter()
            .find(|c| c.phone_number == phone_number)
            .ok_or_else(|| {
                TrackerError::NotFound(format!("Customer not found with phone number: {phone_number}"))
            })
    }

    /// Customers having an order in `status` that contains a meal named `meal_name`.
    pub fn customers_by_order_status_and_meal(
        &self,
        status: OrderStatus,
        meal_name: &str,
    ) -> Result<Vec<Customer>> {
        let customer_ids: BTreeSet<EntityId> = self
            .orders
            .find_all()?
            .into_iter()
            .filter(|o| o.status == status && o.meals.iter().any(|m| m.name == meal_name))
            .map(|o| o.customer_id)
            .collect();

        let mut customers = Vec::with_capacity(customer_ids.len());
        for id in customer_ids {
            if let Some(customer) = self.customers.lookup_by_id(id)? {
                customers.push(customer);
            }
        }
        Ok(customers)
    }

    pub fn create_customer(&self, customer: Customer) -> Result<Customer> {
        let created = self.customers.create(Customer { id: None, ..customer })?;
        info!("Customer created: {:?}", created.id);
        Ok(created)
    }

    /// Replaces the name and phone number of customer `id`.
    pub fn update_customer(&self, id: EntityId, details: Customer) -> Result<Customer> {
        let mut customer = self.customer(id)?;
        customer.name = details.name;
        customer.phone_number = details.phone_number;
        Ok(self.customers.update(id, customer)?)
    }

    /// Deletes the customer together with all of their orders.
    pub fn delete_customer(&self, id: EntityId) -> Result<()> {
        let orders = self.customer_orders(id)?;
        for order in orders.iter().filter_map(Order::id) {
            self.orders.delete(order)?;
        }
        self.customers.delete(id)?;
        info!("Customer {} deleted with {} orders", id, orders.len());
        Ok(())
    }

    pub fn customer_orders(&self, customer_id: EntityId) -> Result<Vec<Order>> {
        self.customer(customer_id)?;
        Ok(self
            .orders
            .find_all()?
            .into_iter()
            .filter(|o| o.customer_id == customer_id)
            .collect())
    }

    // == Meals ==
    pub fn list_meals(&self) -> Result<Vec<Meal>> {
        Ok(self.meals.find_all()?)
    }

    pub fn meal(&self, id: EntityId) -> Result<Meal> {
        self.meals
            .lookup_by_id(id)?
            .ok_or_else(|| TrackerError::not_found(Meal::KIND, id))
    }

    pub fn meal_by_name(&self, name: &str) -> Result<Meal> {
        self.meals
            .find_all()?
            .into_iter()
            .find(|m| m.name == name)
            .ok_or_else(|| TrackerError::NotFound(format!("Meal not found with name: {name}")))
    }

    pub fn create_meal(&self, meal: Meal) -> Result<Meal> {
        if meal.id.is_some() {
            return Err(TrackerError::InvalidRequest(
                "IDs should not be provided for new meals".to_string(),
            ));
        }
        Ok(self.meals.create(meal)?)
    }

    /// Creates several meals; none is created if any carries an id.
    pub fn create_meals(&self, meals: Vec<Meal>) -> Result<Vec<Meal>> {
        if meals.iter().any(|m| m.id.is_some()) {
            return Err(TrackerError::InvalidRequest(
                "IDs should not be provided for new meals".to_string(),
            ));
        }
        meals
            .into_iter()
            .map(|meal| self.meals.create(meal).map_err(TrackerError::from))
            .collect()
    }

    pub fn update_meal(&self, id: EntityId, details: Meal) -> Result<Meal> {
        let mut meal = self.meal(id)?;
        meal.name = details.name;
        meal.price = details.price;
        meal.cooking_time = details.cooking_time;
        Ok(self.meals.update(id, meal)?)
    }

    /// Deletes a meal and strips it from every order containing it.
    ///
    /// The whole order cache is cleared afterwards: cached orders are not
    /// indexed by meal, so every one of them may hold a stale copy.
    ///
    /// Not atomic: the stripped orders are saved before the meal is deleted,
    /// so a failing meal delete returns an error with the orders already
    /// updated.
    pub fn delete_meal(&self, id: EntityId) -> Result<()> {
        self.meal(id)?;

        let mut affected = 0;
        for mut order in self.orders.find_all()? {
            if order.remove_meal(id) {
                self.orders.store().save(order)?;
                affected += 1;
            }
        }

        self.orders.invalidate_all();
        self.meals.delete(id)?;
        info!(
            "Order cache cleared due to deletion of meal {} ({} orders updated)",
            id, affected
        );
        Ok(())
    }

    // == Orders ==
    pub fn list_orders(&self) -> Result<Vec<Order>> {
        Ok(self.orders.find_all()?)
    }

    pub fn order(&self, id: EntityId) -> Result<Order> {
        self.orders
            .lookup_by_id(id)?
            .ok_or_else(|| TrackerError::not_found(Order::KIND, id))
    }

    /// Opens a new `ACCEPTED` order for an existing customer.
    pub fn create_order(&self, customer_id: EntityId) -> Result<Order> {
        self.customer(customer_id)?;
        Ok(self.orders.create(Order::accepted(customer_id))?)
    }

    pub fn update_order_status(&self, id: EntityId, status: OrderStatus) -> Result<Order> {
        let mut order = self.order(id)?;
        order.status = status;
        Ok(self.orders.update(id, order)?)
    }

    pub fn add_meal_to_order(&self, order_id: EntityId, meal_id: EntityId) -> Result<Order> {
        let mut order = self.order(order_id)?;
        let meal = self.meal(meal_id)?;
        if order.meals.len() >= MAX_MEALS_PER_ORDER {
            return Err(TrackerError::InvalidRequest(format!(
                "Maximum {} meals per order",
                MAX_MEALS_PER_ORDER
            )));
        }
        order.meals.push(meal);
        Ok(self.orders.update(order_id, order)?)
    }

    pub fn remove_meal_from_order(&self, order_id: EntityId, meal_id: EntityId) -> Result<Order> {
        let mut order = self.order(order_id)?;
        self.meal(meal_id)?;
        order.remove_meal(meal_id);
        Ok(self.orders.update(order_id, order)?)
    }

    pub fn delete_order(&self, id: EntityId) -> Result<()> {
        self.orders.delete(id)?;
        Ok(())
    }

    // == Cache Administration ==
    pub fn cache_stats(&self) -> Vec<(&'static str, CacheStats)> {
        vec![
            (self.customers.name(), self.customers.stats()),
            (self.meals.name(), self.meals.stats()),
            (self.orders.name(), self.orders.stats()),
        ]
    }

    /// Clears the named cache, or all of them when `name` is `None`.
    pub fn flush(&self, name: Option<&str>) -> Result<Vec<&'static str>> {
        let all = name.is_none();
        let mut flushed = Vec::new();
        if all || name == Some(CUSTOMER_CACHE) {
            self.customers.invalidate_all();
            flushed.push(CUSTOMER_CACHE);
        }
        if all || name == Some(MEAL_CACHE) {
            self.meals.invalidate_all();
            flushed.push(MEAL_CACHE);
        }
        if all || name == Some(ORDER_CACHE) {
            self.orders.invalidate_all();
            flushed.push(ORDER_CACHE);
        }
        if flushed.is_empty() {
            return Err(TrackerError::InvalidRequest(format!(
                "Unknown cache: {}",
                name.unwrap_or_default()
            )));
        }
        Ok(flushed)
    }
}
