//! API Handlers
//!
//! HTTP request handlers for each order tracker endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};

use crate::error::{Result, TrackerError};
use crate::models::{
    CacheStatsResponse, Customer, CustomerIdQuery, CustomerRequest, FlushQuery, FlushResponse,
    HealthResponse, Meal, MealFilterQuery, MealIdQuery, MealRequest, NameQuery, Order,
    StatusQuery, TopVisitedResponse, UrlQuery,
};
use crate::repository::EntityId;
use crate::service::OrderTracker;
use crate::visits::VisitCounter;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<OrderTracker>,
    pub visits: Arc<VisitCounter>,
}

impl AppState {
    /// Creates a new AppState around the given tracker.
    pub fn new(tracker: OrderTracker) -> Self {
        Self {
            tracker: Arc::new(tracker),
            visits: Arc::new(VisitCounter::new()),
        }
    }

    /// Creates a new AppState from configuration, with sweepers running.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(OrderTracker::from_config(config))
    }
}

fn validated<T>(error: Option<String>, value: T) -> Result<T> {
    match error {
        Some(message) => Err(TrackerError::InvalidRequest(message)),
        None => Ok(value),
    }
}

/// Middleware counting every request by path.
pub async fn count_visit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.visits.increment(request.uri().path());
    next.run(request).await
}

// == Customers ==

/// Handler for GET /api/customers
pub async fn list_customers(State(state): State<AppState>) -> Result<Json<Vec<Customer>>> {
    Ok(Json(state.tracker.list_customers()?))
}

/// Handler for GET /api/customers/:id
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<Json<Customer>> {
    Ok(Json(state.tracker.customer(id)?))
}

/// Handler for GET /api/customers/name/:name
pub async fn get_customer_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Customer>> {
    Ok(Json(state.tracker.customer_by_name(&name)?))
}

/// Handler for GET /api/customers/phone/:phone
pub async fn get_customer_by_phone(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<Customer>> {
    Ok(Json(state.tracker.customer_by_phone(&phone)?))
}

/// Handler for GET /api/customers/filter/meal?status=&mealName=
///
/// An empty match is reported as 404.
pub async fn filter_customers(
    State(state): State<AppState>,
    Query(query): Query<MealFilterQuery>,
) -> Result<Json<Vec<Customer>>> {
    let customers = state
        .tracker
        .customers_by_order_status_and_meal(query.status, &query.meal_name)?;
    if customers.is_empty() {
        return Err(TrackerError::NotFound(format!(
            "No customers found with status {:?} and meal {}",
            query.status, query.meal_name
        )));
    }
    Ok(Json(customers))
}

/// Handler for POST /api/customers
pub async fn add_customer(
    State(state): State<AppState>,
    Json(req): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<Customer>)> {
    let req = validated(req.validate(), req)?;
    let customer = state.tracker.create_customer(req.into_customer())?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Handler for PUT /api/customers/:id
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(req): Json<CustomerRequest>,
) -> Result<Json<Customer>> {
    let req = validated(req.validate(), req)?;
    Ok(Json(state.tracker.update_customer(id, req.into_customer())?))
}

/// Handler for DELETE /api/customers/:id
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<StatusCode> {
    state.tracker.delete_customer(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/customers/:id/orders
pub async fn customer_orders(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.tracker.customer_orders(id)?))
}

/// Handler for POST /api/customers/:id/orders
pub async fn create_customer_order(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<(StatusCode, Json<Order>)> {
    Ok((StatusCode::CREATED, Json(state.tracker.create_order(id)?)))
}

// == Meals ==

/// Handler for GET /api/meals
pub async fn list_meals(State(state): State<AppState>) -> Result<Json<Vec<Meal>>> {
    Ok(Json(state.tracker.list_meals()?))
}

/// Handler for GET /api/meals/:id
pub async fn get_meal(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<Json<Meal>> {
    Ok(Json(state.tracker.meal(id)?))
}

/// Handler for GET /api/meals/name?name=
pub async fn get_meal_by_name(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Meal>> {
    Ok(Json(state.tracker.meal_by_name(&query.name)?))
}

/// Handler for POST /api/meals
pub async fn add_meal(
    State(state): State<AppState>,
    Json(req): Json<MealRequest>,
) -> Result<(StatusCode, Json<Meal>)> {
    let req = validated(req.validate(), req)?;
    Ok((StatusCode::CREATED, Json(state.tracker.create_meal(req.into_meal())?)))
}

/// Handler for POST /api/meals/bulk
pub async fn add_meals(
    State(state): State<AppState>,
    Json(reqs): Json<Vec<MealRequest>>,
) -> Result<(StatusCode, Json<Vec<Meal>>)> {
    if let Some(error) = reqs.iter().find_map(MealRequest::validate) {
        return Err(TrackerError::InvalidRequest(error));
    }
    let meals = reqs.into_iter().map(MealRequest::into_meal).collect();
    Ok((StatusCode::CREATED, Json(state.tracker.create_meals(meals)?)))
}

/// Handler for PUT /api/meals/:id
pub async fn update_meal(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(req): Json<MealRequest>,
) -> Result<Json<Meal>> {
    let req = validated(req.validate(), req)?;
    Ok(Json(state.tracker.update_meal(id, req.into_meal())?))
}

/// Handler for DELETE /api/meals/:id
///
/// Also strips the meal from every order and clears the order cache.
pub async fn delete_meal(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<StatusCode> {
    state.tracker.delete_meal(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// == Orders ==

/// Handler for GET /api/orders
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.tracker.list_orders()?))
}

/// Handler for GET /api/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<Json<Order>> {
    Ok(Json(state.tracker.order(id)?))
}

/// Handler for POST /api/orders?customerId=
pub async fn add_order(
    State(state): State<AppState>,
    Query(query): Query<CustomerIdQuery>,
) -> Result<(StatusCode, Json<Order>)> {
    Ok((StatusCode::CREATED, Json(state.tracker.create_order(query.customer_id)?)))
}

/// Handler for PUT /api/orders/:id/status?status=
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Order>> {
    Ok(Json(state.tracker.update_order_status(id, query.status)?))
}

/// Handler for PUT /api/orders/:id/meals?mealId=
pub async fn add_meal_to_order(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Query(query): Query<MealIdQuery>,
) -> Result<Json<Order>> {
    Ok(Json(state.tracker.add_meal_to_order(id, query.meal_id)?))
}

/// Handler for DELETE /api/orders/:id/meals?mealId=
pub async fn remove_meal_from_order(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Query(query): Query<MealIdQuery>,
) -> Result<StatusCode> {
    state.tracker.remove_meal_from_order(id, query.meal_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for DELETE /api/orders/:id
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<StatusCode> {
    state.tracker.delete_order(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// == Statistics ==

/// Handler for GET /api/statistics
pub async fn all_visits(State(state): State<AppState>) -> Json<BTreeMap<String, u64>> {
    Json(state.visits.snapshot())
}

/// Handler for GET /api/statistics/single-stat?url=
pub async fn single_visit(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Json<u64> {
    Json(state.visits.count(&query.url))
}

/// Handler for GET /api/statistics/top-visited
pub async fn top_visited(State(state): State<AppState>) -> Result<Json<TopVisitedResponse>> {
    let (url, count) = state
        .visits
        .most_visited()
        .ok_or_else(|| TrackerError::NotFound("No visits recorded".to_string()))?;
    Ok(Json(TopVisitedResponse { url, count }))
}

// == Cache Administration ==

/// Handler for GET /api/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse::new(state.tracker.cache_stats()))
}

/// Handler for POST /api/cache/flush?cache=
pub async fn flush_cache(
    State(state): State<AppState>,
    Query(query): Query<FlushQuery>,
) -> Result<Json<FlushResponse>> {
    let flushed = state.tracker.flush(query.cache.as_deref())?;
    Ok(Json(FlushResponse { flushed }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
