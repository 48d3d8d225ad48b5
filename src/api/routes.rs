//! API Routes
//!
//! Configures the Axum router with all order tracker endpoints.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_customer, add_meal, add_meal_to_order, add_meals, add_order, all_visits, cache_stats,
    count_visit, create_customer_order, customer_orders, delete_customer, delete_meal,
    delete_order, filter_customers, flush_cache, get_customer, get_customer_by_name,
    get_customer_by_phone, get_meal, get_meal_by_name, get_order, health_handler, list_customers,
    list_meals, list_orders, remove_meal_from_order, single_visit, top_visited, update_customer,
    update_meal, update_order_status, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `/api/customers` - customer CRUD, lookups and a customer's orders
/// - `/api/meals` - meal CRUD and bulk creation
/// - `/api/orders` - order lifecycle and meal membership
/// - `/api/statistics` - visit counters
/// - `/api/cache` - cache stats and manual flush
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Visit counting on every request
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/customers", get(list_customers).post(add_customer))
        .route(
            "/api/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/api/customers/name/:name", get(get_customer_by_name))
        .route("/api/customers/phone/:phone", get(get_customer_by_phone))
        .route("/api/customers/filter/meal", get(filter_customers))
        .route(
            "/api/customers/:id/orders",
            get(customer_orders).post(create_customer_order),
        )
        .route("/api/meals", get(list_meals).post(add_meal))
        .route("/api/meals/bulk", post(add_meals))
        .route("/api/meals/name", get(get_meal_by_name))
        .route(
            "/api/meals/:id",
            get(get_meal).put(update_meal).delete(delete_meal),
        )
        .route("/api/orders", get(list_orders).post(add_order))
        .route("/api/orders/:id", get(get_order).delete(delete_order))
        .route("/api/orders/:id/status", put(update_order_status))
        .route(
            "/api/orders/:id/meals",
            put(add_meal_to_order).delete(remove_meal_from_order),
        )
        .route("/api/statistics", get(all_visits))
        .route("/api/statistics/single-stat", get(single_visit))
        .route("/api/statistics/top-visited", get(top_visited))
        .route("/api/cache/stats", get(cache_stats))
        .route("/api/cache/flush", post(flush_cache))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn_with_state(state.clone(), count_visit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{OrderTracker, Stores};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let state = AppState::new(OrderTracker::new(Stores::in_memory(), 1024 * 1024));
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cache_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cache/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_add_meal_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/meals")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"Soup","price":4.5,"cookingTime":15}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_get_customer_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/customers/999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_segment_wins_over_id() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/meals/name?name=Soup")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // reaches the by-name handler, not a failed id parse
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
