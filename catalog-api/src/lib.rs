//! Paginated, filterable read API over a JSON document collection.

pub mod config;
pub mod constraints;
pub mod handlers;
pub mod pool;
pub mod query_options;
pub mod request_logging;
pub mod store;

use config::ApiConfig;
use poem::{get, http::Method, middleware::Cors, Endpoint, EndpointExt, Route};
use pool::StorePool;
use request_logging::RequestLogging;
use std::sync::Arc;

pub fn cors() -> Cors {
    Cors::new()
        .allow_method(Method::GET)
        .allow_headers([
            "Origin",
            "X-Requested-With",
            "Content-Type",
            "Accept",
            "Authorization",
        ])
        .max_age(3600)
}

pub fn create_app(pool: Arc<StorePool>, config: Arc<ApiConfig>) -> impl Endpoint {
    Route::new()
        .at("/", get(handlers::list_documents))
        .at("/api/v1/documents", get(handlers::list_documents))
        .at("/api/v1/health", get(handlers::health))
        .data(pool)
        .data(config)
        .with(cors())
        .with(RequestLogging)
}
