use crate::{config::ApiConfig, constraints, pool::StorePool, query_options};
use poem::{
    handler,
    http::StatusCode,
    web::{Data, Json, Query},
    IntoResponse, Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// Common response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn error(msg: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub environment: String,
}

// Query parameters for the document listing. Everything is optional and
// taken as raw text; unusable values fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentQuery {
    pub page: Option<String>,
    pub take: Option<String>,
    #[serde(rename = "sortField")]
    pub sort_field: Option<String>,
    #[serde(rename = "sortDir")]
    pub sort_dir: Option<String>,
    pub search: Option<String>,
    pub filter: Option<String>,
    pub ids: Option<String>,
}

#[handler]
pub async fn health(config: Data<&Arc<ApiConfig>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Catalog API is running".to_string(),
        environment: config.environment.clone(),
    })
}

/// Lists documents of the configured collection.
///
/// Query parameters: `take`, `page`, `sortField`, `sortDir`, `search`, `ids`
/// and `filter` (see the `filter-query` crate for its syntax). Responds with
/// a JSON array, empty when nothing matches.
#[handler]
pub async fn list_documents(
    pool: Data<&Arc<StorePool>>,
    config: Data<&Arc<ApiConfig>>,
    Query(params): Query<DocumentQuery>,
) -> Response {
    let store = match pool.acquire().await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to acquire document store: {:#}", e);
            return internal_error(format!("{:#}", e));
        }
    };

    let filter = constraints::build_filter(&params, &config);
    let options = query_options::find_options(&params, &config);
    tracing::debug!(filter = %filter, ?options, "querying {}", config.collection);

    match store.find(&config.collection, &filter, &options).await {
        Ok(documents) => Json(documents).into_response(),
        Err(e) => {
            tracing::error!("Failed to query {}: {:#}", config.collection, e);
            internal_error(format!("{:#}", e))
        }
    }
}

fn internal_error(msg: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(msg)),
    )
        .into_response()
}
