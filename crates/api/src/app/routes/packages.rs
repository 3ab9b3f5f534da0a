use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use summit_infra::CatalogState;

use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_packages))
        .route("/reload", post(reload_packages))
}

fn catalog_response(state: CatalogState) -> axum::response::Response {
    let status = match state {
        CatalogState::Errored { .. } => StatusCode::BAD_GATEWAY,
        CatalogState::Loading | CatalogState::Loaded { .. } => StatusCode::OK,
    };
    (status, Json(state)).into_response()
}

pub async fn list_packages(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    catalog_response(services.catalog_state())
}

/// Re-run the catalog query (e.g. after an errored first load).
pub async fn reload_packages(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    catalog_response(services.reload_catalog().await)
}
