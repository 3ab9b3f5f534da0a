use axum::Router;

pub mod drafts;
pub mod packages;
pub mod system;

/// Router for the catalog and draft session endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/packages", packages::router())
        .nest("/drafts", drafts::router())
}
