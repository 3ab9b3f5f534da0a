use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};

use summit_catalog::{ComparisonMatrix, PackageId};
use summit_core::{DomainError, DomainResult, DraftId};
use summit_registration::{DraftPatch, LogoFile, WizardStep};

use crate::app::services::{AppServices, DraftSession};
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_draft))
        .route("/:id", get(get_draft).patch(patch_draft).delete(delete_draft))
        .route("/:id/delegates", post(add_delegate))
        .route("/:id/delegates/last", delete(remove_last_delegate))
        .route("/:id/delegates/:index", put(set_delegate_name).delete(remove_delegate))
        .route("/:id/logo", put(upload_logo).delete(clear_logo))
        .route("/:id/next", post(next_step))
        .route("/:id/back", post(previous_step))
        .route("/:id/goto/:step", post(go_to_step))
        .route("/:id/selection/:package_id", post(toggle_selection))
        .route("/:id/comparison", get(comparison))
        .route("/:id/submit", post(submit))
}

/// Run `f` against the session and render the updated draft, or the error.
fn mutate<T>(
    services: &AppServices,
    id: &str,
    f: impl FnOnce(&mut DraftSession) -> DomainResult<T>,
) -> axum::response::Response {
    let id = match errors::parse_draft_id(id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.with_session(&id, f) {
        Ok((_, session)) => (StatusCode::OK, Json(dto::draft_view(id, &session))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_draft(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateDraftRequest>,
) -> axum::response::Response {
    let (id, session) = services.create_session(body.registration_type);
    (StatusCode::CREATED, Json(dto::draft_view(id, &session))).into_response()
}

pub async fn get_draft(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DraftId = match errors::parse_draft_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.session(&id) {
        Ok(session) => (StatusCode::OK, Json(dto::draft_view(id, &session))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_draft(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DraftId = match errors::parse_draft_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.discard_session(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn patch_draft(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(patch): Json<DraftPatch>,
) -> axum::response::Response {
    mutate(&services, &id, |session| session.wizard.update(patch))
}

pub async fn add_delegate(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    mutate(&services, &id, |session| session.wizard.draft_mut().increment_delegates())
}

pub async fn remove_last_delegate(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    mutate(&services, &id, |session| {
        if session.wizard.draft_mut().decrement_delegates() {
            Ok(())
        } else {
            Err(DomainError::invariant("at least one delegate is required"))
        }
    })
}

pub async fn set_delegate_name(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, index)): Path<(String, usize)>,
    Json(body): Json<dto::SetDelegateNameRequest>,
) -> axum::response::Response {
    mutate(&services, &id, |session| {
        session.wizard.draft_mut().set_delegate_name(index, body.name)
    })
}

pub async fn remove_delegate(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, index)): Path<(String, usize)>,
) -> axum::response::Response {
    mutate(&services, &id, |session| session.wizard.draft_mut().remove_delegate(index))
}

pub async fn upload_logo(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(query): Query<dto::LogoQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    mutate(&services, &id, |session| {
        if query.file_name.trim().is_empty() {
            return Err(DomainError::validation("fileName cannot be empty"));
        }
        if body.is_empty() {
            return Err(DomainError::validation("logo file is empty"));
        }
        session.wizard.update(DraftPatch {
            logo: Some(Some(LogoFile::new(query.file_name, content_type, body.to_vec()))),
            ..Default::default()
        })
    })
}

pub async fn clear_logo(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    mutate(&services, &id, |session| {
        session.wizard.update(DraftPatch {
            logo: Some(None),
            ..Default::default()
        })
    })
}

pub async fn next_step(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    mutate(&services, &id, |session| session.wizard.advance())
}

pub async fn previous_step(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    mutate(&services, &id, |session| Ok(session.wizard.back()))
}

pub async fn go_to_step(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, step)): Path<(String, String)>,
) -> axum::response::Response {
    mutate(&services, &id, |session| {
        let step: WizardStep = step.parse()?;
        session.wizard.go_to(step)
    })
}

pub async fn toggle_selection(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, package_id)): Path<(String, String)>,
) -> axum::response::Response {
    let id: DraftId = match errors::parse_draft_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let package_id = PackageId::new(package_id);
    match services.toggle_selection(&id, package_id.clone()) {
        Ok((outcome, session)) => (
            StatusCode::OK,
            Json(dto::ToggleResponse {
                package_id: &package_id,
                outcome,
                selection: &session.selection,
            }),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn comparison(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DraftId = match errors::parse_draft_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match services.session(&id) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let catalog = services.catalog_state();
    let matrix = ComparisonMatrix::build(catalog.packages(), &session.selection);
    (StatusCode::OK, Json(matrix)).into_response()
}

pub async fn submit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DraftId = match errors::parse_draft_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.submit(&id).await {
        Ok(result) => {
            let status = if result.is_success() {
                StatusCode::CREATED
            } else {
                StatusCode::BAD_GATEWAY
            };
            (status, Json(result)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
