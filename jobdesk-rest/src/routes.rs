use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use jobdesk_core::{
    Auth, CompanyFilter, CompanyPatch, CompanyRepository, JobFilter, JobPatch, JobRepository,
    JobdeskError, NewCompany, NewJob,
};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

/// Wraps the core error taxonomy with its HTTP status mapping.
pub struct RestError(JobdeskError);

impl From<JobdeskError> for RestError {
    fn from(err: JobdeskError) -> Self {
        RestError(err)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            JobdeskError::EmptyUpdate
            | JobdeskError::InvalidRange { .. }
            | JobdeskError::NoFilterCriteria
            | JobdeskError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            JobdeskError::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            JobdeskError::Conflict(_) => (StatusCode::CONFLICT, self.0.to_string()),
            JobdeskError::Unauthorized => (StatusCode::UNAUTHORIZED, self.0.to_string()),
            JobdeskError::Forbidden => (StatusCode::FORBIDDEN, self.0.to_string()),
            JobdeskError::Storage(detail) => {
                warn!(%detail, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };
        let body = json!({"error": {"message": message, "status": status.as_u16()}});
        (status, Json(body)).into_response()
    }
}

/// Mutations are admin-only; reads stay open.
fn require_admin(auth: &dyn Auth, headers: &HeaderMap) -> Result<(), RestError> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let credentials = auth.credentials(bearer);
    if credentials.is_empty() {
        return Err(JobdeskError::Unauthorized.into());
    }
    if !auth.is_admin(&credentials) {
        return Err(JobdeskError::Forbidden.into());
    }
    Ok(())
}

#[derive(Clone)]
struct CompanyState {
    repo: Arc<dyn CompanyRepository>,
    auth: Arc<dyn Auth>,
}

pub fn company_router(repo: Arc<dyn CompanyRepository>, auth: Arc<dyn Auth>) -> Router {
    let state = CompanyState { repo, auth };
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route(
            "/companies/:handle",
            get(get_company).patch(update_company).delete(delete_company),
        )
        .with_state(state)
}

async fn list_companies(
    State(state): State<CompanyState>,
    Query(filter): Query<CompanyFilter>,
) -> Result<Response, RestError> {
    let companies = state.repo.list(&filter).await?;
    Ok(Json(companies).into_response())
}

async fn create_company(
    State(state): State<CompanyState>,
    headers: HeaderMap,
    Json(company): Json<NewCompany>,
) -> Result<Response, RestError> {
    require_admin(state.auth.as_ref(), &headers)?;
    let created = state.repo.create(company).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn get_company(
    State(state): State<CompanyState>,
    Path(handle): Path<String>,
) -> Result<Response, RestError> {
    let detail = state.repo.get(&handle).await?;
    Ok(Json(detail).into_response())
}

async fn update_company(
    State(state): State<CompanyState>,
    Path(handle): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<CompanyPatch>,
) -> Result<Response, RestError> {
    require_admin(state.auth.as_ref(), &headers)?;
    let updated = state.repo.update(&handle, patch).await?;
    Ok(Json(updated).into_response())
}

async fn delete_company(
    State(state): State<CompanyState>,
    Path(handle): Path<String>,
    headers: HeaderMap,
) -> Result<Response, RestError> {
    require_admin(state.auth.as_ref(), &headers)?;
    state.repo.remove(&handle).await?;
    Ok(Json(json!({"deleted": handle})).into_response())
}

#[derive(Clone)]
struct JobState {
    repo: Arc<dyn JobRepository>,
    auth: Arc<dyn Auth>,
}

pub fn job_router(repo: Arc<dyn JobRepository>, auth: Arc<dyn Auth>) -> Router {
    let state = JobState { repo, auth };
    Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route(
            "/jobs/:id",
            get(get_job).patch(update_job).delete(delete_job),
        )
        .with_state(state)
}

async fn list_jobs(
    State(state): State<JobState>,
    Query(filter): Query<JobFilter>,
) -> Result<Response, RestError> {
    let jobs = state.repo.list(&filter).await?;
    Ok(Json(jobs).into_response())
}

async fn create_job(
    State(state): State<JobState>,
    headers: HeaderMap,
    Json(job): Json<NewJob>,
) -> Result<Response, RestError> {
    require_admin(state.auth.as_ref(), &headers)?;
    let created = state.repo.create(job).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn get_job(
    State(state): State<JobState>,
    Path(id): Path<i64>,
) -> Result<Response, RestError> {
    let detail = state.repo.get(id).await?;
    Ok(Json(detail).into_response())
}

async fn update_job(
    State(state): State<JobState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(patch): Json<JobPatch>,
) -> Result<Response, RestError> {
    require_admin(state.auth.as_ref(), &headers)?;
    let updated = state.repo.update(id, patch).await?;
    Ok(Json(updated).into_response())
}

async fn delete_job(
    State(state): State<JobState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, RestError> {
    require_admin(state.auth.as_ref(), &headers)?;
    state.repo.remove(id).await?;
    Ok(Json(json!({"deleted": id})).into_response())
}
