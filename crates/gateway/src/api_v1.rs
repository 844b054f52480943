//! HTTP API v1: study-plan requests, plans and progress.
//!
//! Endpoints:
//!
//! - `GET   /v1/syllabus`                  : The loaded syllabus
//! - `POST  /v1/allocations`               : Compute a day allocation
//! - `POST  /v1/requests`                  : File a plan request
//! - `GET   /v1/users/{user_id}/request`   : The user's open request
//! - `GET   /v1/users/{user_id}/plan`      : The user's current plan
//! - `GET   /v1/users/{user_id}/progress`  : Checked subtopics + summary
//! - `POST  /v1/users/{user_id}/progress`  : Check or uncheck one subtopic
//!
//! Admin (bearer token, see [`crate::auth_middleware`]):
//!
//! - `GET   /v1/admin/requests`            : All requests, newest first
//! - `PATCH /v1/admin/requests/{id}`       : Change a request's status
//! - `POST  /v1/admin/prompt`              : Render the producer prompt
//! - `POST  /v1/admin/requests/{id}/plan`  : Upload the producer's curriculum

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use prepwise_core::curriculum::{Curriculum, DaySummary};
use prepwise_core::error::{CurriculumError, PlannerError, StoreError};
use prepwise_core::plan::{PlanRequest, RequestStatus, StudyPlan, UserProfile};
use prepwise_core::progress::{ProgressSummary, SubtopicRef};
use prepwise_core::store::PlanStore;
use prepwise_core::strength::TopicStrengths;
use prepwise_core::syllabus::Syllabus;
use prepwise_planner::{
    AllocationDiagnostics, AllocationResult, CoverageReport, DayRange, allocate, render_prompt,
};

// ── State ─────────────────────────────────────────────────────────────────

/// Shared state for the v1 API.
pub struct ApiV1State {
    pub syllabus: Arc<Syllabus>,
    pub day_range: DayRange,
    pub store: Arc<dyn PlanStore>,
    /// Bearer tokens accepted on admin routes. Empty = admin routes are open.
    pub admin_tokens: Vec<String>,
    pub start_time: DateTime<Utc>,
}

pub type SharedApiState = Arc<ApiV1State>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/syllabus", get(syllabus_handler))
        .route("/allocations", post(allocation_handler))
        .route("/requests", post(create_request_handler))
        .route("/users/{user_id}/request", get(user_request_handler))
        .route("/users/{user_id}/plan", get(user_plan_handler))
        .route(
            "/users/{user_id}/progress",
            get(get_progress_handler).post(toggle_progress_handler),
        )
        .with_state(state.clone())
        .nest("/admin", admin_router(state))
}

/// Admin routes, guarded by the bearer-token middleware.
pub fn admin_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/requests", get(list_requests_handler))
        .route("/requests/{id}", patch(update_request_handler))
        .route("/requests/{id}/plan", post(upload_plan_handler))
        .route("/prompt", post(prompt_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth_middleware,
        ))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct AllocationRequest {
    days: i64,
    #[serde(default)]
    topic_strengths: TopicStrengths,
}

#[derive(Serialize)]
struct AllocationResponse {
    total_days: u32,
    study_plan: AllocationResult,
    allocated_total: i64,
    diagnostics: AllocationDiagnostics,
}

#[derive(Serialize)]
struct PromptResponse {
    prompt: String,
    study_plan: AllocationResult,
    diagnostics: AllocationDiagnostics,
}

#[derive(Deserialize)]
struct CreatePlanRequest {
    user_id: String,
    #[serde(default)]
    user_name: String,
    #[serde(default)]
    user_email: String,
    days: i64,
    #[serde(default)]
    topic_strengths: TopicStrengths,
}

#[derive(Serialize)]
struct RequestListResponse {
    requests: Vec<PlanRequest>,
    count: usize,
}

#[derive(Deserialize)]
struct UpdateStatusRequest {
    status: RequestStatus,
    #[serde(default)]
    approved_by: Option<String>,
}

#[derive(Deserialize)]
struct UploadPlanRequest {
    #[serde(default)]
    plan_name: Option<String>,
    plan_data: serde_json::Value,
    #[serde(default)]
    approved_by: Option<String>,
}

#[derive(Serialize)]
struct UploadPlanResponse {
    plan_id: String,
    request_id: String,
    user_id: String,
    plan_name: String,
    total_days: u32,
    days_stored: usize,
    ignored_keys: Vec<String>,
    coverage: CoverageReport,
}

#[derive(Serialize)]
struct PlanResponse {
    plan: StudyPlan,
    days: Vec<DaySummary>,
    progress: ProgressSummary,
}

#[derive(Serialize)]
struct ProgressResponse {
    progress: BTreeMap<String, bool>,
    summary: ProgressSummary,
}

#[derive(Deserialize)]
struct ToggleProgressRequest {
    day_number: u32,
    subject_index: usize,
    topic_index: usize,
    subtopic_index: usize,
    completed: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn store_error(e: StoreError) -> ApiError {
    let status = match &e {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Conflict(_) => StatusCode::CONFLICT,
        StoreError::InvalidReference(_) => StatusCode::BAD_REQUEST,
        StoreError::Storage(_) => {
            tracing::error!(error = %e, "Store operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    api_error(status, e.to_string())
}

fn planner_error(e: PlannerError) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, e.to_string())
}

fn curriculum_error(e: CurriculumError) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, e.to_string())
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn syllabus_handler(State(state): State<SharedApiState>) -> Json<Syllabus> {
    Json(state.syllabus.as_ref().clone())
}

async fn allocation_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<AllocationRequest>,
) -> Result<Json<AllocationResponse>, ApiError> {
    let days = state.day_range.check(payload.days).map_err(planner_error)?;
    let allocation = allocate(days, &payload.topic_strengths, &state.syllabus);
    let allocated_total = allocation.allocated_total();

    Ok(Json(AllocationResponse {
        total_days: days,
        study_plan: allocation.subjects,
        allocated_total,
        diagnostics: allocation.diagnostics,
    }))
}

async fn create_request_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<PlanRequest>), ApiError> {
    let user_id = payload.user_id.trim();
    if user_id.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "user_id is required"));
    }
    let days = state.day_range.check(payload.days).map_err(planner_error)?;

    let mut profile = UserProfile::new(user_id);
    profile.name = payload.user_name.clone();
    profile.email = payload.user_email.clone();

    let request = PlanRequest::new(user_id, days, payload.topic_strengths)
        .with_contact(payload.user_name, payload.user_email);
    let request = state
        .store
        .create_request(request)
        .await
        .map_err(store_error)?;

    // Only an accepted request updates the stored contact details.
    state.store.upsert_user(profile).await.map_err(store_error)?;

    info!(request_id = %request.id, user_id = %request.user_id, days, "Plan request created");
    Ok((StatusCode::CREATED, Json(request)))
}

async fn user_request_handler(
    State(state): State<SharedApiState>,
    Path(user_id): Path<String>,
) -> Result<Json<PlanRequest>, ApiError> {
    state
        .store
        .open_request_for_user(&user_id)
        .await
        .map_err(store_error)?
        .map(Json)
        .ok_or_else(|| store_error(StoreError::not_found("open plan request for user", &user_id)))
}

async fn user_plan_handler(
    State(state): State<SharedApiState>,
    Path(user_id): Path<String>,
) -> Result<Json<PlanResponse>, ApiError> {
    let plan = state
        .store
        .current_plan_for_user(&user_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| store_error(StoreError::not_found("current plan for user", &user_id)))?;

    Ok(Json(PlanResponse {
        days: plan.summaries(),
        progress: ProgressSummary::from_days(&plan.days),
        plan,
    }))
}

async fn get_progress_handler(
    State(state): State<SharedApiState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let summary = state
        .store
        .current_plan_for_user(&user_id)
        .await
        .map_err(store_error)?
        .map(|plan| ProgressSummary::from_days(&plan.days))
        .unwrap_or_default();
    let progress = state
        .store
        .progress_for_user(&user_id)
        .await
        .map_err(store_error)?;

    Ok(Json(ProgressResponse { progress, summary }))
}

async fn toggle_progress_handler(
    State(state): State<SharedApiState>,
    Path(user_id): Path<String>,
    Json(payload): Json<ToggleProgressRequest>,
) -> Result<Json<ProgressSummary>, ApiError> {
    let at = SubtopicRef {
        day_number: payload.day_number,
        subject_index: payload.subject_index,
        topic_index: payload.topic_index,
        subtopic_index: payload.subtopic_index,
    };
    let summary = state
        .store
        .set_subtopic_checked(&user_id, at, payload.completed)
        .await
        .map_err(store_error)?;

    debug!(
        user_id = %user_id,
        key = %at.key(),
        completed = payload.completed,
        percentage = summary.percentage,
        "Progress updated"
    );
    Ok(Json(summary))
}

async fn list_requests_handler(
    State(state): State<SharedApiState>,
) -> Result<Json<RequestListResponse>, ApiError> {
    let requests = state.store.list_requests().await.map_err(store_error)?;
    Ok(Json(RequestListResponse {
        count: requests.len(),
        requests,
    }))
}

async fn update_request_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<PlanRequest>, ApiError> {
    let actor = payload.approved_by.as_deref().unwrap_or("admin");
    let request = state
        .store
        .update_request_status(&id, payload.status, Some(actor))
        .await
        .map_err(store_error)?;

    info!(request_id = %id, status = %request.status, actor, "Plan request status changed");
    Ok(Json(request))
}

async fn prompt_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<AllocationRequest>,
) -> Result<Json<PromptResponse>, ApiError> {
    let days = state.day_range.check(payload.days).map_err(planner_error)?;
    let allocation = allocate(days, &payload.topic_strengths, &state.syllabus);
    let prompt = render_prompt(days, &payload.topic_strengths, &allocation, &state.syllabus);

    debug!(days, prompt_len = prompt.len(), "Prompt rendered");
    Ok(Json(PromptResponse {
        prompt,
        study_plan: allocation.subjects,
        diagnostics: allocation.diagnostics,
    }))
}

async fn upload_plan_handler(
    State(state): State<SharedApiState>,
    Path(request_id): Path<String>,
    Json(payload): Json<UploadPlanRequest>,
) -> Result<(StatusCode, Json<UploadPlanResponse>), ApiError> {
    let request = state
        .store
        .get_request(&request_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| store_error(StoreError::not_found("plan request", &request_id)))?;

    let curriculum = Curriculum::from_value(&payload.plan_data).map_err(curriculum_error)?;
    let coverage = CoverageReport::reconcile(&curriculum, request.days, &state.syllabus);

    let plan_name = payload
        .plan_name
        .filter(|n| !n.trim().is_empty())
        .or(curriculum.plan_name)
        .unwrap_or_else(|| format!("{}-day study plan", request.days));
    let days_stored = curriculum.days.len();

    let mut plan = StudyPlan::new(&request, plan_name, curriculum.days);
    plan.created_by = payload.approved_by.unwrap_or_else(|| "admin".into());
    let plan = state.store.create_plan(plan).await.map_err(store_error)?;

    info!(
        plan_id = %plan.id,
        request_id = %request.id,
        user_id = %plan.user_id,
        days_stored,
        complete = coverage.is_complete(),
        "Study plan stored"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadPlanResponse {
            plan_id: plan.id,
            request_id: request.id,
            user_id: plan.user_id,
            plan_name: plan.plan_name,
            total_days: plan.total_days,
            days_stored,
            ignored_keys: curriculum.ignored_keys,
            coverage,
        }),
    ))
}
