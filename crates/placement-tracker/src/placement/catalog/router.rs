use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::super::dashboard::DashboardLimits;
use super::super::domain::{CompanyId, MemberId, MemberRole};
use super::super::timeline::TimelinePhase;
use super::super::timestamp::{parse_timestamp, Timestamp};
use super::domain::{
    CompanyDraft, CompanyQuery, ExperienceDraft, ExperienceId, QuestionDraft, QuestionId,
    ViewerContext,
};
use super::repository::{CompanyRepository, MemberDirectory};
use super::service::{CatalogError, PlacementCatalog};

/// Header carrying the authenticated user id, set by the upstream session layer.
pub const VIEWER_HEADER: &str = "x-user-id";

/// Shared router state: the catalog plus the configured dashboard caps.
pub struct CatalogState<C, M> {
    pub catalog: Arc<PlacementCatalog<C, M>>,
    pub limits: DashboardLimits,
}

impl<C, M> Clone for CatalogState<C, M> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            limits: self.limits,
        }
    }
}

/// Router builder exposing the dashboard, company catalog and admin endpoints.
pub fn catalog_router<C, M>(catalog: Arc<PlacementCatalog<C, M>>, limits: DashboardLimits) -> Router
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    Router::new()
        .route("/api/v1/dashboard", get(dashboard_handler::<C, M>))
        .route(
            "/api/v1/companies",
            get(list_companies_handler::<C, M>).post(add_company_handler::<C, M>),
        )
        .route(
            "/api/v1/companies/:company_id",
            get(company_detail_handler::<C, M>).put(update_company_handler::<C, M>),
        )
        .route(
            "/api/v1/companies/:company_id/experiences",
            post(add_experience_handler::<C, M>),
        )
        .route(
            "/api/v1/companies/:company_id/questions",
            post(add_question_handler::<C, M>),
        )
        .route(
            "/api/v1/experiences/:experience_id",
            put(update_experience_handler::<C, M>).delete(delete_experience_handler::<C, M>),
        )
        .route(
            "/api/v1/questions/:question_id",
            put(update_question_handler::<C, M>).delete(delete_question_handler::<C, M>),
        )
        .route("/api/v1/admin/members", get(members_handler::<C, M>))
        .route(
            "/api/v1/admin/members/:user_id/role",
            put(update_role_handler::<C, M>),
        )
        .route("/api/v1/admin/stats", get(admin_stats_handler::<C, M>))
        .with_state(CatalogState { catalog, limits })
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardParams {
    #[serde(default)]
    pub(crate) now: Option<String>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CompanyListParams {
    #[serde(default)]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) phase: Option<String>,
    #[serde(default)]
    pub(crate) now: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NowParams {
    #[serde(default)]
    pub(crate) now: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleUpdate {
    pub(crate) role: String,
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn catalog_error(error: CatalogError) -> Response {
    let status = error.status_code();
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

/// Absent `now` reads the wall clock; a supplied value must parse.
fn resolve_now(raw: Option<&str>) -> Result<Timestamp, Response> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(Utc::now()),
        Some(value) => parse_timestamp(value)
            .ok_or_else(|| bad_request(format!("could not parse now='{value}' as a timestamp"))),
    }
}

fn resolve_viewer<C, M>(
    catalog: &PlacementCatalog<C, M>,
    headers: &HeaderMap,
) -> Result<ViewerContext, Response>
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let user_id = headers
        .get(VIEWER_HEADER)
        .and_then(|value| value.to_str().ok());
    catalog.viewer(user_id).map_err(catalog_error)
}

pub(crate) async fn dashboard_handler<C, M>(
    State(state): State<CatalogState<C, M>>,
    Query(params): Query<DashboardParams>,
) -> Response
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let now = match resolve_now(params.now.as_deref()) {
        Ok(now) => now,
        Err(response) => return response,
    };
    let limits = match params.limit {
        None => state.limits,
        Some(0) => return bad_request("limit must be a positive integer".to_string()),
        Some(limit) => DashboardLimits::uniform(limit),
    };

    match state.catalog.dashboard(now, limits) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub(crate) async fn list_companies_handler<C, M>(
    State(state): State<CatalogState<C, M>>,
    Query(params): Query<CompanyListParams>,
) -> Response
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let now = match resolve_now(params.now.as_deref()) {
        Ok(now) => now,
        Err(response) => return response,
    };

    let phase = match params.phase.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => match TimelinePhase::parse(raw) {
            Some(phase) => Some(phase),
            None => return bad_request(format!("unknown phase '{raw}'")),
        },
    };

    let query = CompanyQuery {
        search: params.search,
        phase,
    };

    match state.catalog.companies(&query, now) {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub(crate) async fn company_detail_handler<C, M>(
    State(state): State<CatalogState<C, M>>,
    Path(company_id): Path<String>,
    Query(params): Query<NowParams>,
) -> Response
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let now = match resolve_now(params.now.as_deref()) {
        Ok(now) => now,
        Err(response) => return response,
    };

    match state.catalog.company_detail(&CompanyId(company_id), now) {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub(crate) async fn add_company_handler<C, M>(
    State(state): State<CatalogState<C, M>>,
    headers: HeaderMap,
    Json(draft): Json<CompanyDraft>,
) -> Response
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let viewer = match resolve_viewer(&state.catalog, &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match state.catalog.add_company(&viewer, draft, Utc::now()) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub(crate) async fn update_company_handler<C, M>(
    State(state): State<CatalogState<C, M>>,
    headers: HeaderMap,
    Path(company_id): Path<String>,
    Json(draft): Json<CompanyDraft>,
) -> Response
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let viewer = match resolve_viewer(&state.catalog, &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match state
        .catalog
        .update_company(&viewer, &CompanyId(company_id), draft)
    {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub(crate) async fn add_experience_handler<C, M>(
    State(state): State<CatalogState<C, M>>,
    headers: HeaderMap,
    Path(company_id): Path<String>,
    Json(draft): Json<ExperienceDraft>,
) -> Response
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let viewer = match resolve_viewer(&state.catalog, &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match state
        .catalog
        .add_experience(&viewer, &CompanyId(company_id), draft, Utc::now())
    {
        Ok(experience) => (StatusCode::CREATED, Json(experience)).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub(crate) async fn add_question_handler<C, M>(
    State(state): State<CatalogState<C, M>>,
    headers: HeaderMap,
    Path(company_id): Path<String>,
    Json(draft): Json<QuestionDraft>,
) -> Response
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let viewer = match resolve_viewer(&state.catalog, &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match state
        .catalog
        .add_question(&viewer, &CompanyId(company_id), draft, Utc::now())
    {
        Ok(question) => (StatusCode::CREATED, Json(question)).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub(crate) async fn update_experience_handler<C, M>(
    State(state): State<CatalogState<C, M>>,
    headers: HeaderMap,
    Path(experience_id): Path<String>,
    Json(draft): Json<ExperienceDraft>,
) -> Response
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let viewer = match resolve_viewer(&state.catalog, &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match state
        .catalog
        .update_experience(&viewer, &ExperienceId(experience_id), draft)
    {
        Ok(experience) => (StatusCode::OK, Json(experience)).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub(crate) async fn delete_experience_handler<C, M>(
    State(state): State<CatalogState<C, M>>,
    headers: HeaderMap,
    Path(experience_id): Path<String>,
) -> Response
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let viewer = match resolve_viewer(&state.catalog, &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match state
        .catalog
        .delete_experience(&viewer, &ExperienceId(experience_id))
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => catalog_error(err),
    }
}

pub(crate) async fn update_question_handler<C, M>(
    State(state): State<CatalogState<C, M>>,
    headers: HeaderMap,
    Path(question_id): Path<String>,
    Json(draft): Json<QuestionDraft>,
) -> Response
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let viewer = match resolve_viewer(&state.catalog, &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match state
        .catalog
        .update_question(&viewer, &QuestionId(question_id), draft)
    {
        Ok(question) => (StatusCode::OK, Json(question)).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub(crate) async fn delete_question_handler<C, M>(
    State(state): State<CatalogState<C, M>>,
    headers: HeaderMap,
    Path(question_id): Path<String>,
) -> Response
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let viewer = match resolve_viewer(&state.catalog, &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match state
        .catalog
        .delete_question(&viewer, &QuestionId(question_id))
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => catalog_error(err),
    }
}

pub(crate) async fn members_handler<C, M>(
    State(state): State<CatalogState<C, M>>,
    headers: HeaderMap,
) -> Response
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let viewer = match resolve_viewer(&state.catalog, &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match state.catalog.members(&viewer) {
        Ok(members) => (StatusCode::OK, Json(members)).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub(crate) async fn update_role_handler<C, M>(
    State(state): State<CatalogState<C, M>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(update): Json<RoleUpdate>,
) -> Response
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let viewer = match resolve_viewer(&state.catalog, &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    let Some(role) = MemberRole::try_parse(&update.role) else {
        return catalog_error(CatalogError::Validation(format!(
            "unknown role '{}' (expected admin, editor or viewer)",
            update.role.trim()
        )));
    };

    match state.catalog.update_role(&viewer, &MemberId(user_id), role) {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(err) => catalog_error(err),
    }
}

pub(crate) async fn admin_stats_handler<C, M>(
    State(state): State<CatalogState<C, M>>,
    headers: HeaderMap,
) -> Response
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    let viewer = match resolve_viewer(&state.catalog, &headers) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match state.catalog.admin_stats(&viewer) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => catalog_error(err),
    }
}
