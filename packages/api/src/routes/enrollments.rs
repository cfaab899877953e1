use crate::{
    checkout::enroll,
    error::ApiError,
    middleware::jwt::AppUser,
    routes::Envelope,
    state::AppState,
};
use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/free", post(enroll_free))
        .route("/{course_id}", get(check_access))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FreeEnrollmentRequest {
    pub course_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FreeEnrollmentResponse {
    pub course_id: String,
    pub payment_id: String,
}

/// POST /enrollments/free
///
/// Zero-cost enrollment: no provider is involved, the purchase row carries
/// the `FREE` sentinel. The second attempt for the same course is a 400
/// "already enrolled", never a duplicate row.
#[utoipa::path(
    post,
    path = "/enrollments/free",
    tag = "enrollments",
    request_body = FreeEnrollmentRequest,
    responses(
        (status = 200, description = "Enrolled", body = FreeEnrollmentResponse),
        (status = 400, description = "Course not free or already enrolled"),
        (status = 404, description = "Unknown course")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(name = "POST /enrollments/free", skip(state, user, request))]
pub async fn enroll_free(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(request): Json<FreeEnrollmentRequest>,
) -> Result<Json<Envelope<FreeEnrollmentResponse>>, ApiError> {
    let sub = user.sub()?;

    let purchase = enroll::enroll_free(&state, &sub, &request.course_id).await?;

    Ok(Envelope::ok(FreeEnrollmentResponse {
        course_id: purchase.course_id,
        payment_id: purchase.payment_id,
    }))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub purchased: bool,
}

/// GET /enrollments/{course_id}
///
/// The purchase-gating check the content layer calls before serving
/// course material.
#[utoipa::path(
    get,
    path = "/enrollments/{course_id}",
    tag = "enrollments",
    params(("course_id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Whether the caller owns the course", body = AccessResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(name = "GET /enrollments/{course_id}", skip(state, user))]
pub async fn check_access(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(course_id): Path<String>,
) -> Result<Json<Envelope<AccessResponse>>, ApiError> {
    let sub = user.sub()?;

    let purchased = enroll::has_purchased(&state, &sub, &course_id).await?;

    Ok(Envelope::ok(AccessResponse { purchased }))
}
