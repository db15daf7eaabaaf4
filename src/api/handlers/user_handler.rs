//! User handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{KycStatus, ProfileUpdate, UserResponse};
use crate::errors::AppResult;

/// Profile update request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    #[schema(example = "Ada")]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    #[schema(example = "Obi")]
    pub last_name: Option<String>,
    #[validate(length(min = 5, max = 32, message = "Phone must be 5-32 characters"))]
    #[schema(example = "+2348012345678")]
    pub phone: Option<String>,
    #[validate(length(equal = 2, message = "Country must be an ISO 3166 alpha-2 code"))]
    #[schema(example = "NG")]
    pub country: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            country: req.country,
        }
    }
}

/// KYC document submission
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitKycRequest {
    #[validate(url(message = "Document must be a URL"))]
    #[schema(example = "https://files.example.com/kyc/passport.jpg")]
    pub document_url: String,
}

/// KYC review outcome (admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct KycStatusRequest {
    pub status: KycStatus,
}

/// Device push token; `null` unregisters the device
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PushTokenRequest {
    #[schema(example = "ExponentPushToken[xxxxxxxxxxxxxxxxxxxxxx]")]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PresenceRequest {
    pub online: bool,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(get_current_user).put(update_current_user))
        .route("/me/kyc", put(submit_kyc))
        .route("/me/push-token", put(set_push_token))
        .route("/me/presence", put(set_presence))
        .route("/:id", get(get_user))
        .route("/:id/kyc", put(set_kyc_status))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user(current_user.id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update own profile
#[utoipa::path(
    put,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_current_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .user_service
        .update_profile(current_user.id, payload.into())
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Submit a KYC document for review
#[utoipa::path(
    put,
    path = "/users/me/kyc",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = SubmitKycRequest,
    responses(
        (status = 200, description = "KYC pending review", body = UserResponse),
        (status = 400, description = "Validation error or already verified"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn submit_kyc(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SubmitKycRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .user_service
        .submit_kyc(current_user.id, payload.document_url)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Register the device push token
#[utoipa::path(
    put,
    path = "/users/me/push-token",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = PushTokenRequest,
    responses(
        (status = 204, description = "Token saved"),
        (status = 400, description = "Malformed token"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn set_push_token(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PushTokenRequest>,
) -> AppResult<StatusCode> {
    state
        .user_service
        .set_push_token(current_user.id, payload.token)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Set the online flag
#[utoipa::path(
    put,
    path = "/users/me/presence",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = PresenceRequest,
    responses(
        (status = 204, description = "Presence saved"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn set_presence(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PresenceRequest>,
) -> AppResult<StatusCode> {
    state
        .user_service
        .set_presence(current_user.id, payload.online)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of all users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_users(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserResponse>>> {
    require_admin(&current_user)?;
    let users = state.user_service.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get user by ID (admin only)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&current_user)?;
    let user = state.user_service.get_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Record a KYC review outcome (admin only)
#[utoipa::path(
    put,
    path = "/users/{id}/kyc",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = KycStatusRequest,
    responses(
        (status = 200, description = "KYC status updated", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_kyc_status(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<KycStatusRequest>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&current_user)?;
    let user = state.user_service.set_kyc_status(id, payload.status).await?;
    Ok(Json(UserResponse::from(user)))
}
