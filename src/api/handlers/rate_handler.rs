//! Exchange rate handlers.

use axum::{
    extract::{Extension, Path, State},
    middleware,
    response::Json,
    routing::{get, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{auth_middleware, require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::RateResponse;
use crate::errors::AppResult;
use crate::services::RateInput;

/// Values for a currency pair
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RateRequest {
    /// Automated feed rate
    #[schema(value_type = String, example = "1600.00")]
    pub rate: Decimal,
    /// Operator override
    #[schema(value_type = Option<String>, example = "1580.00")]
    pub manual_rate: Option<Decimal>,
    /// Use the override instead of the feed rate
    #[serde(default)]
    pub use_manual: bool,
    /// Spread in percent (default 5.0 for new pairs)
    #[schema(value_type = Option<String>, example = "5.0")]
    pub spread: Option<Decimal>,
}

/// Create rate routes. Reads are public, writes need an admin token.
pub fn rate_routes(state: AppState) -> Router<AppState> {
    Router::new().route("/", get(list_rates)).route(
        "/:pair",
        get(get_rate).merge(
            put(upsert_rate)
                .route_layer(middleware::from_fn_with_state(state, auth_middleware)),
        ),
    )
}

/// List every pair
#[utoipa::path(
    get,
    path = "/rates",
    tag = "Rates",
    responses((status = 200, description = "All rates", body = Vec<RateResponse>))
)]
pub async fn list_rates(State(state): State<AppState>) -> AppResult<Json<Vec<RateResponse>>> {
    let rates = state.rate_service.list_rates().await?;
    Ok(Json(rates.into_iter().map(RateResponse::from).collect()))
}

/// Get one pair with its effective and customer rates
#[utoipa::path(
    get,
    path = "/rates/{pair}",
    tag = "Rates",
    params(("pair" = String, Path, description = "Currency pair, e.g. USD_NGN")),
    responses(
        (status = 200, description = "Rate", body = RateResponse),
        (status = 400, description = "Malformed pair"),
        (status = 404, description = "Pair not found")
    )
)]
pub async fn get_rate(
    State(state): State<AppState>,
    Path(pair): Path<String>,
) -> AppResult<Json<RateResponse>> {
    let rate = state.rate_service.get_rate(&pair).await?;
    Ok(Json(rate.into()))
}

/// Create or update a pair (admin only)
#[utoipa::path(
    put,
    path = "/rates/{pair}",
    tag = "Rates",
    security(("bearer_auth" = [])),
    params(("pair" = String, Path, description = "Currency pair, e.g. USD_NGN")),
    request_body = RateRequest,
    responses(
        (status = 200, description = "Saved rate", body = RateResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn upsert_rate(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(pair): Path<String>,
    ValidatedJson(payload): ValidatedJson<RateRequest>,
) -> AppResult<Json<RateResponse>> {
    require_admin(&current_user)?;

    let rate = state
        .rate_service
        .upsert_rate(
            &pair,
            RateInput {
                rate: payload.rate,
                manual_rate: payload.manual_rate,
                use_manual: payload.use_manual,
                spread: payload.spread,
            },
        )
        .await?;

    Ok(Json(rate.into()))
}
