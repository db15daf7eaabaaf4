//! OpenAPI documentation configuration.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, rate_handler, transaction_handler, user_handler};
use crate::domain::{KycStatus, RateResponse, TransactionResponse, UserResponse, VendorQueueEntry};
use crate::services::TokenResponse;
use crate::types::{MessageResponse, PaginatedTransactions, PaginationMeta};

/// OpenAPI documentation for the remittance API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Remittance API",
        version = "0.1.0",
        description = "Money transfers, exchange rates and account management"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::verify_email,
        auth_handler::forgot_password,
        auth_handler::reset_password,
        user_handler::get_current_user,
        user_handler::update_current_user,
        user_handler::submit_kyc,
        user_handler::set_push_token,
        user_handler::set_presence,
        user_handler::list_users,
        user_handler::get_user,
        user_handler::set_kyc_status,
        transaction_handler::create_transaction,
        transaction_handler::list_transactions,
        transaction_handler::get_transaction,
        transaction_handler::update_status,
        transaction_handler::attach_proof,
        transaction_handler::vendor_queue,
        rate_handler::list_rates,
        rate_handler::get_rate,
        rate_handler::upsert_rate,
    ),
    components(
        schemas(
            KycStatus,
            UserResponse,
            TransactionResponse,
            VendorQueueEntry,
            RateResponse,
            TokenResponse,
            MessageResponse,
            PaginatedTransactions,
            PaginationMeta,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::VerifyEmailRequest,
            auth_handler::ForgotPasswordRequest,
            auth_handler::ResetPasswordRequest,
            user_handler::UpdateProfileRequest,
            user_handler::SubmitKycRequest,
            user_handler::KycStatusRequest,
            user_handler::PushTokenRequest,
            user_handler::PresenceRequest,
            transaction_handler::CreateTransactionRequest,
            transaction_handler::UpdateStatusRequest,
            transaction_handler::ProofRequest,
            rate_handler::RateRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and account tokens"),
        (name = "Users", description = "Profiles, KYC and devices"),
        (name = "Transactions", description = "Money transfers"),
        (name = "Rates", description = "Exchange rates")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
