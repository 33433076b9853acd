use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::addresses::{CreateShippingAddressRequest, ShippingAddressList},
    error::AppResult,
    middleware::auth::Session,
    models::ShippingAddress,
    response::ApiResponse,
    services::address_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_shipping_addresses).post(create_shipping_address))
}

#[utoipa::path(
    get,
    path = "/api/shipping-addresses",
    responses(
        (status = 200, description = "Addresses of the current user, newest first", body = ApiResponse<ShippingAddressList>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping Addresses"
)]
pub async fn list_shipping_addresses(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<ShippingAddressList>>> {
    Ok(Json(address_service::list_addresses(&state, &session).await?))
}

#[utoipa::path(
    post,
    path = "/api/shipping-addresses",
    request_body = CreateShippingAddressRequest,
    responses(
        (status = 200, description = "Shipping address created", body = ApiResponse<ShippingAddress>),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "One or more fields are invalid"),
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping Addresses"
)]
pub async fn create_shipping_address(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateShippingAddressRequest>,
) -> AppResult<Json<ApiResponse<ShippingAddress>>> {
    Ok(Json(
        address_service::create_address(&state, &session, payload).await?,
    ))
}
