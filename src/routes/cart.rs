use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddCartItemRequest, AttachShippingAddressRequest, CartView, DecrementedItem},
    error::AppResult,
    middleware::auth::Session,
    models::{Cart, CartItem},
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart))
        .route("/items", post(add_cart_item))
        .route("/items/{cart_item_id}", delete(remove_cart_item))
        .route("/items/{cart_item_id}/decrement", post(decrement_cart_item))
        .route("/shipping-address", put(attach_shipping_address))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Current user's cart with line totals", body = ApiResponse<CartView>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::get_cart(&state, &session).await?))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Item added, or quantity increased", body = ApiResponse<CartItem>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product variant not found"),
        (status = 422, description = "Invalid quantity"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_cart_item(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AddCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    Ok(Json(cart_service::add_item(&state, &session, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{cart_item_id}",
    params(
        ("cart_item_id" = Uuid, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "Removed from cart", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_cart_item(
    State(state): State<AppState>,
    session: Session,
    Path(cart_item_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        cart_service::remove_item(&state, &session, cart_item_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/cart/items/{cart_item_id}/decrement",
    params(
        ("cart_item_id" = Uuid, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "Quantity decreased; data is null once the line is removed", body = ApiResponse<DecrementedItem>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn decrement_cart_item(
    State(state): State<AppState>,
    session: Session,
    Path(cart_item_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DecrementedItem>>> {
    Ok(Json(
        cart_service::decrement_item(&state, &session, cart_item_id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/cart/shipping-address",
    request_body = AttachShippingAddressRequest,
    responses(
        (status = 200, description = "Shipping address selected", body = ApiResponse<Cart>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Cart or shipping address not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn attach_shipping_address(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AttachShippingAddressRequest>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    Ok(Json(
        cart_service::attach_shipping_address(&state, &session, payload).await?,
    ))
}
