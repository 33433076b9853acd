use std::collections::HashMap;

use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, record},
    dto::cart::{
        AddCartItemRequest, AttachShippingAddressRequest, CartLine, CartView, DecrementedItem,
        line_limit_error,
    },
    entity::{
        cart_items::{
            self, ActiveModel as CartItemActive, Column as CartItemCol, Entity as CartItems,
        },
        carts::{self, ActiveModel as CartActive, Column as CartCol, Entity as Carts},
        product_variants::Entity as ProductVariants,
        products::{Column as ProdCol, Entity as Products},
        shipping_addresses::{Column as AddressCol, Entity as ShippingAddresses},
    },
    error::{AppError, AppResult, is_check_violation},
    middleware::auth::Session,
    models::{Cart, CartItem},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_cart(state: &AppState, session: &Session) -> AppResult<ApiResponse<CartView>> {
    let user_id = session.user_id()?;

    let cart = Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .one(&state.orm)
        .await?;
    let Some(cart) = cart else {
        return Ok(ApiResponse::success("OK", CartView::empty(), Some(Meta::empty())));
    };

    let rows = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .order_by_asc(CartItemCol::CreatedAt)
        .find_also_related(ProductVariants)
        .all(&state.orm)
        .await?;

    let product_ids: Vec<Uuid> = rows
        .iter()
        .filter_map(|(_, variant)| variant.as_ref().map(|v| v.product_id))
        .collect();
    let product_names: HashMap<Uuid, String> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|product| (product.id, product.name))
        .collect();

    let items = rows
        .into_iter()
        .filter_map(|(item, variant)| {
            let variant = variant?;
            let product_name = product_names
                .get(&variant.product_id)
                .cloned()
                .unwrap_or_default();
            Some(CartLine::new(
                item.id,
                item.quantity,
                product_name,
                variant.into(),
            ))
        })
        .collect();

    let view = CartView::new(cart.id, cart.shipping_address_id, items);
    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}

pub async fn add_item(
    state: &AppState,
    session: &Session,
    payload: AddCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    let user_id = session.user_id()?;
    payload.validate().map_err(AppError::Validation)?;

    let variant = ProductVariants::find_by_id(payload.product_variant_id)
        .one(&state.orm)
        .await?;
    if variant.is_none() {
        return Err(AppError::NotFound("ProductVariant"));
    }

    let txn = state.orm.begin().await?;
    let cart = upsert_cart(&txn, user_id).await?;

    // Concurrent adds of the same variant collapse onto one row.
    let item = CartItems::insert(CartItemActive {
        id: Set(Uuid::new_v4()),
        cart_id: Set(cart.id),
        product_variant_id: Set(payload.product_variant_id),
        quantity: Set(payload.quantity),
        created_at: NotSet,
    })
    .on_conflict(
        OnConflict::columns([CartItemCol::CartId, CartItemCol::ProductVariantId])
            .value(
                CartItemCol::Quantity,
                Expr::col((CartItems, CartItemCol::Quantity))
                    .add(Expr::cust("excluded.quantity")),
            )
            .to_owned(),
    )
    .exec_with_returning(&txn)
    .await
    .map_err(|err| {
        if is_check_violation(&err) {
            AppError::Validation(vec![line_limit_error()])
        } else {
            err.into()
        }
    })?;

    txn.commit().await?;

    tracing::debug!(
        cart_id = %cart.id,
        cart_item_id = %item.id,
        quantity = item.quantity,
        "cart item added"
    );
    record(
        &state.pool,
        user_id,
        AuditAction::CartItemAdd,
        serde_json::json!({
            "product_variant_id": payload.product_variant_id,
            "quantity": payload.quantity,
        }),
    )
    .await;

    Ok(ApiResponse::success("Added to cart", item.into(), None))
}

pub async fn remove_item(
    state: &AppState,
    session: &Session,
    cart_item_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let user_id = session.user_id()?;

    let item = find_owned_item(&state.orm, user_id, cart_item_id, false).await?;

    let result = CartItems::delete_by_id(item.id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("CartItem"));
    }

    record(
        &state.pool,
        user_id,
        AuditAction::CartItemRemove,
        serde_json::json!({ "cart_item_id": cart_item_id }),
    )
    .await;

    Ok(ApiResponse::done("Removed from cart"))
}

pub async fn decrement_item(
    state: &AppState,
    session: &Session,
    cart_item_id: Uuid,
) -> AppResult<ApiResponse<DecrementedItem>> {
    let user_id = session.user_id()?;

    let txn = state.orm.begin().await?;
    let item = find_owned_item(&txn, user_id, cart_item_id, true).await?;

    let remaining = if item.quantity <= 1 {
        CartItems::delete_by_id(item.id).exec(&txn).await?;
        None
    } else {
        let quantity = item.quantity - 1;
        let mut active: CartItemActive = item.into();
        active.quantity = Set(quantity);
        Some(active.update(&txn).await?)
    };

    txn.commit().await?;

    record(
        &state.pool,
        user_id,
        AuditAction::CartItemDecrement,
        serde_json::json!({
            "cart_item_id": cart_item_id,
            "quantity": remaining.as_ref().map_or(0, |item| item.quantity),
        }),
    )
    .await;

    let message = if remaining.is_some() {
        "Quantity decreased"
    } else {
        "Removed from cart"
    };
    Ok(ApiResponse::success(
        message,
        DecrementedItem {
            item: remaining.map(CartItem::from),
        },
        None,
    ))
}

pub async fn attach_shipping_address(
    state: &AppState,
    session: &Session,
    payload: AttachShippingAddressRequest,
) -> AppResult<ApiResponse<Cart>> {
    let user_id = session.user_id()?;

    let cart = Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Cart"))?;

    // Another user's address is reported exactly like a missing one.
    let address = ShippingAddresses::find()
        .filter(AddressCol::Id.eq(payload.shipping_address_id))
        .filter(AddressCol::UserId.eq(user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("ShippingAddress"))?;

    let mut active: CartActive = cart.into();
    active.shipping_address_id = Set(Some(address.id));
    let cart = active.update(&state.orm).await?;

    record(
        &state.pool,
        user_id,
        AuditAction::CartAddressAttach,
        serde_json::json!({ "cart_id": cart.id, "shipping_address_id": address.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Shipping address selected",
        cart.into(),
        None,
    ))
}

/// Insert-if-absent keyed on `user_id`; always returns the caller's single cart.
async fn upsert_cart<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<carts::Model> {
    let cart = Carts::insert(CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        shipping_address_id: NotSet,
        created_at: NotSet,
    })
    .on_conflict(
        OnConflict::column(CartCol::UserId)
            .update_column(CartCol::UserId)
            .to_owned(),
    )
    .exec_with_returning(db)
    .await
    .map_err(AppError::from_user_write)?;
    Ok(cart)
}

async fn find_owned_item<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    cart_item_id: Uuid,
    for_update: bool,
) -> AppResult<cart_items::Model> {
    let mut finder = CartItems::find_by_id(cart_item_id);
    if for_update {
        finder = finder.lock(LockType::Update);
    }
    let item = finder
        .one(db)
        .await?
        .ok_or(AppError::NotFound("CartItem"))?;

    let cart = Carts::find_by_id(item.cart_id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("Cart"))?;
    if cart.user_id != user_id {
        return Err(AppError::Unauthorized);
    }

    Ok(item)
}
