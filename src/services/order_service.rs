use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, record},
    dto::{
        cart::line_total,
        orders::{OrderList, OrderWithItems},
    },
    entity::{
        cart_items::{Column as CartItemCol, Entity as CartItems},
        carts::{Column as CartCol, Entity as Carts},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        product_variants::Entity as ProductVariants,
        shipping_addresses::{Column as AddressCol, Entity as ShippingAddresses},
    },
    error::{AppError, AppResult},
    middleware::auth::Session,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub const ORDER_STATUS_PENDING: &str = "pending";

/// Turn the caller's cart into an order. Prices and the shipping address are
/// copied onto the order; the cart is deleted.
pub async fn finish_order(
    state: &AppState,
    session: &Session,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let user_id = session.user_id()?;

    let txn = state.orm.begin().await?;

    let cart = Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("Cart"))?;

    let rows = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .order_by_asc(CartItemCol::CreatedAt)
        .find_also_related(ProductVariants)
        .all(&txn)
        .await?;
    if rows.is_empty() {
        return Err(AppError::BadRequest("cart is empty".into()));
    }

    let address_id = cart
        .shipping_address_id
        .ok_or_else(|| AppError::BadRequest("shipping address not selected".into()))?;
    let address = ShippingAddresses::find()
        .filter(AddressCol::Id.eq(address_id))
        .filter(AddressCol::UserId.eq(user_id))
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("ShippingAddress"))?;

    let mut lines = Vec::with_capacity(rows.len());
    for (item, variant) in rows {
        let variant = variant.ok_or(AppError::NotFound("ProductVariant"))?;
        lines.push((item, variant.price_in_cents));
    }
    let total_price_in_cents: i64 = lines
        .iter()
        .map(|(item, price)| line_total(*price, item.quantity))
        .sum();

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        shipping_address_id: Set(Some(address.id)),
        recipient_name: Set(address.recipient_name),
        street: Set(address.street),
        number: Set(address.number),
        complement: Set(address.complement),
        neighborhood: Set(address.neighborhood),
        city: Set(address.city),
        state: Set(address.state),
        zip_code: Set(address.zip_code),
        country: Set(address.country),
        cpf_or_cnpj: Set(address.cpf_or_cnpj),
        email: Set(address.email),
        phone: Set(address.phone),
        total_price_in_cents: Set(total_price_in_cents),
        status: Set(ORDER_STATUS_PENDING.into()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (item, price_in_cents) in lines {
        let order_item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_variant_id: Set(item.product_variant_id),
            quantity: Set(item.quantity),
            price_in_cents: Set(price_in_cents),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(OrderItem::from(order_item));
    }

    // cart_items go with it
    Carts::delete_by_id(cart.id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        total_price_in_cents,
        items = items.len(),
        "order placed"
    );
    record(
        &state.pool,
        user_id,
        AuditAction::OrderPlace,
        serde_json::json!({ "order_id": order.id, "total_price_in_cents": total_price_in_cents }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: order.into(),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    session: &Session,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let user_id = session.user_id()?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Orders::find()
        .filter(OrderCol::UserId.eq(user_id))
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", OrderList { items }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    session: &Session,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let user_id = session.user_id()?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Order"))?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order.into(),
            items,
        },
        Some(Meta::empty()),
    ))
}
