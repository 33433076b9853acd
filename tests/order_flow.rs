mod common;

use storefront_api::{
    dto::cart::{AddCartItemRequest, AttachShippingAddressRequest},
    error::AppError,
    routes::params::Pagination,
    services::{address_service, cart_service, order_service},
};

// add to cart -> pick address -> finish order -> cart is gone, order keeps a snapshot
#[tokio::test]
async fn finishing_an_order_snapshots_the_cart() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let session = common::create_user(&state).await?;
    let other = common::create_user(&state).await?;
    let tee = common::create_variant(&state, 7_990).await?;
    let cap = common::create_variant(&state, 5_990).await?;

    for (variant_id, quantity) in [(tee.id, 2), (cap.id, 1)] {
        cart_service::add_item(
            &state,
            &session,
            AddCartItemRequest {
                product_variant_id: variant_id,
                quantity,
            },
        )
        .await?;
    }

    // no address yet
    let result = order_service::finish_order(&state, &session).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let address =
        address_service::create_address(&state, &session, common::address_request("Maria Souza"))
            .await?
            .data
            .expect("address");
    cart_service::attach_shipping_address(
        &state,
        &session,
        AttachShippingAddressRequest {
            shipping_address_id: address.id,
        },
    )
    .await?;

    let placed = order_service::finish_order(&state, &session)
        .await?
        .data
        .expect("order");
    assert_eq!(placed.order.total_price_in_cents, 2 * 7_990 + 5_990);
    assert_eq!(placed.order.status, order_service::ORDER_STATUS_PENDING);
    assert_eq!(placed.order.recipient_name, "Maria Souza");
    assert_eq!(placed.order.zip_code, address.zip_code);
    assert_eq!(placed.order.shipping_address_id, Some(address.id));
    assert_eq!(placed.items.len(), 2);
    assert!(placed.items.iter().any(|item| {
        item.product_variant_id == tee.id && item.quantity == 2 && item.price_in_cents == 7_990
    }));

    let cart = cart_service::get_cart(&state, &session)
        .await?
        .data
        .expect("cart");
    assert!(cart.id.is_none());

    let again = order_service::finish_order(&state, &session).await;
    assert!(matches!(again, Err(AppError::NotFound("Cart"))));

    let listed = order_service::list_orders(
        &state,
        &session,
        Pagination {
            page: Some(1),
            per_page: Some(20),
        },
    )
    .await?;
    let orders = listed.data.expect("orders").items;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, placed.order.id);

    let fetched = order_service::get_order(&state, &session, placed.order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(fetched.items.len(), 2);

    let foreign = order_service::get_order(&state, &other, placed.order.id).await;
    assert!(matches!(foreign, Err(AppError::NotFound("Order"))));

    Ok(())
}

#[tokio::test]
async fn empty_cart_cannot_be_ordered() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let session = common::create_user(&state).await?;
    let variant = common::create_variant(&state, 1_000).await?;

    let item = cart_service::add_item(
        &state,
        &session,
        AddCartItemRequest {
            product_variant_id: variant.id,
            quantity: 1,
        },
    )
    .await?
    .data
    .expect("item");
    cart_service::remove_item(&state, &session, item.id).await?;

    let result = order_service::finish_order(&state, &session).await;
    match result {
        Err(AppError::BadRequest(message)) => assert_eq!(message, "cart is empty"),
        other => panic!("expected bad request, got {other:?}"),
    }

    Ok(())
}
