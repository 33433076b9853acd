use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, record},
    dto::addresses::{CreateShippingAddressRequest, ShippingAddressList},
    entity::shipping_addresses::{ActiveModel, Column, Entity as ShippingAddresses},
    error::{AppError, AppResult},
    middleware::auth::Session,
    models::ShippingAddress,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn create_address(
    state: &AppState,
    session: &Session,
    payload: CreateShippingAddressRequest,
) -> AppResult<ApiResponse<ShippingAddress>> {
    let user_id = session.user_id()?;
    let fields = payload.validate().map_err(AppError::Validation)?;

    let address = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        recipient_name: Set(fields.recipient_name),
        street: Set(fields.street),
        number: Set(fields.number),
        complement: Set(fields.complement),
        neighborhood: Set(fields.neighborhood),
        city: Set(fields.city),
        state: Set(fields.state),
        zip_code: Set(fields.zip_code),
        country: Set(fields.country),
        cpf_or_cnpj: Set(fields.cpf_or_cnpj),
        email: Set(fields.email),
        phone: Set(fields.phone),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(AppError::from_user_write)?;

    record(
        &state.pool,
        user_id,
        AuditAction::AddressCreate,
        serde_json::json!({ "shipping_address_id": address.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Shipping address created",
        address.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_addresses(
    state: &AppState,
    session: &Session,
) -> AppResult<ApiResponse<ShippingAddressList>> {
    let user_id = session.user_id()?;

    let items: Vec<ShippingAddress> = ShippingAddresses::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ShippingAddress::from)
        .collect();

    let meta = Meta::whole(items.len());
    Ok(ApiResponse::success(
        "OK",
        ShippingAddressList { items },
        Some(meta),
    ))
}
