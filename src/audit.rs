use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    CartItemAdd,
    CartItemRemove,
    CartItemDecrement,
    CartAddressAttach,
    AddressCreate,
    OrderPlace,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::CartItemAdd => "cart_item_add",
            AuditAction::CartItemRemove => "cart_item_remove",
            AuditAction::CartItemDecrement => "cart_item_decrement",
            AuditAction::CartAddressAttach => "cart_address_attach",
            AuditAction::AddressCreate => "address_create",
            AuditAction::OrderPlace => "order_place",
        }
    }

    pub fn resource(&self) -> &'static str {
        match self {
            AuditAction::CartItemAdd
            | AuditAction::CartItemRemove
            | AuditAction::CartItemDecrement => "cart_items",
            AuditAction::CartAddressAttach => "carts",
            AuditAction::AddressCreate => "shipping_addresses",
            AuditAction::OrderPlace => "orders",
        }
    }
}

pub async fn log_audit(
    pool: &DbPool,
    user_id: Uuid,
    action: AuditAction,
    metadata: Value,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(action.as_str())
    .bind(action.resource())
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Audit after the mutation has committed; a failed write is only logged.
pub async fn record(pool: &DbPool, user_id: Uuid, action: AuditAction, metadata: Value) {
    if let Err(err) = log_audit(pool, user_id, action, metadata).await {
        tracing::warn!(error = %err, action = action.as_str(), "audit log failed");
    }
}
