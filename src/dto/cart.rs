use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::FieldError,
    models::{CartItem, ProductVariant},
};

/// Upper bound for a single cart line; mirrored by a `CHECK` on `cart_items`.
pub const MAX_LINE_QUANTITY: i32 = 999;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_variant_id: Uuid,
    pub quantity: i32,
}

impl AddCartItemRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        if self.quantity < 1 {
            return Err(vec![FieldError::new(
                "quantity",
                "quantity must be at least 1",
            )]);
        }
        if self.quantity > MAX_LINE_QUANTITY {
            return Err(vec![line_limit_error()]);
        }
        Ok(())
    }
}

pub fn line_limit_error() -> FieldError {
    FieldError::new(
        "quantity",
        format!("a cart line holds at most {MAX_LINE_QUANTITY} units"),
    )
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttachShippingAddressRequest {
    pub shipping_address_id: Uuid,
}

/// Result of a decrement: the remaining line, or `None` once it was removed.
#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct DecrementedItem {
    #[schema(value_type = Option<CartItem>)]
    pub item: Option<CartItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub quantity: i32,
    pub product_name: String,
    pub variant: ProductVariant,
    pub line_total_in_cents: i64,
}

impl CartLine {
    pub fn new(id: Uuid, quantity: i32, product_name: String, variant: ProductVariant) -> Self {
        let line_total_in_cents = line_total(variant.price_in_cents, quantity);
        Self {
            id,
            quantity,
            product_name,
            variant,
            line_total_in_cents,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    /// `None` until the first item is added.
    pub id: Option<Uuid>,
    pub shipping_address_id: Option<Uuid>,
    pub items: Vec<CartLine>,
    pub total_in_cents: i64,
}

impl CartView {
    pub fn empty() -> Self {
        Self {
            id: None,
            shipping_address_id: None,
            items: Vec::new(),
            total_in_cents: 0,
        }
    }

    pub fn new(id: Uuid, shipping_address_id: Option<Uuid>, items: Vec<CartLine>) -> Self {
        let total_in_cents = items.iter().map(|line| line.line_total_in_cents).sum();
        Self {
            id: Some(id),
            shipping_address_id,
            items,
            total_in_cents,
        }
    }
}

pub fn line_total(price_in_cents: i32, quantity: i32) -> i64 {
    i64::from(price_in_cents) * i64::from(quantity)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn variant(price_in_cents: i32) -> ProductVariant {
        ProductVariant {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            name: "Oversized tee".into(),
            slug: "oversized-tee-black".into(),
            color: "black".into(),
            price_in_cents,
            image_url: "https://cdn.example.com/tee.png".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let request = AddCartItemRequest {
            product_variant_id: Uuid::new_v4(),
            quantity: 0,
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(errors[0].field, "quantity");
    }

    #[test]
    fn quantity_above_line_limit_is_rejected() {
        let request = AddCartItemRequest {
            product_variant_id: Uuid::new_v4(),
            quantity: MAX_LINE_QUANTITY + 1,
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(errors, vec![line_limit_error()]);

        let request = AddCartItemRequest {
            product_variant_id: Uuid::new_v4(),
            quantity: i32::MAX,
        };
        assert!(request.validate().is_err());

        let request = AddCartItemRequest {
            product_variant_id: Uuid::new_v4(),
            quantity: MAX_LINE_QUANTITY,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn positive_quantity_is_accepted() {
        let request = AddCartItemRequest {
            product_variant_id: Uuid::new_v4(),
            quantity: 1,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn cart_total_sums_line_totals() {
        let lines = vec![
            CartLine::new(Uuid::new_v4(), 2, "Tee".into(), variant(4_990)),
            CartLine::new(Uuid::new_v4(), 3, "Cap".into(), variant(1_500)),
        ];
        let cart = CartView::new(Uuid::new_v4(), None, lines);
        assert_eq!(cart.items[0].line_total_in_cents, 9_980);
        assert_eq!(cart.total_in_cents, 9_980 + 4_500);
    }

    #[test]
    fn line_total_does_not_overflow_i32() {
        assert_eq!(line_total(i32::MAX, 2), i64::from(i32::MAX) * 2);
    }

    #[test]
    fn empty_cart_has_no_id() {
        let cart = CartView::empty();
        assert!(cart.id.is_none());
        assert_eq!(cart.total_in_cents, 0);
    }
}
