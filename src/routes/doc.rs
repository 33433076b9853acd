use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        addresses::{CreateShippingAddressRequest, ShippingAddressList},
        cart::{
            AddCartItemRequest, AttachShippingAddressRequest, CartLine, CartView, DecrementedItem,
        },
        catalog::{CategoryList, ProductList, ProductWithVariants},
        orders::{OrderList, OrderWithItems},
    },
    error::FieldError,
    models::{Cart, CartItem, Category, Order, OrderItem, Product, ProductVariant, ShippingAddress},
    response::{ApiResponse, Meta},
    routes::{addresses, cart, catalog, health, orders, params},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Session token issued by the identity service"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        catalog::list_categories,
        catalog::list_products,
        catalog::get_product,
        cart::get_cart,
        cart::add_cart_item,
        cart::remove_cart_item,
        cart::decrement_cart_item,
        cart::attach_shipping_address,
        addresses::list_shipping_addresses,
        addresses::create_shipping_address,
        orders::finish_order,
        orders::list_orders,
        orders::get_order
    ),
    components(
        schemas(
            Category,
            Product,
            ProductVariant,
            Cart,
            CartItem,
            ShippingAddress,
            Order,
            OrderItem,
            AddCartItemRequest,
            AttachShippingAddressRequest,
            CartLine,
            CartView,
            DecrementedItem,
            CreateShippingAddressRequest,
            ShippingAddressList,
            CategoryList,
            ProductList,
            ProductWithVariants,
            OrderList,
            OrderWithItems,
            FieldError,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<CartView>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Catalog", description = "Public product catalog"),
        (name = "Cart", description = "Cart of the signed-in user"),
        (name = "Shipping Addresses", description = "Shipping addresses of the signed-in user"),
        (name = "Orders", description = "Orders of the signed-in user"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
