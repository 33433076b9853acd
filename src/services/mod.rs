pub mod address_service;
pub mod cart_service;
pub mod catalog_service;
pub mod order_service;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    use super::*;
    use crate::{
        dto::{
            addresses::CreateShippingAddressRequest,
            cart::{AddCartItemRequest, AttachShippingAddressRequest},
        },
        error::{AppError, AppResult},
        middleware::auth::{Session, SessionResolver},
        routes::params::Pagination,
        state::AppState,
    };

    // Any query against this pool fails with a connection error, so an
    // `Unauthorized` or `Validation` result proves nothing was queried.
    fn offline_state() -> AppState {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://nobody@127.0.0.1:1/unreachable")
            .expect("lazy pool");
        AppState::new(pool, SessionResolver::new("test-secret"))
    }

    fn is_unauthorized<T>(result: AppResult<T>) -> bool {
        matches!(result, Err(AppError::Unauthorized))
    }

    fn address_request(zip_code: &str) -> CreateShippingAddressRequest {
        CreateShippingAddressRequest {
            recipient_name: "Maria Souza".into(),
            street: "Rua das Flores".into(),
            number: "42".into(),
            complement: None,
            neighborhood: "Centro".into(),
            city: "Belo Horizonte".into(),
            state: "MG".into(),
            zip_code: zip_code.into(),
            country: "Brasil".into(),
            cpf_or_cnpj: "12345678909".into(),
            email: "maria@example.com".into(),
            phone: "31987654321".into(),
        }
    }

    #[tokio::test]
    async fn anonymous_callers_are_rejected_before_persistence() {
        let state = offline_state();
        let anon = Session::Anonymous;
        let id = Uuid::new_v4();

        assert!(is_unauthorized(cart_service::get_cart(&state, &anon).await));
        assert!(is_unauthorized(
            cart_service::add_item(
                &state,
                &anon,
                AddCartItemRequest {
                    product_variant_id: id,
                    quantity: 1,
                },
            )
            .await
        ));
        assert!(is_unauthorized(
            cart_service::remove_item(&state, &anon, id).await
        ));
        assert!(is_unauthorized(
            cart_service::decrement_item(&state, &anon, id).await
        ));
        assert!(is_unauthorized(
            cart_service::attach_shipping_address(
                &state,
                &anon,
                AttachShippingAddressRequest {
                    shipping_address_id: id,
                },
            )
            .await
        ));
        assert!(is_unauthorized(
            address_service::create_address(&state, &anon, address_request("30110012")).await
        ));
        assert!(is_unauthorized(
            address_service::list_addresses(&state, &anon).await
        ));
        assert!(is_unauthorized(
            order_service::finish_order(&state, &anon).await
        ));
        assert!(is_unauthorized(
            order_service::list_orders(
                &state,
                &anon,
                Pagination {
                    page: None,
                    per_page: None,
                },
            )
            .await
        ));
        assert!(is_unauthorized(
            order_service::get_order(&state, &anon, id).await
        ));
    }

    #[tokio::test]
    async fn anonymous_wins_over_invalid_input() {
        let state = offline_state();
        let result = cart_service::add_item(
            &state,
            &Session::Anonymous,
            AddCartItemRequest {
                product_variant_id: Uuid::new_v4(),
                quantity: 0,
            },
        )
        .await;
        assert!(is_unauthorized(result));
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_persistence() {
        let state = offline_state();
        let session = Session::user(Uuid::new_v4());

        let result = cart_service::add_item(
            &state,
            &session,
            AddCartItemRequest {
                product_variant_id: Uuid::new_v4(),
                quantity: 0,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result =
            address_service::create_address(&state, &session, address_request("123")).await;
        match result {
            Err(AppError::Validation(fields)) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "zip_code");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
