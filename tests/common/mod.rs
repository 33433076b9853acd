#![allow(dead_code)]

use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use storefront_api::{
    db::{create_pool, run_migrations},
    dto::addresses::CreateShippingAddressRequest,
    entity::{
        categories::ActiveModel as CategoryActive,
        product_variants::{ActiveModel as VariantActive, Model as VariantModel},
        products::ActiveModel as ProductActive,
        users::ActiveModel as UserActive,
    },
    middleware::auth::{Session, SessionResolver},
    state::AppState,
};
use uuid::Uuid;

/// Connects to the test database, or returns `None` so the caller can skip.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    Ok(Some(AppState::new(
        pool,
        SessionResolver::new("integration-test-secret"),
    )))
}

/// Every test works on its own user, so tests never see each other's rows.
pub async fn create_user(state: &AppState) -> anyhow::Result<Session> {
    let id = Uuid::new_v4();
    UserActive {
        id: Set(id),
        name: Set("Test User".into()),
        email: Set(format!("{id}@example.com")),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(Session::user(id))
}

pub async fn create_variant(state: &AppState, price_in_cents: i32) -> anyhow::Result<VariantModel> {
    let suffix = Uuid::new_v4().simple().to_string();

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set("Camisetas".into()),
        slug: Set(format!("camisetas-{suffix}")),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(category.id),
        name: Set("Camiseta Básica".into()),
        slug: Set(format!("camiseta-basica-{suffix}")),
        description: Set("Camiseta de algodão".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let variant = VariantActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        name: Set("Preta".into()),
        slug: Set(format!("camiseta-basica-preta-{suffix}")),
        color: Set("black".into()),
        price_in_cents: Set(price_in_cents),
        image_url: Set("https://cdn.example.com/tee.png".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(variant)
}

pub fn address_request(recipient_name: &str) -> CreateShippingAddressRequest {
    CreateShippingAddressRequest {
        recipient_name: recipient_name.into(),
        street: "Rua das Flores".into(),
        number: "42".into(),
        complement: Some("Apto 7".into()),
        neighborhood: "Centro".into(),
        city: "Belo Horizonte".into(),
        state: "MG".into(),
        zip_code: "30110-012".into(),
        country: "Brasil".into(),
        cpf_or_cnpj: "12345678909".into(),
        email: "maria@example.com".into(),
        phone: "31987654321".into(),
    }
}
