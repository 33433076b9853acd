use chrono::Duration;
use storefront_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    middleware::auth::SessionResolver,
};
use uuid::Uuid;

struct SeedVariant {
    name: &'static str,
    color: &'static str,
    price_in_cents: i32,
}

struct SeedProduct {
    category: &'static str,
    name: &'static str,
    description: &'static str,
    variants: &'static [SeedVariant],
}

const CATEGORIES: &[(&str, &str)] = &[
    ("Camisetas", "camisetas"),
    ("Bermuda & Shorts", "bermuda-shorts"),
    ("Acessórios", "acessorios"),
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        category: "camisetas",
        name: "Camiseta Básica",
        description: "Camiseta de algodão com corte reto.",
        variants: &[
            SeedVariant {
                name: "Preta",
                color: "black",
                price_in_cents: 7_990,
            },
            SeedVariant {
                name: "Branca",
                color: "white",
                price_in_cents: 7_990,
            },
        ],
    },
    SeedProduct {
        category: "bermuda-shorts",
        name: "Bermuda Sarja",
        description: "Bermuda de sarja com elastano.",
        variants: &[
            SeedVariant {
                name: "Bege",
                color: "beige",
                price_in_cents: 12_990,
            },
            SeedVariant {
                name: "Azul",
                color: "blue",
                price_in_cents: 12_990,
            },
        ],
    },
    SeedProduct {
        category: "acessorios",
        name: "Boné Aba Curva",
        description: "Boné ajustável de aba curva.",
        variants: &[SeedVariant {
            name: "Verde",
            color: "green",
            price_in_cents: 5_990,
        }],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let user_id = ensure_user(&pool, "Demo User", "demo@example.com").await?;
    seed_catalog(&pool).await?;

    let token = SessionResolver::new(&config.session_secret).issue(user_id, Duration::days(7))?;
    println!("Seed completed. User ID: {user_id}");
    println!("Session token (7 days): {token}");
    Ok(())
}

async fn ensure_user(pool: &DbPool, name: &str, email: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email}");
    Ok(id)
}

async fn seed_catalog(pool: &DbPool) -> anyhow::Result<()> {
    for &(name, slug) in CATEGORIES {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .execute(pool)
        .await?;
    }

    for product in PRODUCTS {
        let (category_id,): (Uuid,) = sqlx::query_as("SELECT id FROM categories WHERE slug = $1")
            .bind(product.category)
            .fetch_one(pool)
            .await?;

        let product_slug = slugify(product.name);
        let (product_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO products (id, category_id, name, slug, description)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (slug) DO UPDATE SET description = EXCLUDED.description
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(category_id)
        .bind(product.name)
        .bind(&product_slug)
        .bind(product.description)
        .fetch_one(pool)
        .await?;

        for variant in product.variants {
            let variant_slug = format!("{product_slug}-{}", slugify(variant.name));
            sqlx::query(
                r#"
                INSERT INTO product_variants (id, product_id, name, slug, color, price_in_cents, image_url)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (slug) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(product_id)
            .bind(variant.name)
            .bind(&variant_slug)
            .bind(variant.color)
            .bind(variant.price_in_cents)
            .bind(format!("https://cdn.example.com/products/{variant_slug}.png"))
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded catalog");
    Ok(())
}

fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.to_lowercase().chars() {
        let c = match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            c => c,
        };
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}
