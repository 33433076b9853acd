use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{CategoryList, ProductList, ProductWithVariants},
    entity::{
        categories::{Column as CategoryCol, Entity as Categories},
        product_variants::{Column as VariantCol, Entity as ProductVariants},
        products::{self, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    models::{Category, ProductVariant},
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    state::AppState,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items: Vec<Category> = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();

    let meta = Meta::whole(items.len());
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(meta),
    ))
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Products::find();
    if let Some(slug) = query.category.as_ref().filter(|s| !s.is_empty()) {
        let category = Categories::find()
            .filter(CategoryCol::Slug.eq(slug.as_str()))
            .one(&state.orm)
            .await?;
        let Some(category) = category else {
            let meta = Meta::new(page, limit, 0);
            return Ok(ApiResponse::success(
                "Products",
                ProductList { items: Vec::new() },
                Some(meta),
            ));
        };
        finder = finder.filter(ProdCol::CategoryId.eq(category.id));
    }
    let finder = finder
        .order_by_desc(ProdCol::CreatedAt)
        .order_by_asc(ProdCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let products = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = with_variants(state, products).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<ProductWithVariants>> {
    let product = Products::find()
        .filter(ProdCol::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    let mut items = with_variants(state, vec![product]).await?;
    let product = items.pop().ok_or(AppError::NotFound("Product"))?;
    Ok(ApiResponse::success("Product", product, Some(Meta::empty())))
}

/// Attach each product's variants, cheapest first, with one extra query.
async fn with_variants(
    state: &AppState,
    products: Vec<products::Model>,
) -> AppResult<Vec<ProductWithVariants>> {
    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let mut by_product: HashMap<Uuid, Vec<ProductVariant>> = HashMap::new();
    if !ids.is_empty() {
        let variants = ProductVariants::find()
            .filter(VariantCol::ProductId.is_in(ids))
            .order_by_asc(VariantCol::PriceInCents)
            .order_by_asc(VariantCol::Name)
            .all(&state.orm)
            .await?;
        for variant in variants {
            by_product
                .entry(variant.product_id)
                .or_default()
                .push(variant.into());
        }
    }

    Ok(products
        .into_iter()
        .map(|product| ProductWithVariants {
            variants: by_product.remove(&product.id).unwrap_or_default(),
            product: product.into(),
        })
        .collect())
}
