//! Business browsing and catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use townsquare_core::{BusinessId, ProductId, ServiceId, TargetKind};

use crate::db::businesses::{BusinessFilter, BusinessRepository};
use crate::db::catalog::CatalogRepository;
use crate::db::favorites::FavoriteRepository;
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::models::{Business, Product, Service};
use crate::state::AppState;

/// Business listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Business type filter.
    #[serde(rename = "type")]
    pub business_type: Option<String>,
    /// City code filter.
    pub city: Option<String>,
    /// Name search.
    pub q: Option<String>,
    /// Page size.
    pub limit: Option<i64>,
    /// Rows to skip.
    pub offset: Option<i64>,
}

/// A business decorated with the viewer's favorite state.
#[derive(Debug, Serialize)]
pub struct BusinessDetail {
    #[serde(flatten)]
    pub business: Business,
    pub is_favorite: bool,
}

/// A product decorated with the viewer's favorite state.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub is_favorite: bool,
}

/// A service decorated with the viewer's favorite state.
#[derive(Debug, Serialize)]
pub struct ServiceDetail {
    #[serde(flatten)]
    pub service: Service,
    pub is_favorite: bool,
}

/// List businesses, filtered by type, city, and name search.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Business>>> {
    let filter = BusinessFilter {
        business_type: query.business_type,
        city_code: query.city,
        search: query.q,
        limit: query.limit,
        offset: query.offset,
    };

    let businesses = BusinessRepository::new(state.pool()).list(&filter).await?;

    Ok(Json(businesses))
}

/// Business detail.
///
/// # Errors
///
/// Returns 404 if the business doesn't exist.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    Path(id): Path<BusinessId>,
) -> Result<Json<BusinessDetail>> {
    let business = BusinessRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("business {id}")))?;

    let is_favorite = match viewer {
        Some(user) => {
            FavoriteRepository::new(state.pool())
                .contains(user.id, TargetKind::Business, id.as_i32())
                .await?
        }
        None => false,
    };

    Ok(Json(BusinessDetail {
        business,
        is_favorite,
    }))
}

/// List a business's products.
///
/// # Errors
///
/// Returns 404 if the business doesn't exist.
pub async fn products(
    State(state): State<AppState>,
    Path(id): Path<BusinessId>,
) -> Result<Json<Vec<Product>>> {
    ensure_business_exists(&state, id).await?;

    let products = CatalogRepository::new(state.pool())
        .list_products(id)
        .await?;

    Ok(Json(products))
}

/// List a business's services.
///
/// # Errors
///
/// Returns 404 if the business doesn't exist.
pub async fn services(
    State(state): State<AppState>,
    Path(id): Path<BusinessId>,
) -> Result<Json<Vec<Service>>> {
    ensure_business_exists(&state, id).await?;

    let services = CatalogRepository::new(state.pool())
        .list_services(id)
        .await?;

    Ok(Json(services))
}

/// Product detail.
///
/// # Errors
///
/// Returns 404 if the product doesn't exist.
pub async fn product(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let product = CatalogRepository::new(state.pool())
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let is_favorite = match viewer {
        Some(user) => {
            FavoriteRepository::new(state.pool())
                .contains(user.id, TargetKind::Product, id.as_i32())
                .await?
        }
        None => false,
    };

    Ok(Json(ProductDetail {
        product,
        is_favorite,
    }))
}

/// Service detail.
///
/// # Errors
///
/// Returns 404 if the service doesn't exist.
pub async fn service(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    Path(id): Path<ServiceId>,
) -> Result<Json<ServiceDetail>> {
    let service = CatalogRepository::new(state.pool())
        .get_service(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service {id}")))?;

    let is_favorite = match viewer {
        Some(user) => {
            FavoriteRepository::new(state.pool())
                .contains(user.id, TargetKind::Service, id.as_i32())
                .await?
        }
        None => false,
    };

    Ok(Json(ServiceDetail {
        service,
        is_favorite,
    }))
}

async fn ensure_business_exists(state: &AppState, id: BusinessId) -> Result<()> {
    BusinessRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("business {id}")))?;
    Ok(())
}
