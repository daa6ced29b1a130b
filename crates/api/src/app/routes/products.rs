use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use antiwaste_infra::CreateProductRequest;
use antiwaste_products::ProductId;
use antiwaste_sellers::SellerId;

use crate::app::routes::common::resolve_seller;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product).patch(update_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateProductBody>,
) -> axum::response::Response {
    let seller_id = match resolve_seller(&services, &principal, body.seller_id.as_deref()).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let req = CreateProductRequest {
        seller_id,
        product: body.product.into(),
    };

    let result = services
        .market
        .create_product(principal.principal(), req)
        .await;
    errors::respond(StatusCode::CREATED, result, |p| dto::ProductView::from(p))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListProductsQuery>,
) -> axum::response::Response {
    let seller_id = match query.seller_id.as_deref().map(errors::parse_id::<SellerId>).transpose() {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let result = services.market.list_products(seller_id).await;
    errors::respond(StatusCode::OK, result, |products| dto::products_view(products))
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<ProductId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let result = services.market.get_product(id).await;
    errors::respond(StatusCode::OK, result, |p| dto::ProductView::from(p))
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ProductFields>,
) -> axum::response::Response {
    let id = match errors::parse_id::<ProductId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let patch = match body.into_patch() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let result = services
        .market
        .update_product(principal.principal(), id, patch)
        .await;
    errors::respond(StatusCode::OK, result, |p| dto::ProductView::from(p))
}
