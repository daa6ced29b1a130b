use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use antiwaste_sellers::{SellerId, SellerStatus};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(register_seller).get(list_sellers))
        .route("/me", get(my_seller))
        .route("/:id", get(get_seller).put(update_seller))
}

pub async fn register_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::SellerProfileRequest>,
) -> axum::response::Response {
    let req = match body.into_register() {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let result = services
        .market
        .register_seller(principal.principal(), req)
        .await;
    errors::respond(StatusCode::CREATED, result, |s| dto::SellerView::from(s))
}

pub async fn list_sellers(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListSellersQuery>,
) -> axum::response::Response {
    let status = match query.status.as_deref().map(str::parse::<SellerStatus>).transpose() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let result = services.market.list_sellers(status).await;
    errors::respond(StatusCode::OK, result, |sellers| dto::sellers_view(sellers))
}

pub async fn my_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let result = services.market.seller_for_user(principal.user_id()).await;
    errors::respond(StatusCode::OK, result, |s| dto::SellerView::from(s))
}

pub async fn get_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<SellerId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let result = services.market.get_seller(id).await;
    errors::respond(StatusCode::OK, result, |s| dto::SellerView::from(s))
}

pub async fn update_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SellerProfileRequest>,
) -> axum::response::Response {
    let id = match errors::parse_id::<SellerId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let req = match body.into_update() {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let result = services
        .market
        .update_seller(principal.principal(), id, req)
        .await;
    errors::respond(StatusCode::OK, result, |s| dto::SellerView::from(s))
}
