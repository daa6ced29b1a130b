use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use antiwaste_infra::{CreateOfferRequest, ProductRef};
use antiwaste_offers::OfferId;
use antiwaste_products::ProductId;
use antiwaste_sellers::SellerId;

use crate::app::routes::common::resolve_seller;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_offer).get(list_offers))
        .route("/:id", get(get_offer).put(update_offer))
        .route("/:id/submit", post(submit_offer))
        .route("/:id/cancel", post(cancel_offer))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListOffersQuery {
    /// When set, every offer of that seller regardless of status.
    pub seller_id: Option<String>,
}

pub async fn create_offer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateOfferBody>,
) -> axum::response::Response {
    let seller_id = match resolve_seller(&services, &principal, body.seller_id.as_deref()).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let product = match (body.product_id.as_deref(), body.product) {
        (Some(raw), _) => match errors::parse_id::<ProductId>(raw) {
            Ok(id) => ProductRef::Existing(id),
            Err(resp) => return resp,
        },
        (None, inline) => ProductRef::Inline(inline.unwrap_or_default().into()),
    };

    let req = CreateOfferRequest {
        seller_id,
        product,
        title: body.title,
        description: body.description,
        price: body.price.map(Into::into),
        original_price: body.original_price.map(Into::into),
        start_date: body.start_date,
        end_date: body.end_date,
        expiration_date: body.expiration_date,
    };

    let created = match services.market.create_offer(principal.principal(), req).await {
        Ok(id) => id,
        Err(e) => return errors::lifecycle_error_to_response(e),
    };

    let result = services.market.get_offer(created).await;
    errors::respond(StatusCode::CREATED, result, |o| dto::OfferView::from(o))
}

/// Offers active right now, or one seller's offers with `?seller_id=`.
pub async fn list_offers(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ListOffersQuery>,
) -> axum::response::Response {
    let result = match query.seller_id.as_deref() {
        Some(raw) => match errors::parse_id::<SellerId>(raw) {
            Ok(seller_id) => services.market.list_offers_for_seller(seller_id).await,
            Err(resp) => return resp,
        },
        None => services.market.list_active_offers(Utc::now()).await,
    };
    errors::respond(StatusCode::OK, result, |offers| dto::offers_view(offers))
}

pub async fn get_offer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<OfferId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let result = services.market.get_offer(id).await;
    errors::respond(StatusCode::OK, result, |o| dto::OfferView::from(o))
}

pub async fn update_offer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateOfferBody>,
) -> axum::response::Response {
    let id = match errors::parse_id::<OfferId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let result = services
        .market
        .update_offer(principal.principal(), id, body.into())
        .await;
    errors::respond(StatusCode::OK, result, |o| dto::OfferView::from(o))
}

pub async fn submit_offer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<OfferId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let result = services.market.submit_offer(principal.principal(), id).await;
    errors::respond(StatusCode::OK, result, |o| dto::OfferView::from(o))
}

pub async fn cancel_offer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<OfferId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let result = services.market.cancel_offer(principal.principal(), id).await;
    errors::respond(StatusCode::OK, result, |o| dto::OfferView::from(o))
}
