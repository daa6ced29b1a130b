//! Moderation endpoints. The admin role is enforced by the use cases.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use antiwaste_offers::OfferId;
use antiwaste_sellers::SellerId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/offers/pending", get(pending_offers))
        .route("/offers/:id/validate", post(validate_offer))
        .route("/offers/:id/reject", post(reject_offer))
        .route("/sellers/:id/approve", post(approve_seller))
        .route("/sellers/:id/reject", post(reject_seller))
        .route("/sellers/:id", delete(delete_seller))
}

pub async fn pending_offers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let result = services.market.list_pending_offers(principal.principal()).await;
    errors::respond(StatusCode::OK, result, |offers| dto::offers_view(offers))
}

pub async fn validate_offer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<OfferId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let result = services.market.validate_offer(principal.principal(), id).await;
    errors::respond(StatusCode::OK, result, |o| dto::OfferView::from(o))
}

pub async fn reject_offer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Option<Json<dto::RejectRequest>>,
) -> axum::response::Response {
    let id = match errors::parse_id::<OfferId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let reason = body.map(|Json(b)| b.reason).unwrap_or_default();

    let result = services
        .market
        .reject_offer(principal.principal(), id, reason)
        .await;
    errors::respond(StatusCode::OK, result, |o| dto::OfferView::from(o))
}

pub async fn approve_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<SellerId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let result = services.market.approve_seller(principal.principal(), id).await;
    errors::respond(StatusCode::OK, result, |s| dto::SellerView::from(s))
}

pub async fn reject_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Option<Json<dto::RejectRequest>>,
) -> axum::response::Response {
    let id = match errors::parse_id::<SellerId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let reason = body.map(|Json(b)| b.reason).unwrap_or_default();

    let result = services
        .market
        .reject_seller(principal.principal(), id, reason)
        .await;
    errors::respond(StatusCode::OK, result, |s| dto::SellerView::from(s))
}

pub async fn delete_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<SellerId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.market.delete_seller(principal.principal(), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::lifecycle_error_to_response(e),
    }
}
