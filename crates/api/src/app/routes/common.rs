use axum::response::Response;

use antiwaste_sellers::SellerId;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Seller a create request acts for: the explicit `seller_id`, or the
/// caller's own seller profile when omitted.
pub async fn resolve_seller(
    services: &AppServices,
    principal: &PrincipalContext,
    seller_id: Option<&str>,
) -> Result<SellerId, Response> {
    match seller_id.filter(|s| !s.trim().is_empty()) {
        Some(raw) => errors::parse_id::<SellerId>(raw),
        None => services
            .market
            .seller_for_user(principal.user_id())
            .await
            .map(|seller| seller.id_typed())
            .map_err(errors::lifecycle_error_to_response),
    }
}
