//! Offer lifecycle service: the use cases of the marketplace.
//!
//! Every mutating use case follows the same shape:
//!
//! ```text
//! load aggregate(s) → authorize → cross-entity checks → execute → persist → publish
//! ```
//!
//! Aggregates are persisted before their events are published; a failed
//! publish is logged and never fails the call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use antiwaste_auth::{Principal, Role, ensure_owner_or_admin, require_role};
use antiwaste_core::{AggregateId, AggregateRoot, DomainError, UserId};
use antiwaste_events::{Event, EventBus, EventEnvelope};
use antiwaste_offers::{CreateOffer, Offer, OfferChanges, OfferId, OfferStatus};
use antiwaste_products::{CreateProduct, Product, ProductId, ProductPatch};
use antiwaste_sellers::{RegisterSeller, Seller, SellerId, SellerStatus};

use crate::config::LifecycleConfig;
use crate::repository::{InMemoryRepository, PostgresRepository, Repository, RepositoryError};

mod error;
pub mod requests;

#[cfg(test)]
mod tests;

pub use error::LifecycleError;
pub use requests::{
    CreateOfferRequest, CreateProductRequest, NewProduct, PriceInput, ProductRef,
    RegisterSellerRequest, UpdateOfferRequest, UpdateSellerRequest,
};

use requests::to_money;

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// The three aggregate repositories the service works against.
#[derive(Clone)]
pub struct Repositories {
    pub sellers: Arc<dyn Repository<Seller>>,
    pub products: Arc<dyn Repository<Product>>,
    pub offers: Arc<dyn Repository<Offer>>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            sellers: Arc::new(InMemoryRepository::<Seller>::new()),
            products: Arc::new(InMemoryRepository::<Product>::new()),
            offers: Arc::new(InMemoryRepository::<Offer>::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        let pool = Arc::new(pool);
        Self {
            sellers: Arc::new(PostgresRepository::<Seller>::from_shared(pool.clone())),
            products: Arc::new(PostgresRepository::<Product>::from_shared(pool.clone())),
            offers: Arc::new(PostgresRepository::<Offer>::from_shared(pool)),
        }
    }
}

/// Marketplace use cases over sellers, products and offers.
pub struct Marketplace<B> {
    repos: Repositories,
    bus: B,
    config: LifecycleConfig,
}

impl<B> Marketplace<B>
where
    B: EventBus<EventEnvelope<JsonValue>>,
{
    pub fn new(repos: Repositories, bus: B, config: LifecycleConfig) -> Self {
        Self { repos, bus, config }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sellers
    // ─────────────────────────────────────────────────────────────────────

    /// Register a seller profile for the acting user.
    pub async fn register_seller(
        &self,
        actor: &Principal,
        req: RegisterSellerRequest,
    ) -> LifecycleResult<Seller> {
        if self.find_seller_for_user(actor.user_id).await?.is_some() {
            return Err(DomainError::conflict("user already has a seller profile").into());
        }

        let now = Utc::now();
        let (mut seller, mut events) = Seller::register(RegisterSeller {
            seller_id: SellerId::generate(),
            user_id: actor.user_id,
            store_name: req.store_name,
            description: req.description,
            address: req.address,
            occurred_at: now,
        })?;

        if self.config.auto_approve_sellers {
            events.extend(seller.approve(now)?);
        }

        // The store's unique index on user id catches concurrent registrations
        // that slipped past the lookup above.
        self.repos.sellers.add(&seller).await.map_err(|e| match e {
            RepositoryError::Unique(_) => {
                LifecycleError::from(DomainError::conflict("user already has a seller profile"))
            }
            other => other.into(),
        })?;
        self.publish(SELLER, seller.id_typed().0, seller.version(), &events);

        tracing::info!(
            seller_id = %seller.id_typed(),
            user_id = %seller.user_id(),
            status = %seller.status(),
            "seller registered"
        );
        Ok(seller)
    }

    pub async fn get_seller(&self, id: SellerId) -> LifecycleResult<Seller> {
        self.repos
            .sellers
            .get(id.0)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    pub async fn seller_for_user(&self, user_id: UserId) -> LifecycleResult<Seller> {
        self.find_seller_for_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    pub async fn list_sellers(&self, status: Option<SellerStatus>) -> LifecycleResult<Vec<Seller>> {
        let sellers = self.repos.sellers.list().await?;
        Ok(sellers
            .into_iter()
            .filter(|s| status.is_none_or(|st| s.status() == st))
            .collect())
    }

    pub async fn approve_seller(&self, actor: &Principal, id: SellerId) -> LifecycleResult<Seller> {
        require_role(actor, &Role::ADMIN)?;

        let mut seller = self.get_seller(id).await?;
        let events = seller.approve(Utc::now())?;
        self.repos.sellers.update(&seller).await?;
        self.publish(SELLER, id.0, seller.version(), &events);

        tracing::info!(seller_id = %id, admin_id = %actor.user_id, "seller approved");
        Ok(seller)
    }

    pub async fn reject_seller(
        &self,
        actor: &Principal,
        id: SellerId,
        reason: String,
    ) -> LifecycleResult<Seller> {
        require_role(actor, &Role::ADMIN)?;

        let mut seller = self.get_seller(id).await?;
        let events = seller.reject(reason, Utc::now())?;
        self.repos.sellers.update(&seller).await?;
        self.publish(SELLER, id.0, seller.version(), &events);

        tracing::info!(seller_id = %id, admin_id = %actor.user_id, "seller rejected");
        Ok(seller)
    }

    pub async fn update_seller(
        &self,
        actor: &Principal,
        id: SellerId,
        req: UpdateSellerRequest,
    ) -> LifecycleResult<Seller> {
        let mut seller = self.get_seller(id).await?;
        ensure_owner_or_admin(actor, seller.user_id())?;

        let events =
            seller.update_details(req.store_name, req.description, req.address, Utc::now())?;
        self.repos.sellers.update(&seller).await?;
        self.publish(SELLER, id.0, seller.version(), &events);

        tracing::info!(seller_id = %id, "seller details updated");
        Ok(seller)
    }

    /// Delete a seller with all of its offers and products.
    pub async fn delete_seller(&self, actor: &Principal, id: SellerId) -> LifecycleResult<()> {
        require_role(actor, &Role::ADMIN)?;
        self.get_seller(id).await?;

        let offers = self.list_offers_for_seller(id).await?;
        for offer in &offers {
            self.repos.offers.delete(offer.id_typed().0).await?;
        }

        let products = self.list_products(Some(id)).await?;
        for product in &products {
            self.repos.products.delete(product.id_typed().0).await?;
        }

        self.repos.sellers.delete(id.0).await?;

        tracing::info!(
            seller_id = %id,
            offers = offers.len(),
            products = products.len(),
            "seller deleted"
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────

    pub async fn create_product(
        &self,
        actor: &Principal,
        req: CreateProductRequest,
    ) -> LifecycleResult<Product> {
        let seller = self.get_seller(req.seller_id).await?;
        ensure_owner_or_admin(actor, seller.user_id())?;

        let (product, events) = new_product(seller.id_typed(), req.product, None, Utc::now())?;
        self.repos.products.add(&product).await?;
        self.publish(PRODUCT, product.id_typed().0, product.version(), &events);

        tracing::info!(
            product_id = %product.id_typed(),
            seller_id = %seller.id_typed(),
            "product created"
        );
        Ok(product)
    }

    pub async fn get_product(&self, id: ProductId) -> LifecycleResult<Product> {
        self.repos
            .products
            .get(id.0)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    pub async fn list_products(&self, seller_id: Option<SellerId>) -> LifecycleResult<Vec<Product>> {
        let products = self.repos.products.list().await?;
        Ok(products
            .into_iter()
            .filter(|p| seller_id.is_none_or(|s| p.seller_id() == s))
            .collect())
    }

    pub async fn update_product(
        &self,
        actor: &Principal,
        id: ProductId,
        patch: ProductPatch,
    ) -> LifecycleResult<Product> {
        let mut product = self.get_product(id).await?;
        let seller = self.get_seller(product.seller_id()).await?;
        ensure_owner_or_admin(actor, seller.user_id())?;

        let events = product.update(patch, Utc::now())?;
        self.repos.products.update(&product).await?;
        self.publish(PRODUCT, id.0, product.version(), &events);

        tracing::info!(product_id = %id, "product updated");
        Ok(product)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Offers
    // ─────────────────────────────────────────────────────────────────────

    /// Create a `DRAFT` offer for an approved seller, creating the product
    /// too when inline product fields are given.
    pub async fn create_offer(
        &self,
        actor: &Principal,
        req: CreateOfferRequest,
    ) -> LifecycleResult<OfferId> {
        let now = Utc::now();

        let seller = self.get_seller(req.seller_id).await?;
        ensure_owner_or_admin(actor, seller.user_id())?;
        if !seller.is_approved() {
            return Err(DomainError::invalid_operation("seller not approved").into());
        }

        let price = to_money(req.price.as_ref())?;
        let original_price = to_money(req.original_price.as_ref())?;

        let (product, new_product_events) = match req.product {
            ProductRef::Existing(product_id) => {
                let product = self.get_product(product_id).await?;
                if product.seller_id() != seller.id_typed() {
                    return Err(
                        DomainError::invalid_operation("product belongs to another seller").into(),
                    );
                }
                (product, None)
            }
            ProductRef::Inline(fields) => {
                if fields.title.as_deref().is_none_or(|t| t.trim().is_empty())
                    || fields.description.as_deref().is_none_or(|d| d.trim().is_empty())
                    || fields.category.is_none()
                {
                    return Err(DomainError::validation(
                        "inline product requires title, description and category",
                    )
                    .into());
                }
                let (product, events) =
                    new_product(seller.id_typed(), fields, original_price.clone(), now)?;
                (product, Some(events))
            }
        };

        let (offer, events) = Offer::create(CreateOffer {
            offer_id: OfferId::generate(),
            seller_id: seller.id_typed(),
            product_id: product.id_typed(),
            title: or_default(req.title, product.title()),
            description: or_default(req.description, product.description()),
            price,
            original_price,
            start_date: req.start_date.unwrap_or(now),
            end_date: req.end_date,
            expiration_date: req.expiration_date,
            occurred_at: now,
        })?;

        if let Some(product_events) = new_product_events {
            self.repos.products.add(&product).await?;
            self.publish(PRODUCT, product.id_typed().0, product.version(), &product_events);
        }
        self.repos.offers.add(&offer).await?;
        self.publish(OFFER, offer.id_typed().0, offer.version(), &events);

        tracing::info!(
            offer_id = %offer.id_typed(),
            seller_id = %seller.id_typed(),
            product_id = %product.id_typed(),
            status = %offer.status(),
            "offer created"
        );
        Ok(offer.id_typed())
    }

    pub async fn get_offer(&self, id: OfferId) -> LifecycleResult<Offer> {
        self.repos
            .offers
            .get(id.0)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    /// Edit an offer, and its product when product fields are supplied.
    ///
    /// Prices and dates belong to the offer alone. Title, description,
    /// category and picture also flow to the product, which is only touched
    /// when no other offer references it. The offer is persisted first.
    pub async fn update_offer(
        &self,
        actor: &Principal,
        id: OfferId,
        req: UpdateOfferRequest,
    ) -> LifecycleResult<Offer> {
        let now = Utc::now();

        let mut offer = self.get_offer(id).await?;
        self.authorize_offer_owner(actor, &offer).await?;

        let patch = ProductPatch {
            title: req.title.clone(),
            description: req.description.clone(),
            category: req.category,
            original_price: None,
            picture_url: req.picture_url,
            gtin: None,
        };

        let product_change = if patch.is_empty() {
            None
        } else {
            let shared = self
                .repos
                .offers
                .list()
                .await?
                .iter()
                .any(|o| o.product_id() == offer.product_id() && o.id_typed() != id);
            if shared {
                return Err(DomainError::invalid_operation(
                    "product is shared with other offers; update the product directly",
                )
                .into());
            }

            let mut product = self.get_product(offer.product_id()).await?;
            let events = product.update(patch, now)?;
            Some((product, events))
        };

        let offer_events = offer.update_details(
            OfferChanges {
                title: req.title,
                description: req.description,
                price: to_money(req.price.as_ref())?,
                original_price: to_money(req.original_price.as_ref())?,
                start_date: req.start_date,
                end_date: req.end_date,
                expiration_date: req.expiration_date,
            },
            Some(actor.user_id),
            now,
        )?;

        self.repos.offers.update(&offer).await?;
        self.publish(OFFER, id.0, offer.version(), &offer_events);

        if let Some((product, product_events)) = product_change {
            self.repos.products.update(&product).await?;
            self.publish(PRODUCT, product.id_typed().0, product.version(), &product_events);
        }

        tracing::info!(offer_id = %id, status = %offer.status(), "offer updated");
        Ok(offer)
    }

    pub async fn submit_offer(&self, actor: &Principal, id: OfferId) -> LifecycleResult<Offer> {
        let mut offer = self.get_offer(id).await?;
        self.authorize_offer_owner(actor, &offer).await?;

        let events = offer.submit_for_validation(Utc::now())?;
        self.save_offer(&offer, &events).await?;

        tracing::info!(offer_id = %id, status = %offer.status(), "offer submitted for validation");
        Ok(offer)
    }

    /// Publish a pending offer. The admin id comes from the principal.
    pub async fn validate_offer(&self, actor: &Principal, id: OfferId) -> LifecycleResult<Offer> {
        require_role(actor, &Role::ADMIN)?;

        let mut offer = self.get_offer(id).await?;
        let events = offer.validate(actor.user_id, Utc::now())?;
        self.save_offer(&offer, &events).await?;

        tracing::info!(offer_id = %id, admin_id = %actor.user_id, status = %offer.status(), "offer validated");
        Ok(offer)
    }

    pub async fn reject_offer(
        &self,
        actor: &Principal,
        id: OfferId,
        reason: String,
    ) -> LifecycleResult<Offer> {
        require_role(actor, &Role::ADMIN)?;

        let mut offer = self.get_offer(id).await?;
        let events = offer.reject(actor.user_id, reason, Utc::now())?;
        self.save_offer(&offer, &events).await?;

        tracing::info!(offer_id = %id, admin_id = %actor.user_id, status = %offer.status(), "offer rejected");
        Ok(offer)
    }

    pub async fn cancel_offer(&self, actor: &Principal, id: OfferId) -> LifecycleResult<Offer> {
        let mut offer = self.get_offer(id).await?;
        self.authorize_offer_owner(actor, &offer).await?;

        let events = offer.cancel(actor.user_id, Utc::now())?;
        self.save_offer(&offer, &events).await?;

        tracing::info!(offer_id = %id, user_id = %actor.user_id, status = %offer.status(), "offer canceled");
        Ok(offer)
    }

    pub async fn list_offers_for_seller(&self, seller_id: SellerId) -> LifecycleResult<Vec<Offer>> {
        let offers = self.repos.offers.list().await?;
        Ok(offers
            .into_iter()
            .filter(|o| o.seller_id() == seller_id)
            .collect())
    }

    /// Moderation queue, admin only.
    pub async fn list_pending_offers(&self, actor: &Principal) -> LifecycleResult<Vec<Offer>> {
        require_role(actor, &Role::ADMIN)?;

        let offers = self.repos.offers.list().await?;
        Ok(offers
            .into_iter()
            .filter(|o| o.status() == OfferStatus::PendingValidation)
            .collect())
    }

    /// Offers buyers can see at `now`.
    pub async fn list_active_offers(&self, now: DateTime<Utc>) -> LifecycleResult<Vec<Offer>> {
        let offers = self.repos.offers.list().await?;
        Ok(offers.into_iter().filter(|o| o.is_active_at(now)).collect())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────

    async fn find_seller_for_user(&self, user_id: UserId) -> LifecycleResult<Option<Seller>> {
        let sellers = self.repos.sellers.list().await?;
        Ok(sellers.into_iter().find(|s| s.user_id() == user_id))
    }

    async fn authorize_offer_owner(&self, actor: &Principal, offer: &Offer) -> LifecycleResult<()> {
        if actor.is_admin() {
            return Ok(());
        }
        let seller = self.get_seller(offer.seller_id()).await?;
        ensure_owner_or_admin(actor, seller.user_id())?;
        Ok(())
    }

    async fn save_offer<E>(&self, offer: &Offer, events: &[E]) -> LifecycleResult<()>
    where
        E: Event + Serialize,
    {
        self.repos.offers.update(offer).await?;
        self.publish(OFFER, offer.id_typed().0, offer.version(), events);
        Ok(())
    }

    /// Wrap and publish events that were just applied to an aggregate now at
    /// `version`. The sequence number of each event is the version it produced.
    fn publish<E>(&self, aggregate_type: &str, aggregate_id: AggregateId, version: u64, events: &[E])
    where
        E: Event + Serialize,
    {
        let first = version.saturating_sub(events.len() as u64) + 1;

        for (i, event) in events.iter().enumerate() {
            let envelope = match EventEnvelope::from_typed(
                aggregate_id,
                aggregate_type,
                first + i as u64,
                event,
            ) {
                Ok(env) => env,
                Err(e) => {
                    tracing::warn!(error = %e, event_type = event.event_type(), "failed to serialize event");
                    continue;
                }
            };

            if let Err(e) = self.bus.publish(envelope) {
                tracing::warn!(error = ?e, event_type = event.event_type(), "failed to publish event");
            }
        }
    }
}

const SELLER: &str = "sellers.seller";
const PRODUCT: &str = "products.product";
const OFFER: &str = "offers.offer";

fn or_default(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn new_product(
    seller_id: SellerId,
    fields: NewProduct,
    fallback_price: Option<antiwaste_core::Money>,
    now: DateTime<Utc>,
) -> Result<(Product, Vec<antiwaste_products::ProductEvent>), DomainError> {
    let original_price = to_money(fields.original_price.as_ref())?
        .or(fallback_price)
        .ok_or_else(|| DomainError::validation("product original price is required"))?;

    let category = fields
        .category
        .ok_or_else(|| DomainError::validation("product category is required"))?;

    Product::create(CreateProduct {
        product_id: ProductId::generate(),
        seller_id,
        title: fields.title.unwrap_or_default(),
        description: fields.description.unwrap_or_default(),
        category,
        original_price,
        picture_url: fields.picture_url,
        gtin: fields.gtin,
        occurred_at: now,
    })
}
