use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use antiwaste_auth::{Principal, Role};
use antiwaste_core::{Address, DomainError, UserId};
use antiwaste_events::{EventBus, EventEnvelope, InMemoryEventBus};
use antiwaste_offers::{OfferStatus, RESET_TO_DRAFT_REASON};
use antiwaste_products::{ProductCategory, ProductPatch};
use antiwaste_sellers::{SellerId, SellerStatus};

use super::*;

type Bus = Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>;

fn marketplace(auto_approve: bool) -> Marketplace<Bus> {
    Marketplace::new(
        Repositories::in_memory(),
        Arc::new(InMemoryEventBus::new()),
        LifecycleConfig {
            auto_approve_sellers: auto_approve,
        },
    )
}

fn seller_user() -> Principal {
    Principal::new(UserId::new(), vec![Role::SELLER])
}

fn admin() -> Principal {
    Principal::new(UserId::new(), vec![Role::ADMIN])
}

fn mad(amount: i64) -> Option<PriceInput> {
    Some(PriceInput::new(Decimal::new(amount, 0), "MAD"))
}

fn register_req() -> RegisterSellerRequest {
    RegisterSellerRequest {
        store_name: "Boulangerie Atlas".to_string(),
        description: "Bread and pastries".to_string(),
        address: Some(Address::new("12 Rue Tarik", "Rabat", None, "MA").unwrap()),
    }
}

fn inline_product() -> ProductRef {
    ProductRef::Inline(NewProduct {
        title: Some("Croissants".to_string()),
        description: Some("Six butter croissants".to_string()),
        category: Some(ProductCategory::Bakery),
        ..NewProduct::default()
    })
}

fn offer_req(seller_id: SellerId) -> CreateOfferRequest {
    CreateOfferRequest {
        seller_id,
        product: inline_product(),
        title: None,
        description: None,
        price: mad(30),
        original_price: mad(60),
        start_date: None,
        end_date: None,
        expiration_date: Some(Utc::now() + Duration::hours(4)),
    }
}

#[tokio::test]
async fn end_to_end_create_submit_validate() {
    let market = marketplace(true);
    let events = market.bus().subscribe();
    let seller_user = seller_user();
    let admin = admin();

    let seller = market.register_seller(&seller_user, register_req()).await.unwrap();
    assert!(seller.is_approved());

    let offer_id = market
        .create_offer(&seller_user, offer_req(seller.id_typed()))
        .await
        .unwrap();
    market.submit_offer(&seller_user, offer_id).await.unwrap();
    let offer = market.validate_offer(&admin, offer_id).await.unwrap();

    assert_eq!(offer.status(), OfferStatus::Published);
    let history = offer.status_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history.as_slice()[0].status, OfferStatus::PendingValidation);
    assert_eq!(history.as_slice()[0].changed_by, None);
    assert_eq!(history.as_slice()[1].status, OfferStatus::Published);
    assert_eq!(history.as_slice()[1].changed_by, Some(admin.user_id));

    let stored = market.get_offer(offer_id).await.unwrap();
    assert_eq!(stored, offer);

    let active = market.list_active_offers(Utc::now()).await.unwrap();
    assert_eq!(active.len(), 1);

    let published: Vec<String> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|e| e.event_type().to_string())
        .collect();
    assert_eq!(
        published,
        vec![
            "sellers.seller.registered",
            "sellers.seller.approved",
            "products.product.created",
            "offers.offer.created",
            "offers.offer.submitted",
            "offers.offer.validated",
        ]
    );
}

#[tokio::test]
async fn envelope_sequence_numbers_follow_aggregate_version() {
    let market = marketplace(true);
    let events = market.bus().subscribe();
    let user = seller_user();

    let seller = market.register_seller(&user, register_req()).await.unwrap();

    let seqs: Vec<u64> = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|e| e.aggregate_id() == seller.id_typed().0)
        .map(|e| e.sequence_number())
        .collect();
    assert_eq!(seqs, vec![1, 2]);
}

#[tokio::test]
async fn pending_seller_cannot_create_offers() {
    let market = marketplace(false);
    let user = seller_user();

    let seller = market.register_seller(&user, register_req()).await.unwrap();
    assert_eq!(seller.status(), SellerStatus::Pending);

    let err = market
        .create_offer(&user, offer_req(seller.id_typed()))
        .await
        .unwrap_err();
    assert_eq!(
        err.domain(),
        Some(&DomainError::invalid_operation("seller not approved"))
    );

    market.approve_seller(&admin(), seller.id_typed()).await.unwrap();
    market
        .create_offer(&user, offer_req(seller.id_typed()))
        .await
        .unwrap();
}

#[tokio::test]
async fn second_seller_profile_for_user_is_a_conflict() {
    let market = marketplace(true);
    let user = seller_user();

    market.register_seller(&user, register_req()).await.unwrap();
    let err = market.register_seller(&user, register_req()).await.unwrap_err();

    assert!(matches!(err.domain(), Some(DomainError::Conflict(_))));
}

/// Seller store whose unique user index rejects every insert, as Postgres
/// does when two registrations for one user race.
struct UserIndexTaken(InMemoryRepository<Seller>);

#[async_trait::async_trait]
impl Repository<Seller> for UserIndexTaken {
    async fn get(&self, id: AggregateId) -> Result<Option<Seller>, RepositoryError> {
        self.0.get(id).await
    }

    async fn add(&self, _doc: &Seller) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unique("sellers_user_id_uniq".to_string()))
    }

    async fn update(&self, doc: &Seller) -> Result<(), RepositoryError> {
        self.0.update(doc).await
    }

    async fn delete(&self, id: AggregateId) -> Result<(), RepositoryError> {
        self.0.delete(id).await
    }

    async fn list(&self) -> Result<Vec<Seller>, RepositoryError> {
        self.0.list().await
    }
}

#[tokio::test]
async fn unique_user_index_violation_is_a_conflict() {
    let mut repos = Repositories::in_memory();
    repos.sellers = Arc::new(UserIndexTaken(InMemoryRepository::new()));
    let market = Marketplace::new(repos, Arc::new(InMemoryEventBus::new()), LifecycleConfig::default());
    let events = market.bus().subscribe();

    let err = market.register_seller(&seller_user(), register_req()).await.unwrap_err();

    assert_eq!(
        err.domain(),
        Some(&DomainError::conflict("user already has a seller profile"))
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn create_offer_for_missing_seller_is_not_found() {
    let market = marketplace(true);

    let err = market
        .create_offer(&seller_user(), offer_req(SellerId::generate()))
        .await
        .unwrap_err();
    assert_eq!(err.domain(), Some(&DomainError::NotFound));
}

#[tokio::test]
async fn inline_product_requires_title_description_and_category() {
    let market = marketplace(true);
    let user = seller_user();
    let seller = market.register_seller(&user, register_req()).await.unwrap();

    let mut req = offer_req(seller.id_typed());
    req.product = ProductRef::Inline(NewProduct {
        title: Some("Croissants".to_string()),
        ..NewProduct::default()
    });

    let err = market.create_offer(&user, req).await.unwrap_err();
    assert!(matches!(err.domain(), Some(DomainError::Validation(_))));
    assert!(market.list_products(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_offer_does_not_persist_inline_product() {
    let market = marketplace(true);
    let user = seller_user();
    let seller = market.register_seller(&user, register_req()).await.unwrap();

    let mut req = offer_req(seller.id_typed());
    req.price = mad(60);
    req.original_price = mad(30);

    let err = market.create_offer(&user, req).await.unwrap_err();
    assert_eq!(
        err.domain(),
        Some(&DomainError::invalid_operation("price must be lower than original price"))
    );
    assert!(market.list_products(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn existing_product_must_belong_to_seller() {
    let market = marketplace(true);
    let alice = seller_user();
    let bob = seller_user();
    let alice_seller = market.register_seller(&alice, register_req()).await.unwrap();
    let bob_seller = market.register_seller(&bob, register_req()).await.unwrap();

    let bobs_product = market
        .create_product(
            &bob,
            CreateProductRequest {
                seller_id: bob_seller.id_typed(),
                product: NewProduct {
                    title: Some("Milk".to_string()),
                    description: Some("1L whole milk".to_string()),
                    category: Some(ProductCategory::Dairy),
                    original_price: mad(12),
                    ..NewProduct::default()
                },
            },
        )
        .await
        .unwrap();

    let mut req = offer_req(alice_seller.id_typed());
    req.product = ProductRef::Existing(bobs_product.id_typed());

    let err = market.create_offer(&alice, req).await.unwrap_err();
    assert!(matches!(err.domain(), Some(DomainError::InvalidOperation(_))));
}

#[tokio::test]
async fn offers_default_title_and_description_from_product() {
    let market = marketplace(true);
    let user = seller_user();
    let seller = market.register_seller(&user, register_req()).await.unwrap();

    let id = market.create_offer(&user, offer_req(seller.id_typed())).await.unwrap();
    let offer = market.get_offer(id).await.unwrap();

    assert_eq!(offer.title(), "Croissants");
    assert_eq!(offer.description(), "Six butter croissants");
    let product = market.get_product(offer.product_id()).await.unwrap();
    assert_eq!(product.original_price().amount(), Decimal::new(60, 0));
}

#[tokio::test]
async fn only_owner_or_admin_may_mutate_offers() {
    let market = marketplace(true);
    let owner = seller_user();
    let stranger = seller_user();
    let seller = market.register_seller(&owner, register_req()).await.unwrap();
    let id = market.create_offer(&owner, offer_req(seller.id_typed())).await.unwrap();

    let err = market.submit_offer(&stranger, id).await.unwrap_err();
    assert!(matches!(err.domain(), Some(DomainError::Forbidden(_))));

    let err = market.validate_offer(&owner, id).await.unwrap_err();
    assert!(matches!(err.domain(), Some(DomainError::Forbidden(_))));

    market.submit_offer(&admin(), id).await.unwrap();
}

#[tokio::test]
async fn reject_then_resubmit() {
    let market = marketplace(true);
    let user = seller_user();
    let admin = admin();
    let seller = market.register_seller(&user, register_req()).await.unwrap();
    let id = market.create_offer(&user, offer_req(seller.id_typed())).await.unwrap();
    market.submit_offer(&user, id).await.unwrap();

    assert_eq!(market.list_pending_offers(&admin).await.unwrap().len(), 1);

    let offer = market
        .reject_offer(&admin, id, "picture missing".to_string())
        .await
        .unwrap();
    assert_eq!(offer.status(), OfferStatus::Rejected);
    assert_eq!(
        offer.status_history().last().and_then(|c| c.reason.as_deref()),
        Some("picture missing")
    );
    assert!(market.list_pending_offers(&admin).await.unwrap().is_empty());

    let offer = market.submit_offer(&user, id).await.unwrap();
    assert_eq!(offer.status(), OfferStatus::PendingValidation);
    assert_eq!(offer.status_history().len(), 3);
}

#[tokio::test]
async fn cancel_twice_is_an_invalid_transition() {
    let market = marketplace(true);
    let user = seller_user();
    let seller = market.register_seller(&user, register_req()).await.unwrap();
    let id = market.create_offer(&user, offer_req(seller.id_typed())).await.unwrap();
    market.submit_offer(&user, id).await.unwrap();
    market.validate_offer(&admin(), id).await.unwrap();

    let offer = market.cancel_offer(&user, id).await.unwrap();
    assert_eq!(offer.status(), OfferStatus::Canceled);

    let err = market.cancel_offer(&user, id).await.unwrap_err();
    assert!(matches!(
        err.domain(),
        Some(DomainError::InvalidStateTransition { .. })
    ));
    assert!(market.list_active_offers(Utc::now()).await.unwrap().is_empty());
}

#[tokio::test]
async fn updating_published_offer_resets_to_draft_and_updates_product() {
    let market = marketplace(true);
    let user = seller_user();
    let seller = market.register_seller(&user, register_req()).await.unwrap();
    let id = market.create_offer(&user, offer_req(seller.id_typed())).await.unwrap();
    market.submit_offer(&user, id).await.unwrap();
    market.validate_offer(&admin(), id).await.unwrap();

    let offer = market
        .update_offer(
            &user,
            id,
            UpdateOfferRequest {
                title: Some("New".to_string()),
                category: Some(ProductCategory::PreparedMeals),
                ..UpdateOfferRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(offer.status(), OfferStatus::Draft);
    assert_eq!(
        offer.status_history().last().and_then(|c| c.reason.as_deref()),
        Some(RESET_TO_DRAFT_REASON)
    );

    let product = market.get_product(offer.product_id()).await.unwrap();
    assert_eq!(product.title(), "New");
    assert_eq!(product.category(), ProductCategory::PreparedMeals);
    assert!(product.updated_at().is_some());
}

#[tokio::test]
async fn update_offer_refuses_to_touch_shared_product() {
    let market = marketplace(true);
    let user = seller_user();
    let seller = market.register_seller(&user, register_req()).await.unwrap();
    let first = market.create_offer(&user, offer_req(seller.id_typed())).await.unwrap();
    let product_id = market.get_offer(first).await.unwrap().product_id();

    let mut req = offer_req(seller.id_typed());
    req.product = ProductRef::Existing(product_id);
    market.create_offer(&user, req).await.unwrap();

    let err = market
        .update_offer(
            &user,
            first,
            UpdateOfferRequest {
                title: Some("Renamed".to_string()),
                ..UpdateOfferRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err.domain(), Some(DomainError::InvalidOperation(_))));

    // Offer-only fields never reach the product.
    market
        .update_offer(
            &user,
            first,
            UpdateOfferRequest {
                price: mad(20),
                ..UpdateOfferRequest::default()
            },
        )
        .await
        .unwrap();

    // The product can still be changed explicitly.
    let product = market
        .update_product(
            &user,
            product_id,
            ProductPatch {
                title: Some("Renamed".to_string()),
                ..ProductPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(product.title(), "Renamed");
}

#[tokio::test]
async fn offer_prices_on_shared_product_stay_with_the_offer() {
    let market = marketplace(true);
    let user = seller_user();
    let seller = market.register_seller(&user, register_req()).await.unwrap();
    let first = market.create_offer(&user, offer_req(seller.id_typed())).await.unwrap();
    let product_id = market.get_offer(first).await.unwrap().product_id();

    let mut req = offer_req(seller.id_typed());
    req.product = ProductRef::Existing(product_id);
    market.create_offer(&user, req).await.unwrap();

    let offer = market
        .update_offer(
            &user,
            first,
            UpdateOfferRequest {
                original_price: mad(80),
                ..UpdateOfferRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        offer.original_price().map(|m| m.amount()),
        Some(Decimal::new(80, 0))
    );

    let product = market.get_product(product_id).await.unwrap();
    assert_eq!(product.original_price().amount(), Decimal::new(60, 0));
    assert_eq!(product.version(), 1);
}

/// Offer store that accepts inserts but fails every rewrite.
struct OfferUpdatesFail(InMemoryRepository<Offer>);

#[async_trait::async_trait]
impl Repository<Offer> for OfferUpdatesFail {
    async fn get(&self, id: AggregateId) -> Result<Option<Offer>, RepositoryError> {
        self.0.get(id).await
    }

    async fn add(&self, doc: &Offer) -> Result<(), RepositoryError> {
        self.0.add(doc).await
    }

    async fn update(&self, _doc: &Offer) -> Result<(), RepositoryError> {
        Err(RepositoryError::Storage("connection reset".to_string()))
    }

    async fn delete(&self, id: AggregateId) -> Result<(), RepositoryError> {
        self.0.delete(id).await
    }

    async fn list(&self) -> Result<Vec<Offer>, RepositoryError> {
        self.0.list().await
    }
}

#[tokio::test]
async fn failed_offer_write_leaves_the_linked_product_unchanged() {
    let mut repos = Repositories::in_memory();
    repos.offers = Arc::new(OfferUpdatesFail(InMemoryRepository::new()));
    let market = Marketplace::new(repos, Arc::new(InMemoryEventBus::new()), LifecycleConfig::default());
    let user = seller_user();
    let seller = market.register_seller(&user, register_req()).await.unwrap();
    let id = market.create_offer(&user, offer_req(seller.id_typed())).await.unwrap();
    let product_id = market.get_offer(id).await.unwrap().product_id();
    let events = market.bus().subscribe();

    let err = market
        .update_offer(
            &user,
            id,
            UpdateOfferRequest {
                title: Some("Fresh croissants".to_string()),
                ..UpdateOfferRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Store(RepositoryError::Storage(_))));

    let product = market.get_product(product_id).await.unwrap();
    assert_eq!(product.title(), "Croissants");
    assert_eq!(product.version(), 1);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn product_without_reference_price_is_rejected() {
    let market = marketplace(true);
    let user = seller_user();
    let seller = market.register_seller(&user, register_req()).await.unwrap();

    let err = market
        .create_product(
            &user,
            CreateProductRequest {
                seller_id: seller.id_typed(),
                product: NewProduct {
                    title: Some("Milk".to_string()),
                    description: Some("1L whole milk".to_string()),
                    category: Some(ProductCategory::Dairy),
                    ..NewProduct::default()
                },
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.domain(),
        Some(&DomainError::validation("product original price is required"))
    );
    assert!(market.list_products(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn seller_reject_and_reapprove_clears_reason() {
    let market = marketplace(false);
    let admin = admin();
    let user = seller_user();
    let seller = market.register_seller(&user, register_req()).await.unwrap();

    market.approve_seller(&admin, seller.id_typed()).await.unwrap();
    let rejected = market
        .reject_seller(&admin, seller.id_typed(), "bad docs".to_string())
        .await
        .unwrap();
    assert_eq!(rejected.status(), SellerStatus::Rejected);
    assert_eq!(rejected.rejection_reason(), Some("bad docs"));

    let approved = market.approve_seller(&admin, seller.id_typed()).await.unwrap();
    assert!(approved.is_approved());
    assert_eq!(approved.rejection_reason(), None);

    assert_eq!(
        market.list_sellers(Some(SellerStatus::Approved)).await.unwrap().len(),
        1
    );
    assert!(market.list_sellers(Some(SellerStatus::Pending)).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_seller_requires_owner() {
    let market = marketplace(true);
    let owner = seller_user();
    let seller = market.register_seller(&owner, register_req()).await.unwrap();

    let req = UpdateSellerRequest {
        store_name: "Atlas Bakery".to_string(),
        description: "Bread".to_string(),
        address: Some(Address::new("1 Avenue Hassan II", "Rabat", None, "MA").unwrap()),
    };

    let err = market
        .update_seller(&seller_user(), seller.id_typed(), req.clone())
        .await
        .unwrap_err();
    assert!(matches!(err.domain(), Some(DomainError::Forbidden(_))));

    let updated = market.update_seller(&owner, seller.id_typed(), req).await.unwrap();
    assert_eq!(updated.store_name(), "Atlas Bakery");
    assert_eq!(market.seller_for_user(owner.user_id).await.unwrap(), updated);
}

#[tokio::test]
async fn delete_seller_cascades_to_offers_and_products() {
    let market = marketplace(true);
    let user = seller_user();
    let seller = market.register_seller(&user, register_req()).await.unwrap();
    let id = market.create_offer(&user, offer_req(seller.id_typed())).await.unwrap();

    let err = market.delete_seller(&user, seller.id_typed()).await.unwrap_err();
    assert!(matches!(err.domain(), Some(DomainError::Forbidden(_))));

    market.delete_seller(&admin(), seller.id_typed()).await.unwrap();

    assert_eq!(market.get_offer(id).await.unwrap_err().domain(), Some(&DomainError::NotFound));
    assert!(market.list_products(None).await.unwrap().is_empty());
    assert!(market.list_sellers(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn future_offers_are_not_active_yet() {
    let market = marketplace(true);
    let user = seller_user();
    let seller = market.register_seller(&user, register_req()).await.unwrap();

    let mut req = offer_req(seller.id_typed());
    req.start_date = Some(Utc::now() + Duration::hours(1));
    let id = market.create_offer(&user, req).await.unwrap();
    market.submit_offer(&user, id).await.unwrap();
    market.validate_offer(&admin(), id).await.unwrap();

    assert!(market.list_active_offers(Utc::now()).await.unwrap().is_empty());
    assert_eq!(
        market
            .list_active_offers(Utc::now() + Duration::hours(2))
            .await
            .unwrap()
            .len(),
        1
    );
}
