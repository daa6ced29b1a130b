//! Request/response DTOs and JSON mapping helpers.
//!
//! Requests decode into the lifecycle request types; responses are flat
//! views of the aggregates without their internal bookkeeping fields.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use antiwaste_core::{Address, DomainError, DomainResult, Money};
use antiwaste_infra::{
    NewProduct, PriceInput, RegisterSellerRequest, UpdateOfferRequest, UpdateSellerRequest,
};
use antiwaste_offers::{Offer, OfferStatus, StatusChange};
use antiwaste_products::{Product, ProductCategory, ProductPatch};
use antiwaste_sellers::{Seller, SellerStatus};

// ─────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct MoneyDto {
    pub amount: Decimal,
    pub currency: String,
}

impl From<MoneyDto> for PriceInput {
    fn from(value: MoneyDto) -> Self {
        PriceInput::new(value.amount, value.currency)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressDto {
    pub street: String,
    pub city: String,
    pub zip_code: Option<String>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl AddressDto {
    pub fn into_address(self) -> DomainResult<Address> {
        let address = Address::new(self.street, self.city, self.zip_code, self.country)?;
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => address.with_coordinates(lat, lng),
            (None, None) => Ok(address),
            _ => Err(DomainError::validation(
                "latitude and longitude must be given together",
            )),
        }
    }
}

fn address(dto: Option<AddressDto>) -> DomainResult<Option<Address>> {
    dto.map(AddressDto::into_address).transpose()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SellerProfileRequest {
    pub store_name: String,
    #[serde(default)]
    pub description: String,
    pub address: Option<AddressDto>,
}

impl SellerProfileRequest {
    pub fn into_register(self) -> DomainResult<RegisterSellerRequest> {
        Ok(RegisterSellerRequest {
            store_name: self.store_name,
            description: self.description,
            address: address(self.address)?,
        })
    }

    pub fn into_update(self) -> DomainResult<UpdateSellerRequest> {
        Ok(UpdateSellerRequest {
            store_name: self.store_name,
            description: self.description,
            address: address(self.address)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSellersQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListProductsQuery {
    pub seller_id: Option<String>,
}

/// Product fields as sent by clients, shared by product and inline-offer creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub original_price: Option<MoneyDto>,
    pub picture_url: Option<String>,
    pub gtin: Option<String>,
}

impl From<ProductFields> for NewProduct {
    fn from(value: ProductFields) -> Self {
        NewProduct {
            title: value.title,
            description: value.description,
            category: value.category,
            original_price: value.original_price.map(Into::into),
            picture_url: value.picture_url,
            gtin: value.gtin,
        }
    }
}

impl ProductFields {
    pub fn into_patch(self) -> DomainResult<ProductPatch> {
        Ok(ProductPatch {
            title: self.title,
            description: self.description,
            category: self.category,
            original_price: self
                .original_price
                .map(|m| Money::new(m.amount, m.currency))
                .transpose()?,
            picture_url: self.picture_url,
            gtin: self.gtin,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductBody {
    /// Defaults to the caller's own seller profile.
    pub seller_id: Option<String>,
    #[serde(flatten)]
    pub product: ProductFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOfferBody {
    /// Defaults to the caller's own seller profile.
    pub seller_id: Option<String>,
    /// Existing product; takes precedence over `product`.
    pub product_id: Option<String>,
    /// Inline product created together with the offer.
    pub product: Option<ProductFields>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<MoneyDto>,
    pub original_price: Option<MoneyDto>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOfferBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub picture_url: Option<String>,
    pub price: Option<MoneyDto>,
    pub original_price: Option<MoneyDto>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
}

impl From<UpdateOfferBody> for UpdateOfferRequest {
    fn from(value: UpdateOfferBody) -> Self {
        UpdateOfferRequest {
            title: value.title,
            description: value.description,
            category: value.category,
            picture_url: value.picture_url,
            price: value.price.map(Into::into),
            original_price: value.original_price.map(Into::into),
            start_date: value.start_date,
            end_date: value.end_date,
            expiration_date: value.expiration_date,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AddressView {
    pub street: String,
    pub city: String,
    pub zip_code: Option<String>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<&Address> for AddressView {
    fn from(a: &Address) -> Self {
        Self {
            street: a.street().to_string(),
            city: a.city().to_string(),
            zip_code: a.zip_code().map(str::to_string),
            country: a.country().to_string(),
            latitude: a.latitude(),
            longitude: a.longitude(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SellerView {
    pub id: String,
    pub user_id: String,
    pub store_name: String,
    pub description: String,
    pub address: Option<AddressView>,
    pub status: SellerStatus,
    pub rejection_reason: Option<String>,
}

impl From<&Seller> for SellerView {
    fn from(s: &Seller) -> Self {
        Self {
            id: s.id_typed().to_string(),
            user_id: s.user_id().to_string(),
            store_name: s.store_name().to_string(),
            description: s.description().to_string(),
            address: s.address().map(AddressView::from),
            status: s.status(),
            rejection_reason: s.rejection_reason().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: String,
    pub seller_id: String,
    pub title: String,
    pub description: String,
    pub category: ProductCategory,
    pub original_price: Money,
    pub picture_url: Option<String>,
    pub gtin: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Product> for ProductView {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id_typed().to_string(),
            seller_id: p.seller_id().to_string(),
            title: p.title().to_string(),
            description: p.description().to_string(),
            category: p.category(),
            original_price: p.original_price().clone(),
            picture_url: p.picture_url().map(str::to_string),
            gtin: p.gtin().map(|g| g.as_str().to_string()),
            created_at: p.created_at(),
            updated_at: p.updated_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OfferView {
    pub id: String,
    pub seller_id: String,
    pub product_id: String,
    pub title: String,
    pub description: String,
    pub price: Option<Money>,
    pub original_price: Option<Money>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub status: OfferStatus,
    pub status_history: Vec<StatusChange>,
}

impl From<&Offer> for OfferView {
    fn from(o: &Offer) -> Self {
        Self {
            id: o.id_typed().to_string(),
            seller_id: o.seller_id().to_string(),
            product_id: o.product_id().to_string(),
            title: o.title().to_string(),
            description: o.description().to_string(),
            price: o.price().cloned(),
            original_price: o.original_price().cloned(),
            start_date: o.start_date(),
            end_date: o.end_date(),
            expiration_date: o.expiration_date(),
            status: o.status(),
            status_history: o.status_history().iter().cloned().collect(),
        }
    }
}

pub fn sellers_view(sellers: &[Seller]) -> Vec<SellerView> {
    sellers.iter().map(SellerView::from).collect()
}

pub fn products_view(products: &[Product]) -> Vec<ProductView> {
    products.iter().map(ProductView::from).collect()
}

pub fn offers_view(offers: &[Offer]) -> Vec<OfferView> {
    offers.iter().map(OfferView::from).collect()
}
