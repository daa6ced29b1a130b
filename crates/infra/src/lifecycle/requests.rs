//! Inputs of the lifecycle use cases, already decoded from the transport.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use antiwaste_core::{Address, DomainResult, Money};
use antiwaste_products::{ProductCategory, ProductId};
use antiwaste_sellers::SellerId;

/// Raw amount + currency, turned into [`Money`] by the use case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceInput {
    pub amount: Decimal,
    pub currency: String,
}

impl PriceInput {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    pub fn to_money(&self) -> DomainResult<Money> {
        Money::new(self.amount, &self.currency)
    }
}

pub(crate) fn to_money(input: Option<&PriceInput>) -> DomainResult<Option<Money>> {
    input.map(PriceInput::to_money).transpose()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterSellerRequest {
    pub store_name: String,
    pub description: String,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSellerRequest {
    pub store_name: String,
    pub description: String,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProduct {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub original_price: Option<PriceInput>,
    pub picture_url: Option<String>,
    pub gtin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProductRequest {
    pub seller_id: SellerId,
    pub product: NewProduct,
}

/// The product an offer is about: an existing one, or fields for a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductRef {
    Existing(ProductId),
    Inline(NewProduct),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOfferRequest {
    pub seller_id: SellerId,
    pub product: ProductRef,
    /// Defaults to the product title when blank.
    pub title: Option<String>,
    /// Defaults to the product description when blank.
    pub description: Option<String>,
    pub price: Option<PriceInput>,
    pub original_price: Option<PriceInput>,
    /// Defaults to the request time.
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
}

/// Offer edit. Title, description and original price also flow to the
/// linked product, together with category and picture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOfferRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub picture_url: Option<String>,
    pub price: Option<PriceInput>,
    pub original_price: Option<PriceInput>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
}
