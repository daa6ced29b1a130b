use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use antiwaste_core::{Aggregate, AggregateRoot, DomainError, Money};
use antiwaste_events::Event;
use antiwaste_sellers::SellerId;

use crate::gtin::Gtin;

antiwaste_core::typed_aggregate_id!(
    /// Product identifier.
    ProductId
);

/// Catalog category of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Bakery,
    FruitsAndVegetables,
    Dairy,
    MeatAndFish,
    Groceries,
    PreparedMeals,
    Beverages,
    Other,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Bakery => "bakery",
            ProductCategory::FruitsAndVegetables => "fruits_and_vegetables",
            ProductCategory::Dairy => "dairy",
            ProductCategory::MeatAndFish => "meat_and_fish",
            ProductCategory::Groceries => "groceries",
            ProductCategory::PreparedMeals => "prepared_meals",
            ProductCategory::Beverages => "beverages",
            ProductCategory::Other => "other",
        }
    }
}

impl core::str::FromStr for ProductCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bakery" => Ok(ProductCategory::Bakery),
            "fruits_and_vegetables" => Ok(ProductCategory::FruitsAndVegetables),
            "dairy" => Ok(ProductCategory::Dairy),
            "meat_and_fish" => Ok(ProductCategory::MeatAndFish),
            "groceries" => Ok(ProductCategory::Groceries),
            "prepared_meals" => Ok(ProductCategory::PreparedMeals),
            "beverages" => Ok(ProductCategory::Beverages),
            "other" => Ok(ProductCategory::Other),
            other => Err(DomainError::validation(format!("unknown product category '{other}'"))),
        }
    }
}

/// Aggregate root: Product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    seller_id: SellerId,
    title: String,
    description: String,
    category: ProductCategory,
    original_price: Money,
    picture_url: Option<String>,
    gtin: Option<Gtin>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Product {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: ProductId) -> Self {
        Self {
            id,
            seller_id: SellerId::new(antiwaste_core::AggregateId::nil()),
            title: String::new(),
            description: String::new(),
            category: ProductCategory::Other,
            original_price: Money::unset(),
            picture_url: None,
            gtin: None,
            created_at: None,
            updated_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn create(cmd: CreateProduct) -> Result<(Self, Vec<ProductEvent>), DomainError> {
        let mut product = Self::empty(cmd.product_id);
        let events = product.execute(&ProductCommand::CreateProduct(cmd))?;
        Ok((product, events))
    }

    /// Partial update: only supplied, non-blank fields overwrite.
    pub fn update(
        &mut self,
        patch: ProductPatch,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<ProductEvent>, DomainError> {
        self.execute(&ProductCommand::UpdateProduct(UpdateProduct {
            product_id: self.id,
            patch,
            occurred_at,
        }))
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn seller_id(&self) -> SellerId {
        self.seller_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> ProductCategory {
        self.category
    }

    /// Reference (pre-discount) price of the catalog item.
    pub fn original_price(&self) -> &Money {
        &self.original_price
    }

    pub fn picture_url(&self) -> Option<&str> {
        self.picture_url.as_deref()
    }

    pub fn gtin(&self) -> Option<&Gtin> {
        self.gtin.as_ref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn is_owned_by(&self, seller_id: SellerId) -> bool {
        self.seller_id == seller_id
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub product_id: ProductId,
    pub seller_id: SellerId,
    pub title: String,
    pub description: String,
    pub category: ProductCategory,
    pub original_price: Money,
    /// Optional; pictures are hosted elsewhere and only referenced here.
    pub picture_url: Option<String>,
    pub gtin: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Fields of a partial product update. `None` or blank keeps the old value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub original_price: Option<Money>,
    pub picture_url: Option<String>,
    pub gtin: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        non_blank(&self.title).is_none()
            && non_blank(&self.description).is_none()
            && self.category.is_none()
            && self.original_price.is_none()
            && non_blank(&self.picture_url).is_none()
            && non_blank(&self.gtin).is_none()
    }
}

/// Command: UpdateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub product_id: ProductId,
    pub patch: ProductPatch,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    CreateProduct(CreateProduct),
    UpdateProduct(UpdateProduct),
}

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product_id: ProductId,
    pub seller_id: SellerId,
    pub title: String,
    pub description: String,
    pub category: ProductCategory,
    pub original_price: Money,
    pub picture_url: Option<String>,
    pub gtin: Option<Gtin>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductUpdated (carries the resulting field values).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdated {
    pub product_id: ProductId,
    pub title: String,
    pub description: String,
    pub category: ProductCategory,
    pub original_price: Money,
    pub picture_url: Option<String>,
    pub gtin: Option<Gtin>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    ProductUpdated(ProductUpdated),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "products.product.created",
            ProductEvent::ProductUpdated(_) => "products.product.updated",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(e) => e.occurred_at,
            ProductEvent::ProductUpdated(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductCreated(e) => {
                self.id = e.product_id;
                self.seller_id = e.seller_id;
                self.title = e.title.clone();
                self.description = e.description.clone();
                self.category = e.category;
                self.original_price = e.original_price.clone();
                self.picture_url = e.picture_url.clone();
                self.gtin = e.gtin.clone();
                self.created_at = Some(e.occurred_at);
                self.created = true;
            }
            ProductEvent::ProductUpdated(e) => {
                self.title = e.title.clone();
                self.description = e.description.clone();
                self.category = e.category;
                self.original_price = e.original_price.clone();
                self.picture_url = e.picture_url.clone();
                self.gtin = e.gtin.clone();
                self.updated_at = Some(e.occurred_at);
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, DomainError> {
        match command {
            ProductCommand::CreateProduct(cmd) => self.handle_create(cmd),
            ProductCommand::UpdateProduct(cmd) => self.handle_update(cmd),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Product {
    fn ensure_product_id(&self, product_id: ProductId) -> Result<(), DomainError> {
        if self.id != product_id {
            return Err(DomainError::invalid_operation("product_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("product already exists"));
        }
        if cmd.seller_id.is_nil() {
            return Err(DomainError::validation("seller id cannot be empty"));
        }
        if cmd.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if cmd.description.trim().is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }

        if cmd.original_price.currency() == Money::unset().currency() {
            return Err(DomainError::validation("original price is required"));
        }

        let gtin = non_blank(&cmd.gtin).map(|g| Gtin::parse(&g)).transpose()?;

        Ok(vec![ProductEvent::ProductCreated(ProductCreated {
            product_id: cmd.product_id,
            seller_id: cmd.seller_id,
            title: cmd.title.trim().to_string(),
            description: cmd.description.trim().to_string(),
            category: cmd.category,
            original_price: cmd.original_price.clone(),
            picture_url: non_blank(&cmd.picture_url),
            gtin,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_product_id(cmd.product_id)?;

        let patch = &cmd.patch;
        let gtin = match non_blank(&patch.gtin) {
            Some(raw) => Some(Gtin::parse(&raw)?),
            None => self.gtin.clone(),
        };

        Ok(vec![ProductEvent::ProductUpdated(ProductUpdated {
            product_id: cmd.product_id,
            title: non_blank(&patch.title).unwrap_or_else(|| self.title.clone()),
            description: non_blank(&patch.description).unwrap_or_else(|| self.description.clone()),
            category: patch.category.unwrap_or(self.category),
            original_price: patch
                .original_price
                .clone()
                .unwrap_or_else(|| self.original_price.clone()),
            picture_url: non_blank(&patch.picture_url).or_else(|| self.picture_url.clone()),
            gtin,
            occurred_at: cmd.occurred_at,
        })])
    }
}
