//! Infrastructure layer: persistence, configuration and the use-case
//! orchestration that ties the domain crates together.

pub mod config;
pub mod lifecycle;
pub mod repository;

pub use config::{AppConfig, ConfigError, LifecycleConfig};
pub use lifecycle::{
    CreateOfferRequest, CreateProductRequest, LifecycleError, LifecycleResult, Marketplace,
    NewProduct, PriceInput, ProductRef, RegisterSellerRequest, Repositories, UpdateOfferRequest,
    UpdateSellerRequest,
};
pub use repository::{
    Document, InMemoryRepository, PostgresRepository, Repository, RepositoryError, ensure_schema,
};
