//! Products domain module (seller-owned catalog items).
//!
//! Business rules for products, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod gtin;
pub mod product;

pub use gtin::Gtin;
pub use product::{
    CreateProduct, Product, ProductCategory, ProductCommand, ProductCreated, ProductEvent,
    ProductId, ProductPatch, ProductUpdated, UpdateProduct,
};
