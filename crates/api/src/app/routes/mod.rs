use axum::{routing::get, Router};

pub mod admin;
pub mod common;
pub mod offers;
pub mod products;
pub mod sellers;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/sellers", sellers::router())
        .nest("/products", products::router())
        .nest("/offers", offers::router())
        .nest("/admin", admin::router())
}
