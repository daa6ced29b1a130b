use antiwaste_core::AggregateId;
use antiwaste_offers::Offer;
use antiwaste_products::Product;
use antiwaste_sellers::Seller;

use super::Document;

impl Document for Seller {
    const COLLECTION: &'static str = "sellers";

    fn document_id(&self) -> AggregateId {
        self.id_typed().0
    }
}

impl Document for Product {
    const COLLECTION: &'static str = "products";

    fn document_id(&self) -> AggregateId {
        self.id_typed().0
    }
}

impl Document for Offer {
    const COLLECTION: &'static str = "offers";

    fn document_id(&self) -> AggregateId {
        self.id_typed().0
    }
}
