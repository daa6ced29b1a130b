//! Offers domain module.
//!
//! An offer is a time-bounded, discounted listing of a seller's product that
//! goes through moderation before it is visible to buyers. This crate holds
//! the status transition table, the append-only status history and the
//! `Offer` aggregate. Pure domain logic: no IO, no HTTP, no storage.

pub mod history;
pub mod offer;
pub mod status;

pub use history::{StatusChange, StatusHistory};
pub use offer::{
    CancelOffer, CreateOffer, Offer, OfferCanceled, OfferChanges, OfferCommand, OfferCreated,
    OfferDetailsUpdated, OfferEvent, OfferId, OfferRejected, OfferSubmitted, OfferValidated,
    RejectOffer, SubmitOffer, UpdateOfferDetails, ValidateOffer, RESET_TO_DRAFT_REASON,
};
pub use status::{OfferStatus, OfferTransition};
