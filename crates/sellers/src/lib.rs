//! Sellers domain module.
//!
//! A seller is a store profile tied to one user account. Its approval status is
//! the gate every offer-creation path checks. Pure domain logic: no IO, no
//! HTTP, no storage.

pub mod seller;

pub use seller::{
    ApproveSeller, RegisterSeller, RejectSeller, Seller, SellerApproved, SellerCommand,
    SellerDetailsUpdated, SellerEvent, SellerId, SellerRegistered, SellerRejected, SellerStatus,
    UpdateSellerDetails,
};
