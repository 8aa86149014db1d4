//! Storefront
//!
//! Client-side cart and checkout library for the services portal
//! storefront: an owned cart with write-through persistence, a read-only
//! product catalog collaborator, and a two-phase order/payment checkout
//! state machine against the remote store API.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod gateway;
pub mod manager;
pub mod prelude;
pub mod storage;
