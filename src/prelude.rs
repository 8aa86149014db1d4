//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartLine, ProductSnapshot},
    catalog::{CatalogClient, CatalogError, HttpCatalogClient, Product, ProductFilter, SortOrder},
    checkout::{CheckoutError, CheckoutOutcome, CheckoutService, CheckoutState},
    config::StoreConfig,
    gateway::{
        GatewayError, HttpOrderGateway, OrderGateway, OrderLine, OrderRequest, OrderResponse,
        PaymentMethod, PaymentRequest, PaymentResponse,
    },
    manager::CartManager,
    storage::{JsonFileStore, MemoryStore, SessionStore, StoreError},
};
