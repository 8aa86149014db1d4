//! Cart manager.
//!
//! Owns the cart for a session: applies mutations, mirrors every change
//! to session storage (write-through, no batching), and publishes the
//! updated cart on a watch channel so the rendering layer can subscribe
//! instead of being called inline.

use tokio::sync::watch;
use tracing::debug;

use crate::{
    cart::{Cart, CartLine, ProductSnapshot},
    catalog::Product,
    storage::{SessionStore, StoreError},
};

/// The owned cart state for a single session.
///
/// Constructed once at session start and handed to the rendering layer
/// by reference; there is no ambient global cart.
#[derive(Debug)]
pub struct CartManager<S> {
    cart: Cart,
    store: S,
    updates: watch::Sender<Cart>,
}

impl<S: SessionStore> CartManager<S> {
    /// Create a manager over the given store, rehydrating any persisted
    /// cart. Absence of a stored cart means an empty one.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the stored snapshot cannot be read.
    pub fn load(store: S) -> Result<Self, StoreError> {
        let lines = store.load_cart()?.unwrap_or_default();
        let cart = Cart::from_lines(lines);
        let (updates, _) = watch::channel(cart.clone());

        debug!(lines = cart.len(), "cart rehydrated");

        Ok(Self {
            cart,
            store,
            updates,
        })
    }

    /// The current cart.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Subscribe to cart updates. Each mutation publishes the new state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.updates.subscribe()
    }

    /// Add one unit of a product, capturing its snapshot on first add.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the updated cart cannot be persisted.
    pub fn add_item(
        &mut self,
        product_id: &str,
        snapshot: ProductSnapshot,
    ) -> Result<(), StoreError> {
        self.cart.add(product_id, snapshot);

        debug!(product_id, "added to cart");

        self.persist()
    }

    /// Add one unit of a product resolved from a catalog listing.
    ///
    /// An id that does not resolve to a listed product is a silent
    /// no-op, not a failure; this layer stays permissive.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the updated cart cannot be persisted.
    pub fn add_from_listing(
        &mut self,
        products: &[Product],
        product_id: &str,
    ) -> Result<(), StoreError> {
        let Some(product) = products.iter().find(|product| product.id == product_id) else {
            debug!(product_id, "unknown product id, skipping add");
            return Ok(());
        };

        self.add_item(product_id, product.snapshot())
    }

    /// Apply a signed quantity change; a result of zero or below removes
    /// the line. An absent line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the updated cart cannot be persisted.
    pub fn change_quantity(&mut self, product_id: &str, delta: i64) -> Result<(), StoreError> {
        if !self.cart.change_quantity(product_id, delta) {
            return Ok(());
        }

        debug!(product_id, delta, "cart quantity changed");

        self.persist()
    }

    /// Remove a line. Removing an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the updated cart cannot be persisted.
    pub fn remove_item(&mut self, product_id: &str) -> Result<(), StoreError> {
        if !self.cart.remove(product_id) {
            return Ok(());
        }

        debug!(product_id, "removed from cart");

        self.persist()
    }

    /// Empty the cart. The terminal step of a successful checkout.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the empty cart cannot be persisted.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.cart.clear();

        debug!("cart cleared");

        self.persist()
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.cart.total()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn line_count(&self) -> u64 {
        self.cart.line_count()
    }

    /// The profile reference captured for this session, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store cannot be read.
    pub fn profile_reference(&self) -> Result<Option<String>, StoreError> {
        self.store.profile_reference()
    }

    /// Snapshot the current lines, e.g. for an order submission.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        self.store.save_cart(self.cart.lines())?;
        self.updates.send_replace(self.cart.clone());

        Ok(())
    }
}
