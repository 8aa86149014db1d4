//! Cart
//!
//! The pure in-memory cart collection: ordered lines keyed by product id,
//! with derived totals. Persistence and event publication live in
//! [`crate::manager`].

use serde::{Deserialize, Serialize};

/// One product's presence in the cart.
///
/// The name, price and image are a denormalized snapshot of the catalog
/// item taken when the line was first added; they are never re-synced if
/// the catalog item changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product identifier, unique within the cart.
    #[serde(rename = "id")]
    pub product_id: String,

    /// Product name at add time.
    pub name: String,

    /// Unit price in whole currency units at add time.
    #[serde(rename = "price")]
    pub unit_price: u64,

    /// Catalog image reference, if the product had one.
    #[serde(default)]
    pub image: Option<String>,

    /// Number of units. Always at least 1 for a present line.
    pub quantity: u32,
}

/// Denormalized catalog details captured when a product is first added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    /// Product name.
    pub name: String,

    /// Unit price in whole currency units.
    pub unit_price: u64,

    /// Primary image reference, if any.
    pub image: Option<String>,
}

/// Ordered collection of cart lines, at most one per product id.
///
/// Insertion order is preserved for display but carries no other meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from stored lines.
    ///
    /// Stored snapshots are validated on receipt: lines with a zero
    /// quantity and duplicate lines for the same product id (first one
    /// wins) are dropped rather than surfaced as errors.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();

        for line in lines {
            if line.quantity == 0 || cart.line(&line.product_id).is_some() {
                continue;
            }

            cart.lines.push(line);
        }

        cart
    }

    /// Add one unit of a product.
    ///
    /// If a line for `product_id` already exists its quantity is
    /// incremented by 1 and the stored snapshot is left untouched,
    /// reflecting the price discovered at the original add time.
    /// Otherwise a new line with quantity 1 is appended.
    pub fn add(&mut self, product_id: &str, snapshot: ProductSnapshot) {
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }

        self.lines.push(CartLine {
            product_id: product_id.to_owned(),
            name: snapshot.name,
            unit_price: snapshot.unit_price,
            image: snapshot.image,
            quantity: 1,
        });
    }

    /// Apply a signed quantity change to a line.
    ///
    /// An absent line is a no-op. A resulting quantity of zero or below
    /// removes the line entirely, so a quantity is never observably zero
    /// or negative after this call returns.
    ///
    /// Returns `true` if the cart changed.
    pub fn change_quantity(&mut self, product_id: &str, delta: i64) -> bool {
        let Some(line) = self.line_mut(product_id) else {
            return false;
        };

        let updated = i64::from(line.quantity).saturating_add(delta);

        if updated <= 0 {
            return self.remove(product_id);
        }

        line.quantity = u32::try_from(updated).unwrap_or(u32::MAX);

        true
    }

    /// Remove a line if present. Removing an absent id is a no-op.
    ///
    /// Returns `true` if a line was removed.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);

        self.lines.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of unit price times quantity over all lines. Zero when empty.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| line.unit_price.saturating_mul(u64::from(line.quantity)))
            .sum()
    }

    /// Sum of quantities across all lines, for a badge or indicator.
    ///
    /// Distinct from [`Cart::len`], which counts lines.
    #[must_use]
    pub fn line_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    /// Look up a line by product id.
    #[must_use]
    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.product_id == product_id)
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}
