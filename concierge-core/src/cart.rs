//! The session cart.
//!
//! Quantities are always positive and never exceed [`MAX_QUANTITY`]: every
//! change goes through [`Cart::adjust`], which drops a line as soon as its
//! quantity would reach zero and clamps it at the cap.

use serde::{Deserialize, Serialize};

use crate::models::{CartLine, MenuItem};

/// Largest quantity a single cart line can hold.
pub const MAX_QUANTITY: u32 = 99;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of `item`, incrementing the existing line if the item
    /// is already in the cart. Returns the line's new quantity.
    pub fn add(&mut self, item: &MenuItem, quantity: u32) -> u32 {
        if self.line(&item.id).is_some() {
            return self
                .adjust(&item.id, i64::from(quantity))
                .unwrap_or_default();
        }
        if quantity == 0 {
            return 0;
        }
        let quantity = quantity.min(MAX_QUANTITY);
        self.lines.push(CartLine {
            item_id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            quantity,
        });
        quantity
    }

    /// Change a line's quantity by `delta`, clamped to [`MAX_QUANTITY`].
    ///
    /// Returns the remaining quantity, or `None` if the line was removed or
    /// was never in the cart.
    pub fn adjust(&mut self, item_id: &str, delta: i64) -> Option<u32> {
        let idx = self.lines.iter().position(|l| l.item_id == item_id)?;
        let next = i64::from(self.lines[idx].quantity).saturating_add(delta);
        if next <= 0 {
            self.lines.remove(idx);
            return None;
        }
        let next = u32::try_from(next).map_or(MAX_QUANTITY, |n| n.min(MAX_QUANTITY));
        self.lines[idx].quantity = next;
        Some(next)
    }

    /// Remove a line outright. Returns the removed line.
    pub fn remove(&mut self, item_id: &str) -> Option<CartLine> {
        let idx = self.lines.iter().position(|l| l.item_id == item_id)?;
        Some(self.lines.remove(idx))
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, item_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item_id == item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn to_lines(&self) -> Vec<CartLine> {
        self.lines.clone()
    }
}
