//! Order pricing.
//!
//! Totals are a pure function of the cart and the selected restaurant and
//! are recomputed on every call. Values are left unrounded; only
//! [`format_usd`] rounds, for display.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::models::Restaurant;

/// Flat sales tax applied to the subtotal (8.75%).
pub const TAX_RATE: f64 = 0.0875;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub tax: f64,
    pub total: f64,
}

impl Totals {
    /// Price `cart`. Without a restaurant the delivery fee is zero.
    pub fn compute(cart: &Cart, restaurant: Option<&Restaurant>) -> Self {
        let subtotal: f64 = cart.lines().iter().map(|l| l.line_total()).sum();
        let delivery_fee = restaurant.map(|r| r.delivery_fee).unwrap_or(0.0);
        let tax = subtotal * TAX_RATE;
        Self {
            subtotal,
            delivery_fee,
            tax,
            total: subtotal + delivery_fee + tax,
        }
    }
}

/// Amount still missing before `restaurant`'s minimum order is met.
/// Zero when the minimum is met or no restaurant is selected.
pub fn shortfall(cart: &Cart, restaurant: Option<&Restaurant>) -> f64 {
    let Some(restaurant) = restaurant else {
        return 0.0;
    };
    let subtotal = Totals::compute(cart, Some(restaurant)).subtotal;
    (restaurant.minimum_order - subtotal).max(0.0)
}

pub fn meets_minimum(cart: &Cart, restaurant: Option<&Restaurant>) -> bool {
    shortfall(cart, restaurant) <= 0.0
}

/// Format an amount as dollars with two decimals, e.g. `$24.75`.
pub fn format_usd(amount: f64) -> String {
    format!("${:.2}", amount)
}
