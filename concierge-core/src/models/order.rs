use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One menu item and its requested quantity.
///
/// The wire shape matches the remote API's order item, so cart lines are
/// sent as-is when an order is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: String,
    pub name: String,
    /// Unit price.
    pub price: f64,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Where an order should be delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Body of `POST /orders/create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderInput {
    pub restaurant_id: String,
    pub items: Vec<CartLine>,
    pub delivery_address: DeliveryAddress,
}

/// An order as known by the remote API.
///
/// Totals are computed remotely; the local calculator only predicts them
/// before checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub restaurant_id: String,
    #[serde(default)]
    pub restaurant_name: String,
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub delivery_fee: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub total: f64,
    pub status: OrderStatus,
    #[serde(default)]
    pub estimated_delivery: String,
}

/// Response of `POST /orders/{id}/payment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub success: bool,
    #[serde(default)]
    pub transaction_id: String,
}

/// Order lifecycle as reported by the remote API.
///
/// - `Pending`: received, waiting for the restaurant
/// - `Confirmed`: accepted by the restaurant
/// - `Preparing`: in the kitchen
/// - `Ready`: waiting for a driver
/// - `OutForDelivery`: driver on the way
/// - `Delivered`: done
///
/// Statuses outside this vocabulary are kept verbatim in `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Unknown(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Unknown(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "confirmed" => Self::Confirmed,
            "preparing" => Self::Preparing,
            "ready" => Self::Ready,
            "out_for_delivery" => Self::OutForDelivery,
            "delivered" => Self::Delivered,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Pending => "⏳",
            Self::Confirmed => "✅",
            Self::Preparing => "🍳",
            Self::Ready => "📦",
            Self::OutForDelivery => "🚗",
            Self::Delivered => "🎉",
            Self::Unknown(_) => "📋",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Pending => "Order received, waiting for confirmation",
            Self::Confirmed => "Restaurant confirmed your order",
            Self::Preparing => "Your food is being prepared",
            Self::Ready => "Food is ready for pickup",
            Self::OutForDelivery => "Driver is on the way",
            Self::Delivered => "Order delivered! Enjoy your meal!",
            Self::Unknown(_) => "Processing your order",
        }
    }

    /// Position in the delivery progression, `None` for unknown statuses.
    pub fn step(&self) -> Option<usize> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Preparing => Some(2),
            Self::Ready => Some(3),
            Self::OutForDelivery => Some(4),
            Self::Delivered => Some(5),
            Self::Unknown(_) => None,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().replace('_', " "))
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}
