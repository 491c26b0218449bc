//! Request types for MCP tools.

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{CartLine, CreateOrderInput, DeliveryAddress};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchRestaurantsRequest {
    #[schemars(description = "City to search in, e.g. 'New York'")]
    pub city: Option<String>,
    #[schemars(description = "Cuisine type, e.g. 'Italian'")]
    pub cuisine: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetMenuRequest {
    #[schemars(description = "ID of the restaurant whose menu to load")]
    pub restaurant_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OrderItemInput {
    pub item_id: String,
    pub name: String,
    #[schemars(description = "Unit price in dollars")]
    pub price: f64,
    #[schemars(description = "Number of units, at least 1")]
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeliveryAddressInput {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateOrderRequest {
    #[schemars(description = "ID of the restaurant to order from")]
    pub restaurant_id: String,
    #[schemars(description = "Items to order, as listed on the restaurant's menu")]
    pub items: Vec<OrderItemInput>,
    pub delivery_address: DeliveryAddressInput,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ChatRequest {
    #[schemars(
        description = "Session returned by a previous chat call. Omit to start a new conversation."
    )]
    pub session_id: Option<String>,
    #[schemars(description = "What the user said, e.g. 'pizza in Chicago' or '2 of item 1'")]
    pub message: String,
}

impl From<OrderItemInput> for CartLine {
    fn from(item: OrderItemInput) -> Self {
        Self {
            item_id: item.item_id,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
        }
    }
}

impl From<DeliveryAddressInput> for DeliveryAddress {
    fn from(address: DeliveryAddressInput) -> Self {
        Self {
            address: address.address,
            city: address.city,
            state: address.state,
            zip: address.zip,
        }
    }
}

impl From<CreateOrderRequest> for CreateOrderInput {
    fn from(req: CreateOrderRequest) -> Self {
        Self {
            restaurant_id: req.restaurant_id,
            items: req.items.into_iter().map(CartLine::from).collect(),
            delivery_address: req.delivery_address.into(),
        }
    }
}
