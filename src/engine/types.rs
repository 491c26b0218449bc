use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::models::{MenuItem, Restaurant};
use crate::pricing::Totals;

/// Phase of the ordering conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Search,
    ViewingMenu,
    AddingItems,
    Checkout,
    OrderPlaced,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::ViewingMenu => "viewing_menu",
            Self::AddingItems => "adding_items",
            Self::Checkout => "checkout",
            Self::OrderPlaced => "order_placed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "search" => Some(Self::Search),
            "viewing_menu" => Some(Self::ViewingMenu),
            "adding_items" => Some(Self::AddingItems),
            "checkout" => Some(Self::Checkout),
            "order_placed" => Some(Self::OrderPlaced),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an action refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Restaurant,
    MenuItem,
    Action,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Primary,
    #[default]
    Secondary,
    Success,
    Danger,
}

/// A selectable option attached to a reply.
///
/// Selecting it means sending `value` as the next turn's input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAction {
    pub id: String,
    pub label: String,
    pub value: String,
    pub kind: ActionKind,
    #[serde(default)]
    pub variant: Variant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ChatAction {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
        kind: ActionKind,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value: value.into(),
            kind,
            variant: Variant::default(),
            icon: None,
            description: None,
        }
    }

    /// Shorthand for a plain [`ActionKind::Action`] command.
    pub fn command(id: impl Into<String>, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(id, label, value, ActionKind::Action)
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Result of one engine turn, free of any presentation concerns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    pub actions: Vec<ChatAction>,
    pub stage: Stage,
}

impl ChatReply {
    pub fn new(message: impl Into<String>, stage: Stage) -> Self {
        Self {
            message: message.into(),
            actions: Vec::new(),
            stage,
        }
    }

    pub fn with_actions(mut self, actions: Vec<ChatAction>) -> Self {
        self.actions = actions;
        self
    }
}

/// State of one ordering conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub stage: Stage,
    pub restaurant: Option<Restaurant>,
    pub cart: Cart,
    /// Restaurant choices currently being presented, if any.
    pub last_results: Option<Vec<Restaurant>>,
    /// Most recently listed menu, flattened in category order.
    pub menu: Vec<MenuItem>,
    pub last_order_id: Option<String>,
    /// Bumped on every reset.
    pub epoch: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Totals for the current cart, recomputed on every call.
    pub fn totals(&self) -> Totals {
        Totals::compute(&self.cart, self.restaurant.as_ref())
    }

    /// Forget everything except the epoch, which moves forward.
    pub fn reset(&mut self) {
        let epoch = self.epoch.wrapping_add(1);
        *self = Self {
            epoch,
            ..Self::default()
        };
    }
}
