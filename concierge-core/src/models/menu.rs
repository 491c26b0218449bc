use serde::{Deserialize, Serialize};

/// A single dish on a restaurant's menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub spicy: bool,
    #[serde(default)]
    pub popular: bool,
}

impl MenuItem {
    /// Short tag suffix used when listing the item, e.g. `" 🌱 🌶️"`.
    pub fn tags(&self) -> String {
        let mut tags = String::new();
        if self.popular {
            tags.push_str(" ⭐");
        }
        if self.vegetarian {
            tags.push_str(" 🌱");
        }
        if self.spicy {
            tags.push_str(" 🌶️");
        }
        tags
    }
}

/// A named group of menu items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuCategory {
    pub name: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// Response of `GET /restaurants/{id}/menu`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Menu {
    #[serde(default)]
    pub categories: Vec<MenuCategory>,
}

impl Menu {
    /// All items in category order. This is the list ordinal selection
    /// ("item 3") indexes into.
    pub fn flatten(&self) -> Vec<MenuItem> {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter().cloned())
            .collect()
    }
}
