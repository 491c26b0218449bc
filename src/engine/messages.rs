use std::fmt::Write;

use crate::models::{Menu, MenuItem, Order, Restaurant};
use crate::pricing::{format_usd, Totals};

use super::types::{Conversation, Stage};

pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

pub const WELCOME: &str = "👋 Hi! I'm your AI food ordering assistant. You can ask me things like:\n\n\
• \"I want Chicken Tikka Masala in New York\"\n\
• \"Find Italian food under $20\"\n\
• \"I'm hungry, get me something spicy in 30 minutes\"\n\
• \"Show me sushi restaurants in Los Angeles\"\n\n\
What are you craving today?";

pub const QUICK_PROMPTS: &[&str] = &[
    "Chicken Tikka Masala in New York",
    "Italian food under $20",
    "Sushi in Los Angeles",
    "Spicy food in 30 minutes",
];

pub const NO_RESULTS: &str = "I couldn't find restaurants matching your criteria. Try:\n\n\
• Adjusting your budget\n\
• Different cuisine\n\
• Longer delivery time\n\
• Browse all restaurants";

pub const CART_EMPTY: &str = "Your cart is empty. Add something from a menu before checking out.";

pub const NOTHING_TO_CONFIRM: &str =
    "There's nothing to confirm yet. Add items to your cart and say \"checkout\" first.";

pub const NO_ORDER_YET: &str = "You haven't placed an order yet.";

pub const FAVORITES_UNAVAILABLE: &str = "Favorites aren't available right now.";

pub fn help(conv: &Conversation) -> String {
    match conv.stage {
        Stage::Search if conv.last_results.is_some() => {
            "Pick a restaurant by its number or name. To look for something else, say \"search\" followed by what you're craving.".to_string()
        }
        Stage::Search => {
            "Tell me what you're craving, like \"pizza in Chicago\" or \"spicy food under $20\". Say \"start over\" at any time to begin again.".to_string()
        }
        Stage::ViewingMenu | Stage::AddingItems => {
            "Add items with \"2 of item 1\" or just type an item name. You can also say \"show cart\", \"remove item 1\", \"favorite\", \"menu\" or \"checkout\".".to_string()
        }
        Stage::Checkout => {
            "Say \"confirm\" to place your order or \"cancel\" to keep shopping.".to_string()
        }
        Stage::OrderPlaced => {
            "Say \"track order\" for the latest status, or tell me what you'd like to eat next.".to_string()
        }
    }
}

pub fn restaurant_list(
    restaurants: &[Restaurant],
    suggested: &[MenuItem],
    favorites: &[String],
) -> String {
    let count = restaurants.len();
    let mut out = format!(
        "I found {} restaurant{} matching your request:\n\n",
        count,
        if count == 1 { "" } else { "s" }
    );

    for (i, r) in restaurants.iter().enumerate() {
        let heart = if favorites.contains(&r.id) { " ❤️" } else { "" };
        let _ = writeln!(out, "{}. **{}** ({}){}", i + 1, r.name, r.cuisine, heart);
        let _ = writeln!(out, "   ⭐ {} stars | 🕒 {}", r.rating, r.delivery_time);
        let _ = writeln!(out, "   📍 {}\n", r.location.city);
    }

    if !suggested.is_empty() {
        out.push_str("\n**Suggested items:**\n");
        for item in suggested.iter().take(3) {
            let _ = writeln!(out, "• {} - {}", item.name, format_usd(item.price));
        }
    }

    out.push_str("\nPick a restaurant to see the full menu!");
    out
}

pub fn reprompt_restaurants(restaurants: &[Restaurant]) -> String {
    let mut out = String::from(
        "I didn't catch which restaurant you meant. Reply with its number or name:\n\n",
    );
    for (i, r) in restaurants.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, r.name);
    }
    out.push_str("\nOr say \"search\" followed by something else to look again.");
    out
}

pub fn menu_listing(restaurant: &Restaurant, menu: &Menu, cart_cleared: bool) -> String {
    let mut out = String::new();
    if cart_cleared {
        out.push_str("(Your previous cart was cleared.)\n\n");
    }
    let _ = writeln!(out, "🍽️ **{}** menu", restaurant.name);
    if !restaurant.is_open {
        out.push_str("⚠️ This restaurant is currently closed.\n");
    }

    let mut n = 0;
    for category in &menu.categories {
        if category.items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n**{}**", category.name);
        for item in &category.items {
            n += 1;
            let _ = writeln!(
                out,
                "{}. {}{} - {}",
                n,
                item.name,
                item.tags(),
                format_usd(item.price)
            );
        }
    }

    if n == 0 {
        out.push_str("\nThis menu has no items right now.");
        return out;
    }

    if restaurant.minimum_order > 0.0 {
        let _ = write!(
            out,
            "\nMinimum order: {}",
            format_usd(restaurant.minimum_order)
        );
    }
    out.push_str("\n\nSay \"2 of item 1\" or type an item name to add it to your cart.");
    out
}

pub fn added(item: &MenuItem, quantity: u32, conv: &Conversation) -> String {
    let totals = conv.totals();
    let count = conv.cart.item_count();
    let mut out = format!(
        "Added {} × {} to your cart. You have {} item{} (subtotal {}).",
        quantity,
        item.name,
        count,
        if count == 1 { "" } else { "s" },
        format_usd(totals.subtotal)
    );
    if let Some(hint) = minimum_hint(conv) {
        out.push_str("\n\n");
        out.push_str(&hint);
    }
    out
}

/// Missing amount before the minimum order is met, if any.
pub fn minimum_hint(conv: &Conversation) -> Option<String> {
    let restaurant = conv.restaurant.as_ref()?;
    let missing = crate::pricing::shortfall(&conv.cart, Some(restaurant));
    (missing > 0.0).then(|| {
        format!(
            "Add {} more to reach the {} minimum order.",
            format_usd(missing),
            format_usd(restaurant.minimum_order)
        )
    })
}

pub fn below_minimum(restaurant: &Restaurant, missing: f64) -> String {
    format!(
        "{} has a {} minimum order. Add {} more before checking out.",
        restaurant.name,
        format_usd(restaurant.minimum_order),
        format_usd(missing)
    )
}

pub fn item_not_found() -> String {
    "I couldn't match that to a menu item. Try \"2 of item 1\" or part of an item's name, or say \"menu\" to see it again.".to_string()
}

fn cart_lines(conv: &Conversation, out: &mut String) {
    for (i, line) in conv.cart.lines().iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} × {} - {}",
            i + 1,
            line.quantity,
            line.name,
            format_usd(line.line_total())
        );
    }
}

fn totals_block(totals: &Totals, out: &mut String) {
    let _ = writeln!(out, "\nSubtotal: {}", format_usd(totals.subtotal));
    let _ = writeln!(out, "Delivery fee: {}", format_usd(totals.delivery_fee));
    let _ = writeln!(out, "Tax: {}", format_usd(totals.tax));
    let _ = write!(out, "**Total: {}**", format_usd(totals.total));
}

pub fn cart_summary(conv: &Conversation) -> String {
    if conv.cart.is_empty() {
        return "Your cart is empty.".to_string();
    }
    let mut out = match &conv.restaurant {
        Some(r) => format!("🛒 **Your cart** from {}:\n\n", r.name),
        None => "🛒 **Your cart**:\n\n".to_string(),
    };
    cart_lines(conv, &mut out);
    totals_block(&conv.totals(), &mut out);
    if let Some(hint) = minimum_hint(conv) {
        out.push_str("\n\n");
        out.push_str(&hint);
    }
    out
}

pub fn order_summary(conv: &Conversation, street: &str, zip: &str) -> String {
    let mut out = String::from("📋 **Order summary**\n\n");
    if let Some(r) = &conv.restaurant {
        let _ = writeln!(out, "From {}\n", r.name);
    }
    cart_lines(conv, &mut out);
    totals_block(&conv.totals(), &mut out);
    if let Some(r) = &conv.restaurant {
        let _ = write!(
            out,
            "\n\nDeliver to: {}, {}, {} {}",
            street, r.location.city, r.location.state, zip
        );
    }
    out.push_str("\n\nConfirm to place your order.");
    out
}

pub fn checkout_reprompt(summary: &str) -> String {
    format!(
        "Reply \"confirm\" to place the order or \"cancel\" to keep shopping.\n\n{}",
        summary
    )
}

pub fn cancelled_checkout() -> String {
    "No problem, your cart is still here. Keep adding items or say \"checkout\" when you're ready."
        .to_string()
}

pub fn removed(name: &str, taken: u32, remaining: Option<u32>) -> String {
    match remaining {
        Some(left) => format!("Removed {} × {}. {} left in your cart.", taken, name, left),
        None => format!("Removed {} from your cart.", name),
    }
}

pub fn not_in_cart() -> String {
    "I couldn't find that in your cart. Say \"show cart\" to see what's in it.".to_string()
}

pub fn order_placed(order: &Order, paid: Option<bool>) -> String {
    let mut out = String::from("🎉 **Order placed!**\n\n");
    let _ = writeln!(out, "Order ID: {}", order.id);
    let _ = writeln!(out, "Status: {} {}", order.status.icon(), order.status.message());
    let _ = writeln!(out, "Total: {}", format_usd(order.total));
    if !order.estimated_delivery.is_empty() {
        let _ = writeln!(out, "Estimated delivery: {}", order.estimated_delivery);
    }
    match paid {
        Some(true) => out.push_str("\n💳 Payment processed.\n"),
        Some(false) => out.push_str("\n⚠️ Payment could not be processed.\n"),
        None => {}
    }
    out.push_str("\nSay \"track order\" to follow its progress.");
    out
}

pub fn order_status(order: &Order) -> String {
    let mut out = format!(
        "{} **Order {}**: {}\n{}",
        order.status.icon(),
        order.id,
        order.status,
        order.status.message()
    );
    if let Some(step) = order.status.step() {
        let _ = write!(out, "\nProgress: {}/5", step);
    }
    if !order.estimated_delivery.is_empty() && !order.status.is_final() {
        let _ = write!(out, "\nEstimated delivery: {}", order.estimated_delivery);
    }
    out
}
