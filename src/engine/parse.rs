//! Interpretation of free-text chat input.
//!
//! Everything here is pure: commands, ordinal/name selection and
//! quantity-prefixed item requests.

use std::sync::OnceLock;

use regex::Regex;

use crate::cart::MAX_QUANTITY;

static INTEGER_RE: OnceLock<Regex> = OnceLock::new();
static QUANTITY_RE: OnceLock<Regex> = OnceLock::new();
static LEADING_VERB_RE: OnceLock<Regex> = OnceLock::new();
static TRAILING_FILLER_RE: OnceLock<Regex> = OnceLock::new();

fn integer_regex() -> &'static Regex {
    INTEGER_RE.get_or_init(|| Regex::new(r"\d+").expect("valid integer regex"))
}

fn quantity_regex() -> &'static Regex {
    QUANTITY_RE.get_or_init(|| {
        Regex::new(r"^(\d+)\s*(?:x\b|×)?\s*(?:of\b)?\s*(?:(?:the\s+)?items?\b)?\s*(.*)$")
            .expect("valid quantity regex")
    })
}

fn leading_verb_regex() -> &'static Regex {
    LEADING_VERB_RE.get_or_init(|| {
        Regex::new(
            r"^(?:please\s+)?(?:add|order|get|give me|i(?:'d| would)? like|i want|i'll have|i'll take|can i (?:get|have))\s+",
        )
        .expect("valid verb regex")
    })
}

fn trailing_filler_regex() -> &'static Regex {
    TRAILING_FILLER_RE.get_or_init(|| {
        Regex::new(r"\s*(?:(?:to|in(?:to)?)\s+(?:my\s+|the\s+)?cart)?\s*(?:,?\s*please)?[.!]*$")
            .expect("valid filler regex")
    })
}

/// A recognized chat command. Input that is not a command is `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartOver,
    Help,
    TrackOrder,
    ShowCart,
    Checkout,
    Confirm,
    Cancel,
    Menu,
    /// `remove …` with the cart reference that follows.
    Remove(String),
    FavoriteRestaurant,
    /// `favorite …` with the menu reference that follows.
    FavoriteItem(String),
    /// `search …` / `find …`: drop the presented choices and search again.
    NewSearch,
    Other,
}

/// Lowercase, trimmed, without trailing punctuation.
pub fn normalize(input: &str) -> String {
    input
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .trim()
        .to_lowercase()
}

pub fn parse_command(input: &str) -> Command {
    let text = normalize(input);
    match text.as_str() {
        "start over" | "restart" | "reset" => return Command::StartOver,
        "help" => return Command::Help,
        "track order" | "track" | "order status" | "track my order" => {
            return Command::TrackOrder
        }
        "show cart" | "view cart" | "cart" | "my cart" => return Command::ShowCart,
        "checkout" | "check out" => return Command::Checkout,
        "confirm" | "yes" | "y" | "place order" | "confirm order" => return Command::Confirm,
        "cancel" | "no" | "n" | "back" => return Command::Cancel,
        "menu" | "show menu" => return Command::Menu,
        "favorite" | "favourite" | "favorite restaurant" | "favourite restaurant" => {
            return Command::FavoriteRestaurant
        }
        _ => {}
    }

    if let Some(rest) = strip_word(&text, &["remove", "delete"]) {
        return Command::Remove(rest.to_string());
    }
    if let Some(rest) = strip_word(&text, &["favorite", "favourite"]) {
        return Command::FavoriteItem(rest.to_string());
    }
    if strip_word(&text, &["search", "find"]).is_some() {
        return Command::NewSearch;
    }
    Command::Other
}

/// Text after a leading keyword followed by whitespace, if present.
fn strip_word<'a>(text: &'a str, words: &[&str]) -> Option<&'a str> {
    words.iter().find_map(|word| {
        let rest = text.strip_prefix(word)?;
        if rest.starts_with(char::is_whitespace) {
            let rest = rest.trim();
            (!rest.is_empty()).then_some(rest)
        } else {
            None
        }
    })
}

/// First run of ASCII digits in `input`.
pub fn first_integer(input: &str) -> Option<u64> {
    integer_regex()
        .find(input)
        .and_then(|m| m.as_str().parse().ok())
}

/// Pick an element of `names` from user input.
///
/// The first integer in the input is taken as a 1-based ordinal when it is
/// in range. Otherwise falls back to a case-insensitive substring match in
/// either direction. Returns a 0-based index.
pub fn select<S: AsRef<str>>(input: &str, names: &[S]) -> Option<usize> {
    if let Some(n) = first_integer(input) {
        if n >= 1 && n <= names.len() as u64 {
            return Some((n - 1) as usize);
        }
    }

    let needle = normalize(input);
    if needle.is_empty() {
        return None;
    }
    names.iter().position(|name| {
        let name = name.as_ref().to_lowercase();
        !name.is_empty() && (name.contains(&needle) || needle.contains(&name))
    })
}

/// An item reference with an optional explicit quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRequest {
    pub quantity: Option<u32>,
    pub target: String,
}

impl ItemRequest {
    pub fn quantity_or_one(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }
}

/// Parse "2 of item 1", "3x margherita", "add caesar salad to cart".
///
/// A bare number is an ordinal, not a quantity. Returns `None` for an
/// explicit quantity of zero or above [`MAX_QUANTITY`], or an empty
/// reference.
pub fn parse_item_request(input: &str) -> Option<ItemRequest> {
    let text = normalize(input);
    let text = leading_verb_regex().replace(&text, "");
    let text = trailing_filler_regex().replace(&text, "");
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = quantity_regex().captures(text) {
        let digits = &caps[1];
        let target = caps[2].trim();
        if target.is_empty() {
            return Some(ItemRequest {
                quantity: None,
                target: digits.to_string(),
            });
        }
        let quantity: u32 = digits.parse().ok()?;
        if quantity == 0 || quantity > MAX_QUANTITY {
            return None;
        }
        return Some(ItemRequest {
            quantity: Some(quantity),
            target: target.to_string(),
        });
    }

    Some(ItemRequest {
        quantity: None,
        target: text.to_string(),
    })
}
