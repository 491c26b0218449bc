//! Platform capabilities and presentation of engine replies.
//!
//! The engine only decides *what* to say; this module decides how a reply
//! looks on a given platform. Text-only platforms get a numbered option
//! list appended to the message and can answer with a number, except on
//! the menu, whose own listing already numbers the dishes.

use serde::{Deserialize, Serialize};

use crate::engine::{ChatAction, ChatReply, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Gpt,
    Web,
    Mobile,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gpt => "gpt",
            Self::Web => "web",
            Self::Mobile => "mobile",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gpt" => Some(Self::Gpt),
            "web" => Some(Self::Web),
            "mobile" => Some(Self::Mobile),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Buttons,
    Text,
    Hybrid,
}

/// What a client platform can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub platform: Platform,
    pub display_mode: DisplayMode,
    pub buttons: bool,
    pub rich_text: bool,
    pub images: bool,
    pub animations: bool,
    pub quick_actions: bool,
    pub voice_input: bool,
    /// Upper bound on options offered in one reply.
    pub max_options: usize,
}

impl Capabilities {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Gpt => Self {
                platform,
                display_mode: DisplayMode::Text,
                buttons: false,
                rich_text: false,
                images: false,
                animations: false,
                quick_actions: false,
                voice_input: false,
                max_options: 5,
            },
            Platform::Web => Self {
                platform,
                display_mode: DisplayMode::Buttons,
                buttons: true,
                rich_text: true,
                images: true,
                animations: true,
                quick_actions: true,
                voice_input: false,
                max_options: 10,
            },
            Platform::Mobile => Self {
                platform,
                display_mode: DisplayMode::Hybrid,
                buttons: true,
                rich_text: true,
                images: true,
                animations: false,
                quick_actions: true,
                voice_input: true,
                max_options: 10,
            },
        }
    }

    pub fn text_only(&self) -> bool {
        !self.buttons
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::for_platform(Platform::Web)
    }
}

/// A reply ready to show to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedReply {
    pub text: String,
    /// Empty on text-only platforms, where options are part of `text`.
    pub actions: Vec<ChatAction>,
    pub stage: Stage,
}

pub fn render(reply: &ChatReply, caps: &Capabilities) -> RenderedReply {
    // Silent replies stay silent on every platform.
    if reply.message.is_empty() {
        return RenderedReply {
            text: String::new(),
            actions: if caps.buttons {
                reply.actions.clone()
            } else {
                Vec::new()
            },
            stage: reply.stage,
        };
    }

    let mut text = if caps.rich_text {
        reply.message.clone()
    } else {
        reply.message.replace("**", "")
    };

    if caps.text_only() {
        if !reply.actions.is_empty() && numbered(reply.stage) {
            text.push_str("\n\n");
            for (i, action) in reply.actions.iter().enumerate() {
                text.push_str(&format!("{}. {}\n", i + 1, action.label));
            }
            text.push_str("\nType the number to select.");
        } else if !reply.actions.is_empty() {
            let labels: Vec<&str> = reply.actions.iter().map(|a| a.label.as_str()).collect();
            text.push_str(&format!("\n\nYou can also type: {}.", labels.join(" or ")));
        }
        return RenderedReply {
            text,
            actions: Vec::new(),
            stage: reply.stage,
        };
    }

    RenderedReply {
        text,
        actions: reply.actions.clone(),
        stage: reply.stage,
    }
}

/// Whether text-only replies at this stage number their options. Menu
/// stages don't: numbers there refer to the dishes in the menu listing.
fn numbered(stage: Stage) -> bool {
    !matches!(stage, Stage::ViewingMenu | Stage::AddingItems)
}

/// Map text typed on a text-only platform back to an action offered by
/// `last`, the previous reply.
///
/// A whole number picks the option at that 1-based position when the
/// options were numbered. Otherwise an input of at least three characters
/// picks the first option whose label contains it. Button platforms send
/// action values directly, so this is always `None` for them.
pub fn resolve_selection(input: &str, last: &ChatReply, caps: &Capabilities) -> Option<String> {
    let actions = &last.actions;
    if !caps.text_only() || actions.is_empty() {
        return None;
    }
    let input = input.trim();

    if let Ok(n) = input.parse::<usize>() {
        if !numbered(last.stage) {
            return None;
        }
        return n
            .checked_sub(1)
            .and_then(|idx| actions.get(idx))
            .map(|a| a.value.clone());
    }

    if input.chars().count() < 3 {
        return None;
    }
    let needle = input.to_lowercase();
    actions
        .iter()
        .find(|a| a.label.to_lowercase().contains(&needle))
        .map(|a| a.value.clone())
}
