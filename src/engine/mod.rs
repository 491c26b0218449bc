//! Conversational ordering flow.
//!
//! [`ChatEngine::handle_turn`] interprets one line of input against the
//! conversation's current [`Stage`], calls the remote API when needed and
//! returns the reply. Selecting an action means sending its `value` as the
//! next input, so typed text and button presses go through the same path.
//!
//! Remote failures never change the conversation: the turn is answered
//! with an apology and the state is left as it was.

mod messages;
pub mod parse;
mod types;

use std::sync::Arc;

use crate::client::OrderingApi;
use crate::config::EngineSettings;
use crate::favorites::Favorites;
use crate::models::{CreateOrderInput, DeliveryAddress, Restaurant};
use crate::pricing::{format_usd, shortfall};
use crate::render::Capabilities;

pub use messages::APOLOGY;
pub use parse::{Command, ItemRequest};
pub use types::{ActionKind, ChatAction, ChatReply, Conversation, Stage, Variant};

use parse::{parse_command, parse_item_request, select};

pub struct ChatEngine {
    api: Arc<dyn OrderingApi>,
    favorites: Option<Favorites>,
    settings: EngineSettings,
}

impl ChatEngine {
    pub fn new(api: Arc<dyn OrderingApi>, settings: EngineSettings) -> Self {
        Self {
            api,
            favorites: None,
            settings,
        }
    }

    pub fn with_favorites(mut self, favorites: Favorites) -> Self {
        self.favorites = Some(favorites);
        self
    }

    pub fn favorites(&self) -> Option<&Favorites> {
        self.favorites.as_ref()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Opening message of a fresh conversation.
    pub fn welcome(&self, caps: &Capabilities) -> ChatReply {
        let actions = if caps.quick_actions {
            messages::QUICK_PROMPTS
                .iter()
                .enumerate()
                .map(|(i, prompt)| {
                    ChatAction::command(format!("quick-{}", i + 1), *prompt, *prompt).icon("💬")
                })
                .collect()
        } else {
            Vec::new()
        };
        ChatReply::new(messages::WELCOME, Stage::Search).with_actions(actions)
    }

    /// Reset the conversation and greet again.
    pub fn start_over(&self, conv: &mut Conversation, caps: &Capabilities) -> ChatReply {
        conv.reset();
        tracing::debug!(epoch = conv.epoch, "conversation reset");
        self.welcome(caps)
    }

    pub async fn handle_turn(
        &self,
        conv: &mut Conversation,
        input: &str,
        caps: &Capabilities,
    ) -> ChatReply {
        let input = input.trim();
        let command = parse_command(input);
        tracing::debug!(stage = %conv.stage, input, ?command, "chat turn");

        if input.is_empty() {
            return self.help(conv, caps);
        }

        match &command {
            Command::StartOver => return self.start_over(conv, caps),
            Command::Help => return self.help(conv, caps),
            Command::TrackOrder => return self.track_order(conv, caps).await,
            Command::ShowCart => return self.show_cart(conv, caps),
            Command::Checkout => return self.begin_checkout(conv, caps),
            Command::Confirm | Command::Cancel if conv.stage != Stage::Checkout => {
                return self.reply(conv, caps, messages::NOTHING_TO_CONFIRM)
            }
            _ => {}
        }

        match conv.stage {
            Stage::Search => self.on_search(conv, input, &command, caps).await,
            Stage::ViewingMenu | Stage::AddingItems => {
                self.on_menu(conv, input, &command, caps).await
            }
            Stage::Checkout => self.on_checkout(conv, &command, caps).await,
            Stage::OrderPlaced => self.search(conv, input, caps).await,
        }
    }

    async fn on_search(
        &self,
        conv: &mut Conversation,
        input: &str,
        command: &Command,
        caps: &Capabilities,
    ) -> ChatReply {
        if *command == Command::NewSearch {
            conv.last_results = None;
        }

        let Some(results) = conv.last_results.clone() else {
            return self.search(conv, input, caps).await;
        };

        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        match select(input, &names) {
            Some(idx) => self.open_restaurant(conv, results[idx].clone(), caps).await,
            None => ChatReply::new(messages::reprompt_restaurants(&results), conv.stage)
                .with_actions(restaurant_actions(&results)),
        }
    }

    async fn on_menu(
        &self,
        conv: &mut Conversation,
        input: &str,
        command: &Command,
        caps: &Capabilities,
    ) -> ChatReply {
        match command {
            Command::Menu => self.reopen_menu(conv, caps).await,
            Command::Remove(target) => self.remove(conv, target, caps),
            Command::FavoriteRestaurant => self.favorite_restaurant(conv, caps),
            Command::FavoriteItem(target) => self.favorite_item(conv, target, caps),
            Command::NewSearch => self.search(conv, input, caps).await,
            _ => self.add_item(conv, input, caps),
        }
    }

    async fn on_checkout(
        &self,
        conv: &mut Conversation,
        command: &Command,
        caps: &Capabilities,
    ) -> ChatReply {
        match command {
            Command::Confirm => self.place_order(conv, caps).await,
            Command::Cancel => {
                conv.stage = Stage::AddingItems;
                self.reply(conv, caps, messages::cancelled_checkout())
            }
            _ => {
                let summary = self.order_summary(conv);
                self.reply(conv, caps, messages::checkout_reprompt(&summary))
            }
        }
    }

    /// Run an intelligent search with the input as typed.
    async fn search(&self, conv: &mut Conversation, query: &str, caps: &Capabilities) -> ChatReply {
        let location = self.settings.search_location.as_deref();
        let result = match self.api.intelligent_search(query, location).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, query, "intelligent search failed");
                return self.apology(conv, caps);
            }
        };

        if result.restaurants.is_empty() {
            tracing::debug!(query, "no restaurants matched");
            return ChatReply::new(messages::NO_RESULTS, conv.stage);
        }

        let mut restaurants = result.restaurants;
        restaurants.truncate(caps.max_options);

        let favorites = self
            .favorites
            .as_ref()
            .and_then(|f| f.restaurants().ok())
            .unwrap_or_default();
        let message = messages::restaurant_list(&restaurants, &result.suggested_items, &favorites);
        let actions = restaurant_actions(&restaurants);

        conv.last_results = Some(restaurants);
        conv.stage = Stage::Search;
        ChatReply::new(message, conv.stage).with_actions(actions)
    }

    async fn open_restaurant(
        &self,
        conv: &mut Conversation,
        restaurant: Restaurant,
        caps: &Capabilities,
    ) -> ChatReply {
        let menu = match self.api.menu(&restaurant.id).await {
            Ok(menu) => menu,
            Err(e) => {
                tracing::warn!(error = %e, restaurant_id = %restaurant.id, "menu fetch failed");
                return self.apology(conv, caps);
            }
        };

        let switching = conv
            .restaurant
            .as_ref()
            .is_some_and(|current| current.id != restaurant.id);
        let cart_cleared = switching && !conv.cart.is_empty();
        if switching {
            conv.cart.clear();
        }

        let message = messages::menu_listing(&restaurant, &menu, cart_cleared);
        conv.menu = menu.flatten();
        conv.restaurant = Some(restaurant);
        conv.last_results = None;
        conv.stage = if conv.cart.is_empty() {
            Stage::ViewingMenu
        } else {
            Stage::AddingItems
        };
        self.reply(conv, caps, message)
    }

    async fn reopen_menu(&self, conv: &mut Conversation, caps: &Capabilities) -> ChatReply {
        match conv.restaurant.clone() {
            Some(restaurant) => self.open_restaurant(conv, restaurant, caps).await,
            None => self.help(conv, caps),
        }
    }

    fn add_item(&self, conv: &mut Conversation, input: &str, caps: &Capabilities) -> ChatReply {
        let Some(request) = parse_item_request(input) else {
            return self.reply(conv, caps, messages::item_not_found());
        };
        let Some(idx) = select(&request.target, &menu_names(conv)) else {
            return self.reply(conv, caps, messages::item_not_found());
        };

        let item = conv.menu[idx].clone();
        let quantity = request.quantity_or_one();
        conv.cart.add(&item, quantity);
        conv.stage = Stage::AddingItems;
        tracing::debug!(item_id = %item.id, quantity, "added to cart");

        let message = messages::added(&item, quantity, conv);
        self.reply(conv, caps, message)
    }

    /// Remove a cart line, or part of it when a quantity is given.
    /// Cart lines are referenced by their position in the cart summary.
    fn remove(&self, conv: &mut Conversation, target: &str, caps: &Capabilities) -> ChatReply {
        if conv.cart.is_empty() {
            return self.reply(conv, caps, "Your cart is empty.");
        }
        let names: Vec<String> = conv.cart.lines().iter().map(|l| l.name.clone()).collect();
        let Some(request) = parse_item_request(target) else {
            return self.reply(conv, caps, messages::not_in_cart());
        };
        let Some(idx) = select(&request.target, &names) else {
            return self.reply(conv, caps, messages::not_in_cart());
        };

        let line = conv.cart.lines()[idx].clone();
        let message = match request.quantity {
            Some(quantity) => {
                let remaining = conv.cart.adjust(&line.item_id, -i64::from(quantity));
                messages::removed(&line.name, quantity, remaining)
            }
            None => {
                conv.cart.remove(&line.item_id);
                messages::removed(&line.name, line.quantity, None)
            }
        };

        if conv.cart.is_empty() {
            conv.stage = Stage::ViewingMenu;
        }
        self.reply(conv, caps, message)
    }

    fn favorite_restaurant(&self, conv: &mut Conversation, caps: &Capabilities) -> ChatReply {
        let Some(favorites) = &self.favorites else {
            return self.reply(conv, caps, messages::FAVORITES_UNAVAILABLE);
        };
        let Some(restaurant) = &conv.restaurant else {
            return self.help(conv, caps);
        };
        match favorites.toggle_restaurant(&restaurant.id) {
            Ok(now) => {
                tracing::debug!(restaurant_id = %restaurant.id, favorite = now, "toggled favorite restaurant");
                self.reply(conv, caps, "")
            }
            Err(e) => {
                tracing::warn!(error = %e, "favorite toggle failed");
                self.apology(conv, caps)
            }
        }
    }

    fn favorite_item(&self, conv: &mut Conversation, target: &str, caps: &Capabilities) -> ChatReply {
        let Some(favorites) = &self.favorites else {
            return self.reply(conv, caps, messages::FAVORITES_UNAVAILABLE);
        };
        let Some(idx) = select(target, &menu_names(conv)) else {
            return self.reply(conv, caps, messages::item_not_found());
        };
        let item_id = conv.menu[idx].id.clone();
        match favorites.toggle_dish(&item_id) {
            Ok(now) => {
                tracing::debug!(%item_id, favorite = now, "toggled favorite dish");
                self.reply(conv, caps, "")
            }
            Err(e) => {
                tracing::warn!(error = %e, "favorite toggle failed");
                self.apology(conv, caps)
            }
        }
    }

    fn show_cart(&self, conv: &mut Conversation, caps: &Capabilities) -> ChatReply {
        let mut reply = self.reply(conv, caps, messages::cart_summary(conv));
        if !conv.cart.is_empty() && conv.stage != Stage::Checkout {
            reply.actions = vec![
                checkout_action(),
                ChatAction::command("menu", "Keep browsing", "menu").icon("🍽️"),
            ];
        }
        reply
    }

    fn begin_checkout(&self, conv: &mut Conversation, caps: &Capabilities) -> ChatReply {
        let Some(restaurant) = conv.restaurant.as_ref().filter(|_| !conv.cart.is_empty()) else {
            return self.reply(conv, caps, messages::CART_EMPTY);
        };

        let missing = shortfall(&conv.cart, Some(restaurant));
        if missing > 0.0 {
            let message = messages::below_minimum(restaurant, missing);
            return self.reply(conv, caps, message);
        }

        conv.stage = Stage::Checkout;
        let summary = self.order_summary(conv);
        self.reply(conv, caps, summary)
    }

    async fn place_order(&self, conv: &mut Conversation, caps: &Capabilities) -> ChatReply {
        let Some(restaurant) = conv.restaurant.as_ref().filter(|_| !conv.cart.is_empty()) else {
            conv.stage = Stage::AddingItems;
            return self.reply(conv, caps, messages::CART_EMPTY);
        };

        let input = CreateOrderInput {
            restaurant_id: restaurant.id.clone(),
            items: conv.cart.to_lines(),
            delivery_address: DeliveryAddress {
                address: self.settings.delivery_street.clone(),
                city: restaurant.location.city.clone(),
                state: restaurant.location.state.clone(),
                zip: self.settings.delivery_zip.clone(),
            },
        };

        let order = match self.api.create_order(&input).await {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(error = %e, restaurant_id = %input.restaurant_id, "order creation failed");
                return self.apology(conv, caps);
            }
        };
        tracing::info!(order_id = %order.id, total = %format_usd(order.total), "order placed");

        let paid = if self.settings.auto_pay {
            match self.api.process_payment(&order.id).await {
                Ok(receipt) if receipt.success => Some(true),
                Ok(_) => {
                    tracing::warn!(order_id = %order.id, "payment declined");
                    Some(false)
                }
                Err(e) => {
                    tracing::warn!(error = %e, order_id = %order.id, "payment failed");
                    Some(false)
                }
            }
        } else {
            None
        };

        conv.cart.clear();
        conv.restaurant = None;
        conv.last_results = None;
        conv.menu.clear();
        conv.last_order_id = Some(order.id.clone());
        conv.stage = Stage::OrderPlaced;

        self.reply(conv, caps, messages::order_placed(&order, paid))
    }

    async fn track_order(&self, conv: &mut Conversation, caps: &Capabilities) -> ChatReply {
        let Some(order_id) = conv.last_order_id.clone() else {
            return self.reply(conv, caps, messages::NO_ORDER_YET);
        };
        match self.api.order(&order_id).await {
            Ok(order) => {
                let mut reply = self.reply(conv, caps, messages::order_status(&order));
                if order.status.is_final() {
                    reply.actions.retain(|a| a.value != "track order");
                }
                reply
            }
            Err(e) => {
                tracing::warn!(error = %e, %order_id, "order status fetch failed");
                self.apology(conv, caps)
            }
        }
    }

    fn help(&self, conv: &Conversation, caps: &Capabilities) -> ChatReply {
        self.reply(conv, caps, messages::help(conv))
    }

    fn apology(&self, conv: &Conversation, caps: &Capabilities) -> ChatReply {
        self.reply(conv, caps, APOLOGY)
    }

    fn order_summary(&self, conv: &Conversation) -> String {
        messages::order_summary(
            conv,
            &self.settings.delivery_street,
            &self.settings.delivery_zip,
        )
    }

    /// Reply with the actions that fit the conversation's current stage.
    fn reply(&self, conv: &Conversation, caps: &Capabilities, message: impl Into<String>) -> ChatReply {
        ChatReply::new(message, conv.stage).with_actions(stage_actions(conv, caps))
    }
}

fn menu_names(conv: &Conversation) -> Vec<&str> {
    conv.menu.iter().map(|item| item.name.as_str()).collect()
}

fn restaurant_actions(restaurants: &[Restaurant]) -> Vec<ChatAction> {
    restaurants
        .iter()
        .enumerate()
        .map(|(i, r)| {
            ChatAction::new(
                format!("restaurant-{}", r.id),
                r.name.clone(),
                (i + 1).to_string(),
                ActionKind::Restaurant,
            )
            .icon("🍽️")
            .description(format!(
                "{} · ⭐ {} · {}",
                r.cuisine, r.rating, r.delivery_time
            ))
        })
        .collect()
}

fn checkout_action() -> ChatAction {
    ChatAction::command("checkout", "Checkout", "checkout")
        .variant(Variant::Success)
        .icon("✅")
}

fn stage_actions(conv: &Conversation, caps: &Capabilities) -> Vec<ChatAction> {
    match conv.stage {
        Stage::Search => conv
            .last_results
            .as_deref()
            .map(restaurant_actions)
            .unwrap_or_default(),
        Stage::ViewingMenu | Stage::AddingItems => {
            // Text-only menus list every dish in the message itself.
            let shown = if caps.text_only() {
                0
            } else {
                caps.max_options.saturating_sub(2)
            };
            let mut actions: Vec<ChatAction> = conv
                .menu
                .iter()
                .take(shown)
                .enumerate()
                .map(|(i, item)| {
                    let action = ChatAction::new(
                        format!("item-{}", item.id),
                        format!("{} ({})", item.name, format_usd(item.price)),
                        format!("item {}", i + 1),
                        ActionKind::MenuItem,
                    );
                    if item.description.is_empty() {
                        action
                    } else {
                        action.description(item.description.clone())
                    }
                })
                .collect();
            actions.push(ChatAction::command("view-cart", "View cart", "view cart").icon("🛒"));
            if !conv.cart.is_empty() {
                actions.push(checkout_action());
            }
            actions
        }
        Stage::Checkout => vec![
            ChatAction::command("confirm", "Confirm order", "confirm")
                .variant(Variant::Success)
                .icon("✅"),
            ChatAction::command("cancel", "Cancel", "cancel")
                .variant(Variant::Danger)
                .icon("✖️"),
        ],
        Stage::OrderPlaced => vec![
            ChatAction::command("track-order", "Track order", "track order")
                .variant(Variant::Primary)
                .icon("📍"),
            ChatAction::command("start-over", "Start over", "start over").icon("🔄"),
        ],
    }
}
