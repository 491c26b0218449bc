//! Shared fixtures: a scripted in-process `OrderingApi` and a fake remote
//! API served over HTTP on an ephemeral port.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Notify;

use food_concierge::client::{ClientError, OrderingApi};
use food_concierge::models::*;

// ============================================================
// Fixtures
// ============================================================

pub fn restaurant(id: &str, name: &str, cuisine: &str, city: &str) -> Restaurant {
    Restaurant {
        id: id.to_string(),
        name: name.to_string(),
        cuisine: cuisine.to_string(),
        location: Location {
            address: "1 Main St".to_string(),
            city: city.to_string(),
            state: if city == "Chicago" { "IL" } else { "NY" }.to_string(),
            zip: "60601".to_string(),
        },
        rating: 4.5,
        price_range: "$$".to_string(),
        delivery_time: "25-35 min".to_string(),
        minimum_order: 0.0,
        delivery_fee: 2.0,
        is_open: true,
    }
}

/// Pizza Palace: $15 minimum, $3 delivery.
pub fn pizza_palace() -> Restaurant {
    Restaurant {
        minimum_order: 15.0,
        delivery_fee: 3.0,
        ..restaurant("rest_1", "Pizza Palace", "Italian", "Chicago")
    }
}

pub fn sushi_spot() -> Restaurant {
    restaurant("rest_2", "Sushi Spot", "Japanese", "New York")
}

pub fn taco_town() -> Restaurant {
    restaurant("rest_3", "Taco Town", "Mexican", "Chicago")
}

pub fn menu_item(id: &str, name: &str, price: f64) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        price,
        vegetarian: false,
        spicy: false,
        popular: false,
    }
}

/// Two categories, flattened as ["Margherita Pizza", "Caesar Salad"].
pub fn pizza_menu() -> Menu {
    Menu {
        categories: vec![
            MenuCategory {
                name: "Pizzas".to_string(),
                items: vec![MenuItem {
                    popular: true,
                    vegetarian: true,
                    ..menu_item("m1", "Margherita Pizza", 12.0)
                }],
            },
            MenuCategory {
                name: "Salads".to_string(),
                items: vec![menu_item("c1", "Caesar Salad", 8.5)],
            },
        ],
    }
}

pub fn sushi_menu() -> Menu {
    Menu {
        categories: vec![MenuCategory {
            name: "Rolls".to_string(),
            items: vec![
                menu_item("s1", "California Roll", 9.0),
                menu_item("s2", "Spicy Tuna Roll", 11.0),
            ],
        }],
    }
}

pub fn taco_menu() -> Menu {
    Menu {
        categories: vec![MenuCategory {
            name: "Tacos".to_string(),
            items: vec![
                menu_item("t1", "Carnitas Taco", 4.0),
                menu_item("t2", "Fish Taco", 5.0),
                menu_item("t3", "Veggie Taco", 3.5),
                menu_item("t4", "Chorizo Taco", 4.5),
                menu_item("t5", "Birria Taco", 6.0),
            ],
        }],
    }
}

pub fn order_for(input: &CreateOrderInput, id: &str, status: OrderStatus) -> Order {
    let subtotal: f64 = input.items.iter().map(|l| l.line_total()).sum();
    let tax = subtotal * 0.0875;
    Order {
        id: id.to_string(),
        restaurant_id: input.restaurant_id.clone(),
        restaurant_name: String::new(),
        items: input.items.clone(),
        subtotal,
        delivery_fee: 3.0,
        tax,
        total: subtotal + 3.0 + tax,
        status,
        estimated_delivery: "2025-01-01T12:30:00Z".to_string(),
    }
}

// ============================================================
// Scripted API
// ============================================================

/// In-process `OrderingApi` with canned data, a call log and switchable
/// failures.
pub struct ScriptedApi {
    restaurants: Vec<Restaurant>,
    suggested: Vec<MenuItem>,
    menus: HashMap<String, Menu>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<String>>,
    orders: Mutex<Vec<CreateOrderInput>>,
    status: Mutex<OrderStatus>,
    search_gate: Mutex<Option<Arc<Notify>>>,
    /// Notified when a gated search has started and is waiting.
    pub search_entered: Arc<Notify>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::with_restaurants(vec![pizza_palace(), sushi_spot(), taco_town()])
    }

    /// Searches find nothing.
    pub fn empty() -> Self {
        Self::with_restaurants(Vec::new())
    }

    pub fn with_restaurants(restaurants: Vec<Restaurant>) -> Self {
        let mut menus = HashMap::new();
        menus.insert("rest_1".to_string(), pizza_menu());
        menus.insert("rest_2".to_string(), sushi_menu());
        menus.insert("rest_3".to_string(), taco_menu());
        Self {
            restaurants,
            suggested: vec![menu_item("m1", "Margherita Pizza", 12.0)],
            menus,
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            orders: Mutex::new(Vec::new()),
            status: Mutex::new(OrderStatus::Confirmed),
            search_gate: Mutex::new(None),
            search_entered: Arc::new(Notify::new()),
        }
    }

    /// Hold the next intelligent search until `gate` is notified.
    pub fn gate_next_search(&self, gate: Arc<Notify>) {
        *self.search_gate.lock().unwrap() = Some(gate);
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub fn set_status(&self, status: OrderStatus) {
        *self.status.lock().unwrap() = status;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn created_orders(&self) -> Vec<CreateOrderInput> {
        self.orders.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, detail: &str) -> Result<(), ClientError> {
        let entry = if detail.is_empty() {
            op.to_string()
        } else {
            format!("{}:{}", op, detail)
        };
        self.calls.lock().unwrap().push(entry);
        if self.failing.lock().unwrap().contains(op) {
            return Err(ClientError::Server(format!("500: {} unavailable", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderingApi for ScriptedApi {
    async fn cities(&self) -> Result<Vec<String>, ClientError> {
        self.record("cities", "")?;
        Ok(vec!["New York".to_string(), "Chicago".to_string()])
    }

    async fn cuisines(&self) -> Result<Vec<String>, ClientError> {
        self.record("cuisines", "")?;
        Ok(vec!["Italian".to_string(), "Japanese".to_string()])
    }

    async fn search_restaurants(
        &self,
        city: Option<&str>,
        cuisine: Option<&str>,
    ) -> Result<Vec<Restaurant>, ClientError> {
        self.record(
            "search_restaurants",
            &format!("{}|{}", city.unwrap_or(""), cuisine.unwrap_or("")),
        )?;
        Ok(self
            .restaurants
            .iter()
            .filter(|r| city.map_or(true, |c| r.location.city == c))
            .filter(|r| cuisine.map_or(true, |c| r.cuisine == c))
            .cloned()
            .collect())
    }

    async fn menu(&self, restaurant_id: &str) -> Result<Menu, ClientError> {
        self.record("menu", restaurant_id)?;
        self.menus
            .get(restaurant_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(restaurant_id.to_string()))
    }

    async fn intelligent_search(
        &self,
        query: &str,
        _location: Option<&str>,
    ) -> Result<IntelligentSearchResult, ClientError> {
        let gate = self.search_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            self.search_entered.notify_one();
            gate.notified().await;
        }
        self.record("intelligent_search", query)?;
        Ok(IntelligentSearchResult {
            restaurants: self.restaurants.clone(),
            suggested_items: if self.restaurants.is_empty() {
                Vec::new()
            } else {
                self.suggested.clone()
            },
            query: query.to_string(),
            parsed: Value::Null,
        })
    }

    async fn create_order(&self, input: &CreateOrderInput) -> Result<Order, ClientError> {
        self.record("create_order", &input.restaurant_id)?;
        let mut orders = self.orders.lock().unwrap();
        orders.push(input.clone());
        let id = format!("ORD-{}", orders.len());
        Ok(order_for(input, &id, OrderStatus::Confirmed))
    }

    async fn process_payment(&self, order_id: &str) -> Result<PaymentReceipt, ClientError> {
        self.record("process_payment", order_id)?;
        Ok(PaymentReceipt {
            success: true,
            transaction_id: format!("txn_{}", order_id),
        })
    }

    async fn order(&self, order_id: &str) -> Result<Order, ClientError> {
        self.record("order", order_id)?;
        let orders = self.orders.lock().unwrap();
        let input = orders
            .first()
            .cloned()
            .ok_or_else(|| ClientError::NotFound(order_id.to_string()))?;
        let status = self.status.lock().unwrap().clone();
        Ok(order_for(&input, order_id, status))
    }
}

// ============================================================
// Fake remote API over HTTP
// ============================================================

#[derive(Deserialize)]
struct SearchParams {
    city: Option<String>,
    cuisine: Option<String>,
}

#[derive(Deserialize)]
struct IntelligentParams {
    query: String,
    location: Option<String>,
}

fn fake_router() -> Router {
    Router::new()
        .route("/cities", get(|| async { Json(json!({ "cities": ["New York", "Chicago"] })) }))
        .route(
            "/cuisines",
            get(|| async { Json(json!({ "cuisines": ["Italian", "Japanese", "Mexican"] })) }),
        )
        .route(
            "/restaurants/search",
            get(|Query(params): Query<SearchParams>| async move {
                let found: Vec<Restaurant> = [pizza_palace(), sushi_spot(), taco_town()]
                    .into_iter()
                    .filter(|r| params.city.as_ref().map_or(true, |c| &r.location.city == c))
                    .filter(|r| params.cuisine.as_ref().map_or(true, |c| &r.cuisine == c))
                    .collect();
                Json(found)
            }),
        )
        .route(
            "/restaurants/{id}/menu",
            get(|Path(id): Path<String>| async move {
                match id.as_str() {
                    "rest_1" => Ok(Json(pizza_menu())),
                    "rest_2" => Ok(Json(sushi_menu())),
                    _ => Err((StatusCode::NOT_FOUND, "Restaurant not found")),
                }
            }),
        )
        .route(
            "/search/intelligent",
            get(|Query(params): Query<IntelligentParams>| async move {
                let restaurants = if params.query.to_lowercase().contains("pizza") {
                    vec![pizza_palace()]
                } else {
                    Vec::new()
                };
                Json(json!({
                    "restaurants": restaurants,
                    "suggested_items": [],
                    "query": params.query,
                    "parsed": { "location": params.location }
                }))
            }),
        )
        .route(
            "/orders/create",
            post(|Json(input): Json<CreateOrderInput>| async move {
                if input.items.is_empty() {
                    return Err((StatusCode::BAD_REQUEST, "Order has no items"));
                }
                Ok(Json(order_for(&input, "ORD-42", OrderStatus::Pending)))
            }),
        )
        .route(
            "/orders/{id}/payment",
            post(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                let card_ok = body["payment_method"]["type"] == "credit_card"
                    && body["payment_method"]["last_four"] == "4242";
                Json(json!({ "success": card_ok, "transaction_id": format!("txn_{}", id) }))
            }),
        )
        .route(
            "/orders/{id}",
            get(|Path(id): Path<String>| async move {
                match id.as_str() {
                    "ORD-42" => Ok(Json(json!({
                        "id": "ORD-42",
                        "restaurant_id": "rest_1",
                        "restaurant_name": "Pizza Palace",
                        "items": [],
                        "subtotal": 24.0,
                        "delivery_fee": 3.0,
                        "tax": 2.1,
                        "total": 29.1,
                        "status": "out_for_delivery",
                        "estimated_delivery": "2025-01-01T12:30:00Z"
                    }))),
                    "explode" => Err((StatusCode::INTERNAL_SERVER_ERROR, "kaboom")),
                    _ => Err((StatusCode::NOT_FOUND, "Order not found")),
                }
            }),
        )
}

/// Serve the fake API on an ephemeral port and return its base URL.
pub async fn spawn_fake_api() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake API");
    let addr = listener.local_addr().expect("Failed to read address");
    tokio::spawn(async move {
        axum::serve(listener, fake_router()).await.ok();
    });
    format!("http://{}", addr)
}

/// Like [`spawn_fake_api`], for synchronous tests: the server runs on its
/// own runtime in a background thread.
pub fn spawn_fake_api_blocking() -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("Failed to build runtime");
        runtime.block_on(async move {
            let url = spawn_fake_api().await;
            tx.send(url).expect("Failed to report fake API address");
            std::future::pending::<()>().await;
        });
    });
    rx.recv().expect("Fake API failed to start")
}
