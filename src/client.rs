//! HTTP client for the remote food ordering API.
//!
//! The remote service owns every piece of business data: restaurants, menus,
//! orders, payments. This client is a thin typed accessor over it; nothing
//! is cached and nothing is retried.
//!
//! Configuration is via environment variables:
//! - `FOOD_API_URL` - Base URL (default: `https://ai-food-ordering-poc.vercel.app/api/v1`)

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::*;

/// Default URL of the hosted demo API.
pub const DEFAULT_URL: &str = "https://ai-food-ordering-poc.vercel.app/api/v1";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("ordering API unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rejected by ordering API: {0}")]
    BadRequest(String),

    #[error("ordering API error: {0}")]
    Server(String),

    #[error("invalid ordering API URL: {0}")]
    InvalidUrl(String),
}

/// Operations offered by the remote ordering API.
///
/// Every call may fail with a [`ClientError`]; callers in the chat engine
/// treat all failures alike.
#[async_trait]
pub trait OrderingApi: Send + Sync {
    /// Cities where delivery is available.
    async fn cities(&self) -> Result<Vec<String>, ClientError>;

    /// Available cuisine types.
    async fn cuisines(&self) -> Result<Vec<String>, ClientError>;

    /// Restaurants filtered by optional city and cuisine.
    async fn search_restaurants(
        &self,
        city: Option<&str>,
        cuisine: Option<&str>,
    ) -> Result<Vec<Restaurant>, ClientError>;

    /// A restaurant's categorized menu.
    async fn menu(&self, restaurant_id: &str) -> Result<Menu, ClientError>;

    /// Free-text search ("spicy noodles in Chicago under $20").
    async fn intelligent_search(
        &self,
        query: &str,
        location: Option<&str>,
    ) -> Result<IntelligentSearchResult, ClientError>;

    async fn create_order(&self, input: &CreateOrderInput) -> Result<Order, ClientError>;

    async fn process_payment(&self, order_id: &str) -> Result<PaymentReceipt, ClientError>;

    /// Current snapshot of an order.
    async fn order(&self, order_id: &str) -> Result<Order, ClientError>;
}

/// [`OrderingApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Client for `FOOD_API_URL`, or the hosted demo API when unset.
    pub fn from_env() -> Self {
        let base_url = std::env::var("FOOD_API_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        Self::new(base_url)
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of an endpoint under the base URL. Each segment is
    /// percent-encoded, so ids can't escape their path position.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: reqwest::Method,
        segments: &[&str],
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "remote api request");
        Ok(self.client.request(method, url))
    }

    /// Decode a 2xx body, or map the status to a [`ClientError`] carrying the body text.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }
}

#[async_trait]
impl OrderingApi for ApiClient {
    async fn cities(&self) -> Result<Vec<String>, ClientError> {
        let response = self
            .request(reqwest::Method::GET, &["cities"])?
            .send()
            .await?;
        let body: CitiesResponse = self.handle_response(response).await?;
        Ok(body.cities)
    }

    async fn cuisines(&self) -> Result<Vec<String>, ClientError> {
        let response = self
            .request(reqwest::Method::GET, &["cuisines"])?
            .send()
            .await?;
        let body: CuisinesResponse = self.handle_response(response).await?;
        Ok(body.cuisines)
    }

    async fn search_restaurants(
        &self,
        city: Option<&str>,
        cuisine: Option<&str>,
    ) -> Result<Vec<Restaurant>, ClientError> {
        let mut params = vec![];
        if let Some(c) = city {
            params.push(("city", c));
        }
        if let Some(c) = cuisine {
            params.push(("cuisine", c));
        }

        let response = self
            .request(reqwest::Method::GET, &["restaurants", "search"])?
            .query(&params)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn menu(&self, restaurant_id: &str) -> Result<Menu, ClientError> {
        let response = self
            .request(reqwest::Method::GET, &["restaurants", restaurant_id, "menu"])?
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn intelligent_search(
        &self,
        query: &str,
        location: Option<&str>,
    ) -> Result<IntelligentSearchResult, ClientError> {
        let mut params = vec![("query", query)];
        if let Some(l) = location {
            params.push(("location", l));
        }

        let response = self
            .request(reqwest::Method::GET, &["search", "intelligent"])?
            .query(&params)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn create_order(&self, input: &CreateOrderInput) -> Result<Order, ClientError> {
        let response = self
            .request(reqwest::Method::POST, &["orders", "create"])?
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn process_payment(&self, order_id: &str) -> Result<PaymentReceipt, ClientError> {
        let response = self
            .request(reqwest::Method::POST, &["orders", order_id, "payment"])?
            .json(&serde_json::json!({
                "payment_method": {
                    "type": "credit_card",
                    "last_four": "4242"
                }
            }))
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn order(&self, order_id: &str) -> Result<Order, ClientError> {
        let response = self
            .request(reqwest::Method::GET, &["orders", order_id])?
            .send()
            .await?;
        self.handle_response(response).await
    }
}
