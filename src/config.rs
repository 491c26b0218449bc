//! Runtime configuration loaded from environment variables.

use std::time::Duration;

use crate::client::DEFAULT_URL;
use crate::render::Platform;
use crate::session::DEFAULT_SESSION_TTL;

/// Default port for the standalone HTTP listener.
pub const DEFAULT_PORT: u16 = 8787;

#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the remote ordering API (from FOOD_API_URL)
    pub api_url: String,
    /// Port for the HTTP listener (from PORT)
    pub port: u16,
    /// Platform assumed for sessions that don't name one (from FOOD_PLATFORM)
    pub platform: Platform,
    /// Order status poll interval (from FOOD_TRACK_INTERVAL_SECS)
    pub track_interval: Duration,
    /// Idle time after which a chat session is dropped (from FOOD_SESSION_TTL_SECS)
    pub session_ttl: Duration,
    pub engine: EngineSettings,
}

/// Settings that shape the conversation itself.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    /// Initiate payment right after an order is created (from FOOD_AUTO_PAY)
    pub auto_pay: bool,
    /// Street address used for deliveries (from FOOD_DELIVERY_ADDRESS)
    pub delivery_street: String,
    /// ZIP code used for deliveries (from FOOD_DELIVERY_ZIP)
    pub delivery_zip: String,
    /// Optional location hint passed to intelligent search (from FOOD_LOCATION)
    pub search_location: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            auto_pay: true,
            delivery_street: "123 Main St".to_string(),
            delivery_zip: "10001".to_string(),
            search_location: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let api_url = std::env::var("FOOD_API_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let platform = std::env::var("FOOD_PLATFORM")
            .ok()
            .and_then(|s| Platform::parse(&s))
            .unwrap_or(Platform::Web);

        let track_interval = std::env::var("FOOD_TRACK_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(3));

        let session_ttl = std::env::var("FOOD_SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SESSION_TTL);

        let defaults = EngineSettings::default();
        let engine = EngineSettings {
            auto_pay: std::env::var("FOOD_AUTO_PAY")
                .ok()
                .map(|s| !matches!(s.to_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(defaults.auto_pay),
            delivery_street: std::env::var("FOOD_DELIVERY_ADDRESS")
                .unwrap_or(defaults.delivery_street),
            delivery_zip: std::env::var("FOOD_DELIVERY_ZIP").unwrap_or(defaults.delivery_zip),
            search_location: std::env::var("FOOD_LOCATION").ok().filter(|s| !s.is_empty()),
        };

        Self {
            api_url,
            port,
            platform,
            track_interval,
            session_ttl,
            engine,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_URL.to_string(),
            port: DEFAULT_PORT,
            platform: Platform::Web,
            track_interval: Duration::from_secs(3),
            session_ttl: DEFAULT_SESSION_TTL,
            engine: EngineSettings::default(),
        }
    }
}
