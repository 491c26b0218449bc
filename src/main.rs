use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use food_concierge::{
    api,
    client::{ApiClient, OrderingApi},
    config::Config,
    db::SqliteStore,
    engine::{ChatEngine, Conversation},
    favorites::Favorites,
    mcp::{self, FoodOrderingServer},
    render::{self, Capabilities, Platform},
    session::SessionStore,
};

#[derive(Parser)]
#[command(name = "concierge")]
#[command(about = "Conversational food ordering assistant and MCP tool server")]
struct Cli {
    /// Remote ordering API base URL (overrides FOOD_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the chat API and the MCP endpoint over HTTP
    Serve {
        /// Port for HTTP API (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Platform for sessions that don't name one: gpt, web or mobile
        #[arg(long)]
        platform: Option<String>,
    },
    /// Start MCP server via stdio
    Mcp,
    /// Chat with the assistant in the terminal
    Chat {
        /// Rendering platform: gpt, web or mobile
        #[arg(long, default_value = "gpt")]
        platform: String,
    },
}

/// Initialize tracing with output to stderr (for MCP and chat modes) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "food_concierge=debug,tower_http=debug".into()),
    );

    if use_stderr {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn parse_platform(raw: &str) -> anyhow::Result<Platform> {
    Platform::parse(raw)
        .ok_or_else(|| anyhow::anyhow!("Unknown platform '{}'. Must be: gpt, web, or mobile", raw))
}

fn open_favorites() -> anyhow::Result<Favorites> {
    let store = SqliteStore::open_default()?;
    store.migrate()?;
    Ok(Favorites::new(Arc::new(store)))
}

struct Services {
    client: Arc<dyn OrderingApi>,
    engine: Arc<ChatEngine>,
    favorites: Favorites,
    sessions: Arc<SessionStore>,
}

fn build_services(config: &Config) -> anyhow::Result<Services> {
    let client: Arc<dyn OrderingApi> = Arc::new(ApiClient::new(config.api_url.clone()));
    let favorites = open_favorites()?;
    let engine = Arc::new(
        ChatEngine::new(client.clone(), config.engine.clone()).with_favorites(favorites.clone()),
    );
    let sessions = Arc::new(
        SessionStore::new(
            engine.clone(),
            client.clone(),
            config.track_interval,
            config.platform,
        )
        .with_idle_ttl(config.session_ttl),
    );
    Ok(Services {
        client,
        engine,
        favorites,
        sessions,
    })
}

async fn serve(config: Config, host: &str) -> anyhow::Result<()> {
    let services = build_services(&config)?;
    let server = FoodOrderingServer::new(services.client.clone(), services.sessions.clone());

    let app = api::create_router(api::AppState {
        sessions: services.sessions,
        favorites: Some(services.favorites),
        mcp: server,
        api_url: config.api_url.clone(),
    });

    let addr = format!("{}:{}", host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(api_url = %config.api_url, "Food ordering server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn chat(config: Config, platform: Platform) -> anyhow::Result<()> {
    let services = build_services(&config)?;
    let caps = Capabilities::for_platform(platform);
    let engine = services.engine;

    let mut conversation = Conversation::new();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut last = engine.welcome(&caps);
    stdout
        .write_all(format!("{}\n\n> ", render::render(&last, &caps).text).as_bytes())
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if matches!(line, "quit" | "exit") {
            break;
        }
        let input = render::resolve_selection(line, &last, &caps)
            .unwrap_or_else(|| line.to_string());

        last = engine.handle_turn(&mut conversation, &input, &caps).await;
        let rendered = render::render(&last, &caps);
        if !rendered.text.is_empty() {
            stdout.write_all(format!("\n{}\n", rendered.text).as_bytes()).await?;
        }
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout is the protocol channel in MCP mode and the conversation in chat mode
    let use_stderr = matches!(cli.command, Some(Commands::Mcp | Commands::Chat { .. }));
    init_tracing(use_stderr);

    let mut config = Config::from_env();
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    match cli.command {
        Some(Commands::Serve {
            port,
            host,
            platform,
        }) => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(raw) = platform {
                config.platform = parse_platform(&raw)?;
            }
            serve(config, &host).await?;
        }
        Some(Commands::Mcp) => {
            let services = build_services(&config)?;
            let server = FoodOrderingServer::new(services.client, services.sessions);
            mcp::run_stdio_server(server).await?;
        }
        Some(Commands::Chat { platform }) => {
            let platform = parse_platform(&platform)?;
            chat(config, platform).await?;
        }
        None => {
            serve(config, "127.0.0.1").await?;
        }
    }

    Ok(())
}
