// src/main.rs

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tokenmill_mcp_server::{
    api::create_router,
    blockchain::EvmFactoryClient,
    config::Config,
    mcp::{
        handler::handle_mcp_request,
        protocol::{error_codes, Request, Response},
    },
    storage::SupabaseClient,
    ActionError, AppState, CreateTokenAction, TokenDeployer,
};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) {
    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    let app = create_router(state);

    info!("🚀 HTTP Server listening on {}", addr);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("❌ Failed to bind {}: {}", addr, e);
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        error!("HTTP server error: {}", e);
    }
}

// --- MCP Server Logic ---
async fn run_mcp_server(state: AppState) {
    info!("🚀 Starting MCP server on stdin/stdout...");

    let mut stdin = io::BufReader::new(io::stdin());
    let mut stdout = io::stdout();

    loop {
        let mut line = String::new();

        match stdin.read_line(&mut line).await {
            Ok(0) => {
                info!("EOF received, shutting down MCP server");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                debug!("Received: {}", line);

                let response = match serde_json::from_str::<Request>(line) {
                    Ok(request) => handle_mcp_request(request, state.clone()).await,
                    Err(parse_error) => {
                        error!("JSON parse error: {}", parse_error);
                        Some(Response::error(
                            serde_json::Value::Null,
                            error_codes::PARSE_ERROR,
                            format!("Parse error: {}", parse_error),
                        ))
                    }
                };

                if let Some(response) = response {
                    if let Ok(response_json) = serde_json::to_string(&response) {
                        debug!("Sending: {}", response_json);
                        if let Err(e) = stdout
                            .write_all(format!("{}\n", response_json).as_bytes())
                            .await
                        {
                            error!("Failed to write response: {}", e);
                            break;
                        }
                        if let Err(e) = stdout.flush().await {
                            error!("Failed to flush response: {}", e);
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        }
    }

    info!("MCP server shutting down");
}

/// Validates the configuration once and wires the deployer. A deployer that
/// cannot be built leaves the action unconfigured; the server still starts
/// so hosts get a readable error per invocation.
fn build_action(config: &Config) -> CreateTokenAction {
    let deploy = match config.deploy_settings() {
        Ok(settings) => settings,
        Err(e) => {
            warn!("⚠️ Token deployment disabled: {}", e);
            return CreateTokenAction::unconfigured(e);
        }
    };
    let storage = match config.storage_settings() {
        Ok(settings) => settings,
        Err(e) => {
            warn!("⚠️ Token deployment disabled: {}", e);
            return CreateTokenAction::unconfigured(e);
        }
    };
    let chain = match EvmFactoryClient::new(&deploy) {
        Ok(client) => client,
        Err(e) => {
            warn!("⚠️ Token deployment disabled: {}", e);
            return CreateTokenAction::unconfigured(ActionError::ConfigurationMissing(vec![
                format!("EVM_PRIVATE_KEY ({})", e),
            ]));
        }
    };

    info!(
        "Deployer ready: signer {:?}, factory {:?}, chain {}",
        chain.sender(),
        deploy.factory,
        deploy.chain_id
    );

    let supabase = Arc::new(SupabaseClient::new(&storage));
    let deployer = TokenDeployer::new(
        deploy,
        storage.bucket.clone(),
        Arc::new(chain),
        supabase.clone(),
        supabase,
    );
    CreateTokenAction::new(Arc::new(deployer))
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tokenmill_mcp_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            return;
        }
    };

    let action = build_action(&config);
    let app_state = AppState {
        config,
        action: Arc::new(action),
    };

    // Check if running in MCP mode (stdin/stdout) or HTTP server mode
    let args: Vec<String> = env::args().collect();
    if args.contains(&"--mcp".to_string()) || env::var("MCP_MODE").is_ok() {
        run_mcp_server(app_state).await;
    } else {
        run_http_server(app_state).await;
    }
}
