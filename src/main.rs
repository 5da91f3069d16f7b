use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use clap_serde_derive::ClapSerde;
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use url::Url;

use crate::adapters::tabular::{TabularAdapter, TabularResponse};
use crate::adapters::text::{TextAdapter, TextResponse};
use crate::config::Config;
use crate::endpoint::{EndpointConfig, HttpEndpoint};
use crate::error::RelayResult;

mod adapters;
mod config;
mod endpoint;
mod error;
mod telemetry;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env, default_value = "InferenceRelay.toml")]
    config_file: String,

    /// Configuration options
    #[command(flatten)]
    pub opt_config: <Config as ClapSerde>::Opt,
}

#[derive(Clone)]
struct AppState {
    tabular: Arc<TabularAdapter<HttpEndpoint>>,
    text: Arc<TextAdapter<HttpEndpoint>>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    telemetry::init_telemetry();

    let args = Args::parse();
    let config = match Config::from_toml(&args.config_file) {
        Ok(conf) => conf.merge(args.opt_config),
        Err(err) => {
            if args.config_file == "InferenceRelay.toml" {
                Config::default().merge(args.opt_config)
            } else {
                exit_err!(
                    1,
                    "Failed to read configuration file {} with error: {}",
                    args.config_file,
                    err
                );
            }
        }
    };

    let timeout = Duration::from_secs(config.request_timeout);
    let state = AppState {
        tabular: Arc::new(TabularAdapter::new(build_endpoint(
            &config.tabular_endpoint,
            "text/csv",
            timeout,
        ))),
        text: Arc::new(TextAdapter::new(build_endpoint(
            &config.text_endpoint,
            "application/json",
            timeout,
        ))),
    };

    let tabular_router = Router::new().route("/predict", post(handle_tabular_request));
    let text_router = Router::new().route("/classify", post(handle_text_request));

    let router = Router::new()
        .nest("/tabular", tabular_router)
        .nest("/text", text_router)
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = TcpListener::bind(format!("{}:{}", config.address, config.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn build_endpoint(url: &str, content_type: &'static str, timeout: Duration) -> HttpEndpoint {
    let url = match Url::parse(url) {
        Ok(url) => url,
        Err(err) => exit_err!(1, "Invalid endpoint URL {} with error: {}", url, err),
    };

    match HttpEndpoint::new(EndpointConfig {
        url,
        content_type,
        timeout,
    }) {
        Ok(endpoint) => endpoint,
        Err(err) => exit_err!(1, "Failed to build endpoint client with error: {}", err),
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down..."),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}

#[axum_macros::debug_handler]
async fn handle_tabular_request(
    State(state): State<AppState>,
    Json(event): Json<Value>,
) -> RelayResult<(StatusCode, Json<TabularResponse>)> {
    match state.tabular.handle(event).await {
        Ok(prediction) => Ok((StatusCode::OK, Json(TabularResponse { prediction }))),
        Err(err) => {
            error!("Failed to relay tabular request: {err}");
            Err(err.into())
        }
    }
}

#[axum_macros::debug_handler]
async fn handle_text_request(
    State(state): State<AppState>,
    Json(event): Json<Value>,
) -> RelayResult<(StatusCode, Json<TextResponse>)> {
    match state.text.handle(event).await {
        Ok(predictions) => Ok((StatusCode::OK, Json(TextResponse { predictions }))),
        Err(err) => {
            error!("Failed to relay text request: {err}");
            Err(err.into())
        }
    }
}

async fn handle_health() -> StatusCode {
    StatusCode::OK
}

#[macro_export]
macro_rules! exit_err {
    ($code:expr, $fmt:expr $(, $arg:expr)*) => {
        {
            error!($fmt $(, $arg)*);
            std::process::exit($code);
        }
    };
}
