// act-gateway-rs/src/main.rs
// Main entry point: builds configuration once, starts the in-process engine
// worker, and serves the HTTP boundary with graceful shutdown. TLS is used
// when the configured certificate files exist; otherwise the gateway falls
// back to plain HTTP.

use std::sync::Arc;
use std::time::Duration;

use axum_server::tls_rustls::RustlsConfig;

use act_core::{AllowAllChecker, DispatchAdapter};
use act_gateway::{build_router, start_engine, AppState, START_TIME};
use config_rs::{EngineConfig, ServerConfig};
use durable_engine::ExecutionEngine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let _ = *START_TIME;

    let server_config = ServerConfig::from_env();
    let engine_config = EngineConfig::from_env();
    log::info!(
        "act gateway starting: namespace={} task_queue={} port={}",
        engine_config.namespace,
        engine_config.task_queue,
        server_config.port
    );

    let engine = start_engine(&engine_config).await;
    let engine: Arc<dyn ExecutionEngine> = engine;
    let adapter = Arc::new(DispatchAdapter::new(engine, &engine_config));

    let state = AppState {
        adapter,
        auth: Arc::new(AllowAllChecker),
    };
    let app = build_router(state);
    let addr = server_config.bind_address();

    if server_config.tls_available() {
        log::info!("starting HTTPS server on {}", addr);
        let tls = RustlsConfig::from_pem_file(&server_config.cert_file, &server_config.key_file)
            .await?;
        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown_handle.graceful_shutdown(Some(Duration::from_secs(30)));
        });
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app.into_make_service())
            .await?;
    } else {
        log::warn!(
            "TLS certificate files not found ({} / {}), serving plain HTTP",
            server_config.cert_file.display(),
            server_config.key_file.display()
        );
        log::info!("starting HTTP server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    }

    log::info!("act gateway stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install ctrl-c handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => log::error!("failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}
