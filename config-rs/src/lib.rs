//! config-rs/lib.rs
//! Shared configuration for the ACT dispatch service
//! Values are read from the environment exactly once at startup and passed
//! into constructors by reference; nothing in the lower layers consults the
//! environment on its own.

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Get an environment variable with a fallback default
///
/// # Arguments
/// * `key` - The environment variable name
/// * `default` - The value to use when the variable is unset or empty
pub fn get_env_or_default(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// Get a port number from the environment with proper fallback
///
/// # Arguments
/// * `key` - The environment variable name (e.g. "SERVER_PORT")
/// * `default_port` - The default port to use if not specified in environment
pub fn get_port_or_default(key: &str, default_port: u16) -> u16 {
    env::var(key)
        .unwrap_or_else(|_| default_port.to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            log::warn!("Invalid port in {}, using default {}", key, default_port);
            default_port
        })
}

/// Durable-execution engine settings: the namespace executions run under and
/// the task queue the workflow and activity workers listen on.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub namespace: String,
    pub task_queue: String,
}

impl EngineConfig {
    /// Build the engine configuration from the environment
    ///
    /// Recognized variables:
    /// * `ENGINE_NAMESPACE` - execution namespace (default "act-usecases")
    /// * `ENGINE_TASK_QUEUE` - task queue name (default "act-communication-task-queue")
    pub fn from_env() -> Self {
        Self {
            namespace: get_env_or_default("ENGINE_NAMESPACE", "act-usecases"),
            task_queue: get_env_or_default("ENGINE_TASK_QUEUE", "act-communication-task-queue"),
        }
    }
}

/// HTTP server settings for the gateway binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

impl ServerConfig {
    /// Build the server configuration from the environment
    ///
    /// Recognized variables:
    /// * `SERVER_PORT` - listen port (default 8501)
    /// * `SSL_CERT_FILE` - PEM certificate path (default "cert.pem")
    /// * `SSL_KEY_FILE` - PEM private key path (default "key.pem")
    pub fn from_env() -> Self {
        Self {
            port: get_port_or_default("SERVER_PORT", 8501),
            cert_file: PathBuf::from(get_env_or_default("SSL_CERT_FILE", "cert.pem")),
            key_file: PathBuf::from(get_env_or_default("SSL_KEY_FILE", "key.pem")),
        }
    }

    /// The address the server binds to
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// True when both the certificate and the private key exist on disk.
    /// The gateway serves plain HTTP otherwise.
    pub fn tls_available(&self) -> bool {
        file_exists(&self.cert_file) && file_exists(&self.key_file)
    }
}

fn file_exists(path: &Path) -> bool {
    path.metadata().is_ok()
}
