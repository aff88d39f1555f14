//! CLI and environment configuration.

use std::path::PathBuf;

use clap::Parser;
use reactor_http::pool::DEFAULT_WORKERS;
use reactor_http::server::ServerConfig;

/// Server configuration, from flags or `REACTOR_*` environment variables
/// (flags win).
#[derive(Parser, Debug, Clone)]
#[command(name = "reactor-web", version, about = "an event-driven http/1.1 web server")]
pub struct Config {
    /// Address to bind.
    #[arg(long, env = "REACTOR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind; 0 picks an ephemeral port.
    #[arg(long, env = "REACTOR_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Worker threads in the pool.
    #[arg(long, env = "REACTOR_WORKERS", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Directory served under /public.
    #[arg(long, env = "REACTOR_PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Directory holding the page templates.
    #[arg(long, env = "REACTOR_PAGES_DIR", default_value = "pages")]
    pub pages_dir: PathBuf,

    /// Log level: trace, debug, info, warn or error.
    #[arg(long, env = "REACTOR_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig { host: self.host.clone(), port: self.port, workers: self.workers }
    }
}
