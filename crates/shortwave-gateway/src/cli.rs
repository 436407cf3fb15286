use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use shortwave_core::LinkStore;
use shortwave_storage::{FileStore, MemoryStore, SqliteStore};

pub const SERVER_ADDRESS_ENV: &str = "SERVER_ADDRESS";
pub const BASE_URL_ENV: &str = "BASE_URL";
pub const FILE_STORAGE_PATH_ENV: &str = "FILE_STORAGE_PATH";
pub const DATABASE_DSN_ENV: &str = "DATABASE_DSN";

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Parser)]
#[command(name = "shortwave-gateway")]
pub struct Cli {
    #[arg(short = 'a', long, env = SERVER_ADDRESS_ENV, default_value = DEFAULT_SERVER_ADDRESS)]
    pub server_address: SocketAddr,

    #[arg(short = 'b', long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(short = 'f', long, env = FILE_STORAGE_PATH_ENV)]
    pub file_storage_path: Option<PathBuf>,

    #[arg(short = 'd', long, env = DATABASE_DSN_ENV)]
    pub database_dsn: Option<String>,
}

impl Cli {
    /// Picks the backend once at startup: DSN wins over file path, and
    /// with neither set the links live in process memory only.
    pub async fn build_store(&self) -> anyhow::Result<Arc<dyn LinkStore>> {
        if let Some(dsn) = &self.database_dsn {
            Ok(Arc::new(SqliteStore::connect(dsn).await?))
        } else if let Some(path) = &self.file_storage_path {
            Ok(Arc::new(FileStore::open(path)?))
        } else {
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
