use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Postgres connection string. The one required setting; startup fails
    /// without it.
    pub database_url: String,

    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,

    /// Absolute prefix for upload URLs (e.g. "https://shop.example.com").
    /// When unset, `/upload` answers with the relative path.
    pub public_base_url: Option<String>,

    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    /// Upper bound on how long a request waits for a pool connection.
    #[serde(default = "default_database_acquire_timeout_secs")]
    pub database_acquire_timeout_secs: u64,

    /// Force TLS while skipping certificate-authority validation. Some
    /// managed Postgres providers terminate TLS with self-signed chains;
    /// leave this off unless the provider requires it.
    #[serde(default)]
    pub database_tls_insecure: bool,

    #[serde(default = "default_rust_log")]
    pub rust_log: String,
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_uploads_dir() -> String {
    "./uploads".to_string()
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_database_acquire_timeout_secs() -> u64 {
    5
}

fn default_rust_log() -> String {
    "info,storefront=debug".to_string()
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
