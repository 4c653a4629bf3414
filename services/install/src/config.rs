/// Install service configuration loaded from environment variables.
#[derive(Debug)]
pub struct InstallConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Identity provider base URL (e.g. "https://auth.example.com").
    pub identity_url: String,
    /// Service-role key for the identity provider's admin API.
    pub identity_admin_key: String,
    /// Origins echoed back by CORS; anything else gets `*`. Env var:
    /// `ALLOWED_ORIGINS`, comma-separated.
    pub allowed_origins: Vec<String>,
    /// TCP port to listen on (default 3117). Env var: `INSTALL_PORT`.
    pub install_port: u16,
}

impl InstallConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            identity_url: std::env::var("IDENTITY_URL").expect("IDENTITY_URL"),
            identity_admin_key: std::env::var("IDENTITY_ADMIN_KEY").expect("IDENTITY_ADMIN_KEY"),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_owned())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            install_port: std::env::var("INSTALL_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3117),
        }
    }
}
