/// Chat API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the auth service used for profile lookups
    /// (e.g. `http://auth-service:8082`).
    pub auth_service_url: String,
    /// Port the HTTP server binds to.
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// in-cluster defaults.
    pub fn from_env() -> Self {
        Self {
            auth_service_url: std::env::var("AUTH_SERVICE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "http://auth-service:8082".to_string()),
            port: std::env::var("CHAT_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8083),
        }
    }
}
