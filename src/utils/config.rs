use std::env;

/// Runtime settings, read once at startup from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mongodb_uri: String,
    pub database_name: String,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub service_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "rust_blogdb".to_string()),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(8000),
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        }
    }
}

#[cfg(test)]
impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            database_name: "rust_blogdb".to_string(),
            redis_url: None,
            jwt_secret: "secret".to_string(),
            host: "localhost".to_string(),
            port: 8000,
            service_name: "Unknown".to_string(),
        }
    }
}
