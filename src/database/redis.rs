use log::info;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

/// Read-only view of the session store shared with the identity service.
///
/// Tokens are written there as `token:{jwt} -> user id` at login; this
/// service only checks that a presented token is still live.
#[derive(Clone)]
pub struct RedisService {
    connection: MultiplexedConnection,
}

impl RedisService {
    pub async fn connect(redis_url: &str) -> Result<Self, String> {
        let client =
            Client::open(redis_url).map_err(|e| format!("Failed to create Redis client: {}", e))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| format!("Failed to connect to Redis: {}", e))?;

        info!("Connected successfully to Redis");

        Ok(Self { connection })
    }

    /// User id the token was issued to, or `None` once the session ended.
    pub async fn validate_session(&self, token: &str) -> Result<Option<String>, String> {
        let mut conn = self.connection.clone();
        let token_key = format!("token:{}", token);

        let user_id: Option<String> = conn
            .get(&token_key)
            .await
            .map_err(|e| format!("Failed to validate session: {}", e))?;

        Ok(user_id)
    }
}
