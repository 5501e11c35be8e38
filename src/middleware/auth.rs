use crate::database::RedisService;
use crate::utils::config::AppConfig;
use crate::utils::error::CustomError;
use actix_web::{Error, HttpMessage, HttpRequest, dev::ServiceRequest, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{DecodingKey, Validation, decode};
use log::warn;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub exp: usize,
}

/// Verify JWT token and, when a session store is configured, validate the
/// session in Redis
pub async fn verify_token(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let token = credentials.token();
    let secret = match req.app_data::<web::Data<AppConfig>>() {
        Some(config) => config.jwt_secret.clone(),
        None => std::env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()),
    };

    let token_data = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => data,
        Err(_) => return Err((actix_web::error::ErrorUnauthorized("Invalid token"), req)),
    };

    let redis_service = match req.app_data::<web::Data<RedisService>>() {
        Some(service) => service.clone(),
        None => {
            req.extensions_mut().insert(token_data.claims);
            return Ok(req);
        }
    };

    match redis_service.validate_session(token).await {
        Ok(Some(stored_user_id)) if stored_user_id == token_data.claims.id => {
            req.extensions_mut().insert(token_data.claims);
            Ok(req)
        }
        Ok(Some(_)) => Err((actix_web::error::ErrorUnauthorized("Session mismatch"), req)),
        Ok(None) => Err((
            actix_web::error::ErrorUnauthorized("Session expired or invalid"),
            req,
        )),
        Err(e) => {
            // Redis down: fall back to the JWT alone
            warn!("Session lookup failed, accepting JWT only: {}", e);
            req.extensions_mut().insert(token_data.claims);
            Ok(req)
        }
    }
}

/// Get the authenticated user's id (use after auth middleware)
pub fn authenticated_user(req: &HttpRequest) -> Result<ObjectId, CustomError> {
    let user_id = req
        .extensions()
        .get::<Claims>()
        .map(|claims| claims.id.clone())
        .ok_or_else(|| CustomError::UnauthorizedError("Not authenticated".to_string()))?;

    ObjectId::parse_str(&user_id)
        .map_err(|_| CustomError::BadRequestError("Invalid user id in token".to_string()))
}

#[cfg(test)]
pub fn test_token(user_id: &ObjectId, secret: &str) -> String {
    let claims = Claims {
        id: user_id.to_hex(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
