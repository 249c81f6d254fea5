use axum::async_trait;
use axum::extract::FromRef;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use clap::ValueEnum;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const PARENT_ROLE: &str = "parent";
const DEFAULT_ROLE: &str = "user";

pub const DEFAULT_ISSUER: &str = "aupairly-api";
pub const DEFAULT_AUDIENCE: &str = "aupairly-users";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum JwtAlgorithm {
    Hs256,
    Hs384,
    Hs512,
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(value: JwtAlgorithm) -> Self {
        match value {
            JwtAlgorithm::Hs256 => Algorithm::HS256,
            JwtAlgorithm::Hs384 => Algorithm::HS384,
            JwtAlgorithm::Hs512 => Algorithm::HS512,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_algorithm: JwtAlgorithm,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl AuthConfig {
    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.jwt_algorithm.into());
        match &self.issuer {
            Some(issuer) => validation.set_issuer(&[issuer]),
            None => validation.iss = None,
        }
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation
    }
}

/// The authenticated caller. For parents `requester_id` is also their
/// preference profile id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub requester_id: i64,
    pub role: String,
}

impl AuthUser {
    pub fn is_parent(&self) -> bool {
        self.role == PARENT_ROLE
    }

    pub fn require_parent(&self, action: &str) -> Result<i64, ApiError> {
        if self.is_parent() {
            Ok(self.requester_id)
        } else {
            Err(ApiError::Forbidden(format!("only parents can {action}")))
        }
    }
}

/// Token payload. `userId` is what the account service writes; `sub` is
/// accepted when it carries a numeric id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, alias = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: usize,
}

impl Claims {
    fn requester_id(&self) -> Option<i64> {
        self.user_id
            .or_else(|| self.sub.as_deref().and_then(|sub| sub.parse().ok()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AuthConfig::from_ref(state);
        authorize_jwt(parts, &config)
    }
}

fn authorize_jwt(parts: &Parts, config: &AuthConfig) -> Result<AuthUser, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("expected Bearer token".into()))?;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &config.validation(),
    )
    .map_err(|err| ApiError::Unauthorized(format!("invalid token: {err}")))?;

    let requester_id = data
        .claims
        .requester_id()
        .ok_or_else(|| ApiError::Unauthorized("token carries no user id".into()))?;

    Ok(AuthUser {
        requester_id,
        role: data
            .claims
            .role
            .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "test-secret";

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SECRET.into(),
            jwt_algorithm: JwtAlgorithm::Hs256,
            issuer: Some(DEFAULT_ISSUER.into()),
            audience: Some(DEFAULT_AUDIENCE.into()),
        }
    }

    fn far_future() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    fn token(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(user_id: Option<i64>, role: Option<&str>) -> Claims {
        Claims {
            user_id,
            sub: None,
            role: role.map(str::to_string),
            iss: Some(DEFAULT_ISSUER.into()),
            aud: Some(DEFAULT_AUDIENCE.into()),
            exp: far_future(),
        }
    }

    fn parts_with(header: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn accepts_user_id_claim_in_camel_case() {
        let parsed: Claims = serde_json::from_value(serde_json::json!({
            "userId": 12, "role": "parent", "exp": 1
        }))
        .unwrap();
        assert_eq!(parsed.requester_id(), Some(12));
    }

    #[test]
    fn numeric_sub_is_a_fallback_id() {
        let mut c = claims(None, Some("parent"));
        c.sub = Some("44".into());
        assert_eq!(c.requester_id(), Some(44));
    }

    #[test]
    fn decodes_a_valid_parent_token() {
        let parts = parts_with(Some(format!(
            "Bearer {}",
            token(&claims(Some(7), Some("parent")), SECRET)
        )));

        let user = authorize_jwt(&parts, &config()).unwrap();
        assert_eq!(user.requester_id, 7);
        assert!(user.is_parent());
        assert_eq!(user.require_parent("rate au pairs").unwrap(), 7);
    }

    #[test]
    fn missing_role_defaults_to_plain_user() {
        let parts = parts_with(Some(format!(
            "Bearer {}",
            token(&claims(Some(7), None), SECRET)
        )));

        let user = authorize_jwt(&parts, &config()).unwrap();
        assert_eq!(user.role, "user");
        assert!(matches!(
            user.require_parent("rate au pairs"),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn rejects_missing_or_forged_tokens() {
        assert!(matches!(
            authorize_jwt(&parts_with(None), &config()),
            Err(ApiError::Unauthorized(_))
        ));

        let forged = parts_with(Some(format!(
            "Bearer {}",
            token(&claims(Some(7), Some("parent")), "other-secret")
        )));
        assert!(matches!(
            authorize_jwt(&forged, &config()),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn rejects_tokens_without_an_id() {
        let parts = parts_with(Some(format!(
            "Bearer {}",
            token(&claims(None, Some("parent")), SECRET)
        )));
        assert!(matches!(
            authorize_jwt(&parts, &config()),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
