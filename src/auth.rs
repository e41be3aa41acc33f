use crate::config::{AuthConfig, Config};
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::{User, UserRole};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::r#gen::OpenApiGenerator;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Claims carried by the bearer token. The role is embedded for logging only;
/// authorization always consults the role freshly loaded from the database.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(user: &User, auth_config: &AuthConfig) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        role: user.role,
        iat: now,
        exp: now + auth_config.jwt_expiry_seconds,
    };

    let token = jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(auth_config.jwt_secret.as_bytes()))?;
    Ok(token)
}

pub fn decode_token(token: &str, auth_config: &AuthConfig) -> Result<Claims, AppError> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth_config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

pub(crate) fn parse_bearer_header(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let Some(token) = req.headers().get_one("Authorization").and_then(parse_bearer_header) else {
            return Outcome::Error((Status::Unauthorized, AppError::Unauthorized));
        };

        let Some(config) = req.rocket().state::<Config>() else {
            return Outcome::Error((Status::InternalServerError, AppError::Unauthorized));
        };

        let claims = match decode_token(token, &config.auth) {
            Ok(claims) => claims,
            Err(err) => return Outcome::Error((Status::Unauthorized, err)),
        };

        let Some(pool) = req.rocket().state::<PgPool>() else {
            return Outcome::Error((Status::InternalServerError, AppError::Unauthorized));
        };
        let repo = PostgresRepository { pool: pool.clone() };

        match repo.get_user_by_id(&claims.sub).await {
            Ok(Some(user)) => {
                let current_user = CurrentUser {
                    id: user.id,
                    name: user.name,
                    role: user.role,
                };
                req.local_cache(|| Some(current_user.clone()));
                Outcome::Success(current_user)
            }
            Ok(None) => Outcome::Error((Status::Unauthorized, AppError::InvalidCredentials)),
            Err(err) => Outcome::Error((Status::InternalServerError, err)),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for CurrentUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some("Bearer token authentication. Obtain a token via POST /api/auth/login.".to_string()),
            data: SecuritySchemeData::Http {
                scheme: "bearer".to_string(),
                bearer_format: Some("JWT".to_string()),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("bearerAuth".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("bearerAuth".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Unauthorized - Authentication required".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password_hash: "unused".to_string(),
            phone: None,
            avatar_url: None,
            role: UserRole::User,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_decodes_back_to_the_same_claims() {
        let auth_config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_seconds: 3600,
            lookup_timeout_seconds: 15,
        };
        let user = test_user();

        let token = issue_token(&user, &auth_config).expect("token issued");
        let claims = decode_token(&token, &auth_config).expect("token decodes");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, UserRole::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_a_different_secret_is_rejected() {
        let signing = AuthConfig {
            jwt_secret: "secret-a".to_string(),
            jwt_expiry_seconds: 3600,
            lookup_timeout_seconds: 15,
        };
        let verifying = AuthConfig {
            jwt_secret: "secret-b".to_string(),
            ..signing.clone()
        };

        let token = issue_token(&test_user(), &signing).expect("token issued");
        assert!(decode_token(&token, &verifying).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth_config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_seconds: -3600,
            lookup_timeout_seconds: 15,
        };

        let token = issue_token(&test_user(), &auth_config).expect("token issued");
        assert!(decode_token(&token, &auth_config).is_err());
    }

    #[test]
    fn parse_bearer_header_accepts_well_formed_values() {
        assert_eq!(parse_bearer_header("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(parse_bearer_header("Bearer "), None);
        assert_eq!(parse_bearer_header("Basic abc"), None);
        assert_eq!(parse_bearer_header("abc.def.ghi"), None);
    }
}
