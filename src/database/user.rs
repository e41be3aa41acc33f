use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::{UpdateProfileRequest, User, role_from_db};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, Salt, SaltString};
use sqlx::Row;
use sqlx::postgres::PgRow;
use std::sync::LazyLock;
use uuid::Uuid;

const USER_COLUMNS: &str = r#"
    id, name, email, password_hash, phone, avatar_url, role::text as role, created_at
"#;

/// A real Argon2 hash generated once at startup, used as a timing decoy
/// so that login requests for non-existent users take the same time as
/// requests for existing users.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"dummy-never-matches", Salt::from(&salt))
        .expect("failed to generate dummy hash")
        .to_string()
});

fn map_row_to_user(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        phone: row.get("phone"),
        avatar_url: row.get("avatar_url"),
        role: role_from_db(row.get::<String, _>("role")),
        created_at: row.get("created_at"),
    }
}

impl PostgresRepository {
    pub async fn create_user(&self, name: &str, email: &str, password: &str, phone: Option<&str>) -> Result<User, AppError> {
        let hash = password_hash(password);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .bind(&hash)
        .bind(phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            // The unique index on email is the final arbiter of duplicates.
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::UserAlreadyExists(email.to_string()),
            _ => AppError::db("Failed to create user", e),
        })?;

        Ok(map_row_to_user(&row))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1
            "#
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    pub async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    pub fn verify_password(&self, user: &User, password: &str) -> Result<(), AppError> {
        let password_hash = PasswordHash::new(&user.password_hash).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &password_hash)
            .map_err(|_| AppError::InvalidCredentials)?;

        Ok(())
    }

    /// Perform a throwaway Argon2 verification to equalize response timing
    /// regardless of whether the target account exists.
    pub fn dummy_verify(password: &str) {
        let hash = PasswordHash::new(&DUMMY_HASH).expect("invalid dummy hash");
        let _ = Argon2::default().verify_password(password.as_bytes(), &hash);
    }

    /// Partial profile update; absent fields keep their current values.
    pub async fn update_profile(&self, id: &Uuid, request: &UpdateProfileRequest) -> Result<User, AppError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($1, name),
                email = COALESCE($2, email),
                phone = COALESCE($3, phone),
                avatar_url = COALESCE($4, avatar_url)
            WHERE id = $5
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(request.name.as_deref())
        .bind(request.email.as_deref())
        .bind(request.phone.as_deref())
        .bind(request.avatar_url.as_deref())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::db("Failed to update profile", e))?;

        row.as_ref().map(map_row_to_user).ok_or(AppError::NotFound("User not found".to_string()))
    }

    /// Store the sha256 hash of a password-reset token with its expiry,
    /// replacing any previous token for the user.
    pub async fn set_reset_token(&self, user_id: &Uuid, token_hash: &str, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_token_hash = $1, reset_token_expires_at = $2
            WHERE id = $3
            "#,
        )
        .bind(token_hash)
        .bind(expires_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Look up the user holding an unexpired reset token.
    pub async fn get_user_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE reset_token_hash = $1
              AND reset_token_expires_at > NOW()
            "#
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    /// Set a new password and clear the reset token in one statement.
    pub async fn reset_password(&self, user_id: &Uuid, new_password: &str) -> Result<(), AppError> {
        let hash = password_hash(new_password);

        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, reset_token_hash = NULL, reset_token_expires_at = NULL
            WHERE id = $2
            "#,
        )
        .bind(&hash)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

pub(crate) fn password_hash(password: &str) -> String {
    let salt_string = SaltString::generate(&mut OsRng);
    let salt = Salt::from(&salt_string);
    PasswordHash::generate(Argon2::default(), password.as_bytes(), salt)
        .expect("argon2 hashing cannot fail with a fresh salt")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_produces_parseable_argon2_hashes() {
        let hash = password_hash("correct horse battery staple");
        let parsed = PasswordHash::new(&hash).expect("hash parses");
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
    }

    #[test]
    fn password_hash_salts_each_call() {
        assert_ne!(password_hash("same-password"), password_hash("same-password"));
    }

    #[test]
    fn dummy_verify_does_not_panic() {
        PostgresRepository::dummy_verify("anything");
    }
}
