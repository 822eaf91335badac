//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entity::{social_account::SocialAccount, user::User};
use crate::domain::repository::{RefreshTokenStore, SocialAccountRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, nickname::Nickname, provider::Provider, user_id::UserId,
    user_password::UserPassword, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult, StoreResult};

const USER_COLUMNS: &str = r#"
    u.user_id,
    u.email,
    u.nickname,
    u.password_hash,
    u.role,
    u.is_deleted,
    u.created_at,
    u.updated_at
"#;

/// PostgreSQL-backed user and social account repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        insert_user(&self.pool, user).await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.email = $1 AND u.is_deleted = FALSE"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_nickname(&self, nickname: &Nickname) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE nickname = $1 AND is_deleted = FALSE)",
        )
        .bind(nickname.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

// ============================================================================
// Social Account Repository Implementation
// ============================================================================

impl SocialAccountRepository for PgAuthRepository {
    async fn find_linked_user(
        &self,
        provider: Provider,
        provider_id: &str,
    ) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM social_accounts s
            JOIN users u ON u.user_id = s.user_id
            WHERE s.provider = $1 AND s.provider_id = $2 AND u.is_deleted = FALSE
            "#
        ))
        .bind(provider.code())
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn exists_for_user(&self, user_id: &UserId, provider: Provider) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM social_accounts WHERE user_id = $1 AND provider = $2)",
        )
        .bind(user_id.as_uuid())
        .bind(provider.code())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(&self, account: &SocialAccount) -> AuthResult<()> {
        insert_social_account(&self.pool, account).await
    }

    async fn create_with_user(&self, user: &User, account: &SocialAccount) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        insert_user(&mut *tx, user).await?;
        insert_social_account(&mut *tx, account).await?;

        tx.commit().await?;

        Ok(())
    }
}

async fn insert_user<'e, E: PgExecutor<'e>>(executor: E, user: &User) -> AuthResult<()> {
    sqlx::query(
        r#"
        INSERT INTO users (
            user_id,
            email,
            nickname,
            password_hash,
            role,
            is_deleted,
            created_at,
            updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(user.user_id.as_uuid())
    .bind(user.email.as_str())
    .bind(user.nickname.as_str())
    .bind(user.password_hash.as_ref().map(|h| h.as_phc_string()))
    .bind(user.role.code())
    .bind(user.is_deleted)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(executor)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AuthError::EmailTaken
        } else {
            AuthError::Database(e)
        }
    })?;

    Ok(())
}

async fn insert_social_account<'e, E: PgExecutor<'e>>(
    executor: E,
    account: &SocialAccount,
) -> AuthResult<()> {
    sqlx::query(
        r#"
        INSERT INTO social_accounts (
            social_account_id,
            user_id,
            provider,
            provider_id,
            created_at
        ) VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(account.social_account_id.as_uuid())
    .bind(account.user_id.as_uuid())
    .bind(account.provider.code())
    .bind(&account.provider_id)
    .bind(account.created_at)
    .execute(executor)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AuthError::ProviderAlreadyLinked
        } else {
            AuthError::Database(e)
        }
    })?;

    Ok(())
}

// ============================================================================
// Refresh Session Store
// ============================================================================

/// Session store on the `refresh_sessions` table.
///
/// Expiry is evaluated against the database clock. Expired rows read as
/// absent until [`PgRefreshTokenStore::cleanup_expired`] removes them.
#[derive(Clone)]
pub struct PgRefreshTokenStore {
    pool: PgPool,
}

impl PgRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired sessions
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM refresh_sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired refresh sessions");

        Ok(deleted)
    }
}

fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

impl RefreshTokenStore for PgRefreshTokenStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let token = sqlx::query_scalar::<_, String>(
            "SELECT token FROM refresh_sessions WHERE principal_key = $1 AND expires_at > now()",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    async fn put(&self, key: &str, token: &str, ttl: Duration) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_sessions (principal_key, token, expires_at, updated_at)
            VALUES ($1, $2, now() + $3 * INTERVAL '1 millisecond', now())
            ON CONFLICT (principal_key) DO UPDATE SET
                token = EXCLUDED.token,
                expires_at = EXCLUDED.expires_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(key)
        .bind(token)
        .bind(ttl_millis(ttl))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM refresh_sessions WHERE principal_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn replace_if_matches(
        &self,
        key: &str,
        expected: &str,
        new: &str,
        ttl: Duration,
    ) -> StoreResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE refresh_sessions SET
                token = $3,
                expires_at = now() + $4 * INTERVAL '1 millisecond',
                updated_at = now()
            WHERE principal_key = $1 AND token = $2 AND expires_at > now()
            "#,
        )
        .bind(key)
        .bind(expected)
        .bind(new)
        .bind(ttl_millis(ttl))
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    nickname: String,
    password_hash: Option<String>,
    role: String,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_code(&self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role in storage: {}", self.role)))?;

        let password_hash = self
            .password_hash
            .map(UserPassword::from_phc_string)
            .transpose()?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            email: Email::from_db(self.email),
            nickname: Nickname::from_db(self.nickname),
            password_hash,
            role,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
