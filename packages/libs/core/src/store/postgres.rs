//! PostgreSQL 저장소

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::id::UserId;
use crate::user::User;

use super::{StoreError, UserStore};

const SELECT_USER: &str = r#"SELECT id, provider_id, email, name, picture, status, created_at, updated_at
    FROM users WHERE id = $1"#;

/// `users` 테이블 기반 사용자 저장소
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// 서버 URI + DB 이름으로 연결하고 ping까지 확인
    ///
    /// 연결과 ping 전체가 `connect_timeout` 안에 끝나야 합니다.
    pub async fn connect(
        uri: &str,
        database: &str,
        connect_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let options = PgConnectOptions::from_str(uri)
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .database(database);

        let connect = async {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(connect_timeout)
                .connect_with(options)
                .await?;
            let store = Self { pool };
            store.ping().await?;
            Ok::<_, StoreError>(store)
        };

        tokio::time::timeout(connect_timeout, connect)
            .await
            .map_err(|_| StoreError::Timeout)?
    }

    /// 기존 풀 재사용
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `users` 테이블 생성
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                provider_id TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                picture TEXT NOT NULL DEFAULT '',
                status INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            );"#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// 사용자 등록
    pub async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO users (id, provider_id, email, name, picture, status, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(user.id.to_hex())
        .bind(user.provider_id.as_str())
        .bind(user.email.as_str())
        .bind(user.name.as_str())
        .bind(user.picture.as_str())
        .bind(user.status)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(SELECT_USER)
            .bind(id.to_hex())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| user_from_row(&r)).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let raw_id: String = row.try_get("id")?;
    let id = UserId::parse(&raw_id).map_err(|e| StoreError::Decode(e.to_string()))?;

    Ok(User {
        id,
        provider_id: row.try_get("provider_id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        picture: row.try_get("picture")?,
        status: row.try_get("status")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}
