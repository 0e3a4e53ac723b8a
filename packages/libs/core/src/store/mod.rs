//! Identity store
//!
//! 엔진은 ID로 사용자 한 명을 조회하는 좁은 인터페이스만 사용합니다.
//!
//! - [`MemoryUserStore`]: 프로세스 내 저장소 (테스트/임베딩용)
//! - [`PgUserStore`]: PostgreSQL `users` 테이블

mod memory;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::id::UserId;
use crate::user::User;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// 저장소 에러
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("row decode error: {0}")]
    Decode(String),

    #[error("operation timed out")]
    Timeout,
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => {
                StoreError::Connection(e.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) | sqlx::Error::Decode(_) => {
                StoreError::Decode(e.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// 사용자 조회 인터페이스
#[async_trait]
pub trait UserStore: Send + Sync {
    /// ID로 사용자 조회. 없으면 `Ok(None)`.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// 연결 상태 확인
    async fn ping(&self) -> Result<(), StoreError>;
}
