//! 인증 라이브러리 설정
//!
//! 환경변수(및 `.env`)에서 시크릿, 저장소 연결 정보, 우회 토큰을 읽습니다.

use std::env;
use std::time::Duration;

use crate::auth::BypassPolicy;
use crate::error::{AuthError, Result};
use crate::id::UserId;

pub const ENV_JWT_SECRET: &str = "JWT_SECRET";
pub const ENV_STORE_URI: &str = "AUTH_STORE_URI";
pub const ENV_STORE_DATABASE: &str = "AUTH_STORE_DATABASE";
pub const ENV_DEV_TOKEN: &str = "AUTH_DEV_TOKEN";
pub const ENV_DEV_USER_ID: &str = "AUTH_DEV_USER_ID";
pub const ENV_CONNECT_TIMEOUT: &str = "AUTH_CONNECT_TIMEOUT_SECS";
pub const ENV_LOOKUP_TIMEOUT: &str = "AUTH_LOOKUP_TIMEOUT_SECS";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 5;

/// 인증 라이브러리 설정
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 공유 시크릿
    pub jwt_secret: String,

    /// PostgreSQL 서버 URI
    pub store_uri: String,

    /// DB 이름
    pub store_database: String,

    /// 개발용 우회 정책 (`AUTH_DEV_TOKEN` + `AUTH_DEV_USER_ID`)
    pub bypass: Option<BypassPolicy>,

    /// 최초 연결 타임아웃
    pub connect_timeout: Duration,

    /// 사용자 조회 타임아웃
    pub lookup_timeout: Duration,
}

impl AuthConfig {
    /// 환경변수에서 설정 로드 (`.env`가 있으면 먼저 반영)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 조회 함수로 설정 로드
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (jwt_secret, store_uri, store_database) = match (
            get(ENV_JWT_SECRET),
            get(ENV_STORE_URI),
            get(ENV_STORE_DATABASE),
        ) {
            (Some(secret), Some(uri), Some(db)) => (secret, uri, db),
            _ => {
                return Err(AuthError::configuration(format!(
                    "missing required environment variables: {}, {}, {}",
                    ENV_STORE_URI, ENV_STORE_DATABASE, ENV_JWT_SECRET
                )))
            }
        };

        let bypass = match get(ENV_DEV_TOKEN) {
            None => None,
            Some(token) => {
                let raw_id = get(ENV_DEV_USER_ID).ok_or_else(|| {
                    AuthError::configuration(format!(
                        "{} requires {} to be set",
                        ENV_DEV_TOKEN, ENV_DEV_USER_ID
                    ))
                })?;
                let user_id = UserId::parse(raw_id.trim())
                    .map_err(|e| AuthError::configuration(format!("{}: {}", ENV_DEV_USER_ID, e)))?;
                BypassPolicy::new(token, user_id)
            }
        };

        Ok(Self {
            jwt_secret,
            store_uri,
            store_database,
            bypass,
            connect_timeout: parse_secs(get(ENV_CONNECT_TIMEOUT), ENV_CONNECT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT_SECS)?,
            lookup_timeout: parse_secs(get(ENV_LOOKUP_TIMEOUT), ENV_LOOKUP_TIMEOUT, DEFAULT_LOOKUP_TIMEOUT_SECS)?,
        })
    }
}

fn parse_secs(value: Option<String>, key: &str, default: u64) -> Result<Duration> {
    let secs = match value {
        None => default,
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| AuthError::configuration(format!("{} must be a positive integer, got {:?}", key, raw)))?,
    };
    Ok(Duration::from_secs(secs))
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("store_uri", &"<redacted>")
            .field("store_database", &self.store_database)
            .field("bypass", &self.bypass)
            .field("connect_timeout", &self.connect_timeout)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish()
    }
}
