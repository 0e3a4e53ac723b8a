//! 토큰 발급/검증 엔진
//!
//! 초기화가 끝난 뒤 변하지 않는 상태(시크릿, 저장소 핸들, 우회 정책)를 묶은 컨텍스트입니다.
//! 여러 태스크가 `Arc<AuthEngine>`을 공유해 잠금 없이 동시에 호출합니다.
//!
//! # 검증 파이프라인
//!
//! 1. 우회 토큰과 일치하면 고정 사용자 ID로 바로 조회 (토큰은 파싱하지 않음)
//! 2. 서명 검증 + Claims 추출
//! 3. 만료 확인 (`now >= exp`이면 거부)
//! 4. `sub`를 사용자 ID로 파싱
//! 5. 저장소에서 사용자 조회 (타임아웃 적용)

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;

use crate::auth::{BypassPolicy, Claims, TokenCodec};
use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::error::{AuthError, Result, TokenFault};
use crate::id::UserId;
use crate::store::{StoreError, UserStore};
use crate::user::User;

/// 기본 사용자 조회 타임아웃
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// 엔진 컨텍스트
pub struct AuthEngine {
    codec: TokenCodec,
    store: Arc<dyn UserStore>,
    bypass: Option<BypassPolicy>,
    clock: Arc<dyn Clock>,
    lookup_timeout: Duration,
}

impl AuthEngine {
    /// 시크릿과 저장소로 엔진 생성 (시스템 시계, 우회 없음)
    pub fn new(secret: &str, store: Arc<dyn UserStore>) -> Self {
        Self {
            codec: TokenCodec::new(secret),
            store,
            bypass: None,
            clock: Arc::new(SystemClock),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// 설정값을 반영해 엔진 생성
    pub fn from_config(config: &AuthConfig, store: Arc<dyn UserStore>) -> Self {
        Self::new(&config.jwt_secret, store)
            .with_bypass(config.bypass.clone())
            .with_lookup_timeout(config.lookup_timeout)
    }

    pub fn with_bypass(mut self, bypass: Option<BypassPolicy>) -> Self {
        self.bypass = bypass;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// 사용자에 대한 토큰 발급
    ///
    /// 저장소에 접근하지 않습니다. `validity`가 0 이하이면 이미 만료된 토큰이 발급됩니다.
    /// 만료 시각을 표현할 수 없을 만큼 큰 `validity`는 `Signing` 에러입니다.
    pub fn generate_token(&self, user: &User, validity: ChronoDuration) -> Result<String> {
        let claims =
            Claims::for_user(user, self.clock.now(), validity).ok_or_else(|| AuthError::Signing {
                message: format!("token expiry out of range (validity: {})", validity),
            })?;

        self.codec.sign(&claims).map_err(|e| AuthError::Signing {
            message: e.to_string(),
        })
    }

    /// 토큰 검증 후 현재 저장소 기준의 사용자 반환
    pub async fn validate_token(&self, token: &str) -> Result<User> {
        if let Some(user_id) = self.bypass.as_ref().and_then(|b| b.resolve(token)) {
            tracing::warn!(user_id = %user_id, "privileged bypass token presented");
            return self.resolve_user(user_id).await;
        }

        let claims = self.verify_claims(token)?;

        let user_id = UserId::parse(&claims.sub).map_err(|_| {
            tracing::debug!(subject = %claims.sub, "token subject is not a valid user id");
            AuthError::InvalidSubject {
                subject: claims.sub.clone(),
            }
        })?;

        self.resolve_user(&user_id).await
    }

    /// 서명과 만료만 확인하고 Claims 반환 (저장소 조회 없음)
    pub fn verify_claims(&self, token: &str) -> Result<Claims> {
        let claims = self.codec.verify(token).map_err(|fault| {
            tracing::debug!(reason = %fault, "token rejected");
            AuthError::InvalidToken(fault)
        })?;

        if claims.is_expired_at(self.clock.now()) {
            tracing::debug!(subject = %claims.sub, exp = %claims.exp, "token expired");
            return Err(AuthError::InvalidToken(TokenFault::Expired));
        }

        Ok(claims)
    }

    /// 저장소에서 사용자 1회 조회
    ///
    /// 레코드 없음, 조회 실패, 타임아웃은 모두 `UserNotFound`입니다.
    pub async fn resolve_user(&self, user_id: &UserId) -> Result<User> {
        let lookup = tokio::time::timeout(self.lookup_timeout, self.store.find_by_id(user_id)).await;

        match lookup {
            Ok(Ok(Some(user))) => Ok(user),
            Ok(Ok(None)) => Err(AuthError::user_not_found(user_id, None)),
            Ok(Err(e)) => {
                tracing::debug!(user_id = %user_id, error = %e, "user lookup failed");
                Err(AuthError::user_not_found(user_id, Some(e)))
            }
            Err(_) => {
                tracing::debug!(user_id = %user_id, timeout = ?self.lookup_timeout, "user lookup timed out");
                Err(AuthError::user_not_found(user_id, Some(StoreError::Timeout)))
            }
        }
    }
}

impl std::fmt::Debug for AuthEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEngine")
            .field("codec", &self.codec)
            .field("bypass", &self.bypass)
            .field("clock", &self.clock)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish_non_exhaustive()
    }
}
