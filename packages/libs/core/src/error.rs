//! 공통 에러 타입
//!
//! 초기화, 토큰 발급/검증, 사용자 조회에서 발생하는 에러를 정의합니다.

use thiserror::Error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, AuthError>;

/// 인증 엔진 에러
///
/// 초기화 실패는 sticky하게 보관되어 이후 모든 호출에 그대로 전달되므로 `Clone`입니다.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ─────────────────────────────────────────────────────────────────────────────
    // Bootstrap Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("identity store connection failed: {message}")]
    Connection { message: String },

    #[error("auth library not initialized")]
    NotInitialized,

    // ─────────────────────────────────────────────────────────────────────────────
    // Per-call Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("invalid token: {0}")]
    InvalidToken(#[source] TokenFault),

    #[error("invalid user id in token")]
    InvalidSubject { subject: String },

    /// 레코드가 없거나 조회 자체가 실패한 경우 모두 이 에러입니다.
    /// `cause`는 진단용이며 Display에 노출하지 않습니다.
    #[error("user not found")]
    UserNotFound {
        user_id: String,
        cause: Option<String>,
    },

    #[error("token signing failed: {message}")]
    Signing { message: String },
}

/// 토큰이 거부된 구체적 원인
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenFault {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("signature mismatch")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

impl AuthError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        AuthError::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn user_not_found(user_id: impl ToString, cause: Option<StoreError>) -> Self {
        AuthError::UserNotFound {
            user_id: user_id.to_string(),
            cause: cause.map(|e| e.to_string()),
        }
    }

    /// 초기화 단계에서 발생하는 에러인지 여부
    pub fn is_bootstrap_error(&self) -> bool {
        matches!(
            self,
            AuthError::Configuration { .. } | AuthError::Connection { .. } | AuthError::NotInitialized
        )
    }

    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 401 Unauthorized
            AuthError::InvalidToken(_)
            | AuthError::InvalidSubject { .. }
            | AuthError::UserNotFound { .. } => 401,

            // 503 Service Unavailable
            AuthError::Connection { .. } | AuthError::NotInitialized => 503,

            // 500 Internal Server Error
            AuthError::Configuration { .. } | AuthError::Signing { .. } => 500,
        }
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Configuration { .. } => "CONFIGURATION_ERROR",
            AuthError::Connection { .. } => "CONNECTION_ERROR",
            AuthError::NotInitialized => "NOT_INITIALIZED",
            AuthError::InvalidToken(TokenFault::Expired) => "TOKEN_EXPIRED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::InvalidSubject { .. } => "INVALID_SUBJECT",
            AuthError::UserNotFound { .. } => "USER_NOT_FOUND",
            AuthError::Signing { .. } => "SIGNING_ERROR",
        }
    }
}

impl From<TokenFault> for AuthError {
    fn from(fault: TokenFault) -> Self {
        AuthError::InvalidToken(fault)
    }
}
