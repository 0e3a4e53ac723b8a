//! 개발용 우회 토큰
//!
//! 미리 공유된 리터럴 토큰이 제시되면 서명 검증 대신 고정된 사용자로 인증합니다.
//! 제시된 문자열은 파싱하지 않으므로 우회 경로는 공격자가 조작한 claims에 의존하지 않습니다.

use subtle::ConstantTimeEq;

use crate::id::UserId;

/// 우회 정책
#[derive(Clone)]
pub struct BypassPolicy {
    token: String,
    user_id: UserId,
}

impl BypassPolicy {
    /// 빈 토큰이면 우회를 비활성화하므로 `None`을 반환합니다.
    pub fn new(token: impl Into<String>, user_id: UserId) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            return None;
        }
        Some(Self { token, user_id })
    }

    /// 우회 대상 사용자
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// 제시된 토큰이 우회 토큰과 일치하면 고정 사용자 ID 반환
    pub fn resolve(&self, presented: &str) -> Option<&UserId> {
        let matched: bool = self.token.as_bytes().ct_eq(presented.as_bytes()).into();
        matched.then_some(&self.user_id)
    }
}

impl std::fmt::Debug for BypassPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BypassPolicy")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}
