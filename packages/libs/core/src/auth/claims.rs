//! 토큰 Claims
//!
//! 서명되는 페이로드 구조입니다. 시각 필드는 JWT 표준대로 epoch 초로 직렬화됩니다.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::user::User;

/// Access Token Claims (JWT HS256 페이로드)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// 사용자 ID (hex 문자열)
    pub user_id: String,

    /// 외부 로그인 제공자 ID
    pub provider_id: String,

    /// 이메일
    pub email: String,

    /// 발급 시각
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// 만료 시각
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,

    /// Subject (조회 키로 쓰이는 사용자 ID)
    pub sub: String,
}

impl Claims {
    /// 사용자 레코드로부터 claims 생성
    ///
    /// `validity`가 0 이하이면 이미 만료된 claims가 만들어집니다.
    /// 만료 시각이 표현 범위를 벗어나면 `None`을 반환합니다.
    pub fn for_user(user: &User, issued_at: DateTime<Utc>, validity: Duration) -> Option<Self> {
        // exp는 음수가 될 수 없음 (epoch 이전은 epoch으로 고정)
        let exp = issued_at
            .checked_add_signed(validity)?
            .max(DateTime::<Utc>::default());

        let id = user.id.to_hex();
        Some(Self {
            user_id: id.clone(),
            provider_id: user.provider_id.clone(),
            email: user.email.clone(),
            iat: issued_at,
            exp,
            sub: id,
        })
    }

    /// 주어진 시각 기준 만료 여부 (`now >= exp`)
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp.timestamp()
    }

    /// 남은 TTL (초)
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> i64 {
        (self.exp.timestamp() - now.timestamp()).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::id::UserId;

    fn test_user() -> User {
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        User {
            created_at: at,
            updated_at: at,
            ..User::new("google-123", "a@b.com", "A")
                .with_id(UserId::parse("507f191e810c19729de860ea").unwrap())
        }
    }

    #[test]
    fn test_claims_from_user() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = Claims::for_user(&test_user(), now, Duration::hours(1)).unwrap();

        assert_eq!(claims.sub, "507f191e810c19729de860ea");
        assert_eq!(claims.user_id, claims.sub);
        assert_eq!(claims.provider_id, "google-123");
        assert_eq!(claims.email, "a@b.com");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.remaining_ttl(now), 3600);
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = Claims::for_user(&test_user(), now, Duration::hours(1)).unwrap();

        assert!(!claims.is_expired_at(now + Duration::seconds(3599)));
        assert!(claims.is_expired_at(now + Duration::seconds(3600)));
        assert!(claims.is_expired_at(now + Duration::seconds(3601)));
    }

    #[test]
    fn test_non_positive_validity_is_already_expired() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = Claims::for_user(&test_user(), now, Duration::zero()).unwrap();
        assert!(claims.is_expired_at(now));
    }

    #[test]
    fn test_timestamps_serialize_as_seconds() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = Claims::for_user(&test_user(), now, Duration::hours(1)).unwrap();
        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value["iat"], 1_700_000_000);
        assert_eq!(value["exp"], 1_700_003_600);
        assert_eq!(value["sub"], "507f191e810c19729de860ea");
    }

    #[test]
    fn test_out_of_range_expiry_is_rejected() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert!(Claims::for_user(&test_user(), now, Duration::MAX).is_none());
        assert!(Claims::for_user(&test_user(), now, Duration::MIN).is_none());
    }

    #[test]
    fn test_expiry_before_epoch_is_clamped() {
        let now = Utc.timestamp_opt(10, 0).unwrap();
        let claims = Claims::for_user(&test_user(), now, Duration::hours(-1)).unwrap();

        assert_eq!(claims.exp.timestamp(), 0);
        assert!(claims.is_expired_at(now));

        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["exp"], 0);
    }
}
