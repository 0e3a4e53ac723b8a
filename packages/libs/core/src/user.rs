//! 사용자 레코드
//!
//! Identity store가 소유하는 레코드입니다. 엔진은 ID로 조회만 합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// 사용자
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// 고유 ID
    pub id: UserId,

    /// 외부 로그인 제공자의 사용자 ID
    pub provider_id: String,

    /// 이메일
    pub email: String,

    /// 표시 이름
    pub name: String,

    /// 아바타 이미지 URL
    pub picture: String,

    /// 상태 코드
    pub status: i32,

    /// 생성 시각
    pub created_at: DateTime<Utc>,

    /// 수정 시각
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 새 사용자 레코드 생성 (ID와 시각은 자동 설정)
    pub fn new(provider_id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            provider_id: provider_id.into(),
            email: email.into(),
            name: name.into(),
            picture: String::new(),
            status: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// ID 지정
    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    /// 아바타 설정
    pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = picture.into();
        self
    }
}
