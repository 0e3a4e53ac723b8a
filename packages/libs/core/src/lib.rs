//! pmd-auth-core: 사용자 인증 토큰 발급/검증 라이브러리
//!
//! 공유 시크릿으로 서명한 bearer 토큰을 발급하고, 검증 시 identity store에서
//! 사용자 레코드를 조회해 반환합니다.
//!
//! # 모듈 구조
//!
//! - `auth`: Claims, HS256 코덱, 개발용 우회 정책
//! - `bootstrap`: 1회 초기화 가드, 상태 보고, 프로세스 전역 인스턴스
//! - `engine`: 토큰 발급/검증 파이프라인
//! - `store`: 사용자 저장소 인터페이스 (메모리, PostgreSQL)
//! - `config`: 환경변수 설정
//! - `clock`: 시간 소스
//! - `id`: 사용자 ID
//! - `user`: 사용자 레코드
//! - `error`: 공통 에러 타입

pub mod auth;
pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod id;
pub mod store;
pub mod user;

pub use bootstrap::{
    generate_token, health_check, init_auth_lib, validate_token, Bootstrap, HealthStatus,
};
pub use config::AuthConfig;
pub use engine::AuthEngine;
pub use error::{AuthError, Result, TokenFault};
pub use id::UserId;
pub use user::User;
