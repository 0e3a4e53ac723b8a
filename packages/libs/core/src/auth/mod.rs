//! 인증 토큰 구조 및 서명 로직
//!
//! # 구성
//!
//! - **Claims**: 서명되는 페이로드 (사용자 ID, 이메일, 발급/만료 시각)
//! - **TokenCodec**: HS256 서명/검증
//! - **BypassPolicy**: 개발용 우회 토큰 → 고정 사용자

mod bypass;
mod claims;
mod token;

pub use bypass::BypassPolicy;
pub use claims::Claims;
pub use token::TokenCodec;
