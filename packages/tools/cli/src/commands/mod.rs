//! CLI 명령어 구현

pub mod health;
pub mod store;
pub mod token;
