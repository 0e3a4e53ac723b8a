//! 사용자 ID
//!
//! 12바이트 식별자이며 정규 표현은 소문자 24자리 hex 문자열입니다.
//!
//! # 바이트 구성
//!
//! - `0..4`: 생성 시각 (epoch 초, big-endian)
//! - `4..9`: 프로세스별 랜덤 값
//! - `9..12`: 랜덤 시드에서 시작하는 카운터

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ID_LEN: usize = 12;
const HEX_LEN: usize = ID_LEN * 2;

/// ID 파싱 실패
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid user id: expected {HEX_LEN} hex characters, got {input:?}")]
pub struct InvalidUserId {
    pub input: String,
}

/// 사용자 ID
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId([u8; ID_LEN]);

impl UserId {
    /// 현재 시각 기반으로 새 ID 생성
    pub fn new() -> Self {
        Self::with_timestamp(Utc::now())
    }

    /// 지정한 시각으로 새 ID 생성
    pub fn with_timestamp(at: DateTime<Utc>) -> Self {
        let mut bytes = [0u8; ID_LEN];

        let secs = at.timestamp().clamp(0, u32::MAX as i64) as u32;
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());

        let count = next_count().to_be_bytes();
        bytes[9..12].copy_from_slice(&count[1..4]);

        Self(bytes)
    }

    /// 원시 바이트로부터 생성
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// hex 문자열 파싱 (대소문자 무관)
    pub fn parse(input: &str) -> Result<Self, InvalidUserId> {
        let invalid = || InvalidUserId {
            input: input.to_string(),
        };

        if input.len() != HEX_LEN {
            return Err(invalid());
        }

        let mut bytes = [0u8; ID_LEN];
        let raw = input.as_bytes();
        for (i, byte) in bytes.iter_mut().enumerate() {
            let hi = hex_value(raw[i * 2]).ok_or_else(invalid)?;
            let lo = hex_value(raw[i * 2 + 1]).ok_or_else(invalid)?;
            *byte = (hi << 4) | lo;
        }

        Ok(Self(bytes))
    }

    /// 정규 hex 표현
    pub fn to_hex(&self) -> String {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";

        let mut out = String::with_capacity(HEX_LEN);
        for byte in self.0 {
            out.push(DIGITS[(byte >> 4) as usize] as char);
            out.push(DIGITS[(byte & 0x0f) as usize] as char);
        }
        out
    }

    /// 내부 바이트 참조
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// ID에 기록된 생성 시각 (초 단위)
    pub fn timestamp(&self) -> DateTime<Utc> {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        Utc.timestamp_opt(secs as i64, 0)
            .single()
            .unwrap_or_default()
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.to_hex())
    }
}

impl FromStr for UserId {
    type Err = InvalidUserId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = InvalidUserId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.to_hex()
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn process_unique() -> &'static [u8; 5] {
    static UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    UNIQUE.get_or_init(rand::random)
}

fn next_count() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER
        .get_or_init(|| AtomicU32::new(rand::random::<u32>() & 0x00ff_ffff))
        .fetch_add(1, Ordering::Relaxed)
        & 0x00ff_ffff
}
