//! 토큰 서명 및 검증
//!
//! 공유 시크릿 하나로 HS256 서명을 만들고 검증합니다. 토큰은 `header.payload.signature`
//! 세 세그먼트의 base64url 문자열입니다.
//!
//! 만료 판정은 여기서 하지 않습니다. 엔진이 주입된 시계로 직접 확인합니다.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::error::TokenFault;

use super::claims::Claims;

/// HS256 토큰 코덱
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// 공유 시크릿으로 코덱 생성
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Claims 직렬화 + 서명
    pub fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
    }

    /// 서명 검증 + Claims 추출
    pub fn verify(&self, token: &str) -> Result<Claims, TokenFault> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenFault::BadSignature,
                ErrorKind::ExpiredSignature => TokenFault::Expired,
                _ => TokenFault::Malformed(e.to_string()),
            })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}
