//! Encryption layer around the serialized pagination state.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};

use crate::errors::TokenError;
use crate::state::PageState;

/// ChaCha20-Poly1305 nonce length in bytes
const NONCE_LEN: usize = 12;

/// Maximum accepted size for either token part, pre-decode
const MAX_TOKEN_LEN: usize = 4 * 1024;

/// The opaque pagination token handed to the caller.
///
/// Both parts are base64 and both are required to decode; losing either
/// invalidates the token irrecoverably. Callers must return them unmodified
/// on subsequent page requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageToken {
    pub cipher_text: String,
    pub iv: String,
}

/// Symmetric codec for pagination tokens.
///
/// A pure, self-contained transform: `decode(encode(s)) == s` for every
/// valid state, and two encodings of the same state never collide because
/// each call draws a fresh random nonce.
#[derive(Clone)]
pub struct TokenCodec {
    cipher: ChaCha20Poly1305,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Build a codec from 32 bytes of key material.
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key)),
        }
    }

    /// Serialize and encrypt a pagination state.
    pub fn encode(&self, state: &PageState) -> Result<PageToken, TokenError> {
        let plaintext = state.to_bytes();
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

        let cipher_text = self
            .cipher
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|_| TokenError::Encrypt)?;

        Ok(PageToken {
            cipher_text: URL_SAFE_NO_PAD.encode(cipher_text),
            iv: URL_SAFE_NO_PAD.encode(nonce),
        })
    }

    /// Decrypt and deserialize a pagination token.
    ///
    /// Fails closed on any alteration: bad base64, wrong nonce length,
    /// authentication failure, or a malformed payload.
    pub fn decode(&self, token: &PageToken) -> Result<PageState, TokenError> {
        if token.cipher_text.len() > MAX_TOKEN_LEN || token.iv.len() > MAX_TOKEN_LEN {
            return Err(TokenError::TooLarge { max: MAX_TOKEN_LEN });
        }

        let cipher_text = URL_SAFE_NO_PAD
            .decode(&token.cipher_text)
            .map_err(|_| TokenError::InvalidEncoding)?;
        let nonce_bytes = URL_SAFE_NO_PAD
            .decode(&token.iv)
            .map_err(|_| TokenError::InvalidEncoding)?;

        if nonce_bytes.len() != NONCE_LEN {
            return Err(TokenError::Decrypt);
        }

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), cipher_text.as_slice())
            .map_err(|_| TokenError::Decrypt)?;

        PageState::from_bytes(&plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"an example very very secret key.")
    }

    fn sample_state() -> PageState {
        PageState::new(
            "public.usuarios",
            10,
            vec!["age > 18".to_string(), "status = 'active'".to_string()],
        )
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let codec = codec();
        let state = sample_state();

        let token = codec.encode(&state).unwrap();
        let decoded = codec.decode(&token).unwrap();

        assert_eq!(decoded, state);
    }

    #[test]
    fn test_same_state_distinct_tokens() {
        let codec = codec();
        let state = sample_state();

        let first = codec.encode(&state).unwrap();
        let second = codec.encode(&state).unwrap();

        assert_ne!(first.cipher_text, second.cipher_text);
        assert_ne!(first.iv, second.iv);
        assert_eq!(codec.decode(&first).unwrap(), codec.decode(&second).unwrap());
    }

    #[test]
    fn test_tampered_cipher_text_fails_closed() {
        let codec = codec();
        let mut token = codec.encode(&sample_state()).unwrap();

        let mut bytes = URL_SAFE_NO_PAD.decode(&token.cipher_text).unwrap();
        bytes[0] ^= 0x01;
        token.cipher_text = URL_SAFE_NO_PAD.encode(bytes);

        assert!(matches!(codec.decode(&token), Err(TokenError::Decrypt)));
    }

    #[test]
    fn test_tampered_iv_fails_closed() {
        let codec = codec();
        let mut token = codec.encode(&sample_state()).unwrap();

        let mut bytes = URL_SAFE_NO_PAD.decode(&token.iv).unwrap();
        bytes[3] ^= 0xff;
        token.iv = URL_SAFE_NO_PAD.encode(bytes);

        assert!(matches!(codec.decode(&token), Err(TokenError::Decrypt)));
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let codec = codec();
        let token = PageToken {
            cipher_text: "not base64!!!".to_string(),
            iv: "also not***".to_string(),
        };
        assert!(matches!(
            codec.decode(&token),
            Err(TokenError::InvalidEncoding)
        ));
    }

    #[test]
    fn test_wrong_key_fails_closed() {
        let token = codec().encode(&sample_state()).unwrap();
        let other = TokenCodec::new(b"a completely different 32b key!!");
        assert!(matches!(other.decode(&token), Err(TokenError::Decrypt)));
    }

    #[test]
    fn test_oversized_token_rejected() {
        let codec = codec();
        let token = PageToken {
            cipher_text: "a".repeat(5 * 1024),
            iv: "AAAAAAAAAAAAAAAA".to_string(),
        };
        assert!(matches!(
            codec.decode(&token),
            Err(TokenError::TooLarge { .. })
        ));
    }
}
