//! Bot token resolution and the at-rest token format.
//!
//! The token is taken from plaintext configuration when present. Otherwise a
//! ciphertext (configuration value, else a file) is decrypted with a
//! passphrase. Ciphertext format:
//!
//! ```text
//! base64(IV) ":" base64(TAG) ":" base64(CIPHERTEXT)
//! ```
//!
//! AES-256-GCM with a random 12-byte IV and a 16-byte tag. The key is a single
//! SHA-256 of the passphrase, with no salt and no iterations. That is not a
//! password-hardening KDF: anyone holding the ciphertext can brute-force weak
//! passphrases offline. The format is kept bit-exact for compatibility with
//! tokens produced by the existing `encrypt-token` script.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::digest::{digest, SHA256};
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::CredentialError;

/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Where the bot token may come from.
#[derive(Debug, Default)]
pub struct CredentialSource {
    /// Plaintext token; short-circuits everything else.
    pub token: Option<SecretString>,
    /// Ciphertext given directly in configuration.
    pub encrypted: Option<String>,
    /// Passphrase for the ciphertext.
    pub passphrase: Option<SecretString>,
    /// File holding the ciphertext, read when `encrypted` is absent.
    pub token_file: Option<PathBuf>,
}

impl CredentialSource {
    /// Source that only carries a plaintext token.
    pub fn plain(token: impl Into<String>) -> Self {
        Self {
            token: Some(SecretString::from(token.into())),
            ..Self::default()
        }
    }

    /// Resolves the token, failing closed when no path yields one.
    pub async fn resolve(&self) -> Result<SecretString, CredentialError> {
        if let Some(token) = non_blank_secret(self.token.as_ref()) {
            debug!("Using plaintext bot token");
            return Ok(SecretString::from(token.to_string()));
        }

        let encrypted = match self.encrypted.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(value) => Some(value.to_string()),
            None => self.read_token_file().await?,
        };

        let (Some(encrypted), Some(passphrase)) = (encrypted, non_blank_secret(self.passphrase.as_ref())) else {
            return Err(CredentialError::Missing);
        };

        let token = decrypt_token(&encrypted, passphrase)?;
        if token.trim().is_empty() {
            return Err(CredentialError::Missing);
        }
        debug!("Bot token decrypted");
        Ok(SecretString::from(token))
    }

    async fn read_token_file(&self) -> Result<Option<String>, CredentialError> {
        let Some(path) = &self.token_file else {
            return Ok(None);
        };
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let content = content.trim();
                Ok((!content.is_empty()).then(|| content.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CredentialError::Io {
                path: path.clone(),
                source,
            }),
        }
    }
}

fn non_blank_secret(secret: Option<&SecretString>) -> Option<&str> {
    secret
        .map(|s| s.expose_secret())
        .filter(|s| !s.trim().is_empty())
}

fn derive_key(passphrase: &str) -> Result<LessSafeKey, CredentialError> {
    let hash = digest(&SHA256, passphrase.as_bytes());
    let unbound = UnboundKey::new(&AES_256_GCM, hash.as_ref()).map_err(|_| CredentialError::Encryption)?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypts a token into the `IV:TAG:CIPHERTEXT` format.
pub fn encrypt_token(token: &str, passphrase: &str) -> Result<String, CredentialError> {
    let key = derive_key(passphrase)?;

    let mut iv = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut iv)
        .map_err(|_| CredentialError::Encryption)?;

    let mut in_out = token.as_bytes().to_vec();
    let tag = key
        .seal_in_place_separate_tag(Nonce::assume_unique_for_key(iv), Aad::empty(), &mut in_out)
        .map_err(|_| CredentialError::Encryption)?;

    Ok(format!(
        "{}:{}:{}",
        STANDARD.encode(iv),
        STANDARD.encode(tag.as_ref()),
        STANDARD.encode(&in_out)
    ))
}

/// Decrypts an `IV:TAG:CIPHERTEXT` value.
pub fn decrypt_token(encrypted: &str, passphrase: &str) -> Result<String, CredentialError> {
    let mut segments = encrypted.trim().splitn(3, ':');
    let (Some(iv), Some(tag), Some(ciphertext)) = (segments.next(), segments.next(), segments.next()) else {
        return Err(CredentialError::Malformed("expected IV:TAG:CIPHERTEXT".to_string()));
    };

    let iv = decode_segment(iv, "IV")?;
    let tag = decode_segment(tag, "tag")?;
    let mut in_out = decode_segment(ciphertext, "ciphertext")?;

    if iv.len() != NONCE_LEN {
        return Err(CredentialError::Malformed(format!(
            "IV must be {NONCE_LEN} bytes, got {}",
            iv.len()
        )));
    }
    if tag.len() != TAG_LEN {
        return Err(CredentialError::Malformed(format!(
            "tag must be {TAG_LEN} bytes, got {}",
            tag.len()
        )));
    }

    let nonce = Nonce::try_assume_unique_for_key(&iv)
        .map_err(|_| CredentialError::Malformed("bad IV".to_string()))?;
    let key = derive_key(passphrase)?;

    // ring expects the tag appended to the ciphertext.
    in_out.extend_from_slice(&tag);
    let plaintext = key
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| CredentialError::Authentication)?;

    String::from_utf8(plaintext.to_vec())
        .map_err(|_| CredentialError::Malformed("token is not valid UTF-8".to_string()))
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>, CredentialError> {
    STANDARD
        .decode(segment.trim())
        .map_err(|e| CredentialError::Malformed(format!("{name} is not base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    const TOKEN: &str = "123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11";

    #[test]
    fn test_encrypted_format_shape() {
        let encrypted = encrypt_token(TOKEN, "hunter2").unwrap();
        let parts: Vec<&str> = encrypted.split(':').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(STANDARD.decode(parts[0]).unwrap().len(), 12);
        assert_eq!(STANDARD.decode(parts[1]).unwrap().len(), 16);
        assert_eq!(STANDARD.decode(parts[2]).unwrap().len(), TOKEN.len());
    }

    #[test]
    fn test_fresh_iv_per_encryption() {
        let a = encrypt_token(TOKEN, "pw").unwrap();
        let b = encrypt_token(TOKEN, "pw").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_passphrase_fails_authentication() {
        let encrypted = encrypt_token(TOKEN, "right").unwrap();
        let err = decrypt_token(&encrypted, "wrong").unwrap_err();
        assert!(matches!(err, CredentialError::Authentication));
    }

    #[test]
    fn test_truncated_ciphertext_fails_authentication() {
        let encrypted = encrypt_token(TOKEN, "pw").unwrap();
        let parts: Vec<&str> = encrypted.split(':').collect();
        let mut ct = STANDARD.decode(parts[2]).unwrap();
        ct.truncate(ct.len() - 3);
        let truncated = format!("{}:{}:{}", parts[0], parts[1], STANDARD.encode(&ct));

        let err = decrypt_token(&truncated, "pw").unwrap_err();
        assert!(matches!(err, CredentialError::Authentication));
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(decrypt_token("abc", "pw"), Err(CredentialError::Malformed(_))));
        assert!(matches!(decrypt_token("a:b", "pw"), Err(CredentialError::Malformed(_))));
        assert!(matches!(decrypt_token("!!:??:**", "pw"), Err(CredentialError::Malformed(_))));

        // Valid base64 but a 4-byte IV.
        let short_iv = format!("{}:{}:{}", STANDARD.encode([0u8; 4]), STANDARD.encode([0u8; 16]), "");
        assert!(matches!(decrypt_token(&short_iv, "pw"), Err(CredentialError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_plaintext_short_circuits() {
        let source = CredentialSource {
            token: Some(SecretString::from("plain".to_string())),
            encrypted: Some("garbage".to_string()),
            passphrase: None,
            token_file: None,
        };
        assert_eq!(source.resolve().await.unwrap().expose_secret(), "plain");
    }

    #[tokio::test]
    async fn test_blank_plaintext_falls_through_to_ciphertext() {
        let source = CredentialSource {
            token: Some(SecretString::from("  ".to_string())),
            encrypted: Some(encrypt_token(TOKEN, "pw").unwrap()),
            passphrase: Some(SecretString::from("pw".to_string())),
            token_file: None,
        };
        assert_eq!(source.resolve().await.unwrap().expose_secret(), TOKEN);
    }

    #[tokio::test]
    async fn test_ciphertext_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("encrypted.token");
        std::fs::write(&path, format!("{}\n", encrypt_token(TOKEN, "pw").unwrap())).unwrap();

        let source = CredentialSource {
            passphrase: Some(SecretString::from("pw".to_string())),
            token_file: Some(path),
            ..CredentialSource::default()
        };
        assert_eq!(source.resolve().await.unwrap().expose_secret(), TOKEN);
    }

    #[tokio::test]
    async fn test_missing_passphrase_fails_closed() {
        let source = CredentialSource {
            encrypted: Some(encrypt_token(TOKEN, "pw").unwrap()),
            ..CredentialSource::default()
        };
        assert!(matches!(source.resolve().await, Err(CredentialError::Missing)));
    }

    #[tokio::test]
    async fn test_nothing_configured() {
        let dir = tempdir().unwrap();
        let source = CredentialSource {
            passphrase: Some(SecretString::from("pw".to_string())),
            token_file: Some(dir.path().join("absent.token")),
            ..CredentialSource::default()
        };
        assert!(matches!(source.resolve().await, Err(CredentialError::Missing)));
    }

    #[tokio::test]
    async fn test_bad_passphrase_does_not_fall_back() {
        let source = CredentialSource {
            encrypted: Some(encrypt_token(TOKEN, "pw").unwrap()),
            passphrase: Some(SecretString::from("other".to_string())),
            ..CredentialSource::default()
        };
        assert!(matches!(source.resolve().await, Err(CredentialError::Authentication)));
    }

    proptest! {
        #[test]
        fn prop_roundtrip_printable_ascii(token in "[ -~]{0,80}", pass in "[ -~]{0,40}") {
            let encrypted = encrypt_token(&token, &pass).unwrap();
            prop_assert_eq!(decrypt_token(&encrypted, &pass).unwrap(), token);
        }
    }
}
