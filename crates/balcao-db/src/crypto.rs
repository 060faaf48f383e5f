//! # Tax-ID Encryption
//!
//! AES-256-GCM encryption for the customer CPF field.
//!
//! The core treats the CPF as an opaque reversible transform invoked at the
//! read/write boundary: handlers encrypt before a customer row is written and
//! decrypt when a response needs the plaintext. The persistence layer only
//! ever sees the ciphertext blob, which is also what the unique constraint
//! applies to.
//!
//! Format: base64(nonce_12bytes || ciphertext || tag_16bytes)

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use thiserror::Error;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Errors from the tax-ID cipher.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Encryption key must be {KEY_LEN} bytes ({0} provided)")]
    InvalidKeyLength(usize),

    #[error("Encryption key is not valid hex")]
    InvalidKeyEncoding,

    #[error("Ciphertext is not valid base64")]
    InvalidCiphertextEncoding,

    #[error("Decryption failed (wrong key or tampered data)")]
    DecryptionFailed,

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decrypted data is not valid UTF-8")]
    InvalidPlaintext,
}

/// Symmetric cipher for the customer tax-ID field (32-byte key, AES-256-GCM).
///
/// ## Usage
/// ```rust,ignore
/// let cipher = TaxIdCipher::from_hex(&config.encryption_key)?;
/// let blob = cipher.encrypt("123.456.789-09")?;
/// let plaintext = cipher.decrypt(&blob)?;
/// ```
#[derive(Clone)]
pub struct TaxIdCipher {
    key: [u8; KEY_LEN],
}

impl std::fmt::Debug for TaxIdCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.debug_struct("TaxIdCipher").finish_non_exhaustive()
    }
}

impl TaxIdCipher {
    /// Builds a cipher from a hex-encoded 32-byte key.
    pub fn from_hex(hex_key: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_key.trim()).map_err(|_| CryptoError::InvalidKeyEncoding)?;
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidKeyLength(bytes.len()));
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&bytes);
        Ok(TaxIdCipher { key })
    }

    /// Encrypts a plaintext CPF into a base64 blob.
    ///
    /// A fresh random nonce is generated per call, so encrypting the same
    /// plaintext twice yields different blobs. Uniqueness checks therefore
    /// happen against whichever blob was stored first, not the plaintext.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let cipher =
            Aes256Gcm::new_from_slice(&self.key).map_err(|_| CryptoError::EncryptionFailed)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptionFailed)?;

        // nonce || ciphertext (includes tag)
        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        Ok(base64::engine::general_purpose::STANDARD.encode(&blob))
    }

    /// Decrypts a base64 blob back into the plaintext CPF.
    pub fn decrypt(&self, encrypted_b64: &str) -> Result<String, CryptoError> {
        let data = base64::engine::general_purpose::STANDARD
            .decode(encrypted_b64)
            .map_err(|_| CryptoError::InvalidCiphertextEncoding)?;

        if data.len() < NONCE_LEN + 16 {
            return Err(CryptoError::DecryptionFailed);
        }

        let cipher =
            Aes256Gcm::new_from_slice(&self.key).map_err(|_| CryptoError::DecryptionFailed)?;
        let nonce = Nonce::from_slice(&data[..NONCE_LEN]);
        let ciphertext = &data[NONCE_LEN..];

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidPlaintext)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> TaxIdCipher {
        // 32 bytes of 0x42
        TaxIdCipher::from_hex(&"42".repeat(32)).unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let cipher = test_cipher();
        let blob = cipher.encrypt("123.456.789-09").unwrap();
        assert_eq!(cipher.decrypt(&blob).unwrap(), "123.456.789-09");
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let cipher = test_cipher();
        let a = cipher.encrypt("12345678909").unwrap();
        let b = cipher.encrypt("12345678909").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_key_fails() {
        let blob = test_cipher().encrypt("12345678909").unwrap();
        let other = TaxIdCipher::from_hex(&"17".repeat(32)).unwrap();
        assert!(matches!(
            other.decrypt(&blob),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_invalid_key() {
        assert!(matches!(
            TaxIdCipher::from_hex("zz"),
            Err(CryptoError::InvalidKeyEncoding)
        ));
        assert!(matches!(
            TaxIdCipher::from_hex("42424242"),
            Err(CryptoError::InvalidKeyLength(4))
        ));
    }

    #[test]
    fn test_garbage_ciphertext() {
        let cipher = test_cipher();
        assert!(cipher.decrypt("not base64!!!").is_err());
        assert!(cipher.decrypt("AAAA").is_err());
    }
}
