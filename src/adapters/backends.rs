//! Built-in adapter backends: CRC-32 and BLAKE3 signers, AES-256-GCM
//! cipher.
//!
//! Encrypted payload layout: `[ nonce (12 B) | ciphertext | GCM tag (16 B) ]`
//! — the nonce is random per encryption and prepended, so encoding the
//! same value twice yields different bits while decoding remains exact.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::Aes256Gcm;

use super::{Cipher, CipherFactory, Signer, SignerFactory};

// ── CRC-32 ───────────────────────────────────────────────────────────────────

/// CRC-32 (IEEE) signer; 32-bit big-endian signature.
pub struct Crc32SignerFactory;

impl SignerFactory for Crc32SignerFactory {
    fn new_signer(&self) -> Box<dyn Signer> {
        Box::new(Crc32Signer { hasher: crc32fast::Hasher::new() })
    }

    fn signature_bits(&self) -> u64 {
        32
    }
}

struct Crc32Signer {
    hasher: crc32fast::Hasher,
}

impl Signer for Crc32Signer {
    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn sign(&mut self) -> Vec<u8> {
        self.hasher.clone().finalize().to_be_bytes().to_vec()
    }
}

// ── BLAKE3 ───────────────────────────────────────────────────────────────────

/// BLAKE3 content-hash signer; 256-bit signature.
pub struct Blake3SignerFactory;

impl SignerFactory for Blake3SignerFactory {
    fn new_signer(&self) -> Box<dyn Signer> {
        Box::new(Blake3Signer { hasher: blake3::Hasher::new() })
    }

    fn signature_bits(&self) -> u64 {
        256
    }
}

struct Blake3Signer {
    hasher: blake3::Hasher,
}

impl Signer for Blake3Signer {
    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn sign(&mut self) -> Vec<u8> {
        self.hasher.finalize().as_bytes().to_vec()
    }
}

// ── AES-256-GCM ──────────────────────────────────────────────────────────────

/// Byte length of the AES-GCM nonce prepended to every encrypted payload.
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM cipher factory over a caller-supplied 256-bit key.
pub struct AesGcmCipherFactory {
    key: [u8; 32],
}

impl AesGcmCipherFactory {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }
}

impl CipherFactory for AesGcmCipherFactory {
    fn new_encryptor(&self) -> Box<dyn Cipher> {
        Box::new(AesGcmEncryptor { key: self.key })
    }

    fn new_decryptor(&self) -> Box<dyn Cipher> {
        Box::new(AesGcmDecryptor { key: self.key })
    }
}

struct AesGcmEncryptor {
    key: [u8; 32],
}

impl Cipher for AesGcmEncryptor {
    fn process(&mut self, data: &[u8]) -> Result<Vec<u8>, String> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|_| "invalid key length".to_string())?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, data)
            .map_err(|_| "encryption failed".to_string())?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(nonce.as_slice());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }
}

struct AesGcmDecryptor {
    key: [u8; 32],
}

impl Cipher for AesGcmDecryptor {
    fn process(&mut self, data: &[u8]) -> Result<Vec<u8>, String> {
        if data.len() < NONCE_LEN {
            return Err(format!("encrypted payload too short (minimum {NONCE_LEN} bytes)"));
        }
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|_| "invalid key length".to_string())?;
        let nonce = aes_gcm::Nonce::from_slice(&data[..NONCE_LEN]);
        cipher
            .decrypt(nonce, &data[NONCE_LEN..])
            .map_err(|_| "decryption failed, wrong key or corrupted data".to_string())
    }
}
