//! Adapter codecs: checksums/signatures, symmetric ciphers, and
//! certificate blobs.
//!
//! Each adapter wraps an inner codec and delegates the cryptographic work
//! to a pluggable backend.  Factories must be thread-safe; the instances
//! they hand out are not, so every encode/decode call obtains a fresh one.
//!
//! Backend failures surface as codec errors; the core never panics on a
//! misbehaving backend.

pub mod backends;

use std::sync::Arc;

use crate::bits::BitVector;
use crate::codec::{Codec, DecodeResult};
use crate::error::Error;
use crate::size_bound::SizeBound;

// ── Backend interfaces ───────────────────────────────────────────────────────

/// A single-use signature computation.  Feed bytes with `update`, then
/// either produce the signature or verify one.
pub trait Signer: Send {
    fn update(&mut self, data: &[u8]);
    fn sign(&mut self) -> Vec<u8>;
    fn verify(&mut self, signature: &[u8]) -> bool {
        self.sign() == signature
    }
}

/// Thread-safe source of per-operation [`Signer`] instances.
pub trait SignerFactory: Send + Sync {
    fn new_signer(&self) -> Box<dyn Signer>;
    /// Exact signature size in bits; the wire format depends on it.
    fn signature_bits(&self) -> u64;
}

/// A single-use cipher transformation (one direction).
pub trait Cipher: Send {
    fn process(&mut self, data: &[u8]) -> Result<Vec<u8>, String>;
}

/// Thread-safe source of per-operation [`Cipher`] instances.
pub trait CipherFactory: Send + Sync {
    fn new_encryptor(&self) -> Box<dyn Cipher>;
    fn new_decryptor(&self) -> Box<dyn Cipher>;
}

/// Platform hook for parsing and serializing certificates.
pub trait CertificateBackend<C>: Send + Sync {
    fn decode_der(&self, der: &[u8]) -> Result<C, String>;
    fn encode_der(&self, value: &C) -> Result<Vec<u8>, String>;
}

// ── Checksum / signature codec ───────────────────────────────────────────────

/// Append a fixed-size signature over the inner codec's encoding.
///
/// Encoding signs the encoded value bytes and appends the signature.
/// Decoding runs the inner codec first, re-signs exactly the bits it
/// consumed, and compares against the signature that follows.  The inner
/// codec must delimit its own consumption (frame whole-remainder codecs
/// first, or the signature area gets swallowed as value bits).
pub fn checksummed<A: 'static>(inner: Codec<A>, factory: Arc<dyn SignerFactory>) -> Codec<A> {
    let sig_bits = factory.signature_bits();
    let label = format!("checksummed ({})", inner.label());
    let bound = inner.size_bound() + SizeBound::exact(sig_bits);
    let inner_enc = inner.clone();
    let inner_dec = inner;
    let factory_enc = factory.clone();
    let factory_dec = factory;
    Codec::new(
        label,
        bound,
        move |a: &A| {
            let encoded = inner_enc.encode(a)?;
            let mut signer = factory_enc.new_signer();
            signer.update(&encoded.to_bytes());
            let signature = signer.sign();
            if signature.len() as u64 * 8 != sig_bits {
                return Err(Error::new(format!(
                    "signature backend produced {} bits, expected {sig_bits}",
                    signature.len() as u64 * 8
                )));
            }
            Ok(encoded.concat(&BitVector::from_vec(signature)))
        },
        move |b: &BitVector| {
            let r = inner_dec.decode(b)?;
            let consumed = b.len() - r.remainder.len();
            let value_bits = b.take(consumed);
            let (signature, rest) = r.remainder.split_at(sig_bits)?;
            let mut signer = factory_dec.new_signer();
            signer.update(&value_bits.to_bytes());
            if !signer.verify(&signature.to_bytes()) {
                return Err(Error::new("signature verification failed"));
            }
            Ok(DecodeResult::new(r.value, rest))
        },
    )
}

// ── Cipher codec ─────────────────────────────────────────────────────────────

/// Symmetric envelope: encrypt the inner encoding on encode, decrypt the
/// entire remainder on decode.
///
/// Consumes the whole remaining buffer when decoding; compose inside a
/// framing combinator to delimit the ciphertext.
pub fn encrypted<A: 'static>(inner: Codec<A>, factory: Arc<dyn CipherFactory>) -> Codec<A> {
    let label = format!("encrypted ({})", inner.label());
    let inner_enc = inner.clone();
    let inner_dec = inner;
    let factory_enc = factory.clone();
    let factory_dec = factory;
    Codec::new(
        label,
        SizeBound::unknown(),
        move |a: &A| {
            let plain = inner_enc.encode(a)?;
            if plain.len() % 8 != 0 {
                return Err(Error::new(format!(
                    "cipher payload is {} bits, which is not a whole number of bytes",
                    plain.len()
                )));
            }
            let ciphertext = factory_enc
                .new_encryptor()
                .process(&plain.to_bytes())
                .map_err(|m| Error::new(format!("cipher backend: {m}")))?;
            Ok(BitVector::from_vec(ciphertext))
        },
        move |b: &BitVector| {
            if b.len() % 8 != 0 {
                return Err(Error::new(format!(
                    "ciphertext is {} bits, which is not a whole number of bytes",
                    b.len()
                )));
            }
            let plain = factory_dec
                .new_decryptor()
                .process(&b.to_bytes())
                .map_err(|m| Error::new(format!("cipher backend: {m}")))?;
            inner_dec.decode(&BitVector::from_vec(plain))
        },
    )
}

// ── Certificate codec ────────────────────────────────────────────────────────

/// Decode the entire remainder as a DER blob through the platform hook;
/// encode by serializing back to DER.
pub fn certificate<C: 'static>(backend: Arc<dyn CertificateBackend<C>>) -> Codec<C> {
    let backend_enc = backend.clone();
    let backend_dec = backend;
    Codec::new(
        "certificate",
        SizeBound::unknown(),
        move |value: &C| {
            let der = backend_enc
                .encode_der(value)
                .map_err(|m| Error::new(format!("certificate backend: {m}")))?;
            Ok(BitVector::from_vec(der))
        },
        move |b: &BitVector| {
            if b.len() % 8 != 0 {
                return Err(Error::new(format!(
                    "certificate blob is {} bits, which is not a whole number of bytes",
                    b.len()
                )));
            }
            let value = backend_dec
                .decode_der(&b.to_bytes())
                .map_err(|m| Error::new(format!("certificate backend: {m}")))?;
            Ok(DecodeResult::new(value, BitVector::empty()))
        },
    )
}

// ── Tests ────────────────────────────────────────────────────────────────────
