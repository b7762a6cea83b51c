//! Framing combinators: fixed and length-prefixed regions, conditional
//! fields, and repetition.
//!
//! Size codecs are generic over any unsigned integer codec: `u64` must
//! convert from the codec's value type and back (`u8`, `u16`, `u32` and
//! `u64` all qualify).  A payload that does not fit the size codec fails
//! encoding with a `size` context frame.

use crate::bits::BitVector;
use crate::codec::{Codec, DecodeResult};
use crate::error::Error;
use crate::size_bound::SizeBound;

// ── Fixed-size regions ───────────────────────────────────────────────────────

/// Frame `codec` in exactly `n` bits.
///
/// Encoding fails if the inner encoding exceeds `n` bits and zero-pads on
/// the right otherwise.  Decoding splits off exactly `n` bits, decodes the
/// inner value inside that region, and discards whatever the inner codec
/// left unconsumed; the outer remainder is what followed the region.
pub fn fixed_size_bits<A: 'static>(n: u64, codec: Codec<A>) -> Codec<A> {
    let label = format!("fixed-size bits ({n}, {})", codec.label());
    let enc_codec = codec.clone();
    let dec_codec = codec;
    Codec::new(
        label,
        SizeBound::exact(n),
        move |a: &A| {
            let encoded = enc_codec.encode(a)?;
            if encoded.len() > n {
                return Err(Error::new(format!(
                    "{} requires {} bits but field is fixed to {n} bits",
                    enc_codec.label(),
                    encoded.len()
                )));
            }
            Ok(encoded.concat(&BitVector::zeros(n - encoded.len())))
        },
        move |b: &BitVector| {
            let (region, rest) = b.split_at(n)?;
            let inner = dec_codec.decode(&region)?;
            Ok(DecodeResult::new(inner.value, rest))
        },
    )
}

/// Frame `codec` in exactly `n` bytes.
pub fn fixed_size_bytes<A: 'static>(n: u64, codec: Codec<A>) -> Codec<A> {
    let label = format!("fixed-size bytes ({n}, {})", codec.label());
    fixed_size_bits(8 * n, codec).with_label(label)
}

// ── Length-prefixed regions ──────────────────────────────────────────────────

/// Prefix the value's encoding with its size in bits.
pub fn variable_size_bits<N, A>(size: Codec<N>, value: Codec<A>) -> Codec<A>
where
    N: Copy + TryFrom<u64> + 'static,
    u64: From<N>,
    A: 'static,
{
    variable_size_bits_with_padding(size, value, 0)
}

/// Like [`variable_size_bits`], with `size_padding` added to the written
/// size value and subtracted again on decode.
pub fn variable_size_bits_with_padding<N, A>(
    size: Codec<N>,
    value: Codec<A>,
    size_padding: u64,
) -> Codec<A>
where
    N: Copy + TryFrom<u64> + 'static,
    u64: From<N>,
    A: 'static,
{
    let label = format!("variable-size bits ({}, {})", size.label(), value.label());
    let bound = size.size_bound() + value.size_bound();
    let size_enc = size.clone();
    let size_dec = size;
    let value_enc = value.clone();
    let value_dec = value;
    Codec::new(
        label,
        bound,
        move |a: &A| {
            let encoded = value_enc.encode(a)?;
            let declared = encoded.len() + size_padding;
            let n = N::try_from(declared).map_err(|_| {
                Error::new(format!("size {declared} is out of range for the size codec"))
                    .push_context("size")
            })?;
            let prefix = size_enc.encode(&n).map_err(|e| e.push_context("size"))?;
            Ok(prefix.concat(&encoded))
        },
        move |b: &BitVector| {
            let prefix = size_dec.decode(b).map_err(|e| e.push_context("size"))?;
            let declared = u64::from(prefix.value);
            let payload_bits = declared.checked_sub(size_padding).ok_or_else(|| {
                Error::new(format!(
                    "declared size {declared} is smaller than the size padding {size_padding}"
                ))
                .push_context("size")
            })?;
            let (region, rest) = prefix.remainder.split_at(payload_bits)?;
            let inner = value_dec.decode(&region)?;
            Ok(DecodeResult::new(inner.value, rest))
        },
    )
}

/// Prefix the value's encoding with its size in bytes.  The inner
/// encoding must be a whole number of bytes.
pub fn variable_size_bytes<N, A>(size: Codec<N>, value: Codec<A>) -> Codec<A>
where
    N: Copy + TryFrom<u64> + 'static,
    u64: From<N>,
    A: 'static,
{
    variable_size_bytes_with_padding(size, value, 0)
}

/// Like [`variable_size_bytes`], with `size_padding` (in bytes) added to
/// the written size value and subtracted again on decode.
pub fn variable_size_bytes_with_padding<N, A>(
    size: Codec<N>,
    value: Codec<A>,
    size_padding: u64,
) -> Codec<A>
where
    N: Copy + TryFrom<u64> + 'static,
    u64: From<N>,
    A: 'static,
{
    let label = format!("variable-size bytes ({}, {})", size.label(), value.label());
    let bound = size.size_bound() + value.size_bound();
    let size_enc = size.clone();
    let size_dec = size;
    let value_enc = value.clone();
    let value_dec = value;
    Codec::new(
        label,
        bound,
        move |a: &A| {
            let encoded = value_enc.encode(a)?;
            if encoded.len() % 8 != 0 {
                return Err(Error::new(format!(
                    "{} encoded to {} bits, which is not a whole number of bytes",
                    value_enc.label(),
                    encoded.len()
                )));
            }
            let declared = encoded.len() / 8 + size_padding;
            let n = N::try_from(declared).map_err(|_| {
                Error::new(format!("size {declared} is out of range for the size codec"))
                    .push_context("size")
            })?;
            let prefix = size_enc.encode(&n).map_err(|e| e.push_context("size"))?;
            Ok(prefix.concat(&encoded))
        },
        move |b: &BitVector| {
            let prefix = size_dec.decode(b).map_err(|e| e.push_context("size"))?;
            let declared = u64::from(prefix.value);
            let payload_bytes = declared.checked_sub(size_padding).ok_or_else(|| {
                Error::new(format!(
                    "declared size {declared} is smaller than the size padding {size_padding}"
                ))
                .push_context("size")
            })?;
            let (region, rest) = prefix.remainder.split_at(8 * payload_bytes)?;
            let inner = value_dec.decode(&region)?;
            Ok(DecodeResult::new(inner.value, rest))
        },
    )
}

// ── Optional fields ──────────────────────────────────────────────────────────

/// Encode the `Some` value when `included` is true (failing on `None`);
/// emit nothing when false.  Decoding mirrors.
pub fn conditional<A: 'static>(included: bool, codec: Codec<A>) -> Codec<Option<A>> {
    let label = format!("conditional ({included}, {})", codec.label());
    let bound = if included { codec.size_bound() } else { SizeBound::exact(0) };
    let enc_codec = codec.clone();
    let dec_codec = codec;
    Codec::new(
        label,
        bound,
        move |v: &Option<A>| {
            if !included {
                return Ok(BitVector::empty());
            }
            match v {
                Some(a) => enc_codec.encode(a),
                None => Err(Error::new("conditional codec requires a value when the guard is true")),
            }
        },
        move |b: &BitVector| {
            if !included {
                return Ok(DecodeResult::new(None, b.clone()));
            }
            dec_codec.decode(b).map(|r| r.map(Some))
        },
    )
}

// ── Repetition ───────────────────────────────────────────────────────────────

/// Encode each element in order; decode elements until the buffer is
/// empty, failing fast on the first element error.
pub fn repeated<A: 'static>(element: Codec<A>) -> Codec<Vec<A>> {
    let label = format!("repeated ({})", element.label());
    let enc_codec = element.clone();
    let dec_codec = element;
    Codec::new(
        label,
        SizeBound::at_least(0),
        move |vs: &Vec<A>| {
            let mut acc = BitVector::empty();
            for v in vs {
                acc = acc.concat(&enc_codec.encode(v)?);
            }
            Ok(acc)
        },
        move |b: &BitVector| {
            let mut items = Vec::new();
            let mut rest = b.clone();
            while !rest.is_empty() {
                let r = dec_codec.decode(&rest)?;
                if r.remainder.len() == rest.len() {
                    return Err(Error::new(format!(
                        "{} consumed no bits inside repeated",
                        dec_codec.label()
                    )));
                }
                items.push(r.value);
                rest = r.remainder;
            }
            Ok(DecodeResult::new(items, rest))
        },
    )
}

/// A count prefix followed by exactly that many elements.
pub fn vec_of_n<N, A>(count: Codec<N>, element: Codec<A>) -> Codec<Vec<A>>
where
    N: Copy + TryFrom<u64> + 'static,
    u64: From<N>,
    A: 'static,
{
    let label = format!("vector of N ({}, {})", count.label(), element.label());
    let bound = count.size_bound() + SizeBound::at_least(0);
    let count_enc = count.clone();
    let count_dec = count;
    let elem_enc = element.clone();
    let elem_dec = element;
    Codec::new(
        label,
        bound,
        move |vs: &Vec<A>| {
            let n = N::try_from(vs.len() as u64).map_err(|_| {
                Error::new(format!(
                    "element count {} is out of range for the count codec",
                    vs.len()
                ))
                .push_context("count")
            })?;
            let mut acc = count_enc.encode(&n).map_err(|e| e.push_context("count"))?;
            for v in vs {
                acc = acc.concat(&elem_enc.encode(v)?);
            }
            Ok(acc)
        },
        move |b: &BitVector| {
            let prefix = count_dec.decode(b).map_err(|e| e.push_context("count"))?;
            let n = u64::from(prefix.value);
            // Pre-size from the element bound without trusting the count.
            let cap = match elem_dec.size_bound().lower {
                0 => n.min(64),
                lower => n.min(prefix.remainder.len() / lower),
            };
            let mut items = Vec::with_capacity(cap as usize);
            let mut rest = prefix.remainder;
            for _ in 0..n {
                let r = elem_dec.decode(&rest)?;
                items.push(r.value);
                rest = r.remainder;
            }
            Ok(DecodeResult::new(items, rest))
        },
    )
}

// ── Tests ────────────────────────────────────────────────────────────────────
