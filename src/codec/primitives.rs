//! Primitive codecs: integers, floats, booleans, bits, bytes, strings,
//! UUIDs, and the zero-bit utilities.
//!
//! Integers occupy exactly their declared width.  Big-endian widths may be
//! any number of bits up to the value type's size; little-endian widths
//! must be a whole number of bytes.  Signed integers use two's complement.
//!
//! The whole-remainder codecs (`bits`, `bytes`, `utf8`, `ascii`) consume
//! everything left in the buffer; compose them inside a framing combinator
//! or place them last.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use uuid::Uuid;

use crate::bits::{BitVector, BitWriter};
use crate::codec::framing::{fixed_size_bits, fixed_size_bytes, variable_size_bytes};
use crate::codec::{Codec, DecodeResult};
use crate::error::Error;
use crate::size_bound::SizeBound;

// ── Integers ─────────────────────────────────────────────────────────────────

fn uint_max(bits: u32) -> u64 {
    if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

fn encode_uint_bits(value: u64, bits: u32) -> BitVector {
    let mut w = BitWriter::new();
    w.write_bits(value, bits);
    let (bytes, len) = w.finish();
    BitVector::from_vec(bytes).take(len)
}

/// Big-endian unsigned integer of `bits` bits, `1..=64`.
///
/// # Panics
/// Panics at construction on a width outside `1..=64`.
pub fn ulong(bits: u32) -> Codec<u64> {
    assert!((1..=64).contains(&bits), "ulong width must be 1..=64 bits");
    let max = uint_max(bits);
    Codec::new(
        format!("{bits}-bit unsigned integer"),
        SizeBound::exact(bits as u64),
        move |&v: &u64| {
            if v > max {
                return Err(Error::new(format!(
                    "{v} is greater than maximum value {max} for {bits}-bit unsigned integer"
                )));
            }
            Ok(encode_uint_bits(v, bits))
        },
        move |b: &BitVector| {
            let (head, rest) = b.split_at(bits as u64)?;
            Ok(DecodeResult::new(head.read_u64(0, bits), rest))
        },
    )
}

/// Big-endian unsigned integer of `bits` bits, `1..=32`.
pub fn uint(bits: u32) -> Codec<u32> {
    assert!((1..=32).contains(&bits), "uint width must be 1..=32 bits");
    ulong(bits).xmap(|v| v as u32, |&v| v as u64)
}

/// Big-endian two's-complement signed integer of `bits` bits, `1..=64`.
pub fn long(bits: u32) -> Codec<i64> {
    assert!((1..=64).contains(&bits), "long width must be 1..=64 bits");
    let min = if bits == 64 { i64::MIN } else { -(1i64 << (bits - 1)) };
    let max = if bits == 64 { i64::MAX } else { (1i64 << (bits - 1)) - 1 };
    let mask = uint_max(bits);
    Codec::new(
        format!("{bits}-bit signed integer"),
        SizeBound::exact(bits as u64),
        move |&v: &i64| {
            if v < min || v > max {
                return Err(Error::new(format!(
                    "{v} is out of range [{min}, {max}] for {bits}-bit signed integer"
                )));
            }
            Ok(encode_uint_bits(v as u64 & mask, bits))
        },
        move |b: &BitVector| {
            let (head, rest) = b.split_at(bits as u64)?;
            let raw = head.read_u64(0, bits);
            let value = if bits < 64 && (raw >> (bits - 1)) & 1 == 1 {
                (raw | !mask) as i64
            } else {
                raw as i64
            };
            Ok(DecodeResult::new(value, rest))
        },
    )
}

/// Big-endian two's-complement signed integer of `bits` bits, `1..=32`.
pub fn int(bits: u32) -> Codec<i32> {
    assert!((1..=32).contains(&bits), "int width must be 1..=32 bits");
    long(bits).xmap(|v| v as i32, |&v| v as i64)
}

/// Little-endian unsigned integer; the width must be a whole number of
/// bytes (`8..=64`).
pub fn ulong_le(bits: u32) -> Codec<u64> {
    assert!(
        (8..=64).contains(&bits) && bits % 8 == 0,
        "little-endian width must be a whole number of bytes"
    );
    let nbytes = (bits / 8) as usize;
    let max = uint_max(bits);
    Codec::new(
        format!("{bits}-bit little-endian unsigned integer"),
        SizeBound::exact(bits as u64),
        move |&v: &u64| {
            if v > max {
                return Err(Error::new(format!(
                    "{v} is greater than maximum value {max} for {bits}-bit unsigned integer"
                )));
            }
            let mut buf = [0u8; 8];
            LittleEndian::write_u64(&mut buf, v);
            Ok(BitVector::from_bytes(&buf[..nbytes]))
        },
        move |b: &BitVector| {
            let (head, rest) = b.split_at(bits as u64)?;
            let bytes = head.to_bytes();
            Ok(DecodeResult::new(LittleEndian::read_uint(&bytes, nbytes), rest))
        },
    )
}

/// Little-endian unsigned integer of a whole-byte width up to 32 bits.
pub fn uint_le(bits: u32) -> Codec<u32> {
    assert!((8..=32).contains(&bits) && bits % 8 == 0);
    ulong_le(bits).xmap(|v| v as u32, |&v| v as u64)
}

/// Little-endian two's-complement signed integer; whole-byte width.
pub fn long_le(bits: u32) -> Codec<i64> {
    assert!(
        (8..=64).contains(&bits) && bits % 8 == 0,
        "little-endian width must be a whole number of bytes"
    );
    let nbytes = (bits / 8) as usize;
    let min = if bits == 64 { i64::MIN } else { -(1i64 << (bits - 1)) };
    let max = if bits == 64 { i64::MAX } else { (1i64 << (bits - 1)) - 1 };
    Codec::new(
        format!("{bits}-bit little-endian signed integer"),
        SizeBound::exact(bits as u64),
        move |&v: &i64| {
            if v < min || v > max {
                return Err(Error::new(format!(
                    "{v} is out of range [{min}, {max}] for {bits}-bit signed integer"
                )));
            }
            let mut buf = [0u8; 8];
            LittleEndian::write_i64(&mut buf, v);
            Ok(BitVector::from_bytes(&buf[..nbytes]))
        },
        move |b: &BitVector| {
            let (head, rest) = b.split_at(bits as u64)?;
            let bytes = head.to_bytes();
            Ok(DecodeResult::new(LittleEndian::read_int(&bytes, nbytes), rest))
        },
    )
}

/// Little-endian two's-complement signed integer of a whole-byte width up
/// to 32 bits.
pub fn int_le(bits: u32) -> Codec<i32> {
    assert!((8..=32).contains(&bits) && bits % 8 == 0);
    long_le(bits).xmap(|v| v as i32, |&v| v as i64)
}

// Named shortcuts with native value types.

pub fn uint2() -> Codec<u8> {
    uint(2).xmap(|v| v as u8, |&v| v as u32)
}

pub fn uint4() -> Codec<u8> {
    uint(4).xmap(|v| v as u8, |&v| v as u32)
}

pub fn uint8() -> Codec<u8> {
    uint(8).xmap(|v| v as u8, |&v| v as u32)
}

pub fn uint16() -> Codec<u16> {
    uint(16).xmap(|v| v as u16, |&v| v as u32)
}

pub fn uint24() -> Codec<u32> {
    uint(24)
}

pub fn uint32() -> Codec<u32> {
    uint(32)
}

pub fn uint64() -> Codec<u64> {
    ulong(64)
}

pub fn int8() -> Codec<i8> {
    int(8).xmap(|v| v as i8, |&v| v as i32)
}

pub fn int16() -> Codec<i16> {
    int(16).xmap(|v| v as i16, |&v| v as i32)
}

pub fn int24() -> Codec<i32> {
    int(24)
}

pub fn int32() -> Codec<i32> {
    int(32)
}

pub fn int64() -> Codec<i64> {
    long(64)
}

pub fn uint16_le() -> Codec<u16> {
    uint_le(16).xmap(|v| v as u16, |&v| v as u32)
}

pub fn uint32_le() -> Codec<u32> {
    uint_le(32)
}

pub fn uint64_le() -> Codec<u64> {
    ulong_le(64)
}

pub fn int16_le() -> Codec<i16> {
    int_le(16).xmap(|v| v as i16, |&v| v as i32)
}

pub fn int32_le() -> Codec<i32> {
    int_le(32)
}

pub fn int64_le() -> Codec<i64> {
    long_le(64)
}

// ── Floats ───────────────────────────────────────────────────────────────────

/// 32-bit big-endian IEEE-754.
pub fn float32() -> Codec<f32> {
    Codec::new(
        "32-bit IEEE-754 float",
        SizeBound::exact(32),
        |v: &f32| {
            let mut buf = [0u8; 4];
            BigEndian::write_f32(&mut buf, *v);
            Ok(BitVector::from_bytes(&buf))
        },
        |b: &BitVector| {
            let (head, rest) = b.split_at(32)?;
            Ok(DecodeResult::new(BigEndian::read_f32(&head.to_bytes()), rest))
        },
    )
}

/// 32-bit little-endian IEEE-754.
pub fn float32_le() -> Codec<f32> {
    Codec::new(
        "32-bit little-endian IEEE-754 float",
        SizeBound::exact(32),
        |v: &f32| {
            let mut buf = [0u8; 4];
            LittleEndian::write_f32(&mut buf, *v);
            Ok(BitVector::from_bytes(&buf))
        },
        |b: &BitVector| {
            let (head, rest) = b.split_at(32)?;
            Ok(DecodeResult::new(LittleEndian::read_f32(&head.to_bytes()), rest))
        },
    )
}

/// 64-bit big-endian IEEE-754.
pub fn float64() -> Codec<f64> {
    Codec::new(
        "64-bit IEEE-754 float",
        SizeBound::exact(64),
        |v: &f64| {
            let mut buf = [0u8; 8];
            BigEndian::write_f64(&mut buf, *v);
            Ok(BitVector::from_bytes(&buf))
        },
        |b: &BitVector| {
            let (head, rest) = b.split_at(64)?;
            Ok(DecodeResult::new(BigEndian::read_f64(&head.to_bytes()), rest))
        },
    )
}

/// 64-bit little-endian IEEE-754.
pub fn float64_le() -> Codec<f64> {
    Codec::new(
        "64-bit little-endian IEEE-754 float",
        SizeBound::exact(64),
        |v: &f64| {
            let mut buf = [0u8; 8];
            LittleEndian::write_f64(&mut buf, *v);
            Ok(BitVector::from_bytes(&buf))
        },
        |b: &BitVector| {
            let (head, rest) = b.split_at(64)?;
            Ok(DecodeResult::new(LittleEndian::read_f64(&head.to_bytes()), rest))
        },
    )
}

// ── Booleans ─────────────────────────────────────────────────────────────────

/// One bit; zero is `false`.
pub fn boolean() -> Codec<bool> {
    Codec::new(
        "1-bit boolean",
        SizeBound::exact(1),
        |&v: &bool| Ok(BitVector::from_bool(v)),
        |b: &BitVector| {
            let (head, rest) = b.split_at(1)?;
            Ok(DecodeResult::new(head.read_u64(0, 1) == 1, rest))
        },
    )
}

/// `n >= 1` bits; decodes all-zero as `false` and anything else as `true`;
/// encodes `true` as all ones.
pub fn boolean_bits(n: u64) -> Codec<bool> {
    assert!(n >= 1, "boolean_bits requires at least one bit");
    Codec::new(
        format!("{n}-bit boolean"),
        SizeBound::exact(n),
        move |&v: &bool| Ok(BitVector::fill(n, v)),
        move |b: &BitVector| {
            let (head, rest) = b.split_at(n)?;
            Ok(DecodeResult::new(head != BitVector::zeros(n), rest))
        },
    )
}

// ── Bits and bytes ───────────────────────────────────────────────────────────

/// Identity passthrough; decoding consumes the entire remainder.
pub fn bits() -> Codec<BitVector> {
    Codec::new(
        "bits",
        SizeBound::unknown(),
        |v: &BitVector| Ok(v.clone()),
        |b: &BitVector| Ok(DecodeResult::new(b.clone(), BitVector::empty())),
    )
}

/// Fixed-size bit passthrough: exactly `n` bits on the wire; shorter
/// input is right-padded with zeros on encode.
pub fn bits_n(n: u64) -> Codec<BitVector> {
    fixed_size_bits(n, bits()).with_label(format!("{n} bits"))
}

/// Byte passthrough; decoding consumes the entire remainder, which must
/// be a whole number of bytes.
pub fn bytes() -> Codec<Vec<u8>> {
    Codec::new(
        "bytes",
        SizeBound::unknown(),
        |v: &Vec<u8>| Ok(BitVector::from_bytes(v)),
        |b: &BitVector| {
            if b.len() % 8 != 0 {
                return Err(Error::new(format!(
                    "cannot decode bytes from a vector of {} bits (not a whole number of bytes)",
                    b.len()
                )));
            }
            Ok(DecodeResult::new(b.to_bytes(), BitVector::empty()))
        },
    )
}

/// Fixed-size byte passthrough: exactly `n` bytes on the wire.
pub fn bytes_n(n: u64) -> Codec<Vec<u8>> {
    fixed_size_bytes(n, bytes()).with_label(format!("{n} bytes"))
}

// ── Strings ──────────────────────────────────────────────────────────────────

/// UTF-8 string over the entire remainder.
pub fn utf8() -> Codec<String> {
    Codec::new(
        "UTF-8 string",
        SizeBound::unknown(),
        |v: &String| Ok(BitVector::from_bytes(v.as_bytes())),
        |b: &BitVector| {
            if b.len() % 8 != 0 {
                return Err(Error::new(format!(
                    "cannot decode a string from a vector of {} bits (not a whole number of bytes)",
                    b.len()
                )));
            }
            match String::from_utf8(b.to_bytes()) {
                Ok(s) => Ok(DecodeResult::new(s, BitVector::empty())),
                Err(e) => Err(Error::new(format!("UTF-8 decoding failed: {e}"))),
            }
        },
    )
}

/// ASCII string over the entire remainder; rejects non-ASCII input in
/// both directions.
pub fn ascii() -> Codec<String> {
    Codec::new(
        "ASCII string",
        SizeBound::unknown(),
        |v: &String| {
            if !v.is_ascii() {
                return Err(Error::new("string contains characters outside US-ASCII"));
            }
            Ok(BitVector::from_bytes(v.as_bytes()))
        },
        |b: &BitVector| {
            if b.len() % 8 != 0 {
                return Err(Error::new(format!(
                    "cannot decode a string from a vector of {} bits (not a whole number of bytes)",
                    b.len()
                )));
            }
            let raw = b.to_bytes();
            if !raw.is_ascii() {
                return Err(Error::new("bytes contain characters outside US-ASCII"));
            }
            match String::from_utf8(raw) {
                Ok(s) => Ok(DecodeResult::new(s, BitVector::empty())),
                Err(e) => Err(Error::new(format!("ASCII decoding failed: {e}"))),
            }
        },
    )
}

/// UTF-8 string prefixed with its byte length as a 32-bit unsigned
/// big-endian integer.
pub fn utf8_32() -> Codec<String> {
    variable_size_bytes(uint32(), utf8()).with_label("UTF-8 string (32-bit length prefix)")
}

// ── UUID ─────────────────────────────────────────────────────────────────────

/// 128-bit big-endian RFC 4122 UUID.
pub fn uuid() -> Codec<Uuid> {
    Codec::new(
        "UUID",
        SizeBound::exact(128),
        |v: &Uuid| Ok(BitVector::from_bytes(v.as_bytes())),
        |b: &BitVector| {
            let (head, rest) = b.split_at(128)?;
            let mut raw = [0u8; 16];
            raw.copy_from_slice(&head.to_bytes());
            Ok(DecodeResult::new(Uuid::from_bytes(raw), rest))
        },
    )
}

// ── Zero-bit utilities ───────────────────────────────────────────────────────

/// Zero-bit codec that encodes nothing and always decodes `value`.
pub fn provide<A: Clone + Send + Sync + 'static>(value: A) -> Codec<A> {
    Codec::new(
        "provide",
        SizeBound::exact(0),
        |_: &A| Ok(BitVector::empty()),
        move |b: &BitVector| Ok(DecodeResult::new(value.clone(), b.clone())),
    )
}

/// Skips `n` bits on decode; writes `n` zero bits on encode.
pub fn ignore(n: u64) -> Codec<()> {
    Codec::new(
        format!("ignore {n} bits"),
        SizeBound::exact(n),
        move |_: &()| Ok(BitVector::zeros(n)),
        move |b: &BitVector| {
            let (_, rest) = b.split_at(n)?;
            Ok(DecodeResult::new((), rest))
        },
    )
}

/// Emits exactly `expected` on encode; decodes the same amount and
/// verifies equality.
pub fn constant(expected: BitVector) -> Codec<()> {
    let n = expected.len();
    let emitted = expected.clone();
    Codec::new(
        format!("constant 0x{}", expected.to_hex()),
        SizeBound::exact(n),
        move |_: &()| Ok(emitted.clone()),
        move |b: &BitVector| {
            let (head, rest) = b.split_at(n)?;
            if head != expected {
                return Err(Error::new(format!(
                    "expected constant 0x{} but got 0x{}",
                    expected.to_hex(),
                    head.to_hex()
                )));
            }
            Ok(DecodeResult::new((), rest))
        },
    )
}

/// [`constant`] over whole bytes.
pub fn constant_bytes(expected: &[u8]) -> Codec<()> {
    constant(BitVector::from_bytes(expected))
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> BitVector {
        BitVector::from_hex(s).unwrap()
    }

    fn round_trip<A: PartialEq + std::fmt::Debug + 'static>(c: &Codec<A>, value: A, expected_hex: &str) {
        let encoded = c.encode(&value).unwrap();
        assert_eq!(encoded.to_hex(), expected_hex);
        let tail = hex("5a5a");
        let r = c.decode(&encoded.concat(&tail)).unwrap();
        assert_eq!(r.value, value);
        assert_eq!(r.remainder, tail);
    }

    #[test]
    fn unsigned_big_endian() {
        round_trip(&uint8(), 0xff, "ff");
        round_trip(&uint16(), 0x1234, "1234");
        round_trip(&uint24(), 0x00ab_cdef, "abcdef");
        round_trip(&uint32(), 0xdead_beef, "deadbeef");
        round_trip(&uint64(), 0x0102_0304_0506_0708, "0102030405060708");
    }

    #[test]
    fn sub_byte_widths() {
        let c = uint(3);
        let encoded = c.encode(&0b101).unwrap();
        assert_eq!(encoded.len(), 3);
        assert_eq!(encoded.to_bin(), "101");
        let joined = encoded.concat(&BitVector::from_bin("11111").unwrap());
        let r = c.decode(&joined).unwrap();
        assert_eq!(r.value, 0b101);
        assert_eq!(r.remainder.len(), 5);
    }

    #[test]
    fn unsigned_range_is_enforced() {
        let err = uint(4).encode(&16).unwrap_err();
        assert_eq!(
            err.message(),
            "16 is greater than maximum value 15 for 4-bit unsigned integer"
        );
        assert!(uint(4).encode(&15).is_ok());
    }

    #[test]
    fn signed_two_complement() {
        round_trip(&int8(), -1, "ff");
        round_trip(&int8(), -128, "80");
        round_trip(&int16(), -2, "fffe");
        round_trip(&int32(), i32::MIN, "80000000");
        round_trip(&int64(), -1, "ffffffffffffffff");

        let c = int(5);
        let encoded = c.encode(&-3).unwrap();
        assert_eq!(encoded.to_bin(), "11101");
        assert_eq!(c.decode(&encoded).unwrap().value, -3);
        assert!(c.encode(&16).is_err());
        assert!(c.encode(&-17).is_err());
    }

    #[test]
    fn little_endian() {
        round_trip(&uint16_le(), 0x1234, "3412");
        round_trip(&uint32_le(), 0xdead_beef, "efbeadde");
        round_trip(&uint64_le(), 0x0102_0304_0506_0708, "0807060504030201");
        round_trip(&int16_le(), -2, "feff");
        round_trip(&int32_le(), -1, "ffffffff");
    }

    #[test]
    fn floats() {
        round_trip(&float32(), 1.5f32, "3fc00000");
        round_trip(&float32_le(), 1.5f32, "0000c03f");
        round_trip(&float64(), -0.5f64, "bfe0000000000000");
        round_trip(&float64_le(), -0.5f64, "000000000000e0bf");
    }

    #[test]
    fn booleans() {
        let c = boolean();
        assert_eq!(c.encode(&true).unwrap().to_bin(), "1");
        assert_eq!(c.encode(&false).unwrap().to_bin(), "0");

        let wide = boolean_bits(8);
        assert_eq!(wide.encode(&true).unwrap(), hex("ff"));
        assert_eq!(wide.encode(&false).unwrap(), hex("00"));
        assert!(wide.decode_value(&hex("01")).unwrap());
        assert!(wide.decode_value(&hex("80")).unwrap());
        assert!(!wide.decode_value(&hex("00")).unwrap());
    }

    #[test]
    fn bit_and_byte_passthrough() {
        let all = bits();
        let r = all.decode(&hex("abcd")).unwrap();
        assert_eq!(r.value, hex("abcd"));
        assert!(r.remainder.is_empty());

        let eight = bits_n(8);
        assert_eq!(eight.encode(&hex("ff")).unwrap(), hex("ff"));
        // Short input is right-padded.
        assert_eq!(eight.encode(&BitVector::ones(3)).unwrap(), hex("e0"));
        assert!(eight.encode(&hex("ffff")).is_err());

        let raw = bytes();
        assert_eq!(raw.decode_value(&hex("0102")).unwrap(), vec![1, 2]);
        assert!(raw.decode(&BitVector::ones(4)).is_err());

        let two = bytes_n(2);
        round_trip(&two, vec![0xab, 0xcd], "abcd");
    }

    #[test]
    fn strings() {
        let c = utf8();
        round_trip(&c, "test".to_string(), "74657374");
        assert!(c.decode(&hex("ff")).is_err());

        let a = ascii();
        assert!(a.encode(&"héllo".to_string()).is_err());
        assert!(a.decode(&hex("e9")).is_err());
        round_trip(&a, "ok".to_string(), "6f6b");

        let framed = utf8_32();
        round_trip(&framed, "hi".to_string(), "000000026869");
    }

    #[test]
    fn uuid_round_trip() {
        let value = Uuid::from_bytes([
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
            0x0f, 0x10,
        ]);
        round_trip(&uuid(), value, "0102030405060708090a0b0c0d0e0f10");
    }

    #[test]
    fn zero_bit_utilities() {
        let p = provide(42u8);
        assert!(p.encode(&42).unwrap().is_empty());
        let r = p.decode(&hex("ff")).unwrap();
        assert_eq!(r.value, 42);
        assert_eq!(r.remainder, hex("ff"));

        let skip = ignore(4);
        assert_eq!(skip.encode(&()).unwrap().to_bin(), "0000");
        let r = skip.decode(&hex("ab")).unwrap();
        assert_eq!(r.remainder.to_bin(), "1011");

        let magic = constant_bytes(b"\xca\xfe");
        assert_eq!(magic.encode(&()).unwrap(), hex("cafe"));
        assert!(magic.decode(&hex("cafe")).is_ok());
        let err = magic.decode(&hex("beef")).unwrap_err();
        assert_eq!(err.message(), "expected constant 0xcafe but got 0xbeef");
    }
}
