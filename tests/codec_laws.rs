//! End-to-end laws over composed codecs: round-trips with arbitrary
//! trailing bits, remainder preservation, size-bound correctness, and a
//! realistic protocol assembled from the full combinator surface.

use std::sync::Arc;

use bitcodec::adapters::backends::{AesGcmCipherFactory, Crc32SignerFactory};
use bitcodec::adapters::{checksummed, encrypted};
use bitcodec::codec::discriminated::discriminated;
use bitcodec::codec::framing::{
    conditional, fixed_size_bits, repeated, variable_size_bytes, vec_of_n,
};
use bitcodec::codec::primitives::{
    constant_bytes, uint16, uint32, uint8, utf8, uuid,
};
use bitcodec::tuple_codec;
use bitcodec::{BitVector, Codec};

fn hex(s: &str) -> BitVector {
    BitVector::from_hex(s).unwrap()
}

/// Round-trip with a trailing vector: the decoder must return the value
/// and leave the tail untouched, and the encoding must respect the
/// codec's size bound.
fn assert_laws<A: PartialEq + std::fmt::Debug + 'static>(codec: &Codec<A>, value: A) {
    let encoded = codec.encode(&value).unwrap();

    let bound = codec.size_bound();
    assert!(bound.lower <= encoded.len(), "encoding under the lower bound");
    if let Some(upper) = bound.upper {
        assert!(encoded.len() <= upper, "encoding over the upper bound");
    }

    for tail in [BitVector::empty(), hex("ff"), BitVector::ones(3)] {
        let r = codec.decode(&encoded.concat(&tail)).unwrap();
        assert_eq!(r.value, value);
        assert_eq!(r.remainder, tail, "remainder not preserved");
    }
}

// ── Seed scenarios ───────────────────────────────────────────────────────────

#[test]
fn length_prefixed_string_via_flat_zip() {
    let codec = uint8().flat_zip(|&n| fixed_size_bits(8 * n as u64, utf8()));
    let encoded = codec.encode(&(4, "test".to_string())).unwrap();
    assert_eq!(encoded, hex("0474657374"));

    let r = codec.decode(&encoded).unwrap();
    assert_eq!(r.value, (4, "test".to_string()));
    assert!(r.remainder.is_empty());
}

#[test]
fn complete_reports_the_leftover() {
    let codec = bitcodec::codec::primitives::bits_n(8).complete();
    let err = codec.decode(&hex("00112233")).unwrap_err();
    assert_eq!(err.message(), "24 bits remaining: 0x112233");
}

#[test]
fn drop_right_emits_the_unit_bits() {
    let codec = uint8().drop_right(uint8().unit(0));
    assert_eq!(codec.encode(&0xff).unwrap(), hex("ff00"));
}

#[test]
fn unit_codec_scenarios() {
    let zero = uint8().unit(0);
    assert_eq!(zero.encode(&()).unwrap(), hex("00"));
    assert_eq!(uint8().unit(255).encode(&()).unwrap(), hex("ff"));

    let r = zero.decode(&hex("01")).unwrap();
    assert!(r.remainder.is_empty());

    let err = zero.decode(&BitVector::empty()).unwrap_err();
    assert!(err.is_insufficient_bits());
    assert_eq!(
        err.message(),
        "cannot acquire 8 bits from a vector that contains 0 bits"
    );
}

#[test]
fn discriminated_projection_mismatch() {
    use bitcodec::codec::primitives::provide;

    #[derive(Debug, Clone, PartialEq)]
    enum Side {
        B,
        C,
    }

    let codec = discriminated::<Side>()
        .by(uint8())
        .case(1, |s| matches!(s, Side::B).then_some(()), |()| Side::B, provide(()))
        .case(2, |s| matches!(s, Side::C).then_some(()), |()| Side::C, provide(()))
        .build();

    #[derive(Debug, PartialEq)]
    struct B;

    let b_only = codec.downcast(
        |_: &B| Side::B,
        |s| matches!(s, Side::B).then_some(B),
    );
    assert_eq!(b_only.decode_value(&hex("01")).unwrap(), B);
    let err = b_only.decode(&hex("02")).unwrap_err();
    assert!(err.message().starts_with("not a value of type"));
}

#[test]
fn exmap_validation_scenarios() {
    use bitcodec::Error;

    let digit = uint8().exmap(
        |v| if v > 9 { Err(Error::new("badv")) } else { Ok(v) },
        |&d| if d > 9 { Err(Error::new("badd")) } else { Ok(d) },
    );
    assert_eq!(digit.encode(&3).unwrap(), hex("03"));
    assert_eq!(digit.encode(&10).unwrap_err().message(), "badd");
    assert_eq!(digit.decode(&hex("ff")).unwrap_err().message(), "badv");

    let r = digit.decode(&hex("05")).unwrap();
    assert_eq!(r.value, 5);
    assert!(r.remainder.is_empty());
}

// ── Laws over the combinator surface ─────────────────────────────────────────

#[test]
fn round_trip_laws_across_primitives() {
    assert_laws(&uint8(), 0);
    assert_laws(&uint8(), 255);
    assert_laws(&uint16(), 0x8000);
    assert_laws(&uint32(), u32::MAX);
    assert_laws(&bitcodec::codec::primitives::int32(), i32::MIN);
    assert_laws(&bitcodec::codec::primitives::uint(7), 99);
    assert_laws(&bitcodec::codec::primitives::long(33), -(1i64 << 32));
    assert_laws(&bitcodec::codec::primitives::float64(), 6.25);
    assert_laws(&bitcodec::codec::primitives::boolean(), true);
    assert_laws(&uuid(), uuid_value());
}

fn uuid_value() -> ::uuid::Uuid {
    ::uuid::Uuid::from_bytes(*b"\x10\x32\x54\x76\x98\xba\xdc\xfe\x10\x32\x54\x76\x98\xba\xdc\xfe")
}

#[test]
fn round_trip_laws_across_combinators() {
    assert_laws(&variable_size_bytes(uint16(), utf8()), "framed".to_string());
    assert_laws(&vec_of_n(uint8(), uint16()), vec![1, 2, 3, 0xffff]);
    assert_laws(&conditional(true, uint8()), Some(9));
    assert_laws(&conditional(false, uint8()), None);
    assert_laws(
        &tuple_codec!(uint8(), uint16(), uint32()),
        (1, 2, 3),
    );
    assert_laws(
        &checksummed(variable_size_bytes(uint8(), utf8()), Arc::new(Crc32SignerFactory)),
        "signed".to_string(),
    );
}

#[test]
fn repeated_round_trips_only_without_a_tail() {
    // `repeated` consumes the whole buffer, so the law holds with an
    // empty tail only.
    let codec = repeated(uint16());
    let values = vec![5, 6, 7];
    let encoded = codec.encode(&values).unwrap();
    let r = codec.decode(&encoded).unwrap();
    assert_eq!(r.value, values);
    assert!(r.remainder.is_empty());
}

// ── A realistic protocol ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Payload {
    Handshake { session: ::uuid::Uuid, agent: String },
    Data(Vec<u16>),
    Close,
}

fn payload_codec() -> Codec<Payload> {
    discriminated::<Payload>()
        .by(uint8())
        .case(
            1,
            |p| match p {
                Payload::Handshake { session, agent } => Some((*session, agent.clone())),
                _ => None,
            },
            |(session, agent)| Payload::Handshake { session, agent },
            uuid().pair(variable_size_bytes(uint8(), utf8())),
        )
        .case(
            2,
            |p| match p {
                Payload::Data(items) => Some(items.clone()),
                _ => None,
            },
            Payload::Data,
            vec_of_n(uint16(), uint16()),
        )
        .case(
            3,
            |p| matches!(p, Payload::Close).then_some(()),
            |()| Payload::Close,
            bitcodec::codec::primitives::provide(()),
        )
        .build()
}

fn frame_codec() -> Codec<(u32, Payload)> {
    let body = uint32()
        .pair(payload_codec())
        .with_context("body");
    constant_bytes(b"\xc0\xde")
        .drop_left(checksummed(body, Arc::new(Crc32SignerFactory)))
        .with_context("frame")
}

#[test]
fn protocol_round_trips() {
    let codec = frame_codec();
    for payload in [
        Payload::Handshake { session: uuid_value(), agent: "bc/1".to_string() },
        Payload::Data(vec![1, 1, 2, 3, 5, 8]),
        Payload::Close,
    ] {
        assert_laws(&codec, (7, payload));
    }
}

#[test]
fn protocol_rejects_a_bad_magic_and_frames_the_error() {
    let codec = frame_codec();
    let good = codec.encode(&(1, Payload::Close)).unwrap();
    let bad = hex("dead").concat(&good.drop_bits(16));
    let err = codec.decode(&bad).unwrap_err();
    assert_eq!(err.context(), &["frame"]);
    assert!(err.message().starts_with("expected constant 0xc0de"));
}

#[test]
fn protocol_detects_corruption() {
    let codec = frame_codec();
    let good = codec.encode(&(1, Payload::Data(vec![42]))).unwrap();
    // Flip one sequence-number bit (past the 16-bit magic): the body
    // still decodes, but not to the bytes that were signed.
    let mask = BitVector::zeros(20)
        .concat(&BitVector::ones(1))
        .concat(&BitVector::zeros(good.len() - 21));
    let corrupted = good.xor(&mask).unwrap();
    let err = codec.decode(&corrupted).unwrap_err();
    assert_eq!(err.message(), "signature verification failed");
}

#[test]
fn encrypted_frame_round_trips() {
    let factory = Arc::new(AesGcmCipherFactory::new([3u8; 32]));
    let codec = encrypted(frame_codec(), factory);
    let value = (9, Payload::Handshake { session: uuid_value(), agent: "bc/1".to_string() });
    let encoded = codec.encode(&value).unwrap();
    assert_eq!(codec.decode_value(&encoded).unwrap(), value);
}

#[test]
fn hex_round_trip_for_byte_aligned_vectors() {
    for s in ["", "00", "c0ffee", "0123456789abcdef"] {
        let v = hex(s);
        assert_eq!(BitVector::from_hex(&v.to_hex()).unwrap(), v);
    }
}
