//! Discriminated unions: a tag codec plus an ordered case registry.
//!
//! A case pairs a discriminator value with an extractor (`&A ->
//! Option<V>`), an injector (`V -> A`) and a payload codec.  Encoding
//! walks the cases in insertion order and takes the first whose extractor
//! matches; decoding reads the tag and takes the first case with that
//! discriminator.  An unmatched value or tag is an explicit error.
//!
//! ```
//! use bitcodec::codec::discriminated::discriminated;
//! use bitcodec::codec::primitives::{uint16, uint8, utf8};
//! use bitcodec::codec::framing::variable_size_bytes;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Message {
//!     Ping(u16),
//!     Name(String),
//! }
//!
//! let codec = discriminated::<Message>()
//!     .by(uint8())
//!     .case(
//!         1,
//!         |m| match m { Message::Ping(seq) => Some(*seq), _ => None },
//!         Message::Ping,
//!         uint16(),
//!     )
//!     .case(
//!         2,
//!         |m| match m { Message::Name(s) => Some(s.clone()), _ => None },
//!         Message::Name,
//!         variable_size_bytes(uint8(), utf8()),
//!     )
//!     .build();
//!
//! let bits = codec.encode(&Message::Ping(7)).unwrap();
//! assert_eq!(bits.to_hex(), "010007");
//! assert_eq!(codec.decode_value(&bits).unwrap(), Message::Ping(7));
//! ```

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::bits::BitVector;
use crate::codec::{Codec, DecodeResult};
use crate::error::{Attempt, Error};
use crate::size_bound::SizeBound;

/// Entry point: `discriminated::<A>().by(tag_codec)`.
pub fn discriminated<A>() -> Discriminated<A> {
    Discriminated(PhantomData)
}

pub struct Discriminated<A>(PhantomData<A>);

impl<A: 'static> Discriminated<A> {
    /// Choose the discriminator codec; its encoding precedes every payload.
    pub fn by<D>(self, tag: Codec<D>) -> DiscriminatedBuilder<A, D> {
        DiscriminatedBuilder { tag, cases: Vec::new() }
    }
}

struct Case<A, D> {
    tag: D,
    bound: SizeBound,
    /// `None` when the case does not match the value; `Some` carries the
    /// payload encoding.
    enc: Arc<dyn Fn(&A) -> Option<Attempt<BitVector>> + Send + Sync>,
    dec: Arc<dyn Fn(&BitVector) -> Attempt<DecodeResult<A>> + Send + Sync>,
}

pub struct DiscriminatedBuilder<A, D> {
    tag: Codec<D>,
    cases: Vec<Case<A, D>>,
}

impl<A, D> DiscriminatedBuilder<A, D>
where
    A: 'static,
    D: Clone + PartialEq + Debug + Send + Sync + 'static,
{
    /// Register a case.  Insertion order is match order on both encode
    /// and decode; ties resolve to the first match.
    pub fn case<V: 'static>(
        mut self,
        tag: D,
        extract: impl Fn(&A) -> Option<V> + Send + Sync + 'static,
        inject: impl Fn(V) -> A + Send + Sync + 'static,
        payload: Codec<V>,
    ) -> Self {
        let payload_enc = payload.clone();
        let payload_dec = payload;
        self.cases.push(Case {
            tag,
            bound: payload_enc.size_bound(),
            enc: Arc::new(move |a| extract(a).map(|v| payload_enc.encode(&v))),
            dec: Arc::new(move |bits| payload_dec.decode(bits).map(|r| r.map(&inject))),
        });
        self
    }

    /// Finish the builder.
    pub fn build(self) -> Codec<A>
    where
        A: Debug,
    {
        let payload_bound = self
            .cases
            .iter()
            .map(|c| c.bound)
            .reduce(|x, y| x | y)
            .unwrap_or(SizeBound::exact(0));
        let bound = self.tag.size_bound() + payload_bound;
        let cases: Arc<[Case<A, D>]> = self.cases.into();
        let tag_enc = self.tag.clone();
        let tag_dec = self.tag;
        let enc_cases = cases.clone();
        let dec_cases = cases;
        Codec::new(
            format!("discriminated by {}", tag_enc.label()),
            bound,
            move |a: &A| {
                for case in enc_cases.iter() {
                    if let Some(result) = (case.enc)(a) {
                        let payload = result?;
                        let tag_bits = tag_enc.encode(&case.tag)?;
                        return Ok(tag_bits.concat(&payload));
                    }
                }
                Err(Error::new(format!("could not find matching case for {a:?}")))
            },
            move |bits: &BitVector| {
                let rt = tag_dec.decode(bits)?;
                for case in dec_cases.iter() {
                    if case.tag == rt.value {
                        return (case.dec)(&rt.remainder);
                    }
                }
                Err(Error::no_discriminator_match(format!("{:?}", rt.value)))
            },
        )
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::primitives::{provide, uint16, uint8, utf8};
    use crate::codec::framing::variable_size_bytes;
    use crate::error::ErrorKind;

    fn hex(s: &str) -> BitVector {
        BitVector::from_hex(s).unwrap()
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Frame {
        Ack,
        Seq(u16),
        Text(String),
    }

    fn frame_codec() -> Codec<Frame> {
        discriminated::<Frame>()
            .by(uint8())
            .case(
                0,
                |f| match f {
                    Frame::Ack => Some(()),
                    _ => None,
                },
                |()| Frame::Ack,
                provide(()),
            )
            .case(
                1,
                |f| match f {
                    Frame::Seq(n) => Some(*n),
                    _ => None,
                },
                Frame::Seq,
                uint16(),
            )
            .case(
                2,
                |f| match f {
                    Frame::Text(s) => Some(s.clone()),
                    _ => None,
                },
                Frame::Text,
                variable_size_bytes(uint8(), utf8()),
            )
            .build()
    }

    #[test]
    fn encodes_tag_then_payload() {
        let c = frame_codec();
        assert_eq!(c.encode(&Frame::Ack).unwrap(), hex("00"));
        assert_eq!(c.encode(&Frame::Seq(0x0102)).unwrap(), hex("010102"));
        assert_eq!(c.encode(&Frame::Text("hi".into())).unwrap(), hex("02026869"));
    }

    #[test]
    fn decodes_by_tag_and_threads_remainder() {
        let c = frame_codec();
        let r = c.decode(&hex("010102ff")).unwrap();
        assert_eq!(r.value, Frame::Seq(0x0102));
        assert_eq!(r.remainder, hex("ff"));
        assert_eq!(c.decode_value(&hex("00")).unwrap(), Frame::Ack);
    }

    #[test]
    fn unknown_tag_is_an_explicit_error() {
        let c = frame_codec();
        let err = c.decode(&hex("09")).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NoDiscriminatorMatch(_)));
        assert_eq!(err.message(), "unknown discriminator 9");
    }

    #[test]
    fn unmatched_value_fails_encoding() {
        // Registry missing the Text case.
        let c = discriminated::<Frame>()
            .by(uint8())
            .case(
                1,
                |f| match f {
                    Frame::Seq(n) => Some(*n),
                    _ => None,
                },
                Frame::Seq,
                uint16(),
            )
            .build();
        let err = c.encode(&Frame::Text("x".into())).unwrap_err();
        assert!(err.message().starts_with("could not find matching case for"));
    }

    #[test]
    fn first_matching_case_wins() {
        // Two cases for the same tag: insertion order decides.
        let c = discriminated::<u16>()
            .by(uint8())
            .case(5, |v| Some(*v), |v| v, uint16())
            .case(5, |v| Some(v.wrapping_add(1)), |v| v, uint16())
            .build();
        assert_eq!(c.encode(&7).unwrap(), hex("050007"));
        assert_eq!(c.decode_value(&hex("050007")).unwrap(), 7);
    }

    #[test]
    fn projecting_the_wrong_case_fails() {
        // Decode tag 2 through a codec narrowed onto the Seq case.
        let seq_only = frame_codec().downcast(
            |n: &u16| Frame::Seq(*n),
            |f| match f {
                Frame::Seq(n) => Some(n),
                _ => None,
            },
        );
        assert_eq!(seq_only.decode_value(&hex("010007")).unwrap(), 7);
        let err = seq_only.decode(&hex("02016f")).unwrap_err();
        assert!(err.message().starts_with("not a value of type"));
    }

    #[test]
    fn size_bound_is_tag_plus_case_envelope() {
        let c = frame_codec();
        let bound = c.size_bound();
        assert_eq!(bound.lower, 8);
        // Widest fixed case is 16 bits, but the string case is unbounded.
        assert_eq!(bound.upper, None);
    }
}
