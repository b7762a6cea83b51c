//! Pure, bidirectional, bit-level binary codec combinators.
//!
//! A [`Codec<A>`](codec::Codec) pairs an encoder from `A` into a
//! [`BitVector`](bits::BitVector) with a decoder back out of one, and
//! larger codecs are assembled from smaller ones: framing, tuples,
//! discriminated unions, checksums and cipher envelopes all compose
//! without giving up the round-trip guarantee.
//!
//! ```
//! use bitcodec::codec::framing::variable_size_bytes;
//! use bitcodec::codec::primitives::{uint16, uint8, utf8};
//! use bitcodec::tuple_codec;
//!
//! let record = tuple_codec!(
//!     uint16(),
//!     variable_size_bytes(uint8(), utf8()),
//! );
//! let bits = record.encode(&(0x0102, "hi".to_string())).unwrap();
//! assert_eq!(bits.to_hex(), "0102026869");
//! let decoded = record.decode_value(&bits).unwrap();
//! assert_eq!(decoded, (0x0102, "hi".to_string()));
//! ```

pub mod adapters;
pub mod bits;
pub mod codec;
pub mod error;
pub mod size_bound;

pub use bits::BitVector;
pub use codec::discriminated::discriminated;
pub use codec::{lazily, Codec, DecodeResult};
pub use error::{Attempt, Error, ErrorKind};
pub use size_bound::SizeBound;
