//! The codec contract and the generic transformation combinators.
//!
//! A [`Codec<A>`] is an immutable value pairing an encoder
//! (`&A -> Attempt<BitVector>`) with a decoder
//! (`&BitVector -> Attempt<DecodeResult<A>>`) and a [`SizeBound`] over the
//! encoded length.  Codecs are cheap to clone (`Arc` internals) and
//! `Send + Sync`, so a composed codec can be built once and shared across
//! threads.
//!
//! The round-trip contract: for any value `a` a codec claims to handle and
//! any trailing vector `t`, `decode(encode(a) ++ t)` yields `(a, t)`.
//! Every combinator in this crate preserves that law on the subdomain it
//! claims.
//!
//! Sub-codecs run left to right on both encode and decode; the remainder
//! produced by one decoder is the input of the next.

pub mod discriminated;
pub mod framing;
pub mod primitives;
pub mod tuple;

use std::sync::{Arc, OnceLock};

use crate::bits::BitVector;
use crate::error::{Attempt, Error};
use crate::size_bound::SizeBound;

// ── Decode result ────────────────────────────────────────────────────────────

/// A decoded value plus the unconsumed remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult<A> {
    pub value: A,
    pub remainder: BitVector,
}

impl<A> DecodeResult<A> {
    pub fn new(value: A, remainder: BitVector) -> Self {
        Self { value, remainder }
    }

    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> DecodeResult<B> {
        DecodeResult { value: f(self.value), remainder: self.remainder }
    }
}

// ── Codec ────────────────────────────────────────────────────────────────────

type EncodeFn<A> = dyn Fn(&A) -> Attempt<BitVector> + Send + Sync;
type DecodeFn<A> = dyn Fn(&BitVector) -> Attempt<DecodeResult<A>> + Send + Sync;

/// A bidirectional, failable mapping between values of type `A` and bit
/// vectors.  See the module docs.
pub struct Codec<A> {
    label: Arc<str>,
    bound: SizeBound,
    enc: Arc<EncodeFn<A>>,
    dec: Arc<DecodeFn<A>>,
}

impl<A> Clone for Codec<A> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            bound: self.bound,
            enc: self.enc.clone(),
            dec: self.dec.clone(),
        }
    }
}

impl<A> std::fmt::Debug for Codec<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Codec({})", self.label)
    }
}

impl<A: 'static> Codec<A> {
    /// Assemble a codec from its parts.  Primitives and combinators are
    /// all built through here.
    pub fn new(
        label: impl Into<String>,
        bound: SizeBound,
        encode: impl Fn(&A) -> Attempt<BitVector> + Send + Sync + 'static,
        decode: impl Fn(&BitVector) -> Attempt<DecodeResult<A>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: Arc::from(label.into()),
            bound,
            enc: Arc::new(encode),
            dec: Arc::new(decode),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size_bound(&self) -> SizeBound {
        self.bound
    }

    /// Encode `value` into bits.
    pub fn encode(&self, value: &A) -> Attempt<BitVector> {
        (self.enc)(value)
    }

    /// Decode a prefix of `bits` into a value and the unconsumed rest.
    pub fn decode(&self, bits: &BitVector) -> Attempt<DecodeResult<A>> {
        (self.dec)(bits)
    }

    /// Decode, discarding the remainder.
    pub fn decode_value(&self, bits: &BitVector) -> Attempt<A> {
        self.decode(bits).map(|r| r.value)
    }

    /// Encode a value known to be valid.
    ///
    /// # Panics
    /// Panics on encoding failure.  This is the only panicking encode path
    /// in the crate; everything else reports through [`Attempt`].
    pub fn encode_valid(&self, value: &A) -> BitVector {
        self.encode(value)
            .unwrap_or_else(|e| panic!("encode_valid({}): {e}", self.label))
    }

    /// Decode bits known to be valid, discarding the remainder.
    ///
    /// # Panics
    /// Panics on decoding failure.
    pub fn decode_valid_value(&self, bits: &BitVector) -> A {
        self.decode_value(bits)
            .unwrap_or_else(|e| panic!("decode_valid_value({}): {e}", self.label))
    }

    // ── Transformation combinators ───────────────────────────────────────────

    /// Total isomorphism: map decoded values with `f`, encoded values
    /// with `g`.  Size bound preserved.
    pub fn xmap<B: 'static>(
        self,
        f: impl Fn(A) -> B + Send + Sync + 'static,
        g: impl Fn(&B) -> A + Send + Sync + 'static,
    ) -> Codec<B> {
        let enc = self.enc;
        let dec = self.dec;
        Codec {
            label: self.label,
            bound: self.bound,
            enc: Arc::new(move |b| enc(&g(b))),
            dec: Arc::new(move |bits| dec(bits).map(|r| r.map(&f))),
        }
    }

    /// Partial isomorphism: both directions may reject values.
    pub fn exmap<B: 'static>(
        self,
        f: impl Fn(A) -> Attempt<B> + Send + Sync + 'static,
        g: impl Fn(&B) -> Attempt<A> + Send + Sync + 'static,
    ) -> Codec<B> {
        let enc = self.enc;
        let dec = self.dec;
        Codec {
            label: self.label,
            bound: self.bound,
            enc: Arc::new(move |b| enc(&g(b)?)),
            dec: Arc::new(move |bits| {
                let r = dec(bits)?;
                Ok(DecodeResult::new(f(r.value)?, r.remainder))
            }),
        }
    }

    /// Partial on decode only: `f` may reject decoded values.
    pub fn narrow<B: 'static>(
        self,
        f: impl Fn(A) -> Attempt<B> + Send + Sync + 'static,
        g: impl Fn(&B) -> A + Send + Sync + 'static,
    ) -> Codec<B> {
        self.exmap(f, move |b| Ok(g(b)))
    }

    /// Partial on encode only: `g` may reject values to encode.
    pub fn widen<B: 'static>(
        self,
        f: impl Fn(A) -> B + Send + Sync + 'static,
        g: impl Fn(&B) -> Attempt<A> + Send + Sync + 'static,
    ) -> Codec<B> {
        self.exmap(move |a| Ok(f(a)), g)
    }

    /// Inject into a wider variant type `B`.  Decoded values are injected
    /// with `inject`; encoding fails when `project` does not recognize the
    /// variant.
    pub fn upcast<B: 'static>(
        self,
        inject: impl Fn(A) -> B + Send + Sync + 'static,
        project: impl Fn(&B) -> Option<A> + Send + Sync + 'static,
    ) -> Codec<B> {
        let name = std::any::type_name::<A>();
        self.widen(inject, move |b| {
            project(b).ok_or_else(|| Error::new(format!("not a value of type {name}")))
        })
    }

    /// Project from a wider variant type `A` onto `B`.  Encoding embeds
    /// with `embed`; decoding fails when the decoded value is not a `B`.
    pub fn downcast<B: 'static>(
        self,
        embed: impl Fn(&B) -> A + Send + Sync + 'static,
        project: impl Fn(A) -> Option<B> + Send + Sync + 'static,
    ) -> Codec<B> {
        let name = std::any::type_name::<B>();
        self.narrow(
            move |a| project(a).ok_or_else(|| Error::new(format!("not a value of type {name}"))),
            embed,
        )
    }

    /// Wrap errors from both directions with a context frame.
    pub fn with_context(self, name: impl Into<String>) -> Codec<A> {
        let name: Arc<str> = Arc::from(name.into());
        let label = Arc::from(format!("{name}({})", self.label));
        let enc = self.enc;
        let dec = self.dec;
        let enc_name = name.clone();
        let dec_name = name;
        Codec {
            label,
            bound: self.bound,
            enc: Arc::new(move |a| enc(a).map_err(|e| e.push_context(enc_name.as_ref()))),
            dec: Arc::new(move |bits| dec(bits).map_err(|e| e.push_context(dec_name.as_ref()))),
        }
    }

    /// Replace the debug label only; behavior unchanged.
    pub fn with_label(mut self, label: impl Into<String>) -> Codec<A> {
        self.label = Arc::from(label.into());
        self
    }

    /// Collapse to a `Codec<()>`: encodes `()` as `encode(zero)`, decodes
    /// and discards the value.
    pub fn unit(self, zero: A) -> Codec<()>
    where
        A: Send + Sync,
    {
        let enc = self.enc;
        let dec = self.dec;
        Codec {
            label: self.label,
            bound: self.bound,
            enc: Arc::new(move |_: &()| enc(&zero)),
            dec: Arc::new(move |bits| dec(bits).map(|r| r.map(|_| ()))),
        }
    }

    /// Require the decoder to consume the entire input.  A non-empty
    /// remainder fails with a hex preview capped at 512 bits.
    pub fn complete(self) -> Codec<A> {
        let dec = self.dec;
        Codec {
            label: self.label,
            bound: self.bound,
            enc: self.enc,
            dec: Arc::new(move |bits| {
                let r = dec(bits)?;
                if r.remainder.is_empty() {
                    return Ok(r);
                }
                let n = r.remainder.len();
                if n > 512 {
                    Err(Error::new("more than 512 bits remaining"))
                } else {
                    Err(Error::new(format!("{n} bits remaining: 0x{}", r.remainder.to_hex())))
                }
            }),
        }
    }

    /// Canonicalize encoder output to a contiguous buffer.
    pub fn compact(self) -> Codec<A> {
        let enc = self.enc;
        Codec {
            label: self.label,
            bound: self.bound,
            enc: Arc::new(move |a| enc(a).map(|b| b.compact())),
            dec: self.dec,
        }
    }

    /// Half-duplex: decoding always fails.
    pub fn encode_only(self) -> Codec<A> {
        Codec {
            label: self.label,
            bound: self.bound,
            enc: self.enc,
            dec: Arc::new(|_: &BitVector| Err(Error::new("decoding is not supported"))),
        }
    }

    /// Half-duplex: encoding always fails.
    pub fn decode_only(self) -> Codec<A> {
        Codec {
            label: self.label,
            bound: self.bound,
            enc: Arc::new(|_: &A| Err(Error::new("encoding is not supported"))),
            dec: self.dec,
        }
    }
}

// ── Deferred construction ────────────────────────────────────────────────────

/// Defer codec construction until first use; the thunk runs at most once.
///
/// Required for recursive codecs: the thunk may reference the function it
/// is defined in.  It must not force the codec it is initializing.  The
/// size bound is `unknown` — computing a real bound would force the thunk
/// eagerly and defeat recursion.
pub fn lazily<A: 'static>(thunk: impl Fn() -> Codec<A> + Send + Sync + 'static) -> Codec<A> {
    let cell: Arc<OnceLock<Codec<A>>> = Arc::new(OnceLock::new());
    let thunk = Arc::new(thunk);
    let enc = {
        let cell = cell.clone();
        let thunk = thunk.clone();
        move |a: &A| cell.get_or_init(|| thunk()).encode(a)
    };
    let dec = {
        let cell = cell;
        let thunk = thunk;
        move |bits: &BitVector| cell.get_or_init(|| thunk()).decode(bits)
    };
    Codec::new("lazily", SizeBound::unknown(), enc, dec)
}
