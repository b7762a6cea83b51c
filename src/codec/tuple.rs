//! Product composition: pairs, unit-dropping, dependent fields, and flat
//! tuples.
//!
//! Composition is explicit pair-nesting with helpers on top.  `pair` glues
//! two codecs field-after-field; [`tuple_codec!`](crate::tuple_codec)
//! flattens chains of pairs into ordinary tuples up to arity 6.  The
//! dependent combinators (`flat_zip`, `consume`, `derive_*`) cover
//! length-prefixed and derived-field layouts where a later codec is a
//! function of an earlier value.

use std::sync::Arc;

use crate::bits::BitVector;
use crate::codec::{Codec, DecodeResult};
use crate::size_bound::SizeBound;

impl<A: 'static> Codec<A> {
    /// Sequential composition: `self` then `second`.
    pub fn pair<B: 'static>(self, second: Codec<B>) -> Codec<(A, B)> {
        let label = format!("({}, {})", self.label(), second.label());
        let bound = self.size_bound() + second.size_bound();
        let first_enc = self.clone();
        let first_dec = self;
        let second_enc = second.clone();
        let second_dec = second;
        Codec::new(
            label,
            bound,
            move |v: &(A, B)| {
                let a = first_enc.encode(&v.0)?;
                let b = second_enc.encode(&v.1)?;
                Ok(a.concat(&b))
            },
            move |bits: &BitVector| {
                let ra = first_dec.decode(bits)?;
                let rb = second_dec.decode(&ra.remainder)?;
                Ok(DecodeResult::new((ra.value, rb.value), rb.remainder))
            },
        )
    }

    /// `self` then a unit codec whose bits are kept on the wire but whose
    /// value is dropped.
    pub fn drop_right(self, right: Codec<()>) -> Codec<A> {
        let label = format!("({} <~ {})", self.label(), right.label());
        let bound = self.size_bound() + right.size_bound();
        let first_enc = self.clone();
        let first_dec = self;
        let right_enc = right.clone();
        let right_dec = right;
        Codec::new(
            label,
            bound,
            move |a: &A| {
                let ea = first_enc.encode(a)?;
                let eu = right_enc.encode(&())?;
                Ok(ea.concat(&eu))
            },
            move |bits: &BitVector| {
                let ra = first_dec.decode(bits)?;
                let ru = right_dec.decode(&ra.remainder)?;
                Ok(DecodeResult::new(ra.value, ru.remainder))
            },
        )
    }

    /// Sequential composition where the second codec is a function of the
    /// first decoded value.  Encodes `(a, b)` as `encode(a) ++
    /// f(a).encode(b)`; decoding mirrors.
    pub fn flat_zip<B: 'static>(
        self,
        f: impl Fn(&A) -> Codec<B> + Send + Sync + 'static,
    ) -> Codec<(A, B)> {
        let label = format!("flat-zip ({})", self.label());
        let bound = self.size_bound() + SizeBound::at_least(0);
        let f = Arc::new(f);
        let first_enc = self.clone();
        let first_dec = self;
        let f_enc = f.clone();
        let f_dec = f;
        Codec::new(
            label,
            bound,
            move |v: &(A, B)| {
                let a = first_enc.encode(&v.0)?;
                let b = f_enc(&v.0).encode(&v.1)?;
                Ok(a.concat(&b))
            },
            move |bits: &BitVector| {
                let ra = first_dec.decode(bits)?;
                let rb = f_dec(&ra.value).decode(&ra.remainder)?;
                Ok(DecodeResult::new((ra.value, rb.value), rb.remainder))
            },
        )
    }

    /// Like [`flat_zip`](Codec::flat_zip), but the first value is hidden:
    /// `g` re-derives it from `B` on encode and decoding discards it.
    pub fn consume<B: 'static>(
        self,
        f: impl Fn(&A) -> Codec<B> + Send + Sync + 'static,
        g: impl Fn(&B) -> A + Send + Sync + 'static,
    ) -> Codec<B> {
        let label = format!("consume ({})", self.label());
        let f = Arc::new(f);
        let bound = self.size_bound() + SizeBound::at_least(0);
        let first_enc = self.clone();
        let first_dec = self;
        let f_enc = f.clone();
        let f_dec = f;
        Codec::new(
            label,
            bound,
            move |b: &B| {
                let a = g(b);
                let ea = first_enc.encode(&a)?;
                let eb = f_enc(&a).encode(b)?;
                Ok(ea.concat(&eb))
            },
            move |bits: &BitVector| {
                let ra = first_dec.decode(bits)?;
                let rb = f_dec(&ra.value).decode(&ra.remainder)?;
                Ok(DecodeResult::new(rb.value, rb.remainder))
            },
        )
    }
}

impl Codec<()> {
    /// A unit codec followed by `right`; the unit's bits stay on the wire
    /// but only `right`'s value is produced.
    pub fn drop_left<B: 'static>(self, right: Codec<B>) -> Codec<B> {
        let label = format!("({} ~> {})", self.label(), right.label());
        let bound = self.size_bound() + right.size_bound();
        let left_enc = self.clone();
        let left_dec = self;
        let right_enc = right.clone();
        let right_dec = right;
        Codec::new(
            label,
            bound,
            move |b: &B| {
                let eu = left_enc.encode(&())?;
                let eb = right_enc.encode(b)?;
                Ok(eu.concat(&eb))
            },
            move |bits: &BitVector| {
                let ru = left_dec.decode(bits)?;
                right_dec.decode(&ru.remainder)
            },
        )
    }
}

impl<A: Clone + 'static, B: 'static> Codec<(A, B)> {
    /// Drop the second position: on encode it is recomputed from the first
    /// via `h`; on decode it is read and discarded.
    pub fn derive_right(self, h: impl Fn(&A) -> B + Send + Sync + 'static) -> Codec<A> {
        let label = format!("derived ({})", self.label());
        let bound = self.size_bound();
        let pair_enc = self.clone();
        let pair_dec = self;
        Codec::new(
            label,
            bound,
            move |a: &A| pair_enc.encode(&(a.clone(), h(a))),
            move |bits: &BitVector| pair_dec.decode(bits).map(|r| r.map(|(a, _)| a)),
        )
    }
}

impl<A: 'static, B: Clone + 'static> Codec<(A, B)> {
    /// Drop the first position: on encode it is recomputed from the second
    /// via `h`; on decode it is read and discarded.
    pub fn derive_left(self, h: impl Fn(&B) -> A + Send + Sync + 'static) -> Codec<B> {
        let label = format!("derived ({})", self.label());
        let bound = self.size_bound();
        let pair_enc = self.clone();
        let pair_dec = self;
        Codec::new(
            label,
            bound,
            move |b: &B| pair_enc.encode(&(h(b), b.clone())),
            move |bits: &BitVector| pair_dec.decode(bits).map(|r| r.map(|(_, b)| b)),
        )
    }
}

/// Compose 2 to 6 codecs into a codec of a flat tuple, fields in order.
/// Element types must be `Clone`.
#[macro_export]
macro_rules! tuple_codec {
    ($a:expr, $b:expr $(,)?) => {
        $a.pair($b)
    };
    ($a:expr, $b:expr, $c:expr $(,)?) => {
        $a.pair($b).pair($c).xmap(
            |((a, b), c)| (a, b, c),
            |t| ((t.0.clone(), t.1.clone()), t.2.clone()),
        )
    };
    ($a:expr, $b:expr, $c:expr, $d:expr $(,)?) => {
        $a.pair($b).pair($c).pair($d).xmap(
            |(((a, b), c), d)| (a, b, c, d),
            |t| (((t.0.clone(), t.1.clone()), t.2.clone()), t.3.clone()),
        )
    };
    ($a:expr, $b:expr, $c:expr, $d:expr, $e:expr $(,)?) => {
        $a.pair($b).pair($c).pair($d).pair($e).xmap(
            |((((a, b), c), d), e)| (a, b, c, d, e),
            |t| ((((t.0.clone(), t.1.clone()), t.2.clone()), t.3.clone()), t.4.clone()),
        )
    };
    ($a:expr, $b:expr, $c:expr, $d:expr, $e:expr, $f:expr $(,)?) => {
        $a.pair($b).pair($c).pair($d).pair($e).pair($f).xmap(
            |(((((a, b), c), d), e), f)| (a, b, c, d, e, f),
            |t| {
                (
                    ((((t.0.clone(), t.1.clone()), t.2.clone()), t.3.clone()), t.4.clone()),
                    t.5.clone(),
                )
            },
        )
    };
}

// ── Tests ────────────────────────────────────────────────────────────────────
