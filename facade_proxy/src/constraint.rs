// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Constraint levels for copy, relocation, and destruction.
//!
//! A facade picks one marker per lifecycle operation. The marker decides what a concrete type
//! must provide to be wrapped (`Trivial` copy needs `Copy`, `Nontrivial` copy needs `Clone`)
//! and what the handle offers (`Proxy<F>: Clone` only when copy is not [`Unsupported`]).
//!
//! Rust values are always relocated by a bitwise move that cannot fail, so every relocation level
//! is satisfied by every type. The level is still carried so descriptors and upward conversion
//! can compare it.

use core::fmt;

use crate::storage;

/// Strength of a lifecycle guarantee, weakest first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintLevel {
    /// Not supported.
    None,
    /// Supported, may fail.
    Nontrivial,
    /// Supported, never fails.
    Nothrow,
    /// Supported as a bitwise operation.
    Trivial,
}

impl ConstraintLevel {
    /// The stricter of two levels. Usable in constant evaluation.
    pub const fn stricter(self, other: Self) -> Self {
        if self as u8 >= other as u8 { self } else { other }
    }

    /// Whether `self` guarantees at least as much as `required`.
    pub const fn satisfies(self, required: Self) -> bool {
        self as u8 >= required as u8
    }
}

impl fmt::Display for ConstraintLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Nontrivial => "nontrivial",
            Self::Nothrow => "nothrow",
            Self::Trivial => "trivial",
        })
    }
}

mod sealed {
    #[allow(unnameable_types, reason = "sealed supertrait")]
    pub trait Sealed {}
}

/// A constraint-level marker type.
pub trait Constraint: sealed::Sealed + 'static {
    /// The level this marker stands for.
    const LEVEL: ConstraintLevel;
}

/// Level [`ConstraintLevel::None`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Unsupported;

/// Level [`ConstraintLevel::Nontrivial`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Nontrivial;

/// Level [`ConstraintLevel::Nothrow`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Nothrow;

/// Level [`ConstraintLevel::Trivial`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Trivial;

macro_rules! level {
    ($($marker:ident => $level:ident),*) => {$(
        impl sealed::Sealed for $marker {}
        impl Constraint for $marker {
            const LEVEL: ConstraintLevel = ConstraintLevel::$level;
        }
    )*};
}

level!(Unsupported => None, Nontrivial => Nontrivial, Nothrow => Nothrow, Trivial => Trivial);

/// Erased clone: reads a `T` at `src` and writes its clone into the proxy buffer at `dst`.
pub type CloneFn = unsafe fn(src: *const u8, dst: *mut u8);

/// What a copy level demands of `T`.
pub trait CopyPolicy<T>: Constraint {
    /// The clone thunk, absent when copying is unsupported.
    const CLONE: Option<CloneFn>;
}

impl<T> CopyPolicy<T> for Unsupported {
    const CLONE: Option<CloneFn> = None;
}

impl<T: Clone> CopyPolicy<T> for Nontrivial {
    const CLONE: Option<CloneFn> = Some(storage::clone_erased::<T>);
}

impl<T: Clone> CopyPolicy<T> for Nothrow {
    const CLONE: Option<CloneFn> = Some(storage::clone_erased::<T>);
}

impl<T: Copy> CopyPolicy<T> for Trivial {
    const CLONE: Option<CloneFn> = Some(storage::clone_erased::<T>);
}

/// What a relocation level demands of `T`. Satisfied by every type.
pub trait RelocatePolicy<T>: Constraint {}

impl<T, L: Constraint> RelocatePolicy<T> for L {}

/// What a destruction level demands of `T`.
///
/// [`Unsupported`] has no impl: a handle that can never be dropped is not expressible.
pub trait DestroyPolicy<T>: Constraint {}

impl<T> DestroyPolicy<T> for Nontrivial {}
impl<T> DestroyPolicy<T> for Nothrow {}
impl<T: Copy> DestroyPolicy<T> for Trivial {}

/// Copy levels under which a proxy can be cloned.
pub trait Duplicable: Constraint {}

impl Duplicable for Nontrivial {}
impl Duplicable for Nothrow {}
impl Duplicable for Trivial {}

/// `Self` is a level no stricter than `L`.
///
/// Upward conversion requires each of the target's levels to be no stricter than the source's.
pub trait NoStricterThan<L: Constraint>: Constraint {}

macro_rules! no_stricter {
    ($($weaker:ident <= $($stronger:ident),+;)*) => {$($(
        impl NoStricterThan<$stronger> for $weaker {}
    )+)*};
}

no_stricter! {
    Unsupported <= Unsupported, Nontrivial, Nothrow, Trivial;
    Nontrivial <= Nontrivial, Nothrow, Trivial;
    Nothrow <= Nothrow, Trivial;
    Trivial <= Trivial;
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn is_no_stricter<A: NoStricterThan<B>, B: Constraint>() -> bool {
        A::LEVEL <= B::LEVEL
    }

    #[test]
    fn levels_are_ordered_weakest_first() {
        assert!(ConstraintLevel::None < ConstraintLevel::Nontrivial, "none < nontrivial");
        assert!(ConstraintLevel::Nontrivial < ConstraintLevel::Nothrow, "nontrivial < nothrow");
        assert!(ConstraintLevel::Nothrow < ConstraintLevel::Trivial, "nothrow < trivial");
    }

    #[test]
    fn const_helpers_agree_with_ordering() {
        use ConstraintLevel::*;
        assert_eq!(Nontrivial.stricter(Trivial), Trivial);
        assert_eq!(Nothrow.stricter(None), Nothrow);
        assert!(Nothrow.satisfies(Nontrivial), "nothrow covers nontrivial");
        assert!(!Nontrivial.satisfies(Trivial), "nontrivial does not cover trivial");
    }

    #[test]
    fn no_stricter_agrees_with_ordering() {
        assert!(is_no_stricter::<Unsupported, Trivial>(), "none <= trivial");
        assert!(is_no_stricter::<Nontrivial, Nothrow>(), "nontrivial <= nothrow");
        assert!(is_no_stricter::<Trivial, Trivial>(), "trivial <= trivial");
    }

    #[test]
    fn copy_policy_exposes_clone_only_when_supported() {
        assert!(<Unsupported as CopyPolicy<u8>>::CLONE.is_none(), "unsupported copy");
        assert!(<Nothrow as CopyPolicy<u8>>::CLONE.is_some(), "nothrow copy");
    }
}
