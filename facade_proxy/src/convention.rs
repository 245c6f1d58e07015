// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conventions: named operations a facade can dispatch.
//!
//! A convention is a zero-sized dispatch type. It fixes the argument tuple and the output type;
//! concrete types bind to it by implementing [`ImplMut`] (called through an exclusive receiver)
//! or [`ImplRef`] (called through a shared receiver). Overloads that differ by argument type are
//! different dispatch types, e.g. `OpAddAssign<i32>` and `OpAddAssign<f64>`.

use alloc::string::{String, ToString};
use core::fmt;
use core::marker::PhantomData;
use core::ops;

/// A dispatchable operation.
pub trait Convention: 'static {
    /// Stable dispatch name, used in descriptors and diagnostics.
    const TAG: &'static str;
    /// Argument tuple.
    type Args;
    /// Return type.
    type Output;
}

/// Binds `Self` to `T` through an exclusive receiver (the non-const access path).
pub trait ImplMut<T: ?Sized>: Convention {
    /// Invoke the convention on `this`.
    fn call_mut(this: &mut T, args: Self::Args) -> Self::Output;
}

/// Binds `Self` to `T` through a shared receiver (the const access path).
pub trait ImplRef<T: ?Sized>: Convention {
    /// Invoke the convention on `this`.
    fn call_ref(this: &T, args: Self::Args) -> Self::Output;
}

/// Receiver qualifier of one convention signature.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Qualifier {
    /// Exclusive receiver (`&mut self`).
    Mut,
    /// Shared receiver (`&self`).
    Ref,
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mut => f.write_str("&mut"),
            Self::Ref => f.write_str("&"),
        }
    }
}

macro_rules! compound_assign {
    ($($name:ident, $tr:ident, $method:ident, $tag:literal;)*) => {$(
        #[doc = concat!("The `", $tag, "` operator with a right-hand side of type `R`.")]
        #[derive(Debug)]
        pub struct $name<R>(PhantomData<fn(R)>);

        impl<R: 'static> Convention for $name<R> {
            const TAG: &'static str = $tag;
            type Args = (R,);
            type Output = ();
        }

        impl<T: ops::$tr<R> + ?Sized, R: 'static> ImplMut<T> for $name<R> {
            #[inline]
            fn call_mut(this: &mut T, (rhs,): (R,)) {
                ops::$tr::$method(this, rhs);
            }
        }
    )*};
}

compound_assign! {
    OpAddAssign, AddAssign, add_assign, "+=";
    OpSubAssign, SubAssign, sub_assign, "-=";
    OpMulAssign, MulAssign, mul_assign, "*=";
    OpDivAssign, DivAssign, div_assign, "/=";
    OpRemAssign, RemAssign, rem_assign, "%=";
    OpBitAndAssign, BitAndAssign, bitand_assign, "&=";
    OpBitOrAssign, BitOrAssign, bitor_assign, "|=";
    OpBitXorAssign, BitXorAssign, bitxor_assign, "^=";
    OpShlAssign, ShlAssign, shl_assign, "<<=";
    OpShrAssign, ShrAssign, shr_assign, ">>=";
}

/// The `==` operator against a right-hand side of type `R`.
#[derive(Debug)]
pub struct OpEq<R>(PhantomData<fn(R)>);

impl<R: 'static> Convention for OpEq<R> {
    const TAG: &'static str = "==";
    type Args = (R,);
    type Output = bool;
}

impl<T: PartialEq<R> + ?Sized, R: 'static> ImplRef<T> for OpEq<R> {
    #[inline]
    fn call_ref(this: &T, (rhs,): (R,)) -> bool {
        *this == rhs
    }
}

/// The call operator: `A` is the argument tuple, `O` the result.
///
/// Bound through [`ImplMut`] for `FnMut` and through [`ImplRef`] for `Fn`, for up to three
/// arguments.
#[derive(Debug)]
pub struct OpCall<A, O>(PhantomData<fn(A) -> O>);

impl<A: 'static, O: 'static> Convention for OpCall<A, O> {
    const TAG: &'static str = "()";
    type Args = A;
    type Output = O;
}

macro_rules! call_arity {
    ($($arg:ident),*) => {
        impl<F, O: 'static, $($arg: 'static),*> ImplMut<F> for OpCall<($($arg,)*), O>
        where
            F: FnMut($($arg),*) -> O,
        {
            #[inline]
            #[allow(non_snake_case, reason = "argument bindings reuse the type parameter names")]
            fn call_mut(this: &mut F, ($($arg,)*): ($($arg,)*)) -> O {
                this($($arg),*)
            }
        }

        impl<F, O: 'static, $($arg: 'static),*> ImplRef<F> for OpCall<($($arg,)*), O>
        where
            F: Fn($($arg),*) -> O,
        {
            #[inline]
            #[allow(non_snake_case, reason = "argument bindings reuse the type parameter names")]
            fn call_ref(this: &F, ($($arg,)*): ($($arg,)*)) -> O {
                this($($arg),*)
            }
        }
    };
}

call_arity!();
call_arity!(A0);
call_arity!(A0, A1);
call_arity!(A0, A1, A2);

/// The free function `to_string`, bound to any [`ToString`] type.
#[derive(Copy, Clone, Debug, Default)]
pub struct FreeToString;

impl Convention for FreeToString {
    const TAG: &'static str = "to_string";
    type Args = ();
    type Output = String;
}

impl<T: ToString + ?Sized> ImplRef<T> for FreeToString {
    #[inline]
    fn call_ref(this: &T, (): ()) -> String {
        this.to_string()
    }
}
