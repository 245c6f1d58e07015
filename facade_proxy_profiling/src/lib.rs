// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Profiling adapters for `facade_proxy` (currently Tracy).
//!
//! This crate is `std`-only and keeps `facade_proxy` itself free of profiling dependencies.
//! [`Profiled<C>`] is a convention that forwards to `C` and wraps every dispatch in a profiling
//! span, so instrumenting a facade is a change to its capability list only.
//!
//! ## Backend
//! This crate currently supports the Tracy backend via `tracy-client`.
//!
//! Without a running Tracy client no span is recorded and the call is forwarded unchanged.
//!
//! ## Example
//! ```
//! use facade_proxy::{caps, Facade, FreeToString, Mut, Nothrow, OpAddAssign, Proxy, Ref, Unsupported};
//! use facade_proxy_profiling::Profiled;
//!
//! struct Accumulator;
//!
//! impl Facade for Accumulator {
//!     type Capabilities = caps![Mut<Profiled<OpAddAssign<u64>>>, Ref<FreeToString>];
//!     type Copy = Unsupported;
//!     type Relocation = Nothrow;
//!     type Destruction = Nothrow;
//! }
//!
//! let mut p = Proxy::<Accumulator>::new(0_u64);
//! p.call_mut::<Profiled<OpAddAssign<u64>>>((1,));
//! assert_eq!(p.call::<FreeToString>(()), "1");
//! ```

mod label;
mod span;

pub use label::{DefaultLabeler, DispatchLabeler, ShortTypeLabeler};
pub use span::{Profiled, ProfiledWith};
