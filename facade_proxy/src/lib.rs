// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-erased proxies over facades.
//!
//! A [`Facade`] names the operations ("conventions") and structural capabilities ("skills") a
//! type-erased handle exposes, plus the copy/relocation/destruction guarantees it makes. Any
//! concrete type that implements the facade's conventions can be wrapped in a [`Proxy`] without
//! implementing a trait object or inheriting from anything.
//!
//! ## Pieces
//!
//! - [`Convention`]: a dispatch type with an argument tuple and output. Concrete types opt in by
//!   implementing [`ImplMut`] (exclusive receiver) or [`ImplRef`] (shared receiver).
//! - [`caps!`]: builds the facade's capability list from [`Mut`], [`Ref`], [`Both`], the
//!   [`AsView`] and [`Reflect`] skills, [`Include`] and [`Upward`].
//! - [`DispatchTable`]: one per (stored type, facade), built at compile time as an associated
//!   constant of [`HasTable`] and referenced as `&'static`. Conventions are resolved in it by
//!   key, so a later declaration shadows an earlier or included one.
//! - [`Proxy`]: the owning handle (three machine words). Values of at most two words with word
//!   alignment are stored inline; larger values are boxed. A proxy can also own a pointer
//!   (`Box<T>`, `&'a mut T`, `Rc<T>`) and dispatch to its target.
//! - [`ProxyView`] / [`ProxyViewMut`]: non-owning handles (two machine words) sharing the same
//!   table and borrowing the same storage.
//! - [`FacadeBuilder`] / [`FacadeDescriptor`]: an inspectable description of a facade's
//!   composition, with the composition rules (override, ambiguity, conflicts, upward subset)
//!   checked in [`FacadeBuilder::build`].
//!
//! ## Example
//!
//! ```
//! use facade_proxy::{
//!     caps, AsView, Facade, FreeToString, Nothrow, OpAddAssign, Proxy, Ref, Mut, Unsupported,
//! };
//!
//! struct Number;
//!
//! impl Facade for Number {
//!     type Capabilities = caps![Mut<OpAddAssign<i32>>, Ref<FreeToString>, AsView];
//!     type Copy = Unsupported;
//!     type Relocation = Nothrow;
//!     type Destruction = Nothrow;
//! }
//!
//! let mut p = Proxy::<Number>::new(123_i32);
//! p.call_mut::<OpAddAssign<i32>>((3,));
//! assert_eq!(p.call::<FreeToString>(()), "126");
//!
//! let view = p.as_view();
//! assert_eq!(view.call::<FreeToString>(()), "126");
//! ```

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod capability;
pub mod constraint;
pub mod convention;
pub mod descriptor;
mod dispatch;
pub mod facade;
pub mod proxy;
pub mod skill;
mod storage;
pub mod table;
pub mod view;

pub use capability::{Both, Capability, Cons, Include, Locate, Mut, Nil, Ref, Upward};
pub use constraint::{
    Constraint, ConstraintLevel, NoStricterThan, Nontrivial, Nothrow, Trivial, Unsupported,
};
pub use convention::{
    Convention, FreeToString, ImplMut, ImplRef, OpAddAssign, OpBitAndAssign, OpBitOrAssign,
    OpBitXorAssign, OpCall, OpDivAssign, OpEq, OpMulAssign, OpRemAssign, OpShlAssign,
    OpShrAssign, OpSubAssign, Qualifier,
};
pub use descriptor::{
    ConventionSpec, FacadeBuilder, FacadeDescriptor, FacadeError, Mismatch, Operation, Signature,
    Skill,
};
pub use facade::Facade;
pub use proxy::{Proxy, ProxyError};
pub use skill::{AsView, Reflect, TypeInfo};
pub use table::{
    Access, AccessMut, Direct, DispatchTable, HasTable, Pointee, Proxiable, SLOT_CAPACITY,
};
pub use view::{ProxyView, ProxyViewMut};
