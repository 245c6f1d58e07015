// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Non-owning handles.
//!
//! A view is two machine words: the dispatch table and the address of a value someone else owns.
//! It never drops the value and is itself trivially destructible. Views borrow their source for
//! `'a`, so a view cannot outlive the value it points to:
//!
//! ```compile_fail
//! use facade_proxy::{caps, AsView, Facade, FreeToString, Nothrow, Proxy, Ref, Unsupported};
//!
//! struct Printable;
//! impl Facade for Printable {
//!     type Capabilities = caps![Ref<FreeToString>, AsView];
//!     type Copy = Unsupported;
//!     type Relocation = Nothrow;
//!     type Destruction = Nothrow;
//! }
//!
//! let mut p = Proxy::<Printable>::new(1_u8);
//! let view = p.as_view();
//! p.reset();
//! view.call::<FreeToString>(());
//! ```

#![allow(unsafe_code, reason = "views hold type-erased borrowed pointers")]

use core::any::type_name;
use core::fmt;
use core::marker::PhantomData;
use core::ptr;

use crate::capability::{Locate, UpwardTo};
use crate::constraint::NoStricterThan;
use crate::convention::{Convention, Qualifier};
use crate::dispatch;
use crate::facade::Facade;
use crate::proxy::ProxyError;
use crate::skill::TypeInfo;
use crate::table::{DispatchTable, Proxiable};

/// A shared, copyable view of a value satisfying facade `F`.
///
/// Only the shared access path is available.
pub struct ProxyView<'a, F: Facade> {
    table: Option<&'static DispatchTable>,
    data: *const u8,
    _borrow: PhantomData<(&'a (), fn() -> F)>,
}

impl<'a, F: Facade> ProxyView<'a, F> {
    /// A view of `value`.
    ///
    /// Viewing a value directly needs no skill; `T` only has to satisfy `F`.
    pub fn new<T: Proxiable<F>>(value: &'a T) -> Self {
        Self::from_raw(Some(T::TABLE), ptr::from_ref(value).cast())
    }

    /// A view of nothing.
    pub const fn empty() -> Self {
        Self::from_raw(None, ptr::null())
    }

    pub(crate) const fn from_raw(table: Option<&'static DispatchTable>, data: *const u8) -> Self {
        Self {
            table,
            data,
            _borrow: PhantomData,
        }
    }

    /// Whether the view refers to a value.
    #[inline]
    pub fn has_value(&self) -> bool {
        self.table.is_some()
    }

    /// Calls `C` through the shared access path.
    ///
    /// # Panics
    ///
    /// If the view is empty.
    #[inline]
    #[track_caller]
    pub fn call<C: Convention>(&self, args: C::Args) -> C::Output {
        let Some(table) = self.table else {
            dispatch::empty_handle()
        };
        // SAFETY: `data` is the value `table` describes, borrowed shared for `'a`.
        unsafe { dispatch::invoke::<C>(table, Qualifier::Ref, self.data.cast_mut(), args) }
    }

    /// Like [`call`](Self::call), returning a [`ProxyError`] instead of panicking.
    pub fn try_call<C: Convention>(&self, args: C::Args) -> Result<C::Output, ProxyError> {
        let table = self.table.ok_or(ProxyError::Empty)?;
        // SAFETY: as in `call`.
        unsafe { dispatch::try_invoke::<C>(table, Qualifier::Ref, self.data.cast_mut(), args) }
    }

    /// Converts into a view of facade `G`, which `F` includes with [`Upward`](crate::Upward).
    pub fn upcast<G, I>(self) -> ProxyView<'a, G>
    where
        G: Facade,
        F::Capabilities: Locate<UpwardTo<G>, I>,
        G::Copy: NoStricterThan<F::Copy>,
        G::Relocation: NoStricterThan<F::Relocation>,
        G::Destruction: NoStricterThan<F::Destruction>,
    {
        ProxyView::from_raw(
            self.table.map(dispatch::upward_table::<F, G, I>),
            self.data,
        )
    }

    /// Identity of the viewed value's type, or `None` when empty.
    ///
    /// Requires [`Reflect`](crate::Reflect).
    pub fn type_info(&self) -> Option<TypeInfo> {
        self.table.map(dispatch::type_info::<F>)
    }
}

impl<F: Facade> Clone for ProxyView<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: Facade> Copy for ProxyView<'_, F> {}

impl<F: Facade> Default for ProxyView<'_, F> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<F: Facade> fmt::Debug for ProxyView<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyView")
            .field("facade", &type_name::<F>())
            .field("has_value", &self.has_value())
            .finish_non_exhaustive()
    }
}

/// An exclusive view of a value satisfying facade `F`.
///
/// Both access paths are available. Not `Copy`: use [`reborrow`](Self::reborrow) for a shorter
/// exclusive view or [`as_view`](Self::as_view) for shared ones.
pub struct ProxyViewMut<'a, F: Facade> {
    table: Option<&'static DispatchTable>,
    data: *mut u8,
    _borrow: PhantomData<(&'a mut (), fn() -> F)>,
}

impl<'a, F: Facade> ProxyViewMut<'a, F> {
    /// An exclusive view of `value`.
    pub fn new<T: Proxiable<F>>(value: &'a mut T) -> Self {
        Self::from_raw(Some(T::TABLE), ptr::from_mut(value).cast())
    }

    /// A view of nothing.
    pub const fn empty() -> Self {
        Self::from_raw(None, ptr::null_mut())
    }

    pub(crate) const fn from_raw(table: Option<&'static DispatchTable>, data: *mut u8) -> Self {
        Self {
            table,
            data,
            _borrow: PhantomData,
        }
    }

    /// Whether the view refers to a value.
    #[inline]
    pub fn has_value(&self) -> bool {
        self.table.is_some()
    }

    /// Calls `C` through the exclusive access path.
    ///
    /// # Panics
    ///
    /// If the view is empty.
    #[inline]
    #[track_caller]
    pub fn call_mut<C: Convention>(&mut self, args: C::Args) -> C::Output {
        let Some(table) = self.table else {
            dispatch::empty_handle()
        };
        // SAFETY: `data` is uniquely borrowed for `'a`, and `self` is borrowed exclusively.
        unsafe { dispatch::invoke::<C>(table, Qualifier::Mut, self.data, args) }
    }

    /// Calls `C` through the shared access path.
    ///
    /// # Panics
    ///
    /// If the view is empty.
    #[inline]
    #[track_caller]
    pub fn call<C: Convention>(&self, args: C::Args) -> C::Output {
        self.as_view().call::<C>(args)
    }

    /// Like [`call_mut`](Self::call_mut), returning a [`ProxyError`] instead of panicking.
    pub fn try_call_mut<C: Convention>(&mut self, args: C::Args) -> Result<C::Output, ProxyError> {
        let table = self.table.ok_or(ProxyError::Empty)?;
        // SAFETY: as in `call_mut`.
        unsafe { dispatch::try_invoke::<C>(table, Qualifier::Mut, self.data, args) }
    }

    /// Like [`call`](Self::call), returning a [`ProxyError`] instead of panicking.
    pub fn try_call<C: Convention>(&self, args: C::Args) -> Result<C::Output, ProxyError> {
        self.as_view().try_call::<C>(args)
    }

    /// A shared view for as long as `self` is borrowed.
    pub fn as_view(&self) -> ProxyView<'_, F> {
        ProxyView::from_raw(self.table, self.data.cast_const())
    }

    /// A shorter exclusive view.
    pub fn reborrow(&mut self) -> ProxyViewMut<'_, F> {
        ProxyViewMut::from_raw(self.table, self.data)
    }

    /// Gives up exclusivity.
    pub fn into_view(self) -> ProxyView<'a, F> {
        ProxyView::from_raw(self.table, self.data.cast_const())
    }

    /// Converts into a view of facade `G`, which `F` includes with [`Upward`](crate::Upward).
    pub fn upcast<G, I>(self) -> ProxyViewMut<'a, G>
    where
        G: Facade,
        F::Capabilities: Locate<UpwardTo<G>, I>,
        G::Copy: NoStricterThan<F::Copy>,
        G::Relocation: NoStricterThan<F::Relocation>,
        G::Destruction: NoStricterThan<F::Destruction>,
    {
        ProxyViewMut::from_raw(
            self.table.map(dispatch::upward_table::<F, G, I>),
            self.data,
        )
    }

    /// Identity of the viewed value's type, or `None` when empty.
    ///
    /// Requires [`Reflect`](crate::Reflect).
    pub fn type_info(&self) -> Option<TypeInfo> {
        self.table.map(dispatch::type_info::<F>)
    }
}

impl<F: Facade> Default for ProxyViewMut<'_, F> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<F: Facade> fmt::Debug for ProxyViewMut<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyViewMut")
            .field("facade", &type_name::<F>())
            .field("has_value", &self.has_value())
            .finish_non_exhaustive()
    }
}
