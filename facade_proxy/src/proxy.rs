// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The owning handle.

#![allow(unsafe_code, reason = "the proxy owns a type-erased value")]

use core::any::type_name;
use core::fmt;
use core::marker::PhantomData;
use core::mem::ManuallyDrop;

use crate::capability::{Locate, UpwardTo};
use crate::constraint::{Duplicable, NoStricterThan};
use crate::convention::{Convention, Qualifier};
use crate::dispatch;
use crate::facade::Facade;
use crate::skill::TypeInfo;
use crate::storage::{self, Storage};
use crate::table::{DispatchTable, HasTable, Pointee, Proxiable};
use crate::view::{ProxyView, ProxyViewMut};

/// Errors from the fallible accessors of [`Proxy`] and its views.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    /// The handle holds no value.
    #[error("the handle holds no value")]
    Empty,
    /// The facade does not declare the convention for the receiver used.
    #[error("facade does not declare `{convention}` for a `{path}` receiver")]
    Undeclared {
        /// Name of the convention type.
        convention: &'static str,
        /// Receiver the call went through.
        path: Qualifier,
    },
}

/// An owning, type-erased handle to a value satisfying facade `F`.
///
/// Three machine words: the dispatch table reference (absent when empty) and a two-word buffer.
/// Values that fit the buffer in size and alignment live in it; others are boxed. `'a` bounds
/// any borrow the stored value holds, so a proxy may own a `&'a mut T` and dispatch to the `T`
/// (see [`from_pointer`](Self::from_pointer)).
///
/// Conventions are resolved when called, the last declaration of a convention winning. Calling
/// a convention on an empty proxy, or one the facade does not declare for the receiver used,
/// panics; the `try_` variants report a [`ProxyError`] instead.
///
/// A proxy is neither `Send` nor `Sync`, since the facade does not say whether the stored type is.
///
/// Cloning requires a copy level other than [`Unsupported`](crate::Unsupported):
///
/// ```compile_fail
/// use facade_proxy::{caps, Facade, Nothrow, Proxy, Unsupported};
///
/// struct Unique;
///
/// impl Facade for Unique {
///     type Capabilities = caps![];
///     type Copy = Unsupported;
///     type Relocation = Nothrow;
///     type Destruction = Nothrow;
/// }
///
/// let p = Proxy::<Unique>::new(1_u8);
/// let q = p.clone();
/// ```
///
/// Wrapping requires a concrete type that binds every convention:
///
/// ```compile_fail
/// use facade_proxy::{caps, Facade, Mut, Nothrow, OpAddAssign, Proxy, Unsupported};
///
/// struct Addable;
///
/// impl Facade for Addable {
///     type Capabilities = caps![Mut<OpAddAssign<i32>>];
///     type Copy = Unsupported;
///     type Relocation = Nothrow;
///     type Destruction = Nothrow;
/// }
///
/// let p = Proxy::<Addable>::new("no += here");
/// ```
pub struct Proxy<'a, F: Facade> {
    table: Option<&'static DispatchTable>,
    storage: Storage,
    _marker: PhantomData<(&'a (), fn() -> F)>,
}

impl<'a, F: Facade> Proxy<'a, F> {
    /// A proxy holding no value.
    pub const fn empty() -> Self {
        Self {
            table: None,
            storage: Storage::uninit(),
            _marker: PhantomData,
        }
    }

    /// A proxy holding `value`.
    pub fn new<T: Proxiable<F> + 'a>(value: T) -> Self {
        let mut proxy = Self::empty();
        proxy.install(value, T::TABLE);
        proxy
    }

    /// A proxy holding the pointer `pointer` and dispatching to its target.
    ///
    /// `Box<T>`, `&'a mut T`, `Rc<T>` and other [`Deref`](core::ops::Deref) types qualify;
    /// exclusive conventions need [`DerefMut`](core::ops::DerefMut). Dropping the proxy drops
    /// the pointer, not a borrowed target.
    ///
    /// ```
    /// use facade_proxy::{caps, Facade, FreeToString, Mut, Nothrow, OpAddAssign, Proxy, Ref, Unsupported};
    ///
    /// struct Number;
    /// impl Facade for Number {
    ///     type Capabilities = caps![Mut<OpAddAssign<i32>>, Ref<FreeToString>];
    ///     type Copy = Unsupported;
    ///     type Relocation = Nothrow;
    ///     type Destruction = Nothrow;
    /// }
    ///
    /// let mut a = 123;
    /// let mut p = Proxy::<Number>::from_pointer(&mut a);
    /// p.call_mut::<OpAddAssign<i32>>((3,));
    /// assert_eq!(p.call::<FreeToString>(()), "126");
    /// drop(p);
    /// assert_eq!(a, 126);
    /// ```
    pub fn from_pointer<P>(pointer: P) -> Self
    where
        P: 'a,
        Pointee<P>: HasTable<F>,
    {
        let mut proxy = Self::empty();
        proxy.install(pointer, <Pointee<P> as HasTable<F>>::TABLE);
        proxy
    }

    /// A proxy holding the value `make` produces. An error is returned unchanged.
    pub fn try_new_with<T, E>(make: impl FnOnce() -> Result<T, E>) -> Result<Self, E>
    where
        T: Proxiable<F> + 'a,
    {
        make().map(Self::new)
    }

    /// `table` must describe a stored `S`.
    fn install<S>(&mut self, value: S, table: &'static DispatchTable) {
        debug_assert!(self.table.is_none(), "installing over a live value");
        // SAFETY: the proxy is empty and exclusively borrowed, so the buffer holds no live value.
        unsafe { storage::write(self.storage.get(), value) };
        self.table = Some(table);
    }

    /// Replaces the held value with `value`, dropping the old one first.
    pub fn emplace<T: Proxiable<F> + 'a>(&mut self, value: T) {
        self.reset();
        self.install(value, T::TABLE);
    }

    /// Drops the held value, then stores the value `make` produces.
    ///
    /// On error the proxy is left empty and the error is returned unchanged.
    pub fn try_emplace_with<T, E>(&mut self, make: impl FnOnce() -> Result<T, E>) -> Result<(), E>
    where
        T: Proxiable<F> + 'a,
    {
        self.reset();
        self.install(make()?, T::TABLE);
        Ok(())
    }

    /// Whether the proxy holds a value.
    #[inline]
    pub fn has_value(&self) -> bool {
        self.table.is_some()
    }

    /// Drops the held value, if any.
    pub fn reset(&mut self) {
        if let Some(table) = self.table.take() {
            // SAFETY: `table` described the live value; the proxy is already marked empty, so a
            // panicking destructor cannot cause a second drop.
            unsafe { (table.meta.destroy)(self.storage.get()) };
        }
    }

    /// Moves the value out into a new proxy, leaving this one empty.
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }

    #[inline]
    fn data(&self, table: &DispatchTable) -> *mut u8 {
        storage::value_ptr(&self.storage, table.meta.inline)
    }

    /// Calls `C` through the exclusive access path.
    ///
    /// Resolves to the last binding of `C`: an exclusive one when declared with [`Mut`] or
    /// [`Both`], else the shared one.
    ///
    /// # Panics
    ///
    /// If the proxy is empty or the facade does not declare `C`.
    ///
    /// [`Mut`]: crate::Mut
    /// [`Both`]: crate::Both
    #[inline]
    #[track_caller]
    pub fn call_mut<C: Convention>(&mut self, args: C::Args) -> C::Output {
        let Some(table) = self.table else {
            dispatch::empty_handle()
        };
        let data = self.data(table);
        // SAFETY: `table` describes the value at `data`, which `&mut self` borrows uniquely.
        unsafe { dispatch::invoke::<C>(table, Qualifier::Mut, data, args) }
    }

    /// Calls `C` through the shared access path.
    ///
    /// # Panics
    ///
    /// If the proxy is empty or the facade does not declare `C` for a shared receiver.
    #[inline]
    #[track_caller]
    pub fn call<C: Convention>(&self, args: C::Args) -> C::Output {
        let Some(table) = self.table else {
            dispatch::empty_handle()
        };
        // SAFETY: `table` describes the value at `data`; `&self` rules out exclusive borrows.
        unsafe { dispatch::invoke::<C>(table, Qualifier::Ref, self.data(table), args) }
    }

    /// Like [`call_mut`](Self::call_mut), returning a [`ProxyError`] instead of panicking.
    pub fn try_call_mut<C: Convention>(&mut self, args: C::Args) -> Result<C::Output, ProxyError> {
        let table = self.table.ok_or(ProxyError::Empty)?;
        let data = self.data(table);
        // SAFETY: as in `call_mut`.
        unsafe { dispatch::try_invoke::<C>(table, Qualifier::Mut, data, args) }
    }

    /// Like [`call`](Self::call), returning a [`ProxyError`] instead of panicking.
    pub fn try_call<C: Convention>(&self, args: C::Args) -> Result<C::Output, ProxyError> {
        let table = self.table.ok_or(ProxyError::Empty)?;
        // SAFETY: as in `call`.
        unsafe { dispatch::try_invoke::<C>(table, Qualifier::Ref, self.data(table), args) }
    }

    /// A shared view of the held value. Empty when the proxy is.
    ///
    /// Requires the [`AsView`](crate::AsView) skill. The view borrows the proxy, so the proxy
    /// cannot be reset or dropped while the view is in use.
    ///
    /// ```compile_fail
    /// use facade_proxy::{caps, Facade, FreeToString, Nothrow, Proxy, Ref, Unsupported};
    ///
    /// struct Printable;
    /// impl Facade for Printable {
    ///     type Capabilities = caps![Ref<FreeToString>];
    ///     type Copy = Unsupported;
    ///     type Relocation = Nothrow;
    ///     type Destruction = Nothrow;
    /// }
    ///
    /// let p = Proxy::<Printable>::new(1_u8);
    /// let view = p.as_view();
    /// ```
    pub fn as_view(&self) -> ProxyView<'_, F> {
        dispatch::require_views::<F>();
        match self.table {
            Some(table) => ProxyView::from_raw(Some(table), self.data(table).cast_const()),
            None => ProxyView::empty(),
        }
    }

    /// An exclusive view of the held value. Empty when the proxy is.
    ///
    /// Requires the [`AsView`](crate::AsView) skill.
    pub fn as_view_mut(&mut self) -> ProxyViewMut<'_, F> {
        dispatch::require_views::<F>();
        match self.table {
            Some(table) => ProxyViewMut::from_raw(Some(table), self.data(table)),
            None => ProxyViewMut::empty(),
        }
    }

    /// Converts into a proxy of facade `G`, which `F` includes with [`Upward`](crate::Upward).
    ///
    /// The value stays where it is; only the table changes. `G`'s constraint levels must be no
    /// stricter than `F`'s.
    ///
    /// ```compile_fail
    /// use facade_proxy::{caps, Facade, FreeToString, Include, Nothrow, Proxy, Ref, Unsupported};
    ///
    /// struct Base;
    /// impl Facade for Base {
    ///     type Capabilities = caps![Ref<FreeToString>];
    ///     type Copy = Unsupported;
    ///     type Relocation = Nothrow;
    ///     type Destruction = Nothrow;
    /// }
    ///
    /// struct Derived;
    /// impl Facade for Derived {
    ///     type Capabilities = caps![Include<Base>];
    ///     type Copy = Unsupported;
    ///     type Relocation = Nothrow;
    ///     type Destruction = Nothrow;
    /// }
    ///
    /// // `Include` does not permit conversion; `Upward` does.
    /// let p: Proxy<'_, Base> = Proxy::<Derived>::new(1_i32).upcast();
    /// ```
    pub fn upcast<G, I>(self) -> Proxy<'a, G>
    where
        G: Facade,
        F::Capabilities: Locate<UpwardTo<G>, I>,
        G::Copy: NoStricterThan<F::Copy>,
        G::Relocation: NoStricterThan<F::Relocation>,
        G::Destruction: NoStricterThan<F::Destruction>,
    {
        let this = ManuallyDrop::new(self);
        match this.table {
            Some(table) => Proxy {
                table: Some(dispatch::upward_table::<F, G, I>(table)),
                // SAFETY: `this` is never dropped, so the value moves to the new proxy only.
                storage: unsafe { this.storage.read() },
                _marker: PhantomData,
            },
            None => Proxy::empty(),
        }
    }

    /// Identity of the held value's type, or `None` when empty.
    ///
    /// Requires [`Reflect`](crate::Reflect). For a pointer-backed proxy this is the target's type.
    pub fn type_info(&self) -> Option<TypeInfo> {
        self.table.map(dispatch::type_info::<F>)
    }
}

impl<F: Facade> Clone for Proxy<'_, F>
where
    F::Copy: Duplicable,
{
    /// Clones the held value into a new proxy.
    ///
    /// If the value's `clone` panics, no proxy is produced and the source is untouched.
    fn clone(&self) -> Self {
        let mut out = Self::empty();
        if let Some(table) = self.table {
            let Some(clone) = table.meta.clone else {
                unreachable!("copyable facade without a clone thunk")
            };
            // SAFETY: the source is the live value `table` describes; `out` is empty.
            unsafe { clone(self.data(table).cast_const(), out.storage.get()) };
            out.table = Some(table);
        }
        out
    }
}

impl<F: Facade> Default for Proxy<'_, F> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<F: Facade> Drop for Proxy<'_, F> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<F: Facade> fmt::Debug for Proxy<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("facade", &type_name::<F>())
            .field("has_value", &self.has_value())
            .finish_non_exhaustive()
    }
}
