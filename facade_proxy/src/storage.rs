// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-word value storage with a boxed fallback.

#![allow(unsafe_code, reason = "type-erased storage requires raw pointer access")]

use alloc::boxed::Box;
use core::cell::UnsafeCell;
use core::mem::{MaybeUninit, align_of, size_of};
use core::ptr;

/// Inline buffer of a proxy: two machine words, word aligned.
///
/// The buffer is interior-mutable, so a value reached through a shared handle may still mutate
/// itself through its own `Cell`s.
#[repr(transparent)]
pub(crate) struct Storage(UnsafeCell<MaybeUninit<[*const (); 2]>>);

impl Storage {
    pub(crate) const fn uninit() -> Self {
        Self(UnsafeCell::new(MaybeUninit::uninit()))
    }

    /// Start of the buffer.
    #[inline]
    pub(crate) const fn get(&self) -> *mut u8 {
        self.0.get().cast()
    }

    /// Moves the buffer's bytes out, leaving `self` logically uninitialized.
    ///
    /// # Safety
    ///
    /// The caller takes over whatever value the buffer held and must not drop it through `self`.
    #[inline]
    pub(crate) unsafe fn read(&self) -> Self {
        // SAFETY: the buffer is plain bytes; ownership transfer is the caller's contract.
        Self(UnsafeCell::new(unsafe { self.0.get().read() }))
    }
}

/// Whether `T` is stored in place rather than boxed.
pub(crate) const fn fits_inline<T>() -> bool {
    size_of::<T>() <= size_of::<Storage>() && align_of::<T>() <= align_of::<Storage>()
}

/// Moves `value` into the buffer at `dst`, inline when it fits, boxed otherwise.
///
/// # Safety
///
/// `dst` must come from [`Storage::get`], must not hold a live value, and nothing else may access
/// it during the write.
pub(crate) unsafe fn write<T>(dst: *mut u8, value: T) {
    if fits_inline::<T>() {
        // SAFETY: `T` fits the buffer in both size and alignment; the buffer is writable.
        unsafe { dst.cast::<T>().write(value) };
    } else {
        let boxed = Box::into_raw(Box::new(value));
        // SAFETY: the buffer holds at least one pointer.
        unsafe { dst.cast::<*mut T>().write(boxed) };
    }
}

/// Drops the `T` held by the buffer at `storage` and releases its box, if any.
///
/// # Safety
///
/// `storage` must hold a live `T` written by [`write`]. It is logically uninitialized afterwards.
pub(crate) unsafe fn destroy<T>(storage: *mut u8) {
    if fits_inline::<T>() {
        // SAFETY: the caller guarantees a live inline `T`.
        unsafe { ptr::drop_in_place(storage.cast::<T>()) };
    } else {
        // SAFETY: the caller guarantees the first word is a pointer from `Box::into_raw`.
        drop(unsafe { Box::from_raw(storage.cast::<*mut T>().read()) });
    }
}

/// Clones the `T` at `src` into the buffer at `dst`.
///
/// If `T::clone` panics nothing is written to `dst`.
///
/// # Safety
///
/// `src` must point to a live `T`; `dst` must satisfy the contract of [`write`].
pub(crate) unsafe fn clone_erased<T: Clone>(src: *const u8, dst: *mut u8) {
    // SAFETY: the caller guarantees `src` points to a live `T`.
    let value = unsafe { &*src.cast::<T>() }.clone();
    // SAFETY: forwarded from the caller.
    unsafe { write(dst, value) };
}

/// Address of the value held by `storage`.
///
/// Derived from the buffer's `UnsafeCell`, so writes through it are permitted whenever the value
/// is not otherwise borrowed.
#[inline]
pub(crate) fn value_ptr(storage: &Storage, inline: bool) -> *mut u8 {
    if inline {
        storage.get()
    } else {
        // SAFETY: a boxed value's storage always starts with an initialized pointer.
        unsafe { storage.get().cast::<*mut u8>().read() }
    }
}
