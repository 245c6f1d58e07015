// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot lookup shared by the owning and borrowed handles.

#![allow(unsafe_code, reason = "calls type-erased thunks")]

use core::any::type_name;

use crate::capability::{Capability, Locate, UpwardTo};
use crate::convention::{Convention, Qualifier};
use crate::facade::Facade;
use crate::proxy::ProxyError;
use crate::skill::TypeInfo;
use crate::table::DispatchTable;

/// Calls the thunk `table` resolves for `C` on `path`.
///
/// # Panics
///
/// If the facade does not declare `C` for `path`.
///
/// # Safety
///
/// `table` must be the table of the stored value at `data`. For [`Qualifier::Mut`], `data` must
/// be uniquely borrowed; for [`Qualifier::Ref`], not mutably borrowed.
#[inline]
#[track_caller]
pub(crate) unsafe fn invoke<C: Convention>(
    table: &DispatchTable,
    path: Qualifier,
    data: *mut u8,
    args: C::Args,
) -> C::Output {
    let Some(thunk) = table.resolve::<C>(path) else {
        undeclared::<C>(path)
    };
    // SAFETY: forwarded from the caller.
    unsafe { thunk(data, args) }
}

/// Like [`invoke`], reporting an undeclared convention instead of panicking.
///
/// # Safety
///
/// As for [`invoke`].
#[inline]
pub(crate) unsafe fn try_invoke<C: Convention>(
    table: &DispatchTable,
    path: Qualifier,
    data: *mut u8,
    args: C::Args,
) -> Result<C::Output, ProxyError> {
    let thunk = table
        .resolve::<C>(path)
        .ok_or(ProxyError::Undeclared {
            convention: type_name::<C>(),
            path,
        })?;
    // SAFETY: forwarded from the caller.
    Ok(unsafe { thunk(data, args) })
}

/// The table facade `G` stores for upward conversion out of `F`.
#[inline]
pub(crate) fn upward_table<F: Facade, G, I>(table: &DispatchTable) -> &'static DispatchTable
where
    F::Capabilities: Locate<UpwardTo<G>, I>,
{
    table
        .slots
        .get(<F::Capabilities as Locate<UpwardTo<G>, I>>::INDEX)
        .table()
}

/// Fails to compile for a facade without the [`AsView`](crate::AsView) skill.
#[inline(always)]
pub(crate) fn require_views<F: Facade>() {
    const {
        assert!(
            <F::Capabilities as Capability>::SUMMARY.as_view,
            "facade does not support views of owning proxies"
        );
    }
}

/// The stored type's identity. Fails to compile for a facade without [`Reflect`](crate::Reflect).
#[inline]
pub(crate) fn type_info<F: Facade>(table: &DispatchTable) -> TypeInfo {
    let index = const {
        match <F::Capabilities as Capability>::SUMMARY.reflect {
            Some(index) => index,
            None => panic!("facade does not support reflection"),
        }
    };
    table.slots.get(index).type_info()
}

#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn empty_handle() -> ! {
    panic!("called a convention through an empty handle")
}

#[cold]
#[inline(never)]
#[track_caller]
fn undeclared<C: Convention>(path: Qualifier) -> ! {
    panic!(
        "facade does not declare `{}` for a `{path}` receiver",
        type_name::<C>()
    )
}
