// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Skills: structural capabilities that are not conventions.

use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

/// Permits deriving [`ProxyView`](crate::ProxyView) and [`ProxyViewMut`](crate::ProxyViewMut)
/// handles from an owning [`Proxy`](crate::Proxy).
#[derive(Copy, Clone, Debug, Default)]
pub struct AsView;

/// Records the stored value's static type in the dispatch table.
///
/// Exposes no conventions; the type is read back with `type_info()` on any handle.
#[derive(Copy, Clone, Debug, Default)]
pub struct Reflect;

/// Identity of a concrete type: its [`TypeId`] plus a printable name.
///
/// Equality and hashing use the id only.
#[derive(Copy, Clone)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    /// The identity of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    /// The [`TypeId`] of the type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The compiler-provided name of the type. Not guaranteed stable across compiler versions.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this is the identity of `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeInfo").field(&self.name).finish()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
