// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The facade trait.

use core::any::type_name;

use crate::capability::Capability;
use crate::constraint::Constraint;
use crate::descriptor::{FacadeBuilder, FacadeDescriptor, FacadeError};

/// A capability specification for type-erased handles.
///
/// Facades are marker types; nothing is ever constructed from them.
///
/// ```
/// use facade_proxy::{caps, Facade, FreeToString, Nothrow, Nontrivial, Ref, Reflect};
///
/// struct Printable;
///
/// impl Facade for Printable {
///     type Capabilities = caps![Ref<FreeToString>, Reflect];
///     type Copy = Nontrivial;
///     type Relocation = Nothrow;
///     type Destruction = Nothrow;
/// }
///
/// let descriptor = Printable::descriptor().unwrap();
/// assert_eq!(descriptor.conventions()[0].tag(), "to_string");
/// ```
pub trait Facade: 'static {
    /// Conventions and skills, built with [`caps!`](crate::caps).
    type Capabilities: Capability;
    /// Copy level. Proxies are `Clone` unless this is [`Unsupported`](crate::Unsupported).
    type Copy: Constraint;
    /// Relocation level.
    type Relocation: Constraint;
    /// Destruction level. [`Unsupported`](crate::Unsupported) admits no concrete type.
    type Destruction: Constraint;

    /// Describes the facade's composition and checks it.
    fn descriptor() -> Result<FacadeDescriptor, FacadeError> {
        Self::Capabilities::describe(FacadeBuilder::new(type_name::<Self>()))
            .support_copy(<Self::Copy as Constraint>::LEVEL)
            .support_relocation(<Self::Relocation as Constraint>::LEVEL)
            .support_destruction(<Self::Destruction as Constraint>::LEVEL)
            .build()
    }
}
