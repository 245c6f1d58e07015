// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::label::{DefaultLabeler, DispatchLabeler};
use facade_proxy::{Convention, ImplMut, ImplRef, Qualifier};
use std::any::type_name;
use std::marker::PhantomData;

type BackendGuard = tracy_client::Span;

/// Convention `C`, with every dispatch wrapped in a Tracy span labeled by `L`.
///
/// Binds to exactly the types `C` binds to, through the same receivers.
#[derive(Debug)]
pub struct ProfiledWith<C, L>(PhantomData<fn() -> (C, L)>);

/// Convention `C` profiled with [`DefaultLabeler`].
pub type Profiled<C> = ProfiledWith<C, DefaultLabeler>;

impl<C: Convention, L: DispatchLabeler> Convention for ProfiledWith<C, L> {
    const TAG: &'static str = C::TAG;
    type Args = C::Args;
    type Output = C::Output;
}

impl<T: ?Sized, C: ImplMut<T>, L: DispatchLabeler> ImplMut<T> for ProfiledWith<C, L> {
    fn call_mut(this: &mut T, args: C::Args) -> C::Output {
        let _guard = start_span::<C, T, L>(Qualifier::Mut);
        C::call_mut(this, args)
    }
}

impl<T: ?Sized, C: ImplRef<T>, L: DispatchLabeler> ImplRef<T> for ProfiledWith<C, L> {
    fn call_ref(this: &T, args: C::Args) -> C::Output {
        let _guard = start_span::<C, T, L>(Qualifier::Ref);
        C::call_ref(this, args)
    }
}

fn start_span<C, T, L>(qualifier: Qualifier) -> Option<BackendGuard>
where
    C: Convention,
    T: ?Sized,
    L: DispatchLabeler,
{
    let function_name = match qualifier {
        Qualifier::Mut => "facade_proxy.call_mut",
        Qualifier::Ref => "facade_proxy.call",
    };
    let client = tracy_client::Client::running()?;
    let label = L::label(C::TAG, type_name::<T>(), qualifier);
    Some(client.span_alloc(Some(&label), function_name, "facade_proxy", 0, 0))
}
