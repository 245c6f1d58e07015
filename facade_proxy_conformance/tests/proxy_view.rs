// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View semantics: views of empty, owning, and pointer-like proxies, views of external values,
//! overload shadowing, and upward conversion of views.

use facade_proxy::{
    AsView, Both, Convention, Facade, FreeToString, ImplMut, ImplRef, Mut, Nontrivial, Nothrow,
    OpAddAssign, Proxy, ProxyView, ProxyViewMut, Ref, Unsupported, Upward, caps,
};
use std::mem::size_of;

struct TestFacade;

impl Facade for TestFacade {
    type Capabilities = caps![Mut<OpAddAssign<i32>>, Ref<FreeToString>, AsView];
    type Copy = Unsupported;
    type Relocation = Nothrow;
    type Destruction = Nothrow;
}

#[test]
fn handle_sizes() {
    assert_eq!(size_of::<Proxy<'_, TestFacade>>(), 3 * size_of::<usize>());
    assert_eq!(size_of::<ProxyView<'_, TestFacade>>(), 2 * size_of::<usize>());
    assert_eq!(size_of::<ProxyViewMut<'_, TestFacade>>(), 2 * size_of::<usize>());
}

#[test]
fn view_is_trivially_copyable_and_destructible() {
    fn copyable<T: Copy>() {}
    copyable::<ProxyView<'_, TestFacade>>();
    assert!(!std::mem::needs_drop::<ProxyView<'_, TestFacade>>(), "shared view");
    assert!(!std::mem::needs_drop::<ProxyViewMut<'_, TestFacade>>(), "exclusive view");
    assert!(std::mem::needs_drop::<Proxy<'_, TestFacade>>(), "owning proxy");
}

#[test]
fn view_of_null() {
    let p1 = Proxy::<TestFacade>::empty();
    let p2 = p1.as_view();
    assert!(!p2.has_value(), "view of an empty proxy is empty");
}

#[test]
fn view_independent_use() {
    let mut a = 123_i32;
    let mut p = ProxyViewMut::<TestFacade>::new(&mut a);
    p.call_mut::<OpAddAssign<i32>>((3,));
    assert_eq!(p.call::<FreeToString>(()), "126");
    assert_eq!(a, 126);
}

#[test]
fn view_of_owning() {
    let mut p1 = Proxy::<TestFacade>::new(123_i32);
    {
        let mut p2 = p1.as_view_mut();
        assert!(p2.has_value(), "view of a full proxy");
        p2.call_mut::<OpAddAssign<i32>>((3,));
    }
    assert!(p1.has_value(), "the view did not take ownership");
    assert_eq!(p1.call::<FreeToString>(()), "126");
    p1.reset();
    assert!(!p1.has_value(), "reset");
}

#[test]
fn view_of_non_owning() {
    let mut a = 123_i32;
    let mut p1 = Proxy::<TestFacade>::from_pointer(&mut a);
    {
        let mut p2 = p1.as_view_mut();
        assert!(p2.has_value(), "view of a pointer-backed proxy");
        p2.call_mut::<OpAddAssign<i32>>((3,));
    }
    assert_eq!(p1.call::<FreeToString>(()), "126");
    p1.reset();
    assert!(!p1.has_value(), "the pointer is gone");
    drop(p1);
    let p3 = ProxyView::<TestFacade>::new(&a);
    assert_eq!(p3.call::<FreeToString>(()), "126", "the pointee outlives the proxy");
    assert_eq!(a, 126);
}

#[test]
fn view_of_boxed_pointer() {
    let mut p1 = Proxy::<TestFacade>::from_pointer(Box::new(7_i32));
    p1.as_view_mut().call_mut::<OpAddAssign<i32>>((1,));
    assert_eq!(p1.as_view().call::<FreeToString>(()), "8");
}

struct Call;

impl Convention for Call {
    const TAG: &'static str = "()";
    type Args = ();
    type Output = i32;
}

#[derive(Default)]
struct TestImpl;

impl ImplMut<TestImpl> for Call {
    fn call_mut(_: &mut TestImpl, (): ()) -> i32 {
        0
    }
}

impl ImplRef<TestImpl> for Call {
    fn call_ref(_: &TestImpl, (): ()) -> i32 {
        1
    }
}

struct ShadowFacade;

impl Facade for ShadowFacade {
    type Capabilities = caps![Both<Call>, AsView];
    type Copy = Unsupported;
    type Relocation = Nothrow;
    type Destruction = Nothrow;
}

#[test]
fn overload_shadowing() {
    let mut p1 = Proxy::<ShadowFacade>::new(TestImpl);
    assert_eq!(p1.call_mut::<Call>(()), 0);
    assert_eq!(p1.call::<Call>(()), 1);

    let mut p2 = p1.as_view_mut();
    assert_eq!(p2.call_mut::<Call>(()), 0);
    assert_eq!(p2.call::<Call>(()), 1);
    assert_eq!(p2.as_view().call::<Call>(()), 1);
}

struct Empty1;

impl Facade for Empty1 {
    type Capabilities = caps![];
    type Copy = Unsupported;
    type Relocation = Nothrow;
    type Destruction = Nothrow;
}

struct Empty2;

impl Facade for Empty2 {
    type Capabilities = caps![Upward<Empty1>, AsView];
    type Copy = Unsupported;
    type Relocation = Nothrow;
    type Destruction = Nothrow;
}

#[test]
fn upward_conversion_from_null() {
    let p1 = Proxy::<Empty2>::empty();
    let p2 = p1.as_view();
    let p3: ProxyView<'_, Empty1> = p2.upcast();
    assert!(!p1.has_value(), "owner");
    assert!(!p2.has_value(), "view");
    assert!(!p3.has_value(), "upcast view");
}

struct Printable1;

impl Facade for Printable1 {
    type Capabilities = caps![Ref<FreeToString>];
    type Copy = Unsupported;
    type Relocation = Nothrow;
    type Destruction = Nothrow;
}

struct Printable2;

impl Facade for Printable2 {
    type Capabilities = caps![Upward<Printable1>, AsView];
    type Copy = Nontrivial;
    type Relocation = Nothrow;
    type Destruction = Nothrow;
}

#[test]
fn upward_conversion_from_value() {
    let p1 = Proxy::<Printable2>::new(123_i32);
    let p2 = p1.as_view();
    let p3: ProxyView<'_, Printable1> = p2.upcast();
    assert_eq!(p1.call::<FreeToString>(()), "123");
    assert_eq!(p2.call::<FreeToString>(()), "123");
    assert_eq!(p3.call::<FreeToString>(()), "123");
}

#[test]
fn exclusive_view_upcast_keeps_mutation_path() {
    struct Counter;

    impl Facade for Counter {
        type Capabilities = caps![Mut<OpAddAssign<i32>>, Ref<FreeToString>];
        type Copy = Unsupported;
        type Relocation = Nothrow;
        type Destruction = Nothrow;
    }

    struct Wider;

    impl Facade for Wider {
        type Capabilities = caps![Upward<Counter>, AsView];
        type Copy = Unsupported;
        type Relocation = Nothrow;
        type Destruction = Nothrow;
    }

    let mut p = Proxy::<Wider>::new(1_i32);
    let mut narrow: ProxyViewMut<'_, Counter> = p.as_view_mut().upcast();
    narrow.call_mut::<OpAddAssign<i32>>((1,));
    assert_eq!(p.call::<FreeToString>(()), "2");
}

struct Printable3;

impl Facade for Printable3 {
    type Capabilities = caps![Upward<Printable2>, AsView];
    type Copy = Nontrivial;
    type Relocation = Nothrow;
    type Destruction = Nothrow;
}

#[test]
fn view_of_view_of_proxy_across_facade_levels() {
    let p1 = Proxy::<Printable3>::new(String::from("three levels"));
    let p2 = p1.as_view();
    let p3: ProxyView<'_, Printable2> = p2.upcast();
    let p4: ProxyView<'_, Printable1> = p3.upcast();
    assert_eq!(p4.call::<FreeToString>(()), "three levels");
    assert_eq!(p3.call::<FreeToString>(()), "three levels");
    let direct: ProxyView<'_, Printable1> = p1.as_view().upcast();
    assert_eq!(direct.call::<FreeToString>(()), "three levels", "nested target reached directly");
}
