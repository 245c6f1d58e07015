// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-level capability lists.
//!
//! A facade's capabilities are a cons list written with [`caps!`](crate::caps):
//!
//! ```
//! use facade_proxy::{caps, AsView, Both, FreeToString, Include, Mut, OpAddAssign, Reflect};
//! # use facade_proxy::{Facade, Nothrow, Unsupported};
//! # struct Base;
//! # impl Facade for Base {
//! #     type Capabilities = caps![];
//! #     type Copy = Unsupported;
//! #     type Relocation = Nothrow;
//! #     type Destruction = Nothrow;
//! # }
//! type Capabilities = caps![Mut<OpAddAssign<i32>>, Both<FreeToString>, Include<Base>, AsView, Reflect];
//! ```
//!
//! Conventions are resolved by key when called, with later declarations shadowing earlier and
//! included ones. Upward conversion targets are found with [`Locate`]: the index parameter is
//! inferred, so a missing target fails to compile.

use core::marker::PhantomData;

use crate::constraint::{Constraint, ConstraintLevel};
use crate::convention::{Convention, ImplMut, ImplRef, Qualifier};
use crate::descriptor::{ConventionSpec, FacadeBuilder, Skill};
use crate::facade::Facade;
use crate::skill::{AsView, Reflect, TypeInfo};
use crate::table::{Access, AccessMut, HasTable, Slot, SlotRun};

/// Builds a capability list type.
///
/// `caps![A, B, C]` is `Cons<A, Cons<B, Cons<C, Nil>>>`; `caps![]` is `Nil`.
#[macro_export]
macro_rules! caps {
    () => { $crate::capability::Nil };
    ($head:ty $(, $rest:ty)* $(,)?) => {
        $crate::capability::Cons<$head, $crate::caps!($($rest),*)>
    };
}

mod sealed {
    #[allow(unnameable_types, reason = "sealed supertrait")]
    pub trait Sealed {}
}

/// A node of a capability list.
pub trait Capability: sealed::Sealed + 'static {
    /// Number of dispatch table slots this node occupies.
    const LEN: usize;

    #[doc(hidden)]
    const SUMMARY: Summary;

    /// Records this node in a facade description.
    fn describe(builder: FacadeBuilder) -> FacadeBuilder;
}

/// A capability list whose conventions the target of access mode `A` binds.
pub trait Bind<A: Access>: Capability {
    #[doc(hidden)]
    const SLOTS: SlotRun;
}

/// Skills and inherited constraint levels of a capability list, folded at compile time.
#[doc(hidden)]
#[derive(Copy, Clone, Debug)]
pub struct Summary {
    pub(crate) as_view: bool,
    /// Slot index of the last `Reflect`.
    pub(crate) reflect: Option<usize>,
    pub(crate) copy: ConstraintLevel,
    pub(crate) relocation: ConstraintLevel,
    pub(crate) destruction: ConstraintLevel,
}

impl Summary {
    const EMPTY: Self = Self {
        as_view: false,
        reflect: None,
        copy: ConstraintLevel::None,
        relocation: ConstraintLevel::None,
        destruction: ConstraintLevel::None,
    };

    /// `self` followed by `tail`, whose slots start at `offset`.
    const fn then(self, offset: usize, tail: Self) -> Self {
        Self {
            as_view: self.as_view || tail.as_view,
            reflect: match tail.reflect {
                Some(index) => Some(offset + index),
                None => self.reflect,
            },
            copy: self.copy.stricter(tail.copy),
            relocation: self.relocation.stricter(tail.relocation),
            destruction: self.destruction.stricter(tail.destruction),
        }
    }

    /// The summary of facade `F` included as a whole: its list plus its own levels.
    const fn of_facade<F: Facade>() -> Self {
        let inner = <F::Capabilities as Capability>::SUMMARY;
        Self {
            copy: inner.copy.stricter(<F::Copy as Constraint>::LEVEL),
            relocation: inner.relocation.stricter(<F::Relocation as Constraint>::LEVEL),
            destruction: inner.destruction.stricter(<F::Destruction as Constraint>::LEVEL),
            ..inner
        }
    }
}

/// The empty list.
#[derive(Debug)]
pub struct Nil;

/// A list with head `H` and tail `T`.
#[derive(Debug)]
pub struct Cons<H, T>(PhantomData<fn() -> (H, T)>);

/// Convention `C` through an exclusive receiver.
#[derive(Debug)]
pub struct Mut<C>(PhantomData<fn() -> C>);

/// Convention `C` through a shared receiver. Also callable through an exclusive receiver.
#[derive(Debug)]
pub struct Ref<C>(PhantomData<fn() -> C>);

/// Convention `C` through both receivers.
///
/// On the exclusive path the `Mut` binding shadows the `Ref` binding.
#[derive(Debug)]
pub struct Both<C>(PhantomData<fn() -> C>);

/// All capabilities of facade `F`.
#[derive(Debug)]
pub struct Include<F>(PhantomData<fn() -> F>);

/// All capabilities of facade `F`, plus conversion of a handle to `F`.
#[derive(Debug)]
pub struct Upward<F>(PhantomData<fn() -> F>);

impl sealed::Sealed for Nil {}
impl<H: Capability, T: Capability> sealed::Sealed for Cons<H, T> {}
impl<C: Convention> sealed::Sealed for Mut<C> {}
impl<C: Convention> sealed::Sealed for Ref<C> {}
impl<C: Convention> sealed::Sealed for Both<C> {}
impl<F: Facade> sealed::Sealed for Include<F> {}
impl<F: Facade> sealed::Sealed for Upward<F> {}
impl sealed::Sealed for AsView {}
impl sealed::Sealed for Reflect {}

fn add_included<F: Facade>(builder: FacadeBuilder, allow_upward: bool) -> FacadeBuilder {
    match F::descriptor() {
        Ok(descriptor) => builder.add_facade(&descriptor, allow_upward),
        Err(err) => builder.poison(err),
    }
}

impl Capability for Nil {
    const LEN: usize = 0;
    const SUMMARY: Summary = Summary::EMPTY;

    fn describe(builder: FacadeBuilder) -> FacadeBuilder {
        builder
    }
}

impl<H: Capability, T: Capability> Capability for Cons<H, T> {
    const LEN: usize = H::LEN + T::LEN;
    const SUMMARY: Summary = H::SUMMARY.then(H::LEN, T::SUMMARY);

    fn describe(builder: FacadeBuilder) -> FacadeBuilder {
        T::describe(H::describe(builder))
    }
}

impl<C: Convention> Capability for Mut<C> {
    const LEN: usize = 1;
    const SUMMARY: Summary = Summary::EMPTY;

    fn describe(builder: FacadeBuilder) -> FacadeBuilder {
        builder.add_convention(ConventionSpec::of::<C>(&[Qualifier::Mut]))
    }
}

impl<C: Convention> Capability for Ref<C> {
    const LEN: usize = 1;
    const SUMMARY: Summary = Summary::EMPTY;

    fn describe(builder: FacadeBuilder) -> FacadeBuilder {
        builder.add_convention(ConventionSpec::of::<C>(&[Qualifier::Ref]))
    }
}

impl<C: Convention> Capability for Both<C> {
    const LEN: usize = 1;
    const SUMMARY: Summary = Summary::EMPTY;

    fn describe(builder: FacadeBuilder) -> FacadeBuilder {
        builder.add_convention(ConventionSpec::of::<C>(&[Qualifier::Mut, Qualifier::Ref]))
    }
}

impl Capability for AsView {
    const LEN: usize = 0;
    const SUMMARY: Summary = Summary {
        as_view: true,
        ..Summary::EMPTY
    };

    fn describe(builder: FacadeBuilder) -> FacadeBuilder {
        builder.support(Skill::AsView)
    }
}

impl Capability for Reflect {
    const LEN: usize = 1;
    const SUMMARY: Summary = Summary {
        reflect: Some(0),
        ..Summary::EMPTY
    };

    fn describe(builder: FacadeBuilder) -> FacadeBuilder {
        builder.support(Skill::Reflect)
    }
}

impl<F: Facade> Capability for Include<F> {
    const LEN: usize = <F::Capabilities as Capability>::LEN;
    const SUMMARY: Summary = Summary::of_facade::<F>();

    fn describe(builder: FacadeBuilder) -> FacadeBuilder {
        add_included::<F>(builder, false)
    }
}

impl<F: Facade> Capability for Upward<F> {
    const LEN: usize = 1 + <F::Capabilities as Capability>::LEN;
    const SUMMARY: Summary = Summary::EMPTY.then(1, Summary::of_facade::<F>());

    fn describe(builder: FacadeBuilder) -> FacadeBuilder {
        add_included::<F>(builder, true)
    }
}

impl<A: Access> Bind<A> for Nil {
    const SLOTS: SlotRun = SlotRun::EMPTY;
}

impl<A: Access, H: Bind<A>, Tl: Bind<A>> Bind<A> for Cons<H, Tl> {
    const SLOTS: SlotRun = H::SLOTS.chain(Tl::SLOTS);
}

impl<A: AccessMut, C: ImplMut<A::Target>> Bind<A> for Mut<C> {
    const SLOTS: SlotRun = SlotRun::one(Slot::exclusive::<A, C>());
}

impl<A: Access, C: ImplRef<A::Target>> Bind<A> for Ref<C> {
    const SLOTS: SlotRun = SlotRun::one(Slot::shared::<A, C>());
}

impl<A, C> Bind<A> for Both<C>
where
    A: AccessMut,
    C: ImplMut<A::Target> + ImplRef<A::Target>,
{
    const SLOTS: SlotRun = SlotRun::one(Slot::both::<A, C>());
}

impl<A: Access> Bind<A> for AsView {
    const SLOTS: SlotRun = SlotRun::EMPTY;
}

impl<A: Access> Bind<A> for Reflect
where
    A::Target: 'static,
{
    const SLOTS: SlotRun = SlotRun::one(Slot::Reflect(TypeInfo::of::<A::Target>));
}

impl<A: Access, F: Facade> Bind<A> for Include<F>
where
    F::Capabilities: Bind<A>,
{
    const SLOTS: SlotRun = <F::Capabilities as Bind<A>>::SLOTS;
}

impl<A: HasTable<F>, F: Facade> Bind<A> for Upward<F> {
    const SLOTS: SlotRun = SlotRun::one(Slot::Table(<A as HasTable<F>>::TABLE))
        .chain(<A as HasTable<F>>::TABLE.slots);
}

/// Lookup key: the table of facade `F` stored for upward conversion.
#[derive(Debug)]
pub struct UpwardTo<F>(PhantomData<fn() -> F>);

/// Index: the key is at the head of the list.
#[derive(Debug)]
pub struct Here;

/// Index: the key is found in the tail at `I`.
#[derive(Debug)]
pub struct There<I>(PhantomData<fn() -> I>);

/// Index: the key is found inside an included facade at `I`.
#[derive(Debug)]
pub struct Within<I>(PhantomData<fn() -> I>);

/// Finds the slot for key `K` in a capability list; `I` is the inferred path.
///
/// The only key is [`UpwardTo`]. A target reachable along two paths is ambiguous at the call
/// site; name the index explicitly to pick one.
pub trait Locate<K, I>: Capability {
    /// Slot index of the key within the dispatch table.
    const INDEX: usize;
}

impl<F: Facade, Tl: Capability> Locate<UpwardTo<F>, Here> for Cons<Upward<F>, Tl> {
    const INDEX: usize = 0;
}

impl<K, I, H: Capability, Tl: Locate<K, I>> Locate<K, There<I>> for Cons<H, Tl> {
    const INDEX: usize = H::LEN + Tl::INDEX;
}

impl<K, I, F: Facade, Tl: Capability> Locate<K, Within<I>> for Cons<Include<F>, Tl>
where
    F::Capabilities: Locate<K, I>,
{
    const INDEX: usize = <F::Capabilities as Locate<K, I>>::INDEX;
}

impl<K, I, F: Facade, Tl: Capability> Locate<K, Within<I>> for Cons<Upward<F>, Tl>
where
    F::Capabilities: Locate<K, I>,
{
    const INDEX: usize = 1 + <F::Capabilities as Locate<K, I>>::INDEX;
}
