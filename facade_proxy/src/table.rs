// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-type dispatch tables.
//!
//! Every (stored type, facade) pair gets exactly one [`DispatchTable`], built at compile time as
//! the associated constant [`HasTable::TABLE`]. A table holds lifecycle metadata followed by a
//! run of slots laid out in capability-list order:
//!
//! | capability   | slots                                              |
//! |--------------|----------------------------------------------------|
//! | `Mut<C>`     | exclusive thunk keyed by `C`                       |
//! | `Ref<C>`     | shared thunk keyed by `C`                          |
//! | `Both<C>`    | both thunks keyed by `C`                           |
//! | `AsView`     | none                                               |
//! | `Reflect`    | type identity                                      |
//! | `Include<G>` | `G`'s slots                                        |
//! | `Upward<G>`  | `G`'s table for the same type, then `G`'s slots    |
//!
//! Conventions are found by key, scanning from the end of the run, so a later declaration of a
//! convention shadows an earlier or included one. Since `Upward<G>` stores the target table,
//! upward conversion is a slot read.
//!
//! The stored value and the object conventions run on need not be the same: an [`Access`] mode
//! says how to get from one to the other. [`Direct`] stores the object itself; [`Pointee`]
//! stores a pointer and dispatches to its target.

#![allow(unsafe_code, reason = "dispatch thunks are type-erased function pointers")]

use core::alloc::Layout;
use core::any::TypeId;
use core::fmt;
use core::marker::PhantomData;
use core::mem::transmute;
use core::ops::{Deref, DerefMut};

use crate::capability::{Bind, Capability};
use crate::constraint::{CloneFn, Constraint, CopyPolicy, DestroyPolicy, RelocatePolicy};
use crate::convention::{Convention, ImplMut, ImplRef, Qualifier};
use crate::facade::Facade;
use crate::skill::TypeInfo;
use crate::storage;

/// Maximum number of slots in one dispatch table.
///
/// A facade whose capability list needs more fails to compile when it is first bound to a type.
pub const SLOT_CAPACITY: usize = 32;

/// How a stored value reaches the object its conventions are called on.
pub trait Access {
    /// What the handle stores.
    type Stored;
    /// What conventions receive.
    type Target;

    /// The target of the stored value at `data`.
    ///
    /// # Safety
    ///
    /// `data` must point to a live `Self::Stored` that is not mutably borrowed for `'r`.
    unsafe fn target<'r>(data: *const u8) -> &'r Self::Target;
}

/// An [`Access`] mode that can also reach its target exclusively.
pub trait AccessMut: Access {
    /// The target of the stored value at `data`, exclusively.
    ///
    /// # Safety
    ///
    /// `data` must point to a live `Self::Stored` with no other live references for `'r`.
    unsafe fn target_mut<'r>(data: *mut u8) -> &'r mut Self::Target;
}

/// Stores a `T` and calls conventions on it.
#[derive(Debug)]
pub struct Direct<T>(PhantomData<fn() -> T>);

/// Stores the pointer `P` and calls conventions on what it points to.
///
/// Exclusive conventions need `P: DerefMut`; `Rc<T>` or `&T` only bind shared ones.
#[derive(Debug)]
pub struct Pointee<P>(PhantomData<fn() -> P>);

impl<T> Access for Direct<T> {
    type Stored = T;
    type Target = T;

    #[inline]
    unsafe fn target<'r>(data: *const u8) -> &'r T {
        // SAFETY: forwarded from the caller.
        unsafe { &*data.cast::<T>() }
    }
}

impl<T> AccessMut for Direct<T> {
    #[inline]
    unsafe fn target_mut<'r>(data: *mut u8) -> &'r mut T {
        // SAFETY: forwarded from the caller.
        unsafe { &mut *data.cast::<T>() }
    }
}

impl<P: Deref> Access for Pointee<P>
where
    P::Target: Sized,
{
    type Stored = P;
    type Target = P::Target;

    #[inline]
    unsafe fn target<'r>(data: *const u8) -> &'r P::Target {
        // SAFETY: forwarded from the caller.
        unsafe {
            let target: *const P::Target = &**data.cast::<P>();
            &*target
        }
    }
}

impl<P: DerefMut> AccessMut for Pointee<P>
where
    P::Target: Sized,
{
    #[inline]
    unsafe fn target_mut<'r>(data: *mut u8) -> &'r mut P::Target {
        // SAFETY: forwarded from the caller.
        unsafe {
            let target: *mut P::Target = &mut **data.cast::<P>();
            &mut *target
        }
    }
}

pub(crate) type ErasedFn = unsafe fn();

/// A convention thunk: receives the stored value's address and the argument tuple.
pub(crate) type Thunk<C> =
    unsafe fn(*mut u8, <C as Convention>::Args) -> <C as Convention>::Output;

/// # Safety
///
/// `data` must point to a live stored value with no other live references.
unsafe fn thunk_mut<A, C>(data: *mut u8, args: C::Args) -> C::Output
where
    A: AccessMut,
    C: ImplMut<A::Target>,
{
    // SAFETY: forwarded from the caller.
    C::call_mut(unsafe { A::target_mut(data) }, args)
}

/// # Safety
///
/// `data` must point to a live stored value that is not mutably borrowed. It is only read
/// through, apart from interior mutability of the target.
unsafe fn thunk_ref<A, C>(data: *mut u8, args: C::Args) -> C::Output
where
    A: Access,
    C: ImplRef<A::Target>,
{
    // SAFETY: forwarded from the caller.
    C::call_ref(unsafe { A::target(data.cast_const()) }, args)
}

const fn erase<C: Convention>(thunk: Thunk<C>) -> ErasedFn {
    // SAFETY: function pointers share one representation. `DispatchTable::resolve` is the only
    // way back and compares the convention key first.
    unsafe { transmute::<Thunk<C>, ErasedFn>(thunk) }
}

/// The thunks bound for one convention.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Binding {
    Exclusive(ErasedFn),
    Shared(ErasedFn),
    Both { exclusive: ErasedFn, shared: ErasedFn },
}

impl Binding {
    /// The thunk serving `path`. On the exclusive path an exclusive thunk shadows a shared one.
    fn on(self, path: Qualifier) -> Option<ErasedFn> {
        match (self, path) {
            (Self::Exclusive(thunk) | Self::Shared(thunk), Qualifier::Mut)
            | (Self::Shared(thunk), Qualifier::Ref)
            | (Self::Both { exclusive: thunk, .. }, Qualifier::Mut)
            | (Self::Both { shared: thunk, .. }, Qualifier::Ref) => Some(thunk),
            (Self::Exclusive(_), Qualifier::Ref) => None,
        }
    }
}

#[derive(Copy, Clone)]
pub(crate) enum Slot {
    Vacant,
    Convention {
        key: fn() -> TypeId,
        binding: Binding,
    },
    Table(&'static DispatchTable),
    Reflect(fn() -> TypeInfo),
}

impl Slot {
    pub(crate) const fn exclusive<A: AccessMut, C: ImplMut<A::Target>>() -> Self {
        Self::Convention {
            key: TypeId::of::<C>,
            binding: Binding::Exclusive(erase::<C>(thunk_mut::<A, C>)),
        }
    }

    pub(crate) const fn shared<A: Access, C: ImplRef<A::Target>>() -> Self {
        Self::Convention {
            key: TypeId::of::<C>,
            binding: Binding::Shared(erase::<C>(thunk_ref::<A, C>)),
        }
    }

    pub(crate) const fn both<A, C>() -> Self
    where
        A: AccessMut,
        C: ImplMut<A::Target> + ImplRef<A::Target>,
    {
        Self::Convention {
            key: TypeId::of::<C>,
            binding: Binding::Both {
                exclusive: erase::<C>(thunk_mut::<A, C>),
                shared: erase::<C>(thunk_ref::<A, C>),
            },
        }
    }

    #[inline]
    pub(crate) fn table(self) -> &'static DispatchTable {
        match self {
            Self::Table(table) => table,
            _ => slot_mismatch(),
        }
    }

    #[inline]
    pub(crate) fn type_info(self) -> TypeInfo {
        match self {
            Self::Reflect(info) => info(),
            _ => slot_mismatch(),
        }
    }
}

#[cold]
#[inline(never)]
fn slot_mismatch() -> ! {
    unreachable!("dispatch table slot does not match its capability")
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vacant => f.write_str("Vacant"),
            Self::Convention { binding, .. } => f.debug_tuple("Convention").field(binding).finish(),
            Self::Table(table) => f.debug_tuple("Table").field(&table.slots.len).finish(),
            Self::Reflect(info) => f.debug_tuple("Reflect").field(&info()).finish(),
        }
    }
}

/// A left-aligned run of table slots, concatenated at compile time.
#[doc(hidden)]
#[derive(Copy, Clone)]
pub struct SlotRun {
    slots: [Slot; SLOT_CAPACITY],
    len: usize,
}

impl SlotRun {
    pub(crate) const EMPTY: Self = Self {
        slots: [Slot::Vacant; SLOT_CAPACITY],
        len: 0,
    };

    pub(crate) const fn one(slot: Slot) -> Self {
        let mut run = Self::EMPTY;
        run.slots[0] = slot;
        run.len = 1;
        run
    }

    pub(crate) const fn chain(self, tail: Self) -> Self {
        assert!(
            self.len + tail.len <= SLOT_CAPACITY,
            "capability list exceeds the dispatch table slot capacity"
        );
        let mut run = self;
        let mut i = 0;
        while i < tail.len {
            run.slots[self.len + i] = tail.slots[i];
            i += 1;
        }
        run.len += tail.len;
        run
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Slot {
        debug_assert!(index < self.len, "slot index {index} out of range {}", self.len);
        self.slots[index]
    }

    fn as_slice(&self) -> &[Slot] {
        &self.slots[..self.len]
    }
}

impl fmt::Debug for SlotRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[derive(Copy, Clone)]
pub(crate) struct Meta {
    pub(crate) layout: Layout,
    pub(crate) inline: bool,
    pub(crate) destroy: unsafe fn(*mut u8),
    pub(crate) clone: Option<CloneFn>,
}

impl Meta {
    const fn of<T>(clone: Option<CloneFn>) -> Self {
        Self {
            layout: Layout::new::<T>(),
            inline: storage::fits_inline::<T>(),
            destroy: storage::destroy::<T>,
            clone,
        }
    }
}

/// Dispatch table of one stored type under one facade.
pub struct DispatchTable {
    pub(crate) meta: Meta,
    pub(crate) slots: SlotRun,
}

impl DispatchTable {
    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len
    }

    /// Whether the table has no slots (a facade with only skills or nothing at all).
    pub fn is_empty(&self) -> bool {
        self.slots.len == 0
    }

    /// Layout of the stored type.
    pub fn layout(&self) -> Layout {
        self.meta.layout
    }

    /// Whether values are stored inside the proxy rather than boxed.
    pub fn is_inline(&self) -> bool {
        self.meta.inline
    }

    /// Whether the table carries a clone operation.
    pub fn is_copyable(&self) -> bool {
        self.meta.clone.is_some()
    }

    /// Whether convention `C` can be called through the `path` receiver.
    pub fn declares<C: Convention>(&self, path: Qualifier) -> bool {
        self.resolve::<C>(path).is_some()
    }

    /// The thunk for `C` on `path`, from the last slot keyed by `C`.
    ///
    /// When that slot only binds an exclusive receiver, the shared path has no thunk even if an
    /// earlier slot has one.
    #[inline]
    pub(crate) fn resolve<C: Convention>(&self, path: Qualifier) -> Option<Thunk<C>> {
        let wanted = TypeId::of::<C>();
        let binding = self.slots.as_slice().iter().rev().find_map(|slot| match *slot {
            Slot::Convention { key, binding } if key() == wanted => Some(binding),
            _ => None,
        })?;
        let erased = binding.on(path)?;
        // SAFETY: the slot is keyed by `C`, so `erased` was produced by `erase::<C>`.
        Some(unsafe { transmute::<ErasedFn, Thunk<C>>(erased) })
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("layout", &self.meta.layout)
            .field("inline", &self.meta.inline)
            .field("copyable", &self.meta.clone.is_some())
            .field("slots", &self.slots)
            .finish()
    }
}

/// An [`Access`] mode that satisfies facade `F`.
///
/// Implemented whenever the target binds all of `F`'s capabilities and the stored type meets
/// its constraint levels; there is nothing to implement by hand.
///
/// A facade whose levels are weaker than those of a facade it includes is rejected when the
/// table is built:
///
/// ```compile_fail
/// use facade_proxy::{caps, Facade, FreeToString, Include, Nontrivial, Nothrow, Proxy, Ref, Trivial};
///
/// struct Bitwise;
/// impl Facade for Bitwise {
///     type Capabilities = caps![Ref<FreeToString>];
///     type Copy = Trivial;
///     type Relocation = Nothrow;
///     type Destruction = Trivial;
/// }
///
/// struct Looser;
/// impl Facade for Looser {
///     type Capabilities = caps![Include<Bitwise>];
///     type Copy = Nontrivial;
///     type Relocation = Nothrow;
///     type Destruction = Trivial;
/// }
///
/// let p = Proxy::<Looser>::new(1_u8);
/// ```
pub trait HasTable<F: Facade>: Access {
    /// The dispatch table of this access mode under `F`.
    const TABLE: &'static DispatchTable;
}

impl<F, A> HasTable<F> for A
where
    F: Facade,
    A: Access,
    F::Capabilities: Bind<A>,
    F::Copy: CopyPolicy<A::Stored>,
    F::Relocation: RelocatePolicy<A::Stored>,
    F::Destruction: DestroyPolicy<A::Stored>,
{
    const TABLE: &'static DispatchTable = {
        let floor = <F::Capabilities as Capability>::SUMMARY;
        assert!(
            <F::Copy as Constraint>::LEVEL.satisfies(floor.copy)
                && <F::Relocation as Constraint>::LEVEL.satisfies(floor.relocation)
                && <F::Destruction as Constraint>::LEVEL.satisfies(floor.destruction),
            "facade declares a constraint level weaker than one of the facades it includes"
        );
        &DispatchTable {
            meta: Meta::of::<A::Stored>(<F::Copy as CopyPolicy<A::Stored>>::CLONE),
            slots: <F::Capabilities as Bind<A>>::SLOTS,
        }
    };
}

/// A type that satisfies facade `F` when stored directly.
///
/// Shorthand for `Direct<T>: HasTable<F>`.
pub trait Proxiable<F: Facade>: Sized {
    /// The dispatch table of `Self` under `F`.
    const TABLE: &'static DispatchTable;
}

impl<F: Facade, T> Proxiable<F> for T
where
    Direct<T>: HasTable<F>,
{
    const TABLE: &'static DispatchTable = <Direct<T> as HasTable<F>>::TABLE;
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::{
        AsView, Both, FreeToString, Include, Mut, Nothrow, OpAddAssign, Ref, Reflect, Unsupported,
        caps,
    };
    use std::boxed::Box;

    struct Counter;

    impl Facade for Counter {
        type Capabilities = caps![Mut<OpAddAssign<i64>>, Ref<FreeToString>, AsView, Reflect];
        type Copy = Nothrow;
        type Relocation = Nothrow;
        type Destruction = Nothrow;
    }

    struct Plain;

    impl Facade for Plain {
        type Capabilities = caps![];
        type Copy = Unsupported;
        type Relocation = Nothrow;
        type Destruction = Nothrow;
    }

    #[test]
    fn slots_follow_capability_order() {
        let table = <i64 as Proxiable<Counter>>::TABLE;
        assert_eq!(table.len(), 3, "AsView takes no slot");
        assert!(
            matches!(table.slots.get(0), Slot::Convention { binding: Binding::Exclusive(_), .. }),
            "Mut thunk"
        );
        assert!(
            matches!(table.slots.get(1), Slot::Convention { binding: Binding::Shared(_), .. }),
            "Ref thunk"
        );
        assert!(table.slots.get(2).type_info().is::<i64>(), "reflects i64");
        assert!(table.is_inline(), "i64 is inline");
        assert!(table.is_copyable(), "nothrow copy");
    }

    #[test]
    fn resolution_follows_the_receiver() {
        let table = <i64 as Proxiable<Counter>>::TABLE;
        assert!(table.declares::<OpAddAssign<i64>>(Qualifier::Mut), "exclusive binding");
        assert!(!table.declares::<OpAddAssign<i64>>(Qualifier::Ref), "no shared binding");
        assert!(table.declares::<FreeToString>(Qualifier::Mut), "shared serves exclusive");
        assert!(!table.declares::<OpAddAssign<i32>>(Qualifier::Mut), "other overload");
    }

    struct Side;

    impl Convention for Side {
        const TAG: &'static str = "side";
        type Args = ();
        type Output = &'static str;
    }

    impl ImplMut<u8> for Side {
        fn call_mut(_: &mut u8, (): ()) -> &'static str {
            "exclusive"
        }
    }

    impl ImplRef<u8> for Side {
        fn call_ref(_: &u8, (): ()) -> &'static str {
            "shared"
        }
    }

    struct Base;

    impl Facade for Base {
        type Capabilities = caps![Ref<Side>];
        type Copy = Unsupported;
        type Relocation = Nothrow;
        type Destruction = Nothrow;
    }

    struct Narrowed;

    impl Facade for Narrowed {
        type Capabilities = caps![Include<Base>, Mut<Side>];
        type Copy = Unsupported;
        type Relocation = Nothrow;
        type Destruction = Nothrow;
    }

    struct Widened;

    impl Facade for Widened {
        type Capabilities = caps![Include<Base>, Both<Side>];
        type Copy = Unsupported;
        type Relocation = Nothrow;
        type Destruction = Nothrow;
    }

    #[test]
    fn later_declaration_shadows_included_one() {
        let narrowed = <u8 as Proxiable<Narrowed>>::TABLE;
        assert_eq!(narrowed.len(), 2, "both declarations keep their slot");
        assert!(narrowed.declares::<Side>(Qualifier::Mut), "exclusive redeclaration");
        assert!(!narrowed.declares::<Side>(Qualifier::Ref), "shared binding shadowed");
        let widened = <u8 as Proxiable<Widened>>::TABLE;
        assert!(widened.declares::<Side>(Qualifier::Ref), "both receivers");
        let mut value = 0_u8;
        let data = core::ptr::from_mut(&mut value);
        let Some(thunk) = widened.resolve::<Side>(Qualifier::Mut) else {
            panic!("exclusive thunk");
        };
        // SAFETY: `data` is a live, uniquely borrowed `u8`, the type the table was built for.
        assert_eq!(unsafe { thunk(data, ()) }, "exclusive");
    }

    #[test]
    fn pointer_tables_describe_the_pointer() {
        let table = <Pointee<Box<i64>> as HasTable<Counter>>::TABLE;
        assert_eq!(table.layout(), Layout::new::<Box<i64>>(), "stores the box");
        assert!(table.is_inline(), "a box is one word");
        assert!(table.slots.get(2).type_info().is::<i64>(), "reflects the pointee");
    }

    #[test]
    fn boxed_and_non_copyable_metadata() {
        let empty = <[u64; 4] as Proxiable<Plain>>::TABLE;
        assert!(empty.is_empty(), "no capabilities");
        assert!(!empty.is_inline(), "four words are boxed");
        assert!(!empty.is_copyable(), "copy unsupported");
    }

    #[test]
    fn chain_concatenates_runs() {
        let run = SlotRun::one(Slot::Vacant).chain(SlotRun::EMPTY).chain(SlotRun::one(Slot::Vacant));
        assert_eq!(run.len, 2, "two vacant slots");
    }
}
