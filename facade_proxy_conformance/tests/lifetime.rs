// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle contracts of owning proxies, checked with the lifetime tracker.

use facade_proxy::{
    AsView, Facade, FreeToString, Nontrivial, Nothrow, Proxy, Ref, Unsupported, Upward, caps,
};
use facade_proxy_conformance::LifetimeOperationKind::{
    CopyConstruction, Destruction, ValueConstruction,
};
use facade_proxy_conformance::{
    ConstructionFailure, LifetimeOperation, LifetimeTracker, Session, Stringable,
};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

struct Copyable;

impl Facade for Copyable {
    type Capabilities = caps![Ref<FreeToString>, AsView, Upward<Stringable>];
    type Copy = Nontrivial;
    type Relocation = Nothrow;
    type Destruction = Nothrow;
}

fn op(id: u32, kind: facade_proxy_conformance::LifetimeOperationKind) -> LifetimeOperation {
    LifetimeOperation::new(id, kind)
}

/// A session too large to be stored inline.
#[derive(Clone)]
struct Padded {
    session: Session,
    _padding: [u64; 4],
}

impl fmt::Display for Padded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Padded {}", self.session)
    }
}

#[test]
fn construct_and_drop() {
    let tracker = LifetimeTracker::new();
    {
        let p = Proxy::<Stringable>::new(tracker.session());
        assert_eq!(p.call::<FreeToString>(()), "Session 1");
        assert_eq!(tracker.operations(), [op(1, ValueConstruction)]);
    }
    assert_eq!(
        tracker.operations(),
        [op(1, ValueConstruction), op(1, Destruction)]
    );
}

#[test]
fn boxed_value_is_dropped_once() {
    let tracker = LifetimeTracker::new();
    let mut p = Proxy::<Copyable>::new(Padded {
        session: tracker.session(),
        _padding: [0; 4],
    });
    assert_eq!(p.call::<FreeToString>(()), "Padded Session 1");
    p.reset();
    p.reset();
    drop(p);
    assert_eq!(
        tracker.operations(),
        [op(1, ValueConstruction), op(1, Destruction)]
    );
}

#[test]
fn moves_record_nothing() {
    let tracker = LifetimeTracker::new();
    let mut p = Proxy::<Stringable>::new(tracker.session());
    let q = p.take();
    let r = q;
    assert!(!p.has_value(), "source emptied");
    assert_eq!(r.call::<FreeToString>(()), "Session 1");
    assert_eq!(tracker.operations(), [op(1, ValueConstruction)]);
}

#[test]
fn clone_copies_the_value() {
    let tracker = LifetimeTracker::new();
    let p = Proxy::<Copyable>::new(tracker.session());
    let q = p.clone();
    assert_eq!(p.call::<FreeToString>(()), "Session 1");
    assert_eq!(q.call::<FreeToString>(()), "Session 2");
    drop(p);
    drop(q);
    assert_eq!(
        tracker.operations(),
        [
            op(1, ValueConstruction),
            op(2, CopyConstruction),
            op(1, Destruction),
            op(2, Destruction),
        ]
    );
}

#[test]
fn failed_clone_leaves_source_intact() {
    let tracker = LifetimeTracker::new();
    let p = Proxy::<Copyable>::new(Padded {
        session: tracker.session(),
        _padding: [0; 4],
    });
    tracker.fail_next_construction();
    let payload = catch_unwind(AssertUnwindSafe(|| p.clone())).unwrap_err();
    assert_eq!(
        payload.downcast_ref::<ConstructionFailure>(),
        Some(&ConstructionFailure {
            kind: CopyConstruction
        })
    );
    assert!(p.has_value(), "source still holds its value");
    assert_eq!(p.call::<FreeToString>(()), "Padded Session 1");
    assert_eq!(tracker.operations(), [op(1, ValueConstruction)]);
}

#[test]
fn failed_construction_propagates_unchanged() {
    let tracker = LifetimeTracker::new();
    tracker.fail_next_construction();
    let err = Proxy::<Stringable>::try_new_with(|| tracker.try_session()).unwrap_err();
    assert_eq!(
        err,
        ConstructionFailure {
            kind: ValueConstruction
        }
    );
    assert!(tracker.operations().is_empty(), "nothing was constructed");
}

/// A value that owns two sessions, built one after the other.
struct Pair {
    first: Session,
    second: Session,
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} and {}", self.first, self.second)
    }
}

fn build_pair(tracker: &LifetimeTracker, fail_second: bool) -> Result<Pair, ConstructionFailure> {
    let first = tracker.try_session()?;
    if fail_second {
        tracker.fail_next_construction();
    }
    let second = tracker.try_session()?;
    Ok(Pair { first, second })
}

#[test]
fn failure_mid_construction_releases_the_finished_part() {
    let tracker = LifetimeTracker::new();
    let err = Proxy::<Stringable>::try_new_with(|| build_pair(&tracker, true)).unwrap_err();
    assert_eq!(
        err,
        ConstructionFailure {
            kind: ValueConstruction
        }
    );
    assert_eq!(
        tracker.operations(),
        [op(1, ValueConstruction), op(1, Destruction)],
        "the first session is released, the second never existed"
    );

    let p = Proxy::<Stringable>::try_new_with(|| build_pair(&tracker, false)).unwrap();
    assert_eq!(p.call::<FreeToString>(()), "Session 2 and Session 3");
}

#[test]
fn failure_mid_emplace_leaves_nothing_behind() {
    let tracker = LifetimeTracker::new();
    let mut p = Proxy::<Stringable>::new(tracker.session());
    let err = p.try_emplace_with(|| build_pair(&tracker, true));
    assert!(err.is_err(), "injected failure");
    assert!(!p.has_value(), "left empty");
    assert_eq!(
        tracker.operations(),
        [
            op(1, ValueConstruction),
            op(1, Destruction),
            op(2, ValueConstruction),
            op(2, Destruction),
        ]
    );
}

#[test]
fn failed_emplace_destroys_old_value_and_stays_empty() {
    let tracker = LifetimeTracker::new();
    let mut p = Proxy::<Stringable>::new(tracker.session());
    tracker.fail_next_construction();
    let err = p.try_emplace_with(|| tracker.try_session());
    assert!(err.is_err(), "injected failure");
    assert!(!p.has_value(), "left empty");
    assert_eq!(
        tracker.operations(),
        [op(1, ValueConstruction), op(1, Destruction)]
    );

    p.try_emplace_with(|| tracker.try_session()).unwrap();
    assert_eq!(p.call::<FreeToString>(()), "Session 2");
}

#[test]
fn emplace_drops_previous_value_first() {
    let tracker = LifetimeTracker::new();
    let mut p = Proxy::<Stringable>::new(tracker.session());
    p.try_emplace_with(|| tracker.try_session()).unwrap();
    assert_eq!(
        tracker.operations(),
        [
            op(1, ValueConstruction),
            op(1, Destruction),
            op(2, ValueConstruction),
        ]
    );
}

#[test]
fn views_and_upcasts_record_nothing() {
    let tracker = LifetimeTracker::new();
    let p = Proxy::<Copyable>::new(tracker.session());
    let view = p.as_view();
    let copy = view;
    assert_eq!(copy.call::<FreeToString>(()), "Session 1");
    let narrowed: Proxy<'_, Stringable> = p.upcast();
    assert_eq!(narrowed.call::<FreeToString>(()), "Session 1");
    assert_eq!(tracker.operations(), [op(1, ValueConstruction)]);
    drop(narrowed);
    assert_eq!(
        tracker.operations(),
        [op(1, ValueConstruction), op(1, Destruction)]
    );
}

#[test]
fn unsupported_copy_facade_still_owns() {
    struct Unique;

    impl Facade for Unique {
        type Capabilities = caps![Ref<FreeToString>];
        type Copy = Unsupported;
        type Relocation = Nothrow;
        type Destruction = Nothrow;
    }

    let tracker = LifetimeTracker::new();
    let p = Proxy::<Unique>::new(tracker.session());
    drop(p);
    assert_eq!(
        tracker.operations(),
        [op(1, ValueConstruction), op(1, Destruction)]
    );
}
