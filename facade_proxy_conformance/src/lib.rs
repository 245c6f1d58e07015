// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test collaborators for `facade_proxy` conformance tests.
//!
//! [`LifetimeTracker`] hands out [`Session`] values and records every construction, copy and
//! destruction of them, so tests can check exactly which lifecycle operations a handle performed.
//! Moves are bitwise in Rust and record nothing.

use facade_proxy::{Facade, FreeToString, Nothrow, Ref, Unsupported, caps};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::vec::Vec;

/// Kind of a recorded lifecycle operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LifetimeOperationKind {
    /// A session was created by the tracker.
    ValueConstruction,
    /// A session was cloned.
    CopyConstruction,
    /// A session was dropped.
    Destruction,
}

/// One recorded lifecycle operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LifetimeOperation {
    /// Id of the session the operation applied to.
    pub id: u32,
    /// What happened.
    pub kind: LifetimeOperationKind,
}

impl LifetimeOperation {
    /// Shorthand constructor for expected-operation lists.
    pub const fn new(id: u32, kind: LifetimeOperationKind) -> Self {
        Self { id, kind }
    }
}

/// An injected construction failure.
///
/// Returned by [`LifetimeTracker::try_session`]; used as the panic payload when a [`Session`]
/// clone fails.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("injected failure during {kind:?}")]
pub struct ConstructionFailure {
    /// The construction that failed.
    pub kind: LifetimeOperationKind,
}

#[derive(Debug, Default)]
struct TrackerState {
    max_id: u32,
    fail_next: bool,
    ops: Vec<LifetimeOperation>,
}

impl TrackerState {
    fn allocate(&mut self, kind: LifetimeOperationKind) -> Result<u32, ConstructionFailure> {
        if self.fail_next {
            self.fail_next = false;
            return Err(ConstructionFailure { kind });
        }
        self.max_id += 1;
        self.ops.push(LifetimeOperation::new(self.max_id, kind));
        Ok(self.max_id)
    }
}

/// Records lifecycle operations of the sessions it creates.
#[derive(Debug, Default)]
pub struct LifetimeTracker {
    state: Rc<RefCell<TrackerState>>,
}

impl LifetimeTracker {
    /// A tracker with no recorded operations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session, or reports the injected failure.
    pub fn try_session(&self) -> Result<Session, ConstructionFailure> {
        let id = self
            .state
            .borrow_mut()
            .allocate(LifetimeOperationKind::ValueConstruction)?;
        Ok(Session {
            id,
            host: Rc::clone(&self.state),
        })
    }

    /// Creates a session.
    ///
    /// # Panics
    ///
    /// With a [`ConstructionFailure`] payload if a failure was injected.
    #[track_caller]
    pub fn session(&self) -> Session {
        self.try_session()
            .unwrap_or_else(|failure| std::panic::panic_any(failure))
    }

    /// Every operation recorded so far, oldest first.
    pub fn operations(&self) -> Vec<LifetimeOperation> {
        self.state.borrow().ops.clone()
    }

    /// Makes the next construction (value or copy) fail.
    pub fn fail_next_construction(&self) {
        self.state.borrow_mut().fail_next = true;
    }
}

/// A tracked value. Cloning and dropping are recorded by its tracker.
pub struct Session {
    id: u32,
    host: Rc<RefCell<TrackerState>>,
}

impl Session {
    /// Id assigned at construction.
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Clone for Session {
    /// Records a copy construction.
    ///
    /// # Panics
    ///
    /// With a [`ConstructionFailure`] payload if a failure was injected.
    fn clone(&self) -> Self {
        let allocated = self
            .host
            .borrow_mut()
            .allocate(LifetimeOperationKind::CopyConstruction);
        match allocated {
            Ok(id) => Self {
                id,
                host: Rc::clone(&self.host),
            },
            Err(failure) => std::panic::panic_any(failure),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.host
            .borrow_mut()
            .ops
            .push(LifetimeOperation::new(self.id, LifetimeOperationKind::Destruction));
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session {}", self.id)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// A facade with only the `to_string` convention.
#[derive(Debug)]
pub struct Stringable;

impl Facade for Stringable {
    type Capabilities = caps![Ref<FreeToString>];
    type Copy = Unsupported;
    type Relocation = Nothrow;
    type Destruction = Nothrow;
}
