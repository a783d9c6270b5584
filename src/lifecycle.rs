//! Lifecycle scope for windows not attached to any normal application screen
//!
//! Floating windows created straight against the host window manager have no
//! activity-style lifecycle, but hosted UI trees still need a well-defined
//! scope to attach state storage to. `OverlayLifecycle` is that scope: a
//! monotonic forward progression through `Created -> Started -> Resumed`,
//! with `Destroyed` reachable from any state on explicit teardown.

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Started,
    Resumed,
    Destroyed,
}

impl LifecycleState {
    /// Forward-progression rank; `Destroyed` is terminal, not "highest"
    fn rank(self) -> u8 {
        match self {
            LifecycleState::Created => 0,
            LifecycleState::Started => 1,
            LifecycleState::Resumed => 2,
            LifecycleState::Destroyed => 3,
        }
    }
}

/// State holder owned by the controller that created the window, shared
/// read-only with hosted UI code
#[derive(Debug)]
pub struct OverlayLifecycle {
    state: LifecycleState,
}

impl Default for OverlayLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayLifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Created,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Advance to `Started`. No-op with a warning if the lifecycle already
    /// moved past it or was torn down.
    pub fn start(&mut self) {
        self.advance(LifecycleState::Started);
    }

    /// Advance to `Resumed`, passing through `Started` implicitly.
    pub fn resume(&mut self) {
        self.advance(LifecycleState::Resumed);
    }

    /// Terminal teardown, allowed from any state.
    pub fn destroy(&mut self) {
        self.state = LifecycleState::Destroyed;
    }

    fn advance(&mut self, target: LifecycleState) {
        if self.state == LifecycleState::Destroyed {
            warn!(target = ?target, "ignoring lifecycle advance on destroyed scope");
            return;
        }
        if target.rank() <= self.state.rank() {
            warn!(current = ?self.state, target = ?target, "ignoring backwards lifecycle advance");
            return;
        }
        self.state = target;
    }

    /// "Is at least Started"-style query for hosted UI code. A destroyed
    /// scope satisfies nothing.
    pub fn is_at_least(&self, state: LifecycleState) -> bool {
        if self.state == LifecycleState::Destroyed {
            return false;
        }
        self.state.rank() >= state.rank()
    }
}
