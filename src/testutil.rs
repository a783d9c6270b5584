//! Recording fakes for the host capability traits, shared by controller tests

use std::cell::{Cell, RefCell};
use std::sync::Mutex;

use anyhow::{Result, anyhow};

use crate::host::{BubbleEvents, Haptics, PositionSink, WindowId, WindowSurface};
use crate::types::{Dimensions, Position, WindowDescriptor, WindowKind};

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Create(WindowKind),
    Move { id: WindowId, position: Position },
    Resize { id: WindowId, dimensions: Dimensions },
    Visible { id: WindowId, visible: bool },
    Appearance { id: WindowId, alpha: f32, scale: f32 },
    Remove { id: WindowId },
}

/// Window surface that records every call and mints sequential ids
#[derive(Default)]
pub struct RecordingSurface {
    calls: RefCell<Vec<SurfaceCall>>,
    next_id: Cell<WindowId>,
    pub fail_create: Cell<bool>,
    pub fail_moves: Cell<bool>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.borrow().clone()
    }

    pub fn create_count(&self, kind: WindowKind) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, SurfaceCall::Create(k) if *k == kind))
            .count()
    }

    pub fn move_count(&self, id: WindowId) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, SurfaceCall::Move { id: moved, .. } if *moved == id))
            .count()
    }

    pub fn last_move(&self, id: WindowId) -> Option<Position> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find_map(|call| match call {
                SurfaceCall::Move {
                    id: moved,
                    position,
                } if *moved == id => Some(*position),
                _ => None,
            })
    }

    pub fn last_appearance(&self, id: WindowId) -> Option<(f32, f32)> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            SurfaceCall::Appearance {
                id: target,
                alpha,
                scale,
            } if *target == id => Some((*alpha, *scale)),
            _ => None,
        })
    }

    pub fn last_visibility(&self, id: WindowId) -> Option<bool> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            SurfaceCall::Visible {
                id: target,
                visible,
            } if *target == id => Some(*visible),
            _ => None,
        })
    }

    pub fn removed(&self, id: WindowId) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|call| matches!(call, SurfaceCall::Remove { id: removed } if *removed == id))
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl WindowSurface for RecordingSurface {
    fn create_window(&self, descriptor: &WindowDescriptor) -> Result<WindowId> {
        if self.fail_create.get() {
            return Err(anyhow!("host refused window creation"));
        }
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.calls
            .borrow_mut()
            .push(SurfaceCall::Create(descriptor.kind));
        Ok(id)
    }

    fn move_window(&self, id: WindowId, position: Position) -> Result<()> {
        if self.fail_moves.get() {
            return Err(anyhow!("host refused layout update"));
        }
        self.calls
            .borrow_mut()
            .push(SurfaceCall::Move { id, position });
        Ok(())
    }

    fn resize_window(&self, id: WindowId, dimensions: Dimensions) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(SurfaceCall::Resize { id, dimensions });
        Ok(())
    }

    fn set_visible(&self, id: WindowId, visible: bool) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(SurfaceCall::Visible { id, visible });
        Ok(())
    }

    fn set_appearance(&self, id: WindowId, alpha: f32, scale: f32) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(SurfaceCall::Appearance { id, alpha, scale });
        Ok(())
    }

    fn remove_window(&self, id: WindowId) -> Result<()> {
        self.calls.borrow_mut().push(SurfaceCall::Remove { id });
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingHaptics {
    pub pulses: Cell<u32>,
}

impl Haptics for CountingHaptics {
    fn pulse(&self) {
        self.pulses.set(self.pulses.get() + 1);
    }
}

#[derive(Default)]
pub struct RecordingEvents {
    pub taps: Cell<u32>,
    pub removals: Cell<u32>,
}

impl BubbleEvents for RecordingEvents {
    fn tapped(&self) {
        self.taps.set(self.taps.get() + 1);
    }

    fn removed_by_user(&self) {
        self.removals.set(self.removals.get() + 1);
    }
}

/// Sink that records saved positions; optionally fails every call
#[derive(Default)]
pub struct RecordingSink {
    saved: Mutex<Vec<Position>>,
    pub fail: std::sync::atomic::AtomicBool,
}

impl RecordingSink {
    pub fn saved(&self) -> Vec<Position> {
        self.saved.lock().expect("sink lock poisoned").clone()
    }
}

impl PositionSink for RecordingSink {
    fn save(&self, position: Position) -> Result<()> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(anyhow!("persistence backend unavailable"));
        }
        self.saved.lock().expect("sink lock poisoned").push(position);
        Ok(())
    }
}
