#![forbid(unsafe_code)]

//! Floating quick-add bubble overlay for a vocabulary learning app
//!
//! The bubble is a small always-on-top draggable window that works as the
//! persistent entry point to quick word-add, independent of any normal
//! application screen. Dragging it brings up a delete-zone drop target;
//! releasing it elsewhere snaps it to the nearest horizontal screen edge
//! and persists the position. Tapping it opens the add-word dialog in a
//! third floating window.
//!
//! The host window system is abstracted behind the traits in [`host`]; the
//! crate owns the coordination: geometry ([`snapping`]), the overlay
//! lifecycle scope ([`lifecycle`]), timer-driven animation ([`animation`]),
//! the three window controllers ([`bubble`], [`delete_zone`], [`dialog`]),
//! the service orchestrator ([`service`]) and the settings store
//! ([`settings`]).

pub mod animation;
pub mod bubble;
pub mod constants;
pub mod delete_zone;
pub mod dialog;
pub mod host;
pub mod lifecycle;
pub mod service;
pub mod settings;
pub mod snapping;
pub mod types;

#[cfg(test)]
mod testutil;

pub use bubble::{BubbleConfig, BubbleController};
pub use host::{
    BubbleEvents, Haptics, PositionSink, ScreenEvent, ServiceHost, WindowId, WindowSurface,
};
pub use service::{BubbleService, ServiceConfig, ServiceObserver};
pub use settings::SettingsStore;
pub use types::{BubbleSettings, Dimensions, Position, WindowDescriptor};
