//! Service-level coordination
//!
//! `BubbleService` is the foreground-service orchestrator: it starts the
//! host's foreground indicator, registers for screen on/off notifications,
//! wires the bubble and dialog controllers together, forwards settings
//! stream updates, and owns the background position saver.
//!
//! All window mutation happens on the single thread that calls into the
//! service; the pump drains channels non-blockingly and drives the
//! animation ticks. The only other thread is the saver worker, which the
//! service never waits on: pending saves are detached and complete or fail
//! on their own.

use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::bubble::{BubbleConfig, BubbleController};
use crate::dialog::DialogController;
use crate::host::{
    BubbleEvents, Haptics, PositionSink, ScreenEvent, ServiceHost, WindowSurface,
};
use crate::types::{BubbleSettings, Dimensions, Position};

/// Host-side observer for service-level outcomes
pub trait ServiceObserver {
    /// Bubble was dropped on the delete zone; the host decides whether to
    /// deactivate the service
    fn bubble_removed(&self);

    /// A word was submitted through the add-word dialog
    fn word_submitted(&self, word: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControllerEvent {
    Tapped,
    Removed,
}

/// `BubbleEvents` implementation handed to the bubble controller; forwards
/// notifications over a channel the service pump drains
struct EventForwarder {
    tx: mpsc::Sender<ControllerEvent>,
}

impl BubbleEvents for EventForwarder {
    fn tapped(&self) {
        if self.tx.send(ControllerEvent::Tapped).is_err() {
            warn!("service event channel closed, dropping tap");
        }
    }

    fn removed_by_user(&self) {
        if self.tx.send(ControllerEvent::Removed).is_err() {
            warn!("service event channel closed, dropping removal");
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    pub screen: Dimensions,
    /// Bubble position loaded from the settings store at activation
    pub initial_position: Position,
    /// Drag layout throttle handed to the bubble controller
    pub drag_throttle: Duration,
}

/// Background worker draining position saves off the UI path. Failures are
/// logged here and never retried; the worker exits once every queue sender
/// is gone.
fn spawn_position_saver(sink: Arc<dyn PositionSink>) -> Result<mpsc::Sender<Position>> {
    let (tx, rx) = mpsc::channel::<Position>();
    thread::Builder::new()
        .name("position-saver".into())
        .spawn(move || {
            while let Ok(position) = rx.recv() {
                match sink.save(position) {
                    Ok(()) => debug!(x = position.x, y = position.y, "bubble position saved"),
                    Err(e) => {
                        error!(x = position.x, y = position.y, error = %e, "bubble position save failed")
                    }
                }
            }
            debug!("position saver finished");
        })
        .context("failed to spawn position saver thread")?;
    Ok(tx)
}

pub struct BubbleService {
    host: Box<dyn ServiceHost>,
    observer: Box<dyn ServiceObserver>,
    bubble: BubbleController,
    dialog: DialogController,
    settings_rx: watch::Receiver<BubbleSettings>,
    screen_rx: Option<mpsc::Receiver<ScreenEvent>>,
    events_rx: mpsc::Receiver<ControllerEvent>,
    active: bool,
}

impl BubbleService {
    /// Activate the service: foreground indicator, screen notifications,
    /// saver worker, then the bubble window from the latest settings
    /// snapshot.
    pub fn start(
        config: ServiceConfig,
        surface: Rc<dyn WindowSurface>,
        haptics: Rc<dyn Haptics>,
        host: Box<dyn ServiceHost>,
        sink: Arc<dyn PositionSink>,
        settings_rx: watch::Receiver<BubbleSettings>,
        observer: Box<dyn ServiceObserver>,
    ) -> Result<Self> {
        host.start_foreground()
            .context("failed to start foreground indicator")?;

        let screen_rx = match host.register_screen_events() {
            Ok(rx) => Some(rx),
            Err(e) => {
                error!(error = %e, "screen event registration failed, continuing without");
                None
            }
        };

        let save_queue = spawn_position_saver(sink)?;
        let (events_tx, events_rx) = mpsc::channel();

        let settings = *settings_rx.borrow();
        let mut bubble = BubbleController::new(
            surface.clone(),
            haptics,
            Rc::new(EventForwarder { tx: events_tx }),
            save_queue,
            BubbleConfig {
                screen: config.screen,
                drag_throttle: config.drag_throttle,
            },
            settings,
        );
        bubble.show(config.initial_position);
        let dialog = DialogController::new(surface, config.screen);

        info!(
            width = config.screen.width,
            height = config.screen.height,
            x = config.initial_position.x,
            y = config.initial_position.y,
            "bubble service started"
        );
        Ok(Self {
            host,
            observer,
            bubble,
            dialog,
            settings_rx,
            screen_rx,
            events_rx,
            active: true,
        })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn bubble_position(&self) -> Option<Position> {
        self.bubble.position()
    }

    pub fn dialog_showing(&self) -> bool {
        self.dialog.is_showing()
    }

    // --- host input entry points, forwarded to the bubble controller ---

    pub fn on_press(&mut self, now: Instant) {
        if self.active {
            self.bubble.on_press(now);
        }
    }

    pub fn on_drag(&mut self, dx: i32, dy: i32, now: Instant) {
        if self.active {
            self.bubble.on_drag(dx, dy, now);
        }
    }

    pub fn on_release(&mut self, now: Instant) {
        if self.active {
            self.bubble.on_release(now);
        }
    }

    // --- dialog form entry points ---

    pub fn dialog_set_text(&mut self, text: &str) {
        self.dialog.set_text(text);
    }

    pub fn dialog_dismiss(&mut self, now: Instant) {
        self.dialog.dismiss(now);
    }

    pub fn dialog_submit(&mut self, now: Instant) {
        if let Some(word) = self.dialog.submit(now) {
            info!(word = %word, "forwarding add-word submission");
            self.observer.word_submitted(&word);
        }
    }

    /// One pump iteration: drain notifications, forward settings, drive
    /// animations. Call from the host UI loop, ideally once per frame.
    pub fn pump(&mut self, now: Instant) {
        if !self.active {
            return;
        }
        self.poll_screen_events();
        self.poll_settings();
        self.drain_controller_events(now);
        self.bubble.tick(now);
        self.dialog.tick(now);
    }

    fn poll_screen_events(&mut self) {
        loop {
            let result = match &self.screen_rx {
                Some(rx) => rx.try_recv(),
                None => return,
            };
            match result {
                Ok(ScreenEvent::Off) => {
                    info!("screen off, hiding overlay windows");
                    self.bubble.hide();
                }
                Ok(ScreenEvent::On) => {
                    info!("screen on, restoring overlay windows");
                    self.bubble.unhide();
                }
                Err(mpsc::TryRecvError::Empty) => return,
                Err(mpsc::TryRecvError::Disconnected) => {
                    warn!("screen event source disconnected");
                    self.screen_rx = None;
                    return;
                }
            }
        }
    }

    fn poll_settings(&mut self) {
        if self.settings_rx.has_changed().unwrap_or(false) {
            let settings = *self.settings_rx.borrow_and_update();
            info!(
                size = settings.size_px,
                alpha = settings.alpha_percent,
                vibration = settings.vibration,
                "applying updated bubble settings"
            );
            self.bubble.apply_settings(settings);
        }
    }

    fn drain_controller_events(&mut self, now: Instant) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                ControllerEvent::Tapped => {
                    debug!("bubble tapped, opening add-word dialog");
                    self.dialog.show(None, now);
                }
                ControllerEvent::Removed => {
                    info!("bubble removed by user, notifying host");
                    self.observer.bubble_removed();
                }
            }
        }
    }

    /// Deactivate: unregister notifications, destroy all window
    /// controllers. Pending position saves are left to the detached worker.
    pub fn shutdown(&mut self) {
        if !self.active {
            warn!("bubble service already shut down");
            return;
        }
        self.active = false;

        if let Err(e) = self.host.unregister_screen_events() {
            // Tolerated: the listener may never have been registered
            warn!(error = %e, "screen event unregistration failed");
        }
        if let Err(e) = self.host.stop_foreground() {
            warn!(error = %e, "failed to stop foreground indicator");
        }
        self.screen_rx = None;
        self.bubble.destroy();
        self.dialog.destroy();
        info!("bubble service stopped");
    }
}
