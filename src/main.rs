#![forbid(unsafe_code)]

//! Headless demo daemon
//!
//! Runs the bubble service against an in-process host simulation that logs
//! every window operation, then plays a scripted gesture scenario: a drag
//! that snaps the bubble to an edge, a tap that opens the add-word dialog,
//! a submission, and a clean shutdown. Useful for eyeballing the
//! coordination without a real window system.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::{Level as TraceLevel, info};
use tracing_subscriber::FmtSubscriber;

use vocab_bubble::constants::timing::DEFAULT_DRAG_THROTTLE;
use vocab_bubble::host::{Haptics, ScreenEvent, ServiceHost, WindowId, WindowSurface};
use vocab_bubble::service::{BubbleService, ServiceConfig, ServiceObserver};
use vocab_bubble::settings::SettingsStore;
use vocab_bubble::types::{Dimensions, Position, WindowDescriptor};

#[derive(Parser, Debug)]
#[command(name = "vocab-bubble", about = "Floating quick-add bubble overlay demo daemon")]
struct Cli {
    /// Simulated screen width in pixels
    #[arg(long, default_value_t = 1080)]
    screen_width: u32,

    /// Simulated screen height in pixels
    #[arg(long, default_value_t = 2280)]
    screen_height: u32,

    /// Settings file path (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Window surface that keeps simulated window state and logs every call
#[derive(Default)]
struct SimSurface {
    windows: RefCell<HashMap<WindowId, WindowDescriptor>>,
    next_id: RefCell<WindowId>,
}

impl WindowSurface for SimSurface {
    fn create_window(&self, descriptor: &WindowDescriptor) -> Result<WindowId> {
        let mut next = self.next_id.borrow_mut();
        *next += 1;
        let id = *next;
        info!(
            id = id,
            kind = ?descriptor.kind,
            x = descriptor.position.x,
            y = descriptor.position.y,
            width = descriptor.dimensions.width,
            height = descriptor.dimensions.height,
            "sim: window created"
        );
        self.windows.borrow_mut().insert(id, descriptor.clone());
        Ok(id)
    }

    fn move_window(&self, id: WindowId, position: Position) -> Result<()> {
        let mut windows = self.windows.borrow_mut();
        let window = windows
            .get_mut(&id)
            .ok_or_else(|| anyhow!("sim: no window {id}"))?;
        window.position = position;
        info!(id = id, x = position.x, y = position.y, "sim: window moved");
        Ok(())
    }

    fn resize_window(&self, id: WindowId, dimensions: Dimensions) -> Result<()> {
        let mut windows = self.windows.borrow_mut();
        let window = windows
            .get_mut(&id)
            .ok_or_else(|| anyhow!("sim: no window {id}"))?;
        window.dimensions = dimensions;
        info!(id = id, width = dimensions.width, height = dimensions.height, "sim: window resized");
        Ok(())
    }

    fn set_visible(&self, id: WindowId, visible: bool) -> Result<()> {
        if !self.windows.borrow().contains_key(&id) {
            return Err(anyhow!("sim: no window {id}"));
        }
        info!(id = id, visible = visible, "sim: window visibility changed");
        Ok(())
    }

    fn set_appearance(&self, id: WindowId, alpha: f32, scale: f32) -> Result<()> {
        if !self.windows.borrow().contains_key(&id) {
            return Err(anyhow!("sim: no window {id}"));
        }
        info!(id = id, alpha = alpha, scale = scale, "sim: window appearance changed");
        Ok(())
    }

    fn remove_window(&self, id: WindowId) -> Result<()> {
        self.windows
            .borrow_mut()
            .remove(&id)
            .ok_or_else(|| anyhow!("sim: no window {id}"))?;
        info!(id = id, "sim: window removed");
        Ok(())
    }
}

struct SimHaptics;

impl Haptics for SimHaptics {
    fn pulse(&self) {
        info!("sim: haptic pulse");
    }
}

/// Keeps the sender side alive so the screen-event channel stays open; the
/// demo never powers the screen off
#[derive(Default)]
struct SimHost {
    screen_tx: RefCell<Option<mpsc::Sender<ScreenEvent>>>,
}

impl ServiceHost for SimHost {
    fn start_foreground(&self) -> Result<()> {
        info!("sim: foreground indicator started");
        Ok(())
    }

    fn stop_foreground(&self) -> Result<()> {
        info!("sim: foreground indicator stopped");
        Ok(())
    }

    fn register_screen_events(&self) -> Result<mpsc::Receiver<ScreenEvent>> {
        let (tx, rx) = mpsc::channel();
        *self.screen_tx.borrow_mut() = Some(tx);
        info!("sim: screen event listener registered");
        Ok(rx)
    }

    fn unregister_screen_events(&self) -> Result<()> {
        if self.screen_tx.borrow_mut().take().is_none() {
            return Err(anyhow!("screen event listener was not registered"));
        }
        info!("sim: screen event listener unregistered");
        Ok(())
    }
}

struct SimObserver;

impl ServiceObserver for SimObserver {
    fn bubble_removed(&self) {
        info!("sim: host notified of bubble removal");
    }

    fn word_submitted(&self, word: &str) {
        info!(word = %word, "sim: word handed to the vocabulary repository");
    }
}

/// Advance the service in frame-sized steps of wall-clock time
fn pump_for(service: &mut BubbleService, total: Duration) {
    let frame = Duration::from_millis(8);
    let deadline = Instant::now() + total;
    while Instant::now() < deadline {
        service.pump(Instant::now());
        thread::sleep(frame);
    }
}

fn main() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let cli = Cli::parse();
    let screen = Dimensions::new(cli.screen_width, cli.screen_height);
    info!(width = screen.width, height = screen.height, "simulated screen");

    let store = Arc::new(match cli.config {
        Some(path) => SettingsStore::load_from(path)?,
        None => SettingsStore::load()?,
    });
    let settings_rx = store.subscribe();
    info!(settings = ?store.current(), position = ?store.position(), "loaded settings");

    let mut service = BubbleService::start(
        ServiceConfig {
            screen,
            initial_position: store.position(),
            drag_throttle: DEFAULT_DRAG_THROTTLE,
        },
        Rc::new(SimSurface::default()),
        Rc::new(SimHaptics),
        Box::new(SimHost::default()),
        store.clone(),
        settings_rx,
        Box::new(SimObserver),
    )?;

    // Scenario 1: drag the bubble toward the right half and let it snap
    info!("scenario: drag right and snap");
    service.on_press(Instant::now());
    for _ in 0..20 {
        service.on_drag(40, 6, Instant::now());
        service.pump(Instant::now());
        thread::sleep(Duration::from_millis(12));
    }
    service.on_release(Instant::now());
    pump_for(&mut service, Duration::from_millis(900));
    info!(position = ?service.bubble_position(), "bubble settled");

    // Scenario 2: tap, type a word, submit
    info!("scenario: tap and add a word");
    service.on_press(Instant::now());
    service.on_release(Instant::now());
    pump_for(&mut service, Duration::from_millis(400));
    service.dialog_set_text("serendipity");
    service.dialog_submit(Instant::now());
    pump_for(&mut service, Duration::from_millis(400));

    service.shutdown();
    // Give the detached saver a moment to drain before the process exits
    thread::sleep(Duration::from_millis(100));
    info!(path = %store.path().display(), "done");
    Ok(())
}
