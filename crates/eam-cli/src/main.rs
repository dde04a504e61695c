//! `eam`, a terminal form for capturing asset records.
//!
//! # Usage
//!
//! ```
//! eam --url http://localhost:5000/api/assets
//! eam --config ~/.config/eam/config.toml --offline
//! ```

mod app;
mod platform;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::{App, Widgets};
use clap::Parser;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use eam_capture::{BarcodeScanner, Capabilities, ImageCapture, LocationTracker, Unsupported};
use eam_core::{message::Reporter, reference::ReferenceData, user::UserContext};
use eam_form::{AssetForm, HttpAssetSink, connectivity, http::DEFAULT_ENDPOINT};
use eam_store_sqlite::SqliteStore;
use platform::{FixedGeolocator, FixedPosition};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_STORE: &str = "eam.db";
const LOG_FILE: &str = "eam-cli.log";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "eam", about = "Terminal form for capturing asset records")]
struct Args {
  /// Path to a TOML config file (endpoint, store, user, gps).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Submission endpoint (default: http://localhost:5000/api/assets).
  #[arg(long, env = "EAM_URL")]
  url: Option<String>,

  /// Local SQLite file for drafts and the offline queue.
  #[arg(long, env = "EAM_STORE", value_name = "FILE")]
  store: Option<PathBuf>,

  /// Start offline; submissions go to the local queue.
  #[arg(long)]
  offline: bool,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  endpoint:   String,
  #[serde(default)]
  store_path: Option<PathBuf>,
  #[serde(default)]
  user:       Option<UserSection>,
  /// Fixed position reported as the device location.
  #[serde(default)]
  gps:        Option<FixedPosition>,
}

#[derive(Deserialize)]
struct UserSection {
  name:          String,
  role:          String,
  #[serde(default)]
  location_name: String,
}

impl From<UserSection> for UserContext {
  fn from(u: UserSection) -> Self {
    UserContext { user_name: u.name, role: u.role, location_name: u.location_name }
  }
}

fn default_user() -> UserContext {
  UserContext {
    user_name:     "John Smith".into(),
    role:          "Auditor".into(),
    location_name: "Warehouse A - North Wing".into(),
  }
}

// ─── Logging ──────────────────────────────────────────────────────────────────

/// The terminal belongs to the UI, so logs go to a file beside the store.
fn init_logging(store: &Path) -> Result<()> {
  let path = store.with_file_name(LOG_FILE);
  let file = File::options()
    .create(true)
    .append(true)
    .open(&path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let endpoint = args
    .url
    .or_else(|| (!file_cfg.endpoint.is_empty()).then(|| file_cfg.endpoint.clone()))
    .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
  let store_path = args
    .store
    .or(file_cfg.store_path)
    .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));
  let user = file_cfg.user.map_or_else(default_user, UserContext::from);

  init_logging(&store_path)?;
  tracing::info!(%endpoint, store = %store_path.display(), user = %user.user_name, "starting");

  let sink = HttpAssetSink::new(endpoint).context("building HTTP client")?;
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("opening store {}", store_path.display()))?;

  // Widget reports are queued here and applied by the app after each key.
  let (monitor, connectivity) = connectivity::channel(!args.offline);
  let (tx, inbox) = mpsc::unbounded_channel();
  let reporter = Reporter::new(move |m| {
    let _ = tx.send(m);
  });

  let geo = FixedGeolocator::new(file_cfg.gps);
  let caps = Capabilities::probe(&Unsupported, &Unsupported, &geo);
  let widgets = Widgets {
    scanner: BarcodeScanner::new(Unsupported, Unsupported, &caps, reporter.clone()),
    images:  ImageCapture::new(Unsupported, &caps, reporter.clone()),
    locator: LocationTracker::new(geo, &caps, &user, reporter),
  };

  let form = AssetForm::new(user, ReferenceData::builtin(), connectivity, sink, store);
  let mut app = App::new(form, widgets, monitor, inbox);
  app.mount().await;

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  tracing::info!("exiting");
  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop<S, L>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<S, L>,
) -> Result<()>
where
  S: eam_core::sink::AssetSink,
  L: eam_core::store::OfflineQueue + eam_core::store::DraftStore,
{
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if !app.handle_key(key).await? {
        break;
      }
    }
  }

  Ok(())
}
