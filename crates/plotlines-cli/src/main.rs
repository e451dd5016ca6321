//! `plotlines`: terminal dashboard and admin tool for a plotlines server.
//!
//! # Usage
//!
//! ```
//! plotlines --url http://localhost:3000
//! plotlines --config ~/.config/plotlines/cli.toml people
//! plotlines add-friend 1 2 --episode 3 --emoji 🤝
//! plotlines graph 3 --visibility flag --pair-scope all
//! ```
//!
//! With no subcommand the TUI is started.

mod app;
mod client;
mod layout;
mod ui;

use std::{
  io,
  path::PathBuf,
  sync::{Arc, Mutex},
  time::{Duration, Instant},
};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use client::{ApiConfig, HttpStore};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotlines_core::{
  Episode, PersonId,
  aggregator::Aggregator,
  person::{NewPerson, PersonPatch, VisibilityModel},
  projection::{PairScope, ProjectionOptions},
  relation::{EnemyEdge, FriendEdge, PairEdge},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:3000";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "plotlines", about = "Relationship dashboard for the plotlines server")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the plotlines server (default: http://localhost:3000).
  #[arg(long, env = "PLOTLINES_URL")]
  url: Option<String>,

  /// Write TUI logs to this file. Without it the TUI logs nothing.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Interactive dashboard (the default).
  Tui,

  /// List everyone in the cast.
  People,

  /// Add a person.
  AddPerson {
    name:        String,
    #[arg(long)]
    picture_url: Option<String>,
    #[arg(long)]
    bio:         Option<String>,
    /// First episode they appear in.
    #[arg(long)]
    arrived:     Option<Episode>,
  },

  /// Remove a person and every relation they take part in.
  RemovePerson { id: PersonId },

  /// Move a person in or out of the show from an episode on.
  SetActive {
    id:      PersonId,
    #[arg(action = clap::ArgAction::Set)]
    active:  bool,
    #[arg(long)]
    episode: Episode,
  },

  /// Record a friendship in an episode.
  AddFriend {
    a:         PersonId,
    b:         PersonId,
    #[arg(long)]
    episode:   Episode,
    #[arg(long)]
    emoji:     Option<String>,
    #[arg(long)]
    context:   Option<String>,
    #[arg(long)]
    image_url: Option<String>,
  },

  /// Remove a friendship exactly as it was recorded.
  RemoveFriend {
    a:       PersonId,
    b:       PersonId,
    #[arg(long)]
    episode: Episode,
  },

  /// Record a rivalry.
  AddEnemy {
    a:       PersonId,
    b:       PersonId,
    #[arg(long)]
    emoji:   Option<String>,
    #[arg(long)]
    context: Option<String>,
  },

  /// Remove a rivalry, in either order.
  RemoveEnemy { a: PersonId, b: PersonId },

  /// Pair two people for an episode.
  AddPair {
    a:       PersonId,
    b:       PersonId,
    #[arg(long)]
    episode: Episode,
  },

  /// Remove a pair, in either order.
  RemovePair {
    a:       PersonId,
    b:       PersonId,
    #[arg(long)]
    episode: Episode,
  },

  /// Print the projected graph elements for an episode.
  Graph {
    episode:    Episode,
    #[arg(long, default_value_t = VisibilityModel::Range)]
    visibility: VisibilityModel,
    #[arg(long, default_value_t = PairScope::Episode)]
    pair_scope: PairScope,
  },

  /// Print the participant tips.
  Tips,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
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
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
  };

  let command = args.command.unwrap_or(Command::Tui);
  init_tracing(&command, args.log_file.as_deref())?;

  let store = Arc::new(HttpStore::new(api_config)?);

  match command {
    Command::Tui => run_tui(App::new(Aggregator::new(store))).await,
    Command::Graph { episode, visibility, pair_scope } => {
      let elements = store
        .graph(episode, ProjectionOptions { visibility, pair_scope })
        .await?;
      print_json(&elements)
    }
    Command::Tips => print_json(&store.tips().await?),
    admin => run_admin(Aggregator::new(store), admin).await,
  }
}

/// The TUI owns the terminal, so it only logs when given a file; everything
/// else logs to stderr.
fn init_tracing(command: &Command, log_file: Option<&std::path::Path>) -> Result<()> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  match (command, log_file) {
    (Command::Tui, None) => {}
    (Command::Tui, Some(path)) => {
      let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    }
    (_, _) => {
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    }
  }
  Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

// ─── Admin commands ───────────────────────────────────────────────────────────

/// One-shot mutations. They go through the aggregator so the same local
/// checks apply as in the TUI.
async fn run_admin(mut agg: Aggregator<HttpStore>, command: Command) -> Result<()> {
  let report = agg.load().await;
  if !report.is_complete() {
    let failed: Vec<_> = report.failed.iter().map(ToString::to_string).collect();
    anyhow::bail!("could not load {}", failed.join(", "));
  }

  match command {
    Command::People => print_json(&agg.snapshot().people),
    Command::AddPerson { name, picture_url, bio, arrived } => {
      let person = agg
        .add_person(NewPerson { picture_url, bio, arrived, ..NewPerson::named(name) })
        .await?;
      print_json(&person)
    }
    Command::RemovePerson { id } => removed(agg.remove_person(id).await?, "person"),
    Command::SetActive { id, active, episode } => {
      let person = agg
        .update_person(id, PersonPatch::activity(active, episode))
        .await?;
      print_json(&person)
    }
    Command::AddFriend { a, b, episode, emoji, context, image_url } => {
      let edge = FriendEdge { emoji, context, image_url, ..FriendEdge::new(a, b, episode) };
      print_json(&agg.add_friend(edge).await?)
    }
    Command::RemoveFriend { a, b, episode } => {
      let key = FriendEdge::new(a, b, episode).key();
      removed(agg.remove_friend(key).await?, "friendship")
    }
    Command::AddEnemy { a, b, emoji, context } => {
      let edge = EnemyEdge { emoji, context, ..EnemyEdge::new(a, b) };
      print_json(&agg.add_enemy(edge).await?)
    }
    Command::RemoveEnemy { a, b } => {
      removed(agg.remove_enemy(EnemyEdge::new(a, b).key()).await?, "rivalry")
    }
    Command::AddPair { a, b, episode } => {
      print_json(&agg.add_pair(PairEdge::new(a, b, episode)).await?)
    }
    Command::RemovePair { a, b, episode } => {
      removed(agg.remove_pair(PairEdge::new(a, b, episode)).await?, "pair")
    }
    Command::Tui | Command::Graph { .. } | Command::Tips => Ok(()),
  }
}

fn removed(found: bool, what: &str) -> Result<()> {
  if !found {
    anyhow::bail!("no such {what}");
  }
  println!("removed {what}");
  Ok(())
}

// ─── TUI ──────────────────────────────────────────────────────────────────────

async fn run_tui(mut app: App<HttpStore>) -> Result<()> {
  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Load initial data. A partial load still shows what arrived.
  app.load().await;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<HttpStore>,
) -> Result<()> {
  let mut last_frame = Instant::now();

  loop {
    let now = Instant::now();
    // Clamp so a slow request does not fling the layout.
    let dt = now.duration_since(last_frame).as_secs_f32().min(0.05);
    last_frame = now;
    app.bridge.renderer_mut().tick(dt);

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll faster while the layout is still settling.
    let timeout = if app.bridge.renderer().is_animating() {
      Duration::from_millis(16)
    } else {
      Duration::from_millis(50)
    };

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(timeout)? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(evt) = maybe_event {
      match evt {
        Event::Key(key) => {
          let cont = app.handle_key(key).await?;
          if !cont {
            break;
          }
        }
        Event::Resize(_, _) => {
          // Terminal will redraw on next iteration.
        }
        _ => {}
      }
    }
  }

  Ok(())
}
