//! Application state machine and event dispatcher.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use plotlines_core::{
  Episode,
  aggregator::Aggregator,
  bridge::{Bridge, DetailView, TapTarget},
  person::{Person, Presence, VisibilityModel},
  projection::{PairScope, ProjectionOptions},
  store::PlotStore,
};

use crate::layout::ForceLayout;

/// Episodes offered by the selector.
pub const EPISODES: std::ops::RangeInclusive<Episode> = 1..=17;

// ─── Pane ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
  /// Keyboard focus on the relationship graph.
  Graph,
  /// Keyboard focus on the people cards.
  People,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S> {
  pub pane: Pane,

  pub aggregator: Aggregator<S>,

  pub bridge: Bridge<ForceLayout>,

  pub episode: Episode,

  pub options: ProjectionOptions,

  /// Index into [`App::selectable`] of the highlighted graph element.
  pub selection: Option<usize>,

  /// Current fuzzy-filter string for the people cards.
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* people list.
  pub list_cursor: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,
}

impl<S: PlotStore> App<S> {
  pub fn new(aggregator: Aggregator<S>) -> Self {
    Self {
      pane: Pane::Graph,
      aggregator,
      bridge: Bridge::new(ForceLayout::default()),
      episode: *EPISODES.start(),
      options: ProjectionOptions::default(),
      selection: None,
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      status_msg: String::new(),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch every collection and redraw the graph.
  pub async fn load(&mut self) {
    self.status_msg = "Loading…".into();
    let report = self.aggregator.load().await;
    self.status_msg = if report.is_complete() {
      String::new()
    } else {
      let failed: Vec<_> = report.failed.iter().map(ToString::to_string).collect();
      format!("Could not load {}; showing previous data", failed.join(", "))
    };
    self.refresh();
  }

  /// Re-project the snapshot and hand the result to the bridge.
  pub fn refresh(&mut self) {
    let elements = self.aggregator.project(self.episode, self.options);
    if self.bridge.present(elements) {
      self.selection = None;
    }
  }

  // ── Graph selection ───────────────────────────────────────────────────────

  /// Ids of on-screen elements in tab order: nodes first, then edges.
  pub fn selectable(&self) -> Vec<TapTarget> {
    let layout = self.bridge.renderer();
    layout
      .nodes()
      .iter()
      .map(|n| TapTarget::Node(n.id.clone()))
      .chain(layout.edges().iter().map(|e| TapTarget::Edge(e.id.clone())))
      .collect()
  }

  pub fn selected(&self) -> Option<TapTarget> {
    self.selection.and_then(|i| self.selectable().into_iter().nth(i))
  }

  fn cycle_selection(&mut self, forward: bool) {
    let len = self.selectable().len();
    if len == 0 {
      self.selection = None;
      return;
    }
    self.selection = Some(match (self.selection, forward) {
      (None, true) => 0,
      (None, false) => len - 1,
      (Some(i), true) => (i + 1) % len,
      (Some(i), false) => (i + len - 1) % len,
    });
  }

  pub fn detail(&self) -> &DetailView { self.bridge.detail() }

  // ── People cards ──────────────────────────────────────────────────────────

  /// People that match the current filter query.
  pub fn filtered_people(&self) -> Vec<&Person> {
    let people = &self.aggregator.snapshot().people;
    if self.filter.is_empty() {
      return people.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    people
      .iter()
      .filter(|p| matcher.fuzzy_match(&p.name, &self.filter).is_some())
      .collect()
  }

  /// The person under the list cursor in the filtered view, if any.
  pub fn cursor_person(&self) -> Option<&Person> {
    self.filtered_people().get(self.list_cursor).copied()
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    match key.code {
      KeyCode::Char('q') => return Ok(false),

      // Episode selector
      KeyCode::Char(']') | KeyCode::Right => self.set_episode(self.episode + 1),
      KeyCode::Char('[') | KeyCode::Left => self.set_episode(self.episode - 1),

      // Projection options
      KeyCode::Char('v') => {
        self.options.visibility = match self.options.visibility {
          VisibilityModel::Range => VisibilityModel::Flag,
          VisibilityModel::Flag => VisibilityModel::Range,
        };
        self.status_msg = format!("Visibility: {}", self.options.visibility);
        self.refresh();
      }
      KeyCode::Char('s') => {
        self.options.pair_scope = match self.options.pair_scope {
          PairScope::Episode => PairScope::All,
          PairScope::All => PairScope::Episode,
        };
        self.status_msg = format!("Pair colors: {}", self.options.pair_scope);
        self.refresh();
      }

      KeyCode::Char('r') => self.load().await,

      // Pane focus
      KeyCode::Char('c') => {
        self.pane = match self.pane {
          Pane::Graph => Pane::People,
          Pane::People => Pane::Graph,
        };
      }

      KeyCode::Esc => self.bridge.close(),

      _ => match self.pane {
        Pane::Graph => self.handle_graph_key(key),
        Pane::People => self.handle_people_key(key).await,
      },
    }
    Ok(true)
  }

  fn set_episode(&mut self, episode: Episode) {
    if EPISODES.contains(&episode) && episode != self.episode {
      self.episode = episode;
      self.refresh();
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => return,
    }
    self.list_cursor = 0;
  }

  fn handle_graph_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => self.cycle_selection(true),
      KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => self.cycle_selection(false),
      KeyCode::Enter => {
        if let Some(target) = self.selected() {
          self.bridge.tap(&target);
        }
      }
      _ => {}
    }
  }

  async fn handle_people_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.filtered_people().len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }

      // Show the person's card in the detail pane, if they are on screen.
      KeyCode::Enter => {
        if let Some(id) = self.cursor_person().map(|p| p.id.to_string()) {
          if self.bridge.elements().node(&id).is_none() {
            self.status_msg = "Not on screen this episode".into();
          }
          self.bridge.tap(&TapTarget::Node(id));
        }
      }

      KeyCode::Char('a') => self.toggle_active().await,
      KeyCode::Char('x') => self.remove_person().await,
      _ => {}
    }
  }

  /// Flip the person under the cursor in or out of the show from the current
  /// episode on, as they appear in the graph right now.
  async fn toggle_active(&mut self) {
    let (episode, visibility) = (self.episode, self.options.visibility);
    let Some((id, name, presence)) = self
      .cursor_person()
      .map(|p| (p.id, p.name.clone(), p.presence(episode, visibility)))
    else {
      return;
    };
    let activate = match presence {
      Presence::Active => false,
      Presence::Departed => true,
      Presence::NotArrived => {
        self.status_msg = format!("{name} has not arrived by episode {episode}");
        return;
      }
    };
    match self.aggregator.set_active(id, activate, episode).await {
      Ok(_) => {
        let state = if activate { "active" } else { "inactive" };
        self.status_msg = format!("{name} is now {state} from episode {episode}");
        self.refresh();
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  async fn remove_person(&mut self) {
    let Some((id, name)) = self.cursor_person().map(|p| (p.id, p.name.clone())) else {
      return;
    };
    match self.aggregator.remove_person(id).await {
      Ok(_) => {
        self.status_msg = format!("Removed {name}");
        let len = self.filtered_people().len();
        self.list_cursor = self.list_cursor.min(len.saturating_sub(1));
        self.refresh();
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }
}
