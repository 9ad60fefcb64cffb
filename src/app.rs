use crate::api::client::ApiClient;
use crate::cache::CacheStore;
use crate::commands::{self, Command};
use crate::config::Config;
use crate::deeplink::DeepLinkBus;
use crate::event::{Event, EventHandler};
use crate::scope::Scope;
use crate::sync::SyncOptions;
use crate::ui;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{CertificatesView, NamespacesView, PdbView, PodsView, StorageView};
use color_eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Command,
}

/// Everything a view needs to do its job, cloned into each one: the API
/// client, the shared cache, the namespace scope and the deep-link bus.
#[derive(Clone)]
pub struct AppContext {
  pub api: ApiClient,
  pub store: CacheStore,
  pub scope: Scope,
  pub links: DeepLinkBus,
  pub sync: SyncOptions,
}

/// Main application state
pub struct App {
  ctx: AppContext,

  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Current input mode
  mode: Mode,

  /// Command input buffer (after pressing :)
  command_input: String,

  /// Selected autocomplete suggestion index
  selected_suggestion: usize,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let api = ApiClient::new(&config)?;
    let scope = Scope::new(
      config.backend.cluster.clone(),
      config.default_namespaces.iter().cloned(),
    );
    let ctx = AppContext {
      api,
      store: CacheStore::new(),
      scope,
      links: DeepLinkBus::new(),
      sync: SyncOptions {
        ttl: Duration::from_secs(config.cache.ttl_secs),
        background_refresh: config.cache.background_refresh,
      },
    };

    Ok(Self {
      view_stack: vec![Box::new(PodsView::new(ctx.clone()))],
      ctx,
      mode: Mode::Normal,
      command_input: String::new(),
      selected_suggestion: 0,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));

    // Main loop
    while !self.should_quit {
      // Draw UI
      terminal.draw(|frame| ui::draw(frame, self))?;

      // Handle events
      if let Some(event) = events.next().await {
        self.handle_event(event);
      }
    }

    // Cleanup terminal
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Mouse(mouse) => {
        if let Some(view) = self.view_stack.last_mut() {
          view.handle_mouse(mouse);
        }
      }
      Event::Tick => {
        if let Some(view) = self.view_stack.last_mut() {
          let action = view.tick();
          self.apply_action(action);
        }
      }
    }
  }

  fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
    if self.mode == Mode::Command {
      self.handle_command_mode_key(key);
      return;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    // The current view gets the first look at every key
    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::Unhandled,
    };

    match action {
      ViewAction::Unhandled => self.handle_global_key(key),
      other => self.apply_action(other),
    }
  }

  fn handle_global_key(&mut self, key: crossterm::event::KeyEvent) {
    match key.code {
      KeyCode::Char(':') => {
        self.mode = Mode::Command;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Char('q') | KeyCode::Esc => self.apply_action(ViewAction::Pop),
      _ => {}
    }
  }

  fn handle_command_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Enter => {
        self.execute_command();
        self.mode = Mode::Normal;
        self.selected_suggestion = 0;
      }
      KeyCode::Tab | KeyCode::Down => {
        // Navigate autocomplete suggestions
        let suggestions = self.autocomplete_suggestions();
        if !suggestions.is_empty() {
          self.selected_suggestion = (self.selected_suggestion + 1) % suggestions.len();
        }
      }
      KeyCode::BackTab | KeyCode::Up => {
        // Navigate autocomplete suggestions backwards
        let suggestions = self.autocomplete_suggestions();
        if !suggestions.is_empty() {
          self.selected_suggestion = if self.selected_suggestion == 0 {
            suggestions.len() - 1
          } else {
            self.selected_suggestion - 1
          };
        }
      }
      KeyCode::Backspace => {
        self.command_input.pop();
        self.selected_suggestion = 0; // Reset selection on input change
      }
      KeyCode::Char(c) => {
        self.command_input.push(c);
        self.selected_suggestion = 0; // Reset selection on input change
      }
      _ => {}
    }
  }

  fn execute_command(&mut self) {
    let input = self.command_input.trim().to_string();
    let mut parts = input.split_whitespace();
    let head = parts.next().unwrap_or("").to_lowercase();
    let args: Vec<String> = parts.map(|s| s.to_string()).collect();

    // The command word comes from the selected suggestion when one matches
    let suggestions = commands::get_suggestions(&head);
    let cmd = if !suggestions.is_empty() && self.selected_suggestion < suggestions.len() {
      suggestions[self.selected_suggestion].name
    } else {
      head.as_str()
    };

    match cmd {
      "pods" => self.switch_root(Box::new(PodsView::new(self.ctx.clone()))),
      "namespaces" => self.switch_root(Box::new(NamespacesView::new(self.ctx.clone()))),
      "certificates" => self.switch_root(Box::new(CertificatesView::new(self.ctx.clone()))),
      "pdb" => self.switch_root(Box::new(PdbView::new(self.ctx.clone()))),
      "storage" => self.switch_root(Box::new(StorageView::new(self.ctx.clone()))),
      "scope" => {
        // Views pick the new scope up on their next tick
        if args.is_empty() {
          self.ctx.scope.clear_namespaces();
        } else {
          self.ctx.scope.set_namespaces(args);
        }
      }
      "quit" => {
        self.should_quit = true;
      }
      _ => {
        tracing::debug!(command = %cmd, "unknown command");
      }
    }
    self.command_input.clear();
  }

  fn switch_root(&mut self, view: Box<dyn View>) {
    self.apply_action(ViewAction::Switch(view));
  }

  fn apply_action(&mut self, action: ViewAction) {
    match action {
      ViewAction::None | ViewAction::Unhandled => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        self.view_stack.pop();
        if self.view_stack.is_empty() {
          self.should_quit = true;
        }
      }
      ViewAction::Switch(view) => {
        self.view_stack.clear();
        self.view_stack.push(view);
      }
    }
  }

  // Accessors for UI rendering
  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  pub fn command_input(&self) -> &str {
    &self.command_input
  }

  /// "cluster [scope] › breadcrumbs" for the status bar
  pub fn location(&self) -> String {
    let breadcrumb = self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect::<Vec<_>>()
      .join(" › ");
    format!("{} › {}", self.ctx.scope.cluster(), breadcrumb)
  }

  pub fn autocomplete_suggestions(&self) -> Vec<&'static Command> {
    let head = self
      .command_input
      .split_whitespace()
      .next()
      .unwrap_or_else(|| self.command_input.trim());
    commands::get_suggestions(head)
  }

  pub fn selected_suggestion(&self) -> usize {
    self.selected_suggestion
  }
}
