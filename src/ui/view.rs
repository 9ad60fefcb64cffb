use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::prelude::*;

/// Actions that a view can request in response to user input
pub enum ViewAction {
  /// Nothing for the app to do
  None,
  /// Key not consumed; the app may apply global bindings
  Unhandled,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
  /// Replace the whole stack with a new root view (: commands land here)
  Switch(Box<dyn View>),
}

/// Trait for view behavior
///
/// Views handle their own input modes (search, scrolling, etc.) and return
/// actions for the App to execute. This creates a clean delegation chain:
/// App → View → Components
///
/// Views that load data asynchronously drive their sync engine from tick().
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Handle a mouse event (hover, clicks); default ignores it
  fn handle_mouse(&mut self, _mouse: MouseEvent) {}

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Called on each tick to pump fetches and timers. Deep-link resolution
  /// can surface a new view from here.
  fn tick(&mut self) -> ViewAction {
    ViewAction::None
  }
}
