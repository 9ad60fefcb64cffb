mod input;
mod search_input;

pub use input::{InputResult, TextInput};
pub use search_input::{SearchEvent, SearchInput};

/// Result of offering a key event to a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<E> {
  /// Key consumed, nothing for the parent to do
  Handled,
  /// Key consumed and produced an event the parent must handle
  Event(E),
  /// Key not handled, pass to next handler
  NotHandled,
}
