pub mod utils;

pub use utils::{condition_color, phase_color, ready_color, truncate};
