use ratatui::prelude::Color;

/// Truncate a string to a maximum number of characters, adding "..." if
/// truncated. Counts chars, not bytes, so multi-byte input never splits.
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
  }
}

/// Display color for a pod phase / container state
pub fn phase_color(status: &str) -> Color {
  match status {
    "Running" | "Succeeded" | "Completed" => Color::Green,
    "Pending" | "ContainerCreating" | "PodInitializing" | "Terminating" => Color::Yellow,
    "CrashLoopBackOff" | "Error" | "Failed" | "ImagePullBackOff" | "ErrImagePull"
    | "OOMKilled" | "Evicted" => Color::Red,
    _ => Color::White,
  }
}

/// Color for a "ready/total" fraction like "2/2"
pub fn ready_color(ready: &str) -> Color {
  match ready.split_once('/') {
    Some((current, total)) if current == total && current != "0" => Color::Green,
    Some(("0", _)) => Color::Red,
    Some(_) => Color::Yellow,
    None => Color::White,
  }
}

/// Color for a Kubernetes condition value ("True"/"False")
pub fn condition_color(value: &str) -> Color {
  match value {
    "True" => Color::Green,
    "False" => Color::Red,
    _ => Color::Yellow,
  }
}
