//! Dropdown trigger policy.

/// Partial-word length at which typing opens the completion dropdown.
pub const MIN_TRIGGER_CHARS: usize = 2;

const NO_TRIGGER_CHARS: [char; 5] = [' ', '\t', '\n', '\r', ','];
const IMMEDIATE_TRIGGER_CHARS: [char; 1] = ['.'];

/// Decides whether the character just typed should open the completion
/// dropdown. `trigger` is `None` when completion was requested without a
/// keystroke.
pub fn should_trigger(trigger: Option<char>, current_word: &str) -> bool {
    match trigger {
        Some(ch) if NO_TRIGGER_CHARS.contains(&ch) => false,
        Some(ch) if IMMEDIATE_TRIGGER_CHARS.contains(&ch) => true,
        _ => current_word.chars().count() >= MIN_TRIGGER_CHARS,
    }
}
