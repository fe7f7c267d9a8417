//! Emoji used by the engine, stored as unicode strings.

/// The reward symbol. Reacting with this on a drop collects it.
pub const CHEESE: &str = "\u{1F9C0}";

/// Prefix of a successful collection notice.
pub const THUMBS_UP: &str = "\u{1F44D}";

/// Prefix of a failed collection notice.
pub const THUMBS_DOWN: &str = "\u{1F44E}";

/// Appended to disappointing notices.
pub const SAD: &str = "\u{1F61E}";
