//! User-facing notice texts posted by the drop flow.

use cheese_types::symbols::{CHEESE, SAD, THUMBS_DOWN, THUMBS_UP};

/// Posted when a message wins the coin flip during the cooldown.
pub fn no_cheese() -> String {
    format!("No {CHEESE} for you!")
}

/// Posted when `collector` wins a race.
pub fn collected(collector: &str) -> String {
    format!("{THUMBS_UP} {collector} collected the {CHEESE}!")
}

/// Posted when a race times out.
pub fn nobody_collected() -> String {
    format!("{THUMBS_DOWN} nobody collected the {CHEESE}  {SAD}")
}
