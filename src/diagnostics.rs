//! User-facing diagnostics.
//!
//! Warnings go through `tracing` so the binary's subscriber decides what is
//! shown; error messages get a common prefix before they reach the terminal.

use std::fmt::Display;

pub fn error_message(msg: impl Display) -> String {
    format!("compile-spec error: {}", msg)
}

pub fn warn(msg: impl Display) {
    tracing::warn!("{}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_is_prefixed() {
        assert_eq!(
            error_message("config contained no methods"),
            "compile-spec error: config contained no methods"
        );
    }
}
