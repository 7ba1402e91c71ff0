//! CLI prompts using cliclack (Charm-style inline prompts)
//!
//! This module is optional and only available when the `tui` feature is enabled.

#[cfg(feature = "tui")]
mod clack;
#[cfg(feature = "tui")]
mod prompts;

#[cfg(feature = "tui")]
pub use clack::{ClackPrompter, SpinnerObserver};
#[cfg(feature = "tui")]
pub use prompts::{run, CreateArgs};
