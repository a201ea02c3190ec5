//! Built-in plugins registered by [`PluginRegistry::with_builtins`].
//!
//! [`PluginRegistry::with_builtins`]: crate::PluginRegistry::with_builtins

pub use countdown::*;
pub use submissions::*;

mod countdown;
mod submissions;
