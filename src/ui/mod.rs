//! UI rendering module for Duaread
//!
//! This module contains all the rendering logic for the terminal user
//! interface, using the ratatui library for TUI components.

pub mod dua_detail;
pub mod dua_list;
pub mod help_overlay;

pub use dua_detail::render as render_dua_detail;
pub use dua_list::render as render_dua_list;
pub use help_overlay::render as render_help_overlay;
