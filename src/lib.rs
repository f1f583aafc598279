//! client-brief - multi-step client brief form for the terminal
//!
//! The form core in [`form`] is UI-independent; [`app`] and [`ui`] wire it to
//! a ratatui terminal, and [`headless`] drives it from an answers file.

pub mod app;
pub mod config;
pub mod form;
pub mod headless;
pub mod logging;
pub mod theme;
pub mod ui;
