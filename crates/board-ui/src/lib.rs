//! Terminal UI layer for Deckboard.
//!
//! Provides themes, the deck table view, the summary view (stat cards and
//! per-player chart), the header component, and the main application event
//! loop built on top of [`ratatui`] for rendering league dashboards in the
//! terminal.

pub mod app;
pub mod components;
pub mod summary_view;
pub mod table_view;
pub mod themes;

pub use board_core as core;
