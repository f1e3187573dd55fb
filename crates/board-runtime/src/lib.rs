//! Runtime orchestration layer for Deckboard.
//!
//! Coordinates the data-ingestion pipeline and the best-effort commander
//! enrichment service, feeding dashboard snapshots to the UI layer over an
//! mpsc channel.

pub mod data_manager;
pub mod enrichment;
pub mod orchestrator;

pub use board_core as core;
pub use board_data as data;
