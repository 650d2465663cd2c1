//! Order book reconstruction module.
//!
//! This module provides the MBO order book state machine and its parts.

pub mod book;
pub mod orders;
pub mod pending;
pub mod price_level;
pub mod side_book;

pub use book::{AddOutcome, BookConfig, BookStats, CancelOutcome, DuplicateOrderPolicy, OrderBook};
pub use orders::OrderRegistry;
pub use pending::{PendingExecutions, PendingMarker};
pub use price_level::PriceLevel;
pub use side_book::{LevelReduction, Levels, SideBook};
