//! # MBO-MBP-Reconstructor
//!
//! Market-By-Order → Market-By-Price conversion.
//!
//! This library replays a Market-By-Order (MBO) event stream through an
//! in-memory limit order book and emits one Market-By-Price (MBP) row per
//! book-changing event: the classified change plus the top N price levels of
//! each side after it.
//!
//! ## Features
//!
//! - **Exact prices**: fixed-point [`Price`] (1e-9 units) parsed from decimal text, no float tolerance
//! - **Aggregated levels**: per-price total size and order count, maintained incrementally
//! - **Execution reconciliation**: a cancel preceded by a trade and a fill for the same order is emitted as a trade
//! - **Configurable duplicates**: [`DuplicateOrderPolicy`] decides what an add for a live order id does
//! - **Streaming CSV I/O**: header-mapped MBO input, fixed-width MBP output
//!
//! ## Quick Start
//!
//! ```rust
//! use mbo_mbp_reconstructor::{Action, ConverterConfig, Dispatcher, MboEvent, Price, RowAction, Side};
//!
//! let mut dispatcher = Dispatcher::new(ConverterConfig::new(5));
//!
//! let add = MboEvent::new(1, Action::Add, Side::Bid, "10.25".parse().unwrap(), 100);
//! let row = dispatcher.process(&add).unwrap().unwrap();
//!
//! assert_eq!(row.action, RowAction::Add);
//! assert_eq!(row.depth, Some(0));
//! assert_eq!(row.book.best_bid(), Some(Price::from_f64(10.25)));
//! ```
//!
//! ### Converting Files
//!
//! ```ignore
//! use mbo_mbp_reconstructor::{convert, ConverterConfig};
//!
//! let summary = convert("mbo.csv", "mbp.csv", ConverterConfig::default())?;
//! println!("{} rows", summary.dispatch.rows_written);
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Core types: `Price`, `MboEvent`, `Action`, `Side`, `RowAction` |
//! | [`lob`] | Order book: `OrderBook`, `SideBook`, `PriceLevel`, `PendingExecutions` |
//! | [`snapshot`] | Fixed-depth `BookSnapshot` and `MbpRecord` rows |
//! | [`dispatcher`] | Event classification and the conversion driver |
//! | [`reader`] | MBO CSV reader |
//! | [`encoder`] | MBP CSV writer |
//! | [`config`] | `ConverterConfig` |

pub mod config;
pub mod dispatcher;
pub mod encoder;
pub mod error;
pub mod lob;
pub mod reader;
pub mod snapshot;
pub mod types;

// Re-exports - Core types
pub use error::{MbpError, Result};
pub use types::{
    Action, CancelResolution, ExecutionKind, MboEvent, Order, Passthrough, Price, RowAction,
    Side, DEFAULT_LEVELS, MBP10_RTYPE, PRICE_SCALE,
};

// Re-exports - Order book
pub use lob::{
    AddOutcome, BookConfig, BookStats, CancelOutcome, DuplicateOrderPolicy, OrderBook, PriceLevel,
};

// Re-exports - Snapshots
pub use snapshot::{BookSnapshot, LevelSnapshot, MbpRecord};

// Re-exports - Conversion
pub use config::ConverterConfig;
pub use dispatcher::{convert, ConversionSummary, DispatchStats, Dispatcher};
pub use encoder::MbpWriter;
pub use reader::{Column, ColumnMap, MboReader, IO_BUFFER_SIZE};
