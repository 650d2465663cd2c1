//! Event classification and the conversion driver.
//!
//! The [`Dispatcher`] owns the [`OrderBook`] for one run and turns each
//! [`MboEvent`] into at most one [`MbpRecord`]:
//!
//! | Event | Book mutation | Row |
//! |-------|---------------|-----|
//! | Reset (first event only) | `clear()` | `R`, side `N`, depth 0 |
//! | Add | `add_order` | `A`, depth after the add |
//! | Cancel | `resolve_pending`, `cancel_order` | `T` or `C`, depth before the cancel |
//! | Trade / Fill | `record_pending` | none |
//! | Modify / None / later Reset | none | none |
//!
//! A trade whose side is `N` is dropped without touching the tracker.

use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;

use crate::config::ConverterConfig;
use crate::encoder::MbpWriter;
use crate::error::Result;
use crate::lob::{BookStats, OrderBook};
use crate::reader::MboReader;
use crate::snapshot::MbpRecord;
use crate::types::{Action, ExecutionKind, MboEvent, Price, RowAction, Side};

/// Counters kept by the dispatcher itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Events handed to [`Dispatcher::process`]
    pub events_read: u64,

    /// Rows produced (and, in [`Dispatcher::run`], written)
    pub rows_written: u64,

    /// Resets seen after the first event
    pub resets_ignored: u64,

    /// Trades with side `N`
    pub dropped_trades: u64,

    /// Modify and None events
    pub ignored_events: u64,

    /// Rows skipped because of parse or book errors (`skip_invalid`)
    pub skipped_rows: u64,
}

/// Result of a complete conversion run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionSummary {
    pub dispatch: DispatchStats,
    pub book: BookStats,
    /// Orders still live at end of input
    pub active_orders: usize,
    /// Trade/fill markers never consumed by a cancel
    pub pending_markers: usize,
}

/// Classifies events and applies them to an owned order book.
pub struct Dispatcher {
    book: OrderBook,
    config: ConverterConfig,
    started: bool,
    stats: DispatchStats,
}

impl Dispatcher {
    /// Create a dispatcher with an empty book.
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            book: OrderBook::with_config(config.book_config()),
            config,
            started: false,
            stats: DispatchStats::default(),
        }
    }

    /// Apply one event; returns the row it produces, if any.
    ///
    /// # Errors
    /// Propagates `MbpError::DuplicateOrderId` from a rejected add. The book
    /// is unchanged and no row is produced in that case.
    pub fn process(&mut self, event: &MboEvent) -> Result<Option<MbpRecord>> {
        let first = !self.started;
        self.started = true;
        self.stats.events_read += 1;

        let row = match event.action {
            Action::Reset if first => {
                self.book.clear();
                Some(self.record(event, RowAction::Reset, Side::None, Some(0), Price::ZERO, 0))
            }
            Action::Reset => {
                self.stats.resets_ignored += 1;
                log::debug!("Ignoring reset after start of stream");
                None
            }
            Action::Add => {
                self.book
                    .add_order(event.order_id, event.side, event.price, event.size)?;
                let depth = self.book.depth_of(event.side, event.price);
                Some(self.record(event, RowAction::Add, event.side, depth, event.price, event.size))
            }
            Action::Cancel => {
                let depth = self.book.depth_of(event.side, event.price);
                let resolution = self.book.resolve_pending(event.order_id);
                self.book.cancel_order(event.order_id, event.size);
                Some(self.record(
                    event,
                    resolution.row_action(),
                    event.side,
                    depth,
                    event.price,
                    event.size,
                ))
            }
            Action::Trade if event.side == Side::None => {
                self.stats.dropped_trades += 1;
                None
            }
            Action::Trade => {
                self.book.record_pending(event.order_id, ExecutionKind::Trade);
                None
            }
            Action::Fill => {
                self.book.record_pending(event.order_id, ExecutionKind::Fill);
                None
            }
            Action::Modify | Action::None => {
                self.stats.ignored_events += 1;
                None
            }
        };

        if row.is_some() {
            self.stats.rows_written += 1;
        }
        Ok(row)
    }

    fn record(
        &self,
        event: &MboEvent,
        action: RowAction,
        side: Side,
        depth: Option<usize>,
        price: Price,
        size: u64,
    ) -> MbpRecord {
        MbpRecord {
            passthrough: event.passthrough.clone(),
            action,
            side,
            depth,
            price,
            size,
            book: self.book.snapshot(self.config.levels),
        }
    }

    /// Stream every event from `reader` through the book into `writer`.
    ///
    /// The header is written even when the input holds no events. With
    /// `skip_invalid` set, row-level errors are logged and counted instead
    /// of aborting the run.
    pub fn run<R: Read, W: Write>(
        &mut self,
        reader: &mut MboReader<R>,
        writer: &mut MbpWriter<W>,
    ) -> Result<ConversionSummary> {
        writer.write_header()?;

        loop {
            let outcome = match reader.next_event() {
                Ok(Some(event)) => self.process(&event),
                Ok(None) => break,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(Some(row)) => writer.write_record(&row)?,
                Ok(None) => {}
                Err(e) if self.config.skip_invalid && e.is_row_error() => {
                    self.stats.skipped_rows += 1;
                    log::warn!("Skipping row {}: {e}", reader.rows_read());
                }
                Err(e) => return Err(e),
            }
        }

        writer.flush()?;
        Ok(self.summary())
    }

    /// Snapshot of the counters for this run.
    pub fn summary(&self) -> ConversionSummary {
        ConversionSummary {
            dispatch: self.stats,
            book: self.book.stats().clone(),
            active_orders: self.book.order_count(),
            pending_markers: self.book.pending_count(),
        }
    }

    #[inline]
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    #[inline]
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }
}

/// Convert the MBO CSV at `input` into an MBP CSV at `output`.
pub fn convert(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: ConverterConfig,
) -> Result<ConversionSummary> {
    config.validate()?;
    let mut reader = MboReader::from_path(input)?;
    let mut writer =
        MbpWriter::from_path(output, config.levels)?.with_record_type(config.record_type);
    let mut dispatcher = Dispatcher::new(config);
    dispatcher.run(&mut reader, &mut writer)
}
