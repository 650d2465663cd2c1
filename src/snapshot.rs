//! Fixed-depth book snapshots and the MBP rows built from them.
//!
//! A [`BookSnapshot`] always holds exactly `levels` entries per side; ranks
//! past the end of a side are [`LevelSnapshot::EMPTY`] placeholders. Snapshot
//! buffers can be reused across events with
//! [`OrderBook::snapshot_into`](crate::lob::OrderBook::snapshot_into).

use serde::Serialize;

use crate::lob::side_book::Levels;
use crate::types::{Passthrough, Price, RowAction, Side};

/// One rank of one side: price, aggregate size and order count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LevelSnapshot {
    /// `None` for a placeholder rank
    pub price: Option<Price>,
    pub size: u64,
    pub count: u32,
}

impl LevelSnapshot {
    /// Placeholder for a rank with no level: blank price, size 0, count 0.
    pub const EMPTY: LevelSnapshot = LevelSnapshot {
        price: None,
        size: 0,
        count: 0,
    };

    /// Whether this rank is a placeholder.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.price.is_none()
    }
}

/// Top-N levels of both sides, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSnapshot {
    /// Bid levels (highest to lowest)
    pub bids: Vec<LevelSnapshot>,
    /// Ask levels (lowest to highest)
    pub asks: Vec<LevelSnapshot>,
}

impl BookSnapshot {
    /// Create a snapshot of `levels` placeholder ranks per side.
    pub fn new(levels: usize) -> Self {
        Self {
            bids: vec![LevelSnapshot::EMPTY; levels],
            asks: vec![LevelSnapshot::EMPTY; levels],
        }
    }

    /// Number of ranks per side.
    #[inline]
    pub fn levels(&self) -> usize {
        self.bids.len()
    }

    /// Ranks for one side (empty slice for [`Side::None`]).
    pub fn side(&self, side: Side) -> &[LevelSnapshot] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
            Side::None => &[],
        }
    }

    /// Overwrite one side from a best-first level iterator, padding with
    /// placeholders.
    pub(crate) fn fill_side(&mut self, side: Side, mut levels: Levels<'_>) {
        let slots = match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
            Side::None => return,
        };
        for slot in slots.iter_mut() {
            *slot = match levels.next() {
                Some((price, level)) => LevelSnapshot {
                    price: Some(price),
                    size: level.total_size(),
                    count: level.order_count(),
                },
                None => LevelSnapshot::EMPTY,
            };
        }
    }

    /// Best bid price in the snapshot.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().and_then(|l| l.price)
    }

    /// Best ask price in the snapshot.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().and_then(|l| l.price)
    }
}

/// One output row: the classified change plus the book after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MbpRecord {
    /// Fields echoed from the triggering event
    pub passthrough: Passthrough,
    pub action: RowAction,
    pub side: Side,
    /// Rank of the affected level; `None` when no level exists at the price
    pub depth: Option<usize>,
    pub price: Price,
    pub size: u64,
    pub book: BookSnapshot,
}
