//! Single-instrument order book.
//!
//! High-performance implementation using:
//! - BTreeMap price levels per side (O(log levels) insert/erase)
//! - ahash HashMap order registry for fast cancel lookups
//! - Incrementally maintained level aggregates, never recomputed on the hot path
//! - Pending trade/fill markers to classify cancels as executions

use serde::{Deserialize, Serialize};

use crate::error::{MbpError, Result};
use crate::lob::orders::OrderRegistry;
use crate::lob::pending::PendingExecutions;
use crate::lob::price_level::PriceLevel;
use crate::lob::side_book::SideBook;
use crate::snapshot::BookSnapshot;
use crate::types::{CancelResolution, ExecutionKind, Order, Price, Side};

/// How to handle an add for an order id that is already live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateOrderPolicy {
    /// Reverse the live order's contribution, then apply the new add (default)
    #[default]
    Replace,

    /// Leave the book untouched and return `MbpError::DuplicateOrderId`
    Reject,
}

/// Configuration for order book behavior.
#[derive(Debug, Clone)]
pub struct BookConfig {
    /// How to handle duplicate order ids on add
    pub duplicate_policy: DuplicateOrderPolicy,

    /// Whether to log warnings for consistency issues
    pub log_warnings: bool,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicateOrderPolicy::Replace,
            log_warnings: true,
        }
    }
}

impl BookConfig {
    /// Set duplicate order id handling policy.
    pub fn with_duplicate_policy(mut self, policy: DuplicateOrderPolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Enable/disable warning logs.
    pub fn with_logging(mut self, log: bool) -> Self {
        self.log_warnings = log;
        self
    }
}

/// What an add did to the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// New order rested
    Added,
    /// A live order with the same id was reversed and replaced
    Replaced,
    /// Non-directional or zero-size add; book unchanged
    Ignored,
}

/// What a cancel did to the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Size was removed; `order_removed` when the order left the book
    Applied { order_removed: bool },
    /// Order id not tracked (e.g. rested before the feed window); no-op
    UnknownOrder,
    /// Requested remaining size exceeds the tracked size; no-op
    OverCancel,
}

/// Statistics for monitoring book health.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookStats {
    /// Orders rested (including replacements)
    pub adds: u64,

    /// Adds whose order id was already live
    pub duplicate_adds: u64,

    /// Adds ignored for having no side or zero size
    pub ignored_adds: u64,

    /// Cancels that changed the book
    pub cancels_applied: u64,

    /// Orders removed by cancels to zero
    pub orders_removed: u64,

    /// Cancels for order ids not in the registry
    pub unknown_order_cancels: u64,

    /// Cancels asking for more remaining size than tracked
    pub over_cancels: u64,

    /// Cancels whose order had no level at its price
    pub missing_level_cancels: u64,

    /// Levels erased at zero size while still counting orders
    pub orphaned_level_removals: u64,

    /// Trade markers recorded
    pub trades_recorded: u64,

    /// Fill markers recorded
    pub fills_recorded: u64,

    /// Cancels resolved as executions
    pub executions_resolved: u64,
}

/// Order book state machine for one instrument.
///
/// Owns both sides, the order registry, and the pending-execution tracker.
/// All mutations are synchronous; events must be applied in feed order.
#[derive(Debug, Clone)]
pub struct OrderBook {
    /// Configuration
    config: BookConfig,

    /// Bid levels (best = highest)
    bids: SideBook,

    /// Ask levels (best = lowest)
    asks: SideBook,

    /// Live orders: order_id -> Order
    orders: OrderRegistry,

    /// Trade/fill markers awaiting a cancel
    pending: PendingExecutions,

    /// Statistics (for monitoring)
    stats: BookStats,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Create an empty book with default configuration.
    ///
    /// # Example
    /// ```
    /// use mbo_mbp_reconstructor::OrderBook;
    ///
    /// let book = OrderBook::new();
    /// assert_eq!(book.order_count(), 0);
    /// ```
    pub fn new() -> Self {
        Self::with_config(BookConfig::default())
    }

    /// Create an empty book with custom configuration.
    ///
    /// # Example
    /// ```
    /// use mbo_mbp_reconstructor::{BookConfig, DuplicateOrderPolicy, OrderBook};
    ///
    /// let config = BookConfig::default()
    ///     .with_duplicate_policy(DuplicateOrderPolicy::Reject);
    /// let book = OrderBook::with_config(config);
    /// ```
    pub fn with_config(config: BookConfig) -> Self {
        Self {
            config,
            bids: SideBook::new(Side::Bid),
            asks: SideBook::new(Side::Ask),
            orders: OrderRegistry::new(),
            pending: PendingExecutions::new(),
            stats: BookStats::default(),
        }
    }

    /// Get a reference to the current configuration.
    #[inline]
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Register a new live order and add its size to the level at `price`.
    ///
    /// # Errors
    /// Returns `MbpError::DuplicateOrderId` when `order_id` is already live
    /// and the policy is [`DuplicateOrderPolicy::Reject`]; the book is left
    /// unchanged in that case.
    pub fn add_order(
        &mut self,
        order_id: u64,
        side: Side,
        price: Price,
        size: u64,
    ) -> Result<AddOutcome> {
        if side == Side::None || size == 0 {
            self.stats.ignored_adds += 1;
            log::debug!("Ignoring add for order {order_id}: side={side:?} size={size}");
            return Ok(AddOutcome::Ignored);
        }

        let mut outcome = AddOutcome::Added;
        if let Some(previous) = self.orders.get(order_id).copied() {
            self.stats.duplicate_adds += 1;
            match self.config.duplicate_policy {
                DuplicateOrderPolicy::Reject => {
                    if self.config.log_warnings {
                        log::warn!("Rejecting add for live order {order_id}");
                    }
                    return Err(MbpError::DuplicateOrderId(order_id));
                }
                DuplicateOrderPolicy::Replace => {
                    if self.config.log_warnings {
                        log::warn!(
                            "Add for live order {order_id}: replacing {} @ {} with {} @ {}",
                            previous.size,
                            previous.price,
                            size,
                            price
                        );
                    }
                    self.reduce_level(order_id, &previous, previous.size, true);
                    outcome = AddOutcome::Replaced;
                }
            }
        }

        if side.is_bid() {
            self.bids.add(price, size);
        } else {
            self.asks.add(price, size);
        }
        self.orders.insert(order_id, Order { side, price, size });
        self.stats.adds += 1;

        Ok(outcome)
    }

    /// Reduce a live order to `remaining_size`.
    ///
    /// Unknown ids and over-cancels (remaining above the tracked size) are
    /// no-ops. Reaching zero removes the order from its level's count and
    /// from the registry.
    pub fn cancel_order(&mut self, order_id: u64, remaining_size: u64) -> CancelOutcome {
        let Some(order) = self.orders.get(order_id).copied() else {
            self.stats.unknown_order_cancels += 1;
            log::debug!("Cancel for unknown order {order_id}");
            return CancelOutcome::UnknownOrder;
        };

        if remaining_size > order.size {
            self.stats.over_cancels += 1;
            if self.config.log_warnings {
                log::warn!(
                    "Over-cancel for order {order_id}: remaining={remaining_size} > tracked={}",
                    order.size
                );
            }
            return CancelOutcome::OverCancel;
        }

        let order_removed = remaining_size == 0;
        self.reduce_level(order_id, &order, order.size - remaining_size, order_removed);

        if order_removed {
            self.orders.remove(order_id);
            self.stats.orders_removed += 1;
        } else if let Some(live) = self.orders.get_mut(order_id) {
            live.size = remaining_size;
        }
        self.stats.cancels_applied += 1;

        CancelOutcome::Applied { order_removed }
    }

    /// Record that a trade or fill referenced `order_id`.
    #[inline]
    pub fn record_pending(&mut self, order_id: u64, kind: ExecutionKind) {
        match kind {
            ExecutionKind::Trade => self.stats.trades_recorded += 1,
            ExecutionKind::Fill => self.stats.fills_recorded += 1,
        }
        self.pending.record(order_id, kind);
    }

    /// Consume the pending marker for `order_id`.
    #[inline]
    pub fn resolve_pending(&mut self, order_id: u64) -> CancelResolution {
        let resolution = self.pending.resolve(order_id);
        if resolution == CancelResolution::Execution {
            self.stats.executions_resolved += 1;
        }
        resolution
    }

    /// Zero-based rank of `price` on `side` (0 = best), or `None` when no
    /// level exists at exactly that price.
    #[inline]
    pub fn depth_of(&self, side: Side, price: Price) -> Option<usize> {
        self.side_book(side)?.depth_of(price)
    }

    /// Reset both sides, the registry, the pending tracker and statistics.
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.orders.clear();
        self.pending.clear();
        self.stats = BookStats::default();
    }

    /// Take `amount` off the level holding `order`.
    #[inline(always)]
    fn reduce_level(&mut self, order_id: u64, order: &Order, amount: u64, order_gone: bool) {
        let book = match order.side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
            Side::None => return,
        };

        match book.reduce(order.price, amount, order_gone) {
            None => {
                self.stats.missing_level_cancels += 1;
                if self.config.log_warnings {
                    log::warn!(
                        "No {:?} level at {} for order {order_id}",
                        order.side,
                        order.price
                    );
                }
            }
            Some(reduction) if reduction.orphaned_orders > 0 => {
                self.stats.orphaned_level_removals += 1;
                if self.config.log_warnings {
                    log::warn!(
                        "{:?} level {} emptied with {} order(s) still counted",
                        order.side,
                        order.price,
                        reduction.orphaned_orders
                    );
                }
            }
            Some(_) => {}
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Side book for `side` (`None` for [`Side::None`]).
    #[inline]
    pub fn side_book(&self, side: Side) -> Option<&SideBook> {
        match side {
            Side::Bid => Some(&self.bids),
            Side::Ask => Some(&self.asks),
            Side::None => None,
        }
    }

    /// Bid side.
    #[inline]
    pub fn bids(&self) -> &SideBook {
        &self.bids
    }

    /// Ask side.
    #[inline]
    pub fn asks(&self) -> &SideBook {
        &self.asks
    }

    /// Level at exactly `price` on `side`.
    #[inline]
    pub fn level(&self, side: Side, price: Price) -> Option<&PriceLevel> {
        self.side_book(side)?.get(price)
    }

    /// Live order by id.
    #[inline]
    pub fn order(&self, order_id: u64) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Iterate over all live orders.
    pub fn orders(&self) -> impl Iterator<Item = (u64, &Order)> {
        self.orders.iter()
    }

    /// Get number of live orders.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Get number of price levels on `side`.
    #[inline]
    pub fn level_count(&self, side: Side) -> usize {
        self.side_book(side).map_or(0, SideBook::len)
    }

    /// Number of outstanding pending-execution markers.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Highest bid price.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best().map(|(price, _)| price)
    }

    /// Lowest ask price.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best().map(|(price, _)| price)
    }

    /// Get current statistics.
    pub fn stats(&self) -> &BookStats {
        &self.stats
    }

    /// Snapshot of the top `levels` ranks per side.
    pub fn snapshot(&self, levels: usize) -> BookSnapshot {
        let mut snapshot = BookSnapshot::new(levels);
        self.snapshot_into(&mut snapshot);
        snapshot
    }

    /// Fill an existing snapshot buffer in place (no allocation).
    #[inline]
    pub fn snapshot_into(&self, snapshot: &mut BookSnapshot) {
        snapshot.fill_side(Side::Bid, self.bids.iter());
        snapshot.fill_side(Side::Ask, self.asks.iter());
    }

    /// Recompute every level from the registry and compare with the stored
    /// aggregates (O(orders + levels)).
    ///
    /// # Errors
    /// Returns `MbpError::InconsistentState` describing the first mismatch.
    pub fn verify_invariants(&self) -> Result<()> {
        use std::collections::BTreeMap;

        let mut shadow: BTreeMap<(u8, Price), (u64, u32)> = BTreeMap::new();
        for (_, order) in self.orders.iter() {
            let entry = shadow.entry((order.side.to_byte(), order.price)).or_default();
            entry.0 += order.size;
            entry.1 += 1;
        }

        for book in [&self.bids, &self.asks] {
            for (price, level) in book.iter() {
                let expected = shadow
                    .remove(&(book.side().to_byte(), price))
                    .unwrap_or_default();
                if expected != (level.total_size(), level.order_count()) {
                    return Err(MbpError::InconsistentState(format!(
                        "{:?} level {price}: stored ({}, {}) != registry ({}, {})",
                        book.side(),
                        level.total_size(),
                        level.order_count(),
                        expected.0,
                        expected.1
                    )));
                }
            }
        }

        if let Some(((side, price), (size, count))) = shadow.into_iter().next() {
            return Err(MbpError::InconsistentState(format!(
                "{} order(s) totalling {size} at {price} on side {} have no level",
                count, side as char
            )));
        }

        Ok(())
    }
}
