//! Price level with cached aggregates.
//!
//! A `PriceLevel` holds the total resting size and the number of live orders
//! at one price on one side. Individual order sizes live in the order
//! registry; the level is only ever adjusted by deltas, never recomputed.
//!
//! # Invariant
//!
//! While a level is stored in a side book, `total_size > 0` and
//! `order_count > 0`. A level whose total reaches zero is removed by the side
//! book immediately, even when its count did not reach zero.
//!
//! # Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `add_order` | O(1) |
//! | `reduce` | O(1) |
//! | `total_size` | O(1) |
//! | `order_count` | O(1) |

/// Aggregated state of all live orders at one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceLevel {
    /// Sum of remaining sizes of live orders at this price
    total_size: u64,
    /// Number of live orders at this price
    order_count: u32,
}

impl PriceLevel {
    /// Create a new empty price level.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a level holding a single order.
    #[inline]
    pub fn with_order(size: u64) -> Self {
        Self {
            total_size: size,
            order_count: 1,
        }
    }

    /// Account for a new order resting at this level.
    #[inline]
    pub fn add_order(&mut self, size: u64) {
        self.total_size = self.total_size.saturating_add(size);
        self.order_count = self.order_count.saturating_add(1);
    }

    /// Remove `amount` of resting size; when `order_gone` is set, one order
    /// has left the level entirely.
    ///
    /// Returns the size actually removed (clamped to the current total).
    #[inline]
    pub fn reduce(&mut self, amount: u64, order_gone: bool) -> u64 {
        let removed = amount.min(self.total_size);
        self.total_size -= removed;
        if order_gone {
            self.order_count = self.order_count.saturating_sub(1);
        }
        removed
    }

    /// Get the cached total size (O(1)).
    #[inline]
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Get the number of orders at this price level.
    #[inline]
    pub fn order_count(&self) -> u32 {
        self.order_count
    }

    /// A level is empty once no size rests at it.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total_size == 0
    }
}
