//! One side of the book: price levels kept in best-first order.
//!
//! Levels live in a `BTreeMap` keyed by [`Price`], so insertion and removal
//! are O(log levels). The map is always ascending; bid iteration walks it in
//! reverse so that index 0 is the best price on both sides.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::iter::Rev;

use crate::lob::price_level::PriceLevel;
use crate::types::{Price, Side};

/// Result of removing size from a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelReduction {
    /// Size actually taken off the level
    pub removed: u64,
    /// The level reached zero size and was erased
    pub level_removed: bool,
    /// Orders still counted at the level when it was erased
    pub orphaned_orders: u32,
}

/// Ordered price levels for one side of the book.
#[derive(Debug, Clone)]
pub struct SideBook {
    side: Side,
    levels: BTreeMap<Price, PriceLevel>,
}

impl SideBook {
    /// Create an empty side. `side` must be [`Side::Bid`] or [`Side::Ask`].
    pub fn new(side: Side) -> Self {
        debug_assert!(side != Side::None, "a side book needs a direction");
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// Which side this book holds.
    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Number of distinct price levels.
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level at exactly `price`, if any.
    #[inline]
    pub fn get(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// Rest a new order of `size` at `price`, creating the level if needed.
    #[inline]
    pub fn add(&mut self, price: Price, size: u64) {
        match self.levels.entry(price) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(PriceLevel::with_order(size));
            }
            btree_map::Entry::Occupied(mut entry) => entry.get_mut().add_order(size),
        }
    }

    /// Take `amount` off the level at `price`.
    ///
    /// Returns `None` when no level exists at that price. A level whose total
    /// reaches zero is removed regardless of its order count.
    pub fn reduce(&mut self, price: Price, amount: u64, order_gone: bool) -> Option<LevelReduction> {
        let btree_map::Entry::Occupied(mut entry) = self.levels.entry(price) else {
            return None;
        };

        let removed = entry.get_mut().reduce(amount, order_gone);
        if entry.get().is_empty() {
            let level = entry.remove();
            Some(LevelReduction {
                removed,
                level_removed: true,
                orphaned_orders: level.order_count(),
            })
        } else {
            Some(LevelReduction {
                removed,
                level_removed: false,
                orphaned_orders: 0,
            })
        }
    }

    /// Best level (highest bid / lowest ask).
    #[inline]
    pub fn best(&self) -> Option<(Price, &PriceLevel)> {
        self.iter().next()
    }

    /// Iterate levels best-first.
    pub fn iter(&self) -> Levels<'_> {
        match self.side {
            Side::Bid => Levels::Descending(self.levels.iter().rev()),
            _ => Levels::Ascending(self.levels.iter()),
        }
    }

    /// Zero-based rank of `price` in best-first order, or `None` when no
    /// level exists at exactly that price.
    pub fn depth_of(&self, price: Price) -> Option<usize> {
        if !self.levels.contains_key(&price) {
            return None;
        }
        self.iter().position(|(p, _)| p == price)
    }

    /// Remove all levels.
    pub fn clear(&mut self) {
        self.levels.clear();
    }
}

/// Best-first iterator over a side's levels.
pub enum Levels<'a> {
    Ascending(btree_map::Iter<'a, Price, PriceLevel>),
    Descending(Rev<btree_map::Iter<'a, Price, PriceLevel>>),
}

impl<'a> Iterator for Levels<'a> {
    type Item = (Price, &'a PriceLevel);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let next = match self {
            Levels::Ascending(iter) => iter.next(),
            Levels::Descending(iter) => iter.next(),
        };
        next.map(|(price, level)| (*price, level))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Levels::Ascending(iter) => iter.size_hint(),
            Levels::Descending(iter) => iter.size_hint(),
        }
    }
}

impl ExactSizeIterator for Levels<'_> {}
