use std::collections::VecDeque;

/// Rolling record of whether the position sat at its limit on recent ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidationWindow {
    pins: VecDeque<bool>,
    capacity: usize,
}

impl Default for LiquidationWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl LiquidationWindow {
    pub const DEFAULT_CAPACITY: usize = 10;

    pub fn new(capacity: usize) -> Self {
        Self {
            pins: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Restores a window from its persisted form, keeping only the newest `capacity` entries.
    pub fn from_pins(pins: Vec<bool>, capacity: usize) -> Self {
        let skip = pins.len().saturating_sub(capacity);
        Self {
            pins: pins.into_iter().skip(skip).collect(),
            capacity,
        }
    }

    pub fn push(&mut self, pinned: bool) {
        self.pins.push_back(pinned);
        while self.pins.len() > self.capacity {
            self.pins.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.pins.len() == self.capacity
    }

    fn pinned_count(&self) -> usize {
        self.pins.iter().filter(|pinned| **pinned).count()
    }

    /// Full window, at least half of it pinned, and pinned right now.
    pub fn soft_liquidate(&self) -> bool {
        self.is_full()
            && self.pinned_count() * 2 >= self.capacity
            && self.pins.back().copied().unwrap_or(false)
    }

    /// Full window with every entry pinned.
    pub fn hard_liquidate(&self) -> bool {
        self.is_full() && self.pins.iter().all(|pinned| *pinned)
    }

    /// Oldest first.
    pub fn to_pins(&self) -> Vec<bool> {
        self.pins.iter().copied().collect()
    }
}
