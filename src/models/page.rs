//! Stateless cursor/offset pagination.
//!
//! A [`PageWindow`] is a pure function of `(page, page_size)`, so any
//! consumer can restart from an arbitrary page number without
//! server-side cursor state.

use serde::{Deserialize, Serialize};

/// One page worth of row offsets. Invariant: `to = from + page_size - 1`
/// and `from = (page - 1) * page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub page: u32,
    pub page_size: u32,
    pub from: u64,
    pub to: u64,
}

impl PageWindow {
    /// Window for a 1-based page number.
    pub fn new(page: u32, page_size: u32) -> Self {
        let page = page.max(1);
        let from = u64::from(page - 1) * u64::from(page_size);
        Self {
            page,
            page_size,
            from,
            to: from + u64::from(page_size) - 1,
        }
    }

    /// Whether rows exist beyond this window.
    pub fn has_more(&self, total_count: u64) -> bool {
        total_count > self.to + 1
    }

    /// The window after this one, or `None` once `total_count` is
    /// exhausted.
    pub fn next(&self, total_count: u64) -> Option<PageWindow> {
        if self.has_more(total_count) {
            Some(PageWindow::new(self.page + 1, self.page_size))
        } else {
            None
        }
    }

    /// Row count actually covered by this window given the total.
    pub fn effective_len(&self, total_count: u64) -> u64 {
        total_count.saturating_sub(self.from).min(u64::from(self.page_size))
    }
}
