//! Terminal viewport geometry.
//!
//! One row is reserved at the top for the reference bar and one at the
//! bottom for the status bar; everything between is the content region.
//! All other components read [`Viewport::content_rows`] rather than asking
//! the terminal directly.

/// Terminal dimensions and the usable content region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Total terminal rows.
    pub rows: u16,
    /// Total terminal columns.
    pub cols: u16,
    /// Rows available for content: `max(1, rows - 2)`.
    pub content_rows: usize,
}

impl Viewport {
    /// Build a viewport from the reported terminal size.
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            content_rows: usize::from(rows.saturating_sub(2)).max(1),
        }
    }

    /// Recompute after the host terminal reports a size change.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        *self = Self::new(rows, cols);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(24, 80)
    }
}
