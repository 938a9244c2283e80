//! Run-wide symbol naming.

/// Monotonic source of unique solver symbol names.
///
/// One instance is owned by the pipeline driver for the whole run and lent to the
/// composer and search engine, so names never collide across chains.
#[derive(Debug, Default, Clone)]
pub struct SymbolNames {
    next: u64,
}

impl SymbolNames {
    /// Creates a counter that has issued no names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `"{prefix}{n}"` for the next counter value.
    pub fn fresh(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{prefix}{}", self.next)
    }

    /// Number of names handed out so far.
    pub fn issued(&self) -> u64 {
        self.next
    }
}
