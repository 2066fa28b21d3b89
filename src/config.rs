//! Configuration for rowtable
//!
//! Open-time options for a table, with sensible defaults.

/// Extra records reserved on every growth, amortizing remaps across appends
pub const DEFAULT_GROWTH_SLACK: usize = 4096;

/// Options used when opening a [`Table`](crate::Table)
#[derive(Debug, Clone)]
pub struct TableConfig {
    // -------------------------------------------------------------------------
    // Sizing
    // -------------------------------------------------------------------------
    /// Records the mapping must hold right after open. The file is grown to
    /// fit this many records but is never shrunk.
    pub minimum_capacity: usize,

    /// Records reserved beyond the immediate need whenever a mutation has to grow the file
    pub growth_slack: usize,

    // -------------------------------------------------------------------------
    // Mapping
    // -------------------------------------------------------------------------
    /// Use the host page cache normally. When false, every map and remap
    /// first evicts the file's cached pages (a hint, not a bypass on Linux)
    /// and disables readahead on the mapping. Performance only.
    pub use_page_cache: bool,

    // -------------------------------------------------------------------------
    // Startup checks
    // -------------------------------------------------------------------------
    /// Walk the live range on open and fail if row ids are not strictly ascending
    pub validate_order: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            minimum_capacity: 0,
            growth_slack: DEFAULT_GROWTH_SLACK,
            use_page_cache: true,
            validate_order: false,
        }
    }
}

impl TableConfig {
    /// Create a new config builder
    pub fn builder() -> TableConfigBuilder {
        TableConfigBuilder::default()
    }
}

/// Builder for TableConfig
#[derive(Default)]
pub struct TableConfigBuilder {
    config: TableConfig,
}

impl TableConfigBuilder {
    /// Set the minimum record capacity reserved on open
    pub fn minimum_capacity(mut self, records: usize) -> Self {
        self.config.minimum_capacity = records;
        self
    }

    /// Set the number of extra records reserved on growth
    pub fn growth_slack(mut self, records: usize) -> Self {
        self.config.growth_slack = records;
        self
    }

    /// Toggle use of the host page cache
    pub fn use_page_cache(mut self, enabled: bool) -> Self {
        self.config.use_page_cache = enabled;
        self
    }

    /// Toggle the order check performed on open
    pub fn validate_order(mut self, enabled: bool) -> Self {
        self.config.validate_order = enabled;
        self
    }

    pub fn build(self) -> TableConfig {
        self.config
    }
}
