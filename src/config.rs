//! Builder configuration.

/// How the Arrow builder treats a column that some rows do not mention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MissingColumns {
    /// Append a null for every row that lacks the column, including rows added
    /// before the column first appeared.
    #[default]
    NullFill,
    /// Fail the `add` call of any row whose key set differs from the first row's.
    Reject,
}

/// Options shared by the block builders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuilderConfig {
    /// Expected row count, used to pre-size pending buffers.
    pub capacity: usize,
    /// Policy for columns absent from some rows.
    pub missing_columns: MissingColumns,
}

impl BuilderConfig {
    /// Set [`BuilderConfig::capacity`].
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set [`BuilderConfig::missing_columns`].
    #[must_use]
    pub fn with_missing_columns(mut self, policy: MissingColumns) -> Self {
        self.missing_columns = policy;
        self
    }
}
