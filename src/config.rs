use crate::types::DriverKind;

/// What to do when the driver hands back a row whose width differs from the declared columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldCountPolicy {
    /// Fail the advance with `FieldCountMismatch`; the cursor keeps its previous position.
    #[default]
    Strict,
    /// Pad missing cells with NULL and drop extra cells, logging a warning.
    Tolerate,
}

/// How timestamp text without an offset is treated for `ColumnKind::Timestamp` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NaiveTimestampPolicy {
    /// Refuse to guess a zone; coercion fails.
    #[default]
    Reject,
    /// Interpret the wall-clock text as UTC.
    AssumeUtc,
}

/// Options for configuring a cursor.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorOptions {
    pub driver: DriverKind,
    pub field_count_policy: FieldCountPolicy,
    pub naive_timestamps: NaiveTimestampPolicy,
}

impl CursorOptions {
    #[must_use]
    pub fn new(driver: DriverKind) -> Self {
        Self {
            driver,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_field_count_policy(mut self, policy: FieldCountPolicy) -> Self {
        self.field_count_policy = policy;
        self
    }

    #[must_use]
    pub fn with_naive_timestamps(mut self, policy: NaiveTimestampPolicy) -> Self {
        self.naive_timestamps = policy;
        self
    }

    #[must_use]
    pub fn builder(driver: DriverKind) -> CursorOptionsBuilder {
        CursorOptionsBuilder::new(driver)
    }
}

/// Fluent builder for cursor options.
#[derive(Debug, Clone)]
pub struct CursorOptionsBuilder {
    opts: CursorOptions,
}

impl CursorOptionsBuilder {
    #[must_use]
    pub fn new(driver: DriverKind) -> Self {
        Self {
            opts: CursorOptions::new(driver),
        }
    }

    #[must_use]
    pub fn field_count_policy(mut self, policy: FieldCountPolicy) -> Self {
        self.opts.field_count_policy = policy;
        self
    }

    #[must_use]
    pub fn naive_timestamps(mut self, policy: NaiveTimestampPolicy) -> Self {
        self.opts.naive_timestamps = policy;
        self
    }

    #[must_use]
    pub fn finish(self) -> CursorOptions {
        self.opts
    }
}
