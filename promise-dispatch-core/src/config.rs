//! Middleware configuration: lifecycle type tokens and delimiter
//!
//! Built once when the middleware is constructed and never mutated after;
//! every connected middleware holds its own copy.

use std::borrow::Cow;

/// Default token appended to pending action types.
pub const PENDING: &str = "PENDING";
/// Default token appended to fulfilled action types.
pub const FULFILLED: &str = "FULFILLED";
/// Default token appended to rejected action types.
pub const REJECTED: &str = "REJECTED";
/// Default separator between the base type and the lifecycle token.
pub const DEFAULT_DELIMITER: &str = "_";

/// The three tokens used to derive lifecycle action type names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncTypeSet {
    /// Token for the action emitted before the work settles.
    pub pending: Cow<'static, str>,
    /// Token for the action emitted on success.
    pub fulfilled: Cow<'static, str>,
    /// Token for the action emitted on failure.
    pub rejected: Cow<'static, str>,
}

/// The default token set, exported so consumers can build matching reducers.
pub const DEFAULT_TYPES: AsyncTypeSet = AsyncTypeSet {
    pending: Cow::Borrowed(PENDING),
    fulfilled: Cow::Borrowed(FULFILLED),
    rejected: Cow::Borrowed(REJECTED),
};

impl Default for AsyncTypeSet {
    fn default() -> Self {
        DEFAULT_TYPES
    }
}

impl AsyncTypeSet {
    /// Create a custom token set.
    pub fn new(
        pending: impl Into<Cow<'static, str>>,
        fulfilled: impl Into<Cow<'static, str>>,
        rejected: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            pending: pending.into(),
            fulfilled: fulfilled.into(),
            rejected: rejected.into(),
        }
    }
}

/// Complete middleware configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Lifecycle type tokens.
    pub types: AsyncTypeSet,
    /// Separator between the base type and the token.
    pub type_delimiter: Cow<'static, str>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            types: DEFAULT_TYPES,
            type_delimiter: Cow::Borrowed(DEFAULT_DELIMITER),
        }
    }
}

impl Config {
    /// Configuration with custom tokens and the default `"_"` delimiter.
    pub fn with_types(types: AsyncTypeSet) -> Self {
        Self {
            types,
            type_delimiter: Cow::Borrowed(DEFAULT_DELIMITER),
        }
    }

    /// Replace the delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<Cow<'static, str>>) -> Self {
        self.type_delimiter = delimiter.into();
        self
    }
}
