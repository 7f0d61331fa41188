/// Page status definitions for tracking crawl progress
///
/// A page is pending until exactly one of its terminal timestamps is written.
use std::fmt;

/// Represents the current status of a page in the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageStatus {
    /// Discovered or seeded, not yet fetched
    Pending,

    /// Retrieved successfully; content is stored
    Fetched,

    /// Terminal failure; error text is stored
    Failed,
}

impl PageStatus {
    /// Derives the status from the presence of the terminal timestamps
    ///
    /// `fetched` wins if both are somehow set, since content is only stored
    /// alongside it.
    pub fn from_timestamps(fetched: bool, failed: bool) -> Self {
        match (fetched, failed) {
            (true, _) => Self::Fetched,
            (false, true) => Self::Failed,
            (false, false) => Self::Pending,
        }
    }

    /// Returns true for `Fetched` and `Failed`
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// SQL predicate selecting rows in this status
    pub fn sql_predicate(&self) -> &'static str {
        match self {
            Self::Pending => "fetched IS NULL AND failed IS NULL",
            Self::Fetched => "fetched IS NOT NULL",
            Self::Failed => "fetched IS NULL AND failed IS NOT NULL",
        }
    }

    /// Returns all possible page statuses
    pub fn all() -> [Self; 3] {
        [Self::Pending, Self::Fetched, Self::Failed]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetched => "fetched",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_timestamps() {
        assert_eq!(PageStatus::from_timestamps(false, false), PageStatus::Pending);
        assert_eq!(PageStatus::from_timestamps(true, false), PageStatus::Fetched);
        assert_eq!(PageStatus::from_timestamps(false, true), PageStatus::Failed);
    }

    #[test]
    fn test_is_terminal() {
        assert!(!PageStatus::Pending.is_terminal());
        assert!(PageStatus::Fetched.is_terminal());
        assert!(PageStatus::Failed.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PageStatus::Pending), "pending");
        assert_eq!(format!("{}", PageStatus::Fetched), "fetched");
        assert_eq!(format!("{}", PageStatus::Failed), "failed");
    }
}
