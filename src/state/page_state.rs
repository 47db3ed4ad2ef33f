/// Page state definitions for the fetch/parse state machine
///
/// A page starts `Unprocessed` and moves exactly once into one of the two
/// terminal states. There is no transition out of a terminal state.
use std::fmt;

/// Represents the current state of a page in the crawl process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PageState {
    /// Page has been discovered but not fetched yet
    #[default]
    Unprocessed,

    /// Page was fetched and its links were extracted
    Processed,

    /// The main fetch failed (network error, timeout or HTTP error status)
    Errored,
}

impl PageState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unprocessed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Errored)
    }

    /// Returns true if moving from `self` to `to` is allowed
    pub fn can_transition_to(&self, to: PageState) -> bool {
        matches!(
            (self, to),
            (Self::Unprocessed, Self::Processed) | (Self::Unprocessed, Self::Errored)
        )
    }

    /// Converts the page state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Unprocessed => "unprocessed",
            Self::Processed => "processed",
            Self::Errored => "errored",
        }
    }

    /// Parses a page state from its database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "unprocessed" => Some(Self::Unprocessed),
            "processed" => Some(Self::Processed),
            "errored" => Some(Self::Errored),
            _ => None,
        }
    }

    /// Compact encoding used for lock-free reads of a page's state
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            Self::Unprocessed => 0,
            Self::Processed => 1,
            Self::Errored => 2,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Processed,
            2 => Self::Errored,
            _ => Self::Unprocessed,
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unprocessed => "Unprocessed",
            Self::Processed => "Processed",
            Self::Errored => "Errored",
        };
        write!(f, "{}", s)
    }
}
