//! Integer classification tag carried by every [`CodedError`](crate::CodedError).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Open-ended error classification code.
///
/// This is a newtype over `i32` rather than a closed enum: downstream crates
/// mint their own codes with [`ErrorCode::new`] in whatever numeric range they
/// own. The three associated constants are reserved conventions, not an
/// exhaustive set.
///
/// ```
/// use coded_errors::ErrorCode;
///
/// const QUOTA_EXCEEDED: ErrorCode = ErrorCode::new(1003);
/// assert_ne!(QUOTA_EXCEEDED, ErrorCode::GENERIC);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ErrorCode(i32);

impl ErrorCode {
    /// No classification. Also what [`code_of`](crate::code_of) reports for
    /// errors that are not a `CodedError`.
    pub const NONE: Self = Self(0);
    /// Default classification used when none is given.
    pub const GENERIC: Self = Self(1);
    /// Something that was looked up does not exist.
    pub const NOT_FOUND: Self = Self(2);

    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    /// Name of a reserved code, `None` for caller-defined codes.
    #[must_use]
    pub const fn reserved_name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("NONE"),
            1 => Some("GENERIC"),
            2 => Some("NOT_FOUND"),
            _ => None,
        }
    }
}

impl From<i32> for ErrorCode {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Returned by [`ErrorCode::from_str`] for input that is neither an integer
/// nor a reserved name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code '{input}': expected an integer or one of NONE, GENERIC, NOT_FOUND")]
pub struct ParseErrorCodeError {
    input: String,
}

impl FromStr for ErrorCode {
    type Err = ParseErrorCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<i32>() {
            return Ok(Self(value));
        }
        [Self::NONE, Self::GENERIC, Self::NOT_FOUND]
            .into_iter()
            .find(|code| {
                code.reserved_name()
                    .is_some_and(|name| name.eq_ignore_ascii_case(trimmed))
            })
            .ok_or_else(|| ParseErrorCodeError {
                input: s.to_owned(),
            })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn reserved_values_are_distinct() {
        assert_eq!(ErrorCode::NONE.get(), 0);
        assert_eq!(ErrorCode::GENERIC.get(), 1);
        assert_eq!(ErrorCode::NOT_FOUND.get(), 2);
        assert_eq!(ErrorCode::default(), ErrorCode::NONE);
        assert!(ErrorCode::NONE.is_none());
        assert!(!ErrorCode::GENERIC.is_none());
    }

    #[test]
    fn callers_can_mint_their_own_codes() {
        let custom = ErrorCode::new(-7);
        assert_eq!(i32::from(custom), -7);
        assert_eq!(ErrorCode::from(4040), ErrorCode::new(4040));
        assert_eq!(custom.reserved_name(), None);
    }

    #[test]
    fn display_is_the_integer() {
        assert_eq!(ErrorCode::NOT_FOUND.to_string(), "2");
        assert_eq!(format!("{:>4}", ErrorCode::new(7)), "   7");
    }

    #[test]
    fn parses_integers_and_reserved_names() {
        assert_eq!("1001".parse::<ErrorCode>(), Ok(ErrorCode::new(1001)));
        assert_eq!(" -3 ".parse::<ErrorCode>(), Ok(ErrorCode::new(-3)));
        assert_eq!("not_found".parse::<ErrorCode>(), Ok(ErrorCode::NOT_FOUND));
        assert_eq!("Generic".parse::<ErrorCode>(), Ok(ErrorCode::GENERIC));
        assert_eq!("NONE".parse::<ErrorCode>(), Ok(ErrorCode::NONE));
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "MISSING".parse::<ErrorCode>().unwrap_err();
        assert!(err.to_string().contains("'MISSING'"));
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_string(&ErrorCode::NOT_FOUND).unwrap();
        assert_eq!(json, "2");
        let back: ErrorCode = serde_json::from_str("1001").unwrap();
        assert_eq!(back, ErrorCode::new(1001));
    }
}
