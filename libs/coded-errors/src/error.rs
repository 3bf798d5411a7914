//! [`CodedError`] plus the free functions that build, chain and classify it.

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};

use crate::code::ErrorCode;
use crate::format::{Arg, render};

/// Placed between the appended message and the prior error's text.
pub const APPEND_SEPARATOR: &str = "|";

/// An error message paired with an [`ErrorCode`].
///
/// The message is rendered once at construction and never changes; `Display`
/// prints it verbatim. There is no `source()` chain: [`append`] folds the
/// prior error into the message text instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
#[must_use]
pub struct CodedError {
    message: String,
    code: ErrorCode,
}

impl CodedError {
    /// Wraps an already rendered message. No `%` directives are interpreted.
    pub fn from_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    #[must_use]
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }

    #[must_use]
    pub fn into_message(self) -> String {
        self.message
    }
}

/// Builds a [`ErrorCode::GENERIC`] error.
///
/// `args` are substituted into `format` printf-style. With no arguments the
/// format string is taken as-is, so `new("50% off", &[])` keeps its `%`.
pub fn new(format: &str, args: &[Arg]) -> CodedError {
    new_with_code(ErrorCode::GENERIC, format, args)
}

/// Like [`new`] with an explicit code.
pub fn new_with_code(code: ErrorCode, format: &str, args: &[Arg]) -> CodedError {
    CodedError::from_message(code, render(format, args))
}

/// Adds context in front of `prior`: the message becomes
/// `"<rendered format>|<prior>"`.
///
/// The code is inherited when `prior` is a [`CodedError`], otherwise it is
/// [`ErrorCode::GENERIC`].
pub fn append(prior: &(dyn StdError + 'static), format: &str, args: &[Arg]) -> CodedError {
    let code = prior
        .downcast_ref::<CodedError>()
        .map_or(ErrorCode::GENERIC, CodedError::code);
    append_with_code(prior, code, format, args)
}

/// Like [`append`], but the result always carries `code` regardless of what
/// `prior` was classified as.
pub fn append_with_code(
    prior: &(dyn StdError + 'static),
    code: ErrorCode,
    format: &str,
    args: &[Arg],
) -> CodedError {
    let mut message = render(format, args);
    message.push_str(APPEND_SEPARATOR);
    message.push_str(&prior.to_string());
    CodedError::from_message(code, message)
}

/// Whether `error` is a [`CodedError`] carrying `code`.
///
/// Errors of any other type never match, not even [`ErrorCode::NONE`].
#[must_use]
pub fn is(error: &(dyn StdError + 'static), code: ErrorCode) -> bool {
    error
        .downcast_ref::<CodedError>()
        .is_some_and(|coded| coded.code == code)
}

/// Code of a [`CodedError`], [`ErrorCode::NONE`] for any other error.
///
/// A `CodedError` explicitly tagged `NONE` and an error of a foreign type
/// both yield `NONE`; use [`is`] or a downcast when the difference matters.
#[must_use]
pub fn code_of(error: &(dyn StdError + 'static)) -> ErrorCode {
    error
        .downcast_ref::<CodedError>()
        .map_or(ErrorCode::NONE, CodedError::code)
}

/// Classification helpers on the error types callers usually hold.
pub trait ErrorCodeExt {
    /// The `CodedError` behind this value, if it is one.
    #[must_use]
    fn as_coded(&self) -> Option<&CodedError>;

    /// See [`code_of`].
    #[must_use]
    fn error_code(&self) -> ErrorCode {
        self.as_coded().map_or(ErrorCode::NONE, CodedError::code)
    }

    /// See [`is`].
    #[must_use]
    fn has_code(&self, code: ErrorCode) -> bool {
        self.as_coded().is_some_and(|coded| coded.code == code)
    }
}

impl ErrorCodeExt for CodedError {
    fn as_coded(&self) -> Option<&CodedError> {
        Some(self)
    }
}

impl ErrorCodeExt for dyn StdError + 'static {
    fn as_coded(&self) -> Option<&CodedError> {
        self.downcast_ref()
    }
}

impl ErrorCodeExt for dyn StdError + Send + Sync + 'static {
    fn as_coded(&self) -> Option<&CodedError> {
        self.downcast_ref()
    }
}

impl ErrorCodeExt for anyhow::Error {
    fn as_coded(&self) -> Option<&CodedError> {
        self.downcast_ref()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io;

    fn foreign(msg: &str) -> io::Error {
        io::Error::other(msg.to_owned())
    }

    #[test]
    fn new_defaults_to_generic() {
        let err = new("foo", &[]);
        assert_eq!(err.message(), "foo");
        assert_eq!(err.code(), ErrorCode::GENERIC);
        assert_eq!(err.to_string(), "foo");
    }

    #[test]
    fn zero_args_keep_percent_signs() {
        assert_eq!(new("50% off", &[]).message(), "50% off");
        assert_eq!(new("%d%% off", &[50.into()]).message(), "50% off");
    }

    #[test]
    fn new_with_code_substitutes_and_tags() {
        let err = new_with_code(ErrorCode::NOT_FOUND, "user %d missing", &[42.into()]);
        assert_eq!(err.message(), "user 42 missing");
        assert!(is(&err, ErrorCode::NOT_FOUND));
        assert!(!is(&err, ErrorCode::GENERIC));
    }

    #[test]
    fn append_with_code_overrides_prior_code() {
        let err = append_with_code(&new("bar", &[]), ErrorCode::NOT_FOUND, "foo", &[]);
        assert_eq!(err.message(), "foo|bar");
        assert_eq!(code_of(&err), ErrorCode::NOT_FOUND);
    }

    #[test]
    fn append_inherits_coded_prior() {
        let prior = new_with_code(ErrorCode::new(77), "bar", &[]);
        let err = append(&prior, "foo %d %s", &[1.into(), "2".into()]);
        assert_eq!(err.message(), "foo 1 2|bar");
        assert_eq!(err.code(), ErrorCode::new(77));
    }

    #[test]
    fn append_on_foreign_prior_is_generic() {
        let err = append(&foreign("bar"), "", &[]);
        assert_eq!(err.message(), "|bar");
        assert_eq!(err.code(), ErrorCode::GENERIC);
    }

    #[test]
    fn prior_text_is_not_reinterpreted() {
        let prior = foreign("disk 100% full");
        let err = append(&prior, "writing %s", &["cache".into()]);
        assert_eq!(err.message(), "writing cache|disk 100% full");
    }

    #[test]
    fn foreign_errors_match_no_code() {
        let err = foreign("bar");
        for code in [ErrorCode::NONE, ErrorCode::GENERIC, ErrorCode::NOT_FOUND] {
            assert!(!is(&err, code));
        }
        assert_eq!(code_of(&err), ErrorCode::NONE);
    }

    #[test]
    fn none_is_ambiguous_through_code_of() {
        let tagged = new_with_code(ErrorCode::NONE, "", &[]);
        assert_eq!(code_of(&tagged), code_of(&foreign("")));
        // `is` still tells them apart.
        assert!(is(&tagged, ErrorCode::NONE));
        assert!(!is(&foreign(""), ErrorCode::NONE));
    }

    #[test]
    fn ext_trait_on_boxed_and_anyhow() {
        let boxed: Box<dyn StdError + Send + Sync> =
            Box::new(new_with_code(ErrorCode::NOT_FOUND, "gone", &[]));
        assert_eq!(boxed.error_code(), ErrorCode::NOT_FOUND);
        assert!(boxed.has_code(ErrorCode::NOT_FOUND));

        let any = anyhow::Error::new(new("plain", &[]));
        assert_eq!(any.error_code(), ErrorCode::GENERIC);

        let other = anyhow::anyhow!("not ours");
        assert_eq!(other.error_code(), ErrorCode::NONE);
        assert!(!other.has_code(ErrorCode::NONE));
    }

    #[test]
    fn serde_shape() {
        let err = new_with_code(ErrorCode::NOT_FOUND, "user %d missing", &[42.into()]);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "user 42 missing", "code": 2 })
        );
        let back: CodedError = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
    }
}
