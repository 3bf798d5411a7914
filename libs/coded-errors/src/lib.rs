#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Errors that carry an integer classification code.
//!
//! A [`CodedError`] is a rendered message plus an [`ErrorCode`], so callers
//! can branch on the category of a failure without matching on message text
//! or knowing the concrete error type:
//!
//! ```
//! use coded_errors::{ErrorCode, append_error, coded_error_with_code, is};
//!
//! let lookup = coded_error_with_code!(ErrorCode::NOT_FOUND, "user %d missing", 42);
//! let err = append_error!(lookup, "loading profile");
//!
//! assert_eq!(err.to_string(), "loading profile|user 42 missing");
//! assert!(is(&err, ErrorCode::NOT_FOUND));
//! ```
//!
//! The crate provides:
//! - [`ErrorCode`], an open integer tag with three reserved values
//! - constructors ([`new`], [`new_with_code`]) and context chaining
//!   ([`append`], [`append_with_code`]), plus macro front-ends
//! - classification ([`is`], [`code_of`], [`ErrorCodeExt`])
//! - a printf-style renderer ([`format`]) used for messages
//! - an optional named-code registry ([`CodeCatalog`]) loadable from YAML

mod macros;

pub mod catalog;
pub mod code;
pub mod config;
pub mod error;
pub mod format;

pub use catalog::{CatalogError, CodeCatalog, CodeDef};
pub use code::{ErrorCode, ParseErrorCodeError};
pub use config::{CatalogConfig, CodeEntry, ConfigError};
pub use error::{
    APPEND_SEPARATOR, CodedError, ErrorCodeExt, append, append_with_code, code_of, is, new,
    new_with_code,
};
pub use format::{Arg, render, sprintf};

/// Result alias for functions that fail with a [`CodedError`].
pub type CodedResult<T> = Result<T, CodedError>;
