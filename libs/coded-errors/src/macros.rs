//! Variadic front-ends for the constructors.
//!
//! Each trailing argument goes through [`Arg::from`](crate::Arg), so any type
//! with a `From` impl can be passed directly. Called with no arguments, the
//! macros forward an empty slice and the format string is used verbatim.

/// [`new`](crate::new) with inline arguments.
///
/// ```
/// use coded_errors::{coded_error, ErrorCode};
///
/// let err = coded_error!("retry %d of %d", 2, 5);
/// assert_eq!(err.message(), "retry 2 of 5");
/// assert_eq!(err.code(), ErrorCode::GENERIC);
/// assert_eq!(coded_error!("50% off").message(), "50% off");
/// ```
#[macro_export]
macro_rules! coded_error {
    ($format:expr $(,)?) => {
        $crate::new($format, &[])
    };
    ($format:expr, $($arg:expr),+ $(,)?) => {
        $crate::new($format, &[$($crate::Arg::from($arg)),+])
    };
}

/// [`new_with_code`](crate::new_with_code) with inline arguments.
///
/// ```
/// use coded_errors::{coded_error_with_code, ErrorCode};
///
/// let err = coded_error_with_code!(ErrorCode::NOT_FOUND, "user %d missing", 42);
/// assert!(err.is(ErrorCode::NOT_FOUND));
/// ```
#[macro_export]
macro_rules! coded_error_with_code {
    ($code:expr, $format:expr $(,)?) => {
        $crate::new_with_code($code, $format, &[])
    };
    ($code:expr, $format:expr, $($arg:expr),+ $(,)?) => {
        $crate::new_with_code($code, $format, &[$($crate::Arg::from($arg)),+])
    };
}

/// [`append`](crate::append) with inline arguments. `$prior` is borrowed.
///
/// ```
/// use coded_errors::{append_error, coded_error_with_code, ErrorCode};
///
/// let inner = coded_error_with_code!(ErrorCode::NOT_FOUND, "no such key");
/// let outer = append_error!(inner, "loading %s", "config.yaml");
/// assert_eq!(outer.message(), "loading config.yaml|no such key");
/// assert_eq!(outer.code(), ErrorCode::NOT_FOUND);
/// ```
#[macro_export]
macro_rules! append_error {
    ($prior:expr, $format:expr $(,)?) => {
        $crate::append(&$prior, $format, &[])
    };
    ($prior:expr, $format:expr, $($arg:expr),+ $(,)?) => {
        $crate::append(&$prior, $format, &[$($crate::Arg::from($arg)),+])
    };
}

/// [`append_with_code`](crate::append_with_code) with inline arguments.
#[macro_export]
macro_rules! append_error_with_code {
    ($prior:expr, $code:expr, $format:expr $(,)?) => {
        $crate::append_with_code(&$prior, $code, $format, &[])
    };
    ($prior:expr, $code:expr, $format:expr, $($arg:expr),+ $(,)?) => {
        $crate::append_with_code(&$prior, $code, $format, &[$($crate::Arg::from($arg)),+])
    };
}

/// Returns early with a coded error converted into the function's error type.
///
/// ```
/// use coded_errors::{bail_coded, ErrorCode, CodedResult};
///
/// fn find(id: u32) -> CodedResult<()> {
///     bail_coded!(ErrorCode::NOT_FOUND, "item %d missing", id);
/// }
/// assert_eq!(find(3).unwrap_err().message(), "item 3 missing");
/// ```
#[macro_export]
macro_rules! bail_coded {
    ($code:expr, $($rest:tt)+) => {
        return ::core::result::Result::Err(
            ::core::convert::From::from($crate::coded_error_with_code!($code, $($rest)+)),
        )
    };
}
