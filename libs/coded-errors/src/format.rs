//! printf-style message rendering with dynamically typed arguments.
//!
//! Directives have the shape `%[flags][width][.precision]verb` and consume
//! arguments left to right:
//!
//! | kind              | verbs                     |
//! |-------------------|---------------------------|
//! | every kind        | `v` (default form)        |
//! | `Int`, `Uint`     | `d b o x X c q`           |
//! | `Float`, `Float32`| `f F e E g G`             |
//! | `Str`             | `s q x X`                 |
//! | `Bool`            | `t`                       |
//! | `Char`            | `c q d x X`               |
//!
//! Flags are `-` (left-justify), `+` (always print a sign), ` ` (space for
//! the sign), `#` (`0x`/`0X`/`0b`/`0` prefixes) and `0` (zero padding). `%%` prints a percent sign without consuming an argument.
//! A `*` in place of the width or precision takes its value from the next
//! argument, which must be an integer; a negative `*` width left-justifies
//! and a negative `*` precision is ignored.
//!
//! Rendering never fails. Mismatches between directives and arguments show
//! up in-band instead:
//!
//! - `%!d(MISSING)` for a directive with no argument left,
//! - `%!x(bool=true)` for a verb that does not apply to the argument,
//! - `%!(NOVERB)` for a `%` at the very end of the format,
//! - `%!(EXTRA int=1, string=a)` for arguments nothing consumed,
//! - `%!(BADWIDTH)` / `%!(BADPREC)` for a `*` with no integer to read.
//!
//! Known differences from Go's `fmt`:
//!
//! - integer arguments report their kind as `int`/`uint` whatever their
//!   source width, and chars report `char` rather than `int32`;
//! - `%q` escapes control characters only, every other character is
//!   printed as-is, and `%#q` does not switch to backquotes;
//! - argument indexes (`%[2]d`), `%T` and `%p` are not supported.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::code::ErrorCode;
use crate::error::CodedError;

/// Width and precision values above this are clamped.
const MAX_WIDTH: usize = 1 << 16;

const HEX_LOWER: &[u8; 16] = b"0123456789abcdef";
const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// A single formatting argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    Uint(u64),
    Float(f64),
    /// Kept apart from `Float` so `%v` prints the shortest `f32` digits.
    Float32(f32),
    Bool(bool),
    Char(char),
    Str(String),
}

impl Arg {
    /// Captures anything printable as a string argument.
    #[must_use]
    pub fn display(value: impl fmt::Display) -> Self {
        Self::Str(value.to_string())
    }

    /// Kind name used inside `%!verb(kind=value)` and `EXTRA` markers.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float64",
            Self::Float32(_) => "float32",
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
        }
    }
}

/// Same text `%v` produces.
impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_arg(&mut out, &Spec::plain(), self);
        f.write_str(&out)
    }
}

macro_rules! arg_from {
    ($variant:ident, $target:ty; $($source:ty),+) => {
        $(
            impl From<$source> for Arg {
                fn from(value: $source) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

arg_from!(Int, i64; i8, i16, i32, i64);
arg_from!(Uint, u64; u8, u16, u32, u64);
arg_from!(Float, f64; f64);
arg_from!(Float32, f32; f32);

impl From<isize> for Arg {
    fn from(value: isize) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Str(value.to_string()), Self::Int)
    }
}

impl From<usize> for Arg {
    fn from(value: usize) -> Self {
        u64::try_from(value).map_or_else(|_| Self::Str(value.to_string()), Self::Uint)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<char> for Arg {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<ErrorCode> for Arg {
    fn from(value: ErrorCode) -> Self {
        Self::Int(i64::from(value.get()))
    }
}

impl From<&CodedError> for Arg {
    fn from(value: &CodedError) -> Self {
        Self::Str(value.message().to_owned())
    }
}

/// Renders `format` with `args`, treating zero arguments as "no formatting".
///
/// With an empty `args` slice the format string is returned untouched, so
/// `render("50% off", &[])` is `"50% off"`. Otherwise this is [`sprintf`].
#[must_use]
pub fn render(format: &str, args: &[Arg]) -> String {
    if args.is_empty() {
        format.to_owned()
    } else {
        sprintf(format, args)
    }
}

/// Substitutes `args` into the directives of `format`.
///
/// Unlike [`render`] this always interprets the format string, so a lone
/// `"%"` becomes `"%!(NOVERB)"` even without arguments.
#[must_use]
pub fn sprintf(format: &str, args: &[Arg]) -> String {
    let mut out = String::with_capacity(format.len() + 16);
    let mut mismatch = Mismatch::default();
    let mut next = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(mut spec) = Spec::parse(&mut chars) else {
            out.push_str("%!(NOVERB)");
            mismatch.bad_verbs += 1;
            break;
        };
        if spec.flags.has(Flags::WIDTH_STAR) {
            if let Some(width) = star_value(next.next()) {
                if width < 0 {
                    spec.flags.insert(Flags::MINUS);
                }
                spec.width = Some(clamp(width.unsigned_abs()));
            } else {
                out.push_str("%!(BADWIDTH)");
                mismatch.bad_widths += 1;
            }
        }
        if spec.flags.has(Flags::PREC_STAR) {
            if let Some(precision) = star_value(next.next()) {
                // Negative means no precision at all.
                spec.precision = u64::try_from(precision).ok().map(clamp);
            } else {
                out.push_str("%!(BADPREC)");
                mismatch.bad_widths += 1;
            }
        }
        if spec.verb == '%' {
            out.push('%');
            continue;
        }
        if let Some(arg) = next.next() {
            if !write_arg(&mut out, &spec, arg) {
                mismatch.bad_verbs += 1;
            }
        } else {
            out.push_str("%!");
            out.push(spec.verb);
            out.push_str("(MISSING)");
            mismatch.missing += 1;
        }
    }

    let extra = next.as_slice();
    if !extra.is_empty() {
        mismatch.extra = extra.len();
        out.push_str("%!(EXTRA ");
        for (i, arg) in extra.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(arg.kind());
            out.push('=');
            write_arg(&mut out, &Spec::plain(), arg);
        }
        out.push(')');
    }

    if mismatch.any() {
        tracing::debug!(
            template = format,
            missing = mismatch.missing,
            extra = mismatch.extra,
            bad_verbs = mismatch.bad_verbs,
            bad_widths = mismatch.bad_widths,
            "format directives and arguments do not line up"
        );
    }
    out
}

#[derive(Debug, Default)]
struct Mismatch {
    missing: usize,
    extra: usize,
    bad_verbs: usize,
    bad_widths: usize,
}

impl Mismatch {
    fn any(&self) -> bool {
        self.missing + self.extra + self.bad_verbs + self.bad_widths > 0
    }
}

/// Integer taken by a `*` width or precision.
fn star_value(arg: Option<&Arg>) -> Option<i64> {
    match arg? {
        Arg::Int(v) => Some(*v),
        Arg::Uint(v) => i64::try_from(*v).ok(),
        _ => None,
    }
}

fn clamp(value: u64) -> usize {
    usize::try_from(value).map_or(MAX_WIDTH, |v| v.min(MAX_WIDTH))
}

#[derive(Debug, Default, Clone, Copy)]
struct Flags(u8);

impl Flags {
    const MINUS: u8 = 1;
    const PLUS: u8 = 1 << 1;
    const SHARP: u8 = 1 << 2;
    const SPACE: u8 = 1 << 3;
    const ZERO: u8 = 1 << 4;
    const WIDTH_STAR: u8 = 1 << 5;
    const PREC_STAR: u8 = 1 << 6;

    fn insert(&mut self, bit: u8) {
        self.0 |= bit;
    }

    fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }
}

#[derive(Debug, Default)]
struct Spec {
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    verb: char,
}

impl Spec {
    fn plain() -> Self {
        Self {
            verb: 'v',
            ..Self::default()
        }
    }

    /// Parses everything after a `%`. `None` when the input ends before a verb.
    fn parse(chars: &mut Peekable<Chars<'_>>) -> Option<Self> {
        let mut spec = Self::default();
        while let Some(&c) = chars.peek() {
            let bit = match c {
                '-' => Flags::MINUS,
                '+' => Flags::PLUS,
                '#' => Flags::SHARP,
                ' ' => Flags::SPACE,
                '0' => Flags::ZERO,
                _ => break,
            };
            spec.flags.insert(bit);
            chars.next();
        }
        if chars.next_if_eq(&'*').is_some() {
            spec.flags.insert(Flags::WIDTH_STAR);
        } else {
            spec.width = parse_number(chars);
        }
        if chars.next_if_eq(&'.').is_some() {
            if chars.next_if_eq(&'*').is_some() {
                spec.flags.insert(Flags::PREC_STAR);
            } else {
                spec.precision = Some(parse_number(chars).unwrap_or(0));
            }
        }
        spec.verb = chars.next()?;
        Some(spec)
    }

    fn sign(&self, negative: bool) -> Option<char> {
        if negative {
            Some('-')
        } else if self.flags.has(Flags::PLUS) {
            Some('+')
        } else if self.flags.has(Flags::SPACE) {
            Some(' ')
        } else {
            None
        }
    }
}

fn parse_number(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        let digit = usize::try_from(digit).unwrap_or_default();
        let acc = value.unwrap_or_default();
        value = Some(acc.saturating_mul(10).saturating_add(digit).min(MAX_WIDTH));
    }
    value
}

/// Formatted value before width padding is applied.
struct Piece {
    sign: Option<char>,
    prefix: &'static str,
    body: String,
    /// Whether the `0` flag pads with zeros. Off for `NaN`/`Inf`, and for
    /// integers with an explicit precision.
    zero_pad: bool,
}

impl Piece {
    fn text(body: String) -> Self {
        Self {
            sign: None,
            prefix: "",
            body,
            zero_pad: true,
        }
    }
}

/// Appends `arg` formatted per `spec`, or a bad-verb marker. Returns whether
/// the verb applied to the argument.
fn write_arg(out: &mut String, spec: &Spec, arg: &Arg) -> bool {
    let piece = match arg {
        Arg::Int(v) => format_int(spec, *v),
        Arg::Uint(v) => format_uint(spec, *v),
        Arg::Float(v) => format_float(spec, *v, &format!("{:e}", v.abs())),
        Arg::Float32(v) => format_float(spec, f64::from(*v), &format!("{:e}", v.abs())),
        Arg::Bool(v) => format_bool(spec, *v),
        Arg::Char(v) => format_char(spec, *v),
        Arg::Str(v) => format_str(spec, v),
    };
    if let Some(piece) = piece {
        pad(out, spec, &piece);
        return true;
    }
    out.push_str("%!");
    out.push(spec.verb);
    out.push('(');
    out.push_str(arg.kind());
    out.push('=');
    write_arg(out, &Spec::plain(), arg);
    out.push(')');
    false
}

fn pad(out: &mut String, spec: &Spec, piece: &Piece) {
    let len = usize::from(piece.sign.is_some()) + piece.prefix.len() + piece.body.chars().count();
    let fill = spec.width.map_or(0, |w| w.saturating_sub(len));

    if spec.flags.has(Flags::MINUS) {
        out.extend(piece.sign);
        out.push_str(piece.prefix);
        out.push_str(&piece.body);
        out.extend(std::iter::repeat_n(' ', fill));
    } else if spec.flags.has(Flags::ZERO) && piece.zero_pad {
        out.extend(piece.sign);
        out.push_str(piece.prefix);
        out.extend(std::iter::repeat_n('0', fill));
        out.push_str(&piece.body);
    } else {
        out.extend(std::iter::repeat_n(' ', fill));
        out.extend(piece.sign);
        out.push_str(piece.prefix);
        out.push_str(&piece.body);
    }
}

fn char_of(value: u64) -> char {
    u32::try_from(value)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn format_int(spec: &Spec, value: i64) -> Option<Piece> {
    match spec.verb {
        'c' | 'q' => {
            let c = u64::try_from(value).map_or(char::REPLACEMENT_CHARACTER, char_of);
            format_char(spec, c)
        }
        _ => integer(spec, value < 0, value.unsigned_abs()),
    }
}

fn format_uint(spec: &Spec, value: u64) -> Option<Piece> {
    match spec.verb {
        'c' | 'q' => format_char(spec, char_of(value)),
        _ => integer(spec, false, value),
    }
}

fn integer(spec: &Spec, negative: bool, magnitude: u64) -> Option<Piece> {
    let (mut digits, prefix) = match spec.verb {
        'v' | 'd' => (magnitude.to_string(), ""),
        'b' => (format!("{magnitude:b}"), "0b"),
        'o' => (format!("{magnitude:o}"), "0"),
        'x' => (format!("{magnitude:x}"), "0x"),
        'X' => (format!("{magnitude:X}"), "0X"),
        _ => return None,
    };
    if let Some(min_digits) = spec.precision
        && digits.len() < min_digits
    {
        digits.insert_str(0, &"0".repeat(min_digits - digits.len()));
    }
    Some(Piece {
        sign: spec.sign(negative),
        prefix: if spec.flags.has(Flags::SHARP) { prefix } else { "" },
        body: digits,
        zero_pad: spec.precision.is_none(),
    })
}

/// `shortest` is the `{:e}` rendering of `|value|` at the argument's own
/// width, used when no precision is given.
fn format_float(spec: &Spec, value: f64, shortest: &str) -> Option<Piece> {
    if !matches!(spec.verb, 'v' | 'f' | 'F' | 'e' | 'E' | 'g' | 'G') {
        return None;
    }
    if value.is_nan() {
        return Some(Piece {
            sign: spec.flags.has(Flags::PLUS).then_some('+'),
            prefix: "",
            body: "NaN".to_owned(),
            zero_pad: false,
        });
    }
    let negative = value.is_sign_negative();
    if value.is_infinite() {
        return Some(Piece {
            sign: Some(if negative { '-' } else { '+' }),
            prefix: "",
            body: "Inf".to_owned(),
            zero_pad: false,
        });
    }

    let abs = value.abs();
    let body = match spec.verb {
        'f' | 'F' => format!("{abs:.prec$}", prec = spec.precision.unwrap_or(6)),
        'e' | 'E' => exponent_form(
            &format!("{abs:.prec$e}", prec = spec.precision.unwrap_or(6)),
            spec.verb == 'E',
        ),
        _ => general(abs, shortest, spec.precision, spec.verb == 'G'),
    };
    Some(Piece {
        sign: spec.sign(negative),
        prefix: "",
        body,
        zero_pad: true,
    })
}

/// Rewrites Rust's `1.5e-7` exponent notation as `1.5e-07`.
fn exponent_form(rendered: &str, upper: bool) -> String {
    let (mantissa, exp) = rendered.split_once('e').unwrap_or((rendered, "0"));
    let exp: i64 = exp.parse().unwrap_or_default();
    let sign = if exp < 0 { '-' } else { '+' };
    let marker = if upper { 'E' } else { 'e' };
    let magnitude = exp.unsigned_abs();
    format!("{mantissa}{marker}{sign}{magnitude:02}")
}

/// `%g` / `%v`: shortest (or `precision` significant digits) representation,
/// in exponent form when the exponent is below -4 or not below the precision.
fn general(abs: f64, shortest: &str, precision: Option<usize>, upper: bool) -> String {
    let scientific = match precision {
        None => shortest.to_owned(),
        Some(p) => format!("{abs:.prec$e}", prec = p.max(1) - 1),
    };
    let (mantissa, exp) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exp: i64 = exp.parse().unwrap_or_default();

    let mut digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }

    let digit_count = i64::try_from(digits.len()).unwrap_or(i64::MAX);
    let point = exp + 1;
    let threshold = match precision {
        None => 6,
        Some(p) => {
            let p = i64::try_from(p.max(1)).unwrap_or(i64::MAX);
            if p > digit_count && digit_count >= point {
                digit_count
            } else {
                p
            }
        }
    };

    if exp < -4 || exp >= threshold {
        let (head, tail) = digits.split_at(1);
        let mantissa = if tail.is_empty() {
            head.to_owned()
        } else {
            format!("{head}.{tail}")
        };
        return exponent_form(&format!("{mantissa}e{exp}"), upper);
    }
    place_point(&digits, point)
}

/// Places the decimal point `point` digits into `digits`.
fn place_point(digits: &str, point: i64) -> String {
    if point <= 0 {
        let zeros = "0".repeat(usize::try_from(-point).unwrap_or_default());
        return format!("0.{zeros}{digits}");
    }
    let point = usize::try_from(point).unwrap_or(usize::MAX);
    if point >= digits.len() {
        let zeros = "0".repeat(point - digits.len());
        format!("{digits}{zeros}")
    } else {
        let (int_part, frac_part) = digits.split_at(point);
        format!("{int_part}.{frac_part}")
    }
}

fn format_bool(spec: &Spec, value: bool) -> Option<Piece> {
    matches!(spec.verb, 'v' | 't').then(|| Piece::text(value.to_string()))
}

fn format_char(spec: &Spec, value: char) -> Option<Piece> {
    match spec.verb {
        'v' | 'c' => Some(Piece::text(value.to_string())),
        'q' => Some(Piece::text(quote(value.encode_utf8(&mut [0; 4]), '\''))),
        'd' | 'x' | 'X' => integer(spec, false, u64::from(u32::from(value))),
        _ => None,
    }
}

fn format_str(spec: &Spec, value: &str) -> Option<Piece> {
    let value: String = match spec.precision {
        Some(max_chars) => value.chars().take(max_chars).collect(),
        None => value.to_owned(),
    };
    let body = match spec.verb {
        'v' | 's' => value,
        'q' => quote(&value, '"'),
        'x' => hex_bytes(&value, HEX_LOWER),
        'X' => hex_bytes(&value, HEX_UPPER),
        _ => return None,
    };
    Some(Piece::text(body))
}

/// Go-style quoting: `\n`-like escapes, `\xNN` for ASCII control
/// characters and `\uNNNN` for the C1 controls.
fn quote(value: &str, delim: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(delim);
    for c in value.chars() {
        let escape = match c {
            '\u{7}' => "\\a",
            '\u{8}' => "\\b",
            '\u{c}' => "\\f",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            '\u{b}' => "\\v",
            '\\' => "\\\\",
            _ => "",
        };
        if !escape.is_empty() {
            out.push_str(escape);
        } else if c == delim {
            out.push('\\');
            out.push(c);
        } else if c.is_control() {
            let code = u32::from(c);
            // Control characters all sit below U+00A0.
            let (marker, digits): (&str, u32) =
                if code < 0x80 { ("\\x", 2) } else { ("\\u", 4) };
            out.push_str(marker);
            for shift in (0..digits).rev() {
                out.extend(char::from_digit((code >> (shift * 4)) & 0xf, 16));
            }
        } else {
            out.push(c);
        }
    }
    out.push(delim);
    out
}

fn hex_bytes(value: &str, table: &[u8; 16]) -> String {
    let mut out = String::with_capacity(value.len() * 2);
    for byte in value.bytes() {
        out.push(char::from(table[usize::from(byte >> 4)]));
        out.push(char::from(table[usize::from(byte & 0x0f)]));
    }
    out
}
