#![no_main]

use coded_errors::{Arg, sprintf};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Width/precision are clamped, but keep the template itself small
    if data.len() > 1024 {
        return;
    }
    if let Ok(s) = std::str::from_utf8(data) {
        let args = [
            Arg::Int(-42),
            Arg::Uint(u64::MAX),
            Arg::Float(f64::NAN),
            Arg::Float(-1.5e-7),
            Arg::Float32(0.1),
            Arg::Bool(true),
            Arg::Char('\u{10FFFF}'),
            Arg::Str(s.to_owned()),
        ];
        let _ = sprintf(s, &args);
        let _ = sprintf(s, &args[..1]);
        let _ = sprintf(s, &[]);
    }
});
