#![no_main]

use coded_errors::{CatalogConfig, CodeCatalog};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 {
        return;
    }
    if let Ok(s) = std::str::from_utf8(data) {
        // Parse errors are expected; registration must reject bad names, not panic
        if let Ok(config) = CatalogConfig::from_yaml_str(s) {
            let _ = CodeCatalog::from_config(&config);
        }
    }
});
