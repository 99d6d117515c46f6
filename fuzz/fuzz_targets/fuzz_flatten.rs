#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_graph::model::{flatten, Attributes};

/// Fuzz the attribute flattener and check it is idempotent.
fuzz_target!(|data: &[u8]| {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_slice(data) {
        let attributes: Attributes = map.into_iter().collect();
        let once = flatten(&attributes);
        assert_eq!(once, flatten(&once));
    }
});
