#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz detection and projection of arbitrary JSON documents.
///
/// Exercises the dispatcher and both projectors, including the typed
/// deserialization of edge-bearing collections.
fuzz_target!(|data: &[u8]| {
    if let Ok(document) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = sbom_graph::detect_format(&document);
        let _ = sbom_graph::project_document(&document);
    }
});
