#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz JSON highlighting.
///
/// Any parseable document must highlight without error and leave no raw
/// `<` from the input in the output text.
fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let html = kitchen::dashboard::syntax_highlight(&value).expect("serializable value");
        let stripped = html
            .replace("<span class=\"", "")
            .replace("</span>", "")
            .replace("\">", "");
        assert!(!stripped.contains('<'));
    }
});
