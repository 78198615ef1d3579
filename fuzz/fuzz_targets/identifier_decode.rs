#![no_main]

use libfuzzer_sys::fuzz_target;

const PAGE: &str = r#"<div id="a" class="x y">hello</div><p>world</p><footer>end</footer>"#;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let doc = html::Document::parse(PAGE);
    if let Some(id) = hider::decode(&doc, input) {
        assert!(doc.is_element(id));
    }
});
