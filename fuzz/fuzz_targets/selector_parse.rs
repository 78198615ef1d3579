#![no_main]

use libfuzzer_sys::fuzz_target;

const PAGE: &str = r#"<div id="a" class="x y"><p>t</p><span data-k="v-w"></span></div><ul><li></li></ul>"#;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let doc = html::Document::parse(PAGE);
    if let Ok(list) = css::parse_selector_list(input) {
        let _ = css::query_selector_all(&doc, &list);
    }
    let _ = hider::resolve_for_hide(&doc, input);
});
