#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let tokens = html::tokenize(input);
    let doc = html::build_document(&tokens);
    let _ = html::Document::parse(&html::serialize::to_html(&doc));
});
