/// Decode a narrow subset of HTML entities.
///
/// Named: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`. Numeric:
/// `&#123;` and `&#x1F4A9;`, semicolon-terminated, valid scalar values only.
/// Anything else passes through unchanged.
pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match decode_one(rest) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// `s` starts with '&'. Returns the decoded char and the bytes consumed.
fn decode_one(s: &str) -> Option<(char, usize)> {
    // Longest entity we accept is `&#x10FFFF;`.
    let end = s.as_bytes().iter().take(11).position(|b| *b == b';')?;
    let body = &s[1..end];
    let ch = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let digits = body.strip_prefix('#')?;
            let value = match digits.strip_prefix(['x', 'X']) {
                Some(hex) if !hex.is_empty() => u32::from_str_radix(hex, 16).ok()?,
                Some(_) => return None,
                None if !digits.is_empty() => digits.parse::<u32>().ok()?,
                None => return None,
            };
            char::from_u32(value)?
        }
    };
    Some((ch, end + 1))
}
