/// Decodes backslash escapes in display text. Unknown or malformed escapes
/// are kept verbatim.
pub fn decode_escapes(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(index) = rest.find('\\') {
        out.push_str(&rest[..index]);
        let escape = &rest[index..];
        let (decoded, consumed) = decode_one(escape);
        match decoded {
            Some(ch) => out.push(ch),
            None => out.push_str(&escape[..consumed]),
        }
        rest = &escape[consumed..];
    }
    out.push_str(rest);
    out
}

/// `escape` starts with a backslash. Returns the decoded char (if any) and
/// how many bytes were consumed.
fn decode_one(escape: &str) -> (Option<char>, usize) {
    let mut chars = escape[1..].chars();
    let Some(marker) = chars.next() else {
        return (None, 1);
    };
    let simple = match marker {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '"' => Some('"'),
        _ => None,
    };
    if simple.is_some() {
        return (simple, 2);
    }

    let digits = match marker {
        'x' => 2,
        'u' => 4,
        'U' => 8,
        _ => return (None, 1 + marker.len_utf8()),
    };
    let hex = &escape[2..];
    let valid = hex
        .chars()
        .take(digits)
        .filter(|c| c.is_ascii_hexdigit())
        .count();
    if valid < digits {
        return (None, 2);
    }
    let decoded = u32::from_str_radix(&hex[..digits], 16)
        .ok()
        .and_then(char::from_u32);
    match decoded {
        Some(ch) => (Some(ch), 2 + digits),
        None => (None, 2 + digits),
    }
}
