//! Reference paths: `a.b["c-d"].e` normalized to `a.b.c-d.e`

/// Whether `s` is a single identifier
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn identifier_len(s: &str) -> usize {
    let mut len = 0;
    for (i, c) in s.char_indices() {
        let ok = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        if !ok {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}

/// Parse a reference at the start of `input`.
///
/// Returns the normalized dotted path and the unparsed remainder.
pub fn parse(input: &str) -> Option<(String, &str)> {
    let len = identifier_len(input);
    if len == 0 {
        return None;
    }
    let mut segments = vec![input[..len].to_string()];
    let mut rest = &input[len..];

    loop {
        if let Some(after_dot) = rest.strip_prefix('.') {
            let len = identifier_len(after_dot);
            if len == 0 {
                return None;
            }
            segments.push(after_dot[..len].to_string());
            rest = &after_dot[len..];
        } else if let Some(after_bracket) = rest.strip_prefix("[\"") {
            let end = after_bracket.find("\"]")?;
            let segment = &after_bracket[..end];
            if segment.is_empty() || segment.contains('"') {
                return None;
            }
            segments.push(segment.to_string());
            rest = &after_bracket[end + 2..];
        } else {
            break;
        }
    }

    Some((segments.join("."), rest))
}
