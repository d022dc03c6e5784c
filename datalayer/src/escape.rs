//! HTML entity escaping for free-text payload fields.
//!
//! Payloads end up inlined in page markup, so every catalog-sourced string
//! (names, brands, category titles, variant labels, the store name) is
//! escaped before it enters a payload. An `&` that already opens a
//! character reference is left alone, which makes escaping idempotent.

/// Escapes `& < > " '` as `&amp; &lt; &gt; &quot; &#039;`.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (index, c) in input.char_indices() {
        match c {
            '&' if starts_reference(&input[index..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

// `rest` starts with `&`; true for `&name;`, `&#123;` and `&#x1f;`.
fn starts_reference(rest: &str) -> bool {
    let Some(end) = rest.find(';') else {
        return false;
    };
    let body = &rest[1..end];
    if let Some(numeric) = body.strip_prefix('#') {
        if let Some(hex) = numeric
            .strip_prefix('x')
            .or_else(|| numeric.strip_prefix('X'))
        {
            return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
        }
        return !numeric.is_empty() && numeric.chars().all(|c| c.is_ascii_digit());
    }
    !body.is_empty()
        && body.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && body.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#039;Jerry&#039;&lt;/b&gt;"
        );
    }

    #[test]
    fn keeps_existing_references() {
        assert_eq!(escape_html("Caf&eacute; &#233; &#xE9;"), "Caf&eacute; &#233; &#xE9;");
        assert_eq!(escape_html("Fish & Chips; Co"), "Fish &amp; Chips; Co");
        assert_eq!(escape_html("&;"), "&amp;;");
        assert_eq!(escape_html("&#;"), "&amp;#;");
        assert_eq!(escape_html("AT&T"), "AT&amp;T");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape_html("Chaussures été"), "Chaussures été");
        assert_eq!(escape_html(""), "");
    }

    proptest! {
        #[test]
        fn escaping_is_idempotent(input in any::<String>()) {
            let once = escape_html(&input);
            prop_assert_eq!(escape_html(&once), once);
        }

        #[test]
        fn escaped_text_has_no_raw_markup(input in any::<String>()) {
            let escaped = escape_html(&input);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
            prop_assert!(!escaped.contains('\''));
        }
    }
}
