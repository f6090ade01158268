//! HTML escaping helpers shared by the block and inline renderers.

/// Escape `&`, `<` and `>` (and quotes when `quote` is set).
///
/// With `smart_amp`, an `&` that already starts an entity such as `&amp;` or
/// `&#169;` is left alone, so authored entities survive conversion.
#[must_use]
pub fn escape(text: &str, quote: bool, smart_amp: bool) -> String {
    let mut out = String::with_capacity(text.len());

    for (i, c) in text.char_indices() {
        match c {
            '&' if smart_amp && starts_entity(&text[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quote => out.push_str("&quot;"),
            '\'' if quote => out.push_str("&#39;"),
            c => out.push(c),
        }
    }

    out
}

/// Escape text content with entity-preserving `&` handling.
#[must_use]
pub fn escape_text(text: &str) -> String {
    escape(text, false, true)
}

/// Escape a URL for use in an attribute, dropping script-capable schemes.
#[must_use]
pub fn escape_link(url: &str) -> String {
    let lower: String =
        url.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_ascii_lowercase();

    if ["javascript:", "vbscript:", "data:"].iter().any(|scheme| lower.starts_with(scheme)) {
        return String::new();
    }

    escape(url, true, false)
}

// `&name;`, `&#123;` or `&#x1F;`
fn starts_entity(text: &str) -> bool {
    let Some(rest) = text.strip_prefix('&') else {
        return false;
    };
    let Some(end) = rest.find(';') else {
        return false;
    };
    let body = &rest[..end];

    if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some(dec) = body.strip_prefix('#') {
        return !dec.is_empty() && dec.chars().all(|c| c.is_ascii_digit());
    }
    !body.is_empty() && body.chars().all(|c| c.is_ascii_alphanumeric())
}
