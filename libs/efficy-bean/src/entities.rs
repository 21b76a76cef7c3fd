//! HTML entity decoding for CRM text fields.
//!
//! Supported forms: the named entities `amp`, `lt`, `gt`, `quot`, `apos`, `nbsp`,
//! decimal references (`&#233;`) and hex references (`&#xE9;`). Anything else is left
//! untouched. Text without `&` is returned as is.

use std::borrow::Cow;

/// Longest entity body we try to match (`#x10FFFF` is 8 chars).
const MAX_ENTITY_LEN: usize = 10;

/// Decode HTML entities until the text is stable.
///
/// CRM fields are sometimes encoded twice (`&amp;lt;`), so decoding is repeated until no
/// entity is left. Every replacement shortens the text, so the loop terminates, and the
/// result is a fixed point: decoding it again returns the same text.
#[must_use]
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut current = decode_once(input);
    while current.contains('&') {
        let next = decode_once(&current);
        if next == current {
            break;
        }
        current = next;
    }

    if current == input {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(current)
    }
}

fn decode_once(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        match entity_at(tail) {
            Some((decoded, consumed)) => {
                out.push(decoded);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Match an entity at the start of `text` (which begins with `&`).
/// Returns the decoded char and the number of bytes consumed, `;` included.
fn entity_at(text: &str) -> Option<(char, usize)> {
    let body_end = text
        .char_indices()
        .skip(1)
        .take(MAX_ENTITY_LEN + 1)
        .find(|&(_, c)| c == ';')
        .map(|(idx, _)| idx)?;

    let body = &text[1..body_end];
    let decoded = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        numeric => numeric_reference(numeric)?,
    };

    Some((decoded, body_end + 1))
}

fn numeric_reference(body: &str) -> Option<char> {
    let digits = body.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_ampersand_is_borrowed() {
        let decoded = decode_entities("plain text < 3");
        assert!(matches!(decoded, Cow::Borrowed("plain text < 3")));
    }

    #[test]
    fn named_entities() {
        assert_eq!(
            decode_entities("Tom &amp; Jerry &lt;3&gt; &quot;hi&quot; &apos;x&apos;"),
            "Tom & Jerry <3> \"hi\" 'x'"
        );
        assert_eq!(decode_entities("a&nbsp;b"), "a\u{a0}b");
    }

    #[test]
    fn numeric_entities() {
        assert_eq!(decode_entities("caf&#233;"), "caf\u{e9}");
        assert_eq!(decode_entities("caf&#xE9; &#x41;"), "caf\u{e9} A");
    }

    #[test]
    fn unknown_or_broken_entities_are_kept() {
        assert_eq!(decode_entities("R&D &copy; &#xZZ; & done"), "R&D &copy; &#xZZ; & done");
        assert_eq!(decode_entities("trailing &amp"), "trailing &amp");
        assert_eq!(decode_entities("&#1114112;"), "&#1114112;");
    }

    #[test]
    fn double_encoded_text_is_fully_decoded() {
        assert_eq!(decode_entities("&amp;lt;b&amp;gt;"), "<b>");
    }

    #[test]
    fn decoding_is_idempotent() {
        for sample in [
            "&amp;amp;amp;",
            "x &lt; y &amp;&amp; y &gt; z",
            "&#38;#60;",
            "no entities",
            "&&&;;",
        ] {
            let once = decode_entities(sample).into_owned();
            let twice = decode_entities(&once).into_owned();
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }
}
