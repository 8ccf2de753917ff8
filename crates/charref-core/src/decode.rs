//! Decoding named character references in runs of text.
//!
//! This is the caller side of [`Resolver::resolve`]: find each `&`, let the
//! resolver decide, splice in the replacement or keep the `&` literally.
//! Numeric references (`&#38;`) are left untouched.

use std::borrow::Cow;

use memchr::memchr;

use crate::resolver::{Context, Resolution, Resolver};

/// Decode every named character reference in `input`.
///
/// Returns `Cow::Borrowed` when nothing was replaced (zero-copy).
pub fn decode<'a>(input: &'a str, resolver: &Resolver<'_>, context: Context) -> Cow<'a, str> {
    let bytes = input.as_bytes();
    // Fast path: no `&` at all.
    let Some(first) = memchr(b'&', bytes) else {
        return Cow::Borrowed(input);
    };

    let mut out = String::with_capacity(input.len());
    let mut replaced = false;
    let mut pos = 0;
    let mut amp = first;
    loop {
        out.push_str(&input[pos..amp]);
        let after = amp + 1;
        match resolver.resolve(input[after..].chars(), context) {
            Resolution::Matched {
                consumed,
                replacement,
            } => {
                replacement.push_to(&mut out);
                // Names and `;` are ASCII, so characters == bytes.
                pos = after + consumed;
                replaced = true;
            },
            Resolution::NoMatch => {
                out.push('&');
                pos = after;
            },
        }
        match memchr(b'&', &bytes[pos..]) {
            Some(offset) => amp = pos + offset,
            None => break,
        }
    }

    if !replaced {
        return Cow::Borrowed(input);
    }
    out.push_str(&input[pos..]);
    Cow::Owned(out)
}

/// Decode character data with the built-in HTML5 table.
pub fn decode_text(input: &str) -> Cow<'_, str> {
    decode(input, &Resolver::html5(), Context::Text)
}

/// Decode an attribute value with the built-in HTML5 table.
pub fn decode_attribute(input: &str) -> Cow<'_, str> {
    decode(input, &Resolver::html5(), Context::AttributeValue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MissingSemicolon;

    #[test]
    fn no_ampersand_is_borrowed() {
        let out = decode_text("plain text");
        assert!(matches!(out, Cow::Borrowed("plain text")));
    }

    #[test]
    fn unresolved_ampersands_stay_borrowed() {
        let out = decode_text("a & b &foo; &#38;");
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, "a & b &foo; &#38;");
    }

    #[test]
    fn decodes_named_references() {
        assert_eq!(decode_text("a&amp;b"), "a&b");
        assert_eq!(decode_text("&lt;div&gt;"), "<div>");
        assert_eq!(decode_text("hello&nbsp;world"), "hello\u{A0}world");
        assert_eq!(decode_text("&lt;&gt;"), "<>");
    }

    #[test]
    fn legacy_reference_in_text() {
        assert_eq!(decode_text("&copy 2024"), "\u{A9} 2024");
        assert_eq!(decode_text("&notin x"), "\u{2209} x");
        assert_eq!(decode_text("&notin x &alpha"), "\u{2209} x \u{3B1}");
        assert_eq!(decode_text("&amp1"), "&1");
    }

    #[test]
    fn legacy_reference_in_attribute() {
        assert_eq!(decode_attribute("?a=1&amp;b=2"), "?a=1&b=2");
        assert_eq!(decode_attribute("?x=1&copy=2"), "?x=1&copy=2");
        assert_eq!(decode_attribute("?x=1&not"), "?x=1\u{AC}");
        assert_eq!(decode_attribute("&amp "), "& ");
    }

    #[test]
    fn unmatched_ampersand_resumes_after_it() {
        assert_eq!(decode_text("&&amp;"), "&&");
        assert_eq!(decode_text("&zz&lt;"), "&zz<");
        assert_eq!(decode_text("trailing &"), "trailing &");
    }

    #[test]
    fn multibyte_text_around_references() {
        assert_eq!(decode_text("caf\u{e9}&amp;th\u{e9}"), "caf\u{e9}&th\u{e9}");
        assert_eq!(decode_text("&\u{e9}"), "&\u{e9}");
        assert_eq!(decode_text("&Afr;&fjlig;"), "\u{1D504}fj");
    }

    #[test]
    fn custom_resolver() {
        let strict = Resolver::html5().with_missing_semicolon(MissingSemicolon::Reject);
        assert_eq!(decode("&notin x", &strict, Context::Text), "\u{AC}in x");
        assert_eq!(decode("&alpha", &strict, Context::Text), "&alpha");
    }

    mod proptests {
        use std::borrow::Cow;

        use proptest::prelude::*;

        use crate::decode::{decode_attribute, decode_text};

        proptest! {
            #[test]
            fn identity_without_ampersand(input in "[^&]{0,64}") {
                prop_assert_eq!(decode_text(&input), Cow::Borrowed(input.as_str()));
            }

            #[test]
            fn never_panics(input in "[a-z&;= \u{e9}]{0,64}") {
                let _ = decode_text(&input);
                let _ = decode_attribute(&input);
            }
        }
    }
}
