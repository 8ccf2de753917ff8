//! Entity entries and their replacement text.

use std::fmt;

use crate::error::{Result, TableError};

/// Decoded text of a named character reference: one or two scalar values.
///
/// Stored inline so resolutions can be returned by value without
/// allocating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Replacement {
    chars: [char; 2],
    len: u8,
}

impl Replacement {
    /// A single-scalar replacement.
    pub const fn one(c: char) -> Self {
        Self {
            chars: [c, '\0'],
            len: 1,
        }
    }

    /// A two-scalar replacement, in order.
    pub const fn two(first: char, second: char) -> Self {
        Self {
            chars: [first, second],
            len: 2,
        }
    }

    /// Validate and convert the replacement text of entity `name`.
    pub(crate) fn parse(name: &str, text: &str) -> Result<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (None, _, _) => Err(TableError::EmptyReplacement { name: name.into() }),
            (Some(a), None, _) => Ok(Self::one(a)),
            (Some(a), Some(b), None) => Ok(Self::two(a, b)),
            _ => Err(TableError::ReplacementTooLong {
                name: name.into(),
                count: text.chars().count(),
            }),
        }
    }

    /// The scalar values, in order.
    pub fn as_chars(&self) -> &[char] {
        &self.chars[..usize::from(self.len)]
    }

    /// Append the replacement to `out`.
    pub fn push_to(&self, out: &mut String) {
        out.extend(self.as_chars());
    }
}

impl fmt::Display for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.as_chars() {
            fmt::Write::write_char(f, *c)?;
        }
        Ok(())
    }
}

/// One named character reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityEntry {
    /// Bare name: ASCII letters and digits, no `&` and no `;`.
    pub name: Box<str>,
    /// Whether the canonical spelling ends in `;`.
    pub semicolon_terminated: bool,
    pub replacement: Replacement,
}

impl EntityEntry {
    /// The name as written in the dataset, without the leading `&`.
    pub fn canonical_name(&self) -> String {
        if self.semicolon_terminated {
            format!("{};", self.name)
        } else {
            self.name.to_string()
        }
    }

    /// Length of the canonical name, counting the `;`.
    pub fn canonical_len(&self) -> usize {
        self.name.len() + usize::from(self.semicolon_terminated)
    }
}

/// Split a dataset key into its bare name and terminator flag.
///
/// Accepts `"&amp;"`, `"amp;"`, `"&amp"` and `"amp"`.
pub(crate) fn split_canonical(raw: &str) -> Result<(&str, bool)> {
    let without_amp = raw.strip_prefix('&').unwrap_or(raw);
    let (bare, terminated) = match without_amp.strip_suffix(';') {
        Some(bare) => (bare, true),
        None => (without_amp, false),
    };
    if bare.is_empty() {
        return Err(TableError::EmptyName);
    }
    if !bare.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(TableError::InvalidName { name: raw.into() });
    }
    Ok((bare, terminated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_scalar() {
        let r = Replacement::parse("amp;", "&").unwrap();
        assert_eq!(r.as_chars(), &['&']);
        assert_eq!(r.to_string(), "&");
    }

    #[test]
    fn parse_astral_scalar_is_one_char() {
        let r = Replacement::parse("Afr;", "\u{1D504}").unwrap();
        assert_eq!(r.as_chars(), &['\u{1D504}']);
    }

    #[test]
    fn parse_two_scalars_keeps_order() {
        let r = Replacement::parse("NotEqualTilde;", "\u{2242}\u{0338}").unwrap();
        assert_eq!(r.as_chars(), &['\u{2242}', '\u{0338}']);
        assert_eq!(r.to_string(), "\u{2242}\u{0338}");
    }

    #[test]
    fn parse_rejects_empty_and_long() {
        assert!(matches!(
            Replacement::parse("x;", ""),
            Err(TableError::EmptyReplacement { .. })
        ));
        assert!(matches!(
            Replacement::parse("x;", "abc"),
            Err(TableError::ReplacementTooLong { count: 3, .. })
        ));
    }

    #[test]
    fn push_to_appends() {
        let mut s = String::from("a");
        Replacement::two('f', 'j').push_to(&mut s);
        assert_eq!(s, "afj");
    }

    #[test]
    fn split_canonical_forms() {
        assert_eq!(split_canonical("&amp;").unwrap(), ("amp", true));
        assert_eq!(split_canonical("amp;").unwrap(), ("amp", true));
        assert_eq!(split_canonical("&amp").unwrap(), ("amp", false));
        assert_eq!(split_canonical("frac12").unwrap(), ("frac12", false));
    }

    #[test]
    fn split_canonical_rejects_bad_names() {
        assert!(matches!(split_canonical("&;"), Err(TableError::EmptyName)));
        assert!(matches!(split_canonical(""), Err(TableError::EmptyName)));
        assert!(matches!(
            split_canonical("a;b"),
            Err(TableError::InvalidName { .. })
        ));
        assert!(matches!(
            split_canonical("caf\u{e9};"),
            Err(TableError::InvalidName { .. })
        ));
    }

    #[test]
    fn canonical_name_round_trips_flag() {
        let e = EntityEntry {
            name: "not".into(),
            semicolon_terminated: true,
            replacement: Replacement::one('\u{AC}'),
        };
        assert_eq!(e.canonical_name(), "not;");
        assert_eq!(e.canonical_len(), 4);
    }
}
