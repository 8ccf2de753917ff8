//! Longest-match resolution of named character references.
//!
//! Implements the tokenizer's *named character reference state*
//! ([WHATWG][spec]): starting just after `&`, find the longest table name
//! spelled by the input, then apply the semicolon and attribute-value rules
//! to decide whether it counts.
//!
//! [spec]: https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state

use serde::Deserialize;

use charref_table::{EntityEntry, Prefix, ReferenceTable, Replacement};

/// Where the reference appears. Legacy (semicolon-less) matches are
/// rejected inside attribute values when followed by `[A-Za-z0-9=]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Context {
    #[default]
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "attribute", alias = "attribute_value")]
    AttributeValue,
}

/// What to do when a name exists only in its `;` form and the input lacks
/// the `;`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingSemicolon {
    /// Match anyway, consuming the name without `;` (a parse error, but
    /// still a match). A legacy entry of the same name wins over the `;`
    /// form.
    #[default]
    Accept,
    /// Not a candidate; the scan falls back to the longest legacy name
    /// (`&notin ` decodes as `¬in `). This is what browsers do.
    Reject,
}

/// Outcome of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// `consumed` characters after the `&` decode to `replacement`.
    Matched {
        consumed: usize,
        replacement: Replacement,
    },
    /// The `&` is literal text; tokenization resumes right after it.
    NoMatch,
}

impl Resolution {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// Characters consumed after the `&`; zero for [`Resolution::NoMatch`].
    pub fn consumed(&self) -> usize {
        match self {
            Self::Matched { consumed, .. } => *consumed,
            Self::NoMatch => 0,
        }
    }
}

/// The best match found so far during a scan.
#[derive(Debug, Clone, Copy)]
struct Candidate<'t> {
    entry: &'t EntityEntry,
    consumed: usize,
    /// Character right after the matched name, if one was read.
    next: Option<char>,
}

/// Resolves named character references against a [`ReferenceTable`].
///
/// Holds no mutable state: one resolver may be shared by any number of
/// tokenizers on any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'t> {
    table: &'t ReferenceTable,
    missing_semicolon: MissingSemicolon,
}

impl Resolver<'static> {
    /// A resolver over the built-in HTML5 table.
    pub fn html5() -> Self {
        Self::new(ReferenceTable::html5())
    }
}

impl Default for Resolver<'static> {
    fn default() -> Self {
        Self::html5()
    }
}

impl<'t> Resolver<'t> {
    pub fn new(table: &'t ReferenceTable) -> Self {
        Self {
            table,
            missing_semicolon: MissingSemicolon::default(),
        }
    }

    pub fn with_missing_semicolon(mut self, policy: MissingSemicolon) -> Self {
        self.missing_semicolon = policy;
        self
    }

    pub fn table(&self) -> &'t ReferenceTable {
        self.table
    }

    /// Resolve the reference whose name starts at `input` (the character
    /// after `&`).
    ///
    /// Pulls at most [`ReferenceTable::max_name_length`] characters from
    /// `input`. The reported length covers only the matched name (plus its
    /// `;`), however far the scan looked ahead.
    pub fn resolve<I>(&self, input: I, context: Context) -> Resolution
    where
        I: IntoIterator<Item = char>,
    {
        let limit = self.table.max_name_length();
        assert!(limit > 0, "reference table has no names");

        let mut chars = input.into_iter();
        let mut read = 0;
        let mut prefix = self.table.root();
        let mut best = None;
        loop {
            let next = if read < limit { chars.next() } else { None };
            if next.is_some() {
                read += 1;
            }
            if prefix.depth() > 0
                && let Some(candidate) = self.candidate(prefix, next)
            {
                best = Some(candidate);
            }
            if !prefix.is_extendable() {
                break;
            }
            match next.and_then(|c| prefix.step(c)) {
                Some(longer) => prefix = longer,
                None => break,
            }
        }

        let resolution = match best {
            None => Resolution::NoMatch,
            Some(c) if Self::rejected_in_attribute(&c, context) => Resolution::NoMatch,
            Some(c) => Resolution::Matched {
                consumed: c.consumed,
                replacement: c.entry.replacement,
            },
        };
        log::trace!("resolved after {read} chars ({context:?}): {resolution:?}");
        resolution
    }

    /// Judge the name spelled by `prefix`, given the character after it.
    fn candidate(&self, prefix: Prefix<'t>, next: Option<char>) -> Option<Candidate<'t>> {
        let depth = prefix.depth();
        if next == Some(';')
            && let Some(entry) = prefix.terminated_entry()
        {
            return Some(Candidate {
                entry,
                consumed: depth + 1,
                next: None,
            });
        }
        let entry = match (prefix.legacy_entry(), self.missing_semicolon) {
            (Some(entry), _) => entry,
            (None, MissingSemicolon::Accept) => prefix.terminated_entry()?,
            (None, MissingSemicolon::Reject) => return None,
        };
        Some(Candidate {
            entry,
            consumed: depth,
            next,
        })
    }

    fn rejected_in_attribute(candidate: &Candidate<'_>, context: Context) -> bool {
        context == Context::AttributeValue
            && !candidate.entry.semicolon_terminated
            && matches!(candidate.next, Some(c) if c.is_ascii_alphanumeric() || c == '=')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(input: &str) -> Resolution {
        Resolver::html5().resolve(input.chars(), Context::Text)
    }

    fn attr(input: &str) -> Resolution {
        Resolver::html5().resolve(input.chars(), Context::AttributeValue)
    }

    fn matched(consumed: usize, s: &str) -> Resolution {
        let mut chars = s.chars();
        let replacement = match (chars.next(), chars.next()) {
            (Some(a), None) => Replacement::one(a),
            (Some(a), Some(b)) => Replacement::two(a, b),
            _ => panic!("bad replacement literal"),
        };
        Resolution::Matched {
            consumed,
            replacement,
        }
    }

    /// Yields `inner` but panics if pulled more than `limit` times.
    struct Bounded<I> {
        inner: I,
        pulled: usize,
        limit: usize,
    }

    impl<I: Iterator<Item = char>> Iterator for Bounded<I> {
        type Item = char;

        fn next(&mut self) -> Option<char> {
            self.pulled += 1;
            assert!(self.pulled <= self.limit, "read past the lookahead bound");
            self.inner.next()
        }
    }

    // -- semicolon-terminated ------------------------------------------------

    #[test]
    fn semicolon_form_consumes_semicolon() {
        assert_eq!(text("amp;"), matched(4, "&"));
        assert_eq!(text("amp;rest"), matched(4, "&"));
        assert_eq!(attr("amp;x"), matched(4, "&"));
    }

    #[test]
    fn every_terminated_entry_resolves_exactly() {
        let table = ReferenceTable::html5();
        let resolver = Resolver::html5();
        for entry in table.entries().filter(|e| e.semicolon_terminated) {
            let input = format!("{};", entry.name);
            assert_eq!(
                resolver.resolve(input.chars(), Context::Text),
                Resolution::Matched {
                    consumed: entry.name.len() + 1,
                    replacement: entry.replacement,
                },
                "{input}"
            );
        }
    }

    #[test]
    fn longest_match_wins() {
        assert_eq!(text("notin;"), matched(6, "\u{2209}"));
        assert_eq!(text("not;"), matched(4, "\u{AC}"));
    }

    #[test]
    fn two_scalar_replacement_keeps_order() {
        assert_eq!(text("NotEqualTilde;"), matched(14, "\u{2242}\u{0338}"));
        assert_eq!(text("nvlt;"), matched(5, "<\u{20D2}"));
    }

    #[test]
    fn astral_replacement_is_one_scalar() {
        assert_eq!(text("Afr;"), matched(4, "\u{1D504}"));
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(text("AMP;"), matched(4, "&"));
        assert_eq!(text("Amp;"), Resolution::NoMatch);
    }

    // -- legacy --------------------------------------------------------------

    #[test]
    fn legacy_match_in_text() {
        assert_eq!(text("amp1"), matched(3, "&"));
        assert_eq!(text("amp"), matched(3, "&"));
        assert_eq!(text("copy2024"), matched(4, "\u{A9}"));
    }

    #[test]
    fn legacy_rejected_in_attribute_before_alnum_or_equals() {
        assert_eq!(attr("amp1"), Resolution::NoMatch);
        assert_eq!(attr("ampx"), Resolution::NoMatch);
        assert_eq!(attr("amp="), Resolution::NoMatch);
    }

    #[test]
    fn legacy_accepted_in_attribute_otherwise() {
        assert_eq!(attr("amp"), matched(3, "&"));
        assert_eq!(attr("amp "), matched(3, "&"));
        assert_eq!(attr("amp&"), matched(3, "&"));
        assert_eq!(attr("amp-"), matched(3, "&"));
    }

    #[test]
    fn semicolon_form_matches_without_semicolon() {
        // `notin` and `alpha` exist only with `;`.
        assert_eq!(text("notin "), matched(5, "\u{2209}"));
        assert_eq!(text("notin"), matched(5, "\u{2209}"));
        assert_eq!(text("alpha"), matched(5, "\u{3B1}"));
        assert_eq!(text("alpha;"), matched(6, "\u{3B1}"));
        // Not a legacy entry, so the attribute rule does not apply.
        assert_eq!(attr("notin "), matched(5, "\u{2209}"));
        assert_eq!(attr("alphax"), matched(5, "\u{3B1}"));
    }

    #[test]
    fn backtracks_to_longest_candidate() {
        assert_eq!(text("notit;"), matched(3, "\u{AC}"));
        assert_eq!(text("notinz"), matched(5, "\u{2209}"));
    }

    // -- no match ------------------------------------------------------------

    #[test]
    fn unknown_name_is_no_match() {
        assert_eq!(text("foobar;"), Resolution::NoMatch);
        assert_eq!(text("zzz"), Resolution::NoMatch);
    }

    #[test]
    fn non_name_input_is_no_match() {
        assert_eq!(text(""), Resolution::NoMatch);
        assert_eq!(text(";"), Resolution::NoMatch);
        assert_eq!(text(" amp;"), Resolution::NoMatch);
        assert_eq!(text("#38;"), Resolution::NoMatch);
        assert_eq!(text("\u{e9}"), Resolution::NoMatch);
    }

    // -- lookahead bound -----------------------------------------------------

    #[test]
    fn longest_name_reads_exactly_the_bound() {
        let name = "CounterClockwiseContourIntegral;";
        let limit = ReferenceTable::html5().max_name_length();
        assert_eq!(name.len(), limit);
        let input = Bounded {
            inner: format!("{name}trailing").chars().collect::<Vec<_>>().into_iter(),
            pulled: 0,
            limit,
        };
        assert_eq!(
            Resolver::html5().resolve(input, Context::Text),
            matched(32, "\u{2233}")
        );
    }

    #[test]
    fn long_garbage_stops_early() {
        let input = Bounded {
            inner: std::iter::repeat('q'),
            pulled: 0,
            limit: 3,
        };
        assert_eq!(
            Resolver::html5().resolve(input, Context::Text),
            Resolution::NoMatch
        );
    }

    #[test]
    fn bound_reached_on_custom_table() {
        let table = ReferenceTable::build([("ab", "x"), ("abc;", "y")]).unwrap();
        let resolver = Resolver::new(&table);
        assert_eq!(table.max_name_length(), 4);
        let input = Bounded {
            inner: "abcd".chars(),
            pulled: 0,
            limit: 4,
        };
        assert_eq!(resolver.resolve(input, Context::Text), matched(3, "y"));
    }

    #[test]
    fn stops_once_no_name_extends_the_prefix() {
        let table = ReferenceTable::build([("ab;", "x"), ("abcd;", "y")]).unwrap();
        let resolver = Resolver::new(&table);
        let ab = table.root().step('a').and_then(|p| p.step('b')).unwrap();
        assert!(ab.is_extendable());
        let input = Bounded {
            inner: "abq;".chars(),
            pulled: 0,
            limit: 3,
        };
        assert_eq!(resolver.resolve(input, Context::Text), matched(2, "x"));
        let input = Bounded {
            inner: "abcd;zzzz".chars(),
            pulled: 0,
            limit: 5,
        };
        assert_eq!(resolver.resolve(input, Context::Text), matched(5, "y"));
    }

    // -- missing-semicolon policy ---------------------------------------------

    #[test]
    fn reject_policy_falls_back_to_legacy_prefix() {
        let strict = Resolver::html5().with_missing_semicolon(MissingSemicolon::Reject);
        assert_eq!(strict.resolve("notin ".chars(), Context::Text), matched(3, "\u{AC}"));
        assert_eq!(strict.resolve("notin".chars(), Context::Text), matched(3, "\u{AC}"));
        assert_eq!(strict.resolve("notin ".chars(), Context::AttributeValue), Resolution::NoMatch);
        assert_eq!(strict.resolve("alpha".chars(), Context::Text), Resolution::NoMatch);
        assert_eq!(strict.resolve("notin;".chars(), Context::Text), matched(6, "\u{2209}"));
    }

    #[test]
    fn default_policy_is_accept() {
        assert_eq!(MissingSemicolon::default(), MissingSemicolon::Accept);
        assert_eq!(
            Resolver::html5().resolve("notin ".chars(), Context::Text),
            Resolver::html5()
                .with_missing_semicolon(MissingSemicolon::Accept)
                .resolve("notin ".chars(), Context::Text)
        );
    }

    #[test]
    fn legacy_entry_takes_precedence_over_semicolon_form() {
        let table = ReferenceTable::build([("foo", "a"), ("foo;", "b")]).unwrap();
        for policy in [MissingSemicolon::Accept, MissingSemicolon::Reject] {
            let resolver = Resolver::new(&table).with_missing_semicolon(policy);
            assert_eq!(resolver.resolve("foo ".chars(), Context::Text), matched(3, "a"));
            assert_eq!(resolver.resolve("foo;".chars(), Context::Text), matched(4, "b"));
        }
    }

    #[test]
    fn resolution_helpers() {
        assert!(text("lt;").is_match());
        assert_eq!(text("lt;").consumed(), 3);
        assert!(!Resolution::NoMatch.is_match());
        assert_eq!(Resolution::NoMatch.consumed(), 0);
    }

    #[test]
    fn resolver_is_shareable_across_threads() {
        let resolver = Resolver::html5();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| assert_eq!(resolver.resolve("gt;".chars(), Context::Text), matched(3, ">")));
            }
        });
    }

    mod proptests {
        use proptest::prelude::*;

        use crate::resolver::{Context, Resolution, Resolver};
        use charref_table::ReferenceTable;

        proptest! {
            #[test]
            fn never_consumes_more_than_available(input in "[a-zA-Z0-9;=]{0,40}") {
                let r = Resolver::html5().resolve(input.chars(), Context::Text);
                prop_assert!(r.consumed() <= input.len());
                prop_assert!(r.consumed() <= ReferenceTable::html5().max_name_length());
            }

            #[test]
            fn consumed_text_is_a_table_name(input in "[a-zA-Z0-9;=]{0,40}") {
                if let Resolution::Matched { consumed, replacement } =
                    Resolver::html5().resolve(input.chars(), Context::Text)
                {
                    let name = &input[..consumed];
                    let table = ReferenceTable::html5();
                    let entry = table.lookup(name).or_else(|| table.lookup(&format!("{name};")));
                    prop_assert!(entry.is_some(), "{}", name);
                    prop_assert_eq!(entry.map(|e| e.replacement), Some(replacement));
                }
            }

            #[test]
            fn attribute_never_matches_more_than_text(input in "[a-zA-Z0-9;= ]{0,40}") {
                let resolver = Resolver::html5();
                let in_attr = resolver.resolve(input.chars(), Context::AttributeValue);
                if in_attr.is_match() {
                    prop_assert_eq!(in_attr, resolver.resolve(input.chars(), Context::Text));
                }
            }
        }
    }
}
