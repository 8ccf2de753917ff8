//! The reference table: validated entries plus a prefix tree over them.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::sync::LazyLock;

use crate::data;
use crate::dataset::parse_entities_json;
use crate::entry::{EntityEntry, Replacement, split_canonical};
use crate::error::{Result, TableError};
use crate::trie::{ROOT, Trie};

static HTML5: LazyLock<ReferenceTable> = LazyLock::new(|| {
    let table = ReferenceTable::build(data::ENTITIES.iter().copied())
        .unwrap_or_else(|e| panic!("built-in entity table is malformed: {e}"));
    debug_assert_eq!(table.max_name_length(), data::MAX_NAME_LENGTH);
    table
});

/// Immutable mapping from entity name to replacement text.
///
/// Built once, then shared freely: there is no way to mutate a table after
/// [`ReferenceTable::build`] returns.
#[derive(Clone, PartialEq, Eq)]
pub struct ReferenceTable {
    /// Sorted by canonical name.
    entries: Vec<EntityEntry>,
    trie: Trie,
    max_name_length: usize,
}

impl ReferenceTable {
    /// Build a table from `(name, replacement)` pairs.
    ///
    /// Names are canonical dataset keys (`"amp;"`, `"amp"`), optionally with
    /// the leading `&` of the WHATWG file. Input order does not matter.
    pub fn build<I, N, R>(dataset: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, R)>,
        N: AsRef<str>,
        R: AsRef<str>,
    {
        let mut by_name: BTreeMap<String, EntityEntry> = BTreeMap::new();
        for (raw, text) in dataset {
            let raw = raw.as_ref();
            let (bare, semicolon_terminated) = split_canonical(raw)?;
            let entry = EntityEntry {
                name: bare.into(),
                semicolon_terminated,
                replacement: Replacement::parse(raw, text.as_ref())?,
            };
            match by_name.entry(entry.canonical_name()) {
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                },
                Entry::Occupied(slot) if slot.get().replacement == entry.replacement => {
                    log::debug!("duplicate entity {:?} with identical replacement", slot.key());
                },
                Entry::Occupied(slot) => {
                    return Err(TableError::ConflictingDuplicate {
                        name: slot.key().clone(),
                    });
                },
            }
        }
        if by_name.is_empty() {
            return Err(TableError::EmptyDataset);
        }

        let entries: Vec<EntityEntry> = by_name.into_values().collect();
        let mut trie = Trie::new();
        let mut max_name_length = 0;
        for (i, entry) in entries.iter().enumerate() {
            trie.insert(&entry.name, entry.semicolon_terminated, i as u32);
            max_name_length = max_name_length.max(entry.canonical_len());
        }
        // A legacy match is judged by the character after it, which must
        // still be within the lookahead bound.
        if let Some(entry) = entries
            .iter()
            .find(|e| !e.semicolon_terminated && e.canonical_len() >= max_name_length)
        {
            return Err(TableError::LegacyNameAtBound {
                name: entry.canonical_name(),
            });
        }

        let table = Self {
            entries,
            trie,
            max_name_length,
        };
        table.log_divergent_legacy_forms();
        log::debug!(
            "built entity table: {} entries, {} trie nodes, longest name {}",
            table.entries.len(),
            table.trie.node_count(),
            table.max_name_length,
        );
        Ok(table)
    }

    /// Build a table from the WHATWG `entities.json` format.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::build(parse_entities_json(json)?)
    }

    /// The full HTML5 named character reference table.
    ///
    /// Built on first use. Panics if the compiled-in data is malformed,
    /// which can only happen if the generated source was edited by hand.
    pub fn html5() -> &'static ReferenceTable {
        &HTML5
    }

    /// Exact lookup by canonical name: `"amp"` finds the legacy entry,
    /// `"amp;"` the semicolon-terminated one.
    pub fn lookup(&self, candidate: &str) -> Option<&EntityEntry> {
        let (bare, terminated) = split_canonical(candidate).ok()?;
        let node = self.trie.node(self.trie.find(bare)?);
        let idx = if terminated { node.terminated } else { node.legacy };
        self.entry(idx)
    }

    /// Length of the longest canonical name, counting a trailing `;`.
    ///
    /// A resolver never needs more lookahead than this.
    pub fn max_name_length(&self) -> usize {
        self.max_name_length
    }

    /// The empty prefix, from which names are spelled one character at a
    /// time.
    pub fn root(&self) -> Prefix<'_> {
        Prefix {
            table: self,
            node: ROOT,
            depth: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in canonical-name order.
    pub fn entries(&self) -> std::slice::Iter<'_, EntityEntry> {
        self.entries.iter()
    }

    fn entry(&self, idx: Option<u32>) -> Option<&EntityEntry> {
        idx.map(|i| &self.entries[i as usize])
    }

    /// Both spellings are kept verbatim; this only reports where they
    /// disagree.
    fn log_divergent_legacy_forms(&self) {
        for entry in self.entries.iter().filter(|e| !e.semicolon_terminated) {
            let Some(idx) = self.trie.find(&entry.name) else {
                continue;
            };
            if let Some(terminated) = self.entry(self.trie.node(idx).terminated)
                && terminated.replacement != entry.replacement
            {
                log::debug!(
                    "legacy entity {:?} decodes to {:?}, {:?} to {:?}",
                    entry.name,
                    entry.replacement.to_string(),
                    terminated.canonical_name(),
                    terminated.replacement.to_string(),
                );
            }
        }
    }
}

impl fmt::Debug for ReferenceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceTable")
            .field("entries", &self.entries.len())
            .field("max_name_length", &self.max_name_length)
            .finish()
    }
}

/// A position in the table's prefix tree: the characters consumed so far
/// spell the start of at least one entity name.
#[derive(Debug, Clone, Copy)]
pub struct Prefix<'t> {
    table: &'t ReferenceTable,
    node: u32,
    depth: usize,
}

impl<'t> Prefix<'t> {
    /// Extend the prefix by one character. `None` when no name continues
    /// with `c`; `;` never continues a name.
    pub fn step(self, c: char) -> Option<Prefix<'t>> {
        if !c.is_ascii_alphanumeric() {
            return None;
        }
        let node = self.table.trie.child(self.node, c as u8)?;
        Some(Prefix {
            table: self.table,
            node,
            depth: self.depth + 1,
        })
    }

    /// Number of characters in the prefix.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether some longer name starts with this prefix.
    pub fn is_extendable(&self) -> bool {
        self.table.trie.node(self.node).has_children()
    }

    /// The entry spelled exactly by this prefix, without `;`.
    pub fn legacy_entry(&self) -> Option<&'t EntityEntry> {
        self.table.entry(self.table.trie.node(self.node).legacy)
    }

    /// The entry spelled by this prefix followed by `;`.
    pub fn terminated_entry(&self) -> Option<&'t EntityEntry> {
        self.table.entry(self.table.trie.node(self.node).terminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ReferenceTable {
        ReferenceTable::build([
            ("not", "\u{AC}"),
            ("not;", "\u{AC}"),
            ("notin;", "\u{2209}"),
            ("amp", "&"),
            ("amp;", "&"),
        ])
        .unwrap()
    }

    fn walk<'t>(table: &'t ReferenceTable, s: &str) -> Option<Prefix<'t>> {
        s.chars().try_fold(table.root(), |p, c| p.step(c))
    }

    #[test]
    fn lookup_distinguishes_terminator() {
        let t = small();
        let legacy = t.lookup("not").unwrap();
        assert!(!legacy.semicolon_terminated);
        let terminated = t.lookup("notin;").unwrap();
        assert!(terminated.semicolon_terminated);
        assert_eq!(terminated.replacement, Replacement::one('\u{2209}'));
        assert!(t.lookup("notin").is_none());
        assert!(t.lookup("noti;").is_none());
        assert!(t.lookup("").is_none());
        assert!(t.lookup("a b").is_none());
    }

    #[test]
    fn lookup_accepts_leading_ampersand() {
        let t = small();
        assert_eq!(t.lookup("&amp;"), t.lookup("amp;"));
    }

    #[test]
    fn max_name_length_counts_semicolon() {
        assert_eq!(small().max_name_length(), 6);
    }

    #[test]
    fn len_and_order() {
        let t = small();
        assert_eq!(t.len(), 5);
        assert!(!t.is_empty());
        let names: Vec<String> = t.entries().map(EntityEntry::canonical_name).collect();
        assert_eq!(names, ["amp", "amp;", "not", "not;", "notin;"]);
    }

    #[test]
    fn prefix_walk() {
        let t = small();
        let not = walk(&t, "not").unwrap();
        assert_eq!(not.depth(), 3);
        assert!(not.is_extendable());
        assert!(not.legacy_entry().is_some());
        assert!(not.terminated_entry().is_some());

        let noti = walk(&t, "noti").unwrap();
        assert!(noti.legacy_entry().is_none());
        assert!(noti.terminated_entry().is_none());
        assert!(noti.is_extendable());

        let notin = walk(&t, "notin").unwrap();
        assert!(!notin.is_extendable());
        assert!(notin.terminated_entry().is_some());

        assert!(walk(&t, "nox").is_none());
        assert!(not.step(';').is_none());
        assert!(t.root().step('\u{e9}').is_none());
    }

    #[test]
    fn empty_dataset_fails() {
        let empty: [(&str, &str); 0] = [];
        assert!(matches!(
            ReferenceTable::build(empty),
            Err(TableError::EmptyDataset)
        ));
    }

    #[test]
    fn conflicting_duplicate_fails() {
        let r = ReferenceTable::build([("amp;", "&"), ("&amp;", "+")]);
        assert!(matches!(
            r,
            Err(TableError::ConflictingDuplicate { name }) if name == "amp;"
        ));
    }

    #[test]
    fn identical_duplicate_is_accepted() {
        let t = ReferenceTable::build([("amp;", "&"), ("&amp;", "&")]).unwrap();
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn empty_replacement_fails() {
        assert!(matches!(
            ReferenceTable::build([("amp;", "")]),
            Err(TableError::EmptyReplacement { .. })
        ));
    }

    #[test]
    fn empty_name_fails() {
        assert!(matches!(
            ReferenceTable::build([(";", "x")]),
            Err(TableError::EmptyName)
        ));
    }

    #[test]
    fn legacy_name_at_bound_fails() {
        assert!(matches!(
            ReferenceTable::build([("ab", "x"), ("abc", "y")]),
            Err(TableError::LegacyNameAtBound { name }) if name == "abc"
        ));
        assert!(matches!(
            ReferenceTable::build([("amp", "&")]),
            Err(TableError::LegacyNameAtBound { .. })
        ));
        // One character of room is enough.
        let t = ReferenceTable::build([("abc", "x"), ("abc;", "x")]).unwrap();
        assert_eq!(t.max_name_length(), 4);
    }

    #[test]
    fn divergent_legacy_form_is_kept_verbatim() {
        let t = ReferenceTable::build([("foo", "a"), ("foo;", "b")]).unwrap();
        assert_eq!(t.lookup("foo").unwrap().replacement.to_string(), "a");
        assert_eq!(t.lookup("foo;").unwrap().replacement.to_string(), "b");
    }

    #[test]
    fn from_json_builds() {
        let t = ReferenceTable::from_json(
            r#"{ "&lt;": { "codepoints": [60], "characters": "<" },
                 "&lt": { "codepoints": [60], "characters": "<" } }"#,
        )
        .unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.max_name_length(), 3);
    }

    #[test]
    fn build_is_order_independent() {
        let forward = small();
        let reversed = ReferenceTable::build([
            ("amp;", "&"),
            ("amp", "&"),
            ("notin;", "\u{2209}"),
            ("not;", "\u{AC}"),
            ("not", "\u{AC}"),
        ])
        .unwrap();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn debug_is_summary() {
        let dbg = format!("{:?}", small());
        assert_eq!(dbg, "ReferenceTable { entries: 5, max_name_length: 6 }");
    }

    // -- built-in table -----------------------------------------------------

    #[test]
    fn html5_table_shape() {
        let t = ReferenceTable::html5();
        assert_eq!(t.len(), 2231);
        assert_eq!(t.max_name_length(), 32);
        assert_eq!(t.max_name_length(), data::MAX_NAME_LENGTH);
        assert!(t.lookup("CounterClockwiseContourIntegral;").is_some());
    }

    #[test]
    fn html5_legacy_subset() {
        let t = ReferenceTable::html5();
        let legacy = t.entries().filter(|e| !e.semicolon_terminated).count();
        assert_eq!(legacy, 106);
        assert!(t.lookup("amp").is_some());
        assert!(t.lookup("AMP").is_some());
        assert!(t.lookup("notin").is_none());
    }

    #[test]
    fn html5_matches_bundled_json() {
        let json = include_str!("../data/entities.json");
        let from_json = ReferenceTable::from_json(json).unwrap();
        assert_eq!(&from_json, ReferenceTable::html5());
    }

    #[test]
    fn html5_two_scalar_entries() {
        let t = ReferenceTable::html5();
        let e = t.lookup("NotEqualTilde;").unwrap();
        assert_eq!(e.replacement.as_chars(), &['\u{2242}', '\u{0338}']);
        let fj = t.lookup("fjlig;").unwrap();
        assert_eq!(fj.replacement.to_string(), "fj");
    }

    #[test]
    fn html5_is_shared() {
        assert!(std::ptr::eq(ReferenceTable::html5(), ReferenceTable::html5()));
    }

    mod proptests {
        use proptest::prelude::*;

        use crate::data;
        use crate::table::ReferenceTable;

        fn sample() -> Vec<(&'static str, &'static str)> {
            data::ENTITIES.iter().copied().step_by(7).collect()
        }

        proptest! {
            #[test]
            fn build_ignores_input_order(shuffled in Just(sample()).prop_shuffle()) {
                let reference = ReferenceTable::build(sample()).unwrap();
                let table = ReferenceTable::build(shuffled).unwrap();
                prop_assert_eq!(reference, table);
            }

            #[test]
            fn lookup_agrees_with_entries(idx in 0usize..2231) {
                let t = ReferenceTable::html5();
                let entry = t.entries().nth(idx).unwrap();
                let found = t.lookup(&entry.canonical_name()).unwrap();
                prop_assert_eq!(found, entry);
            }
        }
    }
}
