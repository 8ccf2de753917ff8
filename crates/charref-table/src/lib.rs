//! HTML named character reference table.
//!
//! Maps entity names (`amp;`, `notin;`, legacy `amp`) to their decoded
//! text and exposes the prefix tree a longest-match resolver walks. The
//! full WHATWG table is compiled in and available through
//! [`ReferenceTable::html5`]; other tables can be built from any dataset
//! with [`ReferenceTable::build`] or [`ReferenceTable::from_json`].
//!
//! ```
//! use charref_table::ReferenceTable;
//!
//! let table = ReferenceTable::html5();
//! let entry = table.lookup("notin;").unwrap();
//! assert_eq!(entry.replacement.to_string(), "\u{2209}");
//! assert!(table.lookup("notin").is_none());
//! ```

mod data;
pub mod dataset;
pub mod entry;
pub mod error;
pub mod table;
mod trie;

pub use dataset::parse_entities_json;
pub use entry::{EntityEntry, Replacement};
pub use error::{Result, TableError};
pub use table::{Prefix, ReferenceTable};
