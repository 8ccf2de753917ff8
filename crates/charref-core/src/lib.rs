//! Named character reference resolution for HTML tokenizers.
//!
//! A tokenizer that reaches `&` hands the following characters to a
//! [`Resolver`], which finds the longest entity name in the
//! [`ReferenceTable`] and applies the HTML rules for missing semicolons and
//! attribute values. [`decode`] drives a resolver over a whole string.
//!
//! ```
//! use charref_core::{Context, Resolution, Resolver};
//!
//! let resolver = Resolver::html5();
//! let r = resolver.resolve("notin;".chars(), Context::Text);
//! assert!(matches!(r, Resolution::Matched { consumed: 6, .. }));
//!
//! assert_eq!(
//!     resolver.resolve("amp1".chars(), Context::AttributeValue),
//!     Resolution::NoMatch
//! );
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod resolver;

pub use charref_table::{EntityEntry, ReferenceTable, Replacement, TableError};
pub use config::{ResolverConfig, TableSource};
pub use decode::{decode, decode_attribute, decode_text};
pub use error::{CharRefError, Result};
pub use resolver::{Context, MissingSemicolon, Resolution, Resolver};
