//! Generates `charref-table/src/data.rs` from the WHATWG dataset.
//!
//! Usage: `charref-gen [entities.json] [data.rs]`
//!
//! The dataset is downloaded from <https://html.spec.whatwg.org/entities.json>.
//! It is validated by building a full table before anything is written.

use std::fmt::{self, Write as _};
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use charref_table::{ReferenceTable, parse_entities_json};

fn default_input() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../charref-table/data/entities.json"))
}

fn default_output() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../charref-table/src/data.rs"))
}

/// Render the generated source. `pairs` must be sorted by name.
fn render(pairs: &[(String, String)], max_name_length: usize) -> Result<String, fmt::Error> {
    let mut out = String::with_capacity(pairs.len() * 32 + 512);
    out.push_str(
        "// Generated by `charref-gen` from the WHATWG entities.json dataset. Do not edit.\n\n",
    );
    out.push_str("/// Length of the longest entity name, counting a trailing `;`.\n");
    writeln!(out, "pub(crate) const MAX_NAME_LENGTH: usize = {max_name_length};\n")?;
    out.push_str("/// `(name, characters)` pairs. Names ending in `;` are semicolon-terminated.\n");
    out.push_str("pub(crate) static ENTITIES: &[(&str, &str)] = &[\n");
    for (name, characters) in pairs {
        let name = name.strip_prefix('&').unwrap_or(name);
        write!(out, "    (\"{name}\", \"")?;
        for c in characters.chars() {
            write!(out, "\\u{{{:x}}}", u32::from(c))?;
        }
        out.push_str("\"),\n");
    }
    out.push_str("];\n");
    Ok(out)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let input = args.next().map(PathBuf::from).unwrap_or_else(default_input);
    let output = args.next().map(PathBuf::from).unwrap_or_else(default_output);

    let json = fs::read_to_string(&input)
        .with_context(|| format!("reading {}", input.display()))?;
    let pairs = parse_entities_json(&json)?;
    let table = ReferenceTable::build(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .with_context(|| format!("validating {}", input.display()))?;

    let source = render(&pairs, table.max_name_length()).context("rendering data.rs")?;
    fs::write(&output, source)
        .with_context(|| format!("writing {}", output.display()))?;
    log::info!(
        "Wrote {} entities (longest name {}) to {}",
        table.len(),
        table.max_name_length(),
        output.display(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_escapes_every_scalar() {
        let pairs = vec![
            ("&Afr;".to_string(), "\u{1D504}".to_string()),
            ("&amp".to_string(), "&".to_string()),
            ("&nvlt;".to_string(), "<\u{20D2}".to_string()),
        ];
        let src = render(&pairs, 5).unwrap();
        assert!(src.contains("pub(crate) const MAX_NAME_LENGTH: usize = 5;\n"));
        assert!(src.contains("    (\"Afr;\", \"\\u{1d504}\"),\n"));
        assert!(src.contains("    (\"amp\", \"\\u{26}\"),\n"));
        assert!(src.contains("    (\"nvlt;\", \"\\u{3c}\\u{20d2}\"),\n"));
        assert!(src.ends_with("];\n"));
    }

    #[test]
    fn bundled_dataset_regenerates_checked_in_source() {
        let json = fs::read_to_string(default_input()).unwrap();
        let pairs = parse_entities_json(&json).unwrap();
        let table = ReferenceTable::build(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .unwrap();
        let expected = fs::read_to_string(default_output()).unwrap();
        assert_eq!(render(&pairs, table.max_name_length()).unwrap(), expected);
    }
}
