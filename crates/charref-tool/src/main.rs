//! `charref`: decode HTML named character references.
//!
//! Usage: `charref [--attribute] [--strict] [--config FILE] [INPUT]`
//!
//! Reads INPUT (or stdin), decodes every named character reference and
//! writes the result to stdout. Numeric references are passed through.

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Result, bail};
use charref_core::{Context, MissingSemicolon, ResolverConfig, decode};

const USAGE: &str = "usage: charref [--attribute] [--strict] [--config FILE] [INPUT]";

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
struct Options {
    attribute: bool,
    strict: bool,
    config: Option<PathBuf>,
    input: Option<PathBuf>,
    help: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Options> {
    let mut opts = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--attribute" => opts.attribute = true,
            "--strict" => opts.strict = true,
            "--config" => match args.next() {
                Some(path) => opts.config = Some(PathBuf::from(path)),
                None => bail!("--config needs a file\n{USAGE}"),
            },
            "-h" | "--help" => opts.help = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            _ if opts.input.is_some() => bail!("more than one input file\n{USAGE}"),
            path => opts.input = Some(PathBuf::from(path)),
        }
    }
    Ok(opts)
}

/// Merge the config file (if any) with command-line overrides.
fn effective_config(opts: &Options) -> Result<ResolverConfig> {
    let mut config = match &opts.config {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::default(),
    };
    if opts.attribute {
        config.context = Context::AttributeValue;
    }
    if opts.strict {
        config.missing_semicolon = MissingSemicolon::Reject;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = parse_args(std::env::args().skip(1))?;
    if opts.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = effective_config(&opts)?;
    let source = config.load_table()?;
    let resolver = config.resolver(source.table());
    log::debug!("decoding with {config:?}");

    let text = match &opts.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        },
    };

    let decoded = decode(&text, &resolver, config.context);
    io::stdout().lock().write_all(decoded.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_args_is_default() {
        assert_eq!(parse_args(args(&[])).unwrap(), Options::default());
    }

    #[test]
    fn parses_flags_and_input() {
        let opts =
            parse_args(args(&["--attribute", "--config", "c.toml", "page.html", "--strict"]))
                .unwrap();
        assert!(opts.attribute);
        assert!(opts.strict);
        assert_eq!(opts.config, Some(PathBuf::from("c.toml")));
        assert_eq!(opts.input, Some(PathBuf::from("page.html")));
    }

    #[test]
    fn rejects_bad_args() {
        assert!(parse_args(args(&["--bogus"])).is_err());
        assert!(parse_args(args(&["--config"])).is_err());
        assert!(parse_args(args(&["a.html", "b.html"])).is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charref.toml");
        std::fs::write(&path, "context = \"text\"\nmissing_semicolon = \"accept\"\n").unwrap();
        let opts = Options {
            attribute: true,
            strict: true,
            config: Some(path),
            ..Default::default()
        };
        let config = effective_config(&opts).unwrap();
        assert_eq!(config.context, Context::AttributeValue);
        assert_eq!(config.missing_semicolon, MissingSemicolon::Reject);
    }

    #[test]
    fn config_file_applies_without_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charref.toml");
        std::fs::write(&path, "context = \"attribute\"\n").unwrap();
        let opts = Options {
            config: Some(path),
            ..Default::default()
        };
        let config = effective_config(&opts).unwrap();
        let source = config.load_table().unwrap();
        let resolver = config.resolver(source.table());
        assert_eq!(decode("a&copy=b", &resolver, config.context), "a&copy=b");
        assert_eq!(decode("a&copy b", &resolver, config.context), "a\u{A9} b");
    }
}
