//! Parses a `compile` program file: one RV32IM instruction word per
//! non-blank, non-comment line, as `0x`-prefixed hex or plain decimal. The
//! exact format is unspecified by the interface this CLI implements — this
//! is the simplest one that lets a fixed instruction stream be authored and
//! version-controlled by hand.

use std::path::Path;

use anyhow::{bail, Context, Result};

pub fn parse_program(path: &Path) -> Result<Vec<u32>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading program file {}", path.display()))?;

    let mut words = Vec::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let word = if let Some(hex) = line.strip_prefix("0x").or_else(|| line.strip_prefix("0X")) {
            u32::from_str_radix(hex, 16)
        } else {
            line.parse::<u32>()
        }
        .with_context(|| format!("{}:{}: invalid instruction word {line:?}", path.display(), lineno + 1))?;
        words.push(word);
    }

    if words.is_empty() {
        bail!("{}: program is empty", path.display());
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_hex_decimal_and_skips_comments() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "# header comment").unwrap();
        writeln!(f, "0x00500093").unwrap();
        writeln!(f, "").unwrap();
        writeln!(f, "19 # decimal, trailing comment").unwrap();
        f.flush().unwrap();

        let words = parse_program(f.path()).unwrap();
        assert_eq!(words, vec![0x0050_0093, 19]);
    }

    #[test]
    fn rejects_empty_program() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert!(parse_program(f.path()).is_err());
    }
}
