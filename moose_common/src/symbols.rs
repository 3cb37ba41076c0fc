//! Symbol list parsing.

use std::io::BufRead;

use crate::error::MarketError;

/// Trait providing file parsing for symbol lists.
pub trait SymbolParser {
    /// Parses symbols from a buffered reader.
    ///
    /// Symbols may be separated by commas, whitespace or new lines. Blank lines
    /// and lines starting with `#` are skipped. Every symbol is uppercased.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<String>, MarketError>;
}

/// Plain string symbols, as stored in watchlists.
pub struct Symbols;

impl SymbolParser for Symbols {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<String>, MarketError> {
        let mut symbols = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(MarketError::Io)?;
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }

            for token in trimmed_line.split(|c: char| c == ',' || c.is_whitespace()) {
                if token.is_empty() {
                    continue;
                }
                let symbol = normalize(token)?;
                if !symbols.contains(&symbol) {
                    symbols.push(symbol);
                }
            }
        }
        Ok(symbols)
    }
}

/// Uppercases a symbol and checks it only holds ASCII alphanumerics, `.` or `-`.
pub fn normalize(raw: &str) -> Result<String, MarketError> {
    let symbol = raw.trim().to_ascii_uppercase();
    let valid = !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if valid {
        Ok(symbol)
    } else {
        Err(MarketError::ParseSymbolsFile(format!("invalid symbol: {:?}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn splits_on_commas_spaces_and_lines() {
        let input = "# my list\naapl, msft\n\n  RY.TO tsla\nAAPL\n";
        let symbols = Symbols::parse_from_file(Cursor::new(input)).unwrap();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "RY.TO", "TSLA"]);
    }

    #[test]
    fn rejects_garbage_tokens() {
        let err = Symbols::parse_from_file(Cursor::new("AAPL, $$$\n")).unwrap_err();
        assert!(matches!(err, MarketError::ParseSymbolsFile(_)));
    }
}
