use crate::core::encoding::{CodeTable, CodeTableError, Hollerith, ROW_LABELS, Symbol};
use crate::core::geometry::{COLUMNS, ROWS};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Placeholder shown in listings for cards whose text is not printable.
pub const BINARY_PLACEHOLDER: &str = "<<binary>>";

/// The hole matrix of one card face, column by column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchPattern {
    columns: Vec<Hollerith>,
}

impl Default for PunchPattern {
    fn default() -> Self {
        Self {
            columns: vec![Hollerith::BLANK; COLUMNS],
        }
    }
}

impl PunchPattern {
    /// Pad or truncate to 80 columns.
    pub fn new(columns: impl IntoIterator<Item = Hollerith>) -> Self {
        let mut columns: Vec<Hollerith> = columns.into_iter().take(COLUMNS).collect();
        columns.resize(COLUMNS, Hollerith::BLANK);
        Self { columns }
    }

    /// Punch `text` with `table`; the card is blank past the end of the text.
    pub fn from_text<T: CodeTable + ?Sized>(table: &T, text: &str) -> Result<Self, CodeTableError> {
        let mut columns = Vec::with_capacity(COLUMNS);
        for ch in text.chars().take(COLUMNS) {
            let code = table
                .encode(ch)
                .ok_or_else(|| CodeTableError::Unsupported(ch, table.name().to_string()))?;
            columns.push(code);
        }
        Ok(Self::new(columns))
    }

    pub fn columns(&self) -> &[Hollerith] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Hollerith {
        self.columns.get(index).copied().unwrap_or(Hollerith::BLANK)
    }

    pub fn decode<T: CodeTable + ?Sized>(&self, table: &T) -> DecodedCard {
        DecodedCard {
            symbols: self.columns.iter().map(|&code| table.decode_symbol(code)).collect(),
        }
    }

    /// Columns where `self` and `other` differ.
    pub fn diff(&self, other: &PunchPattern) -> Vec<usize> {
        (0..COLUMNS)
            .filter(|&col| self.column(col) != other.column(col))
            .collect()
    }

    pub fn render(&self, style: RenderStyle, text: Option<&DecodedCard>) -> String {
        match style {
            RenderStyle::AsciiX => self.render_ascii('X', ' ', text),
            RenderStyle::Ascii01 => self.render_ascii('1', '0', text),
        }
    }

    fn render_ascii(&self, mark: char, blank: char, text: Option<&DecodedCard>) -> String {
        let mut out = String::with_capacity(16 * COLUMNS);
        let _ = writeln!(&mut out, "     {}", ruler_line());
        if let Some(card) = text {
            out.push_str("     ");
            out.extend(card.symbols.iter().map(|s| printable_or_dot(s.as_char())));
            out.push('\n');
        }
        let separator = "-".repeat(COLUMNS);
        let _ = writeln!(&mut out, "     {}", separator);
        for (index, label) in ROW_LABELS.iter().enumerate().take(ROWS) {
            let _ = write!(&mut out, "{:>3} |", label);
            for code in &self.columns {
                out.push(if code.is_punched(index) { mark } else { blank });
            }
            out.push_str("|\n");
        }
        let _ = writeln!(&mut out, "     {}", separator);
        out
    }
}

fn ruler_line() -> String {
    let mut ruler = String::with_capacity(COLUMNS);
    for col in 1..=COLUMNS {
        if col % 10 == 0 {
            let digit = ((col / 10) % 10) as u8;
            ruler.push(char::from(b'0' + digit));
        } else {
            ruler.push('.');
        }
    }
    ruler
}

fn printable_or_dot(ch: char) -> char {
    if ch.is_control() { '.' } else { ch }
}

/// Characters (or unknown markers) in card reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedCard {
    pub symbols: Vec<Symbol>,
}

impl DecodedCard {
    pub fn text(&self) -> String {
        self.symbols.iter().map(|s| s.as_char()).collect()
    }

    /// Columns with no table entry, with their patterns.
    pub fn unknown(&self) -> impl Iterator<Item = (usize, Hollerith)> + '_ {
        self.symbols.iter().enumerate().filter_map(|(col, s)| match s {
            Symbol::Unknown(code) => Some((col, *code)),
            Symbol::Char(_) => None,
        })
    }

    /// True when every column decoded to a non-control character.
    pub fn is_printable(&self) -> bool {
        self.symbols
            .iter()
            .all(|s| matches!(s, Symbol::Char(ch) if !ch.is_control()))
    }

    /// Text for listings: the characters, or [`BINARY_PLACEHOLDER`].
    pub fn listing(&self) -> String {
        if self.is_printable() {
            self.text()
        } else {
            BINARY_PLACEHOLDER.to_string()
        }
    }
}

/// ASCII rendering styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStyle {
    #[default]
    AsciiX,
    Ascii01,
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStyle::AsciiX => write!(f, "ascii-x"),
            RenderStyle::Ascii01 => write!(f, "ascii-01"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoding::{EbcdicTable, Ibm029Table};
    use pretty_assertions::assert_eq;

    #[test]
    fn text_round_trips_through_pattern() {
        let table = EbcdicTable::new();
        let text = "HELLO, WORLD 0123456789 (A+B)*C=D";
        let card = PunchPattern::from_text(&table, text).unwrap();
        let decoded = card.decode(&table);
        assert_eq!(decoded.text(), format!("{:<80}", text));
        assert!(decoded.is_printable());
    }

    #[test]
    fn unsupported_character_is_reported() {
        let err = PunchPattern::from_text(&Ibm029Table::new(), "ok~").unwrap_err();
        assert_eq!(err, CodeTableError::Unsupported('~', "IBM029".to_string()));
    }

    #[test]
    fn unknown_patterns_survive_decoding() {
        let odd: Hollerith = "12-11-0-1-2-3".parse().unwrap();
        let card = PunchPattern::new([Hollerith::row(1).unwrap(), odd]);
        let decoded = card.decode(&EbcdicTable::new());
        assert_eq!(decoded.symbols[1], Symbol::Unknown(odd));
        assert_eq!(decoded.unknown().collect::<Vec<_>>(), vec![(1, odd)]);
        assert_eq!(decoded.listing(), BINARY_PLACEHOLDER);
    }

    #[test]
    fn render_marks_holes_under_row_labels() {
        let card = PunchPattern::from_text(&EbcdicTable::new(), "A1").unwrap();
        let dump = card.render(RenderStyle::AsciiX, None);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 15);
        assert!(lines[0].ends_with("........1.........2.........3.........4.........5.........6.........7.........8"));
        assert!(lines[2].starts_with(" 12 |X "));
        assert!(lines[4].starts_with("  0 |  "));
        assert!(lines[5].starts_with("  1 |XX"));
        let zeros = card.render(RenderStyle::Ascii01, None);
        assert!(zeros.lines().nth(5).unwrap().starts_with("  1 |110"));
    }

    #[test]
    fn diff_lists_changed_columns() {
        let table = EbcdicTable::new();
        let a = PunchPattern::from_text(&table, "ABCDEF").unwrap();
        let b = PunchPattern::from_text(&table, "ABXDEY").unwrap();
        assert_eq!(a.diff(&b), vec![2, 5]);
        assert!(a.diff(&a).is_empty());
    }
}
