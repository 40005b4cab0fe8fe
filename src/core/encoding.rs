use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::tables::{CP037_TO_UNICODE, EBCDIC_TO_HOLLERITH};

/// Row labels in punch order, top edge of the card first.
pub const ROW_LABELS: [u8; 12] = [12, 11, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9];

/// Marker emitted in text output for columns without a table entry.
pub const UNKNOWN_MARKER: char = '\u{FFFD}';

/// The holes punched in one card column, packed into a 12-bit word.
///
/// Bit meaning (MSB → LSB): bit11 = row 12, bit10 = row 11, bit9 = row 0,
/// bit8 = row 1, ..., bit0 = row 9. This is the layout used by the classic
/// Hollerith-to-EBCDIC tables, so a word reads left to right in punch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hollerith(pub u16);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeTableError {
    #[error("invalid punch notation '{0}'")]
    Notation(String),
    #[error("row {0} is not a card row (expected 12, 11 or 0..9)")]
    Row(u8),
    #[error("pattern {0} is mapped twice")]
    DuplicatePattern(Hollerith),
    #[error("character '{0}' (U+{1:04X}) is mapped twice")]
    DuplicateChar(char, u32),
    #[error("character '{0}' is not in table {1}")]
    Unsupported(char, String),
}

impl Hollerith {
    pub const BLANK: Hollerith = Hollerith(0);
    const MASK: u16 = 0x0fff;

    /// Word with a single hole in the row labelled `label`.
    pub fn row(label: u8) -> Result<Self, CodeTableError> {
        ROW_LABELS
            .iter()
            .position(|&l| l == label)
            .map(|idx| Hollerith(1 << (11 - idx)))
            .ok_or(CodeTableError::Row(label))
    }

    /// Pack booleans given in punch order (row 12 first).
    pub fn from_bits(bits: &[bool; 12]) -> Self {
        let word = bits
            .iter()
            .fold(0u16, |acc, &bit| (acc << 1) | u16::from(bit));
        Hollerith(word)
    }

    /// Unpack into booleans in punch order (row 12 first).
    pub fn bits(self) -> [bool; 12] {
        let mut out = [false; 12];
        for (idx, slot) in out.iter_mut().enumerate() {
            *slot = self.is_punched(idx);
        }
        out
    }

    /// Whether the row at punch-order position `index` (0 = row 12) is punched.
    pub fn is_punched(self, index: usize) -> bool {
        index < 12 && (self.0 >> (11 - index)) & 1 == 1
    }

    /// Labels of the punched rows in punch order.
    pub fn rows(self) -> impl Iterator<Item = u8> {
        ROW_LABELS
            .into_iter()
            .enumerate()
            .filter(move |(idx, _)| self.is_punched(*idx))
            .map(|(_, label)| label)
    }

    pub fn count(self) -> u32 {
        (self.0 & Self::MASK).count_ones()
    }

    pub fn is_blank(self) -> bool {
        self.0 & Self::MASK == 0
    }
}

impl std::ops::BitOr for Hollerith {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Hollerith(self.0 | rhs.0)
    }
}

/// Punch notation, e.g. `12-0-8`; a blank column prints as `blank`.
impl fmt::Display for Hollerith {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_blank() {
            return write!(f, "blank");
        }
        let rows: Vec<String> = self.rows().map(|r| r.to_string()).collect();
        write!(f, "{}", rows.join("-"))
    }
}

impl FromStr for Hollerith {
    type Err = CodeTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("blank") {
            return Ok(Hollerith::BLANK);
        }
        let mut word = Hollerith::BLANK;
        for part in trimmed.split('-') {
            let label: u8 = part
                .trim()
                .parse()
                .map_err(|_| CodeTableError::Notation(s.to_string()))?;
            let bit = Hollerith::row(label)?;
            if word.0 & bit.0 != 0 {
                return Err(CodeTableError::Notation(s.to_string()));
            }
            word = word | bit;
        }
        Ok(word)
    }
}

/// One decoded column: either a character or the raw pattern nobody maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Char(char),
    Unknown(Hollerith),
}

impl Symbol {
    pub fn as_char(self) -> char {
        match self {
            Symbol::Char(ch) => ch,
            Symbol::Unknown(_) => UNKNOWN_MARKER,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, Symbol::Unknown(_))
    }
}

/// A column-pattern to character mapping.
///
/// Tables are plain data: the reading pipeline never looks inside one, so
/// any encoding can be swapped in without touching geometry or hole reading.
pub trait CodeTable: Send + Sync {
    fn name(&self) -> &str;

    fn decode(&self, code: Hollerith) -> Option<char>;

    /// Inverse lookup, used to build test cards and synthetic scans.
    fn encode(&self, ch: char) -> Option<Hollerith>;

    /// All mapped patterns, sorted by pattern.
    fn entries(&self) -> Vec<(Hollerith, char)>;

    fn decode_symbol(&self, code: Hollerith) -> Symbol {
        match self.decode(code) {
            Some(ch) => Symbol::Char(ch),
            None => Symbol::Unknown(code),
        }
    }

    fn is_supported(&self, ch: char) -> bool {
        self.encode(ch).is_some()
    }
}

/// Hollerith → EBCDIC → Unicode (code page 037).
///
/// IBM handled national characters by re-drawing "little used" EBCDIC
/// glyphs, so cp037 alone does not cover e.g. Danish decks; those are
/// handled by [`EbcdicTable::with_substitutions`].
#[derive(Debug, Clone)]
pub struct EbcdicTable {
    to_ebcdic: HashMap<Hollerith, u8>,
    substitutions: HashMap<char, char>,
    reverse: HashMap<char, Hollerith>,
}

impl Default for EbcdicTable {
    fn default() -> Self {
        Self::new()
    }
}

impl EbcdicTable {
    pub fn new() -> Self {
        Self::with_substitutions(&[])
    }

    /// Table that swaps glyphs after the cp037 step, e.g. `('#', 'Æ')`.
    ///
    /// Each pair is exchanged in both directions, so a code that natively
    /// decodes to `Æ` yields `#` and the table stays one to one.
    pub fn with_substitutions(pairs: &[(char, char)]) -> Self {
        let mut to_ebcdic = HashMap::with_capacity(256);
        for (byte, &word) in EBCDIC_TO_HOLLERITH.iter().enumerate() {
            to_ebcdic.insert(Hollerith(word), byte as u8);
        }
        let mut substitutions = HashMap::with_capacity(pairs.len() * 2);
        for &(from, to) in pairs {
            substitutions.insert(from, to);
            substitutions.insert(to, from);
        }
        let mut reverse = HashMap::with_capacity(256);
        for (byte, &word) in EBCDIC_TO_HOLLERITH.iter().enumerate() {
            let glyph = CP037_TO_UNICODE[byte];
            let glyph = substitutions.get(&glyph).copied().unwrap_or(glyph);
            reverse.entry(glyph).or_insert(Hollerith(word));
        }
        Self {
            to_ebcdic,
            substitutions,
            reverse,
        }
    }

    /// The Danish convention: `#↔Æ`, `@↔Ø`, `$↔Å`.
    pub fn danish() -> Self {
        Self::with_substitutions(&[('#', 'Æ'), ('@', 'Ø'), ('$', 'Å')])
    }

    /// Raw EBCDIC byte for a pattern.
    pub fn ebcdic(&self, code: Hollerith) -> Option<u8> {
        self.to_ebcdic.get(&code).copied()
    }
}

impl CodeTable for EbcdicTable {
    fn name(&self) -> &str {
        if self.substitutions.is_empty() {
            "EBCDIC-CP037"
        } else {
            "EBCDIC-CP037+NATIONAL"
        }
    }

    fn decode(&self, code: Hollerith) -> Option<char> {
        let glyph = CP037_TO_UNICODE[usize::from(self.ebcdic(code)?)];
        Some(self.substitutions.get(&glyph).copied().unwrap_or(glyph))
    }

    fn encode(&self, ch: char) -> Option<Hollerith> {
        self.reverse.get(&ch).copied()
    }

    fn entries(&self) -> Vec<(Hollerith, char)> {
        let mut out: Vec<(Hollerith, char)> = self
            .to_ebcdic
            .keys()
            .filter_map(|&code| self.decode(code).map(|ch| (code, ch)))
            .collect();
        out.sort_by_key(|(code, _)| *code);
        out
    }
}

/// The IBM 029 keypunch character set.
///
/// Summary of the rules:
/// - Digits 0–9: punch the corresponding row
/// - A–I: 12 + 1–9; J–R: 11 + 1–9; S–Z: 0 + 2–9
/// - Specials: a zone (or none) plus a digit row plus row 8
/// - Space: no punches
#[derive(Debug, Clone)]
pub struct Ibm029Table {
    map: HashMap<char, Hollerith>,
    reverse: HashMap<Hollerith, char>,
}

impl Default for Ibm029Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Ibm029Table {
    pub fn new() -> Self {
        let mut m = HashMap::new();

        m.insert(' ', Hollerith::BLANK);

        for (i, d) in ('0'..='9').enumerate() {
            m.insert(d, digit(i as u8));
        }
        for (i, ch) in ('A'..='I').enumerate() {
            m.insert(ch, zone12() | digit(i as u8 + 1));
        }
        for (i, ch) in ('J'..='R').enumerate() {
            m.insert(ch, zone11() | digit(i as u8 + 1));
        }
        for (i, ch) in ('S'..='Z').enumerate() {
            m.insert(ch, digit(0) | digit(i as u8 + 2));
        }

        m.insert('&', zone12());
        m.insert('-', zone11());
        m.insert('/', digit(0) | digit(1));

        // 12-x-8
        for (i, ch) in ['¢', '.', '<', '(', '+', '|'].into_iter().enumerate() {
            m.insert(ch, zone12() | digit(i as u8 + 2) | digit(8));
        }
        // 11-x-8
        for (i, ch) in ['!', '$', '*', ')', ';', '¬'].into_iter().enumerate() {
            m.insert(ch, zone11() | digit(i as u8 + 2) | digit(8));
        }
        // 0-x-8
        for (i, ch) in [',', '%', '_', '>', '?'].into_iter().enumerate() {
            m.insert(ch, digit(0) | digit(i as u8 + 3) | digit(8));
        }
        // x-8
        for (i, ch) in [':', '#', '@', '\'', '=', '"'].into_iter().enumerate() {
            m.insert(ch, digit(i as u8 + 2) | digit(8));
        }

        let reverse = m.iter().map(|(&ch, &code)| (code, ch)).collect();
        Self { map: m, reverse }
    }
}

impl CodeTable for Ibm029Table {
    fn name(&self) -> &str {
        "IBM029"
    }

    fn decode(&self, code: Hollerith) -> Option<char> {
        self.reverse.get(&code).copied()
    }

    fn encode(&self, ch: char) -> Option<Hollerith> {
        self.map.get(&ch.to_ascii_uppercase()).copied()
    }

    fn entries(&self) -> Vec<(Hollerith, char)> {
        let mut out: Vec<(Hollerith, char)> = self.reverse.iter().map(|(&c, &ch)| (c, ch)).collect();
        out.sort_by_key(|(code, _)| *code);
        out
    }
}

/// Serialized form of a user supplied table: `{"name": .., "entries": {"12-1": "A"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTableFile {
    pub name: String,
    pub entries: BTreeMap<String, char>,
}

/// A code table built from data instead of code.
#[derive(Debug, Clone)]
pub struct MapTable {
    name: String,
    forward: HashMap<Hollerith, char>,
    reverse: HashMap<char, Hollerith>,
}

impl MapTable {
    pub fn new<S: Into<String>>(
        name: S,
        pairs: impl IntoIterator<Item = (Hollerith, char)>,
    ) -> Result<Self, CodeTableError> {
        let mut forward = HashMap::new();
        let mut reverse = HashMap::new();
        for (code, ch) in pairs {
            if forward.insert(code, ch).is_some() {
                return Err(CodeTableError::DuplicatePattern(code));
            }
            if reverse.insert(ch, code).is_some() {
                return Err(CodeTableError::DuplicateChar(ch, ch as u32));
            }
        }
        Ok(Self {
            name: name.into(),
            forward,
            reverse,
        })
    }

    pub fn from_file(file: &CodeTableFile) -> Result<Self, CodeTableError> {
        let mut pairs = Vec::with_capacity(file.entries.len());
        for (notation, &ch) in &file.entries {
            pairs.push((notation.parse::<Hollerith>()?, ch));
        }
        Self::new(file.name.clone(), pairs)
    }

    /// Snapshot any table into an editable map.
    pub fn from_table<T: CodeTable + ?Sized>(table: &T) -> Result<Self, CodeTableError> {
        Self::new(table.name().to_string(), table.entries())
    }

    pub fn to_file(&self) -> CodeTableFile {
        CodeTableFile {
            name: self.name.clone(),
            entries: self
                .forward
                .iter()
                .map(|(code, &ch)| (code.to_string(), ch))
                .collect(),
        }
    }
}

impl CodeTable for MapTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, code: Hollerith) -> Option<char> {
        self.forward.get(&code).copied()
    }

    fn encode(&self, ch: char) -> Option<Hollerith> {
        self.reverse.get(&ch).copied()
    }

    fn entries(&self) -> Vec<(Hollerith, char)> {
        let mut out: Vec<(Hollerith, char)> = self.forward.iter().map(|(&c, &ch)| (c, ch)).collect();
        out.sort_by_key(|(code, _)| *code);
        out
    }
}

/// Bit utilities: digit rows 0..9
fn digit(row: u8) -> Hollerith {
    // bit9 is row 0, bit0 is row 9
    Hollerith(1u16 << (9 - u16::from(row)))
}
fn zone11() -> Hollerith {
    Hollerith(1u16 << 10)
}
fn zone12() -> Hollerith {
    Hollerith(1u16 << 11)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn notation_round_trips_through_display() {
        let code: Hollerith = "12-0-8".parse().unwrap();
        assert_eq!(code, Hollerith(0b1010_0000_0010));
        assert_eq!(code.to_string(), "12-0-8");
        assert_eq!("blank".parse::<Hollerith>().unwrap(), Hollerith::BLANK);
        assert_eq!(Hollerith::BLANK.to_string(), "blank");
    }

    #[test]
    fn notation_rejects_bad_rows() {
        assert_eq!("12-13".parse::<Hollerith>(), Err(CodeTableError::Row(13)));
        assert!(matches!(
            "1-1".parse::<Hollerith>(),
            Err(CodeTableError::Notation(_))
        ));
        assert!(matches!(
            "x".parse::<Hollerith>(),
            Err(CodeTableError::Notation(_))
        ));
    }

    #[test]
    fn bits_follow_punch_order() {
        let code: Hollerith = "11-3".parse().unwrap();
        let bits = code.bits();
        assert!(bits[1]);
        assert!(bits[5]);
        assert_eq!(bits.iter().filter(|b| **b).count(), 2);
        assert_eq!(Hollerith::from_bits(&bits), code);
        assert_eq!(code.rows().collect::<Vec<_>>(), vec![11, 3]);
    }

    #[test]
    fn ebcdic_table_decodes_letters_digits_and_blank() {
        let table = EbcdicTable::new();
        assert_eq!(table.decode("12-1".parse().unwrap()), Some('A'));
        assert_eq!(table.decode("11-9".parse().unwrap()), Some('R'));
        assert_eq!(table.decode("0-2".parse().unwrap()), Some('S'));
        assert_eq!(table.decode("0".parse().unwrap()), Some('0'));
        assert_eq!(table.decode("9".parse().unwrap()), Some('9'));
        assert_eq!(table.decode(Hollerith::BLANK), Some(' '));
        assert_eq!(table.ebcdic("12-1".parse().unwrap()), Some(0xC1));
    }

    #[test]
    fn ebcdic_table_reports_unmapped_patterns() {
        let table = EbcdicTable::new();
        let code: Hollerith = "12-11-0-1-2-3".parse().unwrap();
        assert_eq!(table.decode(code), None);
        assert_eq!(table.decode_symbol(code), Symbol::Unknown(code));
        assert_eq!(table.decode_symbol(code).as_char(), UNKNOWN_MARKER);
    }

    #[test]
    fn danish_substitutions_replace_glyphs() {
        let table = EbcdicTable::danish();
        let hash = EbcdicTable::new().encode('#').unwrap();
        assert_eq!(table.decode(hash), Some('Æ'));
        assert_eq!(table.encode('Æ'), Some(hash));
    }

    #[test]
    fn danish_table_exports_one_to_one() {
        let danish = EbcdicTable::danish();
        let plain = EbcdicTable::new();
        for (ch, glyph) in [('#', 'Æ'), ('@', 'Ø'), ('$', 'Å')] {
            let native = plain.encode(glyph).unwrap();
            assert_eq!(danish.decode(native), Some(ch));
            assert_eq!(danish.encode(glyph), plain.encode(ch));
            assert_eq!(danish.encode(ch), Some(native));
        }

        let exported = MapTable::from_table(&danish).unwrap();
        assert_eq!(exported.entries().len(), 256);
        let reloaded = MapTable::from_file(&exported.to_file()).unwrap();
        for (code, ch) in danish.entries() {
            assert_eq!(reloaded.decode(code), Some(ch), "{}", code);
            assert_eq!(reloaded.encode(ch), Some(code));
        }
    }

    #[test]
    fn ibm029_agrees_with_ebcdic_on_common_characters() {
        let ebcdic = EbcdicTable::new();
        let keypunch = Ibm029Table::new();
        for ch in "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ &-/.<(+|!$*);,%_>?:#@'=\"".chars() {
            assert_eq!(
                keypunch.encode(ch),
                ebcdic.encode(ch),
                "disagreement on '{}'",
                ch
            );
        }
    }

    #[test]
    fn every_table_entry_round_trips() {
        let tables: Vec<Box<dyn CodeTable>> =
            vec![Box::new(EbcdicTable::new()), Box::new(Ibm029Table::new())];
        for table in &tables {
            for (code, ch) in table.entries() {
                assert_eq!(table.decode(code), Some(ch), "{} {}", table.name(), code);
            }
        }
    }

    #[test]
    fn map_table_loads_from_notation() {
        let mut entries = BTreeMap::new();
        entries.insert("12-1".to_string(), 'α');
        entries.insert("blank".to_string(), ' ');
        let table = MapTable::from_file(&CodeTableFile {
            name: "greek".to_string(),
            entries,
        })
        .unwrap();
        assert_eq!(table.decode("12-1".parse().unwrap()), Some('α'));
        assert_eq!(table.encode(' '), Some(Hollerith::BLANK));
        assert_eq!(table.to_file().entries.len(), 2);
    }

    #[test]
    fn map_table_rejects_duplicates() {
        let code: Hollerith = "1".parse().unwrap();
        let err = MapTable::new("dup", [(code, 'a'), (code, 'b')]).unwrap_err();
        assert_eq!(err, CodeTableError::DuplicatePattern(code));
        let err = MapTable::new("dup", [(code, 'a'), (Hollerith::BLANK, 'a')]).unwrap_err();
        assert_eq!(err, CodeTableError::DuplicateChar('a', 'a' as u32));
    }
}
