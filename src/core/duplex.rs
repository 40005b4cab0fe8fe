//! Front/back verification of duplex scans.
//!
//! Both faces of a card show the same holes. The back is read with the row
//! order mirrored, so a correct pair yields identical patterns and any
//! difference points at a misread.

use serde::{Deserialize, Serialize};

use crate::core::encoding::Hollerith;
use crate::core::punchcards::PunchPattern;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "verdict")]
pub enum DuplexVerdict {
    Good,
    Bad { columns: Vec<ColumnMismatch> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMismatch {
    pub column: usize,
    pub front: Hollerith,
    pub back: Hollerith,
}

impl DuplexVerdict {
    pub fn is_good(&self) -> bool {
        matches!(self, DuplexVerdict::Good)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DuplexVerdict::Good => "good",
            DuplexVerdict::Bad { .. } => "bad",
        }
    }
}

pub fn compare_duplex(front: &PunchPattern, back: &PunchPattern) -> DuplexVerdict {
    let columns: Vec<ColumnMismatch> = front
        .diff(back)
        .into_iter()
        .map(|column| ColumnMismatch {
            column,
            front: front.column(column),
            back: back.column(column),
        })
        .collect();
    if columns.is_empty() {
        DuplexVerdict::Good
    } else {
        log::debug!("duplex pair disagrees in {} columns", columns.len());
        DuplexVerdict::Bad { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoding::EbcdicTable;
    use pretty_assertions::assert_eq;

    #[test]
    fn identical_faces_are_good() {
        let card = PunchPattern::from_text(&EbcdicTable::new(), "IDENTIFICATION DIVISION.").unwrap();
        let verdict = compare_duplex(&card, &card.clone());
        assert!(verdict.is_good());
        assert_eq!(verdict.label(), "good");
    }

    #[test]
    fn differing_columns_are_listed() {
        let table = EbcdicTable::new();
        let front = PunchPattern::from_text(&table, "MOVE A TO B").unwrap();
        let back = PunchPattern::from_text(&table, "MOVE A TO C").unwrap();
        let verdict = compare_duplex(&front, &back);
        assert_eq!(
            verdict,
            DuplexVerdict::Bad {
                columns: vec![ColumnMismatch {
                    column: 10,
                    front: "12-2".parse().unwrap(),
                    back: "12-3".parse().unwrap(),
                }]
            }
        );
        assert_eq!(verdict.label(), "bad");
    }
}
