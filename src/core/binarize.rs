use serde::{Deserialize, Serialize};

use crate::core::config::ScanThresholds;

/// Outcome of one hole/no-hole decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoleDecision {
    pub punched: bool,
    /// Background minus hole intensity.
    pub contrast: f32,
    /// 0 right at the threshold, 1 at one ambiguity band or more away.
    pub confidence: f32,
}

impl HoleDecision {
    pub fn is_low_confidence(&self) -> bool {
        self.confidence < 1.0
    }
}

/// Turns a measured hole intensity into a bit, relative to the local card stock.
///
/// A fixed global cutoff fails on coloured stock and printed cards, so the
/// decision compares the probe with a background sample taken next to it.
/// Dark handwriting produces spurious dark spots; those rarely reach the
/// full margin, and anything short of it reads as unpunched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binarizer {
    margin: f32,
    ceiling: f32,
    band: f32,
}

impl Binarizer {
    pub fn new(thresholds: &ScanThresholds) -> Self {
        Self {
            margin: thresholds.hole_margin,
            ceiling: thresholds.hole_ceiling,
            band: thresholds.ambiguity_band,
        }
    }

    pub fn decide(&self, hole: f32, background: f32) -> HoleDecision {
        let contrast = background - hole;
        let by_margin = contrast - self.margin;
        let by_ceiling = self.ceiling - hole;
        let punched = by_margin >= 0.0 && by_ceiling >= 0.0;
        // distance to whichever test decided the outcome
        let distance = if punched {
            by_margin.min(by_ceiling)
        } else if by_margin < 0.0 {
            -by_margin
        } else {
            -by_ceiling
        };
        let confidence = if self.band > 0.0 {
            (distance / self.band).clamp(0.0, 1.0)
        } else {
            1.0
        };
        HoleDecision {
            punched,
            contrast,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binarizer() -> Binarizer {
        Binarizer::new(&ScanThresholds::default())
    }

    #[test]
    fn clear_hole_is_punched_with_full_confidence() {
        let d = binarizer().decide(15.0, 220.0);
        assert!(d.punched);
        assert_eq!(d.confidence, 1.0);
        assert_eq!(d.contrast, 205.0);
    }

    #[test]
    fn stock_variation_never_reads_as_hole() {
        let b = binarizer();
        for (hole, background) in [(220.0, 220.0), (200.0, 230.0), (180.0, 215.0), (160.0, 150.0)] {
            let d = b.decide(hole, background);
            assert!(!d.punched, "{hole} vs {background}");
            assert!(!d.is_low_confidence());
        }
    }

    #[test]
    fn margin_is_relative_to_background() {
        let b = binarizer();
        // Dark stock: a hole only 70 below it still counts.
        assert!(b.decide(20.0, 90.0).punched);
        // Light stock: a grey smudge 70 below it is above the ceiling.
        assert!(!b.decide(160.0, 230.0).punched);
    }

    #[test]
    fn ambiguous_cases_fall_to_unpunched_and_are_flagged() {
        let b = binarizer();
        let d = b.decide(150.0, 205.0);
        assert!(!d.punched);
        assert!(d.is_low_confidence());
        let d = b.decide(95.0, 200.0);
        assert!(d.punched);
        assert!(d.is_low_confidence());
    }
}
