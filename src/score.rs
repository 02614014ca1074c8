use serde::Serialize;

use crate::session::INITIAL_SIZE;

pub const INITIAL_SCORE: &str = "20/200";

/// Snellen line for a stimulus size.
///
/// The denominator is `trunc(200 * (size / 250) * 4)`, computed in exactly
/// that order so the float rounding matches the kiosk's reference numbers
/// (250 -> 200 gives "20/640", 128 gives "20/409").
pub fn score_line(size: f64) -> String {
    let denominator = (200.0 * (size / INITIAL_SIZE) * 4.0) as i64;
    format!("20/{}", denominator)
}

/// Parses the denominator out of a `20/N` score line
pub fn denominator(score: &str) -> Option<i64> {
    score.split('/').nth(1)?.trim().parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum Remark {
    #[strum(serialize = "excellent")]
    Excellent,
    #[strum(serialize = "good/normal range")]
    Good,
    #[strum(serialize = "fair, consider consultation")]
    Fair,
    #[strum(serialize = "poor, recommend specialist consultation")]
    Poor,
    #[strum(serialize = "incomplete/inconclusive")]
    Inconclusive,
}

impl Remark {
    pub fn from_denominator(d: i64) -> Self {
        match d {
            d if d <= 20 => Remark::Excellent,
            d if d <= 30 => Remark::Good,
            d if d <= 50 => Remark::Fair,
            _ => Remark::Poor,
        }
    }

    pub fn from_score_line(score: &str) -> Self {
        denominator(score).map_or(Remark::Inconclusive, Self::from_denominator)
    }

    /// Longer wording shown to the person at the kiosk
    pub fn operator_text(&self) -> &'static str {
        match self {
            Remark::Excellent => "Vision is Excellent! Your acuity is better than average.",
            Remark::Good => "Vision is Good. Your acuity is within the normal range.",
            Remark::Fair => "Vision is Fair. You may need a professional consultation.",
            Remark::Poor => {
                "Vision is Poor. Immediate consultation with an eye care specialist is recommended."
            }
            Remark::Inconclusive => "Test was incomplete or results were inconclusive.",
        }
    }
}
