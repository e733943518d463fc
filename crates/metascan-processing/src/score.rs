//! Privacy score aggregation

use std::collections::BTreeSet;

use metascan_core::constants::NO_RISKS_MESSAGE;
use metascan_core::{RiskCategory, RiskFinding};
use serde::Serialize;

const MAX_SCORE: i32 = 100;

/// Points subtracted from 100 for each risk category present.
///
/// Tunable; the defaults keep GPS the heaviest and format mismatch among the
/// lightest, so adding any finding strictly lowers an unclamped score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
    pub gps: u8,
    pub script_injection: u8,
    pub steganography: u8,
    pub qr_code: u8,
    pub sensitive_metadata: u8,
    pub format_mismatch: u8,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            gps: 40,
            script_injection: 30,
            steganography: 20,
            qr_code: 15,
            sensitive_metadata: 10,
            format_mismatch: 10,
        }
    }
}

impl ScoreWeights {
    pub fn weight(&self, category: RiskCategory) -> u8 {
        match category {
            RiskCategory::Gps => self.gps,
            RiskCategory::ScriptInjection => self.script_injection,
            RiskCategory::Steganography => self.steganography,
            RiskCategory::QrCode => self.qr_code,
            RiskCategory::SensitiveMetadata => self.sensitive_metadata,
            RiskCategory::FormatMismatch => self.format_mismatch,
        }
    }
}

/// Presentation band for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Moderate,
    Critical,
}

impl ScoreBand {
    pub fn for_score(score: u8) -> Self {
        match score {
            80.. => ScoreBand::Excellent,
            60..=79 => ScoreBand::Good,
            40..=59 => ScoreBand::Moderate,
            _ => ScoreBand::Critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub privacy_score: u8,
    pub risks: Vec<String>,
}

/// Reduce ordered findings to a bounded score and the risk message list.
pub fn aggregate(findings: &[RiskFinding], weights: &ScoreWeights) -> ScoreOutcome {
    if findings.is_empty() {
        return ScoreOutcome {
            privacy_score: MAX_SCORE as u8,
            risks: vec![NO_RISKS_MESSAGE.to_string()],
        };
    }

    let categories: BTreeSet<RiskCategory> = findings.iter().map(|f| f.category).collect();
    let penalty: i32 = categories
        .iter()
        .map(|c| weights.weight(*c) as i32)
        .sum();

    ScoreOutcome {
        privacy_score: (MAX_SCORE - penalty).clamp(0, MAX_SCORE) as u8,
        risks: findings.iter().map(|f| f.message.clone()).collect(),
    }
}
