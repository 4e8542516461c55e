//! Letter grades and pass percentages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConformanceError;
use crate::runner::{TestCaseOutcome, TestCaseStatus};

/// Letter grade, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GradeLetter {
    A,
    B,
    C,
    D,
    F,
}

/// Severity bucket a grade falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeSeverity {
    /// A or B
    Pass,
    /// C or D
    Warn,
    /// F
    Fail,
}

/// Letter grade with its severity bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    /// Letter grade
    pub letter: GradeLetter,
    /// Severity bucket of the letter
    pub severity: GradeSeverity,
}

/// Map a pass percentage to a grade. Anything below 60, NaN included, is an F.
pub fn grade(percentage: f64) -> Grade {
    let (letter, severity) = if percentage >= 90.0 {
        (GradeLetter::A, GradeSeverity::Pass)
    } else if percentage >= 80.0 {
        (GradeLetter::B, GradeSeverity::Pass)
    } else if percentage >= 70.0 {
        (GradeLetter::C, GradeSeverity::Warn)
    } else if percentage >= 60.0 {
        (GradeLetter::D, GradeSeverity::Warn)
    } else {
        (GradeLetter::F, GradeSeverity::Fail)
    };
    Grade { letter, severity }
}

impl GradeLetter {
    /// Letter as a one-character string
    pub fn as_str(&self) -> &'static str {
        match self {
            GradeLetter::A => "A",
            GradeLetter::B => "B",
            GradeLetter::C => "C",
            GradeLetter::D => "D",
            GradeLetter::F => "F",
        }
    }

    /// True when `self` is as good as `minimum` or better
    pub fn meets(&self, minimum: GradeLetter) -> bool {
        *self <= minimum
    }
}

impl fmt::Display for GradeLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradeLetter {
    type Err = ConformanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(GradeLetter::A),
            "B" => Ok(GradeLetter::B),
            "C" => Ok(GradeLetter::C),
            "D" => Ok(GradeLetter::D),
            "F" => Ok(GradeLetter::F),
            other => Err(ConformanceError::configuration(format!(
                "Unknown grade '{other}', expected one of A, B, C, D, F"
            ))),
        }
    }
}

impl fmt::Display for GradeSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GradeSeverity::Pass => "pass",
            GradeSeverity::Warn => "warn",
            GradeSeverity::Fail => "fail",
        })
    }
}

/// How outcomes count toward the pass percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Undocumented enum values still count as passed
    pub count_warnings_as_passed: bool,
    /// Optional fields the host left out are not scored at all
    pub skip_missing_optional: bool,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            count_warnings_as_passed: true,
            skip_missing_optional: true,
        }
    }
}

/// Aggregate of a batch of test case results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Every outcome, scored or skipped
    pub total: u32,
    /// Outcomes with status `provided`
    pub provided: u32,
    /// Outcomes with status `warn`
    pub warned: u32,
    /// Outcomes with status `invalid`
    pub invalid: u32,
    /// Outcomes with status `missing`, skipped ones included
    pub missing: u32,
    /// Outcomes left out of the percentage
    pub skipped: u32,
    /// Outcomes counted as passed under the policy
    pub passed: u32,
    /// 0.0 to 100.0
    pub percentage: f64,
    /// Grade of `percentage`
    pub grade: Grade,
}

impl ScoreSummary {
    /// Tally `outcomes` under `policy`
    pub fn from_outcomes(outcomes: &[TestCaseOutcome], policy: &ScoringPolicy) -> Self {
        let (mut provided, mut warned, mut invalid, mut missing, mut skipped) = (0, 0, 0, 0, 0);

        for outcome in outcomes {
            match outcome.result.status {
                TestCaseStatus::Provided => provided += 1,
                TestCaseStatus::Warn => warned += 1,
                TestCaseStatus::Invalid => invalid += 1,
                TestCaseStatus::Missing => {
                    missing += 1;
                    if outcome.case.optional && policy.skip_missing_optional {
                        skipped += 1;
                    }
                }
            }
        }

        let total = outcomes.len() as u32;
        let passed = if policy.count_warnings_as_passed {
            provided + warned
        } else {
            provided
        };
        let scored = total - skipped;
        let percentage = if scored > 0 {
            f64::from(passed) / f64::from(scored) * 100.0
        } else {
            0.0
        };

        Self {
            total,
            provided,
            warned,
            invalid,
            missing,
            skipped,
            passed,
            percentage,
            grade: grade(percentage),
        }
    }

    /// Outcomes that count toward the percentage
    pub fn scored(&self) -> u32 {
        self.total - self.skipped
    }
}
