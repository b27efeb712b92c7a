//! Named, tabular views of estimation and elimination results.

use premia_estimators::{EliminationOutcome, EliminationStatus, RiskPremiaResult};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// The number of factor names does not match the number of factors.
    #[error("Expected {expected} factor names, got {actual}")]
    FactorNames {
        /// Number of factors in the result.
        expected: usize,
        /// Number of names supplied.
        actual: usize,
    },

    /// The result carries a different number of standard errors than premia.
    #[error("Expected {expected} standard errors, got {actual}")]
    StandardErrors {
        /// Number of premia in the result.
        expected: usize,
        /// Number of standard errors in the result.
        actual: usize,
    },

    /// An elimination outcome references a factor index without a name.
    #[error("Factor index {index} has no name ({available} names supplied)")]
    UnknownFactor {
        /// Original factor index.
        index: usize,
        /// Number of names supplied.
        available: usize,
    },
}

/// Two-sided p-value of a t-statistic under the standard normal.
pub fn p_value(t_statistic: f64) -> f64 {
    2.0 * (1.0 - Normal::standard().cdf(t_statistic.abs()))
}

/// Conventional significance marker for a p-value.
pub fn significance_stars(p_value: f64) -> &'static str {
    if p_value < 0.01 {
        "***"
    } else if p_value < 0.05 {
        "**"
    } else if p_value < 0.10 {
        "*"
    } else {
        ""
    }
}

/// One factor of a [`RiskPremiaReport`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactorPremiumRow {
    /// Factor name.
    pub factor: String,

    /// Estimated risk premium.
    pub premium: f64,

    /// HAC standard error, if computed.
    pub standard_error: Option<f64>,

    /// Premium over standard error.
    pub t_statistic: Option<f64>,

    /// Two-sided normal p-value.
    pub p_value: Option<f64>,

    /// `***`, `**`, `*` or empty.
    pub significance: String,
}

/// Risk premia with names and inference statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskPremiaReport {
    /// Estimator short name (`FM` or `KRS`).
    pub estimator: String,

    /// One row per factor, in input order.
    pub rows: Vec<FactorPremiumRow>,
}

impl RiskPremiaReport {
    /// Build a report from an estimation result and one name per factor.
    pub fn from_result(
        result: &RiskPremiaResult,
        factor_names: &[&str],
    ) -> Result<Self, ReportError> {
        let n_factors = result.n_factors();
        if factor_names.len() != n_factors {
            return Err(ReportError::FactorNames {
                expected: n_factors,
                actual: factor_names.len(),
            });
        }

        let n_standard_errors = result.standard_errors.as_ref().map_or(n_factors, |se| se.len());
        if n_standard_errors != n_factors {
            return Err(ReportError::StandardErrors {
                expected: n_factors,
                actual: n_standard_errors,
            });
        }

        let t_statistics = result.t_statistics();
        let rows = factor_names
            .iter()
            .enumerate()
            .map(|(k, name)| {
                let t_statistic = t_statistics.as_ref().map(|t| t[k]);
                let p = t_statistic.map(p_value);
                FactorPremiumRow {
                    factor: (*name).to_string(),
                    premium: result.risk_premia[k],
                    standard_error: result.standard_errors.as_ref().map(|se| se[k]),
                    t_statistic,
                    p_value: p,
                    significance: p.map(significance_stars).unwrap_or_default().to_string(),
                }
            })
            .collect();

        Ok(Self {
            estimator: result.estimator.name().to_string(),
            rows,
        })
    }

    /// Render as a fixed-width text table.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nRisk Premia ({})\n", self.estimator));
        output.push_str(&"=".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "{:<20} {:>12} {:>12} {:>10} {:>10} {:<4}\n",
            "Factor", "Premium", "Std. Error", "t-stat", "p-value", ""
        ));
        output.push_str(&"-".repeat(72));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!(
                "{:<20} {:>12.6} {:>12} {:>10} {:>10} {:<4}\n",
                row.factor,
                row.premium,
                fixed(row.standard_error, 6),
                fixed(row.t_statistic, 3),
                fixed(row.p_value, 4),
                row.significance
            ));
        }

        output.push_str(&"=".repeat(72));
        output.push('\n');
        output.push_str("Significance: *** p<0.01, ** p<0.05, * p<0.10\n");
        output
    }

    /// Render as a Markdown table.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Risk Premia ({})\n\n", self.estimator));
        output.push_str("| Factor | Premium | Std. Error | t-stat | p-value | |\n");
        output.push_str("|--------|--------:|-----------:|-------:|--------:|---|\n");
        for row in &self.rows {
            output.push_str(&format!(
                "| {} | {:.6} | {} | {} | {} | {} |\n",
                row.factor,
                row.premium,
                fixed(row.standard_error, 6),
                fixed(row.t_statistic, 3),
                fixed(row.p_value, 4),
                row.significance
            ));
        }
        output
    }
}

/// A factor removed during elimination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemovedFactor {
    /// Removal order, starting at 1.
    pub step: usize,

    /// Factor name.
    pub factor: String,

    /// t-statistic at the time of removal.
    pub t_statistic: f64,
}

/// A factor that survived elimination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetainedFactor {
    /// Factor name.
    pub factor: String,

    /// t-statistic at the final step.
    pub t_statistic: f64,
}

/// Named summary of an elimination run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EliminationReport {
    /// How the search ended.
    pub status: EliminationStatus,

    /// Fixed Bonferroni critical value.
    pub critical_value: f64,

    /// Bonferroni multiplicity.
    pub bonferroni_constant: usize,

    /// Surviving factors in original order.
    pub retained: Vec<RetainedFactor>,

    /// Removed factors in removal order.
    pub removed: Vec<RemovedFactor>,
}

impl EliminationReport {
    /// Build a report from an elimination outcome and the names of all
    /// candidate factors.
    pub fn from_outcome(
        outcome: &EliminationOutcome,
        factor_names: &[&str],
    ) -> Result<Self, ReportError> {
        let name = |index: usize| {
            factor_names
                .get(index)
                .map(|name| (*name).to_string())
                .ok_or(ReportError::UnknownFactor {
                    index,
                    available: factor_names.len(),
                })
        };

        let retained = outcome
            .retained
            .iter()
            .zip(outcome.t_statistics.iter())
            .map(|(&index, &t_statistic)| {
                Ok(RetainedFactor {
                    factor: name(index)?,
                    t_statistic,
                })
            })
            .collect::<Result<Vec<_>, ReportError>>()?;

        let removed = outcome
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                Ok(RemovedFactor {
                    step: i + 1,
                    factor: name(step.removed)?,
                    t_statistic: step.t_statistic,
                })
            })
            .collect::<Result<Vec<_>, ReportError>>()?;

        Ok(Self {
            status: outcome.status,
            critical_value: outcome.critical_value,
            bonferroni_constant: outcome.bonferroni_constant,
            retained,
            removed,
        })
    }

    /// Render as a fixed-width text table.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str("\nFactor Elimination\n");
        output.push_str(&format!(
            "Critical value: {:.4} (M = {})\n",
            self.critical_value, self.bonferroni_constant
        ));
        output.push_str(&format!("Status: {:?}\n", self.status));
        output.push_str(&"=".repeat(48));
        output.push('\n');
        output.push_str(&format!("{:<8} {:<20} {:>10}\n", "Step", "Removed", "t-stat"));
        output.push_str(&"-".repeat(48));
        output.push('\n');
        for removed in &self.removed {
            output.push_str(&format!(
                "{:<8} {:<20} {:>10.3}\n",
                removed.step, removed.factor, removed.t_statistic
            ));
        }
        output.push_str(&"-".repeat(48));
        output.push('\n');
        output.push_str(&format!("{:<8} {:<20} {:>10}\n", "", "Retained", "t-stat"));
        for retained in &self.retained {
            output.push_str(&format!(
                "{:<8} {:<20} {:>10.3}\n",
                "", retained.factor, retained.t_statistic
            ));
        }
        output.push_str(&"=".repeat(48));
        output.push('\n');
        output
    }

    /// Render as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Factor Elimination\n\n");
        output.push_str(&format!(
            "**Status:** {:?}  \n**Critical value:** {:.4} (M = {})\n\n",
            self.status, self.critical_value, self.bonferroni_constant
        ));

        output.push_str("## Removed\n\n");
        output.push_str("| Step | Factor | t-stat |\n");
        output.push_str("|-----:|--------|-------:|\n");
        for removed in &self.removed {
            output.push_str(&format!(
                "| {} | {} | {:.3} |\n",
                removed.step, removed.factor, removed.t_statistic
            ));
        }

        output.push_str("\n## Retained\n\n");
        output.push_str("| Factor | t-stat |\n");
        output.push_str("|--------|-------:|\n");
        for retained in &self.retained {
            output.push_str(&format!("| {} | {:.3} |\n", retained.factor, retained.t_statistic));
        }
        output
    }
}

fn fixed(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use premia_estimators::{EliminationStep, Estimator};
    use rstest::rstest;

    fn result() -> RiskPremiaResult {
        RiskPremiaResult {
            estimator: Estimator::Krs,
            risk_premia: array![0.006, -0.001, 0.02],
            standard_errors: Some(array![0.002, 0.004, 0.01]),
        }
    }

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(1.959963984540054, 0.05)]
    #[case(-2.5758293035489, 0.01)]
    fn test_p_value(#[case] t: f64, #[case] expected: f64) {
        assert_relative_eq!(p_value(t), expected, epsilon = 1e-9);
    }

    #[rstest]
    #[case(0.001, "***")]
    #[case(0.03, "**")]
    #[case(0.07, "*")]
    #[case(0.5, "")]
    fn test_significance_stars(#[case] p: f64, #[case] expected: &str) {
        assert_eq!(significance_stars(p), expected);
    }

    #[test]
    fn test_rows_follow_result() {
        let report = RiskPremiaReport::from_result(&result(), &["MKT", "SMB", "HML"]).unwrap();

        assert_eq!(report.estimator, "KRS");
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].factor, "MKT");
        assert_relative_eq!(report.rows[0].t_statistic.unwrap(), 3.0, epsilon = 1e-12);
        assert_eq!(report.rows[0].significance, "***");
        assert_eq!(report.rows[1].significance, "");
        assert_eq!(report.rows[2].significance, "**");
    }

    #[test]
    fn test_without_standard_errors() {
        let mut result = result();
        result.standard_errors = None;
        let report = RiskPremiaReport::from_result(&result, &["MKT", "SMB", "HML"]).unwrap();

        assert!(report.rows.iter().all(|row| row.p_value.is_none()));
        assert!(report.to_ascii_table().contains(" - "));
    }

    #[test]
    fn test_name_count_checked() {
        assert_eq!(
            RiskPremiaReport::from_result(&result(), &["MKT"]),
            Err(ReportError::FactorNames {
                expected: 3,
                actual: 1
            })
        );
    }

    #[test]
    fn test_standard_error_count_checked() {
        let mut result = result();
        result.standard_errors = Some(array![0.002, 0.004]);
        assert_eq!(
            RiskPremiaReport::from_result(&result, &["MKT", "SMB", "HML"]),
            Err(ReportError::StandardErrors {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_elimination_report() {
        let outcome = EliminationOutcome {
            status: EliminationStatus::Significant,
            retained: vec![0, 2],
            t_statistics: array![4.2, -3.1],
            steps: vec![EliminationStep {
                retained_before: vec![0, 1, 2],
                removed: 1,
                t_statistic: 0.4,
            }],
            critical_value: 2.39,
            bonferroni_constant: 3,
        };

        let report = EliminationReport::from_outcome(&outcome, &["MKT", "SMB", "HML"]).unwrap();
        assert_eq!(report.removed[0].factor, "SMB");
        assert_eq!(report.removed[0].step, 1);
        assert_eq!(report.retained[1].factor, "HML");

        let markdown = report.to_markdown();
        assert!(markdown.contains("| 1 | SMB | 0.400 |"));
        assert!(report.to_ascii_table().contains("M = 3"));

        assert_eq!(
            EliminationReport::from_outcome(&outcome, &["MKT"]),
            Err(ReportError::UnknownFactor {
                index: 2,
                available: 1
            })
        );
    }
}
