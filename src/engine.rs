use crate::error::{FinancialReviewError, Result};
use crate::keywords::{lookup, KeywordIndex};
use crate::schema::{
    AnalysisResult, ChangedAccount, Concept, FinancialStatements, NormalizedLedger, RatioReport,
    RatioValue,
};
use crate::utils::round2;
use log::{debug, info, warn};
use std::collections::BTreeMap;

pub const DEFAULT_CHANGE_THRESHOLD: f64 = 0.3;

/// Computes ratios, profitability, cost structure and change detection over
/// a set of cleaned statements. Holds no state besides the keyword table, so
/// repeated runs over the same input give the same result.
pub struct MetricsEngine<'a> {
    keywords: &'a KeywordIndex,
}

impl<'a> MetricsEngine<'a> {
    pub fn new(keywords: &'a KeywordIndex) -> Self {
        Self { keywords }
    }

    fn require(&self, ledger: &NormalizedLedger, concept: Concept) -> Result<i64> {
        lookup(ledger, self.keywords.keywords_for(concept)).ok_or_else(|| {
            FinancialReviewError::MissingLineItem(format!(
                "{} ({})",
                concept.label(),
                self.keywords.keywords_for(concept).join(", ")
            ))
        })
    }

    fn compute_ratios(&self, balance_sheet: &NormalizedLedger) -> Result<(RatioValue, RatioValue)> {
        let current_assets = self.require(balance_sheet, Concept::CurrentAssets)?;
        let current_liabilities = self.require(balance_sheet, Concept::CurrentLiabilities)?;
        let total_liabilities = self.require(balance_sheet, Concept::TotalLiabilities)?;
        let total_equity = self.require(balance_sheet, Concept::TotalEquity)?;

        debug!(
            "Ratio inputs: current assets {}, current liabilities {}, total liabilities {}, total equity {}",
            current_assets, current_liabilities, total_liabilities, total_equity
        );

        Ok((
            percent_ratio(current_assets, current_liabilities),
            percent_ratio(total_liabilities, total_equity),
        ))
    }

    /// Current ratio and debt ratio in percent.
    ///
    /// A zero denominator leaves that ratio undefined. A required item that
    /// matches no row fails the whole report, since both ratios come from
    /// the same balance sheet.
    pub fn calculate_ratios(&self, balance_sheet: &NormalizedLedger) -> RatioReport {
        match self.compute_ratios(balance_sheet) {
            Ok((current_ratio, debt_ratio)) => RatioReport::Computed {
                current_ratio,
                debt_ratio,
            },
            Err(e) => {
                warn!("Ratio computation failed: {}", e);
                RatioReport::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    fn lookup_section(
        &self,
        ledger: &NormalizedLedger,
        concepts: &[Concept],
        missing: &mut Vec<Concept>,
    ) -> BTreeMap<Concept, i64> {
        concepts
            .iter()
            .map(|&concept| {
                let value = lookup(ledger, self.keywords.keywords_for(concept)).unwrap_or_else(|| {
                    warn!("No account matched {}; using 0", concept.label());
                    missing.push(concept);
                    0
                });
                (concept, value)
            })
            .collect()
    }

    pub fn calculate_profitability(&self, income_statement: &NormalizedLedger) -> BTreeMap<Concept, i64> {
        self.lookup_section(income_statement, &Concept::PROFITABILITY, &mut Vec::new())
    }

    pub fn summarize_cost_structure(&self, cost_sheet: &NormalizedLedger) -> BTreeMap<Concept, i64> {
        self.lookup_section(cost_sheet, &Concept::COST_STRUCTURE, &mut Vec::new())
    }

    pub fn analyze(&self, statements: &FinancialStatements, threshold: f64) -> AnalysisResult {
        let mut missing_line_items = Vec::new();

        let ratios = self.calculate_ratios(&statements.balance_sheet);
        let profitability = self.lookup_section(
            &statements.income_statement,
            &Concept::PROFITABILITY,
            &mut missing_line_items,
        );
        let cost_structure = self.lookup_section(
            &statements.cost_sheet,
            &Concept::COST_STRUCTURE,
            &mut missing_line_items,
        );
        let large_changes = detect_large_changes(statements, threshold);

        info!(
            "Analysis complete: {} large changes at threshold {:.0}%, {} missing line items",
            large_changes.len(),
            threshold * 100.0,
            missing_line_items.len()
        );

        AnalysisResult {
            ratios,
            profitability,
            cost_structure,
            large_changes,
            missing_line_items,
        }
    }
}

fn percent_ratio(numerator: i64, denominator: i64) -> RatioValue {
    if denominator == 0 {
        return None;
    }
    Some(round2(numerator as f64 / denominator as f64 * 100.0))
}

/// Rows across all three statements whose change ratio is at least
/// `threshold`, largest change first. Rows with a zero prior amount have no
/// ratio and are skipped. Equal ratios keep statement and row order.
pub fn detect_large_changes(statements: &FinancialStatements, threshold: f64) -> Vec<ChangedAccount> {
    let mut changes: Vec<ChangedAccount> = statements
        .combined()
        .filter_map(|(statement, row)| {
            let change_ratio = row.change_ratio()?;
            (change_ratio >= threshold).then(|| ChangedAccount {
                statement,
                account_name: row.account_name.clone(),
                current_amount: row.current_amount,
                prior_amount: row.prior_amount,
                change_ratio,
            })
        })
        .collect();

    changes.sort_by(|a, b| b.change_ratio.total_cmp(&a.change_ratio));
    changes
}

pub fn calculate_ratios(balance_sheet: &NormalizedLedger) -> RatioReport {
    MetricsEngine::new(&KeywordIndex::standard()).calculate_ratios(balance_sheet)
}

pub fn calculate_profitability(income_statement: &NormalizedLedger) -> BTreeMap<Concept, i64> {
    MetricsEngine::new(&KeywordIndex::standard()).calculate_profitability(income_statement)
}

pub fn summarize_cost_structure(cost_sheet: &NormalizedLedger) -> BTreeMap<Concept, i64> {
    MetricsEngine::new(&KeywordIndex::standard()).summarize_cost_structure(cost_sheet)
}

/// Runs the full analysis with the standard keyword table.
pub fn analyze(statements: &FinancialStatements, threshold: f64) -> AnalysisResult {
    analyze_with_keywords(statements, &KeywordIndex::standard(), threshold)
}

pub fn analyze_with_keywords(
    statements: &FinancialStatements,
    keywords: &KeywordIndex,
    threshold: f64,
) -> AnalysisResult {
    MetricsEngine::new(keywords).analyze(statements, threshold)
}
