//! # Financial Statement Review
//!
//! A library for turning raw spreadsheet exports of a company's financial
//! statements into a clean ledger and a set of auditable figures.
//!
//! ## Core Concepts
//!
//! - **Raw Grid**: Untyped cells from a statement export, with title rows and split amount columns
//! - **Normalized Ledger**: Account name plus current and prior period amounts, one row per line item
//! - **Keyword Index**: Ordered substrings that locate a financial concept among noisy account names
//! - **Analysis Result**: Liquidity/leverage ratios, profitability, cost structure and large changes
//!
//! Data flows one way: raw grids are cleaned into ledgers, the ledgers are
//! analyzed, and the result is handed to a narrative generator. Cleaning
//! never fails; unparseable cells become zero and unnamed rows are dropped.
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_statement_review::*;
//!
//! let config = ReviewConfig::new("ACME Corp").with_change_threshold(0.3);
//!
//! let bs = RawGrid::from_csv_path("data/BS.csv")?;
//! let pl = RawGrid::from_csv_path("data/PL.csv")?;
//! let msc = RawGrid::from_csv_path("data/MSC.csv")?;
//!
//! let result = FinancialReviewProcessor::process(&config, &bs, &pl, &msc)?;
//! println!("{}", result.to_json()?);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod ingestion;
pub mod keywords;
pub mod report;
pub mod schema;
pub mod utils;

pub use config::ReviewConfig;
pub use engine::{
    analyze, analyze_with_keywords, calculate_profitability, calculate_ratios,
    detect_large_changes, summarize_cost_structure, MetricsEngine, DEFAULT_CHANGE_THRESHOLD,
};
pub use error::{FinancialReviewError, Result};
pub use grid::RawGrid;
pub use ingestion::*;
pub use keywords::{find_value, lookup, KeywordEntry, KeywordIndex};
pub use report::{
    build_narrative_prompt, generate_narrative, large_changes_markdown, NarrativeGenerator,
};
pub use schema::*;
pub use utils::*;

use log::{debug, info};

pub struct FinancialReviewProcessor;

impl FinancialReviewProcessor {
    /// Cleans the three exports and analyzes them with the config's
    /// threshold and keyword table.
    pub fn process(
        config: &ReviewConfig,
        bs_grid: &RawGrid,
        pl_grid: &RawGrid,
        msc_grid: &RawGrid,
    ) -> Result<AnalysisResult> {
        config.validate()?;

        info!("Reviewing financial statements for: {}", config.company_name);
        debug!(
            "Change threshold {:.2}, {} keyword entries",
            config.change_threshold,
            config.keywords.entries().len()
        );

        let statements = load(bs_grid, pl_grid, msc_grid);
        Ok(Self::analyze(config, &statements))
    }

    /// Analyzes already-cleaned statements. The config is assumed valid.
    pub fn analyze(config: &ReviewConfig, statements: &FinancialStatements) -> AnalysisResult {
        analyze_with_keywords(statements, &config.keywords, config.change_threshold)
    }
}

pub fn process_financial_statements(
    config: &ReviewConfig,
    bs_grid: &RawGrid,
    pl_grid: &RawGrid,
    msc_grid: &RawGrid,
) -> Result<AnalysisResult> {
    FinancialReviewProcessor::process(config, bs_grid, pl_grid, msc_grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> RawGrid {
        RawGrid::from_rows(rows.iter().map(|row| row.iter().copied()))
    }

    #[test]
    fn test_end_to_end_processing() {
        let bs = grid(&[
            &["재무상태표"],
            &["제 5 기 2023.12.31 현재"],
            &["과목", "당기", "", "전기", ""],
            &["Ⅰ. 유동자산", "", "500", "", "500"],
            &["Ⅰ. 유동부채", "", "250", "", "250"],
            &["부 채 총 계", "400", "", "400", ""],
            &["자 본 총 계", "200", "", "200", ""],
        ]);
        let pl = grid(&[
            &["손익계산서"],
            &["과목", "당기", "", "전기", ""],
            &["Ⅰ. 매출액", "1,000", "", "1,000", ""],
            &["Ⅹ. 당기순이익", "100", "", "100", ""],
        ]);
        let msc = grid(&[&["제조원가명세서"], &["과목", "당기", "", "전기", ""]]);

        let config = ReviewConfig::new("Test Company");
        let result = FinancialReviewProcessor::process(&config, &bs, &pl, &msc).unwrap();

        assert_eq!(
            result.ratios,
            RatioReport::Computed {
                current_ratio: Some(200.0),
                debt_ratio: Some(200.0),
            }
        );
        assert_eq!(result.profitability_of(Concept::Revenue), 1000);
        assert_eq!(result.profitability_of(Concept::NetIncome), 100);
        assert!(result.large_changes.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected_before_loading() {
        let empty = RawGrid::default();
        let config = ReviewConfig::new("Test Company").with_change_threshold(-1.0);

        let result = process_financial_statements(&config, &empty, &empty, &empty);
        assert!(matches!(result, Err(FinancialReviewError::InvalidThreshold(_))));
    }
}
