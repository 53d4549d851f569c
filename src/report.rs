use crate::config::ReviewConfig;
use crate::error::Result;
use crate::schema::{AnalysisResult, ChangedAccount, Concept, RatioReport, RatioValue};
use chrono::NaiveDate;
use log::info;
use std::collections::BTreeMap;

/// Returned in place of a prompt when the ratio section failed.
pub const INCOMPLETE_ANALYSIS_MESSAGE: &str =
    "The analysis could not be completed because required items were not found in the financial statements.";

const CONCLUSION_INSTRUCTIONS: &str = r#"### Conclusion and Recommendations

- Summarize what the figures above say about the company
- Comment on items below or above the usual benchmarks
- Relate the manufacturing cost structure to profitability
- Briefly suggest likely causes of the large changes

Write in the style of a professional financial review. Give every section a clear heading, and round figures so they read concisely.
"#;

/// External text-generation service that turns a prompt into narrative.
pub trait NarrativeGenerator {
    fn generate(&self, prompt: &str) -> Result<String>;
}

fn format_ratio(value: RatioValue) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => "N/A".to_string(),
    }
}

fn format_section(section: &BTreeMap<Concept, i64>) -> String {
    let mut output = String::new();
    for (concept, amount) in section {
        output.push_str(&format!("- {}: {}\n", concept.label(), amount));
    }
    output
}

/// Markdown table of the accounts that moved past the change threshold.
pub fn large_changes_markdown(changes: &[ChangedAccount]) -> String {
    let mut output = String::new();
    output.push_str("| Statement | Account | Current | Prior | Change |\n");
    output.push_str("|---|---|---:|---:|---:|\n");

    for change in changes {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {:.1}% |\n",
            change.statement.name(),
            change.account_name,
            change.current_amount,
            change.prior_amount,
            change.change_ratio * 100.0
        ));
    }

    output
}

/// Prompt handed to the narrative generator.
pub fn build_narrative_prompt(
    result: &AnalysisResult,
    config: &ReviewConfig,
    report_date: NaiveDate,
) -> String {
    let (current_ratio, debt_ratio) = match &result.ratios {
        RatioReport::Failed { .. } => return INCOMPLETE_ANALYSIS_MESSAGE.to_string(),
        RatioReport::Computed {
            current_ratio,
            debt_ratio,
        } => (*current_ratio, *debt_ratio),
    };

    let mut prompt = String::new();
    prompt.push_str(&format!(
        "Write an analysis report on the current-period financial statements of {}, in the style of a professional accountant.\n\n",
        config.company_name
    ));

    prompt.push_str("### Overview\n\n");
    prompt.push_str(&format!("- Report date: {}\n", report_date.format("%Y-%m-%d")));
    prompt.push_str("- This report was generated automatically from the figures below.\n\n");

    prompt.push_str("### Key Financial Ratios\n\n");
    prompt.push_str(&format!("- Current ratio: {}\n", format_ratio(current_ratio)));
    prompt.push_str(&format!("- Debt ratio: {}\n\n", format_ratio(debt_ratio)));

    prompt.push_str("### Profitability\n\n");
    prompt.push_str(&format_section(&result.profitability));
    prompt.push('\n');

    prompt.push_str("### Manufacturing Cost Structure\n\n");
    prompt.push_str(&format_section(&result.cost_structure));
    prompt.push('\n');

    prompt.push_str(&format!(
        "### Accounts Changing {:.0}% or More From the Prior Period\n\n",
        config.change_threshold * 100.0
    ));
    prompt.push_str(&large_changes_markdown(&result.large_changes));
    prompt.push('\n');

    if !result.missing_line_items.is_empty() {
        let missing: Vec<&str> = result.missing_line_items.iter().map(Concept::label).collect();
        prompt.push_str(&format!(
            "Note: no account matched {}; these are reported as 0.\n\n",
            missing.join(", ")
        ));
    }

    prompt.push_str(CONCLUSION_INSTRUCTIONS);
    prompt
}

pub fn generate_narrative<G: NarrativeGenerator + ?Sized>(
    result: &AnalysisResult,
    config: &ReviewConfig,
    report_date: NaiveDate,
    generator: &G,
) -> Result<String> {
    let prompt = build_narrative_prompt(result, config, report_date);
    info!("Requesting narrative for {}", config.company_name);
    generator.generate(&prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinancialReviewError;
    use crate::schema::StatementKind;

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            ratios: RatioReport::Computed {
                current_ratio: Some(150.5),
                debt_ratio: None,
            },
            profitability: [(Concept::Revenue, 1000), (Concept::NetIncome, 100)]
                .into_iter()
                .collect(),
            cost_structure: [(Concept::LaborCost, 300)].into_iter().collect(),
            large_changes: vec![ChangedAccount {
                statement: StatementKind::IncomeStatement,
                account_name: "매출액".to_string(),
                current_amount: 1000,
                prior_amount: 500,
                change_ratio: 1.0,
            }],
            missing_line_items: vec![Concept::GrossProfit],
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    struct EchoGenerator;

    impl NarrativeGenerator for EchoGenerator {
        fn generate(&self, prompt: &str) -> Result<String> {
            Ok(format!("narrative ({} chars)", prompt.len()))
        }
    }

    struct FailingGenerator;

    impl NarrativeGenerator for FailingGenerator {
        fn generate(&self, _prompt: &str) -> Result<String> {
            Err(FinancialReviewError::NarrativeFailed("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_prompt_contains_sections() {
        let config = ReviewConfig::new("ACME Corp");
        let prompt = build_narrative_prompt(&sample_result(), &config, date());

        assert!(prompt.contains("ACME Corp"));
        assert!(prompt.contains("Report date: 2024-03-31"));
        assert!(prompt.contains("Current ratio: 150.50%"));
        assert!(prompt.contains("Debt ratio: N/A"));
        assert!(prompt.contains("- Revenue: 1000"));
        assert!(prompt.contains("- Labor cost: 300"));
        assert!(prompt.contains("Changing 30% or More"));
        assert!(prompt.contains("| Income Statement | 매출액 | 1000 | 500 | 100.0% |"));
        assert!(prompt.contains("no account matched Gross profit"));
        assert!(prompt.ends_with(CONCLUSION_INSTRUCTIONS));
        assert!(prompt.contains(
            "- Current ratio: 150.50%\n- Debt ratio: N/A\n\n### Profitability\n\n- Revenue: 1000\n- Net income: 100\n\n"
        ));
    }

    #[test]
    fn test_failed_ratios_short_circuit_prompt() {
        let mut result = sample_result();
        result.ratios = RatioReport::Failed {
            message: "Required line item not found".to_string(),
        };

        let prompt = build_narrative_prompt(&result, &ReviewConfig::new("ACME"), date());
        assert_eq!(prompt, INCOMPLETE_ANALYSIS_MESSAGE);
    }

    #[test]
    fn test_empty_changes_table_has_header_only() {
        let table = large_changes_markdown(&[]);
        assert_eq!(table.lines().count(), 2);
    }

    #[test]
    fn test_generate_narrative_delegates() {
        let config = ReviewConfig::new("ACME");
        let text = generate_narrative(&sample_result(), &config, date(), &EchoGenerator).unwrap();
        assert!(text.starts_with("narrative ("));

        let err = generate_narrative(&sample_result(), &config, date(), &FailingGenerator);
        assert!(matches!(err, Err(FinancialReviewError::NarrativeFailed(_))));
    }
}
