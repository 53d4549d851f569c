use crate::utils::normalize_account_name;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    #[schemars(description = "Statement of financial position (assets, liabilities, equity)")]
    BalanceSheet,

    #[schemars(description = "Profit and loss statement (revenue through net income)")]
    IncomeStatement,

    #[schemars(description = "Statement of cost of goods manufactured")]
    CostStatement,
}

impl StatementKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatementKind::BalanceSheet => "Balance Sheet",
            StatementKind::IncomeStatement => "Income Statement",
            StatementKind::CostStatement => "Cost Statement",
        }
    }
}

/// Logical financial concepts the analysis looks up by keyword.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Concept {
    CurrentAssets,
    CurrentLiabilities,
    TotalLiabilities,
    TotalEquity,
    Revenue,
    GrossProfit,
    OperatingProfit,
    NetIncome,
    TotalManufacturingCost,
    CostOfGoodsManufactured,
    Depreciation,
    LaborCost,
}

impl Concept {
    pub const RATIO_INPUTS: [Concept; 4] = [
        Concept::CurrentAssets,
        Concept::CurrentLiabilities,
        Concept::TotalLiabilities,
        Concept::TotalEquity,
    ];

    pub const PROFITABILITY: [Concept; 4] = [
        Concept::Revenue,
        Concept::GrossProfit,
        Concept::OperatingProfit,
        Concept::NetIncome,
    ];

    pub const COST_STRUCTURE: [Concept; 4] = [
        Concept::TotalManufacturingCost,
        Concept::CostOfGoodsManufactured,
        Concept::Depreciation,
        Concept::LaborCost,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Concept::CurrentAssets => "Current assets",
            Concept::CurrentLiabilities => "Current liabilities",
            Concept::TotalLiabilities => "Total liabilities",
            Concept::TotalEquity => "Total equity",
            Concept::Revenue => "Revenue",
            Concept::GrossProfit => "Gross profit",
            Concept::OperatingProfit => "Operating profit",
            Concept::NetIncome => "Net income",
            Concept::TotalManufacturingCost => "Total manufacturing cost",
            Concept::CostOfGoodsManufactured => "Cost of goods manufactured",
            Concept::Depreciation => "Depreciation",
            Concept::LaborCost => "Labor cost",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LedgerRow {
    /// Normalized account label; never empty.
    pub account_name: String,
    pub current_amount: i64,
    pub prior_amount: i64,
}

impl LedgerRow {
    pub fn new(account_name: impl Into<String>, current_amount: i64, prior_amount: i64) -> Self {
        Self {
            account_name: account_name.into(),
            current_amount,
            prior_amount,
        }
    }

    /// `|current - prior| / prior`, or `None` when the prior amount is zero.
    pub fn change_ratio(&self) -> Option<f64> {
        if self.prior_amount == 0 {
            return None;
        }
        let delta = (self.current_amount as f64 - self.prior_amount as f64).abs();
        Some(delta / self.prior_amount as f64)
    }
}

/// Cleaned statement rows in their original sheet order.
///
/// Every row carries a canonical, non-empty account name no matter how the
/// ledger was built, including when it is deserialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct NormalizedLedger(Vec<LedgerRow>);

impl NormalizedLedger {
    /// Builds a ledger, normalizing account names and dropping rows whose
    /// name is empty once normalized.
    pub fn new(rows: Vec<LedgerRow>) -> Self {
        Self(
            rows.into_iter()
                .filter_map(|mut row| {
                    row.account_name = normalize_account_name(&row.account_name);
                    (!row.account_name.is_empty()).then_some(row)
                })
                .collect(),
        )
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LedgerRow> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a NormalizedLedger {
    type Item = &'a LedgerRow;
    type IntoIter = std::slice::Iter<'a, LedgerRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for NormalizedLedger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<LedgerRow>::deserialize(deserializer).map(Self::new)
    }
}

impl FromIterator<LedgerRow> for NormalizedLedger {
    fn from_iter<I: IntoIterator<Item = LedgerRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// The three cleaned statements a review runs on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FinancialStatements {
    pub balance_sheet: NormalizedLedger,
    pub income_statement: NormalizedLedger,
    pub cost_sheet: NormalizedLedger,
}

impl FinancialStatements {
    pub fn ledger(&self, kind: StatementKind) -> &NormalizedLedger {
        match kind {
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::IncomeStatement => &self.income_statement,
            StatementKind::CostStatement => &self.cost_sheet,
        }
    }

    /// Row-wise concatenation of all three ledgers, each row tagged with its
    /// statement.
    pub fn combined(&self) -> impl Iterator<Item = (StatementKind, &LedgerRow)> {
        [
            StatementKind::BalanceSheet,
            StatementKind::IncomeStatement,
            StatementKind::CostStatement,
        ]
        .into_iter()
        .flat_map(move |kind| self.ledger(kind).iter().map(move |row| (kind, row)))
    }
}

/// A ratio in percent, or `None` when its denominator is zero.
pub type RatioValue = Option<f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RatioReport {
    #[schemars(description = "A required balance sheet item was missing; no ratio is reported")]
    Failed {
        #[serde(rename = "error")]
        message: String,
    },

    #[schemars(description = "Liquidity and leverage ratios in percent; null means undefined")]
    Computed {
        current_ratio: RatioValue,
        debt_ratio: RatioValue,
    },
}

impl RatioReport {
    pub fn is_failed(&self) -> bool {
        matches!(self, RatioReport::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChangedAccount {
    pub statement: StatementKind,
    pub account_name: String,
    pub current_amount: i64,
    pub prior_amount: i64,
    /// Absolute change relative to the prior amount, as a fraction.
    pub change_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    pub ratios: RatioReport,
    pub profitability: BTreeMap<Concept, i64>,
    pub cost_structure: BTreeMap<Concept, i64>,
    /// Sorted by descending change ratio.
    pub large_changes: Vec<ChangedAccount>,
    /// Profitability and cost concepts that matched no row and defaulted to zero.
    #[serde(default)]
    pub missing_line_items: Vec<Concept>,
}

impl AnalysisResult {
    pub fn profitability_of(&self, concept: Concept) -> i64 {
        self.profitability.get(&concept).copied().unwrap_or(0)
    }

    pub fn cost_of(&self, concept: Concept) -> i64 {
        self.cost_structure.get(&concept).copied().unwrap_or(0)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// JSON schema of the result, for consumers that validate what they receive.
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalysisResult)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
