use crate::error::{FinancialReviewError, Result};
use crate::schema::{Concept, NormalizedLedger};
use crate::utils::normalize_account_name;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct KeywordEntry {
    pub concept: Concept,
    /// Tried in order; the first keyword matching any row wins.
    pub keywords: Vec<String>,
}

/// Ordered table from financial concept to the account-name substrings
/// that identify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct KeywordIndex {
    entries: Vec<KeywordEntry>,
}

impl Default for KeywordIndex {
    fn default() -> Self {
        Self::standard()
    }
}

impl KeywordIndex {
    pub fn new(entries: Vec<KeywordEntry>) -> Self {
        Self { entries }
    }

    /// Account names as they appear in Korean GAAP statement exports.
    pub fn standard() -> Self {
        let table: [(Concept, &[&str]); 12] = [
            (Concept::CurrentAssets, &["유동자산"]),
            (Concept::CurrentLiabilities, &["유동부채"]),
            (Concept::TotalLiabilities, &["부채총계"]),
            (Concept::TotalEquity, &["자본총계"]),
            (Concept::Revenue, &["매출액"]),
            (Concept::GrossProfit, &["매출총이익"]),
            (Concept::OperatingProfit, &["영업이익"]),
            (Concept::NetIncome, &["당기순이익"]),
            (Concept::TotalManufacturingCost, &["당기총제조비용"]),
            (Concept::CostOfGoodsManufactured, &["당기제품제조원가"]),
            (Concept::Depreciation, &["감가상각비"]),
            (
                Concept::LaborCost,
                &["임금", "급여", "상여금", "직원급여", "임원급여", "잡급"],
            ),
        ];

        Self {
            entries: table
                .into_iter()
                .map(|(concept, keywords)| KeywordEntry {
                    concept,
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    /// Keywords for a concept; empty when the concept has no entry.
    pub fn keywords_for(&self, concept: Concept) -> &[String] {
        self.entries
            .iter()
            .find(|entry| entry.concept == concept)
            .map(|entry| entry.keywords.as_slice())
            .unwrap_or(&[])
    }

    /// Replaces the keyword list of `concept`, appending an entry if needed.
    pub fn with_keywords<I, S>(mut self, concept: Concept, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords: Vec<String> = keywords.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|entry| entry.concept == concept) {
            Some(entry) => entry.keywords = keywords,
            None => self.entries.push(KeywordEntry { concept, keywords }),
        }
        self
    }

    /// Every concept must have at least one keyword, and no keyword may
    /// normalize to the empty string (it would match every account).
    pub fn validate(&self) -> Result<()> {
        for entry in &self.entries {
            if entry.keywords.is_empty() {
                return Err(FinancialReviewError::InvalidKeywordIndex(format!(
                    "{:?} has no keywords",
                    entry.concept
                )));
            }

            if let Some(bad) = entry
                .keywords
                .iter()
                .find(|k| normalize_account_name(k).is_empty())
            {
                return Err(FinancialReviewError::InvalidKeywordIndex(format!(
                    "{:?} has keyword {:?} that is empty after normalization",
                    entry.concept, bad
                )));
            }
        }
        Ok(())
    }
}

/// Current-period amount of the first row matching the keywords, if any.
///
/// Keywords are tried in order; for each, rows are scanned in ledger order
/// and the first row whose normalized name contains the keyword wins.
pub fn lookup<S: AsRef<str>>(ledger: &NormalizedLedger, keywords: &[S]) -> Option<i64> {
    keywords.iter().find_map(|keyword| {
        let keyword = normalize_account_name(keyword.as_ref());
        if keyword.is_empty() {
            return None;
        }
        ledger
            .iter()
            .find(|row| normalize_account_name(&row.account_name).contains(&keyword))
            .map(|row| row.current_amount)
    })
}

/// Like [`lookup`], but a missing line item reads as zero.
pub fn find_value<S: AsRef<str>>(ledger: &NormalizedLedger, keywords: &[S]) -> i64 {
    lookup(ledger, keywords).unwrap_or(0)
}
