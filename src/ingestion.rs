use crate::grid::RawGrid;
use crate::schema::{FinancialStatements, LedgerRow, NormalizedLedger, StatementKind};
use crate::utils::{normalize_account_name, pick_value};
use log::{debug, info};

/// Positional column layout of one statement export.
///
/// Each amount is split across two adjacent columns; `pick_value` decides
/// which one holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub account: usize,
    pub current: (usize, usize),
    pub prior: (usize, usize),
}

impl ColumnLayout {
    /// account, current A/B, prior A/B
    pub const FIVE_COLUMN: ColumnLayout = ColumnLayout {
        account: 0,
        current: (1, 2),
        prior: (3, 4),
    };

    /// account, current A/B, current ratio, prior A/B, prior ratio
    pub const SEVEN_COLUMN_WITH_RATIOS: ColumnLayout = ColumnLayout {
        account: 0,
        current: (1, 2),
        prior: (4, 5),
    };

    fn extract(&self, grid: &RawGrid, row: usize) -> LedgerRow {
        let account_name = normalize_account_name(grid.cell(row, self.account).unwrap_or(""));
        LedgerRow {
            account_name,
            current_amount: pick_value(grid.cell(row, self.current.0), grid.cell(row, self.current.1)),
            prior_amount: pick_value(grid.cell(row, self.prior.0), grid.cell(row, self.prior.1)),
        }
    }
}

/// Turns one raw statement export into a normalized ledger. Cleaning never
/// fails: unparseable amounts become zero and unnamed rows are dropped.
pub trait SheetCleaner {
    fn kind(&self) -> StatementKind;

    /// Leading title rows to drop before data starts.
    fn header_rows(&self) -> usize;

    fn layout(&self, grid: &RawGrid) -> ColumnLayout;

    fn clean(&self, grid: &RawGrid) -> NormalizedLedger {
        let layout = self.layout(grid);
        let ledger: NormalizedLedger = grid
            .rows_after(self.header_rows())
            .map(|row| layout.extract(grid, row))
            .collect();

        debug!(
            "{}: {} raw rows -> {} ledger rows",
            self.kind().name(),
            grid.height(),
            ledger.len()
        );

        ledger
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceSheetCleaner;

impl SheetCleaner for BalanceSheetCleaner {
    fn kind(&self) -> StatementKind {
        StatementKind::BalanceSheet
    }

    fn header_rows(&self) -> usize {
        3
    }

    fn layout(&self, _grid: &RawGrid) -> ColumnLayout {
        ColumnLayout::FIVE_COLUMN
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IncomeStatementCleaner;

impl SheetCleaner for IncomeStatementCleaner {
    fn kind(&self) -> StatementKind {
        StatementKind::IncomeStatement
    }

    fn header_rows(&self) -> usize {
        2
    }

    fn layout(&self, _grid: &RawGrid) -> ColumnLayout {
        ColumnLayout::FIVE_COLUMN
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CostStatementCleaner;

impl CostStatementCleaner {
    const RATIO_COLUMN: usize = 6;
}

impl SheetCleaner for CostStatementCleaner {
    fn kind(&self) -> StatementKind {
        StatementKind::CostStatement
    }

    fn header_rows(&self) -> usize {
        2
    }

    /// Some exports carry a composition-ratio column after each period's
    /// amounts. They are detected by any value in column 6 below the header.
    fn layout(&self, grid: &RawGrid) -> ColumnLayout {
        let has_ratio = grid.width() > Self::RATIO_COLUMN
            && grid.column_has_values(Self::RATIO_COLUMN, self.header_rows());

        debug!("Cost statement ratio columns detected: {}", has_ratio);

        if has_ratio {
            ColumnLayout::SEVEN_COLUMN_WITH_RATIOS
        } else {
            ColumnLayout::FIVE_COLUMN
        }
    }
}

pub fn clean_balance_sheet(grid: &RawGrid) -> NormalizedLedger {
    BalanceSheetCleaner.clean(grid)
}

pub fn clean_income_statement(grid: &RawGrid) -> NormalizedLedger {
    IncomeStatementCleaner.clean(grid)
}

pub fn clean_cost_statement(grid: &RawGrid) -> NormalizedLedger {
    CostStatementCleaner.clean(grid)
}

/// Cleans the three statement exports into ledgers.
pub fn load(bs_grid: &RawGrid, pl_grid: &RawGrid, msc_grid: &RawGrid) -> FinancialStatements {
    let statements = FinancialStatements {
        balance_sheet: clean_balance_sheet(bs_grid),
        income_statement: clean_income_statement(pl_grid),
        cost_sheet: clean_cost_statement(msc_grid),
    };

    info!(
        "Loaded financial statements: {} balance sheet, {} income statement, {} cost statement rows",
        statements.balance_sheet.len(),
        statements.income_statement.len(),
        statements.cost_sheet.len()
    );

    statements
}
