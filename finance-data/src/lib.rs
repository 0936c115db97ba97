//! CSV ingestion for monthly cost records, tax brackets and budgets.

pub mod loader;

pub use loader::{
    BudgetLoader, BudgetRow, LoaderError, MonthlyRecordLoader, MonthlyRecordRow, TaxBracketLoader,
    TaxBracketRow,
};
