//! Per-year totals over the store.

use gov_budget_models::{Section, YearBudget};

use crate::{BudgetStore, StoreError};

/// Revenue, expenditure, and net result for one fiscal year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSummary {
    /// Fiscal year key.
    pub year: String,
    /// Sum of `VALUE` over the `esoda` lines.
    pub revenue_total: f64,
    /// Sum of `VALUE` over the `eksoda` lines.
    pub expenditure_total: f64,
    /// `revenue_total - expenditure_total`.
    pub net: f64,
    /// Number of `esoda` lines.
    pub revenue_lines: usize,
    /// Number of `eksoda` lines.
    pub expenditure_lines: usize,
}

impl YearSummary {
    /// Totals one year's entry.
    #[must_use]
    pub fn from_budget(year: &str, budget: &YearBudget) -> Self {
        let revenue_total = budget.total(Section::Esoda);
        let expenditure_total = budget.total(Section::Eksoda);

        Self {
            year: year.to_owned(),
            revenue_total,
            expenditure_total,
            net: revenue_total - expenditure_total,
            revenue_lines: budget.esoda.len(),
            expenditure_lines: budget.eksoda.len(),
        }
    }
}

impl BudgetStore {
    /// Summarizes every year in store order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Entry`] for the first year whose entry does not
    /// have the `{esoda, eksoda}` shape.
    pub fn summaries(&self) -> Result<Vec<YearSummary>, StoreError> {
        self.years()
            .filter_map(|year| {
                self.year(year)
                    .map(|budget| budget.map(|b| YearSummary::from_budget(year, &b)))
            })
            .collect()
    }
}
