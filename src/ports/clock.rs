use chrono::NaiveDate;

/// Source of "today" for cutoffs when no period is selected.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}
