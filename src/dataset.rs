use crate::record::SalesRecord;
use serde::Serialize;
use std::collections::BTreeSet;

/// The loaded sales table.
///
/// Rows are kept ordered by (Brand, Year) with file order preserved within
/// ties, and carry the derived yearly growth rate. A `Dataset` is never
/// mutated after construction; filters borrow it.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    records: Vec<SalesRecord>,
}

/// Distinct values offered by the three filter controls
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub segments: Vec<String>,
    pub engine_types: Vec<String>,
}

impl Dataset {
    /// Builds the table from raw rows and computes the growth column
    ///
    /// # Arguments
    /// * `records` - Rows in file order; any existing `growth_rate` is overwritten
    ///
    /// # Returns
    /// * `Dataset` - Rows ordered by (Brand, Year) with growth rates filled in
    pub fn from_records(mut records: Vec<SalesRecord>) -> Self {
        // Stable sort: rows sharing (Brand, Year) keep their file order
        records.sort_by(|a, b| a.brand.cmp(&b.brand).then(a.year.cmp(&b.year)));
        compute_growth_rates(&mut records);
        Dataset { records }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn brands(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.brand.clone()))
    }

    pub fn years(&self) -> Vec<i32> {
        distinct(self.records.iter().map(|r| r.year))
    }

    pub fn segments(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.segment.clone()))
    }

    pub fn engine_types(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.engine_type.clone()))
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            years: self.years(),
            segments: self.segments(),
            engine_types: self.engine_types(),
        }
    }
}

fn distinct<T: Ord>(values: impl Iterator<Item = T>) -> Vec<T> {
    values.collect::<BTreeSet<_>>().into_iter().collect()
}

/// Fills `growth_rate` with the percent change of Total Sales between
/// consecutive rows of the same brand.
///
/// Expects `records` already ordered by (Brand, Year). The first row of each
/// brand, a zero previous value and any non-finite result all yield 0.
pub fn compute_growth_rates(records: &mut [SalesRecord]) {
    let mut previous: Option<(String, f64)> = None;

    for record in records.iter_mut() {
        record.growth_rate = match &previous {
            Some((brand, prev)) if *brand == record.brand => {
                percent_change(*prev, record.total_sales)
            }
            _ => 0.0,
        };
        previous = Some((record.brand.clone(), record.total_sales));
    }
}

fn percent_change(prev: f64, cur: f64) -> f64 {
    if prev == 0.0 {
        return 0.0;
    }
    let change = 100.0 * (cur - prev) / prev;
    if change.is_finite() { change } else { 0.0 }
}
