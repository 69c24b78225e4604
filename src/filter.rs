use crate::dataset::Dataset;
use crate::record::SalesRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The three multi-select filters of the dashboard.
///
/// A row passes when its year, segment and engine type are all selected.
/// An empty set selects nothing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    pub years: BTreeSet<i32>,
    pub segments: BTreeSet<String>,
    pub engine_types: BTreeSet<String>,
}

impl FilterSet {
    /// Selects every value present in `data` (the dashboard's initial state)
    pub fn all(data: &Dataset) -> Self {
        FilterSet {
            years: data.years().into_iter().collect(),
            segments: data.segments().into_iter().collect(),
            engine_types: data.engine_types().into_iter().collect(),
        }
    }

    pub fn matches(&self, record: &SalesRecord) -> bool {
        self.years.contains(&record.year)
            && self.segments.contains(&record.segment)
            && self.engine_types.contains(&record.engine_type)
    }

    pub fn apply<'a>(&self, data: &'a Dataset) -> FilteredView<'a> {
        FilteredView {
            rows: data.records().iter().filter(|r| self.matches(r)).collect(),
        }
    }
}

/// Read-only selection of rows borrowed from a [`Dataset`], in dataset order
#[derive(Clone, Debug, Default)]
pub struct FilteredView<'a> {
    rows: Vec<&'a SalesRecord>,
}

impl<'a> FilteredView<'a> {
    /// View over every row of `data`
    pub fn unfiltered(data: &'a Dataset) -> Self {
        FilteredView {
            rows: data.records().iter().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a SalesRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Further narrows the view to one segment
    pub fn segment(&self, segment: &str) -> FilteredView<'a> {
        FilteredView {
            rows: self
                .rows
                .iter()
                .copied()
                .filter(|r| r.segment == segment)
                .collect(),
        }
    }

    pub fn total_sales_volume(&self) -> f64 {
        self.iter().map(|r| r.sales_volume).sum()
    }
}
