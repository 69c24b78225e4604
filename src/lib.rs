/*!
# Sales Dashboard

A browser-based dashboard comparing the sales of car brands, built in Rust.

## Overview

The dashboard loads a spreadsheet of monthly sales records, derives each
brand's yearly growth rate, and renders thirteen charts that can be narrowed
by year, segment and engine type.

## Architecture

### Data Layer
- **Loader** - Reads the first worksheet of an XLSX/XLS/ODS workbook, or a CSV file,
  and resolves the required columns by header name
- **Dataset** - Immutable table ordered by (Brand, Year) with the derived
  "Yearly Growth Rate (%)" column
- **Cache** - Keeps the loaded table for the process lifetime, reloading it
  only when the file on disk changes

### Analysis Layer
- **Filter** - Three multi-select filters producing read-only views of the table
- **Views** - Group-by aggregations (sum, mean, cumulative sum, top-N, box statistics)

### Presentation Layer
- **Graph** - SVG rendering with plotters and a fixed colour per brand
- **Dashboard** - Page assembly with handlebars
- **App** - axum routes for the page, the chart images, JSON data and exports

## Views

1. Monthly sales trend
2. Average market share
3. Segment-wise sales comparison
4. Fuel type popularity
5. Price distribution
6. Year-over-year growth rate
7. Top 5 best-selling models
8. Brand dominance by segment
9. Sales heatmap by year and month
10. Price vs market share
11. Cumulative sales comparison
12. Compact SUV market share
13. Mid size SUV market share

## REST API Endpoints

- `/` - Dashboard page (`year`, `segment`, `engine` query parameters, repeatable)
- `/api/filters` - Available filter values
- `/api/views` - Aggregated data of every view. Price vs market share points
  carry the `model` of their row, the hover text a client shows for each point
- `/chart/{id}` - One chart as SVG
- `/export.csv`, `/export.xlsx` - Filtered rows
*/

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod downloader;
pub mod filter;
pub mod graph;
pub mod loader;
pub mod palette;
pub mod record;
pub mod views;

#[cfg(feature = "web")]
pub mod app;

/// Error type used throughout the crate
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Re-export the main types to make them easier to use
pub use cache::DatasetCache;
pub use dataset::Dataset;
pub use filter::{FilterSet, FilteredView};
pub use record::{MonthKey, SalesRecord};
pub use views::{ChartData, ViewId};
