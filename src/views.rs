use crate::filter::FilteredView;
use crate::record::{MonthKey, SalesRecord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const COMPACT_SUV: &str = "Compact SUV";
pub const MID_SIZE_SUV: &str = "Mid Size SUV";

/// Number of models listed by [`ViewId::TopModels`]
pub const TOP_MODELS: usize = 5;

/// The fixed set of dashboard views, in page order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewId {
    MonthlySales,
    AvgMarketShare,
    SegmentSales,
    FuelPopularity,
    PriceDistribution,
    YoyGrowth,
    TopModels,
    SegmentDominance,
    SalesHeatmap,
    PriceVsShare,
    CumulativeSales,
    CompactSuvShare,
    MidSizeSuvShare,
}

impl ViewId {
    pub const ALL: [ViewId; 13] = [
        ViewId::MonthlySales,
        ViewId::AvgMarketShare,
        ViewId::SegmentSales,
        ViewId::FuelPopularity,
        ViewId::PriceDistribution,
        ViewId::YoyGrowth,
        ViewId::TopModels,
        ViewId::SegmentDominance,
        ViewId::SalesHeatmap,
        ViewId::PriceVsShare,
        ViewId::CumulativeSales,
        ViewId::CompactSuvShare,
        ViewId::MidSizeSuvShare,
    ];

    /// Stable identifier used in URLs and file names
    pub fn id(&self) -> &'static str {
        match self {
            ViewId::MonthlySales => "monthly-sales",
            ViewId::AvgMarketShare => "avg-market-share",
            ViewId::SegmentSales => "segment-sales",
            ViewId::FuelPopularity => "fuel-popularity",
            ViewId::PriceDistribution => "price-distribution",
            ViewId::YoyGrowth => "yoy-growth",
            ViewId::TopModels => "top-models",
            ViewId::SegmentDominance => "segment-dominance",
            ViewId::SalesHeatmap => "sales-heatmap",
            ViewId::PriceVsShare => "price-vs-share",
            ViewId::CumulativeSales => "cumulative-sales",
            ViewId::CompactSuvShare => "compact-suv-share",
            ViewId::MidSizeSuvShare => "mid-size-suv-share",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.id() == id)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ViewId::MonthlySales => "Monthly Sales Trend",
            ViewId::AvgMarketShare => "Average Market Share",
            ViewId::SegmentSales => "Segment-Wise Sales Comparison",
            ViewId::FuelPopularity => "Fuel Type Popularity",
            ViewId::PriceDistribution => "Price Distribution",
            ViewId::YoyGrowth => "Year-over-Year Growth Rate",
            ViewId::TopModels => "Top 5 Best-Selling Models",
            ViewId::SegmentDominance => "Brand Dominance by Segment",
            ViewId::SalesHeatmap => "Sales Heatmap by Year and Month",
            ViewId::PriceVsShare => "Price vs Market Share",
            ViewId::CumulativeSales => "Cumulative Sales Comparison",
            ViewId::CompactSuvShare => "Compact SUV Market Share",
            ViewId::MidSizeSuvShare => "Mid Size SUV Market Share",
        }
    }

    /// (x, y) axis captions; empty for charts without axes
    pub fn axis_labels(&self) -> (&'static str, &'static str) {
        match self {
            ViewId::MonthlySales => ("Month", "Sales Volume"),
            ViewId::AvgMarketShare => ("Brand", "Market Share (%)"),
            ViewId::SegmentSales => ("Segment", "Sales Volume"),
            ViewId::FuelPopularity => ("Engine Type", "Sales Volume"),
            ViewId::PriceDistribution => ("Brand", "Price"),
            ViewId::YoyGrowth => ("Year", "Yearly Growth Rate (%)"),
            ViewId::TopModels => ("Model", "Sales Volume"),
            ViewId::SalesHeatmap => ("Month", "Year"),
            ViewId::PriceVsShare => ("Price", "Market Share (%)"),
            ViewId::CumulativeSales => ("Year", "Cumulative Sales"),
            ViewId::SegmentDominance | ViewId::CompactSuvShare | ViewId::MidSizeSuvShare => {
                ("", "")
            }
        }
    }

    /// Aggregates the filtered rows for this view
    pub fn compute(&self, view: &FilteredView) -> ChartData {
        match self {
            ViewId::MonthlySales => monthly_sales(view),
            ViewId::AvgMarketShare => avg_market_share(view),
            ViewId::SegmentSales => segment_sales(view),
            ViewId::FuelPopularity => fuel_popularity(view),
            ViewId::PriceDistribution => price_distribution(view),
            ViewId::YoyGrowth => yoy_growth(view),
            ViewId::TopModels => top_models(view, TOP_MODELS),
            ViewId::SegmentDominance => segment_dominance(view),
            ViewId::SalesHeatmap => sales_heatmap(view),
            ViewId::PriceVsShare => price_vs_share(view),
            ViewId::CumulativeSales => cumulative_sales(view),
            ViewId::CompactSuvShare => segment_share(view, COMPACT_SUV),
            ViewId::MidSizeSuvShare => segment_share(view, MID_SIZE_SUV),
        }
    }
}

/// One brand's values, aligned with the chart's categories.
/// `None` marks a category the brand has no rows for.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub brand: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub brand: String,
    pub value: f64,
}

/// Five-number summary plus outliers for one brand's prices
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoxStats {
    pub brand: String,
    pub count: usize,
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SunburstSegment {
    pub segment: String,
    pub total: f64,
    pub brands: Vec<Slice>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Slice {
    pub brand: String,
    pub value: f64,
}

/// One row of the price vs market share chart. `model` is not drawn in the
/// SVG; it is served with `/api/views` as the point's hover text.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub brand: String,
    pub model: String,
    pub price: f64,
    pub market_share: f64,
}

/// Aggregated data for one chart, independent of how it is drawn
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Line {
        categories: Vec<String>,
        series: Vec<Series>,
    },
    GroupedBar {
        categories: Vec<String>,
        series: Vec<Series>,
    },
    Bar {
        bars: Vec<Bar>,
    },
    BoxPlot {
        boxes: Vec<BoxStats>,
    },
    Sunburst {
        segments: Vec<SunburstSegment>,
    },
    Heatmap {
        rows: Vec<String>,
        columns: Vec<String>,
        values: Vec<Vec<f64>>,
    },
    Scatter {
        points: Vec<ScatterPoint>,
    },
    Pie {
        slices: Vec<Slice>,
    },
}

impl ChartData {
    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Line { series, .. } | ChartData::GroupedBar { series, .. } => {
                series.iter().all(|s| s.values.iter().all(Option::is_none))
            }
            ChartData::Bar { bars } => bars.is_empty(),
            ChartData::BoxPlot { boxes } => boxes.is_empty(),
            ChartData::Sunburst { segments } => segments.is_empty(),
            ChartData::Heatmap { rows, columns, .. } => rows.is_empty() || columns.is_empty(),
            ChartData::Scatter { points } => points.is_empty(),
            ChartData::Pie { slices } => slices.is_empty(),
        }
    }
}

/// Sum of `value` grouped by `key`, keys ascending
pub fn sum_by<K: Ord>(
    view: &FilteredView,
    key: impl Fn(&SalesRecord) -> K,
    value: impl Fn(&SalesRecord) -> f64,
) -> BTreeMap<K, f64> {
    let mut groups = BTreeMap::new();
    for r in view.iter() {
        *groups.entry(key(r)).or_insert(0.0) += value(r);
    }
    groups
}

/// Arithmetic mean of `value` grouped by `key`, keys ascending
pub fn mean_by<K: Ord>(
    view: &FilteredView,
    key: impl Fn(&SalesRecord) -> K,
    value: impl Fn(&SalesRecord) -> f64,
) -> BTreeMap<K, f64> {
    let mut groups: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for r in view.iter() {
        let entry = groups.entry(key(r)).or_insert((0.0, 0));
        entry.0 += value(r);
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect()
}

/// Pivots `(category, brand) -> value` into aligned per-brand series
fn pivot<K: Ord + Clone + ToString>(
    groups: BTreeMap<(K, String), f64>,
) -> (Vec<String>, Vec<Series>) {
    let categories: BTreeSet<&K> = groups.keys().map(|(k, _)| k).collect();
    let brands: BTreeSet<&String> = groups.keys().map(|(_, b)| b).collect();

    let series = brands
        .iter()
        .map(|brand| Series {
            brand: (*brand).clone(),
            values: categories
                .iter()
                .map(|cat| groups.get(&((*cat).clone(), (*brand).clone())).copied())
                .collect(),
        })
        .collect();

    (categories.iter().map(|k| k.to_string()).collect(), series)
}

pub fn monthly_sales(view: &FilteredView) -> ChartData {
    let groups = sum_by(view, |r| (r.month.clone(), r.brand.clone()), |r| r.sales_volume);
    let (categories, series) = pivot(groups);
    ChartData::Line { categories, series }
}

pub fn avg_market_share(view: &FilteredView) -> ChartData {
    let bars = mean_by(view, |r| r.brand.clone(), |r| r.market_share)
        .into_iter()
        .map(|(brand, value)| Bar {
            label: brand.clone(),
            brand,
            value,
        })
        .collect();
    ChartData::Bar { bars }
}

pub fn segment_sales(view: &FilteredView) -> ChartData {
    let groups = sum_by(view, |r| (r.segment.clone(), r.brand.clone()), |r| r.sales_volume);
    let (categories, series) = pivot(groups);
    ChartData::GroupedBar { categories, series }
}

pub fn fuel_popularity(view: &FilteredView) -> ChartData {
    let groups = sum_by(
        view,
        |r| (r.engine_type.clone(), r.brand.clone()),
        |r| r.sales_volume,
    );
    let (categories, series) = pivot(groups);
    ChartData::GroupedBar { categories, series }
}

pub fn price_distribution(view: &FilteredView) -> ChartData {
    let mut prices: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in view.iter() {
        prices.entry(r.brand.clone()).or_default().push(r.price);
    }
    let boxes = prices
        .into_iter()
        .filter_map(|(brand, values)| box_stats(brand, values))
        .collect();
    ChartData::BoxPlot { boxes }
}

/// Box statistics with linearly interpolated quartiles and 1.5×IQR whiskers
pub fn box_stats(brand: String, mut values: Vec<f64>) -> Option<BoxStats> {
    values.retain(|v| v.is_finite());
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let q1 = quantile(&values, 0.25);
    let median = quantile(&values, 0.5);
    let q3 = quantile(&values, 0.75);
    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let inside = values.iter().copied().filter(|v| *v >= low_fence && *v <= high_fence);
    let whisker_low = inside.clone().fold(f64::INFINITY, f64::min);
    let whisker_high = inside.fold(f64::NEG_INFINITY, f64::max);
    let outliers = values
        .iter()
        .copied()
        .filter(|v| *v < low_fence || *v > high_fence)
        .collect();

    Some(BoxStats {
        brand,
        count: values.len(),
        whisker_low,
        q1,
        median,
        q3,
        whisker_high,
        outliers,
    })
}

/// Quantile of sorted data by linear interpolation between closest ranks
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

pub fn yoy_growth(view: &FilteredView) -> ChartData {
    let groups = mean_by(view, |r| (r.year, r.brand.clone()), |r| r.growth_rate);
    let (categories, series) = pivot(groups);
    ChartData::Line { categories, series }
}

pub fn top_models(view: &FilteredView, n: usize) -> ChartData {
    let mut totals: Vec<((String, String), f64)> =
        sum_by(view, |r| (r.model.clone(), r.brand.clone()), |r| r.sales_volume)
            .into_iter()
            .collect();
    // Stable: equal totals stay in (Model, Brand) order
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));

    let bars = totals
        .into_iter()
        .take(n)
        .map(|((model, brand), value)| Bar {
            label: model,
            brand,
            value,
        })
        .collect();
    ChartData::Bar { bars }
}

pub fn segment_dominance(view: &FilteredView) -> ChartData {
    let groups = sum_by(view, |r| (r.segment.clone(), r.brand.clone()), |r| r.sales_volume);

    let mut segments: Vec<SunburstSegment> = Vec::new();
    for ((segment, brand), value) in groups {
        match segments.last_mut() {
            Some(last) if last.segment == segment => {
                last.total += value;
                last.brands.push(Slice { brand, value });
            }
            _ => segments.push(SunburstSegment {
                segment,
                total: value,
                brands: vec![Slice { brand, value }],
            }),
        }
    }
    ChartData::Sunburst { segments }
}

pub fn sales_heatmap(view: &FilteredView) -> ChartData {
    let groups: BTreeMap<(i32, MonthKey), f64> =
        sum_by(view, |r| (r.year, r.month.clone()), |r| r.sales_volume);

    let years: BTreeSet<i32> = groups.keys().map(|(y, _)| *y).collect();
    let months: BTreeSet<&MonthKey> = groups.keys().map(|(_, m)| m).collect();

    let values = years
        .iter()
        .map(|year| {
            months
                .iter()
                .map(|month| groups.get(&(*year, (*month).clone())).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    ChartData::Heatmap {
        rows: years.iter().map(|y| y.to_string()).collect(),
        columns: months.iter().map(|m| m.label.clone()).collect(),
        values,
    }
}

pub fn price_vs_share(view: &FilteredView) -> ChartData {
    let points = view
        .iter()
        .map(|r| ScatterPoint {
            brand: r.brand.clone(),
            model: r.model.clone(),
            price: r.price,
            market_share: r.market_share,
        })
        .collect();
    ChartData::Scatter { points }
}

pub fn cumulative_sales(view: &FilteredView) -> ChartData {
    let groups = sum_by(view, |r| (r.year, r.brand.clone()), |r| r.sales_volume);

    // Running total per brand over ascending years
    let mut running: BTreeMap<String, f64> = BTreeMap::new();
    let cumulative: BTreeMap<(i32, String), f64> = groups
        .into_iter()
        .map(|((year, brand), volume)| {
            let total = running.entry(brand.clone()).or_insert(0.0);
            *total += volume;
            ((year, brand), *total)
        })
        .collect();

    let (categories, series) = pivot(cumulative);
    ChartData::Line { categories, series }
}

pub fn segment_share(view: &FilteredView, segment: &str) -> ChartData {
    let slices = sum_by(&view.segment(segment), |r| r.brand.clone(), |r| r.market_share)
        .into_iter()
        .map(|(brand, value)| Slice { brand, value })
        .collect();
    ChartData::Pie { slices }
}
