use crate::BoxError;
use crate::dataset::Dataset;
use crate::filter::FilterSet;
use crate::graph;
use crate::palette::BrandPalette;
use crate::views::{ChartData, ViewId};
use handlebars::Handlebars;
use log::debug;
use serde::Serialize;
use serde_json::json;
use std::fmt::Display;

const TEMPLATE: &str = include_str!("./static/dashboard.hbs");

/// One rendered chart of the page
#[derive(Clone, Debug, Serialize)]
pub struct Panel {
    pub id: &'static str,
    pub title: String,
    pub svg: String,
}

#[derive(Serialize)]
struct OptionEntry {
    value: String,
    checked: bool,
}

/// Aggregates every view for the rows `filter` selects
pub fn view_data(data: &Dataset, filter: &FilterSet) -> Vec<(ViewId, ChartData)> {
    let view = filter.apply(data);
    ViewId::ALL
        .iter()
        .map(|id| (*id, id.compute(&view)))
        .collect()
}

/// Section heading of a view; the market share panel names the year span
/// of the loaded data.
pub fn panel_title(view: ViewId, data: &Dataset) -> String {
    let years = data.years();
    match (view, years.first(), years.last()) {
        (ViewId::AvgMarketShare, Some(first), Some(last)) if first != last => {
            format!("{} ({}–{})", view.title(), first, last)
        }
        (ViewId::AvgMarketShare, Some(only), _) => format!("{} ({})", view.title(), only),
        _ => view.title().to_string(),
    }
}

/// Renders all thirteen panels in page order
///
/// # Arguments
/// * `data` - The loaded dataset; its brands fix the colour mapping
/// * `filter` - Current selections
/// * `width`, `height` - Pixel size of each chart
pub fn build_panels(
    data: &Dataset,
    filter: &FilterSet,
    width: u32,
    height: u32,
) -> Result<Vec<Panel>, BoxError> {
    let palette = BrandPalette::new(data.brands());
    let rendered = graph::render_all(&view_data(data, filter), width, height, &palette)?;

    Ok(rendered
        .into_iter()
        .map(|(view, svg)| {
            debug!("Rendered {} ({} bytes)", view.id(), svg.len());
            Panel {
                id: view.id(),
                title: panel_title(view, data),
                svg,
            }
        })
        .collect())
}

#[derive(Serialize)]
struct LegendEntry {
    brand: String,
    color: String,
}

/// Brand colour key shown once for the whole page
fn legend(data: &Dataset) -> Vec<LegendEntry> {
    let palette = BrandPalette::new(data.brands());
    palette
        .brands()
        .iter()
        .map(|brand| LegendEntry {
            color: palette.hex(brand),
            brand: brand.clone(),
        })
        .collect()
}

fn option_entries<T: Display + Ord>(
    values: Vec<T>,
    selected: &std::collections::BTreeSet<T>,
) -> Vec<OptionEntry> {
    values
        .into_iter()
        .map(|v| OptionEntry {
            checked: selected.contains(&v),
            value: v.to_string(),
        })
        .collect()
}

/// Query string that reproduces `filter` on the dashboard routes
pub fn filter_query(filter: &FilterSet) -> String {
    let mut parts = vec!["applied=1".to_string()];
    parts.extend(filter.years.iter().map(|y| format!("year={}", y)));
    parts.extend(
        filter
            .segments
            .iter()
            .map(|s| format!("segment={}", urlencoding::encode(s))),
    );
    parts.extend(
        filter
            .engine_types
            .iter()
            .map(|e| format!("engine={}", urlencoding::encode(e))),
    );
    parts.join("&")
}

/// Fills the page template
///
/// `interactive` adds the filter form and download links; the static
/// renderer leaves it off and lists the selections instead.
pub fn render_page(
    title: &str,
    data: &Dataset,
    filter: &FilterSet,
    panels: &[Panel],
    interactive: bool,
) -> Result<String, BoxError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_template_string("dashboard", TEMPLATE)?;

    let context = json!({
        "title": title,
        "interactive": interactive,
        "query": filter_query(filter),
        "shown_rows": filter.apply(data).len(),
        "total_rows": data.len(),
        "filters": {
            "years": option_entries(data.years(), &filter.years),
            "segments": option_entries(data.segments(), &filter.segments),
            "engine_types": option_entries(data.engine_types(), &filter.engine_types),
        },
        "legend": legend(data),
        "panels": panels,
    });

    Ok(handlebars.render("dashboard", &context)?)
}
