use crate::BoxError;
use crate::palette::{BrandPalette, SET2, is_light, ylgnbu};
use crate::views::{Bar, BoxStats, ChartData, ScatterPoint, Series, Slice, SunburstSegment, ViewId};
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::PI;
use std::ops::Range;

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Configuration options for chart generation
#[derive(Clone, Debug)]
pub struct ChartOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Chart".to_string(),
            x_label: String::new(),
            y_label: String::new(),
            width: 800,
            height: 500,
        }
    }
}

impl ChartOptions {
    /// Title and axis captions of `view` at the given size
    pub fn for_view(view: ViewId, width: u32, height: u32) -> Self {
        let (x_label, y_label) = view.axis_labels();
        Self {
            title: view.title().to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            width,
            height,
        }
    }
}

/// Renders aggregated view data to a standalone SVG document
///
/// This is the main entry point for drawing. It dispatches on the shape of
/// the data; every brand is drawn in its palette colour.
///
/// # Arguments
/// * `data` - Aggregated data from [`crate::views`]
/// * `options` - Title, axis labels and size
/// * `palette` - Fixed brand colours
///
/// # Returns
/// * A Result containing the SVG markup or a drawing error
///
/// # Notes
/// * Data with nothing to draw yields a chart frame with a "No data" note
pub fn render(
    data: &ChartData,
    options: &ChartOptions,
    palette: &BrandPalette,
) -> Result<String, BoxError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        if data.is_empty() {
            draw_empty(&root, options)?;
        } else {
            match data {
                ChartData::Line { categories, series } => {
                    draw_lines(&root, categories, series, options, palette)?
                }
                ChartData::GroupedBar { categories, series } => {
                    draw_grouped_bars(&root, categories, series, options, palette)?
                }
                ChartData::Bar { bars } => draw_bars(&root, bars, options, palette)?,
                ChartData::BoxPlot { boxes } => draw_boxes(&root, boxes, options, palette)?,
                ChartData::Sunburst { segments } => {
                    draw_sunburst(&root, segments, options, palette)?
                }
                ChartData::Heatmap {
                    rows,
                    columns,
                    values,
                } => draw_heatmap(&root, rows, columns, values, options)?,
                ChartData::Scatter { points } => draw_scatter(&root, points, options, palette)?,
                ChartData::Pie { slices } => draw_pie(&root, slices, options, palette)?,
            }
        }

        root.present()?;
    }
    Ok(svg)
}

/// Axis for categorical data: category `i` sits at `i`, ticks every 1.0
/// once the mesh asks for `n` labels
fn category_axis(n: usize) -> RangedCoordf64 {
    (-0.5..n as f64 - 0.5).into()
}

fn label_at(categories: &[String], x: f64) -> String {
    let i = x.round();
    if i < 0.0 || (x - i).abs() > 1e-6 {
        return String::new();
    }
    categories.get(i as usize).cloned().unwrap_or_default()
}

/// Value range that always includes zero, padded at the open end(s)
fn baseline_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (mut lo, mut hi) = (0.0f64, 0.0f64);
    for v in values.filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if hi - lo < f64::EPSILON {
        hi = lo + 1.0;
    }
    let pad = (hi - lo) * 0.08;
    let lo = if lo < 0.0 { lo - pad } else { lo };
    lo..hi + pad
}

/// Value range around the data only
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() {
        return 0.0..1.0;
    }
    if hi - lo < f64::EPSILON {
        return lo - 1.0..hi + 1.0;
    }
    let pad = (hi - lo) * 0.08;
    lo - pad..hi + pad
}

fn centered(size: u32) -> TextStyle<'static> {
    ("sans-serif", size)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center))
}

fn draw_empty(root: &Area, options: &ChartOptions) -> Result<(), BoxError> {
    let area = root.titled(&options.title, ("sans-serif", 24))?;
    let (w, h) = area.dim_in_pixel();
    area.draw(&Text::new(
        "No data for the current selection",
        (w as i32 / 2, h as i32 / 2),
        centered(16),
    ))?;
    Ok(())
}

/// Line chart over categories, one line per brand
///
/// Missing (category, brand) combinations are skipped, so a line joins only
/// the categories that brand has rows for.
fn draw_lines(
    root: &Area,
    categories: &[String],
    series: &[Series],
    options: &ChartOptions,
    palette: &BrandPalette,
) -> Result<(), BoxError> {
    let y_range = baseline_range(series.iter().flat_map(|s| s.values.iter().flatten().copied()));

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(category_axis(categories.len()), y_range)?;

    let x_fmt = |x: &f64| label_at(categories, *x);
    chart
        .configure_mesh()
        .x_labels(categories.len())
        .x_label_formatter(&x_fmt)
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    for s in series {
        let color = palette.color(&s.brand);
        let points: Vec<(f64, f64)> = s
            .values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
            .label(s.brand.clone())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        chart.draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    Ok(())
}

/// Side-by-side bars per category, one bar per brand
fn draw_grouped_bars(
    root: &Area,
    categories: &[String],
    series: &[Series],
    options: &ChartOptions,
    palette: &BrandPalette,
) -> Result<(), BoxError> {
    let y_range = baseline_range(series.iter().flat_map(|s| s.values.iter().flatten().copied()));

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(category_axis(categories.len()), y_range)?;

    let x_fmt = |x: &f64| label_at(categories, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(categories.len())
        .x_label_formatter(&x_fmt)
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    let width = 0.8 / series.len().max(1) as f64;
    for (k, s) in series.iter().enumerate() {
        let color = palette.color(&s.brand);
        let offset = -0.4 + k as f64 * width;

        chart
            .draw_series(s.values.iter().enumerate().filter_map(|(i, v)| {
                v.map(|v| {
                    let x0 = i as f64 + offset;
                    Rectangle::new([(x0, 0.0), (x0 + width, v)], color.filled())
                })
            }))?
            .label(s.brand.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    Ok(())
}

/// One bar per entry, coloured by the entry's brand
fn draw_bars(
    root: &Area,
    bars: &[Bar],
    options: &ChartOptions,
    palette: &BrandPalette,
) -> Result<(), BoxError> {
    let labels: Vec<String> = bars.iter().map(|b| b.label.clone()).collect();
    let y_range = baseline_range(bars.iter().map(|b| b.value));

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(category_axis(labels.len()), y_range)?;

    let x_fmt = |x: &f64| label_at(&labels, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&x_fmt)
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    let mut brands: Vec<&str> = bars.iter().map(|b| b.brand.as_str()).collect();
    brands.sort();
    brands.dedup();

    for brand in brands {
        let color = palette.color(brand);
        chart
            .draw_series(
                bars.iter()
                    .enumerate()
                    .filter(|(_, b)| b.brand == brand)
                    .map(|(i, b)| {
                        let x = i as f64;
                        Rectangle::new([(x - 0.35, 0.0), (x + 0.35, b.value)], color.filled())
                    }),
            )?
            .label(brand.to_string())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    Ok(())
}

fn draw_boxes(
    root: &Area,
    boxes: &[BoxStats],
    options: &ChartOptions,
    palette: &BrandPalette,
) -> Result<(), BoxError> {
    let labels: Vec<String> = boxes.iter().map(|b| b.brand.clone()).collect();
    let y_range = padded_range(boxes.iter().flat_map(|b| {
        [b.whisker_low, b.whisker_high]
            .into_iter()
            .chain(b.outliers.iter().copied())
    }));

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(category_axis(labels.len()), y_range)?;

    let x_fmt = |x: &f64| label_at(&labels, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&x_fmt)
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    for (i, b) in boxes.iter().enumerate() {
        let x = i as f64;
        let color = palette.color(&b.brand);
        let line = color.stroke_width(2);

        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.3, b.q1), (x + 0.3, b.q3)],
            color.mix(0.5).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.3, b.q1), (x + 0.3, b.q3)],
            line,
        )))?;
        chart.draw_series([
            PathElement::new(vec![(x - 0.3, b.median), (x + 0.3, b.median)], line),
            PathElement::new(vec![(x, b.whisker_low), (x, b.q1)], line),
            PathElement::new(vec![(x, b.q3), (x, b.whisker_high)], line),
            PathElement::new(vec![(x - 0.15, b.whisker_low), (x + 0.15, b.whisker_low)], line),
            PathElement::new(vec![(x - 0.15, b.whisker_high), (x + 0.15, b.whisker_high)], line),
        ])?;
        chart.draw_series(
            b.outliers
                .iter()
                .map(|&v| Circle::new((x, v), 3, color.stroke_width(1))),
        )?;
    }

    Ok(())
}

/// Annotated heatmap: rows top to bottom in the given order
fn draw_heatmap(
    root: &Area,
    rows: &[String],
    columns: &[String],
    values: &[Vec<f64>],
    options: &ChartOptions,
) -> Result<(), BoxError> {
    let max = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);

    // Row 0 is drawn at the top
    let n_rows = rows.len();
    let y_labels: Vec<String> = rows.iter().rev().cloned().collect();

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(category_axis(columns.len()), category_axis(n_rows))?;

    let x_fmt = |x: &f64| label_at(columns, *x);
    let y_fmt = |y: &f64| label_at(&y_labels, *y);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(columns.len())
        .y_labels(n_rows)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    let cells: Vec<(f64, f64, f64)> = values
        .iter()
        .enumerate()
        .flat_map(|(r, row)| {
            let y = (n_rows - 1 - r) as f64;
            row.iter().enumerate().map(move |(c, v)| (c as f64, y, *v))
        })
        .collect();

    let shade = |v: f64| if max > 0.0 { ylgnbu(v / max) } else { ylgnbu(0.0) };

    chart.draw_series(cells.iter().map(|&(x, y, v)| {
        Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], shade(v).filled())
    }))?;

    chart.draw_series(cells.iter().map(|&(x, y, v)| {
        let text_color = if is_light(shade(v)) { BLACK } else { WHITE };
        Text::new(
            format!("{:.0}", v),
            (x, y),
            ("sans-serif", 12)
                .into_font()
                .color(&text_color)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        )
    }))?;

    Ok(())
}

fn draw_scatter(
    root: &Area,
    points: &[ScatterPoint],
    options: &ChartOptions,
    palette: &BrandPalette,
) -> Result<(), BoxError> {
    let x_range = padded_range(points.iter().map(|p| p.price));
    let y_range = padded_range(points.iter().map(|p| p.market_share));

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    let mut brands: Vec<&str> = points.iter().map(|p| p.brand.as_str()).collect();
    brands.sort();
    brands.dedup();

    for brand in brands {
        let color = palette.color(brand);
        chart
            .draw_series(
                points
                    .iter()
                    .filter(|p| p.brand == brand)
                    .map(|p| Circle::new((p.price, p.market_share), 4, color.filled())),
            )?
            .label(brand.to_string())
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    Ok(())
}

/// Polygon approximating an annular sector in pixel space.
///
/// Angles are in radians, measured clockwise on screen from 3 o'clock. An
/// inner radius of zero produces a pie wedge.
pub fn sector_points(
    center: (i32, i32),
    inner: f64,
    outer: f64,
    start: f64,
    end: f64,
) -> Vec<(i32, i32)> {
    let steps = (((end - start).abs() / (PI / 90.0)).ceil() as usize).max(1);
    let at = |r: f64, a: f64| {
        (
            center.0 + (r * a.cos()).round() as i32,
            center.1 + (r * a.sin()).round() as i32,
        )
    };

    let mut points: Vec<(i32, i32)> = (0..=steps)
        .map(|i| at(outer, start + (end - start) * i as f64 / steps as f64))
        .collect();
    if inner <= 0.0 {
        points.push(center);
    } else {
        points.extend(
            (0..=steps)
                .rev()
                .map(|i| at(inner, start + (end - start) * i as f64 / steps as f64)),
        );
    }
    points
}

/// 12 o'clock
const TOP: f64 = -PI / 2.0;

fn draw_pie(
    root: &Area,
    slices: &[Slice],
    options: &ChartOptions,
    palette: &BrandPalette,
) -> Result<(), BoxError> {
    let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
    if total <= 0.0 {
        return draw_empty(root, options);
    }

    let area = root.titled(&options.title, ("sans-serif", 24))?;
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2 - 60, h as i32 / 2);
    let radius = (w.min(h) as f64 / 2.0 - 20.0).max(10.0);

    let mut angle = TOP;
    for slice in slices {
        let sweep = 2.0 * PI * slice.value.max(0.0) / total;
        if sweep <= 0.0 {
            continue;
        }
        let color = palette.color(&slice.brand);
        let points = sector_points(center, 0.0, radius, angle, angle + sweep);
        area.draw(&Polygon::new(points.clone(), color.filled()))?;
        area.draw(&PathElement::new(points, WHITE.stroke_width(2)))?;

        let mid = angle + sweep / 2.0;
        area.draw(&Text::new(
            format!("{:.1}%", 100.0 * slice.value / total),
            (
                center.0 + (radius * 0.6 * mid.cos()) as i32,
                center.1 + (radius * 0.6 * mid.sin()) as i32,
            ),
            centered(14),
        ))?;
        angle += sweep;
    }

    draw_legend(&area, slices.iter().map(|s| s.brand.as_str()), palette, (w as i32 - 140, 20))
}

fn draw_legend<'b>(
    area: &Area,
    brands: impl Iterator<Item = &'b str>,
    palette: &BrandPalette,
    origin: (i32, i32),
) -> Result<(), BoxError> {
    for (i, brand) in brands.enumerate() {
        let y = origin.1 + i as i32 * 22;
        area.draw(&Rectangle::new(
            [(origin.0, y), (origin.0 + 14, y + 14)],
            palette.color(brand).filled(),
        ))?;
        area.draw(&Text::new(
            brand.to_string(),
            (origin.0 + 20, y + 1),
            ("sans-serif", 14).into_font(),
        ))?;
    }
    Ok(())
}

/// Two rings: segments inside, each split into its brands outside
fn draw_sunburst(
    root: &Area,
    segments: &[SunburstSegment],
    options: &ChartOptions,
    palette: &BrandPalette,
) -> Result<(), BoxError> {
    let total: f64 = segments.iter().map(|s| s.total.max(0.0)).sum();
    if total <= 0.0 {
        return draw_empty(root, options);
    }

    let area = root.titled(&options.title, ("sans-serif", 24))?;
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2 - 60, h as i32 / 2);
    let outer = (w.min(h) as f64 / 2.0 - 20.0).max(20.0);
    let inner = outer * 0.55;

    let mut angle = TOP;
    for (k, segment) in segments.iter().enumerate() {
        let sweep = 2.0 * PI * segment.total.max(0.0) / total;
        if sweep <= 0.0 {
            continue;
        }

        // Segment ring uses the tail of the palette, away from the brand colours
        let ring_color = SET2[SET2.len() - 1 - k % 3].mix(0.6);
        let points = sector_points(center, 0.0, inner, angle, angle + sweep);
        area.draw(&Polygon::new(points.clone(), ring_color.filled()))?;
        area.draw(&PathElement::new(points, WHITE.stroke_width(2)))?;

        let mid = angle + sweep / 2.0;
        area.draw(&Text::new(
            segment.segment.clone(),
            (
                center.0 + (inner * 0.55 * mid.cos()) as i32,
                center.1 + (inner * 0.55 * mid.sin()) as i32,
            ),
            centered(12),
        ))?;

        let mut brand_angle = angle;
        for part in &segment.brands {
            let part_sweep = sweep * part.value.max(0.0) / segment.total.max(f64::MIN_POSITIVE);
            if part_sweep <= 0.0 {
                continue;
            }
            let color = palette.color(&part.brand);
            let points = sector_points(center, inner, outer, brand_angle, brand_angle + part_sweep);
            area.draw(&Polygon::new(points.clone(), color.filled()))?;
            area.draw(&PathElement::new(points, WHITE.stroke_width(2)))?;

            let part_mid = brand_angle + part_sweep / 2.0;
            let r = (inner + outer) / 2.0;
            area.draw(&Text::new(
                format!("{:.0}%", 100.0 * part.value / segment.total),
                (
                    center.0 + (r * part_mid.cos()) as i32,
                    center.1 + (r * part_mid.sin()) as i32,
                ),
                centered(11),
            ))?;
            brand_angle += part_sweep;
        }

        angle += sweep;
    }

    let mut brands: Vec<&str> = segments
        .iter()
        .flat_map(|s| s.brands.iter().map(|b| b.brand.as_str()))
        .collect();
    brands.sort();
    brands.dedup();
    draw_legend(&area, brands.into_iter(), palette, (w as i32 - 140, 20))
}

/// Renders every view of `view_data` into `(id, svg)` pairs
pub fn render_all(
    view_data: &[(ViewId, ChartData)],
    width: u32,
    height: u32,
    palette: &BrandPalette,
) -> Result<Vec<(ViewId, String)>, BoxError> {
    view_data
        .iter()
        .map(|(view, data)| {
            let options = ChartOptions::for_view(*view, width, height);
            render(data, &options, palette).map(|svg| (*view, svg))
        })
        .collect()
}
