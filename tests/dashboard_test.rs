mod common;

use common::sample_dataset;
use salesdash::dashboard::{build_panels, filter_query, panel_title, render_page};
use salesdash::filter::FilterSet;
use salesdash::views::ViewId;

#[test]
fn page_contains_every_panel_in_order() {
    let data = sample_dataset();
    let filter = FilterSet::all(&data);
    let panels = build_panels(&data, &filter, 640, 400).unwrap();
    let page =
        render_page("Tata vs Mahindra Sales Dashboard", &data, &filter, &panels, true).unwrap();

    assert!(page.contains("Tata vs Mahindra Sales Dashboard"));
    assert!(page.contains("8 of 8 rows"));
    assert_eq!(page.matches("<section class=\"panel\"").count(), 13);

    let positions: Vec<usize> = ViewId::ALL
        .iter()
        .map(|v| page.find(&format!("id=\"{}\"", v.id())).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(page.contains("name=\"year\""));
}

#[test]
fn static_page_has_no_form() {
    let data = sample_dataset();
    let filter = FilterSet::all(&data);
    let panels = build_panels(&data, &filter, 640, 400).unwrap();
    let page = render_page("Report", &data, &filter, &panels, false).unwrap();

    assert!(!page.contains("<form"));
    assert!(page.contains("Compact SUV"));
}

#[test]
fn market_share_title_names_year_span() {
    let data = sample_dataset();
    assert_eq!(
        panel_title(ViewId::AvgMarketShare, &data),
        "Average Market Share (2021–2022)"
    );
    assert_eq!(panel_title(ViewId::TopModels, &data), "Top 5 Best-Selling Models");
}

#[test]
fn query_string_reproduces_the_filter() {
    let data = sample_dataset();
    let mut filter = FilterSet::all(&data);
    filter.years = [2022].into();
    filter.engine_types = ["EV".to_string()].into();

    assert_eq!(
        filter_query(&filter),
        "applied=1&year=2022&segment=Compact%20SUV&segment=Mid%20Size%20SUV&engine=EV"
    );
}

#[test]
fn page_shows_brand_colour_key() {
    let data = sample_dataset();
    let filter = FilterSet::all(&data);
    let panels = build_panels(&data, &filter, 640, 400).unwrap();
    let page = render_page("Report", &data, &filter, &panels, false).unwrap();

    assert!(page.contains("background: #66c2a5\"></i>Mahindra"));
    assert!(page.contains("background: #fc8d62\"></i>Tata"));
}
