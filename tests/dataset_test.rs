mod common;

use common::{assert_close, record, sample_dataset};
use salesdash::dataset::{Dataset, compute_growth_rates};

fn growth_of(data: &Dataset, brand: &str, year: i32) -> Vec<f64> {
    data.records()
        .iter()
        .filter(|r| r.brand == brand && r.year == year)
        .map(|r| r.growth_rate)
        .collect()
}

#[test]
fn two_year_scenario_grows_by_fifty_percent() {
    let data = Dataset::from_records(vec![
        record("Tata", 2022, "Jan", "Compact SUV", "Petrol", "Nexon", 10.0, 150.0, 5.0, 1.0),
        record("Tata", 2021, "Jan", "Compact SUV", "Petrol", "Nexon", 10.0, 100.0, 5.0, 1.0),
        record("Mahindra", 2021, "Jan", "Compact SUV", "Petrol", "XUV300", 10.0, 100.0, 5.0, 1.0),
        record("Mahindra", 2022, "Jan", "Compact SUV", "Petrol", "XUV300", 10.0, 150.0, 5.0, 1.0),
    ]);

    for brand in ["Tata", "Mahindra"] {
        assert_eq!(growth_of(&data, brand, 2021), vec![0.0]);
        assert_eq!(growth_of(&data, brand, 2022), vec![50.0]);
    }
    println!("✓ 2021 -> 0, 2022 -> 50 for both brands");
}

#[test]
fn rows_are_ordered_by_brand_then_year() {
    let data = sample_dataset();
    let keys: Vec<(String, i32)> = data
        .records()
        .iter()
        .map(|r| (r.brand.clone(), r.year))
        .collect();

    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);

    // File order is kept within a (Brand, Year) group
    let tata_2021: Vec<&str> = data
        .records()
        .iter()
        .filter(|r| r.brand == "Tata" && r.year == 2021)
        .map(|r| r.model.as_str())
        .collect();
    assert_eq!(tata_2021, ["Nexon", "Harrier"]);
}

#[test]
fn first_row_of_every_brand_is_zero() {
    let data = sample_dataset();
    for brand in data.brands() {
        let first = data
            .records()
            .iter()
            .find(|r| r.brand == brand)
            .expect("brand has rows");
        assert_eq!(first.growth_rate, 0.0, "first growth for {}", brand);
    }
}

#[test]
fn growth_follows_consecutive_rows_within_a_brand() {
    let data = sample_dataset();

    // 2000 -> 2000 -> 1800 -> 1800
    assert_eq!(growth_of(&data, "Mahindra", 2021), vec![0.0, 0.0]);
    let mahindra_2022 = growth_of(&data, "Mahindra", 2022);
    assert_close(mahindra_2022[0], -10.0);
    assert_close(mahindra_2022[1], 0.0);

    // 1000 -> 1000 -> 1500 -> 1500
    assert_eq!(growth_of(&data, "Tata", 2021), vec![0.0, 0.0]);
    assert_eq!(growth_of(&data, "Tata", 2022), vec![50.0, 0.0]);
}

#[test]
fn growth_matches_percent_change_formula_per_year() {
    let totals = [(2019, 80.0), (2020, 100.0), (2021, 130.0), (2022, 104.0)];
    let rows = totals
        .iter()
        .map(|(y, t)| record("Tata", *y, "Jan", "Compact SUV", "EV", "Nexon EV", 1.0, *t, 1.0, 1.0))
        .collect();
    let data = Dataset::from_records(rows);

    for window in totals.windows(2) {
        let (prev, cur) = (window[0], window[1]);
        let expected = 100.0 * (cur.1 - prev.1) / prev.1;
        assert_close(growth_of(&data, "Tata", cur.0)[0], expected);
    }
    assert_eq!(growth_of(&data, "Tata", 2019), vec![0.0]);
}

#[test]
fn zero_previous_total_yields_zero_growth() {
    let mut rows = vec![
        record("Tata", 2021, "Jan", "Compact SUV", "EV", "Nexon EV", 1.0, 0.0, 1.0, 1.0),
        record("Tata", 2022, "Jan", "Compact SUV", "EV", "Nexon EV", 1.0, 250.0, 1.0, 1.0),
    ];
    compute_growth_rates(&mut rows);
    assert_eq!(rows[0].growth_rate, 0.0);
    assert_eq!(rows[1].growth_rate, 0.0);
}

#[test]
fn distinct_values_are_sorted() {
    let data = sample_dataset();
    assert_eq!(data.brands(), ["Mahindra", "Tata"]);
    assert_eq!(data.years(), [2021, 2022]);
    assert_eq!(data.segments(), ["Compact SUV", "Mid Size SUV"]);
    assert_eq!(data.engine_types(), ["Diesel", "EV", "Petrol"]);
    assert_eq!(data.len(), 8);
}

#[test]
fn empty_dataset_has_no_options() {
    let data = Dataset::from_records(Vec::new());
    assert!(data.is_empty());
    let options = data.filter_options();
    assert!(options.years.is_empty());
    assert!(options.segments.is_empty());
    assert!(options.engine_types.is_empty());
}
