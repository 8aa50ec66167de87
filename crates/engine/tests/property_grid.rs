// Property-based tests for sorting, filtering and state persistence.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;

use datagrid_core::{Record, Value};
use datagrid_engine::filter::FilterOperator;
use datagrid_engine::persist::{decode_state, encode_state};
use datagrid_engine::sort::{SortDirection, SortMode};
use datagrid_engine::{ColumnDescriptor, DataGrid, GridConfig};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::number("id", "ID"),
        ColumnDescriptor::text("city", "City"),
        ColumnDescriptor::number("qty", "Qty"),
        ColumnDescriptor::date("due", "Due"),
    ]
}

/// Cell for the "qty" column: mostly small numbers (lots of ties),
/// sometimes blank or non-numeric.
fn arb_qty() -> impl Strategy<Value = Value> {
    prop_oneof![
        6 => (0i64..5).prop_map(Value::from),
        1 => Just(Value::Null),
        1 => Just(Value::from("n/a")),
    ]
}

fn arb_city() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::from("Ankara")),
        Just(Value::from("ankara")),
        Just(Value::from("Izmir")),
        Just(Value::from("Bursa")),
        Just(Value::Null),
    ]
}

fn arb_due() -> impl Strategy<Value = Value> {
    prop_oneof![
        (1u32..4, 1u32..4).prop_map(|(m, d)| Value::from(format!("2024-{m:02}-{d:02}"))),
        Just(Value::Null),
    ]
}

fn arb_rows(max: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec((arb_city(), arb_qty(), arb_due()), 0..max).prop_map(|cells| {
        cells
            .into_iter()
            .enumerate()
            .map(|(i, (city, qty, due))| {
                Record::new()
                    .with("id", i as i64)
                    .with("city", city)
                    .with("qty", qty)
                    .with("due", due)
            })
            .collect()
    })
}

fn arb_field() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("city"), Just("qty"), Just("due")]
}

fn arb_direction() -> impl Strategy<Value = SortDirection> {
    prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)]
}

fn grid_with(rows: Vec<Record>, config: GridConfig) -> DataGrid {
    let mut grid = DataGrid::new(config, columns()).unwrap();
    grid.set_rows(rows).unwrap();
    grid
}

fn ids(rows: &[&Record]) -> Vec<i64> {
    rows.iter()
        .map(|r| r.get("id").as_number().unwrap() as i64)
        .collect()
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn sort_is_stable(
        rows in arb_rows(40),
        field in arb_field(),
        direction in arb_direction(),
    ) {
        let mut grid = grid_with(rows, GridConfig::client());
        grid.set_sort(field, direction).unwrap();
        let sorted = grid.filtered_rows();

        for pair in sorted.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let same = grid.display_value(a, field).unwrap().to_lowercase()
                == grid.display_value(b, field).unwrap().to_lowercase();
            if same {
                prop_assert!(
                    a.get("id").as_number() < b.get("id").as_number(),
                    "equal keys out of source order"
                );
            }
        }
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn blanks_sort_last(
        rows in arb_rows(40),
        field in arb_field(),
        direction in arb_direction(),
    ) {
        let mut grid = grid_with(rows, GridConfig::client());
        grid.set_sort(field, direction).unwrap();
        let sorted = grid.filtered_rows();
        let first_blank = sorted.iter().position(|r| r.get(field).is_blank());
        if let Some(start) = first_blank {
            prop_assert!(sorted[start..].iter().all(|r| r.get(field).is_blank()));
        }
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn sort_keeps_every_row(rows in arb_rows(40), field in arb_field()) {
        let n = rows.len();
        let mut grid = grid_with(rows, GridConfig::client().with_sort_mode(SortMode::Multiple));
        grid.set_sort(field, SortDirection::Desc).unwrap();
        grid.set_sort("id", SortDirection::Asc).unwrap();
        let mut seen = ids(&grid.filtered_rows());
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..n as i64).collect::<Vec<_>>());
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn filter_idempotent_and_matches_model(
        rows in arb_rows(40),
        lo in 0i64..5,
        span in 0i64..3,
    ) {
        let hi = lo + span;
        let expected: Vec<i64> = rows
            .iter()
            .filter(|r| r.get("qty").as_number().is_some_and(|q| q >= lo as f64 && q <= hi as f64))
            .map(|r| r.get("id").as_number().unwrap() as i64)
            .collect();

        let mut grid = grid_with(rows, GridConfig::client());
        grid.set_filter("qty", FilterOperator::InRange, lo, Some(Value::from(hi))).unwrap();
        let once = ids(&grid.filtered_rows());
        grid.drain_events();
        grid.set_filter("qty", FilterOperator::InRange, lo, Some(Value::from(hi))).unwrap();
        let twice = ids(&grid.filtered_rows());

        prop_assert_eq!(&once, &expected);
        prop_assert_eq!(&once, &twice);
        prop_assert!(grid.drain_events().is_empty());
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn text_equals_ignores_case(rows in arb_rows(40)) {
        let mut grid = grid_with(rows, GridConfig::client());
        grid.set_filter("city", FilterOperator::Equals, "ANKARA", None).unwrap();
        for row in grid.filtered_rows() {
            prop_assert_eq!(row.get("city").to_text().to_lowercase(), "ankara");
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn state_round_trip(
        rows in arb_rows(40),
        page_size in 1usize..15,
        page in 0usize..5,
        field in arb_field(),
        direction in arb_direction(),
        hide_city in any::<bool>(),
        search in prop::option::of("[a-z]{1,3}"),
    ) {
        let mut grid = grid_with(rows.clone(), GridConfig::client());
        grid.set_page_size(page_size).unwrap();
        grid.set_sort(field, direction).unwrap();
        grid.set_column_visible("city", !hide_city).unwrap();
        if let Some(term) = &search {
            grid.set_global_search(term);
        }
        grid.set_page(page);
        let state = grid.current_state();

        let encoded = encode_state(&state).unwrap();
        prop_assert_eq!(&decode_state(&encoded).unwrap(), &state);

        let mut restored = grid_with(rows, GridConfig::client());
        restored.apply_state(state.clone());
        prop_assert_eq!(restored.current_state(), state);
    }
}
