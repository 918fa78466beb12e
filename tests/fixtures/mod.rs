#![allow(dead_code)]

use recursive_ta::{Ohlcv, OhlcvSeries, Price};
use serde::{Deserialize, de::DeserializeOwned};

/// OHLCV bar parsed from the fixture CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct RefBar {
    pub index: usize,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Ohlcv for RefBar {
    fn open(&self) -> Price {
        self.open
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }

    fn volume(&self) -> Option<f64> {
        Some(self.volume)
    }
}

/// Reference value by bar index. An empty field marks a warm-up bar.
#[derive(Debug, Deserialize)]
pub struct RefValue {
    pub index: usize,
    pub expected: Option<f64>,
}

const OHLCV_PATH: &str = "tests/fixtures/data/ohlcv.csv";

/// Load the reference bars as aligned columns.
pub fn load_reference_series() -> OhlcvSeries {
    let bars: Vec<RefBar> = load_records(OHLCV_PATH, "invalid OHLCV record");
    OhlcvSeries::from_bars(&bars)
}

/// Load single-value reference data.
pub fn load_ref_values(path: &str) -> Vec<RefValue> {
    load_records(path, "invalid reference record")
}

/// Load one named column of multi-line reference data as [`RefValue`]s.
pub fn load_ref_column(path: &str, column: &str) -> Vec<RefValue> {
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));
    let headers = rdr.headers().expect("reference header").clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .unwrap_or_else(|| panic!("{path} has no `{name}` column"))
    };
    let (index, value) = (position("index"), position(column));

    rdr.records()
        .map(|r| {
            let record = r.expect("invalid reference record");
            RefValue {
                index: record[index].parse().expect("invalid reference index"),
                expected: match &record[value] {
                    "" => None,
                    v => Some(v.parse().expect("invalid reference value")),
                },
            }
        })
        .collect()
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Assert a full output series against a reference file: same length,
/// `NaN` exactly on the warm-up bars, values within tolerance elsewhere.
pub fn assert_matches_reference(name: &str, actual: &[f64], reference: &[RefValue], tolerance: f64) {
    assert_eq!(
        actual.len(),
        reference.len(),
        "{name}: output has {} bars, reference {}",
        actual.len(),
        reference.len()
    );

    for (i, (value, row)) in actual.iter().zip(reference).enumerate() {
        assert_eq!(row.index, i, "{name}: reference out of order");

        match row.expected {
            None => assert!(value.is_nan(), "{name} at bar {i}: expected NaN, got {value}"),
            Some(expected) => {
                assert_near(*value, expected, tolerance, &format!("{name} at bar {i}"));
            }
        }
    }
}

/// Run `compute` over the fixture bars and compare with the reference file.
pub fn check_reference<F>(name: &str, path: &str, tolerance: f64, compute: F)
where
    F: Fn(&OhlcvSeries) -> recursive_ta::Result<Vec<f64>>,
{
    let series = load_reference_series();
    let reference = load_ref_values(path);
    let output = compute(&series).unwrap_or_else(|e| panic!("{name} rejected fixture: {e}"));

    assert_matches_reference(name, &output, &reference, tolerance);
}

/// Generate a reference test for a single-line indicator.
///
/// Usage: `reference_test!(sma_20, "tests/fixtures/data/sma-20-close.csv", 1e-9, |s| Sma::new(SmaConfig::new(nz(20))).apply(s.close()));`
#[allow(unused_macros)]
macro_rules! reference_test {
    ($name:ident, $ref_path:expr, $tolerance:expr, $compute:expr) => {
        #[test]
        fn $name() {
            crate::fixtures::check_reference(stringify!($name), $ref_path, $tolerance, $compute);
        }
    };
}

#[allow(unused_imports)]
pub(crate) use reference_test;

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
