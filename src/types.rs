use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tabled::Tabled;

/// The closed set of measurement kinds encoded in wide column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Metric {
    Area,
    Production,
    Yield,
}

impl Metric {
    /// Match a whitespace-delimited token against the metric vocabulary.
    /// Case-sensitive: the source convention uses upper-case tokens.
    pub fn from_token(token: &str) -> Option<Metric> {
        match token {
            "AREA" => Some(Metric::Area),
            "PRODUCTION" => Some(Metric::Production),
            "YIELD" => Some(Metric::Yield),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Metric::Area => "AREA",
            Metric::Production => "PRODUCTION",
            Metric::Yield => "YIELD",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A classified wide column: which crop, which metric. Unit suffixes from the
/// column name carry no identity and are discarded during classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureKey {
    pub crop: String,
    pub metric: Metric,
}

/// One source row: typed identity columns plus the measure cells, aligned
/// with `WideTable::measure_columns`. `None` means the cell was empty in the
/// source — absent, never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub dist_code: String,
    pub dist_name: String,
    pub state_code: String,
    pub state_name: String,
    pub year: i32,
    pub values: Vec<Option<f64>>,
}

/// The wide table as ingested: the measure-column headers exactly as they
/// appeared in the source, and one `WideRow` per source row.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    pub measure_columns: Vec<String>,
    pub rows: Vec<WideRow>,
}

/// One melted measurement. Intermediate between reshape and assemble.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub dist_code: String,
    pub year: i32,
    pub state_code: String,
    pub crop: String,
    pub metric: Metric,
    pub value: Option<f64>,
}

/// One fact-table row. The compound identity (dist_code, year, state_code,
/// crop) is unique across the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactRecord {
    pub dist_code: String,
    pub year: i32,
    pub state_code: String,
    pub crop: String,
    pub area_1000_ha: Option<f64>,
    pub production_1000_t: Option<f64>,
    pub yield_kg_ha: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateDim {
    pub state_code: String,
    pub state_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictDim {
    pub dist_code: String,
    pub dist_name: String,
    pub state_code: String,
}

/// The complete output of one transform run.
#[derive(Debug, Clone, PartialEq)]
pub struct StarSchema {
    pub dim_state: Vec<StateDim>,
    pub dim_district: Vec<DistrictDim>,
    pub facts: Vec<FactRecord>,
}

impl StarSchema {
    pub fn state_names(&self) -> HashMap<&str, &str> {
        self.dim_state
            .iter()
            .map(|s| (s.state_code.as_str(), s.state_name.as_str()))
            .collect()
    }

    pub fn district_names(&self) -> HashMap<&str, &str> {
        self.dim_district
            .iter()
            .map(|d| (d.dist_code.as_str(), d.dist_name.as_str()))
            .collect()
    }

    pub fn state_code_by_name(&self, state_name: &str) -> Option<&str> {
        self.dim_state
            .iter()
            .find(|s| s.state_name == state_name)
            .map(|s| s.state_code.as_str())
    }
}

// Report rows keep raw numbers; `display_with` formats them only for the
// console preview, so CSV exports and chart series stay numeric.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StateProductionRow {
    pub rank: usize,
    pub state_name: String,
    #[tabled(display_with = "crate::util::display_f64")]
    pub production_1000_t: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendPointRow {
    pub year: i32,
    #[tabled(display_with = "crate::util::display_f64")]
    pub production_1000_t: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DistrictProductionRow {
    pub rank: usize,
    pub dist_name: String,
    #[tabled(display_with = "crate::util::display_f64")]
    pub production_1000_t: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct YearProductionRow {
    pub rank: usize,
    pub year: i32,
    #[tabled(display_with = "crate::util::display_f64")]
    pub production_1000_t: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct GrowthRow {
    pub state_name: String,
    #[tabled(display_with = "crate::util::display_f64")]
    pub latest_prod: f64,
    #[tabled(display_with = "crate::util::display_f64")]
    pub past_prod: f64,
    #[tabled(display_with = "crate::util::display_f64")]
    pub growth_pct: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct YieldGainRow {
    pub rank: usize,
    pub dist_name: String,
    #[tabled(display_with = "crate::util::display_f64")]
    pub gain_kg_ha: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CorrelationRow {
    pub dist_name: String,
    pub crop: String,
    #[tabled(display_with = "crate::util::display_corr")]
    pub pearson_corr: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct YieldTrendRow {
    pub year: i32,
    #[tabled(display_with = "crate::util::display_f64")]
    pub avg_yield_kg_ha: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_facts: usize,
    pub total_states: usize,
    pub total_districts: usize,
    pub total_crops: usize,
    pub first_year: i32,
    pub last_year: i32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
    Scatter,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesPoint {
    pub x: String,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Series {
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new(label: &str, points: Vec<(String, f64)>) -> Series {
        Series {
            label: label.to_string(),
            points: points
                .into_iter()
                .map(|(x, y)| SeriesPoint { x, y })
                .collect(),
        }
    }
}

/// A chart handed to the rendering sink: labeled series only, no styling.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl ChartSpec {
    pub fn new(
        kind: ChartKind,
        title: &str,
        x_label: &str,
        y_label: &str,
        series: Vec<Series>,
    ) -> ChartSpec {
        ChartSpec {
            title: title.to_string(),
            kind,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series,
        }
    }

    pub fn bar(title: &str, x_label: &str, y_label: &str, series: Series) -> ChartSpec {
        ChartSpec::new(ChartKind::Bar, title, x_label, y_label, vec![series])
    }

    pub fn pie(title: &str, series: Series) -> ChartSpec {
        ChartSpec::new(ChartKind::Pie, title, "", "", vec![series])
    }

    pub fn line(title: &str, x_label: &str, y_label: &str, series: Vec<Series>) -> ChartSpec {
        ChartSpec::new(ChartKind::Line, title, x_label, y_label, series)
    }
}
