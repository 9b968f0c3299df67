use crate::types::{
    CorrelationRow, DistrictProductionRow, GrowthRow, StarSchema, StateProductionRow,
    SummaryStats, TrendPointRow, YearProductionRow, YieldGainRow, YieldTrendRow,
};
use crate::util::{average, pearson};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

// Correlations over fewer points than this are noise, not signal.
const MIN_CORRELATION_POINTS: usize = 3;

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

pub fn top_states_by_production(
    schema: &StarSchema,
    crop: &str,
    top_n: usize,
) -> Vec<StateProductionRow> {
    let names = schema.state_names();
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for f in &schema.facts {
        if f.crop != crop {
            continue;
        }
        if let Some(p) = f.production_1000_t {
            *totals.entry(f.state_code.as_str()).or_insert(0.0) += p;
        }
    }
    let mut ranked: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(code, total)| (names.get(code).copied().unwrap_or(code).to_string(), total))
        .collect();
    ranked.sort_by(|a, b| desc(a.1, b.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, (state_name, total))| StateProductionRow {
            rank: i + 1,
            state_name,
            production_1000_t: total,
        })
        .collect()
}

/// National production summed over a crop set, per year, last `last_n` years
/// with any production recorded. A crop set of one is the single-crop trend;
/// passing e.g. both millets gives the combined trend.
pub fn production_trend(schema: &StarSchema, crops: &[&str], last_n: usize) -> Vec<TrendPointRow> {
    let mut by_year: HashMap<i32, f64> = HashMap::new();
    for f in &schema.facts {
        if !crops.contains(&f.crop.as_str()) {
            continue;
        }
        if let Some(p) = f.production_1000_t {
            *by_year.entry(f.year).or_insert(0.0) += p;
        }
    }
    let mut points: Vec<(i32, f64)> = by_year.into_iter().collect();
    points.sort_by_key(|(year, _)| *year);
    let skip = points.len().saturating_sub(last_n);
    points
        .into_iter()
        .skip(skip)
        .map(|(year, total)| TrendPointRow {
            year,
            production_1000_t: total,
        })
        .collect()
}

pub fn district_production_in_state(
    schema: &StarSchema,
    crop: &str,
    state_name: &str,
    top_n: usize,
) -> Vec<DistrictProductionRow> {
    let Some(state_code) = schema.state_code_by_name(state_name) else {
        return Vec::new();
    };
    let names = schema.district_names();
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for f in &schema.facts {
        if f.crop != crop || f.state_code != state_code {
            continue;
        }
        if let Some(p) = f.production_1000_t {
            *totals.entry(f.dist_code.as_str()).or_insert(0.0) += p;
        }
    }
    let mut ranked: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(code, total)| (names.get(code).copied().unwrap_or(code).to_string(), total))
        .collect();
    ranked.sort_by(|a, b| desc(a.1, b.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, (dist_name, total))| DistrictProductionRow {
            rank: i + 1,
            dist_name,
            production_1000_t: total,
        })
        .collect()
}

pub fn top_production_years(
    schema: &StarSchema,
    crop: &str,
    state_name: &str,
    top_n: usize,
) -> Vec<YearProductionRow> {
    let Some(state_code) = schema.state_code_by_name(state_name) else {
        return Vec::new();
    };
    let mut totals: HashMap<i32, f64> = HashMap::new();
    for f in &schema.facts {
        if f.crop != crop || f.state_code != state_code {
            continue;
        }
        if let Some(p) = f.production_1000_t {
            *totals.entry(f.year).or_insert(0.0) += p;
        }
    }
    let mut ranked: Vec<(i32, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| desc(a.1, b.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, (year, total))| YearProductionRow {
            rank: i + 1,
            year,
            production_1000_t: total,
        })
        .collect()
}

/// Production growth per state between the crop's latest recorded year and
/// `span_years` earlier. States missing either endpoint, or with zero past
/// production, are skipped rather than reported as infinite growth.
pub fn production_growth_by_state(
    schema: &StarSchema,
    crop: &str,
    span_years: i32,
    top_n: usize,
) -> Vec<GrowthRow> {
    let mut totals: HashMap<(&str, i32), f64> = HashMap::new();
    for f in &schema.facts {
        if f.crop != crop {
            continue;
        }
        if let Some(p) = f.production_1000_t {
            *totals.entry((f.state_code.as_str(), f.year)).or_insert(0.0) += p;
        }
    }
    let Some(latest) = totals.keys().map(|(_, year)| *year).max() else {
        return Vec::new();
    };
    let past_year = latest - span_years;

    let mut rows: Vec<GrowthRow> = Vec::new();
    for state in &schema.dim_state {
        let latest_prod = totals.get(&(state.state_code.as_str(), latest));
        let past_prod = totals.get(&(state.state_code.as_str(), past_year));
        if let (Some(&latest_prod), Some(&past_prod)) = (latest_prod, past_prod) {
            if past_prod == 0.0 {
                continue;
            }
            rows.push(GrowthRow {
                state_name: state.state_name.clone(),
                latest_prod,
                past_prod,
                growth_pct: (latest_prod - past_prod) / past_prod * 100.0,
            });
        }
    }
    rows.sort_by(|a, b| desc(a.growth_pct, b.growth_pct).then_with(|| a.state_name.cmp(&b.state_name)));
    rows.truncate(top_n);
    rows
}

/// Yield delta per district between the crop's latest yield-bearing year and
/// `span_years` earlier. The fact table has one row per (district, year,
/// crop), so the endpoints are direct lookups, not aggregates.
pub fn yield_gain_by_district(
    schema: &StarSchema,
    crop: &str,
    span_years: i32,
    top_n: usize,
) -> Vec<YieldGainRow> {
    let mut yields: HashMap<(&str, i32), f64> = HashMap::new();
    for f in &schema.facts {
        if f.crop != crop {
            continue;
        }
        if let Some(y) = f.yield_kg_ha {
            yields.insert((f.dist_code.as_str(), f.year), y);
        }
    }
    let Some(latest) = yields.keys().map(|(_, year)| *year).max() else {
        return Vec::new();
    };
    let past_year = latest - span_years;

    let mut gains: Vec<(String, f64)> = Vec::new();
    for district in &schema.dim_district {
        let now = yields.get(&(district.dist_code.as_str(), latest));
        let then = yields.get(&(district.dist_code.as_str(), past_year));
        if let (Some(&now), Some(&then)) = (now, then) {
            gains.push((district.dist_name.clone(), now - then));
        }
    }
    gains.sort_by(|a, b| desc(a.1, b.1).then_with(|| a.0.cmp(&b.0)));
    gains
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, (dist_name, gain))| YieldGainRow {
            rank: i + 1,
            dist_name,
            gain_kg_ha: gain,
        })
        .collect()
}

/// Pearson correlation between area and production per (district, crop),
/// over the years where BOTH measures are present. Groups with fewer than
/// three such years, or with a constant side, are skipped — absence is
/// never treated as zero.
pub fn area_production_correlation(
    schema: &StarSchema,
    crops: &[&str],
    top_n: usize,
) -> Vec<CorrelationRow> {
    let names = schema.district_names();
    let mut samples: HashMap<(&str, &str), (Vec<f64>, Vec<f64>)> = HashMap::new();
    for f in &schema.facts {
        if !crops.contains(&f.crop.as_str()) {
            continue;
        }
        if let (Some(area), Some(prod)) = (f.area_1000_ha, f.production_1000_t) {
            let entry = samples
                .entry((f.dist_code.as_str(), f.crop.as_str()))
                .or_default();
            entry.0.push(area);
            entry.1.push(prod);
        }
    }
    let mut rows: Vec<CorrelationRow> = Vec::new();
    for (&(dist_code, crop), (areas, prods)) in &samples {
        if areas.len() < MIN_CORRELATION_POINTS {
            continue;
        }
        if let Some(r) = pearson(areas, prods) {
            rows.push(CorrelationRow {
                dist_name: names.get(dist_code).copied().unwrap_or(dist_code).to_string(),
                crop: crop.to_string(),
                pearson_corr: r,
            });
        }
    }
    rows.sort_by(|a, b| {
        desc(a.pearson_corr, b.pearson_corr)
            .then_with(|| a.dist_name.cmp(&b.dist_name))
            .then_with(|| a.crop.cmp(&b.crop))
    });
    rows.truncate(top_n);
    rows
}

/// Mean of the yields actually recorded for the crop in each year; absent
/// yields are skipped, not averaged in as zero.
pub fn annual_average_yield(schema: &StarSchema, crop: &str) -> Vec<YieldTrendRow> {
    let mut by_year: HashMap<i32, Vec<f64>> = HashMap::new();
    for f in &schema.facts {
        if f.crop != crop {
            continue;
        }
        if let Some(y) = f.yield_kg_ha {
            by_year.entry(f.year).or_default().push(y);
        }
    }
    let mut rows: Vec<YieldTrendRow> = by_year
        .into_iter()
        .map(|(year, yields)| YieldTrendRow {
            year,
            avg_yield_kg_ha: average(&yields),
        })
        .collect();
    rows.sort_by_key(|r| r.year);
    rows
}

pub fn generate_summary(schema: &StarSchema) -> SummaryStats {
    let crops: HashSet<&str> = schema.facts.iter().map(|f| f.crop.as_str()).collect();
    SummaryStats {
        total_facts: schema.facts.len(),
        total_states: schema.dim_state.len(),
        total_districts: schema.dim_district.len(),
        total_crops: crops.len(),
        first_year: schema.facts.iter().map(|f| f.year).min().unwrap_or(0),
        last_year: schema.facts.iter().map(|f| f.year).max().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::build_star_schema;
    use crate::types::{WideRow, WideTable};

    fn row(dist: &str, dist_name: &str, state: &str, state_name: &str, year: i32, values: Vec<Option<f64>>) -> WideRow {
        WideRow {
            dist_code: dist.to_string(),
            dist_name: dist_name.to_string(),
            state_code: state.to_string(),
            state_name: state_name.to_string(),
            year,
            values,
        }
    }

    // Columns: RICE AREA, RICE PRODUCTION, RICE YIELD, WHEAT PRODUCTION,
    // WHEAT YIELD. WHEAT has no area column; West Bengal grows no wheat.
    fn schema() -> crate::types::StarSchema {
        let table = WideTable {
            measure_columns: vec![
                "RICE AREA (1000 ha)".to_string(),
                "RICE PRODUCTION (1000 tons)".to_string(),
                "RICE YIELD (Kg per ha)".to_string(),
                "WHEAT PRODUCTION (1000 tons)".to_string(),
                "WHEAT YIELD (Kg per ha)".to_string(),
            ],
            rows: vec![
                row("14", "Agra", "9", "Uttar Pradesh", 1990,
                    vec![Some(10.0), Some(20.0), Some(2000.0), Some(30.0), Some(1500.0)]),
                row("14", "Agra", "9", "Uttar Pradesh", 1995,
                    vec![Some(12.0), Some(30.0), Some(2500.0), Some(35.0), Some(1800.0)]),
                row("15", "Aligarh", "9", "Uttar Pradesh", 1990,
                    vec![Some(8.0), Some(10.0), Some(1250.0), Some(20.0), Some(1000.0)]),
                row("15", "Aligarh", "9", "Uttar Pradesh", 1995,
                    vec![Some(9.0), Some(15.0), Some(1600.0), Some(25.0), Some(1100.0)]),
                row("130", "Hooghly", "28", "West Bengal", 1990,
                    vec![Some(50.0), Some(100.0), Some(2000.0), None, None]),
                row("130", "Hooghly", "28", "West Bengal", 1995,
                    vec![Some(55.0), Some(120.0), Some(2100.0), None, None]),
                row("130", "Hooghly", "28", "West Bengal", 2000,
                    vec![Some(60.0), Some(140.0), Some(2200.0), None, None]),
            ],
        };
        build_star_schema(&table).unwrap()
    }

    #[test]
    fn ranks_states_by_total_production() {
        let rows = top_states_by_production(&schema(), "RICE", 7);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].state_name, "West Bengal");
        assert_eq!(rows[0].production_1000_t, 360.0);
        assert_eq!(rows[1].state_name, "Uttar Pradesh");
        assert_eq!(rows[1].production_1000_t, 75.0);
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn top_n_cuts_the_ranking() {
        let rows = top_states_by_production(&schema(), "RICE", 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].state_name, "West Bengal");
    }

    #[test]
    fn trend_keeps_the_last_n_years_in_order() {
        let rows = production_trend(&schema(), &["RICE"], 2);
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].year, rows[0].production_1000_t), (1995, 165.0));
        assert_eq!((rows[1].year, rows[1].production_1000_t), (2000, 140.0));
    }

    #[test]
    fn trend_sums_over_a_crop_set() {
        let rows = production_trend(&schema(), &["RICE", "WHEAT"], 10);
        let y1990 = rows.iter().find(|r| r.year == 1990).unwrap();
        assert_eq!(y1990.production_1000_t, 130.0 + 50.0);
    }

    #[test]
    fn ranks_districts_within_a_state() {
        let rows = district_production_in_state(&schema(), "RICE", "Uttar Pradesh", 10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].dist_name, "Agra");
        assert_eq!(rows[0].production_1000_t, 50.0);
        assert_eq!(rows[1].dist_name, "Aligarh");
    }

    #[test]
    fn unknown_state_yields_no_rows() {
        assert!(district_production_in_state(&schema(), "RICE", "Atlantis", 10).is_empty());
    }

    #[test]
    fn ranks_years_for_a_state() {
        let rows = top_production_years(&schema(), "WHEAT", "Uttar Pradesh", 10);
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].year, rows[0].production_1000_t), (1995, 60.0));
        assert_eq!(rows[0].rank, 1);
    }

    #[test]
    fn growth_skips_states_missing_an_endpoint() {
        // Latest rice year is 2000; only West Bengal has data there.
        let rows = production_growth_by_state(&schema(), "RICE", 5, 5);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].state_name, "West Bengal");
        assert!((rows[0].growth_pct - 100.0 * (140.0 - 120.0) / 120.0).abs() < 1e-9);
    }

    #[test]
    fn growth_over_wheat_covers_both_endpoints() {
        let rows = production_growth_by_state(&schema(), "WHEAT", 5, 5);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].state_name, "Uttar Pradesh");
        assert!((rows[0].growth_pct - 20.0).abs() < 1e-9);
    }

    #[test]
    fn yield_gain_ranks_districts_with_both_endpoints() {
        let rows = yield_gain_by_district(&schema(), "WHEAT", 5, 5);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].dist_name, "Agra");
        assert_eq!(rows[0].gain_kg_ha, 300.0);
        assert_eq!(rows[1].gain_kg_ha, 100.0);
    }

    #[test]
    fn correlation_requires_three_present_pairs() {
        let rows = area_production_correlation(&schema(), &["RICE", "WHEAT"], 15);
        // Only Hooghly has three years of rice; wheat has no area column,
        // so no (district, WHEAT) group ever qualifies.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dist_name, "Hooghly");
        assert_eq!(rows[0].crop, "RICE");
        assert!((rows[0].pearson_corr - 1.0).abs() < 1e-9);
    }

    #[test]
    fn average_yield_skips_absent_values() {
        let rows = annual_average_yield(&schema(), "WHEAT");
        // West Bengal's absent wheat yields must not drag the mean down.
        let y1990 = rows.iter().find(|r| r.year == 1990).unwrap();
        assert!((y1990.avg_yield_kg_ha - 1250.0).abs() < 1e-9);
    }

    #[test]
    fn summary_counts_the_schema() {
        let s = generate_summary(&schema());
        assert_eq!(s.total_facts, 14);
        assert_eq!(s.total_states, 2);
        assert_eq!(s.total_districts, 3);
        assert_eq!(s.total_crops, 2);
        assert_eq!((s.first_year, s.last_year), (1990, 2000));
    }
}
