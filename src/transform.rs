// The wide-to-long reshape and re-pivot transform.
//
// `reshape` melts the wide table into one `LongRecord` per (row, measure
// column); `assemble` pivots the long records back out on metric into one
// `FactRecord` per (district, year, state, crop). `build_star_schema` ties
// the two together with dimension extraction.
//
// The whole transform is fail-fast: the first classification error,
// duplicate measurement or dimension conflict aborts the run with nothing
// stored. A half-built star schema would silently under- or over-count in
// every downstream aggregation.
use crate::classify::classify;
use crate::dimensions::{extract_district_dim, extract_state_dim};
use crate::error::TransformError;
use crate::types::{FactRecord, LongRecord, MeasureKey, Metric, StarSchema, WideTable};
use std::collections::BTreeMap;

/// Melt the wide table into long records.
///
/// Every measure column is classified exactly once, up front; a column that
/// fails to classify aborts the reshape before any record is emitted.
/// Row and column order of the source carry no meaning for the output.
pub fn reshape(table: &WideTable) -> Result<Vec<LongRecord>, TransformError> {
    let keys: Vec<MeasureKey> = table
        .measure_columns
        .iter()
        .map(|name| classify(name))
        .collect::<Result<_, _>>()?;

    let mut records = Vec::with_capacity(table.rows.len() * keys.len());
    for row in &table.rows {
        for (key, value) in keys.iter().zip(&row.values) {
            records.push(LongRecord {
                dist_code: row.dist_code.clone(),
                year: row.year,
                state_code: row.state_code.clone(),
                crop: key.crop.clone(),
                metric: key.metric,
                value: *value,
            });
        }
    }
    Ok(records)
}

#[derive(Default)]
struct Slot {
    area: Option<f64>,
    production: Option<f64>,
    yld: Option<f64>,
    // One flag per metric: a metric may be assigned at most once per group,
    // whether or not the cell held a value.
    seen: [bool; 3],
}

fn metric_slot(metric: Metric) -> usize {
    match metric {
        Metric::Area => 0,
        Metric::Production => 1,
        Metric::Yield => 2,
    }
}

/// Pivot long records into the fact table.
///
/// Groups by (dist_code, year, state_code, crop). A second record for the
/// same metric within one group is a `DuplicateMeasurement` — either a
/// duplicated measure column or a duplicated source row. Metrics the source
/// never provided stay `None`; nothing is derived from the other two.
///
/// The grouping map is a `BTreeMap`, so the output is sorted by the
/// compound key and repeated runs over the same input are identical.
pub fn assemble(records: &[LongRecord]) -> Result<Vec<FactRecord>, TransformError> {
    let mut groups: BTreeMap<(String, i32, String, String), Slot> = BTreeMap::new();

    for rec in records {
        let key = (
            rec.dist_code.clone(),
            rec.year,
            rec.state_code.clone(),
            rec.crop.clone(),
        );
        let slot = groups.entry(key).or_default();
        let idx = metric_slot(rec.metric);
        if slot.seen[idx] {
            return Err(TransformError::DuplicateMeasurement {
                dist_code: rec.dist_code.clone(),
                year: rec.year,
                state_code: rec.state_code.clone(),
                crop: rec.crop.clone(),
                metric: rec.metric,
            });
        }
        slot.seen[idx] = true;
        match rec.metric {
            Metric::Area => slot.area = rec.value,
            Metric::Production => slot.production = rec.value,
            Metric::Yield => slot.yld = rec.value,
        }
    }

    Ok(groups
        .into_iter()
        .map(|((dist_code, year, state_code, crop), slot)| FactRecord {
            dist_code,
            year,
            state_code,
            crop,
            area_1000_ha: slot.area,
            production_1000_t: slot.production,
            yield_kg_ha: slot.yld,
        })
        .collect())
}

/// Run the full transform: dimensions, reshape, assemble.
pub fn build_star_schema(table: &WideTable) -> Result<StarSchema, TransformError> {
    let dim_state = extract_state_dim(table)?;
    let dim_district = extract_district_dim(table)?;
    let long = reshape(table)?;
    let facts = assemble(&long)?;
    Ok(StarSchema {
        dim_state,
        dim_district,
        facts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WideRow;

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

    // Two crops, three district-years. RICE carries all three metrics;
    // PEARL MILLET has no yield column anywhere in the source.
    fn fixture() -> WideTable {
        WideTable {
            measure_columns: vec![
                "RICE AREA (1000 ha)".to_string(),
                "RICE PRODUCTION (1000 tons)".to_string(),
                "RICE YIELD (Kg per ha)".to_string(),
                "PEARL MILLET AREA (1000 ha)".to_string(),
                "PEARL MILLET PRODUCTION (1000 tons)".to_string(),
            ],
            rows: vec![
                row("14", "Agra", "9", "Uttar Pradesh", 1966,
                    vec![Some(63.0), Some(22.0), Some(349.0), Some(52.3), Some(24.3)]),
                row("14", "Agra", "9", "Uttar Pradesh", 1967,
                    vec![Some(61.0), Some(28.0), Some(459.0), Some(49.8), Some(26.1)]),
                row("130", "Hooghly", "28", "West Bengal", 1966,
                    vec![Some(280.0), Some(305.0), Some(1089.0), None, None]),
            ],
        }
    }

    #[test]
    fn one_fact_per_district_year_crop() {
        let facts = assemble(&reshape(&fixture()).unwrap()).unwrap();
        // 2 distinct crops x 3 distinct (district, year) pairs.
        assert_eq!(facts.len(), 6);
        let mut keys: Vec<_> = facts
            .iter()
            .map(|f| (f.dist_code.as_str(), f.year, f.crop.as_str()))
            .collect();
        keys.dedup();
        assert_eq!(keys.len(), 6);
    }

    #[test]
    fn round_trips_source_cells() {
        let table = fixture();
        let facts = assemble(&reshape(&table).unwrap()).unwrap();
        let rice = facts
            .iter()
            .find(|f| f.dist_code == "14" && f.year == 1966 && f.crop == "RICE")
            .unwrap();
        assert_eq!(rice.area_1000_ha, Some(63.0));
        assert_eq!(rice.production_1000_t, Some(22.0));
        assert_eq!(rice.yield_kg_ha, Some(349.0));
        assert_eq!(rice.state_code, "9");
    }

    #[test]
    fn missing_metric_column_leaves_field_absent() {
        let facts = assemble(&reshape(&fixture()).unwrap()).unwrap();
        let millet = facts
            .iter()
            .find(|f| f.dist_code == "14" && f.year == 1966 && f.crop == "PEARL MILLET")
            .unwrap();
        assert_eq!(millet.area_1000_ha, Some(52.3));
        // No yield column for this crop anywhere: absent, not zero.
        assert_eq!(millet.yield_kg_ha, None);
    }

    #[test]
    fn empty_cells_stay_absent_but_keep_the_group() {
        let facts = assemble(&reshape(&fixture()).unwrap()).unwrap();
        let millet = facts
            .iter()
            .find(|f| f.dist_code == "130" && f.crop == "PEARL MILLET")
            .unwrap();
        assert_eq!(millet.area_1000_ha, None);
        assert_eq!(millet.production_1000_t, None);
    }

    #[test]
    fn unclassifiable_column_aborts_reshape() {
        let mut table = fixture();
        table.measure_columns.push("Dist Code".to_string());
        for r in &mut table.rows {
            r.values.push(Some(1.0));
        }
        let err = reshape(&table).unwrap_err();
        assert!(matches!(err, TransformError::Classification(_)));
    }

    #[test]
    fn duplicate_measure_column_is_fatal() {
        let mut table = fixture();
        // Same crop and metric under a different unit spelling.
        table.measure_columns.push("RICE AREA (ha)".to_string());
        for r in &mut table.rows {
            r.values.push(Some(0.0));
        }
        let err = assemble(&reshape(&table).unwrap()).unwrap_err();
        match err {
            TransformError::DuplicateMeasurement { crop, metric, .. } => {
                assert_eq!(crop, "RICE");
                assert_eq!(metric, Metric::Area);
            }
            other => panic!("expected DuplicateMeasurement, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_source_row_is_fatal() {
        let mut table = fixture();
        let dup = table.rows[0].clone();
        table.rows.push(dup);
        assert!(matches!(
            assemble(&reshape(&table).unwrap()),
            Err(TransformError::DuplicateMeasurement { .. })
        ));
    }

    #[test]
    fn transform_is_deterministic() {
        let table = fixture();
        let first = build_star_schema(&table).unwrap();
        let second = build_star_schema(&table).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn row_order_does_not_change_the_output() {
        let table = fixture();
        let mut shuffled = table.clone();
        shuffled.rows.reverse();
        assert_eq!(
            build_star_schema(&table).unwrap().facts,
            build_star_schema(&shuffled).unwrap().facts
        );
    }
}
