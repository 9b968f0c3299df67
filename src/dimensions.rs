// Dimension Extractor: derive the state and district lookup tables from the
// wide table, independent of the reshape path.
//
// Deduplication is by identity code. A code observed with two different
// names (or, for a district, two different parent states) is a fatal
// `InconsistentDimension` — the source is assumed to carry one canonical
// name per code across all years, and silently picking one would hide a
// data-quality problem.
use crate::error::TransformError;
use crate::types::{DistrictDim, StateDim, WideTable};
use std::collections::BTreeMap;

pub fn extract_state_dim(table: &WideTable) -> Result<Vec<StateDim>, TransformError> {
    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
    for row in &table.rows {
        if let Some(&name) = seen.get(row.state_code.as_str()) {
            if name != row.state_name.as_str() {
                return Err(TransformError::InconsistentDimension {
                    entity: "state",
                    code: row.state_code.clone(),
                    attribute: "name",
                    first: name.to_string(),
                    second: row.state_name.clone(),
                });
            }
        } else {
            seen.insert(&row.state_code, &row.state_name);
        }
    }
    Ok(seen
        .into_iter()
        .map(|(code, name)| StateDim {
            state_code: code.to_string(),
            state_name: name.to_string(),
        })
        .collect())
}

pub fn extract_district_dim(table: &WideTable) -> Result<Vec<DistrictDim>, TransformError> {
    // District codes are globally unique: one code never appears under two
    // states, so the parent state is checked alongside the name.
    let mut seen: BTreeMap<&str, (&str, &str)> = BTreeMap::new();
    for row in &table.rows {
        if let Some(&(name, state)) = seen.get(row.dist_code.as_str()) {
            if name != row.dist_name.as_str() {
                return Err(TransformError::InconsistentDimension {
                    entity: "district",
                    code: row.dist_code.clone(),
                    attribute: "name",
                    first: name.to_string(),
                    second: row.dist_name.clone(),
                });
            }
            if state != row.state_code.as_str() {
                return Err(TransformError::InconsistentDimension {
                    entity: "district",
                    code: row.dist_code.clone(),
                    attribute: "state code",
                    first: state.to_string(),
                    second: row.state_code.clone(),
                });
            }
        } else {
            seen.insert(&row.dist_code, (&row.dist_name, &row.state_code));
        }
    }
    Ok(seen
        .into_iter()
        .map(|(code, (name, state))| DistrictDim {
            dist_code: code.to_string(),
            dist_name: name.to_string(),
            state_code: state.to_string(),
        })
        .collect())
}
