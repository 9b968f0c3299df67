// CSV ingestion: read the wide census table into a typed `WideTable`.
//
// The five identity columns are located by header name and parsed into
// typed fields once, here; every other header is kept verbatim as a measure
// column for the classifier. Loading is fail-fast: a malformed year or
// measure cell aborts the load with row/column context instead of skipping
// the row — a silently thinned table would corrupt every downstream count.
use crate::error::LoadError;
use crate::types::{WideRow, WideTable};
use crate::util::{parse_f64_safe, parse_i32_safe};
use csv::ReaderBuilder;

const DIST_CODE: &str = "Dist Code";
const DIST_NAME: &str = "Dist Name";
const YEAR: &str = "Year";
const STATE_CODE: &str = "State Code";
const STATE_NAME: &str = "State Name";

const IDENTITY_COLUMNS: [&str; 5] = [DIST_CODE, DIST_NAME, YEAR, STATE_CODE, STATE_NAME];

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub rows: usize,
    pub measure_columns: usize,
}

pub fn load_wide_table(path: &str) -> Result<(WideTable, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new().from_path(path)?;
    let headers = rdr.headers()?.clone();

    let find = |name: &'static str| -> Result<usize, LoadError> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(LoadError::MissingIdentityColumn(name))
    };
    let dist_code_idx = find(DIST_CODE)?;
    let dist_name_idx = find(DIST_NAME)?;
    let year_idx = find(YEAR)?;
    let state_code_idx = find(STATE_CODE)?;
    let state_name_idx = find(STATE_NAME)?;

    // Everything that is not an identity column is a measure column; the
    // header strings stay untouched so the classifier sees the source names.
    let measure_idx: Vec<usize> = (0..headers.len())
        .filter(|i| {
            let h = headers.get(*i).unwrap_or("").trim();
            !IDENTITY_COLUMNS.contains(&h)
        })
        .collect();
    let measure_columns: Vec<String> = measure_idx
        .iter()
        .map(|i| headers.get(*i).unwrap_or("").trim().to_string())
        .collect();

    let mut rows: Vec<WideRow> = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        // 1-based file line, counting the header line.
        let row_no = i + 2;

        let year = parse_i32_safe(record.get(year_idx)).ok_or_else(|| LoadError::BadYear {
            row: row_no,
            value: record.get(year_idx).unwrap_or("").to_string(),
        })?;

        let mut values: Vec<Option<f64>> = Vec::with_capacity(measure_idx.len());
        for (col, name) in measure_idx.iter().zip(&measure_columns) {
            let cell = record.get(*col).unwrap_or("").trim();
            if cell.is_empty() {
                // Empty cell means the measurement is absent, not zero.
                values.push(None);
            } else {
                let v = parse_f64_safe(Some(cell)).ok_or_else(|| LoadError::BadNumber {
                    row: row_no,
                    column: name.clone(),
                    value: cell.to_string(),
                })?;
                values.push(Some(v));
            }
        }

        rows.push(WideRow {
            dist_code: record.get(dist_code_idx).unwrap_or("").trim().to_string(),
            dist_name: record.get(dist_name_idx).unwrap_or("").trim().to_string(),
            state_code: record.get(state_code_idx).unwrap_or("").trim().to_string(),
            state_name: record.get(state_name_idx).unwrap_or("").trim().to_string(),
            year,
            values,
        });
    }

    let report = LoadReport {
        rows: rows.len(),
        measure_columns: measure_columns.len(),
    };
    Ok((
        WideTable {
            measure_columns,
            rows,
        },
        report,
    ))
}
