// Entry point and high-level CLI flow.
//
// - Option [1] loads the wide census CSV and builds the star schema
//   (dimension tables + crop-year fact table), printing diagnostics.
// - Option [2] runs the report battery over the star schema: each report is
//   exported as CSV, previewed on the console, and emitted as a chart spec
//   for the rendering sink.
// - After generating reports, the user can choose to go back to the
//   selection menu or exit.
mod classify;
mod dimensions;
mod error;
mod loader;
mod output;
mod reports;
mod transform;
mod types;
mod util;

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use types::{ChartKind, ChartSpec, Series, StarSchema};

// Simple in-memory app state so we only load and transform the CSV once but
// can generate reports multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { schema: None }));

struct AppState {
    schema: Option<StarSchema>,
}

/// Read a single line of input after printing the common "Enter choice:"
/// prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the wide CSV and build the star schema.
///
/// On success the `StarSchema` is stored in `APP_STATE` and a short textual
/// summary of the transform is printed. Any load or transform error aborts
/// the whole run for this file: nothing partial is stored.
fn handle_load() {
    let path = "district_level_data.csv";
    let (table, load_report) = match loader::load_wide_table(path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
            return;
        }
    };
    println!(
        "Processing dataset... ({} rows, {} measure columns)",
        util::format_int(load_report.rows as i64),
        util::format_int(load_report.measure_columns as i64)
    );

    match transform::build_star_schema(&table) {
        Ok(schema) => {
            println!(
                "Star schema built: {} facts, {} states, {} districts.",
                util::format_int(schema.facts.len() as i64),
                util::format_int(schema.dim_state.len() as i64),
                util::format_int(schema.dim_district.len() as i64)
            );
            println!("");
            let mut state = APP_STATE.lock().unwrap();
            state.schema = Some(schema);
        }
        Err(e) => {
            eprintln!("Transform failed: {}\n", e);
        }
    }
}

/// Handle option [2]: generate all reports, chart specs and the JSON
/// summary.
///
/// This function is intentionally side-effectful: it writes one CSV per
/// report, one JSON chart spec per figure, a JSON summary, and prints a
/// preview of each report to the console.
fn handle_generate_reports() {
    let schema = {
        let state = APP_STATE.lock().unwrap();
        state.schema.clone()
    };
    let Some(schema) = schema else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };

    println!("Generating reports...");
    println!("Outputs saved to individual files...\n");

    let r1 = reports::top_states_by_production(&schema, "RICE", 7);
    if let Err(e) = output::write_csv("report1_rice_top_states.csv", &r1) {
        eprintln!("Write error: {}", e);
    }
    let c1 = ChartSpec::bar(
        "Top 7 States in Rice Production",
        "State",
        "Rice Production (1000 tons)",
        Series::new(
            "RICE",
            r1.iter()
                .map(|r| (r.state_name.clone(), r.production_1000_t))
                .collect(),
        ),
    );
    if let Err(e) = output::write_chart("chart1_rice_top_states.json", &c1) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 1: Top 7 States in Rice Production\n");
    output::preview_table_rows(&r1, 3);

    let r2 = reports::top_states_by_production(&schema, "WHEAT", 5);
    if let Err(e) = output::write_csv("report2_wheat_top_states.csv", &r2) {
        eprintln!("Write error: {}", e);
    }
    let wheat_series = Series::new(
        "WHEAT",
        r2.iter()
            .map(|r| (r.state_name.clone(), r.production_1000_t))
            .collect(),
    );
    let c2 = ChartSpec::bar(
        "Top 5 Wheat Producing States",
        "State",
        "Wheat Production (1000 tons)",
        wheat_series.clone(),
    );
    if let Err(e) = output::write_chart("chart2_wheat_top_states.json", &c2) {
        eprintln!("Write error: {}", e);
    }
    // The same ranking doubles as a share-of-total pie.
    let c2b = ChartSpec::pie(
        "Top 5 Wheat Producing States - Percentage Share",
        wheat_series,
    );
    if let Err(e) = output::write_chart("chart2_wheat_share.json", &c2b) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 2: Top 5 Wheat Producing States\n");
    output::preview_table_rows(&r2, 3);

    let r3 = reports::production_growth_by_state(&schema, "OILSEEDS", 5, 5);
    if let Err(e) = output::write_csv("report3_oilseeds_growth.csv", &r3) {
        eprintln!("Write error: {}", e);
    }
    let c3 = ChartSpec::bar(
        "Oilseeds Production Growth Rate (5-Year)",
        "State",
        "Growth (%)",
        Series::new(
            "OILSEEDS",
            r3.iter()
                .map(|r| (r.state_name.clone(), r.growth_pct))
                .collect(),
        ),
    );
    if let Err(e) = output::write_chart("chart3_oilseeds_growth.json", &c3) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 3: Highest 5-Year Growth in Oilseeds Production\n");
    output::preview_table_rows(&r3, 3);

    let r4 = reports::production_trend(&schema, &["SUGARCANE"], 50);
    if let Err(e) = output::write_csv("report4_sugarcane_trend.csv", &r4) {
        eprintln!("Write error: {}", e);
    }
    let c4 = ChartSpec::line(
        "Sugarcane Production (Last 50 Years)",
        "Year",
        "Production (1000 tons)",
        vec![Series::new(
            "SUGARCANE",
            r4.iter()
                .map(|r| (r.year.to_string(), r.production_1000_t))
                .collect(),
        )],
    );
    if let Err(e) = output::write_chart("chart4_sugarcane_trend.json", &c4) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 4: Sugarcane Production Trend (Last 50 Years)\n");
    output::preview_table_rows(&r4, 3);

    // Chart-only comparison: one line per crop over the shared year axis.
    let rice_trend = reports::production_trend(&schema, &["RICE"], 50);
    let wheat_trend = reports::production_trend(&schema, &["WHEAT"], 50);
    let c5 = ChartSpec::line(
        "Rice vs Wheat Production (Last 50 Years)",
        "Year",
        "Production (1000 tons)",
        vec![
            Series::new(
                "RICE",
                rice_trend
                    .iter()
                    .map(|r| (r.year.to_string(), r.production_1000_t))
                    .collect(),
            ),
            Series::new(
                "WHEAT",
                wheat_trend
                    .iter()
                    .map(|r| (r.year.to_string(), r.production_1000_t))
                    .collect(),
            ),
        ],
    );
    if let Err(e) = output::write_chart("chart5_rice_vs_wheat.json", &c5) {
        eprintln!("Write error: {}", e);
    }
    println!("Chart 5: Rice vs Wheat Production (chart5_rice_vs_wheat.json)\n");

    let r6 = reports::production_trend(&schema, &["PEARL MILLET", "FINGER MILLET"], 50);
    if let Err(e) = output::write_csv("report6_millet_trend.csv", &r6) {
        eprintln!("Write error: {}", e);
    }
    let c6 = ChartSpec::line(
        "Millet (Pearl + Finger) Production (Last 50 Years)",
        "Year",
        "Production (1000 tons)",
        vec![Series::new(
            "MILLET",
            r6.iter()
                .map(|r| (r.year.to_string(), r.production_1000_t))
                .collect(),
        )],
    );
    if let Err(e) = output::write_chart("chart6_millet_trend.json", &c6) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 6: Millet Production Trend (Pearl + Finger)\n");
    output::preview_table_rows(&r6, 3);

    let r7 = reports::district_production_in_state(&schema, "RICE", "West Bengal", 10);
    if let Err(e) = output::write_csv("report7_wb_rice_districts.csv", &r7) {
        eprintln!("Write error: {}", e);
    }
    let c7 = ChartSpec::bar(
        "Rice Production by Districts in West Bengal",
        "District",
        "Rice Production (1000 tons)",
        Series::new(
            "RICE",
            r7.iter()
                .map(|r| (r.dist_name.clone(), r.production_1000_t))
                .collect(),
        ),
    );
    if let Err(e) = output::write_chart("chart7_wb_rice_districts.json", &c7) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 7: Rice Production by Districts in West Bengal\n");
    output::preview_table_rows(&r7, 3);

    let r8 = reports::top_production_years(&schema, "WHEAT", "Uttar Pradesh", 10);
    if let Err(e) = output::write_csv("report8_up_wheat_years.csv", &r8) {
        eprintln!("Write error: {}", e);
    }
    let c8 = ChartSpec::bar(
        "Top 10 Wheat Production Years in Uttar Pradesh",
        "Year",
        "Wheat Production (1000 tons)",
        Series::new(
            "WHEAT",
            r8.iter()
                .map(|r| (r.year.to_string(), r.production_1000_t))
                .collect(),
        ),
    );
    if let Err(e) = output::write_chart("chart8_up_wheat_years.json", &c8) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 8: Top 10 Wheat Production Years in Uttar Pradesh\n");
    output::preview_table_rows(&r8, 3);

    let r9 = reports::yield_gain_by_district(&schema, "WHEAT", 5, 5);
    if let Err(e) = output::write_csv("report9_wheat_yield_gain.csv", &r9) {
        eprintln!("Write error: {}", e);
    }
    let c9 = ChartSpec::bar(
        "Wheat Yield Increase (kg/ha) - Top 5 Districts",
        "District",
        "Increase (kg/ha)",
        Series::new(
            "WHEAT",
            r9.iter()
                .map(|r| (r.dist_name.clone(), r.gain_kg_ha))
                .collect(),
        ),
    );
    if let Err(e) = output::write_chart("chart9_wheat_yield_gain.json", &c9) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 9: Top 5 Districts by Wheat Yield Increase (Last 5 Years)\n");
    output::preview_table_rows(&r9, 3);

    let r10 = reports::annual_average_yield(&schema, "MAIZE");
    if let Err(e) = output::write_csv("report10_maize_avg_yield.csv", &r10) {
        eprintln!("Write error: {}", e);
    }
    let c10 = ChartSpec::line(
        "Average Maize Yield Across All States",
        "Year",
        "Yield (kg/ha)",
        vec![Series::new(
            "MAIZE",
            r10.iter()
                .map(|r| (r.year.to_string(), r.avg_yield_kg_ha))
                .collect(),
        )],
    );
    if let Err(e) = output::write_chart("chart10_maize_avg_yield.json", &c10) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 10: Annual Average Maize Yield\n");
    output::preview_table_rows(&r10, 3);

    let r11 = reports::area_production_correlation(&schema, &["RICE", "WHEAT", "MAIZE"], 15);
    if let Err(e) = output::write_csv("report11_area_production_corr.csv", &r11) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 11: District-Wise Area vs Production Correlation (Rice/Wheat/Maize)\n");
    output::preview_table_rows(&r11, 3);

    // One scatter series per crop, straight off the fact table; only
    // district-years with both measures present contribute a point.
    let scatter_series: Vec<Series> = ["RICE", "WHEAT", "MAIZE"]
        .iter()
        .map(|crop| {
            Series::new(
                crop,
                schema
                    .facts
                    .iter()
                    .filter(|f| f.crop == *crop)
                    .filter_map(|f| match (f.area_1000_ha, f.production_1000_t) {
                        (Some(area), Some(prod)) => Some((area.to_string(), prod)),
                        _ => None,
                    })
                    .collect(),
            )
        })
        .collect();
    let c12 = ChartSpec::new(
        ChartKind::Scatter,
        "Area vs Production (Rice, Wheat, Maize)",
        "Area Cultivated (1000 ha)",
        "Production (1000 tons)",
        scatter_series,
    );
    if let Err(e) = output::write_chart("chart12_area_vs_production.json", &c12) {
        eprintln!("Write error: {}", e);
    }
    println!("Chart 12: Area vs Production scatter (chart12_area_vs_production.json)\n");

    let summary = reports::generate_summary(&schema);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"total_facts\": {}, \"total_crops\": {}, \"years\": {}-{}}}\n",
        util::format_int(summary.total_facts as i64),
        summary.total_crops,
        summary.first_year,
        summary.last_year
    );
}

fn main() {
    loop {
        println!("Select an option:");
        println!("[1] Load the census file");
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!("");
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
