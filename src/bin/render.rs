use log::info;
use salesdash::BoxError;
use salesdash::config::{DEFAULT_OUT_DIR, DashboardConfig};
use salesdash::dashboard;
use salesdash::filter::FilterSet;
use salesdash::loader::load_dataset;
use std::fs;
use std::path::Path;

/// Writes every chart of the unfiltered dashboard as SVG, plus an
/// `index.html` that shows them together.
///
/// Usage: `render [DATA_FILE] [OUT_DIR]` (default output directory `dashboard_output`,
/// or `SALESDASH_OUT`)
fn main() -> Result<(), BoxError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::from_env("SALESDASH_OUT", DEFAULT_OUT_DIR)?;
    let data = load_dataset(&config.data_path)?;
    let filter = FilterSet::all(&data);

    let out_dir = Path::new(&config.target);
    fs::create_dir_all(out_dir)?;

    let panels = dashboard::build_panels(&data, &filter, config.chart_width, config.chart_height)?;
    for panel in &panels {
        let path = out_dir.join(format!("{}.svg", panel.id));
        fs::write(&path, &panel.svg)?;
        info!("Created {} chart at {}", panel.title, path.display());
    }

    let page = dashboard::render_page(&config.title, &data, &filter, &panels, false)?;
    let index = out_dir.join("index.html");
    fs::write(&index, page)?;
    println!("Wrote {} charts and {}", panels.len(), index.display());

    Ok(())
}
