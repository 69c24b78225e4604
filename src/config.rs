use crate::BoxError;
use std::path::PathBuf;

pub const DEFAULT_DATA_FILE: &str = "Tata_Mahindra_sales.xlsx";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_OUT_DIR: &str = "dashboard_output";
pub const DEFAULT_TITLE: &str = "Tata vs Mahindra Sales Dashboard";
pub const DEFAULT_CHART_WIDTH: u32 = 800;
pub const DEFAULT_CHART_HEIGHT: u32 = 500;

/// Runtime settings shared by the server and the static renderer
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardConfig {
    /// Spreadsheet to load
    pub data_path: PathBuf,

    /// Address the HTTP server listens on, or the output directory for `render`
    pub target: String,

    /// Page heading
    pub title: String,

    /// Pixel size of every chart
    pub chart_width: u32,
    pub chart_height: u32,
}

impl DashboardConfig {
    /// Resolves settings from positional arguments, then the environment,
    /// then built-in defaults.
    ///
    /// # Arguments
    /// * `args` - Positional arguments after the program name: `[DATA_FILE] [TARGET]`
    /// * `env` - Environment lookup, normally `|k| std::env::var(k).ok()`
    /// * `target_var` - Variable consulted when no second argument is given
    ///   (`SALESDASH_ADDR` for the server, `SALESDASH_OUT` for `render`)
    /// * `default_target` - Used when neither argument nor variable sets the target
    ///
    /// # Returns
    /// * `Result<DashboardConfig, BoxError>` - Error if a size variable is not a positive integer
    pub fn resolve(
        args: &[String],
        env: impl Fn(&str) -> Option<String>,
        target_var: &str,
        default_target: &str,
    ) -> Result<Self, BoxError> {
        let data_path = args
            .first()
            .cloned()
            .or_else(|| env("SALESDASH_DATA"))
            .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());

        let target = args
            .get(1)
            .cloned()
            .or_else(|| env(target_var))
            .unwrap_or_else(|| default_target.to_string());

        let title = env("SALESDASH_TITLE").unwrap_or_else(|| DEFAULT_TITLE.to_string());

        Ok(DashboardConfig {
            data_path: PathBuf::from(data_path),
            target,
            title,
            chart_width: dimension(&env, "SALESDASH_CHART_WIDTH", DEFAULT_CHART_WIDTH)?,
            chart_height: dimension(&env, "SALESDASH_CHART_HEIGHT", DEFAULT_CHART_HEIGHT)?,
        })
    }

    /// Settings for the current process
    pub fn from_env(target_var: &str, default_target: &str) -> Result<Self, BoxError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::resolve(&args, |k| std::env::var(k).ok(), target_var, default_target)
    }
}

fn dimension(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u32,
) -> Result<u32, BoxError> {
    match env(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(v) if (100..=4000).contains(&v) => Ok(v),
            _ => Err(format!(
                "{} must be a pixel size between 100 and 4000, got '{}'",
                key, raw
            )
            .into()),
        },
    }
}
