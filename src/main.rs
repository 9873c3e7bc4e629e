mod analysis;
mod cleaning;
mod common;
mod config;
mod parsing;

use std::fs;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Import analysis functions
use analysis::{
    generate_correlation_heatmap, generate_distribution_plots, generate_moments_analysis,
    generate_price_trend_plot,
};

use analysis::constants::OUTPUT_FILES;
use cleaning::{clean, CleaningReport};
use common::HousingTable;
use config::AnalysisConfig;
use parsing::load_housing_table;

/// Errors that can occur during analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Parsing error: {0}")]
    Parsing(#[from] parsing::ParsingError),

    #[error("Cleaning error: {0}")]
    Cleaning(#[from] common::data_structures::ColumnError),

    #[error("Failed to create output directory: {0}")]
    OutputDir(#[from] std::io::Error),

    #[error("Moment analysis error: {0}")]
    Moments(#[from] analysis::moments::MomentsError),

    #[error("Distribution analysis error: {0}")]
    Distribution(#[from] analysis::distribution::DistributionError),

    #[error("Price trend analysis error: {0}")]
    PriceTrend(#[from] analysis::price_trend::PriceTrendError),

    #[error("Correlation analysis error: {0}")]
    Correlation(#[from] analysis::correlation::CorrelationError),
}

type Result<T> = core::result::Result<T, AnalysisError>;

/// Table shapes around the cleaning stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shapes {
    original: (usize, usize),
    cleaned: (usize, usize),
}

/// Loads the dataset and runs the cleaning steps
fn load_and_clean(config: &AnalysisConfig) -> Result<(HousingTable, CleaningReport, Shapes)> {
    let table = load_housing_table(&config.data_path)?;
    let original = table.shape();

    let (table, report) = clean(table, &config.date_column)?;
    let cleaned = table.shape();

    Ok((table, report, Shapes { original, cleaned }))
}

/// Runs the whole pipeline: load, clean, summarise and plot
fn run(config: &AnalysisConfig) -> Result<Shapes> {
    fs::create_dir_all(&config.output_dir)?;

    let (table, report, shapes) = load_and_clean(config)?;
    println!("Original shape: {:?}", shapes.original);
    println!("After cleaning: {:?}", shapes.cleaned);
    println!("{}", report.format_table());

    generate_moments_analysis(&table, &config.price_column)?;

    info!("rendering charts");
    generate_distribution_plots(&table, config)?;
    generate_price_trend_plot(&table, config)?;
    generate_correlation_heatmap(&table, config)?;
    info!(files = ?OUTPUT_FILES, "charts written");

    println!(
        "\nAll plots saved in '{}' folder.",
        config.output_dir.display()
    );

    Ok(shapes)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let config = AnalysisConfig::default();
    run(&config)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const HEADER: &str = "id,date,price,bedrooms,bathrooms,sqft_living,floors,zipcode";

    /// Five distinct sales plus an exact copy of the second one
    const ROWS: [&str; 6] = [
        "7129300520,20141013T000000,221900,3,1,1180,1,98178",
        "6414100192,20141209T000000,538000,3,2.25,2570,2,98125",
        "5631500400,20150225T000000,180000,2,1,770,1,98028",
        "2487200875,20141209T000000,604000,4,3,1960,1,98136",
        "1954400510,20150218T000000,510000,3,2,1680,1,98074",
        "6414100192,20141209T000000,538000,3,2.25,2570,2,98125",
    ];

    fn write_dataset(dir: &Path, rows: &[&str]) -> AnalysisConfig {
        let data_path = dir.join("data").join("kc_house_data.csv");
        fs::create_dir_all(data_path.parent().unwrap()).unwrap();
        fs::write(&data_path, format!("{}\n{}\n", HEADER, rows.join("\n"))).unwrap();

        AnalysisConfig {
            data_path,
            output_dir: dir.join("outputs"),
            dpi: 100,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_default_config_paths() {
        let config = AnalysisConfig::default();
        assert_eq!(config.data_path, Path::new("data/kc_house_data.csv"));
        assert_eq!(config.output_dir, Path::new("outputs"));
        assert_eq!(config.histogram_bins, 30);
        assert_eq!(config.dpi, 300);
    }

    #[test]
    fn test_load_and_clean_removes_duplicate() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = write_dataset(temp_dir.path(), &ROWS);

        let (table, report, shapes) = load_and_clean(&config).unwrap();

        assert_eq!(shapes.original, (6, 8));
        assert_eq!(shapes.cleaned, (5, 8));
        assert_eq!(table.shape(), shapes.cleaned);
        assert_eq!(report.steps[0].removed(), 1);
    }

    #[test]
    fn test_missing_input_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            data_path: temp_dir.path().join("absent.csv"),
            output_dir: temp_dir.path().join("outputs"),
            ..AnalysisConfig::default()
        };

        let result = run(&config);
        assert!(matches!(result, Err(AnalysisError::Parsing(_))));
        assert_eq!(fs::read_dir(&config.output_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_output_files_are_distinct_pngs() {
        let mut names: Vec<&str> = OUTPUT_FILES.to_vec();
        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), 4);
        assert!(names.iter().all(|name| name.ends_with(".png")));
    }

    #[test]
    fn test_empty_after_cleaning_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = write_dataset(
            temp_dir.path(),
            &["7129300520,not-a-date,221900,3,1,1180,1,98178"],
        );

        let result = run(&config);
        assert!(matches!(result, Err(AnalysisError::Distribution(_))));
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_run_writes_four_plots() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = write_dataset(temp_dir.path(), &ROWS);

        let shapes = run(&config).unwrap();
        assert_eq!(shapes.original, (6, 8));
        assert_eq!(shapes.cleaned, (5, 8));

        let mut written: Vec<String> = fs::read_dir(&config.output_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        written.sort();

        let mut expected: Vec<String> = OUTPUT_FILES.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(written, expected);
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_run_single_sale_writes_four_plots() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = write_dataset(temp_dir.path(), &ROWS[..1]);

        let shapes = run(&config).unwrap();
        assert_eq!(shapes.cleaned, (1, 8));

        for name in OUTPUT_FILES {
            assert!(config.output_dir.join(name).exists(), "{name} not written");
        }
    }
}
