use anyhow::{Context, Result};
use tracing::{info, warn};

use mart_builder::{CsvCatalog, ParquetPublisher, Pipeline};
use marts_common::PipelineConfig;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("🚀 Starting mart builder");

    // Load configuration
    let config = PipelineConfig::from_env().context("Failed to load pipeline configuration")?;
    info!(
        "📋 Configuration loaded: data dir {}, output dir {}",
        config.data_dir.display(),
        config.output_dir.display()
    );

    let catalog = CsvCatalog::new(&config.data_dir);
    let publisher = ParquetPublisher::new(&config.output_dir);
    let pipeline = Pipeline::new(config);

    // Full refresh: staging, fact table, dimensions.
    let (snapshot, report) = pipeline
        .run(&catalog)
        .context("Mart pipeline run failed")?;

    // All four marts are swapped in together; a failure here leaves the
    // previously published snapshot in place.
    publisher
        .publish(&snapshot)
        .context("Failed to publish mart snapshot")?;

    let dropped = report.total_rows_dropped();
    if dropped > 0 {
        warn!("⚠️ {} source rows were excluded during staging", dropped);
    }
    for mart in &report.marts {
        info!("📊 {}: {} rows", mart.name, mart.rows);
    }
    info!(
        "📄 Run report: {}",
        serde_json::to_string(&report).context("Failed to serialize run report")?
    );

    info!("✅ Mart refresh complete");
    Ok(())
}
