//! Computes one dashboard bundle and prints it as JSON.
//!
//! Usage: `production-insights [filters.json]`
//!
//! Without a filter file the default selection is used: most recent year and
//! first available month.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use production_insights::adapters::{
    DatasetLoadError, JsonDatasetLoader, PostgresProductionRelation, SystemClock,
};
use production_insights::application::{
    ComputeDashboardHandler, DashboardError, DashboardRefreshService, LoadFilterOptionsHandler,
    LoadFilterOptionsQuery, RefreshOutcome, ResolveDependentFiltersHandler,
    ResolveDependentFiltersQuery,
};
use production_insights::config::{
    AppConfig, ConfigError, ConfigValidationError, DatasetSource, LogFormat, LoggingConfig,
};
use production_insights::domain::dashboard::DashboardBundle;
use production_insights::domain::filtering::{DependentOptions, FilterOptions, FilterState};
use production_insights::ports::{RelationError, RelationProvider};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    #[error(transparent)]
    Dataset(#[from] DatasetLoadError),

    #[error(transparent)]
    Relation(#[from] RelationError),

    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    #[error("Cannot read filter file {path}: {reason}")]
    Filters { path: PathBuf, reason: String },

    #[error("Cannot encode report: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    filters: FilterState,
    options: FilterOptions,
    dependent_options: DependentOptions,
    bundle: Arc<DashboardBundle>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!(error = %err, "production-insights failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);
    config.validate()?;

    let relation = open_relation(&config).await?;

    let options = LoadFilterOptionsHandler::new(Arc::clone(&relation))
        .handle(LoadFilterOptionsQuery)
        .await?;

    let filters = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => read_filters(path).await?,
        None => FilterState::default().with_defaults(&options),
    };

    let resolved = ResolveDependentFiltersHandler::new(Arc::clone(&relation))
        .handle(ResolveDependentFiltersQuery { filters })
        .await?;
    if resolved.changed {
        tracing::info!("Dropped filter selections that no longer match any record");
    }

    let refresh = DashboardRefreshService::new(ComputeDashboardHandler::new(
        relation,
        Arc::new(SystemClock),
    ));
    let bundle = match refresh.submit(resolved.filters.clone()).await? {
        RefreshOutcome::Published(bundle) => bundle,
        RefreshOutcome::Superseded { generation } => {
            return Err(AppError::Dashboard(DashboardError::Query(format!(
                "run {generation} superseded"
            ))))
        }
    };

    let report = Report {
        filters: resolved.filters,
        options,
        dependent_options: resolved.options,
        bundle,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_tracing(config: &LoggingConfig) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr);
    match config.format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.init(),
    }
}

async fn open_relation(config: &AppConfig) -> Result<Arc<dyn RelationProvider>, AppError> {
    match config.dataset.source {
        DatasetSource::Json => {
            let path = config
                .dataset
                .path
                .as_ref()
                .ok_or(ConfigValidationError::MissingRequired(
                    "PRODUCTION_INSIGHTS__DATASET__PATH",
                ))?;
            let table = JsonDatasetLoader::new(path).load().await?;
            Ok(Arc::new(table))
        }
        DatasetSource::Postgres => {
            let database = config
                .database
                .as_ref()
                .ok_or(ConfigValidationError::MissingRequired(
                    "PRODUCTION_INSIGHTS__DATABASE__URL",
                ))?;
            let relation =
                PostgresProductionRelation::connect(database, &config.dataset.table).await?;
            if database.run_migrations {
                relation.run_migrations().await?;
            }
            tracing::info!(table = %config.dataset.table, "Connected to production relation");
            Ok(Arc::new(relation))
        }
    }
}

async fn read_filters(path: PathBuf) -> Result<FilterState, AppError> {
    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|err| AppError::Filters {
            path: path.clone(),
            reason: err.to_string(),
        })?;
    serde_json::from_str(&raw).map_err(|err| AppError::Filters {
        path,
        reason: err.to_string(),
    })
}
