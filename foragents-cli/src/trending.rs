//! Trending command implementation for the forAgents CLI.

use std::io::{BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use clap::Parser;
use foragents_core::{
    CounterSource, Entity, FallbackCounterSource, JsonCounterSource, SqliteCounterSource,
    TrendingResult,
};
use foragents_fs::{open_utf8_file, write_utf8_file};
use foragents_trending::{
    DecayParams, TrendingConfig, TrendingExplanation, TrendingScorer, TrendingSignals,
    explain_from_source,
};
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_COUNTERS_DB, ARG_COUNTERS_JSON, ARG_ENTITIES, ARG_EXPLAIN, ARG_HALF_LIFE_DAYS, ARG_LIMIT,
    ARG_MAX_AGE_DAYS, ARG_NOW, ARG_OUTPUT, CliError, ENV_ENTITIES,
};

/// CLI arguments for the `trending` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rank catalogue entities by recency-weighted engagement. \
                 Counters are read from a SQLite database, a JSON file, or \
                 the database with the file as a fallback. Paths can come \
                 from CLI flags, configuration files, or environment \
                 variables.",
    about = "Rank entities and assign trending badges"
)]
#[ortho_config(prefix = "FORAGENTS")]
pub(crate) struct TrendingArgs {
    /// Path to a JSON array of entities to rank.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) entities: Option<Utf8PathBuf>,
    /// Path to the flat-file engagement counters.
    #[arg(long = ARG_COUNTERS_JSON, value_name = "path")]
    #[serde(default)]
    pub(crate) counters_json: Option<Utf8PathBuf>,
    /// Path to the SQLite engagement counters.
    #[arg(long = ARG_COUNTERS_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) counters_db: Option<Utf8PathBuf>,
    /// Instant to score at, as RFC 3339. Defaults to the current time.
    #[arg(long = ARG_NOW, value_name = "instant")]
    #[serde(default)]
    pub(crate) now: Option<String>,
    /// Emit at most this many ranked entities.
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Override the decay half-life in days.
    #[arg(long = ARG_HALF_LIFE_DAYS, value_name = "days")]
    #[serde(default)]
    pub(crate) half_life_days: Option<f64>,
    /// Override the age in days beyond which events are ignored.
    #[arg(long = ARG_MAX_AGE_DAYS, value_name = "days")]
    #[serde(default)]
    pub(crate) max_age_days: Option<f64>,
    /// Include the signals behind each score.
    #[arg(long = ARG_EXPLAIN)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) explain: bool,
    /// Write the report to this path instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TrendingArgs {
    pub(crate) fn into_config(self) -> Result<TrendingCommandConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TrendingCommandConfig::try_from(merged)
    }
}

/// Where engagement counters are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CounterSources {
    /// Flat JSON file only.
    Json(Utf8PathBuf),
    /// SQLite database only.
    Database(Utf8PathBuf),
    /// SQLite database, answered from the JSON file when it fails.
    DatabaseWithFallback {
        database: Utf8PathBuf,
        json: Utf8PathBuf,
    },
}

/// Resolved `trending` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TrendingCommandConfig {
    /// Path to the entities JSON file.
    pub(crate) entities: Utf8PathBuf,
    /// Counter sources to consult.
    pub(crate) counters: CounterSources,
    /// Fixed scoring instant; `None` reads the clock at run time.
    pub(crate) now: Option<DateTime<Utc>>,
    /// Maximum number of results to emit.
    pub(crate) limit: Option<usize>,
    /// Scorer configuration including decay overrides.
    pub(crate) scoring: TrendingConfig,
    /// Whether to include per-entity signals.
    pub(crate) explain: bool,
    /// Output file; `None` writes to the provided stream.
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TrendingCommandConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.entities, ARG_ENTITIES)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match foragents_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<TrendingArgs> for TrendingCommandConfig {
    type Error = CliError;

    fn try_from(args: TrendingArgs) -> Result<Self, Self::Error> {
        let entities = args.entities.ok_or(CliError::MissingArgument {
            field: ARG_ENTITIES,
            env: ENV_ENTITIES,
        })?;

        let counters = match (args.counters_db, args.counters_json) {
            (Some(database), Some(json)) => CounterSources::DatabaseWithFallback { database, json },
            (Some(database), None) => CounterSources::Database(database),
            (None, Some(json)) => CounterSources::Json(json),
            (None, None) => {
                return Err(CliError::MissingCounterSource {
                    json: ARG_COUNTERS_JSON,
                    db: ARG_COUNTERS_DB,
                });
            }
        };

        let now = args.now.map(|value| parse_now(&value)).transpose()?;

        let defaults = DecayParams::default();
        let scoring = TrendingConfig {
            decay: DecayParams {
                half_life_days: args.half_life_days.unwrap_or(defaults.half_life_days),
                max_age_days: args.max_age_days.unwrap_or(defaults.max_age_days),
            },
            ..TrendingConfig::default()
        }
        .validate()?;

        Ok(Self {
            entities,
            counters,
            now,
            limit: args.limit,
            scoring,
            explain: args.explain,
            output: args.output,
        })
    }
}

fn parse_now(value: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|source| CliError::InvalidNow {
            value: value.to_owned(),
            source,
        })
}

/// Builds the counter source for the current trending invocation.
pub(super) trait CounterSourceBuilder {
    fn build(&self, sources: &CounterSources) -> Box<dyn CounterSource>;
}

pub(super) struct DefaultCounterSourceBuilder;

impl CounterSourceBuilder for DefaultCounterSourceBuilder {
    fn build(&self, sources: &CounterSources) -> Box<dyn CounterSource> {
        match sources {
            CounterSources::Json(path) => Box::new(JsonCounterSource::new(path.clone())),
            CounterSources::Database(path) => Box::new(SqliteCounterSource::new(path.clone())),
            CounterSources::DatabaseWithFallback { database, json } => {
                Box::new(FallbackCounterSource::new(
                    SqliteCounterSource::new(database.clone()),
                    JsonCounterSource::new(json.clone()),
                ))
            }
        }
    }
}

/// Signals behind one ranked entity, emitted with `--explain`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntitySignals {
    pub(crate) entity_id: String,
    pub(crate) baseline: f64,
    #[serde(flatten)]
    pub(crate) signals: TrendingSignals,
}

/// JSON document written by the `trending` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrendingReport {
    pub(crate) computed_at: DateTime<Utc>,
    pub(crate) results: Vec<TrendingResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) signals: Option<Vec<EntitySignals>>,
}

impl TrendingReport {
    fn new(
        computed_at: DateTime<Utc>,
        explained: Vec<TrendingExplanation>,
        limit: Option<usize>,
        explain: bool,
    ) -> Self {
        let keep = limit.unwrap_or(explained.len());
        let mut results = Vec::with_capacity(keep.min(explained.len()));
        let mut signals = Vec::new();
        for explanation in explained.into_iter().take(keep) {
            if explain {
                signals.push(EntitySignals {
                    entity_id: explanation.result.entity_id.clone(),
                    baseline: explanation.baseline,
                    signals: explanation.signals,
                });
            }
            results.push(explanation.result);
        }
        Self {
            computed_at,
            results,
            signals: explain.then_some(signals),
        }
    }
}

pub(super) fn run_trending(args: TrendingArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultCounterSourceBuilder;
    run_trending_with(args, &builder, &mut stdout)
}

pub(super) fn run_trending_with(
    args: TrendingArgs,
    builder: &dyn CounterSourceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_trending_config(args)?;
    let report = execute_trending(&config, builder)?;
    match &config.output {
        Some(path) => write_report_file(path, &report),
        None => write_report(writer, &report),
    }
}

pub(super) fn resolve_trending_config(
    args: TrendingArgs,
) -> Result<TrendingCommandConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn execute_trending(
    config: &TrendingCommandConfig,
    builder: &dyn CounterSourceBuilder,
) -> Result<TrendingReport, CliError> {
    let entities = load_entities(&config.entities)?;
    let scorer = TrendingScorer::new(config.scoring)?;
    let source = builder.build(&config.counters);
    // Badges are assigned over every entity before `--limit` truncates.
    let now = config.now.unwrap_or_else(Utc::now);
    let explained = explain_from_source(&scorer, source.as_ref(), &entities, now)?;
    debug!(
        "ranked {} entities from {}",
        explained.len(),
        config.entities
    );
    Ok(TrendingReport::new(
        now,
        explained,
        config.limit,
        config.explain,
    ))
}

/// Loads a JSON array of [`Entity`] values from disk.
pub(super) fn load_entities(path: &Utf8Path) -> Result<Vec<Entity>, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenEntities {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseEntities {
        path: path.to_path_buf(),
        source,
    })
}

fn render_report(report: &TrendingReport) -> Result<String, CliError> {
    serde_json::to_string_pretty(report).map_err(CliError::SerialiseReport)
}

fn write_report(writer: &mut dyn Write, report: &TrendingReport) -> Result<(), CliError> {
    let payload = render_report(report)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteReport)?;
    writer.write_all(b"\n").map_err(CliError::WriteReport)?;
    Ok(())
}

fn write_report_file(path: &Utf8Path, report: &TrendingReport) -> Result<(), CliError> {
    let mut payload = render_report(report)?;
    payload.push('\n');
    write_utf8_file(path, payload.as_bytes()).map_err(|source| CliError::WriteReportFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<TrendingCommandConfig, CliError> {
    let merged = TrendingArgs::merge_from_layers(layers).map_err(CliError::from)?;
    TrendingCommandConfig::try_from(merged)
}
