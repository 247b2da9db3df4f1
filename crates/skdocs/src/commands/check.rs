//! `skdocs check` command implementation.
//!
//! Resolves every index the server would serve, straight from disk.

use std::path::PathBuf;

use clap::Args;
use skdocs_config::{CliSettings, Config};
use skdocs_site::{DocType, IndexItem, ResolveError, resolve_index};
use skdocs_storage::{FsStorage, Storage};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file (default: auto-discover skdocs.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content root directory (overrides config).
    #[arg(short, long)]
    root_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Outcome of resolving one partition.
struct IndexReport {
    partition: String,
    result: Result<IndexCounts, ResolveError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndexCounts {
    categories: usize,
    pages: usize,
}

impl IndexCounts {
    fn of(index: &[IndexItem]) -> Self {
        Self {
            categories: index.len(),
            pages: index.iter().map(|item| item.children.len()).sum(),
        }
    }
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or any index fails to resolve.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            root_dir: self.root_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.highlight(&format!(
            "Checking {}",
            config.content.root_dir.display()
        ));

        let storage = FsStorage::new(config.content.root_dir.clone());
        let reports = check_indices(
            &storage,
            &config.content.versions,
            &config.content.languages,
        );

        let mut failed = 0;
        for report in &reports {
            match &report.result {
                Ok(counts) => output.info(&format!(
                    "  {}: {} categories, {} pages",
                    report.partition, counts.categories, counts.pages
                )),
                Err(e) => {
                    failed += 1;
                    output.error(&format!("  {}: {e}", report.partition));
                }
            }
        }

        if failed > 0 {
            return Err(CliError::Check(format!(
                "{failed} of {} indices failed to resolve",
                reports.len()
            )));
        }

        output.success(&format!("All {} indices resolved", reports.len()));
        Ok(())
    }
}

/// Resolve the index of every (version, language, type) combination.
fn check_indices(
    storage: &dyn Storage,
    versions: &[String],
    languages: &[String],
) -> Vec<IndexReport> {
    let mut reports = Vec::new();
    for version in versions {
        for language in languages {
            for doc_type in DocType::ALL {
                let result = resolve_index(storage, version, language, doc_type)
                    .map(|index| IndexCounts::of(&index));
                if let Err(e) = &result {
                    tracing::warn!(version, language, doc_type = %doc_type, error = %e, "Index failed to resolve");
                }
                reports.push(IndexReport {
                    partition: format!("{version}/{language}/{doc_type}"),
                    result,
                });
            }
        }
    }
    reports
}
