//! Command-line interface for the harvester.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use crate::config::{validate_date, HarvestConfig};
use crate::error::{HarvesterError, Result};
use crate::feed::SnapshotRequest;
use crate::harvester::Harvester;
use crate::http::HttpFetcher;
use crate::kit::DataSource;
use crate::parse::parse_with_any;
use crate::types::Event;

/// Matchday Harvester - Extract football events and video sources from blogs and forums.
#[derive(Parser)]
#[command(name = "matchday-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a data source file and report its pattern kits.
    Validate {
        /// Data source definition (YAML)
        #[arg(short, long)]
        source: PathBuf,
    },

    /// Extract the Event from a local document.
    Parse {
        /// Data source definition (YAML)
        #[arg(short, long)]
        source: PathBuf,

        /// HTML document to extract
        document: PathBuf,
    },

    /// Harvest a data source and write the extracted Events as YAML.
    Harvest {
        /// Data source definition (YAML)
        #[arg(short, long)]
        source: PathBuf,

        /// Only harvest entries published since this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,

        /// Read this single page instead of walking the feed
        #[arg(long)]
        url: Option<String>,

        /// Feed labels to restrict the harvest to
        #[arg(short, long)]
        label: Vec<String>,

        /// Maximum number of pages to fetch
        #[arg(long)]
        max_steps: Option<usize>,

        /// Number of worker threads for forum enrichment
        #[arg(short, long)]
        workers: Option<usize>,

        /// Retries per fetch after a transient failure
        #[arg(long, default_value_t = 0)]
        retries: u32,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { source } => validate_command(&source),
        Commands::Parse { source, document } => parse_command(&source, &document),
        Commands::Harvest {
            source,
            since,
            url,
            label,
            max_steps,
            workers,
            retries,
            output,
        } => {
            let request = SnapshotRequest {
                labels: label,
                start_date: since.as_deref().map(validate_date).transpose()?,
                ..Default::default()
            };
            harvest_command(
                &source,
                &request,
                url.as_deref(),
                Overrides { max_steps, workers },
                retries,
                output.as_deref(),
            )
        }
    }
}

/// Harvest settings given on the command line.
#[derive(Debug, Clone, Copy, Default)]
struct Overrides {
    max_steps: Option<usize>,
    workers: Option<usize>,
}

/// Defaults, then the data source's values, then the command line.
fn effective_config(source: &DataSource, overrides: Overrides) -> HarvestConfig {
    let mut config = source.harvest_config(HarvestConfig::default());
    if let Some(steps) = overrides.max_steps {
        config = config.with_steps(steps);
    }
    if let Some(workers) = overrides.workers {
        config.workers = workers;
    }
    config
}

/// Execute the validate command.
fn validate_command(source_path: &Path) -> Result<()> {
    let source = DataSource::load(source_path)?;

    println!(
        "{} {} ({})",
        style("Valid").green().bold(),
        style(&source.name).cyan(),
        source.base_uri
    );
    println!("  Kit sets: {}", source.kit_sets.len());
    println!("  Pattern kits: {}", source.kit_count());
    Ok(())
}

/// Execute the parse command.
fn parse_command(source_path: &Path, document: &Path) -> Result<()> {
    let source = DataSource::load(source_path)?;
    let html = fs::read_to_string(document)?;

    let event = parse_with_any(&source.kit_sets, &html)?;
    for warning in &event.warnings {
        eprintln!("{} {warning}", style("Warning:").yellow().bold());
    }
    print!("{}", serde_yaml_ng::to_string(&event)?);
    Ok(())
}

/// Execute the harvest command.
fn harvest_command(
    source_path: &Path,
    request: &SnapshotRequest,
    url: Option<&str>,
    overrides: Overrides,
    retries: u32,
    output: Option<&Path>,
) -> Result<()> {
    let source = DataSource::load(source_path)?;
    let url = url
        .map(|u| Url::parse(u).map_err(|_| HarvesterError::InvalidUrl(u.to_string())))
        .transpose()?;
    let fetcher = HttpFetcher::new()?.with_retries(retries);
    let harvester = Harvester::new(&source, &fetcher, effective_config(&source, overrides));
    harvester.config().validate()?;

    eprintln!(
        "{} {}",
        style("Harvesting").bold(),
        style(&source.name).cyan()
    );

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Fetching pages...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let snapshot = match url {
        Some(url) => harvester.snapshot_url(&url),
        None => harvester.snapshot(request),
    };
    let snapshot = match snapshot {
        Ok(snapshot) => snapshot,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Extracting events...");
    let events = match snapshot.extract_all() {
        Ok(events) => events,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    eprintln!("  Pages: {} ({})", snapshot.fetches, snapshot.stop);
    eprintln!("  Entries: {}", snapshot.len());
    eprintln!("  Events: {}", style(events.len()).green());
    let skipped = snapshot.len().saturating_sub(events.len());
    if skipped > 0 {
        eprintln!("  Skipped: {}", style(skipped).yellow().bold());
    }

    write_events(&events, output)
}

fn write_events(events: &[Event], output: Option<&Path>) -> Result<()> {
    let yaml = serde_yaml_ng::to_string(events)?;
    match output {
        Some(path) => {
            fs::write(path, yaml)?;
            eprintln!(
                "{} {}",
                style("Saved to:").green().bold(),
                path.display()
            );
        }
        None => print!("{yaml}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
base_uri: https://matchday.blogspot.com/
feed: blogger_html
max_scan_steps: 10
workers: 2
kit_sets:
  - event:
      pattern: '(\w+) vs (\w+)'
      fields:
        1: home_team
        2: away_team
"#;

    #[test]
    fn test_command_line_overrides_source_values() {
        let source = DataSource::from_yaml(SOURCE).unwrap();
        let config = effective_config(
            &source,
            Overrides {
                max_steps: Some(3),
                workers: Some(8),
            },
        );
        assert_eq!(config.max_scan_steps, 3);
        assert_eq!(config.scrape_steps, 3);
        assert_eq!(config.workers, 8);
    }

    #[test]
    fn test_source_values_override_defaults() {
        let source = DataSource::from_yaml(SOURCE).unwrap();
        let config = effective_config(&source, Overrides::default());
        assert_eq!(config.max_scan_steps, 10);
        assert_eq!(config.scrape_steps, crate::config::DEFAULT_SCRAPE_STEPS);
        assert_eq!(config.workers, 2);
    }

    #[test]
    fn test_cli_parse_validate() {
        let cli = Cli::parse_from(["matchday-harvester", "validate", "--source", "blog.yaml"]);

        let Commands::Validate { source } = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(source, PathBuf::from("blog.yaml"));
    }

    #[test]
    fn test_cli_parse_harvest_with_options() {
        let cli = Cli::parse_from([
            "matchday-harvester",
            "harvest",
            "-s",
            "forum.yaml",
            "--since",
            "2023-11-01",
            "-l",
            "Premier League",
            "-l",
            "UCL",
            "--max-steps",
            "3",
            "--workers",
            "8",
        ]);

        let Commands::Harvest {
            since,
            label,
            max_steps,
            workers,
            retries,
            output,
            ..
        } = cli.command
        else {
            panic!("expected harvest");
        };
        assert_eq!(since.as_deref(), Some("2023-11-01"));
        assert_eq!(label, ["Premier League", "UCL"]);
        assert_eq!(max_steps, Some(3));
        assert_eq!(workers, Some(8));
        assert_eq!(retries, 0);
        assert!(output.is_none());
    }
}
