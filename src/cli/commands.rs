use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::cli::args::{Cli, Commands};
use crate::config::QaConfig;
use crate::models::{bin_cloud_fraction, FlagCode, ObservationRecord, Protocol, RawValue};
use crate::processors::{filter_by_flags, filter_flagged, BatchChecker};
use crate::readers::{CsvReader, GeoJsonReader, PatchReader, PatchValueKind};
use crate::utils::progress::{ProgressReporter, ProgressSink};
use crate::writers::PatchWriter;

const FLAGS_ATTRIBUTE: &str = "flags";

pub fn run(cli: Cli) -> Result<()> {
    setup_logging(&cli)?;

    let config = QaConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    debug!("Using configuration: {:?}", config);

    match cli.command {
        Commands::Check {
            input,
            protocol,
            limit,
            max_workers,
            require,
            flagged,
            clean,
            output,
        } => {
            let specs = require
                .iter()
                .map(|spec| parse_flag_spec(spec))
                .collect::<Result<Vec<_>>>()?;

            let mut records = load_observations(&input, protocol, limit, cli.quiet)?;

            let mut checker = BatchChecker::from_config(config);
            if let Some(workers) = max_workers {
                checker = checker.with_max_workers(workers);
            }

            info!("Land/water checks skipped: no land geometry supplied");
            let progress =
                ProgressReporter::new(records.len() as u64, "Quality checking...", cli.quiet);
            let summary = checker
                .check_all(&mut records, None, &progress)
                .context("Quality check failed")?;

            println!("\n{}", summary.generate_summary());

            let mut kept = filter_by_flags(records, &specs);
            if flagged || clean {
                kept = filter_flagged(kept, flagged);
            }
            println!("{} records selected", kept.len());

            if let Some(path) = output {
                for record in kept.iter_mut() {
                    let flags = record.flags().joined(" ");
                    record.set_derived(FLAGS_ATTRIBUTE, RawValue::Text(flags));
                }
                let written = PatchWriter::new(FLAGS_ATTRIBUTE)
                    .write_file(&kept, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Wrote {} rows to {}", written, path.display());
            }
        }

        Commands::Flags => {
            for code in FlagCode::ALL {
                println!("{}  {}", code, code.description());
            }
        }

        Commands::Bin { fraction, clip } => {
            let category = bin_cloud_fraction(fraction, clip)?;
            println!(
                "{} (midpoint {:.3})",
                category,
                category.midpoint(config.midpoint_table)
            );
        }

        Commands::Patch {
            input,
            patch_file,
            attribute,
            protocol,
            text,
            categories_out,
        } => {
            let mut records = load_observations(&input, protocol, None, cli.quiet)?;
            let kind = if text {
                PatchValueKind::Text
            } else {
                PatchValueKind::Numeric
            };

            let outcome = PatchReader::new(attribute.as_str(), kind)
                .apply_file(&patch_file, &mut records)
                .with_context(|| format!("Failed to apply {}", patch_file.display()))?;
            println!(
                "Applied {} of {} patch rows ({} unmatched)",
                outcome.applied, outcome.rows, outcome.unmatched
            );

            if let Some(path) = categories_out {
                let written = PatchWriter::new(attribute.as_str())
                    .with_categories(true)
                    .write_file(&records, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Wrote {} categories to {}", written, path.display());
            }
        }
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("globe_qa={}", cli.get_log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .context("Failed to initialise logging")?;
    Ok(())
}

/// Read a CSV export or an API response, chosen by file extension.
fn load_observations(
    path: &Path,
    protocol: Option<Protocol>,
    limit: Option<usize>,
    quiet: bool,
) -> Result<Vec<ObservationRecord>> {
    let spinner =
        ProgressReporter::new_spinner(&format!("Reading {}...", path.display()), quiet);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let records = match extension.as_deref() {
        Some("json") | Some("geojson") => GeoJsonReader::new().read_observations(path),
        _ => {
            let Some(protocol) = protocol else {
                bail!("--protocol is required for CSV input {}", path.display());
            };
            let mut reader = CsvReader::new(protocol);
            if let Some(limit) = limit {
                reader = reader.with_limit(limit);
            }
            reader.read_observations(path)
        }
    };

    let records =
        records.with_context(|| format!("Failed to read observations from {}", path.display()))?;
    spinner.finish(&format!("Loaded {} observations", records.len()));
    Ok(records)
}

/// `DX` requires the flag, `!DX` requires its absence.
fn parse_flag_spec(spec: &str) -> Result<(FlagCode, bool)> {
    let (code, present) = match spec.trim().strip_prefix('!') {
        Some(rest) => (rest, false),
        None => (spec, true),
    };
    let code = code
        .parse::<FlagCode>()
        .with_context(|| format!("Invalid flag spec '{}'", spec))?;
    Ok((code, present))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_spec() {
        assert_eq!(parse_flag_spec("DX").unwrap(), (FlagCode::DX, true));
        assert_eq!(parse_flag_spec("!er").unwrap(), (FlagCode::ER, false));
        assert_eq!(parse_flag_spec("OT").unwrap(), (FlagCode::OD, true));
        assert!(parse_flag_spec("!ZZ").is_err());
    }

    #[test]
    fn test_load_observations_reads_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"ObservationId,CloudCover\n1,few\n2,clear\n").unwrap();

        let records =
            load_observations(file.path(), Some(Protocol::SkyConditions), None, true).unwrap();
        assert_eq!(records.len(), 2);
        assert!(load_observations(file.path(), None, None, true).is_err());
    }
}
