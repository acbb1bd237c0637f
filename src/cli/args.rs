use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::Protocol;

#[derive(Parser)]
#[command(name = "globe-qa")]
#[command(about = "Quality checking for GLOBE citizen-science observations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Suppress progress bars")]
    pub quiet: bool,

    #[arg(long, global = true, help = "TOML file with QA thresholds")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Quality check observations and summarize the raised flags
    Check {
        #[arg(help = "Observation file (.csv export or .json/.geojson API response)")]
        input: PathBuf,

        #[arg(
            short,
            long,
            help = "Protocol of a CSV export (sky_conditions, land_covers, mosquito_habitat_mapper, tree_heights)"
        )]
        protocol: Option<Protocol>,

        #[arg(long, help = "Maximum number of CSV rows to read")]
        limit: Option<usize>,

        #[arg(long, help = "Worker threads [default: from config]")]
        max_workers: Option<usize>,

        #[arg(
            long = "require",
            help = "Keep only records matching a flag spec, e.g. DX or !ER (repeatable)"
        )]
        require: Vec<String>,

        #[arg(long, conflicts_with = "clean", help = "Keep only flagged records")]
        flagged: bool,

        #[arg(long, help = "Keep only records without flags")]
        clean: bool,

        #[arg(short, long, help = "Write observationId,flags rows for the kept records")]
        output: Option<PathBuf>,
    },

    /// List the flag catalog
    Flags,

    /// Bin a cloud fraction into a cloud cover category
    Bin {
        #[arg(allow_negative_numbers = true)]
        fraction: f64,

        #[arg(long, help = "Clamp the fraction into [0, 1] first")]
        clip: bool,
    },

    /// Apply a patch file of precomputed values to observations
    Patch {
        #[arg(help = "Observation file (.csv export or .json/.geojson API response)")]
        input: PathBuf,

        #[arg(help = "Two-column observationId,value file")]
        patch_file: PathBuf,

        #[arg(short, long, help = "Derived attribute name to set")]
        attribute: String,

        #[arg(short, long, help = "Protocol of a CSV export")]
        protocol: Option<Protocol>,

        #[arg(long, help = "Store values as text instead of numbers")]
        text: bool,

        #[arg(long, help = "Write the binned categories of the patched values to this file")]
        categories_out: Option<PathBuf>,
    },
}

impl Cli {
    pub fn get_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
