use clap::{Parser, Subcommand};
use hamming_core::HammingLevel;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "hammingdev: Hamming encode/corrupt/decode playground", long_about = None)]
pub struct Cli {
    /// JSON config file (max_file_bytes, level, corrupt_seed)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode, corrupt and decode one file, writing every artifact
    Run {
        input: PathBuf,

        /// Directory receiving the four artifacts
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Block size: l1 (4 bits), l2 (8 bits), l3 (16 bits)
        #[arg(long)]
        level: Option<HammingLevel>,

        /// Corruptor seed, for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Refuse inputs larger than this many bytes
        #[arg(long)]
        max_bytes: Option<u64>,

        /// Print stats as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the download names derived from a file name
    Names { name: String },

    /// Tell whether a file would get a text preview
    Classify { input: PathBuf },

    /// Hamming-encode a file
    Encode {
        input: PathBuf,
        out: PathBuf,
        #[arg(long)]
        level: Option<HammingLevel>,
    },

    /// Flip one bit in every block of an encoded file (in place unless --out)
    Corrupt {
        input: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Decode an encoded file
    Decode {
        input: PathBuf,
        out: PathBuf,
        /// Skip error correction
        #[arg(long)]
        no_fix: bool,
    },
}
