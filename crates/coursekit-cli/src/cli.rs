use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "coursekit",
    about = "Coursekit: parse proof-course files and resolve per-exercise toolsets",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve every exercise's permitted toolsets
    Resolve {
        /// Path to the course file
        course: String,

        /// Path to a TOML vocabulary override
        #[arg(long)]
        vocabulary: Option<String>,

        /// Disable namespace-default inheritance for absent sections
        #[arg(long)]
        no_inheritance: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a course file and report every collected issue
    Check {
        /// Path to the course file
        course: String,

        /// Path to a TOML vocabulary override
        #[arg(long)]
        vocabulary: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the namespace outline with section titles
    Outline {
        /// Path to the course file
        course: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
