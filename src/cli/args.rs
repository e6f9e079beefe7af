//! CLI argument definitions using clap
//!
//! Commands:
//! - jadn-codec validate <schema> -i <instance>...
//! - jadn-codec decode <schema> --type <name>
//! - jadn-codec encode <schema> --type <name>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// JADN schema-driven value codec
#[derive(Parser, Debug)]
#[command(name = "jadn-codec")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Wire mode: verbose, concise, m2m or map-tag (overrides the config file)
    #[arg(long, global = true)]
    pub mode: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check instance files against a schema's exported types
    Validate {
        /// Path to the JADN schema
        schema: PathBuf,

        /// Instance files (JSON, in wire form)
        #[arg(short = 'i', long = "instance", required = true, num_args = 1..)]
        instances: Vec<PathBuf>,
    },

    /// Read a wire value from stdin and print its native form
    Decode(ValueArgs),

    /// Read a native value from stdin and print its wire form
    Encode(ValueArgs),
}

#[derive(Args, Debug)]
pub struct ValueArgs {
    /// Path to the JADN schema
    pub schema: PathBuf,

    /// Type to convert the value as
    #[arg(long = "type", short = 't')]
    pub type_name: String,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from([
            "jadn-codec", "validate", "schema.jadn", "-i", "a.json", "b.json", "--mode", "m2m",
        ])
        .unwrap();
        assert_eq!(cli.mode.as_deref(), Some("m2m"));
        match cli.command {
            Command::Validate { schema, instances } => {
                assert_eq!(schema, PathBuf::from("schema.jadn"));
                assert_eq!(instances.len(), 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_decode_requires_type() {
        assert!(Cli::try_parse_from(["jadn-codec", "decode", "schema.jadn"]).is_err());
        let cli = Cli::try_parse_from(["jadn-codec", "--config", "c.json", "decode", "s.jadn", "-t", "Point"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        assert!(matches!(cli.command, Command::Decode(ValueArgs { ref type_name, .. }) if type_name == "Point"));
    }
}
