//! Command line argument parsing for the cloudsearch-query CLI using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// cloudsearch-query - build CloudSearch search requests and upload batches
#[derive(Parser, Debug, Clone)]
#[command(name = "cloudsearch-query")]
#[command(about = "Build CloudSearch query parameters, search URLs and document batches")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct CloudSearchArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl CloudSearchArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build a query and print its parameters
    Query(QueryCommandArgs),

    /// Build a query and print the full search URL
    Url(UrlArgs),

    /// Validate JSON-lines documents and print the upload batch
    Batch(BatchArgs),
}

/// Flags describing one query.
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Free-text query
    #[arg(long)]
    pub q: Option<String>,

    /// Text clause on a field (repeatable)
    #[arg(long = "field", value_name = "NAME=VALUE")]
    pub fields: Vec<String>,

    /// Unsigned integer or range clause on a field, e.g. year=1990.. (repeatable)
    #[arg(long = "filter", value_name = "NAME=RANGE")]
    pub filters: Vec<String>,

    /// Combine the clauses with `or` instead of `and`
    #[arg(long)]
    pub or: bool,

    /// Append a trailing wildcard to field values
    #[arg(long)]
    pub wildcard: bool,

    /// Facets to compute (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub facet: Vec<String>,

    /// Rank fields (comma-separated, prefix with '-' for descending)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub rank: Vec<String>,

    /// Rank expression definition (repeatable)
    #[arg(long = "define-rank", value_name = "NAME=EXPRESSION")]
    pub define_ranks: Vec<String>,

    /// Threshold on a rank, e.g. text_relevance=100.. (repeatable)
    #[arg(long = "threshold", value_name = "NAME=RANGE")]
    pub thresholds: Vec<String>,

    /// Results type (json or xml)
    #[arg(long)]
    pub results_type: Option<String>,

    /// Fields to return (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub return_fields: Vec<String>,

    /// Offset of the first hit
    #[arg(long)]
    pub start: Option<i64>,

    /// Number of hits to return
    #[arg(long)]
    pub size: Option<i64>,
}

/// Arguments for the query command
#[derive(Args, Debug, Clone)]
pub struct QueryCommandArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Print the percent-encoded query string instead of the parameters
    #[arg(long)]
    pub encoded: bool,
}

/// Arguments for the url command
#[derive(Args, Debug, Clone)]
pub struct UrlArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Client configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Domain endpoint (overrides the configuration file)
    #[arg(long, env = "CLOUDSEARCH_ENDPOINT")]
    pub endpoint: Option<String>,

    /// API version
    #[arg(long)]
    pub api_version: Option<String>,
}

/// Arguments for the batch command
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// Document file (JSON lines); reads stdin when omitted
    #[arg(value_name = "DOCUMENT_FILE")]
    pub document_file: Option<PathBuf>,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_args_parsing() {
        let args = CloudSearchArgs::try_parse_from([
            "cloudsearch-query",
            "query",
            "--field",
            "title=star wars",
            "--filter",
            "year=1990..",
            "--facet",
            "genre,year",
            "--rank=-year,title",
            "--size",
            "5",
        ])
        .unwrap();

        if let Command::Query(query_args) = args.command {
            let query = query_args.query;
            assert_eq!(query.fields, vec!["title=star wars"]);
            assert_eq!(query.filters, vec!["year=1990.."]);
            assert_eq!(query.facet, vec!["genre", "year"]);
            assert_eq!(query.rank, vec!["-year", "title"]);
            assert_eq!(query.size, Some(5));
            assert!(!query.or);
            assert!(!query_args.encoded);
        } else {
            panic!("Expected Query command");
        }
    }

    #[test]
    fn test_url_args_parsing() {
        let args = CloudSearchArgs::try_parse_from([
            "cloudsearch-query",
            "url",
            "--q",
            "dune",
            "--endpoint",
            "search-x.us-west-1.cloudsearch.amazonaws.com",
        ])
        .unwrap();

        if let Command::Url(url_args) = args.command {
            assert_eq!(url_args.query.q.as_deref(), Some("dune"));
            assert!(url_args.endpoint.is_some());
            assert!(url_args.config.is_none());
        } else {
            panic!("Expected Url command");
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = CloudSearchArgs::try_parse_from(["cloudsearch-query", "batch"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = CloudSearchArgs::try_parse_from(["cloudsearch-query", "-vv", "batch"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args =
            CloudSearchArgs::try_parse_from(["cloudsearch-query", "--quiet", "batch"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            CloudSearchArgs::try_parse_from(["cloudsearch-query", "--format", "json", "batch"])
                .unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }
}
