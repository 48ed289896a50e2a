//! Command implementations for the cloudsearch-query CLI.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::ClientConfig;
use crate::document::{BatchDocument, BatchOperation, DocumentBatch};
use crate::error::{CloudSearchError, Result};
use crate::query::{RankArg, SearchQuery, SortOrder, TextLiteral};

/// Execute a CLI command.
pub fn execute_command(args: CloudSearchArgs) -> Result<()> {
    match &args.command {
        Command::Query(query_args) => run_query(query_args, &args),
        Command::Url(url_args) => run_url(url_args, &args),
        Command::Batch(batch_args) => run_batch(batch_args, &args),
    }
}

/// Print the parameters of a query.
fn run_query(args: &QueryCommandArgs, cli_args: &CloudSearchArgs) -> Result<()> {
    let params = build_query(&args.query)?.build()?;

    if args.encoded {
        println!("{}", params.to_query_string());
        return Ok(());
    }

    output_params(&params, cli_args)
}

/// Print the search URL of a query.
fn run_url(args: &UrlArgs, cli_args: &CloudSearchArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let params = build_query(&args.query)?.build()?;
    let url = config.search_url(&params)?;

    output_result(
        &format!("Search URL ({})", config.region()?),
        &UrlResult { url },
        cli_args,
    )
}

/// Validate JSON-lines documents and print the batch.
fn run_batch(args: &BatchArgs, cli_args: &CloudSearchArgs) -> Result<()> {
    let batch = match &args.document_file {
        Some(path) => {
            log::info!("reading documents from {}", path.display());
            read_batch(BufReader::new(File::open(path)?))?
        }
        None => read_batch(io::stdin().lock())?,
    };

    log::info!(
        "batch contains {} adds and {} deletes",
        batch.adds(),
        batch.deletes()
    );

    output_batch(&batch, cli_args)
}

/// Turn query flags into a builder.
pub fn build_query(args: &QueryArgs) -> Result<SearchQuery> {
    let mut query = SearchQuery::new();
    let mut clauses = Vec::new();

    for spec in &args.fields {
        let (name, value) = split_pair(spec, "--field")?;
        let mut literal = TextLiteral::new(value);
        if args.wildcard {
            literal.add_wildcard();
        }
        clauses.push(query.field(name, literal));
    }

    for spec in &args.filters {
        let (name, range) = split_pair(spec, "--filter")?;
        clauses.push(query.filter(name, range)?);
    }

    // Several live expressions are already joined with `and` when rendered.
    if args.or && clauses.len() > 1 {
        query.or(clauses)?;
    }

    if let Some(q) = &args.q {
        query.q(q);
    }

    if !args.facet.is_empty() {
        query.facet(args.facet.clone());
    }

    if !args.rank.is_empty() {
        query.rank(rank_args(&args.rank))?;
    }

    for spec in &args.define_ranks {
        let (name, expression) = split_pair(spec, "--define-rank")?;
        query.define_rank(name, expression);
    }

    for spec in &args.thresholds {
        let (name, range) = split_pair(spec, "--threshold")?;
        query.threshold(name, range)?;
    }

    if let Some(results_type) = &args.results_type {
        query.results_type(results_type.as_str())?;
    }

    if !args.return_fields.is_empty() {
        query.return_fields(args.return_fields.clone());
    }

    if let Some(start) = args.start {
        query.start(start);
    }

    if let Some(size) = args.size {
        query.size(size);
    }

    Ok(query)
}

/// Read a batch from JSON lines.
///
/// Lines with a `type` key are operations; other lines are documents to add.
/// Blank lines are skipped.
pub fn read_batch<R: BufRead>(reader: R) -> Result<DocumentBatch> {
    let mut batch = DocumentBatch::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let value: serde_json::Value = serde_json::from_str(&line).map_err(|e| {
            CloudSearchError::invalid_document(format!("line {}: {e}", line_num + 1))
        })?;

        let operation = if value.get("type").is_some() {
            serde_json::from_value::<BatchOperation>(value)
        } else {
            serde_json::from_value::<BatchDocument>(value).map(BatchOperation::Add)
        }
        .map_err(|e| CloudSearchError::invalid_document(format!("line {}: {e}", line_num + 1)))?;

        batch.push(operation)?;
    }

    batch.ensure_not_empty()?;
    Ok(batch)
}

fn resolve_config(args: &UrlArgs) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };

    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(api_version) = &args.api_version {
        config = config.with_api_version(api_version.as_str());
    }

    config.validate()?;
    Ok(config)
}

fn rank_args(ranks: &[String]) -> Vec<RankArg> {
    let mut args = Vec::with_capacity(ranks.len());
    for rank in ranks {
        match rank.strip_prefix('-') {
            Some(name) => {
                args.push(RankArg::from(name));
                args.push(RankArg::from(SortOrder::Desc));
            }
            None => args.push(RankArg::from(rank.as_str())),
        }
    }
    args
}

fn split_pair<'a>(spec: &'a str, flag: &str) -> Result<(&'a str, &'a str)> {
    match spec.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(CloudSearchError::malformed(format!(
            "{flag} expects NAME=VALUE, got '{spec}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(fields: &[&str], filters: &[&str]) -> QueryArgs {
        QueryArgs {
            fields: fields.iter().map(|s| s.to_string()).collect(),
            filters: filters.iter().map(|s| s.to_string()).collect(),
            ..QueryArgs::default()
        }
    }

    #[test]
    fn test_build_query_implicit_and() {
        let query = build_query(&args(&["title=star wars"], &["year=1990.."])).unwrap();
        assert_eq!(
            query.boolean_query().unwrap(),
            "(and (field title 'star wars') (filter year 1990..))"
        );
    }

    #[test]
    fn test_build_query_or_and_wildcard() {
        let mut query_args = args(&["title=star", "director=lucas"], &[]);
        query_args.or = true;
        query_args.wildcard = true;

        let query = build_query(&query_args).unwrap();
        assert_eq!(
            query.boolean_query().unwrap(),
            "(or (field title 'star*') (field director 'lucas*'))"
        );
    }

    #[test]
    fn test_build_query_rank_and_paging() {
        let mut query_args = args(&[], &[]);
        query_args.q = Some("dune".to_string());
        query_args.rank = vec!["-year".to_string(), "title".to_string()];
        query_args.define_ranks = vec!["score=text_relevance*2".to_string()];
        query_args.start = Some(-3);
        query_args.size = Some(20);

        let params = build_query(&query_args).unwrap().build().unwrap();
        assert_eq!(params.get_str("rank"), Some("-year,title"));
        assert_eq!(params.get_str("rank-score"), Some("text_relevance*2"));
        assert_eq!(params.get_int("start"), Some(0));
        assert_eq!(params.get_int("size"), Some(20));
    }

    #[test]
    fn test_malformed_pairs() {
        assert!(build_query(&args(&["title"], &[])).is_err());
        assert!(build_query(&args(&[], &["=5"])).is_err());
        assert!(matches!(
            build_query(&args(&[], &["year=soon"])),
            Err(CloudSearchError::MalformedLiteral(_))
        ));
    }

    #[test]
    fn test_read_batch() {
        let input = "\
{\"id\":\"doc1\",\"version\":1,\"fields\":{\"title\":\"Dune\",\"year\":1965}}

{\"type\":\"delete\",\"id\":\"doc2\",\"version\":2}
";
        let batch = read_batch(input.as_bytes()).unwrap();
        assert_eq!(batch.adds(), 1);
        assert_eq!(batch.deletes(), 1);
    }

    #[test]
    fn test_read_batch_errors() {
        assert!(read_batch("".as_bytes()).is_err());
        assert!(read_batch("not json\n".as_bytes()).is_err());
        assert!(read_batch("{\"id\":\"Bad\",\"version\":1}\n".as_bytes()).is_err());
    }
}
