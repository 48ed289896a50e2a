//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{CloudSearchArgs, OutputFormat};
use crate::document::DocumentBatch;
use crate::error::Result;
use crate::query::QueryParams;

/// Result structure for the url command.
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlResult {
    pub url: String,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(
    message: &str,
    result: &T,
    args: &CloudSearchArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
        OutputFormat::Csv => output_csv(result),
    }
}

/// Output a query parameter mapping.
pub fn output_params(params: &QueryParams, args: &CloudSearchArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("Query parameters ({}):", params.len());
            }
            print!("{}", format_params_table(params));
            Ok(())
        }
        _ => output_result("Query parameters", params, args),
    }
}

/// Output a document batch.
///
/// The batch is always printed as the JSON array the upload endpoint expects;
/// `--pretty` indents it.
pub fn output_batch(batch: &DocumentBatch, args: &CloudSearchArgs) -> Result<()> {
    if args.output_format == OutputFormat::Human && args.verbosity() > 1 {
        eprintln!(
            "Batch: {} operations ({} adds, {} deletes)",
            batch.len(),
            batch.adds(),
            batch.deletes()
        );
    }

    let json = if args.pretty {
        batch.to_json_pretty()?
    } else {
        batch.to_json()?
    };
    println!("{json}");
    Ok(())
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &CloudSearchArgs) -> Result<()> {
    if args.verbosity() > 1 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    match value {
        serde_json::Value::Object(obj) if obj.len() == 1 => {
            // Single-valued results print bare so they can be piped.
            for val in obj.values() {
                println!("{}", format_value(val));
            }
        }
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let formatted_val = format_value(&val);
                println!("{key}: {formatted_val}");
            }
        }
        _ => println!("{}", format_value(&value)),
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &CloudSearchArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Output in CSV format.
fn output_csv<T: Serialize>(result: &T) -> Result<()> {
    let value = serde_json::to_value(result)?;

    match value {
        serde_json::Value::Object(obj) => {
            println!("key,value");
            for (key, value) in obj {
                let formatted_csv_value = format_csv_value(&value);
                println!("{key},{formatted_csv_value}");
            }
        }
        _ => {
            println!("value");
            let formatted_csv_value = format_csv_value(&value);
            println!("{formatted_csv_value}");
        }
    }

    Ok(())
}

/// Lay out parameters as two aligned columns.
fn format_params_table(params: &QueryParams) -> String {
    let width = params.keys().map(str::len).max().unwrap_or(0);
    let mut out = String::new();
    for (key, value) in params.iter() {
        out.push_str(&format!("{key:<width$}  {value}\n"));
    }
    out
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "null".to_string(),
    }
}

/// Format a JSON value for CSV output.
fn format_csv_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => {
            if s.contains(',') || s.contains('"') || s.contains('\n') {
                let escaped = s.replace('"', "\"\"");
                format!("\"{escaped}\"")
            } else {
                s.clone()
            }
        }
        serde_json::Value::Null => "".to_string(),
        other => format_value(other),
    }
}
