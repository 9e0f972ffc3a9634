//! Summary command: per-record time ranges and scan counts

use super::shared::{load_sorted, print_overlaps};
use crate::cli::args::{Args, OutputFormat, SummaryArgs};
use crate::dataset::{Dataset, Overlap};
use crate::models::Record;
use anyhow::Result;
use colored::Colorize;
use serde_json::{Map, Value, json};

/// Run the summary command
pub fn run_summary(args: &Args, summary_args: &SummaryArgs) -> Result<()> {
    let (dataset, overlaps) = load_sorted(args, &summary_args.input)?;

    match summary_args.format {
        OutputFormat::Human => print_human(&dataset, &overlaps, summary_args),
        OutputFormat::Json => {
            let mut report = json!({
                "records": dataset.time_range_summary(),
                "record_count": dataset.len(),
                "sample_count": dataset.sample_count(),
                "overlaps": overlaps,
            });
            if summary_args.metadata.is_some() || summary_args.columns {
                report["details"] = Value::Array(
                    dataset
                        .iter()
                        .map(|record| record_details(record, summary_args))
                        .collect(),
                );
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

/// Requested metadata entries of a record; `None` marks a key it lacks
pub fn metadata_entries(record: &Record, keys: &[String]) -> Vec<(String, Option<String>)> {
    let metadata = record.metadata();
    if keys.is_empty() {
        metadata
            .display_entries()
            .into_iter()
            .map(|(key, value)| (key, Some(value)))
            .collect()
    } else {
        keys.iter()
            .map(|key| (key.clone(), metadata.lookup(key)))
            .collect()
    }
}

fn column_labels(record: &Record) -> Vec<&str> {
    record
        .sample_table()
        .bins()
        .iter()
        .map(|bin| bin.label.as_str())
        .collect()
}

fn record_details(record: &Record, summary_args: &SummaryArgs) -> Value {
    let mut details = Map::new();
    details.insert("source_name".to_string(), json!(record.source_name()));
    if let Some(keys) = &summary_args.metadata {
        let entries: Map<String, Value> = metadata_entries(record, keys)
            .into_iter()
            .map(|(key, value)| (key, json!(value)))
            .collect();
        details.insert("metadata".to_string(), Value::Object(entries));
    }
    if summary_args.columns {
        details.insert("columns".to_string(), json!(column_labels(record)));
    }
    Value::Object(details)
}

fn print_human(dataset: &Dataset, overlaps: &[Overlap], summary_args: &SummaryArgs) {
    println!("{}", "SMPS Dataset Summary".bold().blue());
    println!("{}", "=".repeat(60).blue());

    if dataset.is_empty() {
        println!("{}", "No records found".yellow());
        return;
    }

    for (record, span) in dataset.iter().zip(dataset.time_range_summary()) {
        println!("{}", span.source_name.bold());
        println!("    {} {}", "Start:".cyan(), span.start);
        println!("    {} {}", "End:".cyan(), span.end);
        println!("    {} {}", "Samples:".cyan(), span.sample_count);

        if let Some(keys) = &summary_args.metadata {
            println!("    {}", "Metadata:".cyan());
            for (key, value) in metadata_entries(record, keys) {
                match value {
                    Some(value) => println!("        {}: {}", key, value),
                    None => println!("        {}", format!("{}: not found", key).yellow()),
                }
            }
        }
        if summary_args.columns {
            let labels = column_labels(record);
            if labels.is_empty() {
                println!("    {} {}", "Columns:".cyan(), "none".yellow());
            } else {
                println!("    {} {}", "Columns:".cyan(), labels.join(", "));
            }
        }
    }

    println!();
    println!(
        "{} {} records, {} scans",
        "Total:".green().bold(),
        dataset.len(),
        dataset.sample_count()
    );

    if !overlaps.is_empty() {
        println!();
        print_overlaps(overlaps);
    }
}
