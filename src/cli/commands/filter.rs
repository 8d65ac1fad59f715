use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use serde::Deserialize;
use serde_json::Value as Json;
use std::fs;
use std::path::PathBuf;

use crate::api::query::filters::{FilterClause, FilterValue, build_filter};

#[derive(Args)]
pub struct FilterCommands {
    /// JSON file holding a list of filter clauses
    pub path: PathBuf,
}

/// A clause as written in a filter file
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClauseEntry {
    key: Option<String>,
    #[serde(default = "default_operator")]
    operator: String,
    #[serde(default)]
    values: Vec<Json>,
    #[serde(default)]
    or: bool,
    #[serde(default)]
    case_insensitive: bool,
}

fn default_operator() -> String {
    "=".to_string()
}

fn filter_value(json: &Json) -> Result<FilterValue> {
    Ok(match json {
        Json::Null => FilterValue::Null,
        Json::Bool(b) => FilterValue::Boolean(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => FilterValue::Integer(i),
            None => FilterValue::Number(n.as_f64().unwrap_or_default()),
        },
        Json::String(s) => FilterValue::String(s.clone()),
        other => anyhow::bail!("Filter values must be scalars, got {}", other),
    })
}

/// Parse a JSON list of `{key, operator, values, or, caseInsensitive}` clauses
pub fn parse_clauses(content: &str) -> Result<Vec<FilterClause>> {
    let entries: Vec<ClauseEntry> =
        serde_json::from_str(content).context("Expected a JSON list of filter clauses")?;

    entries
        .into_iter()
        .map(|entry| {
            Ok(FilterClause {
                key: entry.key,
                operator: entry.operator,
                values: entry.values.iter().map(filter_value).collect::<Result<Vec<_>>>()?,
                or: entry.or,
                case_insensitive: entry.case_insensitive,
            })
        })
        .collect()
}

pub async fn handle_filter_command(args: FilterCommands) -> Result<()> {
    let content = fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read filter file: {}", args.path.display()))?;

    let clauses = parse_clauses(&content)?;
    let expression = build_filter(&clauses)?;

    if expression.is_empty() {
        println!("{}", "No filter expression (all clauses skipped).".yellow());
    } else {
        println!("{}", expression.trim_start());
    }
    Ok(())
}
