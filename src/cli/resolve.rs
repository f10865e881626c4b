use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use serde::Serialize;

use super::truncate;
use crate::resolve::batch::resolve_all;
use crate::resolve::{MatchResult, Resolver};

#[derive(Serialize)]
pub(crate) struct ResolvedTitle<'a> {
    pub title: &'a str,
    #[serde(flatten)]
    pub result: &'a MatchResult,
}

pub fn titles(resolver: &Resolver, titles: &[String], json: bool) -> Result<()> {
    let results = resolve_all(resolver, titles, 0);

    if json {
        let rows: Vec<ResolvedTitle<'_>> = titles
            .iter()
            .zip(&results)
            .map(|(title, result)| ResolvedTitle { title, result })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{}", results_table(titles, &results));
    }

    Ok(())
}

pub(crate) fn results_table<S: AsRef<str>>(titles: &[S], results: &[MatchResult]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Title", "Model", "Match", "Confidence", "Notes"]);

    for (title, result) in titles.iter().zip(results) {
        let notes = match &result.unknown_reason {
            Some(reason) => format!("{reason}: {}", result.match_notes),
            None => result.match_notes.clone(),
        };
        table.add_row(vec![
            truncate(title.as_ref(), 48),
            result.model_str().to_string(),
            result.match_type.to_string(),
            format!("{:.2}", result.confidence),
            truncate(&notes, 72),
        ]);
    }

    table
}
