use anyhow::{bail, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, Table};
use std::path::Path;

use super::truncate;
use crate::replay::{self, ReplayReport};
use crate::resolve::Resolver;

pub fn run(resolver: &Resolver, fixture: Option<&Path>, json: bool) -> Result<()> {
    let cases = match fixture {
        Some(path) => replay::load_from_file(path)?,
        None => replay::load_embedded()?,
    };
    let report = replay::run(resolver, cases);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report_table(&report));
        println!(
            "{} of {} replay cases passed",
            report.outcomes.len() - report.failure_count(),
            report.outcomes.len()
        );
    }

    if !report.all_passed() {
        bail!("{} replay case(s) failed", report.failure_count());
    }
    Ok(())
}

fn report_table(report: &ReplayReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["", "Title", "Expected", "Got", "Match"]);

    for outcome in &report.outcomes {
        let status = if outcome.passed {
            Cell::new("ok").fg(Color::Green)
        } else {
            Cell::new("FAIL").fg(Color::Red)
        };
        table.add_row(vec![
            status,
            Cell::new(truncate(&outcome.case.title, 48)),
            Cell::new(outcome.case.expected.as_deref().unwrap_or("-")),
            Cell::new(outcome.result.model_str()),
            Cell::new(outcome.result.match_type),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::resolve::Threshold;

    #[test]
    fn test_embedded_replay_renders() {
        let resolver = Resolver::new(Registry::load().unwrap(), Threshold::default()).unwrap();
        let report = replay::run(&resolver, replay::load_embedded().unwrap());
        let rendered = report_table(&report).to_string();
        assert!(rendered.contains("AMX NMX-WP-N1512 N1000"));
        assert!(!rendered.contains("FAIL"));
    }

    #[test]
    fn test_missing_fixture_errors() {
        let resolver = Resolver::new(Registry::load().unwrap(), Threshold::default()).unwrap();
        assert!(run(&resolver, Some(Path::new("/nonexistent/replay.json")), true).is_err());
    }
}
