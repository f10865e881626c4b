use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use serde::Serialize;

use super::truncate;
use crate::registry::Registry;
use crate::resolve::pattern::{Expression, PatternRule};
use crate::resolve::Resolver;

#[derive(Serialize)]
struct ModelInfo<'a> {
    id: &'a str,
    variants: &'a [String],
}

#[derive(Serialize)]
struct ExclusionInfo<'a> {
    keyword: &'a str,
    mode: &'static str,
    reason: &'a str,
}

#[derive(Serialize)]
struct RuleInfo<'a> {
    order: usize,
    id: &'a str,
    patterns: Vec<&'a str>,
    require: Vec<&'a str>,
    forbid: Vec<&'a str>,
}

pub fn models(registry: &Registry, filter: Option<&str>, json: bool) -> Result<()> {
    let filter = filter.map(str::to_lowercase);
    let infos: Vec<ModelInfo<'_>> = registry
        .models()
        .iter()
        .filter(|m| match &filter {
            Some(f) => {
                m.identifier.to_lowercase().contains(f)
                    || m.display_variants.iter().any(|v| v.to_lowercase().contains(f))
            }
            None => true,
        })
        .map(|m| ModelInfo {
            id: &m.identifier,
            variants: &m.display_variants,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["ID", "Variants", "Display names"]);
    for info in &infos {
        table.add_row(vec![
            info.id.to_string(),
            info.variants.len().to_string(),
            truncate(&info.variants.join(" | "), 80),
        ]);
    }
    println!("{table}");
    println!("{} of {} models", infos.len(), registry.len());

    Ok(())
}

pub fn exclusions(registry: &Registry, json: bool) -> Result<()> {
    let infos: Vec<ExclusionInfo<'_>> = registry
        .exclusions()
        .iter()
        .map(|rule| ExclusionInfo {
            keyword: &rule.keyword,
            mode: rule.mode.label(),
            reason: &rule.reason,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Keyword", "Mode", "Reason"]);
    for info in infos {
        table.add_row(vec![
            info.keyword.to_string(),
            info.mode.to_string(),
            info.reason.to_string(),
        ]);
    }
    println!("{table}");

    Ok(())
}

/// Rules in evaluation order; the first hit wins.
pub fn rules(resolver: &Resolver, json: bool) -> Result<()> {
    let infos: Vec<RuleInfo<'_>> = resolver
        .patterns()
        .rules()
        .iter()
        .enumerate()
        .map(|(i, rule)| rule_info(i + 1, rule))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["#", "ID", "Patterns", "Requires", "Forbids"]);
    for info in infos {
        table.add_row(vec![
            info.order.to_string(),
            info.id.to_string(),
            info.patterns.join("\n"),
            info.require.join("\n"),
            info.forbid.join("\n"),
        ]);
    }
    println!("{table}");

    Ok(())
}

fn sources(exprs: &[Expression]) -> Vec<&str> {
    exprs.iter().map(|e| e.source.as_str()).collect()
}

fn rule_info(order: usize, rule: &PatternRule) -> RuleInfo<'_> {
    RuleInfo {
        order,
        id: &rule.identifier,
        patterns: sources(&rule.patterns),
        require: sources(&rule.require),
        forbid: sources(&rule.forbid),
    }
}
