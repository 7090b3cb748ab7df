//! Human and JSON rendering of run and lists reports.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use rostersync_core::Record;
use rostersync_sync::{ListsReport, Operation, Outcome, RecordOutcome, RunReport};

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "phone")]
    phone: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "detail")]
    detail: String,
}

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "list")]
    name: String,
    #[tabled(rename = "id")]
    id: String,
}

pub fn print_json<T: Serialize>(report: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(report).context("failed to serialize report JSON")?
    );
    Ok(())
}

pub fn print_run(report: &RunReport) {
    let prefix = if report.mode.is_dry_run() { "[dry-run] " } else { "" };
    let summary = &report.snapshot;
    println!(
        "{prefix}{} | {} directory users | {} contacts | {} lists",
        summary.directory, summary.source_records, summary.remote_records, summary.lists
    );
    if summary.skipped_source > 0 || summary.skipped_remote > 0 {
        println!(
            "  skipped without a mobile number: {} directory, {} remote",
            summary.skipped_source, summary.skipped_remote
        );
    }

    for issue in &report.issues {
        println!("{} {issue}", "!".yellow().bold());
    }
    if !report.missing_lists.is_empty() {
        println!(
            "{} offices without a contact list: {}",
            "!".yellow().bold(),
            report.missing_lists.join(", ")
        );
    }
    for outcome in &report.list_outcomes {
        println!(
            "  {} list {}{}",
            marker(&outcome.outcome),
            outcome.key,
            failure_suffix(outcome)
        );
    }

    let outcomes: HashMap<(&'static str, String), &RecordOutcome> = report
        .apply
        .outcomes
        .iter()
        .map(|o| ((o.operation.as_str(), o.key.clone()), o))
        .collect();
    let result_of = |operation: Operation, record: &Record| {
        outcomes
            .get(&(operation.as_str(), record.phone.to_string()))
            .copied()
    };

    let mut rows = Vec::new();
    for record in &report.changes.to_add {
        rows.push(change_row(
            Operation::Create,
            record,
            format!("lists {}", join_ids(record)),
            result_of(Operation::Create, record),
        ));
    }
    for update in &report.changes.to_update {
        let drift: Vec<&str> = update.drift.iter().map(|d| d.as_str()).collect();
        rows.push(change_row(
            Operation::Update,
            &update.target,
            format!("{} → lists {}", drift.join(", "), join_ids(&update.target)),
            result_of(Operation::Update, &update.target),
        ));
    }
    for record in &report.changes.to_remove {
        rows.push(change_row(
            Operation::Delete,
            record,
            String::new(),
            result_of(Operation::Delete, record),
        ));
    }

    if rows.is_empty() {
        println!(
            "{prefix}✓ nothing to do ({} contacts up to date)",
            report.changes.unchanged.len()
        );
    } else {
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    let apply = &report.apply;
    let failed = apply.created.failed + apply.updated.failed + apply.deleted.failed;
    let elapsed = (report.finished_at - report.started_at).num_milliseconds();
    let finished = report
        .finished_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");
    let line = format!(
        "{prefix}{} created, {} updated, {} deleted, {} unchanged, {} failed \
         ({elapsed} ms, finished {finished})",
        apply.created.succeeded,
        apply.updated.succeeded,
        apply.deleted.succeeded,
        apply.unchanged,
        failed,
    );
    if failed > 0 {
        println!("{}", line.red().bold());
    } else {
        println!("{line}");
    }
    if report.mode.is_dry_run() && !report.changes.is_empty() {
        println!("Set `dry_run: false` in the config to apply these changes.");
    }
}

pub fn print_lists(report: &ListsReport) {
    for issue in &report.issues {
        println!("{} {issue}", "!".yellow().bold());
    }

    if report.lists.is_empty() {
        println!("No contact lists.");
    } else {
        let rows: Vec<ListRow> = report
            .lists
            .iter()
            .map(|group| ListRow {
                name: group.name.clone(),
                id: group
                    .id
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    if report.missing.is_empty() {
        println!("✓ every office has a contact list");
        return;
    }

    println!("Offices without a contact list:");
    let created: HashMap<&str, &RecordOutcome> =
        report.outcomes.iter().map(|o| (o.key.as_str(), o)).collect();
    for office in &report.missing {
        match created.get(office.as_str()) {
            Some(outcome) => println!(
                "  {} {}{}",
                marker(&outcome.outcome),
                office,
                failure_suffix(outcome)
            ),
            None => println!("  {} {}", "·".yellow(), office),
        }
    }
    if report.outcomes.is_empty() {
        println!("Run 'rostersync lists --create' to create them.");
    }
}

fn change_row(
    operation: Operation,
    record: &Record,
    detail: String,
    outcome: Option<&RecordOutcome>,
) -> ChangeRow {
    let action = match operation {
        Operation::Create => "add".green().to_string(),
        Operation::Update => "update".yellow().to_string(),
        Operation::Delete => "remove".red().to_string(),
        Operation::CreateList => "create list".to_string(),
    };
    let detail = match outcome {
        Some(RecordOutcome {
            outcome: Outcome::Failed { reason },
            ..
        }) => format!("{detail} [{reason}]").trim().to_string(),
        _ => detail,
    };
    ChangeRow {
        marker: outcome.map(|o| marker(&o.outcome)).unwrap_or_default(),
        action,
        phone: record.phone.to_string(),
        name: record.display_name(),
        detail,
    }
}

fn marker(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Applied => "✎".green().to_string(),
        Outcome::WouldApply => "~".to_string(),
        Outcome::Failed { .. } => "✗".red().bold().to_string(),
    }
}

fn failure_suffix(outcome: &RecordOutcome) -> String {
    match &outcome.outcome {
        Outcome::Failed { reason } => format!(" ({reason})"),
        _ => String::new(),
    }
}

fn join_ids(record: &Record) -> String {
    record
        .group_ids
        .iter()
        .map(|id| id.0.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
