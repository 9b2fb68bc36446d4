//! Terminal rendering for the admin commands
//!
//! Tables via comfy-table, `--json` via serde_json, and the outcome and
//! confirmation plumbing shared by every command.

use anyhow::{bail, Context, Result};
use cemboard_core::calendar;
use cemboard_core::ledger::{format_amount, LedgerSummary};
use cemboard_core::models::{CemeteryRecord, Notice, PrintRecord};
use cemboard_core::stats::CemeteryStats;
use cemboard_core::views::{FinderCard, GraveCell, GraveProfile};
use cemboard_core::Outcome;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use serde::Serialize;
use std::io::{BufRead, Write};

// ============================================================================
// Outcomes and prompts
// ============================================================================

/// Turn a view outcome into process output. Alerts and redirects fail the
/// command so scripts see a non-zero exit.
pub fn finish(outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Done => Ok(()),
        Outcome::Message(message) => {
            println!("{}", message);
            Ok(())
        }
        Outcome::Cancelled => {
            eprintln!("Cancelled.");
            Ok(())
        }
        Outcome::Alert(message) => bail!("{}", message),
        Outcome::Redirect(route) if route == cemboard_core::views::LOGIN_ROUTE => {
            bail!("Not signed in or session expired. Run `cemboard login --token <TOKEN>`.")
        }
        Outcome::Redirect(route) => bail!("Redirected to {}", route),
    }
}

/// Ask a yes/no question on stderr; anything but y/yes is a no
pub fn confirm(prompt: &str, assume_yes: bool) -> bool {
    if assume_yes {
        return true;
    }
    eprint!("{} [y/N] ", prompt);
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    is_yes(&line)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

// ============================================================================
// Tables
// ============================================================================

fn table(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
    table
}

fn or_dash(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("-")
        .to_string()
}

pub fn format_print_table(rows: &[&PrintRecord], no_color: bool) -> String {
    if rows.is_empty() {
        return "No records found.".to_string();
    }

    let mut table = table(
        &[
            "ID", "Date", "Client", "Phone", "Pages", "Charge/Page", "Cost/Page", "Total Charge",
            "Total Cost", "Profit",
        ],
        no_color,
    );
    for r in rows {
        table.add_row(Row::from(vec![
            r.id.clone(),
            calendar::short_date(r.date.as_deref()).unwrap_or_else(|| "-".to_string()),
            truncate(&r.client_name, 24),
            or_dash(r.phone.as_deref()),
            format_amount(r.total_pages),
            format_amount(r.charge_per_page),
            format_amount(r.cost_per_page),
            format_amount(r.total_charge),
            format_amount(r.total_cost),
            format_amount(r.profit),
        ]));
    }
    table.to_string()
}

pub fn format_summary(summary: &LedgerSummary) -> String {
    [
        format!("Records:  {}", summary.records),
        format!("Revenue:  {}", format_amount(summary.revenue)),
        format!("Cost:     {}", format_amount(summary.cost)),
        format!("Profit:   {}", format_amount(summary.profit)),
    ]
    .join("\n")
}

pub fn format_record_table(rows: &[&CemeteryRecord], no_color: bool) -> String {
    if rows.is_empty() {
        return "No records found.".to_string();
    }

    let mut table = table(
        &["ID", "Name", "Grave", "Age", "Gender", "Native", "Died"],
        no_color,
    );
    for r in rows {
        table.add_row(Row::from(vec![
            r.id.clone(),
            truncate(&r.name, 28),
            r.grave_number().unwrap_or("-").to_string(),
            r.age.map(format_amount).unwrap_or_else(|| "-".to_string()),
            or_dash(r.gender.as_deref()),
            if r.is_native() { "Yes" } else { "No" }.to_string(),
            calendar::short_date(r.death_date.as_deref()).unwrap_or_else(|| "-".to_string()),
        ]));
    }
    table.to_string()
}

pub fn format_notice_table(notices: &[Notice], no_color: bool) -> String {
    if notices.is_empty() {
        return "No notices found.".to_string();
    }

    let mut table = table(&["ID", "Type", "Date", "Title"], no_color);
    for n in notices {
        table.add_row(Row::from(vec![
            n.id.clone(),
            n.kind.to_string(),
            calendar::long_date(n.date.as_deref()).unwrap_or_else(|| calendar::NO_DATE.to_string()),
            truncate(&n.title, 48),
        ]));
    }
    table.to_string()
}

pub fn format_notice(notice: &Notice) -> String {
    let mut lines = vec![
        format!("Title:  {}", notice.title),
        format!("Type:   {}", notice.kind),
        format!(
            "Date:   {}",
            calendar::long_date(notice.date.as_deref())
                .unwrap_or_else(|| calendar::NO_DATE.to_string())
        ),
    ];
    if let Some(image) = notice.image() {
        lines.push(format!("Image:  {}", image));
    }
    lines.push(String::new());
    lines.push(notice.description.clone());
    lines.join("\n")
}

/// Grave cells laid out in rows, occupied slots marked with `*`
pub fn format_grave_grid(cells: &[GraveCell], per_row: usize) -> String {
    if cells.is_empty() {
        return "No graves in this block.".to_string();
    }
    let width = cells.iter().map(|c| c.grave.chars().count()).max().unwrap_or(0);
    cells
        .chunks(per_row.max(1))
        .map(|row| {
            row.iter()
                .map(|c| {
                    let mark = if c.is_occupied() { "*" } else { " " };
                    format!("{:<width$}{}", c.grave, mark, width = width)
                })
                .collect::<Vec<_>>()
                .join(" ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_finder_cards(cards: &[FinderCard], no_color: bool) -> String {
    if cards.is_empty() {
        return cemboard_core::views::finder::NO_RESULTS.to_string();
    }
    let mut table = table(&["ID", "Name", "Grave", "Died (Hijri)", "Died"], no_color);
    for c in cards {
        table.add_row(Row::from(vec![
            c.id.clone(),
            truncate(&c.name, 28),
            c.grave.clone(),
            c.death_hijri.clone(),
            c.death_long.clone(),
        ]));
    }
    table.to_string()
}

pub fn format_profile(p: &GraveProfile) -> String {
    let mut lines = vec![
        format!("Name:            {}", p.name),
        format!("Grave number:    {}", p.grave),
        format!("Born:            {}", p.born),
        format!("Died:            {}", p.died),
        format!("Died (Hijri):    {}", p.died_hijri),
        format!("Age:             {}", p.age),
        format!("Gender:          {}", p.gender),
        format!("Native:          {}", p.native),
        format!("Address:         {}", p.address),
        format!("Place of death:  {}", p.where_died),
        format!("Father:          {}", p.father),
        format!("Mother:          {}", p.mother),
        format!("Guardian:        {}", p.guardian),
        format!("Image:           {}", p.image),
        format!("Created:         {}", p.created),
        format!("Updated:         {}", p.updated),
    ];
    if let Some(description) = &p.description {
        lines.push(String::new());
        lines.push(description.clone());
    }
    lines.join("\n")
}

pub fn format_stats(stats: &CemeteryStats, no_color: bool) -> String {
    let mut lines = vec![
        format!("Total records:  {}", stats.total),
        format!("Native:         {}", stats.native),
        format!("Foreign:        {}", stats.foreign),
        format!("Male:           {}", stats.male),
        format!("Female:         {}", stats.female),
        String::new(),
    ];
    let mut ages = table(&["Age", "Records"], no_color);
    for a in &stats.ages {
        ages.add_row(Row::from(vec![a.range.to_string(), a.count.to_string()]));
    }
    lines.push(ages.to_string());
    lines.join("\n")
}

// ============================================================================
// Utilities
// ============================================================================

pub fn truncate(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn print(id: &str, name: &str) -> PrintRecord {
        PrintRecord {
            id: id.to_string(),
            client_name: name.to_string(),
            total_pages: 10.0,
            charge_per_page: 5.0,
            cost_per_page: 3.0,
            total_charge: 50.0,
            total_cost: 30.0,
            profit: 20.0,
            date: Some("2024-05-01".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate("আব্দুল করিম", 3), "আব…");
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }

    #[test]
    fn test_confirm_assume_yes() {
        assert!(confirm("Delete this record?", true));
    }

    #[test]
    fn test_finish_outcomes() {
        assert!(finish(Outcome::Done).is_ok());
        assert!(finish(Outcome::Cancelled).is_ok());
        assert!(finish(Outcome::Message("ok".to_string())).is_ok());

        let err = finish(Outcome::alert("Delete failed")).unwrap_err();
        assert_eq!(err.to_string(), "Delete failed");

        let err = finish(Outcome::login()).unwrap_err();
        assert!(err.to_string().contains("cemboard login"));
    }

    #[test]
    fn test_print_table() {
        let record = print("p1", "Amin");
        let output = format_print_table(&[&record], true);
        assert!(output.contains("Amin"));
        assert!(output.contains("5/1/2024"));
        assert!(output.contains("20"));

        assert_eq!(format_print_table(&[], true), "No records found.");
    }

    #[test]
    fn test_summary() {
        let records = vec![print("p1", "Amin"), print("p2", "Rafi")];
        let output = format_summary(&LedgerSummary::from_records(&records));
        assert!(output.contains("Records:  2"));
        assert!(output.contains("Profit:   40"));
    }

    #[test]
    fn test_grave_grid_layout() {
        let cells: Vec<GraveCell> = ["A1", "A2", "A10"]
            .iter()
            .enumerate()
            .map(|(i, g)| GraveCell {
                grave: g.to_string(),
                record_id: (i == 0).then(|| "r1".to_string()),
            })
            .collect();
        let output = format_grave_grid(&cells, 2);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines, vec!["A1 * A2", "A10"]);
    }

    #[test]
    fn test_to_json() {
        let record = print("p1", "Amin");
        let json = to_json(&[&record]).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"clientName\": \"Amin\""));
    }
}
