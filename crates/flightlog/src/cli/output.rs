//! Text rendering for command output.

use std::fmt::Write;

use humansize::{format_size, BINARY};

use crate::chips::FilterChip;
use crate::model::{Attachment, FlightLog, LogPage, Stats};

const TITLE_WIDTH: usize = 32;

/// Render a page of logs as an aligned table with a paging footer.
#[must_use]
pub fn log_table(page: &LogPage) -> String {
    if page.items.is_empty() {
        return "No flight logs found.\n".to_string();
    }

    let header = ["ID", "DATE", "TITLE", "PILOT", "MODEL", "DURATION", "TAGS"];
    let rows: Vec<[String; 7]> = page
        .items
        .iter()
        .map(|log| {
            [
                short_id(&log.id).to_string(),
                flight_date(log),
                truncate(&log.title, TITLE_WIDTH),
                log.pilot.clone(),
                log.drone_model.to_string(),
                log.duration_display(),
                log.tag_names(),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out.push('\n');
    out.push_str(&page_footer(page));
    out.push('\n');
    out
}

/// Render a page of logs as tab-separated lines, one per log.
#[must_use]
pub fn log_plain(page: &LogPage) -> String {
    page.items
        .iter()
        .map(|log| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\n",
                log.id,
                flight_date(log),
                log.title,
                log.pilot,
                log.drone_model,
                log.duration_display()
            )
        })
        .collect()
}

/// "Page 2 of 5 (112 flights)".
#[must_use]
pub fn page_footer(page: &LogPage) -> String {
    let noun = if page.total == 1 { "flight" } else { "flights" };
    format!(
        "Page {} of {} ({} {noun})",
        page.page,
        page.total_pages.max(1),
        page.total
    )
}

/// Numbered chips, or `None` when no filter is active.
#[must_use]
pub fn chips_line(chips: &[FilterChip]) -> Option<String> {
    if chips.is_empty() {
        return None;
    }
    let labels: Vec<String> = chips
        .iter()
        .enumerate()
        .map(|(i, chip)| format!("[{}] {}", i + 1, chip.label))
        .collect();
    Some(labels.join("  "))
}

/// Full details of one log.
#[must_use]
pub fn log_detail(log: &FlightLog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", log.title);
    let _ = writeln!(out, "{}", "=".repeat(log.title.chars().count().max(3)));
    let _ = writeln!(out, "ID:            {}", log.id);
    let _ = writeln!(out, "Pilot:         {}", log.pilot);
    let _ = writeln!(out, "Model:         {}", log.drone_model);
    let _ = writeln!(out, "Serial number: {}", log.serial_number.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "Flight date:   {}", flight_date(log));
    let _ = writeln!(out, "Duration:      {}", log.duration_display());
    if let (Some(lat), Some(lon)) = (log.takeoff_lat, log.takeoff_lon) {
        let _ = writeln!(out, "Takeoff:       {lat:.6}, {lon:.6}");
    }
    if !log.flight_modes.is_empty() {
        let _ = writeln!(out, "Flight modes:  {}", log.flight_modes.join(", "));
    }
    if let Some(tow) = log.tow {
        let _ = writeln!(out, "Takeoff weight: {tow:.2} kg");
    }
    if !log.tags.is_empty() {
        let _ = writeln!(out, "Tags:          {}", log.tag_names());
    }
    if let Some(comment) = log.comment.as_deref().filter(|c| !c.trim().is_empty()) {
        let _ = writeln!(out, "\n{comment}");
    }
    if !log.attachments.is_empty() {
        let _ = writeln!(out, "\nAttachments:");
        for attachment in &log.attachments {
            let _ = writeln!(out, "  {}", attachment_line(attachment));
        }
    }
    out
}

/// "id  name (12.3 KB)".
#[must_use]
pub fn attachment_line(attachment: &Attachment) -> String {
    format!(
        "{}  {} ({})",
        attachment.id,
        attachment.filename,
        format_size(attachment.file_size, BINARY)
    )
}

/// Fleet statistics as text.
#[must_use]
pub fn stats_text(stats: &Stats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total flights: {}", stats.total_flights);
    let _ = writeln!(out, "Total hours:   {:.1}", stats.total_hours);
    if !stats.hours_by_model.is_empty() {
        let _ = writeln!(out, "\nHours by model:");
        for (model, hours) in &stats.hours_by_model {
            let _ = writeln!(out, "  {model:<6} {hours:.1}");
        }
    }
    out
}

fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell.as_ref()))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(i, _)| &id[..i])
}

fn flight_date(log: &FlightLog) -> String {
    log.flight_date
        .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d %H:%M").to_string())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
