use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::Record;

/// Render the human-readable gap report for one user's entries.
///
/// Entries must be sorted by their `datum` field. Weekdays without a booking
/// between the first of the month of the first entry and the last booked
/// date are flagged as MISSING; a blank line separates each week (printed
/// before Mondays).
pub fn render_gap_report(entries: &[Record]) -> String {
    let mut out = String::new();
    let mut expected: Option<NaiveDate> = None;

    let mut i = 0;
    while i < entries.len() {
        let datum = entries[i]["datum"].as_str().map(str::trim).unwrap_or("");
        let current = match NaiveDate::parse_from_str(datum, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                // Rows without a parseable date still get printed, they just
                // cannot participate in the gap calculation.
                out.push_str(&format_row(&entries[i]));
                i += 1;
                continue;
            }
        };

        // Start the gap scan at the first of the month of the first booking.
        let mut day = match expected {
            Some(date) => date,
            None => current.with_day(1).unwrap_or(current),
        };
        while day < current {
            if day.weekday().num_days_from_monday() < 5 {
                out.push_str(&format!("{} - MISSING\n", day.format("%Y-%m-%d")));
            }
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        if current.weekday() == Weekday::Mon {
            out.push('\n');
        }

        // All rows booked on the current date.
        while i < entries.len() && entries[i]["datum"].as_str().map(str::trim) == Some(datum) {
            out.push_str(&format_row(&entries[i]));
            i += 1;
        }

        expected = current.succ_opt();
    }

    out
}

fn format_row(row: &Record) -> String {
    let datum = row["datum"].as_str().unwrap_or("").trim();
    let projekt = row["projekt_name"].as_str().unwrap_or("");
    let phase = row["phase_name"].as_str().unwrap_or("");
    let minutes: f64 = row["minutenInt"]
        .as_str()
        .and_then(|m| m.trim().parse().ok())
        .unwrap_or(0.0);
    format!(
        "{datum} - {projekt:<30} | {phase:<40} :: {:.1}\n",
        minutes / 60.0
    )
}
