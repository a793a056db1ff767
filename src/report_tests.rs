#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::models::Record;
    use crate::report::render_gap_report;

    fn entry(datum: &str, projekt: &str, phase: &str, minutes: &str) -> Record {
        json!({
            "datum": datum,
            "projekt_name": projekt,
            "phase_name": phase,
            "minutenInt": minutes,
        })
    }

    // July 2025: the 1st is a Tuesday, the 7th the following Monday.

    #[test]
    fn weekday_gaps_are_flagged_as_missing() {
        let entries = vec![
            entry("2025-07-01", "ACME", "DEV", "480"),
            entry("2025-07-07", "ACME", "DEV", "240"),
        ];

        let report = render_gap_report(&entries);

        assert!(report.contains("2025-07-02 - MISSING"));
        assert!(report.contains("2025-07-03 - MISSING"));
        assert!(report.contains("2025-07-04 - MISSING"));
        // Weekend days are not flagged.
        assert!(!report.contains("2025-07-05"));
        assert!(!report.contains("2025-07-06"));
    }

    #[test]
    fn gaps_before_the_first_booking_start_at_the_first_of_month() {
        let entries = vec![entry("2025-07-03", "ACME", "DEV", "480")];

        let report = render_gap_report(&entries);

        assert!(report.contains("2025-07-01 - MISSING"));
        assert!(report.contains("2025-07-02 - MISSING"));
        assert!(!report.contains("2025-07-03 - MISSING"));
    }

    #[test]
    fn multiple_bookings_on_one_day_do_not_repeat_gaps() {
        let entries = vec![
            entry("2025-07-01", "ACME", "DEV", "240"),
            entry("2025-07-01", "ACME", "REVIEW", "120"),
            entry("2025-07-02", "ACME", "DEV", "480"),
        ];

        let report = render_gap_report(&entries);

        assert!(!report.contains("MISSING"));
        assert_eq!(report.matches("2025-07-01").count(), 2);
    }

    #[test]
    fn mondays_start_a_new_paragraph() {
        let entries = vec![
            entry("2025-07-04", "ACME", "DEV", "480"),
            entry("2025-07-07", "ACME", "DEV", "480"),
        ];

        let report = render_gap_report(&entries);

        // Blank line right before the Monday row.
        assert!(report.contains("\n\n2025-07-07"));
    }

    #[test]
    fn minutes_are_printed_as_fractional_hours() {
        let entries = vec![entry("2025-07-01", "ACME", "DEV", "90")];

        let report = render_gap_report(&entries);

        assert!(report.contains(":: 1.5"), "got: {report}");
        assert!(report.starts_with("2025-07-01 - ACME"));
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render_gap_report(&[]).is_empty());
    }
}
