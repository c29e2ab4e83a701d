//! Inline SVG charts derived from the store's counts. Pure string
//! builders; geometry only, no animation state.

use crate::model::{Request, StatusCounts};
use chrono::{Datelike, Duration, NaiveDate};

const SVG_WIDTH: u32 = 560;

const WEEKDAYS: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Requests created per day over the trailing 7 days, as a vertical bar
/// chart. `today` is the rightmost bucket.
pub fn weekly_bar_chart(requests: &[Request], today: NaiveDate) -> String {
    let days: Vec<NaiveDate> = (0..7).rev().map(|i| today - Duration::days(i)).collect();
    let counts: Vec<usize> = days
        .iter()
        .map(|day| {
            requests
                .iter()
                .filter(|r| r.created_at.date_naive() == *day)
                .count()
        })
        .collect();

    // Avoid dividing by zero when the window is empty.
    let max = counts.iter().copied().max().unwrap_or(0).max(1);

    let height = 200u32;
    let bottom = 40.0;
    let top = 20.0;
    let left = 30.0;
    let area = height as f64 - bottom - top;
    let bar_width = 40.0;
    let gap = 20.0;
    let slot = bar_width + gap;

    let mut body = String::new();
    for (i, (day, count)) in days.iter().zip(&counts).enumerate() {
        let x = left + i as f64 * slot + gap / 2.0;
        let bar_height = (*count as f64 / max as f64) * area;
        let y = top + area - bar_height;
        let fill = if *count > 0 { "#000" } else { "#f0f0f0" };

        body.push_str(&format!(
            "<rect class=\"chart-bar\" x=\"{x:.1}\" y=\"{y:.1}\" width=\"{bar_width}\" height=\"{bar_height:.1}\" fill=\"{fill}\" stroke=\"#000\" stroke-width=\"1\" />\n",
        ));
        body.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"11\" fill=\"#000\" class=\"chart-label\">{count}</text>\n",
            x + bar_width / 2.0,
            y - 6.0,
        ));
        body.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#000\">{}</text>\n",
            x + bar_width / 2.0,
            height as f64 - bottom + 16.0,
            WEEKDAYS[day.weekday().num_days_from_sunday() as usize],
        ));
        body.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"9\" fill=\"#000\">{:02}/{:02}</text>\n",
            x + bar_width / 2.0,
            height as f64 - bottom + 28.0,
            day.day(),
            day.month(),
        ));
    }

    body.push_str(&format!(
        "<line x1=\"{left}\" y1=\"{0:.1}\" x2=\"{1:.1}\" y2=\"{0:.1}\" stroke=\"#000\" stroke-width=\"1\" />\n",
        top + area,
        left + 7.0 * slot,
    ));

    format!(
        "<svg width=\"100%\" viewBox=\"0 0 {SVG_WIDTH} {height}\" xmlns=\"http://www.w3.org/2000/svg\">\n{body}</svg>"
    )
}

/// Proportional horizontal strip of the per-status totals. Zero-count
/// segments are omitted; an empty set renders a NO DATA placeholder.
pub fn status_distribution(counts: &StatusCounts) -> String {
    let total = counts.pending + counts.confirmed + counts.denied;
    let height = 80u32;
    if total == 0 {
        return format!(
            "<svg width=\"100%\" viewBox=\"0 0 {SVG_WIDTH} {height}\" xmlns=\"http://www.w3.org/2000/svg\">\n<text x=\"280\" y=\"45\" text-anchor=\"middle\" font-size=\"12\" fill=\"#000\">NO DATA</text>\n</svg>"
        );
    }

    let bar_y = 10.0;
    let bar_height = 36.0;
    let margin = 2.0;
    let available = SVG_WIDTH as f64 - margin * 2.0;

    let mut body = String::new();
    let mut x = 0.0;
    let segments = [
        (counts.pending, "PEND.", "#fff", "#000", false),
        (counts.confirmed, "CONF.", "#000", "#fff", false),
        (counts.denied, "DEN.", "#f0f0f0", "#000", true),
    ];
    for (count, label, fill, text_fill, struck) in segments {
        if count == 0 {
            continue;
        }
        let width = (count as f64 / total as f64) * available;
        let decoration = if struck {
            " text-decoration=\"line-through\""
        } else {
            ""
        };
        body.push_str(&format!(
            "<rect x=\"{x:.1}\" y=\"{bar_y}\" width=\"{width:.1}\" height=\"{bar_height}\" fill=\"{fill}\" stroke=\"#000\" stroke-width=\"1\" class=\"dist-bar\" />\n",
        ));
        body.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"10\" font-weight=\"700\" fill=\"{text_fill}\"{decoration}>{label} {count}</text>\n",
            x + width / 2.0,
            bar_y + bar_height / 2.0 + 4.0,
        ));
        x += width + margin;
    }

    // Legend row under the strip.
    let legend_y = bar_y + bar_height + 14.0;
    for (offset, fill, label) in [
        (0.0, "#fff", "PENDING"),
        (100.0, "#000", "CONFIRMED"),
        (220.0, "#f0f0f0", "DENIED"),
    ] {
        body.push_str(&format!(
            "<rect x=\"{offset}\" y=\"{legend_y}\" width=\"10\" height=\"10\" fill=\"{fill}\" stroke=\"#000\" stroke-width=\"1\" />\n",
        ));
        body.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"9\" fill=\"#000\">{label}</text>\n",
            offset + 14.0,
            legend_y + 9.0,
        ));
    }

    format!(
        "<svg width=\"100%\" viewBox=\"0 0 {SVG_WIDTH} {height}\" xmlns=\"http://www.w3.org/2000/svg\">\n{body}</svg>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatusCounts;
    use crate::sample::sample_requests;
    use chrono::NaiveDate;

    #[test]
    fn bar_chart_has_seven_bars_and_baseline() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let svg = weekly_bar_chart(&sample_requests(), today);
        assert_eq!(svg.matches("chart-bar").count(), 7);
        assert!(svg.contains("<line"));
        // 2025-02-10 is a Monday; the rightmost label is MON.
        assert!(svg.contains("MON"));
    }

    #[test]
    fn bar_chart_counts_creations_per_day() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let docs = sample_requests();
        let created_today = docs
            .iter()
            .filter(|r| r.created_at.date_naive() == today)
            .count();
        let svg = weekly_bar_chart(&docs, today);
        assert!(svg.contains(&format!(">{created_today}</text>")));
    }

    #[test]
    fn distribution_omits_zero_segments() {
        let counts = StatusCounts {
            total: 3,
            pending: 3,
            confirmed: 0,
            denied: 0,
        };
        let svg = status_distribution(&counts);
        assert!(svg.contains("PEND. 3"));
        assert!(!svg.contains("CONF."));
        assert!(!svg.contains("DEN. "));
    }

    #[test]
    fn distribution_empty_set_renders_placeholder() {
        let svg = status_distribution(&StatusCounts::default());
        assert!(svg.contains("NO DATA"));
        assert!(!svg.contains("dist-bar"));
    }

    #[test]
    fn distribution_includes_all_nonzero_segments() {
        let counts = StatusCounts::tally(&sample_requests());
        assert!(counts.pending > 0 && counts.confirmed > 0 && counts.denied > 0);
        let svg = status_distribution(&counts);
        for label in ["PEND.", "CONF.", "DEN."] {
            assert!(svg.contains(label), "{label} missing");
        }
    }
}
