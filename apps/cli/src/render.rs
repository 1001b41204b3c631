use std::fmt::Write as _;

use client_core::{Phase, Report, Session};
use shared::domain::MAX_RATING;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn print_session(session: &Session, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(session)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(session)?),
    }
    Ok(())
}

pub fn render_text(session: &Session) -> String {
    let mut out = String::new();

    if let Some(notice) = &session.notice {
        let _ = writeln!(out, "! {}", notice.message);
    }

    match (&session.report, session.display_flipped) {
        (Some(report), true) => render_report(&mut out, report, session.phase),
        _ => render_form(&mut out, session),
    }

    out
}

fn render_form(out: &mut String, session: &Session) {
    let _ = writeln!(out, "Business name: {}", session.business_name_input);
    let _ = writeln!(out, "Location:      {}", session.location_input);
    for (field, message) in session.validation_errors.iter() {
        let _ = writeln!(out, "  {field}: {message}");
    }
    if session.phase.has_report() {
        let _ = writeln!(out, "Report ready.");
    } else if session.phase.is_busy() {
        let _ = writeln!(out, "Analyzing...");
    }
}

fn render_report(out: &mut String, report: &Report, phase: Phase) {
    let _ = writeln!(out, "{} ({})", report.business_name(), report.location());
    let _ = writeln!(
        out,
        "  Rating:   {} {:.1} / {MAX_RATING}",
        star_bar(report.rating()),
        report.rating()
    );
    let _ = writeln!(out, "  Reviews:  {}", report.review_count());
    let _ = writeln!(out, "  Headline: {}", report.headline());
    if phase.is_busy() {
        let _ = writeln!(out, "  (regenerating headline...)");
    }
}

fn star_bar(rating: f64) -> String {
    let total = MAX_RATING as usize;
    let filled = (rating.clamp(0.0, MAX_RATING).round() as usize).min(total);
    format!("{}{}", "*".repeat(filled), ".".repeat(total - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_bar_rounds_and_clamps() {
        assert_eq!(star_bar(4.6), "*****");
        assert_eq!(star_bar(3.2), "***..");
        assert_eq!(star_bar(0.0), ".....");
        assert_eq!(star_bar(9.0), "*****");
    }

    #[test]
    fn pristine_session_renders_empty_form() {
        let text = render_text(&Session::default());
        assert_eq!(text, "Business name: \nLocation:      \n");
    }

    #[test]
    fn validation_errors_render_under_the_form() {
        let session = Session {
            business_name_input: "Green Valley Cafe".to_string(),
            validation_errors: client_core::validate_inputs("Green Valley Cafe", ""),
            ..Session::default()
        };
        let text = render_text(&session);
        assert!(text.contains("  location: Business location is required"));
    }

    #[test]
    fn notice_is_rendered_first() {
        let session = Session {
            phase: Phase::Idle,
            notice: Some(client_core::Notice::analysis_failed()),
            ..Session::default()
        };
        let text = render_text(&session);
        assert!(text.starts_with("! Failed to fetch business data. Please try again."));
    }

    #[test]
    fn flipped_session_renders_report_card() {
        let report = Report::from_analysis(
            &shared::domain::BusinessQuery::new("Green Valley Cafe", "Austin"),
            shared::protocol::BusinessAnalysis {
                rating: 4.6,
                reviews: 312,
                headline: "Austin's Coziest Corner".to_string(),
            },
        );
        let mut session = Session {
            report: Some(report),
            phase: Phase::ReportReady,
            ..Session::default()
        };
        assert!(render_text(&session).contains("Report ready."));

        session.display_flipped = true;
        session.phase = Phase::RegeneratingHeadline;
        let text = render_text(&session);
        assert!(text.starts_with("Green Valley Cafe (Austin)\n"));
        assert!(text.contains("  Rating:   ***** 4.6 / 5"));
        assert!(text.contains("  Reviews:  312"));
        assert!(text.contains("  Headline: Austin's Coziest Corner"));
        assert!(text.contains("(regenerating headline...)"));
    }

    #[test]
    fn json_view_uses_snake_case_phase() {
        let value = serde_json::to_value(Session::default()).expect("serialize");
        assert_eq!(value["phase"], "idle");
        assert_eq!(value["display_flipped"], false);
        assert!(value["report"].is_null());
    }

    #[test]
    fn submitting_session_shows_progress_on_the_form() {
        let session = Session {
            business_name_input: "Green Valley Cafe".to_string(),
            location_input: "Austin".to_string(),
            phase: Phase::Submitting,
            ..Session::default()
        };
        let text = render_text(&session);
        assert!(text.ends_with("Analyzing...\n"));
        assert!(!text.contains("Report ready."));
    }
}
