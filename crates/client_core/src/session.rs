use serde::Serialize;
use shared::{domain::BusinessQuery, protocol::BusinessAnalysis};

use crate::validation::ValidationErrors;

pub const ANALYSIS_FAILED_NOTICE: &str = "Failed to fetch business data. Please try again.";
pub const REGENERATION_FAILED_NOTICE: &str = "Failed to regenerate headline. Please try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    ReportReady,
    RegeneratingHeadline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    SubmitAccepted,
    AnalysisSucceeded,
    AnalysisFailed,
    RegenerateRequested,
    HeadlineSettled,
    Reset,
}

impl Phase {
    /// The phase machine. `None` means the event is not legal in this phase.
    ///
    /// ```text
    /// Idle --SubmitAccepted--> Submitting
    /// Submitting --AnalysisSucceeded--> ReportReady
    /// Submitting --AnalysisFailed--> Idle
    /// ReportReady --RegenerateRequested--> RegeneratingHeadline
    /// RegeneratingHeadline --HeadlineSettled--> ReportReady
    /// any --Reset--> Idle
    /// ```
    pub fn next(self, event: PhaseEvent) -> Option<Phase> {
        use Phase::*;
        use PhaseEvent::*;

        match (self, event) {
            (_, Reset) => Some(Idle),
            (Idle | ReportReady | RegeneratingHeadline, SubmitAccepted) => Some(Submitting),
            (Submitting, AnalysisSucceeded) => Some(ReportReady),
            (Submitting, AnalysisFailed) => Some(Idle),
            (ReportReady, RegenerateRequested) => Some(RegeneratingHeadline),
            (RegeneratingHeadline, HeadlineSettled) => Some(ReportReady),
            _ => None,
        }
    }

    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Submitting | Phase::RegeneratingHeadline)
    }

    pub fn has_report(self) -> bool {
        matches!(self, Phase::ReportReady | Phase::RegeneratingHeadline)
    }
}

/// Result of a successful analysis, frozen against the query that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    business_name: String,
    location: String,
    rating: f64,
    review_count: u64,
    headline: String,
}

impl Report {
    pub fn from_analysis(query: &BusinessQuery, analysis: BusinessAnalysis) -> Self {
        Self {
            business_name: query.name.clone(),
            location: query.location.clone(),
            rating: analysis.rating,
            review_count: analysis.reviews,
            headline: analysis.headline,
        }
    }

    pub fn business_name(&self) -> &str {
        &self.business_name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn review_count(&self) -> u64 {
        self.review_count
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    pub fn query(&self) -> BusinessQuery {
        BusinessQuery {
            name: self.business_name.clone(),
            location: self.location.clone(),
        }
    }

    pub(crate) fn replace_headline(&mut self, headline: String) {
        self.headline = headline;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    AnalysisFailed,
    RegenerationFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn analysis_failed() -> Self {
        Self {
            kind: NoticeKind::AnalysisFailed,
            message: ANALYSIS_FAILED_NOTICE.to_string(),
        }
    }

    pub fn regeneration_failed() -> Self {
        Self {
            kind: NoticeKind::RegenerationFailed,
            message: REGENERATION_FAILED_NOTICE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    pub business_name_input: String,
    pub location_input: String,
    pub validation_errors: ValidationErrors,
    pub report: Option<Report>,
    pub phase: Phase,
    pub display_flipped: bool,
    pub notice: Option<Notice>,
}

impl Session {
    pub fn is_pristine(&self) -> bool {
        *self == Session::default()
    }
}
