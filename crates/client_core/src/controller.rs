use std::{future::Future, sync::Arc, time::Duration};

use shared::{domain::BusinessQuery, protocol::BusinessAnalysis};
use tokio::{
    sync::mpsc,
    task::{JoinHandle, JoinSet},
};
use tracing::{debug, info, warn};

use crate::{
    error::{Endpoint, RequestFailure},
    session::{Notice, Phase, PhaseEvent, Report, Session},
    validation::{validate_inputs, ValidationErrors},
    AnalysisBackend,
};

const DEFAULT_FLIP_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub flip_delay: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            flip_delay: DEFAULT_FLIP_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Dispatched,
    Invalid(ValidationErrors),
    AlreadyInFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenerateOutcome {
    Dispatched,
    NoReport,
    AlreadyInFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionUpdate {
    ReportReady,
    AnalysisFailed,
    HeadlineRegenerated,
    HeadlineFailed,
    DisplayFlipped,
}

enum TaskEvent {
    Analysis {
        generation: u64,
        query: BusinessQuery,
        result: Result<BusinessAnalysis, RequestFailure>,
    },
    Headline {
        generation: u64,
        result: Result<String, RequestFailure>,
    },
    FlipElapsed {
        generation: u64,
    },
}

impl TaskEvent {
    fn generation(&self) -> u64 {
        match self {
            Self::Analysis { generation, .. }
            | Self::Headline { generation, .. }
            | Self::FlipElapsed { generation } => *generation,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Analysis { .. } => "analysis",
            Self::Headline { .. } => "headline",
            Self::FlipElapsed { .. } => "flip",
        }
    }
}

#[derive(Default)]
struct InFlight {
    analysis: Option<JoinHandle<()>>,
    headline: Option<JoinHandle<()>>,
    flip: Option<JoinHandle<()>>,
}

impl InFlight {
    fn is_empty(&self) -> bool {
        self.analysis.is_none() && self.headline.is_none() && self.flip.is_none()
    }

    fn abort_all(&mut self) {
        for task in [
            self.analysis.take(),
            self.headline.take(),
            self.flip.take(),
        ]
        .into_iter()
        .flatten()
        {
            task.abort();
        }
    }
}

pub struct SessionController {
    backend: Arc<dyn AnalysisBackend>,
    options: ControllerOptions,
    session: Session,
    generation: u64,
    in_flight: InFlight,
    events_tx: mpsc::UnboundedSender<TaskEvent>,
    events_rx: mpsc::UnboundedReceiver<TaskEvent>,
}

impl SessionController {
    pub fn new(backend: Arc<dyn AnalysisBackend>, options: ControllerOptions) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            options,
            session: Session::default(),
            generation: 0,
            in_flight: InFlight::default(),
            events_tx,
            events_rx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_pending_work(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn set_business_name(&mut self, value: impl Into<String>) {
        self.session.business_name_input = value.into();
    }

    pub fn set_location(&mut self, value: impl Into<String>) {
        self.session.location_input = value.into();
    }

    pub fn validate(&self) -> ValidationErrors {
        validate_inputs(
            &self.session.business_name_input,
            &self.session.location_input,
        )
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.session.notice.take()
    }

    /// Must be called inside a Tokio runtime.
    pub fn submit(&mut self) -> SubmitOutcome {
        let errors = self.validate();
        self.session.validation_errors = errors.clone();
        if !errors.is_empty() {
            debug!(fields = errors.len(), "submission blocked by validation");
            return SubmitOutcome::Invalid(errors);
        }

        let Some(next) = self.session.phase.next(PhaseEvent::SubmitAccepted) else {
            debug!(
                generation = self.generation,
                "analysis already in flight; submit ignored"
            );
            return SubmitOutcome::AlreadyInFlight;
        };

        self.begin_generation();
        self.session.report = None;
        self.session.notice = None;
        self.session.phase = next;

        let query = BusinessQuery::new(
            &self.session.business_name_input,
            &self.session.location_input,
        );
        info!(
            generation = self.generation,
            name = %query.name,
            location = %query.location,
            "dispatching business analysis"
        );
        self.spawn_analysis(query);
        SubmitOutcome::Dispatched
    }

    pub fn regenerate_headline(&mut self) -> RegenerateOutcome {
        let Some(report) = self.session.report.as_ref() else {
            return RegenerateOutcome::NoReport;
        };
        let Some(next) = self.session.phase.next(PhaseEvent::RegenerateRequested) else {
            debug!(
                generation = self.generation,
                "headline already in flight; regenerate ignored"
            );
            return RegenerateOutcome::AlreadyInFlight;
        };

        let query = report.query();
        self.session.phase = next;
        info!(
            generation = self.generation,
            name = %query.name,
            location = %query.location,
            "dispatching headline regeneration"
        );
        self.spawn_headline(query);
        RegenerateOutcome::Dispatched
    }

    pub fn reset_session(&mut self) {
        self.begin_generation();
        let phase = self
            .session
            .phase
            .next(PhaseEvent::Reset)
            .unwrap_or_default();
        self.session = Session {
            phase,
            ..Session::default()
        };
        info!(generation = self.generation, "session reset");
    }

    pub fn process_events(&mut self) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            if let Some(update) = self.apply(event) {
                updates.push(update);
            }
        }
        updates
    }

    /// Waits for the next update. Returns `None` once nothing is in flight.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        while self.has_pending_work() {
            let event = self.events_rx.recv().await?;
            if let Some(update) = self.apply(event) {
                return Some(update);
            }
        }
        None
    }

    pub async fn settle(&mut self) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        while let Some(update) = self.next_update().await {
            updates.push(update);
        }
        updates
    }

    fn begin_generation(&mut self) {
        self.in_flight.abort_all();
        self.generation += 1;
    }

    fn spawn_analysis(&mut self, query: BusinessQuery) {
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();
        let generation = self.generation;
        let call_query = query.clone();
        self.in_flight.analysis = Some(tokio::spawn(async move {
            let result = run_call(Endpoint::Analysis, async move {
                backend.analyze(&call_query).await
            })
            .await;
            let _ = events.send(TaskEvent::Analysis {
                generation,
                query,
                result,
            });
        }));
    }

    fn spawn_headline(&mut self, query: BusinessQuery) {
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();
        let generation = self.generation;
        self.in_flight.headline = Some(tokio::spawn(async move {
            let result = run_call(Endpoint::Headline, async move {
                backend.regenerate_headline(&query).await
            })
            .await;
            let _ = events.send(TaskEvent::Headline { generation, result });
        }));
    }

    fn schedule_flip(&mut self) {
        if self.session.display_flipped || self.in_flight.flip.is_some() {
            return;
        }
        let events = self.events_tx.clone();
        let generation = self.generation;
        let delay = self.options.flip_delay;
        self.in_flight.flip = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(TaskEvent::FlipElapsed { generation });
        }));
    }

    fn apply(&mut self, event: TaskEvent) -> Option<SessionUpdate> {
        if event.generation() != self.generation {
            debug!(
                task = event.label(),
                stale_generation = event.generation(),
                generation = self.generation,
                "discarding stale task result"
            );
            return None;
        }

        match event {
            TaskEvent::Analysis { query, result, .. } => {
                self.in_flight.analysis = None;
                self.finish_analysis(query, result)
            }
            TaskEvent::Headline { result, .. } => {
                self.in_flight.headline = None;
                self.finish_headline(result)
            }
            TaskEvent::FlipElapsed { .. } => {
                self.in_flight.flip = None;
                if self.session.display_flipped || self.session.report.is_none() {
                    return None;
                }
                self.session.display_flipped = true;
                Some(SessionUpdate::DisplayFlipped)
            }
        }
    }

    fn finish_analysis(
        &mut self,
        query: BusinessQuery,
        result: Result<BusinessAnalysis, RequestFailure>,
    ) -> Option<SessionUpdate> {
        match result {
            Ok(analysis) => {
                self.session.phase = self.session.phase.next(PhaseEvent::AnalysisSucceeded)?;
                info!(
                    generation = self.generation,
                    rating = analysis.rating,
                    reviews = analysis.reviews,
                    "business analysis ready"
                );
                self.session.report = Some(Report::from_analysis(&query, analysis));
                self.schedule_flip();
                Some(SessionUpdate::ReportReady)
            }
            Err(err) => {
                warn!(generation = self.generation, error = %err, "business analysis failed");
                self.session.phase = self.session.phase.next(PhaseEvent::AnalysisFailed)?;
                self.session.notice = Some(Notice::analysis_failed());
                Some(SessionUpdate::AnalysisFailed)
            }
        }
    }

    fn finish_headline(&mut self, result: Result<String, RequestFailure>) -> Option<SessionUpdate> {
        self.session.phase = self.session.phase.next(PhaseEvent::HeadlineSettled)?;
        match result {
            Ok(headline) => {
                let report = self.session.report.as_mut()?;
                info!(generation = self.generation, headline = %headline, "headline regenerated");
                report.replace_headline(headline);
                Some(SessionUpdate::HeadlineRegenerated)
            }
            Err(err) => {
                warn!(generation = self.generation, error = %err, "headline regeneration failed");
                self.session.notice = Some(Notice::regeneration_failed());
                Some(SessionUpdate::HeadlineFailed)
            }
        }
    }
}

// The call runs on its own task so a panic inside the backend still produces a
// result. Dropping the set aborts the call when the outer task is aborted.
async fn run_call<T, F>(endpoint: Endpoint, call: F) -> Result<T, RequestFailure>
where
    T: Send + 'static,
    F: Future<Output = Result<T, RequestFailure>> + Send + 'static,
{
    let mut calls = JoinSet::new();
    calls.spawn(call);
    match calls.join_next().await {
        Some(Ok(result)) => result,
        Some(Err(err)) => {
            warn!(%endpoint, error = %err, "backend call did not complete");
            Err(RequestFailure::Crashed { endpoint })
        }
        None => Err(RequestFailure::Crashed { endpoint }),
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.in_flight.abort_all();
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
