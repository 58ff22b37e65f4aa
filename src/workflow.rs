//! Client workflow: upload → review → supplement → result.
//!
//! One request at a time. Every request is issued a [`RequestTicket`]
//! stamped with the workflow generation; a reset bumps the generation so a
//! response arriving afterwards is recognised as stale and dropped.

use crate::models::BloodGasReading;
use crate::pipeline::decision::DecisionResponse;

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkflowError {
    #[error("A request is already in progress")]
    InFlight,
    #[error("Cannot {action} while in the {from} stage")]
    InvalidTransition { from: Stage, action: &'static str },
    #[error("The report reading has no values")]
    EmptyReading,
}

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Upload,
    Review,
    Supplement,
    Result,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Review => "review",
            Self::Supplement => "supplement",
            Self::Result => "result",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Extraction,
    Analysis,
}

/// Proof that a request was started. Consumed by the matching `complete_*`.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    kind: RequestKind,
}

impl RequestTicket {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

/// Outcome of delivering a response to the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The workflow was reset after the ticket was issued; the response was dropped.
    Stale,
}

// ═══════════════════════════════════════════════════════════
// Workflow
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct Workflow {
    stage: Stage,
    error: Option<String>,
    in_flight: Option<RequestKind>,
    generation: u64,
    reading: Option<BloodGasReading>,
    response: Option<DecisionResponse>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Error overlay shown on top of the current stage.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn in_flight(&self) -> Option<RequestKind> {
        self.in_flight
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn reading(&self) -> Option<&BloodGasReading> {
        self.reading.as_ref()
    }

    pub fn response(&self) -> Option<&DecisionResponse> {
        self.response.as_ref()
    }

    /// A report photo was chosen. Allowed again in review to pick another file.
    pub fn select_file(&mut self) -> Result<(), WorkflowError> {
        self.ensure_idle()?;
        self.require(&[Stage::Upload, Stage::Review], "select a file")?;
        self.error = None;
        self.enter(Stage::Review);
        Ok(())
    }

    pub fn begin_extraction(&mut self) -> Result<RequestTicket, WorkflowError> {
        self.ensure_idle()?;
        self.require(&[Stage::Review], "start extraction")?;
        Ok(self.issue(RequestKind::Extraction))
    }

    /// Deliver the OCR outcome. A reading without values counts as a failure.
    pub fn complete_extraction(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<BloodGasReading, String>,
    ) -> Completion {
        if !self.accept(&ticket, RequestKind::Extraction) {
            return Completion::Stale;
        }
        match outcome {
            Ok(reading) if !reading.is_empty() => {
                self.reading = Some(reading);
                self.error = None;
                self.enter(Stage::Supplement);
            }
            Ok(_) => self.error = Some(WorkflowError::EmptyReading.to_string()),
            Err(message) => self.error = Some(message),
        }
        Completion::Applied
    }

    /// Replace the reviewed reading before analysis.
    pub fn edit_reading(&mut self, reading: BloodGasReading) -> Result<(), WorkflowError> {
        self.ensure_idle()?;
        self.require(&[Stage::Supplement], "edit the reading")?;
        if reading.is_empty() {
            return Err(WorkflowError::EmptyReading);
        }
        self.reading = Some(reading);
        Ok(())
    }

    pub fn begin_analysis(&mut self) -> Result<RequestTicket, WorkflowError> {
        self.ensure_idle()?;
        self.require(&[Stage::Supplement], "start analysis")?;
        Ok(self.issue(RequestKind::Analysis))
    }

    pub fn complete_analysis(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<DecisionResponse, String>,
    ) -> Completion {
        if !self.accept(&ticket, RequestKind::Analysis) {
            return Completion::Stale;
        }
        match outcome {
            Ok(response) => {
                self.response = Some(response);
                self.error = None;
                self.enter(Stage::Result);
            }
            Err(message) => self.error = Some(message),
        }
        Completion::Applied
    }

    /// Back to upload from any stage. Outstanding tickets become stale.
    pub fn reset(&mut self) {
        let generation = self.generation.wrapping_add(1);
        *self = Self {
            generation,
            ..Self::default()
        };
        tracing::debug!(generation, "Workflow reset");
    }

    fn ensure_idle(&self) -> Result<(), WorkflowError> {
        match self.in_flight {
            Some(_) => Err(WorkflowError::InFlight),
            None => Ok(()),
        }
    }

    fn require(&self, allowed: &[Stage], action: &'static str) -> Result<(), WorkflowError> {
        let from = self.stage();
        if allowed.contains(&from) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition { from, action })
        }
    }

    fn issue(&mut self, kind: RequestKind) -> RequestTicket {
        self.in_flight = Some(kind);
        RequestTicket {
            generation: self.generation,
            kind,
        }
    }

    /// Whether the ticket belongs to the outstanding request of this generation.
    fn accept(&mut self, ticket: &RequestTicket, kind: RequestKind) -> bool {
        if ticket.generation != self.generation
            || ticket.kind != kind
            || self.in_flight != Some(kind)
        {
            tracing::debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "Dropping stale response"
            );
            return false;
        }
        self.in_flight = None;
        true
    }

    fn enter(&mut self, stage: Stage) {
        tracing::debug!(from = %self.stage(), to = %stage, "Workflow transition");
        self.stage = stage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisRequest, BloodGasField, PatientContext};
    use crate::pipeline::correction::{compute_corrections, CorrectionConfig};
    use crate::pipeline::decision::compose;
    use crate::pipeline::structuring::StructuringError;

    fn reading() -> BloodGasReading {
        BloodGasReading::default().with(BloodGasField::Ph, 7.31)
    }

    fn response() -> DecisionResponse {
        let cfg = CorrectionConfig::default();
        let request =
            AnalysisRequest::from_parts(reading(), None, None, PatientContext::new(None, 100.0));
        let corrections = compute_corrections(&request, &cfg);
        compose(&request, corrections, Err(StructuringError::MissingApiKey), "m", &cfg)
    }

    fn at_supplement() -> Workflow {
        let mut wf = Workflow::new();
        wf.select_file().unwrap();
        let ticket = wf.begin_extraction().unwrap();
        assert_eq!(wf.complete_extraction(ticket, Ok(reading())), Completion::Applied);
        wf
    }

    #[test]
    fn happy_path_reaches_result() {
        let mut wf = at_supplement();
        assert_eq!(wf.stage(), Stage::Supplement);
        let ticket = wf.begin_analysis().unwrap();
        assert_eq!(wf.in_flight(), Some(RequestKind::Analysis));
        assert_eq!(wf.complete_analysis(ticket, Ok(response())), Completion::Applied);
        assert_eq!(wf.stage(), Stage::Result);
        assert!(wf.response().is_some());
        assert!(wf.in_flight().is_none());
    }

    #[test]
    fn stages_cannot_be_skipped() {
        let mut wf = Workflow::new();
        assert_eq!(
            wf.begin_extraction(),
            Err(WorkflowError::InvalidTransition {
                from: Stage::Upload,
                action: "start extraction"
            })
        );
        assert!(wf.begin_analysis().is_err());
        wf.select_file().unwrap();
        assert!(wf.begin_analysis().is_err());
    }

    #[test]
    fn failed_extraction_stays_on_review_with_error() {
        let mut wf = Workflow::new();
        wf.select_file().unwrap();
        let ticket = wf.begin_extraction().unwrap();
        wf.complete_extraction(ticket, Err("OCR service unavailable".into()));
        assert_eq!(wf.stage(), Stage::Review);
        assert_eq!(wf.error(), Some("OCR service unavailable"));

        // Retry clears the overlay on success.
        let ticket = wf.begin_extraction().unwrap();
        wf.complete_extraction(ticket, Ok(reading()));
        assert_eq!(wf.stage(), Stage::Supplement);
        assert!(wf.error().is_none());
    }

    #[test]
    fn empty_reading_does_not_reach_supplement() {
        let mut wf = Workflow::new();
        wf.select_file().unwrap();
        let ticket = wf.begin_extraction().unwrap();
        wf.complete_extraction(ticket, Ok(BloodGasReading::default()));
        assert_eq!(wf.stage(), Stage::Review);
        assert!(wf.error().is_some());
    }

    #[test]
    fn resubmission_while_in_flight_is_rejected() {
        let mut wf = at_supplement();
        let _ticket = wf.begin_analysis().unwrap();
        assert_eq!(wf.begin_analysis(), Err(WorkflowError::InFlight));
        assert_eq!(wf.edit_reading(reading()), Err(WorkflowError::InFlight));
    }

    #[test]
    fn response_after_reset_is_stale() {
        let mut wf = at_supplement();
        let ticket = wf.begin_analysis().unwrap();
        wf.reset();
        assert_eq!(wf.stage(), Stage::Upload);
        assert_eq!(wf.generation(), 1);
        assert_eq!(wf.complete_analysis(ticket, Ok(response())), Completion::Stale);
        assert_eq!(wf.stage(), Stage::Upload);
        assert!(wf.response().is_none());
        assert!(wf.reading().is_none());
    }

    #[test]
    fn stale_ticket_does_not_clear_new_request() {
        let mut wf = Workflow::new();
        wf.select_file().unwrap();
        let old = wf.begin_extraction().unwrap();
        wf.reset();
        wf.select_file().unwrap();
        let _current = wf.begin_extraction().unwrap();
        assert_eq!(wf.complete_extraction(old, Ok(reading())), Completion::Stale);
        assert_eq!(wf.in_flight(), Some(RequestKind::Extraction));
        assert_eq!(wf.stage(), Stage::Review);
    }

    #[test]
    fn result_is_terminal_until_reset() {
        let mut wf = at_supplement();
        let ticket = wf.begin_analysis().unwrap();
        wf.complete_analysis(ticket, Ok(response()));
        assert!(wf.begin_analysis().is_err());
        assert!(wf.select_file().is_err());
        assert!(wf.edit_reading(reading()).is_err());
        wf.reset();
        assert!(wf.select_file().is_ok());
    }

    #[test]
    fn edit_rejects_empty_reading() {
        let mut wf = at_supplement();
        assert_eq!(
            wf.edit_reading(BloodGasReading::default()),
            Err(WorkflowError::EmptyReading)
        );
        let edited = reading().with(BloodGasField::K, 3.1);
        wf.edit_reading(edited.clone()).unwrap();
        assert_eq!(wf.reading(), Some(&edited));
    }

    #[test]
    fn failed_analysis_keeps_supplement() {
        let mut wf = at_supplement();
        let ticket = wf.begin_analysis().unwrap();
        wf.complete_analysis(ticket, Err("Network error".into()));
        assert_eq!(wf.stage(), Stage::Supplement);
        assert_eq!(wf.error(), Some("Network error"));
        assert!(wf.begin_analysis().is_ok());
    }
}
