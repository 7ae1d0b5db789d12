// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

use crate::{EvaluationRequest, EvaluationResult, FormField, RequestId};

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Idle,
    Loading {
        request_id: RequestId,
        request: EvaluationRequest,
    },
    Success {
        request_id: RequestId,
        result: Box<EvaluationResult>,
        completed_at: OffsetDateTime,
    },
    Failure {
        request_id: RequestId,
        message: String,
    },
}

impl WorkflowState {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading { .. } => "loading",
            Self::Success { .. } => "success",
            Self::Failure { .. } => "failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Started {
        request_id: RequestId,
        request: EvaluationRequest,
        superseded: Option<RequestId>,
    },
    Rejected {
        missing: FormField,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

/// Drives one evaluation at a time through `Idle → Loading → Success | Failure`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionWorkflow {
    state: WorkflowState,
    last_issued: RequestId,
    last_request: Option<EvaluationRequest>,
}

impl Default for SubmissionWorkflow {
    fn default() -> Self {
        Self {
            state: WorkflowState::Idle,
            last_issued: RequestId::new(0),
            last_request: None,
        }
    }
}

impl SubmissionWorkflow {
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, WorkflowState::Loading { .. })
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        match &self.state {
            WorkflowState::Loading { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&EvaluationResult> {
        match &self.state {
            WorkflowState::Success { result, .. } => Some(result.as_ref()),
            _ => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Failure { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn last_request(&self) -> Option<&EvaluationRequest> {
        self.last_request.as_ref()
    }

    /// Starts a request for the given field values. Empty values leave the
    /// state untouched; whitespace counts as a value.
    pub fn submit(&mut self, business_idea: &str, location: &str) -> SubmitOutcome {
        if business_idea.is_empty() {
            return SubmitOutcome::Rejected {
                missing: FormField::BusinessIdea,
            };
        }
        if location.is_empty() {
            return SubmitOutcome::Rejected {
                missing: FormField::Location,
            };
        }

        self.start(EvaluationRequest {
            business_idea: business_idea.to_owned(),
            location: location.to_owned(),
        })
    }

    /// Re-sends the last request snapshot after a failure.
    pub fn retry(&mut self) -> Option<SubmitOutcome> {
        if !matches!(self.state, WorkflowState::Failure { .. }) {
            return None;
        }
        let request = self.last_request.clone()?;
        Some(self.start(request))
    }

    /// Applies the outcome of `request_id` if it is still the request in
    /// flight; anything else is dropped.
    pub fn resolve(
        &mut self,
        request_id: RequestId,
        outcome: Result<EvaluationResult, String>,
        completed_at: OffsetDateTime,
    ) -> Resolution {
        if self.in_flight() != Some(request_id) {
            log::debug!("dropping stale evaluation response {request_id}");
            return Resolution::Stale;
        }

        self.state = match outcome {
            Ok(result) => {
                log::info!("evaluation {request_id} rated {:?}", result.rating);
                WorkflowState::Success {
                    request_id,
                    result: Box::new(result),
                    completed_at,
                }
            }
            Err(message) => {
                let message = if message.trim().is_empty() {
                    GENERIC_FAILURE_MESSAGE.to_owned()
                } else {
                    message
                };
                log::warn!("evaluation {request_id} failed: {message}");
                WorkflowState::Failure {
                    request_id,
                    message,
                }
            }
        };
        Resolution::Applied
    }

    fn start(&mut self, request: EvaluationRequest) -> SubmitOutcome {
        let superseded = self.in_flight();
        self.last_issued = self.last_issued.next();
        let request_id = self.last_issued;
        log::debug!(
            "sending evaluation {request_id}: business_idea={:?} location={:?}",
            request.business_idea,
            request.location
        );

        self.last_request = Some(request.clone());
        self.state = WorkflowState::Loading {
            request_id,
            request: request.clone(),
        };
        SubmitOutcome::Started {
            request_id,
            request,
            superseded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        GENERIC_FAILURE_MESSAGE, Resolution, SubmissionWorkflow, SubmitOutcome, WorkflowState,
    };
    use crate::{EvaluationRequest, EvaluationResult, FormField, RequestId};
    use time::OffsetDateTime;

    fn started_id(outcome: SubmitOutcome) -> RequestId {
        match outcome {
            SubmitOutcome::Started { request_id, .. } => request_id,
            SubmitOutcome::Rejected { missing } => panic!("submit rejected for {missing:?}"),
        }
    }

    #[test]
    fn starts_idle() {
        let workflow = SubmissionWorkflow::default();
        assert_eq!(workflow.state(), &WorkflowState::Idle);
        assert_eq!(workflow.in_flight(), None);
    }

    #[test]
    fn empty_fields_are_rejected_without_state_change() {
        let mut workflow = SubmissionWorkflow::default();
        assert_eq!(
            workflow.submit("", "Austin"),
            SubmitOutcome::Rejected {
                missing: FormField::BusinessIdea,
            }
        );
        assert_eq!(
            workflow.submit("Food truck", ""),
            SubmitOutcome::Rejected {
                missing: FormField::Location,
            }
        );
        assert_eq!(workflow.state(), &WorkflowState::Idle);
        assert_eq!(workflow.last_request(), None);
    }

    #[test]
    fn whitespace_only_fields_are_submitted_verbatim() {
        let mut workflow = SubmissionWorkflow::default();
        started_id(workflow.submit("Food truck", "   "));
        assert!(matches!(workflow.state(), WorkflowState::Loading { .. }));
        assert_eq!(
            workflow.last_request().map(|request| request.location.as_str()),
            Some("   ")
        );
    }

    #[test]
    fn rejected_submit_keeps_prior_result() {
        let mut workflow = SubmissionWorkflow::default();
        let id = started_id(workflow.submit("Food truck", "Austin"));
        workflow.resolve(
            id,
            Ok(EvaluationResult::new("Promising", "Good fit")),
            OffsetDateTime::UNIX_EPOCH,
        );

        workflow.submit("", "Austin");
        assert_eq!(
            workflow.result().map(|result| result.rating.as_str()),
            Some("Promising")
        );
    }

    #[test]
    fn submit_snapshots_request_and_enters_loading() {
        let mut workflow = SubmissionWorkflow::default();
        let outcome = workflow.submit("Food truck", "Austin");
        let expected_request = EvaluationRequest {
            business_idea: "Food truck".to_owned(),
            location: "Austin".to_owned(),
        };
        assert_eq!(
            outcome,
            SubmitOutcome::Started {
                request_id: RequestId::new(1),
                request: expected_request.clone(),
                superseded: None,
            }
        );
        assert_eq!(
            workflow.state(),
            &WorkflowState::Loading {
                request_id: RequestId::new(1),
                request: expected_request,
            }
        );
    }

    #[test]
    fn success_and_failure_are_terminal_and_exclusive() {
        let mut workflow = SubmissionWorkflow::default();
        let id = started_id(workflow.submit("Food truck", "Austin"));
        assert_eq!(
            workflow.resolve(
                id,
                Ok(EvaluationResult::new("Promising", "Good fit")),
                OffsetDateTime::UNIX_EPOCH,
            ),
            Resolution::Applied
        );
        assert!(workflow.result().is_some());
        assert!(workflow.failure_message().is_none());

        assert_eq!(
            workflow.resolve(id, Err("late".to_owned()), OffsetDateTime::UNIX_EPOCH),
            Resolution::Stale
        );
        assert!(workflow.result().is_some());
    }

    #[test]
    fn failure_keeps_detail_verbatim_and_falls_back_when_blank() {
        let mut workflow = SubmissionWorkflow::default();
        let id = started_id(workflow.submit("Food truck", "Atlantis"));
        workflow.resolve(
            id,
            Err("location not recognized".to_owned()),
            OffsetDateTime::UNIX_EPOCH,
        );
        assert_eq!(workflow.failure_message(), Some("location not recognized"));

        let id = started_id(workflow.submit("Food truck", "Atlantis"));
        workflow.resolve(id, Err(String::new()), OffsetDateTime::UNIX_EPOCH);
        assert_eq!(workflow.failure_message(), Some(GENERIC_FAILURE_MESSAGE));
    }

    #[test]
    fn new_submit_discards_previous_outcome_immediately() {
        let mut workflow = SubmissionWorkflow::default();
        let id = started_id(workflow.submit("Food truck", "Atlantis"));
        workflow.resolve(id, Err("nope".to_owned()), OffsetDateTime::UNIX_EPOCH);

        workflow.submit("Food truck", "Austin");
        assert!(workflow.is_loading());
        assert!(workflow.failure_message().is_none());
        assert!(workflow.result().is_none());
    }

    #[test]
    fn superseded_request_resolution_is_dropped() {
        let mut workflow = SubmissionWorkflow::default();
        let first = started_id(workflow.submit("Food truck", "Austin"));
        let second = workflow.submit("Bakery", "Boston");
        let SubmitOutcome::Started {
            request_id: second,
            superseded,
            ..
        } = second
        else {
            panic!("second submit should start");
        };
        assert_eq!(superseded, Some(first));

        assert_eq!(
            workflow.resolve(
                first,
                Ok(EvaluationResult::new("Stale", "old")),
                OffsetDateTime::UNIX_EPOCH,
            ),
            Resolution::Stale
        );
        assert_eq!(workflow.in_flight(), Some(second));

        workflow.resolve(
            second,
            Ok(EvaluationResult::new("Fresh", "new")),
            OffsetDateTime::UNIX_EPOCH,
        );
        assert_eq!(
            workflow.result().map(|result| result.rating.as_str()),
            Some("Fresh")
        );
    }

    #[test]
    fn retry_resends_last_snapshot_only_after_failure() {
        let mut workflow = SubmissionWorkflow::default();
        assert_eq!(workflow.retry(), None);

        let id = started_id(workflow.submit("Food truck", "Austin"));
        assert_eq!(workflow.retry(), None);

        workflow.resolve(id, Err("timeout".to_owned()), OffsetDateTime::UNIX_EPOCH);
        let retried = workflow.retry().expect("retry after failure");
        let SubmitOutcome::Started {
            request_id,
            request,
            superseded,
        } = retried
        else {
            panic!("retry should start a request");
        };
        assert!(request_id > id);
        assert_eq!(request.location, "Austin");
        assert_eq!(superseded, None);
    }
}
