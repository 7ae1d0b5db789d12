// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

use crate::{
    EvaluationRequest, EvaluationResult, FieldState, FormField, RequestId, Resolution,
    SubmissionWorkflow, SubmitOutcome, SuggestionCategory, Typeahead, TypeaheadEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuggestionStatus {
    #[default]
    Pending,
    Ready(usize),
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub focus: FormField,
    pub business_idea: Typeahead<String>,
    pub location: Typeahead<String>,
    pub business_idea_field: FieldState,
    pub location_field: FieldState,
    pub workflow: SubmissionWorkflow,
    pub business_idea_suggestions: SuggestionStatus,
    pub location_suggestions: SuggestionStatus,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            focus: FormField::BusinessIdea,
            business_idea: Typeahead::default(),
            location: Typeahead::default(),
            business_idea_field: FieldState::default(),
            location_field: FieldState::default(),
            workflow: SubmissionWorkflow::default(),
            business_idea_suggestions: SuggestionStatus::Pending,
            location_suggestions: SuggestionStatus::Pending,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    FocusNext,
    FocusPrev,
    InsertChar(char),
    Backspace,
    ClearField,
    HighlightNext,
    HighlightPrev,
    AcceptHighlight,
    SelectSuggestion(String),
    OpenPanel,
    ClosePanel,
    Submit,
    Retry,
    SuggestionsLoaded {
        category: SuggestionCategory,
        items: Vec<String>,
    },
    SuggestionsFailed {
        category: SuggestionCategory,
        error: String,
    },
    EvaluationResolved {
        request_id: RequestId,
        outcome: Result<EvaluationResult, String>,
        completed_at: OffsetDateTime,
    },
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    FocusChanged(FormField),
    FieldEdited {
        field: FormField,
        text: String,
        open: bool,
    },
    SuggestionCommitted {
        field: FormField,
        value: String,
    },
    PanelToggled {
        field: FormField,
        open: bool,
    },
    SuggestionsReady {
        category: SuggestionCategory,
        count: usize,
    },
    SuggestionsUnavailable {
        category: SuggestionCategory,
    },
    EvaluationStarted {
        request_id: RequestId,
        request: EvaluationRequest,
        superseded: Option<RequestId>,
    },
    SubmitRejected {
        missing: FormField,
    },
    EvaluationSucceeded(RequestId),
    EvaluationFailed {
        request_id: RequestId,
        message: String,
    },
    StaleResponseDropped(RequestId),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn typeahead(&self, field: FormField) -> &Typeahead<String> {
        match field {
            FormField::BusinessIdea => &self.business_idea,
            FormField::Location => &self.location,
        }
    }

    pub fn field(&self, field: FormField) -> &FieldState {
        match field {
            FormField::BusinessIdea => &self.business_idea_field,
            FormField::Location => &self.location_field,
        }
    }

    pub fn suggestion_status(&self, category: SuggestionCategory) -> SuggestionStatus {
        match category {
            SuggestionCategory::BusinessIdeas => self.business_idea_suggestions,
            SuggestionCategory::Locations => self.location_suggestions,
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::FocusNext | AppCommand::FocusPrev => {
                self.typeahead_mut(self.focus).close();
                self.sync_open(self.focus);
                self.focus = self.focus.other();
                vec![AppEvent::FocusChanged(self.focus)]
            }
            AppCommand::InsertChar(ch) => {
                let event = self.typeahead_mut(self.focus).insert_char(ch);
                vec![self.apply_field_event(self.focus, event)]
            }
            AppCommand::Backspace => {
                let event = self.typeahead_mut(self.focus).backspace();
                vec![self.apply_field_event(self.focus, event)]
            }
            AppCommand::ClearField => {
                let event = self.typeahead_mut(self.focus).clear();
                vec![self.apply_field_event(self.focus, event)]
            }
            AppCommand::HighlightNext => {
                let control = self.typeahead_mut(self.focus);
                if !control.is_open() {
                    control.open();
                    let open = self.sync_open(self.focus);
                    return vec![AppEvent::PanelToggled {
                        field: self.focus,
                        open,
                    }];
                }
                control.highlight_next();
                Vec::new()
            }
            AppCommand::HighlightPrev => {
                self.typeahead_mut(self.focus).highlight_prev();
                Vec::new()
            }
            AppCommand::AcceptHighlight => {
                let Some(event) = self.typeahead_mut(self.focus).select_highlighted() else {
                    return Vec::new();
                };
                vec![self.apply_field_event(self.focus, event)]
            }
            AppCommand::SelectSuggestion(value) => {
                let event = self.typeahead_mut(self.focus).on_select(&value);
                vec![self.apply_field_event(self.focus, event)]
            }
            AppCommand::OpenPanel => {
                self.typeahead_mut(self.focus).open();
                let open = self.sync_open(self.focus);
                vec![AppEvent::PanelToggled {
                    field: self.focus,
                    open,
                }]
            }
            AppCommand::ClosePanel => {
                self.typeahead_mut(self.focus).close();
                self.sync_open(self.focus);
                vec![AppEvent::PanelToggled {
                    field: self.focus,
                    open: false,
                }]
            }
            AppCommand::Submit => {
                for field in FormField::ALL {
                    self.typeahead_mut(field).close();
                    self.sync_open(field);
                }
                let outcome = self.workflow.submit(
                    &self.business_idea_field.text,
                    &self.location_field.text,
                );
                self.apply_submit_outcome(outcome)
            }
            AppCommand::Retry => match self.workflow.retry() {
                Some(outcome) => self.apply_submit_outcome(outcome),
                None => vec![self.set_status("nothing to retry")],
            },
            AppCommand::SuggestionsLoaded { category, items } => {
                let count = items.len();
                let field = category.field();
                self.typeahead_mut(field).set_items(items);
                self.sync_open(field);
                *self.suggestion_status_mut(category) = SuggestionStatus::Ready(count);
                log::debug!("loaded {count} {}", category.as_str());
                vec![AppEvent::SuggestionsReady { category, count }]
            }
            AppCommand::SuggestionsFailed { category, error } => {
                *self.suggestion_status_mut(category) = SuggestionStatus::Unavailable;
                log::warn!("error fetching {}: {error}", category.as_str());
                vec![AppEvent::SuggestionsUnavailable { category }]
            }
            AppCommand::EvaluationResolved {
                request_id,
                outcome,
                completed_at,
            } => match self.workflow.resolve(request_id, outcome, completed_at) {
                Resolution::Stale => vec![AppEvent::StaleResponseDropped(request_id)],
                Resolution::Applied => match self.workflow.failure_message() {
                    Some(message) => {
                        let message = message.to_owned();
                        vec![
                            AppEvent::EvaluationFailed {
                                request_id,
                                message: message.clone(),
                            },
                            self.set_status(&format!("evaluation failed: {message}")),
                        ]
                    }
                    None => vec![
                        AppEvent::EvaluationSucceeded(request_id),
                        self.set_status("evaluation complete"),
                    ],
                },
            },
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn apply_submit_outcome(&mut self, outcome: SubmitOutcome) -> Vec<AppEvent> {
        match outcome {
            SubmitOutcome::Rejected { missing } => {
                self.focus = missing;
                vec![
                    AppEvent::SubmitRejected { missing },
                    AppEvent::FocusChanged(missing),
                    self.set_status(&format!("{} is required", missing.label())),
                ]
            }
            SubmitOutcome::Started {
                request_id,
                request,
                superseded,
            } => {
                let status = if superseded.is_some() {
                    "previous evaluation superseded"
                } else {
                    "evaluating"
                };
                vec![
                    AppEvent::EvaluationStarted {
                        request_id,
                        request,
                        superseded,
                    },
                    self.set_status(status),
                ]
            }
        }
    }

    fn apply_field_event(&mut self, field: FormField, event: TypeaheadEvent) -> AppEvent {
        let state = self.field_mut(field);
        match event {
            TypeaheadEvent::Edited { text, open } => {
                state.text = text.clone();
                state.is_open = open;
                AppEvent::FieldEdited { field, text, open }
            }
            TypeaheadEvent::Committed { value } => {
                state.text = value.clone();
                state.is_open = false;
                AppEvent::SuggestionCommitted { field, value }
            }
        }
    }

    fn sync_open(&mut self, field: FormField) -> bool {
        let open = self.typeahead(field).is_open();
        self.field_mut(field).is_open = open;
        open
    }

    fn typeahead_mut(&mut self, field: FormField) -> &mut Typeahead<String> {
        match field {
            FormField::BusinessIdea => &mut self.business_idea,
            FormField::Location => &mut self.location,
        }
    }

    fn field_mut(&mut self, field: FormField) -> &mut FieldState {
        match field {
            FormField::BusinessIdea => &mut self.business_idea_field,
            FormField::Location => &mut self.location_field,
        }
    }

    fn suggestion_status_mut(&mut self, category: SuggestionCategory) -> &mut SuggestionStatus {
        match category {
            SuggestionCategory::BusinessIdeas => &mut self.business_idea_suggestions,
            SuggestionCategory::Locations => &mut self.location_suggestions,
        }
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
