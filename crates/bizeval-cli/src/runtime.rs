// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use bizeval_api::{Client, failure_message};
use bizeval_app::{
    EvaluationRequest, EvaluationResult, RequestId, ResultView, SubmissionWorkflow, SubmitOutcome,
    SuggestionCategory, WorkflowState,
};
use bizeval_testkit::EvaluationFaker;
use bizeval_tui::{AppRuntime, InternalEvent};
use std::sync::mpsc::Sender;
use std::thread;
use time::OffsetDateTime;

/// Talks to the evaluation service; each request runs on its own worker
/// thread so the UI loop never blocks on the network.
pub struct ApiRuntime {
    client: Client,
}

impl ApiRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl AppRuntime for ApiRuntime {
    fn fetch_suggestions(&mut self, category: SuggestionCategory) -> Result<Vec<String>> {
        self.client.list_suggestions(category)
    }

    fn evaluate(&mut self, request: &EvaluationRequest) -> Result<EvaluationResult> {
        self.client.evaluate(request)
    }

    fn spawn_suggestion_fetch(
        &mut self,
        category: SuggestionCategory,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name(format!("fetch-{}", category.as_str()))
            .spawn(move || {
                let result = client
                    .list_suggestions(category)
                    .map_err(|error| format!("{error:#}"));
                let _ = tx.send(InternalEvent::Suggestions { category, result });
            })
            .context("spawn suggestion worker")?;
        Ok(())
    }

    fn spawn_evaluation(
        &mut self,
        request_id: RequestId,
        request: &EvaluationRequest,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        let request = request.clone();
        thread::Builder::new()
            .name(format!("evaluate-{}", request_id.get()))
            .spawn(move || {
                let result = client.evaluate(&request).map_err(|error| {
                    log::warn!("evaluation {request_id} failed: {error:#}");
                    failure_message(&error)
                });
                let _ = tx.send(InternalEvent::Evaluation {
                    request_id,
                    result,
                    completed_at: OffsetDateTime::now_utc(),
                });
            })
            .context("spawn evaluation worker")?;
        Ok(())
    }
}

/// Offline backend for `--demo`: fixed suggestion lists and deterministic
/// evaluations.
pub struct DemoRuntime {
    faker: EvaluationFaker,
}

impl DemoRuntime {
    pub fn new(seed: u64) -> Self {
        Self {
            faker: EvaluationFaker::new(seed),
        }
    }
}

impl AppRuntime for DemoRuntime {
    fn fetch_suggestions(&mut self, category: SuggestionCategory) -> Result<Vec<String>> {
        Ok(match category {
            SuggestionCategory::BusinessIdeas => self.faker.business_ideas(),
            SuggestionCategory::Locations => self.faker.locations(),
        })
    }

    fn evaluate(&mut self, request: &EvaluationRequest) -> Result<EvaluationResult> {
        let payload = self
            .faker
            .evaluation(&request.business_idea, &request.location);
        serde_json::from_value(payload).context("decode demo evaluation")
    }
}

/// Runs one evaluation through the submission workflow and returns the
/// plain-text report.
pub fn evaluate_once<R: AppRuntime>(
    runtime: &mut R,
    business_idea: &str,
    location: &str,
) -> Result<String> {
    let mut workflow = SubmissionWorkflow::default();
    let (request_id, request) = match workflow.submit(business_idea, location) {
        SubmitOutcome::Started {
            request_id,
            request,
            ..
        } => (request_id, request),
        SubmitOutcome::Rejected { missing } => bail!("{} is required", missing.label()),
    };

    let outcome = runtime.evaluate(&request).map_err(|error| {
        log::warn!("evaluation {request_id} failed: {error:#}");
        failure_message(&error)
    });
    workflow.resolve(request_id, outcome, OffsetDateTime::now_utc());

    match workflow.state() {
        WorkflowState::Success { result, .. } => Ok(ResultView::from_result(result).to_report()),
        WorkflowState::Failure { message, .. } => Err(anyhow!("{message}")),
        other => bail!("evaluation ended in unexpected state {}", other.label()),
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiRuntime, DemoRuntime, evaluate_once};
    use anyhow::{Result, anyhow};
    use bizeval_api::Client;
    use bizeval_app::{
        EvaluationRequest, GENERIC_FAILURE_MESSAGE, RequestId, SuggestionCategory,
    };
    use bizeval_testkit::full_result_json;
    use bizeval_tui::{AppRuntime, InternalEvent};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tiny_http::{Header, Response, Server};

    fn json_response(body: &str, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
        Response::from_string(body)
            .with_status_code(status)
            .with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            )
    }

    #[test]
    fn demo_runtime_serves_lists_and_decodable_results() -> Result<()> {
        let mut runtime = DemoRuntime::new(7);
        assert!(
            !runtime
                .fetch_suggestions(SuggestionCategory::Locations)?
                .is_empty()
        );
        let result = runtime.evaluate(&EvaluationRequest {
            business_idea: "Bakery".to_owned(),
            location: "Austin, TX".to_owned(),
        })?;
        assert!(!result.rating.is_empty());
        assert!(result.financial_projection.is_some());
        Ok(())
    }

    #[test]
    fn evaluate_once_prints_report_for_demo() -> Result<()> {
        let mut runtime = DemoRuntime::new(7);
        let report = evaluate_once(&mut runtime, "Kite shop", "Tiny town")?;
        assert!(report.starts_with("Assessment: "));
        assert!(report.contains("New location added: Tiny Town"));
        assert!(report.contains("Market Metrics"));
        Ok(())
    }

    #[test]
    fn evaluate_once_rejects_empty_fields() {
        let mut runtime = DemoRuntime::new(7);
        let error = evaluate_once(&mut runtime, "Bakery", "")
            .expect_err("empty location should fail");
        assert_eq!(error.to_string(), "Location is required");
    }

    #[test]
    fn evaluate_once_surfaces_service_detail() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            request
                .respond(json_response(
                    r#"{"detail":"location not recognized"}"#,
                    400,
                ))
                .expect("response should succeed");
        });

        let mut runtime = ApiRuntime::new(Client::new(&addr, Duration::from_secs(1))?);
        let error = evaluate_once(&mut runtime, "Bakery", "Atlantis")
            .expect_err("400 should fail");
        assert_eq!(error.to_string(), "location not recognized");

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn evaluate_once_uses_fallback_when_unreachable() -> Result<()> {
        let mut runtime =
            ApiRuntime::new(Client::new("http://127.0.0.1:1", Duration::from_millis(50))?);
        let error = evaluate_once(&mut runtime, "Bakery", "Austin")
            .expect_err("unreachable service should fail");
        assert_eq!(error.to_string(), GENERIC_FAILURE_MESSAGE);
        Ok(())
    }

    #[test]
    fn api_runtime_posts_worker_results_to_channel() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());
        let handle = thread::spawn(move || {
            for _ in 0..2 {
                let request = server.recv().expect("request expected");
                let body = match request.url() {
                    "/locations" => r#"["Austin, TX"]"#,
                    "/evaluate" => full_result_json(),
                    other => panic!("unexpected path {other}"),
                };
                request
                    .respond(json_response(body, 200))
                    .expect("response should succeed");
            }
        });

        let mut runtime = ApiRuntime::new(Client::new(&addr, Duration::from_secs(1))?);
        let (tx, rx) = mpsc::channel();
        runtime.spawn_suggestion_fetch(SuggestionCategory::Locations, tx.clone())?;
        let event = rx.recv_timeout(Duration::from_secs(2))?;
        assert_eq!(
            event,
            InternalEvent::Suggestions {
                category: SuggestionCategory::Locations,
                result: Ok(vec!["Austin, TX".to_owned()]),
            }
        );

        runtime.spawn_evaluation(
            RequestId::new(3),
            &EvaluationRequest {
                business_idea: "Coffee cart".to_owned(),
                location: "Austin".to_owned(),
            },
            tx,
        )?;
        match rx.recv_timeout(Duration::from_secs(2))? {
            InternalEvent::Evaluation {
                request_id, result, ..
            } => {
                assert_eq!(request_id, RequestId::new(3));
                let result = result.map_err(|message| anyhow!(message))?;
                assert_eq!(result.rating, "Promising");
            }
            other => panic!("unexpected event {other:?}"),
        }

        handle.join().expect("server thread should join");
        Ok(())
    }
}
