// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use bizeval_app::{
    EvaluationRequest, EvaluationResult, GENERIC_FAILURE_MESSAGE, SuggestionCategory,
};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Non-2xx answer from the evaluation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub status: u16,
    pub detail: Option<String>,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "server error ({}): {detail}", self.status),
            None => write!(f, "server returned {}", self.status),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Message to show the user for a failed evaluation: the service's `detail`
/// when it sent one, the generic fallback for everything else.
pub fn failure_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<ServiceError>() {
        Some(ServiceError {
            detail: Some(detail),
            ..
        }) => detail.clone(),
        _ => GENERIC_FAILURE_MESSAGE.to_owned(),
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn list_suggestions(&self, category: SuggestionCategory) -> Result<Vec<String>> {
        let url = format!("{}{}", self.base_url, category.path());
        log::debug!("fetching {} from {url}", category.as_str());
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        response
            .json::<Vec<String>>()
            .with_context(|| format!("decode {} list", category.as_str()))
    }

    pub fn list_locations(&self) -> Result<Vec<String>> {
        self.list_suggestions(SuggestionCategory::Locations)
    }

    pub fn list_business_ideas(&self) -> Result<Vec<String>> {
        self.list_suggestions(SuggestionCategory::BusinessIdeas)
    }

    pub fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationResult> {
        log::debug!(
            "POST {}/evaluate business_idea={:?} location={:?}",
            self.base_url,
            request.business_idea,
            request.location
        );
        let response = self
            .http
            .post(format!("{}/evaluate", self.base_url))
            .json(request)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let body = response.text().context("read evaluation response")?;
        serde_json::from_str(&body).context("decode evaluation response")
    }

    /// Probes both suggestion endpoints.
    pub fn ping(&self) -> Result<()> {
        for category in SuggestionCategory::ALL {
            let items = self
                .list_suggestions(category)
                .with_context(|| format!("probe {}", category.path()))?;
            log::info!("{} lists {} {}", self.base_url, items.len(), category.as_str());
        }
        Ok(())
    }
}

/// Validates an http(s) base URL and trims trailing slashes.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("api.base_url must not be empty");
    }
    let parsed = Url::parse(trimmed).with_context(|| format!("invalid api.base_url {trimmed:?}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "api.base_url must use http or https, got {:?}",
            parsed.scheme()
        );
    }
    if parsed.host_str().is_none() {
        bail!("api.base_url {trimmed:?} has no host");
    }
    Ok(trimmed.to_owned())
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("request to {base_url} timed out ({error})");
    }
    anyhow!("cannot reach {base_url} -- is the evaluation service running? ({error})")
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    let detail = serde_json::from_str::<DetailEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.detail)
        .and_then(Detail::into_message);

    anyhow::Error::new(ServiceError {
        status: status.as_u16(),
        detail,
    })
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    detail: Option<Detail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Validation(Vec<ValidationItem>),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct ValidationItem {
    msg: String,
}

impl Detail {
    fn into_message(self) -> Option<String> {
        let message = match self {
            Self::Message(message) => message,
            Self::Validation(items) => items
                .into_iter()
                .map(|item| item.msg)
                .filter(|msg| !msg.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
            Self::Other(_) => return None,
        };
        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }
}
