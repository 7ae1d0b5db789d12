// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SuggestionCategory {
    BusinessIdeas,
    Locations,
}

impl SuggestionCategory {
    pub const ALL: [Self; 2] = [Self::BusinessIdeas, Self::Locations];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BusinessIdeas => "business ideas",
            Self::Locations => "locations",
        }
    }

    /// Path of the collaborator endpoint serving this list.
    pub const fn path(self) -> &'static str {
        match self {
            Self::BusinessIdeas => "/business-ideas",
            Self::Locations => "/locations",
        }
    }

    pub const fn field(self) -> FormField {
        match self {
            Self::BusinessIdeas => FormField::BusinessIdea,
            Self::Locations => FormField::Location,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    BusinessIdea,
    Location,
}

impl FormField {
    pub const ALL: [Self; 2] = [Self::BusinessIdea, Self::Location];

    pub const fn label(self) -> &'static str {
        match self {
            Self::BusinessIdea => "Business Idea",
            Self::Location => "Location",
        }
    }

    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::BusinessIdea => "Enter your business idea",
            Self::Location => "Enter a location",
        }
    }

    pub const fn category(self) -> SuggestionCategory {
        match self {
            Self::BusinessIdea => SuggestionCategory::BusinessIdeas,
            Self::Location => SuggestionCategory::Locations,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::BusinessIdea => Self::Location,
            Self::Location => Self::BusinessIdea,
        }
    }
}

/// Draft value and suggestion-panel visibility for one input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldState {
    pub text: String,
    pub is_open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub business_idea: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub rating: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_business_idea: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_business_idea_added: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_location_added: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_section",
        skip_serializing_if = "Option::is_none"
    )]
    pub competitors: Option<Vec<Competitor>>,
    #[serde(
        default,
        deserialize_with = "lenient_section",
        skip_serializing_if = "Option::is_none"
    )]
    pub financial_projection: Option<FinancialProjection>,
    #[serde(
        default,
        deserialize_with = "lenient_section",
        skip_serializing_if = "Option::is_none"
    )]
    pub risks: Option<Vec<Risk>>,
    #[serde(
        default,
        deserialize_with = "lenient_section",
        skip_serializing_if = "Option::is_none"
    )]
    pub mitigation_strategies: Option<Vec<MitigationStrategy>>,
    #[serde(
        default,
        deserialize_with = "lenient_section",
        skip_serializing_if = "Option::is_none"
    )]
    pub trend_score: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_section",
        skip_serializing_if = "Option::is_none"
    )]
    pub economic_indicator: Option<f64>,
}

/// Decodes an optional result section, treating a malformed value as absent
/// so the rest of the evaluation still renders.
fn lenient_section<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(raw) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match serde_json::from_value(raw) {
        Ok(section) => Ok(Some(section)),
        Err(error) => {
            log::warn!("ignoring malformed result section: {error}");
            Ok(None)
        }
    }
}

impl EvaluationResult {
    pub fn new(rating: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            rating: rating.into(),
            explanation: explanation.into(),
            corrected_business_idea: None,
            new_business_idea_added: None,
            corrected_location: None,
            new_location_added: None,
            competitors: None,
            financial_projection: None,
            risks: None,
            mitigation_strategies: None,
            trend_score: None,
            economic_indicator: None,
        }
    }

    pub fn business_idea_added(&self) -> bool {
        self.new_business_idea_added.unwrap_or(false)
    }

    pub fn location_added(&self) -> bool {
        self.new_location_added.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u64>,
    #[serde(default)]
    pub vicinity: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialProjection {
    pub revenue: f64,
    pub cost_of_goods_sold: f64,
    pub gross_profit: f64,
    pub operational_expenses: f64,
    pub net_profit: f64,
}

impl FinancialProjection {
    pub const LABELS: [&'static str; 5] = [
        "Revenue",
        "COGS",
        "Gross Profit",
        "Op. Expenses",
        "Net Profit",
    ];

    /// Line items in canonical chart order.
    pub const fn values(&self) -> [f64; 5] {
        [
            self.revenue,
            self.cost_of_goods_sold,
            self.gross_profit,
            self.operational_expenses,
            self.net_profit,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub risk: String,
    pub risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MitigationStrategy {
    Text(String),
    Detailed(MitigationDetail),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitigationDetail {
    #[serde(alias = "title", alias = "name")]
    pub strategy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MitigationStrategy {
    pub fn label(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Detailed(detail) => {
                let mut out = String::new();
                if let Some(risk) = detail.risk.as_deref()
                    && !risk.is_empty()
                {
                    out.push_str(risk);
                    out.push_str(": ");
                }
                out.push_str(&detail.strategy);
                if let Some(description) = detail.description.as_deref()
                    && !description.is_empty()
                {
                    out.push_str(" - ");
                    out.push_str(description);
                }
                out
            }
            Self::Other(value) => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EvaluationResult, FormField, MitigationStrategy, SuggestionCategory};
    use anyhow::Result;

    #[test]
    fn minimal_result_decodes_with_every_optional_absent() -> Result<()> {
        let result: EvaluationResult =
            serde_json::from_str(r#"{"rating":"Promising","explanation":"Good fit"}"#)?;
        assert_eq!(result, EvaluationResult::new("Promising", "Good fit"));
        assert!(!result.business_idea_added());
        assert!(!result.location_added());
        Ok(())
    }

    #[test]
    fn null_optionals_are_treated_as_absent() -> Result<()> {
        let result: EvaluationResult = serde_json::from_str(
            r#"{"rating":"Fair","explanation":"x","competitors":null,"risks":null,"trend_score":null,"new_location_added":null}"#,
        )?;
        assert!(result.competitors.is_none());
        assert!(result.risks.is_none());
        assert!(result.trend_score.is_none());
        assert!(!result.location_added());
        Ok(())
    }

    #[test]
    fn missing_required_fields_fail_to_decode() {
        let missing_rating = serde_json::from_str::<EvaluationResult>(r#"{"explanation":"x"}"#);
        assert!(missing_rating.is_err());
        let missing_explanation = serde_json::from_str::<EvaluationResult>(r#"{"rating":"x"}"#);
        assert!(missing_explanation.is_err());
    }

    #[test]
    fn partial_financial_projection_is_dropped_but_assessment_survives() -> Result<()> {
        let result: EvaluationResult = serde_json::from_str(
            r#"{"rating":"Promising","explanation":"Good fit","financial_projection":{"revenue":1000},"trend_score":64}"#,
        )?;
        assert_eq!(result.rating, "Promising");
        assert_eq!(result.explanation, "Good fit");
        assert!(result.financial_projection.is_none());
        assert_eq!(result.trend_score, Some(64.0));
        Ok(())
    }

    #[test]
    fn null_line_item_drops_only_the_projection() -> Result<()> {
        let result: EvaluationResult = serde_json::from_str(
            r#"{"rating":"Fair","explanation":"x","financial_projection":{"revenue":null,"cost_of_goods_sold":1,"gross_profit":1,"operational_expenses":1,"net_profit":1},"risks":[{"risk":"Rent","risk_score":3}]}"#,
        )?;
        assert!(result.financial_projection.is_none());
        assert_eq!(result.risks.map(|risks| risks.len()), Some(1));
        Ok(())
    }

    #[test]
    fn unscored_risk_drops_the_risk_section() -> Result<()> {
        let result: EvaluationResult = serde_json::from_str(
            r#"{"rating":"Fair","explanation":"x","risks":[{"risk":"Rent"}],"competitors":"none","trend_score":"high"}"#,
        )?;
        assert!(result.risks.is_none());
        assert!(result.competitors.is_none());
        assert!(result.trend_score.is_none());
        assert_eq!(result.rating, "Fair");
        Ok(())
    }

    #[test]
    fn sparse_competitor_entries_decode() -> Result<()> {
        let result: EvaluationResult = serde_json::from_str(
            r#"{"rating":"Fair","explanation":"x","competitors":[{"name":"Cafe Uno"}]}"#,
        )?;
        let competitors = result.competitors.unwrap_or_default();
        assert_eq!(competitors.len(), 1);
        assert_eq!(competitors[0].name, "Cafe Uno");
        assert_eq!(competitors[0].rating, None);
        assert_eq!(competitors[0].vicinity, None);
        Ok(())
    }

    #[test]
    fn mitigation_entries_accept_strings_structs_and_unknown_shapes() -> Result<()> {
        let strategies: Vec<MitigationStrategy> = serde_json::from_str(
            r#"["Diversify suppliers",{"title":"Hedge rent","risk":"Rent"},{"strategy":"Loyalty","description":"punch cards"},42]"#,
        )?;
        let labels = strategies
            .iter()
            .map(MitigationStrategy::label)
            .collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec![
                "Diversify suppliers".to_owned(),
                "Rent: Hedge rent".to_owned(),
                "Loyalty - punch cards".to_owned(),
                "42".to_owned(),
            ]
        );
        Ok(())
    }

    #[test]
    fn categories_map_to_endpoints_and_fields() {
        assert_eq!(SuggestionCategory::Locations.path(), "/locations");
        assert_eq!(SuggestionCategory::BusinessIdeas.path(), "/business-ideas");
        for category in SuggestionCategory::ALL {
            assert_eq!(category.field().category(), category);
        }
        assert_eq!(FormField::BusinessIdea.other(), FormField::Location);
    }
}
