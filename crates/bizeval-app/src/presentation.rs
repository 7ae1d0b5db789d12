// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Result fan-out. Every view here is a pure function of one slice of an
//! [`EvaluationResult`] and degrades to an explicit empty state when that
//! slice is missing.

use crate::{EvaluationResult, FinancialProjection, MitigationStrategy, Risk};

pub const NO_FINANCIALS: &str = "No financial projections available.";
pub const NO_RISKS: &str = "No risks identified.";
pub const METRIC_MIN: f64 = 0.0;
pub const METRIC_MAX: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentView {
    pub rating: String,
    pub explanation: String,
    pub corrections: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBar {
    pub label: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FinancialView {
    NoData,
    Series(Vec<ChartBar>),
}

impl FinancialView {
    pub fn values(&self) -> Vec<f64> {
        match self {
            Self::NoData => Vec::new(),
            Self::Series(bars) => bars.iter().map(|bar| bar.value).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarPoint {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarSeries {
    pub points: Vec<RadarPoint>,
    pub domain: [f64; 2],
}

impl RadarSeries {
    /// Position of `score` along the radius, clamped to the domain.
    pub fn ratio(&self, score: f64) -> f64 {
        let [low, high] = self.domain;
        ((score - low) / (high - low)).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RiskView {
    NoRisks,
    Radar(RadarSeries),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricGauge {
    pub label: &'static str,
    pub value: Option<f64>,
}

impl MetricGauge {
    /// Fill ratio on the fixed 0–100 scale.
    pub fn ratio(&self) -> f64 {
        self.value
            .map(|value| ((value - METRIC_MIN) / (METRIC_MAX - METRIC_MIN)).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }

    pub fn display(&self) -> String {
        self.value
            .map(format_number)
            .unwrap_or_else(|| "n/a".to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketMetrics {
    pub trend: MetricGauge,
    pub economic: MetricGauge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub assessment: AssessmentView,
    pub competitors: Option<Vec<String>>,
    pub financial: FinancialView,
    pub risks: RiskView,
    pub mitigation: Option<Vec<String>>,
    pub metrics: MarketMetrics,
}

pub fn assessment_view(result: &EvaluationResult) -> AssessmentView {
    let mut corrections = Vec::new();
    if result.location_added() {
        corrections.push(format!(
            "New location added: {}",
            result.corrected_location.as_deref().unwrap_or_default()
        ));
    }
    if result.business_idea_added() {
        corrections.push(format!(
            "New business idea added: {}",
            result.corrected_business_idea.as_deref().unwrap_or_default()
        ));
    }

    AssessmentView {
        rating: result.rating.clone(),
        explanation: result.explanation.clone(),
        corrections,
    }
}

pub fn competitor_lines(result: &EvaluationResult) -> Option<Vec<String>> {
    let competitors = result.competitors.as_deref()?;
    if competitors.is_empty() {
        return None;
    }

    Some(
        competitors
            .iter()
            .map(|competitor| {
                let rating = competitor
                    .rating
                    .map(format_number)
                    .unwrap_or_else(|| "n/a".to_owned());
                let reviews = competitor
                    .user_ratings_total
                    .map(|total| format!("{total} reviews"))
                    .unwrap_or_else(|| "no reviews".to_owned());
                let mut line = format!("{} - Rating: {rating} ({reviews})", competitor.name);
                if let Some(vicinity) = competitor.vicinity.as_deref()
                    && !vicinity.is_empty()
                {
                    line.push_str(" - ");
                    line.push_str(vicinity);
                }
                line
            })
            .collect(),
    )
}

pub fn financial_view(projection: Option<&FinancialProjection>) -> FinancialView {
    let Some(projection) = projection else {
        return FinancialView::NoData;
    };

    FinancialView::Series(
        FinancialProjection::LABELS
            .into_iter()
            .zip(projection.values())
            .map(|(label, value)| ChartBar { label, value })
            .collect(),
    )
}

pub fn risk_view(risks: Option<&[Risk]>) -> RiskView {
    let risks = risks.unwrap_or_default();
    if risks.is_empty() {
        return RiskView::NoRisks;
    }

    RiskView::Radar(RadarSeries {
        points: risks
            .iter()
            .map(|risk| RadarPoint {
                label: risk.risk.clone(),
                score: risk.risk_score,
            })
            .collect(),
        domain: [0.0, radius_upper_bound(risks)],
    })
}

/// Largest score, or 1.0 when no score is positive so the domain never
/// collapses.
pub fn radius_upper_bound(risks: &[Risk]) -> f64 {
    let max = risks
        .iter()
        .map(|risk| risk.risk_score)
        .fold(f64::NEG_INFINITY, f64::max);
    if max > 0.0 { max } else { 1.0 }
}

pub fn mitigation_lines(result: &EvaluationResult) -> Option<Vec<String>> {
    let strategies = result.mitigation_strategies.as_deref()?;
    if strategies.is_empty() {
        return None;
    }
    Some(strategies.iter().map(MitigationStrategy::label).collect())
}

pub fn market_metrics(result: &EvaluationResult) -> MarketMetrics {
    MarketMetrics {
        trend: MetricGauge {
            label: "Trend Score",
            value: result.trend_score,
        },
        economic: MetricGauge {
            label: "Economic Indicator",
            value: result.economic_indicator,
        },
    }
}

impl ResultView {
    pub fn from_result(result: &EvaluationResult) -> Self {
        Self {
            assessment: assessment_view(result),
            competitors: competitor_lines(result),
            financial: financial_view(result.financial_projection.as_ref()),
            risks: risk_view(result.risks.as_deref()),
            mitigation: mitigation_lines(result),
            metrics: market_metrics(result),
        }
    }

    /// Plain-text rendering used outside the terminal UI.
    pub fn to_report(&self) -> String {
        let mut lines = vec![format!("Assessment: {}", self.assessment.rating)];
        lines.push(self.assessment.explanation.clone());
        lines.extend(self.assessment.corrections.iter().cloned());

        if let Some(competitors) = &self.competitors {
            lines.push(String::new());
            lines.push("Nearby Competitors:".to_owned());
            lines.extend(competitors.iter().map(|line| format!("  - {line}")));
        }

        lines.push(String::new());
        lines.push("Financial Projections".to_owned());
        match &self.financial {
            FinancialView::NoData => lines.push(format!("  {NO_FINANCIALS}")),
            FinancialView::Series(bars) => {
                for bar in bars {
                    lines.push(format!("  {:<14}{}", bar.label, format_number(bar.value)));
                }
            }
        }

        lines.push(String::new());
        lines.push("Risk Assessment".to_owned());
        match &self.risks {
            RiskView::NoRisks => lines.push(format!("  {NO_RISKS}")),
            RiskView::Radar(series) => {
                lines.push(format!(
                    "  scale {} - {}",
                    format_number(series.domain[0]),
                    format_number(series.domain[1])
                ));
                for point in &series.points {
                    lines.push(format!("  {}: {}", point.label, format_number(point.score)));
                }
            }
        }

        if let Some(strategies) = &self.mitigation {
            lines.push(String::new());
            lines.push("Mitigation Strategies".to_owned());
            lines.extend(
                strategies
                    .iter()
                    .enumerate()
                    .map(|(index, line)| format!("  {}. {line}", index + 1)),
            );
        }

        lines.push(String::new());
        lines.push("Market Metrics".to_owned());
        for gauge in [self.metrics.trend, self.metrics.economic] {
            lines.push(format!(
                "  {}: {} / {}",
                gauge.label,
                gauge.display(),
                format_number(METRIC_MAX)
            ));
        }
        lines.join("\n")
    }
}

pub fn format_number(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::{
        FinancialView, NO_FINANCIALS, NO_RISKS, ResultView, RiskView, assessment_view,
        competitor_lines, financial_view, market_metrics, radius_upper_bound, risk_view,
    };
    use crate::{EvaluationResult, FinancialProjection, Risk};
    use anyhow::Result;
    use bizeval_testkit::{full_result_json, minimal_result_json};

    fn risk(label: &str, score: f64) -> Risk {
        Risk {
            risk: label.to_owned(),
            risk_score: score,
        }
    }

    #[test]
    fn full_fixture_renders_every_view() -> Result<()> {
        let result: EvaluationResult = serde_json::from_str(full_result_json())?;
        let view = ResultView::from_result(&result);

        assert_eq!(view.assessment.rating, "Promising");
        assert_eq!(
            view.assessment.corrections,
            vec![
                "New location added: Austin, TX".to_owned(),
                "New business idea added: Mobile coffee cart".to_owned(),
            ]
        );
        assert_eq!(
            view.competitors,
            Some(vec![
                "Bean There - Rating: 4.5 (210 reviews) - 12 Congress Ave".to_owned(),
                "Daily Grind - Rating: 3.9 (87 reviews) - 400 Lamar Blvd".to_owned(),
            ])
        );
        assert_eq!(view.financial.values(), vec![1000.0, 400.0, 600.0, 200.0, 400.0]);
        let RiskView::Radar(series) = &view.risks else {
            panic!("risks should render a radar series");
        };
        assert_eq!(series.domain, [0.0, 30.0]);
        assert_eq!(
            view.mitigation,
            Some(vec![
                "Negotiate a short initial lease".to_owned(),
                "Competition: Differentiate with specialty roasts".to_owned(),
            ])
        );
        assert_eq!(view.metrics.trend.display(), "72");
        assert_eq!(view.metrics.economic.display(), "64.5");

        let report = view.to_report();
        assert!(report.contains("Assessment: Promising"));
        assert!(report.contains("Nearby Competitors:"));
        assert!(report.contains("  Revenue       1000"));
        assert!(report.contains("  Competition: 30"));
        assert!(report.contains("  1. Negotiate a short initial lease"));
        assert!(report.contains("  Trend Score: 72 / 100"));
        Ok(())
    }

    #[test]
    fn minimal_fixture_renders_every_placeholder() -> Result<()> {
        let result: EvaluationResult = serde_json::from_str(minimal_result_json())?;
        let view = ResultView::from_result(&result);

        assert!(view.assessment.corrections.is_empty());
        assert_eq!(view.competitors, None);
        assert_eq!(view.financial, FinancialView::NoData);
        assert_eq!(view.risks, RiskView::NoRisks);
        assert_eq!(view.mitigation, None);
        assert_eq!(view.metrics.trend.display(), "n/a");
        assert_eq!(view.metrics.economic.ratio(), 0.0);

        let report = view.to_report();
        assert!(report.contains(NO_FINANCIALS));
        assert!(report.contains(NO_RISKS));
        assert!(!report.contains("Nearby Competitors"));
        assert!(!report.contains("Mitigation Strategies"));
        assert!(report.contains("Economic Indicator: n/a / 100"));
        Ok(())
    }

    #[test]
    fn malformed_sections_render_placeholders_beside_assessment() -> Result<()> {
        let result: EvaluationResult = serde_json::from_str(
            r#"{"rating":"Promising","explanation":"Good fit","financial_projection":{"revenue":1000},"risks":[{"risk":"Rent"}]}"#,
        )?;
        let view = ResultView::from_result(&result);

        assert_eq!(view.assessment.rating, "Promising");
        assert_eq!(view.assessment.explanation, "Good fit");
        assert_eq!(view.financial, FinancialView::NoData);
        assert_eq!(view.risks, RiskView::NoRisks);

        let report = view.to_report();
        assert!(report.starts_with("Assessment: Promising"));
        assert!(report.contains(NO_FINANCIALS));
        assert!(report.contains(NO_RISKS));
        Ok(())
    }

    #[test]
    fn empty_competitor_list_renders_nothing() -> Result<()> {
        let result: EvaluationResult = serde_json::from_str(
            r#"{"rating":"Promising","explanation":"Good fit","competitors":[]}"#,
        )?;
        assert_eq!(competitor_lines(&result), None);
        let assessment = assessment_view(&result);
        assert_eq!(assessment.rating, "Promising");
        assert_eq!(assessment.explanation, "Good fit");
        Ok(())
    }

    #[test]
    fn correction_flag_without_value_still_renders_notice() {
        let mut result = EvaluationResult::new("Fair", "x");
        result.new_business_idea_added = Some(true);
        assert_eq!(
            assessment_view(&result).corrections,
            vec!["New business idea added: ".to_owned()]
        );

        result.new_business_idea_added = Some(false);
        result.corrected_business_idea = Some("ignored".to_owned());
        assert!(assessment_view(&result).corrections.is_empty());
    }

    #[test]
    fn financial_series_keeps_canonical_order() {
        let projection = FinancialProjection {
            revenue: 1000.0,
            cost_of_goods_sold: 400.0,
            gross_profit: 600.0,
            operational_expenses: 200.0,
            net_profit: 400.0,
        };
        let FinancialView::Series(bars) = financial_view(Some(&projection)) else {
            panic!("projection should render bars");
        };
        let labels = bars.iter().map(|bar| bar.label).collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec!["Revenue", "COGS", "Gross Profit", "Op. Expenses", "Net Profit"]
        );
        assert_eq!(
            bars.iter().map(|bar| bar.value).collect::<Vec<_>>(),
            vec![1000.0, 400.0, 600.0, 200.0, 400.0]
        );
        assert_eq!(financial_view(None), FinancialView::NoData);
    }

    #[test]
    fn radar_domain_tracks_max_score() {
        let risks = vec![risk("A", 10.0), risk("B", 30.0)];
        let RiskView::Radar(series) = risk_view(Some(risks.as_slice())) else {
            panic!("risks should render a radar series");
        };
        assert_eq!(series.domain, [0.0, 30.0]);
        assert_eq!(series.ratio(10.0), 10.0 / 30.0);
        assert_eq!(series.points[1].label, "B");
    }

    #[test]
    fn radar_domain_is_never_degenerate() {
        assert_eq!(radius_upper_bound(&[risk("A", 7.0), risk("B", 7.0)]), 7.0);
        assert_eq!(radius_upper_bound(&[risk("A", 0.0)]), 1.0);
        assert_eq!(radius_upper_bound(&[risk("A", -3.0)]), 1.0);
        assert_eq!(risk_view(Some(&[][..])), RiskView::NoRisks);
        assert_eq!(risk_view(None), RiskView::NoRisks);
    }

    #[test]
    fn metric_gauges_use_fixed_scale() {
        let mut result = EvaluationResult::new("Fair", "x");
        result.trend_score = Some(150.0);
        result.economic_indicator = Some(-5.0);
        let metrics = market_metrics(&result);
        assert_eq!(metrics.trend.ratio(), 1.0);
        assert_eq!(metrics.trend.display(), "150");
        assert_eq!(metrics.economic.ratio(), 0.0);

        result.trend_score = Some(25.0);
        assert_eq!(market_metrics(&result).trend.ratio(), 0.25);
    }
}
