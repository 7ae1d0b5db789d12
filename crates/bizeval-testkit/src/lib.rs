// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::path::PathBuf;

const BUSINESS_IDEAS: [&str; 14] = [
    "Bakery",
    "Bike repair shop",
    "Bookstore cafe",
    "Coffee shop",
    "Coworking space",
    "Dog grooming",
    "Food truck",
    "Laundromat",
    "Meal prep delivery",
    "Plant nursery",
    "Pottery studio",
    "Smoothie bar",
    "Taco stand",
    "Yoga studio",
];

const LOCATIONS: [&str; 12] = [
    "Austin, TX",
    "Boise, ID",
    "Boston, MA",
    "Denver, CO",
    "Madison, WI",
    "Nashville, TN",
    "Portland, ME",
    "Portland, OR",
    "Raleigh, NC",
    "Salt Lake City, UT",
    "San Antonio, TX",
    "Seattle, WA",
];

const RATINGS: [&str; 4] = ["Promising", "Moderate", "Challenging", "Not recommended"];

const COMPETITOR_PREFIXES: [&str; 8] = [
    "Corner", "Urban", "Golden", "Main Street", "Blue Door", "Sunrise", "Local", "Northside",
];

const STREETS: [&str; 8] = [
    "Congress Ave",
    "Lamar Blvd",
    "Market St",
    "Elm St",
    "Broadway",
    "Cedar Ln",
    "Harbor Rd",
    "Oak Ave",
];

const RISKS: [&str; 6] = [
    "Competition",
    "Rent",
    "Seasonality",
    "Staffing",
    "Regulation",
    "Supply costs",
];

const MITIGATIONS: [(&str, &str); 6] = [
    ("Competition", "Differentiate with a signature offering"),
    ("Rent", "Negotiate a short initial lease"),
    ("Seasonality", "Add a catering line for slow months"),
    ("Staffing", "Cross-train a small core team"),
    ("Regulation", "Book a permit review before signing"),
    ("Supply costs", "Lock in two suppliers per key input"),
];

const FULL_RESULT: &str = r#"{
  "rating": "Promising",
  "explanation": "Strong foot traffic and few specialty cafes nearby.",
  "corrected_business_idea": "Mobile coffee cart",
  "new_business_idea_added": true,
  "corrected_location": "Austin, TX",
  "new_location_added": true,
  "competitors": [
    {"name": "Bean There", "rating": 4.5, "user_ratings_total": 210, "vicinity": "12 Congress Ave"},
    {"name": "Daily Grind", "rating": 3.9, "user_ratings_total": 87, "vicinity": "400 Lamar Blvd"}
  ],
  "financial_projection": {
    "revenue": 1000,
    "cost_of_goods_sold": 400,
    "gross_profit": 600,
    "operational_expenses": 200,
    "net_profit": 400
  },
  "risks": [
    {"risk": "Rent", "risk_score": 10},
    {"risk": "Competition", "risk_score": 30}
  ],
  "mitigation_strategies": [
    "Negotiate a short initial lease",
    {"risk": "Competition", "strategy": "Differentiate with specialty roasts"}
  ],
  "trend_score": 72,
  "economic_indicator": 64.5
}"#;

const MINIMAL_RESULT: &str = r#"{"rating":"Promising","explanation":"Good fit"}"#;

/// Evaluation payload with every optional section populated.
pub fn full_result_json() -> &'static str {
    FULL_RESULT
}

/// Evaluation payload carrying only the required fields.
pub fn minimal_result_json() -> &'static str {
    MINIMAL_RESULT
}

pub fn business_ideas() -> &'static [&'static str] {
    &BUSINESS_IDEAS
}

pub fn locations() -> &'static [&'static str] {
    &LOCATIONS
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

pub fn write_temp_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
    let (dir, path) = temp_config_path()?;
    std::fs::write(&path, content)
        .with_context(|| format!("write config {}", path.display()))?;
    Ok((dir, path))
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn int_range(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        low + (self.next_u64() % ((high - low + 1) as u64)) as i64
    }
}

/// Produces stable, plausible evaluation payloads for demo mode and tests.
/// The same seed and inputs always yield the same payload.
#[derive(Debug, Clone)]
pub struct EvaluationFaker {
    seed: u64,
}

impl EvaluationFaker {
    pub fn new(seed: u64) -> Self {
        Self {
            seed: if seed == 0 { 1 } else { seed },
        }
    }

    pub fn business_ideas(&self) -> Vec<String> {
        BUSINESS_IDEAS.iter().map(|idea| (*idea).to_owned()).collect()
    }

    pub fn locations(&self) -> Vec<String> {
        LOCATIONS.iter().map(|location| (*location).to_owned()).collect()
    }

    pub fn evaluation(&self, business_idea: &str, location: &str) -> Value {
        let mut rng = DeterministicRng::new(
            self.seed ^ fold_text(business_idea) ^ fold_text(location).rotate_left(17),
        );

        let known_idea = find_ignoring_case(&BUSINESS_IDEAS, business_idea);
        let known_location = find_ignoring_case(&LOCATIONS, location);
        let idea = known_idea.map(str::to_owned).unwrap_or_else(|| title_case(business_idea));
        let place = known_location.map(str::to_owned).unwrap_or_else(|| title_case(location));

        let rating = RATINGS[rng.int_n(RATINGS.len())];
        let revenue = rng.int_range(80, 600) * 1_000;
        let cogs = revenue * rng.int_range(25, 55) / 100;
        let gross = revenue - cogs;
        let opex = revenue * rng.int_range(15, 45) / 100;

        let competitor_count = rng.int_n(4);
        let competitors = (0..competitor_count)
            .map(|_| {
                let prefix = COMPETITOR_PREFIXES[rng.int_n(COMPETITOR_PREFIXES.len())];
                let street = STREETS[rng.int_n(STREETS.len())];
                json!({
                    "name": format!("{prefix} {idea}"),
                    "rating": rng.int_range(30, 50) as f64 / 10.0,
                    "user_ratings_total": rng.int_range(5, 900),
                    "vicinity": format!("{} {street}", rng.int_range(1, 999)),
                })
            })
            .collect::<Vec<_>>();

        let risk_count = rng.int_range(2, 5) as usize;
        let start = rng.int_n(RISKS.len());
        let picked = (0..risk_count)
            .map(|offset| (start + offset) % RISKS.len())
            .collect::<Vec<_>>();
        let risks = picked
            .iter()
            .map(|index| json!({"risk": RISKS[*index], "risk_score": rng.int_range(5, 95)}))
            .collect::<Vec<_>>();
        let mitigation_strategies = picked
            .iter()
            .map(|index| {
                let (risk, strategy) = MITIGATIONS[*index];
                json!({"risk": risk, "strategy": strategy})
            })
            .collect::<Vec<_>>();

        let mut payload = json!({
            "rating": rating,
            "explanation": format!(
                "{rating} outlook for a {} in {place}: {} nearby competitors and steady local demand.",
                idea.to_lowercase(),
                competitor_count,
            ),
            "competitors": competitors,
            "financial_projection": {
                "revenue": revenue,
                "cost_of_goods_sold": cogs,
                "gross_profit": gross,
                "operational_expenses": opex,
                "net_profit": gross - opex,
            },
            "risks": risks,
            "mitigation_strategies": mitigation_strategies,
            "trend_score": rng.int_range(10, 95),
            "economic_indicator": rng.int_range(10, 95),
        });

        if known_idea.is_none() {
            payload["corrected_business_idea"] = json!(idea);
            payload["new_business_idea_added"] = json!(true);
        }
        if known_location.is_none() {
            payload["corrected_location"] = json!(place);
            payload["new_location_added"] = json!(true);
        }
        payload
    }
}

fn fold_text(text: &str) -> u64 {
    text.trim()
        .to_lowercase()
        .bytes()
        .fold(0xCBF2_9CE4_8422_2325, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01B3)
        })
}

fn find_ignoring_case(options: &'static [&'static str], value: &str) -> Option<&'static str> {
    let needle = value.trim().to_lowercase();
    options
        .iter()
        .copied()
        .find(|option| option.to_lowercase() == needle)
}

fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
