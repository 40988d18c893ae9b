//! Typed results for the three supported operations.
//!
//! # Design
//! Passive DTOs, defined independently of the mock-server crate; the
//! integration tests catch schema drift between the two. Field names follow
//! the wire format so serde needs no renames beyond the list wrappers.

use serde::{Deserialize, Serialize};

use crate::de::{id, one_or_many, opt_number};
use crate::response::Envelope;

/// `foods.search` payload (the value under `"foods"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Absent when nothing matched.
    #[serde(rename = "food", default, deserialize_with = "one_or_many")]
    pub foods: Vec<FoodSummary>,
    #[serde(default, deserialize_with = "opt_number")]
    pub max_results: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    pub page_number: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    pub total_results: Option<u32>,
}

/// One hit in a search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodSummary {
    #[serde(deserialize_with = "id")]
    pub food_id: String,
    pub food_name: String,
    /// `Generic` or `Brand`.
    pub food_type: Option<String>,
    pub brand_name: Option<String>,
    pub food_url: Option<String>,
    /// e.g. `Per 100g - Calories: 52kcal | Fat: 0.17g | ...`
    pub food_description: Option<String>,
}

/// `foods.autocomplete` payload (the value under `"suggestions"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteSuggestions {
    #[serde(rename = "suggestion", default, deserialize_with = "one_or_many")]
    pub suggestions: Vec<String>,
}

/// `food.get` payload (the value under `"food"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    #[serde(deserialize_with = "id")]
    pub food_id: String,
    pub food_name: String,
    pub food_type: Option<String>,
    pub brand_name: Option<String>,
    pub food_url: Option<String>,
    #[serde(default)]
    pub servings: Servings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Servings {
    #[serde(rename = "serving", default, deserialize_with = "one_or_many")]
    pub servings: Vec<Serving>,
}

/// Nutrition facts for one serving size. Every nutrient is optional; the
/// server omits the ones it has no data for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Serving {
    pub serving_id: Option<String>,
    pub serving_description: Option<String>,
    pub serving_url: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub metric_serving_amount: Option<f64>,
    pub metric_serving_unit: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub number_of_units: Option<f64>,
    pub measurement_description: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub calories: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub carbohydrate: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub protein: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub fat: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub saturated_fat: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub polyunsaturated_fat: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub monounsaturated_fat: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub cholesterol: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub sodium: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub potassium: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub fiber: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub sugar: Option<f64>,
}

impl Envelope for SearchResult {
    const FIELD: &'static str = "foods";
}

impl Envelope for AutocompleteSuggestions {
    const FIELD: &'static str = "suggestions";
}

impl Envelope for Food {
    const FIELD: &'static str = "food";
}
