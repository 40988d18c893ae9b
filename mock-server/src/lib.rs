use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::HOST, HeaderMap, Method, Uri},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha1::Sha1;
use tokio::{net::TcpListener, sync::RwLock};

pub const API_PATH: &str = "/rest/server.api";

pub const ERR_MISSING_OAUTH_PARAM: i64 = 2;
pub const ERR_UNSUPPORTED_SIGNATURE_METHOD: i64 = 4;
pub const ERR_INVALID_CONSUMER_KEY: i64 = 5;
pub const ERR_USED_NONCE: i64 = 7;
pub const ERR_INVALID_SIGNATURE: i64 = 8;
pub const ERR_INVALID_METHOD: i64 = 13;
pub const ERR_MISSING_PARAM: i64 = 101;
pub const ERR_INVALID_ID: i64 = 106;
pub const ERR_OUT_OF_RANGE: i64 = 107;

const REQUIRED_OAUTH: [&str; 5] = [
    "oauth_consumer_key",
    "oauth_signature_method",
    "oauth_timestamp",
    "oauth_nonce",
    "oauth_signature",
];

const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Serving {
    pub serving_id: String,
    pub serving_description: String,
    pub metric_serving_amount: String,
    pub metric_serving_unit: String,
    pub calories: String,
    pub carbohydrate: String,
    pub protein: String,
    pub fat: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FoodRecord {
    pub food_id: String,
    pub food_name: String,
    pub food_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    pub food_url: String,
    pub food_description: String,
    pub servings: Vec<Serving>,
}

/// Credentials the server accepts and the catalog it serves.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub foods: Vec<FoodRecord>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            consumer_key: "test-key".to_string(),
            consumer_secret: "test-secret".to_string(),
            foods: catalog(),
        }
    }
}

struct Inner {
    config: MockConfig,
    seen_nonces: RwLock<HashSet<(String, String, String)>>,
}

type Db = Arc<Inner>;

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let db: Db = Arc::new(Inner {
        config,
        seen_nonces: RwLock::new(HashSet::new()),
    });
    Router::new()
        .route(API_PATH, get(server_api).post(server_api))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, UNRESERVED).to_string()
}

/// Base string over every parameter except `oauth_signature`.
pub fn signature_base_string(method: &str, url: &str, params: &HashMap<String, String>) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .filter(|(k, _)| k.as_str() != "oauth_signature")
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    pairs.sort();
    let normalized = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{method}&{}&{}", percent_encode(url), percent_encode(&normalized))
}

pub fn sign(base_string: &str, consumer_secret: &str) -> String {
    let key = format!("{}&", percent_encode(consumer_secret));
    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(base_string.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

fn error(code: i64, message: impl Into<String>) -> Json<Value> {
    let message = message.into();
    tracing::warn!(code, %message, "rejecting request");
    Json(json!({ "error": { "code": code, "message": message } }))
}

/// The real API collapses single-element lists to the bare element and drops
/// empty ones.
fn one_or_many(mut items: Vec<Value>) -> Option<Value> {
    match items.len() {
        0 => None,
        1 => items.pop(),
        _ => Some(Value::Array(items)),
    }
}

async fn server_api(
    State(db): State<Db>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let config = &db.config;

    if let Some(missing) = REQUIRED_OAUTH.iter().find(|k| !params.contains_key(**k)) {
        return error(ERR_MISSING_OAUTH_PARAM, format!("Missing required oauth parameter: {missing}"));
    }
    if params["oauth_signature_method"] != "HMAC-SHA1" {
        return error(ERR_UNSUPPORTED_SIGNATURE_METHOD, "Unsupported oauth_signature_method");
    }
    if params["oauth_consumer_key"] != config.consumer_key {
        return error(
            ERR_INVALID_CONSUMER_KEY,
            format!("Invalid consumer key: {}", params["oauth_consumer_key"]),
        );
    }

    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let url = format!("http://{host}{}", uri.path());
    let expected = sign(
        &signature_base_string(method.as_str(), &url, &params),
        &config.consumer_secret,
    );
    if params["oauth_signature"] != expected {
        return error(
            ERR_INVALID_SIGNATURE,
            format!("Invalid signature: oauth_signature '{}'", params["oauth_signature"]),
        );
    }

    let nonce_key = (
        params["oauth_consumer_key"].clone(),
        params["oauth_nonce"].clone(),
        params["oauth_timestamp"].clone(),
    );
    if !db.seen_nonces.write().await.insert(nonce_key) {
        return error(ERR_USED_NONCE, "Invalid/used nonce");
    }

    let Some(api_method) = params.get("method") else {
        return error(ERR_MISSING_PARAM, "Missing required parameter: method");
    };
    tracing::info!(method = %api_method, "serving request");
    match api_method.as_str() {
        "foods.search" => foods_search(&config.foods, &params),
        "foods.autocomplete" => foods_autocomplete(&config.foods, &params),
        "food.get" => food_get(&config.foods, &params),
        other => error(ERR_INVALID_METHOD, format!("Invalid method: {other}")),
    }
}

fn int_param(params: &HashMap<String, String>, name: &str, default: u32, max: u32) -> Result<u32, Json<Value>> {
    match params.get(name) {
        None => Ok(default),
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if n <= max => Ok(n),
            _ => Err(error(ERR_OUT_OF_RANGE, format!("Value out of range: {name}"))),
        },
    }
}

fn foods_search(foods: &[FoodRecord], params: &HashMap<String, String>) -> Json<Value> {
    let Some(expression) = params.get("search_expression") else {
        return error(ERR_MISSING_PARAM, "Missing required parameter: search_expression");
    };
    let page = match int_param(params, "page_number", 0, u32::MAX) {
        Ok(page) => page as usize,
        Err(e) => return e,
    };
    let max = match int_param(params, "max_results", 20, 50) {
        Ok(max) => max as usize,
        Err(e) => return e,
    };

    let needle = expression.to_lowercase();
    let hits: Vec<&FoodRecord> = foods
        .iter()
        .filter(|f| f.food_name.to_lowercase().contains(&needle))
        .collect();
    let page_items: Vec<Value> = hits
        .iter()
        .skip(page.saturating_mul(max))
        .take(max)
        .map(|f| {
            let mut summary = json!({
                "food_id": f.food_id,
                "food_name": f.food_name,
                "food_type": f.food_type,
                "food_url": f.food_url,
                "food_description": f.food_description,
            });
            if let Some(brand) = &f.brand_name {
                summary["brand_name"] = json!(brand);
            }
            summary
        })
        .collect();

    let mut body = json!({
        "max_results": max.to_string(),
        "page_number": page.to_string(),
        "total_results": hits.len().to_string(),
    });
    if let Some(food) = one_or_many(page_items) {
        body["food"] = food;
    }
    Json(json!({ "foods": body }))
}

fn foods_autocomplete(foods: &[FoodRecord], params: &HashMap<String, String>) -> Json<Value> {
    let Some(expression) = params.get("expression") else {
        return error(ERR_MISSING_PARAM, "Missing required parameter: expression");
    };
    let max = match int_param(params, "max_results", 4, 10) {
        Ok(max) => max as usize,
        Err(e) => return e,
    };

    let prefix = expression.to_lowercase();
    let suggestions: Vec<Value> = foods
        .iter()
        .map(|f| f.food_name.to_lowercase())
        .filter(|name| name.starts_with(&prefix))
        .take(max)
        .map(Value::String)
        .collect();

    let mut body = json!({});
    if let Some(suggestion) = one_or_many(suggestions) {
        body["suggestion"] = suggestion;
    }
    Json(json!({ "suggestions": body }))
}

fn food_get(foods: &[FoodRecord], params: &HashMap<String, String>) -> Json<Value> {
    let Some(id) = params.get("food_id") else {
        return error(ERR_MISSING_PARAM, "Missing required parameter: food_id");
    };
    let Some(food) = foods.iter().find(|f| &f.food_id == id) else {
        return error(ERR_INVALID_ID, "Invalid ID: food_id");
    };

    let servings: Vec<Value> = food.servings.iter().map(|s| json!(s)).collect();
    let mut record = json!({
        "food_id": food.food_id,
        "food_name": food.food_name,
        "food_type": food.food_type,
        "food_url": food.food_url,
        "servings": {},
    });
    if let Some(brand) = &food.brand_name {
        record["brand_name"] = json!(brand);
    }
    if let Some(serving) = one_or_many(servings) {
        record["servings"]["serving"] = serving;
    }
    Json(json!({ "food": record }))
}

fn serving(
    id: &str,
    description: &str,
    grams: &str,
    calories: &str,
    carbohydrate: &str,
    protein: &str,
    fat: &str,
) -> Serving {
    Serving {
        serving_id: id.to_string(),
        serving_description: description.to_string(),
        metric_serving_amount: grams.to_string(),
        metric_serving_unit: "g".to_string(),
        calories: calories.to_string(),
        carbohydrate: carbohydrate.to_string(),
        protein: protein.to_string(),
        fat: fat.to_string(),
    }
}

fn food(id: &str, name: &str, brand: Option<&str>, description: &str, servings: Vec<Serving>) -> FoodRecord {
    let slug = name.to_lowercase().replace(' ', "-");
    FoodRecord {
        food_id: id.to_string(),
        food_name: name.to_string(),
        food_type: if brand.is_some() { "Brand" } else { "Generic" }.to_string(),
        brand_name: brand.map(str::to_string),
        food_url: format!("https://www.fatsecret.com/calories-nutrition/generic/{slug}"),
        food_description: description.to_string(),
        servings,
    }
}

/// Small fixed catalog used by the default config.
pub fn catalog() -> Vec<FoodRecord> {
    vec![
        food(
            "35718",
            "Apple",
            None,
            "Per 100g - Calories: 52kcal | Fat: 0.17g | Carbs: 13.81g | Protein: 0.26g",
            vec![
                serving("32915", "1 medium (2-3/4\" dia)", "138.000", "72", "19.06", "0.36", "0.23"),
                serving("29506", "100 g", "100.000", "52", "13.81", "0.26", "0.17"),
            ],
        ),
        food(
            "39027",
            "Apple Pie",
            None,
            "Per 1 piece - Calories: 411kcal | Fat: 19.38g | Carbs: 57.50g | Protein: 3.72g",
            vec![serving("36356", "1 piece (1/8 of 9\" dia)", "155.000", "411", "57.50", "3.72", "19.38")],
        ),
        food(
            "12345",
            "Greek Yogurt",
            None,
            "Per 1 cup - Calories: 146kcal | Fat: 3.80g | Carbs: 7.87g | Protein: 20.00g",
            vec![serving("50321", "1 cup", "245.000", "146", "7.87", "20.00", "3.80")],
        ),
        food(
            "4881223",
            "Chickpeas",
            None,
            "Per 1 cup - Calories: 269kcal | Fat: 4.25g | Carbs: 44.97g | Protein: 14.53g",
            vec![serving("4732901", "1 cup", "164.000", "269", "44.97", "14.53", "4.25")],
        ),
        food(
            "1641",
            "Sharp Cheddar Cheese",
            Some("Tillamook"),
            "Per 1 oz - Calories: 110kcal | Fat: 9.00g | Carbs: 0.00g | Protein: 7.00g",
            Vec::new(),
        ),
    ]
}
