//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String` (null for `None`), pointer plus length
//! instead of `Vec`, `f64::NAN` for an absent nutrient, `-1` for an absent
//! count, and tagged enums with explicit discriminants. Conversion functions
//! live here to keep `lib.rs` focused on the `extern "C"` surface.
//!
//! Arrays are handed out as boxed slices so the C side can return them with
//! only a pointer and a length.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use fatsecret_core::{
    ApiError, AutocompleteSuggestions, FatSecretError, Food, FoodSummary, HttpMethod, SearchResult, Serving,
};

/// Opaque handle to a `FatSecretClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiFatSecretClient {
    pub(crate) inner: fatsecret_core::FatSecretClient,
}

// ---------------------------------------------------------------------------
// Allocation helpers
// ---------------------------------------------------------------------------

/// Move a string to the C heap. Interior NUL bytes are dropped so the value
/// always survives the trip.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let mut bytes = s.into_bytes();
    bytes.retain(|b| *b != 0);
    CString::new(bytes).map_or(std::ptr::null_mut(), CString::into_raw)
}

pub(crate) fn opt_c_string(s: Option<String>) -> *mut c_char {
    s.map_or(std::ptr::null_mut(), into_c_string)
}

/// Free a string produced by [`into_c_string`]. Null is ignored.
///
/// # Safety
/// `s` must be null or a pointer returned by `into_c_string` that has not been
/// freed yet.
pub(crate) unsafe fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Leak a vector as a pointer/length pair. Empty vectors become null.
pub(crate) fn into_raw_slice<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    (Box::into_raw(items.into_boxed_slice()) as *mut T, len)
}

/// Reclaim a pair produced by [`into_raw_slice`].
///
/// # Safety
/// `ptr` and `len` must come from the same `into_raw_slice` call, and the
/// slice must not have been reclaimed already.
pub(crate) unsafe fn from_raw_slice<T>(ptr: *mut T, len: u32) -> Box<[T]> {
    if ptr.is_null() || len == 0 {
        return Box::new([]);
    }
    unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len as usize)) }
}

fn opt_count(n: Option<u32>) -> i64 {
    n.map_or(-1, i64::from)
}

fn opt_amount(n: Option<f64>) -> f64 {
    n.unwrap_or(f64::NAN)
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Post = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `fatsecret_build_*` functions. `url` already carries the signed
/// query string. The C caller executes the request and passes the response
/// back through `fatsecret_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    /// Null when the request has no body.
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: fatsecret_core::HttpRequest) -> *mut Self {
        let url = into_c_string(req.url());
        let headers: Vec<FfiHeader> = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: into_c_string(k),
                value: into_c_string(v),
            })
            .collect();
        let (headers, headers_len) = into_raw_slice(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body: opt_c_string(req.body),
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `fatsecret_parse_*` function. The FFI layer
/// reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    /// NUL-terminated UTF-8; null is read as an empty body.
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiFatSecretResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidConsumerKey = 1,
    InvalidSignature = 2,
    UnknownApi = 3,
    Http = 4,
    Decode = 5,
    Transport = 6,
    InvalidArg = 7,
    Panic = 8,
    NullArg = 9,
}

/// Tag that tells `fatsecret_free_result` what `FfiFatSecretResult::data`
/// points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    SearchResult = 1,
    Suggestions = 2,
    Food = 3,
}

/// One search hit. Absent strings are null.
#[repr(C)]
pub struct FfiFoodSummary {
    pub food_id: *mut c_char,
    pub food_name: *mut c_char,
    pub food_type: *mut c_char,
    pub brand_name: *mut c_char,
    pub food_url: *mut c_char,
    pub food_description: *mut c_char,
}

impl From<FoodSummary> for FfiFoodSummary {
    fn from(f: FoodSummary) -> Self {
        FfiFoodSummary {
            food_id: into_c_string(f.food_id),
            food_name: into_c_string(f.food_name),
            food_type: opt_c_string(f.food_type),
            brand_name: opt_c_string(f.brand_name),
            food_url: opt_c_string(f.food_url),
            food_description: opt_c_string(f.food_description),
        }
    }
}

/// `foods.search` payload. Counts are `-1` when the server omitted them.
#[repr(C)]
pub struct FfiSearchResult {
    pub foods: *mut FfiFoodSummary,
    pub foods_len: u32,
    pub max_results: i64,
    pub page_number: i64,
    pub total_results: i64,
}

/// `foods.autocomplete` payload.
#[repr(C)]
pub struct FfiSuggestionList {
    pub items: *mut *mut c_char,
    pub len: u32,
}

/// One serving size. Absent strings are null, absent amounts are NaN.
#[repr(C)]
pub struct FfiServing {
    pub serving_id: *mut c_char,
    pub serving_description: *mut c_char,
    pub serving_url: *mut c_char,
    pub metric_serving_amount: f64,
    pub metric_serving_unit: *mut c_char,
    pub number_of_units: f64,
    pub measurement_description: *mut c_char,
    pub calories: f64,
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
    pub saturated_fat: f64,
    pub polyunsaturated_fat: f64,
    pub monounsaturated_fat: f64,
    pub cholesterol: f64,
    pub sodium: f64,
    pub potassium: f64,
    pub fiber: f64,
    pub sugar: f64,
}

impl From<Serving> for FfiServing {
    fn from(s: Serving) -> Self {
        FfiServing {
            serving_id: opt_c_string(s.serving_id),
            serving_description: opt_c_string(s.serving_description),
            serving_url: opt_c_string(s.serving_url),
            metric_serving_amount: opt_amount(s.metric_serving_amount),
            metric_serving_unit: opt_c_string(s.metric_serving_unit),
            number_of_units: opt_amount(s.number_of_units),
            measurement_description: opt_c_string(s.measurement_description),
            calories: opt_amount(s.calories),
            carbohydrate: opt_amount(s.carbohydrate),
            protein: opt_amount(s.protein),
            fat: opt_amount(s.fat),
            saturated_fat: opt_amount(s.saturated_fat),
            polyunsaturated_fat: opt_amount(s.polyunsaturated_fat),
            monounsaturated_fat: opt_amount(s.monounsaturated_fat),
            cholesterol: opt_amount(s.cholesterol),
            sodium: opt_amount(s.sodium),
            potassium: opt_amount(s.potassium),
            fiber: opt_amount(s.fiber),
            sugar: opt_amount(s.sugar),
        }
    }
}

/// `food.get` payload.
#[repr(C)]
pub struct FfiFood {
    pub food_id: *mut c_char,
    pub food_name: *mut c_char,
    pub food_type: *mut c_char,
    pub brand_name: *mut c_char,
    pub food_url: *mut c_char,
    pub servings: *mut FfiServing,
    pub servings_len: u32,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null. `http_status` is set for
/// `Http` errors and `api_error_code` for API errors (`-1` otherwise).
#[repr(C)]
pub struct FfiFatSecretResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub api_error_code: i64,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiFatSecretResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiFatSecretResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            api_error_code: -1,
            data_tag,
            data,
        }))
    }

    fn failure(error_code: FfiErrorCode, message: String, http_status: u16, api_error_code: i64) -> *mut Self {
        Box::into_raw(Box::new(FfiFatSecretResult {
            error_code,
            error_message: into_c_string(message),
            http_status,
            api_error_code,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Build a success result carrying an `FfiSearchResult`.
    pub(crate) fn ok_search(result: SearchResult) -> *mut Self {
        let foods: Vec<FfiFoodSummary> = result.foods.into_iter().map(FfiFoodSummary::from).collect();
        let (foods, foods_len) = into_raw_slice(foods);
        let data = Box::new(FfiSearchResult {
            foods,
            foods_len,
            max_results: opt_count(result.max_results),
            page_number: opt_count(result.page_number),
            total_results: opt_count(result.total_results),
        });
        Self::ok(FfiDataTag::SearchResult, Box::into_raw(data) as *mut c_void)
    }

    /// Build a success result carrying an `FfiSuggestionList`.
    pub(crate) fn ok_suggestions(result: AutocompleteSuggestions) -> *mut Self {
        let items: Vec<*mut c_char> = result.suggestions.into_iter().map(into_c_string).collect();
        let (items, len) = into_raw_slice(items);
        let data = Box::new(FfiSuggestionList { items, len });
        Self::ok(FfiDataTag::Suggestions, Box::into_raw(data) as *mut c_void)
    }

    /// Build a success result carrying an `FfiFood`.
    pub(crate) fn ok_food(food: Food) -> *mut Self {
        let servings: Vec<FfiServing> = food.servings.servings.into_iter().map(FfiServing::from).collect();
        let (servings, servings_len) = into_raw_slice(servings);
        let data = Box::new(FfiFood {
            food_id: into_c_string(food.food_id),
            food_name: into_c_string(food.food_name),
            food_type: opt_c_string(food.food_type),
            brand_name: opt_c_string(food.brand_name),
            food_url: opt_c_string(food.food_url),
            servings,
            servings_len,
        });
        Self::ok(FfiDataTag::Food, Box::into_raw(data) as *mut c_void)
    }

    /// Build an error result from a core error.
    pub(crate) fn from_error(err: FatSecretError) -> *mut Self {
        let message = err.to_string();
        match &err {
            FatSecretError::Api(api) => {
                let code = match api {
                    ApiError::InvalidConsumerKey { .. } => FfiErrorCode::InvalidConsumerKey,
                    ApiError::InvalidSignature { .. } => FfiErrorCode::InvalidSignature,
                    ApiError::Unknown { .. } => FfiErrorCode::UnknownApi,
                };
                Self::failure(code, message, 0, api.code().unwrap_or(-1))
            }
            FatSecretError::Http { status, .. } => Self::failure(FfiErrorCode::Http, message, *status, -1),
            FatSecretError::Decode(_) => Self::failure(FfiErrorCode::Decode, message, 0, -1),
            FatSecretError::Transport(_) => Self::failure(FfiErrorCode::Transport, message, 0, -1),
            FatSecretError::ReservedParameter(_) => Self::failure(FfiErrorCode::InvalidArg, message, 0, -1),
        }
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"), 0, -1)
    }

    /// Build an error result for an argument that is not valid UTF-8.
    pub(crate) fn invalid_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::InvalidArg, format!("invalid argument: {name}"), 0, -1)
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string(), 0, -1)
    }
}

// ---------------------------------------------------------------------------
// Release
// ---------------------------------------------------------------------------

/// Free the C-string fields of an `FfiFoodSummary` (but not the struct itself).
///
/// # Safety
/// Every field must be null or owned by this library.
pub(crate) unsafe fn free_food_summary_fields(f: &FfiFoodSummary) {
    unsafe {
        free_c_string(f.food_id);
        free_c_string(f.food_name);
        free_c_string(f.food_type);
        free_c_string(f.brand_name);
        free_c_string(f.food_url);
        free_c_string(f.food_description);
    }
}

/// Free the C-string fields of an `FfiServing` (but not the struct itself).
///
/// # Safety
/// Every string field must be null or owned by this library.
pub(crate) unsafe fn free_serving_fields(s: &FfiServing) {
    unsafe {
        free_c_string(s.serving_id);
        free_c_string(s.serving_description);
        free_c_string(s.serving_url);
        free_c_string(s.metric_serving_unit);
        free_c_string(s.measurement_description);
    }
}
