//! C-ABI wrapper around `fatsecret-core`.
//!
//! # Overview
//! Exposes request signing and response parsing for the three FatSecret
//! operations through `extern "C"` functions, so a Swift, Kotlin or C host
//! can keep its own HTTP stack and still share one signing implementation.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core API 1:1.
//! - A single `FfiFatSecretResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `fatsecret_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use fatsecret_core::{FatSecretClient, FatSecretConfig, HttpResponse, SearchQuery};

use types::*;

/// Borrow a C string as UTF-8. `None` for null or invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn borrow_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client with the given credentials.
///
/// `base_url` may be null to use the production endpoint. Returns null if a
/// credential is null or not UTF-8, if `base_url` is rejected, or if an
/// internal panic occurs.
/// The caller must free the returned pointer with `fatsecret_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn fatsecret_client_new(
    consumer_key: *const c_char,
    consumer_secret: *const c_char,
    base_url: *const c_char,
) -> *mut FfiFatSecretClient {
    catch_unwind(|| {
        let (Some(key), Some(secret)) = (unsafe { borrow_str(consumer_key) }, unsafe { borrow_str(consumer_secret) })
        else {
            return std::ptr::null_mut();
        };
        let mut config = FatSecretConfig::new(key, secret);
        if !base_url.is_null() {
            let Some(url) = (unsafe { borrow_str(base_url) }) else {
                return std::ptr::null_mut();
            };
            config = match config.with_base_url(url) {
                Ok(config) => config,
                Err(_) => return std::ptr::null_mut(),
            };
        }
        let client = FatSecretClient::new(config);
        Box::into_raw(Box::new(FfiFatSecretClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `fatsecret_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fatsecret_client_free(client: *mut FfiFatSecretClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a signed `foods.search` request.
///
/// `page_number` and `max_results` are omitted when negative.
/// Returns null if `client` or `expression` is null or not UTF-8.
/// The caller must free the returned pointer with `fatsecret_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn fatsecret_build_search_food(
    client: *const FfiFatSecretClient,
    expression: *const c_char,
    page_number: i64,
    max_results: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(expression) = (unsafe { borrow_str(expression) }) else {
            return std::ptr::null_mut();
        };
        let mut query = SearchQuery::new(expression);
        if let Ok(page) = u32::try_from(page_number) {
            query = query.page(page);
        }
        if let Ok(max) = u32::try_from(max_results) {
            query = query.max_results(max);
        }
        match client.inner.build_search_food(query) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a signed `foods.autocomplete` request.
///
/// Returns null if `client` or `expression` is null or not UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn fatsecret_build_autocomplete_food(
    client: *const FfiFatSecretClient,
    expression: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(expression) = (unsafe { borrow_str(expression) }) else {
            return std::ptr::null_mut();
        };
        match client.inner.build_autocomplete_food(expression) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a signed `food.get` request.
///
/// Returns null if `client` or `food_id` is null or not UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn fatsecret_build_get_food(
    client: *const FfiFatSecretClient,
    food_id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(id) = (unsafe { borrow_str(food_id) }) else {
            return std::ptr::null_mut();
        };
        match client.inner.build_get_food(id) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Validate the shared arguments of every `fatsecret_parse_*` function and
/// convert the response to its core form.
fn parse_args<'a>(
    client: *const FfiFatSecretClient,
    response: *const FfiHttpResponse,
) -> Result<(&'a FfiFatSecretClient, HttpResponse), *mut FfiFatSecretResult> {
    if client.is_null() {
        return Err(FfiFatSecretResult::null_arg("client"));
    }
    if response.is_null() {
        return Err(FfiFatSecretResult::null_arg("response"));
    }
    let client = unsafe { &*client };
    let resp = unsafe { &*response };
    let body = if resp.body.is_null() {
        String::new()
    } else {
        match unsafe { borrow_str(resp.body) } {
            Some(body) => body.to_string(),
            None => return Err(FfiFatSecretResult::invalid_arg("response.body")),
        }
    };
    Ok((
        client,
        HttpResponse {
            status: resp.status,
            headers: Vec::new(),
            body,
        },
    ))
}

/// Parse the response to a `foods.search` request.
///
/// Returns a result with `data_tag = SearchResult` on success.
#[unsafe(no_mangle)]
pub extern "C" fn fatsecret_parse_search_food(
    client: *const FfiFatSecretClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFatSecretResult {
    catch_unwind(|| {
        let (client, resp) = match parse_args(client, response) {
            Ok(args) => args,
            Err(result) => return result,
        };
        match client.inner.parse_search_food(resp) {
            Ok(result) => FfiFatSecretResult::ok_search(result),
            Err(e) => FfiFatSecretResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiFatSecretResult::panic("panic in fatsecret_parse_search_food"))
}

/// Parse the response to a `foods.autocomplete` request.
///
/// Returns a result with `data_tag = Suggestions` on success.
#[unsafe(no_mangle)]
pub extern "C" fn fatsecret_parse_autocomplete_food(
    client: *const FfiFatSecretClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFatSecretResult {
    catch_unwind(|| {
        let (client, resp) = match parse_args(client, response) {
            Ok(args) => args,
            Err(result) => return result,
        };
        match client.inner.parse_autocomplete_food(resp) {
            Ok(result) => FfiFatSecretResult::ok_suggestions(result),
            Err(e) => FfiFatSecretResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiFatSecretResult::panic("panic in fatsecret_parse_autocomplete_food"))
}

/// Parse the response to a `food.get` request.
///
/// Returns a result with `data_tag = Food` on success.
#[unsafe(no_mangle)]
pub extern "C" fn fatsecret_parse_get_food(
    client: *const FfiFatSecretClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFatSecretResult {
    catch_unwind(|| {
        let (client, resp) = match parse_args(client, response) {
            Ok(args) => args,
            Err(result) => return result,
        };
        match client.inner.parse_get_food(resp) {
            Ok(food) => FfiFatSecretResult::ok_food(food),
            Err(e) => FfiFatSecretResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiFatSecretResult::panic("panic in fatsecret_parse_get_food"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `fatsecret_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fatsecret_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        unsafe {
            free_c_string(req.url);
            free_c_string(req.body);
            for h in from_raw_slice(req.headers, req.headers_len).iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiFatSecretResult` returned by any `fatsecret_parse_*`
/// function. Safe to call with null. Uses `data_tag` to determine what
/// `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn fatsecret_free_result(result: *mut FfiFatSecretResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        unsafe { free_c_string(result.error_message) };
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::SearchResult => unsafe {
                let search = Box::from_raw(result.data as *mut FfiSearchResult);
                for food in from_raw_slice(search.foods, search.foods_len).iter() {
                    free_food_summary_fields(food);
                }
            },
            FfiDataTag::Suggestions => unsafe {
                let list = Box::from_raw(result.data as *mut FfiSuggestionList);
                for item in from_raw_slice(list.items, list.len).iter() {
                    free_c_string(*item);
                }
            },
            FfiDataTag::Food => unsafe {
                let food = Box::from_raw(result.data as *mut FfiFood);
                free_c_string(food.food_id);
                free_c_string(food.food_name);
                free_c_string(food.food_type);
                free_c_string(food.brand_name);
                free_c_string(food.food_url);
                for serving in from_raw_slice(food.servings, food.servings_len).iter() {
                    free_serving_fields(serving);
                }
            },
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fatsecret_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| unsafe { free_c_string(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    const BASE_URL: &str = "http://localhost:3000/rest/server.api";

    fn client() -> *mut FfiFatSecretClient {
        let key = CString::new("test-key").unwrap();
        let secret = CString::new("test-secret").unwrap();
        let url = CString::new(BASE_URL).unwrap();
        let client = fatsecret_client_new(key.as_ptr(), secret.as_ptr(), url.as_ptr());
        assert!(!client.is_null());
        client
    }

    fn str_of<'a>(ptr: *const c_char) -> &'a str {
        assert!(!ptr.is_null());
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
    }

    fn parse_with(
        parse: extern "C" fn(*const FfiFatSecretClient, *const FfiHttpResponse) -> *mut FfiFatSecretResult,
        status: u16,
        body: &str,
    ) -> *mut FfiFatSecretResult {
        let client = client();
        let body = CString::new(body).unwrap();
        let resp = FfiHttpResponse {
            status,
            body: body.as_ptr(),
        };
        let result = parse(client, &resp);
        assert!(!result.is_null());
        fatsecret_client_free(client);
        result
    }

    #[test]
    fn client_new_and_free() {
        let client = client();
        fatsecret_client_free(client);
    }

    #[test]
    fn client_new_default_url() {
        let key = CString::new("k").unwrap();
        let secret = CString::new("s").unwrap();
        let client = fatsecret_client_new(key.as_ptr(), secret.as_ptr(), std::ptr::null());
        assert!(!client.is_null());

        let id = CString::new("1").unwrap();
        let req = fatsecret_build_get_food(client, id.as_ptr());
        let url = str_of(unsafe { &*req }.url);
        assert!(url.starts_with("https://platform.fatsecret.com/rest/server.api?"), "{url}");

        fatsecret_free_request(req);
        fatsecret_client_free(client);
    }

    #[test]
    fn client_new_null_credentials_return_null() {
        let key = CString::new("k").unwrap();
        assert!(fatsecret_client_new(std::ptr::null(), key.as_ptr(), std::ptr::null()).is_null());
        assert!(fatsecret_client_new(key.as_ptr(), std::ptr::null(), std::ptr::null()).is_null());
    }

    #[test]
    fn client_new_bad_url_returns_null() {
        let key = CString::new("k").unwrap();
        let url = CString::new("ftp://example.com/api").unwrap();
        assert!(fatsecret_client_new(key.as_ptr(), key.as_ptr(), url.as_ptr()).is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        fatsecret_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_get_food_returns_signed_post() {
        let client = client();
        let id = CString::new("12345").unwrap();
        let req = fatsecret_build_get_food(client, id.as_ptr());
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Post));
        let url = str_of(req_ref.url);
        assert!(url.starts_with(&format!("{BASE_URL}?food_id=12345&format=json&method=food.get")), "{url}");
        assert!(url.contains("&oauth_signature="));
        assert!(req_ref.body.is_null());

        assert_eq!(req_ref.headers_len, 1);
        let header = unsafe { &*req_ref.headers };
        assert_eq!(str_of(header.key), "accept");
        assert_eq!(str_of(header.value), "application/json");

        fatsecret_free_request(req);
        fatsecret_client_free(client);
    }

    #[test]
    fn build_search_food_omits_negative_paging() {
        let client = client();
        let expr = CString::new("apple pie").unwrap();

        let req = fatsecret_build_search_food(client, expr.as_ptr(), -1, -1);
        let url = str_of(unsafe { &*req }.url);
        assert!(url.contains("search_expression=apple%20pie"));
        assert!(!url.contains("page_number"));
        assert!(!url.contains("max_results"));
        fatsecret_free_request(req);

        let req = fatsecret_build_search_food(client, expr.as_ptr(), 2, 10);
        let url = str_of(unsafe { &*req }.url);
        assert!(url.contains("page_number=2"));
        assert!(url.contains("max_results=10"));
        fatsecret_free_request(req);

        fatsecret_client_free(client);
    }

    #[test]
    fn build_autocomplete_food_encodes_plus() {
        let client = client();
        let expr = CString::new("chick+pea").unwrap();
        let req = fatsecret_build_autocomplete_food(client, expr.as_ptr());
        let url = str_of(unsafe { &*req }.url);
        assert!(url.contains("expression=chick%2Bpea"));
        assert!(url.contains("method=foods.autocomplete"));
        fatsecret_free_request(req);
        fatsecret_client_free(client);
    }

    #[test]
    fn build_with_null_args_returns_null() {
        let client = client();
        assert!(fatsecret_build_get_food(client, std::ptr::null()).is_null());
        assert!(fatsecret_build_autocomplete_food(client, std::ptr::null()).is_null());
        assert!(fatsecret_build_search_food(client, std::ptr::null(), -1, -1).is_null());
        let id = CString::new("1").unwrap();
        assert!(fatsecret_build_get_food(std::ptr::null(), id.as_ptr()).is_null());
        fatsecret_client_free(client);
    }

    #[test]
    fn parse_search_food_two_hits() {
        let result = parse_with(
            fatsecret_parse_search_food,
            200,
            r#"{"foods":{"food":[
                {"food_id":"35718","food_name":"Apple","food_type":"Generic"},
                {"food_id":"39027","food_name":"Apple Pie","brand_name":"Mrs. Smith's"}
            ],"max_results":"20","page_number":"0","total_results":"2"}}"#,
        );
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        assert_eq!(r.data_tag, FfiDataTag::SearchResult);

        let search = unsafe { &*(r.data as *const FfiSearchResult) };
        assert_eq!(search.foods_len, 2);
        assert_eq!(search.total_results, 2);
        assert_eq!(search.max_results, 20);

        let foods = unsafe { std::slice::from_raw_parts(search.foods, search.foods_len as usize) };
        assert_eq!(str_of(foods[0].food_id), "35718");
        assert_eq!(str_of(foods[0].food_type), "Generic");
        assert!(foods[0].brand_name.is_null());
        assert_eq!(str_of(foods[1].brand_name), "Mrs. Smith's");

        fatsecret_free_result(result);
    }

    #[test]
    fn parse_search_food_empty() {
        let result = parse_with(
            fatsecret_parse_search_food,
            200,
            r#"{"foods":{"max_results":"20","page_number":"0","total_results":"0"}}"#,
        );
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        let search = unsafe { &*(r.data as *const FfiSearchResult) };
        assert_eq!(search.foods_len, 0);
        assert!(search.foods.is_null());
        fatsecret_free_result(result);
    }

    #[test]
    fn parse_autocomplete_food_single_suggestion() {
        let result = parse_with(
            fatsecret_parse_autocomplete_food,
            200,
            r#"{"suggestions":{"suggestion":"chickpeas"}}"#,
        );
        let r = unsafe { &*result };
        assert_eq!(r.data_tag, FfiDataTag::Suggestions);
        let list = unsafe { &*(r.data as *const FfiSuggestionList) };
        assert_eq!(list.len, 1);
        let items = unsafe { std::slice::from_raw_parts(list.items, list.len as usize) };
        assert_eq!(str_of(items[0]), "chickpeas");
        fatsecret_free_result(result);
    }

    #[test]
    fn parse_get_food_with_serving() {
        let result = parse_with(
            fatsecret_parse_get_food,
            200,
            r#"{"food":{"food_id":"12345","food_name":"Greek Yogurt","servings":{"serving":
                {"serving_id":"50321","serving_description":"1 cup","calories":"146","protein":"20.00"}}}}"#,
        );
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Food);

        let food = unsafe { &*(r.data as *const FfiFood) };
        assert_eq!(str_of(food.food_name), "Greek Yogurt");
        assert!(food.food_type.is_null());
        assert_eq!(food.servings_len, 1);
        let serving = unsafe { &*food.servings };
        assert_eq!(str_of(serving.serving_id), "50321");
        assert_eq!(serving.calories, 146.0);
        assert_eq!(serving.protein, 20.0);
        assert!(serving.fat.is_nan());

        fatsecret_free_result(result);
    }

    #[test]
    fn parse_invalid_consumer_key() {
        let result = parse_with(
            fatsecret_parse_get_food,
            200,
            r#"{"error":{"code":5,"message":"Invalid consumer key"}}"#,
        );
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::InvalidConsumerKey);
        assert_eq!(r.api_error_code, 5);
        assert!(str_of(r.error_message).contains("Invalid consumer key"));
        assert!(r.data.is_null());
        fatsecret_free_result(result);
    }

    #[test]
    fn parse_invalid_signature() {
        let result = parse_with(
            fatsecret_parse_search_food,
            401,
            r#"{"error":{"code":8,"message":"Invalid signature"}}"#,
        );
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::InvalidSignature);
        assert_eq!(r.api_error_code, 8);
        fatsecret_free_result(result);
    }

    #[test]
    fn parse_unknown_api_error() {
        let result = parse_with(
            fatsecret_parse_get_food,
            200,
            r#"{"error":{"code":106,"message":"Invalid ID"}}"#,
        );
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::UnknownApi);
        assert_eq!(r.api_error_code, 106);
        fatsecret_free_result(result);
    }

    #[test]
    fn parse_http_error() {
        let result = parse_with(fatsecret_parse_autocomplete_food, 503, "Service Unavailable");
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Http);
        assert_eq!(r.http_status, 503);
        fatsecret_free_result(result);
    }

    #[test]
    fn parse_unexpected_payload_is_decode_error() {
        let result = parse_with(fatsecret_parse_get_food, 200, r#"{"unexpected":1}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Decode);
        assert_eq!(r.api_error_code, -1);
        fatsecret_free_result(result);
    }

    #[test]
    fn parse_null_client_returns_null_arg() {
        let body = CString::new("{}").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = fatsecret_parse_search_food(std::ptr::null(), &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert_eq!(str_of(r.error_message), "null argument: client");
        fatsecret_free_result(result);
    }

    #[test]
    fn parse_null_response_returns_null_arg() {
        let client = client();
        let result = fatsecret_parse_get_food(client, std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        fatsecret_free_result(result);
        fatsecret_client_free(client);
    }

    #[test]
    fn parse_null_body_is_empty() {
        let client = client();
        let resp = FfiHttpResponse {
            status: 200,
            body: std::ptr::null(),
        };
        let result = fatsecret_parse_get_food(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Decode);
        fatsecret_free_result(result);
        fatsecret_client_free(client);
    }

    #[test]
    fn parse_non_utf8_body_is_invalid_arg() {
        let client = client();
        let body = CString::new(vec![b'{', 0xff, b'}']).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = fatsecret_parse_get_food(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::InvalidArg);
        fatsecret_free_result(result);
        fatsecret_client_free(client);
    }

    #[test]
    fn free_request_null_is_safe() {
        fatsecret_free_request(std::ptr::null_mut());
    }

    #[test]
    fn free_result_null_is_safe() {
        fatsecret_free_result(std::ptr::null_mut());
    }

    #[test]
    fn free_string_null_is_safe() {
        fatsecret_free_string(std::ptr::null_mut());
    }
}
