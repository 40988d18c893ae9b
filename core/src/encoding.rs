//! RFC 3986 percent-encoding as OAuth 1.0a requires it.
//!
//! Only the unreserved set (`ALPHA / DIGIT / "-" / "." / "_" / "~"`) passes
//! through. Everything else, including `+` and space, becomes `%XX` with
//! uppercase hex over the UTF-8 bytes.

use std::borrow::Cow;
use std::str::Utf8Error;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, UNRESERVED).to_string()
}

/// Reverse of [`percent_encode`]. `+` is left alone; it never means space here.
pub fn percent_decode(input: &str) -> Result<Cow<'_, str>, Utf8Error> {
    percent_decode_str(input).decode_utf8()
}
