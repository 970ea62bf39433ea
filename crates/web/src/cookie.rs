//! `Cookie` header helpers.
//!
//! Cookies travel as opaque `name=value` strings joined by `"; "`; no attribute parsing or
//! percent-decoding is applied.

const SEPARATOR: &str = "; ";

/// Joins cookies into a single `Cookie` header value.
pub fn encode_cookie_header<S: AsRef<str>>(cookies: &[S]) -> String {
    cookies.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(SEPARATOR)
}

/// Splits a `Cookie` header value into its cookies, in header order.
///
/// An empty header holds no cookies.
pub fn decode_cookie_header(encoded: &str) -> Vec<String> {
    if encoded.is_empty() {
        return Vec::new();
    }
    encoded.split(SEPARATOR).map(str::to_string).collect()
}

/// Returns the value of the cookie called `name`.
pub fn find_cookie<'a, S: AsRef<str>>(cookies: &'a [S], name: &str) -> Option<&'a str> {
    cookies.iter().find_map(|cookie| {
        let (key, value) = cookie.as_ref().split_once('=')?;
        (key == name).then_some(value)
    })
}
