//! CSRF token discovery from cookies and page markup.

use std::sync::LazyLock;

use regex::Regex;

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CSRF_COOKIE: &str = "csrftoken";

static COOKIE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[;,]\s*)csrftoken=([^;,\s]+)").expect("valid cookie regex"));

static HIDDEN_INPUT: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#"<input[^>]*\bname=["']csrfmiddlewaretoken["'][^>]*\bvalue=["']([^"']+)["']"#)
            .expect("valid input regex"),
        Regex::new(r#"<input[^>]*\bvalue=["']([^"']+)["'][^>]*\bname=["']csrfmiddlewaretoken["']"#)
            .expect("valid input regex"),
    ]
});

static META_TAG: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#"<meta[^>]*\bname=["']csrf-token["'][^>]*\bcontent=["']([^"']+)["']"#)
            .expect("valid meta regex"),
        Regex::new(r#"<meta[^>]*\bcontent=["']([^"']+)["'][^>]*\bname=["']csrf-token["']"#)
            .expect("valid meta regex"),
    ]
});

/// Token from a `Cookie` or `Set-Cookie` header value.
pub fn token_from_cookie(header: &str) -> Option<String> {
    COOKIE_TOKEN
        .captures(header.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Token from page markup: the hidden form field first, then the meta tag.
pub fn token_from_html(html: &str) -> Option<String> {
    HIDDEN_INPUT
        .iter()
        .chain(META_TAG.iter())
        .find_map(|re| re.captures(html))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// First token found across cookies, then markup.
pub fn discover<'a>(
    cookies: impl IntoIterator<Item = &'a str>,
    html: Option<&str>,
) -> Option<String> {
    cookies
        .into_iter()
        .find_map(token_from_cookie)
        .or_else(|| html.and_then(token_from_html))
}
