//! Browser cookie jar access. The jar-string scanning is plain Rust so the
//! parsing stays testable; only the actual read/write goes through
//! `HtmlDocument`.

use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

use crate::ui::web_document;

pub fn get(name: &str) -> Option<String> {
    let doc = html_document()?;
    let jar = doc.cookie().ok()?;
    find_in_jar(&jar, name).map(decode_component)
}

pub fn set(name: &str, value: &str) {
    let Some(doc) = html_document() else {
        return;
    };
    let _ = doc.set_cookie(&format!("{name}={}; path=/", encode_component(value)));
}

fn html_document() -> Option<HtmlDocument> {
    web_document()?.dyn_into::<HtmlDocument>().ok()
}

/// Finds the raw (still percent-encoded) value for `name` in a cookie jar
/// string like `a=1; kanku_job=%7B%7D; b=2`.
pub(crate) fn find_in_jar<'a>(jar: &'a str, name: &str) -> Option<&'a str> {
    jar.split(';').map(str::trim).find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then_some(value)
    })
}

fn encode_component(input: &str) -> String {
    js_sys::encode_uri_component(input)
        .as_string()
        .unwrap_or_else(|| input.to_string())
}

fn decode_component(input: &str) -> String {
    js_sys::decode_uri_component(input)
        .ok()
        .and_then(|decoded| decoded.as_string())
        .unwrap_or_else(|| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::find_in_jar;

    #[test]
    fn finds_cookie_among_siblings() {
        let jar = "session=abc123; kanku_job=%7B%22sync%22%3A%5B%5D%7D; theme=dark";
        assert_eq!(
            find_in_jar(jar, "kanku_job"),
            Some("%7B%22sync%22%3A%5B%5D%7D")
        );
        assert_eq!(find_in_jar(jar, "session"), Some("abc123"));
        assert_eq!(find_in_jar(jar, "theme"), Some("dark"));
    }

    #[test]
    fn missing_and_empty_jars_yield_none() {
        assert_eq!(find_in_jar("", "kanku_job"), None);
        assert_eq!(find_in_jar("session=abc", "kanku_job"), None);
    }

    #[test]
    fn value_may_contain_equals_signs() {
        assert_eq!(find_in_jar("token=a=b=c", "token"), Some("a=b=c"));
    }

    #[test]
    fn partial_name_does_not_match() {
        assert_eq!(find_in_jar("kanku_job_old=x", "kanku_job"), None);
    }
}
