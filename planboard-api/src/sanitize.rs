//! HTML stripping for user-supplied text
//!
//! Every request body implements [`Sanitize`]; the route layer runs it
//! before validation, so an input that is only markup (`"<b></b>"`) fails
//! a "required" rule just like an empty string. Passwords and tokens are
//! never touched.

use std::sync::LazyLock;

use regex::Regex;

// Elements whose text content is dropped along with the tags
static SCRIPT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex"));

static STYLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid regex"));

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

/// Removes all HTML tags, and the contents of `<script>` and `<style>`
pub fn strip_tags(input: &str) -> String {
    if !input.contains('<') {
        return input.to_string();
    }

    let without_scripts = SCRIPT_REGEX.replace_all(input, "");
    let without_styles = STYLE_REGEX.replace_all(&without_scripts, "");
    TAG_REGEX.replace_all(&without_styles, "").into_owned()
}

/// Strips tags from a required field in place
pub fn clean(field: &mut String) {
    *field = strip_tags(field);
}

/// Strips tags from an optional field in place
pub fn clean_opt(field: &mut Option<String>) {
    if let Some(value) = field {
        clean(value);
    }
}

/// Request bodies whose free-text fields are stripped of markup
pub trait Sanitize {
    fn sanitize(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_unchanged() {
        assert_eq!(strip_tags("Trip Plan"), "Trip Plan");
        assert_eq!(strip_tags("a > b"), "a > b");
        assert_eq!(strip_tags(""), "");
    }

    #[test]
    fn test_tags_are_removed() {
        assert_eq!(strip_tags("<b>Trip</b> Plan"), "Trip Plan");
        assert_eq!(strip_tags("<a href=\"x\">link</a>"), "link");
        assert_eq!(strip_tags("<img src=x onerror=alert(1)>"), "");
        assert_eq!(strip_tags("line<br/>break"), "linebreak");
    }

    #[test]
    fn test_script_and_style_contents_are_dropped() {
        assert_eq!(strip_tags("Hi<script>alert('x')</script>!"), "Hi!");
        assert_eq!(strip_tags("<STYLE type=\"text/css\">p{}</STYLE>ok"), "ok");
    }

    #[test]
    fn test_clean_helpers() {
        let mut title = "<i>To Do</i>".to_string();
        clean(&mut title);
        assert_eq!(title, "To Do");

        let mut description = Some("<p>Notes</p>".to_string());
        clean_opt(&mut description);
        assert_eq!(description.as_deref(), Some("Notes"));

        let mut missing: Option<String> = None;
        clean_opt(&mut missing);
        assert!(missing.is_none());
    }
}
