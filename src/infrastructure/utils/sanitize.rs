use once_cell::sync::Lazy;
use regex::Regex;

static ANGLE_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[<>]").unwrap());
static SCRIPT_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)javascript:").unwrap());
static EVENT_HANDLER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)on\w+=").unwrap());

/// Neutralizes plain-text form input before it is interpolated into an HTML email.
///
/// Removes `<` and `>`, the `javascript:` scheme and `on<word>=` handler prefixes,
/// then trims. Removals repeat until nothing matches, because deleting one match
/// can splice a new one together (`javajavascript:script:`). This keeps the
/// function idempotent. It is not an HTML sanitizer.
pub fn sanitize_input(input: &str) -> String {
    let mut current = input.to_string();

    loop {
        let stripped = ANGLE_BRACKETS.replace_all(&current, "");
        let stripped = SCRIPT_SCHEME.replace_all(&stripped, "");
        let stripped = EVENT_HANDLER.replace_all(&stripped, "").into_owned();

        if stripped == current {
            break;
        }
        current = stripped;
    }

    current.trim().to_string()
}

/// True when the text still contains anything `sanitize_input` would remove.
pub fn contains_unsafe_markup(input: &str) -> bool {
    ANGLE_BRACKETS.is_match(input) || SCRIPT_SCHEME.is_match(input) || EVENT_HANDLER.is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "   plain text   ",
        "<script>alert(1)</script>",
        "<img src=x onerror=alert(1)>",
        "JavaScript:alert(1)",
        "javajavascript:script:void(0)",
        "oonclick=nclick=evil",
        "on<click=",
        "java<script:",
        "  <b>Jane</b> Doe  ",
        "Ünïcödé onmouseover= text",
        "Budget is < $10k & timeline > 3 months",
    ];

    #[test]
    fn removes_markup_and_trims() {
        assert_eq!(sanitize_input("  <b>Jane</b> Doe  "), "bJane/b Doe");
        assert_eq!(sanitize_input("click javascript:alert(1)"), "click alert(1)");
        assert_eq!(sanitize_input("x onclick=steal()"), "x steal()");
        assert_eq!(sanitize_input("Acme Inc"), "Acme Inc");
    }

    #[test]
    fn output_contains_no_unsafe_patterns() {
        for sample in SAMPLES {
            let clean = sanitize_input(sample);
            assert!(!contains_unsafe_markup(&clean), "{sample:?} -> {clean:?}");
        }
    }

    #[test]
    fn sanitize_is_idempotent() {
        for sample in SAMPLES {
            let once = sanitize_input(sample);
            assert_eq!(sanitize_input(&once), once, "input {sample:?}");
        }
    }

    #[test]
    fn spliced_patterns_do_not_survive() {
        assert_eq!(sanitize_input("javajavascript:script:x"), "x");
        assert_eq!(sanitize_input("oonclick=nclick=x"), "x");
    }
}
