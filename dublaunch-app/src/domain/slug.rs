use regex_lite::Regex;
use std::sync::OnceLock;

pub const MAX_SLUG_LEN: usize = 200;

fn disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9\s-]").expect("static regex"))
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn hyphen_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-+").expect("static regex"))
}

/// Turns a launch title into its base slug.
///
/// Accented letters are folded to ASCII first, so `"Café"` becomes `"cafe"`.
/// Anything that is not a lowercase letter, digit, whitespace or hyphen is then
/// dropped, whitespace runs become one hyphen, hyphen runs collapse and the ends are
/// trimmed. May return an empty string.
pub fn normalize(title: &str) -> String {
    let folded = deunicode::deunicode(title).to_lowercase();
    let stripped = disallowed().replace_all(folded.trim(), "");
    let hyphenated = whitespace_runs().replace_all(&stripped, "-");
    let collapsed = hyphen_runs().replace_all(&hyphenated, "-");
    let trimmed = collapsed.trim_matches('-');

    if trimmed.len() > MAX_SLUG_LEN {
        trimmed[..MAX_SLUG_LEN].trim_end_matches('-').to_string()
    } else {
        trimmed.to_string()
    }
}

/// `base` for suffix `None`, `base-n` otherwise.
pub fn with_suffix(base: &str, suffix: Option<u32>) -> String {
    match suffix {
        None => base.to_string(),
        Some(n) => format!("{}-{}", base, n),
    }
}

pub fn is_valid(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN + 16
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
