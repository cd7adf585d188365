// src/sanitize.rs
//! Filesystem-safe names for downloaded question images.

use once_cell::sync::OnceCell;
use regex::Regex;

const MAX_LEN: usize = 100;
const FALLBACK: &str = "untitled";

/// Map arbitrary text to a safe, length-bounded filename.
/// Total function: never errors, never returns an empty string.
pub fn sanitize_filename(name: &str) -> String {
    static RE_INVALID: OnceCell<Regex> = OnceCell::new();
    let re_invalid = RE_INVALID.get_or_init(|| Regex::new(r#"[<>:"|?*]"#).unwrap());

    let mut out: String = name
        .chars()
        .filter(|c| *c != '\0')
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect();
    out = re_invalid.replace_all(&out, "").to_string();

    if out.chars().count() > MAX_LEN {
        let shortened = {
            let (stem, ext) = split_extension(&out);
            let keep = MAX_LEN.saturating_sub(ext.chars().count());
            let stem: String = stem.chars().take(keep).collect();
            format!("{stem}{ext}")
        };
        out = shortened;
    }

    out = out.trim_matches(|c| c == ' ' || c == '.').to_string();
    if out.is_empty() {
        out = FALLBACK.to_string();
    }
    out
}

/// Split `"photo.png"` into `("photo", ".png")`. A leading dot or a missing
/// dot yields an empty extension, matching `os.path.splitext` behavior.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_invalid_chars_and_separators() {
        let out = sanitize_filename("a/b\\c<d>e:f\"g|h?i*j\0k");
        assert_eq!(out, "a-b-cdefghijk");
    }

    #[test]
    fn truncates_but_keeps_extension() {
        let long = format!("{}.png", "x".repeat(200));
        let out = sanitize_filename(&long);
        assert_eq!(out.chars().count(), 100);
        assert!(out.ends_with(".png"));
    }

    #[test]
    fn short_names_keep_extension_unchanged() {
        assert_eq!(sanitize_filename("7_2024_03_01.jpeg"), "7_2024_03_01.jpeg");
    }

    #[test]
    fn trims_dots_and_spaces() {
        assert_eq!(sanitize_filename("  .name.  "), "name");
    }

    #[test]
    fn empty_input_gets_placeholder() {
        assert_eq!(sanitize_filename(""), "untitled");
        assert_eq!(sanitize_filename(" .. "), "untitled");
        assert_eq!(sanitize_filename("???"), "untitled");
    }

    #[test]
    fn split_extension_matches_splitext() {
        assert_eq!(split_extension("a.png"), ("a", ".png"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("noext"), ("noext", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
    }
}
