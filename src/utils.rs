//! Naming utilities for parameter allocation.
//!
//! Parameter names are derived from user-facing field names, so they have to be
//! normalised into identifiers before they can be used as `$placeholders`.

/// Stem used when a requested name has no identifier characters left.
pub const DEFAULT_STEM: &str = "p";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Upper,
    Lower,
    Digit,
}

fn classify(c: char) -> CharClass {
    if c.is_numeric() {
        CharClass::Digit
    } else if c.is_uppercase() {
        CharClass::Upper
    } else {
        CharClass::Lower
    }
}

/// Split a string into words on separators, case changes and letter/digit boundaries.
///
/// `"XMLHttpRequest"` splits into `["XML", "Http", "Request"]`, `"aString7"` into
/// `["a", "String", "7"]`.
fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();

    for run in s.split(|c: char| !c.is_alphanumeric()).filter(|r| !r.is_empty()) {
        let chars: Vec<char> = run.chars().collect();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            if let Some(&prev) = i.checked_sub(1).and_then(|p| chars.get(p)) {
                let (pc, cc) = (classify(prev), classify(c));
                let next_is_lower = chars
                    .get(i + 1)
                    .is_some_and(|&n| classify(n) == CharClass::Lower);

                let boundary = match (pc, cc) {
                    (CharClass::Lower, CharClass::Upper) => true,
                    (CharClass::Digit, CharClass::Upper | CharClass::Lower) => true,
                    (CharClass::Upper | CharClass::Lower, CharClass::Digit) => true,
                    (CharClass::Upper, CharClass::Upper) => next_is_lower,
                    _ => false,
                };

                if boundary && !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
        }

        if !current.is_empty() {
            words.push(current);
        }
    }

    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Convert a string to camelCase, dropping every non-identifier character.
///
/// # Examples
///
/// ```
/// use cypher_builder::utils::camel_case;
///
/// assert_eq!(camel_case("lower_age"), "lowerAge");
/// assert_eq!(camel_case("Name"), "name");
/// assert_eq!(camel_case("aString7"), "aString7");
/// ```
pub fn camel_case(s: &str) -> String {
    split_words(s)
        .iter()
        .enumerate()
        .map(|(i, word)| {
            if i == 0 {
                word.to_lowercase()
            } else {
                capitalize(word)
            }
        })
        .collect()
}

/// Split a trailing decimal suffix off a name.
///
/// Returns the stem and the parsed suffix, or `None` when there is no suffix
/// (or it does not fit in a `u64`).
fn split_numeric_suffix(name: &str) -> (&str, Option<u64>) {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &name[stem.len()..];
    if digits.is_empty() {
        return (name, None);
    }
    match digits.parse::<u64>() {
        Ok(n) => (stem, Some(n)),
        Err(_) => (name, None),
    }
}

/// Suffix implied by an existing name for a given stem, if it belongs to that stem.
///
/// A bare stem counts as suffix `1`.
fn taken_suffix(existing: &str, stem: &str) -> Option<u64> {
    let rest = existing.strip_prefix(stem)?;
    if rest.is_empty() {
        return Some(1);
    }
    if !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// Produce a name derived from `requested` that does not collide with `existing`.
///
/// The requested name is camel-cased first. A trailing number is kept if it is
/// free; otherwise the next suffix after the highest one taken for the same stem
/// is used. A suffix of `1` is never rendered.
///
/// # Examples
///
/// ```
/// use cypher_builder::utils::unique_string;
///
/// let existing = ["aString6", "aString7", "aString8"];
/// assert_eq!(unique_string("aString7", existing), "aString9");
/// assert_eq!(unique_string("name", ["name"]), "name2");
/// ```
pub fn unique_string<'a, I>(requested: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut canonical = camel_case(requested);
    if canonical.trim_end_matches(|c: char| c.is_ascii_digit()).is_empty() {
        canonical.insert_str(0, DEFAULT_STEM);
    }

    let (stem, requested_suffix) = split_numeric_suffix(&canonical);

    let taken: Vec<u64> = existing
        .into_iter()
        .filter_map(|name| taken_suffix(name, stem))
        .collect();

    let suffix = match requested_suffix {
        Some(n) if n != 0 && !taken.contains(&n) => n,
        _ => match taken.iter().copied().max().unwrap_or(0).checked_add(1) {
            Some(next) => next,
            // Highest suffix is saturated; take the lowest free one instead
            None => (1..)
                .find(|n| !taken.contains(n))
                .unwrap_or(u64::MAX),
        },
    };

    if suffix == 1 {
        stem.to_string()
    } else {
        format!("{}{}", stem, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("name", "name")]
    #[case("Name", "name")]
    #[case("first_name", "firstName")]
    #[case("first name", "firstName")]
    #[case("user.name", "userName")]
    #[case("XMLHttpRequest", "xmlHttpRequest")]
    #[case("lower_firstName", "lowerFirstName")]
    #[case("aString7", "aString7")]
    #[case("--weird--", "weird")]
    #[case("", "")]
    fn test_camel_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(camel_case(input), expected);
    }

    #[rstest]
    fn test_unique_string_free_name() {
        assert_eq!(unique_string("name", []), "name");
    }

    #[rstest]
    fn test_unique_string_taken_name_gets_suffix() {
        assert_eq!(unique_string("name", ["name"]), "name2");
        assert_eq!(unique_string("name", ["name", "name2"]), "name3");
    }

    #[rstest]
    fn test_unique_string_keeps_free_numeric_suffix() {
        assert_eq!(unique_string("aString7", ["aString6", "aString8"]), "aString7");
    }

    #[rstest]
    fn test_unique_string_taken_numeric_suffix() {
        let existing = ["aString6", "aString7", "aString8"];
        assert_eq!(unique_string("aString7", existing), "aString9");
    }

    #[rstest]
    fn test_unique_string_skips_past_suffixed_variants() {
        // "name5" exists without a bare "name": a new "name" must not collide with it
        assert_eq!(unique_string("name", ["name5"]), "name6");
    }

    #[rstest]
    fn test_unique_string_ignores_other_stems() {
        assert_eq!(unique_string("name", ["names", "nameX", "firstName"]), "name");
    }

    #[rstest]
    fn test_unique_string_zero_suffix_is_reallocated() {
        assert_eq!(unique_string("p0", []), "p");
    }

    #[rstest]
    fn test_unique_string_empty_stem_falls_back() {
        assert_eq!(unique_string("", []), "p");
        assert_eq!(unique_string("123", []), "p123");
        assert_eq!(unique_string("$$", ["p"]), "p2");
    }

    #[rstest]
    fn test_unique_string_saturated_suffix() {
        let max = format!("name{}", u64::MAX);
        assert_eq!(unique_string("name", [max.as_str()]), "name");
        assert_eq!(unique_string("name", [max.as_str(), "name", "name2"]), "name3");
        assert_eq!(unique_string(&max, [max.as_str()]), "name");
    }

    #[rstest]
    fn test_unique_string_canonicalises_request() {
        assert_eq!(unique_string("first name", ["firstName"]), "firstName2");
    }
}
