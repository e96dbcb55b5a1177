//! Text normalization shared by the taxonomy and the categorizer

/// Case-fold, drop apostrophes, turn every other non-alphanumeric character
/// into a separator and collapse whitespace.
///
/// `"McDonald's - Lunch!"` becomes `"mcdonalds lunch"`.
///
/// Folding is lowercasing plus the special cases where lowercase forms still
/// differ: `ß` folds to `ss` and final sigma `ς` to `σ`. Other full
/// case-folding expansions are not applied.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if c == 'ß' {
            out.push_str("ss");
        } else if c == 'ς' {
            out.push('σ');
        } else if c.is_alphanumeric() {
            out.push(c);
        } else if c == '\'' || c == '\u{2019}' {
            continue;
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized whitespace-separated tokens
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("McDonald's - Lunch!"), "mcdonalds lunch");
        assert_eq!(normalize("  GROCERY   store "), "grocery store");
        assert_eq!(normalize("uber-eats"), "uber eats");
        assert_eq!(normalize("???"), "");
        assert_eq!(normalize("CAFÉ Ünter"), "café ünter");
    }

    #[test]
    fn test_normalize_folds_special_cases() {
        assert_eq!(normalize("Straße"), normalize("STRASSE"));
        assert_eq!(normalize("Straße"), "strasse");
        assert_eq!(normalize("ΟΔΟΣ"), normalize("οδος"));
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Uber ride, to airport."), vec!["uber", "ride", "to", "airport"]);
        assert!(tokenize("   ").is_empty());
    }
}
