//! `%N` placeholder substitution.
//!
//! # Invariants
//!
//! 1. **Index-based**: `%1` always maps to `args[0]`, `%2` to `args[1]`, no
//!    matter where the token appears. Translations may reorder tokens freely.
//!
//! 2. **Single pass**: substituted values are never rescanned, so an argument
//!    containing `%1` is inserted verbatim.
//!
//! 3. **Token grammar**: `%` followed by one or two ASCII digits with a
//!    non-zero value (`%1`..`%99`). Two digits are read greedily, so `%12` is
//!    argument 12, not argument 1 followed by `2`. `%n` is the count in plural
//!    lookups. Any other `%` passes through unchanged.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing argument | `%3` with two args | Token kept (lenient) or `SubstitutionError` (strict) |
//! | `%n` without count | Non-plural lookup | Token kept in both modes |

use std::collections::BTreeSet;
use std::fmt;

/// What to do when a placeholder references an argument that was not
/// supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubstitutionMode {
    /// Leave the token in the output.
    #[default]
    Lenient,
    /// Fail with [`SubstitutionError`].
    Strict,
}

impl SubstitutionMode {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" | "relaxed" => Some(Self::Lenient),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for SubstitutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placeholder referenced an argument outside the supplied range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionError {
    /// 1-based placeholder index (`%3` → 3).
    pub index: usize,
    /// Number of arguments supplied.
    pub available: usize,
}

impl fmt::Display for SubstitutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "placeholder %{} has no argument ({} supplied)",
            self.index, self.available
        )
    }
}

impl std::error::Error for SubstitutionError {}

/// One recognized token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Arg(usize),
    Count,
}

/// Scan the token starting at `rest` (which begins just after a `%`).
/// Returns the token and its length in bytes, excluding the `%`.
fn scan(rest: &[u8]) -> Option<(Token, usize)> {
    match *rest.first()? {
        b'n' => Some((Token::Count, 1)),
        d @ b'0'..=b'9' => {
            let mut value = usize::from(d - b'0');
            let mut len = 1;
            if let Some(d2 @ b'0'..=b'9') = rest.get(1).copied() {
                value = value * 10 + usize::from(d2 - b'0');
                len = 2;
            }
            (value > 0).then_some((Token::Arg(value), len))
        }
        _ => None,
    }
}

/// Replace `%N` tokens in `template` with `args`, and `%n` with `count`
/// when given.
pub fn substitute(
    template: &str,
    args: &[&str],
    count: Option<i64>,
    mode: SubstitutionMode,
) -> Result<String, SubstitutionError> {
    if !template.contains('%') {
        return Ok(template.to_owned());
    }

    let bytes = template.as_bytes();
    let extra: usize = args.iter().map(|a| a.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        let Some((token, len)) = scan(&bytes[i + 1..]) else {
            i += 1;
            continue;
        };
        let end = i + 1 + len;
        // Tokens are ASCII, so `i` and `end` are char boundaries.
        out.push_str(&template[copied..i]);
        match token {
            Token::Arg(index) => match args.get(index - 1) {
                Some(value) => out.push_str(value),
                None if mode == SubstitutionMode::Strict => {
                    return Err(SubstitutionError {
                        index,
                        available: args.len(),
                    });
                }
                None => out.push_str(&template[i..end]),
            },
            Token::Count => match count {
                Some(n) => out.push_str(&n.to_string()),
                None => out.push_str(&template[i..end]),
            },
        }
        copied = end;
        i = end;
    }

    out.push_str(&template[copied..]);
    Ok(out)
}

/// Lenient substitution; never fails.
#[must_use]
pub fn substitute_lenient(template: &str, args: &[&str], count: Option<i64>) -> String {
    match substitute(template, args, count, SubstitutionMode::Lenient) {
        Ok(s) => s,
        Err(_) => template.to_owned(),
    }
}

/// The set of `%N` indices (1-based) referenced by `text`.
#[must_use]
pub fn placeholder_indices(text: &str) -> BTreeSet<usize> {
    let bytes = text.as_bytes();
    let mut found = BTreeSet::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some((token, len)) = scan(&bytes[i + 1..]) {
                if let Token::Arg(index) = token {
                    found.insert(index);
                }
                i += 1 + len;
                continue;
            }
        }
        i += 1;
    }
    found
}

/// Whether `text` contains a `%n` count token.
#[must_use]
pub fn uses_count(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some((token, len)) = scan(&bytes[i + 1..]) {
                if token == Token::Count {
                    return true;
                }
                i += 1 + len;
                continue;
            }
        }
        i += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(t: &str, args: &[&str]) -> String {
        substitute(t, args, None, SubstitutionMode::Lenient).unwrap()
    }

    #[test]
    fn positional_by_index() {
        assert_eq!(lenient("Valeur : %1 sur %2", &["3", "10"]), "Valeur : 3 sur 10");
        assert_eq!(lenient("%2 sur %1", &["3", "10"]), "10 sur 3");
    }

    #[test]
    fn repeated_token() {
        assert_eq!(lenient("%1 and %1", &["A"]), "A and A");
    }

    #[test]
    fn literal_percent_passes_through() {
        assert_eq!(lenient("100% done", &[]), "100% done");
        assert_eq!(lenient("%", &[]), "%");
        assert_eq!(lenient("50%%", &[]), "50%%");
        assert_eq!(lenient("%0 and %x", &["a"]), "%0 and %x");
        assert_eq!(lenient("%L1", &["a"]), "%L1");
    }

    #[test]
    fn two_digit_indices() {
        let args: Vec<String> = (1..=12).map(|i| format!("a{i}")).collect();
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        assert_eq!(lenient("%12-%1", &refs), "a12-a1");
        assert_eq!(lenient("%10", &refs), "a10");
    }

    #[test]
    fn missing_argument_lenient_keeps_token() {
        assert_eq!(lenient("%1 of %3", &["x"]), "x of %3");
    }

    #[test]
    fn missing_argument_strict_fails() {
        let err = substitute("%1 of %3", &["x"], None, SubstitutionMode::Strict).unwrap_err();
        assert_eq!(err, SubstitutionError { index: 3, available: 1 });
        assert_eq!(err.to_string(), "placeholder %3 has no argument (1 supplied)");
    }

    #[test]
    fn values_not_rescanned() {
        assert_eq!(lenient("%1 %2", &["%2", "b"]), "%2 b");
    }

    #[test]
    fn count_token() {
        assert_eq!(substitute_lenient("%n files in %1", &["/tmp"], Some(3)), "3 files in /tmp");
        assert_eq!(substitute_lenient("%n files", &[], None), "%n files");
    }

    #[test]
    fn unicode_around_tokens() {
        assert_eq!(lenient("→%1←", &["é"]), "→é←");
        assert_eq!(lenient("日本%1語", &["x"]), "日本x語");
    }

    #[test]
    fn inspection() {
        assert_eq!(
            placeholder_indices("%2 then %1, %2, 100%, %12"),
            BTreeSet::from([1, 2, 12])
        );
        assert!(placeholder_indices("nothing here").is_empty());
        assert!(uses_count("%n item(s)"));
        assert!(!uses_count("%1 item(s)"));
    }
}
