//! Numerus form selection.
//!
//! Catalogs store plural translations as an ordered list of numerus forms.
//! The number of forms and the rule that picks one for a count depend on the
//! target language, which comes from the catalog's `language` attribute.

/// Plural rule families, each with a fixed number of forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PluralRule {
    /// One form for every count (Japanese, Chinese, Korean, ...).
    Invariant,
    /// `n == 1` → 0, else 1 (English, German, Dutch, ...).
    #[default]
    OneOther,
    /// `n <= 1` → 0, else 1 (French, Brazilian Portuguese).
    ZeroOneOther,
    /// Russian, Ukrainian, Belarusian, Serbian, Croatian: one / few / many.
    EastSlavic,
    /// Polish: one / few / many.
    Polish,
    /// Czech, Slovak: one / 2–4 / other.
    CzechSlovak,
    /// Lithuanian: one / few / many.
    Lithuanian,
    /// Latvian: zero / one / other.
    Latvian,
    /// Romanian: one / few / other.
    Romanian,
    /// Slovenian: one / two / few / other.
    Slovenian,
    /// Irish: one / two / other.
    Irish,
    /// Arabic: zero / one / two / few / many / other.
    Arabic,
}

impl PluralRule {
    /// Pick the rule for a language tag such as `de`, `pt_BR`, or `sr-Latn`.
    /// Unknown languages get [`PluralRule::OneOther`].
    #[must_use]
    pub fn for_language(tag: &str) -> Self {
        let lower = tag.trim().to_ascii_lowercase().replace('-', "_");
        let lang = lower.split('_').next().unwrap_or("");
        match lang {
            "ja" | "zh" | "ko" | "vi" | "th" | "id" | "ms" | "lo" | "my" | "km" => {
                Self::Invariant
            }
            "pt" if lower == "pt_br" => Self::ZeroOneOther,
            "fr" => Self::ZeroOneOther,
            "ru" | "uk" | "be" | "sr" | "hr" | "bs" => Self::EastSlavic,
            "pl" => Self::Polish,
            "cs" | "sk" => Self::CzechSlovak,
            "lt" => Self::Lithuanian,
            "lv" => Self::Latvian,
            "ro" => Self::Romanian,
            "sl" => Self::Slovenian,
            "ga" => Self::Irish,
            "ar" => Self::Arabic,
            _ => Self::OneOther,
        }
    }

    /// Number of numerus forms a catalog in this language carries.
    #[must_use]
    pub const fn form_count(self) -> usize {
        match self {
            Self::Invariant => 1,
            Self::OneOther | Self::ZeroOneOther => 2,
            Self::EastSlavic
            | Self::Polish
            | Self::CzechSlovak
            | Self::Lithuanian
            | Self::Latvian
            | Self::Romanian
            | Self::Irish => 3,
            Self::Slovenian => 4,
            Self::Arabic => 6,
        }
    }

    /// Index of the numerus form for `n`. Negative counts use their
    /// magnitude.
    #[must_use]
    pub fn form_index(self, n: i64) -> usize {
        let n = n.unsigned_abs();
        let n10 = n % 10;
        let n100 = n % 100;
        match self {
            Self::Invariant => 0,
            Self::OneOther => usize::from(n != 1),
            Self::ZeroOneOther => usize::from(n > 1),
            Self::EastSlavic => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            Self::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            Self::CzechSlovak => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::Lithuanian => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if n10 >= 2 && !(12..=19).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            Self::Latvian => {
                if n == 0 {
                    0
                } else if n10 == 1 && n100 != 11 {
                    1
                } else {
                    2
                }
            }
            Self::Romanian => {
                if n == 1 {
                    0
                } else if n == 0 || (1..=19).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            Self::Slovenian => match n100 {
                1 => 0,
                2 => 1,
                3 | 4 => 2,
                _ => 3,
            },
            Self::Irish => match n {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Arabic => match n {
                0 => 0,
                1 => 1,
                2 => 2,
                _ if (3..=10).contains(&n100) => 3,
                _ if n100 >= 11 => 4,
                _ => 5,
            },
        }
    }

    /// Select the form for `n` from `forms`. Short form lists are clamped to
    /// their last element; an empty list yields `None`.
    #[must_use]
    pub fn select<'a>(self, forms: &'a [String], n: i64) -> Option<&'a str> {
        let last = forms.len().checked_sub(1)?;
        forms.get(self.form_index(n).min(last)).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_lookup() {
        assert_eq!(PluralRule::for_language("de_DE"), PluralRule::OneOther);
        assert_eq!(PluralRule::for_language("fr"), PluralRule::ZeroOneOther);
        assert_eq!(PluralRule::for_language("pt-BR"), PluralRule::ZeroOneOther);
        assert_eq!(PluralRule::for_language("pt_PT"), PluralRule::OneOther);
        assert_eq!(PluralRule::for_language("ru_RU"), PluralRule::EastSlavic);
        assert_eq!(PluralRule::for_language("ja"), PluralRule::Invariant);
        assert_eq!(PluralRule::for_language(""), PluralRule::OneOther);
    }

    #[test]
    fn english() {
        let r = PluralRule::OneOther;
        assert_eq!(r.form_index(0), 1);
        assert_eq!(r.form_index(1), 0);
        assert_eq!(r.form_index(2), 1);
        assert_eq!(r.form_index(-1), 0);
    }

    #[test]
    fn french_zero_is_singular() {
        let r = PluralRule::ZeroOneOther;
        assert_eq!(r.form_index(0), 0);
        assert_eq!(r.form_index(1), 0);
        assert_eq!(r.form_index(2), 1);
    }

    #[test]
    fn russian() {
        let r = PluralRule::EastSlavic;
        assert_eq!(r.form_index(1), 0);
        assert_eq!(r.form_index(21), 0);
        assert_eq!(r.form_index(3), 1);
        assert_eq!(r.form_index(24), 1);
        assert_eq!(r.form_index(5), 2);
        assert_eq!(r.form_index(11), 2);
        assert_eq!(r.form_index(13), 2);
    }

    #[test]
    fn polish_and_czech() {
        assert_eq!(PluralRule::Polish.form_index(1), 0);
        assert_eq!(PluralRule::Polish.form_index(22), 1);
        assert_eq!(PluralRule::Polish.form_index(21), 2);
        assert_eq!(PluralRule::CzechSlovak.form_index(3), 1);
        assert_eq!(PluralRule::CzechSlovak.form_index(5), 2);
    }

    #[test]
    fn arabic() {
        let r = PluralRule::Arabic;
        let got: Vec<usize> = [0, 1, 2, 3, 11, 100].iter().map(|&n| r.form_index(n)).collect();
        assert_eq!(got, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn form_index_within_form_count() {
        let rules = [
            PluralRule::Invariant,
            PluralRule::OneOther,
            PluralRule::ZeroOneOther,
            PluralRule::EastSlavic,
            PluralRule::Polish,
            PluralRule::CzechSlovak,
            PluralRule::Lithuanian,
            PluralRule::Latvian,
            PluralRule::Romanian,
            PluralRule::Slovenian,
            PluralRule::Irish,
            PluralRule::Arabic,
        ];
        for rule in rules {
            for n in 0..250 {
                assert!(rule.form_index(n) < rule.form_count(), "{rule:?} n={n}");
            }
        }
    }

    #[test]
    fn select_clamps() {
        let forms = vec!["one".to_string()];
        assert_eq!(PluralRule::OneOther.select(&forms, 5), Some("one"));
        assert_eq!(PluralRule::OneOther.select(&[], 5), None);
    }
}
