//! English pluralization and singularization.
//!
//! Rules are tried newest-first; the first pattern that matches rewrites the
//! word. Uncountables and irregular forms are checked before any rule.

use regex::Regex;
use std::sync::LazyLock;

const PLURAL_RULES: &[(&str, &str)] = &[
    ("$", "s"),
    ("s$", "s"),
    ("^(ax|test)is$", "${1}es"),
    ("(octop|vir)us$", "${1}i"),
    ("(octop|vir)i$", "${1}i"),
    ("(alias|status|campus)$", "${1}es"),
    ("(bu)s$", "${1}ses"),
    ("(buffal|tomat)o$", "${1}oes"),
    ("([ti])um$", "${1}a"),
    ("([ti])a$", "${1}a"),
    ("sis$", "ses"),
    ("(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
    ("(hive)$", "${1}s"),
    ("([^aeiouy]|qu)y$", "${1}ies"),
    ("(x|ch|ss|sh)$", "${1}es"),
    ("(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
    ("^(m|l)ouse$", "${1}ice"),
    ("^(m|l)ice$", "${1}ice"),
    ("^(ox)$", "${1}en"),
    ("^(oxen)$", "${1}"),
    ("(quiz)$", "${1}zes"),
];

const SINGULAR_RULES: &[(&str, &str)] = &[
    ("s$", ""),
    ("(ss)$", "${1}"),
    ("(n)ews$", "${1}ews"),
    ("([ti])a$", "${1}um"),
    (
        "((a)naly|(b)a|(d)iagno|(p)arenthe|(p)rogno|(s)ynop|(t)he)(sis|ses)$",
        "${1}sis",
    ),
    ("(^analy)(sis|ses)$", "${1}sis"),
    ("([^f])ves$", "${1}fe"),
    ("(hive)s$", "${1}"),
    ("(tive)s$", "${1}"),
    ("([lr])ves$", "${1}f"),
    ("([^aeiouy]|qu)ies$", "${1}y"),
    ("(s)eries$", "${1}eries"),
    ("(m)ovies$", "${1}ovie"),
    ("(c)ookies$", "${1}ookie"),
    ("(x|ch|ss|sh)es$", "${1}"),
    ("^(m|l)ice$", "${1}ouse"),
    ("(bus|campus)(es)?$", "${1}"),
    ("(o)es$", "${1}"),
    ("(shoe)s$", "${1}"),
    ("(cris|test)(is|es)$", "${1}is"),
    ("^(a)x[ie]s$", "${1}xis"),
    ("(octop|vir)(us|i)$", "${1}us"),
    ("(alias|status)(es)?$", "${1}"),
    ("^(ox)en", "${1}"),
    ("(vert|ind)ices$", "${1}ex"),
    ("(matr)ices$", "${1}ix"),
    ("(quiz)zes$", "${1}"),
    ("(database)s$", "${1}"),
];

/// (singular, plural)
const IRREGULARS: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
    ("mombie", "mombies"),
];

const UNCOUNTABLES: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
];

///
/// Inflection
/// one compiled rewrite rule
///

struct Inflection {
    pattern: Regex,
    replace: String,

    /// only applies to all-caps words
    upper: bool,
}

impl Inflection {
    fn new(pattern: &str, replace: &str) -> Option<Self> {
        // every pattern is a constant; a failure here would drop the rule
        let pattern = Regex::new(pattern).ok()?;

        Some(Self {
            pattern,
            replace: replace.to_string(),
            upper: false,
        })
    }

    fn upper(pattern: &str, replace: &str) -> Option<Self> {
        Self::new(&pattern.to_uppercase(), &replace.to_uppercase()).map(|inflection| Self {
            upper: true,
            ..inflection
        })
    }
}

static PLURALS: LazyLock<Vec<Inflection>> =
    LazyLock::new(|| compile(PLURAL_RULES, |(singular, plural)| (singular, plural)));

static SINGULARS: LazyLock<Vec<Inflection>> =
    LazyLock::new(|| compile(SINGULAR_RULES, |(singular, plural)| (plural, singular)));

/// Return the plural form of an English word, preserving its casing style.
#[must_use]
pub fn plural(word: &str) -> String {
    apply(&PLURALS, word)
}

/// Return the singular form of an English word, preserving its casing style.
#[must_use]
pub fn singular(word: &str) -> String {
    apply(&SINGULARS, word)
}

// apply
fn apply(inflections: &[Inflection], word: &str) -> String {
    let all_caps = is_all_caps(word);

    for inflection in inflections {
        if inflection.upper && !all_caps {
            continue;
        }
        if inflection.pattern.is_match(word) {
            return inflection
                .pattern
                .replace_all(word, inflection.replace.as_str())
                .into_owned();
        }
    }

    word.to_string()
}

// compile
// uncountables first, then irregulars, then the rule list newest-first
fn compile<'a>(
    rules: &[(&'a str, &'a str)],
    irregular: fn((&'a str, &'a str)) -> (&'a str, &'a str),
) -> Vec<Inflection> {
    let mut out = Vec::new();

    for word in UNCOUNTABLES {
        out.extend(Inflection::new(&format!("^(?i)({word})$"), word));
    }

    for &pair in IRREGULARS {
        let (from, to) = irregular(pair);
        out.extend(Inflection::upper(&format!("{from}$"), to));
        out.extend(Inflection::new(&format!("{}$", title(from)), &title(to)));
        out.extend(Inflection::new(&format!("{from}$"), to));
    }

    for &(find, replace) in rules.iter().rev() {
        out.extend(Inflection::upper(find, replace));
        out.extend(Inflection::new(find, replace));
        out.extend(Inflection::new(&format!("(?i){find}"), replace));
    }

    out
}

// is_all_caps
// at least one upper-case letter and no lower-case ones
fn is_all_caps(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

// title
fn title(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plural_covers_regular_and_irregular_words() {
        let cases = [
            ("widget", "widgets"),
            ("owner", "owners"),
            ("category", "categories"),
            ("address", "addresses"),
            ("box", "boxes"),
            ("person", "people"),
            ("child", "children"),
            ("status", "statuses"),
            ("knife", "knives"),
            ("matrix", "matrices"),
            ("sheep", "sheep"),
            ("information", "information"),
            ("Person", "People"),
            ("USER", "USERS"),
            ("USER_GROUP", "USER_GROUPS"),
            ("BOX", "BOXES"),
            ("PERSON", "PEOPLE"),
            ("part", "parts"),
            ("widget_part", "widget_parts"),
            ("user_group", "user_groups"),
        ];

        for (input, expected) in cases {
            assert_eq!(plural(input), expected, "plural({input:?})");
        }
    }

    #[test]
    fn singular_covers_regular_and_irregular_words() {
        let cases = [
            ("widgets", "widget"),
            ("categories", "category"),
            ("addresses", "address"),
            ("people", "person"),
            ("children", "child"),
            ("statuses", "status"),
            ("knives", "knife"),
            ("matrices", "matrix"),
            ("series", "series"),
            ("Tags", "Tag"),
            ("databases", "database"),
        ];

        for (input, expected) in cases {
            assert_eq!(singular(input), expected, "singular({input:?})");
        }
    }

    proptest! {
        #[test]
        fn plural_then_singular_restores_simple_nouns(stem in "[bcdfgklmnprt][aeiou][bdgklmnprt]") {
            let word = format!("{stem}et");
            prop_assert_eq!(singular(&plural(&word)), word);
        }

        #[test]
        fn regular_nouns_take_a_lower_case_s(stem in "[bcdfgklmnprt][aeiou][bdgklmnprt]") {
            let word = format!("{stem}et");
            prop_assert_eq!(plural(&word), format!("{word}s"));
        }

        #[test]
        fn all_caps_nouns_stay_all_caps(stem in "[BCDFGKLMNPRT][AEIOU][BDGKLMNPRT]") {
            let word = format!("{stem}ET");
            prop_assert_eq!(plural(&word), format!("{word}S"));
        }
    }
}
