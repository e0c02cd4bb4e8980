#![deny(missing_docs)]

//! # Inflection
//!
//! English singular/plural conversion used to name inferred resources.
//!
//! Rules are ordered regex tables (most specific first) plus irregular and
//! uncountable word lists. The case of the replaced suffix follows the case of
//! the text it replaces, so CamelCase shape names keep their shape
//! (`DBClusterPolicy` -> `DBClusterPolicies`).

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};

/// Strategy for singularizing and pluralizing resource names.
pub trait Inflector {
    /// Singular form of `word`.
    fn singular(&self, word: &str) -> String;
    /// Plural form of `word`.
    fn plural(&self, word: &str) -> String;
}

const PLURAL_RULES: &[(&str, &str)] = &[
    (r"(?i)m[ae]n$", "men"),
    (r"(?i)eaux$", "${0}"),
    (r"(?i)(child)(?:ren)?$", "${1}ren"),
    (r"(?i)(pe)(?:rson|ople)$", "${1}ople"),
    (r"(?i)\b((?:tit)?m|l)(?:ice|ouse)$", "${1}ice"),
    (r"(?i)(matr|cod|mur|sil|vert|ind|append)(?:ix|ex)$", "${1}ices"),
    (r"(?i)(x|ch|ss|sh|zz)$", "${1}es"),
    (r"(?i)([^ch][ieo][ln])ey$", "${1}ies"),
    (r"(?i)([^aeiouy]|qu)y$", "${1}ies"),
    (r"(?i)(?:(kni|wi|li)fe|(ar|l|ea|eo|oa|hoo)f)$", "${1}${2}ves"),
    (r"(?i)sis$", "ses"),
    (
        r"(?i)(apheli|hyperbat|periheli|asyndet|noumen|phenomen|criteri|organ|prolegomen|hedr|automat)(?:a|on)$",
        "${1}a",
    ),
    (
        r"(?i)(agend|addend|millenni|dat|extrem|bacteri|desiderat|strat|candelabr|errat|ov|symposi|curricul|automat|quor)(?:a|um)$",
        "${1}a",
    ),
    (r"(?i)(her|at|gr)o$", "${1}oes"),
    (r"(?i)(seraph|cherub)(?:im)?$", "${1}im"),
    (r"(?i)(alumn|alg|vertebr)(?:a|ae)$", "${1}ae"),
    (
        r"(?i)(alumn|syllab|vir|radi|nucle|fung|cact|stimul|termin|bacill|foc|uter|loc|strat)(?:us|i)$",
        "${1}i",
    ),
    (r"(?i)([^l]ias|[aeiou]las|[ejzr]as|[iu]am)$", "${1}"),
    (r"(?i)(e[mn]u)s?$", "${1}s"),
    (r"(?i)(alias|[^aou]us|t[lm]as|gas|ris)$", "${1}es"),
    (r"(?i)(ax|test)is$", "${1}es"),
    (r"(?i)([^aeiou]ese)$", "${1}"),
    (r"(?i)s?$", "s"),
];

const SINGULAR_RULES: &[(&str, &str)] = &[
    (r"(?i)men$", "man"),
    (r"(?i)(eau)x?$", "${1}"),
    (r"(?i)(child)ren$", "${1}"),
    (r"(?i)(pe)(rson|ople)$", "${1}rson"),
    (r"(?i)(matr|append)ices$", "${1}ix"),
    (r"(?i)(cod|mur|sil|vert|ind)ices$", "${1}ex"),
    (r"(?i)(alumn|alg|vertebr)ae$", "${1}a"),
    (
        r"(?i)(apheli|hyperbat|periheli|asyndet|noumen|phenomen|criteri|organ|prolegomen|hedr|automat)a$",
        "${1}on",
    ),
    (
        r"(?i)(agend|addend|millenni|dat|extrem|bacteri|desiderat|strat|candelabr|errat|ov|symposi|curricul|quor)a$",
        "${1}um",
    ),
    (
        r"(?i)(alumn|syllab|vir|radi|nucle|fung|cact|stimul|termin|bacill|foc|uter|loc|strat)(?:us|i)$",
        "${1}us",
    ),
    (r"(?i)(test)(?:is|es)$", "${1}is"),
    (r"(?i)(movie|twelve|abuse|e[mn]u)s$", "${1}"),
    (
        r"(?i)(analy|diagno|parenthe|progno|synop|the|empha|cri|ne)(?:sis|ses)$",
        "${1}sis",
    ),
    (
        r"(?i)(x|ch|ss|sh|zz|tto|go|cho|alias|[^aou]us|t[lm]as|gas|(?:her|at|gr)o|[aeiou]ris)(?:es)?$",
        "${1}",
    ),
    (r"(?i)(seraph|cherub)im$", "${1}"),
    (r"(?i)\b((?:tit)?m|l)ice$", "${1}ouse"),
    (r"(?i)\b(mon|smil)ies$", "${1}ey"),
    (
        r"(?i)\b(l|(?:neck|cross|hog|aun)?t|coll|faer|food|gen|goon|group|hipp|junk|vegg|(?:pork)?p|charl|calor|cut)ies$",
        "${1}ie",
    ),
    (
        r"(?i)(dg|ss|ois|lk|ok|wn|mb|th|ch|ec|oal|is|ck|ix|sser|ts|wb)ies$",
        "${1}ie",
    ),
    (r"(?i)ies$", "y"),
    (r"(?i)(ar|(?:wo|[ae])l|[eo][ao])ves$", "${1}f"),
    (
        r"(?i)(wi|kni|(?:after|half|high|low|mid|non|night|[^\w]|^)li)ves$",
        "${1}fe",
    ),
    (r"(?i)(ss)$", "${1}"),
    (r"(?i)s$", ""),
];

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("human", "humans"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
    ("quiz", "quizzes"),
    ("ox", "oxen"),
    ("axe", "axes"),
    ("die", "dice"),
    ("echo", "echoes"),
    ("volcano", "volcanoes"),
    ("tornado", "tornadoes"),
    ("torpedo", "torpedoes"),
    ("genus", "genera"),
    ("viscus", "viscera"),
    ("canvas", "canvases"),
    ("pickaxe", "pickaxes"),
    ("passerby", "passersby"),
    ("this", "these"),
    ("that", "those"),
];

const UNCOUNTABLE_WORDS: &[&str] = &[
    "adulthood", "advice", "agenda", "aid", "aircraft", "alcohol", "ammo", "analytics", "anime",
    "athletics", "audio", "bison", "blood", "bream", "buffalo", "butter", "carp", "cash",
    "chassis", "chess", "clothing", "cod", "commerce", "cooperation", "corps", "debris",
    "diabetes", "digestion", "elk", "energy", "equipment", "excretion", "expertise", "firmware",
    "flounder", "fun", "gallows", "garbage", "graffiti", "hardware", "headquarters", "health",
    "herpes", "highjinks", "homework", "housework", "information", "jeans", "justice", "kudos",
    "labour", "literature", "machinery", "mackerel", "mail", "media", "mews", "moose", "music",
    "mud", "manga", "news", "only", "personnel", "pike", "plankton", "pliers", "police",
    "pollution", "premises", "rain", "research", "rice", "salmon", "scissors", "series",
    "sewage", "shambles", "shrimp", "software", "staff", "species", "swine", "tennis",
    "traffic", "transportation", "trout", "tuna", "wealth", "welfare", "whiting",
    "wildebeest", "wildlife", "you",
];

const UNCOUNTABLE_PATTERNS: &[&str] = &[
    r"(?i)pok[eé]mon$",
    r"(?i)[^aeiou]ese$",
    r"(?i)deer$",
    r"(?i)fish$",
    r"(?i)measles$",
    r"(?i)o[iu]s$",
    r"(?i)pox$",
    r"(?i)sheep$",
];

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn compile_rules(table: &[(&str, &'static str)]) -> Vec<Rule> {
    table
        .iter()
        .filter_map(|&(pattern, replacement)| match Regex::new(pattern) {
            Ok(pattern) => Some(Rule {
                pattern,
                replacement,
            }),
            Err(e) => {
                tracing::error!(%pattern, error = %e, "invalid inflection rule");
                None
            }
        })
        .collect()
}

/// Rule-based English inflector.
pub struct EnglishInflector {
    plural_rules: Vec<Rule>,
    singular_rules: Vec<Rule>,
    to_plural: HashMap<&'static str, &'static str>,
    to_singular: HashMap<&'static str, &'static str>,
    uncountable_words: HashSet<&'static str>,
    uncountable_patterns: Vec<Regex>,
}

static SHARED: Lazy<EnglishInflector> = Lazy::new(EnglishInflector::new);

impl Default for EnglishInflector {
    fn default() -> Self {
        Self::new()
    }
}

impl EnglishInflector {
    /// Compiles the rule tables.
    pub fn new() -> Self {
        Self {
            plural_rules: compile_rules(PLURAL_RULES),
            singular_rules: compile_rules(SINGULAR_RULES),
            to_plural: IRREGULAR.iter().copied().collect(),
            to_singular: IRREGULAR.iter().map(|(s, p)| (*p, *s)).collect(),
            uncountable_words: UNCOUNTABLE_WORDS.iter().copied().collect(),
            uncountable_patterns: UNCOUNTABLE_PATTERNS
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }

    /// A process-wide instance; the tables are immutable once compiled.
    pub fn shared() -> &'static EnglishInflector {
        &SHARED
    }

    fn is_uncountable(&self, token: &str, word: &str) -> bool {
        self.uncountable_words.contains(token)
            || self.uncountable_patterns.iter().any(|re| re.is_match(word))
    }

    fn inflect(
        &self,
        word: &str,
        keep: &HashMap<&'static str, &'static str>,
        replace: &HashMap<&'static str, &'static str>,
        rules: &[Rule],
    ) -> String {
        if word.is_empty() {
            return String::new();
        }
        let token = word.to_lowercase();
        if keep.contains_key(token.as_str()) {
            return word.to_string();
        }
        if let Some(target) = replace.get(token.as_str()) {
            return restore_case(word, target);
        }
        if self.is_uncountable(&token, word) {
            return word.to_string();
        }
        for rule in rules {
            if let Some(caps) = rule.pattern.captures(word) {
                return apply(word, &caps, rule.replacement);
            }
        }
        word.to_string()
    }
}

impl Inflector for EnglishInflector {
    fn singular(&self, word: &str) -> String {
        self.inflect(word, &self.to_plural, &self.to_singular, &self.singular_rules)
    }

    fn plural(&self, word: &str) -> String {
        self.inflect(word, &self.to_singular, &self.to_plural, &self.plural_rules)
    }
}

fn apply(word: &str, caps: &Captures<'_>, replacement: &str) -> String {
    let Some(whole) = caps.get(0) else {
        return word.to_string();
    };
    let mut result = String::new();
    caps.expand(replacement, &mut result);

    let restored = if whole.as_str().is_empty() {
        let previous = word[..whole.start()].chars().last();
        match previous {
            Some(c) => restore_case(&c.to_string(), &result),
            None => result,
        }
    } else {
        restore_case(whole.as_str(), &result)
    };

    format!("{}{}{}", &word[..whole.start()], restored, &word[whole.end()..])
}

/// Applies the casing of `source` to `target`.
fn restore_case(source: &str, target: &str) -> String {
    if source == target {
        return target.to_string();
    }
    if source == source.to_lowercase() {
        return target.to_lowercase();
    }
    if source == source.to_uppercase() {
        return target.to_uppercase();
    }
    let mut chars = source.chars();
    if chars.next().is_some_and(char::is_uppercase) {
        let mut out = String::with_capacity(target.len());
        let mut target_chars = target.chars();
        if let Some(first) = target_chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&target_chars.as_str().to_lowercase());
        }
        return out;
    }
    target.to_lowercase()
}
