//! Rule-based local simplification.
//!
//! Used whenever the remote service cannot answer. The rules are crude on
//! purpose: keep at most three sentences, swap a fixed list of long words for
//! short ones, strip asides and quotes, and for early readers drop `-ly`
//! adverbs.

use once_cell::sync::Lazy;
use regex::Regex;

use focusflow_protocols::Grade;

/// Long word -> short word, matched whole-word and case-insensitively.
const REPLACEMENTS: [(&str, &str); 23] = [
    ("utilize", "use"),
    ("implement", "do"),
    ("facilitate", "help"),
    ("demonstrate", "show"),
    ("approximately", "about"),
    ("consequently", "so"),
    ("furthermore", "also"),
    ("nevertheless", "but"),
    ("therefore", "so"),
    ("regarding", "about"),
    ("concerning", "about"),
    ("subsequently", "later"),
    ("additionally", "also"),
    ("numerous", "many"),
    ("purchase", "buy"),
    ("acquire", "get"),
    ("commence", "start"),
    ("terminate", "end"),
    ("possess", "have"),
    ("require", "need"),
    ("however", "but"),
    ("although", "but"),
    ("because", "since"),
];

/// Sentences kept verbatim when there are at most this many.
const MAX_SENTENCES: usize = 3;

static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?]+[.!?]+").unwrap());
static PARENTHETICAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]+\)").unwrap());
static QUOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["']"#).unwrap());
static ADVERB_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+ly\b").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SPACE_BEFORE_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([.,!?])").unwrap());

static REPLACEMENT_RES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    REPLACEMENTS
        .iter()
        .map(|(word, short)| (Regex::new(&format!(r"(?i)\b{}\b", word)).unwrap(), *short))
        .collect()
});

/// Deterministic, side-effect free fallback rewriter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSimplifier;

impl FallbackSimplifier {
    pub fn new() -> Self {
        Self
    }

    pub fn simplify(&self, text: &str, grade: Grade) -> String {
        let mut sentences: Vec<&str> = SENTENCE_RE
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .collect();
        if sentences.is_empty() {
            sentences.push(text);
        }

        let kept = select_sentences(&sentences);
        kept.iter()
            .map(|sentence| simplify_sentence(sentence, grade))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// First, middle and last sentence once there are more than three.
fn select_sentences<'a>(sentences: &[&'a str]) -> Vec<&'a str> {
    let count = sentences.len();
    if count <= MAX_SENTENCES {
        return sentences.to_vec();
    }
    [0, count / 2, count - 1]
        .into_iter()
        .map(|i| sentences[i])
        .collect()
}

fn simplify_sentence(sentence: &str, grade: Grade) -> String {
    let mut out = sentence.to_string();

    for (re, short) in REPLACEMENT_RES.iter() {
        out = re.replace_all(&out, *short).into_owned();
    }

    out = PARENTHETICAL_RE.replace_all(&out, "").into_owned();
    out = QUOTE_RE.replace_all(&out, "").into_owned();

    if grade.is_early_reader() {
        out = ADVERB_RE.replace_all(&out, "").into_owned();
    }

    out = WHITESPACE_RE.replace_all(&out, " ").into_owned();
    out = SPACE_BEFORE_PUNCT_RE.replace_all(&out, "$1").into_owned();
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(value: u8) -> Grade {
        Grade::new(value).unwrap()
    }

    fn simplify(text: &str, g: u8) -> String {
        FallbackSimplifier::new().simplify(text, grade(g))
    }

    #[test]
    fn test_keeps_first_middle_last_sentence() {
        assert_eq!(simplify("A. B. C. D.", 8), "A. C. D.");
        assert_eq!(simplify("One. Two. Three. Four. Five.", 8), "One. Three. Five.");
    }

    #[test]
    fn test_three_or_fewer_sentences_kept() {
        assert_eq!(simplify("A. B. C.", 8), "A. B. C.");
        assert_eq!(simplify("Only one here!", 8), "Only one here!");
    }

    #[test]
    fn test_no_terminator_is_one_sentence() {
        assert_eq!(simplify("no punctuation at all", 8), "no punctuation at all");
    }

    #[test]
    fn test_trailing_fragment_without_terminator_is_dropped() {
        assert_eq!(simplify("First sentence. trailing words", 8), "First sentence.");
    }

    #[test]
    fn test_word_replacements_case_insensitive() {
        assert_eq!(
            simplify("We Utilize tools because they facilitate work.", 8),
            "We use tools since they help work."
        );
    }

    #[test]
    fn test_replacements_are_whole_word() {
        assert_eq!(simplify("The implementation failed.", 8), "The implementation failed.");
    }

    #[test]
    fn test_removes_parentheticals_and_quotes() {
        assert_eq!(
            simplify(r#"The cell (a tiny unit) is "alive" and it's busy."#, 8),
            "The cell is alive and its busy."
        );
    }

    #[test]
    fn test_adverbs_removed_for_early_readers() {
        assert_eq!(simplify("He ran quickly home.", 3), "He ran home.");
        assert_eq!(simplify("He ran quickly home.", 4), "He ran home.");
        assert_eq!(simplify("He ran quickly home.", 5), "He ran quickly home.");
    }

    #[test]
    fn test_space_before_punctuation_removed() {
        assert_eq!(simplify("It ended finally.", 2), "It ended.");
    }

    #[test]
    fn test_is_deterministic() {
        let text = "Furthermore, numerous people purchase tickets. They commence early. \
                    However, it is approximately noon. Consequently we wait.";
        assert_eq!(simplify(text, 6), simplify(text, 6));
        assert_eq!(
            simplify(text, 6),
            "also, many people buy tickets. but, it is about noon. so we wait."
        );
    }
}
