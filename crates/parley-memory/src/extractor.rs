//! Pull short durable facts out of user messages
//!
//! Rules are grouped by category and tried in order; within a category the
//! first rule that yields a value wins. Matching ignores case but captured
//! values keep the user's own spelling.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const SKIP_MESSAGES: &[&str] = &[
    "hi", "hello", "hey", "sup", "yo", "ok", "okay", "yes", "no", "thanks", "bye", "lol", "haha",
    "cool", "nice", "good",
];

const SAVE_TRIGGERS: &[&str] = &[
    "my name", "i am", "i'm", "my fav", "i love", "i like", "i hate", "i study", "i work",
    "i live", "from",
];

/// Words that follow "i'm"/"i am" without being a name
const NOT_A_NAME: &[&str] = &[
    "not", "just", "really", "very", "so", "too", "also", "still", "now", "here", "back", "from",
    "into", "the", "and", "but", "going", "doing", "feeling", "trying", "getting", "looking",
    "thinking", "working", "living", "studying", "learning", "playing", "watching", "listening",
    "gonna", "kinda", "sorta", "pretty", "super", "quite", "always", "never", "currently",
    "okay", "fine", "good", "great", "well", "sad", "down", "happy", "tired", "bored", "busy",
    "sick", "sorry", "sure", "glad", "excited", "hungry", "curious", "confused", "stressed",
    "interested", "new", "big", "huge", "fan", "done", "ready", "home", "alone",
];

const FIRST_PERSON: &[&str] = &["i", "my", "me"];

const MIN_FALLBACK_WORDS: usize = 6;
const MIN_SAVE_WORDS: usize = 5;
const MIN_SAVE_CHARS: usize = 5;

/// "i'm", "im", "i am"
const I_AM: &str = r"i(?:['’]?m| am)";
/// End of the captured phrase
const END: &str = r"(?:[.!?]|$)";

/// Cheap gate deciding whether a user message is worth mining for facts
pub fn should_save_to_memory(message: &str) -> bool {
    let lower = message.trim().to_lowercase();

    if lower.chars().count() < MIN_SAVE_CHARS {
        return false;
    }

    if SKIP_MESSAGES.contains(&lower.as_str()) {
        return false;
    }

    if SAVE_TRIGGERS.iter().any(|trigger| lower.contains(trigger)) {
        return true;
    }

    lower.split_whitespace().count() >= MIN_SAVE_WORDS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cleanup {
    Plain,
    StripArticle,
}

struct Rule {
    pattern: Regex,
    template: &'static str,
    cleanup: Cleanup,
}

impl Rule {
    fn new(pattern: &str, template: &'static str) -> Self {
        Self::with_cleanup(pattern, template, Cleanup::Plain)
    }

    fn with_cleanup(pattern: &str, template: &'static str, cleanup: Cleanup) -> Self {
        let pattern = Regex::new(&format!("(?im){}", pattern.replace("{I_AM}", I_AM).replace("{END}", END)))
            .unwrap_or_else(|e| panic!("invalid extraction rule {:?}: {}", pattern, e));
        Self {
            pattern,
            template,
            cleanup,
        }
    }

    /// Render the first match, or `None` when nothing usable was captured
    fn apply(&self, text: &str) -> Option<String> {
        let caps = self.pattern.captures(text)?;
        render(self.template, &caps, self.cleanup)
    }
}

fn render(template: &str, caps: &Captures<'_>, cleanup: Cleanup) -> Option<String> {
    let mut rendered = template.to_string();
    for group in 1..caps.len() {
        let value = clean_value(caps.get(group)?.as_str(), cleanup);
        if value.is_empty() {
            return None;
        }
        rendered = rendered.replace(&format!("{{{}}}", group - 1), &value);
    }
    Some(rendered)
}

static ARTICLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:the|a|an)\b\s*").expect("valid article pattern"));

fn clean_value(raw: &str, cleanup: Cleanup) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_end_matches([',', ';', ':']).trim();
    match cleanup {
        Cleanup::Plain => trimmed.to_string(),
        Cleanup::StripArticle => ARTICLE.replace(trimmed, "").trim().to_string(),
    }
}

static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bmy name is (\p{L}[\p{L}'-]*)".to_string(),
        r"\bcall me (\p{L}[\p{L}'-]*)".to_string(),
        format!(r"\b{} (\p{{L}}[\p{{L}}'-]*)", I_AM),
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){}", p)).expect("valid name pattern"))
    .collect()
});

static COMPOUND_INTEREST: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?im)\bi love (\w+),?\s*especially (.+?){}", END)).expect("valid compound pattern"));

static INTEREST_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(r"\bmy fav(?:ou?rite)? (\w+) (?:is|are) (.+?){END}", "Favorite {0}: {1}"),
        Rule::new(r"\b{I_AM} a (?:big |huge )?fan of (.+?){END}", "Fan of: {0}"),
        Rule::new(r"\bi support (.+?){END}", "Fan of: {0}"),
        Rule::new(r"\b{I_AM} a (?:big |huge )?(.+?) fan\b", "Fan of: {0}"),
        Rule::new(r"\bi love (.+?){END}", "Loves: {0}"),
        Rule::new(r"\bi like (.+?){END}", "Likes: {0}"),
        Rule::new(r"\b{I_AM} (?:really )?into (.+?){END}", "Into: {0}"),
        Rule::new(r"\bi hate (.+?){END}", "Dislikes: {0}"),
        Rule::new(r"\bi can['’]?t stand (.+?){END}", "Dislikes: {0}"),
    ]
});

static BACKGROUND_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    let strip = Cleanup::StripArticle;
    vec![
        Rule::with_cleanup(r"\b{I_AM} studying (.+?)(?:[.!?]|\s+(?:at|in)\s|$)", "Studies: {0}", strip),
        Rule::with_cleanup(r"\bi study (.+?)(?:[.!?]|\s+(?:at|in)\s|$)", "Studies: {0}", strip),
        Rule::with_cleanup(r"\bmy major is (.+?){END}", "Major: {0}", strip),
        Rule::with_cleanup(r"\b{I_AM} (?:a |an )?(.+?) major\b", "Major: {0}", strip),
        Rule::with_cleanup(r"\bi work (?:as |at )?(.+?){END}", "Works: {0}", strip),
        Rule::with_cleanup(r"\bi live in (.+?){END}", "Lives in: {0}", strip),
        Rule::with_cleanup(r"\b{I_AM} from (.+?){END}", "From: {0}", strip),
        Rule::with_cleanup(r"\bi go to (.+?)\s*(?:university|college|school)\b", "Attends: {0}", strip),
    ]
});

static ACTIVITY_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(r"\bi play (.+?){END}", "Plays: {0}"),
        Rule::new(r"\bi watch (.+?){END}", "Watches: {0}"),
        Rule::new(r"\bi listen to (.+?){END}", "Listens to: {0}"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct FactExtractor;

impl FactExtractor {
    /// Facts found in `message`, in category order. Empty when nothing qualifies.
    pub fn extract(&self, message: &str) -> Vec<String> {
        let mut facts = Vec::new();

        if let Some(name) = extract_name(message) {
            facts.push(format!("User's name: {}", name));
        }

        if let Some(caps) = COMPOUND_INTEREST.captures(message) {
            let category = clean_value(&caps[1], Cleanup::Plain);
            let specific = clean_value(&caps[2], Cleanup::Plain);
            facts.push(format!("Loves: {}", category));
            if !specific.is_empty() {
                facts.push(format!("Favorite {}: {}", category, specific));
            }
        } else if let Some(fact) = first_match(&INTEREST_RULES, message) {
            facts.push(fact);
        }

        if let Some(fact) = first_match(&BACKGROUND_RULES, message) {
            facts.push(fact);
        }

        if let Some(fact) = first_match(&ACTIVITY_RULES, message) {
            facts.push(fact);
        }

        if facts.is_empty() && is_personal_statement(message) {
            facts.push(message.trim().to_string());
        }

        facts
    }
}

fn first_match(rules: &[Rule], message: &str) -> Option<String> {
    rules.iter().find_map(|rule| rule.apply(message))
}

fn extract_name(message: &str) -> Option<String> {
    NAME_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures_iter(message)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .find(|candidate| is_plausible_name(candidate))
            .map(title_case)
    })
}

fn is_plausible_name(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    candidate.chars().count() > 2 && !NOT_A_NAME.contains(&lower.as_str())
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn is_personal_statement(message: &str) -> bool {
    let words = message.split_whitespace().count();
    if words < MIN_FALLBACK_WORDS {
        return false;
    }

    message
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| FIRST_PERSON.contains(&token.to_lowercase().as_str()))
}
