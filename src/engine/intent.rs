//! Keyword intent classification for free text.

use super::action::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    RequestService,
    ConsultExpert,
    GetRecipes,
    BecomeHelpa,
    Subscribe,
    GeneralInquiry,
}

/// Checked in order; the first group with a matching keyword wins.
///
/// Keywords match whole words. A trailing `*` matches any word starting with
/// the stem; multi-word keywords must appear as consecutive words.
const KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::BecomeHelpa,
        &["become a helpa", "become helpa", "join as", "register as", "sign up as", "earn money"],
    ),
    (Intent::Subscribe, &["subscri*", "premium", "plan", "plans"]),
    (
        Intent::GetRecipes,
        &["recipe*", "food*", "meal*", "menu", "hungry", "cook", "cooking", "eat", "eating"],
    ),
    (
        Intent::ConsultExpert,
        &["consult*", "advice", "advise", "expert*", "question*"],
    ),
    (
        Intent::RequestService,
        &[
            "hire", "hiring", "book*", "service*", "need a", "plumb*", "electric*", "clean*",
            "repair*", "fix*", "tutor*", "carpent*", "move house",
        ],
    ),
];

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn word_matches(word: &str, pattern: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(stem) => word.starts_with(stem),
        None => word == pattern,
    }
}

fn contains_keyword(words: &[String], keyword: &str) -> bool {
    let pattern: Vec<&str> = keyword.split(' ').collect();
    words.windows(pattern.len()).any(|window| {
        window
            .iter()
            .zip(&pattern)
            .all(|(word, part)| word_matches(word, part))
    })
}

pub fn classify(text: &str) -> Intent {
    let words = words(text);
    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| contains_keyword(&words, k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::GeneralInquiry)
}

impl Intent {
    /// The flow entry action the intent maps to; general inquiries show the menu.
    pub fn action(self) -> Action {
        match self {
            Intent::RequestService => Action::RequestService,
            Intent::ConsultExpert => Action::ConsultExpert,
            Intent::GetRecipes => Action::GetRecipes,
            Intent::BecomeHelpa => Action::BecomeHelpa,
            Intent::Subscribe => Action::Subscribe,
            Intent::GeneralInquiry => Action::MainMenu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_keywords() {
        assert_eq!(classify("I need a plumber today"), Intent::RequestService);
        assert_eq!(classify("Can I get some expert ADVICE?"), Intent::ConsultExpert);
        assert_eq!(classify("show me a jollof recipe"), Intent::GetRecipes);
        assert_eq!(classify("how do I become a Helpa"), Intent::BecomeHelpa);
        assert_eq!(classify("what does premium cost"), Intent::Subscribe);
    }

    #[test]
    fn unmatched_text_is_general_inquiry() {
        assert_eq!(classify("good morning"), Intent::GeneralInquiry);
        assert_eq!(classify(""), Intent::GeneralInquiry);
        assert_eq!(Intent::GeneralInquiry.action(), Action::MainMenu);
    }

    #[test]
    fn keywords_match_whole_words() {
        assert_eq!(classify("My water heater needs a repair"), Intent::RequestService);
        assert_eq!(classify("I want a great plumber"), Intent::RequestService);
        assert_eq!(classify("Please repeat that"), Intent::GeneralInquiry);
        assert_eq!(classify("the car seat is torn, can you fix it?"), Intent::RequestService);
        assert_eq!(classify("what can I eat tonight"), Intent::GetRecipes);
        assert_eq!(classify("I have a question about tiling"), Intent::ConsultExpert);
    }

    #[test]
    fn earlier_groups_take_precedence() {
        // mentions a service keyword but asks about joining
        assert_eq!(classify("register as a cleaning provider"), Intent::BecomeHelpa);
    }
}
