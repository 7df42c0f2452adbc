//! Automated-response selection.
//!
//! The reply shown to a customer is chosen locally from the rule list before
//! the query is submitted:
//!
//! 1. The first rule (in list order) with a keyword contained in the message,
//!    compared case-insensitively, wins.
//! 2. Otherwise the first rule flagged `isDefault` is used.
//! 3. Otherwise, or when the chosen rule has no text, [`FALLBACK_RESPONSE`].

use iwb_core::AutomatedResponseRule;

/// Reply used when no rule applies.
pub const FALLBACK_RESPONSE: &str =
    "Thank you for your query. Our team will get back to you shortly.";

/// Why a reply was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSource<'a> {
    /// Rule `index` matched on `keyword`.
    Keyword { index: usize, keyword: &'a str },
    /// No keyword matched; rule `index` is the default rule.
    Default { index: usize },
    /// No usable rule.
    Fallback,
}

/// The chosen reply and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'a> {
    pub text: &'a str,
    pub source: MatchSource<'a>,
}

impl<'a> Selection<'a> {
    const fn fallback() -> Self {
        Self {
            text: FALLBACK_RESPONSE,
            source: MatchSource::Fallback,
        }
    }

    /// Use `text` if it is non-empty, else fall back.
    fn with_text(text: Option<&'a str>, source: MatchSource<'a>) -> Self {
        match text.filter(|t| !t.is_empty()) {
            Some(text) => Self { text, source },
            None => Self::fallback(),
        }
    }
}

/// Choose the reply for `message` and report which rule produced it.
#[must_use]
pub fn select<'a>(message: &str, rules: &'a [AutomatedResponseRule]) -> Selection<'a> {
    if rules.is_empty() {
        return Selection::fallback();
    }

    let lowered = message.to_lowercase();

    for (index, rule) in rules.iter().enumerate() {
        if let Some(keyword) = rule.matched_keyword(&lowered) {
            return Selection::with_text(
                rule.response_text.as_deref(),
                MatchSource::Keyword { index, keyword },
            );
        }
    }

    rules
        .iter()
        .position(|rule| rule.is_default)
        .map_or_else(Selection::fallback, |index| {
            let text = rules.get(index).and_then(|r| r.response_text.as_deref());
            Selection::with_text(text, MatchSource::Default { index })
        })
}

/// Choose the reply text for `message`.
#[must_use]
pub fn match_response<'a>(message: &str, rules: &'a [AutomatedResponseRule]) -> &'a str {
    select(message, rules).text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<AutomatedResponseRule> {
        vec![
            AutomatedResponseRule::new(["refund", "money back"], "Refunds take 5-7 days."),
            AutomatedResponseRule::new(["shipping", "delivery"], "We ship within 2 days."),
            AutomatedResponseRule::default_rule("Thanks, we'll be in touch."),
        ]
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let rules = rules();
        let selection = select("When will my DELIVERY arrive?", &rules);
        assert_eq!(selection.text, "We ship within 2 days.");
        assert_eq!(
            selection.source,
            MatchSource::Keyword {
                index: 1,
                keyword: "delivery"
            }
        );
    }

    #[test]
    fn test_keyword_case_in_rule_is_ignored() {
        let rules = vec![AutomatedResponseRule::new(["Refund"], "Refund policy")];
        assert_eq!(match_response("i want a refund", &rules), "Refund policy");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = rules();
        assert_eq!(
            match_response("refund for shipping damage", &rules),
            "Refunds take 5-7 days."
        );
    }

    #[test]
    fn test_earlier_rule_wins_even_if_keyword_appears_later_in_message() {
        let rules = rules();
        assert_eq!(
            match_response("delivery was late, I want my money back", &rules),
            "Refunds take 5-7 days."
        );
    }

    #[test]
    fn test_default_rule_when_nothing_matches() {
        let rules = rules();
        let selection = select("Do you sell gift cards?", &rules);
        assert_eq!(selection.text, "Thanks, we'll be in touch.");
        assert_eq!(selection.source, MatchSource::Default { index: 2 });
    }

    #[test]
    fn test_first_default_rule_is_used() {
        let rules = vec![
            AutomatedResponseRule::default_rule("first"),
            AutomatedResponseRule::default_rule("second"),
        ];
        assert_eq!(match_response("hello", &rules), "first");
    }

    #[test]
    fn test_fallback_without_rules_or_default() {
        assert_eq!(match_response("anything", &[]), FALLBACK_RESPONSE);

        let rules = vec![AutomatedResponseRule::new(["refund"], "Refunds")];
        let selection = select("hello", &rules);
        assert_eq!(selection, Selection::fallback());
    }

    #[test]
    fn test_matched_rule_without_text_falls_back() {
        let mut rule = AutomatedResponseRule::new(["refund"], "");
        assert_eq!(match_response("refund", std::slice::from_ref(&rule)), FALLBACK_RESPONSE);

        rule.response_text = None;
        assert_eq!(match_response("refund", &[rule]), FALLBACK_RESPONSE);
    }

    #[test]
    fn test_default_rule_without_text_falls_back() {
        let mut rule = AutomatedResponseRule::default_rule("x");
        rule.response_text = None;
        assert_eq!(match_response("hello", &[rule]), FALLBACK_RESPONSE);
    }

    #[test]
    fn test_rule_with_no_keywords_never_matches() {
        let rules = vec![AutomatedResponseRule::new(Vec::<String>::new(), "never")];
        assert_eq!(match_response("", &rules), FALLBACK_RESPONSE);
    }
}
