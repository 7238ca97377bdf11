use crate::Card;
use regex::Regex;

/// Helper card suggested alongside fusion-type monsters.
pub const FUSION_HELPER: &str = "Polymerization";

/// Cards a drafter may add alongside a pick, scraped from the card's
/// description text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssocSuggestions {
    /// Named cards quoted in the description, in order of appearance.
    pub names: Vec<String>,
    /// Set when the source card is fusion-type and a generic fusion helper
    /// applies.
    pub fusion_helper: Option<&'static str>,
}

impl AssocSuggestions {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.fusion_helper.is_none()
    }
}

/// Scans card descriptions for quoted card names.
#[derive(Debug)]
pub struct AssocFinder {
    quoted: Regex,
}

impl Default for AssocFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl AssocFinder {
    pub fn new() -> Self {
        // Quoted spans; escaped quotes stay inside one span. The
        // preceding-backslash exclusion happens in quoted_names since the
        // regex engine has no look-behind.
        let quoted = Regex::new(r#""((?:[^"\\]|\\.)+)""#).expect("quoted-span pattern");
        Self { quoted }
    }

    /// Double-quoted spans of `text` whose opening quote is not escaped,
    /// deduplicated in order of first appearance.
    pub fn quoted_names(&self, text: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for capture in self.quoted.captures_iter(text) {
            let Some(whole) = capture.get(0) else {
                continue;
            };
            if text[..whole.start()].ends_with('\\') {
                continue;
            }
            let name = &capture[1];
            if !names.iter().any(|seen| seen == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Associated-card suggestions for `card`: quoted names other than the
    /// card itself, plus the fusion helper for fusion-type monsters.
    pub fn suggestions(&self, card: &Card) -> AssocSuggestions {
        let names = self
            .quoted_names(&card.description)
            .into_iter()
            .filter(|name| name != &card.name)
            .collect();
        let fusion_helper = card.card_type.is_fusion().then_some(FUSION_HELPER);
        AssocSuggestions {
            names,
            fusion_helper,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardType, Printing};

    fn card(name: &str, description: &str, card_type: CardType) -> Card {
        Card {
            name: name.to_string(),
            description: description.to_string(),
            id: 1,
            card_type,
            attribute: None,
            attack: None,
            defense: None,
            level: None,
            rarity: "Common".to_string(),
            printings: Vec::<Printing>::new(),
        }
    }

    #[test]
    fn extracts_quoted_names_in_order() {
        let finder = AssocFinder::new();
        let names = finder.quoted_names(
            r#""Gaia The Fierce Knight" + "Curse of Dragon" must be on the field."#,
        );
        assert_eq!(names, vec!["Gaia The Fierce Knight", "Curse of Dragon"]);
    }

    #[test]
    fn skips_escaped_quotes_and_duplicates() {
        let finder = AssocFinder::new();
        let names = finder.quoted_names(r#"Send "Kuriboh" or \"not this\" or "Kuriboh"."#);
        assert_eq!(names, vec!["Kuriboh"]);
    }

    #[test]
    fn empty_spans_are_ignored() {
        let finder = AssocFinder::new();
        assert!(finder.quoted_names(r#"An "" empty pair"#).is_empty());
        assert!(finder.quoted_names("no quotes at all").is_empty());
    }

    #[test]
    fn suggestions_exclude_the_card_itself() {
        let finder = AssocFinder::new();
        let subject = card(
            "Gaia the Dragon Champion",
            r#""Gaia The Fierce Knight" + "Curse of Dragon""#,
            CardType::FusionMonster,
        );
        let suggestions = finder.suggestions(&subject);
        assert_eq!(
            suggestions.names,
            vec!["Gaia The Fierce Knight", "Curse of Dragon"]
        );
        assert_eq!(suggestions.fusion_helper, Some(FUSION_HELPER));

        let own_name = card("Kuriboh", r#"Discard "Kuriboh"."#, CardType::EffectMonster);
        let suggestions = finder.suggestions(&own_name);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn non_fusion_gets_no_helper() {
        let finder = AssocFinder::new();
        let subject = card(
            "Stardust Dragon",
            r#"1 Tuner + "Stardust Xiaolong""#,
            CardType::SynchroMonster,
        );
        assert_eq!(finder.suggestions(&subject).fusion_helper, None);
    }
}
