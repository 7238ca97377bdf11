use crate::Card;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DeckSection {
    Main,
    Extra,
    Side,
}

impl DeckSection {
    pub fn label(self) -> &'static str {
        match self {
            Self::Main => "Main",
            Self::Extra => "Extra",
            Self::Side => "Side",
        }
    }
}

/// Monster/spell/trap totals for a list of cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeBreakdown {
    pub monsters: usize,
    pub spells: usize,
    pub traps: usize,
}

pub fn type_breakdown(cards: &[Card]) -> TypeBreakdown {
    let mut breakdown = TypeBreakdown::default();
    for card in cards {
        let name = card.card_type.name();
        if name.contains("Monster") {
            breakdown.monsters += 1;
        } else if name.contains("Spell") {
            breakdown.spells += 1;
        } else if name.contains("Trap") {
            breakdown.traps += 1;
        }
    }
    breakdown
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub main: Vec<Card>,
    pub extra: Vec<Card>,
    pub side: Vec<Card>,
}

impl Deck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            main: Vec::new(),
            extra: Vec::new(),
            side: Vec::new(),
        }
    }

    pub fn section(&self, section: DeckSection) -> &[Card] {
        match section {
            DeckSection::Main => &self.main,
            DeckSection::Extra => &self.extra,
            DeckSection::Side => &self.side,
        }
    }

    /// Copies of a named card across all three lists.
    pub fn copies_of(&self, card_name: &str) -> usize {
        self.main
            .iter()
            .chain(&self.extra)
            .chain(&self.side)
            .filter(|card| card.name == card_name)
            .count()
    }

    pub fn total(&self) -> usize {
        self.main.len() + self.extra.len() + self.side.len()
    }

    /// Serializes the deck into the `.ydk` text format: `#main`, `#extra`
    /// and `!side` sections with one numeric card id per line.
    pub fn to_ydk(&self) -> String {
        fn id_lines(cards: &[Card]) -> String {
            let ids: Vec<String> = cards.iter().map(|card| card.id.to_string()).collect();
            ids.join("\n")
        }

        let mut text = String::from("#main\n");
        text.push_str(&id_lines(&self.main));
        text.push('\n');
        text.push_str("#extra\n");
        text.push_str(&id_lines(&self.extra));
        text.push('\n');
        text.push_str("!side\n");
        text.push_str(&id_lines(&self.side));
        text.push('\n');
        text
    }
}
