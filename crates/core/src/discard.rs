use crate::{Card, Deck, DeckSection};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscardError {
    #[error("no card at index {0}")]
    InvalidIndex(usize),
    #[error("extra deck cards cannot change section")]
    ExtraImmovable,
    #[error("kept deck count is {kept}, the target is {target}")]
    AdjustDeck { kept: usize, target: usize },
    #[error("kept side count is {kept}, the target is {target}")]
    AdjustSide { kept: usize, target: usize },
}

#[derive(Debug, Clone)]
pub struct DiscardEntry {
    pub card: Card,
    pub marked: bool,
}

/// A review stage over a working copy of the deck. Cards are marked for
/// discard or moved between main and side; acceptance only succeeds once the
/// kept counts hit the stage targets.
#[derive(Debug, Clone)]
pub struct DiscardStage {
    pub deck_target: usize,
    pub side_target: usize,
    main: Vec<DiscardEntry>,
    extra: Vec<DiscardEntry>,
    side: Vec<DiscardEntry>,
}

fn entries(cards: &[Card]) -> Vec<DiscardEntry> {
    cards
        .iter()
        .cloned()
        .map(|card| DiscardEntry {
            card,
            marked: false,
        })
        .collect()
}

fn kept_count(list: &[DiscardEntry]) -> usize {
    list.iter().filter(|entry| !entry.marked).count()
}

impl DiscardStage {
    pub fn new(deck: &Deck, deck_target: usize, side_growth: usize) -> Self {
        Self {
            deck_target,
            side_target: deck.side.len() + side_growth,
            main: entries(&deck.main),
            extra: entries(&deck.extra),
            side: entries(&deck.side),
        }
    }

    pub fn entries(&self, section: DeckSection) -> &[DiscardEntry] {
        match section {
            DeckSection::Main => &self.main,
            DeckSection::Extra => &self.extra,
            DeckSection::Side => &self.side,
        }
    }

    fn entries_mut(&mut self, section: DeckSection) -> &mut Vec<DiscardEntry> {
        match section {
            DeckSection::Main => &mut self.main,
            DeckSection::Extra => &mut self.extra,
            DeckSection::Side => &mut self.side,
        }
    }

    /// Flips a card's discard mark; returns the new state.
    pub fn toggle_mark(
        &mut self,
        section: DeckSection,
        index: usize,
    ) -> Result<bool, DiscardError> {
        let list = self.entries_mut(section);
        let entry = list.get_mut(index).ok_or(DiscardError::InvalidIndex(index))?;
        entry.marked = !entry.marked;
        Ok(entry.marked)
    }

    /// Moves a card between main and side; the extra deck is fixed.
    pub fn move_card(&mut self, from: DeckSection, index: usize) -> Result<(), DiscardError> {
        let to = match from {
            DeckSection::Main => DeckSection::Side,
            DeckSection::Side => DeckSection::Main,
            DeckSection::Extra => return Err(DiscardError::ExtraImmovable),
        };
        let source = self.entries_mut(from);
        if index >= source.len() {
            return Err(DiscardError::InvalidIndex(index));
        }
        let entry = source.remove(index);
        self.entries_mut(to).push(entry);
        Ok(())
    }

    /// Unmarked cards in one section.
    pub fn kept(&self, section: DeckSection) -> usize {
        kept_count(self.entries(section))
    }

    /// Unmarked main+side cards, the number weighed against the deck target.
    pub fn kept_total(&self) -> usize {
        self.kept(DeckSection::Main) + self.kept(DeckSection::Side)
    }

    pub fn validate(&self) -> Result<(), DiscardError> {
        let kept = self.kept_total();
        if kept != self.deck_target {
            return Err(DiscardError::AdjustDeck {
                kept,
                target: self.deck_target,
            });
        }
        let side = self.kept(DeckSection::Side);
        if side != self.side_target {
            return Err(DiscardError::AdjustSide {
                kept: side,
                target: self.side_target,
            });
        }
        Ok(())
    }

    /// Builds the trimmed deck from the unmarked cards. Marked cards in any
    /// section, the extra deck included, are dropped.
    pub fn into_deck(self, name: String) -> Deck {
        fn keep(list: Vec<DiscardEntry>) -> Vec<Card> {
            list.into_iter()
                .filter(|entry| !entry.marked)
                .map(|entry| entry.card)
                .collect()
        }

        Deck {
            name,
            main: keep(self.main),
            extra: keep(self.extra),
            side: keep(self.side),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CardType;

    fn card(name: &str, id: u32, card_type: CardType) -> Card {
        Card {
            name: name.to_string(),
            description: String::new(),
            id,
            card_type,
            attribute: None,
            attack: None,
            defense: None,
            level: None,
            rarity: "Common".to_string(),
            printings: Vec::new(),
        }
    }

    fn sample_deck() -> Deck {
        let mut deck = Deck::new("test");
        for index in 0..14 {
            deck.main
                .push(card(&format!("m{index}"), index, CardType::NormalMonster));
        }
        deck.extra.push(card("fusion", 100, CardType::FusionMonster));
        deck
    }

    #[test]
    fn accepts_only_at_exact_targets() {
        // 10 packs opened: keep 12 of 14, side must grow to 2.
        let deck = sample_deck();
        let mut stage = DiscardStage::new(&deck, 12, 2);
        assert_eq!(stage.side_target, 2);

        assert_eq!(
            stage.validate(),
            Err(DiscardError::AdjustDeck {
                kept: 14,
                target: 12
            })
        );

        stage.toggle_mark(DeckSection::Main, 0).unwrap();
        stage.toggle_mark(DeckSection::Main, 1).unwrap();
        assert_eq!(
            stage.validate(),
            Err(DiscardError::AdjustSide { kept: 0, target: 2 })
        );

        stage.move_card(DeckSection::Main, 2).unwrap();
        stage.move_card(DeckSection::Main, 2).unwrap();
        assert_eq!(stage.validate(), Ok(()));

        let trimmed = stage.into_deck("test".to_string());
        assert_eq!(trimmed.main.len(), 10);
        assert_eq!(trimmed.side.len(), 2);
        assert_eq!(trimmed.extra.len(), 1);
    }

    #[test]
    fn unmarking_restores_the_count() {
        let deck = sample_deck();
        let mut stage = DiscardStage::new(&deck, 12, 2);
        stage.toggle_mark(DeckSection::Main, 0).unwrap();
        assert_eq!(stage.kept_total(), 13);
        stage.toggle_mark(DeckSection::Main, 0).unwrap();
        assert_eq!(stage.kept_total(), 14);
    }

    #[test]
    fn marked_extra_cards_are_dropped_without_counting() {
        let deck = sample_deck();
        let mut stage = DiscardStage::new(&deck, 12, 2);
        stage.toggle_mark(DeckSection::Extra, 0).unwrap();
        assert_eq!(stage.kept_total(), 14);

        stage.toggle_mark(DeckSection::Main, 0).unwrap();
        stage.toggle_mark(DeckSection::Main, 1).unwrap();
        stage.move_card(DeckSection::Main, 2).unwrap();
        stage.move_card(DeckSection::Main, 2).unwrap();
        let trimmed = stage.into_deck("test".to_string());
        assert!(trimmed.extra.is_empty());
    }

    #[test]
    fn extra_deck_cannot_move() {
        let deck = sample_deck();
        let mut stage = DiscardStage::new(&deck, 12, 2);
        assert_eq!(
            stage.move_card(DeckSection::Extra, 0),
            Err(DiscardError::ExtraImmovable)
        );
        assert_eq!(
            stage.move_card(DeckSection::Side, 0),
            Err(DiscardError::InvalidIndex(0))
        );
    }
}
