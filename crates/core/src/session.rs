use crate::{
    pick_weighted_index, set_weights, Card, CardSet, Deck, DiscardError, DiscardStage, DraftRules,
    Event, EventBus, RngState,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Opening,
    Discard,
    Complete,
}

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("selected packs total {have}, the draft needs exactly {need}")]
    PackTotal { have: u32, need: u32 },
    #[error("select {0} more card(s)")]
    SelectMore(u32),
    #[error("no pack is open")]
    NoPackOpen,
    #[error("no card at index {0}")]
    InvalidCardIndex(usize),
    #[error("{0} is already picked")]
    AlreadyPicked(String),
    #[error("{0} is not picked")]
    NotPicked(String),
    #[error("{0} already has the maximum number of copies")]
    CopyLimit(String),
    #[error("no picks left in this pack")]
    NoPicksLeft,
    #[error("a discard stage is waiting to be resolved")]
    DiscardPending,
    #[error("no discard stage is open")]
    NotInDiscard,
    #[error("the draft is complete")]
    DraftComplete,
    #[error("the selected sets ran out of packs")]
    OutOfPacks,
    #[error("no set at index {0}")]
    InvalidSetIndex(usize),
    #[error("{0} has no drawable cards")]
    EmptyCardPool(String),
    #[error(transparent)]
    Discard(#[from] DiscardError),
}

/// What a successful `advance` (or discard acceptance) moved the session to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    PackOpened {
        set_name: String,
        pack_number: u32,
    },
    /// The active set's card list has to be installed before the next pack
    /// can open.
    NeedSetCards {
        set_index: usize,
    },
    DiscardStage {
        deck_target: usize,
        side_target: usize,
    },
    DiscardResolved,
    Complete,
}

/// The drafting session state machine: pack-by-pack card selection under the
/// per-pack pick quota and copy cap, periodic discard stages, and
/// finalization after the configured stage count.
#[derive(Debug)]
pub struct DraftSession {
    rules: DraftRules,
    sets: Vec<CardSet>,
    set_cursor: usize,
    deck: Deck,
    rng: RngState,
    stage: Stage,
    total_packs: u32,
    picks_left: u32,
    picks_this_pack: u32,
    discard_stages_done: u32,
    pack: Vec<Card>,
    picked: Vec<bool>,
    selections: Vec<Card>,
    discard: Option<DiscardStage>,
}

impl DraftSession {
    pub fn new(
        deck_name: impl Into<String>,
        sets: Vec<CardSet>,
        rules: DraftRules,
        seed: u64,
    ) -> Result<Self, DraftError> {
        let have: u32 = sets.iter().map(|set| set.pack_count).sum();
        if have != rules.pack_max {
            return Err(DraftError::PackTotal {
                have,
                need: rules.pack_max,
            });
        }
        Ok(Self {
            rules,
            sets,
            set_cursor: 0,
            deck: Deck::new(deck_name),
            rng: RngState::from_seed(seed),
            stage: Stage::Opening,
            total_packs: 0,
            picks_left: 0,
            picks_this_pack: 0,
            discard_stages_done: 0,
            pack: Vec::new(),
            picked: Vec::new(),
            selections: Vec::new(),
            discard: None,
        })
    }

    pub fn rules(&self) -> &DraftRules {
        &self.rules
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn sets(&self) -> &[CardSet] {
        &self.sets
    }

    pub fn total_packs(&self) -> u32 {
        self.total_packs
    }

    pub fn picks_left(&self) -> u32 {
        self.picks_left
    }

    pub fn picks_this_pack(&self) -> u32 {
        self.picks_this_pack
    }

    pub fn discard_stages_done(&self) -> u32 {
        self.discard_stages_done
    }

    /// Cards of the currently open pack.
    pub fn pack(&self) -> &[Card] {
        &self.pack
    }

    pub fn is_picked(&self, index: usize) -> bool {
        self.picked.get(index).copied().unwrap_or(false)
    }

    /// Pending selections, associated adds included.
    pub fn selections(&self) -> &[Card] {
        &self.selections
    }

    pub fn discard_stage(&self) -> Option<&DiscardStage> {
        self.discard.as_ref()
    }

    pub fn discard_stage_mut(&mut self) -> Option<&mut DiscardStage> {
        self.discard.as_mut()
    }

    /// The set the next pack will come from.
    pub fn active_set(&self) -> Option<&CardSet> {
        self.sets[self.set_cursor..]
            .iter()
            .find(|set| set.pack_count > 0)
    }

    /// Copies of a named card across the deck and pending selections.
    pub fn copies_of(&self, card_name: &str) -> usize {
        self.deck.copies_of(card_name)
            + self
                .selections
                .iter()
                .filter(|card| card.name == card_name)
                .count()
    }

    /// Installs fetched card data into the set `NeedSetCards` pointed at.
    pub fn provide_set_cards(
        &mut self,
        set_index: usize,
        cards: Vec<Card>,
    ) -> Result<(), DraftError> {
        let set = self
            .sets
            .get_mut(set_index)
            .ok_or(DraftError::InvalidSetIndex(set_index))?;
        set.install_cards(cards);
        Ok(())
    }

    /// Moves the draft forward: enforces the pick quota, commits pending
    /// selections, then either enters a discard stage or opens the next
    /// pack.
    pub fn advance(&mut self, events: &mut EventBus) -> Result<Progress, DraftError> {
        match self.stage {
            Stage::Discard => return Err(DraftError::DiscardPending),
            Stage::Complete => return Err(DraftError::DraftComplete),
            Stage::Opening => {}
        }

        if !self.pack.is_empty() && self.picks_left >= 1 {
            let selectable = self
                .pack
                .iter()
                .filter(|card| {
                    !card.card_type.is_extra_deck()
                        && self.copies_of(&card.name) < self.rules.copy_limit
                })
                .count();
            if selectable >= self.picks_left as usize {
                return Err(DraftError::SelectMore(self.picks_left));
            }
        }

        self.commit_selections(events);

        if self.discard_due() {
            let deck_target = self.rules.deck_target(self.total_packs);
            let stage = DiscardStage::new(&self.deck, deck_target, self.rules.side_growth);
            let side_target = stage.side_target;
            self.discard = Some(stage);
            self.stage = Stage::Discard;
            self.picks_left = 0;
            self.picks_this_pack = 0;
            events.push(Event::DiscardStageStarted {
                deck_target,
                side_target,
            });
            return Ok(Progress::DiscardStage {
                deck_target,
                side_target,
            });
        }

        self.open_next_pack(events)
    }

    fn discard_due(&self) -> bool {
        self.rules.discard_interval > 0
            && self.total_packs > 0
            && self.total_packs % self.rules.discard_interval == 0
            && self.total_packs / self.rules.discard_interval > self.discard_stages_done
    }

    fn commit_selections(&mut self, events: &mut EventBus) {
        if self.selections.is_empty() {
            self.pack.clear();
            self.picked.clear();
            return;
        }
        let mut main = 0;
        let mut extra = 0;
        for card in self.selections.drain(..) {
            if card.card_type.is_extra_deck() {
                extra += 1;
                self.deck.extra.push(card);
            } else {
                main += 1;
                self.deck.main.push(card);
            }
        }
        self.pack.clear();
        self.picked.clear();
        events.push(Event::SelectionsCommitted { main, extra });
    }

    fn open_next_pack(&mut self, events: &mut EventBus) -> Result<Progress, DraftError> {
        while self.set_cursor < self.sets.len() && self.sets[self.set_cursor].pack_count == 0 {
            self.set_cursor += 1;
        }
        if self.set_cursor >= self.sets.len() {
            return Err(DraftError::OutOfPacks);
        }
        if !self.sets[self.set_cursor].has_cards() {
            return Ok(Progress::NeedSetCards {
                set_index: self.set_cursor,
            });
        }

        self.total_packs += 1;
        self.picks_left += self.rules.picks_per_pack;
        self.picks_this_pack = self.picks_left;

        let cards_per_pack = self.rules.cards_per_pack;
        let mut drawn = Vec::with_capacity(cards_per_pack);
        {
            let set = &self.sets[self.set_cursor];
            let premium_weights = set_weights(&set.name, &set.cards, true);
            for slot in 0..cards_per_pack {
                let premium = slot + 1 == cards_per_pack;
                let weights = if premium && premium_weights.iter().any(|weight| *weight > 0) {
                    &premium_weights
                } else {
                    &set.weights
                };
                let index = pick_weighted_index(weights, &mut self.rng)
                    .ok_or_else(|| DraftError::EmptyCardPool(set.name.clone()))?;
                drawn.push(set.cards[index].clone());
            }
        }

        self.picked = vec![false; drawn.len()];
        self.pack = drawn;
        let set = &mut self.sets[self.set_cursor];
        set.pack_count -= 1;
        let set_name = set.name.clone();

        events.push(Event::PackOpened {
            set_name: set_name.clone(),
            pack_number: self.total_packs,
            picks_left: self.picks_left,
        });
        Ok(Progress::PackOpened {
            set_name,
            pack_number: self.total_packs,
        })
    }

    /// Picks a card out of the open pack. Extra-deck types are free;
    /// everything else consumes one pick.
    pub fn pick(&mut self, index: usize, events: &mut EventBus) -> Result<(), DraftError> {
        self.ensure_opening()?;
        if self.pack.is_empty() {
            return Err(DraftError::NoPackOpen);
        }
        let card = self
            .pack
            .get(index)
            .ok_or(DraftError::InvalidCardIndex(index))?
            .clone();
        if self.picked[index] {
            return Err(DraftError::AlreadyPicked(card.name));
        }
        if self.copies_of(&card.name) >= self.rules.copy_limit {
            return Err(DraftError::CopyLimit(card.name));
        }
        let free = card.card_type.is_extra_deck();
        if !free && self.picks_left == 0 {
            return Err(DraftError::NoPicksLeft);
        }

        self.picked[index] = true;
        if !free {
            self.picks_left -= 1;
        }
        events.push(Event::CardPicked {
            name: card.name.clone(),
            free,
        });
        self.selections.push(card);
        Ok(())
    }

    /// Returns a picked card to the pack, refunding the pick it consumed.
    pub fn unpick(&mut self, index: usize, events: &mut EventBus) -> Result<(), DraftError> {
        self.ensure_opening()?;
        if self.pack.is_empty() {
            return Err(DraftError::NoPackOpen);
        }
        let card = self
            .pack
            .get(index)
            .ok_or(DraftError::InvalidCardIndex(index))?
            .clone();
        if !self.picked[index] {
            return Err(DraftError::NotPicked(card.name));
        }
        if let Some(position) = self.selections.iter().position(|entry| *entry == card) {
            self.selections.remove(position);
        }
        self.picked[index] = false;
        if !card.card_type.is_extra_deck() {
            self.picks_left += 1;
        }
        events.push(Event::PickReturned { name: card.name });
        Ok(())
    }

    /// Drops every pending selection and restores the pack's pick balance.
    pub fn clear_selection(&mut self, events: &mut EventBus) -> Result<(), DraftError> {
        self.ensure_opening()?;
        let count = self.selections.len();
        self.selections.clear();
        for flag in &mut self.picked {
            *flag = false;
        }
        self.picks_left = self.picks_this_pack;
        events.push(Event::SelectionCleared { count });
        Ok(())
    }

    /// Adds an associated card to the pending selection without spending a
    /// pick. The copy cap still applies.
    pub fn add_associated(&mut self, card: Card, events: &mut EventBus) -> Result<(), DraftError> {
        self.ensure_opening()?;
        if self.pack.is_empty() {
            return Err(DraftError::NoPackOpen);
        }
        if self.copies_of(&card.name) >= self.rules.copy_limit {
            return Err(DraftError::CopyLimit(card.name));
        }
        events.push(Event::AssociatedAdded {
            name: card.name.clone(),
        });
        self.selections.push(card);
        Ok(())
    }

    /// Validates and applies the open discard stage. The fourth accepted
    /// stage completes the draft.
    pub fn accept_discard(&mut self, events: &mut EventBus) -> Result<Progress, DraftError> {
        if self.stage != Stage::Discard {
            return Err(DraftError::NotInDiscard);
        }
        let Some(stage) = self.discard.as_ref() else {
            return Err(DraftError::NotInDiscard);
        };
        stage.validate()?;
        let Some(stage) = self.discard.take() else {
            return Err(DraftError::NotInDiscard);
        };
        self.deck = stage.into_deck(self.deck.name.clone());
        self.discard_stages_done += 1;
        events.push(Event::DiscardAccepted {
            stage: self.discard_stages_done,
            main: self.deck.main.len(),
            extra: self.deck.extra.len(),
            side: self.deck.side.len(),
        });

        if self.discard_stages_done >= self.rules.discard_stages {
            self.stage = Stage::Complete;
            events.push(Event::DraftCompleted {
                main: self.deck.main.len(),
                extra: self.deck.extra.len(),
                side: self.deck.side.len(),
            });
            return Ok(Progress::Complete);
        }
        self.stage = Stage::Opening;
        Ok(Progress::DiscardResolved)
    }

    pub fn export_ydk(&self) -> String {
        self.deck.to_ydk()
    }

    fn ensure_opening(&self) -> Result<(), DraftError> {
        match self.stage {
            Stage::Opening => Ok(()),
            Stage::Discard => Err(DraftError::DiscardPending),
            Stage::Complete => Err(DraftError::DraftComplete),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardType, Printing};
    use chrono::NaiveDate;

    const SET_NAME: &str = "Test Set";

    fn card(name: &str, id: u32, card_type: CardType, rarity: &str) -> Card {
        Card {
            name: name.to_string(),
            description: String::new(),
            id,
            card_type,
            attribute: None,
            attack: None,
            defense: None,
            level: None,
            rarity: rarity.to_string(),
            printings: vec![Printing {
                set_name: SET_NAME.to_string(),
                set_code: "TST-001".to_string(),
                rarity: rarity.to_string(),
            }],
        }
    }

    fn pool() -> Vec<Card> {
        let mut cards = Vec::new();
        for index in 0..20 {
            cards.push(card(
                &format!("common {index}"),
                index,
                CardType::NormalMonster,
                "Common",
            ));
        }
        for index in 0..6 {
            cards.push(card(
                &format!("rare {index}"),
                100 + index,
                CardType::EffectMonster,
                "Rare",
            ));
        }
        cards.push(card("fusion", 200, CardType::FusionMonster, "Ultra Rare"));
        cards
    }

    fn session(pack_count: u32) -> DraftSession {
        let mut set = CardSet::new(
            SET_NAME.to_string(),
            "TST".to_string(),
            NaiveDate::from_ymd_opt(2002, 3, 8).expect("date"),
        );
        set.card_count = 27;
        set.pack_count = pack_count;
        set.install_cards(pool());
        let rules = DraftRules {
            pack_max: pack_count,
            ..DraftRules::default()
        };
        DraftSession::new("test", vec![set], rules, 0xC0FFEE).expect("session")
    }

    fn pick_two(session: &mut DraftSession, events: &mut EventBus) {
        while session.picks_left() > 0 {
            let eligible = (0..session.pack().len()).find(|&index| {
                let card = &session.pack()[index];
                !session.is_picked(index)
                    && !card.card_type.is_extra_deck()
                    && session.copies_of(&card.name) < session.rules().copy_limit
            });
            match eligible {
                Some(index) => session.pick(index, events).expect("pick"),
                None => break,
            }
        }
    }

    fn resolve_discard(session: &mut DraftSession, events: &mut EventBus) -> Progress {
        let side_target = {
            let stage = session.discard_stage().expect("stage open");
            stage.side_target
        };
        // Move cards into the side deck until the side target is met, then
        // mark main cards until the kept total matches.
        let stage = session.discard_stage_mut().expect("stage open");
        while stage.kept(crate::DeckSection::Side) < side_target {
            stage.move_card(crate::DeckSection::Main, 0).expect("move");
        }
        while stage.kept_total() > stage.deck_target {
            let index = stage
                .entries(crate::DeckSection::Main)
                .iter()
                .position(|entry| !entry.marked)
                .expect("unmarked main card");
            stage.toggle_mark(crate::DeckSection::Main, index).expect("mark");
        }
        session.accept_discard(events).expect("accept")
    }

    #[test]
    fn packs_always_hold_nine_cards() {
        let mut session = session(40);
        let mut events = EventBus::default();
        let progress = session.advance(&mut events).expect("open");
        assert!(matches!(progress, Progress::PackOpened { pack_number: 1, .. }));
        assert_eq!(session.pack().len(), 9);
        assert_eq!(session.picks_left(), 2);
    }

    #[test]
    fn premium_slot_skips_commons_when_possible() {
        let mut session = session(40);
        let mut events = EventBus::default();
        for _ in 0..5 {
            session.advance(&mut events).expect("advance");
            let premium = session.pack().last().expect("premium slot");
            assert_ne!(
                premium.rarity_in(SET_NAME),
                Some("Common"),
                "premium slot drew a common"
            );
            pick_two(&mut session, &mut events);
        }
    }

    #[test]
    fn quota_blocks_advancing_early() {
        let mut session = session(40);
        let mut events = EventBus::default();
        session.advance(&mut events).expect("open");

        match session.advance(&mut events) {
            Err(DraftError::SelectMore(2)) => {}
            other => panic!("expected SelectMore(2), got {other:?}"),
        }

        pick_two(&mut session, &mut events);
        assert_eq!(session.picks_left(), 0);
        let progress = session.advance(&mut events).expect("advance");
        assert!(matches!(progress, Progress::PackOpened { pack_number: 2, .. }));
    }

    #[test]
    fn extra_deck_picks_are_free() {
        let mut session = session(40);
        let mut events = EventBus::default();
        session.advance(&mut events).expect("open");

        // Plant a fusion into the open pack deterministically.
        let fusion = card("fusion", 200, CardType::FusionMonster, "Ultra Rare");
        session.pack[0] = fusion;
        session.pick(0, &mut events).expect("free pick");
        assert_eq!(session.picks_left(), 2);
        pick_two(&mut session, &mut events);
        assert_eq!(session.picks_left(), 0);

        session.advance(&mut events).expect("advance");
        assert_eq!(session.deck().extra.len(), 1);
        assert_eq!(session.deck().main.len(), 2);
    }

    #[test]
    fn copy_cap_holds_across_deck_and_selections() {
        let mut session = session(40);
        let mut events = EventBus::default();
        session.advance(&mut events).expect("open");

        let twin = card("twin", 999, CardType::NormalMonster, "Common");
        session.pack[0] = twin.clone();
        session.pack[1] = twin.clone();
        session.pack[2] = twin.clone();
        session.pack[3] = twin.clone();

        session.pick(0, &mut events).expect("first copy");
        session.pick(1, &mut events).expect("second copy");
        // Third copy is free of quota? No: quota is exhausted, two picks used.
        match session.pick(2, &mut events) {
            Err(DraftError::NoPicksLeft) => {}
            other => panic!("expected NoPicksLeft, got {other:?}"),
        }
        session.advance(&mut events).expect("advance");

        session.pack[0] = twin.clone();
        session.pack[1] = twin.clone();
        session.pick(0, &mut events).expect("third copy");
        match session.pick(1, &mut events) {
            Err(DraftError::CopyLimit(name)) => assert_eq!(name, "twin"),
            other => panic!("expected CopyLimit, got {other:?}"),
        }
        assert_eq!(session.copies_of("twin"), 3);
    }

    #[test]
    fn associated_adds_spend_no_picks() {
        let mut session = session(40);
        let mut events = EventBus::default();
        session.advance(&mut events).expect("open");

        let helper = card("Polymerization", 24094653, CardType::SpellCard, "Common");
        session.add_associated(helper, &mut events).expect("assoc");
        assert_eq!(session.picks_left(), 2);
        assert_eq!(session.selections().len(), 1);
    }

    #[test]
    fn clearing_restores_the_pack_balance() {
        let mut session = session(40);
        let mut events = EventBus::default();
        session.advance(&mut events).expect("open");
        pick_two(&mut session, &mut events);
        assert_eq!(session.picks_left(), 0);
        session.clear_selection(&mut events).expect("clear");
        assert_eq!(session.picks_left(), 2);
        assert!(session.selections().is_empty());
    }

    #[test]
    fn discard_stage_triggers_every_ten_packs() {
        let mut session = session(40);
        let mut events = EventBus::default();
        for expected_pack in 1..=10 {
            let progress = session.advance(&mut events).expect("advance");
            assert!(matches!(
                progress,
                Progress::PackOpened { pack_number, .. } if pack_number == expected_pack
            ));
            pick_two(&mut session, &mut events);
        }
        let progress = session.advance(&mut events).expect("advance");
        assert_eq!(
            progress,
            Progress::DiscardStage {
                deck_target: 12,
                side_target: 2
            }
        );
        assert_eq!(session.stage(), Stage::Discard);
        assert!(matches!(
            session.advance(&mut events),
            Err(DraftError::DiscardPending)
        ));
    }

    #[test]
    fn four_discard_stages_complete_the_draft() {
        let mut session = session(40);
        let mut events = EventBus::default();
        let mut completed = false;
        while !completed {
            match session.advance(&mut events).expect("advance") {
                Progress::PackOpened { .. } => pick_two(&mut session, &mut events),
                Progress::DiscardStage { .. } => {
                    match resolve_discard(&mut session, &mut events) {
                        Progress::Complete => completed = true,
                        Progress::DiscardResolved => {}
                        other => panic!("unexpected progress {other:?}"),
                    }
                }
                other => panic!("unexpected progress {other:?}"),
            }
        }
        assert_eq!(session.stage(), Stage::Complete);
        assert_eq!(session.discard_stages_done(), 4);
        assert_eq!(session.total_packs(), 40);
        assert_eq!(session.deck().main.len() + session.deck().side.len(), 48);
        assert!(matches!(
            session.advance(&mut events),
            Err(DraftError::DraftComplete)
        ));
    }

    #[test]
    fn wrong_pack_total_is_rejected() {
        let mut set = CardSet::new(
            SET_NAME.to_string(),
            "TST".to_string(),
            NaiveDate::from_ymd_opt(2002, 3, 8).expect("date"),
        );
        set.pack_count = 30;
        match DraftSession::new("test", vec![set], DraftRules::default(), 1) {
            Err(DraftError::PackTotal { have: 30, need: 40 }) => {}
            other => panic!("expected PackTotal, got {other:?}"),
        }
    }
}
