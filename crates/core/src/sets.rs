use crate::{set_weights, Card, RngState};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Categories a card set can fall into, matched against set names for
/// filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SetClass {
    BoosterPack,
    Promotional,
    StarterDeck,
    Tournament,
    Tin,
    Participation,
    SpecialEdition,
    Exclusive,
    Prize,
    Movie,
    MasterCollection,
    StructureDeck,
    DuelistPack,
    ChampionPack,
    Anniversary,
    Premium,
    Deck,
    Demo,
    AdventCalendar,
    CollectorBox,
    Collection,
}

impl SetClass {
    pub const ALL: [SetClass; 21] = [
        Self::BoosterPack,
        Self::Promotional,
        Self::StarterDeck,
        Self::Tournament,
        Self::Tin,
        Self::Participation,
        Self::SpecialEdition,
        Self::Exclusive,
        Self::Prize,
        Self::Movie,
        Self::MasterCollection,
        Self::StructureDeck,
        Self::DuelistPack,
        Self::ChampionPack,
        Self::Anniversary,
        Self::Premium,
        Self::Deck,
        Self::Demo,
        Self::AdventCalendar,
        Self::CollectorBox,
        Self::Collection,
    ];

    /// Lowercase label as it appears inside set names.
    pub fn label(self) -> &'static str {
        match self {
            Self::BoosterPack => "booster pack",
            Self::Promotional => "promotional",
            Self::StarterDeck => "starter deck",
            Self::Tournament => "tournament",
            Self::Tin => "tin",
            Self::Participation => "participation",
            Self::SpecialEdition => "special edition",
            Self::Exclusive => "exclusive",
            Self::Prize => "prize",
            Self::Movie => "movie",
            Self::MasterCollection => "master collection",
            Self::DuelistPack => "duelist pack",
            Self::StructureDeck => "structure deck",
            Self::ChampionPack => "champion pack",
            Self::Anniversary => "anniversary",
            Self::Premium => "premium",
            Self::Deck => "deck",
            Self::Demo => "demo",
            Self::AdventCalendar => "advent calendar",
            Self::CollectorBox => "collector box",
            Self::Collection => "collection",
        }
    }
}

/// Derives set classes from a set's name. Every matching label counts; names
/// matching nothing are treated as booster packs.
pub fn infer_set_classes(set_name: &str) -> Vec<SetClass> {
    let lowered = set_name.to_lowercase();
    let mut classes: Vec<SetClass> = SetClass::ALL
        .iter()
        .copied()
        .filter(|class| lowered.contains(class.label()))
        .collect();
    if classes.is_empty() {
        classes.push(SetClass::BoosterPack);
    }
    classes
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSet {
    pub name: String,
    pub code: String,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub classes: Vec<SetClass>,
    pub card_count: u32,
    /// Packs of this set still to be opened in the current draft.
    #[serde(default)]
    pub pack_count: u32,
    #[serde(skip)]
    pub cards: Vec<Card>,
    #[serde(skip)]
    pub weights: Vec<u32>,
}

impl CardSet {
    pub fn new(name: String, code: String, release_date: NaiveDate) -> Self {
        let classes = infer_set_classes(&name);
        Self {
            name,
            code,
            release_date,
            image: None,
            classes,
            card_count: 0,
            pack_count: 1,
            cards: Vec::new(),
            weights: Vec::new(),
        }
    }

    pub fn has_cards(&self) -> bool {
        !self.cards.is_empty()
    }

    /// Installs the set's card list and computes sampling weights once.
    pub fn install_cards(&mut self, cards: Vec<Card>) {
        self.weights = set_weights(&self.name, &cards, false);
        self.cards = cards;
    }
}

/// Criteria for narrowing the set catalogue before selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetFilter {
    pub min_cards: u32,
    pub max_date: NaiveDate,
    pub classes: Vec<SetClass>,
}

impl Default for SetFilter {
    fn default() -> Self {
        Self {
            min_cards: 3,
            max_date: chrono::Local::now().date_naive(),
            classes: SetClass::ALL.to_vec(),
        }
    }
}

impl SetFilter {
    pub fn matches(&self, set: &CardSet) -> bool {
        set.card_count >= self.min_cards
            && set.release_date <= self.max_date
            && set
                .classes
                .iter()
                .any(|class| self.classes.contains(class))
    }
}

/// Randomly assembles a draft pool: sets drawn at random with pack counts in
/// `count_range`, capped so the total never exceeds `max_packs`. Sets with
/// fewer than 10 cards contribute a single pack.
pub fn select_random_packs(
    sets: &[CardSet],
    count_range: RangeInclusive<u32>,
    max_packs: u32,
    rng: &mut RngState,
) -> Vec<CardSet> {
    let mut picked = Vec::new();
    if sets.is_empty() || max_packs == 0 {
        return picked;
    }

    let mut total = 0u32;
    while total < max_packs {
        let index = match rng.index(sets.len()) {
            Some(index) => index,
            None => break,
        };
        let mut chosen = sets[index].clone();
        let mut count = rng.range_inclusive(*count_range.start(), *count_range.end());
        if chosen.card_count < 10 {
            count = 1;
        }
        chosen.pack_count = count.min(max_packs - total);
        total += chosen.pack_count;
        picked.push(chosen);
    }

    picked
}
