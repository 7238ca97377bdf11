use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardType {
    EffectMonster,
    FlipEffectMonster,
    FlipTunerEffectMonster,
    GeminiMonster,
    NormalMonster,
    NormalTunerMonster,
    PendulumEffectMonster,
    PendulumEffectRitualMonster,
    PendulumFlipEffectMonster,
    PendulumNormalMonster,
    PendulumTunerEffectMonster,
    RitualEffectMonster,
    RitualMonster,
    SpellCard,
    SpiritMonster,
    ToonMonster,
    TrapCard,
    TunerMonster,
    UnionEffectMonster,
    FusionMonster,
    LinkMonster,
    PendulumEffectFusionMonster,
    SynchroMonster,
    SynchroPendulumEffectMonster,
    SynchroTunerMonster,
    XyzMonster,
    XyzPendulumEffectMonster,
    SkillCard,
    Token,
}

/// Types that live in the extra deck rather than the main deck.
pub const EXTRA_DECK_TYPES: &[CardType] = &[
    CardType::FusionMonster,
    CardType::LinkMonster,
    CardType::PendulumEffectFusionMonster,
    CardType::SynchroMonster,
    CardType::SynchroPendulumEffectMonster,
    CardType::SynchroTunerMonster,
    CardType::XyzMonster,
    CardType::XyzPendulumEffectMonster,
];

impl CardType {
    /// Parses the card type strings the remote database uses verbatim.
    pub fn parse(raw: &str) -> Option<Self> {
        let kind = match raw {
            "Effect Monster" => Self::EffectMonster,
            "Flip Effect Monster" => Self::FlipEffectMonster,
            "Flip Tuner Effect Monster" => Self::FlipTunerEffectMonster,
            "Gemini Monster" => Self::GeminiMonster,
            "Normal Monster" => Self::NormalMonster,
            "Normal Tuner Monster" => Self::NormalTunerMonster,
            "Pendulum Effect Monster" => Self::PendulumEffectMonster,
            "Pendulum Effect Ritual Monster" => Self::PendulumEffectRitualMonster,
            "Pendulum Flip Effect Monster" => Self::PendulumFlipEffectMonster,
            "Pendulum Normal Monster" => Self::PendulumNormalMonster,
            "Pendulum Tuner Effect Monster" => Self::PendulumTunerEffectMonster,
            "Ritual Effect Monster" => Self::RitualEffectMonster,
            "Ritual Monster" => Self::RitualMonster,
            "Spell Card" => Self::SpellCard,
            "Spirit Monster" => Self::SpiritMonster,
            "Toon Monster" => Self::ToonMonster,
            "Trap Card" => Self::TrapCard,
            "Tuner Monster" => Self::TunerMonster,
            "Union Effect Monster" => Self::UnionEffectMonster,
            "Fusion Monster" => Self::FusionMonster,
            "Link Monster" => Self::LinkMonster,
            "Pendulum Effect Fusion Monster" => Self::PendulumEffectFusionMonster,
            "Synchro Monster" => Self::SynchroMonster,
            "Synchro Pendulum Effect Monster" => Self::SynchroPendulumEffectMonster,
            "Synchro Tuner Monster" => Self::SynchroTunerMonster,
            "XYZ Monster" => Self::XyzMonster,
            "XYZ Pendulum Effect Monster" => Self::XyzPendulumEffectMonster,
            "Skill Card" => Self::SkillCard,
            "Token" => Self::Token,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::EffectMonster => "Effect Monster",
            Self::FlipEffectMonster => "Flip Effect Monster",
            Self::FlipTunerEffectMonster => "Flip Tuner Effect Monster",
            Self::GeminiMonster => "Gemini Monster",
            Self::NormalMonster => "Normal Monster",
            Self::NormalTunerMonster => "Normal Tuner Monster",
            Self::PendulumEffectMonster => "Pendulum Effect Monster",
            Self::PendulumEffectRitualMonster => "Pendulum Effect Ritual Monster",
            Self::PendulumFlipEffectMonster => "Pendulum Flip Effect Monster",
            Self::PendulumNormalMonster => "Pendulum Normal Monster",
            Self::PendulumTunerEffectMonster => "Pendulum Tuner Effect Monster",
            Self::RitualEffectMonster => "Ritual Effect Monster",
            Self::RitualMonster => "Ritual Monster",
            Self::SpellCard => "Spell Card",
            Self::SpiritMonster => "Spirit Monster",
            Self::ToonMonster => "Toon Monster",
            Self::TrapCard => "Trap Card",
            Self::TunerMonster => "Tuner Monster",
            Self::UnionEffectMonster => "Union Effect Monster",
            Self::FusionMonster => "Fusion Monster",
            Self::LinkMonster => "Link Monster",
            Self::PendulumEffectFusionMonster => "Pendulum Effect Fusion Monster",
            Self::SynchroMonster => "Synchro Monster",
            Self::SynchroPendulumEffectMonster => "Synchro Pendulum Effect Monster",
            Self::SynchroTunerMonster => "Synchro Tuner Monster",
            Self::XyzMonster => "XYZ Monster",
            Self::XyzPendulumEffectMonster => "XYZ Pendulum Effect Monster",
            Self::SkillCard => "Skill Card",
            Self::Token => "Token",
        }
    }

    pub fn is_extra_deck(self) -> bool {
        EXTRA_DECK_TYPES.contains(&self)
    }

    pub fn is_fusion(self) -> bool {
        matches!(
            self,
            Self::FusionMonster | Self::PendulumEffectFusionMonster
        )
    }

    pub fn is_monster(self) -> bool {
        self.name().contains("Monster")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Attribute {
    Dark,
    Earth,
    Fire,
    Light,
    Water,
    Wind,
    Divine,
}

impl Attribute {
    pub fn parse(raw: &str) -> Option<Self> {
        let attribute = match raw.to_ascii_uppercase().as_str() {
            "DARK" => Self::Dark,
            "EARTH" => Self::Earth,
            "FIRE" => Self::Fire,
            "LIGHT" => Self::Light,
            "WATER" => Self::Water,
            "WIND" => Self::Wind,
            "DIVINE" => Self::Divine,
            _ => return None,
        };
        Some(attribute)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "DARK",
            Self::Earth => "EARTH",
            Self::Fire => "FIRE",
            Self::Light => "LIGHT",
            Self::Water => "WATER",
            Self::Wind => "WIND",
            Self::Divine => "DIVINE",
        }
    }
}

/// One appearance of a card inside a card set, with the rarity it carries
/// there. Distilled from the raw payload's `card_sets` list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Printing {
    pub set_name: String,
    pub set_code: String,
    pub rarity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub name: String,
    pub description: String,
    pub id: u32,
    pub card_type: CardType,
    #[serde(default)]
    pub attribute: Option<Attribute>,
    #[serde(default)]
    pub attack: Option<i32>,
    #[serde(default)]
    pub defense: Option<i32>,
    #[serde(default)]
    pub level: Option<u8>,
    #[serde(default = "default_rarity")]
    pub rarity: String,
    #[serde(default)]
    pub printings: Vec<Printing>,
}

fn default_rarity() -> String {
    "Common".to_string()
}

impl Card {
    /// Rarity of this card's printing in the named set, if it has one.
    pub fn rarity_in(&self, set_name: &str) -> Option<&str> {
        self.printings
            .iter()
            .find(|printing| printing.set_name == set_name)
            .map(|printing| printing.rarity.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_remote_type_strings() {
        assert_eq!(
            CardType::parse("Effect Monster"),
            Some(CardType::EffectMonster)
        );
        assert_eq!(CardType::parse("XYZ Monster"), Some(CardType::XyzMonster));
        assert_eq!(CardType::parse("Spell Card"), Some(CardType::SpellCard));
        assert_eq!(CardType::parse("Mystery Card"), None);
    }

    #[test]
    fn extra_deck_membership() {
        assert!(CardType::FusionMonster.is_extra_deck());
        assert!(CardType::LinkMonster.is_extra_deck());
        assert!(CardType::SynchroTunerMonster.is_extra_deck());
        assert!(!CardType::EffectMonster.is_extra_deck());
        assert!(!CardType::RitualMonster.is_extra_deck());
    }

    #[test]
    fn fusion_group_covers_pendulum_variant() {
        assert!(CardType::FusionMonster.is_fusion());
        assert!(CardType::PendulumEffectFusionMonster.is_fusion());
        assert!(!CardType::SynchroMonster.is_fusion());
    }

    #[test]
    fn type_names_round_trip() {
        for kind in EXTRA_DECK_TYPES {
            assert_eq!(CardType::parse(kind.name()), Some(*kind));
        }
    }
}
