use serde::Deserialize;
use tracing::warn;
use ygodraft_core::{Attribute, Card, CardSet, CardType, Printing};

/// Entry of the remote set-list endpoint (bare JSON array).
#[derive(Debug, Clone, Deserialize)]
pub struct RawCardSet {
    pub set_name: String,
    pub set_code: String,
    #[serde(default)]
    pub tcg_date: Option<String>,
    #[serde(default)]
    pub num_of_cards: u32,
    #[serde(default)]
    pub set_image: Option<String>,
}

impl RawCardSet {
    /// Builds the set model; entries without a parseable release date are
    /// dropped.
    pub fn into_set(self) -> Option<CardSet> {
        let raw_date = self.tcg_date?;
        let release_date = chrono::NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d").ok()?;
        let mut set = CardSet::new(self.set_name, self.set_code, release_date);
        set.card_count = self.num_of_cards;
        set.image = self.set_image;
        Some(set)
    }
}

/// `data` envelope wrapping every card-info response.
#[derive(Debug, Clone, Deserialize)]
pub struct CardEnvelope {
    pub data: Vec<RawCard>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawArchetype {
    pub archetype_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPrinting {
    pub set_name: String,
    pub set_code: String,
    pub set_rarity: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCard {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub monster_desc: Option<String>,
    #[serde(default)]
    pub atk: Option<i32>,
    #[serde(default)]
    pub def: Option<i32>,
    #[serde(default)]
    pub level: Option<u8>,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub card_sets: Vec<RawPrinting>,
}

/// Converts one raw card. The rarity is the first printing whose set code
/// contains the target set's code, defaulting to Common. Cards with a type
/// string the model does not know are skipped.
pub fn convert_card(raw: RawCard, set: Option<&CardSet>) -> Option<Card> {
    let Some(card_type) = CardType::parse(&raw.card_type) else {
        warn!(name = %raw.name, card_type = %raw.card_type, "skipping card with unknown type");
        return None;
    };

    let mut rarity = "Common".to_string();
    if let Some(set) = set {
        if let Some(printing) = raw
            .card_sets
            .iter()
            .find(|printing| printing.set_code.contains(&set.code))
        {
            rarity = printing.set_rarity.clone();
        }
    }

    let description = match raw.monster_desc {
        Some(desc) if !desc.is_empty() => desc,
        _ => raw.desc,
    };
    let attribute = raw
        .attribute
        .as_deref()
        .and_then(Attribute::parse);

    Some(Card {
        name: raw.name,
        description,
        id: raw.id,
        card_type,
        attribute,
        attack: raw.atk,
        defense: raw.def,
        level: raw.level,
        rarity,
        printings: raw
            .card_sets
            .into_iter()
            .map(|printing| Printing {
                set_name: printing.set_name,
                set_code: printing.set_code,
                rarity: printing.set_rarity,
            })
            .collect(),
    })
}

pub fn convert_cards(raw: Vec<RawCard>, set: Option<&CardSet>) -> Vec<Card> {
    raw.into_iter()
        .filter_map(|card| convert_card(card, set))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const CARD_JSON: &str = r#"{
        "id": 46986414,
        "name": "Dark Magician",
        "type": "Normal Monster",
        "desc": "The ultimate wizard in terms of attack and defense.",
        "atk": 2500,
        "def": 2100,
        "level": 7,
        "attribute": "DARK",
        "card_sets": [
            {"set_name": "Legend of Blue Eyes White Dragon", "set_code": "LOB-005", "set_rarity": "Ultra Rare"},
            {"set_name": "Starter Deck: Yugi", "set_code": "SDY-006", "set_rarity": "Common"}
        ]
    }"#;

    fn target_set(code: &str, name: &str) -> CardSet {
        CardSet::new(
            name.to_string(),
            code.to_string(),
            NaiveDate::from_ymd_opt(2002, 3, 8).expect("date"),
        )
    }

    #[test]
    fn rarity_comes_from_the_matching_printing() {
        let raw: RawCard = serde_json::from_str(CARD_JSON).expect("parse");
        let set = target_set("LOB", "Legend of Blue Eyes White Dragon");
        let card = convert_card(raw.clone(), Some(&set)).expect("convert");
        assert_eq!(card.rarity, "Ultra Rare");
        assert_eq!(card.attribute, Some(Attribute::Dark));
        assert_eq!(card.level, Some(7));
        assert_eq!(card.printings.len(), 2);

        let other = target_set("SDY", "Starter Deck: Yugi");
        let card = convert_card(raw.clone(), Some(&other)).expect("convert");
        assert_eq!(card.rarity, "Common");

        let card = convert_card(raw, None).expect("convert");
        assert_eq!(card.rarity, "Common");
    }

    #[test]
    fn monster_description_is_preferred() {
        let raw = RawCard {
            id: 1,
            name: "Pendulum Thing".to_string(),
            card_type: "Pendulum Effect Monster".to_string(),
            desc: "full pendulum text".to_string(),
            monster_desc: Some("monster half only".to_string()),
            atk: None,
            def: None,
            level: None,
            attribute: None,
            card_sets: Vec::new(),
        };
        let card = convert_card(raw, None).expect("convert");
        assert_eq!(card.description, "monster half only");
    }

    #[test]
    fn unknown_types_are_skipped() {
        let raw = RawCard {
            id: 2,
            name: "Future Card".to_string(),
            card_type: "Hologram Monster".to_string(),
            desc: String::new(),
            monster_desc: None,
            atk: None,
            def: None,
            level: None,
            attribute: None,
            card_sets: Vec::new(),
        };
        assert!(convert_card(raw.clone(), None).is_none());
        let cards = convert_cards(
            vec![raw, serde_json::from_str(CARD_JSON).expect("parse")],
            None,
        );
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Dark Magician");
    }

    #[test]
    fn sets_without_dates_are_dropped() {
        let dated = RawCardSet {
            set_name: "Spell Ruler".to_string(),
            set_code: "SRL".to_string(),
            tcg_date: Some("2002-09-16".to_string()),
            num_of_cards: 104,
            set_image: None,
        };
        let set = dated.into_set().expect("set");
        assert_eq!(set.card_count, 104);
        assert_eq!(
            set.release_date,
            NaiveDate::from_ymd_opt(2002, 9, 16).expect("date")
        );

        let undated = RawCardSet {
            set_name: "Mystery Promo".to_string(),
            set_code: "MYS".to_string(),
            tcg_date: None,
            num_of_cards: 5,
            set_image: None,
        };
        assert!(undated.into_set().is_none());
    }
}
