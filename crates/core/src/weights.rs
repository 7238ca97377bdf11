use crate::{Card, RngState};

/// Integer sampling weight for a rarity name. Values are the fixed pull-rate
/// table rounded to the nearest integer; names outside the table fall to the
/// Secret weight.
pub fn rarity_weight(rarity: &str) -> u32 {
    match rarity {
        "Common" => 80,
        "Rare" => 17,
        "Super Rare" => 8,
        "Ultra Rare" => 4,
        "Secret" => 3,
        _ => 3,
    }
}

/// Builds sampling weights for `cards` against their printings in
/// `set_name`, index-aligned with the input. Cards with no printing in the
/// set weigh 0 and are never drawn. With `premium` set, Common printings
/// also weigh 0 so the final pack slot skips them.
pub fn set_weights(set_name: &str, cards: &[Card], premium: bool) -> Vec<u32> {
    cards
        .iter()
        .map(|card| match card.rarity_in(set_name) {
            Some(rarity) if premium && rarity == "Common" => 0,
            Some(rarity) => rarity_weight(rarity),
            None => 0,
        })
        .collect()
}

/// Weighted index selection. Zero-weight entries are skipped; returns `None`
/// when every weight is zero.
pub fn pick_weighted_index(weights: &[u32], rng: &mut RngState) -> Option<usize> {
    let total: u64 = weights.iter().map(|w| *w as u64).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.next_u64() % total;
    for (index, weight) in weights.iter().enumerate() {
        let weight = *weight as u64;
        if roll < weight {
            return Some(index);
        }
        roll -= weight;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardType, Printing};

    fn card_in_set(name: &str, set_name: &str, rarity: &str) -> Card {
        Card {
            name: name.to_string(),
            description: String::new(),
            id: 1,
            card_type: CardType::NormalMonster,
            attribute: None,
            attack: None,
            defense: None,
            level: None,
            rarity: rarity.to_string(),
            printings: vec![Printing {
                set_name: set_name.to_string(),
                set_code: "TST".to_string(),
                rarity: rarity.to_string(),
            }],
        }
    }

    #[test]
    fn table_matches_rounded_pull_rates() {
        assert_eq!(rarity_weight("Common"), 80);
        assert_eq!(rarity_weight("Rare"), 17);
        assert_eq!(rarity_weight("Super Rare"), 8);
        assert_eq!(rarity_weight("Ultra Rare"), 4);
        assert_eq!(rarity_weight("Secret"), 3);
    }

    #[test]
    fn unknown_rarity_uses_secret_weight() {
        assert_eq!(rarity_weight("Secret Rare"), 3);
        assert_eq!(rarity_weight("Starlight Rare"), 3);
    }

    #[test]
    fn weights_align_with_cards() {
        let cards = vec![
            card_in_set("a", "Test Set", "Common"),
            card_in_set("b", "Other Set", "Rare"),
            card_in_set("c", "Test Set", "Ultra Rare"),
        ];
        assert_eq!(set_weights("Test Set", &cards, false), vec![80, 0, 4]);
        assert_eq!(set_weights("Test Set", &cards, true), vec![0, 0, 4]);
    }

    #[test]
    fn weighted_pick_skips_zero_weights() {
        let mut rng = RngState::from_seed(11);
        let weights = vec![0, 5, 0, 1];
        for _ in 0..50 {
            let index = pick_weighted_index(&weights, &mut rng).unwrap();
            assert!(index == 1 || index == 3);
        }
        assert_eq!(pick_weighted_index(&[0, 0], &mut rng), None);
        assert_eq!(pick_weighted_index(&[], &mut rng), None);
    }
}
