use serde::{Deserialize, Serialize};

/// Thresholds driving a drafting session. Loaded from a JSON rules file when
/// one is supplied; defaults reproduce the standard 40-pack draft.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DraftRules {
    /// Packs a draft consumes in total.
    #[serde(default = "default_pack_max")]
    pub pack_max: u32,
    /// Cards revealed per pack; the last slot is the premium slot.
    #[serde(default = "default_cards_per_pack")]
    pub cards_per_pack: usize,
    /// Picks granted on every pack opening.
    #[serde(default = "default_picks_per_pack")]
    pub picks_per_pack: u32,
    /// A discard stage triggers every this many packs.
    #[serde(default = "default_discard_interval")]
    pub discard_interval: u32,
    /// Discard stages until the draft completes.
    #[serde(default = "default_discard_stages")]
    pub discard_stages: u32,
    /// Maximum copies of one named card across the whole deck.
    #[serde(default = "default_copy_limit")]
    pub copy_limit: usize,
    /// How many cards the side deck target grows by per discard stage.
    #[serde(default = "default_side_growth")]
    pub side_growth: usize,
}

fn default_pack_max() -> u32 {
    40
}

fn default_cards_per_pack() -> usize {
    9
}

fn default_picks_per_pack() -> u32 {
    2
}

fn default_discard_interval() -> u32 {
    10
}

fn default_discard_stages() -> u32 {
    4
}

fn default_copy_limit() -> usize {
    3
}

fn default_side_growth() -> usize {
    2
}

impl Default for DraftRules {
    fn default() -> Self {
        Self {
            pack_max: default_pack_max(),
            cards_per_pack: default_cards_per_pack(),
            picks_per_pack: default_picks_per_pack(),
            discard_interval: default_discard_interval(),
            discard_stages: default_discard_stages(),
            copy_limit: default_copy_limit(),
            side_growth: default_side_growth(),
        }
    }
}

impl DraftRules {
    /// Kept main+side cards a discard stage must end at.
    pub fn deck_target(&self, total_packs: u32) -> usize {
        (total_packs + total_packs / 5) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_targets_match_pack_counts() {
        let rules = DraftRules::default();
        assert_eq!(rules.deck_target(10), 12);
        assert_eq!(rules.deck_target(20), 24);
        assert_eq!(rules.deck_target(30), 36);
        assert_eq!(rules.deck_target(40), 48);
    }

    #[test]
    fn defaults_describe_the_standard_draft() {
        let rules = DraftRules::default();
        assert_eq!(rules.pack_max, 40);
        assert_eq!(rules.cards_per_pack, 9);
        assert_eq!(rules.picks_per_pack, 2);
        assert_eq!(rules.discard_interval, 10);
        assert_eq!(rules.discard_stages, 4);
        assert_eq!(rules.copy_limit, 3);
        assert_eq!(rules.side_growth, 2);
    }
}
