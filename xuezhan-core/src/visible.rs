//! Visible tile tracking.
//!
//! Counts every copy a seat can see on the table: river discards, exposed
//! melds and the hands revealed by players who already won. Concealed kongs
//! stay face down. Updated incrementally on each table event, or rebuilt
//! from a snapshot with [`VisibleTiles::from_table`].

use serde::{Deserialize, Serialize};
use xuezhan_engine::tile::{NUM_COPIES, NUM_TILE_TYPES};
use xuezhan_engine::types::{Hand, Meld, MeldKind};
use xuezhan_engine::{PlayerState, Tile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleTiles {
    counts: [u8; NUM_TILE_TYPES],
}

impl Default for VisibleTiles {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibleTiles {
    pub fn new() -> Self {
        Self {
            counts: [0; NUM_TILE_TYPES],
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Rebuilds the view from the rivers and the players' open information.
    ///
    /// `rivers` holds the discards still lying on the table; claimed tiles
    /// must already have moved into the claimer's meld.
    pub fn from_table(rivers: &[Vec<Tile>], players: &[PlayerState]) -> Self {
        let mut visible = Self::new();
        for tile in rivers.iter().flatten() {
            visible.add(*tile, 1);
        }
        for p in players {
            for meld in &p.melds {
                visible.add(meld.tile, exposed_copies(meld));
            }
            if p.won {
                visible.reveal_hand(&p.hand);
            }
        }
        visible
    }

    fn add(&mut self, tile: Tile, n: u8) {
        let c = &mut self.counts[tile.index()];
        *c = c.saturating_add(n).min(NUM_COPIES);
    }

    pub fn on_discard(&mut self, tile: Tile) {
        self.add(tile, 1);
    }

    /// A discard was claimed into `meld`; only the copies that came from the
    /// claimer's hand are new information.
    pub fn on_meld(&mut self, meld: &Meld) {
        let new = match meld.kind {
            MeldKind::Triplet => 2,
            MeldKind::ExposedKong => 3,
            MeldKind::ConcealedKong => 0,
            MeldKind::UpgradedKong => 1,
        };
        self.add(meld.tile, new);
    }

    /// A winner lays down their concealed tiles.
    pub fn reveal_hand(&mut self, hand: &Hand) {
        for tile in hand.kinds() {
            self.add(tile, hand.count(tile));
        }
    }

    pub fn count(&self, tile: Tile) -> u8 {
        self.counts[tile.index()]
    }

    pub fn counts(&self) -> &[u8; NUM_TILE_TYPES] {
        &self.counts
    }

    /// Copies of `tile` that `viewer` has not seen anywhere.
    pub fn unseen(&self, tile: Tile, viewer: &PlayerState) -> u8 {
        let own = viewer.hand.count(tile)
            + viewer
                .melds
                .iter()
                .filter(|m| m.tile == tile && m.kind == MeldKind::ConcealedKong)
                .map(|m| m.len())
                .sum::<u8>();
        NUM_COPIES.saturating_sub(self.count(tile).saturating_add(own))
    }
}

/// Face-up copies of a meld on a snapshot.
fn exposed_copies(meld: &Meld) -> u8 {
    match meld.kind {
        MeldKind::ConcealedKong => 0,
        _ => meld.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xuezhan_engine::parser::{parse_hand, parse_tile};

    fn tile(s: &str) -> Tile {
        parse_tile(s).unwrap()
    }

    #[test]
    fn discards_and_claims() {
        let mut v = VisibleTiles::new();
        v.on_discard(tile("5p"));
        assert_eq!(v.count(tile("5p")), 1);
        // Claimed into a pong: two more copies come from the claimer's hand.
        v.on_meld(&Meld::triplet(tile("5p"), 2));
        assert_eq!(v.count(tile("5p")), 3);
        v.on_meld(&Meld::new(MeldKind::UpgradedKong, tile("5p"), Some(2)));
        assert_eq!(v.count(tile("5p")), 4);
        v.on_discard(tile("5p"));
        assert_eq!(v.count(tile("5p")), 4);
    }

    #[test]
    fn concealed_kong_stays_hidden() {
        let mut v = VisibleTiles::new();
        v.on_meld(&Meld::concealed_kong(tile("9m")));
        assert_eq!(v.count(tile("9m")), 0);

        let mut owner = PlayerState::new(1);
        owner.melds.push(Meld::concealed_kong(tile("9m")));
        assert_eq!(v.unseen(tile("9m"), &owner), 0);
        assert_eq!(v.unseen(tile("9m"), &PlayerState::new(0)), 4);
    }

    #[test]
    fn snapshot_counts_rivers_melds_and_winners() {
        let mut winner = PlayerState::new(0);
        let (hand, melds) = parse_hand("123m456p55p (p7p)").unwrap();
        winner.hand = hand;
        winner.melds = melds;
        winner.won = true;

        let mut viewer = PlayerState::new(1);
        viewer.hand = parse_hand("5p").unwrap().0;

        let rivers = vec![vec![tile("5p"), tile("1s")], vec![], vec![], vec![]];
        let v = VisibleTiles::from_table(&rivers, &[winner, viewer.clone()]);
        // River 5p plus 456p and 55p revealed by the winner.
        assert_eq!(v.count(tile("5p")), 4);
        assert_eq!(v.count(tile("7p")), 3);
        assert_eq!(v.count(tile("1s")), 1);
        assert_eq!(v.unseen(tile("5p"), &viewer), 0);
        assert_eq!(v.unseen(tile("9s"), &viewer), 4);
    }
}
