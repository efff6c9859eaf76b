//! Compact hand notation.
//!
//! `112233m456s55678p` lists concealed tiles as digit runs closed by a suit
//! letter. Melds go in parentheses: `(p2m)` triplet, `(k2m)` exposed kong,
//! `(a2m)` concealed kong, `(u2m)` upgraded kong, with an optional trailing
//! seat digit for the player the tile was claimed from (`(p2m3)`).
//! Whitespace is ignored.

use std::iter::Peekable;
use std::str::Chars;

use crate::errors::{MahjongError, MahjongResult};
use crate::tile::{Suit, Tile, NUM_COPIES, NUM_TILE_TYPES};
use crate::types::{Hand, Meld, MeldKind, Seat, NUM_PLAYERS};

struct CopyTracker {
    used: [u8; NUM_TILE_TYPES],
}

impl CopyTracker {
    fn new() -> Self {
        Self {
            used: [0; NUM_TILE_TYPES],
        }
    }

    fn take(&mut self, tile: Tile, n: u8, input: &str) -> MahjongResult<()> {
        let used = &mut self.used[tile.index()];
        if *used + n > NUM_COPIES {
            return Err(MahjongError::invalid_tile(
                input,
                format!("no more copies of {}", tile),
            ));
        }
        *used += n;
        Ok(())
    }
}

/// Parses concealed tiles and melds.
pub fn parse_hand(text: &str) -> MahjongResult<(Hand, Vec<Meld>)> {
    let mut tracker = CopyTracker::new();
    let mut tiles = Vec::new();
    let mut melds = Vec::new();

    let mut chars = text.chars().peekable();
    let mut pending: Vec<u8> = Vec::new();

    while let Some(&c) = chars.peek() {
        if c == '(' {
            chars.next();
            if !pending.is_empty() {
                return Err(MahjongError::invalid_tile(text, "digits without suit before meld"));
            }
            let meld = parse_meld(&mut chars, text)?;
            tracker.take(meld.tile, meld.len(), text)?;
            melds.push(meld);
        } else if let Some(d) = c.to_digit(10) {
            chars.next();
            pending.push(d as u8);
        } else if let Some(suit) = Suit::from_char(c) {
            chars.next();
            if pending.is_empty() {
                return Err(MahjongError::invalid_tile(text, format!("suit '{}' without ranks", c)));
            }
            for &rank in &pending {
                let tile = Tile::from_parts(suit, rank)
                    .map_err(|_| MahjongError::invalid_tile(text, format!("invalid rank {}", rank)))?;
                tracker.take(tile, 1, text)?;
                tiles.push(tile);
            }
            pending.clear();
        } else if c.is_whitespace() {
            chars.next();
        } else {
            return Err(MahjongError::invalid_tile(text, format!("unexpected character '{}'", c)));
        }
    }

    if !pending.is_empty() {
        return Err(MahjongError::invalid_tile(text, "pending digits without suit"));
    }

    Ok((Hand::from_tiles(&tiles)?, melds))
}

/// Parses concealed tiles only, preserving input order.
pub fn parse_tiles(text: &str) -> MahjongResult<Vec<Tile>> {
    let (hand, melds) = parse_hand(text)?;
    if !melds.is_empty() {
        return Err(MahjongError::invalid_tile(text, "meld syntax is not allowed here"));
    }
    // Re-walk so that order is the caller's, not canonical.
    let mut out = Vec::with_capacity(hand.len());
    let mut pending = Vec::new();
    for c in text.chars() {
        if let Some(d) = c.to_digit(10) {
            pending.push(d as u8);
        } else if let Some(suit) = Suit::from_char(c) {
            for &rank in &pending {
                out.push(Tile::from_parts(suit, rank)?);
            }
            pending.clear();
        }
    }
    Ok(out)
}

/// Parses exactly one tile token.
pub fn parse_tile(text: &str) -> MahjongResult<Tile> {
    let tiles = parse_tiles(text)?;
    match tiles.as_slice() {
        [t] => Ok(*t),
        [] => Err(MahjongError::invalid_tile(text, "no tile found")),
        _ => Err(MahjongError::invalid_tile(
            text,
            format!("expected exactly one tile, found {}", tiles.len()),
        )),
    }
}

fn parse_meld(chars: &mut Peekable<Chars>, input: &str) -> MahjongResult<Meld> {
    let mut content = String::new();
    let mut closed = false;
    for c in chars.by_ref() {
        if c == ')' {
            closed = true;
            break;
        }
        if !c.is_whitespace() {
            content.push(c);
        }
    }
    if !closed {
        return Err(MahjongError::invalid_tile(input, "unterminated meld"));
    }

    let mut it = content.chars();
    let kind = match it.next() {
        Some('p') => MeldKind::Triplet,
        Some('k') => MeldKind::ExposedKong,
        Some('a') => MeldKind::ConcealedKong,
        Some('u') => MeldKind::UpgradedKong,
        other => {
            return Err(MahjongError::invalid_tile(
                input,
                format!("unknown meld prefix {:?}", other),
            ))
        }
    };
    let rest: String = it.collect();
    if rest.len() < 2 || !rest.is_ascii() {
        return Err(MahjongError::invalid_tile(input, format!("meld '{}' has no tile", content)));
    }
    let tile: Tile = rest[..2]
        .parse()
        .map_err(|_| MahjongError::invalid_tile(input, format!("bad meld tile '{}'", &rest[..2])))?;

    let from = match &rest[2..] {
        "" => None,
        seat => {
            let s: Seat = seat
                .parse()
                .ok()
                .filter(|&s: &Seat| (s as usize) < NUM_PLAYERS)
                .ok_or_else(|| MahjongError::invalid_tile(input, format!("bad seat '{}'", seat)))?;
            Some(s)
        }
    };
    if kind == MeldKind::ConcealedKong && from.is_some() {
        return Err(MahjongError::invalid_tile(input, "concealed kong cannot name a source seat"));
    }

    Ok(Meld::new(kind, tile, from))
}
