//! Difficulty-stratified word selection for a session.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::debug;

use crate::consts::TIER_QUOTA_CAP;
use duel_types::{Difficulty, Word, WordCatalog};

/// Produce an ordered sequence of up to `n` distinct words: easy words
/// first, then medium, then hard, each tier uniformly sampled without
/// replacement. Easy and medium are capped at ten words each; any excess
/// lands in the hard tier. When a tier runs short the shortfall is
/// backfilled from whatever unused words remain, so the result is only
/// shorter than `n` when the whole catalog is.
pub fn select_words<R: Rng + ?Sized>(catalog: &WordCatalog, n: usize, rng: &mut R) -> Vec<Word> {
    let easy_quota = tier_quota(n);
    let medium_quota = tier_quota(n);
    let hard_quota = n.saturating_sub(easy_quota + medium_quota);

    let mut used: HashSet<String> = HashSet::new();
    let mut selected: Vec<Word> = Vec::with_capacity(n);

    for (tier, quota) in [
        (Difficulty::Easy, easy_quota),
        (Difficulty::Medium, medium_quota),
        (Difficulty::Hard, hard_quota),
    ] {
        draw_from_tier(catalog.tier(tier), quota, &mut used, &mut selected, rng);
    }

    // Small catalog: top up from any tier until n words or nothing left.
    if selected.len() < n {
        let mut remaining: Vec<&Word> = catalog
            .all_words()
            .filter(|w| !used.contains(&w.word))
            .collect();
        remaining.shuffle(rng);

        for word in remaining {
            if selected.len() >= n {
                break;
            }
            if used.insert(word.word.clone()) {
                selected.push(word.clone());
            }
        }
    }

    if selected.len() < n {
        debug!(
            requested = n,
            selected = selected.len(),
            "catalog exhausted before filling the session"
        );
    }

    selected
}

fn tier_quota(n: usize) -> usize {
    TIER_QUOTA_CAP.min(n.div_ceil(3))
}

fn draw_from_tier<R: Rng + ?Sized>(
    tier: &[Word],
    quota: usize,
    used: &mut HashSet<String>,
    selected: &mut Vec<Word>,
    rng: &mut R,
) {
    let mut pool: Vec<&Word> = tier.iter().collect();
    pool.shuffle(rng);

    let mut taken = 0;
    for word in pool {
        if taken >= quota {
            break;
        }
        // The used-set spans tiers: a word listed under two difficulties is
        // still drawn at most once per session.
        if used.insert(word.word.clone()) {
            selected.push(word.clone());
            taken += 1;
        }
    }
}

/// Description tier for the word at `index` in the session order. Relies on
/// the selector's easy-then-medium-then-hard concatenation.
pub fn description_tier(index: i32) -> Difficulty {
    if index < 10 {
        Difficulty::Easy
    } else if index < 20 {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}
