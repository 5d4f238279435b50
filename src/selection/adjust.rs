//! Post-selection rebalancing for parity and zone constraints.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

use crate::types::{all_numbers, is_odd, zone_of, PICK_COUNT, ZONE_COUNT};

/// Rebuild `picks` as an exact odd/even half split, keeping a random subset
/// of each parity and padding the short side with fresh numbers.
pub fn balance_parity<R: Rng + ?Sized>(picks: &BTreeSet<u8>, rng: &mut R) -> BTreeSet<u8> {
    let half = PICK_COUNT / 2;
    let (mut odds, mut evens): (Vec<u8>, Vec<u8>) = picks.iter().copied().partition(|&n| is_odd(n));
    odds.shuffle(rng);
    evens.shuffle(rng);
    odds.truncate(half);
    evens.truncate(half);

    let mut out: BTreeSet<u8> = odds.iter().chain(evens.iter()).copied().collect();
    pad_parity(&mut out, true, half - odds.len(), rng);
    pad_parity(&mut out, false, half - evens.len(), rng);
    out
}

fn pad_parity<R: Rng + ?Sized>(out: &mut BTreeSet<u8>, odd: bool, missing: usize, rng: &mut R) {
    if missing == 0 {
        return;
    }
    let mut fresh: Vec<u8> = all_numbers()
        .filter(|&n| is_odd(n) == odd && !out.contains(&n))
        .collect();
    fresh.shuffle(rng);
    out.extend(fresh.into_iter().take(missing));
}

/// Keep at most `cap` numbers per zone. Each dropped number is replaced by
/// a fresh one from a zone still under the cap, of the same parity when
/// `keep_parity` is set.
pub fn spread_zones<R: Rng + ?Sized>(
    picks: &BTreeSet<u8>,
    cap: usize,
    keep_parity: bool,
    rng: &mut R,
) -> BTreeSet<u8> {
    // five zones must be able to hold six numbers
    let cap = cap.max(PICK_COUNT.div_ceil(ZONE_COUNT));

    let mut zones: [Vec<u8>; ZONE_COUNT] = Default::default();
    for &n in picks {
        zones[zone_of(n)].push(n);
    }

    let mut kept = BTreeSet::new();
    let mut dropped = Vec::new();
    for members in zones.iter_mut() {
        members.shuffle(rng);
        for (i, &n) in members.iter().enumerate() {
            if i < cap {
                kept.insert(n);
            } else {
                dropped.push(n);
            }
        }
    }

    for n in dropped {
        let mut counts = [0usize; ZONE_COUNT];
        for &k in &kept {
            counts[zone_of(k)] += 1;
        }
        let open: Vec<u8> = all_numbers()
            .filter(|&c| counts[zone_of(c)] < cap && !kept.contains(&c))
            .collect();
        let same: Vec<u8> = if keep_parity {
            open.iter().copied().filter(|&c| is_odd(c) == is_odd(n)).collect()
        } else {
            Vec::new()
        };
        let choices = if same.is_empty() { &open } else { &same };
        if let Some(&c) = choices.choose(rng) {
            kept.insert(c);
        }
    }

    // unreachable with cap >= 2, kept for the never-fails guarantee
    if kept.len() < PICK_COUNT {
        let mut rest: Vec<u8> = all_numbers().filter(|n| !kept.contains(n)).collect();
        rest.shuffle(rng);
        let missing = PICK_COUNT - kept.len();
        kept.extend(rest.into_iter().take(missing));
    }

    kept
}
