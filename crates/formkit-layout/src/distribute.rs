//! Integer space distribution by weight.
//!
//! All splits use largest-remainder rounding: every share gets the floor of its
//! exact quota, and the pixels left over go one each to the shares with the
//! largest fractional parts, lower index first on ties. The shares always sum
//! to the amount distributed.
//!
//! Pixel sums saturate at `i32::MAX` instead of overflowing.

use std::cmp::Ordering;

/// Split `amount` proportional to `weights`.
///
/// Leftover pixels on equal fractions go to the lower index, so the same
/// input always yields the same split. Returns all zeros when `amount` is not
/// positive or no weight is.
pub fn largest_remainder(amount: i32, weights: &[f64]) -> Vec<i32> {
    let mut shares = vec![0; weights.len()];
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if amount <= 0 || total <= 0.0 {
        return shares;
    }

    let mut fractions = Vec::with_capacity(weights.len());
    let mut assigned = 0;
    for (i, weight) in weights.iter().enumerate() {
        if *weight <= 0.0 {
            continue;
        }
        let quota = f64::from(amount) * weight / total;
        let floor = quota.floor();
        shares[i] = floor as i32;
        assigned += shares[i];
        fractions.push((i, quota - floor));
    }

    // Stable sort keeps the lower index first among equal fractions.
    fractions.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    let leftover = (amount - assigned).max(0) as usize;
    for (i, _) in fractions.iter().cycle().take(leftover) {
        shares[*i] += 1;
    }
    shares
}

/// Sum of `sizes`, saturating at `i32::MAX`.
pub fn total(sizes: &[i32]) -> i32 {
    sizes.iter().fold(0, |sum, size| sum.saturating_add(*size))
}

/// Like [`largest_remainder`], but splits evenly when no weight is positive.
pub fn spread(amount: i32, weights: &[f64]) -> Vec<i32> {
    if weights.iter().any(|w| *w > 0.0) {
        largest_remainder(amount, weights)
    } else {
        largest_remainder(amount, &vec![1.0; weights.len()])
    }
}

/// Add `delta` pixels to `sizes`, proportional to `weights`.
pub fn grow(sizes: &mut [i32], weights: &[f64], delta: i32) {
    for (size, extra) in sizes.iter_mut().zip(largest_remainder(delta, weights)) {
        *size = size.saturating_add(extra);
    }
}

/// Take up to `deficit` pixels from the weighted entries of `sizes`.
///
/// Cuts are proportional to weight. An entry never drops below zero; what it
/// cannot give is taken from the remaining weighted entries in further rounds.
/// Returns the pixels actually removed, `min(deficit, sum of weighted sizes)`.
pub fn shrink(sizes: &mut [i32], weights: &[f64], deficit: i32) -> i32 {
    let mut remaining = deficit.max(0);
    let mut active: Vec<usize> = (0..sizes.len())
        .filter(|&i| weights.get(i).is_some_and(|w| *w > 0.0) && sizes[i] > 0)
        .collect();

    while remaining > 0 && !active.is_empty() {
        let active_weights: Vec<f64> = active.iter().map(|&i| weights[i]).collect();
        let cuts = largest_remainder(remaining, &active_weights);

        let mut removed = 0;
        for (&i, cut) in active.iter().zip(cuts) {
            let cut = cut.min(sizes[i]);
            sizes[i] -= cut;
            removed += cut;
        }
        if removed == 0 {
            break;
        }
        remaining -= removed;
        active.retain(|&i| sizes[i] > 0);
    }
    deficit.max(0) - remaining
}
