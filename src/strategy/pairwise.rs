// N-wise covering arrays. Instead of sampling variable tuples at random, a
// greedy construction picks rows so that every combination of values across
// any `strength` variables appears in at least one row. Deterministic for a
// given set of pools.

use std::collections::BTreeSet;

use tracing::debug;

use crate::arbitrary::FluentPick;

/// All `strength`-sized position subsets of 0..k, in lexicographic order.
fn position_combos(k: usize, strength: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut combo: Vec<usize> = (0..strength).collect();
    loop {
        out.push(combo.clone());
        // Advance to the next combination.
        let mut i = strength;
        loop {
            if i == 0 {
                return out;
            }
            i -= 1;
            if combo[i] < k - strength + i {
                combo[i] += 1;
                for j in i + 1..strength {
                    combo[j] = combo[j - 1] + 1;
                }
                break;
            }
        }
    }
}

/// Interactions covered by a complete row, as (combo id, value indices).
fn interactions_of(
    row: &[usize],
    combos: &[Vec<usize>],
) -> Vec<(usize, Vec<usize>)> {
    combos
        .iter()
        .enumerate()
        .map(|(cid, positions)| (cid, positions.iter().map(|&p| row[p]).collect()))
        .collect()
}

/// Greedy covering-array construction over per-variable pools. Rows are
/// tuples with one pick per pool, and every combination of picks across any
/// `strength` pools occurs in some row.
pub fn covering_tuples(pools: &[Vec<FluentPick>], strength: usize) -> Vec<Vec<FluentPick>> {
    let k = pools.len();
    if k == 0 || pools.iter().any(Vec::is_empty) {
        return Vec::new();
    }
    let strength = strength.max(1).min(k);
    let combos = position_combos(k, strength);

    let mut uncovered: BTreeSet<(usize, Vec<usize>)> = BTreeSet::new();
    for (cid, positions) in combos.iter().enumerate() {
        let mut values = vec![0usize; strength];
        loop {
            uncovered.insert((cid, values.clone()));
            let mut i = strength;
            loop {
                if i == 0 {
                    break;
                }
                i -= 1;
                values[i] += 1;
                if values[i] < pools[positions[i]].len() {
                    break;
                }
                values[i] = 0;
            }
            if values.iter().all(|&v| v == 0) {
                break;
            }
        }
    }

    let mut rows: Vec<Vec<usize>> = Vec::new();
    while let Some((cid, values)) = uncovered.iter().next().cloned() {
        // Fix the first uncovered interaction, then fill the remaining
        // positions to maximize newly covered interactions.
        let mut row: Vec<Option<usize>> = vec![None; k];
        for (slot, &p) in combos[cid].iter().enumerate() {
            row[p] = Some(values[slot]);
        }
        for p in 0..k {
            if row[p].is_some() {
                continue;
            }
            let mut best = 0usize;
            let mut best_gain = -1i64;
            for v in 0..pools[p].len() {
                row[p] = Some(v);
                let gain = combos
                    .iter()
                    .enumerate()
                    .filter(|(_, positions)| positions.iter().all(|&q| row[q].is_some()))
                    .filter(|(cid, positions)| {
                        let vals: Vec<usize> =
                            positions.iter().map(|&q| row[q].unwrap()).collect();
                        uncovered.contains(&(*cid, vals))
                    })
                    .count() as i64;
                if gain > best_gain {
                    best_gain = gain;
                    best = v;
                }
                row[p] = None;
            }
            row[p] = Some(best);
        }
        let row: Vec<usize> = row.into_iter().map(Option::unwrap).collect();
        for interaction in interactions_of(&row, &combos) {
            uncovered.remove(&interaction);
        }
        rows.push(row);
    }

    debug!(rows = rows.len(), strength, pools = k, "covering array built");
    rows.into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(p, &v)| pools[p][v].clone())
                .collect()
        })
        .collect()
}
