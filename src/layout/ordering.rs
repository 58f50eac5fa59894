//! Crossing minimization by barycenter sweeps

use std::cmp::Ordering;

use super::layering::Hierarchy;

/// Initial per-layer order: real nodes in canonical order, then dummies
/// in creation order.
pub(crate) fn initial_order(h: &Hierarchy) -> Vec<Vec<usize>> {
    let mut layers = vec![Vec::new(); h.layer_count];
    for v in 0..h.len() {
        layers[h.layer_of[v]].push(v);
    }
    layers
}

/// Reorder layers to reduce crossings.
///
/// Even passes sweep left to right using predecessors, odd passes right to
/// left using successors. The ordering with the fewest crossings wins; ties
/// keep the earlier one.
pub(crate) fn minimize_crossings(h: &Hierarchy, passes: usize) -> Vec<Vec<usize>> {
    let mut order = initial_order(h);
    let mut position = positions(h, &order);

    let mut best = order.clone();
    let mut best_crossings = count_crossings(h, &order, &position);

    for pass in 0..passes {
        if best_crossings == 0 {
            break;
        }

        if pass % 2 == 0 {
            for layer in 1..order.len() {
                sort_layer(&mut order[layer], &mut position, |v| h.up[v].as_slice());
            }
        } else {
            for layer in (0..order.len().saturating_sub(1)).rev() {
                sort_layer(&mut order[layer], &mut position, |v| h.down[v].as_slice());
            }
        }

        let crossings = count_crossings(h, &order, &position);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = order.clone();
        }
    }

    best
}

/// Index of every virtual node within its layer
pub(crate) fn positions(h: &Hierarchy, order: &[Vec<usize>]) -> Vec<usize> {
    let mut position = vec![0; h.len()];
    for layer in order {
        for (i, &v) in layer.iter().enumerate() {
            position[v] = i;
        }
    }
    position
}

fn sort_layer<'h, F>(layer: &mut [usize], position: &mut [usize], neighbors: F)
where
    F: Fn(usize) -> &'h [usize],
{
    let mut keyed: Vec<(f64, usize, usize)> = layer
        .iter()
        .enumerate()
        .map(|(current, &v)| {
            let adjacent = neighbors(v);
            let barycenter = if adjacent.is_empty() {
                current as f64
            } else {
                adjacent.iter().map(|&u| position[u] as f64).sum::<f64>() / adjacent.len() as f64
            };
            (barycenter, current, v)
        })
        .collect();

    keyed.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });

    for (i, (_, _, v)) in keyed.into_iter().enumerate() {
        layer[i] = v;
        position[v] = i;
    }
}

/// Total number of segment crossings between adjacent layers
pub(crate) fn count_crossings(h: &Hierarchy, order: &[Vec<usize>], position: &[usize]) -> usize {
    let mut total = 0;
    for layer in order.iter().take(order.len().saturating_sub(1)) {
        let mut segments: Vec<(usize, usize)> = Vec::new();
        for &v in layer {
            for &w in &h.down[v] {
                segments.push((position[v], position[w]));
            }
        }
        segments.sort_unstable();
        let mut targets: Vec<usize> = segments.into_iter().map(|(_, t)| t).collect();
        total += count_inversions(&mut targets);
    }
    total
}

/// Number of pairs `i < j` with `v[i] > v[j]`; sorts `v` as a side effect
fn count_inversions(v: &mut [usize]) -> usize {
    let len = v.len();
    if len < 2 {
        return 0;
    }

    let mid = len / 2;
    let mut count = count_inversions(&mut v[..mid]) + count_inversions(&mut v[mid..]);

    let mut merged = Vec::with_capacity(len);
    let (mut i, mut j) = (0, mid);
    while i < mid && j < len {
        if v[j] < v[i] {
            count += mid - i;
            merged.push(v[j]);
            j += 1;
        } else {
            merged.push(v[i]);
            i += 1;
        }
    }
    merged.extend_from_slice(&v[i..mid]);
    merged.extend_from_slice(&v[j..len]);
    v.copy_from_slice(&merged);

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::SmallVec;

    /// Two layers, fully specified by (upper, lower) pairs
    fn two_layer(upper: usize, lower: usize, segments: &[(usize, usize)]) -> Hierarchy {
        let n = upper + lower;
        let mut h = Hierarchy {
            real_count: n,
            layer_of: (0..n).map(|v| usize::from(v >= upper)).collect(),
            layer_count: 2,
            up: vec![SmallVec::new(); n],
            down: vec![SmallVec::new(); n],
            chains: Vec::new(),
        };
        for &(a, b) in segments {
            h.down[a].push(upper + b);
            h.up[upper + b].push(a);
        }
        h
    }

    #[test]
    fn test_count_inversions() {
        assert_eq!(count_inversions(&mut [0, 1, 2]), 0);
        assert_eq!(count_inversions(&mut [2, 1, 0]), 3);
        assert_eq!(count_inversions(&mut [1, 0, 1, 0]), 3);
        assert_eq!(count_inversions(&mut []), 0);
    }

    #[test]
    fn test_count_crossings() {
        // 0 -> 1', 1 -> 0' cross once
        let h = two_layer(2, 2, &[(0, 1), (1, 0)]);
        let order = initial_order(&h);
        let position = positions(&h, &order);
        assert_eq!(count_crossings(&h, &order, &position), 1);

        // Shared endpoints never cross
        let h = two_layer(2, 1, &[(0, 0), (1, 0)]);
        let order = initial_order(&h);
        let position = positions(&h, &order);
        assert_eq!(count_crossings(&h, &order, &position), 0);
    }

    #[test]
    fn test_minimize_removes_crossing() {
        let h = two_layer(3, 3, &[(0, 2), (1, 1), (2, 0)]);
        let order = initial_order(&h);
        let before = count_crossings(&h, &order, &positions(&h, &order));
        assert_eq!(before, 3);

        let best = minimize_crossings(&h, 4);
        let after = count_crossings(&h, &best, &positions(&h, &best));
        assert_eq!(after, 0);
    }

    #[test]
    fn test_minimize_never_worse() {
        let h = two_layer(3, 3, &[(0, 0), (1, 1), (2, 2), (0, 2)]);
        let order = initial_order(&h);
        let before = count_crossings(&h, &order, &positions(&h, &order));

        let best = minimize_crossings(&h, 8);
        let after = count_crossings(&h, &best, &positions(&h, &best));
        assert!(after <= before);
    }

    #[test]
    fn test_zero_passes_keeps_initial() {
        let h = two_layer(2, 2, &[(0, 1), (1, 0)]);
        assert_eq!(minimize_crossings(&h, 0), initial_order(&h));
    }
}
