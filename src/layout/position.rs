//! Coordinate assignment
//!
//! Columns are laid out left to right, one per layer, each as wide as its
//! widest node. Within a column, node centers are aligned with the
//! barycenter of their neighbors, subject to minimum separation.

use super::config::LayoutConfig;
use super::layering::Hierarchy;

/// Centers and sizes of every virtual node
#[derive(Debug, Clone, Default)]
pub(crate) struct Placement {
    /// Center x per virtual node
    pub cx: Vec<f64>,
    /// Center y per virtual node
    pub cy: Vec<f64>,
    /// `(width, height)` per virtual node; dummies are `(0, 0)`
    pub size: Vec<(f64, f64)>,
    /// `(left, right)` of the column holding each virtual node
    pub column: Vec<(f64, f64)>,
    /// Bounding width, margins included
    pub width: f64,
    /// Bounding height, margins included
    pub height: f64,
}

impl Placement {
    /// Left edge of a virtual node
    pub fn left(&self, v: usize) -> f64 {
        self.cx[v] - self.size[v].0 / 2.0
    }

    /// Right edge of a virtual node
    pub fn right(&self, v: usize) -> f64 {
        self.cx[v] + self.size[v].0 / 2.0
    }

    /// Top edge of a virtual node
    pub fn top(&self, v: usize) -> f64 {
        self.cy[v] - self.size[v].1 / 2.0
    }
}

/// Assign coordinates given per-real-node sizes and the chosen ordering
pub(crate) fn assign_coordinates(
    h: &Hierarchy,
    order: &[Vec<usize>],
    real_sizes: &[(f64, f64)],
    config: &LayoutConfig,
) -> Placement {
    let n = h.len();
    if n == 0 {
        return Placement::default();
    }

    let mut size = vec![(0.0, 0.0); n];
    size[..real_sizes.len()].copy_from_slice(real_sizes);

    // Columns
    let mut cx = vec![0.0; n];
    let mut column = vec![(0.0, 0.0); n];
    let mut column_left = config.margin;
    let mut right_edge = config.margin;
    for layer in order {
        let column_width = layer.iter().map(|&v| size[v].0).fold(0.0, f64::max);
        for &v in layer {
            cx[v] = column_left + column_width / 2.0;
            column[v] = (column_left, column_left + column_width);
        }
        right_edge = column_left + column_width;
        column_left += column_width + config.rank_sep;
    }

    // Minimum center distance to the previous node of the layer
    let gaps: Vec<Vec<f64>> = order
        .iter()
        .map(|layer| {
            layer
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    if i == 0 {
                        return 0.0;
                    }
                    let u = layer[i - 1];
                    let sep = if h.is_dummy(u) && h.is_dummy(v) {
                        config.edge_sep
                    } else {
                        config.node_sep
                    };
                    (size[u].1 + size[v].1) / 2.0 + sep
                })
                .collect()
        })
        .collect();

    // Packed start
    let mut cy = vec![0.0; n];
    for (layer, layer_gaps) in order.iter().zip(&gaps) {
        let mut y = 0.0;
        for (&v, gap) in layer.iter().zip(layer_gaps) {
            y += gap;
            cy[v] = y;
        }
    }

    for pass in 0..config.alignment_passes {
        let downward = pass % 2 == 0;
        let layers: Vec<usize> = if downward {
            (1..order.len()).collect()
        } else {
            (0..order.len().saturating_sub(1)).rev().collect()
        };

        for l in layers {
            let desired: Vec<f64> = order[l]
                .iter()
                .map(|&v| {
                    let adjacent = if downward { &h.up[v] } else { &h.down[v] };
                    if adjacent.is_empty() {
                        cy[v]
                    } else {
                        adjacent.iter().map(|&u| cy[u]).sum::<f64>() / adjacent.len() as f64
                    }
                })
                .collect();

            let placed = place_layer(&desired, &gaps[l]);
            for (&v, y) in order[l].iter().zip(placed) {
                cy[v] = y;
            }
        }
    }

    // Translate so the topmost edge sits at the margin
    let top = (0..n).map(|v| cy[v] - size[v].1 / 2.0).fold(f64::INFINITY, f64::min);
    let shift = config.margin - top;
    for y in &mut cy {
        *y += shift;
    }
    let bottom = (0..n)
        .map(|v| cy[v] + size[v].1 / 2.0)
        .fold(f64::NEG_INFINITY, f64::max);

    Placement {
        cx,
        cy,
        size,
        column,
        width: right_edge + config.margin,
        height: bottom + config.margin,
    }
}

/// Positions closest (least squares) to `desired` with `y[i] - y[i-1] >= gaps[i]`.
///
/// Subtracting the cumulative gap turns the constraints into monotonicity,
/// solved by pool-adjacent-violators.
pub(crate) fn place_layer(desired: &[f64], gaps: &[f64]) -> Vec<f64> {
    let mut offsets = Vec::with_capacity(desired.len());
    let mut acc = 0.0;
    for (i, gap) in gaps.iter().enumerate().take(desired.len()) {
        if i > 0 {
            acc += gap;
        }
        offsets.push(acc);
    }

    // (sum, count) blocks with non-decreasing means
    let mut blocks: Vec<(f64, usize)> = Vec::with_capacity(desired.len());
    for (d, off) in desired.iter().zip(&offsets) {
        blocks.push((d - off, 1));
        while blocks.len() >= 2 {
            let (s2, c2) = blocks[blocks.len() - 1];
            let (s1, c1) = blocks[blocks.len() - 2];
            if s1 / c1 as f64 <= s2 / c2 as f64 {
                break;
            }
            blocks.pop();
            if let Some(last) = blocks.last_mut() {
                *last = (s1 + s2, c1 + c2);
            }
        }
    }

    let mut placed = Vec::with_capacity(desired.len());
    for (sum, count) in blocks {
        let mean = sum / count as f64;
        for _ in 0..count {
            let off = offsets[placed.len()];
            placed.push(mean + off);
        }
    }
    placed
}
