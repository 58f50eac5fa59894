//! Orthogonal edge routing
//!
//! Vertical segments only run in the gaps between columns. A horizontal
//! segment crosses a column either at a dummy's row, which separation keeps
//! clear, or through the lane half a `node_sep` above a box.

use smallvec::SmallVec;

use super::config::LayoutConfig;
use super::layering::EdgeChain;
use super::position::Placement;
use super::Point;

/// Polyline for one edge, from the source's right-center to the target's
/// left-center. Always at least four points.
pub(crate) fn route(
    chain: &EdgeChain,
    placement: &Placement,
    config: &LayoutConfig,
) -> SmallVec<[Point; 4]> {
    if chain.self_loop {
        return self_loop(chain.nodes[0], placement, config);
    }

    let (first, last) = match (chain.nodes.first(), chain.nodes.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return SmallVec::new(),
    };
    let inner = &chain.nodes[1..chain.nodes.len() - 1];

    let lanes = Lanes { placement, config };
    if chain.reversed {
        lanes.backward(last, inner, first)
    } else {
        lanes.forward(first, inner, last)
    }
}

struct Lanes<'a> {
    placement: &'a Placement,
    config: &'a LayoutConfig,
}

impl Lanes<'_> {
    /// Middle of the gap left of `v`'s column
    fn gap_before(&self, v: usize) -> f64 {
        self.placement.column[v].0 - self.config.rank_sep / 2.0
    }

    /// Middle of the gap right of `v`'s column
    fn gap_after(&self, v: usize) -> f64 {
        self.placement.column[v].1 + self.config.rank_sep / 2.0
    }

    /// Free row just above `v`
    fn above(&self, v: usize) -> f64 {
        self.placement.top(v) - self.config.node_sep / 2.0
    }

    fn forward(&self, source: usize, dummies: &[usize], target: usize) -> SmallVec<[Point; 4]> {
        let p = self.placement;
        let mut points: SmallVec<[Point; 4]> = SmallVec::new();
        let mut y = p.cy[source];
        points.push(Point::new(p.right(source), y));

        for &v in dummies.iter().chain(std::iter::once(&target)) {
            let x = self.gap_before(v);
            points.push(Point::new(x, y));
            y = p.cy[v];
            points.push(Point::new(x, y));
        }

        points.push(Point::new(p.left(target), y));
        points
    }

    /// Back edge: dummies are walked right to left and the end columns are
    /// crossed above their boxes
    fn backward(&self, source: usize, dummies: &[usize], target: usize) -> SmallVec<[Point; 4]> {
        let p = self.placement;
        let mut points: SmallVec<[Point; 4]> = SmallVec::new();
        points.push(Point::new(p.right(source), p.cy[source]));

        let mut x = self.gap_after(source);
        points.push(Point::new(x, p.cy[source]));
        let lane = self.above(source);
        points.push(Point::new(x, lane));
        x = self.gap_before(source);
        points.push(Point::new(x, lane));

        for &v in dummies.iter().rev() {
            points.push(Point::new(x, p.cy[v]));
            x = self.gap_before(v);
            points.push(Point::new(x, p.cy[v]));
        }

        let lane = self.above(target);
        points.push(Point::new(x, lane));
        x = self.gap_before(target);
        points.push(Point::new(x, lane));
        points.push(Point::new(x, p.cy[target]));
        points.push(Point::new(p.left(target), p.cy[target]));
        points
    }
}

/// Loop out of the right side, over the top, and back into the left side
fn self_loop(v: usize, placement: &Placement, config: &LayoutConfig) -> SmallVec<[Point; 4]> {
    let lanes = Lanes { placement, config };
    let (after, before, above) = (lanes.gap_after(v), lanes.gap_before(v), lanes.above(v));
    let y = placement.cy[v];

    smallvec::smallvec![
        Point::new(placement.right(v), y),
        Point::new(after, y),
        Point::new(after, above),
        Point::new(before, above),
        Point::new(before, y),
        Point::new(placement.left(v), y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LayoutConfig {
        LayoutConfig {
            rank_sep: 60.0,
            node_sep: 20.0,
            ..Default::default()
        }
    }

    fn placement() -> Placement {
        // Two boxes 100x40 in columns [20, 120] and [240, 340], a dummy
        // column at x=180 between them
        Placement {
            cx: vec![70.0, 290.0, 180.0],
            cy: vec![40.0, 100.0, 70.0],
            size: vec![(100.0, 40.0), (100.0, 40.0), (0.0, 0.0)],
            column: vec![(20.0, 120.0), (240.0, 340.0), (180.0, 180.0)],
            width: 360.0,
            height: 140.0,
        }
    }

    fn chain(nodes: &[usize], reversed: bool) -> EdgeChain {
        EdgeChain {
            nodes: nodes.iter().copied().collect(),
            reversed,
            self_loop: false,
        }
    }

    fn assert_orthogonal(points: &[Point]) {
        for pair in points.windows(2) {
            assert!(pair[0].x == pair[1].x || pair[0].y == pair[1].y);
        }
    }

    #[test]
    fn test_direct_route() {
        let points = route(&chain(&[0, 1], false), &placement(), &config());

        assert_eq!(points.len(), 4);
        assert_eq!(points[0], Point::new(120.0, 40.0));
        assert_eq!(points[1], Point::new(210.0, 40.0));
        assert_eq!(points[2], Point::new(210.0, 100.0));
        assert_eq!(points[3], Point::new(240.0, 100.0));
    }

    #[test]
    fn test_route_through_dummy() {
        let points = route(&chain(&[0, 2, 1], false), &placement(), &config());

        assert_eq!(points.len(), 6);
        // Elbow in the gap before the dummy column, then along the dummy row
        assert_eq!(points[1], Point::new(150.0, 40.0));
        assert_eq!(points[2], Point::new(150.0, 70.0));
        assert_eq!(points[3], Point::new(210.0, 70.0));
        assert_orthogonal(&points);
    }

    #[test]
    fn test_reversed_route_runs_source_to_target() {
        let points = route(&chain(&[0, 1], true), &placement(), &config());

        assert_eq!(points[0], Point::new(340.0, 100.0));
        assert_eq!(points[points.len() - 1], Point::new(20.0, 40.0));
        // Source column crossed above the source box
        assert!(points.contains(&Point::new(370.0, 70.0)));
        assert!(points.contains(&Point::new(210.0, 70.0)));
        assert_orthogonal(&points);
    }

    #[test]
    fn test_self_loop() {
        let points = route(
            &EdgeChain {
                nodes: smallvec::smallvec![0],
                reversed: false,
                self_loop: true,
            },
            &placement(),
            &config(),
        );

        assert_eq!(points.len(), 6);
        assert_eq!(points[0], Point::new(120.0, 40.0));
        assert_eq!(points[2], Point::new(150.0, 10.0));
        assert_eq!(points[5], Point::new(20.0, 40.0));
        assert_orthogonal(&points);
    }
}
