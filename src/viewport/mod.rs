//! Pan/zoom state for a rendered layout
//!
//! Screen coordinates relate to layout coordinates by
//! `screen = layout * scale + pan`. The layout itself is never mutated.
//!
//! # Example
//!
//! ```ignore
//! use onnx_graphviz::viewport::Viewport;
//!
//! let mut view = Viewport::from_config(&config);
//! view.zoom_by(1.25, cursor);
//! if let Some(id) = view.hit_test(&laid_out, cursor) {
//!     let focus = Focus::of(&graph, id);
//! }
//! ```

use serde::Serialize;

use crate::graph::traversal::{downstream, upstream};
use crate::graph::{CanonicalGraph, NodeId};
use crate::layout::{LaidOutGraph, LayoutConfig, Point};

/// Independent x/y pan plus a uniform, clamped scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Horizontal pan offset in screen units
    pub pan_x: f64,
    /// Vertical pan offset in screen units
    pub pan_y: f64,
    scale: f64,
    min_scale: f64,
    max_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl Viewport {
    /// Identity view with the scale limits of a layout config
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.min_scale, config.max_scale)
    }

    /// Identity view with explicit limits
    ///
    /// Swapped limits are reordered and the range is widened to contain 1,
    /// so [`reset`](Self::reset) always lands on scale 1.
    pub fn new(min_scale: f64, max_scale: f64) -> Self {
        let (min_scale, max_scale) = if min_scale <= max_scale {
            (min_scale, max_scale)
        } else {
            (max_scale, min_scale)
        };
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            scale: 1.0,
            min_scale: min_scale.min(1.0),
            max_scale: max_scale.max(1.0),
        }
    }

    /// Current scale factor
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// `(min, max)` scale limits
    pub fn scale_limits(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    /// Shift the view
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.pan_x += dx;
            self.pan_y += dy;
        }
    }

    /// Set the scale, clamped to the limits; non-finite values are ignored
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() {
            self.scale = scale.clamp(self.min_scale, self.max_scale);
        }
    }

    /// Multiply the scale by `factor`, keeping the layout point under
    /// `anchor` (a screen point) fixed
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let fixed = self.to_layout(anchor);
        self.set_scale(self.scale * factor);
        self.pan_x = anchor.x - fixed.x * self.scale;
        self.pan_y = anchor.y - fixed.y * self.scale;
    }

    /// Scale 1, pan (0, 0)
    pub fn reset(&mut self) {
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        self.scale = 1.0;
    }

    /// Screen point → layout point
    pub fn to_layout(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan_x) / self.scale,
            (screen.y - self.pan_y) / self.scale,
        )
    }

    /// Layout point → screen point
    pub fn to_screen(&self, layout: Point) -> Point {
        Point::new(
            layout.x * self.scale + self.pan_x,
            layout.y * self.scale + self.pan_y,
        )
    }

    /// Node under a screen point
    pub fn hit_test(&self, graph: &LaidOutGraph, screen: Point) -> Option<NodeId> {
        graph.hit_test(self.to_layout(screen))
    }

    /// Fit the whole drawing into a `width` x `height` screen area, centered
    pub fn fit(&mut self, graph: &LaidOutGraph, width: f64, height: f64) {
        if graph.width <= 0.0 || graph.height <= 0.0 || width <= 0.0 || height <= 0.0 {
            self.reset();
            return;
        }
        self.set_scale((width / graph.width).min(height / graph.height));
        self.pan_x = (width - graph.width * self.scale) / 2.0;
        self.pan_y = (height - graph.height * self.scale) / 2.0;
    }
}

/// A selected node with everything it depends on and everything depending on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Focus {
    /// The selected node
    pub node: NodeId,
    /// Transitive producers, nearest first
    pub upstream: Vec<NodeId>,
    /// Transitive consumers, nearest first
    pub downstream: Vec<NodeId>,
}

impl Focus {
    /// Collect the neighborhood of `node`; `None` if it is not in the graph
    pub fn of(graph: &CanonicalGraph, node: NodeId) -> Option<Self> {
        graph.contains(node).then(|| Self {
            node,
            upstream: upstream(graph, node),
            downstream: downstream(graph, node),
        })
    }

    /// Whether `id` should be highlighted
    pub fn involves(&self, id: NodeId) -> bool {
        self.node == id || self.upstream.contains(&id) || self.downstream.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{RawGraph, RawModel, RawNode, RawValueInfo};
    use crate::graph::build;
    use crate::layout::layout;

    fn chain() -> CanonicalGraph {
        build(&RawModel {
            graph: RawGraph {
                nodes: vec![
                    RawNode::new("Relu", &["X"], &["a"]),
                    RawNode::new("Relu", &["a"], &["Y"]),
                ],
                inputs: vec![RawValueInfo::named("X")],
                outputs: vec![RawValueInfo::named("Y")],
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_zoom_clamped() {
        let mut view = Viewport::new(0.5, 2.0);

        view.set_scale(10.0);
        assert_eq!(view.scale(), 2.0);
        view.set_scale(0.01);
        assert_eq!(view.scale(), 0.5);
        view.set_scale(f64::NAN);
        assert_eq!(view.scale(), 0.5);

        view.zoom_by(100.0, Point::default());
        assert_eq!(view.scale(), 2.0);
        view.zoom_by(-1.0, Point::default());
        assert_eq!(view.scale(), 2.0);
    }

    #[test]
    fn test_reset() {
        let mut view = Viewport::default();
        view.pan_by(30.0, -12.0);
        view.set_scale(3.0);
        view.reset();

        assert_eq!(view.scale(), 1.0);
        assert_eq!((view.pan_x, view.pan_y), (0.0, 0.0));
    }

    #[test]
    fn test_reset_with_limits_excluding_one() {
        let mut view = Viewport::new(1.5, 3.0);
        assert_eq!(view.scale_limits(), (1.0, 3.0));
        view.set_scale(2.5);
        view.reset();
        assert_eq!(view.scale(), 1.0);

        let mut view = Viewport::new(0.8, 0.2);
        assert_eq!(view.scale_limits(), (0.2, 1.0));
        view.set_scale(0.3);
        view.reset();
        assert_eq!(view.scale(), 1.0);
    }

    #[test]
    fn test_pan_independent_axes() {
        let mut view = Viewport::default();
        view.pan_by(5.0, 0.0);
        view.pan_by(0.0, 7.0);
        assert_eq!((view.pan_x, view.pan_y), (5.0, 7.0));
    }

    #[test]
    fn test_zoom_keeps_anchor() {
        let mut view = Viewport::default();
        view.pan_by(10.0, 20.0);
        let anchor = Point::new(200.0, 150.0);
        let before = view.to_layout(anchor);

        view.zoom_by(2.0, anchor);
        assert!(close(view.to_layout(anchor), before));
    }

    #[test]
    fn test_screen_layout_roundtrip() {
        let mut view = Viewport::default();
        view.pan_by(-40.0, 12.5);
        view.set_scale(1.5);

        let p = Point::new(321.0, 77.0);
        assert!(close(view.to_layout(view.to_screen(p)), p));
    }

    #[test]
    fn test_hit_test_through_view() {
        let graph = chain();
        let laid = layout(&graph, &LayoutConfig::default()).unwrap();
        let a = laid.node(graph.id_of("a").unwrap()).unwrap();

        let mut view = Viewport::default();
        view.pan_by(100.0, 50.0);
        view.set_scale(0.5);

        let screen = view.to_screen(a.center());
        assert_eq!(view.hit_test(&laid, screen), Some(a.node.id));
    }

    #[test]
    fn test_fit() {
        let graph = chain();
        let laid = layout(&graph, &LayoutConfig::default()).unwrap();

        let mut view = Viewport::default();
        view.fit(&laid, laid.width / 2.0, laid.height);
        assert!((view.scale() - 0.5).abs() < 1e-9);

        let top_left = view.to_screen(Point::default());
        assert!(top_left.x >= -1e-9 && top_left.y >= -1e-9);
    }

    #[test]
    fn test_focus() {
        let graph = chain();
        let a = graph.id_of("a").unwrap();
        let focus = Focus::of(&graph, a).unwrap();

        assert_eq!(focus.upstream, vec![graph.id_of("X").unwrap()]);
        assert_eq!(focus.downstream, vec![graph.id_of("Y").unwrap()]);
        assert!(focus.involves(a));
        assert!(Focus::of(&graph, NodeId(42)).is_none());
    }
}
