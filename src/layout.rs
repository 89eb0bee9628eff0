//! Node placement for the canvas.
//!
//! Two deterministic layouts:
//! - `Breadthfirst` - rows by BFS depth from the roots (nodes without
//!   incoming edges). Used for lineage and pipeline DAGs.
//! - `Cose` - a small force-directed simulation for the denser, less
//!   hierarchical module graph.
//!
//! Both produce world coordinates; the UI camera fits them to the screen.

use std::collections::{HashMap, VecDeque};

use crate::model::{GraphEdge, GraphNode};

/// Row and column spacing for the hierarchical layout.
const LEVEL_SPACING: f32 = 120.0;
const SIBLING_SPACING: f32 = 150.0;
const SPACING_FACTOR: f32 = 1.2;

/// Golden angle in radians, for initial spiral placement.
const GOLDEN_ANGLE: f32 = 2.39996;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutKind {
    #[default]
    Breadthfirst,
    Cose,
}

impl LayoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breadthfirst => "breadthfirst",
            Self::Cose => "cose",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Smallest box containing `points`, grown by `padding` on each side.
    pub fn around(points: impl IntoIterator<Item = Point>, padding: f32) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self {
            min: Point::new(min.x - padding, min.y - padding),
            max: Point::new(max.x + padding, max.y + padding),
        })
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Compute a position for every node. Edges with unknown endpoints are
/// ignored.
pub fn run_layout(
    kind: LayoutKind,
    nodes: &[GraphNode],
    edges: &[GraphEdge],
) -> HashMap<String, Point> {
    match kind {
        LayoutKind::Breadthfirst => breadthfirst(nodes, edges),
        LayoutKind::Cose => ForceLayout::default().run(nodes, edges),
    }
}

fn index_edges(nodes: &[GraphNode], edges: &[GraphEdge]) -> (HashMap<String, usize>, Vec<(usize, usize)>) {
    let index: HashMap<String, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.clone(), i))
        .collect();
    let pairs = edges
        .iter()
        .filter_map(|e| Some((*index.get(&e.source)?, *index.get(&e.target)?)))
        .collect();
    (index, pairs)
}

// =============================================================================
// BREADTH-FIRST
// =============================================================================

fn breadthfirst(nodes: &[GraphNode], edges: &[GraphEdge]) -> HashMap<String, Point> {
    let n = nodes.len();
    let (_, pairs) = index_edges(nodes, edges);

    let mut children = vec![Vec::new(); n];
    let mut indegree = vec![0usize; n];
    for &(s, t) in &pairs {
        if s != t {
            children[s].push(t);
            indegree[t] += 1;
        }
    }

    let mut depth: Vec<Option<usize>> = vec![None; n];
    let mut queue = VecDeque::new();
    let roots = (0..n).filter(|&i| indegree[i] == 0);
    // Cycles leave nodes unreachable from any root; each such component is
    // seeded from its first node in artifact order.
    for seed in roots.chain(0..n) {
        if depth[seed].is_some() {
            continue;
        }
        depth[seed] = Some(0);
        queue.push_back(seed);
        while let Some(current) = queue.pop_front() {
            let next_depth = depth[current].unwrap_or(0) + 1;
            for &child in &children[current] {
                if depth[child].is_none() {
                    depth[child] = Some(next_depth);
                    queue.push_back(child);
                }
            }
        }
    }

    let mut levels: Vec<Vec<usize>> = Vec::new();
    for (i, d) in depth.iter().enumerate() {
        let d = d.unwrap_or(0);
        if levels.len() <= d {
            levels.resize_with(d + 1, Vec::new);
        }
        levels[d].push(i);
    }

    let mut positions = HashMap::with_capacity(n);
    for (d, level) in levels.iter().enumerate() {
        let offset = (level.len() as f32 - 1.0) / 2.0;
        for (slot, &i) in level.iter().enumerate() {
            let x = (slot as f32 - offset) * SIBLING_SPACING * SPACING_FACTOR;
            let y = d as f32 * LEVEL_SPACING * SPACING_FACTOR;
            positions.insert(nodes[i].id.clone(), Point::new(x, y));
        }
    }
    positions
}

// =============================================================================
// FORCE-DIRECTED
// =============================================================================

/// Parameters of the force-directed layout.
#[derive(Debug, Clone)]
pub struct ForceLayout {
    /// Repulsion strength between nodes (inverse square).
    pub repulsion: f32,
    /// Spring stiffness along edges.
    pub spring: f32,
    /// Rest length of an edge spring.
    pub ideal_edge_length: f32,
    /// Pull toward the origin, keeps disconnected parts together.
    pub center_attraction: f32,
    /// Velocity damping per step (1.0 = no damping).
    pub damping: f32,
    /// Distances below this are clamped, prevents blow-ups.
    pub min_distance: f32,
    pub max_velocity: f32,
    pub iterations: usize,
    /// Time step per iteration.
    pub dt: f32,
}

impl Default for ForceLayout {
    fn default() -> Self {
        Self {
            repulsion: 8000.0,
            spring: 0.04,
            ideal_edge_length: 140.0,
            center_attraction: 0.02,
            damping: 0.9,
            min_distance: 30.0,
            max_velocity: 500.0,
            iterations: 300,
            dt: 0.05,
        }
    }
}

impl ForceLayout {
    pub fn run(&self, nodes: &[GraphNode], edges: &[GraphEdge]) -> HashMap<String, Point> {
        let n = nodes.len();
        let (_, pairs) = index_edges(nodes, edges);

        let mut pos: Vec<(f32, f32)> = (0..n)
            .map(|i| {
                let angle = i as f32 * GOLDEN_ANGLE;
                let radius = 60.0 + i as f32 * 12.0;
                (angle.cos() * radius, angle.sin() * radius)
            })
            .collect();
        let mut vel = vec![(0.0f32, 0.0f32); n];

        for _ in 0..self.iterations {
            let mut force = vec![(0.0f32, 0.0f32); n];

            for i in 0..n {
                for j in (i + 1)..n {
                    let (dx, dy) = (pos[i].0 - pos[j].0, pos[i].1 - pos[j].1);
                    let dist = (dx * dx + dy * dy).sqrt().max(self.min_distance);
                    let magnitude = self.repulsion / (dist * dist);
                    let (fx, fy) = (dx / dist * magnitude, dy / dist * magnitude);
                    force[i].0 += fx;
                    force[i].1 += fy;
                    force[j].0 -= fx;
                    force[j].1 -= fy;
                }
            }

            for &(s, t) in &pairs {
                if s == t {
                    continue;
                }
                let (dx, dy) = (pos[t].0 - pos[s].0, pos[t].1 - pos[s].1);
                let dist = (dx * dx + dy * dy).sqrt().max(1.0);
                let stretch = (dist - self.ideal_edge_length) * self.spring;
                let (fx, fy) = (dx / dist * stretch, dy / dist * stretch);
                force[s].0 += fx;
                force[s].1 += fy;
                force[t].0 -= fx;
                force[t].1 -= fy;
            }

            let mut energy = 0.0;
            for i in 0..n {
                force[i].0 -= pos[i].0 * self.center_attraction;
                force[i].1 -= pos[i].1 * self.center_attraction;

                let v = &mut vel[i];
                v.0 = (v.0 + force[i].0) * self.damping;
                v.1 = (v.1 + force[i].1) * self.damping;
                let speed = (v.0 * v.0 + v.1 * v.1).sqrt();
                if speed > self.max_velocity {
                    v.0 = v.0 / speed * self.max_velocity;
                    v.1 = v.1 / speed * self.max_velocity;
                }
                pos[i].0 += v.0 * self.dt;
                pos[i].1 += v.1 * self.dt;
                energy += speed * speed;
            }

            if energy < 0.01 {
                break;
            }
        }

        nodes
            .iter()
            .zip(pos)
            .map(|(node, (x, y))| (node.id.clone(), Point::new(x, y)))
            .collect()
    }
}
