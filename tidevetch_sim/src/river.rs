// River network as an arena graph.
//
// Nodes are junctions and termini; each edge is a directed reach whose
// polyline runs from its upstream node to its downstream node. Floating
// seeds address a position on the network as (edge, arc-length index) and
// resolve junctions by direction of travel: heading downstream they continue
// onto an edge leaving the node, heading upstream onto an edge entering it.
// A node with no continuation in the travel direction is a dead end.
//
// See also: `geometry.rs` for the polyline queries, `seed.rs` for the tidal
// walk that consumes this graph.
//
// **Critical constraint: determinism.** Nodes and edges live in plain
// vectors in insertion order; nearest-point ties resolve to the lowest edge
// index. No hash-ordered iteration anywhere.

use crate::geometry::Polyline;
use crate::types::{Point, RiverEdgeId, RiverNodeId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A junction or terminus of the river network.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiverNode {
    pub id: RiverNodeId,
    pub position: Point,
    /// Indices of edges whose upstream end is this node.
    pub out_edges: SmallVec<[usize; 4]>,
    /// Indices of edges whose downstream end is this node.
    pub in_edges: SmallVec<[usize; 4]>,
}

/// A directed reach: the polyline runs from `from` (upstream) to `to`
/// (downstream).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiverEdge {
    pub id: RiverEdgeId,
    pub from: RiverNodeId,
    pub to: RiverNodeId,
    pub line: Polyline,
}

/// A position on the network: a point on one edge, addressed by arc-length
/// index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiverLocation {
    pub edge: RiverEdgeId,
    pub index: f64,
    pub point: Point,
    pub distance: f64,
}

/// The whole network.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RiverGraph {
    nodes: Vec<RiverNode>,
    edges: Vec<RiverEdge>,
}

impl RiverGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its id. Ids are sequential.
    pub fn add_node(&mut self, position: Point) -> RiverNodeId {
        let id = RiverNodeId(self.nodes.len() as u32);
        self.nodes.push(RiverNode {
            id,
            position,
            out_edges: SmallVec::new(),
            in_edges: SmallVec::new(),
        });
        id
    }

    /// Add a directed reach from `from` to `to` and wire both adjacency
    /// lists. The polyline endpoints must coincide with the node positions.
    pub fn add_edge(&mut self, from: RiverNodeId, to: RiverNodeId, line: Polyline) -> RiverEdgeId {
        assert_eq!(
            line.first(),
            self.nodes[from.0 as usize].position,
            "edge polyline must start at its upstream node"
        );
        assert_eq!(
            line.last(),
            self.nodes[to.0 as usize].position,
            "edge polyline must end at its downstream node"
        );
        let id = RiverEdgeId(self.edges.len() as u32);
        let index = self.edges.len();
        self.edges.push(RiverEdge { id, from, to, line });
        self.nodes[from.0 as usize].out_edges.push(index);
        self.nodes[to.0 as usize].in_edges.push(index);
        id
    }

    pub fn node(&self, id: RiverNodeId) -> &RiverNode {
        &self.nodes[id.0 as usize]
    }

    pub fn edge(&self, id: RiverEdgeId) -> &RiverEdge {
        &self.edges[id.0 as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The closest point on any reach to `p`, or None for an empty network.
    /// Ties keep the lowest edge index.
    pub fn nearest_point(&self, p: Point) -> Option<RiverLocation> {
        let mut best: Option<RiverLocation> = None;
        for edge in &self.edges {
            let hit = edge.line.nearest_point(p);
            if best.is_none_or(|b| hit.distance < b.distance) {
                best = Some(RiverLocation {
                    edge: edge.id,
                    index: hit.index,
                    point: hit.point,
                    distance: hit.distance,
                });
            }
        }
        best
    }

    /// Edge indices a traveler on `edge` can continue onto at the junction
    /// ahead. Heading downstream that is the downstream node's outgoing
    /// edges; heading upstream, the upstream node's incoming edges. Empty
    /// means a dead end.
    pub fn continuations(&self, edge: RiverEdgeId, downstream: bool) -> &[usize] {
        let e = self.edge(edge);
        if downstream {
            &self.node(e.to).out_edges
        } else {
            &self.node(e.from).in_edges
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A fork: n0 -> n1, then n1 -> n2 and n1 -> n3.
    fn forked_network() -> RiverGraph {
        let mut g = RiverGraph::new();
        let n0 = g.add_node(Point::new(0.0, 0.0));
        let n1 = g.add_node(Point::new(10.0, 0.0));
        let n2 = g.add_node(Point::new(20.0, 5.0));
        let n3 = g.add_node(Point::new(20.0, -5.0));
        g.add_edge(
            n0,
            n1,
            Polyline::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]),
        );
        g.add_edge(
            n1,
            n2,
            Polyline::new(vec![Point::new(10.0, 0.0), Point::new(20.0, 5.0)]),
        );
        g.add_edge(
            n1,
            n3,
            Polyline::new(vec![Point::new(10.0, 0.0), Point::new(20.0, -5.0)]),
        );
        g
    }

    #[test]
    fn add_node_assigns_sequential_ids() {
        let mut g = RiverGraph::new();
        assert_eq!(g.add_node(Point::new(0.0, 0.0)), RiverNodeId(0));
        assert_eq!(g.add_node(Point::new(1.0, 0.0)), RiverNodeId(1));
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn add_edge_wires_both_adjacency_lists() {
        let g = forked_network();
        let n1 = g.node(RiverNodeId(1));
        assert_eq!(n1.in_edges.as_slice(), &[0]);
        assert_eq!(n1.out_edges.as_slice(), &[1, 2]);
        assert_eq!(g.node(RiverNodeId(0)).out_edges.as_slice(), &[0]);
        assert_eq!(g.node(RiverNodeId(2)).in_edges.as_slice(), &[1]);
    }

    #[test]
    #[should_panic]
    fn add_edge_rejects_mismatched_endpoints() {
        let mut g = RiverGraph::new();
        let a = g.add_node(Point::new(0.0, 0.0));
        let b = g.add_node(Point::new(5.0, 0.0));
        g.add_edge(
            a,
            b,
            Polyline::new(vec![Point::new(1.0, 0.0), Point::new(5.0, 0.0)]),
        );
    }

    #[test]
    fn nearest_point_picks_closest_edge() {
        let g = forked_network();
        // Close to the n1 -> n3 branch.
        let loc = g.nearest_point(Point::new(15.0, -4.0)).unwrap();
        assert_eq!(loc.edge, RiverEdgeId(2));
        assert!(loc.distance < 2.0);
        // On the trunk.
        let loc = g.nearest_point(Point::new(5.0, 1.0)).unwrap();
        assert_eq!(loc.edge, RiverEdgeId(0));
        assert_eq!(loc.point, Point::new(5.0, 0.0));
        assert_eq!(loc.index, 5.0);
    }

    #[test]
    fn nearest_point_on_empty_network_is_none() {
        assert!(RiverGraph::new().nearest_point(Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn continuations_match_travel_direction() {
        let g = forked_network();
        // Downstream off the trunk: both branch edges.
        assert_eq!(g.continuations(RiverEdgeId(0), true), &[1, 2]);
        // Upstream off a branch: back onto the trunk.
        assert_eq!(g.continuations(RiverEdgeId(1), false), &[0]);
        // Downstream off a branch terminus: dead end.
        assert!(g.continuations(RiverEdgeId(1), true).is_empty());
        // Upstream off the trunk source: dead end.
        assert!(g.continuations(RiverEdgeId(0), false).is_empty());
    }
}
