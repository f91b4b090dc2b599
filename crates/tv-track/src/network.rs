//! Track network graph and builder.
//!
//! # Data layout
//!
//! The graph is an arena: [`TrackDb`] stores `Vec<Option<TrackNode>>` where
//! the position is the node's [`NodeIndex`].  A `None` slot is an explicit
//! "no node" marker (deleted or never defined in the route data), never a
//! zero-filled placeholder.  Connectivity is expressed as indices held in
//! each node's [`Pin`]s, so there is no shared ownership between nodes.
//!
//! A vector node's `pins[0]` is the node *behind* its first section and
//! `pins[1]` the node *ahead* of its last section.  Junctions carry one pin
//! per attached vector node, end nodes exactly one.
//!
//! The database is immutable once built; the geometry engine only derives
//! transient values from it.

use std::collections::BTreeMap;

use log::{debug, warn};

use tv_core::{ItemIndex, NodeIndex, TvError, TvResult, WorldLocation};

use crate::item::{ItemKind, TrItem};
use crate::section::{SectionCatalog, TrackVectorSection};

// ── Pins and nodes ────────────────────────────────────────────────────────────

/// A link from a node to one of its neighbours.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pin {
    pub link:      NodeIndex,
    /// 1: the linked node is entered at its start, 0: at its end.
    pub direction: u8,
}

impl Pin {
    /// A pin that leads nowhere.
    pub const DANGLING: Pin = Pin { link: NodeIndex::INVALID, direction: 1 };

    pub fn new(link: NodeIndex, direction: u8) -> Self {
        Self { link, direction }
    }
}

/// Unbranched chain of placed sections plus the items lying on it.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VectorNode {
    pub sections:  Vec<TrackVectorSection>,
    pub item_refs: Vec<ItemIndex>,
}

/// The closed set of node kinds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackNodeKind {
    Vector(VectorNode),
    Junction,
    End,
}

/// Kind tag of the point-like nodes, used for highlight dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointNodeKind {
    Junction,
    EndNode,
}

impl PointNodeKind {
    pub fn name(self) -> &'static str {
        match self {
            PointNodeKind::Junction => "junction",
            PointNodeKind::EndNode => "endnode",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackNode {
    pub index: NodeIndex,
    /// Position of a junction or end node.  For vector nodes this mirrors the
    /// start of the first section and carries no extra meaning.
    pub uid:   WorldLocation,
    pub pins:  Vec<Pin>,
    pub kind:  TrackNodeKind,
}

impl TrackNode {
    #[inline]
    pub fn as_vector(&self) -> Option<&VectorNode> {
        match &self.kind {
            TrackNodeKind::Vector(v) => Some(v),
            TrackNodeKind::Junction | TrackNodeKind::End => None,
        }
    }

    #[inline]
    pub fn is_vector(&self) -> bool {
        matches!(self.kind, TrackNodeKind::Vector(_))
    }

    /// `Some` for junctions and end nodes.
    pub fn point_kind(&self) -> Option<PointNodeKind> {
        match self.kind {
            TrackNodeKind::Vector(_) => None,
            TrackNodeKind::Junction => Some(PointNodeKind::Junction),
            TrackNodeKind::End => Some(PointNodeKind::EndNode),
        }
    }

    /// Index of the first pin linking to `other`, if any.
    pub fn pin_to(&self, other: NodeIndex) -> Option<usize> {
        self.pins.iter().position(|p| p.link == other)
    }
}

/// Smallest and largest tile indices touched by any vector section.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileBounds {
    pub min_tile_x: i32,
    pub min_tile_z: i32,
    pub max_tile_x: i32,
    pub max_tile_z: i32,
}

// ── TrackDb ───────────────────────────────────────────────────────────────────

/// The immutable node array and item table of one network (rail or road).
///
/// Do not construct directly; use [`TrackDbBuilder`].
#[derive(Clone, Debug, Default)]
pub struct TrackDb {
    nodes: Vec<Option<TrackNode>>,
    items: Vec<TrItem>,
}

impl TrackDb {
    /// A network with no nodes and no items.
    pub fn empty() -> Self {
        Self::default()
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    /// Number of node slots, including empty ones.
    pub fn node_slots(&self) -> usize {
        self.nodes.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(Option::is_none)
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn node(&self, index: NodeIndex) -> Option<&TrackNode> {
        self.nodes.get(index.index()).and_then(Option::as_ref)
    }

    pub fn try_node(&self, index: NodeIndex) -> TvResult<&TrackNode> {
        self.node(index).ok_or(TvError::NodeNotFound(index))
    }

    /// All present nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = &TrackNode> + '_ {
        self.nodes.iter().flatten()
    }

    /// All vector nodes in index order, paired with their section chain.
    pub fn vector_nodes(&self) -> impl Iterator<Item = (&TrackNode, &VectorNode)> + '_ {
        self.nodes().filter_map(|n| n.as_vector().map(|v| (n, v)))
    }

    #[inline]
    pub fn item(&self, index: ItemIndex) -> Option<&TrItem> {
        self.items.get(index.index())
    }

    pub fn try_item(&self, index: ItemIndex) -> TvResult<&TrItem> {
        self.item(index).ok_or(TvError::ItemNotFound(index))
    }

    pub fn items(&self) -> &[TrItem] {
        &self.items
    }

    /// Items with their table position.
    pub fn indexed_items(&self) -> impl Iterator<Item = (ItemIndex, &TrItem)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (ItemIndex(i as u32), item))
    }

    // ── Traversal primitives ──────────────────────────────────────────────

    /// Section chain of a vector node; empty for point nodes and missing slots.
    pub fn sections_of(&self, index: NodeIndex) -> &[TrackVectorSection] {
        self.node(index)
            .and_then(TrackNode::as_vector)
            .map_or(&[], |v| v.sections.as_slice())
    }

    /// The node linked through pin `pin` of `index`, if that pin exists and
    /// leads to a present node.
    pub fn neighbor_at(&self, index: NodeIndex, pin: usize) -> Option<NodeIndex> {
        let link = self.node(index)?.pins.get(pin)?.link;
        self.node(link).map(|n| n.index)
    }

    /// Tile range covered by all vector sections, or `None` for a network
    /// without any section.
    pub fn extreme_tiles(&self) -> Option<TileBounds> {
        let mut sections = self.vector_nodes().flat_map(|(_, v)| v.sections.iter());
        let first = sections.next()?.location;
        let mut bounds = TileBounds {
            min_tile_x: first.tile_x,
            min_tile_z: first.tile_z,
            max_tile_x: first.tile_x,
            max_tile_z: first.tile_z,
        };
        for s in sections {
            let l = s.location;
            bounds.min_tile_x = bounds.min_tile_x.min(l.tile_x);
            bounds.min_tile_z = bounds.min_tile_z.min(l.tile_z);
            bounds.max_tile_x = bounds.max_tile_x.max(l.tile_x);
            bounds.max_tile_z = bounds.max_tile_z.max(l.tile_z);
        }
        Some(bounds)
    }

    // ── Locations ─────────────────────────────────────────────────────────

    /// Location `distance` metres into section `section` of vector node `node`.
    pub fn find_location(
        &self,
        node: NodeIndex,
        section: usize,
        distance: f32,
        catalog: &SectionCatalog,
    ) -> Option<WorldLocation> {
        let placed = self.sections_of(node).get(section)?;
        catalog.point_on(placed, distance)
    }

    /// One location representing a whole node, for recentering a view.
    ///
    /// Point nodes use their own position.  A vector node uses the midpoint
    /// between the nodes bounding it, or the one that exists, or the start of
    /// its first section when neither does.
    pub fn node_location(&self, index: NodeIndex) -> Option<WorldLocation> {
        let node = self.node(index)?;
        let vector = match &node.kind {
            TrackNodeKind::Vector(v) => v,
            TrackNodeKind::Junction | TrackNodeKind::End => return Some(node.uid),
        };

        let behind = self.neighbor_at(index, 0).and_then(|i| self.node(i));
        let ahead = self.neighbor_at(index, 1).and_then(|i| self.node(i));
        match (behind, ahead) {
            (Some(b), Some(a)) => Some(b.uid.midpoint(a.uid)),
            (Some(only), None) | (None, Some(only)) => Some(only.uid),
            (None, None) => vector.sections.first().map(|s| s.location),
        }
    }

    /// Name → location of every named siding item.
    pub fn siding_locations(&self) -> BTreeMap<String, WorldLocation> {
        self.named_locations(|k| matches!(k, ItemKind::Siding))
    }

    /// Name → location of every named platform item.
    pub fn platform_locations(&self) -> BTreeMap<String, WorldLocation> {
        self.named_locations(|k| matches!(k, ItemKind::Platform))
    }

    fn named_locations(&self, wanted: impl Fn(&ItemKind) -> bool) -> BTreeMap<String, WorldLocation> {
        self.items
            .iter()
            .filter(|item| wanted(&item.kind))
            .filter_map(|item| item.name.as_ref().map(|n| (n.clone(), item.location)))
            .collect()
    }
}

// ── TrackDbBuilder ────────────────────────────────────────────────────────────

/// Which end of a vector node a link attaches to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VectorEnd {
    Start,
    End,
}

impl VectorEnd {
    #[inline]
    fn pin(self) -> usize {
        match self {
            VectorEnd::Start => 0,
            VectorEnd::End => 1,
        }
    }

    /// Pin direction of a link that enters the node at this end.
    #[inline]
    fn entry_direction(self) -> u8 {
        match self {
            VectorEnd::Start => 1,
            VectorEnd::End => 0,
        }
    }
}

/// Construct a [`TrackDb`] incrementally, then call [`build`](Self::build).
///
/// This is the seam the route loader uses; tests and demos use it to build
/// small networks by hand.
///
/// # Example
///
/// ```
/// use tv_core::{SectionIndex, WorldLocation};
/// use tv_track::{TrackDbBuilder, TrackVectorSection, VectorEnd};
///
/// let mut b = TrackDbBuilder::new();
/// let west = b.add_end_node(WorldLocation::new(0, 0, 0.0, 0.0, 0.0));
/// let east = b.add_end_node(WorldLocation::new(0, 0, 0.0, 0.0, 100.0));
/// let line = b.add_vector_node(vec![TrackVectorSection::new(
///     SectionIndex(1),
///     WorldLocation::new(0, 0, 0.0, 0.0, 0.0),
///     0.0,
/// )]);
/// b.connect(line, VectorEnd::Start, west);
/// b.connect(line, VectorEnd::End, east);
/// let db = b.build();
/// assert_eq!(db.neighbor_at(line, 1), Some(east));
/// ```
#[derive(Default)]
pub struct TrackDbBuilder {
    nodes: Vec<Option<TrackNode>>,
    items: Vec<TrItem>,
}

impl TrackDbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, items: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            items: Vec::with_capacity(items),
        }
    }

    fn next_index(&self) -> NodeIndex {
        NodeIndex(self.nodes.len() as u32)
    }

    fn push(&mut self, uid: WorldLocation, pins: Vec<Pin>, kind: TrackNodeKind) -> NodeIndex {
        let index = self.next_index();
        self.nodes.push(Some(TrackNode { index, uid, pins, kind }));
        index
    }

    pub fn add_junction(&mut self, uid: WorldLocation) -> NodeIndex {
        self.push(uid, Vec::new(), TrackNodeKind::Junction)
    }

    pub fn add_end_node(&mut self, uid: WorldLocation) -> NodeIndex {
        self.push(uid, Vec::new(), TrackNodeKind::End)
    }

    /// Add a vector node with both pins dangling; link it with
    /// [`connect`](Self::connect) or [`connect_vectors`](Self::connect_vectors).
    pub fn add_vector_node(&mut self, sections: Vec<TrackVectorSection>) -> NodeIndex {
        let uid = sections.first().map(|s| s.location).unwrap_or_default();
        let vector = VectorNode { sections, item_refs: Vec::new() };
        self.push(uid, vec![Pin::DANGLING; 2], TrackNodeKind::Vector(vector))
    }

    /// Reserve an index that stays empty in the built database.
    pub fn add_missing(&mut self) -> NodeIndex {
        let index = self.next_index();
        self.nodes.push(None);
        index
    }

    fn node_mut(&mut self, index: NodeIndex) -> Option<&mut TrackNode> {
        self.nodes.get_mut(index.index()).and_then(Option::as_mut)
    }

    /// Link end `end` of `vector` to the point node `point` (junction or end
    /// node), and add the reverse pin on `point`.
    pub fn connect(&mut self, vector: NodeIndex, end: VectorEnd, point: NodeIndex) {
        let point_is_point = self
            .node_mut(point)
            .is_some_and(|n| n.point_kind().is_some());
        let Some(v) = self.node_mut(vector).filter(|n| n.is_vector()) else {
            warn!("connect: {vector} is not a vector node, link ignored");
            return;
        };
        v.pins[end.pin()] = Pin::new(point, 1);

        if point_is_point {
            if let Some(p) = self.node_mut(point) {
                p.pins.push(Pin::new(vector, end.entry_direction()));
            }
        } else {
            warn!("connect: {point} is not a point node, reverse pin not added");
        }
    }

    /// Link end `a_end` of vector node `a` directly to end `b_end` of vector
    /// node `b`, both ways.
    pub fn connect_vectors(&mut self, a: NodeIndex, a_end: VectorEnd, b: NodeIndex, b_end: VectorEnd) {
        if let Some(node) = self.node_mut(a).filter(|n| n.is_vector()) {
            node.pins[a_end.pin()] = Pin::new(b, b_end.entry_direction());
        }
        if let Some(node) = self.node_mut(b).filter(|n| n.is_vector()) {
            node.pins[b_end.pin()] = Pin::new(a, a_end.entry_direction());
        }
    }

    /// Add an item to the item table and return its table position.
    pub fn add_item(&mut self, item: TrItem) -> ItemIndex {
        let index = ItemIndex(self.items.len() as u32);
        self.items.push(item);
        index
    }

    /// Record that `item` lies on vector node `vector`.
    pub fn attach_item(&mut self, vector: NodeIndex, item: ItemIndex) {
        match self.node_mut(vector).map(|n| &mut n.kind) {
            Some(TrackNodeKind::Vector(v)) => v.item_refs.push(item),
            _ => warn!("attach_item: {vector} is not a vector node, {item} not attached"),
        }
    }

    /// Consume the builder and produce the immutable [`TrackDb`].
    pub fn build(self) -> TrackDb {
        debug!(
            "track database built: {} node slots, {} items",
            self.nodes.len(),
            self.items.len()
        );
        TrackDb { nodes: self.nodes, items: self.items }
    }
}
