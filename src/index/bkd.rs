//! BKDIndex: a block K-D tree over 2-D geopoints
//!
//! Bulk-loads by alternating-axis median split (the classic "K-D tree"
//! construction). New points buffer into an overflow list rather than
//! triggering a rotation on every insert; once the buffer exceeds
//! [`BKDIndex`]'s configured threshold, the whole tree (overflow plus
//! existing leaves) is bulk-loaded fresh. This keeps insert cheap while
//! still giving queries a pruned tree to descend most of the time.

use crate::geo::{distance_meters, point_in_polygon, GeoBoundingBox, GeoPoint};
use crate::id::InternalId;
use ordered_float::OrderedFloat;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Axis {
    Lat,
    Lon,
}

impl Axis {
    fn value(self, p: GeoPoint) -> f64 {
        match self {
            Axis::Lat => p.lat,
            Axis::Lon => p.lon,
        }
    }

    fn next(self) -> Axis {
        match self {
            Axis::Lat => Axis::Lon,
            Axis::Lon => Axis::Lat,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct LeafEntry {
    point: GeoPoint,
    ids: RoaringBitmap,
}

#[derive(Serialize, Deserialize)]
enum Node {
    Leaf(Vec<LeafEntry>),
    Interior {
        axis: Axis,
        split: f64,
        bbox: GeoBoundingBox,
        left: Box<Node>,
        right: Box<Node>,
    },
}

fn point_key(p: GeoPoint) -> (u64, u64) {
    (p.lat.to_bits(), p.lon.to_bits())
}

fn group_into_entries(points: Vec<(GeoPoint, InternalId)>) -> Vec<LeafEntry> {
    let mut grouped: Vec<LeafEntry> = Vec::new();
    'points: for (point, id) in points {
        for entry in grouped.iter_mut() {
            if point_key(entry.point) == point_key(point) {
                entry.ids.insert(id);
                continue 'points;
            }
        }
        let mut ids = RoaringBitmap::new();
        ids.insert(id);
        grouped.push(LeafEntry { point, ids });
    }
    grouped
}

fn bulk_load(mut points: Vec<(GeoPoint, InternalId)>, leaf_capacity: usize, axis: Axis) -> Node {
    if points.len() <= leaf_capacity {
        return Node::Leaf(group_into_entries(points));
    }

    // `OrderedFloat` gives NaN a total, if arbitrary, position instead of
    // letting a NaN lat/lon panic the sort (SearchableType::GeoPoint has no
    // validation of its own rejecting NaN).
    points.sort_by_key(|(p, _)| OrderedFloat(axis.value(*p)));
    let mid = points.len() / 2;
    let split = axis.value(points[mid].0);
    let right_points = points.split_off(mid + 1);
    let left_points = points;

    let left = bulk_load(left_points, leaf_capacity, axis.next());
    let right = bulk_load(right_points, leaf_capacity, axis.next());
    let bbox = node_bbox(&left).merge(&node_bbox(&right));

    Node::Interior {
        axis,
        split,
        bbox,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn node_bbox(node: &Node) -> GeoBoundingBox {
    match node {
        Node::Interior { bbox, .. } => *bbox,
        Node::Leaf(entries) => {
            let mut iter = entries.iter();
            let Some(first) = iter.next() else {
                return GeoBoundingBox {
                    min_lat: 0.0,
                    min_lon: 0.0,
                    max_lat: 0.0,
                    max_lon: 0.0,
                };
            };
            let mut bbox = GeoBoundingBox::from_point(first.point);
            for entry in iter {
                bbox.expand(entry.point);
            }
            bbox
        }
    }
}

fn collect_all(node: &Node, out: &mut Vec<(GeoPoint, InternalId)>) {
    match node {
        Node::Leaf(entries) => {
            for entry in entries {
                for id in &entry.ids {
                    out.push((entry.point, id));
                }
            }
        }
        Node::Interior { left, right, .. } => {
            collect_all(left, out);
            collect_all(right, out);
        }
    }
}

fn radius_search(
    node: &Node,
    center: GeoPoint,
    radius_meters: f64,
    inside: bool,
    high_precision: bool,
    out: &mut RoaringBitmap,
) {
    match node {
        Node::Leaf(entries) => {
            for entry in entries {
                let d = distance_meters(center, entry.point, high_precision);
                let matches = if inside { d <= radius_meters } else { d > radius_meters };
                if matches {
                    *out |= &entry.ids;
                }
            }
        }
        Node::Interior { bbox, left, right, .. } => {
            if inside {
                if bbox.intersects_disc(center, radius_meters, high_precision) {
                    radius_search(left, center, radius_meters, inside, high_precision, out);
                    radius_search(right, center, radius_meters, inside, high_precision, out);
                }
            } else {
                // An "outside the disc" query can't be pruned by a single
                // bounding-box/disc intersection test, so both subtrees are
                // always visited.
                radius_search(left, center, radius_meters, inside, high_precision, out);
                radius_search(right, center, radius_meters, inside, high_precision, out);
            }
        }
    }
}

fn polygon_search(node: &Node, vertices: &[GeoPoint], inside: bool, out: &mut RoaringBitmap) {
    match node {
        Node::Leaf(entries) => {
            for entry in entries {
                let contains = point_in_polygon(entry.point, vertices);
                if contains == inside {
                    *out |= &entry.ids;
                }
            }
        }
        Node::Interior { left, right, .. } => {
            polygon_search(left, vertices, inside, out);
            polygon_search(right, vertices, inside, out);
        }
    }
}

fn remove_from_node(node: &mut Node, point: GeoPoint, id: InternalId) -> bool {
    match node {
        Node::Leaf(entries) => {
            let key = point_key(point);
            let mut removed = false;
            entries.retain_mut(|entry| {
                if point_key(entry.point) == key {
                    removed = entry.ids.remove(id) || removed;
                    !entry.ids.is_empty()
                } else {
                    true
                }
            });
            removed
        }
        Node::Interior { axis, split, left, right, .. } => {
            if axis.value(point) <= *split {
                remove_from_node(left, point, id)
            } else {
                remove_from_node(right, point, id)
            }
        }
    }
}

/// A block K-D tree over geopoints, buffering inserts and rebuilding on
/// overflow.
#[derive(Serialize, Deserialize)]
pub struct BKDIndex {
    root: Node,
    overflow: Vec<(GeoPoint, InternalId)>,
    overflow_threshold: usize,
    leaf_capacity: usize,
    is_array: bool,
}

impl BKDIndex {
    pub fn new(is_array: bool, overflow_threshold: usize) -> Self {
        Self {
            root: Node::Leaf(Vec::new()),
            overflow: Vec::new(),
            overflow_threshold,
            leaf_capacity: overflow_threshold.max(1),
            is_array,
        }
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn insert(&mut self, point: GeoPoint, id: InternalId) {
        self.overflow.push((point, id));
        if self.overflow.len() > self.overflow_threshold {
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        let mut all = Vec::new();
        collect_all(&self.root, &mut all);
        all.append(&mut self.overflow);
        self.root = bulk_load(all, self.leaf_capacity, Axis::Lat);
    }

    /// Removes `id` at `point`. Returns `true` when a posting was actually
    /// deleted; `false` means nothing matched — not a failure, just nothing
    /// to compact (see `DESIGN.md`'s note on the BKD removal flag).
    pub fn remove_document(&mut self, point: GeoPoint, id: InternalId) -> bool {
        let before = self.overflow.len();
        self.overflow.retain(|(p, existing)| !(point_key(*p) == point_key(point) && *existing == id));
        let removed_from_overflow = self.overflow.len() != before;

        let removed_from_tree = remove_from_node(&mut self.root, point, id);
        removed_from_overflow || removed_from_tree
    }

    pub fn search_by_radius(
        &self,
        center: GeoPoint,
        distance_meters: f64,
        inside: bool,
        high_precision: bool,
    ) -> RoaringBitmap {
        let mut out = RoaringBitmap::new();
        radius_search(&self.root, center, distance_meters, inside, high_precision, &mut out);
        for (point, id) in &self.overflow {
            let d = distance_meters(center, *point, high_precision);
            let matches = if inside { d <= distance_meters } else { d > distance_meters };
            if matches {
                out.insert(*id);
            }
        }
        out
    }

    /// Degenerate polygons (fewer than 3 vertices, or zero area) always
    /// yield an empty result.
    pub fn search_by_polygon(&self, vertices: &[GeoPoint], inside: bool) -> RoaringBitmap {
        let mut out = RoaringBitmap::new();
        if vertices.len() < 3 || crate::geo::polygon_area(vertices) == 0.0 {
            return out;
        }
        polygon_search(&self.root, vertices, inside, &mut out);
        for (point, id) in &self.overflow {
            if point_in_polygon(*point, vertices) == inside {
                out.insert(*id);
            }
        }
        out
    }
}
