use delve_core::{Point, Range};

// ---------------------------------------------------------------------------
// Internal node for A* priority-queue searches
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub(crate) struct Node {
    pub(crate) g: i32,
    pub(crate) f: i32,
    pub(crate) parent: usize,
    pub(crate) generation: u32,
    pub(crate) open: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: 0,
            f: 0,
            parent: usize::MAX,
            generation: 0,
            open: false,
        }
    }
}

/// Reference into the node array, ordered by `f` then by push order for use
/// in `BinaryHeap`.
#[derive(Clone, Copy, Eq, PartialEq)]
pub(crate) struct NodeRef {
    pub(crate) idx: usize,
    pub(crate) f: i32,
    pub(crate) seq: u64,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed: BinaryHeap is a max-heap, we pop the smallest f first and
        // among equal f the earliest pushed.
        other.f.cmp(&self.f).then(other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Sentinel cost meaning "not reached yet".
pub const UNREACHABLE: i32 = i32::MAX;

// ---------------------------------------------------------------------------
// PathRange
// ---------------------------------------------------------------------------

/// Central coordinator for pathfinding on a grid rectangle.
///
/// `PathRange` owns all internal caches (node arrays, component labels,
/// scratch buffers) so that repeated queries incur no allocations after the
/// first use.
pub struct PathRange {
    pub(crate) rng: Range,
    pub(crate) width: usize,
    // A* caches
    pub(crate) astar_nodes: Vec<Node>,
    pub(crate) astar_generation: u32,
    // CC caches
    pub(crate) cc_labels: Vec<i32>,
    pub(crate) cc_stack: Vec<usize>,
    // shared scratch buffer for neighbor queries
    pub(crate) nbuf: Vec<Point>,
}

impl PathRange {
    /// Create a new `PathRange` for the given grid rectangle.
    pub fn new(rng: Range) -> Self {
        let len = rng.len();
        Self {
            rng,
            width: rng.width().max(0) as usize,
            astar_nodes: vec![Node::default(); len],
            astar_generation: 0,
            cc_labels: vec![-1; len],
            cc_stack: Vec::new(),
            nbuf: Vec::with_capacity(4),
        }
    }

    /// Replace the underlying range.
    ///
    /// If the new size fits within existing capacity the caches are kept and
    /// only the generation counter is bumped. Otherwise they are reallocated.
    pub fn set_range(&mut self, rng: Range) {
        let new_len = rng.len();
        self.rng = rng;
        self.width = rng.width().max(0) as usize;

        if new_len <= self.astar_nodes.len() {
            self.astar_generation = self.astar_generation.wrapping_add(1);
            return;
        }

        self.astar_nodes.clear();
        self.astar_nodes.resize(new_len, Node::default());
        self.astar_generation = 0;

        self.cc_labels.clear();
        self.cc_labels.resize(new_len, -1);
        self.cc_stack.clear();
    }

    /// The grid rectangle being used.
    #[inline]
    pub fn range(&self) -> Range {
        self.rng
    }

    // -----------------------------------------------------------------------
    // Coordinate helpers
    // -----------------------------------------------------------------------

    /// Convert a `Point` to a flat index. Returns `None` if out of range.
    #[inline]
    pub(crate) fn idx(&self, p: Point) -> Option<usize> {
        if !self.rng.contains(p) {
            return None;
        }
        let x = (p.x - self.rng.min.x) as usize;
        let y = (p.y - self.rng.min.y) as usize;
        Some(y * self.width + x)
    }

    /// Convert a flat index back to a `Point`.
    #[inline]
    pub(crate) fn point(&self, idx: usize) -> Point {
        let x = (idx % self.width) as i32 + self.rng.min.x;
        let y = (idx / self.width) as i32 + self.rng.min.y;
        Point::new(x, y)
    }
}

impl Default for PathRange {
    /// An empty range; grows on the first [`set_range`](Self::set_range).
    fn default() -> Self {
        Self::new(Range::default())
    }
}
