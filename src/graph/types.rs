use crate::config::Granularity;
use crate::unit::Unit;
use im::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeKind {
    Direct,
    Static,
    /// Virtual, interface or dynamically dispatched call.
    Virtual,
    /// Call crossing from one target language into the other.
    CrossLanguage,
}

/// A call or dependency from `caller` to `callee`.
///
/// Identity is `(caller, callee, kind)`; the ordinal records where the call
/// sits inside the caller and is kept for diagnostics only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub caller: Unit,
    pub callee: Unit,
    pub ordinal: u32,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(caller: Unit, callee: Unit, kind: EdgeKind) -> Self {
        Self {
            caller,
            callee,
            ordinal: 0,
            kind,
        }
    }

    pub fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = ordinal;
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.caller == self.callee
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.caller == other.caller && self.callee == other.callee && self.kind == other.kind
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.caller.hash(state);
        self.callee.hash(state);
        self.kind.hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphKind {
    /// Calls observed in compiled instructions or extractor output.
    Call,
    /// Structural dependencies, typically between classes or modules.
    Dependency,
}

/// Directed graph over [`Unit`]s stored as two flat collections.
///
/// Nodes are exactly the endpoints of the stored edges. The adjacency
/// indexes are maintained on insertion so queries never walk the edge set.
/// All collections are persistent, so clones are cheap and a built graph
/// can be shared across worker threads.
#[derive(Debug, Clone)]
pub struct UnitGraph {
    pub(super) kind: GraphKind,
    pub(super) granularity: Granularity,
    pub(super) nodes: HashMap<Unit, Unit>,
    pub(super) edges: HashSet<Edge>,
    pub(super) callee_index: HashMap<Unit, HashSet<Unit>>,
    pub(super) caller_index: HashMap<Unit, HashSet<Unit>>,
    pub(super) call_counts: HashMap<Unit, u32>,
}

impl UnitGraph {
    pub fn new(kind: GraphKind, granularity: Granularity) -> Self {
        Self {
            kind,
            granularity,
            nodes: HashMap::new(),
            edges: HashSet::new(),
            callee_index: HashMap::new(),
            caller_index: HashMap::new(),
            call_counts: HashMap::new(),
        }
    }

    pub fn call_graph(granularity: Granularity) -> Self {
        Self::new(GraphKind::Call, granularity)
    }

    pub fn dependency_graph(granularity: Granularity) -> Self {
        Self::new(GraphKind::Dependency, granularity)
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }
}
