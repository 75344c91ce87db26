use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A closed, 1-based inclusive interval on the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Region {
    pub start: i64,
    pub stop: i64,
}

impl Region {
    pub fn new(start: i64, stop: i64) -> Self {
        Region { start, stop }
    }

    pub fn len(&self) -> i64 {
        self.stop - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.stop)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunctionKind {
    Start,
    End,
}

impl fmt::Display for JunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JunctionKind::Start => write!(f, "start"),
            JunctionKind::End => write!(f, "end"),
        }
    }
}

#[derive(Debug)]
struct JunctionInner {
    position: i64,
    kind: JunctionKind,
    has_complement: bool,
    complement: RefCell<Option<Weak<JunctionInner>>>,
}

/// A splice boundary. Two junctions on either side of an intron are wired
/// together as complements once a full `Transcript` has been assembled;
/// the back-reference is a `Weak` pointer so a junction never keeps its
/// partner alive on its own.
#[derive(Debug, Clone)]
pub struct Junction(Rc<JunctionInner>);

impl Junction {
    pub fn new(position: i64, kind: JunctionKind, has_complement: bool) -> Self {
        Junction(Rc::new(JunctionInner {
            position,
            kind,
            has_complement,
            complement: RefCell::new(None),
        }))
    }

    pub fn position(&self) -> i64 {
        self.0.position
    }

    pub fn kind(&self) -> JunctionKind {
        self.0.kind
    }

    /// Whether this junction sits at an edge eligible to be paired with a
    /// complement (a soft-clip edge beyond `skip_tolerance`, or an exon
    /// boundary exposed by `SpliceList::from_exons`). This flag is fixed at
    /// construction and is independent of whether a complement was ever
    /// actually wired.
    pub fn has_complement(&self) -> bool {
        self.0.has_complement
    }

    /// The junction actually wired as this one's partner, if any.
    pub fn complement(&self) -> Option<Junction> {
        self.0
            .complement
            .borrow()
            .as_ref()
            .and_then(|w| w.upgrade())
            .map(Junction)
    }

    pub fn set_complement(&self, other: &Junction) {
        *self.0.complement.borrow_mut() = Some(Rc::downgrade(&other.0));
    }

    pub fn ptr_eq(a: &Junction, b: &Junction) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Display for Junction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind(), self.position())
    }
}

#[derive(Debug, Clone)]
pub enum Component {
    Region(Region),
    Junction(Junction),
}

impl Component {
    pub fn position(&self) -> i64 {
        match self {
            Component::Region(r) => r.start,
            Component::Junction(j) => j.position(),
        }
    }

    /// Tie-break rank used when sorting components at the same position: a
    /// region sorts before a junction that shares its start position.
    pub fn tie_rank(&self) -> u8 {
        match self {
            Component::Region(_) => 0,
            Component::Junction(_) => 1,
        }
    }
}
