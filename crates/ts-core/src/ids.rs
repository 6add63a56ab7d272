use core::fmt;
use core::num::NonZeroU32;

use crate::{TsError, TsResult};

/// Stable handle for a vertex, edge or line. Stored as index + 1 so that
/// `Option<Id>` costs nothing extra.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id(NonZeroU32);

impl Id {
    /// Id for 0-based `index`. Saturates at the top of the range.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

pub type VertexId = Id;
pub type EdgeId = Id;
pub type LineId = Id;

/// Monotonic id source. Ids handed out are never handed out again, even
/// after the object they named is deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused id. Fails once the `u32` space is spent rather than
    /// handing out an id twice.
    pub fn allocate(&mut self) -> TsResult<Id> {
        let raw = self.next.checked_add(1).ok_or_else(|| TsError::Invariant {
            what: format!("id space exhausted after {} ids", self.next),
        })?;
        let id = NonZeroU32::new(raw).map(Id).ok_or_else(|| TsError::Invariant {
            what: "allocated a zero id".to_string(),
        })?;
        self.next = raw;
        Ok(id)
    }

    /// Number of ids allocated so far.
    pub fn issued(&self) -> u32 {
        self.next
    }
}
