//! Real symbolic variables.

use std::fmt;
use std::sync::{LazyLock, RwLock};

/// Process-wide variable name table.
///
/// Entry 0 reserves the dummy name; variable `id` lives at index `id + 1`.
/// The table is append-only: allocation happens under the write lock, which
/// also hands out the id, so by the time any thread observes an id the slot
/// is readable.
static NAMES: LazyLock<RwLock<Vec<String>>> =
    LazyLock::new(|| RwLock::new(vec![String::from("dummy")]));

const DUMMY_ID: usize = usize::MAX;

/// Real symbolic variable, identified by a globally unique id.
///
/// Two variables are the same exactly when their ids are equal, regardless of
/// name; ordering and hashing follow the id as well. Variables are cheap
/// `Copy` handles and are never destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    id: usize,
}

impl Variable {
    /// Create a new variable with the given `name`, assigning it the next
    /// unique incremental id.
    pub fn new(name: impl Into<String>) -> Self {
        let mut table = NAMES.write().expect("variable name table poisoned");
        let id = table.len() - 1;
        table.push(name.into());
        Self { id }
    }

    /// Construct a dummy variable.
    ///
    /// Dummy variables exist to support default construction in containers.
    /// They all share the sentinel id, compare equal to each other, and must
    /// not be used to build expressions.
    pub fn dummy() -> Self {
        Self { id: DUMMY_ID }
    }

    /// Whether this handle is the dummy variable.
    pub fn is_dummy(&self) -> bool {
        self.id == DUMMY_ID
    }

    /// Unique id of the variable.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Name the variable was created with.
    pub fn name(&self) -> String {
        let table = NAMES.read().expect("variable name table poisoned");
        table[self.id.wrapping_add(1)].clone()
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self::dummy()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
