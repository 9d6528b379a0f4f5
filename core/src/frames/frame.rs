use core::fmt;

use ecow::EcoString;
use hashbrown::HashMap;

use crate::values::Value;

/// The three variable scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// `GF`: one frame that lives for the whole run.
    Global,
    /// `LF`: the top of the frame stack.
    Local,
    /// `TF`: at most one, only reachable until it is pushed.
    Temporary,
}

impl Scope {
    pub const fn prefix(self) -> &'static str {
        match self {
            Scope::Global => "GF",
            Scope::Local => "LF",
            Scope::Temporary => "TF",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "GF" => Some(Scope::Global),
            "LF" => Some(Scope::Local),
            "TF" => Some(Scope::Temporary),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A declared variable: unset (`None`) or holding a value.
pub type Slot = Option<Value>;

/// Name to slot table for one scope instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    slots: HashMap<EcoString, Slot>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` as unset. Returns `false` if it already exists.
    pub fn declare(&mut self, name: &str) -> bool {
        if self.slots.contains_key(name) {
            return false;
        }
        self.slots.insert(name.into(), None);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// `None` if the slot does not exist, `Some(None)` if it is unset.
    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    pub fn slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.slots.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots sorted by name, for stable dumps.
    pub fn sorted(&self) -> Vec<(&str, &Slot)> {
        let mut entries: Vec<(&str, &Slot)> = self
            .slots
            .iter()
            .map(|(name, slot)| (name.as_str(), slot))
            .collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }
}
