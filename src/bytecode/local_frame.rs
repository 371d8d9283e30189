use std::collections::HashMap;

use crate::bytecode::op::Argument;

/// Index of a local storage slot.
pub type Slot = Argument;

/// Variable-to-slot mapping for the function being generated.
///
/// Slots are handed out in increasing order and never reused; the final
/// count becomes the function's frame size. A frame is flat: there is no
/// enclosing scope to search.
#[derive(Debug, Default)]
pub struct LocalFrame {
    locals: HashMap<String, Slot>,
    next: Slot,
}

impl LocalFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to a fresh slot.
    ///
    /// Redeclaring a name rebinds it to the new slot; the old slot stays
    /// allocated.
    pub fn allocate(&mut self, name: &str) -> Slot {
        let slot = self.allocate_temporary();
        self.bind(name, slot);
        slot
    }

    /// Binds `name` to an already allocated `slot`, replacing any earlier
    /// binding.
    pub fn bind(&mut self, name: &str, slot: Slot) {
        self.locals.insert(name.to_string(), slot);
    }

    /// A fresh slot with no name, for intermediate values.
    pub fn allocate_temporary(&mut self) -> Slot {
        self.allocate_temporaries(1)
    }

    /// `count` consecutive fresh slots; returns the first.
    pub fn allocate_temporaries(&mut self, count: u64) -> Slot {
        let first = self.next;
        self.next += count;
        first
    }

    pub fn lookup(&self, name: &str) -> Option<Slot> {
        self.locals.get(name).copied()
    }

    pub fn slot_count(&self) -> u64 {
        self.next
    }
}
