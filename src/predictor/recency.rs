//! A bounded list of recently-resolved branch addresses.

use std::collections::VecDeque;

/// Remembers the last 'depth' addresses pushed, most recent first.
#[derive(Clone, Debug)]
pub struct RecencyStack {
    depth: usize,
    data: VecDeque<usize>,
}
impl RecencyStack {
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            data: VecDeque::with_capacity(depth),
        }
    }

    /// The maximum number of addresses held.
    pub fn depth(&self) -> usize { self.depth }

    /// Insert an address at the front. The oldest address is evicted when
    /// the stack is full.
    pub fn push(&mut self, pc: usize) {
        if self.depth == 0 {
            return;
        }
        if self.data.len() == self.depth {
            self.data.pop_back();
        }
        self.data.push_front(pc);
    }

    /// Returns 'true' if 'pc' is anywhere in the stack.
    pub fn contains(&self, pc: usize) -> bool {
        self.data.contains(&pc)
    }

    /// Iterate over the addresses, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.data.iter().copied()
    }

    pub fn len(&self) -> usize { self.data.len() }
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}
