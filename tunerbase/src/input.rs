//! Ordered registry of a capture card's inputs.
//!
//! Records live in an arena keyed by [`InputId`]; navigation order is kept
//! in a separate id list so that reordering never touches the records.

use std::collections::HashMap;

use log::warn;
use tunerbase_types::{ChannelDescriptor, InputId, InputRecord};

/// Mapping from input id to [`InputRecord`] with insertion order preserved.
#[derive(Debug, Clone, Default)]
pub struct InputRegistry {
    records: HashMap<InputId, InputRecord>,
    order: Vec<InputId>,
}

impl InputRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from records in the order given.
    ///
    /// A record whose id is already present is skipped.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = InputRecord>,
    {
        let mut registry = Self::new();
        for record in records {
            let id = record.id;
            if !registry.insert(record) {
                warn!("Duplicate input id {} ignored", id);
            }
        }
        registry
    }

    /// Append a record. Returns false if the id is already registered.
    pub fn insert(&mut self, record: InputRecord) -> bool {
        if self.records.contains_key(&record.id) {
            return false;
        }
        self.order.push(record.id);
        self.records.insert(record.id, record);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: InputId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn get(&self, id: InputId) -> Option<&InputRecord> {
        self.records.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: InputId) -> Option<&mut InputRecord> {
        self.records.get_mut(&id)
    }

    /// Exact, case-sensitive lookup by input name.
    pub fn lookup_by_name(&self, name: &str) -> Option<InputId> {
        self.iter().find(|r| r.name == name).map(|r| r.id)
    }

    /// Input ids in navigation order.
    pub fn ids(&self) -> &[InputId] {
        &self.order
    }

    /// Records in navigation order.
    pub fn iter(&self) -> impl Iterator<Item = &InputRecord> + '_ {
        self.order.iter().filter_map(move |id| self.records.get(id))
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut InputRecord> + '_ {
        self.records.values_mut()
    }

    /// First input in navigation order.
    pub fn first(&self) -> Option<InputId> {
        self.order.first().copied()
    }

    /// First connected input in navigation order.
    pub fn first_connected(&self) -> Option<InputId> {
        self.iter().find(|r| r.is_connected()).map(|r| r.id)
    }

    /// Next connected input after `after`, wrapping past the end.
    ///
    /// When `after` is `None` or unknown the search starts at the first
    /// record without advancing. If `after` is the only connected input it
    /// is returned itself.
    pub fn next_connected(&self, after: Option<InputId>) -> Option<InputId> {
        let len = self.order.len();
        if len == 0 {
            return None;
        }

        let (start, offset) = match after.and_then(|id| self.position(id)) {
            Some(pos) => (pos, 1),
            None => (0, 0),
        };

        (0..len)
            .map(|step| self.order[(start + step + offset) % len])
            .find(|id| self.records.get(id).map_or(false, |r| r.is_connected()))
    }

    /// Names of connected inputs in navigation order.
    pub fn connected_names(&self) -> Vec<&str> {
        self.iter()
            .filter(|r| r.is_connected())
            .map(|r| r.name.as_str())
            .collect()
    }

    /// Every channel of every input, paired with its input, in navigation order.
    pub fn all_channels(&self) -> impl Iterator<Item = (&InputRecord, &ChannelDescriptor)> + '_ {
        self.iter()
            .flat_map(|input| input.channels.iter().map(move |ch| (input, ch)))
    }

    /// Replace the navigation order.
    ///
    /// `order` must be a permutation of the registered ids; otherwise the
    /// registry is left unchanged and false is returned.
    pub fn reorder(&mut self, order: Vec<InputId>) -> bool {
        if order.len() != self.order.len() {
            return false;
        }
        let mut seen = std::collections::HashSet::with_capacity(order.len());
        for id in &order {
            if !self.records.contains_key(id) || !seen.insert(*id) {
                return false;
            }
        }
        self.order = order;
        true
    }

    fn position(&self, id: InputId) -> Option<usize> {
        self.order.iter().position(|&i| i == id)
    }
}
