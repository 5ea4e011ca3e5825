//! Persistence gateway for input configuration.
//!
//! The session reads its inputs through [`InputStore`] at initialization and
//! writes back the remembered channels and default input on request.

use std::collections::HashMap;
use std::convert::Infallible;

use tunerbase_types::InputRecord;

use crate::input::InputRegistry;

/// Load/store contract the tuning session expects from its surroundings.
pub trait InputStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// All inputs configured for `card_id`, in navigation order.
    fn load_inputs(&mut self, card_id: u32) -> Result<Vec<InputRecord>, Self::Error>;

    /// Name of the input last stored as the card's default.
    fn load_default_input(&mut self, card_id: u32) -> Result<Option<String>, Self::Error>;

    /// Persist each input's start (last tuned) channel.
    fn store_input_channels(&mut self, inputs: &InputRegistry) -> Result<(), Self::Error>;

    fn store_default_input(&mut self, card_id: u32, input_name: &str) -> Result<(), Self::Error>;
}

impl<S: InputStore + ?Sized> InputStore for Box<S> {
    type Error = S::Error;

    fn load_inputs(&mut self, card_id: u32) -> Result<Vec<InputRecord>, Self::Error> {
        (**self).load_inputs(card_id)
    }

    fn load_default_input(&mut self, card_id: u32) -> Result<Option<String>, Self::Error> {
        (**self).load_default_input(card_id)
    }

    fn store_input_channels(&mut self, inputs: &InputRegistry) -> Result<(), Self::Error> {
        (**self).store_input_channels(inputs)
    }

    fn store_default_input(&mut self, card_id: u32, input_name: &str) -> Result<(), Self::Error> {
        (**self).store_default_input(card_id, input_name)
    }
}

/// In-process store, used for tests and cards configured without a database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inputs: Vec<InputRecord>,
    default_inputs: HashMap<u32, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs(inputs: Vec<InputRecord>) -> Self {
        Self {
            inputs,
            default_inputs: HashMap::new(),
        }
    }

    pub fn inputs(&self) -> &[InputRecord] {
        &self.inputs
    }

    pub fn default_input(&self, card_id: u32) -> Option<&str> {
        self.default_inputs.get(&card_id).map(String::as_str)
    }
}

impl InputStore for MemoryStore {
    type Error = Infallible;

    fn load_inputs(&mut self, card_id: u32) -> Result<Vec<InputRecord>, Self::Error> {
        Ok(self
            .inputs
            .iter()
            .filter(|r| r.card_id == card_id)
            .cloned()
            .collect())
    }

    fn load_default_input(&mut self, card_id: u32) -> Result<Option<String>, Self::Error> {
        Ok(self.default_inputs.get(&card_id).cloned())
    }

    fn store_input_channels(&mut self, inputs: &InputRegistry) -> Result<(), Self::Error> {
        for stored in &mut self.inputs {
            if let Some(current) = inputs.get(stored.id) {
                if current.card_id == stored.card_id {
                    stored.start_channel = current.start_channel.clone();
                }
            }
        }
        Ok(())
    }

    fn store_default_input(&mut self, card_id: u32, input_name: &str) -> Result<(), Self::Error> {
        self.default_inputs.insert(card_id, input_name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunerbase_types::InputId;

    #[test]
    fn test_load_filters_by_card() {
        let mut store = MemoryStore::with_inputs(vec![
            InputRecord::new(1, "Tuner", 1, 1),
            InputRecord::new(2, "Tuner", 2, 1),
            InputRecord::new(3, "Cable", 1, 2),
        ]);

        let names: Vec<_> = store
            .load_inputs(1)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(names, vec![InputId(1), InputId(3)]);
        assert!(store.load_inputs(9).unwrap().is_empty());
    }

    #[test]
    fn test_store_start_channels_and_default() {
        let mut store = MemoryStore::with_inputs(vec![
            InputRecord::new(1, "Tuner", 1, 1).with_start_channel("2"),
        ]);

        let registry = InputRegistry::from_records(vec![
            InputRecord::new(1, "Tuner", 1, 1).with_start_channel("7"),
        ]);
        store.store_input_channels(&registry).unwrap();
        store.store_default_input(1, "Tuner").unwrap();

        assert_eq!(store.inputs()[0].start_channel, "7");
        assert_eq!(store.load_default_input(1).unwrap().as_deref(), Some("Tuner"));
        assert_eq!(store.default_input(2), None);
    }
}
