//! [`InputStore`] backed by the tuning database.

use log::debug;
use tunerbase_types::InputRecord;

use super::{Database, DatabaseError};
use crate::input::InputRegistry;
use crate::store::InputStore;

impl InputStore for Database {
    type Error = DatabaseError;

    fn load_inputs(&mut self, card_id: u32) -> Result<Vec<InputRecord>, Self::Error> {
        let mut inputs = Vec::new();
        for row in self.get_inputs_by_card(card_id)? {
            let channels = if row.source_id == 0 {
                Vec::new()
            } else {
                self.get_channels_by_source(row.source_id)?
                    .iter()
                    .map(|c| c.to_descriptor())
                    .collect()
            };
            inputs.push(row.to_input_record(channels));
        }
        debug!("Loaded {} input(s) for card {}", inputs.len(), card_id);
        Ok(inputs)
    }

    fn load_default_input(&mut self, card_id: u32) -> Result<Option<String>, Self::Error> {
        self.get_default_input(card_id)
    }

    fn store_input_channels(&mut self, inputs: &InputRegistry) -> Result<(), Self::Error> {
        let tx = self.transaction()?;
        let now = chrono::Utc::now().timestamp();
        for input in inputs.iter() {
            tx.execute(
                "UPDATE card_inputs SET start_channel = ?1, last_used = ?2
                 WHERE id = ?3 AND start_channel != ?1",
                rusqlite::params![input.start_channel, now, input.id.0],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn store_default_input(&mut self, card_id: u32, input_name: &str) -> Result<(), Self::Error> {
        self.set_default_input(card_id, input_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{NewCard, NewChannel, NewInput};
    use crate::session::{SessionConfig, TuningSession};
    use crate::testing::MockHardware;
    use tunerbase_types::InputId;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_card(&NewCard::new(1, "dummy")).unwrap();
        db.insert_input(&NewInput::new(1, "Tuner", 1).with_start_channel("2"))
            .unwrap();
        db.insert_input(
            &NewInput::new(1, "Cable", 2)
                .with_start_channel("100")
                .with_display_order(1),
        )
        .unwrap();
        db.insert_input(&NewInput::new(1, "Spare", 0).with_display_order(2))
            .unwrap();
        for (id, num, order) in [(1002, "2", 0), (1004, "4", 1), (1007, "7", 2)] {
            db.insert_channel(&NewChannel::new(id, 1, num).with_sort_order(order))
                .unwrap();
        }
        db.insert_channel(&NewChannel::new(2100, 2, "100")).unwrap();
        db.insert_channel(&NewChannel::new(2101, 2, "101")).unwrap();
        db
    }

    #[test]
    fn test_load_inputs_with_lineups() {
        let mut db = seeded();
        let inputs = db.load_inputs(1).unwrap();

        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0].name, "Tuner");
        assert_eq!(inputs[0].channels.len(), 3);
        assert_eq!(inputs[1].channels.len(), 2);
        assert!(!inputs[2].is_connected());
        assert!(inputs[2].channels.is_empty());
        assert!(db.load_inputs(2).unwrap().is_empty());
    }

    #[test]
    fn test_store_round_trip() {
        let mut db = seeded();
        let mut registry = InputRegistry::from_records(db.load_inputs(1).unwrap());
        let cable = registry.lookup_by_name("Cable").unwrap();
        registry.get_mut(cable).unwrap().start_channel = "101".to_string();

        db.store_input_channels(&registry).unwrap();
        db.store_default_input(1, "Cable").unwrap();

        let reloaded = db.load_inputs(1).unwrap();
        assert_eq!(reloaded[1].start_channel, "101");
        assert_eq!(reloaded[0].start_channel, "2");
        assert_eq!(db.load_default_input(1).unwrap().as_deref(), Some("Cable"));
    }

    #[test]
    fn test_session_over_database() {
        let db = seeded();
        let mut session = TuningSession::new(SessionConfig::default(), MockHardware::default(), db);
        session.open().unwrap();
        assert_eq!(session.current_input_id(), Some(InputId(1)));

        session.switch_to_input_with_channel("Cable", "101").unwrap();
        session.store_input_channels().unwrap();
        session.close();

        let db = &session.store;
        assert_eq!(db.get_default_input(1).unwrap().as_deref(), Some("Cable"));
        let cable = db.get_input_by_name(1, "Cable").unwrap().unwrap();
        assert_eq!(cable.start_channel, "101");
        assert!(cable.last_used.is_some());
    }
}
