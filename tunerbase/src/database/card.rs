//! Capture card CRUD operations.

use super::{CaptureCardRecord, Database, DatabaseError, NewCard, Result};
use rusqlite::params;

impl Database {
    /// Insert a new capture card record.
    pub fn insert_card(&self, card: &NewCard) -> Result<u32> {
        self.conn.execute(
            "INSERT INTO capture_cards (id, family, device) VALUES (?1, ?2, ?3)",
            params![card.id, card.family, card.device],
        )?;
        Ok(card.id)
    }

    /// Get capture card by ID.
    pub fn get_card(&self, id: u32) -> Result<Option<CaptureCardRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, family, device, default_input, created_at, updated_at
             FROM capture_cards WHERE id = ?1",
        )?;

        match stmt.query_row([id], Self::row_to_card_record) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get all capture cards.
    pub fn get_all_cards(&self) -> Result<Vec<CaptureCardRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, family, device, default_input, created_at, updated_at
             FROM capture_cards ORDER BY id ASC",
        )?;

        let records = stmt
            .query_map([], Self::row_to_card_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Name of the input a session for `card_id` starts on.
    pub fn get_default_input(&self, card_id: u32) -> Result<Option<String>> {
        match self.get_card(card_id)? {
            Some(card) => Ok(card.default_input.filter(|name| !name.is_empty())),
            None => Ok(None),
        }
    }

    /// Remember `input_name` as the default input of `card_id`.
    pub fn set_default_input(&self, card_id: u32, input_name: &str) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE capture_cards SET default_input = ?1 WHERE id = ?2",
            params![input_name, card_id],
        )?;
        if updated == 0 {
            return Err(DatabaseError::CardNotFound(card_id));
        }
        Ok(())
    }

    /// Delete a capture card (cascades to its inputs).
    pub fn delete_card(&self, id: u32) -> Result<()> {
        let deleted = self.conn.execute("DELETE FROM capture_cards WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(DatabaseError::CardNotFound(id));
        }
        Ok(())
    }

    fn row_to_card_record(row: &rusqlite::Row) -> rusqlite::Result<CaptureCardRecord> {
        Ok(CaptureCardRecord {
            id: row.get(0)?,
            family: row.get(1)?,
            device: row.get(2)?,
            default_input: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_crud() {
        let db = Database::open_in_memory().unwrap();

        let id = db
            .insert_card(&NewCard::new(1, "dummy").with_device("dummy0"))
            .unwrap();
        assert_eq!(id, 1);

        let record = db.get_card(1).unwrap().unwrap();
        assert_eq!(record.family, "dummy");
        assert_eq!(record.device.as_deref(), Some("dummy0"));
        assert_eq!(record.default_input, None);

        db.insert_card(&NewCard::new(2, "dvb")).unwrap();
        let ids: Vec<_> = db.get_all_cards().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);

        db.delete_card(1).unwrap();
        assert!(db.get_card(1).unwrap().is_none());
        assert!(matches!(db.delete_card(1), Err(DatabaseError::CardNotFound(1))));
    }

    #[test]
    fn test_default_input() {
        let db = Database::open_in_memory().unwrap();
        db.insert_card(&NewCard::new(1, "dummy")).unwrap();

        assert_eq!(db.get_default_input(1).unwrap(), None);
        db.set_default_input(1, "Cable").unwrap();
        assert_eq!(db.get_default_input(1).unwrap().as_deref(), Some("Cable"));

        assert!(matches!(
            db.set_default_input(7, "Cable"),
            Err(DatabaseError::CardNotFound(7))
        ));
        assert_eq!(db.get_default_input(7).unwrap(), None);
    }
}
