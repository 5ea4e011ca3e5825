//! Card input CRUD operations.

use super::{CardInputRecord, Database, DatabaseError, NewInput, Result};
use rusqlite::params;

const INPUT_COLUMNS: &str = "id, card_id, input_name, source_id, start_channel, tune_to_channel,
     external_changer, input_num, video_mode_v4l1, video_mode_v4l2, display_order,
     last_used, created_at, updated_at";

impl Database {
    /// Insert a new input. The owning card must exist.
    pub fn insert_input(&self, input: &NewInput) -> Result<u32> {
        if self.get_card(input.card_id)?.is_none() {
            return Err(DatabaseError::CardNotFound(input.card_id));
        }

        self.conn.execute(
            "INSERT INTO card_inputs (
                card_id, input_name, source_id, start_channel, tune_to_channel,
                external_changer, input_num, video_mode_v4l1, video_mode_v4l2, display_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                input.card_id,
                input.name,
                input.source_id,
                input.start_channel,
                input.tune_to_channel,
                input.external_changer,
                input.hints.input_num,
                input.hints.video_mode_v4l1,
                input.hints.video_mode_v4l2,
                input.display_order,
            ],
        )?;
        Ok(self.conn.last_insert_rowid() as u32)
    }

    /// Get inputs of a card in navigation order.
    pub fn get_inputs_by_card(&self, card_id: u32) -> Result<Vec<CardInputRecord>> {
        let sql = format!(
            "SELECT {} FROM card_inputs WHERE card_id = ?1 ORDER BY display_order ASC, id ASC",
            INPUT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let records = stmt
            .query_map([card_id], Self::row_to_input_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Get an input by card and name.
    pub fn get_input_by_name(&self, card_id: u32, name: &str) -> Result<Option<CardInputRecord>> {
        let sql = format!(
            "SELECT {} FROM card_inputs WHERE card_id = ?1 AND input_name = ?2",
            INPUT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        match stmt.query_row(params![card_id, name], Self::row_to_input_record) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Change the lineup source feeding an input (0 disconnects it).
    pub fn set_input_source(&self, card_id: u32, name: &str, source_id: u32) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE card_inputs SET source_id = ?1 WHERE card_id = ?2 AND input_name = ?3",
            params![source_id, card_id, name],
        )?;
        if updated == 0 {
            return Err(DatabaseError::InputNotFound {
                card_id,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Delete the input `name` of a card.
    pub fn delete_input(&self, card_id: u32, name: &str) -> Result<()> {
        let deleted = self.conn.execute(
            "DELETE FROM card_inputs WHERE card_id = ?1 AND input_name = ?2",
            params![card_id, name],
        )?;
        if deleted == 0 {
            return Err(DatabaseError::InputNotFound {
                card_id,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn row_to_input_record(row: &rusqlite::Row) -> rusqlite::Result<CardInputRecord> {
        Ok(CardInputRecord {
            id: row.get("id")?,
            card_id: row.get("card_id")?,
            input_name: row.get("input_name")?,
            source_id: row.get("source_id")?,
            start_channel: row.get("start_channel")?,
            tune_to_channel: row.get("tune_to_channel")?,
            external_changer: row.get("external_changer")?,
            input_num: row.get("input_num")?,
            video_mode_v4l1: row.get("video_mode_v4l1")?,
            video_mode_v4l2: row.get("video_mode_v4l2")?,
            display_order: row.get("display_order")?,
            last_used: row.get("last_used")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}
