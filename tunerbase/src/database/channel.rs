//! Channel CRUD operations.

use super::{ChannelRecord, Database, DatabaseError, NewChannel, Result};
use log::info;
use rusqlite::params;

impl Database {
    /// Insert a new channel.
    pub fn insert_channel(&self, channel: &NewChannel) -> Result<u32> {
        self.conn.execute(
            "INSERT INTO channels (
                chan_id, source_id, channum, display, callsign,
                commercial_free, favorite, sort_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                channel.chan_id,
                channel.source_id,
                channel.channum,
                channel.display,
                channel.callsign,
                channel.commercial_free as i32,
                channel.favorite as i32,
                channel.sort_order,
            ],
        )?;
        Ok(channel.chan_id)
    }

    /// Get channel by ID.
    pub fn get_channel(&self, chan_id: u32) -> Result<Option<ChannelRecord>> {
        let mut stmt = self.conn.prepare("SELECT * FROM channels WHERE chan_id = ?1")?;

        match stmt.query_row([chan_id], Self::row_to_channel_record) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the visible lineup of a source in display order.
    pub fn get_channels_by_source(&self, source_id: u32) -> Result<Vec<ChannelRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM channels WHERE source_id = ?1 AND visible = 1
             ORDER BY sort_order ASC, chan_id ASC",
        )?;

        let records = stmt
            .query_map([source_id], Self::row_to_channel_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Rename channel number `old` to `new` within a source.
    ///
    /// Display strings equal to `old` follow the rename. Returns the number of
    /// channels changed.
    pub fn renumber_channel(&self, source_id: u32, old: &str, new: &str) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE channels SET display = ?3 WHERE source_id = ?1 AND channum = ?2 AND display = ?2",
            params![source_id, old, new],
        )?;
        let renamed = tx.execute(
            "UPDATE channels SET channum = ?3 WHERE source_id = ?1 AND channum = ?2",
            params![source_id, old, new],
        )?;
        tx.execute(
            "UPDATE card_inputs SET start_channel = ?3 WHERE source_id = ?1 AND start_channel = ?2",
            params![source_id, old, new],
        )?;
        tx.commit()?;

        if renamed > 0 {
            info!("Renumbered {} channel(s) {} -> {} on source {}", renamed, old, new, source_id);
        }
        Ok(renamed)
    }

    /// Mark or unmark a channel as favorite.
    pub fn set_favorite(&self, chan_id: u32, favorite: bool) -> Result<()> {
        self.update_channel_flag(chan_id, "favorite", favorite)
    }

    /// Show or hide a channel in its lineup.
    pub fn set_visible(&self, chan_id: u32, visible: bool) -> Result<()> {
        self.update_channel_flag(chan_id, "visible", visible)
    }

    /// Delete a channel.
    pub fn delete_channel(&self, chan_id: u32) -> Result<()> {
        let deleted = self.conn.execute("DELETE FROM channels WHERE chan_id = ?1", [chan_id])?;
        if deleted == 0 {
            return Err(DatabaseError::ChannelNotFound(chan_id));
        }
        Ok(())
    }

    fn update_channel_flag(&self, chan_id: u32, column: &str, value: bool) -> Result<()> {
        let sql = format!("UPDATE channels SET {} = ?1 WHERE chan_id = ?2", column);
        let updated = self.conn.execute(&sql, params![value as i32, chan_id])?;
        if updated == 0 {
            return Err(DatabaseError::ChannelNotFound(chan_id));
        }
        Ok(())
    }

    /// Helper: Convert a row to ChannelRecord.
    fn row_to_channel_record(row: &rusqlite::Row) -> rusqlite::Result<ChannelRecord> {
        Ok(ChannelRecord {
            chan_id: row.get("chan_id")?,
            source_id: row.get("source_id")?,
            channum: row.get("channum")?,
            display: row.get("display")?,
            callsign: row.get("callsign")?,
            commercial_free: row.get::<_, i32>("commercial_free")? != 0,
            favorite: row.get::<_, i32>("favorite")? != 0,
            visible: row.get::<_, i32>("visible")? != 0,
            sort_order: row.get("sort_order")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lineup(db: &Database) {
        db.insert_channel(&NewChannel::new(1004, 1, "4").with_sort_order(2))
            .unwrap();
        db.insert_channel(&NewChannel::new(1002, 1, "2").with_callsign("WTWO").with_sort_order(1))
            .unwrap();
        db.insert_channel(&NewChannel::new(1007, 1, "7").favorite(true).with_sort_order(3))
            .unwrap();
        db.insert_channel(&NewChannel::new(2100, 2, "100").with_display("100-1"))
            .unwrap();
    }

    #[test]
    fn test_channel_crud() {
        let db = Database::open_in_memory().unwrap();
        lineup(&db);

        let record = db.get_channel(1002).unwrap().unwrap();
        assert_eq!(record.channum, "2");
        assert_eq!(record.callsign.as_deref(), Some("WTWO"));
        assert!(record.visible);
        assert!(!record.favorite);

        let descriptor = record.to_descriptor();
        assert_eq!(descriptor.display, "2");
        assert_eq!(descriptor.callsign, "WTWO");

        db.set_favorite(1002, true).unwrap();
        assert!(db.get_channel(1002).unwrap().unwrap().favorite);
        assert!(matches!(
            db.set_favorite(9999, true),
            Err(DatabaseError::ChannelNotFound(9999))
        ));

        db.delete_channel(1002).unwrap();
        assert!(db.get_channel(1002).unwrap().is_none());
        assert_eq!(db.get_channels_by_source(1).unwrap().len(), 2);
        assert!(matches!(
            db.delete_channel(1002),
            Err(DatabaseError::ChannelNotFound(1002))
        ));
    }

    #[test]
    fn test_source_lineup_order_and_visibility() {
        let db = Database::open_in_memory().unwrap();
        lineup(&db);

        let nums: Vec<_> = db
            .get_channels_by_source(1)
            .unwrap()
            .into_iter()
            .map(|c| c.channum)
            .collect();
        assert_eq!(nums, vec!["2", "4", "7"]);

        db.set_visible(1004, false).unwrap();
        assert_eq!(db.get_channels_by_source(1).unwrap().len(), 2);
        assert!(db.get_channels_by_source(3).unwrap().is_empty());
    }

    #[test]
    fn test_renumber_channel() {
        let db = Database::open_in_memory().unwrap();
        lineup(&db);

        assert_eq!(db.renumber_channel(2, "100", "200").unwrap(), 1);
        let record = db.get_channel(2100).unwrap().unwrap();
        assert_eq!(record.channum, "200");
        assert_eq!(record.display.as_deref(), Some("100-1"));

        // Source 1 has no "100".
        assert_eq!(db.renumber_channel(1, "100", "200").unwrap(), 0);
    }
}
