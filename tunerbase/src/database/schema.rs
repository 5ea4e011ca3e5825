//! Database schema definitions.

/// SQL schema for the tuning database.
pub const SCHEMA_SQL: &str = r#"
-- Capture card table
CREATE TABLE IF NOT EXISTS capture_cards (
    id INTEGER PRIMARY KEY,                  -- Card id used by sessions
    family TEXT NOT NULL DEFAULT 'dummy',    -- Hardware family name
    device TEXT,                             -- Device path or name
    default_input TEXT,                      -- Input restored when a session starts
    -- Metadata
    created_at INTEGER DEFAULT (strftime('%s', 'now')),
    updated_at INTEGER DEFAULT (strftime('%s', 'now'))
);

-- Inputs of each capture card
CREATE TABLE IF NOT EXISTS card_inputs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    card_id INTEGER NOT NULL,
    input_name TEXT NOT NULL,
    source_id INTEGER NOT NULL DEFAULT 0,    -- Lineup source (0 = not connected)
    start_channel TEXT NOT NULL DEFAULT '',  -- Last tuned channel
    tune_to_channel TEXT NOT NULL DEFAULT '',-- Parking channel while an external changer is used
    external_changer TEXT,                   -- External changer command
    -- Driver hints
    input_num INTEGER,
    video_mode_v4l1 INTEGER NOT NULL DEFAULT 0,
    video_mode_v4l2 INTEGER NOT NULL DEFAULT 0,
    -- Navigation
    display_order INTEGER NOT NULL DEFAULT 0,
    last_used INTEGER,                       -- Last time start_channel was stored
    -- Metadata
    created_at INTEGER DEFAULT (strftime('%s', 'now')),
    updated_at INTEGER DEFAULT (strftime('%s', 'now')),
    UNIQUE(card_id, input_name),
    FOREIGN KEY(card_id) REFERENCES capture_cards(id) ON DELETE CASCADE
);

-- Channel lineup table
CREATE TABLE IF NOT EXISTS channels (
    chan_id INTEGER PRIMARY KEY,
    source_id INTEGER NOT NULL,
    channum TEXT NOT NULL,                   -- Number the hardware is tuned with
    display TEXT,                            -- Number shown to and typed by users
    callsign TEXT,
    commercial_free INTEGER DEFAULT 0,
    favorite INTEGER DEFAULT 0,
    visible INTEGER DEFAULT 1,
    sort_order INTEGER DEFAULT 0,
    -- Metadata
    created_at INTEGER DEFAULT (strftime('%s', 'now')),
    updated_at INTEGER DEFAULT (strftime('%s', 'now'))
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_card_inputs_card ON card_inputs(card_id, display_order);
CREATE INDEX IF NOT EXISTS idx_channels_source ON channels(source_id, sort_order);
CREATE INDEX IF NOT EXISTS idx_channels_channum ON channels(source_id, channum);

-- Trigger to update updated_at on capture_cards
CREATE TRIGGER IF NOT EXISTS capture_cards_updated_at
AFTER UPDATE ON capture_cards
BEGIN
    UPDATE capture_cards SET updated_at = strftime('%s', 'now') WHERE id = NEW.id;
END;

-- Trigger to update updated_at on card_inputs
CREATE TRIGGER IF NOT EXISTS card_inputs_updated_at
AFTER UPDATE ON card_inputs
BEGIN
    UPDATE card_inputs SET updated_at = strftime('%s', 'now') WHERE id = NEW.id;
END;

-- Trigger to update updated_at on channels
CREATE TRIGGER IF NOT EXISTS channels_updated_at
AFTER UPDATE ON channels
BEGIN
    UPDATE channels SET updated_at = strftime('%s', 'now') WHERE chan_id = NEW.chan_id;
END;
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"capture_cards".to_string()));
        assert!(tables.contains(&"card_inputs".to_string()));
        assert!(tables.contains(&"channels".to_string()));
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
    }
}
