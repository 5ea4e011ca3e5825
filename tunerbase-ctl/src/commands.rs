//! Command implementations.
//!
//! Each command builds a session over the database, performs one operation
//! and returns a serializable report; printing is left to the caller.

use std::fmt;

use log::info;
use serde::Serialize;
use thiserror::Error;
use tunerbase::database::{NewCard, NewChannel, NewInput};
use tunerbase::{
    open_hardware, ChannelChangeDirection, ChannelHardware, Database, DatabaseError,
    TuningError, TuningSession,
};

use crate::config::Settings;

pub type Session = TuningSession<Box<dyn ChannelHardware + Send>, Database>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Tuning(#[from] TuningError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("card {0} has no current input")]
    NoCurrentInput(u32),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Session for the configured card with inputs loaded but hardware closed.
pub fn load_session(settings: &Settings, db: Database) -> Result<Session> {
    let hardware = open_hardware(settings.family, &settings.device);
    let mut session = TuningSession::new(settings.session.clone(), hardware, db);
    session.initialize_inputs()?;
    Ok(session)
}

/// Session for the configured card with its hardware open.
fn open_session(settings: &Settings, db: Database) -> Result<Session> {
    let mut session = load_session(settings, db)?;
    session.open()?;
    Ok(session)
}

fn current_input_name(session: &Session) -> Result<String> {
    session
        .current_input_name()
        .map(str::to_string)
        .ok_or_else(|| CommandError::NoCurrentInput(session.card_id()))
}

#[derive(Debug, Serialize)]
pub struct InputRow {
    pub id: u32,
    pub name: String,
    pub source_id: u32,
    pub connected: bool,
    pub start_channel: String,
    pub external_changer: Option<String>,
    pub channels: usize,
    pub current: bool,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct InputList(pub Vec<InputRow>);

pub fn list_inputs(settings: &Settings, db: Database) -> Result<InputList> {
    let session = load_session(settings, db)?;
    let current = session.current_input_id();
    let rows = session
        .inputs()
        .iter()
        .map(|input| InputRow {
            id: input.id.0,
            name: input.name.clone(),
            source_id: input.source_id,
            connected: input.is_connected(),
            start_channel: input.start_channel.clone(),
            external_changer: input.external_changer.as_ref().map(|c| c.to_string()),
            channels: input.channels.len(),
            current: Some(input.id) == current,
        })
        .collect();
    Ok(InputList(rows))
}

#[derive(Debug, Serialize)]
pub struct ChannelRow {
    pub chan_id: u32,
    pub channum: String,
    pub display: String,
    pub callsign: String,
    pub favorite: bool,
    pub commercial_free: bool,
}

#[derive(Debug, Serialize)]
pub struct ChannelList {
    pub input: String,
    pub channels: Vec<ChannelRow>,
}

/// Lineup of `input`, or of the current input.
pub fn list_channels(settings: &Settings, db: Database, input: Option<&str>) -> Result<ChannelList> {
    let session = load_session(settings, db)?;
    let name = match input {
        Some(name) => name.to_string(),
        None => current_input_name(&session)?,
    };
    let channels = session
        .channels_by_name(&name)
        .ok_or_else(|| TuningError::UnknownInput(name.clone()))?
        .iter()
        .map(|c| ChannelRow {
            chan_id: c.chan_id,
            channum: c.channum.clone(),
            display: c.display.clone(),
            callsign: c.callsign.clone(),
            favorite: c.favorite,
            commercial_free: c.commercial_free,
        })
        .collect();
    Ok(ChannelList {
        input: name,
        channels,
    })
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub channum: String,
    pub input: Option<String>,
}

pub fn check(settings: &Settings, db: Database, channum: &str) -> Result<CheckReport> {
    let session = load_session(settings, db)?;
    Ok(CheckReport {
        channum: channum.to_string(),
        input: session.check_channel(channum),
    })
}

#[derive(Debug, Serialize)]
pub struct TuneReport {
    pub card_id: u32,
    pub input: String,
    pub channel: String,
    pub chan_id: Option<u32>,
    pub commercial_free: bool,
}

impl TuneReport {
    fn from_session(session: &Session) -> Self {
        TuneReport {
            card_id: session.card_id(),
            input: session.current_input_name().unwrap_or_default().to_string(),
            channel: session.current_channel_name().to_string(),
            chan_id: session.get_chan_id(),
            commercial_free: session.is_commercial_free(),
        }
    }
}

/// Tune `channum` on `input` (default: the current input) and remember it.
pub fn tune(settings: &Settings, db: Database, channum: &str, input: Option<&str>) -> Result<TuneReport> {
    let mut session = open_session(settings, db)?;
    match input {
        Some(name) => session.switch_to_input_with_channel(name, channum)?,
        None => session.set_channel_by_string(channum)?,
    }
    let name = current_input_name(&session)?;
    session.store_input_channels()?;
    info!("Card {} tuned to {} on {}", session.card_id(), channum, name);
    Ok(TuneReport::from_session(&session))
}

/// Switch to `input`, tuning `channel` or the input's start channel.
pub fn switch(settings: &Settings, db: Database, input: &str, channel: Option<&str>) -> Result<TuneReport> {
    let mut session = open_session(settings, db)?;
    match channel {
        Some(channel) => session.switch_to_input_with_channel(input, channel)?,
        None => session.switch_to_input(input)?,
    }
    session.store_input_channels()?;
    Ok(TuneReport::from_session(&session))
}

/// Resume the current input's start channel and move in `direction`.
pub fn step(settings: &Settings, db: Database, direction: ChannelChangeDirection) -> Result<TuneReport> {
    let mut session = open_session(settings, db)?;
    let start = session
        .current_input()
        .map(|input| input.start_channel.clone())
        .ok_or_else(|| CommandError::NoCurrentInput(session.card_id()))?;
    session.set_channel_by_string(&start)?;
    session.set_channel_by_direction(direction)?;
    session.store_input_channels()?;
    Ok(TuneReport::from_session(&session))
}

/// Switch to the next connected input.
pub fn next_input(settings: &Settings, db: Database) -> Result<TuneReport> {
    let mut session = open_session(settings, db)?;
    let name = session
        .next_input_name()
        .map(str::to_string)
        .ok_or(TuningError::NoInputs(session.card_id()))?;
    session.switch_to_input(&name)?;
    session.store_input_channels()?;
    Ok(TuneReport::from_session(&session))
}

#[derive(Debug, Serialize)]
pub struct RenumberReport {
    pub source_id: u32,
    pub old: String,
    pub new: String,
    pub channels: usize,
}

pub fn renumber(settings: &Settings, db: Database, source_id: u32, old: &str, new: &str) -> Result<RenumberReport> {
    let mut session = load_session(settings, db)?;
    session.renumber(source_id, old, new)?;
    let channels = session.store().renumber_channel(source_id, old, new)?;
    Ok(RenumberReport {
        source_id,
        old: old.to_string(),
        new: new.to_string(),
        channels,
    })
}

pub fn add_card(db: &Database, card: &NewCard) -> Result<u32> {
    Ok(db.insert_card(card)?)
}

pub fn add_input(db: &Database, input: &NewInput) -> Result<u32> {
    Ok(db.insert_input(input)?)
}

pub fn add_channel(db: &Database, channel: &NewChannel) -> Result<u32> {
    Ok(db.insert_channel(channel)?)
}

pub fn set_favorite(db: &Database, chan_id: u32, favorite: bool) -> Result<()> {
    Ok(db.set_favorite(chan_id, favorite)?)
}

pub fn set_visible(db: &Database, chan_id: u32, visible: bool) -> Result<()> {
    Ok(db.set_visible(chan_id, visible)?)
}

/// Point input `name` at another lineup source; 0 disconnects it.
pub fn set_input_source(db: &Database, card_id: u32, name: &str, source_id: u32) -> Result<()> {
    db.set_input_source(card_id, name, source_id)?;
    info!("Card {} input {} now on source {}", card_id, name, source_id);
    Ok(())
}

pub fn remove_card(db: &Database, card_id: u32) -> Result<()> {
    db.delete_card(card_id)?;
    info!("Removed card {}", card_id);
    Ok(())
}

pub fn remove_input(db: &Database, card_id: u32, name: &str) -> Result<()> {
    db.delete_input(card_id, name)?;
    info!("Removed input {} from card {}", name, card_id);
    Ok(())
}

pub fn remove_channel(db: &Database, chan_id: u32) -> Result<()> {
    db.delete_channel(chan_id)?;
    info!("Removed channel {}", chan_id);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CardRow {
    pub id: u32,
    pub family: String,
    pub device: String,
    pub default_input: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct CardList(pub Vec<CardRow>);

pub fn list_cards(db: &Database) -> Result<CardList> {
    let rows = db
        .get_all_cards()?
        .into_iter()
        .map(|card| CardRow {
            id: card.id,
            family: card.family,
            device: card.device.unwrap_or_default(),
            default_input: card.default_input.filter(|name| !name.is_empty()),
        })
        .collect();
    Ok(CardList(rows))
}

impl fmt::Display for CardList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<4} {:<10} {:<16} DEFAULT INPUT", "ID", "FAMILY", "DEVICE")?;
        for row in &self.0 {
            writeln!(
                f,
                "{:<4} {:<10} {:<16} {}",
                row.id,
                row.family,
                row.device,
                row.default_input.as_deref().unwrap_or("-")
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for InputList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  {:<4} {:<16} {:>6} {:<8} {:>8}  CHANGER",
            "ID", "NAME", "SOURCE", "START", "CHANNELS"
        )?;
        for row in &self.0 {
            writeln!(
                f,
                "{} {:<4} {:<16} {:>6} {:<8} {:>8}  {}",
                if row.current { "*" } else { " " },
                row.id,
                row.name,
                if row.connected { row.source_id.to_string() } else { "-".to_string() },
                row.start_channel,
                row.channels,
                row.external_changer.as_deref().unwrap_or("")
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for ChannelList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input: {}", self.input)?;
        writeln!(f, "{:>8} {:<8} {:<8} {:<12} FLAGS", "CHANID", "CHANNUM", "DISPLAY", "CALLSIGN")?;
        for c in &self.channels {
            let mut flags = Vec::new();
            if c.favorite {
                flags.push("fav");
            }
            if c.commercial_free {
                flags.push("cf");
            }
            writeln!(
                f,
                "{:>8} {:<8} {:<8} {:<12} {}",
                c.chan_id,
                c.channum,
                c.display,
                c.callsign,
                flags.join(",")
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.input {
            Some(input) => writeln!(f, "Channel {} is available on input {}", self.channum, input),
            None => writeln!(f, "Channel {} is not available on this card", self.channum),
        }
    }
}

impl fmt::Display for TuneReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Card {}: input {}, channel {}", self.card_id, self.input, self.channel)?;
        if let Some(chan_id) = self.chan_id {
            write!(f, " (chanid {})", chan_id)?;
        }
        if self.commercial_free {
            write!(f, " [commercial free]")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for RenumberReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Renumbered {} channel(s) {} -> {} on source {}",
            self.channels, self.old, self.new, self.source_id
        )
    }
}
