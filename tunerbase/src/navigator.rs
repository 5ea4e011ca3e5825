//! Relative channel navigation within one input's lineup.

use tunerbase_types::{ChannelChangeDirection, ChannelDescriptor, InputRecord, TuningError};

/// Computes next/previous/favorite channels over a channel list kept in
/// display order.
///
/// Navigation never crosses inputs; switching input is a separate operation.
#[derive(Debug, Clone, Copy)]
pub struct ChannelNavigator<'a> {
    channels: &'a [ChannelDescriptor],
}

impl<'a> ChannelNavigator<'a> {
    pub fn new(channels: &'a [ChannelDescriptor]) -> Self {
        Self { channels }
    }

    pub fn for_input(input: &'a InputRecord) -> Self {
        Self::new(&input.channels)
    }

    /// Channel id reached from `chan_id` by moving in `direction`.
    pub fn next_channel(
        &self,
        chan_id: u32,
        direction: ChannelChangeDirection,
    ) -> Result<u32, TuningError> {
        let pos = self
            .channels
            .iter()
            .position(|c| c.chan_id == chan_id)
            .ok_or_else(|| TuningError::UnknownChannel(format!("chanid {}", chan_id)))?;
        self.step(pos, direction).map(|p| self.channels[p].chan_id)
    }

    /// Same as [`next_channel`](Self::next_channel), starting from a channel number.
    pub fn next_channel_by_number(
        &self,
        channum: &str,
        direction: ChannelChangeDirection,
    ) -> Result<u32, TuningError> {
        let pos = self
            .channels
            .iter()
            .position(|c| c.channum == channum)
            .ok_or_else(|| TuningError::UnknownChannel(channum.to_string()))?;
        self.step(pos, direction).map(|p| self.channels[p].chan_id)
    }

    /// Exact match against the channels' display strings.
    pub fn resolve_by_display_string(&self, text: &str) -> Option<u32> {
        self.channels
            .iter()
            .find(|c| c.display == text)
            .map(|c| c.chan_id)
    }

    pub fn find_by_id(&self, chan_id: u32) -> Option<&'a ChannelDescriptor> {
        self.channels.iter().find(|c| c.chan_id == chan_id)
    }

    pub fn find_by_number(&self, channum: &str) -> Option<&'a ChannelDescriptor> {
        self.channels.iter().find(|c| c.channum == channum)
    }

    pub fn favorites(&self) -> impl Iterator<Item = &'a ChannelDescriptor> {
        self.channels.iter().filter(|c| c.favorite)
    }

    fn step(&self, pos: usize, direction: ChannelChangeDirection) -> Result<usize, TuningError> {
        let len = self.channels.len();
        match direction {
            ChannelChangeDirection::Same => Ok(pos),
            ChannelChangeDirection::Up => Ok((pos + 1) % len),
            ChannelChangeDirection::Down => Ok((pos + len - 1) % len),
            // Offsets run up to `len` so a sole favorite finds itself.
            ChannelChangeDirection::Favorite => (1..=len)
                .map(|offset| (pos + offset) % len)
                .find(|&i| self.channels[i].favorite)
                .ok_or(TuningError::NoFavorite),
        }
    }
}
