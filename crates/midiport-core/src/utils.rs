//! Reset and panic message sequences.

use crate::message::MidiMessage;

pub const DEFAULT_NUM_CHANNELS: u8 = 16;

/// "All Notes Off" then "Reset All Controllers" for each channel, channel-major.
///
/// `num_channels` is clamped to 16.
pub fn reset_messages(num_channels: u8) -> impl Iterator<Item = MidiMessage> {
    (0..num_channels.min(DEFAULT_NUM_CHANNELS)).flat_map(|channel| {
        [
            MidiMessage::all_notes_off(channel),
            MidiMessage::reset_all_controllers(channel),
        ]
    })
}

/// "All Sounds Off" for each channel.
///
/// Mutes sounding notes regardless of envelope release; use when notes hang
/// and [`reset_messages`] is not enough.
pub fn panic_messages(num_channels: u8) -> impl Iterator<Item = MidiMessage> {
    (0..num_channels.min(DEFAULT_NUM_CHANNELS)).map(MidiMessage::all_sound_off)
}
