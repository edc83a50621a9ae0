//! MIDI message value passed through ports.
//!
//! Wire encoding is delegated to `midi-msg`; ports only ever clone messages,
//! turn them into bytes, or build them back from bytes.

use crate::error::{Error, Result};
use midi_msg::{Channel, ChannelModeMsg, ChannelVoiceMsg, ControlChange, MidiMsg};

pub const ALL_SOUND_OFF: u8 = 120;
pub const RESET_ALL_CONTROLLERS: u8 = 121;
pub const ALL_NOTES_OFF: u8 = 123;

#[derive(Debug, Clone, PartialEq)]
pub struct MidiMessage {
    msg: MidiMsg,
}

impl MidiMessage {
    pub fn new(msg: MidiMsg) -> Self {
        Self { msg }
    }

    /// Decode exactly one message; `bytes` must hold nothing else.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::MessageParse("empty message".to_string()));
        }
        let (msg, len) =
            MidiMsg::from_midi(bytes).map_err(|e| Error::MessageParse(format!("{:?}", e)))?;
        if len != bytes.len() {
            return Err(Error::MessageParse(format!(
                "{} trailing bytes after message",
                bytes.len() - len
            )));
        }
        Ok(Self { msg })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.msg.to_midi()
    }

    pub fn as_midi_msg(&self) -> &MidiMsg {
        &self.msg
    }

    pub fn into_midi_msg(self) -> MidiMsg {
        self.msg
    }

    /// `channel` is clamped to 0-15.
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::channel_voice(
            channel,
            ChannelVoiceMsg::NoteOn {
                note: note & 0x7F,
                velocity: velocity & 0x7F,
            },
        )
    }

    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self::channel_voice(
            channel,
            ChannelVoiceMsg::NoteOff {
                note: note & 0x7F,
                velocity: velocity & 0x7F,
            },
        )
    }

    pub fn program_change(channel: u8, program: u8) -> Self {
        Self::channel_voice(
            channel,
            ChannelVoiceMsg::ProgramChange {
                program: program & 0x7F,
            },
        )
    }

    /// Control change for controllers 0-119. Channel mode controllers
    /// (120-127) have dedicated constructors below.
    pub fn control_change(channel: u8, control: u8, value: u8) -> Self {
        Self::channel_voice(
            channel,
            ChannelVoiceMsg::ControlChange {
                control: ControlChange::CC {
                    control: control.min(119),
                    value: value & 0x7F,
                },
            },
        )
    }

    /// Controller 123, value 0.
    pub fn all_notes_off(channel: u8) -> Self {
        Self::channel_mode(channel, ChannelModeMsg::AllNotesOff)
    }

    /// Controller 121, value 0.
    pub fn reset_all_controllers(channel: u8) -> Self {
        Self::channel_mode(channel, ChannelModeMsg::ResetAllControllers)
    }

    /// Controller 120, value 0.
    pub fn all_sound_off(channel: u8) -> Self {
        Self::channel_mode(channel, ChannelModeMsg::AllSoundOff)
    }

    /// `(channel, controller, value)` when the encoded form is a control change.
    pub fn as_control_change(&self) -> Option<(u8, u8, u8)> {
        match self.to_bytes().as_slice() {
            [status, control, value] if status & 0xF0 == 0xB0 => {
                Some((status & 0x0F, *control, *value))
            }
            _ => None,
        }
    }

    fn channel_voice(channel: u8, msg: ChannelVoiceMsg) -> Self {
        Self {
            msg: MidiMsg::ChannelVoice {
                channel: Channel::from_u8(channel.min(15)),
                msg,
            },
        }
    }

    fn channel_mode(channel: u8, msg: ChannelModeMsg) -> Self {
        Self {
            msg: MidiMsg::ChannelMode {
                channel: Channel::from_u8(channel.min(15)),
                msg,
            },
        }
    }
}

impl From<MidiMsg> for MidiMessage {
    fn from(msg: MidiMsg) -> Self {
        Self::new(msg)
    }
}
