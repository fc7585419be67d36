//! Operator remote frame decoding.
//!
//! The radio link delivers a fixed 18-byte frame: four 11-bit rocker
//! channels, two 2-bit three-position switches, mouse deltas with button
//! state, and a 16-bit keyboard bitmask. Decoded values feed target
//! selection upstream of the control loop; the loop itself never sees raw
//! frames.

use serde::{Deserialize, Serialize};

/// Length of one raw remote frame.
pub const FRAME_LEN: usize = 18;

/// Lowest valid rocker channel value.
pub const ROCKER_MIN: i16 = 364;
/// Centered rocker channel value.
pub const ROCKER_MID: i16 = 1024;
/// Highest valid rocker channel value.
pub const ROCKER_MAX: i16 = 1684;
/// Drift window around center treated as zero deflection.
pub const ROCKER_ZERO_DRIFT: i16 = 5;

/// Three-position switch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Switch {
    Up,
    Middle,
    Down,
}

impl Switch {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(Switch::Up),
            3 => Some(Switch::Middle),
            2 => Some(Switch::Down),
            _ => None,
        }
    }
}

/// Keyboard keys carried in the 16-bit bitmask, by bit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Key {
    W = 0,
    S,
    A,
    D,
    Shift,
    Ctrl,
    Q,
    E,
    R,
    F,
    G,
    Z,
    X,
    C,
    V,
    B,
}

/// Mouse movement and button state carried in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mouse {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub left: bool,
    pub right: bool,
}

/// Decode failures for a raw frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// A rocker channel fell outside `ROCKER_MIN..=ROCKER_MAX`.
    ChannelOutOfRange { channel: usize, value: i16 },
    /// A switch field held a value outside the three valid positions.
    BadSwitch { value: u8 },
}

/// One decoded operator frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFrame {
    /// Rocker channels, each in `ROCKER_MIN..=ROCKER_MAX`.
    pub ch: [i16; 4],
    /// Left shoulder switch.
    pub swl: Switch,
    /// Right shoulder switch.
    pub swr: Switch,
    pub mouse: Mouse,
    /// Raw keyboard bitmask; query through [`key_pressed`].
    ///
    /// [`key_pressed`]: RemoteFrame::key_pressed
    pub key: u16,
}

impl RemoteFrame {
    /// Unpack a raw 18-byte frame, validating rocker ranges and switch
    /// positions.
    pub fn decode(buf: &[u8; FRAME_LEN]) -> Result<Self, FrameError> {
        let raw = [
            ((buf[0] as u16) | ((buf[1] as u16) << 8)) & 0x07ff,
            (((buf[1] as u16) >> 3) | ((buf[2] as u16) << 5)) & 0x07ff,
            (((buf[2] as u16) >> 6) | ((buf[3] as u16) << 2) | ((buf[4] as u16) << 10)) & 0x07ff,
            (((buf[4] as u16) >> 1) | ((buf[5] as u16) << 7)) & 0x07ff,
        ];
        let mut ch = [0i16; 4];
        for (channel, &value) in raw.iter().enumerate() {
            let value = value as i16;
            if !(ROCKER_MIN..=ROCKER_MAX).contains(&value) {
                return Err(FrameError::ChannelOutOfRange { channel, value });
            }
            ch[channel] = value;
        }

        let swl_bits = ((buf[5] >> 4) & 0x0c) >> 2;
        let swr_bits = (buf[5] >> 4) & 0x03;
        let swl = Switch::from_bits(swl_bits).ok_or(FrameError::BadSwitch { value: swl_bits })?;
        let swr = Switch::from_bits(swr_bits).ok_or(FrameError::BadSwitch { value: swr_bits })?;

        let mouse = Mouse {
            x: i16::from_le_bytes([buf[6], buf[7]]),
            y: i16::from_le_bytes([buf[8], buf[9]]),
            z: i16::from_le_bytes([buf[10], buf[11]]),
            left: buf[12] != 0,
            right: buf[13] != 0,
        };
        let key = u16::from_le_bytes([buf[14], buf[15]]);

        Ok(RemoteFrame {
            ch,
            swl,
            swr,
            mouse,
            key,
        })
    }

    /// Mid-relative deflection of rocker `channel`, with the zero-drift
    /// window collapsed to 0.
    pub fn rocker_offset(&self, channel: usize) -> i16 {
        let offset = self.ch[channel] - ROCKER_MID;
        if offset.abs() <= ROCKER_ZERO_DRIFT {
            0
        } else {
            offset
        }
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.key & (1 << key as u16) != 0
    }
}
