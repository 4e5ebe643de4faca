//! Request/reply frames of the converter's single-ended read command

use crate::model::ChannelId;

pub const FRAME_LEN: usize = 3;

pub type Frame = [u8; FRAME_LEN];

const START_BIT: u8 = 1;
/// Single-ended mode flag, sent above the channel selector
const SINGLE_ENDED: u8 = 8;

/// Request a conversion of `channel`: start bit, then mode and channel in
/// the upper nibble of the second byte.
pub const fn request(channel: ChannelId) -> Frame {
    [START_BIT, (SINGLE_ENDED + channel) << 4, 0]
}

/// Extract the conversion result from a reply.
///
/// The low bits of the second byte carry the top of the code and the third
/// byte carries its low 8 bits; everything else is framing.
pub fn decode_reply(reply: &Frame, resolution_bits: u8) -> u16 {
    let high_mask = ((1u16 << resolution_bits.saturating_sub(8).min(8)) - 1) as u8;
    (u16::from(reply[1] & high_mask) << 8) | u16::from(reply[2])
}
