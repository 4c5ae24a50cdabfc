//! Out-of-band messages that tune the display without touching the program.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Restart the `T` clock at zero.
    ResetTime,
    GammaBrightness { gamma: bool, brightness: u8 },
    Blink(u8),
    /// Ask stations to identify themselves.
    StationId,
}

impl ControlMessage {
    pub fn encode(&self) -> String {
        match *self {
            ControlMessage::ResetTime => "t".to_owned(),
            // 0bx1xxxGBB 0bx1BBBBBB
            ControlMessage::GammaBrightness { gamma, brightness } => {
                let b0 = 0x40 | (if gamma { 0x04 } else { 0 }) | (brightness >> 6);
                let b1 = 0x40 | (brightness & 0x3f);
                format!("g{}{}", b0 as char, b1 as char)
            }
            ControlMessage::Blink(v) => format!("b{}", v),
            ControlMessage::StationId => "i".to_owned(),
        }
    }
}
