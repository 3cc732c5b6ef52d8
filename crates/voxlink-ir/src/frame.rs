use std::fmt;
use std::str::FromStr;

use crate::error::{IrError, Result};
use crate::settings::IrSettings;

/// Frame length in bytes.
pub const FRAME_LEN: usize = 6;

/// Protocol header byte. Every frame starts `B2 4D`.
pub const HEADER: u8 = 0xB2;

/// Modulation carrier frequency.
pub const CARRIER_HZ: u32 = 38_000;

/// Leader mark and space, in microseconds.
pub const LEADER_US: u16 = 4350;
/// Mark length for every bit and for the trailer.
pub const BIT_MARK_US: u16 = 580;
/// Space after a 0 bit.
pub const ZERO_SPACE_US: u16 = 580;
/// Space after a 1 bit.
pub const ONE_SPACE_US: u16 = 1580;

/// One six-byte air-conditioner frame.
///
/// ```text
/// ┌──────┬──────┬──────┬──────┬────────────────┬─────────┐
/// │ 0xB2 │ 0x4D │ fan  │ !fan │ temp<<4 | mode │ !byte 4 │
/// └──────┴──────┴──────┴──────┴────────────────┴─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IrFrame([u8; FRAME_LEN]);

impl IrFrame {
    pub fn from_settings(settings: &IrSettings) -> Self {
        let fan = settings.fan.code();
        let temp_mode = settings.temp_mode_byte();
        Self([HEADER, !HEADER, fan, !fan, temp_mode, !temp_mode])
    }

    /// Parse twelve hex characters (either case) and check every
    /// complement byte.
    pub fn from_hex(text: &str) -> Result<Self> {
        let raw = hex::decode(text.trim())?;
        let bytes: [u8; FRAME_LEN] = raw
            .as_slice()
            .try_into()
            .map_err(|_| IrError::Length(raw.len()))?;
        if bytes[0] != HEADER {
            return Err(IrError::Header(bytes[0]));
        }
        for index in [1, 3, 5] {
            let expected = !bytes[index - 1];
            if bytes[index] != expected {
                return Err(IrError::Complement {
                    index,
                    found: bytes[index],
                    expected,
                });
            }
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    pub fn fan_byte(&self) -> u8 {
        self.0[2]
    }

    pub fn temp_mode_byte(&self) -> u8 {
        self.0[4]
    }

    /// Twelve uppercase hex characters, as carried in `ir_code`.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Mark/space durations in microseconds, alternating and starting with
    /// a mark: leader, 48 bits MSB first, trailing mark.
    pub fn pulses(&self) -> Vec<u16> {
        let mut out = Vec::with_capacity(2 + FRAME_LEN * 8 * 2 + 1);
        out.push(LEADER_US);
        out.push(LEADER_US);
        for byte in self.0 {
            for bit in (0..8).rev() {
                out.push(BIT_MARK_US);
                out.push(if (byte >> bit) & 1 == 1 {
                    ONE_SPACE_US
                } else {
                    ZERO_SPACE_US
                });
            }
        }
        out.push(BIT_MARK_US);
        out
    }
}

impl From<IrSettings> for IrFrame {
    fn from(settings: IrSettings) -> Self {
        Self::from_settings(&settings)
    }
}

impl FromStr for IrFrame {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for IrFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{FanSpeed, Mode};

    #[test]
    fn default_settings_frame() {
        let frame = IrFrame::from_settings(&IrSettings::default());
        assert_eq!(frame.to_hex(), "B24DA05FD02F");
        assert_eq!(frame.to_string(), "B24DA05FD02F");
    }

    #[test]
    fn check_bytes_are_complements() {
        let frame = IrFrame::from_settings(&IrSettings {
            temperature: 22,
            mode: Mode::Heat,
            fan: FanSpeed::Low,
        });
        let b = frame.as_bytes();
        assert_eq!(b[1], !b[0]);
        assert_eq!(b[3], !b[2]);
        assert_eq!(b[5], !b[4]);
        assert_eq!(frame.fan_byte(), 0xE0);
        assert_eq!(frame.temp_mode_byte(), 0x7C);
    }

    #[test]
    fn from_hex_accepts_lowercase() {
        let frame: IrFrame = "b24da05fd02f".parse().unwrap();
        assert_eq!(frame.to_hex(), "B24DA05FD02F");
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(matches!(
            IrFrame::from_hex("B24DA05F"),
            Err(IrError::Length(4))
        ));
        assert!(matches!(
            IrFrame::from_hex("B24DA05FD0ZZ"),
            Err(IrError::InvalidHex(_))
        ));
        assert!(matches!(
            IrFrame::from_hex("A24DA05FD02F"),
            Err(IrError::Header(0xA2))
        ));
        assert!(matches!(
            IrFrame::from_hex("B24DA05FD02E"),
            Err(IrError::Complement { index: 5, .. })
        ));
    }

    #[test]
    fn pulse_train_shape() {
        let frame = IrFrame::from_settings(&IrSettings::default());
        let pulses = frame.pulses();
        assert_eq!(pulses.len(), 99);
        assert_eq!(&pulses[..2], &[LEADER_US, LEADER_US]);
        assert_eq!(pulses.last(), Some(&BIT_MARK_US));

        // 0xB2 = 1011_0010, MSB first.
        let first_byte_spaces: Vec<u16> = pulses[2..18].iter().skip(1).step_by(2).copied().collect();
        assert_eq!(
            first_byte_spaces,
            vec![
                ONE_SPACE_US,
                ZERO_SPACE_US,
                ONE_SPACE_US,
                ONE_SPACE_US,
                ZERO_SPACE_US,
                ZERO_SPACE_US,
                ONE_SPACE_US,
                ZERO_SPACE_US,
            ]
        );
        assert!(pulses[2..98].iter().step_by(2).all(|m| *m == BIT_MARK_US));
    }
}
