/*! Fast Operate configuration and command assembly.

The Fast Operate configuration block (`A5 CE`) maps each breaker and
remote bit to the one-byte control codes the relay accepts. An outgoing
command is a fixed six-byte frame: header, length, control code, a
validation byte derived from the control code, and a checksum. The relay
sends no structured reply; success shows up in later telemetry.
*/

use serde::{Deserialize, Serialize};

use crate::checksum::checksum8;
use crate::frame::{self, Cursor};
use crate::{Error, Result, commands};

/// Open/close control codes for one breaker bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerPair {
    /// Control code that trips (opens) the breaker.
    pub open: u8,
    /// Control code that closes the breaker.
    pub close: u8,
}

/// Control codes for one remote bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBit {
    /// Control code that clears the bit.
    pub clear: u8,
    /// Control code that sets the bit.
    pub set: u8,
    /// Control code that pulses the bit for one processing interval.
    /// Present only when the relay supports pulse commands.
    pub pulse: Option<u8>,
}

/// Parsed Fast Operate configuration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastOperateConfig {
    /// Echoed command bytes.
    pub command: [u8; 2],
    /// Declared frame length.
    pub length: u8,
    /// Number of breaker bits.
    pub num_breakers: u8,
    /// Number of remote bits.
    pub num_remote_bits: u16,
    /// Whether pulse commands are supported.
    pub pulse_supported: bool,
    /// Per-breaker control codes.
    pub breakers: Vec<BreakerPair>,
    /// Per-remote-bit control codes.
    pub remote_bits: Vec<RemoteBit>,
}

impl FastOperateConfig {
    /// Parse a Fast Operate configuration reply buffer.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let buf = frame::extract(data)?;
        let mut c = Cursor::new(buf);
        let command = c.pair()?;
        if !matches!(command[1], 0xCE | 0xCF) {
            return Err(Error::InvalidResponse(format!(
                "expected fast operate configuration reply, got command {command:02x?}"
            )));
        }
        let length = c.u8()?;
        let num_breakers = c.u8()?;
        let num_remote_bits = c.u16_be()?;
        let pulse_supported = c.u8()? == 1;
        let _reserved = c.u8()?;

        let mut breakers = Vec::with_capacity(num_breakers as usize);
        for _ in 0..num_breakers {
            breakers.push(BreakerPair {
                open: c.u8()?,
                close: c.u8()?,
            });
        }
        let mut remote_bits = Vec::with_capacity(num_remote_bits as usize);
        for _ in 0..num_remote_bits {
            remote_bits.push(RemoteBit {
                clear: c.u8()?,
                set: c.u8()?,
                pulse: if pulse_supported { Some(c.u8()?) } else { None },
            });
        }

        Ok(FastOperateConfig {
            command,
            length,
            num_breakers,
            num_remote_bits,
            pulse_supported,
            breakers,
            remote_bits,
        })
    }
}

/// Remote bit control commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum RemoteBitControl {
    Set,
    Clear,
    Pulse,
    Open,
    Close,
}

impl std::str::FromStr for RemoteBitControl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "set" => RemoteBitControl::Set,
            "clear" => RemoteBitControl::Clear,
            "pulse" => RemoteBitControl::Pulse,
            "open" => RemoteBitControl::Open,
            "close" => RemoteBitControl::Close,
            other => return Err(Error::InvalidCommandType(other.to_string())),
        })
    }
}

/// Breaker bit control commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum BreakerBitControl {
    Trip,
    Close,
}

impl std::str::FromStr for BreakerBitControl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "trip" => BreakerBitControl::Trip,
            "close" => BreakerBitControl::Close,
            other => return Err(Error::InvalidCommandType(other.to_string())),
        })
    }
}

/// Extract the one-based point number from a name like `RB12` or `BK1`.
fn point_number(point: &str) -> Result<usize> {
    let digits: String = point.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(Error::UnknownControlPoint(point.to_string())),
    }
}

/// Assemble the six-byte command frame: header, length, control code,
/// validation byte, checksum.
fn assemble(header: [u8; 2], control: u8) -> [u8; 6] {
    let mut out = [
        header[0],
        header[1],
        0x06,
        control,
        control.wrapping_mul(4).wrapping_add(1),
        0,
    ];
    out[5] = checksum8(&out[..5]);
    out
}

/// Build a Fast Operate remote-bit command frame for the named point.
pub fn remote_bit_command(
    config: &FastOperateConfig,
    point: &str,
    control: RemoteBitControl,
) -> Result<[u8; 6]> {
    let n = point_number(point)?;
    let bit = config
        .remote_bits
        .get(n - 1)
        .ok_or_else(|| Error::UnknownControlPoint(point.to_string()))?;
    let code = match control {
        RemoteBitControl::Set => bit.set,
        RemoteBitControl::Clear => bit.clear,
        RemoteBitControl::Pulse => bit.pulse.ok_or_else(|| {
            Error::InvalidCommandType("pulse is not supported by this relay".to_string())
        })?,
        RemoteBitControl::Open | RemoteBitControl::Close => {
            return Err(Error::InvalidCommandType(format!(
                "{control:?} does not apply to remote bits"
            )));
        }
    };
    Ok(assemble(commands::FO_REMOTE_BIT, code))
}

/// Build a Fast Operate breaker-bit command frame for the named breaker.
pub fn breaker_bit_command(
    config: &FastOperateConfig,
    point: &str,
    control: BreakerBitControl,
) -> Result<[u8; 6]> {
    let n = point_number(point)?;
    let breaker = config
        .breakers
        .get(n - 1)
        .ok_or_else(|| Error::UnknownControlPoint(point.to_string()))?;
    let code = match control {
        BreakerBitControl::Trip => breaker.open,
        BreakerBitControl::Close => breaker.close,
    };
    Ok(assemble(commands::FO_BREAKER_BIT, code))
}

/// String-driven front end mirroring the ASCII command vocabulary:
/// `control_type` is `remote_bit` or `breaker_bit`, `command` one of the
/// control names accepted by [`RemoteBitControl`] / [`BreakerBitControl`].
pub fn prepare_fastop_command(
    control_type: &str,
    point: &str,
    command: &str,
    config: &FastOperateConfig,
) -> Result<[u8; 6]> {
    match control_type.to_ascii_lowercase().as_str() {
        "remote_bit" => remote_bit_command(config, point, command.parse()?),
        "breaker_bit" => breaker_bit_command(config, point, command.parse()?),
        other => Err(Error::InvalidControlType(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::checksum8;

    fn sealed(mut f: Vec<u8>) -> Vec<u8> {
        f.push(0);
        f.push(0);
        let len = f.len();
        f[2] = len as u8;
        let mut ck = checksum8(&f[..len - 1]);
        if ck == b'=' {
            f[len - 2] = 1;
            ck = checksum8(&f[..len - 1]);
        }
        f[len - 1] = ck;
        f
    }

    fn fo_frame(pulse: bool) -> Vec<u8> {
        let mut body = vec![
            0xA5, 0xCE, 0x00, // command, length placeholder
            0x01, // one breaker
            0x00, 0x02, // two remote bits
            u8::from(pulse),
            0x00, // reserved
            0x31, 0x32, // breaker 1 open/close
        ];
        if pulse {
            body.extend_from_slice(&[0x01, 0x02, 0x07, 0x11, 0x12, 0x17]);
        } else {
            body.extend_from_slice(&[0x01, 0x02, 0x11, 0x12]);
        }
        sealed(body)
    }

    fn config(pulse: bool) -> FastOperateConfig {
        FastOperateConfig::parse(&fo_frame(pulse)).unwrap()
    }

    #[test]
    fn parse_with_pulse() {
        let config = config(true);
        assert_eq!(config.num_breakers, 1);
        assert_eq!(config.num_remote_bits, 2);
        assert!(config.pulse_supported);
        assert_eq!(config.breakers, vec![BreakerPair { open: 0x31, close: 0x32 }]);
        assert_eq!(
            config.remote_bits,
            vec![
                RemoteBit { clear: 0x01, set: 0x02, pulse: Some(0x07) },
                RemoteBit { clear: 0x11, set: 0x12, pulse: Some(0x17) },
            ]
        );
    }

    #[test]
    fn parse_without_pulse() {
        let config = config(false);
        assert!(!config.pulse_supported);
        assert_eq!(
            config.remote_bits,
            vec![
                RemoteBit { clear: 0x01, set: 0x02, pulse: None },
                RemoteBit { clear: 0x11, set: 0x12, pulse: None },
            ]
        );
    }

    #[test]
    fn pulse_command_assembly() -> crate::Result<()> {
        // Control 0x07 gives validation (0x07 * 4 + 1) = 0x1d, and the sum
        // of A5 E0 06 07 1D is 0x1af, so the checksum byte is 0xaf.
        let frame = remote_bit_command(&config(true), "RB1", RemoteBitControl::Pulse)?;
        assert_eq!(frame, [0xA5, 0xE0, 0x06, 0x07, 0x1D, 0xAF]);
        Ok(())
    }

    #[test]
    fn validation_byte_tracks_control_code() -> crate::Result<()> {
        for (point, control) in [("RB1", RemoteBitControl::Set), ("RB2", RemoteBitControl::Clear)] {
            let frame = remote_bit_command(&config(true), point, control)?;
            assert_eq!(frame[4], frame[3].wrapping_mul(4).wrapping_add(1));
            assert_eq!(frame[5], checksum8(&frame[..5]));
        }
        Ok(())
    }

    #[test]
    fn breaker_trip_uses_open_code() -> crate::Result<()> {
        let frame = breaker_bit_command(&config(false), "BK1", BreakerBitControl::Trip)?;
        assert_eq!(frame[..4], [0xA5, 0xE3, 0x06, 0x31]);
        let frame = breaker_bit_command(&config(false), "BK1", BreakerBitControl::Close)?;
        assert_eq!(frame[3], 0x32);
        Ok(())
    }

    #[test]
    fn invalid_combinations() {
        let with_pulse = config(true);
        let without = config(false);
        assert!(matches!(
            remote_bit_command(&without, "RB1", RemoteBitControl::Pulse),
            Err(Error::InvalidCommandType(_))
        ));
        assert!(matches!(
            remote_bit_command(&with_pulse, "RB1", RemoteBitControl::Open),
            Err(Error::InvalidCommandType(_))
        ));
        assert!(matches!(
            remote_bit_command(&with_pulse, "RB9", RemoteBitControl::Set),
            Err(Error::UnknownControlPoint(_))
        ));
        assert!(matches!(
            remote_bit_command(&with_pulse, "RB", RemoteBitControl::Set),
            Err(Error::UnknownControlPoint(_))
        ));
    }

    #[test]
    fn string_front_end() -> crate::Result<()> {
        let config = config(true);
        let frame = prepare_fastop_command("remote_bit", "RB1", "pulse", &config)?;
        assert_eq!(frame, [0xA5, 0xE0, 0x06, 0x07, 0x1D, 0xAF]);
        assert!(matches!(
            prepare_fastop_command("relay_bit", "RB1", "pulse", &config),
            Err(Error::InvalidControlType(_))
        ));
        assert!(matches!(
            prepare_fastop_command("remote_bit", "RB1", "wiggle", &config),
            Err(Error::InvalidCommandType(_))
        ));
        Ok(())
    }
}
