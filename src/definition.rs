/*! Relay Definition block (`A5 C0`).

The definition block is the root of auto-discovery: it lists which Fast
Meter messages the relay supports (with their configuration and data
command codes), which status flags exist, and which protocol families are
enabled. When any SEL-family protocol advertises Fast Operate or Fast
Message capability, the corresponding configuration command code is
derived here.
*/

use serde::{Deserialize, Serialize};

use crate::checksum::int_to_bool_vec;
use crate::frame::{self, Cursor};
use crate::{Error, Result, commands};

/// Protocol families a relay can report in its definition block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ProtocolFamily {
    SelStandard,
    SelLmd,
    Modbus,
    SyMax,
    RSel,
    Dnp3,
    R6Sel,
}

impl ProtocolFamily {
    fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0 => ProtocolFamily::SelStandard,
            1 => ProtocolFamily::SelLmd,
            2 => ProtocolFamily::Modbus,
            3 => ProtocolFamily::SyMax,
            4 => ProtocolFamily::RSel,
            5 => ProtocolFamily::Dnp3,
            6 => ProtocolFamily::R6Sel,
            other => {
                return Err(Error::InvalidResponse(format!(
                    "unknown protocol family code {other}"
                )));
            }
        })
    }

    /// True for the SEL variants, which are the only families whose
    /// capability bits mean anything.
    pub fn is_sel(self) -> bool {
        matches!(self, ProtocolFamily::SelStandard | ProtocolFamily::SelLmd)
    }
}

/// Command pair for one supported Fast Meter message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastMeterCommands {
    /// Command requesting the configuration block.
    pub config_command: [u8; 2],
    /// Command requesting the data message itself.
    pub command: [u8; 2],
}

/// One status flag and the command it invalidates when raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFlag {
    /// Bit mask within the status flag bytes.
    pub status_bit: [u8; 2],
    /// Command whose cached results the flag invalidates.
    pub affected_command: [u8; 6],
}

/// One protocol record: family plus Fast Operate / Fast Message enables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolInfo {
    /// Protocol family.
    pub family: ProtocolFamily,
    /// Fast Operate enabled (SEL families only).
    pub fast_op_en: bool,
    /// Fast Message enabled (SEL families only).
    pub fast_msg_en: bool,
}

/// Parsed Relay Definition block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayDefinition {
    /// Echoed command bytes, `A5 C0`.
    pub command: [u8; 2],
    /// Declared frame length.
    pub length: u8,
    /// Number of protocol records.
    pub num_protocols: u8,
    /// Number of supported Fast Meter messages (0 to 3).
    pub fm_messages: u8,
    /// Number of status flag records.
    pub num_status_flags: u8,
    /// Command pairs for each supported Fast Meter message, in order:
    /// regular, demand, peak demand.
    pub fm_commands: Vec<FastMeterCommands>,
    /// Fast Meter type byte.
    pub fm_type: u8,
    /// Status flag records.
    pub status_flags: Vec<StatusFlag>,
    /// Protocol records.
    pub protocols: Vec<ProtocolInfo>,
    /// Fast Operate configuration command, when any SEL-family protocol
    /// advertises Fast Operate.
    pub fast_operate_config: Option<[u8; 2]>,
    /// Fast Message configuration command, when advertised.
    pub fast_message_config: Option<[u8; 2]>,
}

impl RelayDefinition {
    /// Parse a Relay Definition reply buffer.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let buf = frame::extract(data)?;
        let mut c = Cursor::new(buf);
        let command = c.pair()?;
        if command[1] != commands::RELAY_DEFINITION[1] {
            return Err(Error::InvalidResponse(format!(
                "expected relay definition reply, got command {command:02x?}"
            )));
        }
        let length = c.u8()?;
        let num_protocols = c.u8()?;
        let fm_messages = c.u8()?;
        let num_status_flags = c.u8()?;

        let mut fm_commands = Vec::with_capacity(fm_messages as usize);
        for _ in 0..fm_messages {
            fm_commands.push(FastMeterCommands {
                config_command: c.pair()?,
                command: c.pair()?,
            });
        }
        let fm_type = c.u8()?;

        let mut status_flags = Vec::with_capacity(num_status_flags as usize);
        for _ in 0..num_status_flags {
            let status_bit = c.pair()?;
            let affected = c.take(6)?;
            let mut affected_command = [0u8; 6];
            affected_command.copy_from_slice(affected);
            status_flags.push(StatusFlag {
                status_bit,
                affected_command,
            });
        }

        let mut protocols = Vec::with_capacity(num_protocols as usize);
        let mut fast_operate_config = None;
        let mut fast_message_config = None;
        for _ in 0..num_protocols {
            let capabilities = int_to_bool_vec(c.u8()?, true, false);
            let family = ProtocolFamily::from_code(c.u8()?)?;
            let (fast_op_en, fast_msg_en) = if family.is_sel() {
                (capabilities[0], capabilities[1])
            } else {
                (false, false)
            };
            if fast_op_en {
                fast_operate_config = Some(commands::FO_CONFIG);
            }
            if fast_msg_en {
                fast_message_config = Some(commands::FAST_MSG_CONFIG);
            }
            protocols.push(ProtocolInfo {
                family,
                fast_op_en,
                fast_msg_en,
            });
        }

        Ok(RelayDefinition {
            command,
            length,
            num_protocols,
            fm_messages,
            num_status_flags,
            fm_commands,
            fm_type,
            status_flags,
            protocols,
            fast_operate_config,
            fast_message_config,
        })
    }
}
