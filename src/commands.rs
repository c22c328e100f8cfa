/*! Protocol constants: binary command headers, ASCII commands, prompt
sentinels, and default passwords.

Binary requests are two bytes beginning `0xA5`; ASCII requests are a short
keyword terminated by CR/LF. Both are echoed back by the relay ahead of the
reply, which is how responses are matched to requests.
*/

use crate::{Error, Result};

/// Relay Definition block request.
pub const RELAY_DEFINITION: [u8; 2] = [0xA5, 0xC0];
/// Configuration block for the regular Fast Meter message.
pub const FM_CONFIG: [u8; 2] = [0xA5, 0xC1];
/// Configuration block for the demand Fast Meter message.
pub const FM_DEMAND_CONFIG: [u8; 2] = [0xA5, 0xC2];
/// Configuration block for the peak-demand Fast Meter message.
pub const FM_PEAK_CONFIG: [u8; 2] = [0xA5, 0xC3];
/// Fast Operate configuration block.
pub const FO_CONFIG: [u8; 2] = [0xA5, 0xCE];
/// Alternate Fast Operate configuration block.
pub const FO_CONFIG_ALT: [u8; 2] = [0xA5, 0xCF];
/// Legacy standard Fast Meter block.
pub const FM_OLD_STD: [u8; 2] = [0xA5, 0xDC];
/// Legacy extended Fast Meter block.
pub const FM_OLD_EXT: [u8; 2] = [0xA5, 0xDA];
/// Regular Fast Meter data, as described by its configuration block.
pub const FM_REGULAR: [u8; 2] = [0xA5, 0xD1];
/// Demand Fast Meter data.
pub const FM_DEMAND: [u8; 2] = [0xA5, 0xD2];
/// Peak-demand Fast Meter data.
pub const FM_PEAK: [u8; 2] = [0xA5, 0xD3];
/// Fast Operate remote-bit command header.
pub const FO_REMOTE_BIT: [u8; 2] = [0xA5, 0xE0];
/// Fast Operate breaker-bit command header.
pub const FO_BREAKER_BIT: [u8; 2] = [0xA5, 0xE3];
/// Fast Operate OPEN sub-operation.
pub const FO_OPEN: [u8; 2] = [0xA5, 0xE5];
/// Fast Operate CLOSE sub-operation.
pub const FO_CLOSE: [u8; 2] = [0xA5, 0xE6];
/// Fast Operate SET sub-operation.
pub const FO_SET: [u8; 2] = [0xA5, 0xE7];
/// Fast Operate CLEAR sub-operation.
pub const FO_CLEAR: [u8; 2] = [0xA5, 0xE8];
/// Fast Operate PULSE sub-operation.
pub const FO_PULSE: [u8; 2] = [0xA5, 0xE9];
/// Oldest unacknowledged event report.
pub const OLDEST_UNACK_EVENT: [u8; 2] = [0xA5, 0xB2];
/// Acknowledge the most recently sent event report.
pub const ACK_EVENT: [u8; 2] = [0xA5, 0xB5];
/// Clear power-up / setting-change status bits.
pub const CLEAR_STATUS: [u8; 2] = [0xA5, 0xB9];
/// Most recent event report.
pub const MOST_RECENT_EVENT: [u8; 2] = [0xA5, 0x60];
/// Fast Message configuration block.
pub const FAST_MSG_CONFIG: [u8; 2] = [0xA5, 0x46];

/// Carriage return / line feed, terminating every ASCII command.
pub const CR: &[u8] = b"\r\n";
/// Request the relay identification block.
pub const ID: &[u8] = b"ID\r\n";
/// Request the element-name block.
pub const ENA: &[u8] = b"ENA\r\n";
/// Request the digital-point-name block.
pub const DNA: &[u8] = b"DNA\r\n";
/// Request the bit-name block.
pub const BNA: &[u8] = b"BNA\r\n";
/// Drop back to access level 0.
pub const QUIT: &[u8] = b"QUI\r\n";
/// Ascend to access level 1 (ACC).
pub const GO_ACC: &[u8] = b"ACC\r\n";
/// Ascend to access level 2 (2AC).
pub const GO_2AC: &[u8] = b"2AC\r\n";

/// Factory default ACC password.
pub const PASS_ACC: &str = "OTTER";
/// Factory default 2AC password.
pub const PASS_2AC: &str = "TAIL";

/// Access level 0 prompt tail.
pub const LEVEL_0: &[u8] = b"=";
/// Access level 1 (ACC) prompt tail.
pub const LEVEL_1: &[u8] = b"=>";
/// Access level 2 (2AC) prompt tail.
pub const LEVEL_2: &[u8] = b"=>>";
/// Calibration level prompt tail.
pub const LEVEL_C: &[u8] = b"==>>";
/// Idle prompt: newline followed by the level-0 sentinel.
pub const PROMPT: &[u8] = b"\r\n=";
/// Password prompt shown while ascending access levels.
pub const PASS_PROMPT: &[u8] = b"Password:";
/// Text the relay prints when it rejects a command.
pub const INVALID_COMMAND: &[u8] = b"Invalid Command";

/// Build the request for a numbered event record (zero-based; zero is the
/// most recent event). Numbers above 64 are rejected.
pub fn event_record_request(event_number: u8) -> Result<[u8; 2]> {
    if event_number > 64 {
        return Err(Error::EventOutOfRange(event_number));
    }
    Ok([0xA5, 0x60 + event_number])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_records() -> crate::Result<()> {
        assert_eq!(event_record_request(0)?, MOST_RECENT_EVENT);
        assert_eq!(event_record_request(4)?, [0xA5, 0x64]);
        assert_eq!(event_record_request(64)?, [0xA5, 0xA0]);
        assert!(matches!(
            event_record_request(65),
            Err(crate::Error::EventOutOfRange(65))
        ));
        Ok(())
    }
}
