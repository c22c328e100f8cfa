#![warn(missing_docs)]
/*! Client library for the SEL ASCII/binary relay protocol suite.

Schweitzer Engineering Laboratories protective relays speak a mixed
ASCII/binary protocol over telnet or serial: a command-line prompt with
access-level escalation, interleaved with length-delimited, checksummed
binary frames. This crate implements the client side of the three
sub-protocols used to interrogate and actuate a relay:

* **Fast Meter** — periodic analog/digital telemetry.
* **Fast Message** — auxiliary metadata (capability detection only).
* **Fast Operate** — controlled actuation of remote bits and breaker bits.

# Architecture overview

The interesting part of the protocol is that the shape of the telemetry is
not fixed: it's learned at runtime. A [`Session`] first requests the *Relay
Definition* ([`RelayDefinition`]), which names the Fast Meter messages the
relay supports. Each Fast Meter *Configuration* reply
([`meter::FastMeterConfig`]) then teaches the Fast Meter *Data* parser how
to decode itself: analog channel names, widths, sample counts, and region
offsets all come from the configuration, and digital point names come from
the ASCII `DNA` table. Polling reads a fresh data frame and interprets it
against the stored records.

```text
[ Transport (telnet / serial / TCP) ]
                 ↕
      [ Session: prompt cleaning,
        access levels, retry loop ]
                 ↕
   [ frame: locate / strip / validate ]
                 ↕
 [ typed parsers: definition, meter,
     operate, ascii ID/DNA/BNA ]
```

The byte transport itself is an injected capability: anything implementing
[`Transport`] works. A [`TcpTransport`] adapter is included.

# Example

```no_run
use selproto::{AccessLevel, Session, SessionOptions, TcpTransport};

let transport = TcpTransport::connect("192.168.2.210:23")?;
let mut session = Session::connect(transport, SessionOptions::default())?;
println!("relay FID: {}", session.ident().fid);
let sample = session.poll_fast_meter(AccessLevel::Level0)?;
for (name, value) in &sample.analogs {
    println!("{name}: {value:?}");
}
session.send_remote_bit("RB1", selproto::RemoteBitControl::Pulse)?;
# Ok::<(), selproto::Error>(())
```
*/

pub mod ascii;
pub mod checksum;
pub mod commands;
pub mod definition;
pub mod frame;
pub mod meter;
pub mod operate;
pub mod session;
pub mod transport;

pub use ascii::{DnaMap, RelayIdent};
pub use definition::RelayDefinition;
pub use meter::{AnalogValue, FastMeterConfig, FastMeterSample};
pub use operate::{BreakerBitControl, FastOperateConfig, RemoteBitControl};
pub use session::{AccessLevel, Session, SessionOptions};
pub use transport::{TcpTransport, Transport};

/// Complex analog value, as produced by two-samples-per-channel Fast Meter
/// messages (first pass imaginary, second pass real).
pub type Phasor = num_complex::Complex<f64>;

/// selproto error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A frame is shorter than its declared length, usually a truncated
    /// read. The auto-config engine retries on this.
    #[error("malformed byte array: declared length {declared}, have {actual} bytes")]
    MalformedByteArray {
        /// Length the frame claims, per its length byte.
        declared: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// Frame or ASCII-row checksum mismatch.
    #[error("checksum failed: found {found:#06x}, expected {expected:#06x}")]
    ChecksumFail {
        /// Checksum carried by the message.
        found: u16,
        /// Checksum computed over the message.
        expected: u16,
    },

    /// No prompt seen within the connection-check budget.
    #[error("could not verify relay connection")]
    ConnVerificationFail,

    /// An auto-configuration step exhausted its retry budget.
    #[error("auto-configuration failed: {0}")]
    AutoConfigurationFailure(&'static str),

    /// No 0xA5 header byte anywhere in the response.
    #[error("response missing 0xa5 binary header")]
    MissingHeader,

    /// Digital bank count in the Fast Meter configuration does not match the
    /// number of DNA rows, so digital points cannot be named.
    #[error("{banks} digital banks do not match {rows} DNA rows")]
    DnaDigitalsMismatch {
        /// Banks the configuration block declares.
        banks: usize,
        /// Rows the DNA table provided.
        rows: usize,
    },

    /// The relay replied "Invalid Command".
    #[error("relay reports invalid command: {0}")]
    InvalidCommand(String),

    /// The requested Fast Operate command does not apply to the control
    /// point (e.g. PULSE on a relay without pulse support).
    #[error("invalid command type: {0}")]
    InvalidCommandType(String),

    /// Control type is not one of remote_bit / breaker_bit.
    #[error("invalid control type: {0}")]
    InvalidControlType(String),

    /// The named control point is not present in the Fast Operate
    /// configuration.
    #[error("unknown control point: {0}")]
    UnknownControlPoint(String),

    /// Event record index above 64.
    #[error("event number {0} may not be greater than 64")]
    EventOutOfRange(u8),

    /// Analog channel references a scale-factor type this crate does not
    /// interpret (only 255, "no scaling", is supported).
    #[error("unsupported scale factor type {0}")]
    UnsupportedScaleFactor(u8),

    /// The frame validated but its contents don't parse.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Polling was attempted before auto-configuration captured the Fast
    /// Meter configuration.
    #[error("session has not been auto-configured yet")]
    NotConfigured,

    /// Transport I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// selproto result.
pub type Result<T, E = Error> = std::result::Result<T, E>;
