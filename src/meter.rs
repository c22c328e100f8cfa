/*! Fast Meter configuration and data blocks.

A Fast Meter *Configuration* block (`A5 C1`/`C2`/`C3`) describes the shape
of the corresponding *Data* message (`A5 D1`/`D2`/`D3`): analog channel
names and types, samples per channel, and the offsets of the analog and
digital regions. The data parser is a pure function of the raw bytes plus
that configuration and the DNA name table, which keeps it trivially
testable.

Analog aggregation depends on the sample count:

* 1 sample per channel: plain magnitudes.
* 2 samples per channel: a phasor, first pass imaginary, second pass real.
* 4 or more (quarter-cycle sampling): an ordered list per channel.
*/

use std::collections::BTreeMap;
use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::ascii::DnaMap;
use crate::checksum::{FLOAT_DIGITS, ieee_float4, int_to_bool_vec};
use crate::frame::{self, Cursor};
use crate::{Error, Phasor, Result};

/// Phase rotation of a calculation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Rotation {
    Abc,
    Acb,
}

/// Voltage or current connection of a calculation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseConnection {
    /// Wye connected.
    Wye,
    /// Delta connected, positive sequence (AB-BC-CA).
    DeltaPositive,
    /// Delta connected, negative sequence (AC-BA-CB).
    DeltaNegative,
}

impl fmt::Display for PhaseConnection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            PhaseConnection::Wye => "Y",
            PhaseConnection::DeltaPositive => "AB-BC-CA",
            PhaseConnection::DeltaNegative => "AC-BA-CB",
        })
    }
}

/// One analog channel descriptor from a configuration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalogChannel {
    /// Channel name, zero-terminated ASCII on the wire.
    pub name: String,
    /// Value encoding: 0 = 2-byte integer, 1 = 4-byte IEEE float,
    /// 2 and 3 are reserved.
    pub channel_type: u8,
    /// Scale factor type; 255 means no scaling.
    pub factor_type: u8,
    /// Offset of the channel's scale factor in the scale-factor region.
    pub scale_offset: i16,
}

/// One calculation block descriptor from a configuration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalcBlock {
    /// Raw line-configuration byte.
    pub line: u8,
    /// Phase rotation.
    pub rotation: Rotation,
    /// Voltage connection.
    pub voltage: PhaseConnection,
    /// Current connection.
    pub current: PhaseConnection,
    /// Calculation type code, 0 through 6.
    pub calc_type: u8,
    /// Skew correction offset.
    pub skew_offset: [u8; 2],
    /// Rs offset.
    pub rs_offset: [u8; 2],
    /// Xs offset.
    pub xs_offset: [u8; 2],
    /// Analog channel index of IA.
    pub ia_index: u8,
    /// Analog channel index of IB.
    pub ib_index: u8,
    /// Analog channel index of IC.
    pub ic_index: u8,
    /// Analog channel index of VA.
    pub va_index: u8,
    /// Analog channel index of VB.
    pub vb_index: u8,
    /// Analog channel index of VC.
    pub vc_index: u8,
}

impl CalcBlock {
    /// Human-readable description of the calculation type code.
    pub fn description(&self) -> &'static str {
        match self.calc_type {
            0 => "standard-power",
            1 => "2-1/2 element Δ power",
            2 => "voltages only",
            3 => "currents only",
            4 => "single-phase IA and VA only",
            5 => "standard-power with two sets of currents",
            _ => "2-1/2 element Δ power with two sets of currents",
        }
    }
}

/// Parsed Fast Meter configuration block. One exists per supported Fast
/// Meter message (regular, demand, peak demand).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastMeterConfig {
    /// Echoed command bytes.
    pub command: [u8; 2],
    /// Declared frame length.
    pub length: u8,
    /// Number of status flag bytes in each data message.
    pub num_status_flags: u8,
    /// Scale factor location code.
    pub scale_factor_loc: u8,
    /// Number of scale factors.
    pub num_scale_factors: u8,
    /// Number of analog input channels.
    pub num_analog_ins: u8,
    /// Samples taken per channel in each data message.
    pub samples_per_channel: u8,
    /// Number of one-byte digital banks.
    pub num_digital_banks: u8,
    /// Number of calculation blocks.
    pub num_calc_blocks: u8,
    /// Offset of the analog region within the data frame.
    pub analog_offset: i16,
    /// Offset of the timestamp region within the data frame.
    pub timestamp_offset: i16,
    /// Offset of the digital region within the data frame.
    pub digital_offset: i16,
    /// Analog channel descriptors.
    pub analog_channels: Vec<AnalogChannel>,
    /// Calculation block descriptors.
    pub calc_blocks: Vec<CalcBlock>,
}

impl FastMeterConfig {
    /// Parse a Fast Meter configuration reply buffer.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let buf = frame::extract(data)?;
        let mut c = Cursor::new(buf);
        let command = c.pair()?;
        if !matches!(command[1], 0xC1 | 0xC2 | 0xC3) {
            return Err(Error::InvalidResponse(format!(
                "expected fast meter configuration reply, got command {command:02x?}"
            )));
        }
        let length = c.u8()?;
        let num_status_flags = c.u8()?;
        let scale_factor_loc = c.u8()?;
        let num_scale_factors = c.u8()?;
        let num_analog_ins = c.u8()?;
        let samples_per_channel = c.u8()?;
        let num_digital_banks = c.u8()?;
        let num_calc_blocks = c.u8()?;
        let analog_offset = c.i16_be()?;
        let timestamp_offset = c.i16_be()?;
        let digital_offset = c.i16_be()?;

        let mut analog_channels = Vec::with_capacity(num_analog_ins as usize);
        for _ in 0..num_analog_ins {
            let raw_name = c.take(6)?;
            let name = raw_name
                .iter()
                .filter(|&&b| b != 0)
                .map(|&b| char::from(b))
                .collect();
            analog_channels.push(AnalogChannel {
                name,
                channel_type: c.u8()?,
                factor_type: c.u8()?,
                scale_offset: c.i16_be()?,
            });
        }

        let mut calc_blocks = Vec::with_capacity(num_calc_blocks as usize);
        for _ in 0..num_calc_blocks {
            let line = c.u8()?;
            let bits = int_to_bool_vec(line, true, false);
            let rotation = if bits[0] { Rotation::Acb } else { Rotation::Abc };
            let voltage = if bits[2] {
                PhaseConnection::DeltaNegative
            } else if bits[1] {
                PhaseConnection::DeltaPositive
            } else {
                PhaseConnection::Wye
            };
            let current = if bits[4] {
                PhaseConnection::DeltaNegative
            } else if bits[3] {
                PhaseConnection::DeltaPositive
            } else {
                PhaseConnection::Wye
            };
            calc_blocks.push(CalcBlock {
                line,
                rotation,
                voltage,
                current,
                calc_type: c.u8()?,
                skew_offset: c.pair()?,
                rs_offset: c.pair()?,
                xs_offset: c.pair()?,
                ia_index: c.u8()?,
                ib_index: c.u8()?,
                ic_index: c.u8()?,
                va_index: c.u8()?,
                vb_index: c.u8()?,
                vc_index: c.u8()?,
            });
        }

        Ok(FastMeterConfig {
            command,
            length,
            num_status_flags,
            scale_factor_loc,
            num_scale_factors,
            num_analog_ins,
            samples_per_channel,
            num_digital_banks,
            num_calc_blocks,
            analog_offset,
            timestamp_offset,
            digital_offset,
            analog_channels,
            calc_blocks,
        })
    }
}

/// An analog value from a Fast Meter data message. The shape depends on
/// the configured samples per channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalogValue {
    /// Single sample: a plain magnitude.
    Scalar(f64),
    /// Two samples: a complex phasor.
    Phasor(Phasor),
    /// Four or more samples (quarter-cycle sampling), in message order.
    Samples(Vec<f64>),
}

/// One Fast Meter poll result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastMeterSample {
    /// Echoed command bytes.
    pub command: [u8; 2],
    /// Declared frame length.
    pub length: u8,
    /// Raw status flag bytes.
    pub status_flags: Vec<u8>,
    /// Analog values keyed by channel name.
    pub analogs: BTreeMap<String, AnalogValue>,
    /// Digital point states keyed by DNA name. The `*` placeholder rows
    /// are dropped.
    pub digitals: BTreeMap<String, bool>,
}

fn analog_size(channel_type: u8) -> Result<usize> {
    match channel_type {
        0 => Ok(2),
        1 => Ok(4),
        2 | 3 => Ok(8),
        other => Err(Error::InvalidResponse(format!(
            "unknown analog channel type {other}"
        ))),
    }
}

fn decode_analog(channel_type: u8, bytes: &[u8]) -> Result<f64> {
    match channel_type {
        0 => Ok(f64::from(i16::from_be_bytes([bytes[0], bytes[1]]))),
        1 => Ok(ieee_float4(
            [bytes[0], bytes[1], bytes[2], bytes[3]],
            FLOAT_DIGITS,
        )),
        other => Err(Error::InvalidResponse(format!(
            "analog channel type {other} is reserved and not supported"
        ))),
    }
}

impl FastMeterSample {
    /// Parse a Fast Meter data message against its configuration block and
    /// the DNA name table captured during auto-configuration.
    pub fn parse(data: &[u8], config: &FastMeterConfig, dna: &DnaMap) -> Result<Self> {
        let buf = frame::extract(data)?;
        let mut c = Cursor::new(buf);
        let command = c.pair()?;
        let length = c.u8()?;
        let status_flags = c.take(config.num_status_flags as usize)?.to_vec();

        let mut analogs: BTreeMap<String, AnalogValue> = BTreeMap::new();
        let samples = config.samples_per_channel;
        c.seek(config.analog_offset.max(0) as usize);
        for pass in 0..samples {
            for channel in &config.analog_channels {
                let size = analog_size(channel.channel_type)?;
                // Scale factors other than "none" reference a region this
                // crate does not interpret; refuse rather than mis-scale.
                if channel.factor_type != 255 {
                    return Err(Error::UnsupportedScaleFactor(channel.factor_type));
                }
                let value = decode_analog(channel.channel_type, c.take(size)?)?;
                trace!("analog {} pass {pass}: {value}", channel.name);
                match samples {
                    1 => {
                        analogs.insert(channel.name.clone(), AnalogValue::Scalar(value));
                    }
                    2 => {
                        if pass == 0 {
                            // Imaginary part first. Tiny magnitudes decay
                            // to zero rather than carrying float noise.
                            let imag = if value.abs() > 1e-8 { value } else { 0.0 };
                            analogs.insert(
                                channel.name.clone(),
                                AnalogValue::Phasor(Phasor::new(0.0, imag)),
                            );
                        } else if let Some(AnalogValue::Phasor(p)) =
                            analogs.get_mut(&channel.name)
                        {
                            p.re += value;
                        }
                    }
                    _ => match analogs.get_mut(&channel.name) {
                        Some(AnalogValue::Samples(list)) => list.push(value),
                        _ => {
                            analogs
                                .insert(channel.name.clone(), AnalogValue::Samples(vec![value]));
                        }
                    },
                }
            }
        }

        if config.num_digital_banks as usize != dna.len() {
            return Err(Error::DnaDigitalsMismatch {
                banks: config.num_digital_banks as usize,
                rows: dna.len(),
            });
        }
        let mut digitals = BTreeMap::new();
        c.seek(config.digital_offset.max(0) as usize);
        for row in dna.iter().take(config.num_digital_banks as usize) {
            let bits = int_to_bool_vec(c.u8()?, true, false);
            for (name, &state) in row.iter().take(8).zip(&bits) {
                if name != "*" {
                    digitals.insert(name.clone(), state);
                }
            }
        }

        Ok(FastMeterSample {
            command,
            length,
            status_flags,
            analogs,
            digitals,
        })
    }
}
