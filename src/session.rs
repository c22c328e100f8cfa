/*! Session engine: connection verification, prompt cleaning, access
levels, retrying auto-configuration, polling, and Fast Operate emission.

A [`Session`] owns one [`Transport`] and drives the relay's command prompt.
It is single-threaded and blocking: suspension points are exactly the
transport reads and the explicit inter-command delays. Run independent
sessions for independent relays; nothing here is shared.

The auto-config sequence walks the discovery chain: Relay Definition,
then each advertised Fast Meter configuration, then the Fast Operate
configuration, then the ASCII `DNA` and `ID` tables. Each step that can be
hurt by a truncated read is retried. After that,
[`Session::poll_fast_meter`] interprets fresh data frames against the
captured records.
*/

use std::thread;
use std::time::Duration;

use log::{debug, info, trace, warn};

use crate::ascii::{self, DnaMap, RelayIdent};
use crate::definition::RelayDefinition;
use crate::meter::{FastMeterConfig, FastMeterSample};
use crate::operate::{self, BreakerBitControl, FastOperateConfig, RemoteBitControl};
use crate::transport::Transport;
use crate::{Error, Result, commands};

/// Relay access levels, detected from the prompt tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessLevel {
    /// Level 0: freshly connected, `=` prompt.
    Level0,
    /// Level 1 (ACC), `=>` prompt.
    Level1,
    /// Level 2 (2AC), `=>>` prompt.
    Level2,
    /// Calibration level (CAL), `==>>` prompt.
    Cal,
}

impl AccessLevel {
    /// The relay's name for the level; empty for level 0.
    pub fn label(self) -> &'static str {
        match self {
            AccessLevel::Level0 => "",
            AccessLevel::Level1 => "ACC",
            AccessLevel::Level2 => "2AC",
            AccessLevel::Cal => "CAL",
        }
    }
}

/// Tunable session behavior. The defaults match common relay settings;
/// passwords in particular are the SEL factory defaults and usually need
/// overriding.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Attempts made to see a prompt when verifying the connection.
    pub connection_check_attempts: u32,
    /// Delay between prompt probes and after commands.
    pub inter_command_delay: Duration,
    /// Timeout applied to transport reads.
    pub read_timeout: Duration,
    /// Run auto-configuration during [`Session::connect`].
    pub autoconfig_on_start: bool,
    /// Retry budget for each auto-configuration step; 0 retries until the
    /// step succeeds.
    pub autoconfig_attempts: u32,
    /// Password for access level 1 (ACC).
    pub password_acc: String,
    /// Password for access level 2 (2AC).
    pub password_2ac: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            connection_check_attempts: 5,
            inter_command_delay: Duration::from_millis(25),
            read_timeout: Duration::from_secs(60),
            autoconfig_on_start: true,
            autoconfig_attempts: 0,
            password_acc: commands::PASS_ACC.to_string(),
            password_2ac: commands::PASS_2AC.to_string(),
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// In-progress conversation with one relay.
///
/// The transport's lifetime must enclose the session's; drop the session
/// (or call [`Session::into_transport`]) before tearing the connection
/// down. If a read is interrupted mid-reply, discard the session: the
/// protocol has no framing outside the response itself.
pub struct Session<T: Transport> {
    transport: T,
    options: SessionOptions,

    ident: RelayIdent,
    definition: Option<RelayDefinition>,
    fm_config: Option<FastMeterConfig>,
    fm_demand_config: Option<FastMeterConfig>,
    fm_peak_config: Option<FastMeterConfig>,
    fo_config: Option<FastOperateConfig>,
    dna: DnaMap,

    fm_config_command: [u8; 2],
    fm_command: [u8; 2],
    fm_demand_config_command: [u8; 2],
    fm_demand_command: [u8; 2],
    fm_peak_config_command: [u8; 2],
    fm_peak_command: [u8; 2],
    fo_config_command: [u8; 2],
    fast_message_config_command: Option<[u8; 2]>,

    fast_meter_supported: bool,
    fast_meter_demand_supported: bool,
    fast_meter_peak_supported: bool,
    fast_operate_supported: bool,
}

impl<T: Transport> Session<T> {
    /// Wrap a transport without touching the wire. Use
    /// [`Session::connect`] for the usual verify-then-configure startup.
    pub fn new(transport: T, options: SessionOptions) -> Self {
        Self {
            transport,
            options,
            ident: RelayIdent::default(),
            definition: None,
            fm_config: None,
            fm_demand_config: None,
            fm_peak_config: None,
            fo_config: None,
            dna: DnaMap::new(),
            fm_config_command: commands::FM_CONFIG,
            fm_command: commands::FM_REGULAR,
            fm_demand_config_command: commands::FM_DEMAND_CONFIG,
            fm_demand_command: commands::FM_DEMAND,
            fm_peak_config_command: commands::FM_PEAK_CONFIG,
            fm_peak_command: commands::FM_PEAK,
            fo_config_command: commands::FO_CONFIG,
            fast_message_config_command: None,
            fast_meter_supported: false,
            fast_meter_demand_supported: false,
            fast_meter_peak_supported: false,
            fast_operate_supported: false,
        }
    }

    /// Verify the relay answers its prompt, drop to access level 0, and
    /// (unless disabled in the options) run auto-configuration.
    pub fn connect(transport: T, options: SessionOptions) -> Result<Self> {
        let autoconfig = options.autoconfig_on_start;
        let mut session = Self::new(transport, options);
        session
            .transport
            .set_timeout(session.options.read_timeout)?;
        debug!("verifying relay connection");
        if !session.verify_connection()? {
            return Err(Error::ConnVerificationFail);
        }
        session.quit()?;
        if autoconfig {
            session.autoconfig()?;
        }
        Ok(session)
    }

    /// Release the underlying transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Identification strings captured from the `ID` reply.
    pub fn ident(&self) -> &RelayIdent {
        &self.ident
    }

    /// The captured Relay Definition, once auto-configured.
    pub fn definition(&self) -> Option<&RelayDefinition> {
        self.definition.as_ref()
    }

    /// The regular Fast Meter configuration, once auto-configured.
    pub fn fast_meter_config(&self) -> Option<&FastMeterConfig> {
        self.fm_config.as_ref()
    }

    /// The demand Fast Meter configuration, once auto-configured.
    pub fn fast_meter_demand_config(&self) -> Option<&FastMeterConfig> {
        self.fm_demand_config.as_ref()
    }

    /// The peak-demand Fast Meter configuration, once auto-configured.
    pub fn fast_meter_peak_config(&self) -> Option<&FastMeterConfig> {
        self.fm_peak_config.as_ref()
    }

    /// The Fast Operate configuration, once auto-configured.
    pub fn fast_operate_config(&self) -> Option<&FastOperateConfig> {
        self.fo_config.as_ref()
    }

    /// Digital point names captured from the `DNA` reply.
    pub fn dna(&self) -> &DnaMap {
        &self.dna
    }

    /// Whether the relay advertises regular Fast Meter.
    pub fn fast_meter_supported(&self) -> bool {
        self.fast_meter_supported
    }

    /// Whether the relay advertises Fast Operate.
    pub fn fast_operate_supported(&self) -> bool {
        self.fast_operate_supported
    }

    /// Fast Message configuration command, when the relay advertises it.
    pub fn fast_message_config_command(&self) -> Option<[u8; 2]> {
        self.fast_message_config_command
    }

    fn sleep(&self) {
        thread::sleep(self.options.inter_command_delay);
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        trace!("tx: {data:02x?}");
        self.transport.write(data)
    }

    /// Write a binary command followed by CR/LF as one transmission.
    fn write_command(&mut self, command: &[u8; 2]) -> Result<()> {
        let mut buf = command.to_vec();
        buf.extend_from_slice(commands::CR);
        self.write(&buf)
    }

    fn read_to(&mut self, pattern: &[u8]) -> Result<Vec<u8>> {
        let response = self
            .transport
            .read_until(pattern, self.options.read_timeout)?;
        trace!("rx: {response:02x?}");
        Ok(response)
    }

    fn read_to_prompt(&mut self) -> Result<Vec<u8>> {
        self.read_to(commands::PROMPT)
    }

    /// Accumulate reads until the echoed command bytes show up, bounded to
    /// ten reads with no growth so a misbehaving relay cannot park us
    /// forever.
    fn read_command_response(&mut self, command: &[u8]) -> Result<Vec<u8>> {
        let needle: Vec<u8> = command
            .iter()
            .copied()
            .filter(|&b| b != b'\r' && b != b'\n')
            .collect();
        let mut response = Vec::new();
        let mut stalls = 0;
        while !contains(&response, &needle) && stalls < 10 {
            let before = response.len();
            response.extend(self.read_to_prompt()?);
            stalls = if response.len() != before { 0 } else { stalls + 1 };
            if contains(&response, commands::INVALID_COMMAND) {
                return Err(Error::InvalidCommand(
                    String::from_utf8_lossy(&response).into_owned(),
                ));
            }
        }
        Ok(response)
    }

    /// Send bare CR/LF until three consecutive reads look like a clean
    /// prompt, then drain the input. Precondition for every command that
    /// expects a fresh, bounded reply.
    fn read_clean_prompt(&mut self) -> Result<()> {
        let mut clean = 0;
        let mut response = Vec::new();
        while clean < 3 {
            self.write(commands::CR)?;
            response.extend(self.read_to_prompt()?);
            clean = if ascii::clean_prompt(&response) {
                clean + 1
            } else {
                0
            };
            self.sleep();
        }
        self.clear_input_buffer()?;
        self.sleep();
        Ok(())
    }

    fn clear_input_buffer(&mut self) -> Result<()> {
        loop {
            match self.transport.read_eager() {
                Ok(leftover) if leftover.is_empty() => return Ok(()),
                Ok(leftover) => {
                    trace!("clearing buffer: {leftover:02x?}");
                    thread::sleep(self.options.inter_command_delay * 10);
                }
                Err(e) => {
                    debug!("eager read failed ({e}); resetting input buffer");
                    return self.transport.reset_input_buffer();
                }
            }
        }
    }

    /// Probe with CR/LF until the relay shows its prompt.
    fn verify_connection(&mut self) -> Result<bool> {
        let probe: Vec<u8> = commands::CR.repeat(3);
        for attempt in 0..self.options.connection_check_attempts {
            self.write(&probe)?;
            let response = self.read_to(commands::CR)?;
            if contains(&response, commands::LEVEL_0) {
                return Ok(true);
            }
            debug!(
                "no prompt on attempt {}/{}",
                attempt + 1,
                self.options.connection_check_attempts
            );
            self.sleep();
        }
        Ok(false)
    }

    /// Identify the current access level from the prompt tail.
    pub fn access_level(&mut self) -> Result<AccessLevel> {
        let mut response = Vec::new();
        for _ in 0..2 {
            self.write(commands::CR)?;
            response.extend(self.read_to_prompt()?);
        }
        Ok(if contains(&response, commands::LEVEL_C) {
            AccessLevel::Cal
        } else if contains(&response, commands::LEVEL_2) {
            AccessLevel::Level2
        } else if contains(&response, commands::LEVEL_1) {
            AccessLevel::Level1
        } else {
            AccessLevel::Level0
        })
    }

    /// Return to access level 0.
    pub fn quit(&mut self) -> Result<()> {
        self.write(commands::QUIT)?;
        self.read_to(commands::LEVEL_0)?;
        self.read_clean_prompt()
    }

    /// Ascend (or descend) to access level 1, supplying the password when
    /// logging in from level 0.
    ///
    /// Returns false on login failure, including a password prompt that
    /// times out, so callers can try another password.
    pub fn access_level_1(&mut self, password: &str) -> Result<bool> {
        self.sleep();
        let level = self.access_level()?;
        debug!("logging in to ACC from {level:?}");
        self.write(commands::GO_ACC)?;
        if level == AccessLevel::Level0 {
            thread::sleep(self.options.inter_command_delay * 3);
            let mut buf = password.as_bytes().to_vec();
            buf.extend_from_slice(commands::CR);
            self.write(&buf)?;
            self.sleep();
        }
        let response = self.read_to(commands::LEVEL_0)?;
        if response.is_empty() || contains(&response, b"Invalid") {
            warn!("ACC login failed");
            return Ok(false);
        }
        Ok(true)
    }

    /// Ascend (or descend) to access level 2, passing through level 1
    /// first when starting from level 0.
    pub fn access_level_2(&mut self, password: &str) -> Result<bool> {
        let level = self.access_level()?;
        if level == AccessLevel::Level0 {
            let acc = self.options.password_acc.clone();
            if !self.access_level_1(&acc)? {
                return Ok(false);
            }
        }
        debug!("logging in to 2AC from {level:?}");
        self.write(commands::GO_2AC)?;
        if level <= AccessLevel::Level1 {
            thread::sleep(self.options.inter_command_delay * 3);
            let mut buf = password.as_bytes().to_vec();
            buf.extend_from_slice(commands::CR);
            self.write(&buf)?;
            self.sleep();
        }
        let response = self.read_to(commands::LEVEL_0)?;
        if response.is_empty() || contains(&response, b"Invalid") {
            warn!("2AC login failed");
            return Ok(false);
        }
        Ok(true)
    }

    /// Retry an auto-configuration step on truncated responses, per the
    /// configured attempt budget (0 means until it succeeds). Other errors
    /// propagate immediately.
    fn retry<R>(
        &mut self,
        what: &'static str,
        mut step: impl FnMut(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let budget = self.options.autoconfig_attempts;
        let mut attempts = 0u32;
        loop {
            match step(self) {
                Ok(value) => return Ok(value),
                Err(e @ Error::MalformedByteArray { .. }) => {
                    attempts += 1;
                    warn!("{what}: malformed response ({e}), attempt {attempts}");
                    if budget != 0 && attempts >= budget {
                        return Err(Error::AutoConfigurationFailure(what));
                    }
                    self.sleep();
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Run the full auto-configuration sequence: Relay Definition, every
    /// advertised Fast Meter configuration, Fast Operate configuration,
    /// then the `DNA` and `ID` tables (escalating to level 1 when needed
    /// for `DNA`).
    pub fn autoconfig(&mut self) -> Result<()> {
        self.quit()?;
        self.autoconfig_relay_definition()?;
        if self.fast_meter_supported {
            self.autoconfig_fast_meter()?;
        }
        if self.fast_meter_demand_supported {
            self.autoconfig_fast_meter_demand()?;
        }
        if self.fast_meter_peak_supported {
            self.autoconfig_fast_meter_peak_demand()?;
        }
        if self.fast_operate_supported {
            self.autoconfig_fast_operate()?;
        }
        if self.access_level()? == AccessLevel::Level0 {
            // DNA needs at least ACC.
            let password = self.options.password_acc.clone();
            if !self.access_level_1(&password)? {
                warn!("ACC login failed; DNA request will likely be rejected");
            }
        }
        self.read_clean_prompt()?;
        debug!("reading relay DNA block");
        self.write(commands::DNA)?;
        let response = self.read_command_response(commands::DNA)?;
        self.dna = ascii::parse_dna_block(&response)?;
        debug!("reading relay ID block");
        self.write(commands::ID)?;
        let response = self.read_command_response(commands::ID)?;
        self.ident = ascii::parse_id_block(&response)?;
        info!(
            "auto-configuration complete: {} ({} DNA rows)",
            self.ident.fid,
            self.dna.len()
        );
        Ok(())
    }

    /// Request and apply the Relay Definition block.
    pub fn autoconfig_relay_definition(&mut self) -> Result<()> {
        let definition = self.retry("relay definition", |session| {
            debug!("reading relay definition block");
            session.write_command(&commands::RELAY_DEFINITION)?;
            let response = session.read_command_response(&commands::RELAY_DEFINITION)?;
            RelayDefinition::parse(&response)
        })?;
        for (index, info) in definition.fm_commands.iter().enumerate() {
            match index {
                0 => {
                    self.fm_config_command = info.config_command;
                    self.fm_command = info.command;
                    self.fast_meter_supported = true;
                }
                1 => {
                    self.fm_demand_config_command = info.config_command;
                    self.fm_demand_command = info.command;
                    self.fast_meter_demand_supported = true;
                }
                2 => {
                    self.fm_peak_config_command = info.config_command;
                    self.fm_peak_command = info.command;
                    self.fast_meter_peak_supported = true;
                }
                _ => warn!("ignoring unexpected fast meter message #{index}"),
            }
        }
        if let Some(command) = definition.fast_operate_config {
            self.fo_config_command = command;
            self.fast_operate_supported = true;
        }
        self.fast_message_config_command = definition.fast_message_config;
        self.definition = Some(definition);
        Ok(())
    }

    fn fetch_fm_config(
        &mut self,
        what: &'static str,
        command: [u8; 2],
    ) -> Result<FastMeterConfig> {
        self.retry(what, |session| {
            debug!("reading {what} block");
            session.read_clean_prompt()?;
            session.write_command(&command)?;
            let response = session.read_to_prompt()?;
            FastMeterConfig::parse(&response)
        })
    }

    /// Request and store the regular Fast Meter configuration.
    pub fn autoconfig_fast_meter(&mut self) -> Result<()> {
        let command = self.fm_config_command;
        self.fm_config = Some(self.fetch_fm_config("fast meter configuration", command)?);
        Ok(())
    }

    /// Request and store the demand Fast Meter configuration.
    pub fn autoconfig_fast_meter_demand(&mut self) -> Result<()> {
        let command = self.fm_demand_config_command;
        self.fm_demand_config =
            Some(self.fetch_fm_config("fast meter demand configuration", command)?);
        Ok(())
    }

    /// Request and store the peak-demand Fast Meter configuration.
    pub fn autoconfig_fast_meter_peak_demand(&mut self) -> Result<()> {
        let command = self.fm_peak_config_command;
        self.fm_peak_config =
            Some(self.fetch_fm_config("fast meter peak demand configuration", command)?);
        Ok(())
    }

    /// Request and store the Fast Operate configuration.
    pub fn autoconfig_fast_operate(&mut self) -> Result<()> {
        let command = self.fo_config_command;
        self.fo_config = Some(self.retry("fast operate configuration", |session| {
            debug!("reading fast operate configuration block");
            session.read_clean_prompt()?;
            session.write_command(&command)?;
            let response = session.read_to_prompt()?;
            FastOperateConfig::parse(&response)
        })?);
        Ok(())
    }

    /// Poll one regular Fast Meter data message and interpret it against
    /// the captured configuration and DNA table.
    ///
    /// `min_level` optionally escalates access before polling; level 0
    /// polls as-is.
    pub fn poll_fast_meter(&mut self, min_level: AccessLevel) -> Result<FastMeterSample> {
        if self.fm_config.is_none() {
            return Err(Error::NotConfigured);
        }
        match min_level {
            AccessLevel::Level0 => {}
            AccessLevel::Level1 => {
                let password = self.options.password_acc.clone();
                self.access_level_1(&password)?;
            }
            AccessLevel::Level2 | AccessLevel::Cal => {
                let password = self.options.password_2ac.clone();
                self.access_level_2(&password)?;
            }
        }
        self.read_clean_prompt()?;
        let command = self.fm_command;
        self.write_command(&command)?;
        let response = self.read_command_response(&command)?;
        let config = self.fm_config.as_ref().ok_or(Error::NotConfigured)?;
        FastMeterSample::parse(&response, config, &self.dna)
    }

    /// Send a Fast Operate remote-bit control. The relay gives no
    /// structured reply; failures surface in later telemetry.
    pub fn send_remote_bit(&mut self, point: &str, control: RemoteBitControl) -> Result<()> {
        let config = self.fo_config.as_ref().ok_or(Error::NotConfigured)?;
        let frame = operate::remote_bit_command(config, point, control)?;
        info!("fast operate remote bit {point} {control:?}: {frame:02x?}");
        self.write(&frame)
    }

    /// Send a Fast Operate breaker-bit control.
    pub fn send_breaker_bit(&mut self, point: &str, control: BreakerBitControl) -> Result<()> {
        let config = self.fo_config.as_ref().ok_or(Error::NotConfigured)?;
        let frame = operate::breaker_bit_command(config, point, control)?;
        info!("fast operate breaker bit {point} {control:?}: {frame:02x?}");
        self.write(&frame)
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

    fn definition_frame() -> Vec<u8> {
        sealed(vec![
            0xA5, 0xC0, 0x00, 0x01, 0x01, 0x00, 0xA5, 0xC1, 0xA5, 0xD1, 0x00, 0x01, 0x00,
        ])
    }

    /// Transport that answers every definition request from a queue of
    /// canned replies, and every other read with a prompt.
    struct ScriptTransport {
        replies: Vec<Vec<u8>>,
        definition_requests: usize,
        reply_next: bool,
    }

    impl ScriptTransport {
        fn new(replies: Vec<Vec<u8>>) -> Self {
            Self {
                replies,
                definition_requests: 0,
                reply_next: false,
            }
        }
    }

    impl Transport for ScriptTransport {
        fn write(&mut self, data: &[u8]) -> crate::Result<()> {
            if data.starts_with(&commands::RELAY_DEFINITION) {
                self.definition_requests += 1;
                self.reply_next = true;
            }
            Ok(())
        }

        fn read_until(&mut self, _pattern: &[u8], _timeout: Duration) -> crate::Result<Vec<u8>> {
            if self.reply_next {
                self.reply_next = false;
                if !self.replies.is_empty() {
                    return Ok(self.replies.remove(0));
                }
            }
            Ok(b"=\r\n".to_vec())
        }

        fn read_eager(&mut self) -> crate::Result<Vec<u8>> {
            Ok(Vec::new())
        }

        fn reset_input_buffer(&mut self) -> crate::Result<()> {
            Ok(())
        }
    }

    fn fast_options() -> SessionOptions {
        SessionOptions {
            inter_command_delay: Duration::ZERO,
            read_timeout: Duration::from_millis(10),
            ..SessionOptions::default()
        }
    }

    #[test]
    fn truncated_definition_retries_once_then_succeeds() -> crate::Result<()> {
        let transport = ScriptTransport::new(vec![
            b"\xa5\xc0\x10\x01".to_vec(), // truncated: declares 16 bytes
            definition_frame(),
        ]);
        let mut session = Session::new(transport, fast_options());
        session.autoconfig_relay_definition()?;
        assert!(session.fast_meter_supported());
        assert_eq!(session.fm_command, commands::FM_REGULAR);
        assert_eq!(session.into_transport().definition_requests, 2);
        Ok(())
    }

    #[test]
    fn bounded_retries_exhaust() {
        let transport = ScriptTransport::new(vec![
            b"\xa5\xc0\x10\x01".to_vec(),
            b"\xa5\xc0\x10\x01".to_vec(),
            b"\xa5\xc0\x10\x01".to_vec(),
        ]);
        let mut options = fast_options();
        options.autoconfig_attempts = 2;
        let mut session = Session::new(transport, options);
        assert!(matches!(
            session.autoconfig_relay_definition(),
            Err(Error::AutoConfigurationFailure(_))
        ));
        assert_eq!(session.into_transport().definition_requests, 2);
    }

    #[test]
    fn polling_requires_autoconfig() {
        let transport = ScriptTransport::new(vec![]);
        let mut session = Session::new(transport, fast_options());
        assert!(matches!(
            session.poll_fast_meter(AccessLevel::Level0),
            Err(Error::NotConfigured)
        ));
    }

    #[test]
    fn invalid_command_reply_is_typed() {
        struct Rude;
        impl Transport for Rude {
            fn write(&mut self, _data: &[u8]) -> crate::Result<()> {
                Ok(())
            }
            fn read_until(&mut self, _p: &[u8], _t: Duration) -> crate::Result<Vec<u8>> {
                Ok(b"Invalid Command\r\n=".to_vec())
            }
            fn read_eager(&mut self) -> crate::Result<Vec<u8>> {
                Ok(Vec::new())
            }
            fn reset_input_buffer(&mut self) -> crate::Result<()> {
                Ok(())
            }
        }
        let mut session = Session::new(Rude, fast_options());
        assert!(matches!(
            session.read_command_response(commands::DNA),
            Err(Error::InvalidCommand(_))
        ));
    }
}
