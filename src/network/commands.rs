//! Outbound protocol commands.
//!
//! Buttons never talk to the wire themselves: every externally visible
//! transition is turned into a `ProtocolCommand` and handed to the injected
//! `Transport`.

use crate::error::{ButtonError, Result};
use crate::types::Address;
use std::fmt;

/// Channel pushed
pub const MC_PUSH: u16 = 0x0084;
/// Channel released
pub const MC_RELEASE: u16 = 0x0085;
/// Level value
pub const MC_LEVEL: u16 = 0x008A;
/// Raw string
pub const MC_STRING: u16 = 0x008B;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandValue {
    None,
    Level(i32),
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolCommand {
    pub device: u16,
    pub port: u16,
    pub channel: u16,
    pub opcode: u16,
    pub value: CommandValue,
}

impl ProtocolCommand {
    pub fn push(device: u16, channel: Address) -> Self {
        Self {
            device,
            port: channel.port,
            channel: channel.code,
            opcode: MC_PUSH,
            value: CommandValue::None,
        }
    }

    pub fn release(device: u16, channel: Address) -> Self {
        Self {
            device,
            port: channel.port,
            channel: channel.code,
            opcode: MC_RELEASE,
            value: CommandValue::None,
        }
    }

    pub fn level(device: u16, level: Address, value: i32) -> Self {
        Self {
            device,
            port: level.port,
            channel: level.code,
            opcode: MC_LEVEL,
            value: CommandValue::Level(value),
        }
    }

    pub fn string(device: u16, address: Address, text: &str) -> Self {
        Self {
            device,
            port: address.port,
            channel: address.code,
            opcode: MC_STRING,
            value: CommandValue::Text(text.to_string()),
        }
    }

    pub fn is_push(&self) -> bool {
        self.opcode == MC_PUSH
    }

    pub fn is_release(&self) -> bool {
        self.opcode == MC_RELEASE
    }
}

impl fmt::Display for ProtocolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:04X} {}:{}:{}",
            self.opcode, self.device, self.port, self.channel
        )?;
        match &self.value {
            CommandValue::None => Ok(()),
            CommandValue::Level(v) => write!(f, " = {}", v),
            CommandValue::Text(t) => write!(f, " \"{}\"", t),
        }
    }
}

pub trait Transport: Send + Sync {
    fn send_command(&self, command: ProtocolCommand) -> Result<()>;
}

/// Hand `command` to the transport; without one the command is dropped with a warning.
///
/// Returns whether the command went out. Local visual updates never depend on it.
pub fn dispatch(transport: Option<&dyn Transport>, command: ProtocolCommand) -> bool {
    let Some(transport) = transport else {
        log::warn!("{}: {}", ButtonError::ProtocolUnavailable, command);
        return false;
    };
    log::debug!("Sending {}", command);
    match transport.send_command(command) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Command not sent: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<ProtocolCommand>>);

    impl Transport for Recorder {
        fn send_command(&self, command: ProtocolCommand) -> Result<()> {
            lock(&self.0).push(command);
            Ok(())
        }
    }

    struct Broken;

    impl Transport for Broken {
        fn send_command(&self, _command: ProtocolCommand) -> Result<()> {
            Err(ButtonError::Transport("socket closed".into()))
        }
    }

    #[test]
    fn test_command_constructors() {
        let push = ProtocolCommand::push(10001, Address::new(1, 5));
        assert!(push.is_push());
        assert_eq!((push.port, push.channel), (1, 5));
        let level = ProtocolCommand::level(10001, Address::new(1, 3), 42);
        assert_eq!(level.opcode, MC_LEVEL);
        assert_eq!(level.to_string(), "0x008A 10001:1:3 = 42");
    }

    #[test]
    fn test_dispatch() {
        let recorder = Recorder::default();
        assert!(dispatch(Some(&recorder), ProtocolCommand::release(1, Address::new(1, 1))));
        assert_eq!(lock(&recorder.0).len(), 1);
        assert!(!dispatch(None, ProtocolCommand::push(1, Address::new(1, 1))));
        assert!(!dispatch(Some(&Broken), ProtocolCommand::push(1, Address::new(1, 1))));
    }
}
