use crate::{Result, VfdError, VfdModel};
use serde::{Deserialize, Serialize};

/// Capacity of the monitoring buffer; no model may map a longer monitoring block.
pub const MONITORING_CAPACITY: usize = 5;

/// Holding-register layout of one VFD model.
///
/// The monitoring block is read in one transaction and decoded in the fixed order running
/// frequency, reference frequency, output current, output voltage, bus line voltage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterMap {
    pub monitoring_address: u16,
    pub monitoring_len: u16,
    pub freq_address: u16,
    pub status_address: u16,
    pub issue_address: u16,
    #[serde(default = "single_register")]
    pub status_len: u16,
    #[serde(default = "single_register")]
    pub issue_len: u16,
}

fn single_register() -> u16 {
    1
}

impl RegisterMap {
    /// Delixi convention: monitoring at 0x9000 (5 registers), set-point at 0xA001,
    /// status at 0xB000, fault at 0xB001.
    pub const fn delixi() -> Self {
        Self {
            monitoring_address: 0x9000,
            monitoring_len: 5,
            freq_address: 0xA001,
            status_address: 0xB000,
            issue_address: 0xB001,
            status_len: 1,
            issue_len: 1,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let len = usize::from(self.monitoring_len);
        if len == 0 || len > MONITORING_CAPACITY {
            return Err(VfdError::InvalidArgument(format!(
                "monitoring length {len} outside 1..={MONITORING_CAPACITY}"
            )));
        }
        if usize::from(self.monitoring_address) + len > usize::from(u16::MAX) + 1 {
            return Err(VfdError::InvalidArgument(format!(
                "monitoring block 0x{:04X}+{len} crosses end of address space",
                self.monitoring_address
            )));
        }
        if self.status_len != 1 {
            return Err(VfdError::InvalidArgument(format!(
                "status length {} must be 1",
                self.status_len
            )));
        }
        if self.issue_len != 1 {
            return Err(VfdError::InvalidArgument(format!(
                "issue length {} must be 1",
                self.issue_len
            )));
        }
        Ok(())
    }
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self::delixi()
    }
}

/// One drive on the bus, as described in a YAML descriptor file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: String,
    pub model: VfdModel,
    pub slave: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registers: Option<RegisterMap>,
}

impl DeviceDescriptor {
    /// The explicit register override if present, otherwise the model preset.
    pub fn register_map(&self) -> RegisterMap {
        self.registers
            .unwrap_or_else(|| self.model.register_map())
    }
}
