use crate::{DeviceState, Issue, Status, Telemetry};
use serde::{Deserialize, Serialize};

const FREQ_DIVISOR: f32 = 100.0;
const CURRENT_DIVISOR: f32 = 100.0;
const BUS_VOLTAGE_DIVISOR: f32 = 10.0;

/// Decode a monitoring block into `state`.
///
/// Elements are positional: running frequency, reference frequency, output current,
/// output voltage, bus line voltage. A short block only touches the fields it covers;
/// extra elements beyond the fifth are ignored.
pub fn decode_monitoring(block: &[u16], state: &mut DeviceState) {
    for (i, raw) in block.iter().copied().enumerate() {
        match i {
            0 => state.running_frequency = f32::from(raw) / FREQ_DIVISOR,
            1 => state.reference_frequency = f32::from(raw) / FREQ_DIVISOR,
            2 => state.output_current = f32::from(raw) / CURRENT_DIVISOR,
            3 => state.output_voltage = raw,
            4 => state.bus_line_voltage = f32::from(raw) / BUS_VOLTAGE_DIVISOR,
            _ => break,
        }
    }
}

/// Serializable view of a decoded state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub running_frequency_hz: f32,
    pub reference_frequency_hz: f32,
    pub output_current_a: f32,
    pub output_voltage_v: u16,
    pub bus_line_voltage_v: f32,
    pub status: Status,
    pub status_text: String,
    pub issue: Issue,
    pub issue_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

impl From<&DeviceState> for Snapshot {
    fn from(state: &DeviceState) -> Self {
        Snapshot {
            running_frequency_hz: state.running_freq(),
            reference_frequency_hz: state.reference_freq(),
            output_current_a: state.output_current(),
            output_voltage_v: state.output_voltage(),
            bus_line_voltage_v: state.bus_line_voltage(),
            status: state.status(),
            status_text: state.status_string().to_string(),
            issue: state.issue(),
            issue_text: state.issue_string().to_string(),
            ts: state.updated_at.and_then(|t| {
                t.format(&time::format_description::well_known::Rfc3339)
                    .ok()
            }),
        }
    }
}
