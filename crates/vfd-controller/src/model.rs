use crate::{Issue, RegisterMap, Result, Status};
use time::OffsetDateTime;

/// Telemetry decoded from the last successful poll.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeviceState {
    /// Hz (0.01 Hz resolution).
    pub running_frequency: f32,
    /// Hz (0.01 Hz resolution).
    pub reference_frequency: f32,
    /// A (0.01 A resolution).
    pub output_current: f32,
    /// V.
    pub output_voltage: u16,
    /// V (0.1 V resolution).
    pub bus_line_voltage: f32,
    pub status: Status,
    pub issue: Issue,
    /// `None` until the first successful poll.
    pub updated_at: Option<OffsetDateTime>,
}

impl DeviceState {
    pub fn is_updated(&self) -> bool {
        self.updated_at.is_some()
    }
}

/// Register map plus the telemetry decoded through it.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceModel {
    map: RegisterMap,
    pub(crate) state: DeviceState,
}

impl DeviceModel {
    /// Validates `map`, stores a copy and starts from default telemetry.
    pub fn new(map: RegisterMap) -> Result<Self> {
        map.validate()?;
        Ok(Self {
            map,
            state: DeviceState::default(),
        })
    }

    pub fn register_map(&self) -> &RegisterMap {
        &self.map
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }
}
