use crate::{DeviceState, Issue, Status};

/// Read access to decoded drive telemetry.
///
/// Implemented for [`DeviceState`], for [`crate::VfdController`], and for `Option<&T>` so
/// that callers holding a controller that may not exist yet still get well-defined values:
/// zero telemetry, [`Status::None`] and [`Issue::NoFault`].
pub trait Telemetry {
    /// Hz.
    fn running_freq(&self) -> f32;
    /// Hz.
    fn reference_freq(&self) -> f32;
    /// A.
    fn output_current(&self) -> f32;
    /// V.
    fn output_voltage(&self) -> u16;
    /// V.
    fn bus_line_voltage(&self) -> f32;
    fn status(&self) -> Status;
    fn issue(&self) -> Issue;

    fn status_string(&self) -> &'static str {
        self.status().as_str()
    }

    fn issue_string(&self) -> &'static str {
        self.issue().as_str()
    }
}

impl Telemetry for DeviceState {
    fn running_freq(&self) -> f32 {
        self.running_frequency
    }

    fn reference_freq(&self) -> f32 {
        self.reference_frequency
    }

    fn output_current(&self) -> f32 {
        self.output_current
    }

    fn output_voltage(&self) -> u16 {
        self.output_voltage
    }

    fn bus_line_voltage(&self) -> f32 {
        self.bus_line_voltage
    }

    fn status(&self) -> Status {
        self.status
    }

    fn issue(&self) -> Issue {
        self.issue
    }
}

impl<T: Telemetry + ?Sized> Telemetry for Option<&T> {
    fn running_freq(&self) -> f32 {
        match self {
            Some(t) => t.running_freq(),
            None => 0.0,
        }
    }

    fn reference_freq(&self) -> f32 {
        match self {
            Some(t) => t.reference_freq(),
            None => 0.0,
        }
    }

    fn output_current(&self) -> f32 {
        match self {
            Some(t) => t.output_current(),
            None => 0.0,
        }
    }

    fn output_voltage(&self) -> u16 {
        match self {
            Some(t) => t.output_voltage(),
            None => 0,
        }
    }

    fn bus_line_voltage(&self) -> f32 {
        match self {
            Some(t) => t.bus_line_voltage(),
            None => 0.0,
        }
    }

    fn status(&self) -> Status {
        match self {
            Some(t) => t.status(),
            None => Status::None,
        }
    }

    fn issue(&self) -> Issue {
        match self {
            Some(t) => t.issue(),
            None => Issue::NoFault,
        }
    }
}
