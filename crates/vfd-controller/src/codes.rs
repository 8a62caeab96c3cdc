use crate::VfdError;
use core::fmt;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

/// Text returned for any ordinal outside a code table.
pub const UNKNOWN: &str = "Unknown";

/// Generates a register-backed code enum together with its ordinal table and text table,
/// so the three can never drift apart.
macro_rules! register_codes {
    (
        $(#[$meta:meta])*
        pub enum $name:ident in $table:ident for $register:path {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
        #[repr(u16)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, indexed by its register value.
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )+ ];
            pub const COUNT: usize = Self::ALL.len();

            pub fn ordinal(self) -> usize {
                self as usize
            }

            pub fn as_str(self) -> &'static str {
                $table.get(self.ordinal()).copied().unwrap_or(UNKNOWN)
            }
        }

        impl TryFrom<u16> for $name {
            type Error = VfdError;

            fn try_from(raw: u16) -> Result<Self, Self::Error> {
                Self::ALL
                    .get(usize::from(raw))
                    .copied()
                    .ok_or(VfdError::DecodeError {
                        register: $register,
                        raw,
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        static $table: [&str; $name::COUNT] = [ $( $text, )+ ];
    };
}

/// Which code register a raw value came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CodeRegister {
    Status,
    Issue,
}

impl fmt::Display for CodeRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeRegister::Status => f.write_str("status"),
            CodeRegister::Issue => f.write_str("issue"),
        }
    }
}

register_codes! {
    /// Run mode reported by the drive's status register.
    pub enum Status in STATUS_STRINGS for CodeRegister::Status {
        #[default]
        None => "None",
        ForwardRun => "Forward Run",
        ReverseRun => "Reverse Run",
        Stop => "Stop",
    }
}

register_codes! {
    /// Fault reported by the drive's issue register (Delixi numbering).
    pub enum Issue in ISSUE_STRINGS for CodeRegister::Issue {
        #[default]
        NoFault => "No fault",
        OverCurrentConstantSpeed => "Over-current at constant speed",
        OverCurrentAcceleration => "Over-current at acceleration",
        OverCurrentDeceleration => "Over-current at deceleration",
        OverVoltageConstantSpeed => "Over-voltage at constant speed",
        OverVoltageAcceleration => "Over-voltage at acceleration",
        OverVoltageDeceleration => "Over-voltage at deceleration",
        ModuleFault => "Module Fault",
        Undervoltage => "Undervoltage",
        InverterOverload => "Frequency inverter Overload",
        MotorOverload => "Motor Overload",
        InputPhaseLoss => "Input Default Phase",
        OutputPhaseLoss => "Output Default Phase",
        ExternalFault => "External Fault",
        AbnormalCommunication => "Abnormal Communication",
        InverterOverheat => "Frequency inverter Overheat",
        InverterHardwareFault => "Hardware Fault of Frequency inverter",
        MotorEarthingShortCircuit => "Motor Earthing Short Circuit",
        MotorIdentificationError => "Motor Identification Error",
        MotorOffload => "Motor Off-load",
        PidFeedbackLoss => "PID Feedback Loss",
        UserDefinedFault1 => "User-Defined Fault 1",
        UserDefinedFault2 => "User-Defined Fault 2",
        PowerOnTimeReached => "Accumulative Power-on Time Reached",
        RunningTimeReached => "Accumulative Running Time Reached",
        EncoderFault => "Encoder Fault",
        ParamReadWriteAbnormity => "Parameter Read-Write Abnormity",
        MotorOverheat => "Motor Overheat",
        LargeSpeedDeviation => "Larger Speed Deviation",
        MotorOverspeed => "Motor Overspeed",
        InitialPositionError => "Initial Position Error",
        CurrentTestFault => "Current Test Fault",
        Contactor => "Contactor",
        CurrentTestAbnormity => "Abnormity of Current Test",
        FastCurrentLimitTimeout => "Fast Current-limiting Timeout",
        MotorSwitchRunning => "Motor Switch at Running",
        Power24vFault => "24V Power Fault",
        DrivingPowerFault => "Driving Power Supply Fault",
        BufferResistanceFault => "Buffer Resistance Fault",
    }
}

// Pinned to the manufacturer's published tables.
const_assert_eq!(Status::COUNT, 4);
const_assert_eq!(Issue::COUNT, 39);

/// Text for a status ordinal; `"Unknown"` outside the table.
pub fn status_string(ordinal: usize) -> &'static str {
    STATUS_STRINGS.get(ordinal).copied().unwrap_or(UNKNOWN)
}

/// Text for an issue ordinal; `"Unknown"` outside the table.
pub fn issue_string(ordinal: usize) -> &'static str {
    ISSUE_STRINGS.get(ordinal).copied().unwrap_or(UNKNOWN)
}
