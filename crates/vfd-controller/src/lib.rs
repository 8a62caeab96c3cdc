//! vfd-controller: register-level device layer for variable-frequency drives
//!
//! A drive is described by a [`RegisterMap`] (where its telemetry, status, fault and
//! set-point registers live). A [`VfdController`] binds that map to a slave address and any
//! [`register_transport::RegisterTransport`], polls the drive with [`VfdController::update`]
//! and commands it with [`VfdController::set_running_frequency`]. Decoded values are read
//! through the [`Telemetry`] trait, which also answers for an absent controller.

mod error;
pub use error::{Result, VfdError};

mod codes;
pub use codes::{issue_string, status_string, CodeRegister, Issue, Status, UNKNOWN};

mod types;
pub use types::{DeviceDescriptor, RegisterMap, MONITORING_CAPACITY};

mod models;
pub use models::VfdModel;

mod model;
pub use model::{DeviceModel, DeviceState};

mod decode;
pub use decode::{decode_monitoring, Snapshot};

mod encode;
pub use encode::{percent_to_raw, FREQ_PERCENT_MAX};

mod controller;
pub use controller::VfdController;

mod telemetry;
pub use telemetry::Telemetry;

mod loader;
pub use loader::{load_descriptor_file, load_descriptors_dir, DeviceRegistry};

mod metrics;
pub use metrics::{DeviceMetrics, MetricsHub};
