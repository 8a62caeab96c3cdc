use crate::{
    decode_monitoring, percent_to_raw, DeviceMetrics, DeviceModel, DeviceState, Issue,
    RegisterMap, Result, Status, Telemetry, VfdError, MONITORING_CAPACITY,
};
use register_transport::{RegisterTransport, SlaveAddress};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

/// A drive on the bus: slave address, register map, transport and the last good telemetry.
///
/// Every bus operation takes `&mut self` and blocks until the transport returns. Pass
/// `&mut transport` to keep ownership of the transport with the caller.
pub struct VfdController<T> {
    slave: SlaveAddress,
    transport: T,
    model: DeviceModel,
    metrics: Option<DeviceMetrics>,
}

impl<T: RegisterTransport> VfdController<T> {
    /// Bind `transport` and `map` to a slave. Touches nothing on the bus.
    pub fn new(slave: u8, transport: T, map: RegisterMap) -> Result<Self> {
        let slave = SlaveAddress::new(slave).ok_or_else(|| {
            VfdError::InvalidArgument(format!(
                "slave address {slave} outside {}..={}",
                SlaveAddress::MIN,
                SlaveAddress::MAX
            ))
        })?;
        let model = DeviceModel::new(map)?;
        info!(
            slave = slave.raw(),
            monitoring = map.monitoring_address,
            len = map.monitoring_len,
            "vfd controller ready"
        );
        Ok(Self {
            slave,
            transport,
            model,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: DeviceMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Poll the drive: monitoring block, then status, then issue.
    ///
    /// The new state is committed only when all three reads and both code decodes succeed;
    /// on any error the previously committed state is left as it was.
    pub fn update(&mut self) -> Result<()> {
        match self.poll() {
            Ok(next) => {
                self.model.state = next;
                if let Some(m) = &self.metrics {
                    m.polls_ok.inc();
                }
                Ok(())
            }
            Err(e) => {
                warn!(slave = self.slave.raw(), error = %e, "vfd poll failed");
                if let Some(m) = &self.metrics {
                    m.poll_failures.inc();
                }
                Err(e)
            }
        }
    }

    fn poll(&mut self) -> Result<DeviceState> {
        let map = *self.model.register_map();
        let mut buf = [0u16; MONITORING_CAPACITY];
        let block = &mut buf[..usize::from(map.monitoring_len)];
        self.transport
            .read_block(self.slave, map.monitoring_address, block)?;
        debug!(slave = self.slave.raw(), ?block, "monitoring block");

        let mut next = self.model.state;
        decode_monitoring(block, &mut next);

        let raw_status = self.transport.read_single(self.slave, map.status_address)?;
        next.status = Status::try_from(raw_status)?;

        let raw_issue = self.transport.read_single(self.slave, map.issue_address)?;
        next.issue = Issue::try_from(raw_issue)?;

        next.updated_at = Some(OffsetDateTime::now_utc());
        debug!(
            slave = self.slave.raw(),
            status = next.status.as_str(),
            issue = next.issue.as_str(),
            "status registers"
        );
        Ok(next)
    }

    /// Write a frequency set-point in percent of maximum frequency (0.00..=100.00).
    ///
    /// Out-of-range input is rejected before any bus access. The cached reference frequency
    /// only changes on the next [`VfdController::update`].
    pub fn set_running_frequency(&mut self, percent: f32) -> Result<()> {
        let raw = percent_to_raw(percent)?;
        let addr = self.model.register_map().freq_address;
        debug!(slave = self.slave.raw(), addr, raw, "writing frequency set-point");
        if let Err(e) = self.transport.write_single(self.slave, addr, raw) {
            warn!(slave = self.slave.raw(), addr, error = %e, "set-point write failed");
            return Err(VfdError::ModbusFailure(e));
        }
        if let Some(m) = &self.metrics {
            m.freq_writes.inc();
        }
        Ok(())
    }

    pub fn slave(&self) -> SlaveAddress {
        self.slave
    }

    pub fn register_map(&self) -> &RegisterMap {
        self.model.register_map()
    }

    pub fn state(&self) -> &DeviceState {
        self.model.state()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}

impl<T> Telemetry for VfdController<T> {
    fn running_freq(&self) -> f32 {
        self.model.state().running_freq()
    }

    fn reference_freq(&self) -> f32 {
        self.model.state().reference_freq()
    }

    fn output_current(&self) -> f32 {
        self.model.state().output_current()
    }

    fn output_voltage(&self) -> u16 {
        self.model.state().output_voltage()
    }

    fn bus_line_voltage(&self) -> f32 {
        self.model.state().bus_line_voltage()
    }

    fn status(&self) -> Status {
        self.model.state().status()
    }

    fn issue(&self) -> Issue {
        self.model.state().issue()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CodeRegister, MetricsHub};
    use register_transport::{MockTransport, Operation, TransportError};

    const MONITOR: [u16; 5] = [1500, 1200, 250, 380, 5400];

    fn drive() -> MockTransport {
        let map = RegisterMap::delixi();
        let mut bus = MockTransport::new();
        bus.set_registers(map.monitoring_address, &MONITOR);
        bus.set_register(map.status_address, 1);
        bus.set_register(map.issue_address, 0);
        bus
    }

    #[test]
    fn test_new_touches_no_bus() -> anyhow::Result<()> {
        let mut bus = drive();
        let ctl = VfdController::new(1, &mut bus, RegisterMap::delixi())?;
        assert_eq!(ctl.slave().raw(), 1);
        drop(ctl);
        assert!(bus.calls().is_empty());
        Ok(())
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(matches!(
            VfdController::new(0, drive(), RegisterMap::delixi()),
            Err(VfdError::InvalidArgument(_))
        ));
        assert!(matches!(
            VfdController::new(248, drive(), RegisterMap::delixi()),
            Err(VfdError::InvalidArgument(_))
        ));
        let map = RegisterMap {
            monitoring_len: 6,
            ..RegisterMap::delixi()
        };
        assert!(matches!(
            VfdController::new(1, drive(), map),
            Err(VfdError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_never_updated_controller_reads_defaults() -> anyhow::Result<()> {
        let ctl = VfdController::new(1, drive(), RegisterMap::delixi())?;
        assert_eq!(ctl.running_freq(), 0.0);
        assert_eq!(ctl.reference_freq(), 0.0);
        assert_eq!(ctl.output_current(), 0.0);
        assert_eq!(ctl.output_voltage(), 0);
        assert_eq!(ctl.bus_line_voltage(), 0.0);
        assert_eq!(ctl.status(), Status::None);
        assert_eq!(ctl.issue(), Issue::NoFault);
        assert!(!ctl.state().is_updated());

        let absent: Option<&VfdController<MockTransport>> = None;
        assert_eq!(absent.running_freq(), 0.0);
        assert_eq!(absent.output_voltage(), 0);
        assert_eq!(absent.status(), Status::None);
        assert_eq!(absent.issue(), Issue::NoFault);
        assert_eq!(absent.status_string(), "None");
        Ok(())
    }

    #[test]
    fn test_update_decodes_monitoring_and_codes() -> anyhow::Result<()> {
        let mut ctl = VfdController::new(3, drive(), RegisterMap::delixi())?;
        ctl.update()?;
        assert_eq!(ctl.running_freq(), 15.0);
        assert_eq!(ctl.reference_freq(), 12.0);
        assert_eq!(ctl.output_current(), 2.5);
        assert_eq!(ctl.output_voltage(), 380);
        assert_eq!(ctl.bus_line_voltage(), 540.0);
        assert_eq!(ctl.status(), Status::ForwardRun);
        assert_eq!(ctl.issue(), Issue::NoFault);
        assert_eq!(ctl.status_string(), "Forward Run");
        assert_eq!(ctl.issue_string(), "No fault");
        assert!(ctl.state().is_updated());

        let present = Some(&ctl);
        assert_eq!(present.running_freq(), 15.0);
        Ok(())
    }

    #[test]
    fn test_update_issues_three_transactions_in_order() -> anyhow::Result<()> {
        let mut ctl = VfdController::new(9, drive(), RegisterMap::delixi())?;
        ctl.update()?;
        let calls = ctl.transport().calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].op, Operation::ReadBlock);
        assert_eq!(calls[0].addr, 0x9000);
        assert_eq!(calls[0].len, 5);
        assert_eq!(calls[1].op, Operation::ReadSingle);
        assert_eq!(calls[1].addr, 0xB000);
        assert_eq!(calls[2].op, Operation::ReadSingle);
        assert_eq!(calls[2].addr, 0xB001);
        assert!(calls.iter().all(|c| c.slave.raw() == 9));
        Ok(())
    }

    #[test]
    fn test_failed_block_read_leaves_state_unchanged() -> anyhow::Result<()> {
        let mut ctl = VfdController::new(1, drive(), RegisterMap::delixi())?;
        ctl.update()?;
        let before = *ctl.state();

        ctl.transport_mut().set_registers(0x9000, &[1, 2, 3, 4, 5]);
        ctl.transport_mut()
            .fail_on(Operation::ReadBlock, TransportError::Timeout);
        ctl.transport_mut().clear_calls();
        let err = ctl.update();
        assert!(matches!(
            err,
            Err(VfdError::ModbusFailure(TransportError::Timeout))
        ));
        assert_eq!(*ctl.state(), before);
        // Short-circuits after the first failure
        assert_eq!(ctl.transport().calls().len(), 1);
        Ok(())
    }

    #[test]
    fn test_failed_status_read_commits_nothing() -> anyhow::Result<()> {
        let mut ctl = VfdController::new(1, drive(), RegisterMap::delixi())?;
        ctl.update()?;
        let before = *ctl.state();

        ctl.transport_mut().set_registers(0x9000, &[3000, 3000, 500, 400, 5600]);
        ctl.transport_mut()
            .fail_on(Operation::ReadSingle, TransportError::Io("line noise".into()));
        assert!(matches!(ctl.update(), Err(VfdError::ModbusFailure(_))));
        assert_eq!(*ctl.state(), before);
        assert_eq!(ctl.running_freq(), 15.0);
        Ok(())
    }

    #[test]
    fn test_failed_issue_read_commits_nothing() -> anyhow::Result<()> {
        let mut ctl = VfdController::new(1, drive(), RegisterMap::delixi())?;
        ctl.update()?;
        let before = *ctl.state();

        // Fresh monitoring and status values, but no issue register
        let mut bus = MockTransport::new();
        bus.set_registers(0x9000, &[3000, 3000, 500, 400, 5600]);
        bus.set_register(0xB000, 2);
        *ctl.transport_mut() = bus;

        assert!(matches!(
            ctl.update(),
            Err(VfdError::ModbusFailure(TransportError::Exception { slave: 1, .. }))
        ));
        assert_eq!(*ctl.state(), before);
        assert_eq!(ctl.status(), Status::ForwardRun);
        let calls = ctl.transport().calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2].addr, 0xB001);
        Ok(())
    }

    #[test]
    fn test_into_transport_returns_bus_with_writes() -> anyhow::Result<()> {
        let mut ctl = VfdController::new(2, drive(), RegisterMap::delixi())?;
        ctl.set_running_frequency(50.0)?;
        let bus = ctl.into_transport();
        assert_eq!(bus.register(0xA001), Some(5000));
        assert_eq!(bus.calls().len(), 1);
        Ok(())
    }

    #[test]
    fn test_boxed_transport_polls() -> anyhow::Result<()> {
        let boxed: Box<dyn RegisterTransport> = Box::new(drive());
        let mut ctl = VfdController::new(1, boxed, RegisterMap::delixi())?;
        ctl.update()?;
        assert_eq!(ctl.running_freq(), 15.0);
        assert_eq!(ctl.status(), Status::ForwardRun);
        Ok(())
    }

    #[test]
    fn test_out_of_range_status_is_decode_error() -> anyhow::Result<()> {
        let mut ctl = VfdController::new(1, drive(), RegisterMap::delixi())?;
        ctl.update()?;
        let before = *ctl.state();

        ctl.transport_mut().set_register(0xB000, 4);
        assert!(matches!(
            ctl.update(),
            Err(VfdError::DecodeError {
                register: CodeRegister::Status,
                raw: 4
            })
        ));
        assert_eq!(*ctl.state(), before);
        assert_eq!(ctl.status_string(), "Forward Run");
        Ok(())
    }

    #[test]
    fn test_out_of_range_issue_is_decode_error() -> anyhow::Result<()> {
        let mut bus = drive();
        bus.set_register(0xB001, 200);
        let mut ctl = VfdController::new(1, bus, RegisterMap::delixi())?;
        assert!(matches!(
            ctl.update(),
            Err(VfdError::DecodeError {
                register: CodeRegister::Issue,
                raw: 200
            })
        ));
        assert!(!ctl.state().is_updated());
        assert_eq!(ctl.issue(), Issue::NoFault);
        Ok(())
    }

    #[test]
    fn test_fault_code_is_reported() -> anyhow::Result<()> {
        let mut bus = drive();
        bus.set_register(0xB000, 3);
        bus.set_register(0xB001, 8);
        let mut ctl = VfdController::new(1, bus, RegisterMap::delixi())?;
        ctl.update()?;
        assert_eq!(ctl.status(), Status::Stop);
        assert_eq!(ctl.issue(), Issue::Undervoltage);
        assert_eq!(ctl.issue_string(), "Undervoltage");
        Ok(())
    }

    #[test]
    fn test_short_monitoring_block_keeps_uncovered_fields() -> anyhow::Result<()> {
        let map = RegisterMap {
            monitoring_len: 2,
            ..RegisterMap::delixi()
        };
        let mut ctl = VfdController::new(1, drive(), map)?;
        ctl.update()?;
        assert_eq!(ctl.running_freq(), 15.0);
        assert_eq!(ctl.reference_freq(), 12.0);
        assert_eq!(ctl.output_current(), 0.0);
        assert_eq!(ctl.output_voltage(), 0);
        assert_eq!(ctl.transport().calls()[0].len, 2);
        Ok(())
    }

    #[test]
    fn test_set_running_frequency_writes_scaled_value() -> anyhow::Result<()> {
        let mut bus = drive();
        {
            let mut ctl = VfdController::new(5, &mut bus, RegisterMap::delixi())?;
            ctl.set_running_frequency(37.5)?;
            assert_eq!(ctl.reference_freq(), 0.0);
        }
        assert_eq!(bus.register(0xA001), Some(3750));
        let calls = bus.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].op, Operation::WriteSingle);
        assert_eq!(calls[0].slave.raw(), 5);
        Ok(())
    }

    #[test]
    fn test_set_running_frequency_bounds() -> anyhow::Result<()> {
        let mut ctl = VfdController::new(1, drive(), RegisterMap::delixi())?;
        ctl.set_running_frequency(0.0)?;
        assert_eq!(ctl.transport().register(0xA001), Some(0));
        ctl.set_running_frequency(100.0)?;
        assert_eq!(ctl.transport().register(0xA001), Some(10_000));
        ctl.transport_mut().clear_calls();

        for bad in [-0.5, 100.01, f32::NAN] {
            assert!(matches!(
                ctl.set_running_frequency(bad),
                Err(VfdError::OutOfRange(_))
            ));
        }
        assert!(ctl.transport().calls().is_empty());
        Ok(())
    }

    #[test]
    fn test_set_running_frequency_transport_failure() -> anyhow::Result<()> {
        let mut ctl = VfdController::new(1, drive(), RegisterMap::delixi())?;
        ctl.transport_mut().fail_on(
            Operation::WriteSingle,
            TransportError::Exception { slave: 1, code: 4 },
        );
        assert!(matches!(
            ctl.set_running_frequency(50.0),
            Err(VfdError::ModbusFailure(TransportError::Exception { .. }))
        ));
        Ok(())
    }

    #[test]
    fn test_metrics_track_polls_and_writes() -> anyhow::Result<()> {
        let hub = MetricsHub::new()?;
        let mut ctl =
            VfdController::new(1, drive(), RegisterMap::delixi())?.with_metrics(hub.dev.clone());
        ctl.update()?;
        ctl.update()?;
        ctl.transport_mut()
            .fail_on(Operation::ReadBlock, TransportError::Timeout);
        assert!(ctl.update().is_err());
        ctl.set_running_frequency(20.0)?;
        assert_eq!(hub.dev.polls_ok.get(), 2);
        assert_eq!(hub.dev.poll_failures.get(), 1);
        assert_eq!(hub.dev.freq_writes.get(), 1);
        Ok(())
    }
}
