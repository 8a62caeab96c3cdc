use crate::{RegisterAddr, RegisterTransport, Result, SlaveAddress, TransportError};
use std::collections::BTreeMap;
use tracing::trace;

/// Modbus exception code for an address the slave does not expose.
const ILLEGAL_DATA_ADDRESS: u8 = 0x02;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    ReadSingle,
    ReadBlock,
    WriteSingle,
    WriteBlock,
}

/// One recorded call into the mock, failed or not.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportCall {
    pub op: Operation,
    pub slave: SlaveAddress,
    pub addr: RegisterAddr,
    pub len: usize,
}

/// A simple in-process register bank standing in for a slave device.
///
/// Reads of addresses that were never set or written fail with an illegal-data-address
/// exception, like a real slave would. Failures can be injected per operation.
#[derive(Debug, Default)]
pub struct MockTransport {
    registers: BTreeMap<RegisterAddr, u16>,
    failures: Vec<(Operation, TransportError)>,
    calls: Vec<TransportCall>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_register(&mut self, addr: RegisterAddr, value: u16) {
        self.registers.insert(addr, value);
    }

    /// Preload consecutive registers starting at `addr`. Values past 0xFFFF are dropped.
    pub fn set_registers(&mut self, addr: RegisterAddr, values: &[u16]) {
        for (offset, value) in values.iter().enumerate() {
            let Some(target) = u16::try_from(offset)
                .ok()
                .and_then(|o| addr.checked_add(o))
            else {
                break;
            };
            self.registers.insert(target, *value);
        }
    }

    pub fn register(&self, addr: RegisterAddr) -> Option<u16> {
        self.registers.get(&addr).copied()
    }

    /// Make every subsequent `op` fail with `err` until [`MockTransport::clear_failures`].
    pub fn fail_on(&mut self, op: Operation, err: TransportError) {
        self.failures.retain(|(o, _)| *o != op);
        self.failures.push((op, err));
    }

    pub fn clear_failures(&mut self) {
        self.failures.clear();
    }

    pub fn calls(&self) -> &[TransportCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, op: Operation, slave: SlaveAddress, addr: RegisterAddr, len: usize) {
        trace!(?op, slave = slave.raw(), addr, len, "mock transport call");
        self.calls.push(TransportCall {
            op,
            slave,
            addr,
            len,
        });
    }

    fn injected(&self, op: Operation) -> Result<()> {
        match self.failures.iter().find(|(o, _)| *o == op) {
            Some((_, err)) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn lookup(&self, slave: SlaveAddress, addr: RegisterAddr) -> Result<u16> {
        self.registers
            .get(&addr)
            .copied()
            .ok_or(TransportError::Exception {
                slave: slave.raw(),
                code: ILLEGAL_DATA_ADDRESS,
            })
    }
}

impl RegisterTransport for MockTransport {
    fn read_single(&mut self, slave: SlaveAddress, addr: RegisterAddr) -> Result<u16> {
        self.record(Operation::ReadSingle, slave, addr, 1);
        self.injected(Operation::ReadSingle)?;
        self.lookup(slave, addr)
    }

    fn read_block(
        &mut self,
        slave: SlaveAddress,
        addr: RegisterAddr,
        buf: &mut [u16],
    ) -> Result<()> {
        self.record(Operation::ReadBlock, slave, addr, buf.len());
        self.injected(Operation::ReadBlock)?;
        if usize::from(addr) + buf.len() > usize::from(u16::MAX) + 1 {
            return Err(TransportError::InvalidResponse("block crosses end of address space"));
        }
        // Resolve everything first so a failed read leaves `buf` untouched
        let mut staged = Vec::with_capacity(buf.len());
        for offset in 0..buf.len() {
            staged.push(self.lookup(slave, addr + offset as u16)?);
        }
        buf.copy_from_slice(&staged);
        Ok(())
    }

    fn write_single(
        &mut self,
        slave: SlaveAddress,
        addr: RegisterAddr,
        value: u16,
    ) -> Result<()> {
        self.record(Operation::WriteSingle, slave, addr, 1);
        self.injected(Operation::WriteSingle)?;
        self.registers.insert(addr, value);
        Ok(())
    }

    fn write_block(
        &mut self,
        slave: SlaveAddress,
        addr: RegisterAddr,
        values: &[u16],
    ) -> Result<()> {
        self.record(Operation::WriteBlock, slave, addr, values.len());
        self.injected(Operation::WriteBlock)?;
        if usize::from(addr) + values.len() > usize::from(u16::MAX) + 1 {
            return Err(TransportError::InvalidResponse("block crosses end of address space"));
        }
        self.set_registers(addr, values);
        Ok(())
    }
}
