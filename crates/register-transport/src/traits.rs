use crate::{RegisterAddr, Result, SlaveAddress};

/// A minimal blocking holding-register interface.
///
/// Every call returns only after the backend has finished the bus transaction (or given up).
/// Timeouts and retries are the backend's concern.
pub trait RegisterTransport {
    /// Read one holding register.
    fn read_single(&mut self, slave: SlaveAddress, addr: RegisterAddr) -> Result<u16>;

    /// Read `buf.len()` consecutive holding registers starting at `addr`, in ascending
    /// address order.
    fn read_block(
        &mut self,
        slave: SlaveAddress,
        addr: RegisterAddr,
        buf: &mut [u16],
    ) -> Result<()>;

    /// Write one holding register.
    fn write_single(&mut self, slave: SlaveAddress, addr: RegisterAddr, value: u16)
        -> Result<()>;

    /// Write `values` to consecutive holding registers starting at `addr`.
    fn write_block(
        &mut self,
        slave: SlaveAddress,
        addr: RegisterAddr,
        values: &[u16],
    ) -> Result<()>;
}

// Lets a controller borrow a transport the caller keeps owning.
impl<T: RegisterTransport + ?Sized> RegisterTransport for &mut T {
    fn read_single(&mut self, slave: SlaveAddress, addr: RegisterAddr) -> Result<u16> {
        (**self).read_single(slave, addr)
    }

    fn read_block(
        &mut self,
        slave: SlaveAddress,
        addr: RegisterAddr,
        buf: &mut [u16],
    ) -> Result<()> {
        (**self).read_block(slave, addr, buf)
    }

    fn write_single(
        &mut self,
        slave: SlaveAddress,
        addr: RegisterAddr,
        value: u16,
    ) -> Result<()> {
        (**self).write_single(slave, addr, value)
    }

    fn write_block(
        &mut self,
        slave: SlaveAddress,
        addr: RegisterAddr,
        values: &[u16],
    ) -> Result<()> {
        (**self).write_block(slave, addr, values)
    }
}

impl<T: RegisterTransport + ?Sized> RegisterTransport for Box<T> {
    fn read_single(&mut self, slave: SlaveAddress, addr: RegisterAddr) -> Result<u16> {
        (**self).read_single(slave, addr)
    }

    fn read_block(
        &mut self,
        slave: SlaveAddress,
        addr: RegisterAddr,
        buf: &mut [u16],
    ) -> Result<()> {
        (**self).read_block(slave, addr, buf)
    }

    fn write_single(
        &mut self,
        slave: SlaveAddress,
        addr: RegisterAddr,
        value: u16,
    ) -> Result<()> {
        (**self).write_single(slave, addr, value)
    }

    fn write_block(
        &mut self,
        slave: SlaveAddress,
        addr: RegisterAddr,
        values: &[u16],
    ) -> Result<()> {
        (**self).write_block(slave, addr, values)
    }
}
