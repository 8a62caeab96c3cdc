use core::fmt;

/// Holding-register address on the slave device.
pub type RegisterAddr = u16;

/// Bus-level identifier of a unicast slave (1..=247).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SlaveAddress(u8);

impl SlaveAddress {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 247;

    /// Returns `None` for the broadcast address (0) and the reserved range above 247.
    pub fn new(raw: u8) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&raw) {
            Some(Self(raw))
        } else {
            None
        }
    }

    pub fn raw(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for SlaveAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{raw}", raw = self.0)
    }
}
