// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Device configuration.
//!
//! Everything here is fixed at compile time. The instrument kind driven by the board binary is
//! selected with a Cargo feature (`floppies`, `buzzers`, `hard-drives`, `shifted-floppies`,
//! `shifted-buzzers`); addressing is described by [`DeviceConfig`] and passed to every
//! constructor that filters or answers messages.

/// Address shared by every device on the bus (system-wide messages).
pub const SYSTEM_ADDRESS: u8 = 0x00;

/// Tick period of the actuator timer, in microseconds.
pub const TIMER_RESOLUTION_US: u32 = 40;

/// Octaves covered by a full pitch-bend deflection (two semitones).
pub const BEND_OCTAVES: f32 = 200.0 / 1200.0;

/// Baud rate used by the Moppy controller on serial links.
pub const SERIAL_BAUD_RATE: u32 = 57_600;

/// WiFi channel shared by wireless peers and the gateway.
pub const WIFI_CHANNEL: u8 = 1;

/// Addressing for one Moppy device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Device address. Never `SYSTEM_ADDRESS`.
    pub address: u8,
    /// Lowest channel sub-address handled by this device.
    pub min_sub_address: u8,
    /// Highest channel sub-address handled by this device.
    pub max_sub_address: u8,
    /// Play a short tune after the instrument is set up.
    pub startup_sound: bool,
}

impl DeviceConfig {
    pub const fn new(address: u8, min_sub_address: u8, max_sub_address: u8) -> Self {
        Self {
            address,
            min_sub_address,
            max_sub_address,
            startup_sound: false,
        }
    }

    pub const fn with_startup_sound(mut self, enabled: bool) -> Self {
        self.startup_sound = enabled;
        self
    }

    /// True for the system address and for this device's address.
    #[inline]
    pub fn accepts_address(&self, address: u8) -> bool {
        address == SYSTEM_ADDRESS || address == self.address
    }

    /// True for 0 (the whole device) and for sub-addresses inside the configured bounds.
    #[inline]
    pub fn accepts_sub_address(&self, sub_address: u8) -> bool {
        sub_address == 0x00
            || (self.min_sub_address..=self.max_sub_address).contains(&sub_address)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DEVICE
    }
}

/// Configuration flashed onto the board.
pub const DEVICE: DeviceConfig = DeviceConfig::new(0x01, 1, 8).with_startup_sound(true);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_system_and_own_address_only() {
        let cfg = DeviceConfig::new(0x05, 1, 4);
        assert!(cfg.accepts_address(SYSTEM_ADDRESS));
        assert!(cfg.accepts_address(0x05));
        assert!(!cfg.accepts_address(0x06));
    }

    #[test]
    fn sub_address_bounds_are_inclusive() {
        let cfg = DeviceConfig::new(0x01, 2, 4);
        assert!(cfg.accepts_sub_address(0));
        assert!(!cfg.accepts_sub_address(1));
        assert!(cfg.accepts_sub_address(2));
        assert!(cfg.accepts_sub_address(4));
        assert!(!cfg.accepts_sub_address(5));
    }
}
