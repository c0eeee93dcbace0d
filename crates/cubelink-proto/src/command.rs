//! Outbound commands.
//!
//! The command channel carries a single byte per command with no prefix,
//! length, checksum or suffix.

use bytes::Bytes;

/// Commands the cube accepts on its write characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Ask for a battery notification.
    GetBattery = 0x32,
    /// Ask for a full state notification.
    GetState = 0x33,
    /// Reboot the cube.
    Reboot = 0x34,
    /// Reset the cube's internal state to solved.
    ResetToSolved = 0x35,
    /// Stop streaming orientation.
    DisableOrientation = 0x37,
    /// Start streaming orientation.
    EnableOrientation = 0x38,
    /// Ask for offline statistics.
    GetOfflineStats = 0x39,
    /// Flash the LEDs at normal speed.
    FlashLed = 0x41,
    /// Toggle the animated backlight.
    ToggleAnimatedBacklight = 0x42,
    /// Flash the LEDs slowly.
    FlashLedSlow = 0x43,
    /// Toggle the backlight.
    ToggleBacklight = 0x44,
    /// Ask for the hardware variant.
    GetCubeType = 0x56,
    /// Recalibrate the orientation sensor.
    CalibrateOrientation = 0x57,
}

impl Command {
    /// Every command, in byte order.
    pub const ALL: [Self; 13] = [
        Self::GetBattery,
        Self::GetState,
        Self::Reboot,
        Self::ResetToSolved,
        Self::DisableOrientation,
        Self::EnableOrientation,
        Self::GetOfflineStats,
        Self::FlashLed,
        Self::ToggleAnimatedBacklight,
        Self::FlashLedSlow,
        Self::ToggleBacklight,
        Self::GetCubeType,
        Self::CalibrateOrientation,
    ];

    /// Command byte on the wire.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Look up a command by its byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.to_u8() == value)
    }

    /// Encoded command, ready to write.
    pub fn to_bytes(self) -> [u8; 1] {
        [self.to_u8()]
    }

    /// Short name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::GetBattery => "get-battery",
            Self::GetState => "get-state",
            Self::Reboot => "reboot",
            Self::ResetToSolved => "reset-to-solved",
            Self::DisableOrientation => "disable-orientation",
            Self::EnableOrientation => "enable-orientation",
            Self::GetOfflineStats => "get-offline-stats",
            Self::FlashLed => "flash-led",
            Self::ToggleAnimatedBacklight => "toggle-animated-backlight",
            Self::FlashLedSlow => "flash-led-slow",
            Self::ToggleBacklight => "toggle-backlight",
            Self::GetCubeType => "get-cube-type",
            Self::CalibrateOrientation => "calibrate-orientation",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Build the bytes for an outbound command.
pub fn build_command(command: Command) -> Bytes {
    Bytes::copy_from_slice(&command.to_bytes())
}
