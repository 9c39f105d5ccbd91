//! GPIO output pins for the relay board.
//!
//! Two flavours behind one [`GpioPin`] type so the controller stays
//! monomorphic:
//!
//! - [`SysfsPin`] drives a real line through the Linux sysfs GPIO
//!   interface (`/sys/class/gpio`). The line is exported and switched to
//!   output on open, and switched back to input on drop so the relays float
//!   off if the process dies mid-move.
//! - [`SimulatedPin`] drives nothing and logs level changes instead. Used
//!   when `gpio.enabled` is false or `--simulate-gpio` is given.
//!
//! Both speak logical levels: high means "relay on". Active-low boards are
//! handled by the kernel via the sysfs `active_low` attribute.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use embedded_hal::digital::{ErrorType, OutputPin};
use log::{debug, info, warn};

use crate::config::GpioSettings;
use crate::error::GpioError;

/// Default sysfs GPIO root.
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

// ── Sysfs ─────────────────────────────────────────────────────

/// One exported sysfs GPIO line configured as an output.
pub struct SysfsPin {
    number: u32,
    dir: PathBuf,
    value: File,
}

impl SysfsPin {
    /// Export `number` under the default sysfs root.
    pub fn open(number: u32, active_low: bool) -> Result<Self, GpioError> {
        Self::open_in(Path::new(SYSFS_GPIO_ROOT), number, active_low)
    }

    /// Export `number` under `root` and drive it off.
    pub fn open_in(root: &Path, number: u32, active_low: bool) -> Result<Self, GpioError> {
        let dir = root.join(format!("gpio{number}"));
        if !dir.exists() {
            fs::write(root.join("export"), number.to_string())
                .map_err(|_| GpioError::Export(number))?;
        }

        fs::write(dir.join("active_low"), if active_low { "1" } else { "0" })
            .map_err(|_| GpioError::Direction(number))?;
        // "high"/"low" set the raw level, which `active_low` does not invert.
        let off = if active_low { "high" } else { "low" };
        fs::write(dir.join("direction"), off).map_err(|_| GpioError::Direction(number))?;

        let value = OpenOptions::new()
            .write(true)
            .open(dir.join("value"))
            .map_err(|_| GpioError::Write(number))?;

        debug!("GPIO {number}: exported as output (active_low={active_low})");
        Ok(Self { number, dir, value })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    fn write_level(&mut self, high: bool) -> Result<(), GpioError> {
        self.value
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.value.write_all(if high { b"1" } else { b"0" }))
            .map_err(|_| GpioError::Write(self.number))
    }
}

impl Drop for SysfsPin {
    fn drop(&mut self) {
        if let Err(e) = fs::write(self.dir.join("direction"), "in") {
            warn!("GPIO {}: could not revert to input: {e}", self.number);
        }
    }
}

impl ErrorType for SysfsPin {
    type Error = GpioError;
}

impl OutputPin for SysfsPin {
    fn set_low(&mut self) -> Result<(), GpioError> {
        self.write_level(false)
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        self.write_level(true)
    }
}

// ── Simulated ─────────────────────────────────────────────────

/// Stand-in pin that only logs. Remembers its level so repeated writes of
/// the same level stay quiet.
#[derive(Debug)]
pub struct SimulatedPin {
    number: u32,
    level: Option<bool>,
}

impl SimulatedPin {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            level: None,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Last level written, `None` before the first write.
    pub fn level(&self) -> Option<bool> {
        self.level
    }

    fn write_level(&mut self, high: bool) {
        if self.level != Some(high) {
            info!(
                "Would have set GPIO {} {}",
                self.number,
                if high { "on" } else { "off" }
            );
            self.level = Some(high);
        }
    }
}

impl ErrorType for SimulatedPin {
    type Error = GpioError;
}

impl OutputPin for SimulatedPin {
    fn set_low(&mut self) -> Result<(), GpioError> {
        self.write_level(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        self.write_level(true);
        Ok(())
    }
}

// ── Either ────────────────────────────────────────────────────

/// A relay output, real or simulated.
pub enum GpioPin {
    Sysfs(SysfsPin),
    Simulated(SimulatedPin),
}

impl GpioPin {
    /// Open `number` as an output according to `settings`.
    pub fn open(number: u32, settings: &GpioSettings) -> Result<Self, GpioError> {
        if settings.enabled {
            SysfsPin::open(number, settings.active_low).map(Self::Sysfs)
        } else {
            Ok(Self::Simulated(SimulatedPin::new(number)))
        }
    }

    pub fn number(&self) -> u32 {
        match self {
            Self::Sysfs(pin) => pin.number(),
            Self::Simulated(pin) => pin.number(),
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated(_))
    }
}

impl ErrorType for GpioPin {
    type Error = GpioError;
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), GpioError> {
        match self {
            Self::Sysfs(pin) => pin.set_low(),
            Self::Simulated(pin) => pin.set_low(),
        }
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        match self {
            Self::Sysfs(pin) => pin.set_high(),
            Self::Simulated(pin) => pin.set_high(),
        }
    }
}
