/*
 *  sensor/mod.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Input device abstraction for the motion sensor
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

pub mod joystick;
pub mod synthetic;

use std::io;
use std::path::PathBuf;

use log::info;
use thiserror::Error;

use crate::channel::Channel;
use crate::config::DeviceConfig;

pub use joystick::JoystickDevice;
pub use synthetic::SyntheticDevice;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Sensor not found at {}: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error setting correction for {name}: {source}")]
    Calibration {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("device query failed: {0}")]
    Query(#[source] io::Error),
    #[error("device read failed: {0}")]
    Read(#[source] io::Error),
}

/// One complete axis report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisEvent {
    pub axis: u8,
    pub value: i32,
}

impl AxisEvent {
    /// The channel this axis feeds, if it is one we display.
    pub fn channel(&self) -> Option<Channel> {
        Channel::from_index(self.axis as usize)
    }
}

/// What the device reported about itself when opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub axes: u8,
    pub buttons: u8,
}

/// Minimal surface every sensor source must provide.
pub trait SensorDevice: Send {
    /// Human readable device name
    fn name(&self) -> &str;

    fn axis_count(&self) -> u8;

    fn button_count(&self) -> u8;

    /// Turn off any kernel-side correction so raw readings pass through
    fn set_raw_mode(&mut self) -> Result<(), DeviceError>;

    /// Read at most one event without blocking.
    ///
    /// `Ok(None)` means nothing complete was available (or the event was not
    /// an axis report) and is the normal idle condition.
    fn read_event_nonblocking(&mut self) -> Result<Option<AxisEvent>, DeviceError>;

    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            name: self.name().to_string(),
            axes: self.axis_count(),
            buttons: self.button_count(),
        }
    }
}

pub type BoxedDevice = Box<dyn SensorDevice>;

/// Open the configured source. The synthetic generator is only used when
/// asked for; a missing sensor is an error.
pub fn open_device(cfg: &DeviceConfig) -> Result<BoxedDevice, DeviceError> {
    if cfg.simulate {
        let device = match cfg.seed {
            Some(seed) => SyntheticDevice::with_seed(seed),
            None => SyntheticDevice::new(),
        };
        // pass it back with --seed to replay the same motion
        info!("simulated sensor, seed {}", device.seed());
        return Ok(Box::new(device));
    }
    Ok(Box::new(JoystickDevice::open(&cfg.path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_event_channel() {
        assert_eq!(AxisEvent { axis: 0, value: 1 }.channel(), Some(Channel::NorthSouth));
        assert_eq!(AxisEvent { axis: 2, value: 1 }.channel(), Some(Channel::UpDown));
        assert_eq!(AxisEvent { axis: 3, value: 1 }.channel(), None);
    }

    #[test]
    fn test_open_simulated() {
        let cfg = DeviceConfig { simulate: true, seed: Some(7), ..DeviceConfig::default() };
        let dev = open_device(&cfg).unwrap();
        let info = dev.info();
        assert_eq!(info.axes, 3);
        assert_eq!(info.buttons, 0);
    }

    #[test]
    fn test_open_missing_is_not_found() {
        let cfg = DeviceConfig {
            path: PathBuf::from("/nonexistent/input/js9"),
            ..DeviceConfig::default()
        };
        match open_device(&cfg) {
            Err(DeviceError::NotFound { path, .. }) => assert_eq!(path, cfg.path),
            other => panic!("expected NotFound, got {:?}", other.map(|d| d.info())),
        }
    }
}
