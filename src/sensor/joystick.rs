/*
 *  sensor/joystick.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Linux joystick API (/dev/input/js*) backend
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

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use log::debug;

use super::{AxisEvent, DeviceError, SensorDevice};

// linux/joystick.h
pub const JS_EVENT_BUTTON: u8 = 0x01;
pub const JS_EVENT_AXIS: u8 = 0x02;
pub const JS_EVENT_INIT: u8 = 0x80;
pub const JS_CORR_NONE: u16 = 0x00;

const JS_EVENT_SIZE: usize = 8;
const NAME_LEN: usize = 128;

const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;

const fn ioc(dir: u32, nr: u32, size: usize) -> u32 {
    (dir << 30) | ((size as u32) << 16) | ((b'j' as u32) << 8) | nr
}

pub const JSIOCGAXES: u32 = ioc(IOC_READ, 0x11, 1);
pub const JSIOCGBUTTONS: u32 = ioc(IOC_READ, 0x12, 1);
pub const JSIOCSCORR: u32 = ioc(IOC_WRITE, 0x21, std::mem::size_of::<JsCorr>());

pub const fn jsiocgname(len: usize) -> u32 {
    ioc(IOC_READ, 0x13, len)
}

/// struct js_corr
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsCorr {
    pub coef: [i32; 8],
    pub prec: i16,
    pub kind: u16,
}

/// struct js_event, decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsEvent {
    pub time: u32,
    pub value: i16,
    pub kind: u8,
    pub number: u8,
}

impl JsEvent {
    pub fn from_bytes(buf: &[u8; JS_EVENT_SIZE]) -> Self {
        Self {
            time: u32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]]),
            value: i16::from_ne_bytes([buf[4], buf[5]]),
            kind: buf[6],
            number: buf[7],
        }
    }

    /// Axis reports, including the synthetic initial-state ones, become events.
    pub fn to_axis_event(self) -> Option<AxisEvent> {
        if self.kind & !JS_EVENT_INIT == JS_EVENT_AXIS {
            Some(AxisEvent { axis: self.number, value: self.value as i32 })
        } else {
            None
        }
    }
}

pub struct JoystickDevice {
    file: File,
    path: PathBuf,
    name: String,
    axes: u8,
    buttons: u8,
}

impl JoystickDevice {
    /// Open the node non-blocking and query its geometry.
    pub fn open(path: &Path) -> Result<Self, DeviceError> {
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|source| DeviceError::NotFound { path: path.to_path_buf(), source })?;

        let mut dev = Self {
            file,
            path: path.to_path_buf(),
            name: String::new(),
            axes: 0,
            buttons: 0,
        };
        dev.axes = dev.query_u8(JSIOCGAXES).map_err(DeviceError::Query)?;
        dev.buttons = dev.query_u8(JSIOCGBUTTONS).map_err(DeviceError::Query)?;
        dev.name = dev.query_name().unwrap_or_else(|_| "Unknown".to_string());
        debug!("{}: {} axes, {} buttons", dev.path.display(), dev.axes, dev.buttons);
        Ok(dev)
    }

    fn query_u8(&self, request: u32) -> io::Result<u8> {
        let mut out: u8 = 0;
        // Safety: the request writes exactly one byte into `out`.
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, &mut out as *mut u8) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(out)
    }

    fn query_name(&self) -> io::Result<String> {
        let mut buf = [0u8; NAME_LEN];
        // Safety: the kernel writes at most NAME_LEN bytes, as encoded in the request.
        let rc = unsafe {
            libc::ioctl(self.file.as_raw_fd(), jsiocgname(NAME_LEN) as _, buf.as_mut_ptr())
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        let end = buf.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
    }
}

impl SensorDevice for JoystickDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn axis_count(&self) -> u8 {
        self.axes
    }

    fn button_count(&self) -> u8 {
        self.buttons
    }

    fn set_raw_mode(&mut self) -> Result<(), DeviceError> {
        // the driver copies one js_corr per axis
        let mut corr = vec![
            JsCorr { coef: [0; 8], prec: 0, kind: JS_CORR_NONE };
            usize::from(self.axes.max(1))
        ];
        // Safety: `corr` holds one js_corr for every axis the device reported.
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), JSIOCSCORR as _, corr.as_mut_ptr()) };
        if rc < 0 {
            return Err(DeviceError::Calibration {
                name: self.name.clone(),
                source: io::Error::last_os_error(),
            });
        }
        Ok(())
    }

    fn read_event_nonblocking(&mut self) -> Result<Option<AxisEvent>, DeviceError> {
        let mut buf = [0u8; JS_EVENT_SIZE];
        match self.file.read(&mut buf) {
            Ok(JS_EVENT_SIZE) => Ok(JsEvent::from_bytes(&buf).to_axis_event()),
            // short read, nothing usable
            Ok(_) => Ok(None),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => Ok(None),
            Err(e) => Err(DeviceError::Read(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(time: u32, value: i16, kind: u8, number: u8) -> [u8; JS_EVENT_SIZE] {
        let mut b = [0u8; JS_EVENT_SIZE];
        b[0..4].copy_from_slice(&time.to_ne_bytes());
        b[4..6].copy_from_slice(&value.to_ne_bytes());
        b[6] = kind;
        b[7] = number;
        b
    }

    #[test]
    fn test_ioctl_numbers() {
        assert_eq!(std::mem::size_of::<JsCorr>(), 36);
        assert_eq!(JSIOCGAXES, 0x8001_6a11);
        assert_eq!(JSIOCGBUTTONS, 0x8001_6a12);
        assert_eq!(JSIOCSCORR, 0x4024_6a21);
        assert_eq!(jsiocgname(128), 0x8080_6a13);
    }

    #[test]
    fn test_axis_event_decoded() {
        let ev = JsEvent::from_bytes(&raw(1234, -512, JS_EVENT_AXIS, 1));
        assert_eq!(ev.time, 1234);
        assert_eq!(ev.to_axis_event(), Some(AxisEvent { axis: 1, value: -512 }));
    }

    #[test]
    fn test_init_axis_event_kept() {
        let ev = JsEvent::from_bytes(&raw(0, 77, JS_EVENT_AXIS | JS_EVENT_INIT, 2));
        assert_eq!(ev.to_axis_event(), Some(AxisEvent { axis: 2, value: 77 }));
    }

    #[test]
    fn test_button_event_ignored() {
        let ev = JsEvent::from_bytes(&raw(0, 1, JS_EVENT_BUTTON, 0));
        assert_eq!(ev.to_axis_event(), None);
        let ev = JsEvent::from_bytes(&raw(0, 1, JS_EVENT_BUTTON | JS_EVENT_INIT, 0));
        assert_eq!(ev.to_axis_event(), None);
    }

    #[test]
    fn test_missing_node() {
        let err = JoystickDevice::open(Path::new("/nonexistent/js0")).err().unwrap();
        assert!(matches!(err, DeviceError::NotFound { .. }));
        assert!(err.to_string().starts_with("Sensor not found"));
    }

    #[test]
    fn test_regular_file_is_not_a_joystick() {
        // open succeeds but the geometry query is rejected
        let path = std::env::temp_dir().join(format!("memstrip-js-{}", std::process::id()));
        std::fs::write(&path, [0u8; 16]).unwrap();
        let res = JoystickDevice::open(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(res, Err(DeviceError::Query(_))));
    }
}
