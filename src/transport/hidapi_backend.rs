//! Optional [`HidTransport`] implementation over the `hidapi` crate.
//!
//! Device enumeration and opening stay the embedder's job (§1 non-goal);
//! this just wraps an already-open [`hidapi::HidDevice`] handle.

use super::{HidTransport, REPORT_SIZE};
use crate::config::{LengthPrefixMode, TransportConfig};
use crate::error::{Error, Result};

pub struct HidApiTransport {
    device: hidapi::HidDevice,
    length_prefix: LengthPrefixMode,
    read_timeout_ms: i32,
}

impl HidApiTransport {
    pub fn new(device: hidapi::HidDevice, config: TransportConfig) -> Self {
        HidApiTransport {
            device,
            length_prefix: config.length_prefix,
            read_timeout_ms: config.read_timeout.as_millis().min(i32::MAX as u128) as i32,
        }
    }
}

impl HidTransport for HidApiTransport {
    fn write_report(&mut self, report: &[u8; REPORT_SIZE]) -> Result<()> {
        match self.length_prefix {
            LengthPrefixMode::Explicit => {
                let mut buf = Vec::with_capacity(REPORT_SIZE + 1);
                buf.push(0);
                buf.extend_from_slice(report);
                self.device.write(&buf).map_err(Error::Usb)?;
            }
            LengthPrefixMode::Implicit => {
                self.device.write(report).map_err(Error::Usb)?;
            }
        }
        Ok(())
    }

    fn read_report(&mut self) -> Result<[u8; REPORT_SIZE]> {
        let mut buf = [0u8; REPORT_SIZE];
        let n = self
            .device
            .read_timeout(&mut buf, self.read_timeout_ms)
            .map_err(Error::Usb)?;
        if n == 0 {
            return Err(Error::TransportClosed("HID read timed out with no data".into()));
        }
        Ok(buf)
    }
}
