// Copyright 2015-2017 Parity Technologies (UK) Ltd.
// This file is part of Parity.

// Parity is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// Parity is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with Parity.  If not, see <http://www.gnu.org/licenses/>.

//! HID report framing (C1): packs a `(type_tag, body)` message into
//! 64-byte HID reports and reassembles it from a stream of reports.
//!
//! See http://doc.satoshilabs.com/trezor-tech/api-protobuf.html and
//! https://github.com/trezor/trezor-common/blob/master/protob/protocol.md
//! for wire-level details.

#[cfg(feature = "hidapi-backend")]
pub mod hidapi_backend;

use crate::config::TransportConfig;
use crate::error::{Error, Result};

/// Size in bytes of a single HID report, including the report-id byte.
pub const REPORT_SIZE: usize = 64;
/// Number of payload bytes per report once the report-id byte is removed.
pub const PAYLOAD_SIZE: usize = REPORT_SIZE - 1;
/// HID report identifier used on every report in both directions.
pub const REPORT_ID: u8 = b'?';
/// Two-byte sentinel that opens every framed message.
pub const SENTINEL: [u8; 2] = [b'#', b'#'];

/// A transport capable of exchanging fixed-size HID reports with a device.
///
/// Deliberately minimal: device enumeration, opening, and raw read/write
/// primitives are a platform HID backend's job (§1 non-goals). This trait
/// is the seam an embedder's backend plugs into.
pub trait HidTransport {
    /// Write one 64-byte report (including the leading report-id byte).
    fn write_report(&mut self, report: &[u8; REPORT_SIZE]) -> Result<()>;

    /// Read one 64-byte report, blocking up to the transport's configured
    /// read timeout. Returns `Err(Error::TransportClosed)` on EOF/detach.
    fn read_report(&mut self) -> Result<[u8; REPORT_SIZE]>;
}

/// Frames and reassembles protobuf message bodies across HID reports.
pub struct Framer {
    config: TransportConfig,
}

impl Framer {
    pub fn new(config: TransportConfig) -> Self {
        Framer { config }
    }

    /// Pack `(type_tag, body)` into `##` + type_tag(be16) + size(be32) +
    /// body, zero-padded to a multiple of `PAYLOAD_SIZE`, then hand the
    /// successive reports to `transport`.
    pub fn write(
        &self,
        transport: &mut dyn HidTransport,
        type_tag: u16,
        body: &[u8],
    ) -> Result<()> {
        let mut block = Vec::with_capacity(8 + body.len());
        block.extend_from_slice(&SENTINEL);
        block.extend_from_slice(&type_tag.to_be_bytes());
        block.extend_from_slice(&(body.len() as u32).to_be_bytes());
        block.extend_from_slice(body);
        while block.len() % PAYLOAD_SIZE != 0 {
            block.push(0);
        }

        for chunk in block.chunks(PAYLOAD_SIZE) {
            let mut report = [0u8; REPORT_SIZE];
            report[0] = REPORT_ID;
            report[1..1 + chunk.len()].copy_from_slice(chunk);
            transport.write_report(&report)?;
        }
        Ok(())
    }

    /// Read reports until the `##` sentinel is found, then accumulate
    /// `body_size` bytes of payload, skipping reports that don't begin
    /// with the `?` report id.
    pub fn read(&self, transport: &mut dyn HidTransport) -> Result<(u16, Vec<u8>)> {
        let (type_tag, body_size, mut data) = loop {
            let report = transport.read_report()?;
            if report[0] != REPORT_ID {
                log::warn!("dropping HID report with unexpected report id 0x{:02x}", report[0]);
                continue;
            }
            if report[1] != SENTINEL[0] || report[2] != SENTINEL[1] {
                log::trace!("skipping pre-sentinel HID noise");
                continue;
            }
            let type_tag = u16::from_be_bytes([report[3], report[4]]);
            let body_size = u32::from_be_bytes([report[5], report[6], report[7], report[8]]) as usize;
            if body_size > self.config.max_message_size {
                return Err(Error::MalformedFrame("declared body size exceeds safety cap"));
            }
            let mut data = Vec::with_capacity(body_size);
            data.extend_from_slice(&report[9..]);
            break (type_tag, body_size, data);
        };

        while data.len() < body_size {
            if data.len() > self.config.max_message_size {
                return Err(Error::MalformedFrame("reassembly exceeded safety cap"));
            }
            let report = transport.read_report()?;
            if report[0] != REPORT_ID {
                log::warn!("dropping HID continuation report with unexpected report id 0x{:02x}", report[0]);
                continue;
            }
            data.extend_from_slice(&report[1..]);
        }
        data.truncate(body_size);
        Ok((type_tag, data))
    }
}

/// Number of reports an `N`-byte body requires once framed: `ceil((8 + N) / 63)`.
pub fn reports_for_body_len(n: usize) -> usize {
    (8 + n + PAYLOAD_SIZE - 1) / PAYLOAD_SIZE
}

/// In-memory transport double, exported unconditionally so both this
/// crate's own unit tests and an embedder's integration tests can drive
/// a `Client` without real hardware.
pub mod testing {
    use super::{Error, HidTransport, Result, REPORT_SIZE};
    use std::collections::VecDeque;

    /// Reports written on one end can be read back, or a test can preload
    /// device-side reports and drain them as if they had arrived from the
    /// device (see `drain_as_device_reports`-style helpers in callers).
    #[derive(Default)]
    pub struct LoopbackTransport {
        pub inbound: VecDeque<[u8; REPORT_SIZE]>,
        pub outbound: Vec<[u8; REPORT_SIZE]>,
    }

    impl LoopbackTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Moves every report written so far onto the inbound queue, as if
        /// the device had just sent them back.
        pub fn drain_as_device_reports(&mut self) {
            let written: Vec<_> = self.outbound.drain(..).collect();
            self.inbound.extend(written);
        }
    }

    impl HidTransport for LoopbackTransport {
        fn write_report(&mut self, report: &[u8; REPORT_SIZE]) -> Result<()> {
            self.outbound.push(*report);
            Ok(())
        }

        fn read_report(&mut self) -> Result<[u8; REPORT_SIZE]> {
            self.inbound
                .pop_front()
                .ok_or_else(|| Error::TransportClosed("loopback exhausted".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::LoopbackTransport;
    use super::*;
    use crate::config::LengthPrefixMode;

    fn framer() -> Framer {
        Framer::new(TransportConfig {
            length_prefix: LengthPrefixMode::Implicit,
            ..TransportConfig::default()
        })
    }

    fn drain_as_device_reports(t: &mut LoopbackTransport) {
        let written: Vec<_> = t.outbound.drain(..).collect();
        t.inbound.extend(written);
    }

    #[test]
    fn round_trip_empty_body() {
        let f = framer();
        let mut t = LoopbackTransport::default();
        f.write(&mut t, 0, &[]).unwrap();
        assert_eq!(t.outbound.len(), 1);
        drain_as_device_reports(&mut t);
        let (tag, body) = f.read(&mut t).unwrap();
        assert_eq!(tag, 0);
        assert!(body.is_empty());
    }

    #[test]
    fn round_trip_arbitrary_body() {
        let f = framer();
        let mut t = LoopbackTransport::default();
        let body: Vec<u8> = (0..200u32).map(|i| (i % 251) as u8).collect();
        f.write(&mut t, 42, &body).unwrap();
        drain_as_device_reports(&mut t);
        let (tag, decoded) = f.read(&mut t).unwrap();
        assert_eq!(tag, 42);
        assert_eq!(decoded, body);
    }

    #[test]
    fn report_count_matches_formula() {
        for n in [0usize, 1, 54, 55, 56, 120, 1000] {
            let f = framer();
            let mut t = LoopbackTransport::default();
            f.write(&mut t, 1, &vec![0u8; n]).unwrap();
            assert_eq!(t.outbound.len(), reports_for_body_len(n), "n={n}");
        }
    }

    #[test]
    fn body_55_fits_one_report_56_needs_two() {
        let f = framer();

        let mut t55 = LoopbackTransport::default();
        f.write(&mut t55, 1, &vec![0u8; 55]).unwrap();
        assert_eq!(t55.outbound.len(), 1);

        let mut t56 = LoopbackTransport::default();
        f.write(&mut t56, 1, &vec![0u8; 56]).unwrap();
        assert_eq!(t56.outbound.len(), 2);
    }

    #[test]
    fn decoder_skips_pre_sentinel_noise() {
        let f = framer();
        let mut t = LoopbackTransport::default();
        // Two reports of garbage noise ahead of a real message.
        t.inbound.push_back([0xAAu8; REPORT_SIZE]);
        t.inbound.push_back({
            let mut r = [0x55u8; REPORT_SIZE];
            r[0] = REPORT_ID;
            r
        });
        f.write(&mut t, 7, b"hello").unwrap();
        drain_as_device_reports(&mut t);
        // the noise reports remain ahead of the real message in `inbound`
        // because drain_as_device_reports appends after them.
        let (tag, body) = f.read(&mut t).unwrap();
        assert_eq!(tag, 7);
        assert_eq!(body, b"hello");
    }

    #[test]
    fn eof_surfaces_as_transport_closed() {
        let f = framer();
        let mut t = LoopbackTransport::default();
        match f.read(&mut t) {
            Err(Error::TransportClosed(_)) => {}
            other => panic!("expected TransportClosed, got {other:?}"),
        }
    }
}
