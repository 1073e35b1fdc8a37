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

//! Session-protocol engine for Trezor- and KeepKey-family Bitcoin
//! hardware wallets over USB HID.
//!
//! A `Client` drives one session over an `HidTransport`: it frames and
//! reassembles 64-byte HID reports (`transport`), decodes/encodes the
//! vendor's protobuf wire schema (`codec`), and projects both vendors'
//! divergent message shapes onto one internal vocabulary (`adapter`)
//! before handing a caller events and data it never has to vendor-match
//! on itself. `signing` drives the interactive multi-round `TxRequest`/
//! `TxAck` dialog a `signTx` call requires; `context` holds the session
//! state and event bus a `Client` publishes to as it goes.
//!
//! Device enumeration and the raw USB transport are left to an embedder
//! (or the optional `hidapi-backend` feature) — this crate starts at
//! "bytes in, bytes out" and ends at "signed transaction out".

pub mod adapter;
pub mod client;
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod path;
pub mod signing;
pub mod transport;
pub mod vendor;

pub use client::{Client, SignTxRequest};
pub use context::{Context, ContextState, DeterministicKey, Event};
pub use error::{Error, Result};
pub use path::{AddressN, Purpose};
pub use signing::{AncestorStore, SigningJob};
pub use vendor::{MessageLabel, Vendor};
