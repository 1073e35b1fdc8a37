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

//! Error taxonomy for the HID transport, codec, and session layers.
//!
//! Transport and schema errors are expected to be recoverable at the
//! session level (logged and turned into an event); only the signing
//! coordinator's own data-gap errors and the device's own `Failure`
//! message terminate an in-flight operation.

/// A 16-bit wire message type tag that a [`Error::UnknownType`] or
/// [`Error::SchemaError`] was raised against, for logging.
pub type TypeTag = u16;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying HID source returned EOF, or a write failed because the
    /// device went away mid-message. Equivalent to a `DEVICE_DETACHED` event.
    #[error("transport closed: {0}")]
    TransportClosed(String),

    /// HID reassembly could not complete within the configured safety cap,
    /// or a continuation report did not begin with the `?` sentinel.
    #[error("malformed HID frame: {0}")]
    MalformedFrame(&'static str),

    /// `type_tag` is not present in the active vendor's codec registry.
    /// Non-fatal: the caller logs and drops the message.
    #[error("unknown message type tag {0}")]
    UnknownType(TypeTag),

    /// The protobuf body for a known `type_tag` failed to decode.
    /// Non-fatal: the caller logs and drops the message.
    #[error("schema error decoding tag {tag}: {source}")]
    SchemaError {
        tag: TypeTag,
        #[source]
        source: prost::DecodeError,
    },

    /// The device sent a `Failure` message in response to our request.
    #[error("device reported failure: {code:?}: {message}")]
    DeviceFailure { code: Option<String>, message: String },

    /// A `TxRequest` referenced an input index absent from the input-path map.
    #[error("no input path supplied for input index {0}")]
    MissingInputPath(u32),

    /// A `TxRequest` referenced an ancestor transaction hash absent from the
    /// `AncestorStore`.
    #[error("no ancestor transaction supplied for hash {0}")]
    MissingAncestor(String),

    /// An output script in the current transaction is neither P2PKH nor P2SH.
    #[error("unsupported output script at index {0}")]
    IllegalOutputScript(u32),

    /// A second operation was started while one was already in flight.
    #[error("session busy with another operation")]
    Busy,

    /// The device replied with a message that doesn't belong in the
    /// current exchange (e.g. an `Address` where a `TxRequest` was due).
    #[error("unexpected message in this exchange: {0}")]
    Unexpected(String),

    /// Lower-level HID backend failure (only constructible with the
    /// `hidapi-backend` feature).
    #[cfg(feature = "hidapi-backend")]
    #[error("USB HID error: {0}")]
    Usb(#[from] hidapi::HidError),

    /// A `PublicKey` response's chain code or public key bytes did not
    /// parse as the `bitcoin` type `requestDeterministicHierarchy` caches.
    #[error("invalid key material in device response: {0}")]
    InvalidKeyMaterial(String),
}

pub type Result<T> = std::result::Result<T, Error>;
