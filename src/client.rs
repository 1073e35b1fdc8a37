//! Session Client (C4): the public half-duplex API described in §4.4.
//!
//! Every call sends exactly one message and then drives the reprompt
//! loop (PinMatrixRequest/PassphraseRequest/ButtonRequest/TxRequest)
//! until a terminal label arrives. Like the teacher's own
//! `signing_loop`, this is recursive-by-construction rather than an
//! explicit state machine, since the dialog really is a straight-line
//! conversation with the device.

use std::collections::HashMap;

use bitcoin::bip32::{ChainCode, Fingerprint};
use bitcoin::secp256k1::PublicKey as Secp256k1PublicKey;
use bitcoin::{Network, Transaction};
use prost::Message as _;

use crate::adapter;
use crate::codec::{self, keepkey, trezor, Body, KeepKeyBody, TrezorBody};
use crate::config::TransportConfig;
use crate::context::{Context, DeterministicKey, Event, EventBus};
use crate::error::{Error, Result};
use crate::path::AddressN;
use crate::signing::{self, AncestorStore, SigningJob};
use crate::transport::{Framer, HidTransport};
use crate::vendor::{MessageLabel, Vendor};

/// A `signTx` request: the transaction to sign, which input index maps
/// to which derivation path, and which of its own output addresses are
/// change belonging to `changeAddressMap`'s paths.
pub struct SignTxRequest {
    pub transaction: Transaction,
    pub input_path_map: HashMap<u32, AddressN>,
    pub change_address_map: HashMap<String, AddressN>,
    pub ancestors: AncestorStore,
    pub network: Network,
}

/// Drives one hardware-wallet session over a single HID transport.
pub struct Client<T: HidTransport> {
    vendor: Vendor,
    transport: T,
    framer: Framer,
    context: Context,
    events: EventBus,
}

impl<T: HidTransport> Client<T> {
    pub fn new(vendor: Vendor, transport: T, config: TransportConfig) -> Self {
        Client { vendor, transport, framer: Framer::new(config), context: Context::new(), events: EventBus::new() }
    }

    pub fn subscribe(&self, handler: impl Fn(&Event) + Send + 'static) {
        self.events.subscribe(handler);
    }

    pub fn context(&self) -> Context {
        self.context.clone()
    }

    pub fn is_wallet_present(&self) -> bool {
        self.context.snapshot().wallet_present
    }

    /// Escape hatch onto the underlying transport, mirroring
    /// `std::io::BufWriter::get_mut` — mainly useful for tests driving a
    /// loopback transport, or an embedder inspecting backend-specific state.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Sends `Initialize` and waits for `Features`, publishing
    /// `DEVICE_READY` (scenario 1).
    pub fn start(&mut self) -> Result<()> {
        let body = self.send(
            MessageLabel::Initialize,
            trezor::Initialize { session_id: None },
            keepkey::Initialize { session_id: None },
        )?;
        match body {
            Body::Trezor(TrezorBody::Features(f)) => self.on_features(adapter::features_from_trezor(&f)),
            Body::KeepKey(KeepKeyBody::Features(f)) => self.on_features(adapter::features_from_keepkey(&f)),
            other => Err(unexpected(other)),
        }
    }

    fn on_features(&mut self, features: adapter::Features) -> Result<()> {
        self.context.with_state(|s| {
            s.wallet_present = true;
            s.features = Some(features.clone());
        });
        self.events.publish(Event::DeviceReady(features));
        Ok(())
    }

    pub fn stop(&mut self) {
        self.context.reset();
    }

    /// Cancels whatever is in flight, publishing nothing on the wire
    /// side beyond the Cancel message itself — the caller's own
    /// operation will observe the resulting Failure/disconnect.
    pub fn cancel(&mut self) -> Result<()> {
        self.context.reset();
        self.write_message(MessageLabel::Cancel, trezor::Cancel {}, keepkey::Cancel {})
    }

    pub fn provide_pin(&mut self, pin: &str) -> Result<Body> {
        self.send(
            MessageLabel::PinMatrixAck,
            trezor::PinMatrixAck { pin: pin.to_string() },
            keepkey::PinMatrixAck { pin: pin.to_string() },
        )
    }

    pub fn provide_passphrase(&mut self, passphrase: &str) -> Result<Body> {
        self.send(
            MessageLabel::PassphraseAck,
            trezor::PassphraseAck { passphrase: passphrase.to_string() },
            keepkey::PassphraseAck { passphrase: passphrase.to_string() },
        )
    }

    pub fn request_features(&mut self) -> Result<adapter::Features> {
        let body = self.send(MessageLabel::GetFeatures, trezor::GetFeatures {}, keepkey::GetFeatures {})?;
        match body {
            Body::Trezor(TrezorBody::Features(f)) => {
                let f = adapter::features_from_trezor(&f);
                self.on_features(f.clone())?;
                Ok(f)
            }
            Body::KeepKey(KeepKeyBody::Features(f)) => {
                let f = adapter::features_from_keepkey(&f);
                self.on_features(f.clone())?;
                Ok(f)
            }
            other => Err(unexpected(other)),
        }
    }

    pub fn request_public_key(&mut self, path: AddressN) -> Result<adapter::PublicKey> {
        let body = self.send(
            MessageLabel::GetPublicKey,
            trezor::GetPublicKey {
                address_n: path.clone(),
                ecdsa_curve_name: None,
                show_display: None,
                coin_name: None,
            },
            keepkey::GetPublicKey { address_n: path, show_display: None, coin_name: None },
        )?;
        match body {
            Body::Trezor(TrezorBody::PublicKey(p)) => {
                let pk = adapter::public_key_from_trezor(&p);
                self.context.with_state(|s| s.public_key = Some(pk.clone()));
                self.events.publish(Event::PublicKey(pk.clone()));
                Ok(pk)
            }
            Body::KeepKey(KeepKeyBody::PublicKey(p)) => {
                let pk = adapter::public_key_from_keepkey(&p);
                self.context.with_state(|s| s.public_key = Some(pk.clone()));
                self.events.publish(Event::PublicKey(pk.clone()));
                Ok(pk)
            }
            other => Err(unexpected(other)),
        }
    }

    /// Issues `GetPublicKey` and reconstructs a `DeterministicKey` from
    /// the returned xpub's chaincode and public key (§4.4 policy, §9:
    /// actual BIP-32 tree derivation is the host's Bitcoin library's job).
    pub fn request_deterministic_hierarchy(&mut self, account_path: AddressN) -> Result<DeterministicKey> {
        let pk = self.request_public_key(account_path.clone())?;

        let chain_code_bytes: [u8; 32] = pk.node.chain_code.as_slice().try_into().map_err(|_| {
            Error::InvalidKeyMaterial(format!(
                "chain code is {} bytes, expected 32",
                pk.node.chain_code.len()
            ))
        })?;
        let public_key = pk
            .node
            .public_key
            .as_ref()
            .map(|bytes| {
                Secp256k1PublicKey::from_slice(bytes)
                    .map_err(|e| Error::InvalidKeyMaterial(format!("public key: {e}")))
            })
            .transpose()?;

        let key = DeterministicKey {
            path: account_path,
            fingerprint: Fingerprint::from(pk.node.fingerprint.to_be_bytes()),
            chain_code: ChainCode::from(chain_code_bytes),
            public_key,
            xpub: pk.xpub.clone(),
        };
        self.context.with_state(|s| s.deterministic_key = Some(key.clone()));
        self.events.publish(Event::DeterministicHierarchy(key.clone()));
        Ok(key)
    }

    pub fn request_address(&mut self, path: AddressN, show_on_device: bool) -> Result<adapter::Address> {
        let body = self.send(
            MessageLabel::GetAddress,
            trezor::GetAddress { address_n: path.clone(), coin_name: None, show_display: Some(show_on_device) },
            keepkey::GetAddress { address_n: path, coin_name: None, show_display: Some(show_on_device) },
        )?;
        match body {
            Body::Trezor(TrezorBody::Address(a)) => {
                let addr = adapter::address_from_trezor(&a);
                self.context.with_state(|s| s.last_address = Some(addr.clone()));
                self.events.publish(Event::Address(addr.clone()));
                Ok(addr)
            }
            Body::KeepKey(KeepKeyBody::Address(a)) => {
                let addr = adapter::address_from_keepkey(&a);
                self.context.with_state(|s| s.last_address = Some(addr.clone()));
                self.events.publish(Event::Address(addr.clone()));
                Ok(addr)
            }
            other => Err(unexpected(other)),
        }
    }

    /// Starts a multi-round signing dialog (§4.5). Fails synchronously
    /// with `Busy` if a job is already in flight — no wire traffic for
    /// that case (§7).
    pub fn sign_tx(&mut self, request: SignTxRequest) -> Result<()> {
        if self.context.job_in_flight() {
            return Err(Error::Busy);
        }

        let outputs_count = request.transaction.output.len() as u32;
        let inputs_count = request.transaction.input.len() as u32;
        let version = Some(request.transaction.version.0 as u32);
        let lock_time = Some(request.transaction.lock_time.to_consensus_u32());

        let job = SigningJob::new(
            request.transaction,
            request.input_path_map,
            request.change_address_map,
            request.ancestors,
            request.network,
        );
        self.context.start_job(job);

        let body = self.send(
            MessageLabel::SignTx,
            trezor::SignTx { outputs_count, inputs_count, coin_name: None, version, lock_time },
            keepkey::SignTx { outputs_count, inputs_count, coin_name: None, version, lock_time },
        )?;

        match self.drive_signing_loop(body) {
            Ok(()) => {
                let serialized = self.context.take_job().map(|j| j.finished_tx_bytes().to_vec()).unwrap_or_default();
                self.context.with_state(|s| s.serialized_tx = serialized);
                self.events.publish(Event::OperationSucceeded(adapter::Success { message: None }));
                Ok(())
            }
            Err(e) => {
                self.context.take_job();
                self.events.publish(Event::OperationFailed(e.to_string()));
                Err(e)
            }
        }
    }

    fn drive_signing_loop(&mut self, first_response: Body) -> Result<()> {
        let mut current = first_response;
        loop {
            let tx_request = match &current {
                Body::Trezor(TrezorBody::TxRequest(r)) => adapter::tx_request_from_trezor(r),
                Body::KeepKey(KeepKeyBody::TxRequest(r)) => adapter::tx_request_from_keepkey(r),
                Body::Trezor(TrezorBody::Failure(f)) => {
                    return Err(device_failure(adapter::failure_from_trezor(f)))
                }
                Body::KeepKey(KeepKeyBody::Failure(f)) => {
                    return Err(device_failure(adapter::failure_from_keepkey(f)))
                }
                other => return Err(unexpected(other.clone())),
            };

            let ack_payload = match self.context.with_job(|job| Some(job.respond(&tx_request))) {
                Some(Ok(payload)) => payload,
                Some(Err(e)) => {
                    let _ = self.write_message(MessageLabel::Cancel, trezor::Cancel {}, keepkey::Cancel {});
                    return Err(e);
                }
                None => return Err(Error::Unexpected("TxRequest received with no signing job active".into())),
            };

            let Some(payload) = ack_payload else {
                return Ok(()); // TXFINISHED
            };

            let ack_body = self.send(MessageLabel::TxAck, signing::to_trezor(&payload), signing::to_keepkey(&payload))?;
            current = self.handle_reprompts(ack_body)?;
        }
    }

    /// Answers `ButtonRequest` reprompts automatically (there is nothing
    /// for the embedder to supply beyond acknowledging); PIN and
    /// passphrase reprompts are surfaced as events and returned as-is
    /// so the caller can respond via `provide_pin`/`provide_passphrase`.
    fn handle_reprompts(&mut self, response: Body) -> Result<Body> {
        match &response {
            Body::Trezor(TrezorBody::PinMatrixRequest(r)) => {
                self.events.publish(Event::ShowPinEntry(adapter::pin_matrix_request_from_trezor(r)));
                Ok(response)
            }
            Body::KeepKey(KeepKeyBody::PinMatrixRequest(r)) => {
                self.events.publish(Event::ShowPinEntry(adapter::pin_matrix_request_from_keepkey(r)));
                Ok(response)
            }
            Body::Trezor(TrezorBody::PassphraseRequest(_))
            | Body::KeepKey(KeepKeyBody::PassphraseRequest(_)) => {
                self.events.publish(Event::ShowPassphraseEntry);
                Ok(response)
            }
            Body::Trezor(TrezorBody::ButtonRequest(r)) => {
                let req = adapter::button_request_from_trezor(r);
                self.events.publish(Event::ShowButtonPress(req));
                let ack = self.send(MessageLabel::ButtonAck, trezor::ButtonAck {}, keepkey::ButtonAck {})?;
                self.handle_reprompts(ack)
            }
            Body::KeepKey(KeepKeyBody::ButtonRequest(r)) => {
                let req = adapter::button_request_from_keepkey(r);
                self.events.publish(Event::ShowButtonPress(req));
                let ack = self.send(MessageLabel::ButtonAck, trezor::ButtonAck {}, keepkey::ButtonAck {})?;
                self.handle_reprompts(ack)
            }
            Body::Trezor(TrezorBody::Failure(f)) => {
                let failure = adapter::failure_from_trezor(f);
                self.events.publish(Event::DeviceFailed(failure.clone()));
                Err(device_failure(failure))
            }
            Body::KeepKey(KeepKeyBody::Failure(f)) => {
                let failure = adapter::failure_from_keepkey(f);
                self.events.publish(Event::DeviceFailed(failure.clone()));
                Err(device_failure(failure))
            }
            _ => Ok(response),
        }
    }

    fn write_message(
        &mut self,
        label: MessageLabel,
        trezor_msg: impl prost::Message,
        keepkey_msg: impl prost::Message,
    ) -> Result<()> {
        let tag = tag_for(self.vendor, label)?;
        let body = match self.vendor {
            Vendor::Trezor => trezor_msg.encode_to_vec(),
            Vendor::KeepKey => keepkey_msg.encode_to_vec(),
        };
        self.framer.write(&mut self.transport, tag, &body)
    }

    /// Sends one message and reads the device's single reply, resolving
    /// any automatic reprompts (button presses) along the way. PIN and
    /// passphrase reprompts are returned to the caller as the reply body
    /// itself, carrying the `PinMatrixRequest`/`PassphraseRequest`.
    fn send(
        &mut self,
        label: MessageLabel,
        trezor_msg: impl prost::Message,
        keepkey_msg: impl prost::Message,
    ) -> Result<Body> {
        self.write_message(label, trezor_msg, keepkey_msg)?;
        let response = self.read()?;
        self.handle_reprompts(response)
    }

    fn read(&mut self) -> Result<Body> {
        loop {
            let (tag, bytes) = match self.framer.read(&mut self.transport) {
                Ok(v) => v,
                Err(Error::TransportClosed(reason)) => {
                    self.context.reset();
                    self.events.publish(Event::DeviceDetached);
                    return Err(Error::TransportClosed(reason));
                }
                Err(e) => return Err(e),
            };
            match codec::parse(self.vendor, tag, &bytes) {
                Ok((_, body)) => return Ok(body),
                Err(Error::UnknownType(t)) => {
                    log::warn!("dropping unrecognised message type tag 0x{t:04x}");
                    continue;
                }
                Err(Error::SchemaError { tag, source }) => {
                    log::warn!("dropping message tag 0x{tag:04x} with bad schema: {source}");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn tag_for(vendor: Vendor, label: MessageLabel) -> Result<u16> {
    let table = match vendor {
        Vendor::Trezor => trezor::TYPE_TAGS,
        Vendor::KeepKey => keepkey::TYPE_TAGS,
    };
    table
        .iter()
        .find(|(_, l)| *l == label)
        .map(|(tag, _)| *tag)
        .ok_or(Error::Unexpected(format!("no type_tag registered for outbound label {label:?}")))
}

fn unexpected(body: Body) -> Error {
    let label = match &body {
        Body::Trezor(_) => "trezor",
        Body::KeepKey(_) => "keepkey",
    };
    Error::Unexpected(format!("unexpected {label} message in this exchange"))
}

fn device_failure(f: adapter::Failure) -> Error {
    Error::DeviceFailure { code: f.kind.map(|k| format!("{k:?}")), message: f.message.unwrap_or_default() }
}
