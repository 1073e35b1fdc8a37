//! End-to-end session scenarios driven entirely over
//! `transport::testing::LoopbackTransport` — no real hardware involved.
//! Each test plays the device side by hand: encode the reports a real
//! Trezor/KeepKey would send, queue them on the loopback transport, then
//! drive the `Client` the way an embedder would and check what comes out.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bitcoin::absolute::LockTime;
use bitcoin::transaction::Version;
use bitcoin::{Amount, Network, OutPoint, PubkeyHash, ScriptBuf, Sequence, TxIn, TxOut, Txid, Witness};
use prost::Message as _;

use hw_core::client::{Client, SignTxRequest};
use hw_core::codec::trezor;
use hw_core::config::TransportConfig;
use hw_core::context::Event;
use hw_core::path;
use hw_core::signing::AncestorStore;
use hw_core::transport::testing::LoopbackTransport;
use hw_core::vendor::{MessageLabel, Vendor};

fn tag_for(label: MessageLabel) -> u16 {
    trezor::TYPE_TAGS.iter().find(|(_, l)| *l == label).map(|(tag, _)| *tag).unwrap()
}

/// Encodes one device-side message and appends its reports directly to
/// `transport`'s inbound queue, ahead of anything the client itself will
/// write — this is how the test plays "the device" without a real loop.
fn queue_response(transport: &mut LoopbackTransport, label: MessageLabel, body: &impl prost::Message) {
    let framer = hw_core::transport::Framer::new(TransportConfig::default());
    let mut scratch = LoopbackTransport::new();
    framer.write(&mut scratch, tag_for(label), &body.encode_to_vec()).unwrap();
    transport.inbound.extend(scratch.outbound);
}

fn new_client() -> Client<LoopbackTransport> {
    let _ = env_logger::try_init();
    Client::new(Vendor::Trezor, LoopbackTransport::new(), TransportConfig::default())
}

fn events_sink(client: &Client<LoopbackTransport>) -> Arc<Mutex<Vec<Event>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    client.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
    events
}

#[test]
fn initialize_reports_device_ready() {
    let mut client = new_client();
    let events = events_sink(&client);

    queue_response(
        client.transport_mut(),
        MessageLabel::Features,
        &trezor::Features { vendor: Some("trezor.io".into()), label: Some("my trezor".into()), ..Default::default() },
    );

    client.start().unwrap();
    assert!(client.is_wallet_present());
    assert!(matches!(events.lock().unwrap().as_slice(), [Event::DeviceReady(_)]));
}

#[test]
fn pin_gated_get_address_completes_after_provide_pin() {
    let mut client = new_client();
    let events = events_sink(&client);
    let path = path::for_bip44(0, path::Purpose::ReceiveFunds, 0);

    queue_response(
        client.transport_mut(),
        MessageLabel::PinMatrixRequest,
        &trezor::PinMatrixRequest { r#type: Some(trezor::PinMatrixRequestType::Current as i32) },
    );
    let first = client.request_address(path, false);
    assert!(first.is_err(), "a PinMatrixRequest isn't an Address, the call should surface it as unexpected");
    assert!(matches!(events.lock().unwrap().last(), Some(Event::ShowPinEntry(_))));

    queue_response(
        client.transport_mut(),
        MessageLabel::Address,
        &trezor::Address { address: "1BoatSLRHtKNngkdXEeobR76b53LETtpyT".into() },
    );
    let body = client.provide_pin("1234").unwrap();
    match body {
        hw_core::codec::Body::Trezor(hw_core::codec::TrezorBody::Address(a)) => {
            assert_eq!(a.address, "1BoatSLRHtKNngkdXEeobR76b53LETtpyT");
        }
        other => panic!("expected Address, got {other:?}"),
    }
}

#[test]
fn device_failure_is_published_on_the_event_bus() {
    let mut client = new_client();
    let events = events_sink(&client);
    let path = path::for_bip44(0, path::Purpose::ReceiveFunds, 0);

    queue_response(
        client.transport_mut(),
        MessageLabel::Failure,
        &trezor::Failure {
            code: Some(trezor::FailureType::PinInvalid as i32),
            message: Some("wrong PIN".into()),
        },
    );

    let err = client.request_address(path, false).unwrap_err();
    assert!(matches!(err, hw_core::error::Error::DeviceFailure { .. }));

    match events.lock().unwrap().last() {
        Some(Event::DeviceFailed(f)) => assert_eq!(f.message.as_deref(), Some("wrong PIN")),
        other => panic!("expected Event::DeviceFailed, got {other:?}"),
    }
}

#[test]
fn deterministic_hierarchy_caches_xpub_and_chaincode() {
    let mut client = new_client();
    let account_path = path::for_bip44(0, path::Purpose::ReceiveFunds, 0);

    // Compressed encoding of the secp256k1 generator point, a known-valid
    // curve point so `PublicKey::from_slice` accepts it.
    let generator_compressed =
        hex::decode("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798").unwrap();

    queue_response(
        client.transport_mut(),
        MessageLabel::PublicKey,
        &trezor::PublicKey {
            node: trezor::HdNodeType {
                depth: 1,
                fingerprint: 0x1234_5678,
                child_num: 0x8000_0000,
                chain_code: vec![0x11; 32],
                public_key: Some(generator_compressed.clone()),
            },
            xpub: Some("xpub000".into()),
        },
    );

    let key = client.request_deterministic_hierarchy(account_path.clone()).unwrap();
    assert_eq!(key.path, account_path);
    assert_eq!(key.chain_code, bitcoin::bip32::ChainCode::from([0x11; 32]));
    assert_eq!(key.fingerprint, bitcoin::bip32::Fingerprint::from(0x1234_5678u32.to_be_bytes()));
    assert_eq!(
        key.public_key,
        Some(bitcoin::secp256k1::PublicKey::from_slice(&generator_compressed).unwrap())
    );
    assert_eq!(key.xpub, Some("xpub000".into()));
}

fn p2pkh_script(fill: u8) -> ScriptBuf {
    ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array([fill; 20]))
}

fn ancestor_tx() -> bitcoin::Transaction {
    bitcoin::Transaction {
        version: Version(1),
        lock_time: LockTime::ZERO,
        input: vec![],
        output: vec![TxOut { value: Amount::from_sat(5_000), script_pubkey: p2pkh_script(9) }],
    }
}

fn current_tx(prev_txid: Txid) -> bitcoin::Transaction {
    bitcoin::Transaction {
        version: Version(2),
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint { txid: prev_txid, vout: 0 },
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: vec![TxOut { value: Amount::from_sat(4_800), script_pubkey: p2pkh_script(7) }],
    }
}

#[test]
fn one_input_one_output_sign_tx_completes() {
    let mut client = new_client();
    let events = events_sink(&client);

    let ancestor = ancestor_tx();
    let ancestor_txid = ancestor.compute_txid();
    let tx = current_tx(ancestor_txid);

    let mut ancestors = AncestorStore::new();
    ancestors.insert(ancestor.clone());
    let mut input_path_map = HashMap::new();
    input_path_map.insert(0u32, path::for_bip44(0, path::Purpose::ReceiveFunds, 3));

    let t = client.transport_mut();

    // 1. TxMeta for the transaction being signed.
    queue_response(
        t,
        MessageLabel::TxRequest,
        &trezor::TxRequest { request_type: Some(trezor::RequestType::TxMeta as i32), details: None, serialized: None },
    );
    // 2. TxInput 0 of the transaction being signed.
    queue_response(
        t,
        MessageLabel::TxRequest,
        &trezor::TxRequest {
            request_type: Some(trezor::RequestType::TxInput as i32),
            details: Some(trezor::TxRequestDetailsType { request_index: Some(0), tx_hash: None }),
            serialized: None,
        },
    );
    // 3. TxMeta for the ancestor.
    queue_response(
        t,
        MessageLabel::TxRequest,
        &trezor::TxRequest {
            request_type: Some(trezor::RequestType::TxMeta as i32),
            details: Some(trezor::TxRequestDetailsType {
                request_index: None,
                tx_hash: Some(ancestor_txid.as_ref().to_vec()),
            }),
            serialized: None,
        },
    );
    // 4. TxInput 0 of the ancestor (it has none — exercised separately below).
    // 5. TxOutput 0 of the ancestor (the output this tx spends).
    queue_response(
        t,
        MessageLabel::TxRequest,
        &trezor::TxRequest {
            request_type: Some(trezor::RequestType::TxOutput as i32),
            details: Some(trezor::TxRequestDetailsType {
                request_index: Some(0),
                tx_hash: Some(ancestor_txid.as_ref().to_vec()),
            }),
            serialized: None,
        },
    );
    // 6. TxOutput 0 of the transaction being signed.
    queue_response(
        t,
        MessageLabel::TxRequest,
        &trezor::TxRequest {
            request_type: Some(trezor::RequestType::TxOutput as i32),
            details: Some(trezor::TxRequestDetailsType { request_index: Some(0), tx_hash: None }),
            serialized: None,
        },
    );
    // 7. TxFinished, carrying the accumulated signature and serialized tx.
    queue_response(
        t,
        MessageLabel::TxRequest,
        &trezor::TxRequest {
            request_type: Some(trezor::RequestType::TxFinished as i32),
            details: None,
            serialized: Some(trezor::TxRequestSerializedType {
                signature_index: Some(0),
                signature: Some(vec![0xAB; 71]),
                serialized_tx: Some(vec![0xde, 0xad, 0xbe, 0xef]),
            }),
        },
    );

    client
        .sign_tx(SignTxRequest {
            transaction: tx,
            input_path_map,
            change_address_map: HashMap::new(),
            ancestors,
            network: Network::Bitcoin,
        })
        .unwrap();

    assert!(matches!(events.lock().unwrap().last(), Some(Event::OperationSucceeded(_))));
    assert_eq!(hex::encode(client.context().snapshot().serialized_tx), "deadbeef");
}

#[test]
fn missing_ancestor_fails_job_and_sends_cancel() {
    let mut client = new_client();

    let ancestor_txid = ancestor_tx().compute_txid();
    let tx = current_tx(ancestor_txid);

    let t = client.transport_mut();
    queue_response(
        t,
        MessageLabel::TxRequest,
        &trezor::TxRequest { request_type: Some(trezor::RequestType::TxMeta as i32), details: None, serialized: None },
    );
    queue_response(
        t,
        MessageLabel::TxRequest,
        &trezor::TxRequest {
            request_type: Some(trezor::RequestType::TxInput as i32),
            details: Some(trezor::TxRequestDetailsType { request_index: Some(0), tx_hash: None }),
            serialized: None,
        },
    );
    // The ancestor that owns this input was never supplied.
    queue_response(
        t,
        MessageLabel::TxRequest,
        &trezor::TxRequest {
            request_type: Some(trezor::RequestType::TxMeta as i32),
            details: Some(trezor::TxRequestDetailsType {
                request_index: None,
                tx_hash: Some(ancestor_txid.as_ref().to_vec()),
            }),
            serialized: None,
        },
    );

    let mut input_path_map = HashMap::new();
    input_path_map.insert(0u32, path::for_bip44(0, path::Purpose::ReceiveFunds, 0));

    let err = client
        .sign_tx(SignTxRequest {
            transaction: tx,
            input_path_map,
            change_address_map: HashMap::new(),
            ancestors: AncestorStore::new(),
            network: Network::Bitcoin,
        })
        .unwrap_err();

    assert!(matches!(err, hw_core::error::Error::MissingAncestor(_)));
    assert!(!client.context().job_in_flight());
}

#[test]
fn mid_stream_detach_during_signing_clears_the_job() {
    let mut client = new_client();
    let events = events_sink(&client);

    let ancestor = ancestor_tx();
    let ancestor_txid = ancestor.compute_txid();
    let tx = current_tx(ancestor_txid);

    let mut ancestors = AncestorStore::new();
    ancestors.insert(ancestor);
    let mut input_path_map = HashMap::new();
    input_path_map.insert(0u32, path::for_bip44(0, path::Purpose::ReceiveFunds, 3));

    let t = client.transport_mut();
    // TXMETA(current), TXINPUT(0, current) — then the device vanishes.
    queue_response(
        t,
        MessageLabel::TxRequest,
        &trezor::TxRequest { request_type: Some(trezor::RequestType::TxMeta as i32), details: None, serialized: None },
    );
    queue_response(
        t,
        MessageLabel::TxRequest,
        &trezor::TxRequest {
            request_type: Some(trezor::RequestType::TxInput as i32),
            details: Some(trezor::TxRequestDetailsType { request_index: Some(0), tx_hash: None }),
            serialized: None,
        },
    );

    let err = client
        .sign_tx(SignTxRequest { transaction: tx, input_path_map, change_address_map: HashMap::new(), ancestors, network: Network::Bitcoin })
        .unwrap_err();

    assert!(matches!(err, hw_core::error::Error::TransportClosed(_)));
    assert!(matches!(events.lock().unwrap().last(), Some(Event::DeviceDetached)));
    assert!(!client.context().job_in_flight(), "a detach must not leave the job marked in-flight");

    // A fresh signTx must not report Busy even though the previous one
    // never reached a terminal TxRequest.
    let t = client.transport_mut();
    queue_response(
        t,
        MessageLabel::TxRequest,
        &trezor::TxRequest {
            request_type: Some(trezor::RequestType::TxFinished as i32),
            details: None,
            serialized: Some(trezor::TxRequestSerializedType { signature_index: None, signature: None, serialized_tx: None }),
        },
    );
    let retry = client.sign_tx(SignTxRequest {
        transaction: current_tx(ancestor_tx().compute_txid()),
        input_path_map: HashMap::new(),
        change_address_map: HashMap::new(),
        ancestors: AncestorStore::new(),
        network: Network::Bitcoin,
    });
    assert!(!matches!(retry, Err(hw_core::error::Error::Busy)));
}
