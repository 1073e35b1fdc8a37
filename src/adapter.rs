//! Vendor Adapter (C3): projects Trezor and KeepKey wire records into one
//! vendor-neutral vocabulary. Everything past this module is written
//! against these types and never matches on `codec::Body` directly.
//!
//! Labels that carry no semantic payload (acks, cancels, clear-session)
//! have no projection here — the raw [`crate::vendor::MessageLabel`] is
//! enough for the session layer to act on.

use crate::codec::{keepkey, trezor};

/// A BIP-32 node as reported in a `PublicKey` response.
#[derive(Debug, Clone, PartialEq)]
pub struct HdNode {
    pub depth: u32,
    pub fingerprint: u32,
    pub child_num: u32,
    pub chain_code: Vec<u8>,
    pub public_key: Option<Vec<u8>>,
}

fn hd_node_from_trezor(n: &trezor::HdNodeType) -> HdNode {
    HdNode {
        depth: n.depth,
        fingerprint: n.fingerprint,
        child_num: n.child_num,
        chain_code: n.chain_code.clone(),
        public_key: n.public_key.clone(),
    }
}

fn hd_node_from_keepkey(n: &keepkey::HdNodeType) -> HdNode {
    HdNode {
        depth: n.depth,
        fingerprint: n.fingerprint,
        child_num: n.child_num,
        chain_code: n.chain_code.clone(),
        public_key: n.public_key.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Features {
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub major_version: Option<u32>,
    pub minor_version: Option<u32>,
    pub patch_version: Option<u32>,
    pub bootloader_mode: Option<bool>,
    pub device_id: Option<String>,
    pub pin_protection: Option<bool>,
    pub passphrase_protection: Option<bool>,
    pub label: Option<String>,
    pub initialized: Option<bool>,
}

pub fn features_from_trezor(f: &trezor::Features) -> Features {
    Features {
        vendor: f.vendor.clone(),
        model: None,
        major_version: f.major_version,
        minor_version: f.minor_version,
        patch_version: f.patch_version,
        bootloader_mode: f.bootloader_mode,
        device_id: f.device_id.clone(),
        pin_protection: f.pin_protection,
        passphrase_protection: f.passphrase_protection,
        label: f.label.clone(),
        initialized: f.initialized,
    }
}

pub fn features_from_keepkey(f: &keepkey::Features) -> Features {
    Features {
        vendor: f.vendor.clone(),
        model: f.model.clone(),
        major_version: f.major_version,
        minor_version: f.minor_version,
        patch_version: f.patch_version,
        bootloader_mode: f.bootloader_mode,
        device_id: f.device_id.clone(),
        pin_protection: f.pin_protection,
        passphrase_protection: f.passphrase_protection,
        label: f.label.clone(),
        initialized: f.initialized,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublicKey {
    pub node: HdNode,
    pub xpub: Option<String>,
}

pub fn public_key_from_trezor(p: &trezor::PublicKey) -> PublicKey {
    PublicKey { node: hd_node_from_trezor(&p.node), xpub: p.xpub.clone() }
}

pub fn public_key_from_keepkey(p: &keepkey::PublicKey) -> PublicKey {
    PublicKey { node: hd_node_from_keepkey(&p.node), xpub: p.xpub.clone() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub address: String,
}

pub fn address_from_trezor(a: &trezor::Address) -> Address {
    Address { address: a.address.clone() }
}

pub fn address_from_keepkey(a: &keepkey::Address) -> Address {
    Address { address: a.address.clone() }
}

/// Which PIN a `PinMatrixRequest` is asking for — current, or one of the
/// two entries of a new-PIN confirmation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMatrixKind {
    Current,
    NewFirst,
    NewSecond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMatrixRequest {
    pub kind: Option<PinMatrixKind>,
}

fn pin_matrix_kind_from_trezor(t: trezor::PinMatrixRequestType) -> PinMatrixKind {
    match t {
        trezor::PinMatrixRequestType::Current => PinMatrixKind::Current,
        trezor::PinMatrixRequestType::NewFirst => PinMatrixKind::NewFirst,
        trezor::PinMatrixRequestType::NewSecond => PinMatrixKind::NewSecond,
    }
}

fn pin_matrix_kind_from_keepkey(t: keepkey::PinMatrixRequestType) -> PinMatrixKind {
    match t {
        keepkey::PinMatrixRequestType::Current => PinMatrixKind::Current,
        keepkey::PinMatrixRequestType::NewFirst => PinMatrixKind::NewFirst,
        keepkey::PinMatrixRequestType::NewSecond => PinMatrixKind::NewSecond,
    }
}

pub fn pin_matrix_request_from_trezor(r: &trezor::PinMatrixRequest) -> PinMatrixRequest {
    use prost::Enumeration;
    PinMatrixRequest {
        kind: r
            .r#type
            .and_then(trezor::PinMatrixRequestType::from_i32)
            .map(pin_matrix_kind_from_trezor),
    }
}

pub fn pin_matrix_request_from_keepkey(r: &keepkey::PinMatrixRequest) -> PinMatrixRequest {
    use prost::Enumeration;
    PinMatrixRequest {
        kind: r
            .r#type
            .and_then(keepkey::PinMatrixRequestType::from_i32)
            .map(pin_matrix_kind_from_keepkey),
    }
}

/// Why the device is asking for a button press. Vendors agree on every
/// variant except KeepKey never added a dedicated `PublicKey` prompt —
/// it reuses `Other` for that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonRequestKind {
    Other,
    FeeOverThreshold,
    ConfirmOutput,
    ConfirmWord,
    WipeDevice,
    ProtectCall,
    SignTx,
    Address,
    PublicKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonRequest {
    pub kind: Option<ButtonRequestKind>,
    pub data: Option<String>,
}

fn button_request_kind_from_trezor(t: trezor::ButtonRequestType) -> ButtonRequestKind {
    match t {
        trezor::ButtonRequestType::Other => ButtonRequestKind::Other,
        trezor::ButtonRequestType::FeeOverThreshold => ButtonRequestKind::FeeOverThreshold,
        trezor::ButtonRequestType::ConfirmOutput => ButtonRequestKind::ConfirmOutput,
        trezor::ButtonRequestType::ConfirmWord => ButtonRequestKind::ConfirmWord,
        trezor::ButtonRequestType::WipeDevice => ButtonRequestKind::WipeDevice,
        trezor::ButtonRequestType::ProtectCall => ButtonRequestKind::ProtectCall,
        trezor::ButtonRequestType::SignTx => ButtonRequestKind::SignTx,
        trezor::ButtonRequestType::Address => ButtonRequestKind::Address,
        trezor::ButtonRequestType::PublicKey => ButtonRequestKind::PublicKey,
    }
}

fn button_request_kind_from_keepkey(t: keepkey::ButtonRequestType) -> ButtonRequestKind {
    match t {
        keepkey::ButtonRequestType::Other => ButtonRequestKind::Other,
        keepkey::ButtonRequestType::FeeOverThreshold => ButtonRequestKind::FeeOverThreshold,
        keepkey::ButtonRequestType::ConfirmOutput => ButtonRequestKind::ConfirmOutput,
        keepkey::ButtonRequestType::ConfirmWord => ButtonRequestKind::ConfirmWord,
        keepkey::ButtonRequestType::WipeDevice => ButtonRequestKind::WipeDevice,
        keepkey::ButtonRequestType::ProtectCall => ButtonRequestKind::ProtectCall,
        keepkey::ButtonRequestType::SignTx => ButtonRequestKind::SignTx,
        keepkey::ButtonRequestType::Address => ButtonRequestKind::Address,
    }
}

pub fn button_request_from_trezor(r: &trezor::ButtonRequest) -> ButtonRequest {
    use prost::Enumeration;
    ButtonRequest {
        kind: r.code.and_then(trezor::ButtonRequestType::from_i32).map(button_request_kind_from_trezor),
        data: r.data.clone(),
    }
}

pub fn button_request_from_keepkey(r: &keepkey::ButtonRequest) -> ButtonRequest {
    use prost::Enumeration;
    ButtonRequest {
        kind: r.code.and_then(keepkey::ButtonRequestType::from_i32).map(button_request_kind_from_keepkey),
        data: r.data.clone(),
    }
}

/// What stage of the transaction-signing dialog a `TxRequest` is asking
/// the host to supply. Trezor and KeepKey assign different wire numbers
/// to `TxExtraData`/`TxFinished`; this enum is the thing everything
/// downstream of the adapter actually matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxRequestKind {
    TxInput,
    TxOutput,
    TxMeta,
    TxExtraData,
    TxFinished,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TxRequestDetails {
    pub request_index: Option<u32>,
    pub tx_hash: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TxRequestSerialized {
    pub signature_index: Option<u32>,
    pub signature: Option<Vec<u8>>,
    pub serialized_tx: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TxRequest {
    pub kind: Option<TxRequestKind>,
    pub details: TxRequestDetails,
    pub serialized: Option<TxRequestSerialized>,
}

pub fn tx_request_from_trezor(r: &trezor::TxRequest) -> TxRequest {
    use prost::Enumeration;
    let kind = r.request_type.and_then(trezor::RequestType::from_i32).map(|t| match t {
        trezor::RequestType::TxInput => TxRequestKind::TxInput,
        trezor::RequestType::TxOutput => TxRequestKind::TxOutput,
        trezor::RequestType::TxMeta => TxRequestKind::TxMeta,
        trezor::RequestType::TxExtraData => TxRequestKind::TxExtraData,
        trezor::RequestType::TxFinished => TxRequestKind::TxFinished,
    });
    TxRequest {
        kind,
        details: r
            .details
            .as_ref()
            .map(|d| TxRequestDetails { request_index: d.request_index, tx_hash: d.tx_hash.clone() })
            .unwrap_or_default(),
        serialized: r.serialized.as_ref().map(|s| TxRequestSerialized {
            signature_index: s.signature_index,
            signature: s.signature.clone(),
            serialized_tx: s.serialized_tx.clone(),
        }),
    }
}

pub fn tx_request_from_keepkey(r: &keepkey::TxRequest) -> TxRequest {
    use prost::Enumeration;
    let kind = r.request_type.and_then(keepkey::RequestType::from_i32).map(|t| match t {
        keepkey::RequestType::TxInput => TxRequestKind::TxInput,
        keepkey::RequestType::TxOutput => TxRequestKind::TxOutput,
        keepkey::RequestType::TxMeta => TxRequestKind::TxMeta,
        keepkey::RequestType::TxExtraData => TxRequestKind::TxExtraData,
        keepkey::RequestType::TxFinished => TxRequestKind::TxFinished,
    });
    TxRequest {
        kind,
        details: r
            .details
            .as_ref()
            .map(|d| TxRequestDetails { request_index: d.request_index, tx_hash: d.tx_hash.clone() })
            .unwrap_or_default(),
        serialized: r.serialized.as_ref().map(|s| TxRequestSerialized {
            signature_index: s.signature_index,
            signature: s.signature.clone(),
            serialized_tx: s.serialized_tx.clone(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Success {
    pub message: Option<String>,
}

pub fn success_from_trezor(s: &trezor::Success) -> Success {
    Success { message: s.message.clone() }
}

pub fn success_from_keepkey(s: &keepkey::Success) -> Success {
    Success { message: s.message.clone() }
}

/// Why an operation failed. KeepKey never picked up Trezor's later
/// `PinMismatch` code, so it has no counterpart there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    UnexpectedMessage,
    ButtonExpected,
    DataError,
    ActionCancelled,
    PinExpected,
    PinCancelled,
    PinInvalid,
    InvalidSignature,
    ProcessError,
    NotEnoughFunds,
    NotInitialized,
    PinMismatch,
    FirmwareError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub kind: Option<FailureKind>,
    pub message: Option<String>,
}

pub fn failure_from_trezor(f: &trezor::Failure) -> Failure {
    use prost::Enumeration;
    let kind = f.code.and_then(trezor::FailureType::from_i32).map(|c| match c {
        trezor::FailureType::UnexpectedMessage => FailureKind::UnexpectedMessage,
        trezor::FailureType::ButtonExpected => FailureKind::ButtonExpected,
        trezor::FailureType::DataError => FailureKind::DataError,
        trezor::FailureType::ActionCancelled => FailureKind::ActionCancelled,
        trezor::FailureType::PinExpected => FailureKind::PinExpected,
        trezor::FailureType::PinCancelled => FailureKind::PinCancelled,
        trezor::FailureType::PinInvalid => FailureKind::PinInvalid,
        trezor::FailureType::InvalidSignature => FailureKind::InvalidSignature,
        trezor::FailureType::ProcessError => FailureKind::ProcessError,
        trezor::FailureType::NotEnoughFunds => FailureKind::NotEnoughFunds,
        trezor::FailureType::NotInitialized => FailureKind::NotInitialized,
        trezor::FailureType::PinMismatch => FailureKind::PinMismatch,
        trezor::FailureType::FirmwareError => FailureKind::FirmwareError,
    });
    Failure { kind, message: f.message.clone() }
}

pub fn failure_from_keepkey(f: &keepkey::Failure) -> Failure {
    use prost::Enumeration;
    let kind = f.code.and_then(keepkey::FailureType::from_i32).map(|c| match c {
        keepkey::FailureType::UnexpectedMessage => FailureKind::UnexpectedMessage,
        keepkey::FailureType::ButtonExpected => FailureKind::ButtonExpected,
        keepkey::FailureType::DataError => FailureKind::DataError,
        keepkey::FailureType::ActionCancelled => FailureKind::ActionCancelled,
        keepkey::FailureType::PinExpected => FailureKind::PinExpected,
        keepkey::FailureType::PinCancelled => FailureKind::PinCancelled,
        keepkey::FailureType::PinInvalid => FailureKind::PinInvalid,
        keepkey::FailureType::InvalidSignature => FailureKind::InvalidSignature,
        keepkey::FailureType::ProcessError => FailureKind::ProcessError,
        keepkey::FailureType::NotEnoughFunds => FailureKind::NotEnoughFunds,
        keepkey::FailureType::NotInitialized => FailureKind::NotInitialized,
        keepkey::FailureType::FirmwareError => FailureKind::FirmwareError,
    });
    Failure { kind, message: f.message.clone() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageSignature {
    pub address: Option<String>,
    pub signature: Option<Vec<u8>>,
}

pub fn message_signature_from_trezor(m: &trezor::MessageSignature) -> MessageSignature {
    MessageSignature { address: m.address.clone(), signature: m.signature.clone() }
}

pub fn message_signature_from_keepkey(m: &keepkey::MessageSignature) -> MessageSignature {
    MessageSignature { address: m.address.clone(), signature: m.signature.clone() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CipheredKeyValue {
    pub value: Option<Vec<u8>>,
}

pub fn ciphered_key_value_from_trezor(c: &trezor::CipheredKeyValue) -> CipheredKeyValue {
    CipheredKeyValue { value: c.value.clone() }
}

pub fn ciphered_key_value_from_keepkey(c: &keepkey::CipheredKeyValue) -> CipheredKeyValue {
    CipheredKeyValue { value: c.value.clone() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignedIdentity {
    pub address: Option<String>,
    pub public_key: Option<Vec<u8>>,
    pub signature: Option<Vec<u8>>,
}

pub fn signed_identity_from_trezor(s: &trezor::SignedIdentity) -> SignedIdentity {
    SignedIdentity { address: s.address.clone(), public_key: s.public_key.clone(), signature: s.signature.clone() }
}

pub fn signed_identity_from_keepkey(s: &keepkey::SignedIdentity) -> SignedIdentity {
    SignedIdentity { address: s.address.clone(), public_key: s.public_key.clone(), signature: s.signature.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_type_numbering_divergence_is_absorbed() {
        use prost::Enumeration;
        let trezor_finished = trezor::RequestType::TxFinished as i32;
        let keepkey_finished = keepkey::RequestType::TxFinished as i32;
        assert_ne!(trezor_finished, keepkey_finished);

        let t = tx_request_from_trezor(&trezor::TxRequest {
            request_type: Some(trezor_finished),
            details: None,
            serialized: None,
        });
        let k = tx_request_from_keepkey(&keepkey::TxRequest {
            request_type: Some(keepkey_finished),
            details: None,
            serialized: None,
        });
        assert_eq!(t.kind, Some(TxRequestKind::TxFinished));
        assert_eq!(k.kind, Some(TxRequestKind::TxFinished));
        let _ = trezor::RequestType::from_i32(0);
    }

    #[test]
    fn keepkey_features_carries_model_trezor_does_not() {
        let kf = keepkey::Features { model: Some("K1-14AM".into()), ..Default::default() };
        assert_eq!(features_from_keepkey(&kf).model, Some("K1-14AM".into()));
    }

    #[test]
    fn pin_mismatch_has_no_keepkey_counterpart() {
        let f = failure_from_trezor(&trezor::Failure {
            code: Some(trezor::FailureType::PinMismatch as i32),
            message: None,
        });
        assert_eq!(f.kind, Some(FailureKind::PinMismatch));
    }
}
