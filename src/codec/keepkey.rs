//! KeepKey wire schema (C2): KeepKey forked `trezor-common`'s protobuf
//! schema early on, so the message shapes below track `trezor.rs`
//! closely, but the `type_tag` numbering and a handful of enums drifted
//! as the two firmwares evolved independently (§4.3). The `Vendor`
//! adapter (C3) is what reconciles the two into one internal vocabulary
//! — nothing downstream of it ever sees a `keepkey::*` type.

#![allow(missing_docs)]

use prost::{Enumeration, Message};

#[derive(Clone, PartialEq, Message)]
pub struct Initialize {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub session_id: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Ping {
    #[prost(string, optional, tag = "1")]
    pub message: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Success {
    #[prost(string, optional, tag = "1")]
    pub message: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enumeration)]
#[repr(i32)]
pub enum FailureType {
    UnexpectedMessage = 1,
    ButtonExpected = 2,
    DataError = 3,
    ActionCancelled = 4,
    PinExpected = 5,
    PinCancelled = 6,
    PinInvalid = 7,
    InvalidSignature = 8,
    ProcessError = 9,
    NotEnoughFunds = 10,
    NotInitialized = 11,
    FirmwareError = 99,
}

#[derive(Clone, PartialEq, Message)]
pub struct Failure {
    #[prost(enumeration = "FailureType", optional, tag = "1")]
    pub code: Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub message: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct GetPublicKey {
    #[prost(uint32, repeated, tag = "1")]
    pub address_n: Vec<u32>,
    #[prost(bool, optional, tag = "2")]
    pub show_display: Option<bool>,
    #[prost(string, optional, tag = "3")]
    pub coin_name: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct HdNodeType {
    #[prost(uint32, required, tag = "1")]
    pub depth: u32,
    #[prost(uint32, required, tag = "2")]
    pub fingerprint: u32,
    #[prost(uint32, required, tag = "3")]
    pub child_num: u32,
    #[prost(bytes = "vec", required, tag = "4")]
    pub chain_code: Vec<u8>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub public_key: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PublicKey {
    #[prost(message, required, tag = "1")]
    pub node: HdNodeType,
    #[prost(string, optional, tag = "2")]
    pub xpub: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SignTx {
    #[prost(uint32, required, tag = "1")]
    pub outputs_count: u32,
    #[prost(uint32, required, tag = "2")]
    pub inputs_count: u32,
    #[prost(string, optional, tag = "3")]
    pub coin_name: Option<String>,
    #[prost(uint32, optional, tag = "4")]
    pub version: Option<u32>,
    #[prost(uint32, optional, tag = "5")]
    pub lock_time: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct GetFeatures {}

#[derive(Clone, PartialEq, Message)]
pub struct Features {
    #[prost(string, optional, tag = "1")]
    pub vendor: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub model: Option<String>,
    #[prost(uint32, optional, tag = "3")]
    pub major_version: Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub minor_version: Option<u32>,
    #[prost(uint32, optional, tag = "5")]
    pub patch_version: Option<u32>,
    #[prost(bool, optional, tag = "6")]
    pub bootloader_mode: Option<bool>,
    #[prost(string, optional, tag = "7")]
    pub device_id: Option<String>,
    #[prost(bool, optional, tag = "8")]
    pub pin_protection: Option<bool>,
    #[prost(bool, optional, tag = "9")]
    pub passphrase_protection: Option<bool>,
    #[prost(string, optional, tag = "10")]
    pub label: Option<String>,
    #[prost(bool, optional, tag = "11")]
    pub initialized: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enumeration)]
#[repr(i32)]
pub enum PinMatrixRequestType {
    Current = 1,
    NewFirst = 2,
    NewSecond = 3,
}

#[derive(Clone, PartialEq, Message)]
pub struct PinMatrixRequest {
    #[prost(enumeration = "PinMatrixRequestType", optional, tag = "1")]
    pub r#type: Option<i32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PinMatrixAck {
    #[prost(string, required, tag = "1")]
    pub pin: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Cancel {}

/// KeepKey numbers its `TXEXTRADATA` variant before `TXFINISHED`, unlike
/// upstream Trezor — harmless on the wire since both sides agree on
/// their own numbering, but exactly the kind of divergence C3 exists to
/// absorb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Enumeration)]
#[repr(i32)]
pub enum RequestType {
    TxInput = 0,
    TxOutput = 1,
    TxMeta = 2,
    TxExtraData = 3,
    TxFinished = 4,
}

#[derive(Clone, PartialEq, Message)]
pub struct TxRequestDetailsType {
    #[prost(uint32, optional, tag = "1")]
    pub request_index: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub tx_hash: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TxRequestSerializedType {
    #[prost(uint32, optional, tag = "1")]
    pub signature_index: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub signature: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub serialized_tx: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TxRequest {
    #[prost(enumeration = "RequestType", optional, tag = "1")]
    pub request_type: Option<i32>,
    #[prost(message, optional, tag = "2")]
    pub details: Option<TxRequestDetailsType>,
    #[prost(message, optional, tag = "3")]
    pub serialized: Option<TxRequestSerializedType>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enumeration)]
#[repr(i32)]
pub enum InputScriptType {
    SpendAddress = 0,
    SpendMultisig = 1,
    External = 2,
    SpendWitness = 3,
    SpendP2shWitness = 4,
}

#[derive(Clone, PartialEq, Message)]
pub struct TxInputType {
    #[prost(uint32, repeated, tag = "1")]
    pub address_n: Vec<u32>,
    #[prost(bytes = "vec", required, tag = "2")]
    pub prev_hash: Vec<u8>,
    #[prost(uint32, required, tag = "3")]
    pub prev_index: u32,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub script_sig: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "5")]
    pub sequence: Option<u32>,
    #[prost(enumeration = "InputScriptType", optional, tag = "6")]
    pub script_type: Option<i32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enumeration)]
#[repr(i32)]
pub enum OutputScriptType {
    PayToAddress = 0,
    PayToScriptHash = 1,
    PayToMultisig = 2,
    PayToOpReturn = 3,
}

#[derive(Clone, PartialEq, Message)]
pub struct TxOutputType {
    #[prost(string, optional, tag = "1")]
    pub address: Option<String>,
    #[prost(uint32, repeated, tag = "2")]
    pub address_n: Vec<u32>,
    #[prost(uint64, required, tag = "3")]
    pub amount: u64,
    #[prost(enumeration = "OutputScriptType", optional, tag = "4")]
    pub script_type: Option<i32>,
    /// ShapeShift-integration leftover from KeepKey's now-retired
    /// in-device exchange feature. Multisig/exchange outputs are out of
    /// scope (§4.5); the adapter never reads this field.
    #[prost(bytes = "vec", optional, tag = "5")]
    pub exchange_type: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TxOutputBinType {
    #[prost(uint64, required, tag = "1")]
    pub amount: u64,
    #[prost(bytes = "vec", required, tag = "2")]
    pub script_pubkey: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TransactionType {
    #[prost(uint32, optional, tag = "1")]
    pub version: Option<u32>,
    #[prost(message, repeated, tag = "2")]
    pub inputs: Vec<TxInputType>,
    #[prost(message, repeated, tag = "3")]
    pub bin_outputs: Vec<TxOutputBinType>,
    #[prost(message, repeated, tag = "5")]
    pub outputs: Vec<TxOutputType>,
    #[prost(uint32, optional, tag = "4")]
    pub lock_time: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TxAck {
    #[prost(message, required, tag = "1")]
    pub tx: TransactionType,
}

#[derive(Clone, PartialEq, Message)]
pub struct ClearSession {}

#[derive(Clone, PartialEq, Message)]
pub struct ApplySettings {
    #[prost(string, optional, tag = "1")]
    pub language: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub label: Option<String>,
    /// KeepKey-specific screensaver knob; the adapter has no internal
    /// label for it and it is dropped at the C3 boundary.
    #[prost(uint32, optional, tag = "3")]
    pub auto_lock_delay_ms: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enumeration)]
#[repr(i32)]
pub enum ButtonRequestType {
    Other = 1,
    FeeOverThreshold = 2,
    ConfirmOutput = 3,
    ConfirmWord = 5,
    WipeDevice = 6,
    ProtectCall = 7,
    SignTx = 8,
    Address = 10,
}

#[derive(Clone, PartialEq, Message)]
pub struct ButtonRequest {
    #[prost(enumeration = "ButtonRequestType", optional, tag = "1")]
    pub code: Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub data: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ButtonAck {}

#[derive(Clone, PartialEq, Message)]
pub struct GetAddress {
    #[prost(uint32, repeated, tag = "1")]
    pub address_n: Vec<u32>,
    #[prost(string, optional, tag = "2")]
    pub coin_name: Option<String>,
    #[prost(bool, optional, tag = "3")]
    pub show_display: Option<bool>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Address {
    #[prost(string, required, tag = "1")]
    pub address: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct MessageSignature {
    #[prost(string, optional, tag = "1")]
    pub address: Option<String>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub signature: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CipheredKeyValue {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub value: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PassphraseRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct PassphraseAck {
    #[prost(string, required, tag = "1")]
    pub passphrase: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct IdentityType {
    #[prost(string, optional, tag = "1")]
    pub proto: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub user: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub host: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub port: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub path: Option<String>,
    #[prost(uint32, optional, tag = "6")]
    pub index: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SignIdentity {
    #[prost(message, optional, tag = "1")]
    pub identity: Option<IdentityType>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub challenge_hidden: Option<Vec<u8>>,
    #[prost(string, optional, tag = "3")]
    pub challenge_visual: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SignedIdentity {
    #[prost(string, optional, tag = "1")]
    pub address: Option<String>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub public_key: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub signature: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct WipeDevice {}

#[derive(Clone, PartialEq, Message)]
pub struct ChangePin {
    #[prost(bool, optional, tag = "1")]
    pub remove: Option<bool>,
}

#[derive(Clone, PartialEq, Message)]
pub struct RecoveryDevice {
    #[prost(uint32, optional, tag = "1")]
    pub word_count: Option<u32>,
    #[prost(bool, optional, tag = "2")]
    pub pin_protection: Option<bool>,
    #[prost(string, optional, tag = "3")]
    pub label: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct WordRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct WordAck {
    #[prost(string, required, tag = "1")]
    pub word: String,
}

/// `(type_tag, label)` table for KeepKey. Numbering tracks KeepKey's own
/// `messages.proto`, which is not identical to Trezor's despite the
/// shared ancestry (§4.3).
pub const TYPE_TAGS: &[(u16, crate::vendor::MessageLabel)] = {
    use crate::vendor::MessageLabel as L;
    &[
        (0, L::Initialize),
        (1, L::Ping),
        (2, L::Success),
        (3, L::Failure),
        (4, L::ChangePin),
        (5, L::WipeDevice),
        (10, L::GetFeatures),
        (11, L::GetPublicKey),
        (12, L::PublicKey),
        (15, L::SignTx),
        (17, L::Features),
        (18, L::PinMatrixRequest),
        (19, L::PinMatrixAck),
        (20, L::Cancel),
        (21, L::TxRequest),
        (22, L::TxAck),
        (25, L::ClearSession),
        (26, L::ApplySettings),
        (27, L::ButtonRequest),
        (28, L::ButtonAck),
        (29, L::GetAddress),
        (30, L::Address),
        (40, L::MessageSignature),
        (48, L::CipheredKeyValue),
        (55, L::PassphraseRequest),
        (56, L::PassphraseAck),
        (45, L::RecoveryDevice),
        (46, L::WordRequest),
        (47, L::WordAck),
        (53, L::SignIdentity),
        (54, L::SignedIdentity),
    ]
};
