//! Trezor wire schema (C2): a hand-annotated subset of the canonical
//! `trezor-common` `messages.proto` / `types.proto`, expressed as
//! `prost::Message` structs so no `protoc` build step is required. Field
//! numbers follow the upstream schema; fields this core never reads or
//! writes are omitted rather than carried as dead weight.
//!
//! See http://doc.satoshilabs.com/trezor-tech/api-protobuf.html

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
    PinMismatch = 12,
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
pub struct ChangePin {
    #[prost(bool, optional, tag = "1")]
    pub remove: Option<bool>,
}

#[derive(Clone, PartialEq, Message)]
pub struct WipeDevice {}

#[derive(Clone, PartialEq, Message)]
pub struct FirmwareErase {
    #[prost(uint32, optional, tag = "1")]
    pub length: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct FirmwareUpload {
    #[prost(bytes = "vec", required, tag = "1")]
    pub payload: Vec<u8>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub hash: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct GetEntropy {
    #[prost(uint32, required, tag = "1")]
    pub size: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Entropy {
    #[prost(bytes = "vec", required, tag = "1")]
    pub entropy: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct GetPublicKey {
    #[prost(uint32, repeated, tag = "1")]
    pub address_n: Vec<u32>,
    #[prost(string, optional, tag = "2")]
    pub ecdsa_curve_name: Option<String>,
    #[prost(bool, optional, tag = "3")]
    pub show_display: Option<bool>,
    #[prost(string, optional, tag = "4")]
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
pub struct LoadDevice {
    #[prost(string, optional, tag = "1")]
    pub mnemonic: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub pin: Option<String>,
    #[prost(bool, optional, tag = "3")]
    pub passphrase_protection: Option<bool>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ResetDevice {
    #[prost(bool, optional, tag = "1")]
    pub display_random: Option<bool>,
    #[prost(uint32, optional, tag = "2")]
    pub strength: Option<u32>,
    #[prost(bool, optional, tag = "3")]
    pub passphrase_protection: Option<bool>,
    #[prost(bool, optional, tag = "4")]
    pub pin_protection: Option<bool>,
    #[prost(string, optional, tag = "5")]
    pub label: Option<String>,
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

/// KeepKey-era single-shot signing call. Superseded protocol-wide by the
/// `SignTx` + `TxRequest`/`TxAck` dialog the Signing Coordinator (C5)
/// drives; kept only for codec-registry completeness (§4.2's closed
/// union) since it still appears on the wire of older firmware.
#[derive(Clone, PartialEq, Message)]
pub struct SimpleSignTx {
    #[prost(string, optional, tag = "1")]
    pub coin_name: Option<String>,
    #[prost(uint32, optional, tag = "2")]
    pub version: Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub lock_time: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct GetFeatures {}

#[derive(Clone, PartialEq, Message)]
pub struct Features {
    #[prost(string, optional, tag = "1")]
    pub vendor: Option<String>,
    #[prost(uint32, optional, tag = "2")]
    pub major_version: Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub minor_version: Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub patch_version: Option<u32>,
    #[prost(bool, optional, tag = "5")]
    pub bootloader_mode: Option<bool>,
    #[prost(string, optional, tag = "6")]
    pub device_id: Option<String>,
    #[prost(bool, optional, tag = "7")]
    pub pin_protection: Option<bool>,
    #[prost(bool, optional, tag = "8")]
    pub passphrase_protection: Option<bool>,
    #[prost(string, optional, tag = "9")]
    pub label: Option<String>,
    #[prost(bool, optional, tag = "10")]
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

#[derive(Clone, Copy, Debug, PartialEq, Eq, Enumeration)]
#[repr(i32)]
pub enum RequestType {
    TxInput = 0,
    TxOutput = 1,
    TxMeta = 2,
    TxFinished = 3,
    TxExtraData = 4,
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
    PayToWitness = 4,
    PayToP2shWitness = 5,
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
    #[prost(uint32, optional, tag = "6")]
    pub inputs_cnt: Option<u32>,
    #[prost(uint32, optional, tag = "7")]
    pub outputs_cnt: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TxAck {
    #[prost(message, required, tag = "1")]
    pub tx: TransactionType,
}

#[derive(Clone, PartialEq, Message)]
pub struct CipherKeyValue {
    #[prost(uint32, repeated, tag = "1")]
    pub address_n: Vec<u32>,
    #[prost(string, required, tag = "2")]
    pub key: String,
    #[prost(bytes = "vec", required, tag = "3")]
    pub value: Vec<u8>,
    #[prost(bool, optional, tag = "4")]
    pub encrypt: Option<bool>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CipheredKeyValue {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub value: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ClearSession {}

#[derive(Clone, PartialEq, Message)]
pub struct ApplySettings {
    #[prost(string, optional, tag = "1")]
    pub language: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub label: Option<String>,
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
    PublicKey = 11,
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
pub struct EntropyRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct EntropyAck {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub entropy: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SignMessage {
    #[prost(uint32, repeated, tag = "1")]
    pub address_n: Vec<u32>,
    #[prost(bytes = "vec", required, tag = "2")]
    pub message: Vec<u8>,
    #[prost(string, optional, tag = "3")]
    pub coin_name: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct VerifyMessage {
    #[prost(string, optional, tag = "1")]
    pub address: Option<String>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub signature: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub message: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MessageSignature {
    #[prost(string, optional, tag = "1")]
    pub address: Option<String>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub signature: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct EncryptMessage {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub pubkey: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub message: Option<Vec<u8>>,
    #[prost(uint32, repeated, tag = "3")]
    pub address_n: Vec<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct EncryptedMessage {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub nonce: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub message: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub hmac: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct DecryptMessage {
    #[prost(uint32, repeated, tag = "1")]
    pub address_n: Vec<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub nonce: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub message: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct DecryptedMessage {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub message: Option<Vec<u8>>,
    #[prost(string, optional, tag = "2")]
    pub address: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PassphraseRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct PassphraseAck {
    #[prost(string, required, tag = "1")]
    pub passphrase: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct EstimateTxSize {
    #[prost(uint32, required, tag = "1")]
    pub outputs_count: u32,
    #[prost(uint32, required, tag = "2")]
    pub inputs_count: u32,
    #[prost(string, optional, tag = "3")]
    pub coin_name: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TxSize {
    #[prost(uint32, optional, tag = "1")]
    pub tx_size: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct RecoveryDevice {
    #[prost(uint32, optional, tag = "1")]
    pub word_count: Option<u32>,
    #[prost(bool, optional, tag = "2")]
    pub passphrase_protection: Option<bool>,
    #[prost(bool, optional, tag = "3")]
    pub pin_protection: Option<bool>,
    #[prost(string, optional, tag = "4")]
    pub label: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct WordRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct WordAck {
    #[prost(string, required, tag = "1")]
    pub word: String,
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
    #[prost(string, optional, tag = "4")]
    pub ecdsa_curve_name: Option<String>,
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
pub struct DebugLinkDecision {
    #[prost(bool, optional, tag = "1")]
    pub yes_no: Option<bool>,
}

#[derive(Clone, PartialEq, Message)]
pub struct DebugLinkGetState {}

#[derive(Clone, PartialEq, Message)]
pub struct DebugLinkState {
    #[prost(string, optional, tag = "1")]
    pub pin: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct DebugLinkStop {}

#[derive(Clone, PartialEq, Message)]
pub struct DebugLinkLog {
    #[prost(string, optional, tag = "1")]
    pub text: Option<String>,
}

/// `(type_tag, label)` table for this vendor, taken verbatim from the
/// `MessageType` enum of the upstream `.proto` file (§6).
pub const TYPE_TAGS: &[(u16, crate::vendor::MessageLabel)] = {
    use crate::vendor::MessageLabel as L;
    &[
        (0, L::Initialize),
        (1, L::Ping),
        (2, L::Success),
        (3, L::Failure),
        (4, L::ChangePin),
        (5, L::WipeDevice),
        (6, L::FirmwareErase),
        (7, L::FirmwareUpload),
        (9, L::GetEntropy),
        (10, L::Entropy),
        (11, L::GetPublicKey),
        (12, L::PublicKey),
        (13, L::LoadDevice),
        (14, L::ResetDevice),
        (15, L::SignTx),
        (16, L::SimpleSignTx),
        (17, L::Features),
        (18, L::PinMatrixRequest),
        (19, L::PinMatrixAck),
        (20, L::Cancel),
        (21, L::TxRequest),
        (22, L::TxAck),
        (23, L::CipherKeyValue),
        (24, L::CipheredKeyValue),
        (25, L::ClearSession),
        (26, L::ApplySettings),
        (27, L::ButtonRequest),
        (28, L::ButtonAck),
        (29, L::GetAddress),
        (30, L::Address),
        (35, L::EntropyRequest),
        (36, L::EntropyAck),
        (38, L::SignMessage),
        (39, L::VerifyMessage),
        (40, L::MessageSignature),
        (41, L::EncryptMessage),
        (42, L::EncryptedMessage),
        (43, L::DecryptMessage),
        (44, L::DecryptedMessage),
        (55, L::PassphraseRequest),
        (56, L::PassphraseAck),
        (57, L::EstimateTxSize),
        (58, L::TxSize),
        (45, L::RecoveryDevice),
        (46, L::WordRequest),
        (47, L::WordAck),
        (53, L::SignIdentity),
        (54, L::SignedIdentity),
        (100, L::DebugLinkDecision),
        (101, L::DebugLinkGetState),
        (102, L::DebugLinkState),
        (103, L::DebugLinkStop),
        (104, L::DebugLinkLog),
        (8, L::GetFeatures),
    ]
};
