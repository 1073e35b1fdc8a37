//! Vendor identity and the closed union of message labels the Codec
//! Registry (C2) classifies wire messages into.

/// The two hardware-wallet families this core understands. Both speak a
/// Trezor-derived protobuf dialect; KeepKey forked the schema early on and
/// diverged in field/enum naming without changing the underlying protocol
/// shape (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    Trezor,
    KeepKey,
}

impl Vendor {
    /// USB vendor/product IDs, informative only (§6) — this crate performs
    /// no enumeration itself, but an embedder's own enumeration code can
    /// use these constants instead of hard-coding them again.
    pub const TREZOR_V1: (u16, u16) = (0x534c, 0x0001);
    pub const KEEPKEY: (u16, u16) = (0x2b24, 0x0001);
    pub const KEEPKEY_RPI_SHIELD: (u16, u16) = (0x10c4, 0xea80);
}

/// The closed union of message labels across both vendor schemas (§4.2).
/// Every `(Vendor, type_tag)` pair the Codec Registry knows about maps to
/// exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageLabel {
    Initialize,
    Ping,
    Success,
    Failure,
    ChangePin,
    WipeDevice,
    FirmwareErase,
    FirmwareUpload,
    GetEntropy,
    Entropy,
    GetPublicKey,
    PublicKey,
    LoadDevice,
    ResetDevice,
    SignTx,
    SimpleSignTx,
    GetFeatures,
    Features,
    PinMatrixRequest,
    PinMatrixAck,
    Cancel,
    TxRequest,
    TxAck,
    CipherKeyValue,
    CipheredKeyValue,
    ClearSession,
    ApplySettings,
    ButtonRequest,
    ButtonAck,
    GetAddress,
    Address,
    EntropyRequest,
    EntropyAck,
    SignMessage,
    VerifyMessage,
    MessageSignature,
    EncryptMessage,
    EncryptedMessage,
    DecryptMessage,
    DecryptedMessage,
    PassphraseRequest,
    PassphraseAck,
    EstimateTxSize,
    TxSize,
    RecoveryDevice,
    WordRequest,
    WordAck,
    SignIdentity,
    SignedIdentity,
    DebugLinkDecision,
    DebugLinkGetState,
    DebugLinkState,
    DebugLinkStop,
    DebugLinkLog,
}

impl MessageLabel {
    /// Reprompt labels the half-duplex discipline (§4.4) must answer
    /// before the operation that triggered them can make progress.
    pub fn is_reprompt(self) -> bool {
        matches!(
            self,
            MessageLabel::PinMatrixRequest
                | MessageLabel::PassphraseRequest
                | MessageLabel::ButtonRequest
                | MessageLabel::TxRequest
        )
    }

    /// Terminal labels that end an operation's reprompt loop.
    pub fn is_terminal(self) -> bool {
        matches!(self, MessageLabel::Success | MessageLabel::Failure)
    }
}
