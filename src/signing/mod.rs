//! Signing Coordinator (C5): drives the device-initiated TxRequest/TxAck
//! dialog for a single in-flight Bitcoin transaction signature.
//!
//! Only P2PKH and P2SH outputs are recognised (§4.5 non-goal: multisig
//! and witness scripts are out of scope). Ancestor transactions are
//! supplied up front by the caller; anything the device asks for that
//! isn't in the `AncestorStore` or input-path map is a host-side data
//! gap, not a protocol error, and fails the job (§7).

use std::collections::HashMap;

use bitcoin::{Network, Transaction, Txid};

use crate::adapter::{TxRequest, TxRequestKind};
use crate::codec::{keepkey, trezor};
use crate::error::{Error, Result};
use crate::path::AddressN;

/// Stand-in for the wire `InputScriptType` enum, kept vendor-neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputScriptType {
    SpendAddress,
}

/// Stand-in for the wire `OutputScriptType` enum. Only the two kinds
/// this coordinator ever emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputScriptType {
    PayToAddress,
    PayToScriptHash,
}

#[derive(Debug, Clone)]
pub struct TxInput {
    pub address_n: AddressN,
    pub prev_hash: Vec<u8>,
    pub prev_index: u32,
    pub script_sig: Option<Vec<u8>>,
    pub sequence: Option<u32>,
    pub script_type: InputScriptType,
}

#[derive(Debug, Clone)]
pub struct TxOutputBin {
    pub amount: u64,
    pub script_pubkey: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct TxOutput {
    pub address: Option<String>,
    pub address_n: AddressN,
    pub amount: u64,
    pub script_type: OutputScriptType,
}

/// The content of a single `TxAck` in response to one `TxRequest`. Only
/// the fields relevant to the request being answered are populated; the
/// rest are left empty, matching what the device actually asks for.
#[derive(Debug, Clone, Default)]
pub struct TxAckPayload {
    pub version: Option<u32>,
    pub lock_time: Option<u32>,
    pub inputs_cnt: Option<u32>,
    pub outputs_cnt: Option<u32>,
    pub inputs: Vec<TxInput>,
    pub bin_outputs: Vec<TxOutputBin>,
    pub outputs: Vec<TxOutput>,
}

pub fn to_trezor(payload: &TxAckPayload) -> trezor::TxAck {
    trezor::TxAck {
        tx: trezor::TransactionType {
            version: payload.version,
            lock_time: payload.lock_time,
            inputs_cnt: payload.inputs_cnt,
            outputs_cnt: payload.outputs_cnt,
            inputs: payload.inputs.iter().map(to_trezor_input).collect(),
            bin_outputs: payload.bin_outputs.iter().map(to_trezor_bin_output).collect(),
            outputs: payload.outputs.iter().map(to_trezor_output).collect(),
        },
    }
}

fn to_trezor_input(i: &TxInput) -> trezor::TxInputType {
    trezor::TxInputType {
        address_n: i.address_n.clone(),
        prev_hash: i.prev_hash.clone(),
        prev_index: i.prev_index,
        script_sig: i.script_sig.clone(),
        sequence: i.sequence,
        script_type: Some(match i.script_type {
            InputScriptType::SpendAddress => trezor::InputScriptType::SpendAddress as i32,
        }),
    }
}

fn to_trezor_bin_output(o: &TxOutputBin) -> trezor::TxOutputBinType {
    trezor::TxOutputBinType { amount: o.amount, script_pubkey: o.script_pubkey.clone() }
}

fn to_trezor_output(o: &TxOutput) -> trezor::TxOutputType {
    trezor::TxOutputType {
        address: o.address.clone(),
        address_n: o.address_n.clone(),
        amount: o.amount,
        script_type: Some(match o.script_type {
            OutputScriptType::PayToAddress => trezor::OutputScriptType::PayToAddress as i32,
            OutputScriptType::PayToScriptHash => trezor::OutputScriptType::PayToScriptHash as i32,
        }),
    }
}

pub fn to_keepkey(payload: &TxAckPayload) -> keepkey::TxAck {
    keepkey::TxAck {
        tx: keepkey::TransactionType {
            version: payload.version,
            lock_time: payload.lock_time,
            inputs: payload.inputs.iter().map(to_keepkey_input).collect(),
            bin_outputs: payload.bin_outputs.iter().map(to_keepkey_bin_output).collect(),
            outputs: payload.outputs.iter().map(to_keepkey_output).collect(),
        },
    }
}

fn to_keepkey_input(i: &TxInput) -> keepkey::TxInputType {
    keepkey::TxInputType {
        address_n: i.address_n.clone(),
        prev_hash: i.prev_hash.clone(),
        prev_index: i.prev_index,
        script_sig: i.script_sig.clone(),
        sequence: i.sequence,
        script_type: Some(match i.script_type {
            InputScriptType::SpendAddress => keepkey::InputScriptType::SpendAddress as i32,
        }),
    }
}

fn to_keepkey_bin_output(o: &TxOutputBin) -> keepkey::TxOutputBinType {
    keepkey::TxOutputBinType { amount: o.amount, script_pubkey: o.script_pubkey.clone() }
}

fn to_keepkey_output(o: &TxOutput) -> keepkey::TxOutputType {
    keepkey::TxOutputType {
        address: o.address.clone(),
        address_n: o.address_n.clone(),
        amount: o.amount,
        script_type: Some(match o.script_type {
            OutputScriptType::PayToAddress => keepkey::OutputScriptType::PayToAddress as i32,
            OutputScriptType::PayToScriptHash => keepkey::OutputScriptType::PayToScriptHash as i32,
        }),
        exchange_type: None,
    }
}

/// Previous transactions the device may ask about while verifying the
/// inputs being spent, keyed by their txid in the device's own byte
/// order (which matches `bitcoin::Txid`'s internal representation —
/// no reversal needed).
#[derive(Debug, Clone, Default)]
pub struct AncestorStore {
    by_txid: HashMap<Txid, Transaction>,
}

impl AncestorStore {
    pub fn new() -> Self {
        AncestorStore::default()
    }

    pub fn insert(&mut self, tx: Transaction) {
        self.by_txid.insert(tx.compute_txid(), tx);
    }

    pub fn get(&self, txid_bytes: &[u8]) -> Option<&Transaction> {
        let txid = Txid::from_slice(txid_bytes).ok()?;
        self.by_txid.get(&txid)
    }
}

/// A single in-flight `signTx` operation (§4.5). Only one may exist per
/// session; `Context::start_job` enforces this.
pub struct SigningJob {
    current: Transaction,
    input_path_map: HashMap<u32, AddressN>,
    change_address_map: HashMap<String, AddressN>,
    ancestors: AncestorStore,
    network: Network,
    pub signatures: Vec<(u32, Vec<u8>)>,
    pub serialized_tx: Vec<u8>,
}

impl SigningJob {
    pub fn new(
        current: Transaction,
        input_path_map: HashMap<u32, AddressN>,
        change_address_map: HashMap<String, AddressN>,
        ancestors: AncestorStore,
        network: Network,
    ) -> Self {
        SigningJob {
            current,
            input_path_map,
            change_address_map,
            ancestors,
            network,
            signatures: Vec::new(),
            serialized_tx: Vec::new(),
        }
    }

    /// Records the `serialized` half of a TxRequest, if present, ahead
    /// of computing the next ack (§4.5 "signature accumulation").
    fn record_serialized(&mut self, req: &TxRequest) {
        let Some(serialized) = &req.serialized else { return };
        if let (Some(index), Some(sig)) = (serialized.signature_index, &serialized.signature) {
            self.signatures.push((index, sig.clone()));
        }
        if let Some(chunk) = &serialized.serialized_tx {
            self.serialized_tx.extend_from_slice(chunk);
        }
    }

    fn ancestor_or_current<'a>(&'a self, req: &TxRequest) -> Result<&'a Transaction> {
        match &req.details.tx_hash {
            Some(hash) => self.ancestors.get(hash).ok_or_else(|| Error::MissingAncestor(hex_string(hash))),
            None => Ok(&self.current),
        }
    }

    /// Classify one of the current transaction's own outputs as
    /// pay-to-pubkey-hash or pay-to-script-hash, and resolve its
    /// address and (if it's a known change output) derivation path.
    fn classify_current_output(&self, index: u32, txout: &bitcoin::TxOut) -> Result<TxOutput> {
        let script = &txout.script_pubkey;
        let script_type = if script.is_p2pkh() {
            OutputScriptType::PayToAddress
        } else if script.is_p2sh() {
            OutputScriptType::PayToScriptHash
        } else {
            return Err(Error::IllegalOutputScript(index));
        };

        let address = bitcoin::Address::from_script(script, self.network)
            .map_err(|_| Error::IllegalOutputScript(index))?
            .to_string();

        if let Some(path) = self.change_address_map.get(&address) {
            Ok(TxOutput { address: None, address_n: path.clone(), amount: txout.value.to_sat(), script_type })
        } else {
            Ok(TxOutput { address: Some(address), address_n: Vec::new(), amount: txout.value.to_sat(), script_type })
        }
    }

    /// Build the `TxAck` payload answering a single `TxRequest`, having
    /// first folded in any signature/serialized-tx data it carried.
    /// Returns `None` for `TxFinished`, which has no ack — the job is
    /// simply done.
    pub fn respond(&mut self, req: &TxRequest) -> Result<Option<TxAckPayload>> {
        self.record_serialized(req);

        let Some(kind) = req.kind else {
            return Err(Error::MalformedFrame("TxRequest with no request_type"));
        };

        match kind {
            TxRequestKind::TxFinished => Ok(None),
            TxRequestKind::TxMeta => {
                let tx = self.ancestor_or_current(req)?;
                Ok(Some(TxAckPayload {
                    version: Some(tx.version.0 as u32),
                    lock_time: Some(tx.lock_time.to_consensus_u32()),
                    inputs_cnt: Some(tx.input.len() as u32),
                    outputs_cnt: Some(tx.output.len() as u32),
                    ..Default::default()
                }))
            }
            TxRequestKind::TxInput => {
                let index = req.details.request_index.ok_or(Error::MalformedFrame("TxInput request without index"))?;
                let is_ancestor = req.details.tx_hash.is_some();
                let tx = self.ancestor_or_current(req)?;
                let txin = tx
                    .input
                    .get(index as usize)
                    .ok_or(Error::MalformedFrame("TxInput request index out of range"))?;

                let input = if is_ancestor {
                    TxInput {
                        address_n: Vec::new(),
                        prev_hash: txin.previous_output.txid.to_byte_array().to_vec(),
                        prev_index: txin.previous_output.vout,
                        script_sig: Some(txin.script_sig.to_bytes()),
                        sequence: Some(txin.sequence.0),
                        script_type: InputScriptType::SpendAddress,
                    }
                } else {
                    let path = self
                        .input_path_map
                        .get(&index)
                        .cloned()
                        .ok_or(Error::MissingInputPath(index))?;
                    TxInput {
                        address_n: path,
                        prev_hash: txin.previous_output.txid.to_byte_array().to_vec(),
                        prev_index: txin.previous_output.vout,
                        script_sig: None,
                        sequence: Some(txin.sequence.0),
                        script_type: InputScriptType::SpendAddress,
                    }
                };
                Ok(Some(TxAckPayload { inputs: vec![input], ..Default::default() }))
            }
            TxRequestKind::TxOutput => {
                let index = req.details.request_index.ok_or(Error::MalformedFrame("TxOutput request without index"))?;
                let is_ancestor = req.details.tx_hash.is_some();
                let tx = self.ancestor_or_current(req)?;
                let txout = tx
                    .output
                    .get(index as usize)
                    .ok_or(Error::MalformedFrame("TxOutput request index out of range"))?;

                if is_ancestor {
                    let bin = TxOutputBin { amount: txout.value.to_sat(), script_pubkey: txout.script_pubkey.to_bytes() };
                    Ok(Some(TxAckPayload { bin_outputs: vec![bin], ..Default::default() }))
                } else {
                    let output = self.classify_current_output(index, txout)?;
                    Ok(Some(TxAckPayload { outputs: vec![output], ..Default::default() }))
                }
            }
            TxRequestKind::TxExtraData => {
                Err(Error::MalformedFrame("TxExtraData (OP_RETURN payload) requests are out of scope"))
            }
        }
    }

    pub fn finished_tx_bytes(&self) -> &[u8] {
        &self.serialized_tx
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::absolute::LockTime;
    use bitcoin::transaction::Version;
    use bitcoin::{Amount, OutPoint, ScriptBuf, Sequence, TxIn, TxOut, Witness};

    fn dummy_tx(num_inputs: usize, num_outputs: usize) -> Transaction {
        Transaction {
            version: Version(2),
            lock_time: LockTime::ZERO,
            input: (0..num_inputs)
                .map(|i| TxIn {
                    previous_output: OutPoint { txid: Txid::from_byte_array([i as u8; 32]), vout: 0 },
                    script_sig: ScriptBuf::new(),
                    sequence: Sequence::MAX,
                    witness: Witness::new(),
                })
                .collect(),
            output: (0..num_outputs)
                .map(|_| TxOut { value: Amount::from_sat(1000), script_pubkey: ScriptBuf::new() })
                .collect(),
        }
    }

    #[test]
    fn missing_input_path_fails_job() {
        let tx = dummy_tx(1, 1);
        let mut job = SigningJob::new(tx, HashMap::new(), HashMap::new(), AncestorStore::new(), Network::Bitcoin);
        let req = TxRequest {
            kind: Some(TxRequestKind::TxInput),
            details: crate::adapter::TxRequestDetails { request_index: Some(0), tx_hash: None },
            serialized: None,
        };
        assert!(matches!(job.respond(&req), Err(Error::MissingInputPath(0))));
    }

    #[test]
    fn missing_ancestor_fails_job() {
        let tx = dummy_tx(1, 1);
        let mut job = SigningJob::new(tx, HashMap::new(), HashMap::new(), AncestorStore::new(), Network::Bitcoin);
        let req = TxRequest {
            kind: Some(TxRequestKind::TxMeta),
            details: crate::adapter::TxRequestDetails { request_index: None, tx_hash: Some(vec![0u8; 32]) },
            serialized: None,
        };
        assert!(matches!(job.respond(&req), Err(Error::MissingAncestor(_))));
    }

    #[test]
    fn tx_meta_reports_current_tx_counts() {
        let tx = dummy_tx(2, 3);
        let mut job = SigningJob::new(tx, HashMap::new(), HashMap::new(), AncestorStore::new(), Network::Bitcoin);
        let req = TxRequest {
            kind: Some(TxRequestKind::TxMeta),
            details: crate::adapter::TxRequestDetails { request_index: None, tx_hash: None },
            serialized: None,
        };
        let ack = job.respond(&req).unwrap().unwrap();
        assert_eq!(ack.inputs_cnt, Some(2));
        assert_eq!(ack.outputs_cnt, Some(3));
    }

    #[test]
    fn tx_finished_yields_no_ack() {
        let tx = dummy_tx(1, 1);
        let mut job = SigningJob::new(tx, HashMap::new(), HashMap::new(), AncestorStore::new(), Network::Bitcoin);
        let req = TxRequest {
            kind: Some(TxRequestKind::TxFinished),
            details: Default::default(),
            serialized: Some(crate::adapter::TxRequestSerialized {
                signature_index: None,
                signature: None,
                serialized_tx: Some(vec![1, 2, 3]),
            }),
        };
        assert!(job.respond(&req).unwrap().is_none());
        assert_eq!(job.finished_tx_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn signature_and_serialized_chunks_accumulate_in_order() {
        let tx = dummy_tx(1, 1);
        let mut job = SigningJob::new(tx, HashMap::new(), HashMap::new(), AncestorStore::new(), Network::Bitcoin);
        for chunk in [vec![0xaa], vec![0xbb]] {
            let req = TxRequest {
                kind: Some(TxRequestKind::TxFinished),
                details: Default::default(),
                serialized: Some(crate::adapter::TxRequestSerialized {
                    signature_index: Some(0),
                    signature: Some(vec![0xff]),
                    serialized_tx: Some(chunk),
                }),
            };
            job.respond(&req).unwrap();
        }
        assert_eq!(job.serialized_tx, vec![0xaa, 0xbb]);
        assert_eq!(job.signatures.len(), 2);
    }
}
