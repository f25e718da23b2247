//! Hand-assembled `system.remark` extrinsics.
//!
//! The node only needs raw extrinsic bytes over `author_submitExtrinsic`, so
//! instead of a full chain SDK this builds the v4 signed extrinsic wire
//! format directly: SCALE compact lengths, an SS58-decoded account id, the
//! remark call, and the signature produced by the extension's `signPayload`.

use blake2::digest::consts::U32;
use blake2::{Blake2b512, Digest};
use serde_json::{json, Value};

use super::ChainError;

type Blake2b256 = blake2::Blake2b<U32>;

pub const SYSTEM_PALLET_INDEX: u8 = 0;
pub const REMARK_CALL_INDEX: u8 = 0;

const EXTRINSIC_VERSION: u8 = 4;
const SIGNED_MASK: u8 = 0b1000_0000;

/// SCALE compact encoding of an unsigned integer.
pub fn compact(value: u64) -> Vec<u8> {
    if value < 1 << 6 {
        vec![(value as u8) << 2]
    } else if value < 1 << 14 {
        (((value as u16) << 2) | 0b01).to_le_bytes().to_vec()
    } else if value < 1 << 30 {
        (((value as u32) << 2) | 0b10).to_le_bytes().to_vec()
    } else {
        let mut bytes = value.to_le_bytes().to_vec();
        while bytes.len() > 4 && bytes[bytes.len() - 1] == 0 {
            bytes.pop();
        }
        let mut out = vec![0b11 | (((bytes.len() - 4) as u8) << 2)];
        out.extend(bytes);
        out
    }
}

/// `System::remark` call bytes: pallet index, call index, SCALE `Bytes`.
pub fn remark_call(remark: &[u8]) -> Vec<u8> {
    let mut call = vec![SYSTEM_PALLET_INDEX, REMARK_CALL_INDEX];
    call.extend(compact(remark.len() as u64));
    call.extend_from_slice(remark);
    call
}

/// Decode an SS58 address into its 32-byte account id, verifying the
/// blake2b checksum.
pub fn ss58_decode(address: &str) -> Result<[u8; 32], ChainError> {
    let data = bs58::decode(address)
        .into_vec()
        .map_err(|e| ChainError::BadResponse(format!("invalid address {address}: {e}")))?;

    // One-byte network prefix + 32-byte account id + 2-byte checksum.
    if data.len() != 35 {
        return Err(ChainError::BadResponse(format!(
            "unexpected address length {} for {address}",
            data.len()
        )));
    }
    let (body, checksum) = data.split_at(33);

    let mut hasher = Blake2b512::new();
    hasher.update(b"SS58PRE");
    hasher.update(body);
    let digest = hasher.finalize();
    if digest[..2] != checksum[..] {
        return Err(ChainError::BadResponse(format!(
            "address checksum mismatch for {address}"
        )));
    }

    let mut account = [0u8; 32];
    account.copy_from_slice(&body[1..]);
    Ok(account)
}

/// Everything the extension needs to sign besides the call itself.
pub struct SignContext {
    pub address: String,
    pub nonce: u64,
    pub spec_version: u32,
    pub transaction_version: u32,
    pub genesis_hash: String,
}

/// The `signPayload` JSON handed to the extension. Immortal era, anchored at
/// genesis, standard signed extensions.
pub fn signer_payload_json(call: &[u8], ctx: &SignContext) -> Value {
    json!({
        "address": ctx.address,
        "blockHash": ctx.genesis_hash,
        "blockNumber": "0x00000000",
        "era": "0x00",
        "genesisHash": ctx.genesis_hash,
        "method": to_hex(call),
        "nonce": format!("0x{:08x}", ctx.nonce),
        "specVersion": format!("0x{:08x}", ctx.spec_version),
        "tip": "0x00000000000000000000000000000000",
        "transactionVersion": format!("0x{:08x}", ctx.transaction_version),
        "signedExtensions": [
            "CheckNonZeroSender",
            "CheckSpecVersion",
            "CheckTxVersion",
            "CheckGenesis",
            "CheckMortality",
            "CheckNonce",
            "CheckWeight",
            "ChargeTransactionPayment",
        ],
        "version": 4,
    })
}

/// Assemble the length-prefixed v4 signed extrinsic.
///
/// `signature` is the multi-signature exactly as returned by the extension
/// (type byte included).
pub fn signed_extrinsic(
    account: &[u8; 32],
    signature: &[u8],
    nonce: u64,
    call: &[u8],
) -> Vec<u8> {
    let mut body = vec![SIGNED_MASK | EXTRINSIC_VERSION];
    body.push(0x00); // MultiAddress::Id
    body.extend_from_slice(account);
    body.extend_from_slice(signature);
    body.push(0x00); // immortal era
    body.extend(compact(nonce));
    body.extend(compact(0)); // tip
    body.extend_from_slice(call);

    let mut extrinsic = compact(body.len() as u64);
    extrinsic.extend(body);
    extrinsic
}

/// Transaction hash: blake2b-256 over the full length-prefixed extrinsic.
pub fn extrinsic_hash(extrinsic: &[u8]) -> String {
    let mut hasher = Blake2b256::new();
    hasher.update(extrinsic);
    to_hex(&hasher.finalize())
}

pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
