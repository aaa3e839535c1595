//! Hash computation for bridge proposals
//!
//! A proposal is identified by the keccak256 digest of its wire encoding, the
//! 107-byte header followed by the 112-byte body. Relayers on the destination
//! chain recompute the same digest from the bytes they forward.

use bridge_common::{MessageBody, MessageHeader, MESSAGE_BODY_LEN, MESSAGE_HEADER_LEN};
use tiny_keccak::{Hasher, Keccak};

/// Compute keccak256 hash of arbitrary data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Concatenate header and body into the bytes a relayer forwards
pub fn encode_message(header: &MessageHeader, body: &MessageBody) -> Vec<u8> {
    let mut data = Vec::with_capacity(MESSAGE_HEADER_LEN + MESSAGE_BODY_LEN);
    data.extend_from_slice(&header.to_be_bytes());
    data.extend_from_slice(&body.to_be_bytes());
    data
}

/// Compute the proposal id: `keccak256(header || body)`
pub fn compute_proposal_id(header: &MessageHeader, body: &MessageBody) -> [u8; 32] {
    keccak256(&encode_message(header, body))
}

/// Convert bytes32 to hex string (for display/debugging)
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_common::{Address32, ChainIdentifier, MESSAGE_TYPE_TOKEN_TRANSFER};

    #[test]
    fn test_keccak256_empty() {
        let hash = keccak256(&[]);
        assert_eq!(
            bytes32_to_hex(&hash),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_keccak256_hello() {
        let hash = keccak256(b"hello");
        assert_eq!(
            bytes32_to_hex(&hash),
            "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_proposal_id_covers_every_field() {
        let header = MessageHeader {
            mtype: MESSAGE_TYPE_TOKEN_TRANSFER,
            nonce: 0,
            from_chain: ChainIdentifier::new(2, 101),
            from_addr: Address32::new([1; 32]),
            to_chain: ChainIdentifier::new(0, 221),
            to_addr: Address32::new([2; 32]),
            upload_gas_fee: 1,
        };
        let body = MessageBody {
            source_token: Address32::new([3; 32]),
            all_amount: 5,
            from_who: Address32::new([4; 32]),
            to_who: Address32::new([5; 32]),
        };

        let base = compute_proposal_id(&header, &body);
        assert_eq!(encode_message(&header, &body).len(), 219);

        let bumped_nonce = MessageHeader { nonce: 1, ..header };
        assert_ne!(compute_proposal_id(&bumped_nonce, &body), base);

        let other_recipient = MessageBody {
            to_who: Address32::new([6; 32]),
            ..body
        };
        assert_ne!(compute_proposal_id(&header, &other_recipient), base);
    }
}
