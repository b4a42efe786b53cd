use alloy_primitives::{hex, Address, Bytes, Selector};

/// Faucet `mint(address)` selector
pub const FAUCET_MINT: Selector = Selector::new([0x6a, 0x62, 0x78, 0x42]);

/// Known-good calldata from a successful faucet claim, used to sanity check the encoding shape
pub const KNOWN_GOOD_CALLDATA: &str =
    "0x6a627842000000000000000000000000a896713c759b12254fbd0fafeb61e06b6303c4bb";

/// Length of encoded claim calldata as a `0x`-prefixed hex string
pub const CLAIM_CALLDATA_HEX_LEN: usize = 2 + 8 + 64;

/// Build `mint(address)` call data for the faucet contract.
///
/// We construct the call data by hand rather than through generated bindings, since the
/// only thing the faucet takes is a single left-padded address word:
///
/// ```text
/// 0x6a627842 || 000000000000000000000000 || <20 address bytes>
/// ```
pub fn claim_calldata(recipient: Address) -> Bytes {
    let mut call_data = Vec::with_capacity(4 + 32);
    call_data.extend_from_slice(FAUCET_MINT.as_slice());

    // Encode address parameter (32 bytes, left padded with zeros)
    call_data.extend_from_slice(recipient.into_word().as_slice());

    call_data.into()
}

/// Claim call data as a lowercase `0x`-prefixed hex string
pub fn claim_calldata_hex(recipient: Address) -> String {
    hex::encode_prefixed(claim_calldata(recipient))
}
