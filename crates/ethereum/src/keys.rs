use alloy::{hex, primitives::Address, signers::local::PrivateKeySigner};
use zeroize::Zeroizing;

/// Number of hex characters in a secp256k1 secret key
pub const PRIVATE_KEY_HEX_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum KeyFormatIssue {
    #[error("expected 64 hex characters, got {_0}")]
    Length(usize),
    #[error("key contains non-hex characters")]
    NonHex,
    #[error("key is not a valid secp256k1 secret")]
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid private key format: {_0}")]
    InvalidKeyFormat(KeyFormatIssue),
}

/// Wallet derived from a validated private key.
///
/// Key material lives only inside the signer, which zeroizes it when dropped.
#[derive(Clone)]
pub struct Account {
    address: Address,
    signer: PrivateKeySigner,
}

impl Account {
    pub fn address(&self) -> Address {
        self.address
    }

    pub(crate) fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.debug_struct("Account")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Validate a raw hex private key (optionally `0x` prefixed) and derive its account
pub fn parse_private_key(raw: &str) -> Result<Account, KeyError> {
    let key = raw.trim();
    let key = key.strip_prefix("0x").unwrap_or(key);

    let len = key.chars().count();
    if len != PRIVATE_KEY_HEX_LEN {
        return Err(KeyError::InvalidKeyFormat(KeyFormatIssue::Length(len)));
    }
    if !key.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(KeyError::InvalidKeyFormat(KeyFormatIssue::NonHex));
    }

    let mut bytes = Zeroizing::new([0u8; 32]);
    hex::decode_to_slice(key, &mut bytes[..])
        .map_err(|_| KeyError::InvalidKeyFormat(KeyFormatIssue::NonHex))?;
    let signer = PrivateKeySigner::from_slice(&bytes[..])
        .map_err(|_| KeyError::InvalidKeyFormat(KeyFormatIssue::OutOfRange))?;

    Ok(Account {
        address: signer.address(),
        signer,
    })
}
