use sha3::{Digest, Keccak256};

use crate::error::{Error, ErrorKind};
use crate::types::{FUNCTION_REF_LEN, SELECTOR_LEN};
use crate::value::{Address, ADDRESS_LEN};

pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
    let mut h = Keccak256::new();
    h.update(bytes);
    let digest = h.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// First four bytes of the Keccak-256 hash of a canonical signature.
pub fn method_selector(signature: &str) -> [u8; SELECTOR_LEN] {
    let digest = keccak256(signature.as_bytes());
    let mut out = [0u8; SELECTOR_LEN];
    out.copy_from_slice(&digest[..SELECTOR_LEN]);
    out
}

/// Builds an external function reference: `address ++ selector`.
///
/// `selector` must be exactly four bytes.
pub fn function_ref(address: &Address, selector: &[u8]) -> Result<[u8; FUNCTION_REF_LEN], Error> {
    if selector.len() != SELECTOR_LEN {
        return Err(Error::new(
            ErrorKind::InvalidSelectorLength,
            format!(
                "selector must be {SELECTOR_LEN} bytes, got {}",
                selector.len()
            ),
        ));
    }
    let mut out = [0u8; FUNCTION_REF_LEN];
    out[..ADDRESS_LEN].copy_from_slice(address.as_bytes());
    out[ADDRESS_LEN..].copy_from_slice(selector);
    Ok(out)
}
