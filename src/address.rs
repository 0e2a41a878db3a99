//! State address derivation
//!
//! A state address is the 6 hex char namespace prefix of a transaction family
//! followed by the first 64 hex chars of the SHA-512 digest of the entity key.
use sha2::{Digest, Sha512};

pub const NAMESPACE_LEN: usize = 6;
pub const ADDRESS_LEN: usize = 70;

pub const PROPOSAL_FAMILY: &str = "proposta_cessione";
pub const ACCREDITATION_FAMILY: &str = "richiesta_accreditamento";
pub const USER_FAMILY: &str = "utente";

fn sha512_hex(data: &str) -> String {
    hex::encode(Sha512::digest(data.as_bytes()))
}

/// Namespace prefix of a transaction family
pub fn namespace(family_name: &str) -> String {
    let mut digest = sha512_hex(family_name);
    digest.truncate(NAMESPACE_LEN);
    digest
}

/// Address of the entity keyed by `id` inside `namespace`
pub fn derive(namespace: &str, id: &str) -> String {
    let digest = sha512_hex(id);
    let mut address = String::with_capacity(ADDRESS_LEN);
    address.push_str(namespace);
    address.push_str(&digest[..ADDRESS_LEN.saturating_sub(namespace.len())]);
    address
}

pub fn proposal_namespace() -> String {
    namespace(PROPOSAL_FAMILY)
}

pub fn accreditation_namespace() -> String {
    namespace(ACCREDITATION_FAMILY)
}

pub fn user_namespace() -> String {
    namespace(USER_FAMILY)
}

pub fn proposal_address(id: &str) -> String {
    derive(&proposal_namespace(), id)
}

pub fn accreditation_address(id: &str) -> String {
    derive(&accreditation_namespace(), id)
}

/// Users are keyed by their public key rather than their id
pub fn user_address(public_key: &str) -> String {
    derive(&user_namespace(), public_key)
}

/// True when `address` has the shape of a state address
pub fn is_valid(address: &str) -> bool {
    address.len() == ADDRESS_LEN
        && address
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
