//! Client-side helpers for minting entity ids
//!
//! Handlers never call these: ids must arrive inside the payload so every
//! replica computes the same state.
use bech32::Bech32m;
use uuid7::uuid7;

pub const PROPOSAL_HRP: &str = "proposal";
pub const OFFER_HRP: &str = "offer";
pub const USER_HRP: &str = "user";

// construct a unique id then encode using bech32m under the given prefix
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

pub fn new_proposal_id() -> anyhow::Result<String> {
    new_uuid_to_bech32(PROPOSAL_HRP)
}

pub fn new_offer_id() -> anyhow::Result<String> {
    new_uuid_to_bech32(OFFER_HRP)
}

pub fn new_user_id() -> anyhow::Result<String> {
    new_uuid_to_bech32(USER_HRP)
}
