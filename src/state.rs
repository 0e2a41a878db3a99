//! Typed access to the entities held in ledger state
use crate::accreditation::AccreditationRequest;
use crate::address;
use crate::error::{ApplyError, ValidationError};
use crate::proposal::Proposal;
use crate::store::Store;
use crate::types::User;
use tracing::debug;

/// Wraps the host store for the duration of one transition
pub struct StateContext<'a> {
    store: &'a mut dyn Store,
}

impl<'a> StateContext<'a> {
    pub fn new(store: &'a mut dyn Store) -> Self {
        Self { store }
    }

    fn load<T>(&self, address: String) -> Result<T, ApplyError>
    where
        T: for<'b> minicbor::Decode<'b, ()>,
    {
        let entries = self.store.get(std::slice::from_ref(&address))?;
        let Some((_, data)) = entries.into_iter().find(|(a, _)| *a == address) else {
            return Err(ValidationError::NotFound(address).into());
        };

        minicbor::decode(&data).map_err(|err| {
            ApplyError::InternalError(format!("Failed to load state data at {address}: {err}"))
        })
    }

    fn save<T>(&mut self, address: String, value: &T) -> Result<(), ApplyError>
    where
        T: minicbor::Encode<()>,
    {
        let data = minicbor::to_vec(value)
            .map_err(|err| ApplyError::InternalError(format!("Failed to encode state: {err}")))?;
        let committed = self.store.set(vec![(address.clone(), data)])?;

        if !committed.contains(&address) {
            return Err(ApplyError::InternalError(format!(
                "State error: {address} was not committed"
            )));
        }
        debug!(%address, "state committed");
        Ok(())
    }

    /// The user registered under `public_key`
    pub fn get_user(&self, public_key: &str) -> Result<User, ApplyError> {
        self.load(address::user_address(public_key))
    }

    pub fn set_user(&mut self, user: &User) -> Result<(), ApplyError> {
        self.save(address::user_address(&user.public_key), user)
    }

    pub fn get_proposal(&self, id: &str) -> Result<Proposal, ApplyError> {
        self.load(address::proposal_address(id))
    }

    pub fn set_proposal(&mut self, proposal: &Proposal) -> Result<(), ApplyError> {
        self.save(address::proposal_address(&proposal.id), proposal)
    }

    pub fn get_accreditation(&self, id: &str) -> Result<AccreditationRequest, ApplyError> {
        self.load(address::accreditation_address(id))
    }

    pub fn set_accreditation(&mut self, request: &AccreditationRequest) -> Result<(), ApplyError> {
        self.save(address::accreditation_address(&request.id), request)
    }
}
