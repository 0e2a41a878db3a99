//! Registration of user identities, the `utente` family
use super::{TpRequest, TransactionHandler, decode_payload};
use crate::address::{self, USER_FAMILY};
use crate::error::ApplyError;
use crate::state::StateContext;
use crate::types::User;
use tracing::debug;

/// Writes the signer's own identity record. Any signer may do so; the record
/// is always replaced whole.
pub struct UserHandler;

impl TransactionHandler for UserHandler {
    fn family_name(&self) -> &'static str {
        USER_FAMILY
    }

    fn family_versions(&self) -> &'static [&'static str] {
        &["1.0"]
    }

    fn namespaces(&self) -> Vec<String> {
        vec![address::user_namespace()]
    }

    fn apply(&self, request: &TpRequest, state: &mut StateContext<'_>) -> Result<(), ApplyError> {
        let mut user: User = decode_payload(&request.payload)?;
        // the record always lands under the signer's own key
        user.public_key = request.signer_public_key.clone();
        debug!(user = %user.id, role = %user.role, "registering user");
        state.set_user(&user)
    }
}
