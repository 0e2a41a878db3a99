//! Transitions of the `richiesta_accreditamento` family
use super::{TpRequest, TransactionHandler, decode_payload, require};
use crate::accreditation::{
    AccreditationAction, AccreditationPayload, AccreditationRequest, UpdateRequestDocuments,
    UpdateRequestState,
};
use crate::address::{self, ACCREDITATION_FAMILY};
use crate::auth::{self, CREATE_ROLES, Scope, accreditation_state_roles};
use crate::error::ApplyError;
use crate::state::StateContext;
use crate::types::{Role, User};
use tracing::debug;

const DOCUMENT_ROLES: &[Role] = &[Role::Assignor];

fn request_scope(role: Role, request: &AccreditationRequest) -> Scope<'_> {
    match role {
        Role::Assignor => Scope::owner(&request.assignor_id),
        Role::Assignee | Role::FiscalReviewer => Scope::group(&request.group_id),
        Role::Validator => Scope::default(),
    }
}

pub struct AccreditationHandler;

impl AccreditationHandler {
    fn create(
        &self,
        signer: &User,
        request: AccreditationRequest,
        state: &mut StateContext<'_>,
    ) -> Result<(), ApplyError> {
        auth::authorize(
            signer,
            Some(CREATE_ROLES),
            Scope::owner(&request.assignor_id),
            AccreditationAction::CreateRequest.name(),
        )?;
        state.set_accreditation(&request)
    }

    fn update_state(
        &self,
        signer: &User,
        update: UpdateRequestState,
        state: &mut StateContext<'_>,
    ) -> Result<(), ApplyError> {
        let mut request = state.get_accreditation(&update.request_id)?;
        auth::authorize(
            signer,
            Some(accreditation_state_roles(update.new_state)),
            request_scope(signer.role, &request),
            AccreditationAction::UpdateState.name(),
        )?;

        request.lifecycle_state = update.new_state;
        request.note = update.note;
        if let Some(date) = update.accreditation_date {
            request.accreditation_date = Some(date);
        }
        state.set_accreditation(&request)
    }

    fn update_documents(
        &self,
        signer: &User,
        update: UpdateRequestDocuments,
        state: &mut StateContext<'_>,
    ) -> Result<(), ApplyError> {
        let mut request = state.get_accreditation(&update.request_id)?;
        auth::authorize(
            signer,
            Some(DOCUMENT_ROLES),
            Scope::owner(&request.assignor_id),
            AccreditationAction::UpdateDocuments.name(),
        )?;

        for document in update.documents {
            request.documents.upsert(document);
        }
        state.set_accreditation(&request)
    }
}

impl TransactionHandler for AccreditationHandler {
    fn family_name(&self) -> &'static str {
        ACCREDITATION_FAMILY
    }

    fn family_versions(&self) -> &'static [&'static str] {
        &["1.0"]
    }

    fn namespaces(&self) -> Vec<String> {
        vec![address::accreditation_namespace()]
    }

    fn apply(&self, request: &TpRequest, state: &mut StateContext<'_>) -> Result<(), ApplyError> {
        let payload: AccreditationPayload = decode_payload(&request.payload)?;
        let action = payload.action;
        debug!(action = action.name(), "applying accreditation transaction");

        match action {
            AccreditationAction::CreateRequest => {
                let created = require(payload.create, action.name())?;
                let signer = state.get_user(&request.signer_public_key)?;
                self.create(&signer, created, state)
            }
            AccreditationAction::UpdateState => {
                let update = require(payload.update_state, action.name())?;
                let signer = state.get_user(&request.signer_public_key)?;
                self.update_state(&signer, update, state)
            }
            AccreditationAction::UpdateDocuments => {
                let update = require(payload.update_documents, action.name())?;
                let signer = state.get_user(&request.signer_public_key)?;
                self.update_documents(&signer, update, state)
            }
        }
    }
}
