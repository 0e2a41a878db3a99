//! Accreditation requests and the action payloads of the `richiesta_accreditamento` family
use crate::types::{AccreditationState, Collection, Document, TimeStamp};
use chrono::Utc;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct AccreditationRequest {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub assignor_id: String,
    #[n(2)]
    pub group_id: String, // the group the assignor asks to be accredited with
    #[n(3)]
    pub lifecycle_state: AccreditationState,
    #[n(4)]
    pub accreditation_date: Option<TimeStamp<Utc>>,
    #[n(5)]
    pub note: String,
    #[n(6)]
    pub documents: Collection<Document>,
}

impl AccreditationRequest {
    pub fn new(
        id: impl Into<String>,
        assignor_id: impl Into<String>,
        group_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            assignor_id: assignor_id.into(),
            group_id: group_id.into(),
            lifecycle_state: AccreditationState::Preparation,
            accreditation_date: None,
            note: String::new(),
            documents: Collection::new(),
        }
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccreditationAction {
    #[n(0)]
    CreateRequest,
    #[n(1)]
    UpdateState,
    #[n(2)]
    UpdateDocuments,
}

impl AccreditationAction {
    pub fn name(&self) -> &'static str {
        match self {
            AccreditationAction::CreateRequest => "CREATE_REQUEST",
            AccreditationAction::UpdateState => "UPDATE_STATE",
            AccreditationAction::UpdateDocuments => "UPDATE_DOCUMENTS",
        }
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequestState {
    #[n(0)]
    pub request_id: String,
    #[n(1)]
    pub new_state: AccreditationState,
    #[n(2)]
    pub note: String,
    #[n(3)]
    pub accreditation_date: Option<TimeStamp<Utc>>,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequestDocuments {
    #[n(0)]
    pub request_id: String,
    #[n(1)]
    pub documents: Vec<Document>,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct AccreditationPayload {
    #[n(0)]
    pub action: AccreditationAction,
    #[n(1)]
    pub create: Option<AccreditationRequest>,
    #[n(2)]
    pub update_state: Option<UpdateRequestState>,
    #[n(3)]
    pub update_documents: Option<UpdateRequestDocuments>,
}

impl AccreditationPayload {
    pub fn create(request: AccreditationRequest) -> Self {
        Self {
            action: AccreditationAction::CreateRequest,
            create: Some(request),
            update_state: None,
            update_documents: None,
        }
    }
    pub fn update_state(
        request_id: impl Into<String>,
        new_state: AccreditationState,
        note: impl Into<String>,
        accreditation_date: Option<TimeStamp<Utc>>,
    ) -> Self {
        Self {
            action: AccreditationAction::UpdateState,
            create: None,
            update_state: Some(UpdateRequestState {
                request_id: request_id.into(),
                new_state,
                note: note.into(),
                accreditation_date,
            }),
            update_documents: None,
        }
    }
    pub fn update_documents(request_id: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            action: AccreditationAction::UpdateDocuments,
            create: None,
            update_state: None,
            update_documents: Some(UpdateRequestDocuments {
                request_id: request_id.into(),
                documents,
            }),
        }
    }
    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        Ok(minicbor::to_vec(self)?)
    }
}
