//! Transaction handlers and the processor that routes requests to them
use crate::error::{ApplyError, ValidationError};
use crate::state::StateContext;
use crate::store::Store;
use tracing::debug;

pub mod accreditation;
pub mod proposal;
pub mod user;

pub use accreditation::AccreditationHandler;
pub use proposal::ProposalHandler;
pub use user::UserHandler;

/// One transaction as handed over by the host, signer already authenticated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TpRequest {
    pub family_name: String,
    pub family_version: String,
    pub signer_public_key: String,
    pub payload: Vec<u8>,
}

impl TpRequest {
    pub fn new(
        family_name: impl Into<String>,
        family_version: impl Into<String>,
        signer_public_key: impl Into<String>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            family_name: family_name.into(),
            family_version: family_version.into(),
            signer_public_key: signer_public_key.into(),
            payload,
        }
    }
}

/// Deterministic transition logic of one transaction family.
///
/// `apply` reads what it needs through `state`, then writes at most once. Any
/// error means nothing was written.
pub trait TransactionHandler {
    fn family_name(&self) -> &'static str;
    fn family_versions(&self) -> &'static [&'static str];
    fn namespaces(&self) -> Vec<String>;
    fn apply(&self, request: &TpRequest, state: &mut StateContext<'_>) -> Result<(), ApplyError>;
}

/// Decodes a CBOR envelope, mapping any failure to an invalid transaction
pub(crate) fn decode_payload<T>(payload: &[u8]) -> Result<T, ValidationError>
where
    T: for<'b> minicbor::Decode<'b, ()>,
{
    minicbor::decode(payload).map_err(|_| ValidationError::InvalidPayload)
}

/// Unwraps the sub-payload declared by the envelope's action
pub(crate) fn require<T>(
    sub_payload: Option<T>,
    action: &'static str,
) -> Result<T, ValidationError> {
    sub_payload.ok_or(ValidationError::PayloadNotSet(action))
}

/// Routes requests to the handler registered for their family and version
#[derive(Default)]
pub struct Processor {
    handlers: Vec<Box<dyn TransactionHandler>>,
}

impl Processor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A processor serving the proposal, accreditation and user families
    pub fn with_default_handlers() -> Self {
        let mut processor = Self::new();
        processor.add_handler(Box::new(ProposalHandler));
        processor.add_handler(Box::new(AccreditationHandler));
        processor.add_handler(Box::new(UserHandler));
        processor
    }

    pub fn add_handler(&mut self, handler: Box<dyn TransactionHandler>) {
        self.handlers.push(handler);
    }

    /// Every namespace served, so the host can partition state access
    pub fn namespaces(&self) -> Vec<String> {
        self.handlers.iter().flat_map(|h| h.namespaces()).collect()
    }

    pub fn apply(&self, request: &TpRequest, store: &mut dyn Store) -> Result<(), ApplyError> {
        let handler = self
            .handlers
            .iter()
            .find(|h| {
                h.family_name() == request.family_name
                    && h
                        .family_versions()
                        .iter()
                        .any(|v| *v == request.family_version)
            })
            .ok_or_else(|| ValidationError::UnknownFamily {
                name: request.family_name.clone(),
                version: request.family_version.clone(),
            })?;

        debug!(
            family = handler.family_name(),
            signer = %request.signer_public_key,
            "dispatching transaction"
        );
        let mut state = StateContext::new(store);
        handler.apply(request, &mut state)
    }
}
