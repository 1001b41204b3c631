use async_trait::async_trait;
use shared::{domain::BusinessQuery, protocol::BusinessAnalysis};

pub mod controller;
pub mod error;
mod http_backend;
pub mod session;
pub mod validation;

pub use controller::{
    ControllerOptions, RegenerateOutcome, SessionController, SessionUpdate, SubmitOutcome,
};
pub use error::{Endpoint, RequestFailure};
pub use http_backend::{HttpAnalysisBackend, HttpBackendSetupError};
pub use session::{Notice, NoticeKind, Phase, Report, Session};
pub use validation::{validate_inputs, ValidationErrors};

#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(&self, query: &BusinessQuery) -> Result<BusinessAnalysis, RequestFailure>;
    async fn regenerate_headline(&self, query: &BusinessQuery) -> Result<String, RequestFailure>;
}

pub struct MissingAnalysisBackend;

#[async_trait]
impl AnalysisBackend for MissingAnalysisBackend {
    async fn analyze(&self, _query: &BusinessQuery) -> Result<BusinessAnalysis, RequestFailure> {
        Err(RequestFailure::Unavailable {
            endpoint: Endpoint::Analysis,
        })
    }

    async fn regenerate_headline(&self, _query: &BusinessQuery) -> Result<String, RequestFailure> {
        Err(RequestFailure::Unavailable {
            endpoint: Endpoint::Headline,
        })
    }
}
