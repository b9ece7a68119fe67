use std::sync::Arc;

use crate::blockchain::{
    models::ProviderKind,
    provider::{ProviderDetector, ProviderSession},
};
use crate::helpers::ErrorReporter;

use super::StoreError;

/// Holds a provider session and nothing else; the minimal store.
pub struct ProviderInitStore {
    provider: ProviderSession,
    detector: ProviderDetector,
    kind: ProviderKind,
    reporter: Arc<dyn ErrorReporter>,
}

impl ProviderInitStore {
    pub fn new(detector: ProviderDetector, kind: ProviderKind, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            provider: ProviderSession::new(),
            detector,
            kind,
            reporter,
        }
    }

    pub fn provider(&self) -> &ProviderSession {
        &self.provider
    }

    /// Detects wallets and connects the configured kind. Failures are reported, then returned.
    pub async fn init_provider(&mut self) -> Result<(), StoreError> {
        self.detector.init().await;
        let result = self
            .provider
            .init(self.kind, &self.detector)
            .await
            .map_err(StoreError::from);
        if let Err(e) = &result {
            self.reporter.process(e, None);
        }
        result
    }
}
