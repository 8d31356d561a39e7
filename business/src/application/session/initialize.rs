use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::account::services::LinkingEngine;
use crate::domain::errors::CaptureError;
use crate::domain::logger::Logger;
use crate::domain::receipt::services::ScanningEngine;
use crate::domain::session::model::{SessionState, SessionStatus};
use crate::domain::session::use_cases::initialize::{InitializeParams, InitializeUseCase};

pub struct InitializeUseCaseImpl {
    pub linking: Arc<dyn LinkingEngine>,
    pub scanner: Arc<dyn ScanningEngine>,
    pub session: Arc<SessionStatus>,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl InitializeUseCase for InitializeUseCaseImpl {
    async fn execute(&self, params: InitializeParams) -> Result<(), CaptureError> {
        self.logger.info(&format!(
            "Initializing engines (day cutoff {}, country {}, latest orders only {})",
            params.config.day_cutoff, params.config.country_code, params.config.latest_orders_only
        ));

        let started = tokio::try_join!(
            self.linking.initialize(&params.keys, &params.config),
            self.scanner.initialize(&params.keys),
        );

        match started {
            Ok(_) => {
                self.session.set(SessionState::Ready);
                self.logger.info("Engines initialized");
                Ok(())
            }
            Err(error) => {
                let message = error.to_string();
                self.logger
                    .error(&format!("Engine initialization failed: {}", message));
                self.session.set(SessionState::Failed(message.clone()));
                Err(CaptureError::Initialization(message))
            }
        }
    }
}
