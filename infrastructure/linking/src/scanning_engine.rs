use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc;

use business::domain::errors::EngineError;
use business::domain::logger::Logger;
use business::domain::receipt::model::ScanResult;
use business::domain::receipt::services::{ScanStream, ScanningEngine};
use business::domain::session::model::LicenseKeys;

use crate::completion::completion;
use crate::native::NativeScanner;

type StreamSender = mpsc::UnboundedSender<Result<ScanResult, EngineError>>;

/// Sender shared by the three scan continuations. Whichever terminal
/// continuation fires first takes it, which ends the stream and turns later
/// receipts into no-ops.
#[derive(Clone)]
struct StreamSlot(Arc<Mutex<Option<StreamSender>>>);

impl StreamSlot {
    fn lock(&self) -> MutexGuard<'_, Option<StreamSender>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn push(&self, item: Result<ScanResult, EngineError>) -> bool {
        match self.lock().as_ref() {
            Some(sender) => sender.send(item).is_ok(),
            None => false,
        }
    }

    fn finish(&self, last: Option<EngineError>) {
        if let Some(sender) = self.lock().take() {
            if let Some(error) = last {
                let _ = sender.send(Err(error));
            }
        }
    }
}

/// Shared by the two terminal continuations. Once both are gone without
/// either having fired, the stream ends with `CallbackDropped`.
struct TerminalGuard(StreamSlot);

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.0.finish(Some(EngineError::CallbackDropped));
    }
}

/// Adapts a callback-style [`NativeScanner`] to the [`ScanningEngine`] port.
pub struct CallbackScanningEngine<S: NativeScanner> {
    scanner: Arc<S>,
    logger: Arc<dyn Logger>,
}

impl<S: NativeScanner> CallbackScanningEngine<S> {
    pub fn new(scanner: Arc<S>, logger: Arc<dyn Logger>) -> Self {
        Self { scanner, logger }
    }
}

#[async_trait]
impl<S: NativeScanner + 'static> ScanningEngine for CallbackScanningEngine<S> {
    async fn initialize(&self, keys: &LicenseKeys) -> Result<(), EngineError> {
        let (done, pending) = completion();
        let failed = done.clone();
        self.scanner.initialize(
            &keys.license_key,
            &keys.product_key,
            Box::new(move |()| {
                done.resolve(Ok(()));
            }),
            Box::new(move |message| {
                failed.resolve(Err(EngineError::Failure(message)));
            }),
        );
        pending.settled().await
    }

    async fn scan(&self, day_cutoff: u32) -> Result<ScanStream, EngineError> {
        let (sender, stream) = mpsc::unbounded_channel();
        let slot = StreamSlot(Arc::new(Mutex::new(Some(sender))));
        let receipts = slot.clone();
        let failed = Arc::new(TerminalGuard(slot));
        let completed = failed.clone();
        let logger = self.logger.clone();

        self.scanner.scan(
            day_cutoff,
            Box::new(move |receipt| {
                if !receipts.push(Ok(ScanResult::new(receipt))) {
                    logger.debug("Dropping receipt delivered after the scan ended");
                }
            }),
            Box::new(move |()| completed.0.finish(None)),
            Box::new(move |message| failed.0.finish(Some(EngineError::Failure(message)))),
        );
        Ok(stream)
    }
}
