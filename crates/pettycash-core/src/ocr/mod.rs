//! OCR collaborators: image bytes in, raw text out.

mod command;
#[cfg(feature = "native")]
mod pure_engine;

pub use command::CommandRecognizer;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrRecognizer;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// A text recognition engine.
///
/// Implementations block for the duration of recognition; use
/// [`recognize_with_timeout`] to run them off the async executor.
pub trait TextRecognizer: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Recognize all text in an encoded image.
    fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// Run recognition on a blocking worker, giving up after `timeout`.
pub async fn recognize_with_timeout(
    recognizer: Arc<dyn TextRecognizer>,
    image: Vec<u8>,
    timeout: Duration,
) -> Result<String, OcrError> {
    recognize_until(recognizer, image, timeout, std::future::pending()).await
}

/// Like [`recognize_with_timeout`], also stopping when `cancel` completes.
///
/// A worker that has already started cannot be interrupted; on timeout or
/// cancellation its eventual result is discarded.
pub async fn recognize_until<C>(
    recognizer: Arc<dyn TextRecognizer>,
    image: Vec<u8>,
    timeout: Duration,
    cancel: C,
) -> Result<String, OcrError>
where
    C: Future<Output = ()>,
{
    let name = recognizer.name().to_string();
    debug!("Running {} on {} bytes", name, image.len());

    let worker = tokio::task::spawn_blocking(move || recognizer.recognize(&image));

    tokio::select! {
        joined = tokio::time::timeout(timeout, worker) => match joined {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(OcrError::Recognition(format!("{} worker failed: {}", name, e))),
            Err(_) => {
                warn!("{} did not finish within {:?}", name, timeout);
                Err(OcrError::Timeout(timeout))
            }
        },
        _ = cancel => {
            debug!("{} cancelled", name);
            Err(OcrError::Cancelled)
        }
    }
}

/// Pick a recognizer from configuration.
///
/// An external command takes precedence over the built-in engine.
pub fn create_recognizer(config: &OcrConfig) -> Result<Arc<dyn TextRecognizer>, OcrError> {
    if let Some(command) = &config.command {
        return Ok(Arc::new(CommandRecognizer::new(command)?));
    }

    #[cfg(feature = "native")]
    {
        Ok(Arc::new(PureOcrRecognizer::from_config(config)?))
    }

    #[cfg(not(feature = "native"))]
    {
        Err(OcrError::ModelLoad(
            "no OCR command configured and built without the native engine".to_string(),
        ))
    }
}
