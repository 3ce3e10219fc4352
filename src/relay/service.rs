use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::client::Relay;
use crate::error::AnalysisError;
use crate::models::{AnalysisRequest, AnalysisResult};

const QUEUE_CAPACITY: usize = 8;

/// Request/response port between the presentation layer and the relay.
///
/// Each call yields exactly one outcome.
#[async_trait]
pub trait AnalysisPort: Send + Sync {
    async fn analyze(
        &self,
        request: AnalysisRequest,
        cancel: CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError>;
}

struct Job {
    request: AnalysisRequest,
    cancel: CancellationToken,
    reply: oneshot::Sender<Result<String, AnalysisError>>,
}

/// Background task that owns the [`Relay`] and answers jobs from [`RelayHandle`]s
pub struct RelayService {
    relay: Relay,
    jobs: mpsc::Receiver<Job>,
}

impl RelayService {
    /// Start the service on the current tokio runtime
    pub fn spawn(relay: Relay) -> RelayHandle {
        let (sender, jobs) = mpsc::channel(QUEUE_CAPACITY);
        let service = Self { relay, jobs };
        tokio::spawn(service.run());
        RelayHandle { sender }
    }

    async fn run(mut self) {
        info!("Relay service started");
        while let Some(job) = self.jobs.recv().await {
            // Each call is independent; a slow one does not hold up the next
            let relay = self.relay.clone();
            tokio::spawn(async move {
                let outcome = relay.analyze(&job.request, &job.cancel).await;
                if job.reply.send(outcome).is_err() {
                    debug!("Requester went away before the analysis finished");
                }
            });
        }
        info!("Relay service stopped");
    }
}

/// Cloneable client side of a running [`RelayService`]
#[derive(Debug, Clone)]
pub struct RelayHandle {
    sender: mpsc::Sender<Job>,
}

#[async_trait]
impl AnalysisPort for RelayHandle {
    async fn analyze(
        &self,
        request: AnalysisRequest,
        cancel: CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Job { request, cancel, reply })
            .await
            .map_err(|_| AnalysisError::Channel("relay service is not running".to_string()))?;

        let report = response
            .await
            .map_err(|_| AnalysisError::Channel("relay dropped the request".to_string()))??;
        Ok(AnalysisResult::from_report(report))
    }
}
