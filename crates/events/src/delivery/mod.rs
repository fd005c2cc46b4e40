//! External delivery channels for the run summary.

pub mod email;

use async_trait::async_trait;

use self::email::EmailError;

/// Sends the end-of-run summary somewhere a person will read it.
#[async_trait]
pub trait SummaryNotifier: Send + Sync {
    async fn send_summary(&self, subject: &str, body: &str) -> Result<(), EmailError>;
}
