//! The SMTP send is an out-of-scope collaborator; this trait is the seam a
//! real mailer implementation plugs into.

use async_trait::async_trait;
use tracing::info;

use crate::render::subject_line;
use crate::types::Digest;

#[async_trait]
pub trait DigestDispatcher: Send + Sync {
    async fn send(&self, digest: &Digest, week_number: u32) -> anyhow::Result<()>;
}

/// Default dispatcher used when no SMTP configuration is present: logs the
/// subject line and event counts instead of sending mail.
pub struct LoggingDispatcher;

#[async_trait]
impl DigestDispatcher for LoggingDispatcher {
    async fn send(&self, digest: &Digest, week_number: u32) -> anyhow::Result<()> {
        info!(
            subject = %subject_line(digest, week_number),
            this_week_total = digest.topline.this_week_total,
            high_severity = digest.high_severity_count(),
            "digest: dispatch skipped, no SMTP configured"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Topline;

    #[tokio::test]
    async fn logging_dispatcher_never_fails() {
        let digest = Digest {
            label: "x".into(),
            baseline_weak: false,
            topline: Topline { this_week_total: 0, last_week_total: 0, types: vec![] },
            high_severity: vec![],
            hot_regions: vec![],
            actor_spikes: vec![],
        };
        let dispatcher = LoggingDispatcher;
        assert!(dispatcher.send(&digest, 1).await.is_ok());
    }
}
