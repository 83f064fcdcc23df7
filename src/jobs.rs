use crate::errors::BreakwaterError;
use crate::session::SessionStore;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Initialize and start the job scheduler with all background tasks
pub async fn init_scheduler(sessions: SessionStore) -> Result<JobScheduler, BreakwaterError> {
    let sched = JobScheduler::new()
        .await
        .map_err(|e| BreakwaterError::Other(format!("Failed to create job scheduler: {}", e)))?;

    // Cleanup expired sessions job - runs every 15 minutes
    let cleanup_sessions_job = Job::new_async("0 */15 * * * *", move |_uuid, _l| {
        let sessions = sessions.clone();
        Box::pin(async move {
            info!("Running cleanup_expired_sessions job");
            let purged = sessions.purge_expired();
            if purged > 0 {
                info!("Cleaned up {} expired sessions", purged);
            }
        })
    })
    .map_err(|e| BreakwaterError::Other(format!("Failed to create cleanup sessions job: {}", e)))?;

    sched
        .add(cleanup_sessions_job)
        .await
        .map_err(|e| BreakwaterError::Other(format!("Failed to add cleanup sessions job: {}", e)))?;

    // Start the scheduler
    if let Err(e) = sched.start().await {
        error!("Failed to start job scheduler: {}", e);
        return Err(BreakwaterError::Other(format!(
            "Failed to start job scheduler: {}",
            e
        )));
    }

    info!("Job scheduler started with {} jobs", 1);

    Ok(sched)
}
