//! Flattening of cron jobs into a crontab environment value.

use cloudock_common::constants::APP_DIR;
use serde::{Deserialize, Serialize};

/// A scheduled command from the application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronJob {
    /// Job name.
    pub name: String,
    /// Cron schedule expression, e.g. `*/5 * * * *`.
    pub spec: String,
    /// Shell command.
    pub cmd: String,
}

/// Renders one job as a system crontab line running as root from the
/// application directory, with output appended to the cron log.
#[must_use]
pub fn crontab_line(job: &CronJob) -> String {
    format!(
        "{} root cd {APP_DIR} && {} >> {APP_DIR}/var/log/cron.log",
        job.spec,
        job.cmd.replace("php ", "/usr/local/bin/php ")
    )
}

/// Joins the lines of all jobs with newlines.
#[must_use]
pub fn crontab(jobs: &[CronJob]) -> String {
    jobs.iter().map(crontab_line).collect::<Vec<_>>().join("\n")
}
