//! Sequential execution of an [`InstallPlan`]

use super::{InstallContext, InstallError, InstallPlan, Installer, InstallerId};
use serde::Serialize;

/// What happened to one installer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum InstallStatus {
    Applied,
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallOutcome {
    pub installer: InstallerId,
    pub label: &'static str,
    #[serde(flatten)]
    pub status: InstallStatus,
}

impl InstallOutcome {
    pub fn is_applied(&self) -> bool {
        self.status == InstallStatus::Applied
    }
}

/// Per-installer outcomes, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InstallReport {
    outcomes: Vec<InstallOutcome>,
}

impl InstallReport {
    pub fn outcomes(&self) -> &[InstallOutcome] {
        &self.outcomes
    }

    pub fn applied(&self) -> Vec<InstallerId> {
        self.outcomes
            .iter()
            .filter(|o| o.is_applied())
            .map(|o| o.installer)
            .collect()
    }

    /// Outcomes that did not apply (failed or skipped)
    pub fn problems(&self) -> impl Iterator<Item = &InstallOutcome> {
        self.outcomes.iter().filter(|o| !o.is_applied())
    }

    pub fn is_complete(&self) -> bool {
        self.problems().next().is_none()
    }

    fn status_of(&self, id: InstallerId) -> Option<&InstallStatus> {
        self.outcomes
            .iter()
            .find(|o| o.installer == id)
            .map(|o| &o.status)
    }
}

/// Progress hooks, e.g. for spinners
pub trait InstallObserver {
    fn started(&mut self, _installer: &dyn Installer) {}

    fn finished(&mut self, _outcome: &InstallOutcome) {}
}

pub struct NoopObserver;

impl InstallObserver for NoopObserver {}

/// Run every installer in `plan` against `ctx.root`, in order.
///
/// Non-fatal failures are recorded and the run continues. Only a fatal
/// [`InstallError`] aborts, and it is returned as the error.
pub async fn run_plan(
    plan: &InstallPlan<'_>,
    ctx: &InstallContext<'_>,
    observer: &mut dyn InstallObserver,
) -> Result<InstallReport, InstallError> {
    if !ctx.fs.is_dir(ctx.root).await {
        return Err(InstallError::ProjectRootUnavailable(ctx.root.to_path_buf()));
    }

    let mut report = InstallReport::default();

    for installer in plan.steps() {
        let installer = *installer;
        observer.started(installer);

        let status = match blocked_by(installer, plan, &report)? {
            Some(reason) => {
                tracing::warn!(installer = %installer.id(), %reason, "installer skipped");
                InstallStatus::Skipped(reason)
            }
            None => {
                tracing::info!(installer = %installer.id(), "running installer");
                match installer.install(ctx).await {
                    Ok(()) => {
                        tracing::info!(installer = %installer.id(), "installer applied");
                        InstallStatus::Applied
                    }
                    Err(err) if err.is_fatal() => {
                        tracing::error!(installer = %installer.id(), error = %err, "fatal installer failure");
                        let outcome = InstallOutcome {
                            installer: installer.id(),
                            label: installer.label(),
                            status: InstallStatus::Failed(err.to_string()),
                        };
                        observer.finished(&outcome);
                        return Err(err);
                    }
                    Err(err) => {
                        tracing::warn!(installer = %installer.id(), error = %err, "installer failed");
                        InstallStatus::Failed(err.to_string())
                    }
                }
            }
        };

        let outcome = InstallOutcome {
            installer: installer.id(),
            label: installer.label(),
            status,
        };
        observer.finished(&outcome);
        report.outcomes.push(outcome);
    }

    Ok(report)
}

/// Why `installer` cannot run given what already ran, if anything
fn blocked_by(
    installer: &dyn Installer,
    plan: &InstallPlan<'_>,
    report: &InstallReport,
) -> Result<Option<String>, InstallError> {
    for &requires in installer.requires() {
        if plan.is_provided(requires) {
            continue;
        }
        match report.status_of(requires) {
            Some(InstallStatus::Applied) => {}
            Some(_) => {
                return Ok(Some(format!("requires '{}', which did not apply", requires)));
            }
            None => {
                return Err(InstallError::RequirementMissing {
                    installer: installer.id(),
                    requires,
                })
            }
        }
    }
    Ok(None)
}
