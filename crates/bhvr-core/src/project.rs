//! Project assembly: the generation state machine
//!
//! ```text
//! Idle -> NamingResolved -> TemplateAcquired -> InstallersApplied
//!      -> VcsDecided -> DependenciesDecided -> Done
//! ```
//!
//! Any state before `Done` can end in [`Generation::Cancelled`] when the user
//! declines or interrupts a prompt. Options and the installer plan are
//! resolved before the first filesystem mutation.

use crate::fs::ProjectFs;
use crate::installers::{
    run_plan, InstallContext, InstallError, InstallObserver, InstallOutcome, InstallReport,
    InstallStatus, Installer, NoopObserver, Registry, ResolveError,
};
use crate::manifest::JsonManifest;
use crate::options::{ConfigError, OptionSet, OptionsError, PartialOptions, Template};
use crate::prompt::{PromptError, Prompter};
use crate::runtime::process::COMMAND_TIMEOUT;
use crate::runtime::{install_dependencies, CommandRunner, PackageManager};
use crate::templates::{FetchError, TemplateFetcher, TemplateSource, TemplateStore};
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub const GIT_FAILED: &str = "Failed to initialize git repository. Is git installed?";
pub const GIT_HINT: &str = "Run `git init` in the project directory once git is available.";
pub const ADOPT_HINT: &str =
    "Set \"name\" in the root package.json and delete any .git directory copied from the template.";
pub const INSTALL_HINT: &str =
    "You can install them manually after navigating to the project directory.";
pub const CANCELLED: &str = "Project creation cancelled.";

/// Assembly progress; states only ever advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AssemblyState {
    Idle,
    NamingResolved,
    TemplateAcquired,
    InstallersApplied,
    VcsDecided,
    DependenciesDecided,
    Done,
}

impl fmt::Display for AssemblyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssemblyState::Idle => "idle",
            AssemblyState::NamingResolved => "naming resolved",
            AssemblyState::TemplateAcquired => "template acquired",
            AssemblyState::InstallersApplied => "installers applied",
            AssemblyState::VcsDecided => "vcs decided",
            AssemblyState::DependenciesDecided => "dependencies decided",
            AssemblyState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Summary of a finished generation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub project_name: String,
    pub project_dir: PathBuf,
    pub vcs_initialized: bool,
    pub dependencies_installed: bool,
    pub package_manager: Option<PackageManager>,
    pub template: Template,
    pub selected_options: OptionSet,
    pub installers: InstallReport,
    /// Non-fatal problems, in the order they happened
    pub warnings: Vec<String>,
}

/// How a generation ended
#[derive(Debug, Clone)]
pub enum Generation {
    Done(Box<GenerationResult>),
    /// Whatever was written before `state` stays on disk
    Cancelled { state: AssemblyState },
}

impl Generation {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Generation::Cancelled { .. })
    }
}

/// Failures that abort a generation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("prompt failed: {0}")]
    Prompt(io::Error),

    #[error("failed to acquire template: {0}")]
    Acquisition(#[from] FetchError),

    #[error("{} exists and is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to prepare {}: {source}", .path.display())]
    Prepare { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Install(#[from] InstallError),
}

/// Decisions taken from flags; `None` means ask
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub options: PartialOptions,
    /// Directory the project directory is created in
    pub base_dir: PathBuf,
    pub default_repo: String,
    /// Copy the base template from here instead of downloading it
    pub template_dir: Option<PathBuf>,
    pub git: Option<bool>,
    pub install: Option<bool>,
}

/// Progress hooks for presentation
pub trait AssemblyObserver: InstallObserver {
    fn entered(&mut self, _state: AssemblyState) {}

    fn step_started(&mut self, _message: &str) {}

    fn step_finished(&mut self, _message: &str, _success: bool) {}

    fn warning(&mut self, _message: &str, _hint: Option<&str>) {}
}

impl AssemblyObserver for NoopObserver {}

/// Hands installer progress to an [`AssemblyObserver`]
struct Forward<'o>(&'o mut dyn AssemblyObserver);

impl InstallObserver for Forward<'_> {
    fn started(&mut self, installer: &dyn Installer) {
        self.0.started(installer);
    }

    fn finished(&mut self, outcome: &InstallOutcome) {
        self.0.finished(outcome);
    }
}

/// External collaborators a generation runs against
pub struct Assembler<'a> {
    pub registry: &'a Registry,
    pub fs: &'a dyn ProjectFs,
    pub store: &'a dyn TemplateStore,
    pub fetcher: &'a dyn TemplateFetcher,
    pub runner: &'a dyn CommandRunner,
}

/// Outcome of an interactive decision
enum Step<T> {
    Continue(T),
    Cancel,
}

fn ask(result: Result<bool, PromptError>) -> Result<Step<bool>, Error> {
    match result {
        Ok(value) => Ok(Step::Continue(value)),
        Err(PromptError::Cancelled) => Ok(Step::Cancel),
        Err(PromptError::Io(e)) => Err(Error::Prompt(e)),
    }
}

struct Progress<'o> {
    state: AssemblyState,
    observer: &'o mut dyn AssemblyObserver,
    warnings: Vec<String>,
}

impl Progress<'_> {
    fn enter(&mut self, state: AssemblyState) {
        tracing::debug!(from = %self.state, to = %state, "assembly state");
        self.state = state;
        self.observer.entered(state);
    }

    fn cancelled(&self) -> Generation {
        tracing::info!(state = %self.state, "generation cancelled");
        Generation::Cancelled { state: self.state }
    }

    fn warn(&mut self, message: String, hint: Option<&str>) {
        tracing::warn!(state = %self.state, "{}", message);
        self.observer.warning(&message, hint);
        self.warnings.push(message);
    }
}

impl Assembler<'_> {
    /// Run one generation to `Done` or `Cancelled`.
    ///
    /// Only configuration, resolution, acquisition and fatal installer
    /// errors are returned as `Err`.
    pub async fn generate<P: Prompter>(
        &self,
        request: Request,
        prompter: &mut P,
        observer: &mut dyn AssemblyObserver,
    ) -> Result<Generation, Error> {
        let mut progress = Progress {
            state: AssemblyState::Idle,
            observer,
            warnings: Vec::new(),
        };
        progress.observer.entered(AssemblyState::Idle);

        let options = match request.options.resolve(prompter, &request.default_repo) {
            Ok(options) => options,
            Err(OptionsError::Prompt(PromptError::Cancelled)) => return Ok(progress.cancelled()),
            Err(OptionsError::Prompt(PromptError::Io(e))) => return Err(Error::Prompt(e)),
            Err(OptionsError::Config(e)) => return Err(e.into()),
        };
        let plan = self.registry.plan(&options)?;
        let project_dir = request.base_dir.join(options.project_name());
        progress.enter(AssemblyState::NamingResolved);

        match self.prepare_dir(&project_dir, options.project_name(), prompter).await? {
            Step::Continue(()) => {}
            Step::Cancel => return Ok(progress.cancelled()),
        }

        let source = match &request.template_dir {
            Some(dir) => TemplateSource::local(dir.clone()),
            None => TemplateSource::remote(options.repo(), options.branch()),
        };
        progress.observer.step_started("Downloading template...");
        match self.fetcher.fetch(&source, &project_dir, self.fs).await {
            Ok(files) => {
                tracing::info!(%source, files, "template acquired");
                progress.observer.step_finished(
                    &format!(
                        "Template downloaded successfully ({} template)",
                        options.template()
                    ),
                    true,
                );
            }
            Err(e) => {
                progress
                    .observer
                    .step_finished("Failed to download template", false);
                return Err(e.into());
            }
        }
        if let Err(e) = self.adopt_template(&project_dir, options.project_name()).await {
            progress.warn(e.to_string(), Some(ADOPT_HINT));
        }
        progress.enter(AssemblyState::TemplateAcquired);

        let ctx = InstallContext {
            root: &project_dir,
            options: &options,
            fs: self.fs,
            store: self.store,
        };
        let report = run_plan(&plan, &ctx, &mut Forward(&mut *progress.observer)).await?;
        for problem in report.problems() {
            let hint = remedy(problem);
            progress.warn(
                format!("{}: {}", problem.label, describe(&problem.status)),
                Some(hint.as_str()),
            );
        }
        progress.enter(AssemblyState::InstallersApplied);

        let git = match request.git {
            Some(git) => git,
            None => match ask(prompter.confirm("Initialize a git repository?", true))? {
                Step::Continue(git) => git,
                Step::Cancel => return Ok(progress.cancelled()),
            },
        };
        let mut vcs_initialized = false;
        if git {
            progress.observer.step_started("Initializing git repository...");
            match self
                .runner
                .run("git", &["init"], &project_dir, COMMAND_TIMEOUT)
                .await
            {
                Ok(()) => {
                    vcs_initialized = true;
                    progress
                        .observer
                        .step_finished("Git repository initialized", true);
                }
                Err(e) => {
                    progress
                        .observer
                        .step_finished("Failed to initialize git repository.", false);
                    tracing::debug!(error = %e, "git init failed");
                    progress.warn(GIT_FAILED.to_string(), Some(GIT_HINT));
                }
            }
        }
        progress.enter(AssemblyState::VcsDecided);

        let install = match request.install {
            Some(install) => install,
            None => match ask(prompter.confirm("Install dependencies?", true))? {
                Step::Continue(install) => install,
                Step::Cancel => return Ok(progress.cancelled()),
            },
        };
        let mut package_manager = None;
        if install {
            progress.observer.step_started("Installing dependencies...");
            match install_dependencies(self.runner, &project_dir).await {
                Ok(manager) => {
                    package_manager = Some(manager);
                    progress.observer.step_finished(
                        &format!("Dependencies installed with {}", manager),
                        true,
                    );
                }
                Err(e) => {
                    progress
                        .observer
                        .step_finished("Failed to install dependencies.", false);
                    progress.warn(e.to_string(), Some(INSTALL_HINT));
                }
            }
        }
        progress.enter(AssemblyState::DependenciesDecided);

        progress.enter(AssemblyState::Done);
        Ok(Generation::Done(Box::new(GenerationResult {
            project_name: options.project_name().to_string(),
            project_dir,
            vcs_initialized,
            dependencies_installed: package_manager.is_some(),
            package_manager,
            template: options.template(),
            installers: report,
            warnings: progress.warnings,
            selected_options: options,
        })))
    }

    /// Create the project directory, clearing a non-empty one after confirmation
    async fn prepare_dir<P: Prompter>(
        &self,
        dir: &Path,
        name: &str,
        prompter: &mut P,
    ) -> Result<Step<()>, Error> {
        let prepare = |source| Error::Prepare {
            path: dir.to_path_buf(),
            source,
        };

        if self.fs.exists(dir).await && !self.fs.is_dir(dir).await {
            return Err(Error::NotADirectory(dir.to_path_buf()));
        }

        if self.fs.is_dir(dir).await {
            let entries = self.fs.read_dir(dir).await.map_err(prepare)?;
            if !entries.is_empty() {
                let clear = if prompter.is_interactive() {
                    let message = format!(
                        "The directory {} already exists and is not empty. Do you want to overwrite it?",
                        name
                    );
                    match ask(prompter.confirm(&message, false))? {
                        Step::Continue(clear) => clear,
                        Step::Cancel => false,
                    }
                } else {
                    true
                };
                if !clear {
                    return Ok(Step::Cancel);
                }
                tracing::info!(dir = %dir.display(), entries = entries.len(), "clearing project directory");
                self.fs.remove_dir_all(dir).await.map_err(prepare)?;
            }
        }

        self.fs.create_dir_all(dir).await.map_err(prepare)?;
        Ok(Step::Continue(()))
    }

    /// Name the root package after the project and drop the template's history
    async fn adopt_template(&self, dir: &Path, name: &str) -> Result<(), InstallError> {
        if let Some(mut manifest) = JsonManifest::load(self.fs, &dir.join("package.json")).await? {
            manifest.set("name", name);
            manifest.save(self.fs).await?;
        }

        let git_dir = dir.join(".git");
        if self.fs.is_dir(&git_dir).await {
            self.fs
                .remove_dir_all(&git_dir)
                .await
                .map_err(|source| InstallError::Io {
                    path: git_dir.clone(),
                    source,
                })?;
            tracing::debug!("removed template .git directory");
        }
        Ok(())
    }
}

/// What to do by hand about an installer that did not apply
pub fn remedy(outcome: &InstallOutcome) -> String {
    match &outcome.status {
        InstallStatus::Applied => String::new(),
        InstallStatus::Failed(_) => format!(
            "Add {} to the project by hand; if a template variant is missing, restore it in the template store.",
            outcome.label
        ),
        InstallStatus::Skipped(_) => format!(
            "Add {} by hand once the feature it depends on is in place.",
            outcome.label
        ),
    }
}

fn describe(status: &InstallStatus) -> String {
    match status {
        InstallStatus::Applied => "applied".to_string(),
        InstallStatus::Failed(reason) => format!("failed: {}", reason),
        InstallStatus::Skipped(reason) => format!("skipped: {}", reason),
    }
}
