//! End-to-end generations against in-memory collaborators

use bhvr_core::fs::MemoryFs;
use bhvr_core::installers::{InstallObserver, InstallStatus, NoopObserver, Registry};
use bhvr_core::project::{
    Assembler, AssemblyObserver, AssemblyState, Error, Generation, GenerationResult, Request,
    GIT_FAILED, GIT_HINT, INSTALL_HINT,
};
use bhvr_core::prompt::NonInteractive;
use bhvr_core::testing::{
    options, Answer, MemoryStore, RecordingRunner, ScriptedPrompter, StaticFetcher, FIXTURE_REPO,
};
use bhvr_core::{ConfigError, Linter, PartialOptions, Router, Template};
use serde_json::Value;
use std::path::PathBuf;

struct Harness {
    registry: Registry,
    fs: MemoryFs,
    store: MemoryStore,
    fetcher: StaticFetcher,
    runner: RecordingRunner,
}

impl Harness {
    fn new() -> Self {
        Self::with_runner(RecordingRunner::new())
    }

    fn with_runner(runner: RecordingRunner) -> Self {
        Self {
            registry: Registry::builtin(),
            fs: MemoryFs::new(),
            store: MemoryStore::new(),
            fetcher: StaticFetcher::base_project(),
            runner,
        }
    }

    /// Put every variant the plan for `partial` reads into the store
    fn stock(&self, partial: &PartialOptions) {
        let set = options(partial.clone()).unwrap();
        let plan = self.registry.plan(&set).unwrap();
        for installer in plan.steps() {
            self.store.stock(*installer, &set);
        }
    }

    fn assembler(&self) -> Assembler<'_> {
        Assembler {
            registry: &self.registry,
            fs: &self.fs,
            store: &self.store,
            fetcher: &self.fetcher,
            runner: &self.runner,
        }
    }

    fn file(&self, relative: &str) -> Option<String> {
        self.fs.get(PathBuf::from("/work/my-app").join(relative))
    }

    fn json(&self, relative: &str) -> Value {
        serde_json::from_str(&self.file(relative).unwrap()).unwrap()
    }
}

/// Keeps every warning with its hint
#[derive(Default)]
struct WarningLog(Vec<(String, Option<String>)>);

impl InstallObserver for WarningLog {}

impl AssemblyObserver for WarningLog {
    fn warning(&mut self, message: &str, hint: Option<&str>) {
        self.0.push((message.to_string(), hint.map(str::to_string)));
    }
}

fn request(options: PartialOptions) -> Request {
    Request {
        options,
        base_dir: PathBuf::from("/work"),
        default_repo: FIXTURE_REPO.to_string(),
        ..Default::default()
    }
}

fn my_app(partial: PartialOptions) -> PartialOptions {
    PartialOptions {
        project_name: Some("my-app".to_string()),
        ..partial
    }
}

fn done(generation: Generation) -> GenerationResult {
    match generation {
        Generation::Done(result) => *result,
        Generation::Cancelled { state } => panic!("cancelled at {}", state),
    }
}

#[tokio::test]
async fn test_shadcn_template_with_rpc() {
    let harness = Harness::new();
    let partial = my_app(PartialOptions {
        template: Some(Template::Shadcn),
        rpc: Some(true),
        ..Default::default()
    });
    harness.stock(&partial);

    let result = done(
        harness
            .assembler()
            .generate(request(partial), &mut NonInteractive, &mut NoopObserver)
            .await
            .unwrap(),
    );

    assert_eq!(result.template, Template::Shadcn);
    assert_eq!(harness.fetcher.sources(), vec!["stevedylandev/bhvr#shadcn-ui"]);

    let ids: Vec<&str> = result
        .installers
        .outcomes()
        .iter()
        .map(|o| o.installer.0)
        .collect();
    assert_eq!(ids, vec!["rpc"]);
    assert!(result.installers.is_complete());

    assert_eq!(
        harness.file("client/src/App.tsx").as_deref(),
        Some("client/src/App.tsx/App-with-rpc-shadcn.tsx")
    );
    assert!(harness.json("client/package.json")["dependencies"]
        .get("hono")
        .is_some());
    assert_eq!(harness.json("package.json")["name"], "my-app");
    assert!(result.vcs_initialized);
    assert!(result.dependencies_installed);
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn test_full_stack_order() {
    let harness = Harness::new();
    let partial = my_app(PartialOptions {
        template: Some(Template::Default),
        shadcn: Some(true),
        rpc: Some(true),
        tanstack_query: Some(true),
        router: Some(Router::ReactRouter),
        linter: Some(Linter::Biome),
        no_build: Some(true),
        ..Default::default()
    });
    harness.stock(&partial);

    let result = done(
        harness
            .assembler()
            .generate(
                Request {
                    git: Some(false),
                    install: Some(false),
                    ..request(partial)
                },
                &mut NonInteractive,
                &mut NoopObserver,
            )
            .await
            .unwrap(),
    );

    let ids: Vec<&str> = result
        .installers
        .outcomes()
        .iter()
        .map(|o| o.installer.0)
        .collect();
    assert_eq!(
        ids,
        vec![
            "tailwind",
            "shadcn",
            "rpc",
            "tanstack-query",
            "react-router",
            "biome",
            "no-build"
        ]
    );
    assert!(result.installers.is_complete());
    assert!(harness.file("client/eslint.config.js").is_none());
    assert!(harness.file("biome.json").is_some());
    assert!(harness.runner.calls().is_empty());
    assert!(!result.vcs_initialized);
    assert!(!result.dependencies_installed);
}

#[tokio::test]
async fn test_missing_package_managers_still_finish() {
    let harness = Harness::with_runner(
        RecordingRunner::new()
            .missing("bun")
            .missing("pnpm")
            .missing("npm"),
    );

    let result = done(
        harness
            .assembler()
            .generate(
                request(my_app(PartialOptions::default())),
                &mut NonInteractive,
                &mut NoopObserver,
            )
            .await
            .unwrap(),
    );

    assert!(result.vcs_initialized);
    assert!(!result.dependencies_installed);
    assert_eq!(result.package_manager, None);
    assert_eq!(
        result.warnings,
        vec!["no package manager found (tried bun, pnpm, npm)".to_string()]
    );
    assert_eq!(
        harness.runner.calls(),
        vec!["git init", "bun --version", "pnpm --version", "npm --version"]
    );
}

#[tokio::test]
async fn test_missing_variant_is_reported_not_fatal() {
    let harness = Harness::new();
    let partial = my_app(PartialOptions {
        tailwind: Some(true),
        ..Default::default()
    });

    let result = done(
        harness
            .assembler()
            .generate(request(partial), &mut NonInteractive, &mut NoopObserver)
            .await
            .unwrap(),
    );

    let outcome = &result.installers.outcomes()[0];
    assert_eq!(outcome.installer.0, "tailwind");
    assert!(matches!(outcome.status, InstallStatus::Failed(_)));
    assert_eq!(result.warnings.len(), 1);
    assert!(result.dependencies_installed);
}

#[tokio::test]
async fn test_warnings_carry_a_manual_remedy() {
    let harness = Harness::with_runner(
        RecordingRunner::new()
            .missing("git")
            .missing("bun")
            .missing("pnpm")
            .missing("npm"),
    );
    let partial = my_app(PartialOptions {
        tailwind: Some(true),
        ..Default::default()
    });
    let mut log = WarningLog::default();

    let result = done(
        harness
            .assembler()
            .generate(request(partial), &mut NonInteractive, &mut log)
            .await
            .unwrap(),
    );

    assert_eq!(log.0.len(), 3);
    assert_eq!(
        result.warnings,
        log.0.iter().map(|(m, _)| m.clone()).collect::<Vec<_>>()
    );

    let (message, hint) = &log.0[0];
    assert!(message.starts_with("Tailwind CSS: failed: "));
    assert!(message.contains("client/src/App.tsx"));
    assert!(hint
        .as_deref()
        .unwrap()
        .starts_with("Add Tailwind CSS to the project by hand"));

    assert_eq!(log.0[1], (GIT_FAILED.to_string(), Some(GIT_HINT.to_string())));

    let (message, hint) = &log.0[2];
    assert_eq!(message, "no package manager found (tried bun, pnpm, npm)");
    assert_eq!(hint.as_deref(), Some(INSTALL_HINT));
}

#[tokio::test]
async fn test_cancel_at_first_prompt_writes_nothing() {
    let harness = Harness::new();
    let mut prompter = ScriptedPrompter::new(vec![Answer::Cancel]);

    let generation = harness
        .assembler()
        .generate(request(PartialOptions::default()), &mut prompter, &mut NoopObserver)
        .await
        .unwrap();

    assert!(matches!(
        generation,
        Generation::Cancelled {
            state: AssemblyState::Idle
        }
    ));
    assert_eq!(prompter.asked(), ["What is the name of your project?"]);
    assert_eq!(harness.fs.mutations(), 0);
}

#[tokio::test]
async fn test_cancel_at_git_prompt_keeps_project() {
    let harness = Harness::new();
    let partial = my_app(PartialOptions {
        template: Some(Template::Default),
        rpc: Some(false),
        tanstack_query: Some(false),
        router: Some(Router::None),
        linter: Some(Linter::Eslint),
        no_build: Some(false),
        ..Default::default()
    });
    let mut prompter = ScriptedPrompter::new(vec![Answer::Cancel]);

    let generation = harness
        .assembler()
        .generate(request(partial), &mut prompter, &mut NoopObserver)
        .await
        .unwrap();

    assert!(matches!(
        generation,
        Generation::Cancelled {
            state: AssemblyState::InstallersApplied
        }
    ));
    assert_eq!(prompter.asked(), ["Initialize a git repository?"]);
    assert!(harness.file("package.json").is_some());
    assert!(harness.runner.calls().is_empty());
}

#[tokio::test]
async fn test_rejected_options_touch_nothing() {
    let harness = Harness::new();
    let partial = my_app(PartialOptions {
        template: Some(Template::Tailwind),
        tailwind: Some(false),
        ..Default::default()
    });

    let err = harness
        .assembler()
        .generate(request(partial), &mut NonInteractive, &mut NoopObserver)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::TemplateConflict { .. })
    ));
    assert_eq!(harness.fs.mutations(), 0);
    assert!(harness.fetcher.sources().is_empty());
    assert!(harness.runner.calls().is_empty());
}

#[tokio::test]
async fn test_result_serializes_camel_case() {
    let harness = Harness::new();
    let result = done(
        harness
            .assembler()
            .generate(
                Request {
                    install: Some(false),
                    ..request(my_app(PartialOptions::default()))
                },
                &mut NonInteractive,
                &mut NoopObserver,
            )
            .await
            .unwrap(),
    );

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["projectName"], "my-app");
    assert_eq!(value["vcsInitialized"], true);
    assert_eq!(value["dependenciesInstalled"], false);
    assert_eq!(value["template"], "default");
    assert!(value["installers"].as_array().unwrap().is_empty());
}
