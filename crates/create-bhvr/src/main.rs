//! create-bhvr - Project scaffolding for bhvr monorepos

use anyhow::Result;
use bhvr_core::project::GenerationResult;
use bhvr_core::tui::CreateArgs;
use bhvr_core::{Linter, PartialOptions, ProductConfig, Router, Template};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// bhvr product configuration
#[derive(Clone)]
pub struct BhvrConfig;

impl ProductConfig for BhvrConfig {
    fn name(&self) -> &'static str {
        "create-bhvr"
    }

    fn display_name(&self) -> &'static str {
        "bhvr"
    }

    fn default_repo(&self) -> &'static str {
        "stevedylandev/bhvr"
    }

    fn repo_env(&self) -> &'static str {
        "BHVR_REPO"
    }

    fn extras_dir_env(&self) -> &'static str {
        "BHVR_EXTRAS_DIR"
    }

    fn docs_url(&self) -> &'static str {
        "https://bhvr.dev"
    }

    fn cli_description(&self) -> &'static str {
        "Create a bhvr monorepo starter project"
    }

    fn default_project_name(&self) -> &'static str {
        "my-bhvr-app"
    }

    /// The store checked in beside this crate's manifest.
    ///
    /// The path is fixed at compile time, so it only resolves for builds run
    /// from a checkout. Release packaging must ship `templates/extras` next to
    /// the executable, where [`ProductConfig::extras_dir`] looks before falling
    /// back to this path.
    fn bundled_extras_dir(&self) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("templates")
            .join("extras")
    }

    fn next_steps(&self, dir: &Path, result: &GenerationResult) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        if current.as_deref() != Some(dir) {
            steps.push(format!("cd {}", result.project_name));
        }

        match result.package_manager {
            Some(manager) => steps.push(manager.run_dev().to_string()),
            None => {
                steps.push("bun install".to_string());
                steps.push("bun run dev".to_string());
            }
        }

        if !result.vcs_initialized {
            steps.push("git init".to_string());
        }

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "create-bhvr")]
#[command(about = "Create a bhvr monorepo starter project")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub create: CliCreateArgs,

    /// Log debug output to stderr (overridden by BHVR_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify the template store holds every variant the installers can request (for development use)
    CheckTemplates(CheckTemplatesArgs),
}

#[derive(Parser, Debug)]
pub struct CliCreateArgs {
    /// Directory to create the project in
    #[arg(value_name = "PROJECT")]
    pub project: Option<String>,

    /// Skip all prompts and use default values
    #[arg(short, long)]
    pub yes: bool,

    /// Base template
    #[arg(long, value_enum)]
    pub template: Option<Template>,

    /// GitHub repository (owner/name) to use as source
    #[arg(long)]
    pub repo: Option<String>,

    /// Branch to use from the repository
    #[arg(long)]
    pub branch: Option<String>,

    /// Add Tailwind CSS
    #[arg(long, overrides_with = "no_tailwind")]
    pub tailwind: bool,

    #[arg(long, overrides_with = "tailwind", hide = true)]
    pub no_tailwind: bool,

    /// Add shadcn/ui (implies Tailwind CSS)
    #[arg(long, overrides_with = "no_shadcn")]
    pub shadcn: bool,

    #[arg(long, overrides_with = "shadcn", hide = true)]
    pub no_shadcn: bool,

    /// Use the Hono RPC client for type-safe API calls
    #[arg(long, overrides_with = "no_rpc")]
    pub rpc: bool,

    #[arg(long, overrides_with = "rpc", hide = true)]
    pub no_rpc: bool,

    /// Add TanStack Query
    #[arg(long, overrides_with = "no_tanstack_query")]
    pub tanstack_query: bool,

    #[arg(long, overrides_with = "tanstack_query", hide = true)]
    pub no_tanstack_query: bool,

    /// Client-side router
    #[arg(long, value_enum)]
    pub router: Option<Router>,

    /// Linter to use
    #[arg(long, value_enum)]
    pub linter: Option<Linter>,

    /// Import shared and server sources directly instead of building them
    #[arg(long)]
    pub no_build: bool,

    /// Skip git initialization
    #[arg(long)]
    pub no_git: bool,

    /// Skip dependency installation
    #[arg(long)]
    pub no_install: bool,

    /// Local directory to copy the base template from instead of downloading it (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Template store root (defaults to BHVR_EXTRAS_DIR, then the bundled store)
    #[arg(long = "extras-dir")]
    pub extras_dir: Option<PathBuf>,
}

/// `--x` / `--no-x` pair, `None` when neither was given
fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn declined(flag: bool) -> Option<bool> {
    flag.then_some(false)
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        CreateArgs {
            options: PartialOptions {
                project_name: args.project,
                template: args.template,
                repo: args.repo,
                branch: args.branch,
                tailwind: toggle(args.tailwind, args.no_tailwind),
                shadcn: toggle(args.shadcn, args.no_shadcn),
                rpc: toggle(args.rpc, args.no_rpc),
                tanstack_query: toggle(args.tanstack_query, args.no_tanstack_query),
                router: args.router,
                linter: args.linter,
                no_build: args.no_build.then_some(true),
            },
            template_dir: args.template_dir,
            extras_dir: args.extras_dir,
            git: declined(args.no_git),
            install: declined(args.no_install),
            yes: args.yes,
        }
    }
}

#[derive(Parser, Debug)]
pub struct CheckTemplatesArgs {
    /// Template store root to check (defaults to BHVR_EXTRAS_DIR, then the bundled store)
    #[arg(long = "extras-dir")]
    pub extras_dir: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("BHVR_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_logging(args.verbose);
    let config = BhvrConfig;

    match args.command {
        Some(Command::CheckTemplates(check_args)) => {
            let extras_dir = config.extras_dir(check_args.extras_dir);
            if !bhvr_core::templates::check_templates(&config, &extras_dir)? {
                std::process::exit(1);
            }
            Ok(())
        }
        None => {
            let result = bhvr_core::run(&config, args.create.into()).await;

            // Ensure cursor is visible on normal exit
            let _ = console::Term::stderr().show_cursor();

            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bhvr_core::installers::Registry;
    use bhvr_core::templates::{check_registry, DirTemplateStore};

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("create-bhvr").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_map_to_partial_options() {
        let args = parse(&[
            "my-app",
            "--template",
            "shadcn",
            "--rpc",
            "--no-tanstack-query",
            "--router",
            "tanstackrouter",
            "--linter",
            "biome",
            "--no-build",
            "--no-git",
        ]);
        assert!(args.command.is_none());

        let create: CreateArgs = args.create.into();
        let options = create.options;
        assert_eq!(options.project_name.as_deref(), Some("my-app"));
        assert_eq!(options.template, Some(Template::Shadcn));
        assert_eq!(options.rpc, Some(true));
        assert_eq!(options.tanstack_query, Some(false));
        assert_eq!(options.tailwind, None);
        assert_eq!(options.router, Some(Router::TanstackRouter));
        assert_eq!(options.linter, Some(Linter::Biome));
        assert_eq!(options.no_build, Some(true));
        assert_eq!(create.git, Some(false));
        assert_eq!(create.install, None);
    }

    #[test]
    fn test_last_toggle_wins() {
        let args = parse(&["--tailwind", "--no-tailwind"]);
        let create: CreateArgs = args.create.into();
        assert_eq!(create.options.tailwind, Some(false));
    }

    #[test]
    fn test_check_templates_subcommand() {
        let args = parse(&["check-templates", "--extras-dir", "/tmp/extras"]);
        match args.command {
            Some(Command::CheckTemplates(check)) => {
                assert_eq!(check.extras_dir, Some(PathBuf::from("/tmp/extras")));
            }
            None => panic!("expected check-templates"),
        }
    }

    #[test]
    fn test_bundled_store_is_complete() {
        let store = DirTemplateStore::new(BhvrConfig.bundled_extras_dir());
        let report = check_registry(&Registry::builtin(), &store, BhvrConfig.default_repo()).unwrap();

        let missing: Vec<String> = report
            .missing
            .iter()
            .map(|m| m.path.display().to_string())
            .collect();
        assert!(missing.is_empty(), "missing variants: {:#?}", missing);
        assert!(report.checked > 0);
    }

    #[test]
    fn test_next_steps_without_install() {
        let set = bhvr_core::testing::options(PartialOptions::default()).unwrap();
        let result = GenerationResult {
            project_name: "my-app".to_string(),
            project_dir: PathBuf::from("/nowhere/my-app"),
            vcs_initialized: true,
            dependencies_installed: false,
            package_manager: None,
            template: Template::Default,
            selected_options: set,
            installers: Default::default(),
            warnings: Vec::new(),
        };

        assert_eq!(
            BhvrConfig.next_steps(&result.project_dir, &result),
            vec!["cd my-app", "bun install", "bun run dev"]
        );
    }
}
