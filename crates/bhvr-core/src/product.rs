//! Product configuration trait for CLI binaries
//!
//! The binary implements [`ProductConfig`] to name the product, point at
//! the base template repository and phrase the closing instructions.

use crate::project::GenerationResult;
use std::env;
use std::path::{Path, PathBuf};

/// Configuration trait for a scaffolding product
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for the CLI command and user agent)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// `owner/name` of the base template repository
    fn default_repo(&self) -> &'static str;

    /// Environment variable overriding the repository
    fn repo_env(&self) -> &'static str;

    /// Environment variable overriding the template store root
    fn extras_dir_env(&self) -> &'static str;

    /// Base URL archives are downloaded from
    fn archive_base_url(&self) -> &'static str {
        "https://codeload.github.com"
    }

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    fn default_project_name(&self) -> &'static str;

    /// Template store shipped alongside the sources
    fn bundled_extras_dir(&self) -> PathBuf;

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, dir: &Path, result: &GenerationResult) -> Vec<String>;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }

    /// Repository to clone: `flag`, then the environment, then the default
    fn repo(&self, flag: Option<String>) -> String {
        flag.or_else(|| non_empty_env(self.repo_env()))
            .unwrap_or_else(|| self.default_repo().to_string())
    }

    /// Template store root: `flag`, then the environment, then
    /// `templates/extras` next to the executable, then the bundled store
    fn extras_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        let beside_exe = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("templates").join("extras")));
        pick_extras_dir(
            flag,
            non_empty_env(self.extras_dir_env()).map(PathBuf::from),
            beside_exe,
            self.bundled_extras_dir(),
        )
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Explicit choices win outright; the executable-adjacent store only when it exists
fn pick_extras_dir(
    flag: Option<PathBuf>,
    env: Option<PathBuf>,
    beside_exe: Option<PathBuf>,
    bundled: PathBuf,
) -> PathBuf {
    flag.or(env)
        .or_else(|| beside_exe.filter(|dir| dir.is_dir()))
        .unwrap_or(bundled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct TestConfig;

    impl ProductConfig for TestConfig {
        fn name(&self) -> &'static str {
            "create-test"
        }

        fn display_name(&self) -> &'static str {
            "test"
        }

        fn default_repo(&self) -> &'static str {
            "owner/base"
        }

        fn repo_env(&self) -> &'static str {
            "BHVR_CORE_TEST_REPO_UNSET"
        }

        fn extras_dir_env(&self) -> &'static str {
            "BHVR_CORE_TEST_EXTRAS_UNSET"
        }

        fn docs_url(&self) -> &'static str {
            "https://example.invalid/docs"
        }

        fn cli_description(&self) -> &'static str {
            "test"
        }

        fn default_project_name(&self) -> &'static str {
            "my-app"
        }

        fn bundled_extras_dir(&self) -> PathBuf {
            PathBuf::from("/bundled/extras")
        }

        fn next_steps(&self, _dir: &Path, _result: &GenerationResult) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn test_repo_flag_wins() {
        assert_eq!(TestConfig.repo(Some("me/fork".to_string())), "me/fork");
        assert_eq!(TestConfig.repo(None), "owner/base");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TestConfig.user_agent(), "create-test");
        assert_eq!(TestConfig.archive_base_url(), "https://codeload.github.com");
    }

    #[test]
    fn test_extras_dir_precedence() {
        let bundled = PathBuf::from("/bundled");
        let existing = tempfile::tempdir().unwrap();

        assert_eq!(
            pick_extras_dir(
                Some("/flag".into()),
                Some("/env".into()),
                Some(existing.path().to_path_buf()),
                bundled.clone(),
            ),
            PathBuf::from("/flag")
        );
        assert_eq!(
            pick_extras_dir(None, Some("/env".into()), None, bundled.clone()),
            PathBuf::from("/env")
        );
        assert_eq!(
            pick_extras_dir(None, None, Some(existing.path().to_path_buf()), bundled.clone()),
            existing.path()
        );
        assert_eq!(
            pick_extras_dir(None, None, Some("/does/not/exist".into()), bundled.clone()),
            bundled
        );
    }
}
