//! No-build mode: workspace packages are consumed from TypeScript sources
//!
//! Rewrites wiring that earlier installers may have touched, so it always
//! runs last.

use super::{Activation, InstallContext, InstallError, Installer, InstallerId};
use crate::manifest::JsonManifest;
use crate::options::OptionSet;
use async_trait::async_trait;
use serde_json::Value;

pub const ID: InstallerId = InstallerId("no-build");

const TYPECHECK: &str = "tsc --noEmit";

/// Source trees whose imports are rewritten
const SOURCE_DIRS: &[&str] = &["client/src", "server/src"];

/// Import specifiers of built output and their source equivalents
const IMPORT_REWRITES: &[(&str, &str)] = &[
    ("shared/dist", "shared"),
    ("server/dist/client", "server/client"),
];

pub struct NoBuild;

#[async_trait]
impl Installer for NoBuild {
    fn id(&self) -> InstallerId {
        ID
    }

    fn label(&self) -> &'static str {
        "No-build mode"
    }

    fn activation(&self, options: &OptionSet) -> Activation {
        if options.no_build() {
            Activation::Selected
        } else {
            Activation::Inactive
        }
    }

    fn is_finalizer(&self) -> bool {
        true
    }

    async fn install(&self, ctx: &InstallContext<'_>) -> Result<(), InstallError> {
        if let Some(mut root) = ctx.manifest_if_exists("package.json").await? {
            if root.remove_script("postinstall") {
                root.save(ctx.fs).await?;
            }
        }

        if let Some(mut shared) = ctx.manifest_if_exists("shared/package.json").await? {
            point_shared_at_source(&mut shared);
            shared.remove_script("build");
            shared.remove_script("dev");
            shared.set_script("typecheck", TYPECHECK);
            shared.save(ctx.fs).await?;
        }
        ctx.remove_dir("shared/dist").await?;

        if let Some(mut server) = ctx.manifest_if_exists("server/package.json").await? {
            server.remove_script("build");
            server.set_script("typecheck", TYPECHECK);
            server.save(ctx.fs).await?;
        }
        ctx.remove_dir("server/dist").await?;

        if let Some(mut client) = ctx.manifest_if_exists("client/package.json").await? {
            if let Some(build) = client.script("build") {
                let build = strip_tsc_build(build);
                client.set_script("build", &build);
            }
            client.set_script("typecheck", TYPECHECK);
            client.save(ctx.fs).await?;
        }

        for dir in SOURCE_DIRS {
            rewrite_imports(ctx, dir).await?;
        }
        Ok(())
    }
}

/// `./dist/x.js` to `./src/x.ts`, `./dist/x.d.ts` to `./src/x.ts`
fn dist_to_src(path: &str) -> String {
    let path = match path.strip_prefix("./dist/") {
        Some(rest) => format!("./src/{}", rest),
        None => match path.strip_prefix("dist/") {
            Some(rest) => format!("./src/{}", rest),
            None => path.to_string(),
        },
    };
    if let Some(stem) = path.strip_suffix(".d.ts") {
        format!("{}.ts", stem)
    } else if let Some(stem) = path.strip_suffix(".js") {
        format!("{}.ts", stem)
    } else {
        path
    }
}

fn point_shared_at_source(shared: &mut JsonManifest) {
    for key in ["main", "types"] {
        if let Some(path) = shared.get_str(key) {
            let rewritten = dist_to_src(path);
            shared.set(key, rewritten);
        }
    }

    match shared.get("exports") {
        Some(Value::String(path)) => {
            let rewritten = dist_to_src(path);
            shared.set("exports", rewritten);
        }
        Some(Value::Object(_)) => {
            for value in shared.object_mut("exports").values_mut() {
                *value = source_export(value);
            }
        }
        _ => {}
    }
}

/// One subpath export as a source path; condition maps collapse to the
/// file their `default`, `import` or `types` condition names
fn source_export(value: &Value) -> Value {
    match value {
        Value::String(path) => Value::String(dist_to_src(path)),
        Value::Object(conditions) => {
            match ["default", "import", "types"]
                .iter()
                .find_map(|condition| conditions.get(*condition))
            {
                Some(target) => source_export(target),
                None => Value::Object(
                    conditions
                        .iter()
                        .map(|(condition, target)| (condition.clone(), source_export(target)))
                        .collect(),
                ),
            }
        }
        other => other.clone(),
    }
}

fn strip_tsc_build(script: &str) -> String {
    script
        .replace("tsc -b && ", "")
        .replace(" && tsc -b", "")
}

fn rewrite_specifiers(source: &str) -> Option<String> {
    let mut out = source.to_string();
    for (from, to) in IMPORT_REWRITES {
        for quote in ['"', '\''] {
            out = out.replace(
                &format!("{quote}{from}{quote}"),
                &format!("{quote}{to}{quote}"),
            );
        }
    }
    (out != source).then_some(out)
}

async fn rewrite_imports(ctx: &InstallContext<'_>, relative: &str) -> Result<(), InstallError> {
    let dir = ctx.path(relative);
    if !ctx.fs.is_dir(&dir).await {
        return Ok(());
    }
    let files = ctx
        .fs
        .list_files(&dir)
        .await
        .map_err(|source| InstallError::Io {
            path: dir.clone(),
            source,
        })?;

    for path in files {
        let is_source = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("ts" | "tsx")
        );
        if !is_source {
            continue;
        }
        let source = ctx
            .fs
            .read_to_string(&path)
            .await
            .map_err(|source| InstallError::Io {
                path: path.clone(),
                source,
            })?;
        if let Some(rewritten) = rewrite_specifiers(&source) {
            tracing::debug!(path = %path.display(), "rewrote build imports");
            ctx.write(&path, rewritten.as_bytes()).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;
    use crate::installers::apply_twice;
    use crate::options::PartialOptions;
    use crate::testing::{options, project_file};
    use serde_json::json;
    use std::path::Path;

    #[test]
    fn test_dist_to_src() {
        assert_eq!(dist_to_src("./dist/index.js"), "./src/index.ts");
        assert_eq!(dist_to_src("./dist/index.d.ts"), "./src/index.ts");
        assert_eq!(dist_to_src("dist/types.d.ts"), "./src/types.ts");
        assert_eq!(dist_to_src("./src/index.ts"), "./src/index.ts");
    }

    #[tokio::test]
    async fn test_subpath_exports_keep_their_own_source() {
        let fs = MemoryFs::new();
        let path = Path::new("/p/shared/package.json");
        fs.insert(
            path,
            r#"{
  "exports": {
    ".": { "types": "./dist/index.d.ts", "default": "./dist/index.js" },
    "./foo": { "types": "./dist/foo.d.ts", "import": "./dist/foo.js" },
    "./types": "./dist/types.d.ts",
    "./bar": { "node": { "default": "./dist/bar.js" } }
  }
}"#,
        );
        let mut shared = JsonManifest::load(&fs, path).await.unwrap().unwrap();

        point_shared_at_source(&mut shared);

        assert_eq!(
            shared.get("exports"),
            Some(&json!({
                ".": "./src/index.ts",
                "./foo": "./src/foo.ts",
                "./types": "./src/types.ts",
                "./bar": { "node": "./src/bar.ts" }
            }))
        );
    }

    #[test]
    fn test_strip_tsc_build() {
        assert_eq!(strip_tsc_build("tsc -b && vite build"), "vite build");
        assert_eq!(strip_tsc_build("vite build && tsc -b"), "vite build");
        assert_eq!(strip_tsc_build("vite build"), "vite build");
    }

    #[test]
    fn test_rewrite_specifiers() {
        let source = "import type { A } from \"shared/dist\";\nimport { hc } from 'server/dist/client';\n";
        assert_eq!(
            rewrite_specifiers(source).unwrap(),
            "import type { A } from \"shared\";\nimport { hc } from 'server/client';\n"
        );
        assert!(rewrite_specifiers("import { A } from \"shared\";").is_none());
    }

    #[tokio::test]
    async fn test_install_is_idempotent() {
        let set = options(PartialOptions {
            no_build: Some(true),
            ..Default::default()
        })
        .unwrap();
        let fs = apply_twice(&NoBuild, &set).await;

        let root: Value =
            serde_json::from_str(&project_file(&fs, "package.json").unwrap()).unwrap();
        assert!(root["scripts"].get("postinstall").is_none());
        assert!(root["scripts"].get("dev").is_some());

        let shared: Value =
            serde_json::from_str(&project_file(&fs, "shared/package.json").unwrap()).unwrap();
        assert_eq!(shared["main"], "./src/index.ts");
        assert_eq!(shared["types"], "./src/index.ts");
        assert_eq!(shared["exports"], json!({ ".": "./src/index.ts" }));
        assert_eq!(shared["scripts"], json!({ "typecheck": TYPECHECK }));

        let client: Value =
            serde_json::from_str(&project_file(&fs, "client/package.json").unwrap()).unwrap();
        assert_eq!(client["scripts"]["build"], "vite build");
        assert_eq!(client["scripts"]["typecheck"], TYPECHECK);

        assert!(project_file(&fs, "shared/dist/index.js").is_none());
        assert!(project_file(&fs, "server/dist/index.js").is_none());
        assert!(project_file(&fs, "client/src/App.tsx")
            .unwrap()
            .contains("from \"shared\";"));
        assert!(project_file(&fs, "server/src/index.ts")
            .unwrap()
            .contains("from \"shared\";"));
    }
}
