//! shadcn/ui on top of Tailwind

use super::{
    feature_activation, tailwind, Activation, InstallContext, InstallError, Installer, InstallerId,
};
use crate::manifest::DependencyKind;
use crate::options::{Feature, OptionSet};
use crate::templates::{slots, TemplateRef};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

pub const ID: InstallerId = InstallerId("shadcn");

const RUNTIME_DEPENDENCIES: &[&str] = &[
    "class-variance-authority",
    "clsx",
    "tailwind-merge",
    "lucide-react",
    "@radix-ui/react-slot",
];

pub struct Shadcn;

#[async_trait]
impl Installer for Shadcn {
    fn id(&self) -> InstallerId {
        ID
    }

    fn label(&self) -> &'static str {
        "shadcn/ui"
    }

    fn activation(&self, options: &OptionSet) -> Activation {
        feature_activation(options, Feature::Shadcn)
    }

    fn requires(&self) -> &'static [InstallerId] {
        &[tailwind::ID]
    }

    fn templates(&self, options: &OptionSet) -> Vec<TemplateRef> {
        let styling = [Feature::Tailwind, Feature::Shadcn];
        vec![
            TemplateRef::stable(slots::COMPONENTS_JSON),
            TemplateRef::stable(slots::UTILS),
            TemplateRef::stable(slots::BUTTON),
            TemplateRef::for_options(slots::INDEX_CSS, options, &styling),
            TemplateRef::for_options(slots::VITE_CONFIG, options, &styling),
            TemplateRef::for_options(slots::APP, options, &styling),
        ]
    }

    async fn install(&self, ctx: &InstallContext<'_>) -> Result<(), InstallError> {
        ctx.add_dependencies("client", DependencyKind::Prod, RUNTIME_DEPENDENCIES)
            .await?;
        ctx.add_dependencies("client", DependencyKind::Dev, &["tw-animate-css"])
            .await?;
        ctx.copy_templates(&self.templates(ctx.options)).await?;

        let mut tsconfig = ctx.manifest("client/tsconfig.json").await?;
        add_path_alias(tsconfig.object_mut("compilerOptions"));
        tsconfig.save(ctx.fs).await?;
        Ok(())
    }
}

/// `baseUrl: "."` and `paths["@/*"] = ["./src/*"]`, keeping other paths
fn add_path_alias(compiler: &mut Map<String, Value>) {
    compiler.insert("baseUrl".to_string(), json!("."));
    let paths = compiler
        .entry("paths")
        .or_insert_with(|| Value::Object(Map::new()));
    match paths {
        Value::Object(paths) => {
            paths.insert("@/*".to_string(), json!(["./src/*"]));
        }
        other => *other = json!({ "@/*": ["./src/*"] }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installers::apply_twice;
    use crate::options::{PartialOptions, Template};
    use crate::testing::{options, project_file};

    #[test]
    fn test_path_alias_keeps_existing_paths() {
        let mut compiler = json!({ "paths": { "~/*": ["./app/*"] } })
            .as_object()
            .cloned()
            .unwrap();
        add_path_alias(&mut compiler);
        assert_eq!(
            Value::Object(compiler),
            json!({
                "paths": { "~/*": ["./app/*"], "@/*": ["./src/*"] },
                "baseUrl": "."
            })
        );
    }

    #[test]
    fn test_variants_drop_implied_tailwind() {
        let set = options(PartialOptions {
            shadcn: Some(true),
            ..Default::default()
        })
        .unwrap();
        let variants: Vec<String> = Shadcn
            .templates(&set)
            .into_iter()
            .map(|r| r.variant)
            .collect();
        assert_eq!(
            variants,
            vec![
                "components.json",
                "utils.ts",
                "button.tsx",
                "index-with-shadcn.css",
                "vite.config-with-shadcn.ts",
                "App-with-shadcn.tsx",
            ]
        );
    }

    #[test]
    fn test_activation() {
        let provided = options(PartialOptions {
            template: Some(Template::Shadcn),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(Shadcn.activation(&provided), Activation::Provided);

        let on_tailwind_template = options(PartialOptions {
            template: Some(Template::Tailwind),
            shadcn: Some(true),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(Shadcn.activation(&on_tailwind_template), Activation::Selected);
    }

    #[tokio::test]
    async fn test_install_is_idempotent() {
        let set = options(PartialOptions {
            shadcn: Some(true),
            ..Default::default()
        })
        .unwrap();
        let fs = apply_twice(&Shadcn, &set).await;

        let tsconfig: Value =
            serde_json::from_str(&project_file(&fs, "client/tsconfig.json").unwrap()).unwrap();
        assert_eq!(tsconfig["compilerOptions"]["paths"]["@/*"], json!(["./src/*"]));
        assert_eq!(tsconfig["references"].as_array().map(Vec::len), Some(2));
        assert!(project_file(&fs, "client/package.json")
            .unwrap()
            .contains("\"tailwind-merge\""));
        assert_eq!(
            project_file(&fs, "client/components.json").as_deref(),
            Some("client/components.json/components.json")
        );
    }
}
