//! Tailwind CSS v4 through the Vite plugin

use super::{feature_activation, Activation, InstallContext, InstallError, Installer, InstallerId};
use crate::manifest::DependencyKind;
use crate::options::{Feature, OptionSet};
use crate::templates::{slots, TemplateRef};
use async_trait::async_trait;

pub const ID: InstallerId = InstallerId("tailwind");

const VITE_CONFIG: &str = "client/vite.config.ts";
const PLUGIN_IMPORT: &str = "import tailwindcss from \"@tailwindcss/vite\";";
const INDEX_CSS: &str = "@import \"tailwindcss\";\n";

pub struct Tailwind;

#[async_trait]
impl Installer for Tailwind {
    fn id(&self) -> InstallerId {
        ID
    }

    fn label(&self) -> &'static str {
        "Tailwind CSS"
    }

    fn activation(&self, options: &OptionSet) -> Activation {
        feature_activation(options, Feature::Tailwind)
    }

    fn templates(&self, options: &OptionSet) -> Vec<TemplateRef> {
        vec![TemplateRef::for_options(
            slots::APP,
            options,
            &[Feature::Tailwind],
        )]
    }

    async fn install(&self, ctx: &InstallContext<'_>) -> Result<(), InstallError> {
        ctx.add_dependencies(
            "client",
            DependencyKind::Dev,
            &["tailwindcss", "@tailwindcss/vite"],
        )
        .await?;

        let vite = ctx
            .read_to_string(VITE_CONFIG)
            .await?
            .ok_or_else(|| InstallError::MissingFile(ctx.path(VITE_CONFIG)))?;
        if let Some(patched) = patch_vite_config(&vite) {
            ctx.write_str(VITE_CONFIG, &patched).await?;
        }

        ctx.write_str("client/src/index.css", INDEX_CSS).await?;
        ctx.remove_file("client/src/App.css").await?;
        ctx.copy_templates(&self.templates(ctx.options)).await
    }
}

/// Add the plugin import and call; `None` when already present
fn patch_vite_config(source: &str) -> Option<String> {
    if source.contains("@tailwindcss/vite") {
        return None;
    }

    let mut out = String::with_capacity(source.len() + PLUGIN_IMPORT.len() + 16);
    let mut imported = false;
    for line in source.lines() {
        let line = if line.contains("plugins: [") {
            line.replacen("plugins: [", "plugins: [tailwindcss(), ", 1)
        } else {
            line.to_string()
        };
        out.push_str(&line);
        out.push('\n');
        if !imported && line.trim_start().starts_with("import { defineConfig }") {
            out.push_str(PLUGIN_IMPORT);
            out.push('\n');
            imported = true;
        }
    }
    if !imported {
        out.insert_str(0, &format!("{}\n", PLUGIN_IMPORT));
    }
    Some(out)
}
