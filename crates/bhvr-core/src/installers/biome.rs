//! Biome in place of ESLint

use super::{Activation, Conflict, InstallContext, InstallError, Installer, InstallerId};
use crate::manifest::DependencyKind;
use crate::options::{Linter, OptionKey, OptionSet};
use crate::templates::{slots, TemplateRef};
use async_trait::async_trait;

pub const ID: InstallerId = InstallerId("biome");

const ROOT_SCRIPTS: &[(&str, &str)] = &[
    ("format", "biome format . --write"),
    ("lint", "biome lint ."),
];

pub struct Biome;

#[async_trait]
impl Installer for Biome {
    fn id(&self) -> InstallerId {
        ID
    }

    fn label(&self) -> &'static str {
        "Biome"
    }

    fn activation(&self, options: &OptionSet) -> Activation {
        if options.linter() == Linter::Biome {
            Activation::Selected
        } else {
            Activation::Inactive
        }
    }

    fn conflicts(&self) -> &'static [Conflict] {
        &[Conflict::Option(OptionKey::Linter(Linter::Eslint))]
    }

    fn templates(&self, _options: &OptionSet) -> Vec<TemplateRef> {
        vec![TemplateRef::stable(slots::BIOME_JSON)]
    }

    async fn install(&self, ctx: &InstallContext<'_>) -> Result<(), InstallError> {
        ctx.remove_file("client/eslint.config.js").await?;

        let mut client = ctx.manifest("client/package.json").await?;
        let removed =
            client.remove_dependencies_where(DependencyKind::Dev, |name| name.contains("eslint"));
        let had_lint = client.remove_script("lint");
        if !removed.is_empty() || had_lint {
            tracing::debug!(removed = ?removed, "dropped eslint from client");
            client.save(ctx.fs).await?;
        }

        ctx.add_dependencies("", DependencyKind::Dev, &["@biomejs/biome"])
            .await?;
        ctx.copy_templates(&self.templates(ctx.options)).await?;

        let mut root = ctx.manifest("package.json").await?;
        for (name, command) in ROOT_SCRIPTS {
            root.set_script(name, command);
        }
        root.save(ctx.fs).await?;
        Ok(())
    }
}
