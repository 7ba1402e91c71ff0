//! Hono RPC client shared between server and client

use super::{shadcn, tailwind, Activation, InstallContext, InstallError, Installer, InstallerId};
use crate::manifest::DependencyKind;
use crate::options::{Feature, OptionSet};
use crate::templates::{slots, TemplateRef};
use async_trait::async_trait;
use serde_json::{json, Value};

pub const ID: InstallerId = InstallerId("rpc");

pub struct Rpc;

/// Server `dev` script for the build mode
fn dev_script(no_build: bool) -> &'static str {
    if no_build {
        "bun --watch run src/index.ts"
    } else {
        "bun --watch run src/index.ts & tsc --watch"
    }
}

/// `exports["./client"]` for the build mode
fn client_export(no_build: bool) -> Value {
    if no_build {
        json!("./src/client.ts")
    } else {
        json!({
            "types": "./dist/client.d.ts",
            "default": "./dist/client.js"
        })
    }
}

#[async_trait]
impl Installer for Rpc {
    fn id(&self) -> InstallerId {
        ID
    }

    fn label(&self) -> &'static str {
        "RPC client"
    }

    fn activation(&self, options: &OptionSet) -> Activation {
        if options.rpc() {
            Activation::Selected
        } else {
            Activation::Inactive
        }
    }

    fn after(&self) -> &'static [InstallerId] {
        &[tailwind::ID, shadcn::ID]
    }

    fn templates(&self, options: &OptionSet) -> Vec<TemplateRef> {
        vec![
            TemplateRef::stable(slots::SERVER_INDEX),
            TemplateRef::stable(slots::SERVER_CLIENT),
            TemplateRef::for_options(
                slots::APP,
                options,
                &[Feature::Tailwind, Feature::Shadcn, Feature::Rpc],
            ),
        ]
    }

    async fn install(&self, ctx: &InstallContext<'_>) -> Result<(), InstallError> {
        let no_build = ctx.options.no_build();

        ctx.add_dependencies("client", DependencyKind::Prod, &["hono"])
            .await?;

        let mut server = ctx.manifest("server/package.json").await?;
        server.set_script("dev", dev_script(no_build));
        server
            .object_mut("exports")
            .insert("./client".to_string(), client_export(no_build));
        server.save(ctx.fs).await?;

        ctx.copy_templates(&self.templates(ctx.options)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installers::apply_twice;
    use crate::options::{PartialOptions, Template};
    use crate::testing::{options, project_file};

    #[test]
    fn test_app_variant_for_shadcn_template() {
        let set = options(PartialOptions {
            template: Some(Template::Shadcn),
            rpc: Some(true),
            ..Default::default()
        })
        .unwrap();
        let app = Rpc.templates(&set).pop().unwrap();
        assert_eq!(app.variant, "App-with-rpc-shadcn.tsx");
    }

    #[tokio::test]
    async fn test_install_is_idempotent() {
        let set = options(PartialOptions {
            rpc: Some(true),
            ..Default::default()
        })
        .unwrap();
        let fs = apply_twice(&Rpc, &set).await;

        let server: Value =
            serde_json::from_str(&project_file(&fs, "server/package.json").unwrap()).unwrap();
        assert_eq!(server["scripts"]["dev"], json!(dev_script(false)));
        assert_eq!(server["exports"]["./client"]["default"], json!("./dist/client.js"));
        assert_eq!(server["exports"]["."]["types"], json!("./dist/index.d.ts"));
        assert_eq!(
            project_file(&fs, "server/src/client.ts").as_deref(),
            Some("server/src/client.ts/client.ts")
        );
        assert_eq!(
            project_file(&fs, "client/src/App.tsx").as_deref(),
            Some("client/src/App.tsx/App-with-rpc.tsx")
        );
    }

    #[tokio::test]
    async fn test_no_build_exports_point_at_source() {
        let set = options(PartialOptions {
            rpc: Some(true),
            no_build: Some(true),
            ..Default::default()
        })
        .unwrap();
        let fs = apply_twice(&Rpc, &set).await;

        let server: Value =
            serde_json::from_str(&project_file(&fs, "server/package.json").unwrap()).unwrap();
        assert_eq!(server["exports"]["./client"], json!("./src/client.ts"));
        assert_eq!(server["scripts"]["dev"], json!("bun --watch run src/index.ts"));
    }
}
