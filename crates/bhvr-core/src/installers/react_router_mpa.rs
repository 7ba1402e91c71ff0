//! React Router framework mode with server rendering

use super::react_router::{PAGE_FEATURES, ROUTER_AFTER};
use super::{
    react_router, tanstack_router, Activation, Conflict, InstallContext, InstallError, Installer,
    InstallerId,
};
use crate::manifest::DependencyKind;
use crate::options::{Feature, OptionSet, Router};
use crate::templates::{slots, TemplateRef};
use async_trait::async_trait;

pub const ID: InstallerId = InstallerId("react-router-mpa");

const DEPENDENCIES: &[&str] = &[
    "react-router",
    "@react-router/node",
    "@react-router/serve",
    "isbot",
];

const DEV_DEPENDENCIES: &[&str] = &["@react-router/dev", "vite-tsconfig-paths"];

const CLIENT_SCRIPTS: &[(&str, &str)] = &[
    ("dev", "react-router dev"),
    ("build", "react-router typegen && tsc -b && react-router build"),
    ("typecheck", "react-router typegen && tsc"),
];

pub struct ReactRouterMpa;

#[async_trait]
impl Installer for ReactRouterMpa {
    fn id(&self) -> InstallerId {
        ID
    }

    fn label(&self) -> &'static str {
        "React Router (framework mode)"
    }

    fn activation(&self, options: &OptionSet) -> Activation {
        if options.router() == Router::ReactRouterMpa {
            Activation::Selected
        } else {
            Activation::Inactive
        }
    }

    fn after(&self) -> &'static [InstallerId] {
        ROUTER_AFTER
    }

    fn conflicts(&self) -> &'static [Conflict] {
        &[
            Conflict::Installer(react_router::ID),
            Conflict::Installer(tanstack_router::ID),
        ]
    }

    fn templates(&self, options: &OptionSet) -> Vec<TemplateRef> {
        let mut home = PAGE_FEATURES.to_vec();
        home.push(Feature::ReactRouterMpa);

        vec![
            TemplateRef::stable(slots::ROOT_ROUTE),
            TemplateRef::stable(slots::ROUTES),
            TemplateRef::stable(slots::HOME_ROUTE),
            TemplateRef::stable(slots::CLIENT_ONLY),
            TemplateRef::for_options(slots::HOME, options, &home),
            TemplateRef::stable(slots::REACT_ROUTER_CONFIG),
            TemplateRef::stable(slots::TSCONFIG_APP),
            TemplateRef::for_options(
                slots::VITE_CONFIG,
                options,
                &[Feature::ReactRouterMpa, Feature::Shadcn, Feature::Tailwind],
            ),
        ]
    }

    async fn install(&self, ctx: &InstallContext<'_>) -> Result<(), InstallError> {
        ctx.add_dependencies("client", DependencyKind::Prod, DEPENDENCIES)
            .await?;
        ctx.add_dependencies("client", DependencyKind::Dev, DEV_DEPENDENCIES)
            .await?;
        ctx.copy_templates(&self.templates(ctx.options)).await?;

        let mut client = ctx.manifest("client/package.json").await?;
        for (name, command) in CLIENT_SCRIPTS {
            client.set_script(name, command);
        }
        client.save(ctx.fs).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installers::apply_twice;
    use crate::options::PartialOptions;
    use crate::testing::{options, project_file};

    #[tokio::test]
    async fn test_install_is_idempotent() {
        let set = options(PartialOptions {
            tailwind: Some(true),
            router: Some(Router::ReactRouterMpa),
            ..Default::default()
        })
        .unwrap();
        let fs = apply_twice(&ReactRouterMpa, &set).await;

        assert_eq!(
            project_file(&fs, "client/src/components/Home.tsx").as_deref(),
            Some("client/src/components/Home.tsx/Home-with-reactroutermpa-tailwind.tsx")
        );
        assert_eq!(
            project_file(&fs, "client/vite.config.ts").as_deref(),
            Some("client/vite.config.ts/vite.config-with-reactroutermpa-tailwind.ts")
        );
        assert!(project_file(&fs, "client/src/routes/home.tsx").is_some());

        let client: serde_json::Value =
            serde_json::from_str(&project_file(&fs, "client/package.json").unwrap()).unwrap();
        assert_eq!(client["scripts"]["dev"], "react-router dev");
        assert_eq!(client["scripts"]["lint"], "eslint .");
    }
}
