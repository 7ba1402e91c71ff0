//! TanStack Router with file-based routes

use super::react_router::{PAGE_FEATURES, ROUTER_AFTER};
use super::{
    react_router, react_router_mpa, Activation, Conflict, InstallContext, InstallError, Installer,
    InstallerId,
};
use crate::manifest::DependencyKind;
use crate::options::{Feature, OptionSet, Router};
use crate::templates::{slots, TemplateRef};
use async_trait::async_trait;

pub const ID: InstallerId = InstallerId("tanstack-router");

pub struct TanstackRouter;

#[async_trait]
impl Installer for TanstackRouter {
    fn id(&self) -> InstallerId {
        ID
    }

    fn label(&self) -> &'static str {
        "TanStack Router"
    }

    fn activation(&self, options: &OptionSet) -> Activation {
        if options.router() == Router::TanstackRouter {
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
            Conflict::Installer(react_router_mpa::ID),
        ]
    }

    fn templates(&self, options: &OptionSet) -> Vec<TemplateRef> {
        vec![
            TemplateRef::for_options(
                slots::VITE_CONFIG,
                options,
                &[Feature::TanstackRouter, Feature::Shadcn, Feature::Tailwind],
            ),
            TemplateRef::for_options(
                slots::TANSTACK_ROOT_ROUTE,
                options,
                &[Feature::Tailwind, Feature::Shadcn],
            ),
            TemplateRef::for_options(slots::TANSTACK_INDEX_ROUTE, options, &PAGE_FEATURES),
            TemplateRef::for_options(
                slots::MAIN,
                options,
                &[Feature::TanstackQuery, Feature::TanstackRouter],
            ),
        ]
    }

    async fn install(&self, ctx: &InstallContext<'_>) -> Result<(), InstallError> {
        ctx.add_dependencies("client", DependencyKind::Prod, &["@tanstack/react-router"])
            .await?;
        ctx.add_dependencies("client", DependencyKind::Dev, &["@tanstack/router-plugin"])
            .await?;
        ctx.copy_templates(&self.templates(ctx.options)).await?;
        // Routes replace the single-page App component
        ctx.remove_file("client/src/App.tsx").await?;
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
            tanstack_query: Some(true),
            router: Some(Router::TanstackRouter),
            ..Default::default()
        })
        .unwrap();
        let fs = apply_twice(&TanstackRouter, &set).await;

        assert_eq!(
            project_file(&fs, "client/src/main.tsx").as_deref(),
            Some("client/src/main.tsx/main-with-tanstackquery-tanstackrouter.tsx")
        );
        assert_eq!(
            project_file(&fs, "client/src/routes/index.tsx").as_deref(),
            Some("client/src/routes/index.tsx/index-with-tanstackquery.tsx")
        );
        assert!(project_file(&fs, "client/src/App.tsx").is_none());
        assert!(project_file(&fs, "client/package.json")
            .unwrap()
            .contains("\"@tanstack/router-plugin\""));
    }
}
