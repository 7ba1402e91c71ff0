//! React Router in declarative (SPA) mode

use super::{
    react_router_mpa, rpc, shadcn, tailwind, tanstack_query, tanstack_router, Activation,
    Conflict, InstallContext, InstallError, Installer, InstallerId,
};
use crate::manifest::DependencyKind;
use crate::options::{Feature, OptionSet, Router};
use crate::templates::{slots, TemplateRef};
use async_trait::async_trait;

pub const ID: InstallerId = InstallerId("react-router");

/// Installers every router runs after; routers overwrite their slots last
pub(super) const ROUTER_AFTER: &[InstallerId] =
    &[tailwind::ID, shadcn::ID, rpc::ID, tanstack_query::ID];

/// Features a page component's variant depends on
pub(super) const PAGE_FEATURES: [Feature; 4] = [
    Feature::Tailwind,
    Feature::Shadcn,
    Feature::Rpc,
    Feature::TanstackQuery,
];

pub struct ReactRouter;

#[async_trait]
impl Installer for ReactRouter {
    fn id(&self) -> InstallerId {
        ID
    }

    fn label(&self) -> &'static str {
        "React Router"
    }

    fn activation(&self, options: &OptionSet) -> Activation {
        if options.router() == Router::ReactRouter {
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
            Conflict::Installer(react_router_mpa::ID),
            Conflict::Installer(tanstack_router::ID),
        ]
    }

    fn templates(&self, options: &OptionSet) -> Vec<TemplateRef> {
        vec![
            TemplateRef::for_options(slots::APP, options, &[Feature::ReactRouter]),
            TemplateRef::for_options(slots::HOME, options, &PAGE_FEATURES),
        ]
    }

    async fn install(&self, ctx: &InstallContext<'_>) -> Result<(), InstallError> {
        ctx.add_dependencies("client", DependencyKind::Prod, &["react-router"])
            .await?;
        ctx.copy_templates(&self.templates(ctx.options)).await
    }
}
