//! TanStack Query provider and example query

use super::{rpc, shadcn, tailwind, Activation, InstallContext, InstallError, Installer, InstallerId};
use crate::manifest::DependencyKind;
use crate::options::{Feature, OptionSet};
use crate::templates::{slots, TemplateRef};
use async_trait::async_trait;

pub const ID: InstallerId = InstallerId("tanstack-query");

pub struct TanstackQuery;

#[async_trait]
impl Installer for TanstackQuery {
    fn id(&self) -> InstallerId {
        ID
    }

    fn label(&self) -> &'static str {
        "TanStack Query"
    }

    fn activation(&self, options: &OptionSet) -> Activation {
        if options.tanstack_query() {
            Activation::Selected
        } else {
            Activation::Inactive
        }
    }

    fn after(&self) -> &'static [InstallerId] {
        &[tailwind::ID, shadcn::ID, rpc::ID]
    }

    fn templates(&self, options: &OptionSet) -> Vec<TemplateRef> {
        vec![
            TemplateRef::for_options(
                slots::APP,
                options,
                &[
                    Feature::Tailwind,
                    Feature::Shadcn,
                    Feature::Rpc,
                    Feature::TanstackQuery,
                ],
            ),
            TemplateRef::for_options(slots::MAIN, options, &[Feature::TanstackQuery]),
        ]
    }

    async fn install(&self, ctx: &InstallContext<'_>) -> Result<(), InstallError> {
        ctx.add_dependencies("client", DependencyKind::Prod, &["@tanstack/react-query"])
            .await?;
        ctx.add_dependencies(
            "client",
            DependencyKind::Dev,
            &["@tanstack/react-query-devtools"],
        )
        .await?;
        ctx.copy_templates(&self.templates(ctx.options)).await
    }
}
