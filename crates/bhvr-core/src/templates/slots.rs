//! Slots the built-in installers write

use super::store::Slot;

pub const APP: Slot = Slot::new("client/src/App.tsx");
pub const MAIN: Slot = Slot::new("client/src/main.tsx");
pub const INDEX_CSS: Slot = Slot::new("client/src/index.css");
pub const HOME: Slot = Slot::new("client/src/components/Home.tsx");
pub const BUTTON: Slot = Slot::new("client/src/components/ui/button.tsx");
pub const CLIENT_ONLY: Slot = Slot::new("client/src/components/ClientOnly.tsx");
pub const UTILS: Slot = Slot::new("client/src/lib/utils.ts");
pub const ROOT_ROUTE: Slot = Slot::new("client/src/root.tsx");
pub const ROUTES: Slot = Slot::new("client/src/routes.ts");
pub const HOME_ROUTE: Slot = Slot::new("client/src/routes/home.tsx");
pub const TANSTACK_ROOT_ROUTE: Slot = Slot::new("client/src/routes/__root.tsx");
pub const TANSTACK_INDEX_ROUTE: Slot = Slot::new("client/src/routes/index.tsx");
pub const VITE_CONFIG: Slot = Slot::new("client/vite.config.ts");
pub const COMPONENTS_JSON: Slot = Slot::new("client/components.json");
pub const REACT_ROUTER_CONFIG: Slot = Slot::new("client/react-router.config.ts");
pub const TSCONFIG_APP: Slot = Slot::new("client/tsconfig.app.json");
pub const SERVER_INDEX: Slot = Slot::new("server/src/index.ts");
pub const SERVER_CLIENT: Slot = Slot::new("server/src/client.ts");
pub const BIOME_JSON: Slot = Slot::new("biome.json");
