pub mod exclusion;
pub mod mu_plugin;
pub mod token;

pub use exclusion::{ExclusionFilter, PluginListFilter, RequestContext};
pub use token::{SaltProvider, StaticSalt, TokenAuthority};

/// Query parameter carrying the comma-separated slugs to exclude.
pub const EXCLUDE_PLUGINS_PARAM: &str = "exclude_plugins";

/// Query parameter carrying the presented exclusion token.
pub const EXCLUSION_TOKEN_PARAM: &str = "exclusion_token";
