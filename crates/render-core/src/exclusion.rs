//! Request-time filtering of the active-plugin list.
//!
//! The filter only ever removes entries, and only when the request is a
//! front-end request that carries both an `exclude_plugins` list and a valid
//! `exclusion_token`. Every other path returns the list untouched.

use crate::token::{SaltProvider, TokenAuthority};
use crate::{EXCLUDE_PLUGINS_PARAM, EXCLUSION_TOKEN_PARAM};

/// The parts of an inbound request the exclusion filter looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Administrative / back-office request.
    pub is_admin: bool,
    pub exclude_plugins: Option<String>,
    pub exclusion_token: Option<String>,
}

impl RequestContext {
    /// A front-end request without exclusion parameters.
    pub fn front_end() -> Self {
        Self::default()
    }

    /// An administrative request without exclusion parameters.
    pub fn admin() -> Self {
        Self {
            is_admin: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_exclusion(mut self, slugs: impl Into<String>, token: impl Into<String>) -> Self {
        self.exclude_plugins = Some(slugs.into());
        self.exclusion_token = Some(token.into());
        self
    }

    /// Build a context from a raw URL query string (without the leading `?`).
    ///
    /// A repeated parameter resolves to its last occurrence, the way PHP
    /// fills `$_GET`.
    pub fn from_query(query: &str, is_admin: bool) -> Self {
        let mut ctx = Self {
            is_admin,
            ..Self::default()
        };
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                EXCLUDE_PLUGINS_PARAM => &mut ctx.exclude_plugins,
                EXCLUSION_TOKEN_PARAM => &mut ctx.exclusion_token,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        ctx
    }
}

/// Middleware seam: anything that can rewrite the active-plugin list for a
/// single request.
pub trait PluginListFilter {
    fn filter(&self, active_plugins: &[String], ctx: &RequestContext) -> Vec<String>;
}

/// Token-gated plugin exclusion.
#[derive(Debug, Clone)]
pub struct ExclusionFilter<P> {
    authority: TokenAuthority<P>,
}

impl<P: SaltProvider> ExclusionFilter<P> {
    pub const fn new(authority: TokenAuthority<P>) -> Self {
        Self { authority }
    }

    pub const fn authority(&self) -> &TokenAuthority<P> {
        &self.authority
    }
}

impl<P: SaltProvider> PluginListFilter for ExclusionFilter<P> {
    fn filter(&self, active_plugins: &[String], ctx: &RequestContext) -> Vec<String> {
        if ctx.is_admin {
            return active_plugins.to_vec();
        }

        let (Some(raw_slugs), Some(presented)) = (&ctx.exclude_plugins, &ctx.exclusion_token)
        else {
            return active_plugins.to_vec();
        };

        if !self.authority.verify(presented.trim()) {
            tracing::warn!("invalid exclusion token provided in request");
            return active_plugins.to_vec();
        }

        let slugs = parse_slugs(raw_slugs);
        if slugs.is_empty() {
            return active_plugins.to_vec();
        }

        active_plugins
            .iter()
            .filter(|plugin| match slugs.iter().find(|slug| matches_slug(plugin, slug)) {
                Some(slug) => {
                    tracing::debug!(plugin = %plugin, slug = %slug, "excluding plugin");
                    false
                }
                None => true,
            })
            .cloned()
            .collect()
    }
}

/// Split a comma-separated slug list, trimming whitespace and dropping empty
/// segments.
pub fn parse_slugs(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Path-segment containment: `plugin` starts with `"<slug>/"` or contains
/// `"/<slug>/"`.
pub fn matches_slug(plugin: &str, slug: &str) -> bool {
    plugin
        .strip_prefix(slug)
        .is_some_and(|rest| rest.starts_with('/'))
        || plugin.contains(&format!("/{slug}/"))
}
