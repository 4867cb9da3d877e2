//! The `render` command: fetch a site path and print its body or status code.

use render_core::exclusion::parse_slugs;
use render_core::{EXCLUDE_PLUGINS_PARAM, EXCLUSION_TOKEN_PARAM};

use crate::config::RenderConfig;
use crate::http;

/// What to print for a fetched page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// The response body
    #[default]
    #[value(name = "raw")]
    Raw,
    /// The numeric HTTP status code
    #[value(name = "http_code")]
    HttpCode,
}

/// Plugins to switch off for one request, together with the token that
/// authorises it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub slugs: Vec<String>,
    pub token: String,
}

impl Exclusion {
    /// Parse a `--without-plugins` value. Returns `None` when it names no
    /// plugins.
    pub fn parse(without_plugins: &str, token: String) -> Option<Self> {
        let slugs: Vec<String> = parse_slugs(without_plugins)
            .into_iter()
            .map(str::to_string)
            .collect();
        (!slugs.is_empty()).then_some(Self { slugs, token })
    }
}

/// Join `path` onto the site URL and append the exclusion query parameters.
///
/// `path` is site-relative; a leading `/` is optional, and any query string it
/// carries is kept.
///
/// # Errors
///
/// Returns an error if the site URL or the joined result is not a valid URL.
pub fn build_url(
    site_url: &str,
    path: &str,
    exclusion: Option<&Exclusion>,
) -> anyhow::Result<reqwest::Url> {
    let joined = format!(
        "{}/{}",
        site_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = reqwest::Url::parse(&joined)
        .map_err(|e| anyhow::anyhow!("invalid URL {joined:?}: {e}"))?;
    if let Some(exclusion) = exclusion {
        url.query_pairs_mut()
            .append_pair(EXCLUDE_PLUGINS_PARAM, &exclusion.slugs.join(","))
            .append_pair(EXCLUSION_TOKEN_PARAM, &exclusion.token);
    }
    Ok(url)
}

/// Text printed for a page in the requested format.
pub fn format_page(page: &http::Page, format: OutputFormat) -> String {
    match format {
        OutputFormat::Raw => page.body.clone(),
        OutputFormat::HttpCode => page.status.to_string(),
    }
}

/// Arguments of a single `render` invocation.
#[derive(Debug, Clone)]
pub struct RenderArgs {
    pub path: String,
    pub without_plugins: Option<String>,
    pub format: OutputFormat,
}

/// Fetch the page and return what should be printed.
///
/// # Errors
///
/// Returns an error if the path is empty, no site URL is configured, or the
/// request fails at the transport level.
pub fn render(config: &RenderConfig, args: &RenderArgs) -> anyhow::Result<String> {
    if args.path.trim().is_empty() {
        anyhow::bail!("please provide a path to render");
    }
    let site_url = config.require_site_url()?;

    let exclusion = match args.without_plugins.as_deref() {
        Some(list) => {
            let exclusion = Exclusion::parse(list, config.token_authority().derive_token());
            if exclusion.is_none() {
                eprintln!(
                    "[render-command] --without-plugins names no plugins; rendering with all plugins"
                );
            }
            exclusion
        }
        None => None,
    };

    let url = build_url(site_url, &args.path, exclusion.as_ref())?;
    if exclusion.is_some() {
        eprintln!("[render-command] requesting URL with plugin exclusion: {url}");
    }

    let client = http::build_client(config.timeout_secs)?;
    let page = http::get_page(&client, &url)?;
    Ok(format_page(&page, args.format))
}
