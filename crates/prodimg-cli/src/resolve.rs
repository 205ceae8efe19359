//! `resolve` subcommand: one resolution, printed as the same JSON body the
//! HTTP endpoint returns.

use clap::Args;
use prodimg_core::AppConfig;
use prodimg_resolver::{ResolutionRequest, Resolver};

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Target site domain (defaults to PRODIMG_DEFAULT_SITE)
    #[arg(long)]
    pub site: Option<String>,
    /// Retailer internal product number
    #[arg(long)]
    pub subcode: Option<String>,
    /// EAN barcode (12 to 14 digits)
    #[arg(long)]
    pub ean: Option<String>,
    /// Free-text product name
    #[arg(long)]
    pub name: Option<String>,
    /// Include the attempt trace even on success
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug)]
pub struct ResolveReport {
    pub matched: bool,
    pub json: String,
}

pub async fn run_resolve(config: &AppConfig, args: &ResolveArgs) -> anyhow::Result<ResolveReport> {
    let site = args
        .site
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(&config.default_site);

    let request = ResolutionRequest::new(
        site,
        args.subcode.as_deref(),
        args.ean.as_deref(),
        args.name.as_deref(),
        args.debug,
    );

    let resolver = Resolver::new(&config.resolver)?;
    let outcome = resolver.resolve(&request).await?;
    let matched = outcome.is_match();
    if !matched {
        tracing::warn!(site = %request.site, attempts = outcome.tried().len(), "no image found");
    }

    let json = serde_json::to_string_pretty(&outcome.into_body(request.debug))?;
    Ok(ResolveReport { matched, json })
}
