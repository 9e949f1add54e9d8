//! Handler for `depgather resolve`.

use std::path::PathBuf;
use std::sync::Arc;

use miette::{IntoDiagnostic, Result};

use depgather_core::config::GatherConfig;
use depgather_core::framework::TargetFramework;
use depgather_core::package::{PackageDependencyInfo, PackageIdentity};
use depgather_resolver::feed::FeedSource;
use depgather_resolver::gatherer::DependencyGatherer;
use depgather_resolver::source::SourceCapability;
use depgather_util::cancel::CancellationToken;
use depgather_util::errors::GatherError;

pub struct ResolveOptions {
    pub packages: Vec<String>,
    pub framework: Option<String>,
    pub prerelease: bool,
    pub feed: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub range_filter: bool,
    pub json: bool,
}

pub async fn exec(opts: &ResolveOptions) -> Result<()> {
    let config_path = opts.config.clone().unwrap_or_else(GatherConfig::default_path);
    if opts.config.is_some() && !config_path.is_file() {
        return Err(GatherError::Config {
            message: format!("Config file {} not found", config_path.display()),
        }
        .into());
    }
    let config = GatherConfig::load(&config_path)?;

    let feed_path = opts
        .feed
        .clone()
        .or_else(|| config.feed.path.clone())
        .ok_or_else(|| GatherError::Feed {
            message: "No feed given; pass --feed or set [feed] path in depgather.toml"
                .to_string(),
        })?;
    let feed = FeedSource::load(&feed_path)?;

    let requests = opts
        .packages
        .iter()
        .map(|p| PackageIdentity::parse(p))
        .collect::<Result<Vec<_>, _>>()?;
    let framework = opts
        .framework
        .as_deref()
        .map(TargetFramework::new)
        .unwrap_or_else(|| config.resolve.framework.clone());
    let include_prerelease = opts.prerelease || config.resolve.include_prerelease;
    let capability = if opts.range_filter {
        SourceCapability::RangeFilter
    } else {
        SourceCapability::FetchAll
    };

    let gatherer = Arc::new(
        DependencyGatherer::new(Arc::new(feed), capability)
            .with_max_concurrent_queries(config.resolve.max_concurrent_queries),
    );
    let closure = gatherer
        .resolve_packages(
            &requests,
            &framework,
            include_prerelease,
            &CancellationToken::new(),
        )
        .await?;

    let mut nodes: Vec<PackageDependencyInfo> = closure.into_iter().collect();
    nodes.sort();

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&nodes).into_diagnostic()?);
    } else {
        for node in &nodes {
            println!("{node}");
        }
    }

    let stats = gatherer.stats();
    eprintln!(
        "Resolved {} package(s) with {} source quer{}",
        nodes.len(),
        stats.queries,
        if stats.queries == 1 { "y" } else { "ies" }
    );
    Ok(())
}
