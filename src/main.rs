use anyhow::Context;
use env_logger::Env;
use profile_crawler::{
    configuration::get_configuration,
    services::{BrowserLauncher, Pipeline},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;
    log::info!(
        "Crawling {} keywords with {:?} browser",
        configuration.crawl.keywords.len(),
        configuration.browser.kind
    );

    let launcher = BrowserLauncher::new(configuration.browser.clone());
    let report = Pipeline::new(&configuration).run(&launcher).await?;

    log::info!(
        "Discovery: {}/{} keywords succeeded, {} gave up",
        report.discovery.succeeded,
        report.discovery.units,
        report.discovery.exhausted
    );
    for (keyword, summary) in &report.enrichment {
        log::info!(
            "Profiles for {}: {}/{} succeeded, {} gave up, {} not written",
            keyword,
            summary.succeeded,
            summary.units,
            summary.exhausted,
            summary.unpersisted
        );
    }

    Ok(())
}
