use url::Url;

const SCRAPEOPS_PROXY_URL: &str = "https://proxy.scrapeops.io/v1/";

/// Routes page loads through the ScrapeOps proxy gateway.
#[derive(Clone)]
pub struct ProxyUrlBuilder {
    api_key: String,
}

impl ProxyUrlBuilder {
    pub fn new(api_key: String) -> Self {
        ProxyUrlBuilder { api_key }
    }

    pub fn build(&self, target: &str, country: &str) -> String {
        match Url::parse_with_params(
            SCRAPEOPS_PROXY_URL,
            &[
                ("api_key", self.api_key.as_str()),
                ("url", target),
                ("country", country),
            ],
        ) {
            Ok(url) => url.to_string(),
            Err(e) => {
                log::error!("Failed to build proxy url for {}: {:?}", target, e);
                target.to_string()
            }
        }
    }
}
