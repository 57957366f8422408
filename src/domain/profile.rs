use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CrawlError;

use super::{
    json_ld::{extract_graph, field, find_typed},
    NOT_AVAILABLE,
};

const FOLLOWS: &str = "Follows";
const INTERACTION_COUNTER: &str = "InteractionCounter";

/// Attributes scraped from a person's profile page, keyed by the
/// identifier found during discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub name: String,
    pub company: String,
    pub company_profile: String,
    pub job_title: String,
    pub followers: u64,
}

impl EnrichmentRecord {
    /// Builds a record from a JSON-LD `Person` entity. Absent fields fall back
    /// to the sentinel, or 0 for the follower count.
    pub fn from_person(identifier: &str, person: &Value) -> Self {
        let not_available = || NOT_AVAILABLE.to_string();

        EnrichmentRecord {
            name: identifier.to_string(),
            company: field(person, "/worksFor/0/name", not_available()),
            company_profile: field(person, "/worksFor/0/url", not_available()),
            job_title: field(person, "/jobTitle/0", not_available()),
            followers: follower_count(person),
        }
    }
}

fn follower_count(person: &Value) -> u64 {
    let is_follows_counter = |stat: &&Value| {
        field(stat, "/name", String::new()) == FOLLOWS
            && field(stat, "/@type", String::new()) == INTERACTION_COUNTER
    };

    let counter = match person.get("interactionStatistic") {
        Some(Value::Array(stats)) => stats.iter().find(is_follows_counter),
        Some(stat) => Some(stat).filter(is_follows_counter),
        None => None,
    };

    counter
        .map(|stat| field(stat, "/userInteractionCount", 0u64))
        .unwrap_or(0)
}

/// Extracts the enrichment record for `identifier` from a profile page.
///
/// A page whose structured data holds no `Person` still yields a record with
/// every field defaulted.
pub fn extract_profile(identifier: &str, html: &str) -> Result<EnrichmentRecord, CrawlError> {
    let graph = extract_graph(html)?;
    let empty = Value::Object(Default::default());
    let person = find_typed(&graph, "Person").unwrap_or(&empty);

    Ok(EnrichmentRecord::from_person(identifier, person))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::profile_page;

    #[test]
    fn full_person_is_extracted() {
        let html = profile_page(&json!({
            "@graph": [
                { "@type": "WebPage", "name": "ignored" },
                {
                    "@type": "Person",
                    "jobTitle": ["Co-chair", "Founder"],
                    "worksFor": [{ "@type": "Organization", "name": "Gates Foundation", "url": "https://www.linkedin.com/company/gates" }],
                    "interactionStatistic": {
                        "@type": "InteractionCounter",
                        "name": "Follows",
                        "userInteractionCount": 39000000
                    }
                }
            ]
        }));

        let record = extract_profile("williamhgates", &html).unwrap();

        assert_eq!(
            record,
            EnrichmentRecord {
                name: "williamhgates".to_string(),
                company: "Gates Foundation".to_string(),
                company_profile: "https://www.linkedin.com/company/gates".to_string(),
                job_title: "Co-chair".to_string(),
                followers: 39000000,
            }
        );
    }

    #[test]
    fn entity_without_optional_fields_is_fully_defaulted() {
        let record = EnrichmentRecord::from_person("x", &json!({ "@type": "Person" }));

        assert_eq!(
            record,
            EnrichmentRecord {
                name: "x".to_string(),
                company: "n/a".to_string(),
                company_profile: "n/a".to_string(),
                job_title: "n/a".to_string(),
                followers: 0,
            }
        );
    }

    #[test]
    fn graph_without_person_still_yields_a_record() {
        let html = profile_page(&json!({ "@graph": [{ "@type": "WebPage" }] }));

        let record = extract_profile("someone", &html).unwrap();

        assert_eq!(record, EnrichmentRecord::from_person("someone", &json!({})));
    }

    #[test]
    fn company_without_url_defaults_profile_link() {
        let person = json!({ "worksFor": [{ "name": "Acme" }], "jobTitle": [] });

        let record = EnrichmentRecord::from_person("x", &person);

        assert_eq!(record.company, "Acme");
        assert_eq!(record.company_profile, "n/a");
        assert_eq!(record.job_title, "n/a");
    }

    #[test]
    fn followers_require_matching_counter() {
        let wrong_name = json!({ "interactionStatistic": {
            "@type": "InteractionCounter", "name": "Likes", "userInteractionCount": 10
        }});
        let wrong_type = json!({ "interactionStatistic": {
            "@type": "Counter", "name": "Follows", "userInteractionCount": 10
        }});
        let in_array = json!({ "interactionStatistic": [
            { "@type": "InteractionCounter", "name": "Likes", "userInteractionCount": 1 },
            { "@type": "InteractionCounter", "name": "Follows", "userInteractionCount": "250" }
        ]});

        assert_eq!(follower_count(&wrong_name), 0);
        assert_eq!(follower_count(&wrong_type), 0);
        assert_eq!(follower_count(&in_array), 250);
    }

    #[test]
    fn missing_structured_data_is_an_error() {
        let html = "<html><head></head><body>login wall</body></html>";

        assert!(matches!(
            extract_profile("x", html),
            Err(CrawlError::Extraction(_))
        ));
    }
}
