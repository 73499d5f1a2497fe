//! Geography criterion
//!
//! Matches the customer's default-address country against the configured
//! countries, after expanding region names ("Europe") into member countries.
//! Country names follow the Admin API's English country names.

use super::{same_text, Criterion, CriterionId, MatchContext};
use crate::config::CompilerLimits;
use crate::fetch_spec::Selection;
use audience_types::{selected, CandidateRecord, FilterConfig};

pub static REGIONS: &[(&str, &[&str])] = &[
    (
        "North America",
        &[
            "United States",
            "Canada",
            "Mexico",
            "Greenland",
            "Bermuda",
            "Guatemala",
            "Belize",
            "Honduras",
            "El Salvador",
            "Nicaragua",
            "Costa Rica",
            "Panama",
            "Cuba",
            "Jamaica",
            "Haiti",
            "Dominican Republic",
            "Bahamas",
            "Puerto Rico",
            "Trinidad & Tobago",
            "Barbados",
        ],
    ),
    (
        "South America",
        &[
            "Brazil",
            "Argentina",
            "Chile",
            "Colombia",
            "Peru",
            "Venezuela",
            "Ecuador",
            "Bolivia",
            "Paraguay",
            "Uruguay",
            "Guyana",
            "Suriname",
        ],
    ),
    (
        "Europe",
        &[
            "United Kingdom",
            "Ireland",
            "France",
            "Germany",
            "Netherlands",
            "Belgium",
            "Luxembourg",
            "Switzerland",
            "Austria",
            "Italy",
            "Spain",
            "Portugal",
            "Denmark",
            "Sweden",
            "Norway",
            "Finland",
            "Iceland",
            "Poland",
            "Czechia",
            "Slovakia",
            "Hungary",
            "Romania",
            "Bulgaria",
            "Greece",
            "Croatia",
            "Slovenia",
            "Serbia",
            "Estonia",
            "Latvia",
            "Lithuania",
            "Ukraine",
            "Malta",
            "Cyprus",
            "Monaco",
            "Liechtenstein",
        ],
    ),
    (
        "Asia",
        &[
            "China",
            "Japan",
            "South Korea",
            "India",
            "Indonesia",
            "Thailand",
            "Vietnam",
            "Philippines",
            "Malaysia",
            "Singapore",
            "Pakistan",
            "Bangladesh",
            "Sri Lanka",
            "Nepal",
            "Taiwan",
            "Hong Kong SAR",
            "Kazakhstan",
        ],
    ),
    (
        "Middle East",
        &[
            "United Arab Emirates",
            "Saudi Arabia",
            "Israel",
            "Qatar",
            "Kuwait",
            "Bahrain",
            "Oman",
            "Jordan",
            "Lebanon",
            "Türkiye",
        ],
    ),
    (
        "Africa",
        &[
            "Nigeria",
            "South Africa",
            "Egypt",
            "Kenya",
            "Morocco",
            "Ghana",
            "Ethiopia",
            "Algeria",
            "Tunisia",
            "Tanzania",
            "Uganda",
            "Senegal",
            "Côte d’Ivoire",
        ],
    ),
    (
        "Oceania",
        &[
            "Australia",
            "New Zealand",
            "Fiji",
            "Papua New Guinea",
            "Samoa",
            "Tonga",
        ],
    ),
];

/// Region names offered by the location picker
pub fn region_names() -> Vec<&'static str> {
    REGIONS.iter().map(|(name, _)| *name).collect()
}

fn region_members(name: &str) -> Option<&'static [&'static str]> {
    REGIONS
        .iter()
        .find(|(region, _)| same_text(region, name))
        .map(|(_, members)| *members)
}

/// Expand region names into countries, keeping literal countries as given.
///
/// The result is deduplicated case-insensitively in first-seen order, so
/// normalizing an already normalized list returns it unchanged.
pub fn normalize_locations(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |country: &str| {
        if !out.iter().any(|c| same_text(c, country)) {
            out.push(country.to_string());
        }
    };
    for value in selected(values) {
        match region_members(value) {
            Some(members) => members.iter().for_each(|c| push(*c)),
            None => push(value),
        }
    }
    out
}

pub struct LocationCriterion;

impl Criterion for LocationCriterion {
    fn id(&self) -> CriterionId {
        CriterionId::Location
    }

    fn is_active(&self, config: &FilterConfig) -> bool {
        !selected(&config.location).is_empty()
    }

    fn fragment(&self, _limits: &CompilerLimits) -> Vec<Selection> {
        vec![Selection::node(
            "defaultAddress",
            vec![Selection::leaf("country"), Selection::leaf("countryCodeV2")],
        )]
    }

    fn cost(&self) -> u8 {
        1
    }

    fn matches(&self, record: &CandidateRecord, ctx: &MatchContext<'_>) -> bool {
        let country = record.country();
        let code = record.country_code();
        if country.is_none() {
            return false;
        }
        ctx.locations.iter().any(|wanted| {
            country.is_some_and(|c| same_text(c, wanted))
                || code.is_some_and(|c| same_text(c, wanted))
        })
    }

    fn describe(&self, config: &FilterConfig) -> String {
        format!("Location: {}", selected(&config.location).join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::ResolvedSelections;
    use audience_types::Address;

    fn customer(country: Option<&str>, code: Option<&str>) -> CandidateRecord {
        CandidateRecord {
            id: "gid://shopify/Customer/1".into(),
            default_address: Some(Address {
                country: country.map(String::from),
                country_code_v2: code.map(String::from),
            }),
            ..Default::default()
        }
    }

    fn matches(record: &CandidateRecord, cfg: &FilterConfig) -> bool {
        let resolved = ResolvedSelections::default();
        LocationCriterion.matches(record, &MatchContext::new(cfg, &resolved))
    }

    #[test]
    fn test_region_expansion() {
        let cfg = FilterConfig::new().with_location(["North America"]);
        assert!(matches(&customer(Some("Canada"), Some("CA")), &cfg));
        assert!(!matches(&customer(Some("Germany"), Some("DE")), &cfg));
    }

    #[test]
    fn test_literal_country_and_code() {
        let cfg = FilterConfig::new().with_location(["germany", "FR"]);
        assert!(matches(&customer(Some("Germany"), None), &cfg));
        assert!(matches(&customer(Some("France"), Some("FR")), &cfg));
        assert!(!matches(&customer(Some("Spain"), Some("ES")), &cfg));
    }

    #[test]
    fn test_missing_country_never_matches() {
        let cfg = FilterConfig::new().with_location(["Canada", "CA"]);
        assert!(!matches(&customer(None, Some("CA")), &cfg));
        let no_address = CandidateRecord {
            id: "x".into(),
            ..Default::default()
        };
        assert!(!matches(&no_address, &cfg));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let values: Vec<String> = ["Canada", "north america", "Germany", "Europe"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let once = normalize_locations(&values);
        let twice = normalize_locations(&once);
        assert_eq!(once, twice);
        assert_eq!(once.iter().filter(|c| *c == "Canada").count(), 1);
        assert_eq!(once.iter().filter(|c| *c == "Germany").count(), 1);
        assert_eq!(once[0], "Canada");
    }

    #[test]
    fn test_context_expands_once() {
        let cfg = FilterConfig::new().with_location(["North America", "canada"]);
        let resolved = ResolvedSelections::default();
        let ctx = MatchContext::new(&cfg, &resolved);
        assert!(ctx.locations.iter().any(|c| c == "United States"));
        assert_eq!(ctx.locations.iter().filter(|c| same_text(c, "Canada")).count(), 1);

        // matching reads the expanded list, not the raw selection
        let pinned = MatchContext {
            locations: vec!["Japan".to_string()],
            ..ctx.clone()
        };
        assert!(LocationCriterion.matches(&customer(Some("Japan"), Some("JP")), &pinned));
        assert!(!LocationCriterion.matches(&customer(Some("Canada"), Some("CA")), &pinned));
        assert!(LocationCriterion.matches(&customer(Some("Canada"), Some("CA")), &ctx));
    }

    #[test]
    fn test_region_names() {
        assert!(region_names().contains(&"Europe"));
        assert!(region_members("EUROPE").is_some());
    }
}
