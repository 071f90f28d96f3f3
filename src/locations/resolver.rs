//! Builds the list of districts to collect, from the Wikipedia reference page
//! when it parses into a plausible list, otherwise from the static list.

use crate::clients::transport::HttpTransport;
use crate::error::{CollectorError, Result};
use crate::locations::division::CANONICAL_DIVISIONS;
use crate::locations::static_list::STATIC_DISTRICTS;
use crate::models::District;
use crate::settings::Settings;
use crate::utils::constants::{MAX_PLAUSIBLE_DISTRICTS, MIN_PLAUSIBLE_DISTRICTS};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{info, warn};

const TABLE_SELECTOR: &str = "table.wikitable, table.sortable, table.plainrowheaders";

const SPELLING_ALIASES: [(&str, &str); 4] = [
    ("Chittagong", "Chattogram"),
    ("Comilla", "Cumilla"),
    ("Jessore", "Jashore"),
    ("Barisal", "Barishal"),
];

/// Older labels that appear in the page alongside the canonical names.
const LEGACY_DIVISION_LABELS: [&str; 2] = ["Chittagong", "Barisal"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Live,
    Static,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub districts: Vec<District>,
    pub source: ResolutionSource,
}

pub struct LocationResolver {
    transport: Rc<dyn HttpTransport>,
    url: String,
}

impl LocationResolver {
    pub fn new(settings: &Settings, transport: Rc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            url: settings.endpoints.reference_url.clone(),
        }
    }

    pub fn resolve_districts(&self) -> Vec<District> {
        self.resolve().districts
    }

    /// Resolve the district list. Never fails: any problem with the live
    /// page falls back to the static list.
    pub fn resolve(&self) -> Resolution {
        let resolution = match self.fetch_live() {
            Ok(districts) if is_plausible(districts.len()) => {
                info!("Parsed {} districts from reference page", districts.len());
                Resolution {
                    districts,
                    source: ResolutionSource::Live,
                }
            }
            Ok(districts) => {
                warn!(
                    "Reference page yielded {} districts (expected {}-{}), using static list",
                    districts.len(),
                    MIN_PLAUSIBLE_DISTRICTS,
                    MAX_PLAUSIBLE_DISTRICTS
                );
                static_resolution()
            }
            Err(e) => {
                warn!("Could not load reference page ({}), using static list", e);
                static_resolution()
            }
        };

        Resolution {
            districts: apply_aliases(resolution.districts),
            source: resolution.source,
        }
    }

    fn fetch_live(&self) -> Result<Vec<District>> {
        let response = self.transport.get(&self.url, &[])?;
        if !response.is_success() {
            return Err(CollectorError::HttpStatus {
                status: response.status,
                url: self.url.clone(),
            });
        }
        parse_reference_document(&response.body)
    }
}

pub fn is_plausible(count: usize) -> bool {
    (MIN_PLAUSIBLE_DISTRICTS..=MAX_PLAUSIBLE_DISTRICTS).contains(&count)
}

fn static_resolution() -> Resolution {
    Resolution {
        districts: STATIC_DISTRICTS
            .iter()
            .map(|name| District::new(*name, ""))
            .collect(),
        source: ResolutionSource::Static,
    }
}

/// Extract districts (and their division, when the row names one) from the
/// district tables of the reference page.
pub fn parse_reference_document(html: &str) -> Result<Vec<District>> {
    let document = Html::parse_document(html);
    let tables = selector(TABLE_SELECTOR)?;
    let header_cells = selector("th")?;
    let rows = selector("tr")?;
    let cells = selector("td, th")?;

    let mut seen = HashSet::new();
    let mut districts = Vec::new();

    for table in document.select(&tables) {
        let is_district_table = table
            .select(&header_cells)
            .any(|th| cell_text(th).to_lowercase().contains("district"));
        if !is_district_table {
            continue;
        }

        for row in table.select(&rows) {
            let row_cells: Vec<ElementRef> = row.select(&cells).collect();
            if row_cells.len() < 2 {
                continue;
            }

            let Some(raw_name) = row
                .select(&header_cells)
                .map(cell_text)
                .find(|text| !text.is_empty())
            else {
                continue;
            };

            let region = row_cells
                .iter()
                .map(|cell| cell_text(*cell))
                .filter_map(|text| division_label(&text))
                .last()
                .unwrap_or_default();

            let name = clean_district_name(&raw_name);
            if name.chars().count() <= 2 {
                continue;
            }
            let district = District::new(name, region);
            if seen.insert(district.cache_key()) {
                districts.push(district);
            }
        }
    }

    Ok(districts)
}

/// Rename districts recorded under older spellings.
pub fn apply_aliases(districts: Vec<District>) -> Vec<District> {
    districts
        .into_iter()
        .map(|mut district| {
            if let Some((_, current)) = SPELLING_ALIASES
                .iter()
                .find(|(old, _)| *old == district.name)
            {
                district.name = current.to_string();
            }
            district
        })
        .collect()
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CollectorError::Scrape(format!("bad selector '{}': {}", css, e)))
}

/// Whitespace-normalized text content of a cell.
fn cell_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn division_label(text: &str) -> Option<String> {
    if let Some(stripped) = text.strip_suffix(" Division") {
        return Some(stripped.trim().to_string());
    }
    if CANONICAL_DIVISIONS.contains(&text) || LEGACY_DIVISION_LABELS.contains(&text) {
        return Some(text.to_string());
    }
    None
}

fn clean_district_name(raw: &str) -> String {
    raw.replace("District", "").trim().replace("(city)", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::testing::ScriptedTransport;
    use crate::utils::constants::WIKI_DISTRICTS_URL;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"
        <html><body>
        <table class="wikitable sortable">
          <tr><th>District</th><th>Division</th><th>Area</th></tr>
          <tr><th scope="row">Dhaka District</th><td>Dhaka Division</td><td>1,463</td></tr>
          <tr><th scope="row">Chittagong</th><td>Chittagong Division</td><td>5,283</td></tr>
          <tr><th scope="row">Comilla (city)</th><td>Chattogram</td><td>3,085</td></tr>
          <tr><th scope="row">dhaka</th><td>Dhaka Division</td><td>0</td></tr>
          <tr><th scope="row">XY</th><td>Dhaka Division</td><td>1</td></tr>
          <tr><td>no header cell</td><td>Sylhet Division</td></tr>
        </table>
        <table class="wikitable">
          <tr><th>Upazila</th><th>Population</th></tr>
          <tr><th>Savar</th><td>1,000</td></tr>
        </table>
        </body></html>
    "#;

    fn names(districts: &[District]) -> Vec<&str> {
        districts.iter().map(|d| d.name.as_str()).collect()
    }

    fn generated_page(count: usize) -> String {
        let mut html = String::from("<table class=\"wikitable\"><tr><th>District</th><th>Division</th></tr>");
        for i in 0..count {
            html.push_str(&format!(
                "<tr><th>Place{} District</th><td>Khulna Division</td></tr>",
                i
            ));
        }
        html.push_str("</table>");
        html
    }

    #[test]
    fn test_parse_district_table() {
        let districts = parse_reference_document(FIXTURE).unwrap();

        assert_eq!(names(&districts), vec!["Dhaka", "Chittagong", "Comilla"]);
        assert_eq!(districts[0].region, "Dhaka");
        assert_eq!(districts[1].region, "Chittagong");
        assert_eq!(districts[2].region, "Chattogram");
    }

    #[test]
    fn test_page_without_district_tables_is_empty() {
        let districts = parse_reference_document("<p>maintenance</p>").unwrap();
        assert!(districts.is_empty());
    }

    #[test]
    fn test_aliases() {
        let districts = apply_aliases(parse_reference_document(FIXTURE).unwrap());
        assert_eq!(names(&districts), vec!["Dhaka", "Chattogram", "Cumilla"]);

        let renamed = apply_aliases(vec![District::new("Jessore", ""), District::new("Barisal", "")]);
        assert_eq!(names(&renamed), vec!["Jashore", "Barishal"]);
    }

    #[test]
    fn test_plausibility_band() {
        assert!(!is_plausible(59));
        assert!(is_plausible(60));
        assert!(is_plausible(64));
        assert!(is_plausible(80));
        assert!(!is_plausible(81));
    }

    #[test]
    fn test_live_page_is_used_when_plausible() {
        let transport = Rc::new(ScriptedTransport::always(200, &generated_page(64)));
        let resolver = LocationResolver::new(&Settings::default(), transport.clone());

        let resolution = resolver.resolve();

        assert_eq!(resolution.source, ResolutionSource::Live);
        assert_eq!(resolution.districts.len(), 64);
        assert_eq!(resolution.districts[0], District::new("Place0", "Khulna"));
        assert_eq!(transport.urls(), vec![WIKI_DISTRICTS_URL]);
    }

    #[test]
    fn test_implausible_count_falls_back() {
        let transport = Rc::new(ScriptedTransport::always(200, FIXTURE));
        let resolver = LocationResolver::new(&Settings::default(), transport);

        let resolution = resolver.resolve();

        assert_eq!(resolution.source, ResolutionSource::Static);
        assert_eq!(resolution.districts.len(), 64);
        assert!(resolution.districts.iter().all(|d| d.region.is_empty()));
    }

    #[test]
    fn test_too_many_rows_falls_back() {
        let transport = Rc::new(ScriptedTransport::always(200, &generated_page(81)));
        let resolver = LocationResolver::new(&Settings::default(), transport);
        assert_eq!(resolver.resolve().source, ResolutionSource::Static);
    }

    #[test]
    fn test_http_error_falls_back_without_retry() {
        let transport = Rc::new(ScriptedTransport::always(503, ""));
        let resolver = LocationResolver::new(&Settings::default(), transport.clone());

        let districts = resolver.resolve_districts();

        assert_eq!(districts.len(), 64);
        assert_eq!(transport.call_count(), 1);
        assert!(names(&districts).contains(&"Chattogram"));
    }

    #[test]
    fn test_network_error_falls_back() {
        let transport = Rc::new(ScriptedTransport::unreachable());
        let resolver = LocationResolver::new(&Settings::default(), transport.clone());

        let resolution = resolver.resolve();

        assert_eq!(resolution.source, ResolutionSource::Static);
        assert_eq!(resolution.districts.len(), 64);
        assert_eq!(transport.call_count(), 1);
    }
}
