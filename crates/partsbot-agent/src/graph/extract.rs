use std::sync::OnceLock;

use regex::Regex;

use partsbot_core::types::TruckInfo;

struct SlotPatterns {
    make: Regex,
    model: Regex,
    year: Regex,
    part_type: Regex,
}

fn patterns() -> &'static SlotPatterns {
    static PATTERNS: OnceLock<SlotPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| SlotPatterns {
        make: Regex::new(
            r"(?i)ford|chevrolet|chevy|gmc|dodge|ram|toyota|nissan|freightliner|peterbilt|kenworth|volvo|mack",
        )
        .unwrap(),
        model: Regex::new(
            r"(?i)f-?150|f-?250|f-?350|silverado|sierra|ram ?1500|ram ?2500|tundra|titan|cascadia|579|t680|vnl|anthem",
        )
        .unwrap(),
        year: Regex::new(r"20\d{2}|19\d{2}").unwrap(),
        part_type: Regex::new(
            r"(?i)brake|caliper|rotor|pad|filter|engine|transmission|clutch|axle|wheel|tire|suspension|steering|radiator|pump|sensor|light|mirror|door|window|seat|belt|pulley|alternator|starter|battery",
        )
        .unwrap(),
    })
}

fn first_match(re: &Regex, text: &str) -> Option<String> {
    re.find(text).map(|m| m.as_str().to_lowercase())
}

/// Pull truck slots out of free text. The leftmost match of each vocabulary
/// wins; slots with no match stay unset.
pub fn extract_truck_info(text: &str) -> TruckInfo {
    let p = patterns();
    TruckInfo {
        make: first_match(&p.make, text),
        model: first_match(&p.model, text),
        year: p.year.find(text).map(|m| m.as_str().to_string()),
        part_type: first_match(&p.part_type, text),
    }
}
