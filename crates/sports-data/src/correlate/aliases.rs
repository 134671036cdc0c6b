//! Team alias table.
//!
//! Upstream feeds disagree on team naming: one sends "IND", another
//! "India", a third "India [IND]". Aliases map the short and informal
//! forms onto a single canonical lowercase name so grouping keys line
//! up across providers.

use std::collections::HashMap;

use lazy_static::lazy_static;

lazy_static! {
    static ref ALIASES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();

        // International sides
        m.insert("ind", "india");
        m.insert("aus", "australia");
        m.insert("eng", "england");
        m.insert("pak", "pakistan");
        m.insert("nz", "new zealand");
        m.insert("sa", "south africa");
        m.insert("rsa", "south africa");
        m.insert("sl", "sri lanka");
        m.insert("ban", "bangladesh");
        m.insert("bd", "bangladesh");
        m.insert("wi", "west indies");
        m.insert("windies", "west indies");
        m.insert("afg", "afghanistan");
        m.insert("zim", "zimbabwe");
        m.insert("ire", "ireland");
        m.insert("sco", "scotland");
        m.insert("ned", "netherlands");
        m.insert("uae", "united arab emirates");
        m.insert("usa", "united states");

        // IPL franchises
        m.insert("csk", "chennai super kings");
        m.insert("mi", "mumbai indians");
        m.insert("rcb", "royal challengers bengaluru");
        m.insert("royal challengers bangalore", "royal challengers bengaluru");
        m.insert("kkr", "kolkata knight riders");
        m.insert("srh", "sunrisers hyderabad");
        m.insert("dc", "delhi capitals");
        m.insert("rr", "rajasthan royals");
        m.insert("pbks", "punjab kings");
        m.insert("kxip", "punjab kings");
        m.insert("gt", "gujarat titans");
        m.insert("lsg", "lucknow super giants");

        m
    };
}

/// Resolves a normalized team name through the alias table.
///
/// The input must already be lowercased and whitespace-collapsed; the
/// lookup is exact. Unknown names pass through unchanged.
pub(crate) fn resolve(normalized: &str) -> &str {
    ALIASES.get(normalized).copied().unwrap_or(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_alias() {
        assert_eq!(resolve("ind"), "india");
        assert_eq!(resolve("csk"), "chennai super kings");
    }

    #[test]
    fn test_resolve_passthrough() {
        assert_eq!(resolve("india"), "india");
        assert_eq!(resolve("somerset"), "somerset");
    }

    #[test]
    fn test_renamed_franchise_maps_to_current_name() {
        assert_eq!(
            resolve("royal challengers bangalore"),
            "royal challengers bengaluru"
        );
    }
}
