//! Server configuration from environment variables.
//!
//!   OUTREACH_BIND_ADDR      — listen address (default: 0.0.0.0:8080)
//!   OUTREACH_WORKBOOK_PATH  — JSON workbook file (default: data/workbook.json)
//!   OUTREACH_DECK_DIR       — where rendered decks are written (default: data/decks)
//!   OUTREACH_PIPELINE_TAB   — pipeline tab name (default: Pipeline Dashboard)
//!   OUTREACH_ACTION_TAB     — action items tab name (default: Action Items)
//!   OUTREACH_HEADER_DEPTH   — rows scanned for the header row (default: 10)

use std::path::PathBuf;

use outreach_core::headers::HEADER_SEARCH_DEPTH;
use outreach_core::schema::{ACTION_ITEMS_TAB, PIPELINE_TAB};
use outreach_core::SheetsConfig;

#[derive(Debug, Clone)]
pub struct HubConfig {
    pub bind_addr: String,
    pub workbook_path: PathBuf,
    pub deck_dir: PathBuf,
    pub sheets: SheetsConfig,
}

impl HubConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let header_search_depth = match lookup("OUTREACH_HEADER_DEPTH") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(
                    value = %raw,
                    "OUTREACH_HEADER_DEPTH is not a number, using {HEADER_SEARCH_DEPTH}"
                );
                HEADER_SEARCH_DEPTH
            }),
            None => HEADER_SEARCH_DEPTH,
        };

        Self {
            bind_addr: var("OUTREACH_BIND_ADDR", "0.0.0.0:8080"),
            workbook_path: var("OUTREACH_WORKBOOK_PATH", "data/workbook.json").into(),
            deck_dir: var("OUTREACH_DECK_DIR", "data/decks").into(),
            sheets: SheetsConfig {
                pipeline_tab: var("OUTREACH_PIPELINE_TAB", PIPELINE_TAB),
                action_items_tab: var("OUTREACH_ACTION_TAB", ACTION_ITEMS_TAB),
                header_search_depth,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> HubConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HubConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.workbook_path, PathBuf::from("data/workbook.json"));
        assert_eq!(cfg.deck_dir, PathBuf::from("data/decks"));
        assert_eq!(cfg.sheets.pipeline_tab, "Pipeline Dashboard");
        assert_eq!(cfg.sheets.action_items_tab, "Action Items");
        assert_eq!(cfg.sheets.header_search_depth, 10);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config(&[
            ("OUTREACH_BIND_ADDR", "127.0.0.1:9000"),
            ("OUTREACH_PIPELINE_TAB", "Deals"),
            ("OUTREACH_HEADER_DEPTH", "25"),
        ]);
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.sheets.pipeline_tab, "Deals");
        assert_eq!(cfg.sheets.header_search_depth, 25);
    }

    #[test]
    fn bad_depth_and_blank_values_fall_back() {
        let cfg = config(&[
            ("OUTREACH_HEADER_DEPTH", "deep"),
            ("OUTREACH_ACTION_TAB", "   "),
        ]);
        assert_eq!(cfg.sheets.header_search_depth, 10);
        assert_eq!(cfg.sheets.action_items_tab, "Action Items");
    }
}
