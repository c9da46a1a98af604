//! Customer segment table
//!
//! A flat list stored as one JSON array under `customer-segments`. Unlike the
//! roadmap it has no envelope: the wiki's table reads and writes the bare
//! array.

use crate::node::null_as_empty;
use crate::persist::Result;
use crate::store::KeyValueStore;
use serde::{Deserialize, Serialize};

pub const SEGMENTS_KEY: &str = "customer-segments";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerSegment {
    pub id: String,
    pub segment: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub demographics: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub psychographics: Vec<String>,
    pub income_range: String,
    pub current_spend: String,
    pub market_size: String,
}

impl CustomerSegment {
    /// Placeholder row added by "Add Segment"
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            segment: "New Segment".to_string(),
            demographics: vec!["Add demographics".to_string()],
            psychographics: vec!["Add psychographics".to_string()],
            income_range: "$0-$0/year".to_string(),
            current_spend: "$0/year".to_string(),
            market_size: "0 individuals".to_string(),
        }
    }
}

/// Fields to change on one segment; `None` leaves the field alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentPatch {
    pub segment: Option<String>,
    pub demographics: Option<Vec<String>>,
    pub psychographics: Option<Vec<String>>,
    pub income_range: Option<String>,
    pub current_spend: Option<String>,
    pub market_size: Option<String>,
}

impl SegmentPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, segment: &CustomerSegment) -> CustomerSegment {
        let pick = |v: &Option<String>, old: &String| v.clone().unwrap_or_else(|| old.clone());
        CustomerSegment {
            id: segment.id.clone(),
            segment: pick(&self.segment, &segment.segment),
            demographics: self
                .demographics
                .clone()
                .unwrap_or_else(|| segment.demographics.clone()),
            psychographics: self
                .psychographics
                .clone()
                .unwrap_or_else(|| segment.psychographics.clone()),
            income_range: pick(&self.income_range, &segment.income_range),
            current_spend: pick(&self.current_spend, &segment.current_spend),
            market_size: pick(&self.market_size, &segment.market_size),
        }
    }
}

fn row(
    id: &str,
    segment: &str,
    demographics: &[&str],
    psychographics: &[&str],
    (income_range, current_spend, market_size): (&str, &str, &str),
) -> CustomerSegment {
    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }
    CustomerSegment {
        id: id.to_string(),
        segment: segment.to_string(),
        demographics: owned(demographics),
        psychographics: owned(psychographics),
        income_range: income_range.to_string(),
        current_spend: current_spend.to_string(),
        market_size: market_size.to_string(),
    }
}

/// Segments shown until the table is edited
pub fn default_segments() -> Vec<CustomerSegment> {
    vec![
        row(
            "1",
            "Longevity Seekers (\"Old and Rich\")",
            &[
                "Age: 55-75",
                "Net Worth: $5M-$500M+",
                "Location: Silicon Valley, NYC, London, Singapore",
                "Background: Tech executives, VCs, entrepreneurs",
            ],
            &[
                "Mortality anxiety",
                "Data-driven",
                "Premium seekers",
                "Trust issues with health industry",
                "Legacy focused",
            ],
            ("$1M-$10M+/year", "$85K-$300K/year on health", "~500K individuals globally"),
        ),
        row(
            "2",
            "Optimizers (\"Young and Curious\")",
            &[
                "Age: 35-55",
                "Education: Masters/PhD",
                "Location: Urban centers",
                "Family: Often with children",
            ],
            &[
                "Performance obsessed",
                "Time-poor",
                "Evidence-based",
                "Work-life balance seekers",
                "Parental guilt",
            ],
            ("€150K-€500K/year", "$2K-$5K/year on wellness", "~10M individuals globally"),
        ),
        row(
            "3",
            "Biohackers (\"Experimenters\")",
            &[
                "Age: 25-45",
                "Background: Tech, startups, fitness",
                "Community: Reddit, Discord, Twitter",
                "Personality: High openness",
            ],
            &[
                "Optimization obsessed",
                "Data addicted",
                "Early adopters",
                "Community-driven",
                "Risk tolerant",
            ],
            ("$30K-$1M+/year", "$6K-$24K/year on experiments", "~2M individuals globally"),
        ),
        row(
            "4",
            "Sleep Sufferers (\"Problems\")",
            &[
                "Age: 30-65",
                "Background: Diverse",
                "Health: Often comorbidities",
                "Status: Desperate for solution",
            ],
            &[
                "Chronically exhausted",
                "Medically frustrated",
                "Hope-seeking",
                "Identity crisis",
                "Relationship strain",
            ],
            ("$40K-$150K/year", "$5K-$20K already spent", "~100M individuals globally"),
        ),
    ]
}

/// Stored table, or the defaults when nothing usable is stored
pub fn load(store: &dyn KeyValueStore) -> Vec<CustomerSegment> {
    let raw = match store.get(SEGMENTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return default_segments(),
        Err(e) => {
            tracing::error!(error = %e, "failed to read saved segments");
            return default_segments();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(segments) => segments,
        Err(e) => {
            tracing::error!(error = %e, "failed to load saved segments");
            default_segments()
        }
    }
}

pub fn save(store: &dyn KeyValueStore, segments: &[CustomerSegment]) -> Result<()> {
    store.set(SEGMENTS_KEY, &serde_json::to_string(segments)?)?;
    tracing::info!(segments = segments.len(), "saved customer segments");
    Ok(())
}

/// Millisecond timestamp id, bumped past any id already in use
pub fn fresh_id(segments: &[CustomerSegment]) -> String {
    let mut millis = chrono::Utc::now().timestamp_millis();
    while segments.iter().any(|s| s.id == millis.to_string()) {
        millis += 1;
    }
    millis.to_string()
}

pub fn find<'a>(segments: &'a [CustomerSegment], id: &str) -> Option<&'a CustomerSegment> {
    segments.iter().find(|s| s.id == id)
}

/// Append a segment at the end of the table
pub fn add(segments: &[CustomerSegment], segment: CustomerSegment) -> Vec<CustomerSegment> {
    let mut out = segments.to_vec();
    out.push(segment);
    out
}

pub fn update(segments: &[CustomerSegment], id: &str, patch: &SegmentPatch) -> Vec<CustomerSegment> {
    segments
        .iter()
        .map(|s| if s.id == id { patch.apply(s) } else { s.clone() })
        .collect()
}

pub fn delete(segments: &[CustomerSegment], id: &str) -> Vec<CustomerSegment> {
    segments.iter().filter(|s| s.id != id).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_load_missing_uses_defaults() {
        let store = MemoryStore::new();
        let segments = load(&store);
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[3].market_size, "~100M individuals globally");
    }

    #[test]
    fn test_load_garbage_falls_back() {
        let store = MemoryStore::new();
        store.set(SEGMENTS_KEY, "not json").unwrap();
        assert_eq!(load(&store), default_segments());
    }

    #[test]
    fn test_load_fills_missing_fields() {
        let store = MemoryStore::new();
        store
            .set(SEGMENTS_KEY, r#"[{"id":"7","segment":"Clinics","demographics":null}]"#)
            .unwrap();
        let segments = load(&store);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].segment, "Clinics");
        assert!(segments[0].demographics.is_empty());
        assert_eq!(segments[0].income_range, "");
    }

    #[test]
    fn test_save_writes_camel_case_array() {
        let store = MemoryStore::new();
        save(&store, &default_segments()[..1]).unwrap();
        let raw = store.get(SEGMENTS_KEY).unwrap().unwrap();
        assert!(raw.starts_with("[{"));
        assert!(raw.contains("\"incomeRange\":\"$1M-$10M+/year\""));
        assert_eq!(load(&store), default_segments()[..1].to_vec());
    }

    #[test]
    fn test_add_update_delete() {
        let base = default_segments();
        let id = fresh_id(&base);
        let added = add(&base, CustomerSegment::placeholder(id.clone()));
        assert_eq!(added.len(), 5);
        assert_eq!(added[4].segment, "New Segment");

        let patch = SegmentPatch {
            segment: Some("Clinics".into()),
            demographics: Some(vec!["Sleep clinics".into()]),
            ..Default::default()
        };
        let updated = update(&added, &id, &patch);
        let seg = find(&updated, &id).unwrap();
        assert_eq!(seg.segment, "Clinics");
        assert_eq!(seg.demographics, vec!["Sleep clinics".to_string()]);
        assert_eq!(seg.psychographics, vec!["Add psychographics".to_string()]);
        assert_eq!(&updated[..4], &base[..]);

        let removed = delete(&updated, "2");
        assert_eq!(removed.len(), 4);
        assert!(find(&removed, "2").is_none());
    }

    #[test]
    fn test_update_missing_id_is_a_no_op() {
        let base = default_segments();
        let patch = SegmentPatch {
            market_size: Some("1".into()),
            ..Default::default()
        };
        assert_eq!(update(&base, "nope", &patch), base);
        assert!(!patch.is_empty());
        assert!(SegmentPatch::default().is_empty());
    }

    #[test]
    fn test_fresh_id_skips_taken() {
        let now = chrono::Utc::now().timestamp_millis();
        let taken: Vec<_> = (0..3)
            .map(|i| CustomerSegment::placeholder((now + i).to_string()))
            .collect();
        let id: i64 = fresh_id(&taken).parse().unwrap();
        assert!(id >= now + 3 || id < now);
        assert!(find(&taken, &id.to_string()).is_none());
    }
}
