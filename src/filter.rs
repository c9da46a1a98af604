//! Visible-subset filters over roadmap trees
//!
//! The two filters are deliberately asymmetric:
//!
//! - the category filter keeps a non-matching ancestor (with pruned children)
//!   as a path to any matching descendant;
//! - the date-range filter drops a non-overlapping node with its entire
//!   subtree, even when a descendant would overlap on its own.
//!
//! Filters are always recomputed from the full tree.

use crate::node::{format_date, RoadmapNode};
use crate::tree::{rewrite, Step};
use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Category value that disables category filtering
pub const ALL_CATEGORIES: &str = "all";

/// Keep nodes of `category`, plus the ancestors leading to them
pub fn filter_by_category(nodes: &[RoadmapNode], category: &str) -> Vec<RoadmapNode> {
    if category == ALL_CATEGORIES {
        return nodes.to_vec();
    }
    rewrite(nodes, &mut |node| {
        if node.category == category {
            Step::Keep
        } else {
            Step::Prune
        }
    })
}

/// Keep nodes whose `[start, end]` overlaps the window
pub fn filter_by_date_range(nodes: &[RoadmapNode], window: DateWindow) -> Vec<RoadmapNode> {
    rewrite(nodes, &mut |node| {
        if window.overlaps(node) {
            Step::Descend
        } else {
            Step::Drop
        }
    })
}

/// Category first, then date range
pub fn apply(nodes: &[RoadmapNode], category: &str, window: Option<DateWindow>) -> Vec<RoadmapNode> {
    let filtered = filter_by_category(nodes, category);
    let visible = match window {
        Some(w) => filter_by_date_range(&filtered, w),
        None => filtered,
    };
    tracing::debug!(
        category,
        window = ?window,
        visible = crate::tree::count(&visible),
        "recomputed visible roadmap"
    );
    visible
}

/// Inclusive date interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `node.start <= end && node.end >= start`; nodes with unparseable
    /// dates never overlap
    pub fn overlaps(&self, node: &RoadmapNode) -> bool {
        match (node.start(), node.end()) {
            (Some(s), Some(e)) => s <= self.end && e >= self.start,
            _ => false,
        }
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", format_date(self.start), format_date(self.end))
    }
}

/// Preset windows starting today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeScale {
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "month")]
    Month,
    #[default]
    #[serde(rename = "quarter")]
    Quarter,
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "2-years")]
    TwoYears,
}

impl TimeScale {
    pub const ALL: [TimeScale; 5] = [
        TimeScale::Week,
        TimeScale::Month,
        TimeScale::Quarter,
        TimeScale::Year,
        TimeScale::TwoYears,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeScale::Week => "week",
            TimeScale::Month => "month",
            TimeScale::Quarter => "quarter",
            TimeScale::Year => "year",
            TimeScale::TwoYears => "2-years",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeScale::Week => "1 Week",
            TimeScale::Month => "1 Month",
            TimeScale::Quarter => "3 Months",
            TimeScale::Year => "1 Year",
            TimeScale::TwoYears => "2 Years",
        }
    }

    pub fn next(self) -> Self {
        match self {
            TimeScale::Week => TimeScale::Month,
            TimeScale::Month => TimeScale::Quarter,
            TimeScale::Quarter => TimeScale::Year,
            TimeScale::Year => TimeScale::TwoYears,
            TimeScale::TwoYears => TimeScale::Week,
        }
    }

    /// `[today, today + scale]`. Month arithmetic clamps to the last day of
    /// the target month (Jan 31 + 1 month = Feb 28/29).
    pub fn window(self, today: NaiveDate) -> DateWindow {
        let end = match self {
            TimeScale::Week => today.checked_add_signed(Duration::days(7)),
            TimeScale::Month => today.checked_add_months(Months::new(1)),
            TimeScale::Quarter => today.checked_add_months(Months::new(3)),
            TimeScale::Year => today.checked_add_months(Months::new(12)),
            TimeScale::TwoYears => today.checked_add_months(Months::new(24)),
        };
        DateWindow::new(today, end.unwrap_or(NaiveDate::MAX))
    }
}

impl std::fmt::Display for TimeScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "1w" => Ok(TimeScale::Week),
            "month" | "1m" => Ok(TimeScale::Month),
            "quarter" | "3m" => Ok(TimeScale::Quarter),
            "year" | "1y" => Ok(TimeScale::Year),
            "2-years" | "2years" | "2y" => Ok(TimeScale::TwoYears),
            other => Err(format!(
                "unknown time scale '{}' (expected week, month, quarter, year, 2-years)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::parse_date;
    use crate::tree::{add_child, find, ids};

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn node(id: &str, start: &str, end: &str, category: &str) -> RoadmapNode {
        RoadmapNode::new(id, id, start, end, category)
    }

    #[test]
    fn test_category_all_is_identity() {
        let tree = vec![node("a", "2025-01-01", "2025-01-02", "Team")];
        assert_eq!(filter_by_category(&tree, "all"), tree);
    }

    #[test]
    fn test_category_keeps_matching_node_whole() {
        let tree = vec![node("a", "2025-01-01", "2025-01-02", "Team")
            .with_children(vec![node("a1", "2025-01-01", "2025-01-02", "Finance")])];
        let out = filter_by_category(&tree, "Team");
        assert_eq!(out, tree);
    }

    #[test]
    fn test_category_keeps_ancestor_path() {
        let tree = vec![
            node("root", "2025-01-01", "2025-12-31", "Product").with_children(vec![
                node("mid", "2025-01-01", "2025-06-30", "Product")
                    .with_children(vec![node("hit", "2025-01-01", "2025-01-31", "Finance")]),
                node("sibling", "2025-01-01", "2025-01-31", "Product"),
            ]),
            node("other", "2025-01-01", "2025-01-31", "Market"),
        ];
        let out = filter_by_category(&tree, "Finance");
        assert_eq!(ids(&out), vec!["root", "mid", "hit"]);
    }

    #[test]
    fn test_date_filter_scenario() {
        let tree = vec![node("n1", "2025-01-01", "2025-03-31", "Product")];
        let child = RoadmapNode::new("n1-1", "Sub", "2025-01-15", "2025-02-01", "Product");
        let tree = add_child(&tree, "n1", &child);
        let out = filter_by_date_range(&tree, DateWindow::new(day("2025-01-01"), day("2025-01-31")));
        assert_eq!(out.len(), 1);
        assert_eq!(ids(&out[0].children), vec!["n1-1"]);
    }

    #[test]
    fn test_date_filter_drops_subtree_on_miss() {
        let tree = vec![node("late", "2026-01-01", "2026-12-31", "Product")
            .with_children(vec![node("early", "2025-01-01", "2025-01-10", "Product")])];
        let out = filter_by_date_range(&tree, DateWindow::new(day("2025-01-01"), day("2025-01-31")));
        assert!(out.is_empty());
    }

    #[test]
    fn test_date_filter_prunes_children_against_global_window() {
        let tree = vec![node("p", "2025-01-01", "2025-12-31", "Product").with_children(vec![
            node("in", "2025-02-01", "2025-02-10", "Product"),
            node("out", "2025-09-01", "2025-09-10", "Product"),
        ])];
        let out = filter_by_date_range(&tree, DateWindow::new(day("2025-01-15"), day("2025-03-01")));
        assert!(find(&out, "in").is_some());
        assert!(find(&out, "out").is_none());
    }

    #[test]
    fn test_overlap_edges_are_inclusive() {
        let w = DateWindow::new(day("2025-01-10"), day("2025-01-20"));
        assert!(w.overlaps(&node("x", "2025-01-20", "2025-02-01", "")));
        assert!(w.overlaps(&node("x", "2024-12-01", "2025-01-10", "")));
        assert!(!w.overlaps(&node("x", "2025-01-21", "2025-02-01", "")));
        assert!(!w.overlaps(&node("x", "tbd", "2025-02-01", "")));
    }

    #[test]
    fn test_apply_category_then_dates() {
        let tree = vec![
            node("a", "2025-01-01", "2025-01-31", "Team"),
            node("b", "2025-01-01", "2025-01-31", "Market"),
            node("c", "2027-01-01", "2027-01-31", "Team"),
        ];
        let w = DateWindow::new(day("2025-01-01"), day("2025-03-31"));
        assert_eq!(ids(&apply(&tree, "Team", Some(w))), vec!["a"]);
        assert_eq!(ids(&apply(&tree, "all", None)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_time_scale_windows() {
        let today = day("2025-01-31");
        assert_eq!(TimeScale::Week.window(today).end, day("2025-02-07"));
        assert_eq!(TimeScale::Month.window(today).end, day("2025-02-28"));
        assert_eq!(TimeScale::Quarter.window(today).end, day("2025-04-30"));
        assert_eq!(TimeScale::Year.window(today).end, day("2026-01-31"));
        assert_eq!(TimeScale::TwoYears.window(today).end, day("2027-01-31"));
        assert_eq!(TimeScale::Quarter.window(today).start, today);
    }

    #[test]
    fn test_time_scale_parse_and_cycle() {
        assert_eq!("2-years".parse::<TimeScale>().unwrap(), TimeScale::TwoYears);
        assert_eq!("Quarter".parse::<TimeScale>().unwrap(), TimeScale::Quarter);
        assert!("decade".parse::<TimeScale>().is_err());
        assert_eq!(TimeScale::TwoYears.next(), TimeScale::Week);
        assert_eq!(TimeScale::default(), TimeScale::Quarter);
    }
}
