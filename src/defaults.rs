//! Built-in roadmap shown until something is saved

use crate::node::{RoadmapNode, Status};

fn milestone(
    id: &str,
    title: &str,
    description: &str,
    (start, end): (&str, &str),
    category: &str,
    details: &[&str],
) -> RoadmapNode {
    RoadmapNode::new(id, title, start, end, category)
        .with_description(description)
        .with_status(Status::Planned)
        .with_details(details.iter().map(|d| d.to_string()).collect())
}

/// The company roadmap as published on the wiki
pub fn default_roadmap() -> Vec<RoadmapNode> {
    vec![
        milestone(
            "roadmap-1",
            "Half Moon Bay Retreat MVP",
            "First stage performance: the debut of an MVP that must not only work, but feel amazing",
            ("2025-11-01", "2026-01-18"),
            "Product",
            &[
                "Wearable Integration (Garmin OR Oura OR Apple Watch)",
                "Abbott Libre 3 or Dexcom CGM integration pilot",
                "Sleep 360 Dashboard with clean data pipeline",
                "Digitized validated questionnaires (ESS, ISI, PSQI)",
                "Comprehensive sleep baseline report generation",
                "MVP Sleep Chatbot with curated knowledgebase",
                "Polished, beautiful, human-first UI design",
            ],
        ),
        milestone(
            "roadmap-2",
            "Basel - Future of Health Showcase",
            "Showcase of acceleration: breadth, refinement, and proof of speed",
            ("2026-01-19", "2026-03-19"),
            "Product",
            &[
                "Three wearables integrated (Garmin, Oura, Apple Health)",
                "Live pipeline for CGM data (Abbott or Dexcom)",
                "Environment integration (ambient light sensors, weather APIs)",
                "First monthly SleepOS update cycle deployment",
                "Personalized micro-interventions via enhanced chatbot",
                "Sleep 360 Dashboard 2.0 with harmonized view",
                "Community leaderboards, streaks, and badges launch",
                "Private accountability groups for concierge clients",
            ],
        ),
        milestone(
            "roadmap-3",
            "Clinic Partnerships (Tier 2)",
            "Pilot in longevity and sleep clinics across key markets",
            ("2026-07-01", "2027-06-30"),
            "Operations",
            &[
                "California clinic partnerships",
                "Switzerland clinic partnerships",
                "Austria clinic partnerships",
                "Clinics license the platform for AI-personalized interventions",
                "Clinician oversight integration",
                "Concierge tier continuation ($10-20K/year)",
            ],
        ),
        milestone(
            "roadmap-4",
            "Strava-Scale Launch (Tier 3)",
            "Launch global consumer version - The Strava of Sleep",
            ("2027-01-01", "2028-12-31"),
            "Market",
            &[
                "Low-cost consumer version ($10/month)",
                "Global accessibility launch",
                "All major wearables integration (Garmin, Oura, Apple, Polar, Whoop)",
                "Hardware-agnostic OS layer for sleep health",
                "Largest open sleep accountability network",
            ],
        ),
        milestone(
            "roadmap-5",
            "Metabolics & Environment Expansion",
            "Full ecosystem integration with metabolics and environment sensing",
            ("2027-07-01", "2028-12-31"),
            "Technology",
            &[
                "At-home assays for melatonin, vitamin D, cortisol, magnesium",
                "Sleep-environment sensors (light, noise, temperature)",
                "Personalized circadian optimization protocols",
                "Smart home systems integration (Apple Home, Google Nest)",
                "Environment sensor suite development",
            ],
        ),
        milestone(
            "roadmap-6",
            "Lumos - Embodied AI Launch",
            "Premium extension with therapeutic companion robot",
            ("2028-01-01", "2028-12-31"),
            "Technology",
            &[
                "Lumos robot assistant pilot phase",
                "Therapeutic companion functionality",
                "Environment optimizer (light control, nudges)",
                "CBT-I guidance integration",
                "High-end extension of the ecosystem",
            ],
        ),
    ]
}
