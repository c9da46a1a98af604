//! Write TypeScript declarations for the roadmap types used by the web wiki
//!
//! Usage: cargo run --bin gen_types --features ts-rs [OUT_FILE]

use sapling::{RoadmapNode, Status, TS};
use std::path::PathBuf;

fn main() {
    let out = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("web/src/types/roadmap.ts"));

    let contents = format!(
        "// Generated by `gen_types`. Do not edit by hand.\n\nexport {}\n\nexport {}\n",
        Status::decl(),
        RoadmapNode::decl()
    );

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Could not create {}: {}", parent.display(), e);
                std::process::exit(1);
            }
        }
    }
    if let Err(e) = std::fs::write(&out, contents) {
        eprintln!("Could not write {}: {}", out.display(), e);
        std::process::exit(1);
    }
    println!("Wrote {}", out.display());
}
