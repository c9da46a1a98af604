//! Sapling - Editable roadmap trees for the company wiki
//!
//! A roadmap is a forest of nested items. Each item has a title, a date
//! range, a status and a category, plus optional milestone notes.
//!
//! # Overview
//!
//! Mutators in [`tree`] never touch their input; they return a new tree.
//! Views are derived with [`filter`], and the whole tree is saved as one
//! JSON document through a [`KeyValueStore`].
//!
//! | Status | Meaning |
//! |--------|---------|
//! | `planned` | Not started |
//! | `in-progress` | Being worked on |
//! | `completed` | Done |
//! | `at-risk` | Slipping or blocked |
//!
//! # Quick Start
//!
//! ```no_run
//! use sapling::{filter, persist, tree, MemoryStore, NodePatch, TimeScale};
//!
//! let store = MemoryStore::new();
//! let loaded = persist::load(&store, persist::ROADMAP_KEY);
//!
//! // Rename the first item
//! let id = loaded.nodes[0].id.clone();
//! let nodes = tree::update(&loaded.nodes, &id, &NodePatch::title("Retreat MVP"));
//!
//! // What is on this quarter?
//! let today = chrono::Local::now().date_naive();
//! let visible = filter::apply(&nodes, "all", Some(TimeScale::Quarter.window(today)));
//! println!("{} of {} items visible", tree::count(&visible), tree::count(&nodes));
//!
//! persist::save(&store, persist::ROADMAP_KEY, &nodes).unwrap();
//! ```

pub mod config;
pub mod content;
pub mod defaults;
pub mod filter;
pub mod init;
pub mod node;
pub mod persist;
pub mod schema;
pub mod segments;
pub mod serve;
pub mod store;
pub mod tree;
pub mod tui;

pub use config::Config;
pub use filter::{DateWindow, TimeScale};
pub use node::{NodePatch, RoadmapNode, Status};
pub use persist::PersistError;
pub use segments::CustomerSegment;
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError};

// Re-export TS trait for downstream use
#[cfg(feature = "ts-rs")]
pub use ts_rs::TS;
