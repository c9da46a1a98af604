//! Imperative shell for the TUI
//!
//! [`App`] owns the store and the export settings. It feeds messages through
//! the pure [`update`] function and performs the commands that come back,
//! turning their outcomes into completion messages.

use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::NaiveDate;

use super::msg::{is_tree_edit, Msg};
use super::update::{update, Cmd, Model};
use crate::config::Config;
use crate::persist;
use crate::store::KeyValueStore;

#[derive(Debug, Default)]
struct Outcome {
    msgs: Vec<Msg>,
    quit: bool,
    failed: bool,
}

impl Outcome {
    fn msg(msg: Msg, failed: bool) -> Self {
        Self {
            msgs: vec![msg],
            quit: false,
            failed,
        }
    }
}

pub struct App {
    store: Box<dyn KeyValueStore>,
    key: String,
    export_dir: PathBuf,
    export_prefix: String,
    today: NaiveDate,
}

impl App {
    pub fn new(store: Box<dyn KeyValueStore>, config: &Config, today: NaiveDate) -> Self {
        Self {
            store,
            key: config.store.key.clone(),
            export_dir: config.export.dir().to_path_buf(),
            export_prefix: config.export.prefix.clone(),
            today,
        }
    }

    /// Read the stored tree once and build the starting model
    pub fn initial_model(&self, config: &Config) -> Model {
        let loaded = persist::load(self.store.as_ref(), &self.key);
        tracing::info!(origin = ?loaded.origin, nodes = crate::tree::count(&loaded.nodes), "loaded roadmap");
        Model::new(loaded.nodes, self.today).with_config(config)
    }

    /// Run `msg` and any completion messages it causes.
    ///
    /// Returns the resulting model and whether the app should quit.
    pub fn step(&self, model: Model, msg: Msg) -> (Model, bool) {
        let mut pending = VecDeque::from([msg]);
        let mut model = model;
        let mut quit = false;

        while let Some(msg) = pending.pop_front() {
            if is_tree_edit(&msg) {
                tracing::debug!(?msg, "tree edit");
            }
            let (next, cmd) = update(msg, model);
            model = next;
            let outcome = self.execute(cmd);
            pending.extend(outcome.msgs);
            quit |= outcome.quit;
        }
        (model, quit)
    }

    fn execute(&self, cmd: Cmd) -> Outcome {
        match cmd {
            Cmd::None => Outcome::default(),
            Cmd::Quit => Outcome {
                quit: true,
                ..Default::default()
            },
            Cmd::Batch(cmds) => {
                let mut all = Outcome::default();
                for cmd in cmds {
                    let outcome = self.execute(cmd);
                    all.msgs.extend(outcome.msgs);
                    all.quit |= outcome.quit;
                    if outcome.failed {
                        all.failed = true;
                        break;
                    }
                }
                all
            }
            Cmd::Persist(nodes) => match persist::save(self.store.as_ref(), &self.key, &nodes) {
                Ok(()) => Outcome::msg(Msg::Saved, false),
                Err(e) => {
                    tracing::error!(error = %e, "save failed");
                    Outcome::msg(Msg::SaveFailed(e.to_string()), true)
                }
            },
            Cmd::Export(nodes) => {
                match persist::export(&nodes, &self.export_dir, &self.export_prefix, self.today) {
                    Ok(path) => Outcome::msg(Msg::Exported(path), false),
                    Err(e) => {
                        tracing::error!(error = %e, "export failed");
                        Outcome::msg(Msg::ExportFailed(e.to_string()), true)
                    }
                }
            }
            Cmd::Import(path) => match persist::import_file(&path) {
                Ok(nodes) => Outcome::msg(Msg::Imported(nodes), false),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "import failed");
                    Outcome::msg(Msg::ImportFailed(e.to_string()), true)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{parse_date, RoadmapNode};
    use crate::persist::ROADMAP_KEY;
    use crate::store::MemoryStore;
    use crate::tui::update::{IdSource, Mode};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Shares one MemoryStore between the app and the test
    struct Shared(Arc<MemoryStore>);

    impl KeyValueStore for Shared {
        fn get(&self, key: &str) -> crate::store::Result<Option<String>> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &str) -> crate::store::Result<()> {
            self.0.set(key, value)
        }
        fn remove(&self, key: &str) -> crate::store::Result<bool> {
            self.0.remove(key)
        }
        fn keys(&self) -> crate::store::Result<Vec<String>> {
            self.0.keys()
        }
    }

    fn setup(dir: &TempDir) -> (App, Arc<MemoryStore>, Model) {
        let store = Arc::new(MemoryStore::new());
        let mut config = Config::default();
        config.export.dir = Some(dir.path().to_path_buf());
        let today = parse_date("2025-01-01").unwrap();
        let app = App::new(Box::new(Shared(store.clone())), &config, today);
        let model = app.initial_model(&config).with_ids(IdSource::Sequence(0));
        (app, store, model)
    }

    #[test]
    fn test_starts_from_default_tree() {
        let dir = TempDir::new().unwrap();
        let (_, _, model) = setup(&dir);
        assert_eq!(model.nodes, crate::defaults::default_roadmap());
        assert!(!model.unsaved);
    }

    #[test]
    fn test_save_round_trip_through_store() {
        let dir = TempDir::new().unwrap();
        let (app, store, model) = setup(&dir);
        let (model, _) = app.step(model, Msg::AddRoot);
        let (model, quit) = app.step(model, Msg::Save);
        assert!(!quit);
        assert!(!model.unsaved);
        assert_eq!(persist::load(store.as_ref(), ROADMAP_KEY).nodes, model.nodes);
    }

    #[test]
    fn test_export_then_import() {
        let dir = TempDir::new().unwrap();
        let (app, _, model) = setup(&dir);
        let (model, _) = app.step(model, Msg::Export);
        let path = dir.path().join("zoe-roadmap-2025-01-01.json");
        assert!(path.exists());
        assert!(model.status_message.unwrap().starts_with("Exported to"));

        let (app, _, model) = setup(&dir);
        let (model, _) = app.step(model, Msg::Imported(vec![]));
        assert!(model.nodes.is_empty());
        let mut model = model;
        model.mode = Mode::ImportPrompt(path.display().to_string());
        let (model, _) = app.step(model, Msg::Submit);
        assert_eq!(model.nodes, crate::defaults::default_roadmap());
        assert!(model.unsaved);
    }

    #[test]
    fn test_bad_import_raises_alert() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "not json").unwrap();
        let (app, _, model) = setup(&dir);
        let before = model.nodes.clone();
        let mut model = model;
        model.mode = Mode::ImportPrompt(bad.display().to_string());
        let (model, _) = app.step(model, Msg::Submit);
        assert!(matches!(model.mode, Mode::Alert(_)));
        assert_eq!(model.nodes, before);
    }

    #[test]
    fn test_save_and_quit_persists_first() {
        let dir = TempDir::new().unwrap();
        let (app, store, model) = setup(&dir);
        let (model, _) = app.step(model, Msg::Imported(vec![RoadmapNode::new(
            "only", "Only", "2025-01-01", "2025-01-02", "Team",
        )]));
        let (_, quit) = app.step(model, Msg::SaveAndQuit);
        assert!(quit);
        let saved = persist::load(store.as_ref(), ROADMAP_KEY);
        assert_eq!(saved.nodes[0].id, "only");
    }
}
