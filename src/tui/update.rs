//! TEA Update Function
//!
//! ```text
//! update : Msg -> Model -> (Model, Cmd)
//! ```
//!
//! The update function is pure: it takes a message and the current model and
//! returns the next model plus the side effects (as [`Cmd`]s) the runtime
//! should perform. Tree edits go through the pure mutators in
//! [`crate::tree`]; the visible subset is recomputed from the full tree after
//! every change.

use super::msg::{KeyContext, Msg};
use super::state::{self, Row};
use crate::config::Config;
use crate::filter::{self, DateWindow, TimeScale, ALL_CATEGORIES};
use crate::node::{
    format_date, new_node_id, new_root_node, parse_date, NodeDraft, NodePatch, RoadmapNode, Status,
};
use crate::tree;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::PathBuf;

/// Rows taken by the header, filter bar, footer and the outline borders
pub const CHROME_ROWS: u16 = 5;

pub const IMPORT_FAILED: &str = "Failed to import roadmap data. Please check the file format.";

/// Commands that need to be executed by the runtime (imperative shell)
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    None,
    /// Run in order; the runtime stops at the first failure
    Batch(Vec<Cmd>),
    Quit,
    /// Write the full tree to the store
    Persist(Vec<RoadmapNode>),
    /// Write the full tree to an export file
    Export(Vec<RoadmapNode>),
    /// Read a tree from a file
    Import(PathBuf),
}

impl Cmd {
    /// Create a batch of commands
    pub fn batch(cmds: Vec<Cmd>) -> Cmd {
        let mut cmds: Vec<Cmd> = cmds
            .into_iter()
            .filter(|c| !matches!(c, Cmd::None))
            .collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.pop().unwrap_or(Cmd::None),
            _ => Cmd::Batch(cmds),
        }
    }

    pub fn is_quit(&self) -> bool {
        matches!(self, Cmd::Quit)
    }
}

/// Where fresh node ids come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSource {
    /// Timestamp + random suffix
    Clock,
    /// `node-1`, `node-2`, ... for reproducible runs
    Sequence(u64),
}

impl IdSource {
    fn next_id(&mut self) -> String {
        match self {
            IdSource::Clock => new_node_id(),
            IdSource::Sequence(n) => {
                *n += 1;
                format!("node-{}", n)
            }
        }
    }
}

// =============================================================================
// Drafts
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    StartDate,
    EndDate,
    Status,
    Category,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Description => "Description",
            Field::StartDate => "Start",
            Field::EndDate => "End",
            Field::Status => "Status",
            Field::Category => "Category",
        }
    }
}

const EDIT_FIELDS: &[Field] = &[
    Field::Title,
    Field::Description,
    Field::StartDate,
    Field::EndDate,
    Field::Status,
    Field::Category,
];

const CHILD_FIELDS: &[Field] = &[Field::Title, Field::Description, Field::Status, Field::Category];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftKind {
    Edit,
    AddChild,
}

/// Uncommitted form contents
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub kind: DraftKind,
    /// Node being edited, or the parent of the new child
    pub target: String,
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub status: Status,
    pub category: String,
    pub focus: usize,
}

impl Draft {
    pub fn edit(node: &RoadmapNode) -> Self {
        Self {
            kind: DraftKind::Edit,
            target: node.id.clone(),
            title: node.title.clone(),
            description: node.description.clone(),
            start_date: node.start_date.clone(),
            end_date: node.end_date.clone(),
            status: node.status,
            category: node.category.clone(),
            focus: 0,
        }
    }

    /// Blank child draft inheriting the parent's category
    pub fn add_child(parent: &RoadmapNode) -> Self {
        Self {
            kind: DraftKind::AddChild,
            target: parent.id.clone(),
            title: String::new(),
            description: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            status: Status::Planned,
            category: parent.category.clone(),
            focus: 0,
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        match self.kind {
            DraftKind::Edit => EDIT_FIELDS,
            DraftKind::AddChild => CHILD_FIELDS,
        }
    }

    pub fn focused(&self) -> Field {
        self.fields()[self.focus.min(self.fields().len() - 1)]
    }

    pub fn value(&self, field: Field) -> String {
        match field {
            Field::Title => self.title.clone(),
            Field::Description => self.description.clone(),
            Field::StartDate => self.start_date.clone(),
            Field::EndDate => self.end_date.clone(),
            Field::Status => self.status.label(),
            Field::Category => self.category.clone(),
        }
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Title => Some(&mut self.title),
            Field::Description => Some(&mut self.description),
            Field::StartDate => Some(&mut self.start_date),
            Field::EndDate => Some(&mut self.end_date),
            Field::Category => Some(&mut self.category),
            Field::Status => None,
        }
    }

    /// Editable fields only; children and details are never part of the
    /// patch so a commit can't revert them
    pub fn to_patch(&self) -> Result<NodePatch, String> {
        let start = parse_date(&self.start_date)
            .ok_or_else(|| format!("Invalid start date '{}': use YYYY-MM-DD", self.start_date))?;
        let end = parse_date(&self.end_date)
            .ok_or_else(|| format!("Invalid end date '{}': use YYYY-MM-DD", self.end_date))?;
        Ok(NodePatch {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            start_date: Some(format_date(start)),
            end_date: Some(format_date(end)),
            status: Some(self.status),
            category: Some(self.category.clone()),
            ..Default::default()
        })
    }

    /// New children start and end today
    fn into_child(self, id: String, today: NaiveDate, parent_category: &str) -> RoadmapNode {
        NodeDraft {
            title: self.title,
            description: self.description,
            status: Some(self.status),
            category: Some(self.category),
            ..Default::default()
        }
        .into_node(id, today, 0, "New Item", parent_category)
    }
}

/// What has the keyboard
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Browse,
    Draft(Draft),
    /// Path being typed for an import
    ImportPrompt(String),
    /// Blocking message; dismissed with Esc or Enter
    Alert(String),
    Help,
}

// =============================================================================
// Model
// =============================================================================

#[derive(Debug, Clone)]
pub struct Model {
    /// The full tree; filters never touch it
    pub nodes: Vec<RoadmapNode>,
    /// Filtered copy shown on screen
    pub visible: Vec<RoadmapNode>,
    pub unsaved: bool,

    pub time_scale: TimeScale,
    pub category: String,
    pub palette: Vec<String>,

    pub expanded: HashMap<String, bool>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub visible_items: usize,

    pub mode: Mode,
    pub status_message: Option<String>,

    pub today: NaiveDate,
    pub duration_days: i64,
    pub ids: IdSource,
}

impl Model {
    pub fn new(nodes: Vec<RoadmapNode>, today: NaiveDate) -> Self {
        let view = crate::config::ViewConfig::default();
        Self {
            nodes,
            visible: Vec::new(),
            unsaved: false,
            time_scale: view.time_scale,
            category: view.category,
            palette: view.categories,
            expanded: HashMap::new(),
            selected_index: 0,
            scroll_offset: 0,
            visible_items: 20,
            mode: Mode::Browse,
            status_message: None,
            today,
            duration_days: 30,
            ids: IdSource::Clock,
        }
        .refresh()
    }

    pub fn with_config(self, config: &Config) -> Self {
        Self {
            time_scale: config.view.time_scale,
            category: config.view.category.clone(),
            palette: config.view.categories.clone(),
            duration_days: config.items.default_duration_days,
            ..self
        }
        .refresh()
    }

    pub fn with_ids(self, ids: IdSource) -> Self {
        Self { ids, ..self }
    }

    pub fn window(&self) -> DateWindow {
        self.time_scale.window(self.today)
    }

    pub fn rows(&self) -> Vec<Row<'_>> {
        state::visible_rows(&self.visible, &self.expanded)
    }

    pub fn selected_row(&self) -> Option<Row<'_>> {
        self.rows().into_iter().nth(self.selected_index)
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected_row().map(|r| r.node.id.clone())
    }

    pub fn key_context(&self) -> KeyContext {
        match self.mode {
            Mode::Browse => KeyContext::Browse,
            Mode::Draft(_) => KeyContext::Form,
            Mode::ImportPrompt(_) => KeyContext::Prompt,
            Mode::Alert(_) | Mode::Help => KeyContext::Modal,
        }
    }

    /// Recompute the visible tree and keep the selection in range
    fn refresh(mut self) -> Self {
        self.visible = filter::apply(&self.nodes, &self.category, Some(self.window()));
        let count = self.rows().len();
        self.selected_index = state::clamp_selection(self.selected_index, count);
        self.scroll_offset =
            state::calculate_scroll_offset(self.selected_index, self.scroll_offset, self.visible_items);
        self
    }

    fn select(mut self, index: usize) -> Self {
        let count = self.rows().len();
        self.selected_index = state::clamp_selection(index, count);
        self.scroll_offset =
            state::calculate_scroll_offset(self.selected_index, self.scroll_offset, self.visible_items);
        self
    }

    /// Move the cursor onto `id` if it is on screen
    fn select_id(self, id: &str) -> Self {
        let found = self.rows().iter().position(|r| r.node.id == id);
        match found {
            Some(index) => self.select(index),
            None => self,
        }
    }

    fn replace_tree(mut self, nodes: Vec<RoadmapNode>) -> Self {
        self.nodes = nodes;
        self.unsaved = true;
        self.refresh()
    }

    fn status(self, message: impl Into<String>) -> Self {
        Self {
            status_message: Some(message.into()),
            ..self
        }
    }

    fn categories_for_items(&self) -> Vec<String> {
        state::category_cycle(&self.palette, &self.nodes)
            .into_iter()
            .filter(|c| c != ALL_CATEGORIES)
            .collect()
    }
}

fn title_of(node: &RoadmapNode) -> &str {
    if node.title.is_empty() {
        "(untitled)"
    } else {
        &node.title
    }
}

// =============================================================================
// Update
// =============================================================================

/// Process a message and return new state + commands
pub fn update(msg: Msg, model: Model) -> (Model, Cmd) {
    match msg {
        // === Lifecycle ===
        Msg::Quit => (model, Cmd::Quit),
        Msg::Tick | Msg::Noop => (model, Cmd::None),
        Msg::Resize(_, height) => {
            let visible_items = height.saturating_sub(CHROME_ROWS) as usize;
            let index = model.selected_index;
            (Model { visible_items, ..model }.select(index), Cmd::None)
        }

        // === Navigation ===
        Msg::MoveUp => {
            let index = state::move_selection_up(model.selected_index);
            (model.select(index), Cmd::None)
        }
        Msg::MoveDown => {
            let index = state::move_selection_down(model.selected_index, model.rows().len());
            (model.select(index), Cmd::None)
        }
        Msg::PageUp => {
            let index = state::page_up(model.selected_index, model.visible_items);
            (model.select(index), Cmd::None)
        }
        Msg::PageDown => {
            let index =
                state::page_down(model.selected_index, model.visible_items, model.rows().len());
            (model.select(index), Cmd::None)
        }
        Msg::JumpToTop => (model.select(0), Cmd::None),
        Msg::JumpToBottom => {
            let last = model.rows().len().saturating_sub(1);
            (model.select(last), Cmd::None)
        }
        Msg::SelectIndex(index) => (model.select(index), Cmd::None),

        // === Expand / collapse ===
        Msg::ToggleExpand => {
            let selected = model.selected_row().map(|r| (r.node.id.clone(), r.depth));
            let Some((id, depth)) = selected else {
                return (model, Cmd::None);
            };
            let expanded = state::toggle_expanded(&model.expanded, &id, depth);
            (Model { expanded, ..model }.select_id(&id), Cmd::None)
        }
        Msg::Expand => {
            let Some(id) = model.selected_id() else {
                return (model, Cmd::None);
            };
            let expanded = state::set_expanded(&model.expanded, &id, true);
            (Model { expanded, ..model }, Cmd::None)
        }
        Msg::Collapse => collapse(model),

        // === Tree edits ===
        Msg::AddRoot => {
            let mut model = model;
            let id = model.ids.next_id();
            let node = new_root_node(id.clone(), model.today, model.duration_days);
            let nodes = tree::add_root(&model.nodes, node);
            let model = model
                .replace_tree(nodes)
                .select_id(&id)
                .status("Added New Initiative");
            (model, Cmd::None)
        }

        Msg::StartEdit | Msg::StartAddChild => {
            let Some(id) = model.selected_id() else {
                return (model.status("Nothing selected"), Cmd::None);
            };
            let Some(node) = tree::find(&model.nodes, &id) else {
                return (model, Cmd::None);
            };
            let draft = if msg == Msg::StartEdit {
                Draft::edit(node)
            } else {
                Draft::add_child(node)
            };
            (
                Model {
                    mode: Mode::Draft(draft),
                    status_message: None,
                    ..model
                },
                Cmd::None,
            )
        }

        Msg::DeleteSelected => {
            let Some(id) = model.selected_id() else {
                return (model, Cmd::None);
            };
            let title = tree::find(&model.nodes, &id)
                .map(|n| title_of(n).to_string())
                .unwrap_or_default();
            let gone = tree::descendant_ids(&model.nodes, &id);
            let mut model = model;
            model.expanded.retain(|k, _| k != &id && !gone.contains(k));
            let nodes = tree::delete(&model.nodes, &id);
            (
                model.replace_tree(nodes).status(format!("Deleted '{}'", title)),
                Cmd::None,
            )
        }

        // === Draft / prompt input ===
        Msg::Input(c) => {
            let mut model = model;
            match &mut model.mode {
                Mode::Draft(draft) => match draft.focused() {
                    Field::Status if c == ' ' => draft.status = draft.status.next(),
                    field => {
                        if let Some(text) = draft.text_mut(field) {
                            text.push(c);
                        }
                    }
                },
                Mode::ImportPrompt(path) => path.push(c),
                _ => {}
            }
            (model, Cmd::None)
        }
        Msg::Backspace => {
            let mut model = model;
            match &mut model.mode {
                Mode::Draft(draft) => {
                    let field = draft.focused();
                    if let Some(text) = draft.text_mut(field) {
                        text.pop();
                    }
                }
                Mode::ImportPrompt(path) => {
                    path.pop();
                }
                _ => {}
            }
            (model, Cmd::None)
        }
        Msg::NextField | Msg::PrevField => {
            let mut model = model;
            if let Mode::Draft(draft) = &mut model.mode {
                let len = draft.fields().len();
                draft.focus = if msg == Msg::NextField {
                    (draft.focus + 1) % len
                } else {
                    (draft.focus + len - 1) % len
                };
            }
            (model, Cmd::None)
        }
        Msg::CycleField { forward } => {
            let categories = model.categories_for_items();
            let mut model = model;
            if let Mode::Draft(draft) = &mut model.mode {
                match draft.focused() {
                    Field::Status => {
                        let steps = if forward { 1 } else { Status::ALL.len() - 1 };
                        for _ in 0..steps {
                            draft.status = draft.status.next();
                        }
                    }
                    Field::Category => {
                        if let Some(next) = state::next_in_cycle(&categories, &draft.category, forward) {
                            draft.category = next;
                        }
                    }
                    _ => {}
                }
            }
            (model, Cmd::None)
        }
        Msg::Submit => submit(model),
        Msg::Cancel => {
            let message = match &model.mode {
                Mode::Draft(d) if d.kind == DraftKind::Edit => Some("Edit discarded"),
                Mode::Draft(_) => Some("New item discarded"),
                _ => None,
            };
            (
                Model {
                    mode: Mode::Browse,
                    status_message: message.map(str::to_string),
                    ..model
                },
                Cmd::None,
            )
        }

        // === Filtering ===
        Msg::CycleCategory => {
            let options = state::category_cycle(&model.palette, &model.nodes);
            let category = state::next_in_cycle(&options, &model.category, true)
                .unwrap_or_else(|| ALL_CATEGORIES.to_string());
            (
                Model {
                    category,
                    selected_index: 0,
                    scroll_offset: 0,
                    ..model
                }
                .refresh(),
                Cmd::None,
            )
        }
        Msg::CycleTimeScale => {
            let time_scale = model.time_scale.next();
            update(Msg::SetTimeScale(time_scale), model)
        }
        Msg::SetTimeScale(time_scale) => (
            Model {
                time_scale,
                selected_index: 0,
                scroll_offset: 0,
                ..model
            }
            .refresh(),
            Cmd::None,
        ),

        // === Persistence ===
        Msg::Save => {
            if !model.unsaved {
                return (model.status("No unsaved changes"), Cmd::None);
            }
            let cmd = Cmd::Persist(model.nodes.clone());
            (model, cmd)
        }
        Msg::SaveAndQuit => {
            let persist = if model.unsaved {
                Cmd::Persist(model.nodes.clone())
            } else {
                Cmd::None
            };
            (model, Cmd::batch(vec![persist, Cmd::Quit]))
        }
        Msg::Export => {
            let cmd = Cmd::Export(model.nodes.clone());
            (model, cmd)
        }
        Msg::StartImport => (
            Model {
                mode: Mode::ImportPrompt(String::new()),
                ..model
            },
            Cmd::None,
        ),

        // === Modals ===
        Msg::ToggleHelp => {
            let mode = match model.mode {
                Mode::Help => Mode::Browse,
                Mode::Browse => Mode::Help,
                other => other,
            };
            (Model { mode, ..model }, Cmd::None)
        }
        Msg::CloseModal => match model.mode {
            Mode::Alert(_) | Mode::Help => (
                Model {
                    mode: Mode::Browse,
                    ..model
                },
                Cmd::None,
            ),
            Mode::Browse => (
                Model {
                    status_message: None,
                    ..model
                },
                Cmd::None,
            ),
            _ => (model, Cmd::None),
        },

        // === Command completions ===
        Msg::Saved => (
            Model {
                unsaved: false,
                ..model
            }
            .status("Roadmap saved"),
            Cmd::None,
        ),
        Msg::SaveFailed(e) => (model.status(format!("Save failed: {}", e)), Cmd::None),
        Msg::Exported(path) => (
            model.status(format!("Exported to {}", path.display())),
            Cmd::None,
        ),
        Msg::ExportFailed(e) => (model.status(format!("Export failed: {}", e)), Cmd::None),
        Msg::Imported(nodes) => {
            let count = tree::count(&nodes);
            let model = Model {
                expanded: HashMap::new(),
                selected_index: 0,
                scroll_offset: 0,
                ..model
            };
            (
                model
                    .replace_tree(nodes)
                    .status(format!("Imported {} items", count)),
                Cmd::None,
            )
        }
        Msg::ImportFailed(e) => (
            Model {
                mode: Mode::Alert(format!("{}\n\n{}", IMPORT_FAILED, e)),
                ..model
            },
            Cmd::None,
        ),
    }
}

/// Collapse the selected node, or step to its parent when there is nothing
/// to collapse
fn collapse(model: Model) -> (Model, Cmd) {
    let target = {
        let rows = model.rows();
        rows.get(model.selected_index).map(|row| {
            let open = row.expanded && row.node.has_children();
            let parent = rows[..model.selected_index]
                .iter()
                .rposition(|r| r.depth < row.depth);
            (row.node.id.clone(), open, parent)
        })
    };
    match target {
        Some((id, true, _)) => {
            let expanded = state::set_expanded(&model.expanded, &id, false);
            (Model { expanded, ..model }, Cmd::None)
        }
        Some((_, false, Some(parent))) => (model.select(parent), Cmd::None),
        _ => (model, Cmd::None),
    }
}

fn submit(model: Model) -> (Model, Cmd) {
    match model.mode.clone() {
        Mode::Draft(draft) => match draft.kind {
            DraftKind::Edit => commit_edit(model, draft),
            DraftKind::AddChild => commit_child(model, draft),
        },
        Mode::ImportPrompt(path) => {
            let path = path.trim();
            if path.is_empty() {
                return (model.status("Enter the path of a JSON export"), Cmd::None);
            }
            let cmd = Cmd::Import(PathBuf::from(path));
            (
                Model {
                    mode: Mode::Browse,
                    ..model
                },
                cmd,
            )
        }
        _ => (model, Cmd::None),
    }
}

fn commit_edit(model: Model, draft: Draft) -> (Model, Cmd) {
    let patch = match draft.to_patch() {
        Ok(patch) => patch,
        // Draft stays open so the date can be fixed
        Err(message) => return (model.status(message), Cmd::None),
    };
    let nodes = tree::update(&model.nodes, &draft.target, &patch);
    let model = Model {
        mode: Mode::Browse,
        ..model
    }
    .replace_tree(nodes)
    .select_id(&draft.target);

    let shown = model.rows().iter().any(|r| r.node.id == draft.target);
    let message = if shown {
        format!("Updated '{}'", draft.title)
    } else {
        format!("Updated '{}' (hidden by the current filters)", draft.title)
    };
    (model.status(message), Cmd::None)
}

fn commit_child(model: Model, draft: Draft) -> (Model, Cmd) {
    let parent_category = tree::find(&model.nodes, &draft.target)
        .map(|p| p.category.clone())
        .unwrap_or_default();
    let mut model = model;
    let id = model.ids.next_id();
    let parent = draft.target.clone();
    let child = draft.into_child(id.clone(), model.today, &parent_category);
    let title = child.title.clone();

    let nodes = tree::add_child(&model.nodes, &parent, &child);
    let expanded = state::set_expanded(&model.expanded, &parent, true);
    let model = Model {
        mode: Mode::Browse,
        expanded,
        ..model
    }
    .replace_tree(nodes)
    .select_id(&id);
    (model.status(format!("Added '{}'", title)), Cmd::None)
}
