use chrono::Local;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use sapling::filter::{self, DateWindow, TimeScale};
use sapling::node::{new_node_id, parse_date, NodeDraft};
use sapling::segments::{self, CustomerSegment, SegmentPatch};
use sapling::serve::{start_roadmap_server, ServerState};
use sapling::store::default_db_path;
use sapling::{content, init, persist, tree, tui};
use sapling::{Config, KeyValueStore, NodePatch, RoadmapNode, SqliteStore, Status};
use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

type CliResult<T = ()> = Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(name = "sapling")]
#[command(author, version, about = "Editable roadmap trees for the company wiki")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create .sapling/ with a default config and an empty store
    Init,

    /// Print the roadmap as an outline
    List {
        /// Only this category (ancestors of matches are kept)
        #[arg(short, long)]
        category: Option<String>,

        /// Time range from today: week, month, quarter, year, 2-years
        #[arg(short, long)]
        scale: Option<TimeScale>,

        /// Disable the date filter
        #[arg(long, conflicts_with = "scale")]
        all: bool,

        /// Print the filtered tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one item in full
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Add a root item, or a child with --parent
    Add {
        /// Parent item id
        #[arg(short, long)]
        parent: Option<String>,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// planned, in-progress, completed, at-risk
        #[arg(long)]
        status: Option<Status>,

        /// Defaults to the parent's category
        #[arg(short, long)]
        category: Option<String>,

        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        start: Option<String>,

        /// YYYY-MM-DD, defaults to the configured duration from today (today for children)
        #[arg(long)]
        end: Option<String>,

        /// Milestone note (repeatable)
        #[arg(long = "detail")]
        details: Vec<String>,
    },

    /// Change fields of an item
    Update {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        status: Option<Status>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        /// Replace the milestone notes (repeatable)
        #[arg(long = "detail")]
        details: Vec<String>,

        /// Remove all milestone notes
        #[arg(long, conflicts_with = "details")]
        clear_details: bool,
    },

    /// Delete an item and everything under it
    Delete { id: String },

    /// Write the roadmap to <prefix>-<date>.json
    Export {
        /// Output directory (defaults to [export] dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Replace the roadmap with an exported file
    Import { path: PathBuf },

    /// Forget the saved roadmap and go back to the built-in one
    Reset,

    /// Report duplicate ids, bad dates and inverted ranges
    Check,

    /// Manage wiki content overrides
    Content {
        #[command(subcommand)]
        action: ContentAction,
    },

    /// Manage the customer segments table
    Segments {
        #[command(subcommand)]
        action: SegmentsAction,
    },

    /// Open the terminal editor (default)
    Tui,

    /// Serve a read-only web view of the roadmap
    Serve {
        /// Port to listen on (defaults to [serve] port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate shell completions
    Completion { shell: Shell },
}

#[derive(Subcommand, Debug)]
enum ContentAction {
    /// Print the override for a section
    Show { section: String },

    /// Store an override (from the argument, --file, or stdin)
    Set {
        section: String,

        markdown: Option<String>,

        #[arg(short, long, conflicts_with = "markdown")]
        file: Option<PathBuf>,
    },

    /// Remove the override so the published text shows again
    Reset { section: String },

    /// Sections with an override
    List,
}

#[derive(Subcommand, Debug)]
enum SegmentsAction {
    /// Print the table
    List {
        #[arg(long)]
        json: bool,
    },

    /// Append a segment (unset fields get placeholders)
    Add {
        #[command(flatten)]
        fields: SegmentFields,
    },

    /// Change fields of a segment
    Update {
        id: String,

        #[command(flatten)]
        fields: SegmentFields,
    },

    /// Remove a segment
    Delete { id: String },
}

#[derive(Args, Debug)]
struct SegmentFields {
    /// Segment name
    #[arg(short, long)]
    segment: Option<String>,

    /// Replaces the demographics (repeatable)
    #[arg(long = "demographic")]
    demographics: Vec<String>,

    /// Replaces the psychographics (repeatable)
    #[arg(long = "psychographic")]
    psychographics: Vec<String>,

    #[arg(long)]
    income: Option<String>,

    #[arg(long)]
    spend: Option<String>,

    #[arg(long)]
    market_size: Option<String>,
}

impl SegmentFields {
    fn into_patch(self) -> SegmentPatch {
        let list = |items: Vec<String>| (!items.is_empty()).then_some(items);
        SegmentPatch {
            segment: self.segment,
            demographics: list(self.demographics),
            psychographics: list(self.psychographics),
            income_range: self.income,
            current_spend: self.spend,
            market_size: self.market_size,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Tui);

    init_logging(matches!(command, Command::Tui));

    if let Err(e) = run(command) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Logs go to stderr, or to `.sapling/sapling.log` while the TUI owns the screen
fn init_logging(to_file: bool) {
    let filter = EnvFilter::try_from_env("SAPLING_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    if to_file {
        let log_path = default_db_path().with_file_name("sapling.log");
        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path);
        if let Ok(file) = file {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        return;
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(command: Command) -> CliResult {
    let config = Config::load();
    let today = Local::now().date_naive();

    match command {
        Command::Init => {
            let cwd = std::env::current_dir()?;
            init::init_project(&cwd)?;
        }

        Command::List {
            category,
            scale,
            all,
            json,
        } => {
            let store = SqliteStore::open()?;
            let nodes = load(&store, &config);
            let category = category.unwrap_or_else(|| config.view.category.clone());
            let window = if all {
                None
            } else {
                Some(scale.unwrap_or(config.view.time_scale).window(today))
            };
            let visible = filter::apply(&nodes, &category, window);

            if json {
                println!("{}", persist::export_json(&visible)?);
            } else {
                print_header(&visible, &nodes, window, &category);
                print_outline(&visible);
            }
        }

        Command::Show { id, json } => {
            let store = SqliteStore::open()?;
            let nodes = load(&store, &config);
            let Some(node) = tree::find(&nodes, &id) else {
                warn_missing(&id);
                return Ok(());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(node)?);
            } else {
                print_node(node);
            }
        }

        Command::Add {
            parent,
            title,
            description,
            status,
            category,
            start,
            end,
            details,
        } => {
            validate_date(start.as_deref())?;
            validate_date(end.as_deref())?;

            let store = SqliteStore::open()?;
            let nodes = load(&store, &config);
            let draft = NodeDraft {
                title: title.unwrap_or_default(),
                description: description.unwrap_or_default(),
                status,
                category,
                start_date: start,
                end_date: end,
                details,
            };
            let duration = config.items.default_duration_days;

            let (next, child) = match parent {
                Some(parent_id) => {
                    let Some(parent) = tree::find(&nodes, &parent_id) else {
                        warn_missing(&parent_id);
                        return Ok(());
                    };
                    let child =
                        draft.into_node(new_node_id(), today, 0, "New Item", &parent.category);
                    (tree::add_child(&nodes, &parent_id, &child), child)
                }
                None => {
                    let mut draft = draft;
                    if draft.description.is_empty() {
                        draft.description = "Click to edit this item".to_string();
                    }
                    let node = draft.into_node(new_node_id(), today, duration, "New Initiative", "Product");
                    (tree::add_root(&nodes, node.clone()), node)
                }
            };

            persist::save(&store, &config.store.key, &next)?;
            println!("{} {} {}", "Added".green(), child.title.bold(), child.id.dimmed());
        }

        Command::Update {
            id,
            title,
            description,
            status,
            category,
            start,
            end,
            details,
            clear_details,
        } => {
            validate_date(start.as_deref())?;
            validate_date(end.as_deref())?;

            let patch = NodePatch {
                title,
                description,
                start_date: start,
                end_date: end,
                status,
                category,
                children: None,
                details: if clear_details {
                    Some(Vec::new())
                } else if details.is_empty() {
                    None
                } else {
                    Some(details)
                },
            };
            if patch.is_empty() {
                println!("{}", "Nothing to update.".yellow());
                return Ok(());
            }

            let store = SqliteStore::open()?;
            let nodes = load(&store, &config);
            if tree::find(&nodes, &id).is_none() {
                warn_missing(&id);
                return Ok(());
            }
            let next = tree::update(&nodes, &id, &patch);
            persist::save(&store, &config.store.key, &next)?;
            println!("{} {}", "Updated".green(), id);
        }

        Command::Delete { id } => {
            let store = SqliteStore::open()?;
            let nodes = load(&store, &config);
            if tree::find(&nodes, &id).is_none() {
                warn_missing(&id);
                return Ok(());
            }
            let next = tree::delete(&nodes, &id);
            let removed = tree::count(&nodes) - tree::count(&next);
            persist::save(&store, &config.store.key, &next)?;
            println!("{} {} ({} item(s))", "Deleted".green(), id, removed);
        }

        Command::Export { dir } => {
            let store = SqliteStore::open()?;
            let nodes = load(&store, &config);
            let dir = dir.unwrap_or_else(|| config.export.dir().to_path_buf());
            let path = persist::export(&nodes, &dir, &config.export.prefix, today)?;
            println!("{} {}", "Exported to".green(), path.display());
        }

        Command::Import { path } => {
            let nodes = persist::import_file(&path).map_err(|e| {
                format!("Failed to import roadmap data. Please check the file format. ({})", e)
            })?;
            let store = SqliteStore::open()?;
            persist::save(&store, &config.store.key, &nodes)?;
            println!(
                "{} {} item(s) from {}",
                "Imported".green(),
                tree::count(&nodes),
                path.display()
            );
        }

        Command::Reset => {
            let store = SqliteStore::open()?;
            if store.remove(&config.store.key)? {
                println!("{}", "Saved roadmap removed; the built-in roadmap is back.".green());
            } else {
                println!("{}", "No saved roadmap.".yellow());
            }
        }

        Command::Check => {
            let store = SqliteStore::open()?;
            let nodes = load(&store, &config);
            let problems = check(&nodes);
            if problems.is_empty() {
                println!("{} {} item(s), no problems", "OK".green().bold(), tree::count(&nodes));
            } else {
                for problem in &problems {
                    println!("  {} {}", "✗".red(), problem);
                }
                println!("\n{} problem(s) found", problems.len());
                std::process::exit(1);
            }
        }

        Command::Content { action } => {
            let store = SqliteStore::open()?;
            run_content(&store, action)?;
        }

        Command::Segments { action } => {
            let store = SqliteStore::open()?;
            run_segments(&store, action)?;
        }

        Command::Tui => {
            let store = SqliteStore::open()?;
            tui::run(Box::new(store), &config)?;
        }

        Command::Serve { port } => {
            let store = SqliteStore::open()?;
            let state = ServerState {
                nodes: load(&store, &config),
                today,
                default_scale: config.view.time_scale,
                default_category: config.view.category.clone(),
                export_prefix: config.export.prefix.clone(),
            };
            start_roadmap_server(port.unwrap_or(config.serve.port), state)?;
        }

        Command::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "sapling", &mut io::stdout());
        }
    }

    Ok(())
}

fn run_content(store: &dyn KeyValueStore, action: ContentAction) -> CliResult {
    match action {
        ContentAction::Show { section } => match content::load_section(store, &section)? {
            Some(markdown) => println!("{}", markdown),
            None => println!("{}", format!("No override for '{}'.", section).yellow()),
        },
        ContentAction::Set {
            section,
            markdown,
            file,
        } => {
            let markdown = match (markdown, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(path)?,
                (None, None) => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            content::save_section(store, &section, &markdown)?;
            println!("{} {}", "Saved".green(), section);
        }
        ContentAction::Reset { section } => {
            if content::reset_section(store, &section)? {
                println!("{} {}", "Reset".green(), section);
            } else {
                println!("{}", format!("No override for '{}'.", section).yellow());
            }
        }
        ContentAction::List => {
            for section in content::overridden_sections(store)? {
                println!("{}", section);
            }
        }
    }
    Ok(())
}

fn run_segments(store: &dyn KeyValueStore, action: SegmentsAction) -> CliResult {
    let table = segments::load(store);
    match action {
        SegmentsAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print_segments(&table);
            }
        }
        SegmentsAction::Add { fields } => {
            let id = segments::fresh_id(&table);
            let blank = CustomerSegment::placeholder(id.clone());
            let next = segments::add(&table, blank);
            let next = segments::update(&next, &id, &fields.into_patch());
            segments::save(store, &next)?;
            println!("{} segment {}", "Added".green(), id.dimmed());
        }
        SegmentsAction::Update { id, fields } => {
            let patch = fields.into_patch();
            if patch.is_empty() {
                println!("{}", "Nothing to update.".yellow());
                return Ok(());
            }
            if segments::find(&table, &id).is_none() {
                warn_missing_segment(&id);
                return Ok(());
            }
            segments::save(store, &segments::update(&table, &id, &patch))?;
            println!("{} segment {}", "Updated".green(), id);
        }
        SegmentsAction::Delete { id } => {
            if segments::find(&table, &id).is_none() {
                warn_missing_segment(&id);
                return Ok(());
            }
            segments::save(store, &segments::delete(&table, &id))?;
            println!("{} segment {}", "Deleted".green(), id);
        }
    }
    Ok(())
}

fn warn_missing_segment(id: &str) {
    println!("{}", format!("No segment with id '{}'; nothing changed.", id).yellow());
}

fn print_segments(table: &[CustomerSegment]) {
    if table.is_empty() {
        println!("{}", "No segments.".dimmed());
        return;
    }
    for seg in table {
        println!("{} {}", seg.segment.bold(), seg.id.dimmed());
        println!("  {:<15} {}", "income:", seg.income_range);
        println!("  {:<15} {}", "spend:", seg.current_spend);
        println!("  {:<15} {}", "market size:", seg.market_size);
        for (label, items) in [("demographics:", &seg.demographics), ("psychographics:", &seg.psychographics)] {
            println!("  {}", label);
            for item in items {
                println!("    • {}", item);
            }
        }
    }
}

fn load(store: &dyn KeyValueStore, config: &Config) -> Vec<RoadmapNode> {
    persist::load(store, &config.store.key).nodes
}

fn validate_date(date: Option<&str>) -> CliResult {
    match date {
        Some(d) if parse_date(d).is_none() => {
            Err(format!("invalid date '{}' (expected YYYY-MM-DD)", d).into())
        }
        _ => Ok(()),
    }
}

fn warn_missing(id: &str) {
    println!("{}", format!("No item with id '{}'; nothing changed.", id).yellow());
}

/// Human-readable problems with the tree
fn check(nodes: &[RoadmapNode]) -> Vec<String> {
    let mut problems: Vec<String> = tree::duplicate_ids(nodes)
        .into_iter()
        .map(|id| format!("duplicate id '{}'", id))
        .collect();

    tree::walk(nodes, &mut |node, _| {
        for (label, value) in [("start", &node.start_date), ("end", &node.end_date)] {
            if parse_date(value).is_none() {
                problems.push(format!("{}: invalid {} date '{}'", node.id, label, value));
            }
        }
        if node.is_inverted() {
            problems.push(format!(
                "{}: ends before it starts ({} > {})",
                node.id, node.start_date, node.end_date
            ));
        }
    });
    problems
}

fn status_badge(status: Status) -> String {
    let label = format!("[{}]", status.as_str());
    match status {
        Status::Planned => label.yellow().to_string(),
        Status::InProgress => label.bright_yellow().to_string(),
        Status::Completed => label.green().to_string(),
        Status::AtRisk => label.red().to_string(),
    }
}

fn print_header(visible: &[RoadmapNode], all: &[RoadmapNode], window: Option<DateWindow>, category: &str) {
    let range = window
        .map(|w| w.to_string())
        .unwrap_or_else(|| "all dates".to_string());
    println!(
        "{} {} ({} of {} items, {})",
        "Roadmap".bold(),
        range.dimmed(),
        tree::count(visible),
        tree::count(all),
        category
    );
    println!("{}", "─".repeat(70));
}

fn print_outline(nodes: &[RoadmapNode]) {
    if nodes.is_empty() {
        println!("{}", "No items found for this time range.".dimmed());
        return;
    }
    tree::walk(nodes, &mut |node, depth| {
        let warn = if node.is_inverted() {
            format!(" {}", "⚠ ends before it starts".yellow())
        } else {
            String::new()
        };
        println!(
            "{}{} {} {} {} {}{}",
            "  ".repeat(depth),
            status_badge(node.status),
            node.title.bold(),
            format!("{} → {}", node.start_date, node.end_date).dimmed(),
            node.category.cyan(),
            node.id.dimmed(),
            warn
        );
    });
}

fn print_node(node: &RoadmapNode) {
    println!("{}", node.title.bold());
    println!("  {:<12} {}", "id:", node.id);
    println!("  {:<12} {}", "status:", status_badge(node.status));
    println!("  {:<12} {}", "category:", node.category.cyan());
    println!("  {:<12} {} → {}", "dates:", node.start_date, node.end_date);
    if node.is_inverted() {
        println!("  {}", "⚠ ends before it starts".yellow());
    }
    if !node.description.is_empty() {
        println!("\n  {}", node.description);
    }
    if !node.details.is_empty() {
        println!("\n  {}", "Milestones:".bold());
        for detail in &node.details {
            println!("    • {}", detail);
        }
    }
    if node.has_children() {
        println!("\n  {}", "Children:".bold());
        for child in &node.children {
            println!("    {} {} {}", status_badge(child.status), child.title, child.id.dimmed());
        }
    }
}
