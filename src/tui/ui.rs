//! UI rendering for the TUI

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use super::state::Row;
use super::update::{Draft, DraftKind, Mode, Model};
use crate::filter::{TimeScale, ALL_CATEGORIES};
use crate::node::Status;

/// Main draw function - orchestrates all rendering
pub fn draw(frame: &mut Frame, model: &Model) {
    let area = frame.area();

    let main_layout = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Length(1), // Filter bar
        Constraint::Min(5),    // Outline + detail
        Constraint::Length(1), // Footer/status
    ])
    .split(area);

    draw_header(frame, model, main_layout[0]);
    draw_filter_bar(frame, model, main_layout[1]);

    let content = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_layout[2]);
    draw_outline(frame, model, content[0]);
    draw_detail(frame, model, content[1]);

    draw_footer(frame, model, main_layout[3]);

    match &model.mode {
        Mode::Draft(draft) => draw_draft(frame, draft, area),
        Mode::ImportPrompt(path) => draw_prompt(frame, path, area),
        Mode::Alert(text) => draw_alert(frame, text, area),
        Mode::Help => draw_help_overlay(frame, area),
        Mode::Browse => {}
    }
}

fn draw_header(frame: &mut Frame, model: &Model, area: Rect) {
    let mut spans = vec![Span::styled(
        format!(
            " Sapling Roadmap │ [{}/{} items]",
            crate::tree::count(&model.visible),
            crate::tree::count(&model.nodes)
        ),
        Style::default().bg(Color::Blue).fg(Color::White).bold(),
    )];
    if model.unsaved {
        spans.push(Span::styled(
            " Unsaved changes ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }
    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Blue));
    frame.render_widget(header, area);
}

fn draw_filter_bar(frame: &mut Frame, model: &Model, area: Rect) {
    let mut spans = vec![Span::raw(" Range: ")];
    for scale in TimeScale::ALL {
        let style = if scale == model.time_scale {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!("[{}]", scale.label()), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::raw(format!("({}) │ Category: ", model.window())));
    let category = if model.category == ALL_CATEGORIES {
        "All Categories".to_string()
    } else {
        model.category.clone()
    };
    spans.push(Span::styled(
        format!("[{}]", category),
        Style::default().fg(Color::Black).bg(Color::Cyan),
    ));

    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(bar, area);
}

pub fn status_color(status: Status) -> Color {
    match status {
        Status::Planned => Color::Yellow,
        Status::InProgress => Color::LightRed,
        Status::Completed => Color::Green,
        Status::AtRisk => Color::Red,
    }
}

pub fn category_color(category: &str) -> Color {
    match category {
        "Technology" => Color::LightYellow,
        "Market" => Color::LightMagenta,
        "Product" => Color::Yellow,
        "Team" => Color::LightCyan,
        "Finance" => Color::LightGreen,
        "Operations" => Color::LightBlue,
        _ => Color::Gray,
    }
}

fn row_item(row: &Row<'_>) -> ListItem<'static> {
    let node = row.node;
    let marker = if !node.has_children() {
        "  "
    } else if row.expanded {
        "▼ "
    } else {
        "▶ "
    };
    let mut spans = vec![
        Span::raw("  ".repeat(row.depth)),
        Span::raw(marker),
        Span::styled("▌", Style::default().fg(category_color(&node.category))),
        Span::styled(node.title.clone(), Style::default().bold()),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", node.status.label()),
            Style::default().fg(status_color(node.status)),
        ),
        Span::styled(
            format!(" {} → {}", node.start_date, node.end_date),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if node.is_inverted() {
        spans.push(Span::styled(" ⚠ ends before it starts", Style::default().fg(Color::Red)));
    }
    ListItem::new(Line::from(spans))
}

fn draw_outline(frame: &mut Frame, model: &Model, area: Rect) {
    let block = Block::default().title(" Roadmap ").borders(Borders::ALL);
    let rows = model.rows();

    if rows.is_empty() {
        let text = if model.category == ALL_CATEGORIES {
            "No items found for this time range.".to_string()
        } else {
            format!(
                "No items found in the {} category for this time range.",
                model.category
            )
        };
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(text),
            Line::from(Span::styled(
                "Press t to widen the range or a to add an item.",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = rows.iter().map(row_item).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Rgb(60, 60, 80)));

    let mut state = ListState::default()
        .with_offset(model.scroll_offset)
        .with_selected(Some(model.selected_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_detail(frame: &mut Frame, model: &Model, area: Rect) {
    let block = Block::default().title(" Details ").borders(Borders::ALL);
    let Some(row) = model.selected_row() else {
        frame.render_widget(block, area);
        return;
    };
    let node = row.node;

    let label = |s: &'static str| Span::styled(s, Style::default().fg(Color::DarkGray));
    let mut lines = vec![
        Line::from(Span::styled(node.title.clone(), Style::default().bold())),
        Line::from(""),
        Line::from(vec![
            label("Status    "),
            Span::styled(node.status.label(), Style::default().fg(status_color(node.status))),
        ]),
        Line::from(vec![
            label("Category  "),
            Span::styled(
                node.category.clone(),
                Style::default().fg(category_color(&node.category)),
            ),
        ]),
        Line::from(vec![
            label("Dates     "),
            Span::raw(format!("{} → {}", node.start_date, node.end_date)),
        ]),
        Line::from(vec![label("Id        "), Span::raw(node.id.clone())]),
    ];
    if !node.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(node.description.clone()));
    }
    if !node.details.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(label("Key milestones")));
        for d in &node.details {
            lines.push(Line::from(format!("  • {}", d)));
        }
    }

    let detail = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(detail, area);
}

fn draw_footer(frame: &mut Frame, model: &Model, area: Rect) {
    let keybinds = match model.mode {
        Mode::Draft(_) => "Tab:next field  ←/→:change choice  Enter:save  Esc:cancel",
        Mode::ImportPrompt(_) => "Enter:import  Esc:cancel",
        Mode::Alert(_) | Mode::Help => "Esc:close",
        Mode::Browse => {
            "j/k:move  Enter:expand  a:add  c:child  e:edit  d:delete  t:range  f:category  s:save  x:export  i:import  ?:help  q:quit"
        }
    };
    let text = model.status_message.as_deref().unwrap_or(keybinds);
    let footer = Paragraph::new(format!(" {}", text))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(footer, area);
}

/// Rectangle of at most `width` x `height`, centered in `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn draw_draft(frame: &mut Frame, draft: &Draft, area: Rect) {
    let fields = draft.fields();
    let popup_area = centered(area, 70, fields.len() as u16 * 2 + 4);
    frame.render_widget(Clear, popup_area);

    let focused = draft.focused();
    let mut lines = Vec::new();
    for &field in fields {
        let active = field == focused;
        let value = draft.value(field);
        let value_style = if active {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };
        let cursor = if active { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<12}", field.label()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(format!("{}{}", value, cursor), value_style),
        ]));
        lines.push(Line::from(""));
    }

    let title = match draft.kind {
        DraftKind::Edit => " Edit Item ",
        DraftKind::AddChild => " Add Child ",
    };
    let form = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().bg(Color::Black));
    frame.render_widget(form, popup_area);
}

fn draw_prompt(frame: &mut Frame, path: &str, area: Rect) {
    let popup_area = centered(area, 70, 5);
    frame.render_widget(Clear, popup_area);
    let prompt = Paragraph::new(vec![
        Line::from(Span::styled(
            "Path to a roadmap JSON export:",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(format!("{}_", path), Style::default().fg(Color::Cyan))),
    ])
    .block(
        Block::default()
            .title(" Import ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    )
    .style(Style::default().bg(Color::Black));
    frame.render_widget(prompt, popup_area);
}

fn draw_alert(frame: &mut Frame, text: &str, area: Rect) {
    let popup_area = centered(area, 64, 9);
    frame.render_widget(Clear, popup_area);
    let alert = Paragraph::new(text.to_string())
        .block(
            Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White).bg(Color::Black));
    frame.render_widget(alert, popup_area);
}

fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered(area, 60, 30);
    frame.render_widget(Clear, popup_area);

    let help_text = r#"
  Navigation
  ─────────────────────────────────
  j/k, ↑/↓     Move up/down
  g / G        Jump to top / bottom
  Ctrl+d/u     Page down/up
  Enter/Space  Expand or collapse
  l / h        Expand / collapse (h on a child goes to its parent)

  Editing
  ─────────────────────────────────
  a            Add top-level item
  c            Add child to selected item
  e            Edit selected item
  d / Del      Delete selected item and its children

  Filters
  ─────────────────────────────────
  t, 1-5       Time range (week .. 2 years)
  f            Cycle category

  Data
  ─────────────────────────────────
  s            Save
  x            Export to JSON
  i            Import from JSON
  Q            Save and quit
  q            Quit

  Press ? or Esc to close
"#;

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(help, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{parse_date, RoadmapNode};
    use crate::tui::update::update;
    use crate::tui::msg::Msg;
    use ratatui::backend::TestBackend;

    fn render(model: &Model) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw(f, model)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    fn model() -> Model {
        let nodes = vec![RoadmapNode::new("n1", "Kickoff", "2025-01-01", "2025-03-31", "Product")
            .with_details(vec!["Hire team".into()])];
        Model::new(nodes, parse_date("2025-01-01").unwrap())
    }

    #[test]
    fn test_draw_outline_and_detail() {
        let screen = render(&model());
        assert!(screen.contains("Kickoff"));
        assert!(screen.contains("Hire team"));
        assert!(screen.contains("3 Months"));
    }

    #[test]
    fn test_draw_empty_state_and_unsaved_badge() {
        let (m, _) = update(Msg::DeleteSelected, model());
        let screen = render(&m);
        assert!(screen.contains("No items found for this time range."));
        assert!(screen.contains("Unsaved changes"));
    }

    #[test]
    fn test_draw_alert_overlay() {
        let (m, _) = update(Msg::ImportFailed("boom".into()), model());
        assert!(render(&m).contains("Failed to import"));
    }

    #[test]
    fn test_scroll_uses_full_list_height() {
        let nodes = (0..30)
            .map(|i| {
                RoadmapNode::new(format!("r{}", i), format!("Item {:02}", i), "2025-01-01", "2025-02-01", "Team")
            })
            .collect();
        let mut m = Model::new(nodes, parse_date("2025-01-01").unwrap());
        (m, _) = update(Msg::Resize(120, 30), m);
        for _ in 0..24 {
            (m, _) = update(Msg::MoveDown, m);
        }
        assert_eq!(m.scroll_offset, 0);
        let screen = render(&m);
        assert!(screen.contains("Item 00"));
        assert!(screen.contains("Item 24"));
    }

    #[test]
    fn test_centered_fits_small_area() {
        let r = centered(Rect::new(0, 0, 10, 6), 60, 30);
        assert_eq!((r.width, r.height), (6, 2));
    }
}
