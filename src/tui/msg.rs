//! TEA Message Types for the TUI
//!
//! Messages describe what happened, never how to handle it. Key presses are
//! turned into messages by [`key_to_msg`]; the runtime reports the outcome of
//! commands it executed with the completion messages at the bottom of [`Msg`].

use crate::filter::TimeScale;
use crate::node::RoadmapNode;
use crossterm::event::{KeyCode, KeyModifiers};
use std::path::PathBuf;

/// All possible messages/actions in the TUI
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    // === Navigation ===
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    JumpToTop,
    JumpToBottom,
    SelectIndex(usize),

    // === Expand / collapse ===
    ToggleExpand,
    Expand,
    Collapse,

    // === Tree edits ===
    AddRoot,
    /// Open the edit draft for the selected node
    StartEdit,
    /// Open the new-child draft under the selected node
    StartAddChild,
    DeleteSelected,

    // === Draft / prompt input ===
    Input(char),
    Backspace,
    NextField,
    PrevField,
    /// Step a choice field (status, category) forward or back
    CycleField { forward: bool },
    Submit,
    Cancel,

    // === Filtering ===
    CycleCategory,
    CycleTimeScale,
    SetTimeScale(TimeScale),

    // === Persistence ===
    Save,
    /// Save when there are unsaved changes, then quit
    SaveAndQuit,
    Export,
    StartImport,

    // === Modals ===
    ToggleHelp,
    CloseModal,

    // === Lifecycle ===
    Quit,
    Tick,
    Resize(u16, u16),

    // === Command completions ===
    Saved,
    SaveFailed(String),
    Exported(PathBuf),
    ExportFailed(String),
    Imported(Vec<RoadmapNode>),
    ImportFailed(String),

    /// No operation (for unhandled keys)
    Noop,
}

/// Which key map applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    Browse,
    /// Editing a multi-field draft
    Form,
    /// Single-line prompt (import path)
    Prompt,
    /// Alert or help overlay
    Modal,
}

/// Convert a key event to a message
///
/// Pure: no side effects, just pattern matching on the key and the context.
pub fn key_to_msg(code: KeyCode, modifiers: KeyModifiers, context: KeyContext) -> Msg {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Msg::Quit;
    }

    match context {
        KeyContext::Form => match code {
            KeyCode::Esc => Msg::Cancel,
            KeyCode::Enter => Msg::Submit,
            KeyCode::Tab | KeyCode::Down => Msg::NextField,
            KeyCode::BackTab | KeyCode::Up => Msg::PrevField,
            KeyCode::Right => Msg::CycleField { forward: true },
            KeyCode::Left => Msg::CycleField { forward: false },
            KeyCode::Backspace => Msg::Backspace,
            KeyCode::Char(c) => Msg::Input(c),
            _ => Msg::Noop,
        },
        KeyContext::Prompt => match code {
            KeyCode::Esc => Msg::Cancel,
            KeyCode::Enter => Msg::Submit,
            KeyCode::Backspace => Msg::Backspace,
            KeyCode::Char(c) => Msg::Input(c),
            _ => Msg::Noop,
        },
        KeyContext::Modal => match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') => {
                Msg::CloseModal
            }
            _ => Msg::Noop,
        },
        KeyContext::Browse => browse_key(code, modifiers),
    }
}

fn browse_key(code: KeyCode, modifiers: KeyModifiers) -> Msg {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match code {
        KeyCode::Char('q') => Msg::Quit,
        KeyCode::Char('Q') => Msg::SaveAndQuit,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => Msg::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Msg::MoveUp,
        KeyCode::Char('d') if ctrl => Msg::PageDown,
        KeyCode::Char('u') if ctrl => Msg::PageUp,
        KeyCode::Char('g') | KeyCode::Home => Msg::JumpToTop,
        KeyCode::Char('G') | KeyCode::End => Msg::JumpToBottom,
        KeyCode::PageDown => Msg::PageDown,
        KeyCode::PageUp => Msg::PageUp,

        // Expand / collapse
        KeyCode::Enter | KeyCode::Char(' ') => Msg::ToggleExpand,
        KeyCode::Char('l') | KeyCode::Right => Msg::Expand,
        KeyCode::Char('h') | KeyCode::Left => Msg::Collapse,

        // Persistence
        KeyCode::Char('s') => Msg::Save,
        KeyCode::Char('x') => Msg::Export,
        KeyCode::Char('i') => Msg::StartImport,

        // Edits
        KeyCode::Char('a') => Msg::AddRoot,
        KeyCode::Char('c') => Msg::StartAddChild,
        KeyCode::Char('e') => Msg::StartEdit,
        KeyCode::Char('d') | KeyCode::Delete => Msg::DeleteSelected,

        // Filters
        KeyCode::Char('f') => Msg::CycleCategory,
        KeyCode::Char('t') => Msg::CycleTimeScale,
        KeyCode::Char(c @ '1'..='5') => {
            let idx = (c as usize) - ('1' as usize);
            Msg::SetTimeScale(TimeScale::ALL[idx])
        }

        KeyCode::Char('?') => Msg::ToggleHelp,
        KeyCode::Esc => Msg::CloseModal,

        _ => Msg::Noop,
    }
}

/// Check if a message can change the tree itself (Submit commits drafts)
pub fn is_tree_edit(msg: &Msg) -> bool {
    matches!(
        msg,
        Msg::AddRoot | Msg::DeleteSelected | Msg::Submit | Msg::Imported(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browse(code: KeyCode) -> Msg {
        key_to_msg(code, KeyModifiers::NONE, KeyContext::Browse)
    }

    #[test]
    fn test_key_to_msg_navigation() {
        assert_eq!(browse(KeyCode::Char('j')), Msg::MoveDown);
        assert_eq!(browse(KeyCode::Char('k')), Msg::MoveUp);
        assert_eq!(browse(KeyCode::Down), Msg::MoveDown);
        assert_eq!(browse(KeyCode::Home), Msg::JumpToTop);
        assert_eq!(browse(KeyCode::Char('G')), Msg::JumpToBottom);
        assert_eq!(
            key_to_msg(KeyCode::Char('d'), KeyModifiers::CONTROL, KeyContext::Browse),
            Msg::PageDown
        );
    }

    #[test]
    fn test_key_to_msg_quit() {
        assert_eq!(browse(KeyCode::Char('q')), Msg::Quit);
        for ctx in [
            KeyContext::Browse,
            KeyContext::Form,
            KeyContext::Prompt,
            KeyContext::Modal,
        ] {
            assert_eq!(key_to_msg(KeyCode::Char('c'), KeyModifiers::CONTROL, ctx), Msg::Quit);
        }
    }

    #[test]
    fn test_key_to_msg_edits() {
        assert_eq!(browse(KeyCode::Char('a')), Msg::AddRoot);
        assert_eq!(browse(KeyCode::Char('c')), Msg::StartAddChild);
        assert_eq!(browse(KeyCode::Char('e')), Msg::StartEdit);
        assert_eq!(browse(KeyCode::Char('d')), Msg::DeleteSelected);
        assert_eq!(browse(KeyCode::Enter), Msg::ToggleExpand);
    }

    #[test]
    fn test_key_to_msg_time_scale_digits() {
        assert_eq!(browse(KeyCode::Char('1')), Msg::SetTimeScale(TimeScale::Week));
        assert_eq!(browse(KeyCode::Char('5')), Msg::SetTimeScale(TimeScale::TwoYears));
        assert_eq!(browse(KeyCode::Char('6')), Msg::Noop);
    }

    #[test]
    fn test_key_to_msg_form_mode_types_letters() {
        // 'q' and 'd' are text while a draft is open
        assert_eq!(
            key_to_msg(KeyCode::Char('q'), KeyModifiers::NONE, KeyContext::Form),
            Msg::Input('q')
        );
        assert_eq!(
            key_to_msg(KeyCode::Tab, KeyModifiers::NONE, KeyContext::Form),
            Msg::NextField
        );
        assert_eq!(
            key_to_msg(KeyCode::Left, KeyModifiers::NONE, KeyContext::Form),
            Msg::CycleField { forward: false }
        );
        assert_eq!(
            key_to_msg(KeyCode::Esc, KeyModifiers::NONE, KeyContext::Form),
            Msg::Cancel
        );
    }

    #[test]
    fn test_key_to_msg_prompt_and_modal() {
        assert_eq!(
            key_to_msg(KeyCode::Char('/'), KeyModifiers::NONE, KeyContext::Prompt),
            Msg::Input('/')
        );
        assert_eq!(
            key_to_msg(KeyCode::Enter, KeyModifiers::NONE, KeyContext::Prompt),
            Msg::Submit
        );
        assert_eq!(
            key_to_msg(KeyCode::Enter, KeyModifiers::NONE, KeyContext::Modal),
            Msg::CloseModal
        );
        assert_eq!(
            key_to_msg(KeyCode::Char('j'), KeyModifiers::NONE, KeyContext::Modal),
            Msg::Noop
        );
    }

    #[test]
    fn test_is_tree_edit() {
        assert!(is_tree_edit(&Msg::AddRoot));
        assert!(is_tree_edit(&Msg::Imported(vec![])));
        assert!(is_tree_edit(&Msg::Submit));
        assert!(!is_tree_edit(&Msg::MoveUp));
    }
}
