//! Report panel.
//!
//! The panel lists every report in range order. Its items are kept in sync with the store
//! incrementally: items whose report survives keep their identity (and their host-side view),
//! only the difference is inserted or removed.

use std::fmt;
use std::sync::Arc;

use crate::access_keys::{action_for_key, assign_access_keys};
use crate::geometry::Rect;
use crate::render::{RenderedReport, render_report};
use crate::report::Report;
use crate::state::ReportState;

/// Class of the panel container.
pub const PANEL_CLASS: &str = "cm-panel-diagnostic";
/// ARIA role of the list.
pub const LIST_ROLE: &str = "listbox";
/// ARIA role of an item.
pub const ITEM_ROLE: &str = "option";
/// Accessible label of the list.
pub const LIST_LABEL: &str = "Reports";

/// Stable identifier of a panel item, usable as a DOM id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelItemId(u64);

impl fmt::Display for PanelItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item_{:x}", self.0)
    }
}

/// One entry of the panel.
#[derive(Debug, Clone)]
pub struct PanelItem {
    id: PanelItemId,
    report: Arc<Report>,
    access_keys: Vec<Option<char>>,
    selected: bool,
}

impl PanelItem {
    fn new(id: PanelItemId, report: Arc<Report>) -> Self {
        let access_keys = assign_access_keys(&report.actions);
        Self {
            id,
            report,
            access_keys,
            selected: false,
        }
    }

    /// Item id.
    pub fn id(&self) -> PanelItemId {
        self.id
    }

    /// The listed report.
    pub fn report(&self) -> &Arc<Report> {
        &self.report
    }

    /// Access keys of the report's actions.
    pub fn access_keys(&self) -> &[Option<char>] {
        &self.access_keys
    }

    /// Whether the item carries the selected state.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Display content.
    pub fn render(&self) -> RenderedReport {
        render_report(&self.report, true)
    }
}

/// A single list edit.
#[derive(Debug, Clone)]
pub enum PanelOp {
    /// Insert `report` at `index`.
    Insert {
        /// Position after all earlier operations.
        index: usize,
        /// Report to list.
        report: Arc<Report>,
    },
    /// Remove the item at `index`.
    Remove {
        /// Position after all earlier operations.
        index: usize,
    },
}

/// Edits turning the list `old` into `new`, comparing reports by identity.
///
/// Walks `new` in order. A report already listed further down is kept and the items skipped
/// over are removed; a report not listed is inserted. Whatever is left at the end is removed.
pub fn diff(old: &[Arc<Report>], new: &[Arc<Report>]) -> Vec<PanelOp> {
    let mut current: Vec<Arc<Report>> = old.to_vec();
    let mut ops = Vec::new();
    let mut i = 0;
    for report in new {
        match current[i..].iter().position(|r| Arc::ptr_eq(r, report)) {
            None => {
                current.insert(i, report.clone());
                ops.push(PanelOp::Insert {
                    index: i,
                    report: report.clone(),
                });
            }
            Some(skip) => {
                for _ in 0..skip {
                    current.remove(i);
                    ops.push(PanelOp::Remove { index: i });
                }
            }
        }
        i += 1;
    }
    while current.len() > i {
        current.pop();
        ops.push(PanelOp::Remove {
            index: current.len(),
        });
    }
    ops
}

/// What a sync did to the host-side list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelChange {
    /// A new item view was created at `index`.
    Inserted {
        /// Position.
        index: usize,
        /// New item.
        id: PanelItemId,
    },
    /// The item view at `index` was discarded.
    Removed {
        /// Position.
        index: usize,
        /// Discarded item.
        id: PanelItemId,
    },
}

/// Result of one panel sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelUpdate {
    /// List edits, in order.
    pub changes: Vec<PanelChange>,
    /// Item that just gained the selected state; scroll it into view.
    pub newly_selected: Option<PanelItemId>,
    /// Value for the list's `aria-activedescendant`.
    pub active_descendant: Option<PanelItemId>,
}

/// Keys the panel list responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKey {
    /// Close the panel.
    Escape,
    /// Previous item.
    ArrowUp,
    /// Previous item.
    PageUp,
    /// Next item.
    ArrowDown,
    /// Next item.
    PageDown,
    /// First item.
    Home,
    /// Last item.
    End,
    /// Back to the document.
    Enter,
    /// Action access key.
    Letter(char),
}

impl PanelKey {
    /// Parse a DOM `KeyboardEvent.key` value.
    pub fn from_key_name(name: &str) -> Option<Self> {
        let key = match name {
            "Escape" => PanelKey::Escape,
            "ArrowUp" => PanelKey::ArrowUp,
            "PageUp" => PanelKey::PageUp,
            "ArrowDown" => PanelKey::ArrowDown,
            "PageDown" => PanelKey::PageDown,
            "Home" => PanelKey::Home,
            "End" => PanelKey::End,
            "Enter" => PanelKey::Enter,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphabetic() => PanelKey::Letter(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKeyAction {
    /// Close the panel and focus the document.
    Close,
    /// Select the item at this index.
    Select(usize),
    /// Focus the document.
    FocusDocument,
    /// Run `action` of the report at `item`.
    InvokeAction {
        /// Item index.
        item: usize,
        /// Action index.
        action: usize,
    },
    /// Swallow the key without doing anything.
    Consume,
}

/// Panel items of an open panel.
#[derive(Debug, Clone, Default)]
pub struct PanelView {
    items: Vec<PanelItem>,
    next_id: u64,
}

impl PanelView {
    /// Open a panel showing `state`.
    pub fn open(state: &ReportState) -> (Self, PanelUpdate) {
        let mut panel = Self::default();
        let update = panel.sync(state);
        (panel, update)
    }

    /// Items in list order.
    pub fn items(&self) -> &[PanelItem] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the panel lists nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the selected item.
    pub fn selected_index(&self) -> Option<usize> {
        self.items.iter().position(|item| item.selected)
    }

    /// Id of the selected item.
    pub fn active_descendant(&self) -> Option<PanelItemId> {
        self.items.iter().find(|item| item.selected).map(|item| item.id)
    }

    /// Bring the items in line with `state`.
    pub fn sync(&mut self, state: &ReportState) -> PanelUpdate {
        let old: Vec<Arc<Report>> = self.items.iter().map(|item| item.report.clone()).collect();
        let new = state.reports();

        let mut changes = Vec::new();
        for op in diff(&old, &new) {
            match op {
                PanelOp::Insert { index, report } => {
                    let id = PanelItemId(self.next_id);
                    self.next_id += 1;
                    self.items.insert(index, PanelItem::new(id, report));
                    changes.push(PanelChange::Inserted { index, id });
                }
                PanelOp::Remove { index } => {
                    let item = self.items.remove(index);
                    changes.push(PanelChange::Removed { index, id: item.id });
                }
            }
        }

        let mut newly_selected = None;
        let mut marked = false;
        for item in &mut self.items {
            let selected = !marked && state.selected().is_some_and(|s| s.is(&item.report));
            if selected && !item.selected {
                newly_selected = Some(item.id);
            }
            marked |= selected;
            item.selected = selected;
        }

        PanelUpdate {
            changes,
            newly_selected,
            active_descendant: self.active_descendant(),
        }
    }

    /// Interpret a key press on the list.
    pub fn key_action(&self, key: PanelKey) -> Option<PanelKeyAction> {
        let len = self.items.len();
        let action = match key {
            PanelKey::Escape => PanelKeyAction::Close,
            PanelKey::ArrowUp | PanelKey::PageUp => {
                PanelKeyAction::Select((self.selected_index()? + len - 1) % len)
            }
            PanelKey::ArrowDown | PanelKey::PageDown => {
                PanelKeyAction::Select((self.selected_index()? + 1) % len)
            }
            PanelKey::Home if len > 0 => PanelKeyAction::Select(0),
            PanelKey::End if len > 0 => PanelKeyAction::Select(len - 1),
            PanelKey::Home | PanelKey::End => PanelKeyAction::Consume,
            PanelKey::Enter => PanelKeyAction::FocusDocument,
            PanelKey::Letter(c) => {
                let item = self.selected_index()?;
                match action_for_key(&self.items[item].access_keys, c) {
                    Some(action) => PanelKeyAction::InvokeAction { item, action },
                    None => PanelKeyAction::Consume,
                }
            }
        };
        Some(action)
    }
}

/// Scroll offset change that brings `item` into the visible list area.
///
/// `scale_y` is the ratio between on-screen and layout height of the list (1.0 when the editor
/// is not transformed). Positive values scroll down.
pub fn scroll_adjustment(item: Rect, visible: Rect, scale_y: f32) -> f32 {
    let scale_y = if scale_y > 0.0 { scale_y } else { 1.0 };
    if item.top < visible.top {
        -(visible.top - item.top) / scale_y
    } else if item.bottom > visible.bottom {
        (item.bottom - visible.bottom) / scale_y
    } else {
        0.0
    }
}
