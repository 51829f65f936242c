use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Borders;

/// Visual settings for the render shell.
#[derive(Clone, Debug)]
pub struct ExpandableListStyle<'a> {
    pub title: Option<Line<'a>>,
    pub block_style: Style,
    pub border_style: Style,
    /// Applied to the selected group row and its children.
    pub highlight_style: Style,
    pub borders: Borders,
}

impl Default for ExpandableListStyle<'_> {
    fn default() -> Self {
        Self {
            title: None,
            block_style: Style::default(),
            border_style: Style::default(),
            highlight_style: Style::default().add_modifier(Modifier::REVERSED),
            borders: Borders::ALL,
        }
    }
}
