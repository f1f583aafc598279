pub mod dialogs;
pub mod form_field;
pub mod keybindings;
pub mod palette;
pub mod terminal_guard;
pub mod wizard;

pub use dialogs::{render_alert, HelpDialog};
pub use palette::Palette;
pub use terminal_guard::{install_panic_hook, TerminalGuard};
pub use wizard::WizardView;

/// Flatten a rendered buffer into newline-separated rows
#[cfg(test)]
pub(crate) fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
