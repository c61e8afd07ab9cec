use crate::ui::tui::Tui;

/// Leaves the alternate screen before the default hook prints, and keeps a
/// copy of the panic in the log file.
pub fn set_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = Tui::restore();
        tracing::error!(panic = %panic_info, "player_panicked");
        hook(panic_info);
    }));
}
