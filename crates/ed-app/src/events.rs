use ed_app::SessionEvent;

use crate::ui::UiEvent;

#[derive(Debug, Clone)]
pub enum EdEvent {
    Ui(UiEvent),
    Session(SessionEvent),
}
