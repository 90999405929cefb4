//! UI Components
//!
//! Board components. Drag wiring lives in `board_view`, lanes and cards only
//! register themselves as draggables and drop areas.

mod board_view;
mod column_lane;
mod task_card;
mod new_task_form;
mod filter_bar;
mod notice_toast;
mod log_panel;
mod delete_confirm_button;

pub use board_view::BoardView;
pub use column_lane::ColumnLane;
pub use task_card::TaskCard;
pub use new_task_form::NewTaskForm;
pub use filter_bar::FilterBar;
pub use notice_toast::NoticeToast;
pub use log_panel::LogPanel;
pub use delete_confirm_button::DeleteConfirmButton;
