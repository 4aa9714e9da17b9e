/// User interface
///
/// - `view.rs` - pure render function over the controller state
/// - `styles.rs` - badge, drop zone and overlay styling
/// - `events.rs` - window drag-and-drop events mapped to messages
/// - `notice.rs` - modal notices for rejected or failed uploads

pub mod events;
pub mod notice;
pub mod styles;
pub mod view;

pub use view::{results_scroll_id, view};
