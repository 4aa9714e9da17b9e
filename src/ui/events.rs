use iced::{event, window, Event};

use crate::Message;

/// Map OS drag-and-drop over the window to application messages
///
/// Every hovered and every dropped file arrives as its own event. The
/// controller keeps only the first drop after a hover.
pub fn window_event(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::FileHovered(_)) => Some(Message::FilesHovered),
        Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FilesHoveredLeft),
        Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        _ => None,
    }
}
