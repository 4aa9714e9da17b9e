/// Styling for the connection badge, drop zone and loading overlay

use iced::widget::container;
use iced::{Border, Color, Theme};

use crate::state::data::ConnectionStatus;

/// "Connected" affordance
pub const CONNECTED: Color = Color::from_rgb(0.133, 0.773, 0.369);
/// "Error" affordance (#ef4444)
pub const ERROR: Color = Color::from_rgb(0.937, 0.267, 0.267);

/// Accent color for a connection status, `None` while still connecting
pub fn status_color(status: &ConnectionStatus) -> Option<Color> {
    match status {
        ConnectionStatus::Connecting => None,
        ConnectionStatus::Connected => Some(CONNECTED),
        ConnectionStatus::Failed(_) => Some(ERROR),
    }
}

/// Pill-shaped border around the status text
pub fn badge(accent: Option<Color>) -> impl Fn(&Theme) -> container::Style {
    move |theme: &Theme| {
        let palette = theme.extended_palette();
        container::Style {
            border: Border {
                color: accent.unwrap_or(palette.background.strong.color),
                width: 1.0,
                radius: 12.0.into(),
            },
            ..container::Style::default()
        }
    }
}

/// Dashed-looking drop target, highlighted while files hover over the window
pub fn drop_zone(drag_over: bool) -> impl Fn(&Theme) -> container::Style {
    move |theme: &Theme| {
        let palette = theme.extended_palette();
        let (border_color, background) = if drag_over {
            let tint = Color {
                a: 0.15,
                ..palette.primary.base.color
            };
            (palette.primary.strong.color, Some(tint.into()))
        } else {
            (palette.background.strong.color, None)
        };

        container::Style {
            background,
            border: Border {
                color: border_color,
                width: 2.0,
                radius: 16.0.into(),
            },
            ..container::Style::default()
        }
    }
}

/// Dimmed full-window layer shown while a request is in flight
pub fn overlay(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(
            Color {
                a: 0.75,
                ..Color::BLACK
            }
            .into(),
        ),
        text_color: Some(Color::WHITE),
        ..container::Style::default()
    }
}
