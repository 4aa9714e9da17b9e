use iced::widget::image as iced_image;
use iced::widget::{
    button, column, container, horizontal_space, mouse_area, opaque, row, scrollable, stack, text,
};
use iced::{mouse, Alignment, ContentFit, Element, Length};
use iced_aw::Wrap;

use crate::state::controller::Controller;
use crate::state::data::{ConnectionStatus, Slot, UiState};
use crate::state::results::SlotImage;
use crate::ui::styles;
use crate::Message;

const SLOT_WIDTH: f32 = 320.0;
const SLOT_HEIGHT: f32 = 240.0;

/// Id of the results panel, used to scroll it into view
pub fn results_scroll_id() -> scrollable::Id {
    scrollable::Id::new("results")
}

/// Render the whole window from the controller state
pub fn view<'a>(controller: &'a Controller, endpoint: &'a str) -> Element<'a, Message> {
    let header = column![
        text("Image Processing Pipeline").size(40),
        text("Raw Image → Cleaning → Enhancement → Feature Extraction")
            .size(16)
            .style(text::secondary),
        status_badge(controller.connection(), endpoint),
    ]
    .spacing(10)
    .align_x(Alignment::Center);

    let body = match controller.ui() {
        UiState::Idle => drop_zone(controller.is_drag_over()),
        // Overlay is stacked on top of the drop zone below
        UiState::Loading => drop_zone(false),
        UiState::ShowingResults => results_panel(controller),
    };

    let content = container(
        column![header, body]
            .spacing(30)
            .padding(40)
            .align_x(Alignment::Center),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .center_x(Length::Fill);

    if controller.ui() == UiState::Loading {
        stack![content, loading_overlay()].into()
    } else {
        content.into()
    }
}

fn status_badge<'a>(status: &ConnectionStatus, endpoint: &'a str) -> Element<'a, Message> {
    let label = match status {
        ConnectionStatus::Connecting => "Connecting to Hub...",
        ConnectionStatus::Connected => "Connected to Hub",
        ConnectionStatus::Failed(_) => "Connection Error",
    };
    let accent = styles::status_color(status);

    let label = match accent {
        Some(color) => text(label).color(color),
        None => text(label).style(text::secondary),
    };

    container(
        row![label, text(endpoint).size(12).style(text::secondary)]
            .spacing(10)
            .align_y(Alignment::Center),
    )
    .padding([4, 14])
    .style(styles::badge(accent))
    .into()
}

fn drop_zone<'a>(drag_over: bool) -> Element<'a, Message> {
    let prompt = if drag_over {
        "Release to upload"
    } else {
        "Drag & drop an image here"
    };

    let content = column![
        text(prompt).size(22),
        text("or click to browse").size(14).style(text::secondary),
    ]
    .spacing(10)
    .align_x(Alignment::Center);

    mouse_area(
        container(content)
            .center_x(Length::Fixed(520.0))
            .center_y(Length::Fixed(260.0))
            .style(styles::drop_zone(drag_over)),
    )
    .on_press(Message::BrowseRequested)
    .interaction(mouse::Interaction::Pointer)
    .into()
}

fn results_panel(controller: &Controller) -> Element<'_, Message> {
    let title = match controller.selected_file() {
        Some(name) => format!("Results for {name}"),
        None => "Results".to_string(),
    };

    let heading = row![
        text(title).size(22),
        horizontal_space(),
        button("Process another image")
            .on_press(Message::Reset)
            .padding(10),
    ]
    .align_y(Alignment::Center);

    let cards: Vec<Element<'_, Message>> = Slot::ALL
        .iter()
        .map(|&slot| slot_card(slot, controller.slots().get(slot)))
        .collect();

    let grid = Wrap::with_elements(cards).spacing(20.0).line_spacing(20.0);

    scrollable(column![heading, grid].spacing(20).width(Length::Fill))
        .id(results_scroll_id())
        .height(Length::Fill)
        .into()
}

fn slot_card(slot: Slot, entry: &SlotImage) -> Element<'_, Message> {
    let preview: Element<'_, Message> = match (&entry.image, &entry.source) {
        (Some(handle), _) => iced_image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Contain)
            .into(),
        (None, Some(_)) if entry.failed => placeholder("Image unavailable"),
        (None, Some(_)) => placeholder("Loading..."),
        (None, None) => placeholder("No image yet"),
    };

    container(
        column![
            text(slot.label()).size(16),
            container(preview)
                .width(Length::Fixed(SLOT_WIDTH))
                .height(Length::Fixed(SLOT_HEIGHT)),
        ]
        .spacing(8),
    )
    .padding(12)
    .style(container::rounded_box)
    .into()
}

fn placeholder<'a>(label: &'a str) -> Element<'a, Message> {
    container(text(label).size(14).style(text::secondary))
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

fn loading_overlay<'a>() -> Element<'a, Message> {
    opaque(
        container(
            column![
                text("Processing image...").size(24),
                text("Waiting for the hosted pipeline").size(14),
            ]
            .spacing(8)
            .align_x(Alignment::Center),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(styles::overlay),
    )
}
