use iced::widget::image::Handle as ImageHandle;
use iced::widget::scrollable::{self, RelativeOffset};
use iced::{event, Element, Subscription, Task, Theme};
use rfd::MessageLevel;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod media;
mod remote;
mod state;
mod ui;

use state::controller::Controller;
use state::data::{Slot, UploadedFile};
use state::results::ResultSet;

/// Main application state
struct PipelineViewer {
    /// Upload/render state machine
    controller: Controller,
    /// Loaded settings (endpoint is shown next to the status badge)
    settings: config::Settings,
    /// Shared HTTP client for loading result images
    http: reqwest::Client,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Startup connection finished
    Connected(Result<remote::Handle, String>),
    /// User clicked the drop zone
    BrowseRequested,
    /// A file was picked in the dialog or an accepted drop
    FileChosen(PathBuf),
    /// A file was dropped on the window
    FileDropped(PathBuf),
    /// Background file read finished
    FileRead(Result<UploadedFile, String>),
    /// Files are being dragged over the window
    FilesHovered,
    /// Drag left the window without dropping
    FilesHoveredLeft,
    /// Inference call finished
    RequestFinished(Result<ResultSet, String>),
    /// One result image finished loading
    SlotLoaded(Slot, String, Result<Vec<u8>, String>),
    /// User clicked "Process another image"
    Reset,
}

impl PipelineViewer {
    /// Create the application and start connecting in the background
    fn new() -> (Self, Task<Message>) {
        let settings = config::Settings::load();

        let connect = Task::perform(remote::connect(settings.clone()), |result| {
            Message::Connected(result.map_err(|e| e.to_string()))
        });

        (
            PipelineViewer {
                controller: Controller::new(),
                settings,
                http: reqwest::Client::new(),
            },
            connect,
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Connected(Ok(handle)) => {
                self.controller.on_connected(handle);
                Task::none()
            }
            Message::Connected(Err(reason)) => {
                let err = self.controller.on_connection_failed(reason);
                error!(%err, "Inference endpoint unavailable");
                Task::none()
            }
            Message::BrowseRequested => {
                if self.controller.is_loading() {
                    return Task::none();
                }
                match media::upload::pick_image() {
                    Some(path) => self.update(Message::FileChosen(path)),
                    None => Task::none(),
                }
            }
            Message::FileChosen(path) => {
                self.controller.drag_leave();
                match self.controller.check_ready() {
                    Ok(true) => Task::perform(media::upload::read_upload(path), Message::FileRead),
                    Ok(false) => Task::none(),
                    Err(err) => {
                        warn!(%err, "Selection rejected");
                        ui::notice::show(&err);
                        Task::none()
                    }
                }
            }
            Message::FileDropped(path) => {
                if self.controller.accept_drop() {
                    self.update(Message::FileChosen(path))
                } else {
                    Task::none()
                }
            }
            Message::FileRead(Ok(file)) => self.select_file(file),
            Message::FileRead(Err(reason)) => {
                error!(%reason, "Could not read selected file");
                ui::notice::show_message(MessageLevel::Error, &reason);
                Task::none()
            }
            Message::FilesHovered => {
                self.controller.drag_enter();
                Task::none()
            }
            Message::FilesHoveredLeft => {
                self.controller.drag_leave();
                Task::none()
            }
            Message::RequestFinished(Ok(results)) => {
                let assigned = self.controller.on_request_complete(&results);
                info!(slots = assigned.len(), "Displaying results");

                let loads = assigned.into_iter().map(|(slot, source)| {
                    let http = self.http.clone();
                    Task::perform(
                        media::source::load_image_source(http, source.clone()),
                        move |result| {
                            Message::SlotLoaded(slot, source.clone(), result.map_err(|e| e.to_string()))
                        },
                    )
                });
                let reveal = scrollable::snap_to(ui::results_scroll_id(), RelativeOffset::START);

                Task::batch(loads.chain(std::iter::once(reveal)))
            }
            Message::RequestFinished(Err(reason)) => {
                let err = self.controller.on_request_failure(reason);
                error!(%err, "Processing failed");
                ui::notice::show(&err);
                Task::none()
            }
            Message::SlotLoaded(slot, source, Ok(bytes)) => {
                self.controller
                    .on_slot_loaded(slot, &source, Ok(ImageHandle::from_bytes(bytes)));
                Task::none()
            }
            Message::SlotLoaded(slot, source, Err(reason)) => {
                warn!(?slot, %reason, "Could not load result image");
                self.controller.on_slot_loaded(slot, &source, Err(reason));
                Task::none()
            }
            Message::Reset => {
                self.controller.reset();
                Task::none()
            }
        }
    }

    /// Run the controller's file checks and send the request if accepted
    fn select_file(&mut self, file: UploadedFile) -> Task<Message> {
        match self.controller.select_file(file) {
            Ok(Some(request)) => Task::perform(request.send(), |result| {
                Message::RequestFinished(result.map_err(|e| e.to_string()))
            }),
            Ok(None) => Task::none(),
            Err(err) => {
                warn!(%err, "Selection rejected");
                ui::notice::show(&err);
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        ui::view(&self.controller, &self.settings.endpoint)
    }

    /// Listen for files dragged onto the window
    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(ui::events::window_event)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🎨 Image Pipeline Viewer starting");

    iced::application(
        "Image Processing Pipeline",
        PipelineViewer::update,
        PipelineViewer::view,
    )
    .subscription(PipelineViewer::subscription)
    .theme(PipelineViewer::theme)
    .centered()
    .run_with(PipelineViewer::new)
}
