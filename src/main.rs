use iced::widget::{button, canvas, column, container, horizontal_space, row, text, text_input};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use chrono::Utc;

mod encoding;
mod presets;
mod provider;
mod state;
mod ui;

use encoding::EncodedImage;
use presets::{EditMode, PRESETS};
use provider::{GeminiClient, ProviderConfig, ProviderError};
use state::session::SessionState;
use ui::comparison::{Comparison, Layer};

/// A session image prepared for the renderer: the uploaded texture handle
/// plus the pixel dimensions the comparison view needs for letterboxing.
/// Cached so the view does not re-upload image bytes every frame.
struct CachedLayer {
    handle: iced::widget::image::Handle,
    width: u32,
    height: u32,
}

impl CachedLayer {
    fn new(image: &EncodedImage) -> Self {
        Self {
            handle: iced::widget::image::Handle::from_bytes(image.payload().to_vec()),
            width: image.width(),
            height: image.height(),
        }
    }

    fn layer(&self) -> Layer<'_> {
        Layer {
            handle: &self.handle,
            width: self.width,
            height: self.height,
        }
    }
}

/// Main application state
struct Lumina {
    /// The edit session state machine
    session: SessionState,
    /// Provider client, built once at startup from the environment
    client: GeminiClient,
    /// Free-text prompt for custom edits
    custom_prompt: String,
    /// Status line shown under the comparison view
    status: String,
    /// Renderer caches for the session images
    original_layer: Option<CachedLayer>,
    processed_layer: Option<CachedLayer>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the upload button
    UploadImage,
    /// Background file read finished
    ImageLoaded(Result<EncodedImage, String>),
    /// User clicked a style preset
    ApplyPreset(EditMode),
    /// User typed in the custom prompt field
    CustomPromptChanged(String),
    /// User submitted the custom prompt
    SubmitCustom,
    /// Provider call resolved for the original tagged with `tag`
    EditFinished {
        tag: u64,
        outcome: Result<EncodedImage, ProviderError>,
    },
    /// The comparison slider moved (state lives in the canvas widget; this
    /// only wakes the runtime so the drag renders continuously)
    SliderMoved(f32),
    /// User clicked the download button
    Download,
    /// Background export finished
    DownloadFinished(Result<String, String>),
    /// User clicked "New Image"
    NewImage,
}

impl Lumina {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = ProviderConfig::from_env();

        if config.has_credentials() {
            println!("🔮 Lumina ready (model: {})", config.model);
        } else {
            eprintln!("⚠️  GEMINI_API_KEY is not set; edit requests will fail until it is");
        }

        (
            Lumina {
                session: SessionState::new(),
                client: GeminiClient::new(config),
                custom_prompt: String::new(),
                status: String::from("Upload a photo to start."),
                original_layer: None,
                processed_layer: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::UploadImage => {
                let file = FileDialog::new()
                    .set_title("Choose an image to edit")
                    .add_filter("Images", &["png", "jpg", "jpeg", "webp", "gif", "bmp"])
                    .pick_file();

                if let Some(path) = file {
                    return Task::perform(load_image_async(path), Message::ImageLoaded);
                }

                Task::none()
            }

            Message::ImageLoaded(Ok(image)) => {
                println!(
                    "📷 Loaded image: {} ({}x{})",
                    image.media_type(),
                    image.width(),
                    image.height()
                );
                self.apply_session(self.session.upload(image));
                self.status = String::from("Select a style to begin.");
                Task::none()
            }

            Message::ImageLoaded(Err(message)) => {
                self.status = format!("⚠️ {message}");
                Task::none()
            }

            Message::ApplyPreset(mode) => self.submit(mode),

            Message::CustomPromptChanged(value) => {
                self.custom_prompt = value;
                Task::none()
            }

            Message::SubmitCustom => self.submit(EditMode::Custom),

            Message::EditFinished { tag, outcome } => {
                if tag != self.session.generation() {
                    // The original this edit targeted is gone; drop it
                    println!("🗑  Discarding stale edit result");
                    return Task::none();
                }

                let succeeded = outcome.is_ok();
                self.apply_session(
                    self.session
                        .finish(tag, outcome.map_err(|e| e.to_string())),
                );

                self.status = if succeeded {
                    let style = self
                        .session
                        .active_style()
                        .map(EditMode::label)
                        .unwrap_or("Edit");
                    format!("✨ {style} ready. Drag the slider to compare.")
                } else {
                    String::from("⚠️ Edit failed.")
                };

                Task::none()
            }

            Message::SliderMoved(_) => Task::none(),

            Message::Download => {
                let Some(image) = self.session.processed().cloned() else {
                    return Task::none();
                };

                let file_name = format!(
                    "lumina-edit-{}.{}",
                    Utc::now().format("%Y%m%d-%H%M%S"),
                    image.file_extension()
                );

                let file = FileDialog::new()
                    .set_title("Save edited image")
                    .set_file_name(file_name)
                    .save_file();

                if let Some(path) = file {
                    return Task::perform(save_image_async(path, image), Message::DownloadFinished);
                }

                Task::none()
            }

            Message::DownloadFinished(Ok(path)) => {
                self.status = format!("💾 Saved to {path}");
                Task::none()
            }

            Message::DownloadFinished(Err(message)) => {
                self.status = format!("⚠️ {message}");
                Task::none()
            }

            Message::NewImage => {
                self.apply_session(self.session.reset());
                self.custom_prompt.clear();
                self.status = String::from("Upload a photo to start.");
                Task::none()
            }
        }
    }

    /// Boundary for every submission: rejects re-entrant submits while a
    /// request is in flight, resolves the prompt (catalog or custom), and
    /// only then lets the state machine enter the in-flight state.
    fn submit(&mut self, mode: EditMode) -> Task<Message> {
        if self.session.in_flight() {
            return Task::none();
        }

        let Some(original) = self.session.original().cloned() else {
            return Task::none();
        };

        let Some(prompt) = presets::resolve_prompt(mode, &self.custom_prompt) else {
            // Blank custom prompt: surfaced inline, no request, no error
            // recorded in the session
            self.status = String::from("✏️ Enter a prompt for the custom edit first.");
            return Task::none();
        };

        self.apply_session(self.session.begin(mode));
        self.status = format!("{} in progress...", mode.label());

        let tag = self.session.generation();
        let client = self.client.clone();

        Task::perform(
            async move { client.request_edit(&original, &prompt).await },
            move |outcome| Message::EditFinished { tag, outcome },
        )
    }

    /// Swap in the next session state, refreshing renderer caches only for
    /// the images that actually changed (states are replaced wholesale on
    /// every transition, so plain comparison detects the change).
    fn apply_session(&mut self, next: SessionState) {
        if next.original() != self.session.original() {
            self.original_layer = next.original().map(CachedLayer::new);
        }
        if next.processed() != self.session.processed() {
            self.processed_layer = next.processed().map(CachedLayer::new);
        }
        self.session = next;
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let content = if self.session.is_empty() {
            self.view_landing()
        } else {
            self.view_editor()
        };

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    /// Upload landing screen
    fn view_landing(&self) -> Element<Message> {
        column![
            text("🔮 Lumina").size(48).shaping(text::Shaping::Advanced),
            text("Reimagine your photos with AI magic.").size(18),
            button(text("📂 Upload Image").size(18).shaping(text::Shaping::Advanced))
                .on_press(Message::UploadImage)
                .padding(14),
            text("Supports JPG, PNG, WEBP").size(13),
            text(&self.status).size(14).shaping(text::Shaping::Advanced),
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center)
        .into()
    }

    /// Editor screen: comparison view on the left, controls on the right
    fn view_editor(&self) -> Element<Message> {
        let header = row![
            text("🔮 Lumina").size(24).shaping(text::Shaping::Advanced),
            horizontal_space(),
            button(text("🔄 New Image").shaping(text::Shaping::Advanced)).on_press(Message::NewImage).padding(8),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let comparison: Element<Message> = match &self.original_layer {
            Some(original) => canvas(Comparison::new(
                original.layer(),
                self.processed_layer.as_ref().map(CachedLayer::layer),
                self.session.in_flight(),
                self.session.pair_token(),
            ))
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
            None => text("No image loaded").into(),
        };

        let hint = if self.session.has_comparison() {
            "Drag the slider to compare"
        } else {
            "Select a style to begin"
        };

        let mut action_bar = row![text(hint).size(14), horizontal_space()]
            .spacing(10)
            .align_y(Alignment::Center);

        if self.session.has_comparison() {
            action_bar = action_bar.push(
                button(text("💾 Download").shaping(text::Shaping::Advanced))
                    .on_press(Message::Download)
                    .padding(8),
            );
        }

        let status = text(&self.status).size(14).shaping(text::Shaping::Advanced);
        let mut left = column![comparison, action_bar, status]
            .spacing(12)
            .width(Length::FillPortion(2));

        if let Some(error) = self.session.error() {
            left = left.push(
                text(format!("Error: {error}"))
                    .size(14)
                    .color(iced::Color::from_rgb(0.95, 0.45, 0.45)),
            );
        }

        let right = column![self.view_presets(), self.view_custom_prompt()]
            .spacing(24)
            .width(Length::FillPortion(1));

        column![header, row![left, right].spacing(24)]
            .spacing(16)
            .padding(20)
            .into()
    }

    /// The preset buttons, disabled while a request is in flight
    fn view_presets(&self) -> Element<Message> {
        let mut presets = column![text("Creative Styles").size(18)].spacing(10);

        for preset in &PRESETS {
            let label = row![
                text(preset.icon.glyph()).size(20).shaping(text::Shaping::Advanced),
                column![
                    text(preset.label).size(15),
                    text(preset.description).size(12),
                ]
                .spacing(2),
            ]
            .spacing(12)
            .align_y(Alignment::Center);

            let style = if self.session.active_style() == Some(preset.mode) {
                button::primary
            } else {
                button::secondary
            };

            presets = presets.push(
                button(label)
                    .on_press_maybe(
                        (!self.session.in_flight()).then_some(Message::ApplyPreset(preset.mode)),
                    )
                    .style(style)
                    .width(Length::Fill)
                    .padding(10),
            );
        }

        presets.into()
    }

    /// Custom prompt input with its submit button
    fn view_custom_prompt(&self) -> Element<Message> {
        let can_submit = !self.session.in_flight() && !self.custom_prompt.trim().is_empty();

        column![
            text("Custom Edit").size(18),
            text_input(
                "E.g. 'Make it look like a cyberpunk city'",
                &self.custom_prompt,
            )
            .on_input(Message::CustomPromptChanged)
            .on_submit(Message::SubmitCustom)
            .padding(10),
            button(text("🔮 Generate Custom").size(15).shaping(text::Shaping::Advanced))
                .on_press_maybe(can_submit.then_some(Message::SubmitCustom))
                .width(Length::Fill)
                .padding(10),
        ]
        .spacing(10)
        .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    iced::application("Lumina", Lumina::update, Lumina::view)
        .theme(Lumina::theme)
        .centered()
        .run_with(Lumina::new)
}

/// Read an image file and validate it into an `EncodedImage`.
/// The media type comes from the sniffed bytes, not the file extension.
async fn load_image_async(path: PathBuf) -> Result<EncodedImage, String> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Could not read {}: {e}", path.display()))?;

    let format = image::guess_format(&bytes)
        .map_err(|_| format!("{} is not a supported image file", path.display()))?;

    EncodedImage::new(format.to_mime_type(), bytes).map_err(|e| e.to_string())
}

/// Write the processed image's bytes to the chosen location
async fn save_image_async(path: PathBuf, image: EncodedImage) -> Result<String, String> {
    tokio::fs::write(&path, image.payload())
        .await
        .map_err(|e| format!("Failed to save: {e}"))?;

    println!("💾 Exported edit to {}", path.display());
    Ok(path.display().to_string())
}
