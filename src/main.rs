use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, text, text_input};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{error, info, warn};

mod error;
mod offline;
mod roster;
mod state;
mod ui;

use roster::filter::FilterOutcome;
use roster::loader::{self, DetailCache, LoadedRoster};
use state::photos::PhotoCache;
use state::settings::Settings;
use ui::photo::{thumbnail_handle, IMAGE_EXTENSIONS};
use ui::view_model::{CardAction, DetailModal, RosterView};

/// Main application state
struct RosterBrowser {
    settings: Settings,
    /// None when the photo database could not be opened
    photos: Option<PhotoCache>,
    /// Cards and filter index for the current roster
    roster_view: RosterView,
    /// Raw detail documents for the current roster
    details: DetailCache,
    /// Card thumbnails keyed by locomotive id
    thumbnails: HashMap<String, Handle>,
    query: String,
    outcome: FilterOutcome,
    modal: Option<DetailModal>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked "Open Roster Folder"
    OpenFolder,
    /// User clicked "Sync" (networked roster)
    SyncNetwork,
    /// Background load finished
    RosterLoaded(Result<LoadedRoster, String>),
    /// Search box changed
    QueryChanged(String),
    /// An action registered on a roster card
    Card(CardAction),
    CloseDetails,
}

impl RosterBrowser {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();

        let photos = match PhotoCache::new() {
            Ok(photos) => {
                info!("🎨 Roster browser initialized with {} photos", photos.count().unwrap_or(0));
                Some(photos)
            }
            Err(e) => {
                warn!("⚠️  {} - photos will not be shown", e);
                None
            }
        };

        let mut app = RosterBrowser {
            settings,
            photos,
            roster_view: RosterView::default(),
            details: DetailCache::default(),
            thumbnails: HashMap::new(),
            query: String::new(),
            outcome: FilterOutcome::default(),
            modal: None,
            status: "Open a JMRI roster folder to begin.".to_string(),
        };

        let task = if app.settings.roster_url.is_some() {
            app.sync_task()
        } else {
            match app.settings.last_folder.clone().filter(|f| f.is_dir()) {
                Some(folder) => app.folder_task(folder),
                None => Task::none(),
            }
        };

        (app, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFolder => {
                // Show the native folder picker dialog
                let folder = FileDialog::new()
                    .set_title("Select JMRI Roster Folder")
                    .pick_folder();

                if let Some(folder) = folder {
                    self.settings.last_folder = Some(folder.clone());
                    if let Err(e) = self.settings.save() {
                        warn!("⚠️  Could not save settings: {}", e);
                    }
                    return self.folder_task(folder);
                }

                Task::none()
            }
            Message::SyncNetwork => {
                if self.settings.roster_url.is_none() {
                    self.status = "No roster URL configured.".to_string();
                    return Task::none();
                }
                self.sync_task()
            }
            Message::RosterLoaded(Ok(roster)) => {
                self.status = roster.status_line();
                self.roster_view = RosterView::from_groups(&roster.groups);
                self.details = roster.details;
                self.outcome = self.roster_view.filter(&self.query);
                self.load_thumbnails();
                Task::none()
            }
            Message::RosterLoaded(Err(message)) => {
                error!("❌ {}", message);
                self.status = format!("❌ {}", message);
                Task::none()
            }
            Message::QueryChanged(query) => {
                self.outcome = self.roster_view.filter(&query);
                self.query = query;
                Task::none()
            }
            Message::Card(CardAction::ShowDetails(file_name)) => {
                self.modal = Some(match self.details.detail(&file_name) {
                    Ok(detail) => DetailModal::Loaded(detail),
                    Err(e) => {
                        warn!("⚠️  {}", e);
                        DetailModal::NotFound(e.to_string())
                    }
                });
                Task::none()
            }
            Message::Card(CardAction::AttachPhoto(id)) => {
                self.attach_photo(&id);
                Task::none()
            }
            Message::CloseDetails => {
                self.modal = None;
                Task::none()
            }
        }
    }

    fn folder_task(&mut self, folder: PathBuf) -> Task<Message> {
        self.status = "Syncing...".to_string();
        Task::perform(
            async move { loader::load_from_folder(folder).await.map_err(|e| e.to_string()) },
            Message::RosterLoaded,
        )
    }

    fn sync_task(&mut self) -> Task<Message> {
        self.status = "Syncing...".to_string();
        let settings = self.settings.clone();
        Task::perform(
            async move { loader::sync_roster(settings).await.map_err(|e| e.to_string()) },
            Message::RosterLoaded,
        )
    }

    /// Load stored photos for every locomotive on screen
    fn load_thumbnails(&mut self) {
        self.thumbnails.clear();
        let Some(photos) = &self.photos else {
            return;
        };

        for id in self.roster_view.locomotive_ids() {
            match photos.get(&id) {
                Ok(Some(record)) => {
                    if let Some(handle) = thumbnail_handle(&record.image_blob) {
                        self.thumbnails.insert(id, handle);
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("⚠️  Could not read photo for {}: {}", id, e),
            }
        }
    }

    /// Pick an image file and store it as the photo for `id`
    fn attach_photo(&mut self, id: &str) {
        let Some(path) = FileDialog::new()
            .set_title(format!("Photo for {}", id))
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };

        let blob = match std::fs::read(&path) {
            Ok(blob) => blob,
            Err(e) => {
                warn!("⚠️  Could not read {}: {}", path.display(), e);
                return;
            }
        };

        let Some(photos) = &self.photos else {
            warn!("⚠️  Photo storage unavailable, {} not saved", path.display());
            return;
        };

        if let Err(e) = photos.put(id, &blob) {
            warn!("⚠️  {}", e);
            return;
        }

        match thumbnail_handle(&blob) {
            Some(handle) => {
                self.thumbnails.insert(id.to_string(), handle);
                info!("📸 Saved photo for {}", id);
            }
            None => {
                self.thumbnails.remove(id);
                warn!("⚠️  Saved photo for {} is not a decodable image", id);
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let mut toolbar = row![
            text("Loco Roster").size(32),
            text_input("Search by id, road or model...", &self.query)
                .on_input(Message::QueryChanged)
                .padding(10)
                .width(Length::Fill),
            text(format!(
                "{} of {} shown",
                self.outcome.visible_count,
                self.roster_view.entry_count()
            ))
            .size(16),
            button("Open Roster Folder")
                .on_press(Message::OpenFolder)
                .padding(10),
        ]
        .spacing(16)
        .align_y(Alignment::Center);

        if self.settings.roster_url.is_some() {
            toolbar = toolbar.push(button("Sync").on_press(Message::SyncNetwork).padding(10));
        }

        let content = column![
            toolbar,
            text(&self.status).size(14),
            ui::card::roster_grid(&self.roster_view, &self.outcome, &self.thumbnails),
        ]
        .spacing(16)
        .padding(20);

        let base: Element<Message> = container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into();

        match &self.modal {
            Some(modal) => ui::card::modal(base, ui::card::details_panel(modal), Message::CloseDetails),
            None => base,
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    iced::application("Loco Roster", RosterBrowser::update, RosterBrowser::view)
        .theme(RosterBrowser::theme)
        .centered()
        .run_with(RosterBrowser::new)
}
