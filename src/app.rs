//! Application state management for Duaread
//!
//! This module contains the main application state, handling keyboard input,
//! content loading, favorites, playback records, and state transitions
//! between the list and detail views.

use std::collections::BTreeSet;
use std::io;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::warn;

use crate::cli::StartupConfig;
use crate::data::{Dua, Subcategory};
use crate::loader::{ConnectivityProbe, ContentBundle, ContentLoader, LoadOutcome};
use crate::net::{ApiRoutes, HttpClient, OfflineProbe, TcpProbe};
use crate::playback::{PlaybackError, PlaybackRegistry, PlaybackStatus, SystemAudioLauncher};
use crate::share;
use crate::store::StoreManager;

/// Store key holding the favorites set; the loader only ever writes
/// `subcategory_*` keys, so this never collides with cached content.
const FAVORITES_KEY: &str = "favorites";

/// How long a toast stays on screen
const TOAST_TTL: Duration = Duration::from_millis(2500);

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while content is being fetched
    Loading,
    /// List view showing the subcategory's duas
    DuaList,
    /// Detail view for a single dua, by index into the full item list
    DuaDetail(usize),
    /// Terminal no-data state with the user-visible reason
    LoadFailed(String),
}

/// Which slice of the item list the list view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    All,
    Favorites,
}

/// Where the currently rendered content came from
#[derive(Debug, Clone, PartialEq)]
pub enum ContentSource {
    /// Straight from the network this session
    Network,
    /// Served from the local store
    OfflineCopy { since: Option<DateTime<Utc>> },
}

/// Transient status message with an explicit deadline
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    expires_at: Instant,
}

impl Toast {
    fn new(message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Active tab in the list view
    pub tab: Tab,
    /// Index of the selected row within the visible (tab-filtered) list
    pub selected_index: usize,
    /// Scroll offset for the detail view
    pub detail_scroll_offset: u16,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Subcategory metadata of the loaded content
    pub subcategory: Subcategory,
    /// Loaded dua items, in remote order
    pub duas: Vec<Dua>,
    /// Provenance of the rendered content, if any is loaded
    pub source: Option<ContentSource>,
    /// Favorite keys, persisted through the store
    pub favorites: BTreeSet<String>,
    /// Per-item recitation records
    pub playback: PlaybackRegistry,
    /// Transient status message
    pub toast: Option<Toast>,
    /// Timestamp of the last completed load
    pub last_refresh: Option<DateTime<Local>>,
    /// Flag indicating a refresh has been requested
    refresh_requested: bool,
    /// Subcategory id this reader session is for
    content_key: String,
    loader: ContentLoader<HttpClient, StoreManager, Box<dyn ConnectivityProbe>>,
    store: StoreManager,
    audio: SystemAudioLauncher,
}

impl App {
    /// Creates a new App from startup configuration, using the platform
    /// data directory for the store
    pub fn new(config: StartupConfig) -> Self {
        let store = StoreManager::new()
            .unwrap_or_else(|| StoreManager::with_dir(std::env::temp_dir().join("duaread")));
        Self::with_store(config, store)
    }

    /// Creates a new App with a specific store location
    pub fn with_store(config: StartupConfig, store: StoreManager) -> Self {
        let routes = match &config.api_base {
            Some(base) => ApiRoutes::new(base.clone()),
            None => ApiRoutes::default(),
        };
        let probe: Box<dyn ConnectivityProbe> = if config.offline {
            Box::new(OfflineProbe)
        } else {
            Box::new(TcpProbe::from_base_url(routes.base()))
        };
        let loader = ContentLoader::new(HttpClient::new(), store.clone(), probe, routes);

        let favorites: BTreeSet<String> = store
            .read_json::<Vec<String>>(FAVORITES_KEY)
            .unwrap_or_default()
            .into_iter()
            .collect();

        Self {
            state: AppState::Loading,
            tab: Tab::All,
            selected_index: 0,
            detail_scroll_offset: 0,
            show_help: false,
            should_quit: false,
            subcategory: Subcategory::default(),
            duas: Vec::new(),
            source: None,
            favorites,
            playback: PlaybackRegistry::new(),
            toast: None,
            last_refresh: None,
            refresh_requested: false,
            content_key: config.subcategory,
            loader,
            store,
            audio: SystemAudioLauncher,
        }
    }

    /// Loads the configured subcategory
    pub async fn load_content(&mut self) {
        let outcome = self.loader.load(&self.content_key).await;
        self.apply_outcome(outcome);
    }

    /// Manual retry, triggered by the user from the failure screen
    pub async fn retry_content(&mut self) {
        let outcome = self.loader.retry(&self.content_key).await;
        self.apply_outcome(outcome);
    }

    /// Re-runs the appropriate load for the current state
    pub async fn refresh(&mut self) {
        if matches!(self.state, AppState::LoadFailed(_)) {
            self.retry_content().await;
        } else {
            self.load_content().await;
        }
    }

    /// Consumes a pending refresh request, if any
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    /// Drops expired transient state; called once per event-loop pass
    pub fn tick(&mut self) {
        if self.toast.as_ref().is_some_and(Toast::expired) {
            self.toast = None;
        }
    }

    fn apply_outcome(&mut self, outcome: LoadOutcome) {
        match outcome {
            LoadOutcome::Fresh(bundle) => {
                self.install_bundle(bundle);
                self.source = Some(ContentSource::Network);
                self.finish_load();
            }
            LoadOutcome::Cached(bundle) => {
                let since = self.loader.cached_since(&self.content_key);
                self.install_bundle(bundle);
                self.source = Some(ContentSource::OfflineCopy { since });
                self.finish_load();
            }
            LoadOutcome::Unavailable(reason) => {
                if self.duas.is_empty() {
                    self.state = AppState::LoadFailed(reason);
                } else {
                    // Keep what is on screen; the failure only rates a toast.
                    self.show_toast(reason);
                }
            }
        }
    }

    fn install_bundle(&mut self, bundle: ContentBundle) {
        self.subcategory = Subcategory::from_value(&bundle.metadata);
        self.duas = bundle.items.iter().map(Dua::from_value).collect();
        self.clamp_selection();
    }

    fn finish_load(&mut self) {
        self.last_refresh = Some(Local::now());
        match self.state {
            AppState::DuaDetail(index) if index < self.duas.len() => {}
            _ => self.state = AppState::DuaList,
        }
    }

    /// Global indices of the items the active tab shows, in list order
    pub fn visible_indices(&self) -> Vec<usize> {
        match self.tab {
            Tab::All => (0..self.duas.len()).collect(),
            Tab::Favorites => self
                .duas
                .iter()
                .enumerate()
                .filter(|(_, dua)| self.favorites.contains(&dua.favorite_key()))
                .map(|(i, _)| i)
                .collect(),
        }
    }

    /// Global index of the selected row, if the visible list is non-empty
    pub fn selected_global_index(&self) -> Option<usize> {
        self.visible_indices().get(self.selected_index).copied()
    }

    /// The dua an action applies to: the open detail item, else the
    /// selected list row
    fn active_dua_index(&self) -> Option<usize> {
        match self.state {
            AppState::DuaDetail(index) if index < self.duas.len() => Some(index),
            _ => self.selected_global_index(),
        }
    }

    pub fn is_favorite(&self, dua: &Dua) -> bool {
        self.favorites.contains(&dua.favorite_key())
    }

    fn clamp_selection(&mut self) {
        let visible = self.visible_indices().len();
        if visible == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= visible {
            self.selected_index = visible - 1;
        }
    }

    fn move_selection_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    fn move_selection_down(&mut self) {
        let visible = self.visible_indices().len();
        if visible > 0 && self.selected_index < visible - 1 {
            self.selected_index += 1;
        }
    }

    fn switch_tab(&mut self) {
        self.tab = match self.tab {
            Tab::All => Tab::Favorites,
            Tab::Favorites => Tab::All,
        };
        self.selected_index = 0;
    }

    /// Steps the open detail view to the previous/next visible item
    fn step_detail(&mut self, delta: i64) {
        let AppState::DuaDetail(current) = self.state else {
            return;
        };
        let visible = self.visible_indices();
        let Some(position) = visible.iter().position(|&i| i == current) else {
            return;
        };
        let next = position as i64 + delta;
        if next >= 0 && (next as usize) < visible.len() {
            self.state = AppState::DuaDetail(visible[next as usize]);
            self.selected_index = next as usize;
            self.detail_scroll_offset = 0;
        }
    }

    fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message, TOAST_TTL));
    }

    /// Toggles the favorite flag of the active dua and persists the set
    fn toggle_favorite(&mut self) {
        let Some(index) = self.active_dua_index() else {
            return;
        };
        let key = self.duas[index].favorite_key();

        let added = if self.favorites.contains(&key) {
            self.favorites.remove(&key);
            false
        } else {
            self.favorites.insert(key);
            true
        };

        let list: Vec<&String> = self.favorites.iter().collect();
        if let Err(err) = self.store.write_json(FAVORITES_KEY, &list) {
            warn!(error = %err, "favorites write skipped");
        }

        self.show_toast(if added {
            "Added to favorites"
        } else {
            "Removed from favorites"
        });
        self.clamp_selection();
    }

    /// Copies the active dua's share card to the clipboard
    fn copy_active(&mut self) {
        let Some(index) = self.active_dua_index() else {
            return;
        };
        let card = share::dua_card_text(&self.subcategory, &self.duas[index]);
        match share::copy_to_clipboard(&mut io::stdout(), &card) {
            Ok(()) => self.show_toast("Copied to clipboard"),
            Err(err) => {
                warn!(error = %err, "clipboard write failed");
                self.show_toast("Copy failed");
            }
        }
    }

    /// Starts or clears the recitation of the active dua
    fn toggle_playback(&mut self) {
        let Some(index) = self.active_dua_index() else {
            return;
        };
        let (key, audio) = {
            let dua = &self.duas[index];
            (dua.favorite_key(), dua.audio.clone())
        };

        match self.playback.toggle(&key, audio.as_deref(), &self.audio) {
            Ok(PlaybackStatus::Playing) => self.show_toast("Playing recitation"),
            Ok(PlaybackStatus::Idle) => self.show_toast("Playback cleared"),
            Err(PlaybackError::NoAudio) => self.show_toast("No recitation for this dua"),
            Err(err) => {
                warn!(error = %err, "recitation launch failed");
                self.show_toast("Could not start recitation");
            }
        }
    }

    fn scroll_detail_down(&mut self) {
        self.detail_scroll_offset = self.detail_scroll_offset.saturating_add(1);
    }

    fn scroll_detail_up(&mut self) {
        self.detail_scroll_offset = self.detail_scroll_offset.saturating_sub(1);
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit (Esc also quits from the list)
    /// - `Up`/`k`, `Down`/`j`: Move selection / scroll detail
    /// - `Enter`: Open selected dua
    /// - `Esc` (in detail): Back to list
    /// - `Tab`: Switch All/Favorites
    /// - `f`: Toggle favorite, `c`: Copy card, `p`: Play/clear recitation
    /// - `r`: Refresh (retry on the failure screen)
    /// - `?`: Help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.state.clone() {
            AppState::Loading => {
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::DuaList => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection_down();
                }
                KeyCode::Char('g') => {
                    self.selected_index = 0;
                }
                KeyCode::Char('G') => {
                    let visible = self.visible_indices().len();
                    self.selected_index = visible.saturating_sub(1);
                }
                KeyCode::Enter => {
                    if let Some(index) = self.selected_global_index() {
                        self.detail_scroll_offset = 0;
                        self.state = AppState::DuaDetail(index);
                    }
                }
                KeyCode::Tab => {
                    self.switch_tab();
                }
                KeyCode::Char('f') => {
                    self.toggle_favorite();
                }
                KeyCode::Char('c') => {
                    self.copy_active();
                }
                KeyCode::Char('p') => {
                    self.toggle_playback();
                }
                KeyCode::Char('r') => {
                    self.refresh_requested = true;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::DuaDetail(_) => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.detail_scroll_offset = 0;
                    self.state = AppState::DuaList;
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.scroll_detail_down();
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.scroll_detail_up();
                }
                KeyCode::Char('g') => {
                    self.detail_scroll_offset = 0;
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    self.step_detail(-1);
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    self.step_detail(1);
                }
                KeyCode::Char('f') => {
                    self.toggle_favorite();
                }
                KeyCode::Char('c') => {
                    self.copy_active();
                }
                KeyCode::Char('p') => {
                    self.toggle_playback();
                }
                KeyCode::Char('r') => {
                    self.refresh_requested = true;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::LoadFailed(_) => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Char('r') => {
                    self.refresh_requested = true;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }
}
