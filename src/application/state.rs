//! Application state management for the terminal trip planner.
//!
//! [`App`] carries everything the presentation layer needs besides the trip
//! itself: the current screen and input mode, the board cursor, input
//! buffers, the in-flight drag, and transient status messages. The trip
//! aggregate lives behind [`TripPlanner`] and is only reached through its
//! operations.

use crate::application::planner::TripPlanner;
use crate::domain::dnd::{DragChannel, DragSource};
use crate::domain::models::{
    ActivityPatch, BookingSelection, Destination, MoveRequest, Slot, destination_catalog,
};
use crate::domain::services::format_currency;
use crate::infrastructure::auth::CredentialStore;
use crate::infrastructure::persistence::{KeyValueStore, get_flag, set_flag, storage_keys};

/// Which screen is showing. Replaces the original hash router; navigation
/// is auth-gated in [`App::navigate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    Planner,
    Destinations,
    Booking,
    Budget,
}

/// Input mode within the planner screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Normal navigation - cursor movement and shortcuts
    Normal,
    /// Typing the title for a new pool activity
    NewActivity,
    /// Editing the fields of an existing activity
    EditActivity,
    /// Typing a new trip name
    RenameTrip,
    /// Typing the trip start date
    StartDate,
    /// Typing the target day count
    TripLength,
    /// Typing the CSV export filename
    ExportCsv,
    /// Help screen is displayed
    Help,
    /// First-run onboarding popup is displayed
    Onboarding,
}

/// A container column on the board: the pool sidebar or a day by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardColumn {
    Pool,
    Day(usize),
}

pub const EDIT_FIELD_LABELS: [&str; 5] = ["Title", "Time", "Location", "Note", "Emoji"];

pub struct App<S: KeyValueStore> {
    pub planner: TripPlanner<S>,
    pub credentials: CredentialStore<S>,
    pub store: S,
    pub route: Route,
    pub mode: AppMode,
    /// Board cursor: which container, and which activity within it
    pub column: BoardColumn,
    pub selected: usize,
    /// Shared input buffer for the single-line input modes
    pub input: String,
    /// Byte offset of the cursor within the active buffer
    pub cursor_position: usize,
    pub status_message: Option<String>,
    pub help_scroll: usize,
    /// Buffers for the activity editor, one per field
    pub edit_fields: [String; 5],
    pub edit_field: usize,
    pub editing_activity: Option<String>,
    /// Login/signup form
    pub auth_email: String,
    pub auth_password: String,
    pub auth_confirm: String,
    pub auth_field: usize,
    pub auth_error: Option<String>,
    /// Destination browser
    pub destinations: Vec<Destination>,
    pub destination_index: usize,
    /// Booking form
    pub booking: BookingSelection,
    pub booking_field: usize,
    /// In-flight drag payload channel, if a drag is active
    pub drag: Option<DragChannel>,
    /// Container currently highlighted as a drop target
    pub drag_over: Option<BoardColumn>,
    pub should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: S) -> Self {
        let planner = TripPlanner::load(store.clone());
        let credentials = CredentialStore::new(store.clone());
        let authed = credentials.is_authenticated();

        let route = if authed { Route::Planner } else { Route::Login };
        let mode = if authed && !get_flag(&store, storage_keys::ONBOARDING_SEEN) {
            AppMode::Onboarding
        } else {
            AppMode::Normal
        };

        let mut app = Self {
            planner,
            credentials,
            store,
            route,
            mode,
            column: BoardColumn::Pool,
            selected: 0,
            input: String::new(),
            cursor_position: 0,
            status_message: None,
            help_scroll: 0,
            edit_fields: Default::default(),
            edit_field: 0,
            editing_activity: None,
            auth_email: String::new(),
            auth_password: String::new(),
            auth_confirm: String::new(),
            auth_field: 0,
            auth_error: None,
            destinations: destination_catalog(),
            destination_index: 0,
            booking: BookingSelection::default(),
            booking_field: 0,
            drag: None,
            drag_over: None,
            should_quit: false,
        };
        app.load_booking_from_trip();
        app
    }

    // --- board cursor -----------------------------------------------------

    pub fn day_count(&self) -> usize {
        self.planner.snapshot().days.len()
    }

    /// Number of activities in a column.
    pub fn column_len(&self, column: BoardColumn) -> usize {
        let plan = self.planner.snapshot();
        match column {
            BoardColumn::Pool => plan.unassigned_activities.len(),
            BoardColumn::Day(i) => plan.days.get(i).map(|d| d.activities.len()).unwrap_or(0),
        }
    }

    /// Day id of a column, `None` for the pool.
    pub fn column_day_id(&self, column: BoardColumn) -> Option<String> {
        match column {
            BoardColumn::Pool => None,
            BoardColumn::Day(i) => self.planner.snapshot().days.get(i).map(|d| d.id.clone()),
        }
    }

    pub fn drag_source_for(&self, column: BoardColumn) -> Option<DragSource> {
        match column {
            BoardColumn::Pool => Some(DragSource::Pool),
            BoardColumn::Day(i) => self
                .planner
                .snapshot()
                .days
                .get(i)
                .map(|d| DragSource::Day(d.id.clone())),
        }
    }

    pub fn selected_activity_id(&self) -> Option<String> {
        let plan = self.planner.snapshot();
        let activity = match self.column {
            BoardColumn::Pool => plan.unassigned_activities.get(self.selected),
            BoardColumn::Day(i) => plan.days.get(i)?.activities.get(self.selected),
        };
        activity.map(|a| a.id.clone())
    }

    /// Keeps the cursor inside the current column after any mutation.
    pub fn clamp_selection(&mut self) {
        if let BoardColumn::Day(i) = self.column {
            if i >= self.day_count() {
                self.column = if self.day_count() == 0 {
                    BoardColumn::Pool
                } else {
                    BoardColumn::Day(self.day_count() - 1)
                };
            }
        }
        let len = self.column_len(self.column);
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn select_next_column(&mut self) {
        self.column = match self.column {
            BoardColumn::Pool if self.day_count() > 0 => BoardColumn::Day(0),
            BoardColumn::Pool => BoardColumn::Pool,
            BoardColumn::Day(i) if i + 1 < self.day_count() => BoardColumn::Day(i + 1),
            BoardColumn::Day(_) => BoardColumn::Pool,
        };
        self.selected = 0;
        self.clamp_selection();
    }

    pub fn select_previous_column(&mut self) {
        self.column = match self.column {
            BoardColumn::Pool if self.day_count() > 0 => BoardColumn::Day(self.day_count() - 1),
            BoardColumn::Pool => BoardColumn::Pool,
            BoardColumn::Day(0) => BoardColumn::Pool,
            BoardColumn::Day(i) => BoardColumn::Day(i - 1),
        };
        self.selected = 0;
        self.clamp_selection();
    }

    pub fn select_next_activity(&mut self) {
        let len = self.column_len(self.column);
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_previous_activity(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    /// Moves the selected activity to the end of the neighboring container:
    /// `offset` -1 is left, +1 is right. The keyboard counterpart of a drag.
    pub fn move_selected(&mut self, offset: isize) {
        let Some(activity_id) = self.selected_activity_id() else {
            return;
        };
        let columns = self.day_count() + 1; // pool plus days
        let position = match self.column {
            BoardColumn::Pool => 0,
            BoardColumn::Day(i) => i + 1,
        };
        let target = position as isize + offset;
        if target < 0 || target >= columns as isize {
            return;
        }
        let target_column = if target == 0 {
            BoardColumn::Pool
        } else {
            BoardColumn::Day(target as usize - 1)
        };

        let request = MoveRequest {
            activity_id,
            from: Slot {
                day_id: self.column_day_id(self.column),
                index: self.selected,
            },
            to: Slot {
                day_id: self.column_day_id(target_column),
                index: self.column_len(target_column),
            },
        };
        self.planner.move_activity(&request);
        self.column = target_column;
        self.selected = self.column_len(target_column).saturating_sub(1);
    }

    /// Swaps the selected activity with its neighbor within the same day.
    pub fn reorder_selected(&mut self, offset: isize) {
        let BoardColumn::Day(_) = self.column else {
            return;
        };
        let Some(day_id) = self.column_day_id(self.column) else {
            return;
        };
        let len = self.column_len(self.column);
        let target = self.selected as isize + offset;
        if target < 0 || target >= len as isize {
            return;
        }
        self.planner
            .reorder_activities(&day_id, self.selected, target as usize);
        self.selected = target as usize;
    }

    // --- input modes ------------------------------------------------------

    pub fn start_new_activity(&mut self) {
        self.mode = AppMode::NewActivity;
        self.input.clear();
        self.cursor_position = 0;
        self.status_message = None;
    }

    pub fn finish_new_activity(&mut self) {
        let title = self.input.trim().to_string();
        let draft = ActivityPatch {
            title: if title.is_empty() { None } else { Some(title.clone()) },
            ..ActivityPatch::default()
        };
        self.planner.add_activity_to_pool(draft);
        self.status_message = Some(format!(
            "Added \"{}\" to the pool",
            if title.is_empty() { "New Activity" } else { title.as_str() }
        ));
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn start_edit_activity(&mut self) {
        let Some(activity_id) = self.selected_activity_id() else {
            self.status_message = Some("No activity selected".to_string());
            return;
        };
        let plan = self.planner.snapshot();
        let activity = plan
            .unassigned_activities
            .iter()
            .chain(plan.days.iter().flat_map(|d| d.activities.iter()))
            .find(|a| a.id == activity_id);
        let Some(activity) = activity else {
            return;
        };
        self.edit_fields = [
            activity.title.clone(),
            activity.time.clone(),
            activity.location.clone(),
            activity.note.clone(),
            activity.emoji.clone(),
        ];
        self.edit_field = 0;
        self.editing_activity = Some(activity_id);
        self.cursor_position = self.edit_fields[0].len();
        self.mode = AppMode::EditActivity;
        self.status_message = None;
    }

    pub fn next_edit_field(&mut self) {
        self.edit_field = (self.edit_field + 1) % self.edit_fields.len();
        self.cursor_position = self.edit_fields[self.edit_field].len();
    }

    pub fn previous_edit_field(&mut self) {
        self.edit_field = (self.edit_field + self.edit_fields.len() - 1) % self.edit_fields.len();
        self.cursor_position = self.edit_fields[self.edit_field].len();
    }

    pub fn finish_edit_activity(&mut self) {
        if let Some(activity_id) = self.editing_activity.take() {
            let [title, time, location, note, emoji] = self.edit_fields.clone();
            let patch = ActivityPatch {
                title: Some(title),
                time: Some(time),
                location: Some(location),
                note: Some(note),
                emoji: Some(emoji),
            };
            self.planner.update_activity(&activity_id, &patch);
            self.status_message = Some("Activity updated".to_string());
        }
        self.mode = AppMode::Normal;
        self.cursor_position = 0;
    }

    pub fn start_rename_trip(&mut self) {
        self.mode = AppMode::RenameTrip;
        self.input = self.planner.snapshot().trip_meta.name.clone();
        self.cursor_position = self.input.len();
        self.status_message = None;
    }

    pub fn finish_rename_trip(&mut self) {
        let name = self.input.trim().to_string();
        if !name.is_empty() {
            self.planner.rename_trip(&name);
            self.status_message = Some(format!("Trip renamed to \"{name}\""));
        }
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn start_start_date(&mut self) {
        self.mode = AppMode::StartDate;
        self.input = self.planner.snapshot().trip_meta.start_date.clone();
        self.cursor_position = self.input.len();
        self.status_message = None;
    }

    pub fn finish_start_date(&mut self) {
        let date = self.input.trim().to_string();
        self.planner.set_start_date(&date);
        self.status_message = Some(if date.is_empty() {
            "Start date cleared".to_string()
        } else if self.planner.snapshot().trip_meta.end_date.is_empty() {
            "Could not read that date; use YYYY-MM-DD".to_string()
        } else {
            format!(
                "Itinerary runs {} to {}",
                date,
                self.planner.snapshot().trip_meta.end_date
            )
        });
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn start_trip_length(&mut self) {
        self.mode = AppMode::TripLength;
        self.input = self.day_count().to_string();
        self.cursor_position = self.input.len();
        self.status_message = None;
    }

    pub fn finish_trip_length(&mut self) {
        match self.input.trim().parse::<usize>() {
            Ok(n) => {
                self.planner.set_trip_length(n);
                self.status_message =
                    Some(format!("Trip length set to {} days", self.day_count()));
            }
            Err(_) => {
                self.status_message = Some("Trip length must be a number".to_string());
            }
        }
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
        self.clamp_selection();
    }

    pub fn start_csv_export(&mut self) {
        self.mode = AppMode::ExportCsv;
        self.input = "itinerary.csv".to_string();
        self.cursor_position = self.input.len();
        self.status_message = None;
    }

    pub fn csv_export_filename(&self) -> String {
        if self.input.is_empty() {
            "itinerary.csv".to_string()
        } else {
            self.input.clone()
        }
    }

    pub fn set_csv_export_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!("Exported to {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Export failed: {}", error));
            }
        }
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn cancel_input(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
        self.editing_activity = None;
    }

    pub fn dismiss_onboarding(&mut self) {
        set_flag(&self.store, storage_keys::ONBOARDING_SEEN, true);
        self.mode = AppMode::Normal;
    }

    // --- routing and auth -------------------------------------------------

    /// Auth-gated navigation: unauthenticated users can only reach the
    /// login and signup screens.
    pub fn navigate(&mut self, route: Route) {
        if !matches!(route, Route::Login | Route::Signup) && !self.credentials.is_authenticated() {
            self.route = Route::Login;
            return;
        }
        self.route = route;
        self.status_message = None;
        if route == Route::Booking {
            self.load_booking_from_trip();
            self.booking_field = 0;
        }
    }

    fn load_booking_from_trip(&mut self) {
        let meta = &self.planner.snapshot().trip_meta;
        let defaults = BookingSelection::default();
        self.booking = BookingSelection {
            room_type: meta.room_type.unwrap_or(defaults.room_type),
            nights: meta.nights.unwrap_or(defaults.nights),
            people: meta.people.unwrap_or(defaults.people),
            meal_plan: meta.meal_plan.unwrap_or(defaults.meal_plan),
        };
    }

    pub fn auth_field_count(&self) -> usize {
        if self.route == Route::Signup { 3 } else { 2 }
    }

    pub fn next_auth_field(&mut self) {
        self.auth_field = (self.auth_field + 1) % self.auth_field_count();
        self.cursor_position = self.active_auth_buffer().len();
    }

    fn active_auth_buffer(&self) -> &String {
        match self.auth_field {
            0 => &self.auth_email,
            1 => &self.auth_password,
            _ => &self.auth_confirm,
        }
    }

    pub fn switch_auth_screen(&mut self) {
        self.route = if self.route == Route::Login {
            Route::Signup
        } else {
            Route::Login
        };
        self.auth_field = 0;
        self.auth_confirm.clear();
        self.auth_error = None;
        self.cursor_position = self.auth_email.len();
    }

    pub fn submit_auth(&mut self) {
        let result = if self.route == Route::Signup {
            if self.auth_password != self.auth_confirm {
                self.auth_error = Some("Passwords do not match".to_string());
                return;
            }
            self.credentials.signup(&self.auth_email, &self.auth_password)
        } else {
            self.credentials.login(&self.auth_email, &self.auth_password)
        };

        match result {
            Ok(session) => {
                self.auth_error = None;
                self.auth_password.clear();
                self.auth_confirm.clear();
                self.status_message = Some(format!("Signed in as {}", session.email));
                self.route = Route::Planner;
                if !get_flag(&self.store, storage_keys::ONBOARDING_SEEN) {
                    self.mode = AppMode::Onboarding;
                }
            }
            Err(error) => {
                self.auth_error = Some(error.to_string());
            }
        }
    }

    pub fn logout(&mut self) {
        self.credentials.logout();
        self.auth_email.clear();
        self.auth_password.clear();
        self.auth_confirm.clear();
        self.auth_field = 0;
        self.route = Route::Login;
        self.mode = AppMode::Normal;
    }

    // --- destinations and booking ----------------------------------------

    pub fn select_destination_under_cursor(&mut self) {
        let Some(destination) = self.destinations.get(self.destination_index).cloned() else {
            return;
        };
        self.planner.select_destination(&destination);
        self.navigate(Route::Booking);
        self.status_message = Some(format!(
            "{} · {} selected",
            destination.city, destination.hotel
        ));
    }

    pub fn save_booking(&mut self) {
        self.planner.set_booking(&self.booking);
        self.load_booking_from_trip();
        if let Some(snapshot) = &self.planner.snapshot().trip_meta.pricing_snapshot {
            self.status_message = Some(format!(
                "Booking saved - estimated total {}",
                format_currency(snapshot.grand_total)
            ));
        }
    }

    /// Saves the booking and returns to the board, seeding a couple of
    /// starter pool activities when the plan has none yet.
    pub fn finish_booking(&mut self) {
        self.save_booking();
        if self.planner.snapshot().is_empty_of_activities() {
            let (hotel, city) = match &self.planner.snapshot().trip_meta.selected_destination {
                Some(d) => (d.hotel.clone(), d.city.clone()),
                None => ("Hotel".to_string(), "City Center".to_string()),
            };
            self.planner.add_activity_to_pool(ActivityPatch {
                title: Some("Hotel Check-in".to_string()),
                time: Some("15:00".to_string()),
                location: Some(hotel),
                emoji: Some("🏨".to_string()),
                ..ActivityPatch::default()
            });
            self.planner.add_activity_to_pool(ActivityPatch {
                title: Some("Welcome Dinner".to_string()),
                time: Some("19:30".to_string()),
                location: Some(city),
                emoji: Some("🍽️".to_string()),
                ..ActivityPatch::default()
            });
        }
        let saved = self.status_message.take();
        self.navigate(Route::Planner);
        self.status_message = saved;
    }

    // --- clipboard --------------------------------------------------------

    /// One-paragraph trip summary for sharing.
    pub fn trip_summary(&self) -> String {
        let plan = self.planner.snapshot();
        let mut lines = vec![plan.trip_meta.name.clone()];
        if !plan.trip_meta.start_date.is_empty() {
            lines.push(format!(
                "{} to {}",
                plan.trip_meta.start_date, plan.trip_meta.end_date
            ));
        }
        for day in &plan.days {
            let title = if day.date.is_empty() {
                day.title.clone()
            } else {
                format!("{} ({})", day.title, day.date)
            };
            lines.push(title);
            for activity in &day.activities {
                let time = if activity.time.is_empty() {
                    String::new()
                } else {
                    format!("{} ", activity.time)
                };
                lines.push(format!("  {}{} {}", time, activity.emoji, activity.title));
            }
        }
        lines.join("\n")
    }

    pub fn copy_trip_summary(&mut self) {
        let summary = self.trip_summary();
        let copied = arboard::Clipboard::new().and_then(|mut c| c.set_text(summary));
        self.status_message = Some(match copied {
            Ok(()) => "Trip summary copied to clipboard".to_string(),
            Err(_) => "Clipboard unavailable".to_string(),
        });
    }

    // --- text editing -----------------------------------------------------

    /// The buffer the current mode is typing into, if any.
    pub fn active_buffer_mut(&mut self) -> Option<&mut String> {
        match (self.route, self.mode) {
            (Route::Login | Route::Signup, _) => Some(match self.auth_field {
                0 => &mut self.auth_email,
                1 => &mut self.auth_password,
                _ => &mut self.auth_confirm,
            }),
            (_, AppMode::EditActivity) => Some(&mut self.edit_fields[self.edit_field]),
            (
                _,
                AppMode::NewActivity
                | AppMode::RenameTrip
                | AppMode::StartDate
                | AppMode::TripLength
                | AppMode::ExportCsv,
            ) => Some(&mut self.input),
            _ => None,
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        let cursor = self.cursor_position;
        if let Some(buffer) = self.active_buffer_mut() {
            let at = cursor.min(buffer.len());
            buffer.insert(at, ch);
            self.cursor_position = at + ch.len_utf8();
        }
    }

    pub fn backspace(&mut self) {
        let cursor = self.cursor_position;
        if let Some(buffer) = self.active_buffer_mut() {
            if cursor == 0 || buffer.is_empty() {
                return;
            }
            let at = buffer[..cursor.min(buffer.len())]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            buffer.remove(at);
            self.cursor_position = at;
        }
    }

    pub fn cursor_left(&mut self) {
        let cursor = self.cursor_position;
        let position = self.active_buffer_mut().map(|buffer| {
            buffer[..cursor.min(buffer.len())]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0)
        });
        if let Some(position) = position {
            self.cursor_position = position;
        }
    }

    pub fn cursor_right(&mut self) {
        let cursor = self.cursor_position;
        let position = self.active_buffer_mut().map(|buffer| {
            let at = cursor.min(buffer.len());
            buffer[at..]
                .chars()
                .next()
                .map(|c| at + c.len_utf8())
                .unwrap_or(buffer.len())
        });
        if let Some(position) = position {
            self.cursor_position = position;
        }
    }
}
