use crate::application::{App, AppMode, Route};
use crate::domain::dnd::{DragChannel, DragPayload, drop_request, read_drag_payload, start_drag};
use crate::infrastructure::export::CsvExporter;
use crate::infrastructure::persistence::KeyValueStore;
use crate::presentation::ui::hit_test;
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event<S: KeyValueStore>(app: &mut App<S>, key: KeyCode, modifiers: KeyModifiers) {
        match app.route {
            Route::Login | Route::Signup => Self::handle_auth_keys(app, key, modifiers),
            Route::Destinations => Self::handle_destinations_keys(app, key),
            Route::Booking => Self::handle_booking_keys(app, key),
            Route::Budget => Self::handle_budget_keys(app, key),
            Route::Planner => match app.mode {
                AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
                AppMode::NewActivity => Self::handle_line_input(app, key, "new_activity"),
                AppMode::EditActivity => Self::handle_edit_activity_mode(app, key),
                AppMode::RenameTrip => Self::handle_line_input(app, key, "rename"),
                AppMode::StartDate => Self::handle_line_input(app, key, "start_date"),
                AppMode::TripLength => Self::handle_line_input(app, key, "trip_length"),
                AppMode::ExportCsv => Self::handle_line_input(app, key, "csv_export"),
                AppMode::Help => Self::handle_help_mode(app, key),
                AppMode::Onboarding => {
                    if matches!(key, KeyCode::Enter | KeyCode::Esc) {
                        app.dismiss_onboarding();
                    }
                }
            },
        }
    }

    fn handle_auth_keys<S: KeyValueStore>(app: &mut App<S>, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('s') if app.route == Route::Login => {
                    app.switch_auth_screen();
                    return;
                }
                KeyCode::Char('l') if app.route == Route::Signup => {
                    app.switch_auth_screen();
                    return;
                }
                _ => {}
            }
        }
        match key {
            KeyCode::Tab => app.next_auth_field(),
            KeyCode::Enter => app.submit_auth(),
            KeyCode::Esc => app.should_quit = true,
            KeyCode::Backspace => app.backspace(),
            KeyCode::Left => app.cursor_left(),
            KeyCode::Right => app.cursor_right(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_destinations_keys<S: KeyValueStore>(app: &mut App<S>, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                app.destination_index = app.destination_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if app.destination_index + 1 < app.destinations.len() {
                    app.destination_index += 1;
                }
            }
            KeyCode::Enter => app.select_destination_under_cursor(),
            KeyCode::Esc => app.navigate(Route::Planner),
            KeyCode::Char('q') => app.should_quit = true,
            _ => {}
        }
    }

    fn handle_booking_keys<S: KeyValueStore>(app: &mut App<S>, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                app.booking_field = app.booking_field.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if app.booking_field < 5 {
                    app.booking_field += 1;
                }
            }
            KeyCode::Left => Self::adjust_booking_field(app, -1),
            KeyCode::Right => Self::adjust_booking_field(app, 1),
            KeyCode::Char(' ') => {
                if app.booking_field >= 3 {
                    Self::adjust_booking_field(app, 1);
                }
            }
            KeyCode::Enter => app.save_booking(),
            KeyCode::Char('f') => app.finish_booking(),
            KeyCode::Char('u') => app.navigate(Route::Budget),
            KeyCode::Esc => app.navigate(Route::Planner),
            KeyCode::Char('q') => app.should_quit = true,
            _ => {}
        }
    }

    fn adjust_booking_field<S: KeyValueStore>(app: &mut App<S>, direction: i32) {
        let booking = &mut app.booking;
        match app.booking_field {
            0 => {
                booking.room_type = if direction >= 0 {
                    booking.room_type.next()
                } else {
                    booking.room_type.previous()
                };
            }
            1 => {
                booking.nights = if direction >= 0 {
                    booking.nights.saturating_add(1)
                } else {
                    booking.nights.saturating_sub(1).max(1)
                };
            }
            2 => {
                booking.people = if direction >= 0 {
                    (booking.people + 1).min(8)
                } else {
                    booking.people.saturating_sub(1).max(1)
                };
            }
            3 => booking.meal_plan.breakfast = !booking.meal_plan.breakfast,
            4 => booking.meal_plan.lunch = !booking.meal_plan.lunch,
            5 => booking.meal_plan.dinner = !booking.meal_plan.dinner,
            _ => {}
        }
    }

    fn handle_budget_keys<S: KeyValueStore>(app: &mut App<S>, key: KeyCode) {
        match key {
            KeyCode::Esc => app.navigate(Route::Booking),
            KeyCode::Char('q') => app.should_quit = true,
            _ => {}
        }
    }

    fn handle_normal_mode<S: KeyValueStore>(app: &mut App<S>, key: KeyCode, modifiers: KeyModifiers) {
        let is_shift = modifiers.contains(KeyModifiers::SHIFT);

        app.status_message = None;

        match key {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Up | KeyCode::Char('k') if is_shift => app.reorder_selected(-1),
            KeyCode::Down | KeyCode::Char('j') if is_shift => app.reorder_selected(1),
            KeyCode::Up | KeyCode::Char('k') => app.select_previous_activity(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next_activity(),
            KeyCode::Left | KeyCode::Char('h') => app.select_previous_column(),
            KeyCode::Right | KeyCode::Char('l') => app.select_next_column(),
            KeyCode::Char('[') => app.move_selected(-1),
            KeyCode::Char(']') => app.move_selected(1),
            KeyCode::Char('n') => app.start_new_activity(),
            KeyCode::Char('e') | KeyCode::Enter => app.start_edit_activity(),
            KeyCode::Char('a') => {
                app.planner.add_day(None, None);
                app.status_message = Some(format!("Day {} added", app.day_count()));
            }
            KeyCode::Char('x') => {
                if let Some(day_id) = app.column_day_id(app.column) {
                    app.planner.remove_day(&day_id);
                    app.clamp_selection();
                    app.status_message = Some("Day removed".to_string());
                }
            }
            KeyCode::Char('t') => app.start_trip_length(),
            KeyCode::Char('s') => app.start_start_date(),
            KeyCode::Char('r') => app.start_rename_trip(),
            KeyCode::Char('c') => app.start_csv_export(),
            KeyCode::Char('y') => app.copy_trip_summary(),
            KeyCode::Char('g') => app.navigate(Route::Destinations),
            KeyCode::Char('b') => app.navigate(Route::Booking),
            KeyCode::Char('u') => app.navigate(Route::Budget),
            KeyCode::Char('o') => app.logout(),
            _ => {}
        }
    }

    fn handle_line_input<S: KeyValueStore>(app: &mut App<S>, key: KeyCode, action: &str) {
        match key {
            KeyCode::Enter => match action {
                "new_activity" => app.finish_new_activity(),
                "rename" => app.finish_rename_trip(),
                "start_date" => app.finish_start_date(),
                "trip_length" => app.finish_trip_length(),
                "csv_export" => {
                    let filename = app.csv_export_filename();
                    let result = CsvExporter::export_itinerary(app.planner.snapshot(), &filename);
                    app.set_csv_export_result(result);
                }
                _ => app.cancel_input(),
            },
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Left => app.cursor_left(),
            KeyCode::Right => app.cursor_right(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_edit_activity_mode<S: KeyValueStore>(app: &mut App<S>, key: KeyCode) {
        match key {
            KeyCode::Tab => app.next_edit_field(),
            KeyCode::BackTab => app.previous_edit_field(),
            KeyCode::Enter => app.finish_edit_activity(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Left => app.cursor_left(),
            KeyCode::Right => app.cursor_right(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_help_mode<S: KeyValueStore>(app: &mut App<S>, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    /// Mouse handling drives the drag/drop adapter: button down over an
    /// activity card starts a drag, motion updates the drop highlight, and
    /// release over a container forwards the derived move request to the
    /// engine. Releases outside any container, or drags that never carried
    /// our payload, change nothing.
    pub fn handle_mouse_event<S: KeyValueStore>(app: &mut App<S>, mouse: MouseEvent, frame_area: Rect) {
        if app.route != Route::Planner || !matches!(app.mode, AppMode::Normal) {
            return;
        }
        let day_count = app.day_count();

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some((column, Some(row))) = hit_test(frame_area, day_count, mouse.column, mouse.row)
                else {
                    return;
                };
                if row >= app.column_len(column) {
                    app.column = column;
                    app.clamp_selection();
                    return;
                }
                app.column = column;
                app.selected = row;

                let (Some(activity_id), Some(source)) =
                    (app.selected_activity_id(), app.drag_source_for(column))
                else {
                    return;
                };
                let payload = DragPayload {
                    activity_id,
                    source,
                    index: row,
                };
                let mut channel = DragChannel::new();
                let preview = app
                    .planner
                    .snapshot()
                    .unassigned_activities
                    .iter()
                    .chain(app.planner.snapshot().days.iter().flat_map(|d| d.activities.iter()))
                    .find(|a| a.id == payload.activity_id)
                    .map(|a| format!("Move {}", a.title))
                    .unwrap_or_else(|| "Move activity".to_string());
                start_drag(&mut channel, &payload, &preview);
                app.drag = Some(channel);
                app.drag_over = Some(column);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if app.drag.is_none() {
                    return;
                }
                app.drag_over = hit_test(frame_area, day_count, mouse.column, mouse.row)
                    .map(|(column, _)| column);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(channel) = app.drag.take() else {
                    return;
                };
                app.drag_over = None;

                let Some((column, _)) = hit_test(frame_area, day_count, mouse.column, mouse.row)
                else {
                    return;
                };
                let Some(target) = app.drag_source_for(column) else {
                    return;
                };
                let Some(request) = drop_request(&channel, &target, app.column_len(column)) else {
                    return;
                };
                // Dropping a card back where it started is not a move.
                if read_drag_payload(&channel).map(|p| p.source) == Some(target.clone()) {
                    return;
                }
                app.planner.move_activity(&request);
                app.column = column;
                app.selected = app.column_len(column).saturating_sub(1);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::BoardColumn;
    use crate::infrastructure::auth::CredentialStore;
    use crate::infrastructure::persistence::{MemoryStore, set_flag, storage_keys};
    use crate::presentation::ui::board_regions;

    fn signed_in_app() -> App<MemoryStore> {
        let store = MemoryStore::new();
        set_flag(&store, storage_keys::SEEDED_SAMPLE, true);
        set_flag(&store, storage_keys::ONBOARDING_SEEN, true);
        let credentials = CredentialStore::new(store.clone());
        credentials.signup("t@example.com", "secret").unwrap();
        App::new(store)
    }

    fn key<S: KeyValueStore>(app: &mut App<S>, code: KeyCode) {
        InputHandler::handle_key_event(app, code, KeyModifiers::NONE);
    }

    fn type_str<S: KeyValueStore>(app: &mut App<S>, text: &str) {
        for c in text.chars() {
            key(app, KeyCode::Char(c));
        }
    }

    fn mouse(kind: MouseEventKind, x: u16, y: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_quit_key() {
        let mut app = signed_in_app();
        key(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_add_and_remove_day_keys() {
        let mut app = signed_in_app();
        key(&mut app, KeyCode::Char('a'));
        assert_eq!(app.day_count(), 2);

        app.column = BoardColumn::Day(1);
        key(&mut app, KeyCode::Char('x'));
        assert_eq!(app.day_count(), 1);
        assert_eq!(app.column, BoardColumn::Day(0));
    }

    #[test]
    fn test_help_toggle() {
        let mut app = signed_in_app();
        key(&mut app, KeyCode::Char('?'));
        assert_eq!(app.mode, AppMode::Help);
        key(&mut app, KeyCode::Down);
        assert_eq!(app.help_scroll, 1);
        key(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_new_activity_typed_through_handler() {
        let mut app = signed_in_app();
        key(&mut app, KeyCode::Char('n'));
        assert_eq!(app.mode, AppMode::NewActivity);
        type_str(&mut app, "Market visit");
        key(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(
            app.planner.snapshot().unassigned_activities[0].title,
            "Market visit"
        );
    }

    #[test]
    fn test_escape_cancels_new_activity() {
        let mut app = signed_in_app();
        key(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Abandoned");
        key(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.planner.snapshot().unassigned_activities.is_empty());
    }

    #[test]
    fn test_bracket_moves_between_columns() {
        let mut app = signed_in_app();
        key(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Museum");
        key(&mut app, KeyCode::Enter);

        key(&mut app, KeyCode::Char(']'));
        let plan = app.planner.snapshot();
        assert!(plan.unassigned_activities.is_empty());
        assert_eq!(plan.days[0].activities[0].title, "Museum");
    }

    #[test]
    fn test_auth_screen_typing_and_switch() {
        let store = MemoryStore::new();
        set_flag(&store, storage_keys::SEEDED_SAMPLE, true);
        let mut app = App::new(store);
        assert_eq!(app.route, Route::Login);

        InputHandler::handle_key_event(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(app.route, Route::Signup);

        type_str(&mut app, "new@example.com");
        key(&mut app, KeyCode::Tab);
        type_str(&mut app, "pw123");
        key(&mut app, KeyCode::Tab);
        type_str(&mut app, "pw123");
        key(&mut app, KeyCode::Enter);

        assert_eq!(app.route, Route::Planner);
    }

    #[test]
    fn test_booking_adjustments() {
        let mut app = signed_in_app();
        app.navigate(Route::Booking);

        key(&mut app, KeyCode::Right); // room: standard -> deluxe
        key(&mut app, KeyCode::Down);
        key(&mut app, KeyCode::Right); // nights: 1 -> 2
        key(&mut app, KeyCode::Down);
        key(&mut app, KeyCode::Left); // people: 2 -> 1
        key(&mut app, KeyCode::Left); // clamped at 1

        assert_eq!(app.booking.room_type.label(), "Deluxe");
        assert_eq!(app.booking.nights, 2);
        assert_eq!(app.booking.people, 1);

        key(&mut app, KeyCode::Enter); // save
        let meta = &app.planner.snapshot().trip_meta;
        assert_eq!(meta.nights, Some(2));
        assert!(meta.pricing_snapshot.is_some());
    }

    #[test]
    fn test_mouse_drag_pool_to_day() {
        let mut app = signed_in_app();
        key(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Museum");
        key(&mut app, KeyCode::Enter);

        let frame = Rect::new(0, 0, 120, 40);
        let (pool, days) = board_regions(frame, app.day_count());
        let grab = (pool.x + 2, pool.y + 1); // first pool row
        let drop = (days[0].x + 2, days[0].y + 2);

        InputHandler::handle_mouse_event(
            &mut app,
            mouse(MouseEventKind::Down(MouseButton::Left), grab.0, grab.1),
            frame,
        );
        assert!(app.drag.is_some());
        assert_eq!(app.drag_over, Some(BoardColumn::Pool));

        InputHandler::handle_mouse_event(
            &mut app,
            mouse(MouseEventKind::Drag(MouseButton::Left), drop.0, drop.1),
            frame,
        );
        assert_eq!(app.drag_over, Some(BoardColumn::Day(0)));

        InputHandler::handle_mouse_event(
            &mut app,
            mouse(MouseEventKind::Up(MouseButton::Left), drop.0, drop.1),
            frame,
        );
        assert!(app.drag.is_none());
        assert_eq!(app.drag_over, None);

        let plan = app.planner.snapshot();
        assert!(plan.unassigned_activities.is_empty());
        assert_eq!(plan.days[0].activities[0].title, "Museum");
        assert_eq!(plan.activity_count(), 1);
    }

    #[test]
    fn test_mouse_release_outside_board_is_noop() {
        let mut app = signed_in_app();
        key(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Museum");
        key(&mut app, KeyCode::Enter);

        let frame = Rect::new(0, 0, 120, 40);
        let (pool, _) = board_regions(frame, app.day_count());

        InputHandler::handle_mouse_event(
            &mut app,
            mouse(MouseEventKind::Down(MouseButton::Left), pool.x + 2, pool.y + 1),
            frame,
        );
        // Release on the status bar, below every container.
        InputHandler::handle_mouse_event(
            &mut app,
            mouse(MouseEventKind::Up(MouseButton::Left), pool.x + 2, frame.height - 1),
            frame,
        );

        assert!(app.drag.is_none());
        assert_eq!(app.planner.snapshot().unassigned_activities.len(), 1);
    }

    #[test]
    fn test_mouse_down_on_empty_row_starts_no_drag() {
        let mut app = signed_in_app();
        let frame = Rect::new(0, 0, 120, 40);
        let (pool, _) = board_regions(frame, app.day_count());

        InputHandler::handle_mouse_event(
            &mut app,
            mouse(MouseEventKind::Down(MouseButton::Left), pool.x + 2, pool.y + 5),
            frame,
        );
        assert!(app.drag.is_none());
    }

    #[test]
    fn test_drop_back_on_source_leaves_order_alone() {
        let mut app = signed_in_app();
        for title in ["A", "B"] {
            key(&mut app, KeyCode::Char('n'));
            type_str(&mut app, title);
            key(&mut app, KeyCode::Enter);
        }

        let frame = Rect::new(0, 0, 120, 40);
        let (pool, _) = board_regions(frame, app.day_count());

        InputHandler::handle_mouse_event(
            &mut app,
            mouse(MouseEventKind::Down(MouseButton::Left), pool.x + 2, pool.y + 1),
            frame,
        );
        InputHandler::handle_mouse_event(
            &mut app,
            mouse(MouseEventKind::Up(MouseButton::Left), pool.x + 2, pool.y + 2),
            frame,
        );

        let titles: Vec<&str> = app
            .planner
            .snapshot()
            .unassigned_activities
            .iter()
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(titles, ["A", "B"]);
    }
}
