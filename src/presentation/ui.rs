use crate::application::{App, AppMode, BoardColumn, Route};
use crate::domain::models::{Activity, Day};
use crate::domain::services::{
    PricingContext, build_suggested_plans, compute_totals, format_currency,
};
use crate::domain::models::DEFAULT_BASE_NIGHT_PRICE;
use crate::infrastructure::persistence::KeyValueStore;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

const POOL_WIDTH: u16 = 28;

pub fn render_ui<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    match app.route {
        Route::Login | Route::Signup => render_auth(f, app),
        Route::Destinations => render_destinations(f, app),
        Route::Booking => render_booking(f, app),
        Route::Budget => render_budget(f, app),
        Route::Planner => render_planner(f, app),
    }

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, app.help_scroll);
    }
    if matches!(app.mode, AppMode::Onboarding) {
        render_onboarding_popup(f);
    }
}

/// Splits the planner frame into the pool sidebar and one rect per day
/// column. Shared with the input handler so mouse hit-testing and rendering
/// always agree.
pub fn board_regions(frame_area: Rect, day_count: usize) -> (Rect, Vec<Rect>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame_area);
    let board = chunks[1];

    let mut constraints = vec![Constraint::Length(POOL_WIDTH)];
    for _ in 0..day_count {
        constraints.push(Constraint::Ratio(1, day_count as u32));
    }
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(board);

    (columns[0], columns[1..].to_vec())
}

/// Maps a terminal coordinate to a board container and the activity row
/// under it, if any. Row indices are raw positions; callers bound them
/// against the container's length.
pub fn hit_test(frame_area: Rect, day_count: usize, x: u16, y: u16) -> Option<(BoardColumn, Option<usize>)> {
    let (pool, days) = board_regions(frame_area, day_count);
    let row_in = |rect: Rect| -> Option<usize> {
        if y > rect.y && y < rect.y.saturating_add(rect.height).saturating_sub(1) {
            Some((y - rect.y - 1) as usize)
        } else {
            None
        }
    };
    if pool.contains((x, y).into()) {
        return Some((BoardColumn::Pool, row_in(pool)));
    }
    for (i, rect) in days.iter().enumerate() {
        if rect.contains((x, y).into()) {
            return Some((BoardColumn::Day(i), row_in(*rect)));
        }
    }
    None
}

fn render_planner<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_board(f, app, chunks[1]);
    render_status_bar(f, app, chunks[2]);
}

fn render_header<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let plan = app.planner.snapshot();
    let meta = &plan.trip_meta;
    let subtitle = if meta.start_date.is_empty() {
        format!(
            "plan your trip across {} {}",
            plan.days.len(),
            if plan.days.len() == 1 { "day" } else { "days" }
        )
    } else {
        format!(
            "{} → {} · {} days",
            meta.start_date,
            meta.end_date,
            plan.days.len()
        )
    };
    let header = Paragraph::new(format!("WanderPlan · {} · {}", meta.name, subtitle))
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_board<S: KeyValueStore>(f: &mut Frame, app: &App<S>, _area: Rect) {
    let plan = app.planner.snapshot();
    let (pool_rect, day_rects) = board_regions(f.area(), plan.days.len());

    let pool_title = format!("Activity Pool ({})", plan.unassigned_activities.len());
    render_column(
        f,
        app,
        pool_rect,
        BoardColumn::Pool,
        pool_title,
        &plan.unassigned_activities,
    );

    for (i, (day, rect)) in plan.days.iter().zip(day_rects.iter()).enumerate() {
        render_column(
            f,
            app,
            *rect,
            BoardColumn::Day(i),
            day_title(day),
            &day.activities,
        );
    }
}

fn day_title(day: &Day) -> String {
    if day.date.is_empty() {
        day.title.clone()
    } else {
        format!("{} · {}", day.title, day.date)
    }
}

fn render_column<S: KeyValueStore>(
    f: &mut Frame,
    app: &App<S>,
    area: Rect,
    column: BoardColumn,
    title: String,
    activities: &[Activity],
) {
    let border_style = if app.drag_over == Some(column) {
        Style::default().fg(Color::Yellow)
    } else if app.column == column {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let items: Vec<ListItem> = activities
        .iter()
        .enumerate()
        .map(|(i, activity)| {
            let mut line = format!("{} ", activity.emoji);
            if !activity.time.is_empty() {
                line.push_str(&activity.time);
                line.push(' ');
            }
            line.push_str(&activity.title);
            let style = if app.column == column && app.selected == i {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(list, area);
}

fn render_status_bar<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let input_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                "n: new | e: edit | a: +day | x: -day | [ ]: move | ↑↓←→: select | s: start date | t: length | r: rename | g: destinations | b: booking | u: budget | c: export CSV | y: copy | F1/?: help | o: logout | q: quit".to_string()
            }
        }
        AppMode::NewActivity => format!("New activity title: {} (Enter to add, Esc to cancel)", app.input),
        AppMode::EditActivity => format!(
            "Edit {}: {} (Tab next field, Enter to save, Esc to cancel)",
            crate::application::EDIT_FIELD_LABELS[app.edit_field],
            app.edit_fields[app.edit_field]
        ),
        AppMode::RenameTrip => format!("Trip name: {} (Enter to save, Esc to cancel)", app.input),
        AppMode::StartDate => format!("Start date YYYY-MM-DD: {} (Enter to apply, Esc to cancel)", app.input),
        AppMode::TripLength => format!("Trip length in days: {} (Enter to apply, Esc to cancel)", app.input),
        AppMode::ExportCsv => format!("Export CSV as: {} (Enter to export, Esc to cancel)", app.input),
        AppMode::Help => "↑↓/jk: scroll | Esc/q: close help".to_string(),
        AppMode::Onboarding => "Enter/Esc: close".to_string(),
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::NewActivity | AppMode::EditActivity => Style::default().fg(Color::Green),
            AppMode::RenameTrip => Style::default().fg(Color::Yellow),
            AppMode::StartDate | AppMode::TripLength => Style::default().fg(Color::Yellow),
            AppMode::ExportCsv => Style::default().fg(Color::Magenta),
            AppMode::Help | AppMode::Onboarding => Style::default().fg(Color::Cyan),
        });
    f.render_widget(input, area);
}

fn render_auth<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let area = f.area();
    let signup = app.route == Route::Signup;
    let box_height = if signup { 12 } else { 10 };
    let popup = centered_rect(area, 50, box_height);

    let field = |label: &str, value: &str, masked: bool, active: bool| -> Line<'static> {
        let shown = if masked {
            "•".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let marker = if active { "> " } else { "  " };
        let style = if active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Line::from(Span::styled(format!("{marker}{label}: {shown}"), style))
    };

    let mut lines = vec![
        Line::from(""),
        field("Email   ", &app.auth_email, false, app.auth_field == 0),
        field("Password", &app.auth_password, true, app.auth_field == 1),
    ];
    if signup {
        lines.push(field("Confirm ", &app.auth_confirm, true, app.auth_field == 2));
    }
    lines.push(Line::from(""));
    if let Some(error) = &app.auth_error {
        lines.push(Line::from(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        if signup {
            "  Enter: create account | Tab: next field | Ctrl+L: log in instead | Esc: quit"
        } else {
            "  Enter: sign in | Tab: next field | Ctrl+S: sign up instead | Esc: quit"
        },
        Style::default().fg(Color::DarkGray),
    )));

    let title = if signup { "WanderPlan · Sign up" } else { "WanderPlan · Log in" };
    f.render_widget(Clear, popup);
    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(Color::White));
    f.render_widget(form, popup);
}

fn render_destinations<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(4),
            Constraint::Length(3),
        ])
        .split(f.area());

    let items: Vec<ListItem> = app
        .destinations
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let line = format!(
                "{}, {} · {}  ★{:.1}  {}/night",
                d.city,
                d.country,
                d.hotel,
                d.rating,
                format_currency(d.price_per_night)
            );
            let style = if i == app.destination_index {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            };
            ListItem::new(line).style(style)
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Destinations")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(list, chunks[0]);

    let perks = app
        .destinations
        .get(app.destination_index)
        .map(|d| d.perks.join(" · "))
        .unwrap_or_default();
    let detail = Paragraph::new(perks)
        .block(Block::default().borders(Borders::ALL).title("Perks"))
        .wrap(Wrap { trim: true });
    f.render_widget(detail, chunks[1]);

    let hints = Paragraph::new("↑↓: browse | Enter: select & book | Esc: back to planner | q: quit")
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(hints, chunks[2]);
}

fn render_booking<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    let meta = &app.planner.snapshot().trip_meta;
    let hotel = meta
        .selected_destination
        .as_ref()
        .map(|d| format!("{} · {}", d.city, d.hotel))
        .unwrap_or_else(|| "No destination selected".to_string());

    let booking = &app.booking;
    let field = |i: usize, label: String| -> Line<'static> {
        let marker = if app.booking_field == i { "> " } else { "  " };
        let style = if app.booking_field == i {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Line::from(Span::styled(format!("{marker}{label}"), style))
    };
    let check = |on: bool| if on { "[x]" } else { "[ ]" };
    let lines = vec![
        Line::from(Span::styled(hotel, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        field(0, format!("Room type: ◂ {} ▸ (fits {})", booking.room_type.label(), booking.room_type.capacity())),
        field(1, format!("Nights:    ◂ {} ▸", booking.nights)),
        field(2, format!("People:    ◂ {} ▸", booking.people)),
        field(3, format!("{} Breakfast", check(booking.meal_plan.breakfast))),
        field(4, format!("{} Lunch", check(booking.meal_plan.lunch))),
        field(5, format!("{} Dinner", check(booking.meal_plan.dinner))),
    ];
    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Booking"));
    f.render_widget(form, halves[0]);

    let base_night_price = meta
        .selected_destination
        .as_ref()
        .map(|d| d.price_per_night)
        .unwrap_or(DEFAULT_BASE_NIGHT_PRICE);
    let totals = compute_totals(&PricingContext {
        base_night_price,
        nights: booking.nights,
        people: booking.people,
        room_type: booking.room_type,
        meal_plan: booking.meal_plan,
    });
    let totals_lines = vec![
        Line::from(format!("Room          {}", format_currency(totals.room_total))),
        Line::from(format!("Meals         {}", format_currency(totals.meals_total))),
        Line::from(format!("Discounts    -{}", format_currency(totals.discounts.total))),
        Line::from(format!("Subtotal      {}", format_currency(totals.discounted_subtotal))),
        Line::from(format!("Taxes & fees  {}", format_currency(totals.taxes.total_taxes_and_fees))),
        Line::from(""),
        Line::from(Span::styled(
            format!("Total         {}", format_currency(totals.grand_total)),
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Green),
        )),
    ];
    let totals_widget = Paragraph::new(totals_lines)
        .block(Block::default().borders(Borders::ALL).title("Estimate"));
    f.render_widget(totals_widget, halves[1]);

    let status = app.status_message.clone().unwrap_or_else(|| {
        "↑↓: field | ←→: adjust | Space: toggle meal | Enter: save | f: finish & plan | u: budget plans | Esc: back | q: quit".to_string()
    });
    let hints = Paragraph::new(status)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(hints, chunks[1]);
}

fn render_budget<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());
    let thirds = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[0]);

    let meta = &app.planner.snapshot().trip_meta;
    let base_night_price = meta
        .selected_destination
        .as_ref()
        .map(|d| d.price_per_night)
        .unwrap_or(DEFAULT_BASE_NIGHT_PRICE);
    let plans = build_suggested_plans(base_night_price, app.booking.nights, app.booking.people);

    for (plan, rect) in plans.iter().zip(thirds.iter()) {
        let lines = vec![
            Line::from(Span::styled(
                plan.badges.join(" · "),
                Style::default().fg(Color::Yellow),
            )),
            Line::from(""),
            Line::from(plan.description.to_string()),
            Line::from(""),
            Line::from(format!("Room      {}", format_currency(plan.totals.room_total))),
            Line::from(format!("Meals     {}", format_currency(plan.totals.meals_total))),
            Line::from(format!("Discounts {}", format_currency(plan.totals.discounts.total))),
            Line::from(""),
            Line::from(Span::styled(
                format!("Total {}", format_currency(plan.totals.grand_total)),
                Style::default().add_modifier(Modifier::BOLD).fg(Color::Green),
            )),
        ];
        let widget = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(plan.label));
        f.render_widget(widget, *rect);
    }

    let hints = Paragraph::new("Suggested plans for your stay | Esc: back to booking | q: quit")
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(hints, chunks[1]);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("WanderPlan Help (Line {}/{})", start_line + 1, help_lines.len()))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

fn render_onboarding_popup(f: &mut Frame) {
    let popup = centered_rect(f.area(), 60, 12);
    f.render_widget(Clear, popup);
    let text = "Welcome to WanderPlan!\n\n\
        Build your itinerary day by day:\n\
        • add activities to the pool with 'n'\n\
        • drag them onto a day with the mouse, or press ']'\n\
        • set a start date with 's' to get real calendar labels\n\
        • browse destinations with 'g' and estimate costs with 'b'\n\n\
        Press Enter to start planning.";
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Getting started")
                .style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(widget, popup);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn get_help_text() -> String {
    r#"WANDERPLAN KEYBOARD REFERENCE

=== THE BOARD ===
The left column is the Activity Pool: ideas not yet scheduled.
Each remaining column is one day of the trip, in itinerary order.

←/→ or h/l      Move between columns
↑/↓ or k/j      Move between activities in a column
[               Send selected activity one column left (end of list)
]               Send selected activity one column right (end of list)
Shift+↑/↓       Reorder selected activity within its day
Mouse drag      Pick up an activity card and drop it on any column

=== ACTIVITIES ===
n               New activity in the pool (type title, Enter)
e or Enter      Edit selected activity (Tab cycles title/time/
                location/note/emoji, Enter saves, Esc cancels)

=== DAYS & DATES ===
a               Add a day at the end
x               Remove the selected day (its activities are discarded)
t               Set trip length (grows or truncates the day list)
s               Set start date (YYYY-MM-DD); day columns get real
                calendar labels and the end date is derived
r               Rename the trip

=== TRAVEL ===
g               Browse destinations (Enter selects and opens booking)
b               Booking: room type, nights, people, meals
u               Budget: suggested Value/Balanced/Premium plans

=== OTHER ===
c               Export the itinerary as CSV
y               Copy a trip summary to the clipboard
o               Log out
F1 or ?         This help
q               Quit

Your plan is saved automatically after every change.
"#
    .to_string()
}
