use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_TRIP_NAME: &str = "My Trip";
pub const DEFAULT_ACTIVITY_TITLE: &str = "New Activity";
pub const DEFAULT_ACTIVITY_EMOJI: &str = "📍";
pub const DEFAULT_BASE_NIGHT_PRICE: i64 = 120;

pub fn new_activity_id() -> String {
    format!("a-{}", Uuid::new_v4())
}

pub fn new_day_id() -> String {
    format!("day-{}", Uuid::new_v4())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub time: String,
    pub location: String,
    pub note: String,
    pub emoji: String,
}

impl Activity {
    /// Builds a new activity from a partial draft, generating a fresh id and
    /// filling unset fields with their defaults.
    pub fn from_draft(draft: ActivityPatch) -> Self {
        Self {
            id: new_activity_id(),
            title: draft
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_ACTIVITY_TITLE.to_string()),
            time: draft.time.unwrap_or_default(),
            location: draft.location.unwrap_or_default(),
            note: draft.note.unwrap_or_default(),
            emoji: draft
                .emoji
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_ACTIVITY_EMOJI.to_string()),
        }
    }
}

/// Partial activity fields. Used both as the draft for creating an activity
/// and as the patch merged into an existing one, field by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityPatch {
    pub title: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub note: Option<String>,
    pub emoji: Option<String>,
}

impl ActivityPatch {
    pub fn apply_to(&self, activity: &mut Activity) {
        if let Some(title) = &self.title {
            activity.title = title.clone();
        }
        if let Some(time) = &self.time {
            activity.time = time.clone();
        }
        if let Some(location) = &self.location {
            activity.location = location.clone();
        }
        if let Some(note) = &self.note {
            activity.note = note.clone();
        }
        if let Some(emoji) = &self.emoji {
            activity.emoji = emoji.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub id: String,
    pub title: String,
    pub date: String,
    pub activities: Vec<Activity>,
}

impl Day {
    pub fn empty(title: String, date: String) -> Self {
        Self {
            id: new_day_id(),
            title,
            date,
            activities: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripMeta {
    pub id: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_destination: Option<Destination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<RoomType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_plan: Option<MealSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_snapshot: Option<PricingSnapshot>,
}

/// The aggregate root: trip metadata, the ordered day list, and the pool of
/// activities not yet assigned to a day. An activity id appears in exactly
/// one container at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    pub trip_meta: TripMeta,
    pub days: Vec<Day>,
    pub unassigned_activities: Vec<Activity>,
}

impl TripPlan {
    /// The hardcoded first-run state: one empty day, empty pool.
    pub fn default_seed(now: &str) -> Self {
        Self {
            trip_meta: TripMeta {
                id: "trip-1".to_string(),
                name: DEFAULT_TRIP_NAME.to_string(),
                start_date: String::new(),
                end_date: String::new(),
                created_at: now.to_string(),
                updated_at: now.to_string(),
                selected_destination: None,
                room_type: None,
                nights: None,
                people: None,
                meal_plan: None,
                pricing_snapshot: None,
            },
            days: vec![Day {
                id: "day-1".to_string(),
                title: "Day 1".to_string(),
                date: String::new(),
                activities: Vec::new(),
            }],
            unassigned_activities: Vec::new(),
        }
    }

    /// Sample content written to storage on the very first launch so a new
    /// user sees a populated board.
    pub fn sample(now: &str) -> Self {
        let activity = |id: &str, title: &str, time: &str, location: &str, note: &str, emoji: &str| {
            Activity {
                id: id.to_string(),
                title: title.to_string(),
                time: time.to_string(),
                location: location.to_string(),
                note: note.to_string(),
                emoji: emoji.to_string(),
            }
        };
        Self {
            trip_meta: TripMeta {
                id: "sample-trip".to_string(),
                name: "Barcelona Weekend".to_string(),
                start_date: String::new(),
                end_date: String::new(),
                created_at: now.to_string(),
                updated_at: now.to_string(),
                selected_destination: None,
                room_type: None,
                nights: None,
                people: None,
                meal_plan: None,
                pricing_snapshot: None,
            },
            days: vec![
                Day {
                    id: "day-1".to_string(),
                    title: "Day 1".to_string(),
                    date: "Fri".to_string(),
                    activities: vec![
                        activity("a-1", "Sagrada Família", "09:30", "Eixample", "Prebook tickets", "⛪"),
                        activity("a-2", "Tapas Lunch", "12:30", "Gothic Quarter", "", "🍤"),
                    ],
                },
                Day {
                    id: "day-2".to_string(),
                    title: "Day 2".to_string(),
                    date: "Sat".to_string(),
                    activities: vec![activity("a-3", "Park Güell", "10:00", "Gràcia", "Great views", "🌳")],
                },
            ],
            unassigned_activities: vec![
                activity("a-4", "Beach Walk", "", "Barceloneta", "", "🏖️"),
                activity("a-5", "Coffee", "", "Born", "Try local roasters", "☕"),
            ],
        }
    }

    pub fn day(&self, day_id: &str) -> Option<&Day> {
        self.days.iter().find(|d| d.id == day_id)
    }

    pub fn day_mut(&mut self, day_id: &str) -> Option<&mut Day> {
        self.days.iter_mut().find(|d| d.id == day_id)
    }

    /// Resolves a container to its activity list: `None` is the pool, `Some`
    /// is a day id.
    pub fn container_mut(&mut self, day_id: Option<&str>) -> Option<&mut Vec<Activity>> {
        match day_id {
            None => Some(&mut self.unassigned_activities),
            Some(id) => self.day_mut(id).map(|d| &mut d.activities),
        }
    }

    /// Searches the pool first, then every day, for an activity by id.
    pub fn find_activity_mut(&mut self, activity_id: &str) -> Option<&mut Activity> {
        if let Some(a) = self.unassigned_activities.iter_mut().find(|a| a.id == activity_id) {
            return Some(a);
        }
        self.days
            .iter_mut()
            .flat_map(|d| d.activities.iter_mut())
            .find(|a| a.id == activity_id)
    }

    pub fn activity_ids(&self) -> Vec<&str> {
        self.unassigned_activities
            .iter()
            .map(|a| a.id.as_str())
            .chain(
                self.days
                    .iter()
                    .flat_map(|d| d.activities.iter().map(|a| a.id.as_str())),
            )
            .collect()
    }

    pub fn activity_count(&self) -> usize {
        self.unassigned_activities.len() + self.days.iter().map(|d| d.activities.len()).sum::<usize>()
    }

    pub fn is_empty_of_activities(&self) -> bool {
        self.activity_count() == 0
    }
}

/// One endpoint of a move: a container (`None` is the pool) and a position
/// within its list.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub day_id: Option<String>,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveRequest {
    pub activity_id: String,
    pub from: Slot,
    pub to: Slot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: String,
    pub city: String,
    pub country: String,
    pub hotel: String,
    pub rating: f64,
    pub price_per_night: i64,
    pub perks: Vec<String>,
}

/// The curated destination catalog shown on the browse screen.
pub fn destination_catalog() -> Vec<Destination> {
    let dest = |id: &str, city: &str, country: &str, hotel: &str, rating: f64, price: i64, perks: &[&str]| {
        Destination {
            id: id.to_string(),
            city: city.to_string(),
            country: country.to_string(),
            hotel: hotel.to_string(),
            rating,
            price_per_night: price,
            perks: perks.iter().map(|p| p.to_string()).collect(),
        }
    };
    vec![
        dest("dest-1", "Barcelona", "Spain", "Grand Vista Hotel", 4.6, 145, &["Breakfast included", "City center", "Rooftop pool"]),
        dest("dest-2", "Lisbon", "Portugal", "Harborview Inn", 4.3, 110, &["Free Wi-Fi", "Ocean view", "City center"]),
        dest("dest-3", "Kyoto", "Japan", "Cedar & Stone", 4.8, 210, &["Breakfast included", "Spa access", "Airport pickup"]),
        dest("dest-4", "Bali", "Indonesia", "Golden Palm Resort", 4.5, 95, &["Ocean view", "Rooftop pool", "Spa access", "Breakfast included"]),
        dest("dest-5", "Reykjavík", "Iceland", "Aurora Suites", 4.4, 230, &["Free Wi-Fi", "Airport pickup", "Spa access"]),
        dest("dest-6", "Vancouver", "Canada", "Mountain Crest Hotel", 4.2, 175, &["City center", "Free Wi-Fi", "Breakfast included"]),
        dest("dest-7", "Paris", "France", "Skyline Boutique", 4.7, 260, &["City center", "Breakfast included", "Rooftop pool"]),
        dest("dest-8", "Rome", "Italy", "Urban Oasis", 4.1, 150, &["City center", "Free Wi-Fi", "Airport pickup"]),
        dest("dest-9", "Marrakesh", "Morocco", "Azure Bay Resort", 4.5, 85, &["Breakfast included", "Rooftop pool", "Spa access", "Airport pickup"]),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Standard,
    Deluxe,
    Suite,
}

impl RoomType {
    pub fn multiplier(self) -> f64 {
        match self {
            RoomType::Standard => 1.0,
            RoomType::Deluxe => 1.35,
            RoomType::Suite => 1.8,
        }
    }

    pub fn capacity(self) -> u32 {
        match self {
            RoomType::Standard => 2,
            RoomType::Deluxe => 4,
            RoomType::Suite => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RoomType::Standard => "Standard",
            RoomType::Deluxe => "Deluxe",
            RoomType::Suite => "Suite",
        }
    }

    pub fn next(self) -> Self {
        match self {
            RoomType::Standard => RoomType::Deluxe,
            RoomType::Deluxe => RoomType::Suite,
            RoomType::Suite => RoomType::Standard,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            RoomType::Standard => RoomType::Suite,
            RoomType::Deluxe => RoomType::Standard,
            RoomType::Suite => RoomType::Deluxe,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealSelection {
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
}

impl MealSelection {
    pub fn all_selected(self) -> bool {
        self.breakfast && self.lunch && self.dinner
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingSelection {
    pub room_type: RoomType,
    pub nights: u32,
    pub people: u32,
    pub meal_plan: MealSelection,
}

impl Default for BookingSelection {
    fn default() -> Self {
        Self {
            room_type: RoomType::Standard,
            nights: 1,
            people: 2,
            meal_plan: MealSelection {
                breakfast: true,
                lunch: false,
                dinner: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discounts {
    pub room_discount: i64,
    pub group_discount: i64,
    pub meal_bundle_discount: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub city_tax: i64,
    pub service_fee: i64,
    pub resort_fee: i64,
    pub total_taxes_and_fees: i64,
}

/// The full pricing pipeline output, stored on `TripMeta` when a booking is
/// saved and rendered by the booking and budget screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSnapshot {
    pub room_total: i64,
    pub meals_total: i64,
    pub discounts: Discounts,
    pub discounted_subtotal: i64,
    pub taxes: TaxBreakdown,
    pub grand_total: i64,
}
