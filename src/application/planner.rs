//! The trip-plan state engine.
//!
//! [`TripPlanner`] is the sole owner and mutator of the [`TripPlan`]
//! aggregate. Every operation runs synchronously from one valid state to
//! another, bumps `updatedAt`, and persists the full aggregate through the
//! versioned envelope; there are no intermediate states. Operations given
//! unknown ids or out-of-range indices degrade to no-ops instead of
//! erroring, and a persistence failure never rolls back the in-memory
//! state.

use serde_json::Value;

use crate::domain::models::{
    Activity, ActivityPatch, BookingSelection, Day, Destination, MoveRequest, TripPlan,
    DEFAULT_BASE_NIGHT_PRICE, DEFAULT_TRIP_NAME,
};
use crate::domain::services::{compute_totals, now_iso, recalc_dates, PricingContext};
use crate::infrastructure::persistence::{
    get_flag, load_json, read_payload, save_json, set_flag, storage_keys, wrap_payload,
    KeyValueStore,
};

pub struct TripPlanner<S: KeyValueStore> {
    plan: TripPlan,
    store: S,
}

impl<S: KeyValueStore> TripPlanner<S> {
    /// Hydrates the engine from storage. On the very first launch (no trip
    /// payload, seeding flag unset) a sample trip is written first so a new
    /// user starts with a populated board. Any invalid payload - wrong or
    /// missing version, malformed structure - falls back to the default
    /// seed and is treated as a first run, not an error.
    pub fn load(store: S) -> Self {
        if load_json(&store, storage_keys::TRIP_PLAN).is_none()
            && !get_flag(&store, storage_keys::SEEDED_SAMPLE)
        {
            if let Ok(value) = serde_json::to_value(TripPlan::sample(&now_iso())) {
                save_json(&store, storage_keys::TRIP_PLAN, &wrap_payload(value));
            }
            set_flag(&store, storage_keys::SEEDED_SAMPLE, true);
        }

        let plan = load_json(&store, storage_keys::TRIP_PLAN)
            .map(|raw| read_payload(&raw))
            .filter(|unwrapped| unwrapped.valid)
            .and_then(|unwrapped| unwrapped.data)
            .and_then(|data: Value| serde_json::from_value::<TripPlan>(data).ok())
            .unwrap_or_else(|| TripPlan::default_seed(&now_iso()));

        Self { plan, store }
    }

    /// Read-only view for rendering. All mutation goes through the
    /// operations below.
    pub fn snapshot(&self) -> &TripPlan {
        &self.plan
    }

    fn persist(&self) {
        if let Ok(value) = serde_json::to_value(&self.plan) {
            save_json(&self.store, storage_keys::TRIP_PLAN, &wrap_payload(value));
        }
    }

    fn commit(&mut self) {
        self.plan.trip_meta.updated_at = now_iso();
        self.persist();
    }

    fn recalc(&mut self) {
        self.plan.trip_meta.end_date =
            recalc_dates(&self.plan.trip_meta.start_date, &mut self.plan.days);
    }

    /// Appends a new day with a fresh unique id and empty activities, then
    /// re-runs the date pass.
    pub fn add_day(&mut self, title: Option<&str>, date: Option<&str>) {
        let next_index = self.plan.days.len() + 1;
        let title = match title {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("Day {next_index}"),
        };
        let date = date.unwrap_or("").to_string();
        self.plan.days.push(Day::empty(title, date));
        self.recalc();
        self.commit();
    }

    /// Removes a day and discards its activities; they do not return to
    /// the pool.
    pub fn remove_day(&mut self, day_id: &str) {
        let before = self.plan.days.len();
        self.plan.days.retain(|d| d.id != day_id);
        if self.plan.days.len() == before {
            return;
        }
        self.recalc();
        self.commit();
    }

    /// Creates an activity from the draft and appends it to the pool.
    /// Returns the generated id.
    pub fn add_activity_to_pool(&mut self, draft: ActivityPatch) -> String {
        let activity = Activity::from_draft(draft);
        let id = activity.id.clone();
        self.plan.unassigned_activities.push(activity);
        self.commit();
        id
    }

    /// Merges the patch into the matching activity wherever it is found
    /// (pool first, then every day). An unknown id leaves the aggregate,
    /// including `updatedAt`, untouched.
    pub fn update_activity(&mut self, activity_id: &str, patch: &ActivityPatch) {
        if let Some(activity) = self.plan.find_activity_mut(activity_id) {
            patch.apply_to(activity);
            self.commit();
        }
    }

    /// Relocates an activity between containers by index. The instance is
    /// preserved field-for-field. The whole move is a no-op when the source
    /// holds no item at that index, when the source day is unknown, or when
    /// the destination day is unknown; an oversized destination index
    /// appends at the end of the target list.
    pub fn move_activity(&mut self, request: &MoveRequest) {
        let activity = match self.plan.container_mut(request.from.day_id.as_deref()) {
            Some(list) if request.from.index < list.len() => list.remove(request.from.index),
            _ => return,
        };

        match self.plan.container_mut(request.to.day_id.as_deref()) {
            Some(list) => {
                let index = request.to.index.min(list.len());
                list.insert(index, activity);
            }
            None => {
                // Unknown destination day: undo the removal so the whole
                // move is a no-op instead of a silent drop.
                if let Some(list) = self.plan.container_mut(request.from.day_id.as_deref()) {
                    let index = request.from.index.min(list.len());
                    list.insert(index, activity);
                }
                return;
            }
        }

        self.commit();
    }

    /// Moves an activity to a new position within the same day. The list
    /// length and every other item's relative order are preserved.
    pub fn reorder_activities(&mut self, day_id: &str, from_index: usize, to_index: usize) {
        let Some(day) = self.plan.day_mut(day_id) else {
            return;
        };
        if from_index >= day.activities.len() {
            return;
        }
        let activity = day.activities.remove(from_index);
        let index = to_index.min(day.activities.len());
        day.activities.insert(index, activity);
        self.commit();
    }

    pub fn rename_trip(&mut self, name: &str) {
        self.plan.trip_meta.name = name.to_string();
        self.commit();
    }

    /// Refreshes `updatedAt` without changing any substantive content.
    pub fn touch(&mut self) {
        self.commit();
    }

    /// Sets the trip start date and re-runs the date pass: every day gets a
    /// sequential calendar date label and the end date becomes start +
    /// (dayCount - 1). An empty or unparseable date clears the end date and
    /// falls back to bare "Day N" labels.
    pub fn set_start_date(&mut self, iso_date: &str) {
        self.plan.trip_meta.start_date = iso_date.to_string();
        self.recalc();
        self.commit();
    }

    /// Grows or truncates the day list to exactly `max(1, n)` days. Growth
    /// appends fresh empty days; truncation discards trailing days together
    /// with their activities.
    pub fn set_trip_length(&mut self, length: usize) {
        let target = length.max(1);
        while self.plan.days.len() < target {
            let title = format!("Day {}", self.plan.days.len() + 1);
            self.plan.days.push(Day::empty(title, String::new()));
        }
        self.plan.days.truncate(target);
        self.recalc();
        self.commit();
    }

    /// Stores the chosen destination on the trip. A trip still carrying the
    /// default name is renamed to "<city> Getaway".
    pub fn select_destination(&mut self, destination: &Destination) {
        self.plan.trip_meta.selected_destination = Some(destination.clone());
        let name = &self.plan.trip_meta.name;
        if name.is_empty() || name == DEFAULT_TRIP_NAME {
            self.plan.trip_meta.name = format!("{} Getaway", destination.city);
        }
        self.commit();
    }

    /// Stores the booking fields (nights clamped to >= 1, people to 1..=8)
    /// and a fresh pricing snapshot computed from the selected destination's
    /// nightly price.
    pub fn set_booking(&mut self, selection: &BookingSelection) {
        let nights = selection.nights.max(1);
        let people = selection.people.clamp(1, 8);
        let base_night_price = self
            .plan
            .trip_meta
            .selected_destination
            .as_ref()
            .map(|d| d.price_per_night)
            .unwrap_or(DEFAULT_BASE_NIGHT_PRICE);

        let snapshot = compute_totals(&PricingContext {
            base_night_price,
            nights,
            people,
            room_type: selection.room_type,
            meal_plan: selection.meal_plan,
        });

        let meta = &mut self.plan.trip_meta;
        meta.room_type = Some(selection.room_type);
        meta.nights = Some(nights);
        meta.people = Some(people);
        meta.meal_plan = Some(selection.meal_plan);
        meta.pricing_snapshot = Some(snapshot);
        self.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{destination_catalog, MealSelection, RoomType, Slot};
    use crate::infrastructure::persistence::MemoryStore;
    use std::collections::HashSet;

    fn empty_planner() -> TripPlanner<MemoryStore> {
        let store = MemoryStore::new();
        set_flag(&store, storage_keys::SEEDED_SAMPLE, true); // skip sample seeding
        TripPlanner::load(store)
    }

    fn planner_with_pool(titles: &[&str]) -> TripPlanner<MemoryStore> {
        let mut planner = empty_planner();
        for title in titles {
            planner.add_activity_to_pool(ActivityPatch {
                title: Some(title.to_string()),
                ..ActivityPatch::default()
            });
        }
        planner
    }

    fn assert_unique_ids(plan: &TripPlan) {
        let ids = plan.activity_ids();
        let set: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(ids.len(), set.len(), "duplicate activity id in {ids:?}");
    }

    #[test]
    fn test_default_seed_on_empty_store() {
        let planner = empty_planner();
        let plan = planner.snapshot();
        assert_eq!(plan.trip_meta.name, "My Trip");
        assert_eq!(plan.days.len(), 1);
        assert!(plan.unassigned_activities.is_empty());
        assert!(!plan.trip_meta.created_at.is_empty());
    }

    #[test]
    fn test_first_run_seeds_sample_trip() {
        let store = MemoryStore::new();
        let planner = TripPlanner::load(store.clone());
        assert_eq!(planner.snapshot().trip_meta.name, "Barcelona Weekend");
        assert_eq!(planner.snapshot().days.len(), 2);
        assert_eq!(planner.snapshot().unassigned_activities.len(), 2);
        assert!(get_flag(&store, storage_keys::SEEDED_SAMPLE));
    }

    #[test]
    fn test_sample_not_reseeded_after_clearing_trip() {
        let store = MemoryStore::new();
        TripPlanner::load(store.clone());
        store.remove(storage_keys::TRIP_PLAN);

        let planner = TripPlanner::load(store);
        assert_eq!(planner.snapshot().trip_meta.name, "My Trip"); // default, not sample
    }

    #[test]
    fn test_hydrates_persisted_state() {
        let store = MemoryStore::new();
        set_flag(&store, storage_keys::SEEDED_SAMPLE, true);
        {
            let mut planner = TripPlanner::load(store.clone());
            planner.rename_trip("Kyoto in Autumn");
            planner.add_day(None, None);
        }
        let planner = TripPlanner::load(store);
        assert_eq!(planner.snapshot().trip_meta.name, "Kyoto in Autumn");
        assert_eq!(planner.snapshot().days.len(), 2);
    }

    #[test]
    fn test_version_mismatch_falls_back_to_seed() {
        let store = MemoryStore::new();
        set_flag(&store, storage_keys::SEEDED_SAMPLE, true);
        store.set(
            storage_keys::TRIP_PLAN,
            r#"{"version":2,"savedAt":"x","data":{"tripMeta":{"id":"t","name":"Old"},"days":[],"unassignedActivities":[]}}"#,
        );
        let planner = TripPlanner::load(store);
        assert_eq!(planner.snapshot().trip_meta.name, "My Trip");
    }

    #[test]
    fn test_malformed_payload_falls_back_to_seed() {
        let store = MemoryStore::new();
        set_flag(&store, storage_keys::SEEDED_SAMPLE, true);
        store.set(storage_keys::TRIP_PLAN, "{chewed up");
        let planner = TripPlanner::load(store.clone());
        assert_eq!(planner.snapshot().days.len(), 1);

        // Valid envelope, structurally wrong data: also the seed.
        store.set(storage_keys::TRIP_PLAN, r#"{"version":1,"savedAt":"x","data":{"days":"nope"}}"#);
        let planner = TripPlanner::load(store);
        assert_eq!(planner.snapshot().trip_meta.name, "My Trip");
    }

    #[test]
    fn test_add_day_appends_with_fresh_id() {
        let mut planner = empty_planner();
        planner.add_day(None, None);
        planner.add_day(None, None);

        let plan = planner.snapshot();
        assert_eq!(plan.days.len(), 3);
        let ids: HashSet<&str> = plan.days.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(plan.days[2].title, "Day 3");
        assert!(plan.days[2].activities.is_empty());
    }

    #[test]
    fn test_remove_day_discards_its_activities() {
        let mut planner = planner_with_pool(&["Museum"]);
        planner.add_day(None, None);
        let (first_day, second_day) = {
            let plan = planner.snapshot();
            (plan.days[0].id.clone(), plan.days[1].id.clone())
        };
        planner.move_activity(&MoveRequest {
            activity_id: planner.snapshot().unassigned_activities[0].id.clone(),
            from: Slot { day_id: None, index: 0 },
            to: Slot { day_id: Some(second_day.clone()), index: 0 },
        });

        planner.remove_day(&second_day);

        let plan = planner.snapshot();
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].id, first_day);
        assert_eq!(plan.activity_count(), 0); // discarded, not returned to pool
    }

    #[test]
    fn test_remove_unknown_day_leaves_updated_at_alone() {
        let mut planner = empty_planner();
        let before = planner.snapshot().trip_meta.updated_at.clone();
        planner.remove_day("day-nope");
        assert_eq!(planner.snapshot().trip_meta.updated_at, before);
        assert_eq!(planner.snapshot().days.len(), 1);
    }

    #[test]
    fn test_add_activity_defaults() {
        let mut planner = empty_planner();
        planner.add_activity_to_pool(ActivityPatch {
            title: Some("Coffee".to_string()),
            ..ActivityPatch::default()
        });

        let pool = &planner.snapshot().unassigned_activities;
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].title, "Coffee");
        assert_eq!(pool[0].time, "");
        assert_eq!(pool[0].location, "");
        assert_eq!(pool[0].note, "");
        assert_eq!(pool[0].emoji, "📍");
        assert!(pool[0].id.starts_with("a-"));
    }

    #[test]
    fn test_add_activity_empty_draft_gets_full_defaults() {
        let mut planner = empty_planner();
        let id = planner.add_activity_to_pool(ActivityPatch::default());
        let pool = &planner.snapshot().unassigned_activities;
        assert_eq!(pool[0].title, "New Activity");
        assert_eq!(pool[0].id, id);
        assert_unique_ids(planner.snapshot());
    }

    #[test]
    fn test_update_activity_merges_patch_wherever_found() {
        let mut planner = planner_with_pool(&["Coffee"]);
        let id = planner.snapshot().unassigned_activities[0].id.clone();

        planner.update_activity(
            &id,
            &ActivityPatch {
                time: Some("08:30".to_string()),
                note: Some("flat white".to_string()),
                ..ActivityPatch::default()
            },
        );

        let activity = &planner.snapshot().unassigned_activities[0];
        assert_eq!(activity.title, "Coffee"); // untouched fields survive
        assert_eq!(activity.time, "08:30");
        assert_eq!(activity.note, "flat white");

        // Same patch path works for an activity living inside a day.
        let day_id = planner.snapshot().days[0].id.clone();
        planner.move_activity(&MoveRequest {
            activity_id: id.clone(),
            from: Slot { day_id: None, index: 0 },
            to: Slot { day_id: Some(day_id), index: 0 },
        });
        planner.update_activity(
            &id,
            &ActivityPatch {
                location: Some("Born".to_string()),
                ..ActivityPatch::default()
            },
        );
        assert_eq!(planner.snapshot().days[0].activities[0].location, "Born");
    }

    #[test]
    fn test_update_unknown_activity_is_a_complete_noop() {
        let mut planner = planner_with_pool(&["Coffee"]);
        let before = planner.snapshot().clone();

        planner.update_activity(
            "nonexistent-id",
            &ActivityPatch {
                title: Some("x".to_string()),
                ..ActivityPatch::default()
            },
        );

        assert_eq!(planner.snapshot(), &before); // updatedAt included
    }

    #[test]
    fn test_move_pool_to_day_conserves_activity() {
        let mut planner = planner_with_pool(&["Museum", "Lunch"]);
        let day_id = planner.snapshot().days[0].id.clone();
        let moved = planner.snapshot().unassigned_activities[0].clone();

        planner.move_activity(&MoveRequest {
            activity_id: moved.id.clone(),
            from: Slot { day_id: None, index: 0 },
            to: Slot { day_id: Some(day_id), index: 0 },
        });

        let plan = planner.snapshot();
        assert_eq!(plan.activity_count(), 2);
        assert_eq!(plan.unassigned_activities.len(), 1);
        assert_eq!(plan.days[0].activities, vec![moved]); // fields preserved exactly
        assert_unique_ids(plan);
    }

    #[test]
    fn test_move_day_to_pool_at_position() {
        let mut planner = planner_with_pool(&["A", "B"]);
        let day_id = planner.snapshot().days[0].id.clone();
        let id_a = planner.snapshot().unassigned_activities[0].id.clone();
        planner.move_activity(&MoveRequest {
            activity_id: id_a.clone(),
            from: Slot { day_id: None, index: 0 },
            to: Slot { day_id: Some(day_id.clone()), index: 0 },
        });

        // Bring it back to the front of the pool.
        planner.move_activity(&MoveRequest {
            activity_id: id_a.clone(),
            from: Slot { day_id: Some(day_id), index: 0 },
            to: Slot { day_id: None, index: 0 },
        });

        let plan = planner.snapshot();
        assert_eq!(plan.unassigned_activities[0].id, id_a);
        assert_eq!(plan.unassigned_activities.len(), 2);
        assert_eq!(plan.days[0].activities.len(), 0);
    }

    #[test]
    fn test_move_with_stale_source_index_is_noop() {
        let mut planner = planner_with_pool(&["Only"]);
        let day_id = planner.snapshot().days[0].id.clone();
        let before = planner.snapshot().clone();

        planner.move_activity(&MoveRequest {
            activity_id: "a-whatever".to_string(),
            from: Slot { day_id: None, index: 5 },
            to: Slot { day_id: Some(day_id), index: 0 },
        });

        assert_eq!(planner.snapshot(), &before);
    }

    #[test]
    fn test_move_from_unknown_day_is_noop() {
        let mut planner = planner_with_pool(&["Only"]);
        let before = planner.snapshot().clone();
        planner.move_activity(&MoveRequest {
            activity_id: "a-1".to_string(),
            from: Slot { day_id: Some("day-missing".to_string()), index: 0 },
            to: Slot { day_id: None, index: 0 },
        });
        assert_eq!(planner.snapshot(), &before);
    }

    #[test]
    fn test_move_to_unknown_day_drops_nothing() {
        let mut planner = planner_with_pool(&["Keep me"]);
        let before = planner.snapshot().clone();

        planner.move_activity(&MoveRequest {
            activity_id: before.unassigned_activities[0].id.clone(),
            from: Slot { day_id: None, index: 0 },
            to: Slot { day_id: Some("day-missing".to_string()), index: 0 },
        });

        assert_eq!(planner.snapshot(), &before);
        assert_eq!(planner.snapshot().activity_count(), 1);
    }

    #[test]
    fn test_move_clamps_oversized_destination_index() {
        let mut planner = planner_with_pool(&["A", "B"]);
        let day_id = planner.snapshot().days[0].id.clone();

        planner.move_activity(&MoveRequest {
            activity_id: planner.snapshot().unassigned_activities[0].id.clone(),
            from: Slot { day_id: None, index: 0 },
            to: Slot { day_id: Some(day_id), index: 99 },
        });

        assert_eq!(planner.snapshot().days[0].activities.len(), 1); // appended
        assert_unique_ids(planner.snapshot());
    }

    #[test]
    fn test_reorder_within_day() {
        let mut planner = planner_with_pool(&["A", "B", "C"]);
        let day_id = planner.snapshot().days[0].id.clone();
        for _ in 0..3 {
            planner.move_activity(&MoveRequest {
                activity_id: planner.snapshot().unassigned_activities[0].id.clone(),
                from: Slot { day_id: None, index: 0 },
                to: Slot { day_id: Some(day_id.clone()), index: 99 },
            });
        }
        let titles = |planner: &TripPlanner<MemoryStore>| {
            planner.snapshot().days[0]
                .activities
                .iter()
                .map(|a| a.title.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(titles(&planner), ["A", "B", "C"]);

        planner.reorder_activities(&day_id, 0, 2);
        assert_eq!(titles(&planner), ["B", "C", "A"]);

        planner.reorder_activities(&day_id, 2, 0);
        assert_eq!(titles(&planner), ["A", "B", "C"]);
    }

    #[test]
    fn test_reorder_out_of_range_is_noop() {
        let mut planner = planner_with_pool(&["A"]);
        let day_id = planner.snapshot().days[0].id.clone();
        let before = planner.snapshot().clone();
        planner.reorder_activities(&day_id, 3, 0);
        assert_eq!(planner.snapshot(), &before);
    }

    #[test]
    fn test_rename_and_touch_bump_updated_at() {
        let mut planner = empty_planner();
        let t0 = planner.snapshot().trip_meta.updated_at.clone();
        planner.rename_trip("Island Hop");
        assert_eq!(planner.snapshot().trip_meta.name, "Island Hop");
        assert!(planner.snapshot().trip_meta.updated_at >= t0);

        let before = planner.snapshot().clone();
        planner.touch();
        let after = planner.snapshot();
        assert_eq!(after.days, before.days);
        assert_eq!(after.trip_meta.name, before.trip_meta.name);
        assert!(after.trip_meta.updated_at >= before.trip_meta.updated_at);
    }

    #[test]
    fn test_set_start_date_walks_sequential_dates() {
        let mut planner = empty_planner();
        planner.set_trip_length(3);
        planner.set_start_date("2024-06-07");

        let plan = planner.snapshot();
        assert_eq!(plan.trip_meta.start_date, "2024-06-07");
        assert_eq!(plan.trip_meta.end_date, "2024-06-09");
        assert_eq!(plan.days[0].date, "Fri 6/7");
        assert_eq!(plan.days[1].date, "Sat 6/8");
        assert_eq!(plan.days[2].date, "Sun 6/9");
    }

    #[test]
    fn test_clearing_start_date_clears_end_date() {
        let mut planner = empty_planner();
        planner.set_trip_length(3);
        planner.set_start_date("2024-06-07");
        planner.set_start_date("");

        let plan = planner.snapshot();
        assert_eq!(plan.trip_meta.end_date, "");
        assert_eq!(plan.days[1].title, "Day 2");
    }

    #[test]
    fn test_structural_changes_rerun_date_pass() {
        let mut planner = empty_planner();
        planner.set_start_date("2024-06-07");
        planner.add_day(None, None);
        assert_eq!(planner.snapshot().trip_meta.end_date, "2024-06-08");
        assert_eq!(planner.snapshot().days[1].date, "Sat 6/8");

        let second = planner.snapshot().days[1].id.clone();
        planner.remove_day(&second);
        assert_eq!(planner.snapshot().trip_meta.end_date, "2024-06-07");
    }

    #[test]
    fn test_set_trip_length_grows_and_truncates() {
        let mut planner = empty_planner();
        planner.set_trip_length(5);
        assert_eq!(planner.snapshot().days.len(), 5);

        // Park an activity on day 2 so truncation keeps it...
        let day2 = planner.snapshot().days[1].id.clone();
        planner.add_activity_to_pool(ActivityPatch {
            title: Some("Kept".to_string()),
            ..ActivityPatch::default()
        });
        planner.move_activity(&MoveRequest {
            activity_id: planner.snapshot().unassigned_activities[0].id.clone(),
            from: Slot { day_id: None, index: 0 },
            to: Slot { day_id: Some(day2.clone()), index: 0 },
        });
        // ...and one on day 5, which truncation discards.
        planner.add_activity_to_pool(ActivityPatch {
            title: Some("Dropped".to_string()),
            ..ActivityPatch::default()
        });
        let day5 = planner.snapshot().days[4].id.clone();
        planner.move_activity(&MoveRequest {
            activity_id: planner.snapshot().unassigned_activities[0].id.clone(),
            from: Slot { day_id: None, index: 0 },
            to: Slot { day_id: Some(day5), index: 0 },
        });

        let kept_ids: Vec<String> =
            planner.snapshot().days[..2].iter().map(|d| d.id.clone()).collect();
        planner.set_trip_length(2);

        let plan = planner.snapshot();
        assert_eq!(plan.days.len(), 2);
        assert_eq!(plan.days[0].id, kept_ids[0]);
        assert_eq!(plan.days[1].id, kept_ids[1]);
        assert_eq!(plan.days[1].activities[0].title, "Kept");
        assert_eq!(plan.activity_count(), 1);
    }

    #[test]
    fn test_set_trip_length_minimum_is_one() {
        let mut planner = empty_planner();
        planner.set_trip_length(0);
        assert_eq!(planner.snapshot().days.len(), 1);
    }

    #[test]
    fn test_select_destination_renames_default_trip_only() {
        let mut planner = empty_planner();
        let kyoto = destination_catalog().into_iter().find(|d| d.city == "Kyoto").unwrap();
        planner.select_destination(&kyoto);
        assert_eq!(planner.snapshot().trip_meta.name, "Kyoto Getaway");

        let lisbon = destination_catalog().into_iter().find(|d| d.city == "Lisbon").unwrap();
        planner.select_destination(&lisbon);
        assert_eq!(planner.snapshot().trip_meta.name, "Kyoto Getaway"); // custom name kept
        assert_eq!(
            planner.snapshot().trip_meta.selected_destination.as_ref().unwrap().city,
            "Lisbon"
        );
    }

    #[test]
    fn test_set_booking_clamps_and_snapshots() {
        let mut planner = empty_planner();
        planner.set_booking(&BookingSelection {
            room_type: RoomType::Deluxe,
            nights: 0,
            people: 12,
            meal_plan: MealSelection { breakfast: true, lunch: true, dinner: true },
        });

        let meta = &planner.snapshot().trip_meta;
        assert_eq!(meta.nights, Some(1));
        assert_eq!(meta.people, Some(8));
        assert_eq!(meta.room_type, Some(RoomType::Deluxe));
        let snapshot = meta.pricing_snapshot.as_ref().unwrap();
        assert_eq!(snapshot.room_total, 162); // deluxe on the default base price
        assert!(snapshot.grand_total > snapshot.discounted_subtotal);
    }

    #[test]
    fn test_booking_uses_selected_destination_price() {
        let mut planner = empty_planner();
        let bali = destination_catalog().into_iter().find(|d| d.city == "Bali").unwrap();
        planner.select_destination(&bali);
        planner.set_booking(&BookingSelection {
            room_type: RoomType::Standard,
            nights: 2,
            people: 2,
            meal_plan: MealSelection::default(),
        });
        let snapshot = planner.snapshot().trip_meta.pricing_snapshot.as_ref().unwrap();
        assert_eq!(snapshot.room_total, 190); // 95 * 2
    }

    #[test]
    fn test_every_mutation_persists_a_valid_envelope() {
        let store = MemoryStore::new();
        set_flag(&store, storage_keys::SEEDED_SAMPLE, true);
        let mut planner = TripPlanner::load(store.clone());
        planner.add_day(None, None);

        let raw = load_json(&store, storage_keys::TRIP_PLAN).unwrap();
        let unwrapped = read_payload(&raw);
        assert!(unwrapped.valid);
        let persisted: TripPlan = serde_json::from_value(unwrapped.data.unwrap()).unwrap();
        assert_eq!(&persisted, planner.snapshot());
    }

    #[test]
    fn test_persisted_layout_uses_camel_case_keys() {
        let store = MemoryStore::new();
        set_flag(&store, storage_keys::SEEDED_SAMPLE, true);
        let mut planner = TripPlanner::load(store.clone());
        planner.set_start_date("2024-06-07");

        let raw = store.get(storage_keys::TRIP_PLAN).unwrap();
        assert!(raw.contains("\"savedAt\""));
        assert!(raw.contains("\"tripMeta\""));
        assert!(raw.contains("\"startDate\":\"2024-06-07\""));
        assert!(raw.contains("\"unassignedActivities\""));
        assert!(raw.contains("\"updatedAt\""));
        assert!(!raw.contains("\"selectedDestination\"")); // absent optionals omitted
    }

    #[test]
    fn test_uniqueness_holds_across_a_busy_session() {
        let mut planner = TripPlanner::load(MemoryStore::new()); // sample content
        planner.set_trip_length(4);
        planner.add_activity_to_pool(ActivityPatch::default());
        let day3 = planner.snapshot().days[2].id.clone();
        planner.move_activity(&MoveRequest {
            activity_id: planner.snapshot().unassigned_activities[0].id.clone(),
            from: Slot { day_id: None, index: 0 },
            to: Slot { day_id: Some(day3.clone()), index: 0 },
        });
        planner.reorder_activities(&day3, 0, 1);
        planner.set_trip_length(2);
        planner.add_day(None, None);

        assert_unique_ids(planner.snapshot());
    }
}
