use crate::domain::TripPlan;

pub struct CsvExporter;

impl CsvExporter {
    /// Writes the itinerary to a CSV file: one row per activity, day rows
    /// first in itinerary order, pool rows last under the "Pool" label.
    pub fn export_itinerary(plan: &TripPlan, filename: &str) -> Result<String, String> {
        let mut writer = csv::Writer::from_path(filename).map_err(|e| e.to_string())?;

        writer
            .write_record(["Day", "Date", "Time", "Title", "Location", "Note"])
            .map_err(|e| e.to_string())?;

        for day in &plan.days {
            for activity in &day.activities {
                writer
                    .write_record([
                        day.title.as_str(),
                        day.date.as_str(),
                        activity.time.as_str(),
                        activity.title.as_str(),
                        activity.location.as_str(),
                        activity.note.as_str(),
                    ])
                    .map_err(|e| e.to_string())?;
            }
        }

        for activity in &plan.unassigned_activities {
            writer
                .write_record([
                    "Pool",
                    "",
                    activity.time.as_str(),
                    activity.title.as_str(),
                    activity.location.as_str(),
                    activity.note.as_str(),
                ])
                .map_err(|e| e.to_string())?;
        }

        writer.flush().map_err(|e| e.to_string())?;
        Ok(filename.to_string())
    }
}
