use chrono::NaiveDate;

use societies_core::today;

use crate::model::LogActivityInput;
use crate::service::{PointsError, PointsService};

/// The outcome of point resolution: everything a logged activity needs
/// beyond the caller's identity.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedActivity {
    pub name: String,
    pub description: String,
    pub activity_type_id: String,
    pub activity_id: Option<String>,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub no_of_participants: Option<i64>,
    pub value: i64,
}

impl PointsService {
    /// Resolve a log/edit payload into a dated, valued activity.
    ///
    /// Either an occurrence id or a type id plus date must be supplied.
    /// The 30-day staleness window counts from the resolved date in
    /// both paths; exactly 30 days old is still accepted.
    pub(crate) fn resolve_activity(
        &self,
        input: &LogActivityInput,
    ) -> Result<ResolvedActivity, PointsError> {
        let (activity_type, activity, date) = if let Some(activity_id) = input.activity_id.as_deref()
        {
            let activity = self
                .catalog
                .get_activity(activity_id)
                .map_err(|_| PointsError::Unprocessable("Invalid activity id".into()))?;
            let activity_type =
                self.catalog.get_activity_type(&activity.activity_type_id).map_err(|e| {
                    PointsError::Internal(format!("occurrence references missing type: {e}"))
                })?;
            let date = parse_date(&activity.activity_date)?;
            (activity_type, Some(activity), date)
        } else {
            let type_id = input.activity_type_id.as_deref().unwrap_or("").trim();
            let raw_date = input.date.as_deref().unwrap_or("").trim();
            if type_id.is_empty() || raw_date.is_empty() {
                return Err(PointsError::Validation(
                    "An activity id, or an activity type id and a date, are required".into(),
                ));
            }
            let activity_type = self
                .catalog
                .get_activity_type(type_id)
                .map_err(|_| PointsError::Unprocessable("Invalid activity type id".into()))?;
            let date = parse_date(raw_date)?;
            if date > today() {
                return Err(PointsError::Unprocessable(
                    "Invalid date. The activity date cannot be in the future.".into(),
                ));
            }
            (activity_type, None, date)
        };

        if (today() - date).num_days() > 30 {
            return Err(PointsError::Unprocessable(
                "You're late. That activity happened more than 30 days ago".into(),
            ));
        }

        let (no_of_participants, value) = if activity_type.supports_multiple_participants {
            let participants = input.no_of_participants.unwrap_or(0);
            let has_description =
                input.description.as_deref().is_some_and(|d| !d.trim().is_empty());
            if participants < 1 || !has_description {
                return Err(PointsError::Validation(
                    "A description and the number of participants are required for this \
                     activity type"
                        .into(),
                ));
            }
            (Some(participants), activity_type.value * participants)
        } else {
            (None, activity_type.value)
        };

        let name = activity
            .as_ref()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| activity_type.name.clone());
        let description = input
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .or_else(|| activity.as_ref().map(|a| a.description.clone()))
            .unwrap_or_else(|| activity_type.description.clone());

        Ok(ResolvedActivity {
            name,
            description,
            activity_type_id: activity_type.id,
            activity_id: activity.map(|a| a.id),
            date: date.format("%Y-%m-%d").to_string(),
            no_of_participants,
            value,
        })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, PointsError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        PointsError::Validation("Invalid date. The expected format is YYYY-MM-DD.".into())
    })
}

#[cfg(test)]
mod tests {
    use crate::model::LogActivityInput;
    use crate::service::PointsError;
    use crate::service::testutil::harness;

    fn by_type(type_id: &str, date: &str) -> LogActivityInput {
        LogActivityInput {
            activity_type_id: Some(type_id.into()),
            date: Some(date.into()),
            ..Default::default()
        }
    }

    #[test]
    fn resolves_value_from_type() {
        let h = harness();
        let type_id = h.seed_type("Hackathon", 100, false);

        let resolved = h.points.resolve_activity(&by_type(&type_id, &h.days_ago(3))).unwrap();
        assert_eq!(resolved.value, 100);
        assert_eq!(resolved.name, "Hackathon");
        assert!(resolved.activity_id.is_none());
    }

    #[test]
    fn multiplies_value_by_participants() {
        let h = harness();
        let type_id = h.seed_type("Bootcamp Interviews", 20, true);

        let mut input = by_type(&type_id, &h.days_ago(1));
        input.no_of_participants = Some(5);
        input.description = Some("Interviewed five candidates".into());

        let resolved = h.points.resolve_activity(&input).unwrap();
        assert_eq!(resolved.value, 100);
        assert_eq!(resolved.no_of_participants, Some(5));
    }

    #[test]
    fn multi_participant_type_requires_count_and_description() {
        let h = harness();
        let type_id = h.seed_type("Bootcamp Interviews", 20, true);

        let err = h.points.resolve_activity(&by_type(&type_id, &h.days_ago(1))).unwrap_err();
        assert!(matches!(err, PointsError::Validation(_)));
    }

    #[test]
    fn thirty_days_is_the_boundary() {
        let h = harness();
        let type_id = h.seed_type("Hackathon", 100, false);

        assert!(h.points.resolve_activity(&by_type(&type_id, &h.days_ago(30))).is_ok());

        let err = h.points.resolve_activity(&by_type(&type_id, &h.days_ago(31))).unwrap_err();
        assert!(matches!(err, PointsError::Unprocessable(ref m)
            if m == "You're late. That activity happened more than 30 days ago"));
    }

    #[test]
    fn future_date_is_refused() {
        let h = harness();
        let type_id = h.seed_type("Hackathon", 100, false);
        let err = h.points.resolve_activity(&by_type(&type_id, &h.days_ago(-1))).unwrap_err();
        assert!(matches!(err, PointsError::Unprocessable(_)));
    }

    #[test]
    fn unknown_ids_are_unprocessable() {
        let h = harness();
        let err = h.points.resolve_activity(&by_type("missing", &h.days_ago(1))).unwrap_err();
        assert!(matches!(err, PointsError::Unprocessable(ref m) if m == "Invalid activity type id"));

        let err = h
            .points
            .resolve_activity(&LogActivityInput {
                activity_id: Some("missing".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, PointsError::Unprocessable(ref m) if m == "Invalid activity id"));
    }

    #[test]
    fn occurrence_supplies_type_and_date() {
        let h = harness();
        let type_id = h.seed_type("Tech Event", 2500, false);
        let occurrence = h.seed_occurrence("Tech Congress", &type_id, &h.days_ago(5));

        let resolved = h
            .points
            .resolve_activity(&LogActivityInput {
                activity_id: Some(occurrence.clone()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(resolved.value, 2500);
        assert_eq!(resolved.name, "Tech Congress");
        assert_eq!(resolved.activity_id.as_deref(), Some(occurrence.as_str()));

        let stale = h.seed_occurrence("Old Congress", &type_id, &h.days_ago(40));
        let err = h
            .points
            .resolve_activity(&LogActivityInput {
                activity_id: Some(stale),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, PointsError::Unprocessable(_)));
    }

    #[test]
    fn missing_type_or_date_is_invalid() {
        let h = harness();
        let err = h.points.resolve_activity(&LogActivityInput::default()).unwrap_err();
        assert!(matches!(err, PointsError::Validation(_)));
    }
}
