use societies_core::{PageParams, Principal, new_id, now_rfc3339};
use societies_notify::Notification;
use societies_sql::Value;
use tracing::info;

use crate::model::{ActivityStatus, BulkApproveInput, LogActivityInput, LoggedActivity};
use crate::service::{PointsError, PointsService};

/// Cap on ids per bulk approval call.
const MAX_BULK_APPROVE: usize = 20;

impl PointsService {
    /// Log an activity for the caller. The record starts `in review`.
    pub fn log_activity(
        &self,
        principal: &Principal,
        input: &LogActivityInput,
    ) -> Result<LoggedActivity, PointsError> {
        let society_id = principal
            .society_id
            .as_deref()
            .ok_or_else(|| {
                PointsError::Unprocessable("You are not a member of any society yet".into())
            })?
            .to_string();

        let resolved = self.resolve_activity(input)?;
        let now = now_rfc3339();
        let record = LoggedActivity {
            id: new_id(),
            name: resolved.name,
            description: resolved.description,
            photo: input.photo.clone(),
            value: resolved.value,
            status: ActivityStatus::InReview,
            activity_date: resolved.date,
            no_of_participants: resolved.no_of_participants,
            redeemed: false,
            approver_id: None,
            reviewer_id: None,
            approved_at: None,
            user_id: principal.user_id.clone(),
            society_id,
            activity_type_id: resolved.activity_type_id,
            activity_id: resolved.activity_id,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_row(
            "logged_activities",
            &record.id,
            &record,
            &[
                ("status", Value::text(record.status.as_str())),
                ("redeemed", Value::bool(record.redeemed)),
                ("value", Value::Integer(record.value)),
                ("user_id", Value::text(&record.user_id)),
                ("society_id", Value::text(&record.society_id)),
                ("created_at", Value::text(&now)),
            ],
        )?;

        info!(id = %record.id, user = %record.user_id, value = record.value, "activity logged");
        Ok(record)
    }

    /// Get a logged activity by id.
    pub fn get_logged_activity(&self, id: &str) -> Result<LoggedActivity, PointsError> {
        self.get_row("logged_activities", id)
            .map_err(|_| PointsError::NotFound("Logged activity does not exist.".into()))
    }

    /// List all logged activities, newest first.
    pub fn list_logged_activities(
        &self,
        params: &PageParams,
    ) -> Result<(Vec<LoggedActivity>, usize), PointsError> {
        let params = params.normalized();
        self.list_rows("logged_activities", &[], params.limit, params.offset())
    }

    /// List one user's logged activities.
    pub fn list_user_activities(
        &self,
        user_id: &str,
        params: &PageParams,
    ) -> Result<(Vec<LoggedActivity>, usize), PointsError> {
        let params = params.normalized();
        self.list_rows(
            "logged_activities",
            &[("user_id", Value::text(user_id))],
            params.limit,
            params.offset(),
        )
    }

    /// List one society's logged activities.
    pub fn list_society_activities(
        &self,
        society_id: &str,
        params: &PageParams,
    ) -> Result<(Vec<LoggedActivity>, usize), PointsError> {
        let params = params.normalized();
        self.list_rows(
            "logged_activities",
            &[("society_id", Value::text(society_id))],
            params.limit,
            params.offset(),
        )
    }

    /// Edit a logged activity. Owner only, and only while `in review`.
    pub fn edit_logged_activity(
        &self,
        principal: &Principal,
        id: &str,
        input: &LogActivityInput,
    ) -> Result<LoggedActivity, PointsError> {
        let mut record = self.owned_activity(principal, id)?;
        if record.status != ActivityStatus::InReview {
            return Err(PointsError::PermissionDenied(
                "You can only edit a logged activity that is in review.".into(),
            ));
        }

        let resolved = self.resolve_activity(input)?;
        record.name = resolved.name;
        record.description = resolved.description;
        record.value = resolved.value;
        record.activity_date = resolved.date;
        record.no_of_participants = resolved.no_of_participants;
        record.activity_type_id = resolved.activity_type_id;
        record.activity_id = resolved.activity_id;
        if input.photo.is_some() {
            record.photo = input.photo.clone();
        }
        record.updated_at = now_rfc3339();

        let updated = self.update_row(
            "logged_activities",
            id,
            &record,
            &[("value", Value::Integer(record.value))],
            Some(("status", Value::text(ActivityStatus::InReview.as_str()))),
        )?;
        if !updated {
            return Err(PointsError::PermissionDenied(
                "You can only edit a logged activity that is in review.".into(),
            ));
        }
        Ok(record)
    }

    /// Delete a logged activity. Owner only, and only while `in review`.
    pub fn delete_logged_activity(
        &self,
        principal: &Principal,
        id: &str,
    ) -> Result<(), PointsError> {
        let record = self.owned_activity(principal, id)?;
        if record.status != ActivityStatus::InReview {
            return Err(PointsError::PermissionDenied(
                "You can only delete a logged activity that is in review.".into(),
            ));
        }
        self.delete_row("logged_activities", id)
    }

    fn owned_activity(
        &self,
        principal: &Principal,
        id: &str,
    ) -> Result<LoggedActivity, PointsError> {
        let record = self.get_logged_activity(id)?;
        if record.user_id != principal.user_id {
            // Not the owner's record; indistinguishable from missing.
            return Err(PointsError::NotFound("Logged activity does not exist.".into()));
        }
        Ok(record)
    }

    /// Secretary review: `in review → pending | rejected`, by a
    /// secretary of the activity's own society.
    pub fn review_activity(
        &self,
        principal: &Principal,
        id: &str,
        target_status: &str,
    ) -> Result<LoggedActivity, PointsError> {
        let target = ActivityStatus::from_str(target_status)
            .filter(|s| matches!(s, ActivityStatus::Pending | ActivityStatus::Rejected))
            .ok_or_else(|| PointsError::Validation("Invalid status value.".into()))?;

        let mut record = self.get_logged_activity(id)?;
        if principal.society_id.as_deref() != Some(record.society_id.as_str()) {
            let society = self.get_society(&record.society_id)?;
            return Err(PointsError::PermissionDenied(format!(
                "Permission denied, you are not a secretary of {}",
                society.name
            )));
        }
        if record.status != ActivityStatus::InReview {
            return Err(PointsError::Validation(
                "You can only review a logged activity that is in review.".into(),
            ));
        }

        record.status = target;
        record.reviewer_id = Some(principal.user_id.clone());
        record.updated_at = now_rfc3339();

        let updated = self.update_row(
            "logged_activities",
            id,
            &record,
            &[("status", Value::text(target.as_str()))],
            Some(("status", Value::text(ActivityStatus::InReview.as_str()))),
        )?;
        if !updated {
            return Err(PointsError::Validation(
                "You can only review a logged activity that is in review.".into(),
            ));
        }
        Ok(record)
    }

    /// Bulk approval by success ops: every id that is currently
    /// `pending` and not redeemed is approved, its value credited to
    /// its society, and its owner notified. Ids in any other state are
    /// skipped, which makes re-approval a no-op.
    pub fn bulk_approve(
        &self,
        principal: &Principal,
        input: &BulkApproveInput,
    ) -> Result<Vec<LoggedActivity>, PointsError> {
        let ids = &input.logged_activities_ids;
        if ids.is_empty() {
            return Err(PointsError::Validation(
                "A list of logged activity ids is required".into(),
            ));
        }
        if ids.len() > MAX_BULK_APPROVE {
            return Err(PointsError::PermissionDenied(format!(
                "You can only approve a maximum of {MAX_BULK_APPROVE} logged activities at a time"
            )));
        }

        let mut approved = Vec::new();
        for id in ids {
            let Ok(mut record) = self.get_logged_activity(id) else {
                continue;
            };
            if record.status != ActivityStatus::Pending || record.redeemed {
                continue;
            }

            record.status = ActivityStatus::Approved;
            record.approver_id = Some(principal.user_id.clone());
            record.approved_at = Some(now_rfc3339());
            record.updated_at = record.approved_at.clone().unwrap_or_default();

            let updated = self.update_row(
                "logged_activities",
                id,
                &record,
                &[("status", Value::text(ActivityStatus::Approved.as_str()))],
                Some(("status", Value::text(ActivityStatus::Pending.as_str()))),
            )?;
            if !updated {
                continue;
            }

            self.award_points(&record.society_id, record.value)?;
            info!(id = %record.id, value = record.value, "activity approved");

            if let Ok(owner) = self.auth.get_user(&record.user_id) {
                self.notifier.notify(Notification::ActivityApproved {
                    activity_name: record.name.clone(),
                    value: record.value,
                    owner_email: owner.email,
                });
            }
            approved.push(record);
        }

        if approved.is_empty() {
            return Err(PointsError::Validation(
                "Invalid request. No pending logged activities to approve.".into(),
            ));
        }
        Ok(approved)
    }

    /// Reject a single pending activity (success ops).
    pub fn reject_activity(
        &self,
        principal: &Principal,
        id: &str,
    ) -> Result<LoggedActivity, PointsError> {
        let mut record = self.get_logged_activity(id)?;
        if record.status != ActivityStatus::Pending {
            return Err(PointsError::PermissionDenied(
                "You can only reject a logged activity that is pending approval.".into(),
            ));
        }

        record.status = ActivityStatus::Rejected;
        record.approver_id = Some(principal.user_id.clone());
        record.updated_at = now_rfc3339();

        let updated = self.update_row(
            "logged_activities",
            id,
            &record,
            &[("status", Value::text(ActivityStatus::Rejected.as_str()))],
            Some(("status", Value::text(ActivityStatus::Pending.as_str()))),
        )?;
        if !updated {
            return Err(PointsError::PermissionDenied(
                "You can only reject a logged activity that is pending approval.".into(),
            ));
        }

        if let Ok(owner) = self.auth.get_user(&record.user_id) {
            self.notifier.notify(Notification::ActivityRejected {
                activity_name: record.name.clone(),
                owner_email: owner.email,
            });
        }
        Ok(record)
    }

    /// Relay a success ops comment to the logger by email. No status
    /// change.
    pub fn request_info(
        &self,
        _principal: &Principal,
        id: &str,
        comment: &str,
    ) -> Result<(), PointsError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(PointsError::Validation("Comment is required.".into()));
        }

        let record = self.get_logged_activity(id)?;
        let society = self.get_society(&record.society_id)?;
        if let Ok(owner) = self.auth.get_user(&record.user_id) {
            self.notifier.notify(Notification::ActivityInfoRequested {
                activity_name: record.name.clone(),
                activity_id: record.id.clone(),
                comment: comment.to_string(),
                owner_email: owner.email,
                society: society.name,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use societies_core::Role;
    use societies_notify::Notification;

    use crate::model::{
        ActivityStatus, BulkApproveInput, CreateSociety, LogActivityInput,
    };
    use crate::service::PointsError;
    use crate::service::testutil::{Harness, harness};

    fn seed_society(h: &Harness, name: &str) -> String {
        h.points
            .create_society(CreateSociety {
                name: name.into(),
                color_scheme: None,
                logo: None,
                photo: None,
            })
            .unwrap()
            .id
    }

    fn log_input(h: &Harness, type_id: &str) -> LogActivityInput {
        LogActivityInput {
            activity_type_id: Some(type_id.into()),
            date: Some(h.days_ago(2)),
            ..Default::default()
        }
    }

    #[test]
    fn test_log_starts_in_review() {
        let h = harness();
        let society = seed_society(&h, "Phoenix");
        let type_id = h.seed_type("Hackathon", 100, false);
        let fellow = h.principal("fellow", Some(&society), &[Role::Fellow]);

        let record = h.points.log_activity(&fellow, &log_input(&h, &type_id)).unwrap();
        assert_eq!(record.status, ActivityStatus::InReview);
        assert_eq!(record.value, 100);
        assert!(!record.redeemed);
    }

    #[test]
    fn test_log_requires_society_membership() {
        let h = harness();
        let type_id = h.seed_type("Hackathon", 100, false);
        let fellow = h.principal("fellow", None, &[Role::Fellow]);

        let err = h.points.log_activity(&fellow, &log_input(&h, &type_id)).unwrap_err();
        assert!(matches!(err, PointsError::Unprocessable(ref m)
            if m == "You are not a member of any society yet"));
    }

    #[test]
    fn test_secretary_review_moves_to_pending() {
        let h = harness();
        let society = seed_society(&h, "Phoenix");
        let type_id = h.seed_type("Hackathon", 100, false);
        let fellow = h.principal("fellow", Some(&society), &[Role::Fellow]);
        let secretary = h.principal("sec", Some(&society), &[Role::SocietySecretary]);

        let record = h.points.log_activity(&fellow, &log_input(&h, &type_id)).unwrap();
        let reviewed = h.points.review_activity(&secretary, &record.id, "pending").unwrap();
        assert_eq!(reviewed.status, ActivityStatus::Pending);
        assert_eq!(reviewed.reviewer_id.as_deref(), Some("sec"));

        // A second review of the same record is refused.
        let err = h.points.review_activity(&secretary, &record.id, "rejected").unwrap_err();
        assert!(matches!(err, PointsError::Validation(_)));
    }

    #[test]
    fn test_cross_society_secretary_is_refused_by_name() {
        let h = harness();
        let phoenix = seed_society(&h, "Phoenix");
        let sparks = seed_society(&h, "Sparks");
        let type_id = h.seed_type("Hackathon", 100, false);
        let fellow = h.principal("fellow", Some(&phoenix), &[Role::Fellow]);
        let secretary = h.principal("sec", Some(&sparks), &[Role::SocietySecretary]);

        let record = h.points.log_activity(&fellow, &log_input(&h, &type_id)).unwrap();
        let err = h.points.review_activity(&secretary, &record.id, "pending").unwrap_err();
        assert!(matches!(err, PointsError::PermissionDenied(ref m)
            if m == "Permission denied, you are not a secretary of Phoenix"));
    }

    #[test]
    fn test_invalid_review_status() {
        let h = harness();
        let society = seed_society(&h, "Phoenix");
        let type_id = h.seed_type("Hackathon", 100, false);
        let fellow = h.principal("fellow", Some(&society), &[Role::Fellow]);
        let secretary = h.principal("sec", Some(&society), &[Role::SocietySecretary]);

        let record = h.points.log_activity(&fellow, &log_input(&h, &type_id)).unwrap();
        for bad in ["approved", "in review", "done"] {
            let err = h.points.review_activity(&secretary, &record.id, bad).unwrap_err();
            assert!(matches!(err, PointsError::Validation(ref m) if m == "Invalid status value."));
        }
    }

    #[test]
    fn test_bulk_approve_credits_society_and_notifies() {
        let h = harness();
        let society = seed_society(&h, "Phoenix");
        let type_id = h.seed_type("Hackathon", 100, false);
        let fellow = h.principal("fellow", Some(&society), &[Role::Fellow]);
        let secretary = h.principal("sec", Some(&society), &[Role::SocietySecretary]);
        let ops = h.principal("ops", None, &[Role::SuccessOps]);

        let a = h.points.log_activity(&fellow, &log_input(&h, &type_id)).unwrap();
        let b = h.points.log_activity(&fellow, &log_input(&h, &type_id)).unwrap();
        h.points.review_activity(&secretary, &a.id, "pending").unwrap();
        h.points.review_activity(&secretary, &b.id, "pending").unwrap();

        let approved = h
            .points
            .bulk_approve(
                &ops,
                &BulkApproveInput {
                    logged_activities_ids: vec![a.id.clone(), b.id.clone()],
                },
            )
            .unwrap();
        assert_eq!(approved.len(), 2);
        assert!(approved.iter().all(|r| r.approver_id.as_deref() == Some("ops")));

        assert_eq!(h.points.get_society(&society).unwrap().total_points, 200);

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[0], Notification::ActivityApproved { owner_email, value, .. }
            if owner_email == "fellow@andela.com" && *value == 100));

        // Re-approving already approved records finds nothing eligible.
        let err = h
            .points
            .bulk_approve(
                &ops,
                &BulkApproveInput { logged_activities_ids: vec![a.id.clone()] },
            )
            .unwrap_err();
        assert!(matches!(err, PointsError::Validation(_)));
        assert_eq!(h.points.get_society(&society).unwrap().total_points, 200);
    }

    #[test]
    fn test_bulk_approve_limits() {
        let h = harness();
        let ops = h.principal("ops", None, &[Role::SuccessOps]);

        let err = h
            .points
            .bulk_approve(&ops, &BulkApproveInput { logged_activities_ids: vec![] })
            .unwrap_err();
        assert!(matches!(err, PointsError::Validation(_)));

        let ids: Vec<String> = (0..21).map(|i| format!("id-{i}")).collect();
        let err = h
            .points
            .bulk_approve(&ops, &BulkApproveInput { logged_activities_ids: ids })
            .unwrap_err();
        assert!(matches!(err, PointsError::PermissionDenied(_)));
    }

    #[test]
    fn test_bulk_approve_skips_in_review_records() {
        let h = harness();
        let society = seed_society(&h, "Phoenix");
        let type_id = h.seed_type("Hackathon", 100, false);
        let fellow = h.principal("fellow", Some(&society), &[Role::Fellow]);
        let ops = h.principal("ops", None, &[Role::SuccessOps]);

        let record = h.points.log_activity(&fellow, &log_input(&h, &type_id)).unwrap();
        let err = h
            .points
            .bulk_approve(
                &ops,
                &BulkApproveInput { logged_activities_ids: vec![record.id] },
            )
            .unwrap_err();
        assert!(matches!(err, PointsError::Validation(ref m)
            if m == "Invalid request. No pending logged activities to approve."));
    }

    #[test]
    fn test_reject_requires_pending() {
        let h = harness();
        let society = seed_society(&h, "Phoenix");
        let type_id = h.seed_type("Hackathon", 100, false);
        let fellow = h.principal("fellow", Some(&society), &[Role::Fellow]);
        let secretary = h.principal("sec", Some(&society), &[Role::SocietySecretary]);
        let ops = h.principal("ops", None, &[Role::SuccessOps]);

        let record = h.points.log_activity(&fellow, &log_input(&h, &type_id)).unwrap();
        let err = h.points.reject_activity(&ops, &record.id).unwrap_err();
        assert!(matches!(err, PointsError::PermissionDenied(_)));

        h.points.review_activity(&secretary, &record.id, "pending").unwrap();
        let rejected = h.points.reject_activity(&ops, &record.id).unwrap();
        assert_eq!(rejected.status, ActivityStatus::Rejected);
        assert!(matches!(
            h.notifier.sent().last(),
            Some(Notification::ActivityRejected { .. })
        ));
    }

    #[test]
    fn test_edit_and_delete_are_owner_and_state_gated() {
        let h = harness();
        let society = seed_society(&h, "Phoenix");
        let type_id = h.seed_type("Hackathon", 100, false);
        let big_type = h.seed_type("Tech Event", 2500, false);
        let fellow = h.principal("fellow", Some(&society), &[Role::Fellow]);
        let other = h.principal("other", Some(&society), &[Role::Fellow]);
        let secretary = h.principal("sec", Some(&society), &[Role::SocietySecretary]);

        let record = h.points.log_activity(&fellow, &log_input(&h, &type_id)).unwrap();

        // Someone else cannot see it through edit/delete.
        let err = h
            .points
            .edit_logged_activity(&other, &record.id, &log_input(&h, &big_type))
            .unwrap_err();
        assert!(matches!(err, PointsError::NotFound(_)));

        let edited = h
            .points
            .edit_logged_activity(&fellow, &record.id, &log_input(&h, &big_type))
            .unwrap();
        assert_eq!(edited.value, 2500);

        // After review it is frozen for the owner.
        h.points.review_activity(&secretary, &record.id, "pending").unwrap();
        let err = h
            .points
            .edit_logged_activity(&fellow, &record.id, &log_input(&h, &type_id))
            .unwrap_err();
        assert!(matches!(err, PointsError::PermissionDenied(_)));
        let err = h.points.delete_logged_activity(&fellow, &record.id).unwrap_err();
        assert!(matches!(err, PointsError::PermissionDenied(_)));
    }

    #[test]
    fn test_request_info_relays_comment() {
        let h = harness();
        let society = seed_society(&h, "Phoenix");
        let type_id = h.seed_type("Hackathon", 100, false);
        let fellow = h.principal("fellow", Some(&society), &[Role::Fellow]);
        let ops = h.principal("ops", None, &[Role::SuccessOps]);

        let record = h.points.log_activity(&fellow, &log_input(&h, &type_id)).unwrap();

        let err = h.points.request_info(&ops, &record.id, "  ").unwrap_err();
        assert!(matches!(err, PointsError::Validation(_)));

        h.points.request_info(&ops, &record.id, "Which hackathon was this?").unwrap();
        assert!(matches!(
            h.notifier.sent().last(),
            Some(Notification::ActivityInfoRequested { comment, society, .. })
                if comment == "Which hackathon was this?" && society == "Phoenix"
        ));

        // Status unchanged.
        assert_eq!(
            h.points.get_logged_activity(&record.id).unwrap().status,
            ActivityStatus::InReview
        );
    }
}
