use societies_core::{PageParams, Principal, Role, new_id, now_rfc3339};
use societies_notify::Notification;
use societies_sql::Value;
use tracing::{info, warn};

use crate::model::{
    CreateRedemption, RedemptionFilters, RedemptionRequest, RedemptionStatus, UpdateRedemption,
    VerifyRedemptionInput,
};
use crate::service::{PointsError, PointsService};

impl PointsService {
    /// Create a redemption request for the caller's society. The value
    /// is checked against the remaining balance up front, but points
    /// are only spent on approval.
    pub fn create_redemption(
        &self,
        principal: &Principal,
        input: &CreateRedemption,
    ) -> Result<RedemptionRequest, PointsError> {
        let society_id = principal
            .society_id
            .as_deref()
            .ok_or_else(|| {
                PointsError::Unprocessable("You are not a member of any society yet".into())
            })?
            .to_string();

        let name = input.name.trim();
        if name.is_empty() {
            return Err(PointsError::Validation("Redemption request name is required".into()));
        }
        if input.value <= 0 {
            return Err(PointsError::Validation(
                "Redemption request value must be a positive number".into(),
            ));
        }
        if input.center.trim().is_empty() {
            return Err(PointsError::Validation("Center is required".into()));
        }
        let center = self
            .get_center_by_name(&input.center)
            .map_err(|_| PointsError::Validation(format!("Invalid center: {}", input.center)))?;

        let society = self.get_society(&society_id)?;
        if input.value > society.remaining_points {
            return Err(PointsError::PermissionDenied(
                "Your society does not have enough points to redeem this request.".into(),
            ));
        }

        let now = now_rfc3339();
        let record = RedemptionRequest {
            id: new_id(),
            name: name.to_string(),
            value: input.value,
            description: input.description.trim().to_string(),
            status: RedemptionStatus::Pending,
            rejection: None,
            comment: None,
            user_id: principal.user_id.clone(),
            society_id,
            center_id: center.id,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_row(
            "redemptions",
            &record.id,
            &record,
            &[
                ("name", Value::text(&record.name)),
                ("status", Value::text(record.status.as_str())),
                ("value", Value::Integer(record.value)),
                ("user_id", Value::text(&record.user_id)),
                ("society_id", Value::text(&record.society_id)),
                ("center_id", Value::text(&record.center_id)),
                ("created_at", Value::text(&now)),
            ],
        )?;

        info!(id = %record.id, society = %society.name, value = record.value, "redemption created");
        self.notifier.notify(Notification::RedemptionCreated {
            society: society.name,
            reason: record.name.clone(),
            value: record.value,
        });
        Ok(record)
    }

    /// Get a redemption request by id.
    pub fn get_redemption(&self, id: &str) -> Result<RedemptionRequest, PointsError> {
        self.get_row("redemptions", id)
            .map_err(|_| PointsError::NotFound("Redemption request does not exist.".into()))
    }

    /// List redemption requests, newest first. Society, status and
    /// center filters must name existing values; the name filter is a
    /// substring match.
    pub fn list_redemptions(
        &self,
        filters: &RedemptionFilters,
        params: &PageParams,
    ) -> Result<(Vec<RedemptionRequest>, usize), PointsError> {
        let params = params.normalized();

        let mut clauses = Vec::new();
        let mut bind = Vec::new();

        if let Some(society) = filters.society.as_deref().map(str::trim).filter(|s| !s.is_empty())
        {
            let society = self
                .get_society_by_name(society)
                .map_err(|_| PointsError::Validation(format!("Invalid society: {society}")))?;
            bind.push(Value::text(society.id));
            clauses.push(format!("society_id = ?{}", bind.len()));
        }
        if let Some(status) = filters.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let status = RedemptionStatus::from_str(status)
                .ok_or_else(|| PointsError::Validation("Invalid status value.".into()))?;
            bind.push(Value::text(status.as_str()));
            clauses.push(format!("status = ?{}", bind.len()));
        }
        if let Some(center) = filters.center.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let center = self
                .get_center_by_name(center)
                .map_err(|_| PointsError::Validation(format!("Invalid center: {center}")))?;
            bind.push(Value::text(center.id));
            clauses.push(format!("center_id = ?{}", bind.len()));
        }
        if let Some(name) = filters.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            bind.push(Value::Text(format!("%{name}%")));
            clauses.push(format!("name LIKE ?{}", bind.len()));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) as cnt FROM redemptions{where_sql}");
        let count_rows = self
            .sql
            .query(&count_sql, &bind)
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        let total = count_rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize;

        bind.push(Value::Integer(params.limit as i64));
        let limit_idx = bind.len();
        bind.push(Value::Integer(params.offset() as i64));
        let offset_idx = bind.len();

        let sql = format!(
            "SELECT data FROM redemptions{where_sql}
             ORDER BY created_at DESC LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
        );
        let rows = self
            .sql
            .query(&sql, &bind)
            .map_err(|e| PointsError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| PointsError::Internal("missing data column".into()))?;
            items.push(
                serde_json::from_str(data).map_err(|e| PointsError::Internal(e.to_string()))?,
            );
        }
        Ok((items, total))
    }

    /// Verify a pending request: approve it (spending the society's
    /// points), reject it with a reason, or relay a bare comment with
    /// no status change.
    pub fn verify_redemption(
        &self,
        principal: &Principal,
        id: &str,
        input: &VerifyRedemptionInput,
    ) -> Result<RedemptionRequest, PointsError> {
        let record = self.get_redemption(id)?;
        match input.status.as_deref().map(str::trim) {
            Some("approved") => self.approve_redemption(principal, record),
            Some("rejected") => self.reject_redemption(record, input.rejection.as_deref()),
            None | Some("") => self.comment_redemption(record, input.comment.as_deref()),
            Some(_) => Err(PointsError::Validation("Invalid status value.".into())),
        }
    }

    fn approve_redemption(
        &self,
        principal: &Principal,
        mut record: RedemptionRequest,
    ) -> Result<RedemptionRequest, PointsError> {
        record.status = RedemptionStatus::Approved;
        record.updated_at = now_rfc3339();

        // Flip the status first so a concurrent approval of the same
        // request finds it already taken, then spend the points. On a
        // refused debit the flip is undone.
        let flipped = self.update_row(
            "redemptions",
            &record.id,
            &record,
            &[("status", Value::text(RedemptionStatus::Approved.as_str()))],
            Some(("status", Value::text(RedemptionStatus::Pending.as_str()))),
        )?;
        if !flipped {
            return Err(PointsError::Validation(
                "You can only verify a pending redemption request.".into(),
            ));
        }

        if let Err(debit_err) = self.debit_points(&record.society_id, record.value) {
            record.status = RedemptionStatus::Pending;
            record.updated_at = now_rfc3339();
            let reverted = self.update_row(
                "redemptions",
                &record.id,
                &record,
                &[("status", Value::text(RedemptionStatus::Pending.as_str()))],
                None,
            )?;
            if !reverted {
                warn!(id = %record.id, "could not revert redemption after refused debit");
            }
            return Err(debit_err);
        }

        let society = self.get_society(&record.society_id)?;
        let center = self.get_center(&record.center_id)?;
        info!(id = %record.id, society = %society.name, by = %principal.user_id,
              value = record.value, "redemption approved");
        if let Ok(requester) = self.auth.get_user(&record.user_id) {
            self.notifier.notify(Notification::RedemptionApproved {
                society: society.name,
                request_name: record.name.clone(),
                request_id: record.id.clone(),
                requester_email: requester.email,
                center: center.name,
            });
        }
        Ok(record)
    }

    fn reject_redemption(
        &self,
        mut record: RedemptionRequest,
        rejection: Option<&str>,
    ) -> Result<RedemptionRequest, PointsError> {
        let reason = rejection.map(str::trim).unwrap_or("");
        if reason.is_empty() {
            return Err(PointsError::Validation("A rejection reason is required.".into()));
        }

        record.status = RedemptionStatus::Rejected;
        record.rejection = Some(reason.to_string());
        record.updated_at = now_rfc3339();

        let updated = self.update_row(
            "redemptions",
            &record.id,
            &record,
            &[("status", Value::text(RedemptionStatus::Rejected.as_str()))],
            Some(("status", Value::text(RedemptionStatus::Pending.as_str()))),
        )?;
        if !updated {
            return Err(PointsError::Validation(
                "You can only verify a pending redemption request.".into(),
            ));
        }

        let society = self.get_society(&record.society_id)?;
        if let Ok(requester) = self.auth.get_user(&record.user_id) {
            self.notifier.notify(Notification::RedemptionRejected {
                society: society.name,
                reason: reason.to_string(),
                requester_email: requester.email,
            });
        }
        Ok(record)
    }

    fn comment_redemption(
        &self,
        mut record: RedemptionRequest,
        comment: Option<&str>,
    ) -> Result<RedemptionRequest, PointsError> {
        let comment = comment.map(str::trim).unwrap_or("");
        if comment.is_empty() {
            return Err(PointsError::Validation("Invalid status value.".into()));
        }

        record.comment = Some(comment.to_string());
        record.updated_at = now_rfc3339();
        self.update_row("redemptions", &record.id, &record, &[], None)?;

        let society = self.get_society(&record.society_id)?;
        if let Ok(requester) = self.auth.get_user(&record.user_id) {
            self.notifier.notify(Notification::RedemptionCommented {
                society: society.name,
                comment: comment.to_string(),
                requester_email: requester.email,
            });
        }
        Ok(record)
    }

    /// Mark an approved request as paid out. The requester and every
    /// CIO role holder are notified.
    pub fn complete_redemption(
        &self,
        _principal: &Principal,
        id: &str,
        status: &str,
    ) -> Result<RedemptionRequest, PointsError> {
        if !status.trim().eq_ignore_ascii_case("completed") {
            return Err(PointsError::Validation("Invalid status value.".into()));
        }

        let mut record = self.get_redemption(id)?;
        if record.status != RedemptionStatus::Approved {
            return Err(PointsError::Validation(
                "Only an approved redemption request can be completed.".into(),
            ));
        }

        record.status = RedemptionStatus::Completed;
        record.updated_at = now_rfc3339();

        let updated = self.update_row(
            "redemptions",
            &record.id,
            &record,
            &[("status", Value::text(RedemptionStatus::Completed.as_str()))],
            Some(("status", Value::text(RedemptionStatus::Approved.as_str()))),
        )?;
        if !updated {
            return Err(PointsError::Validation(
                "Only an approved redemption request can be completed.".into(),
            ));
        }

        let society = self.get_society(&record.society_id)?;
        let cio_emails = self
            .auth
            .users_with_role(Role::Cio)
            .map_err(|e| PointsError::Storage(e.to_string()))?
            .into_iter()
            .map(|u| u.email)
            .collect();
        if let Ok(requester) = self.auth.get_user(&record.user_id) {
            self.notifier.notify(Notification::RedemptionCompleted {
                society: society.name,
                request_name: record.name.clone(),
                requester_email: requester.email,
                cio_emails,
            });
        }
        Ok(record)
    }

    /// Edit a redemption request. Owner only, and only while pending.
    pub fn edit_redemption(
        &self,
        principal: &Principal,
        id: &str,
        patch: &UpdateRedemption,
    ) -> Result<RedemptionRequest, PointsError> {
        let mut record = self.owned_redemption(principal, id)?;
        if record.status != RedemptionStatus::Pending {
            return Err(PointsError::PermissionDenied(
                "You can only edit a pending redemption request.".into(),
            ));
        }

        if let Some(name) = patch.name.as_deref().map(str::trim) {
            if name.is_empty() {
                return Err(PointsError::Validation(
                    "Redemption request name is required".into(),
                ));
            }
            record.name = name.to_string();
        }
        if let Some(value) = patch.value {
            if value <= 0 {
                return Err(PointsError::Validation(
                    "Redemption request value must be a positive number".into(),
                ));
            }
            record.value = value;
        }
        if let Some(description) = patch.description.as_deref() {
            record.description = description.trim().to_string();
        }
        record.updated_at = now_rfc3339();

        let updated = self.update_row(
            "redemptions",
            id,
            &record,
            &[
                ("name", Value::text(&record.name)),
                ("value", Value::Integer(record.value)),
            ],
            Some(("status", Value::text(RedemptionStatus::Pending.as_str()))),
        )?;
        if !updated {
            return Err(PointsError::PermissionDenied(
                "You can only edit a pending redemption request.".into(),
            ));
        }
        Ok(record)
    }

    /// Delete a redemption request. Owner only, and only while pending.
    pub fn delete_redemption(&self, principal: &Principal, id: &str) -> Result<(), PointsError> {
        let record = self.owned_redemption(principal, id)?;
        if record.status != RedemptionStatus::Pending {
            return Err(PointsError::PermissionDenied(
                "You can only delete a pending redemption request.".into(),
            ));
        }
        self.delete_row("redemptions", id)
    }

    fn owned_redemption(
        &self,
        principal: &Principal,
        id: &str,
    ) -> Result<RedemptionRequest, PointsError> {
        let record = self.get_redemption(id)?;
        if record.user_id != principal.user_id {
            return Err(PointsError::NotFound("Redemption request does not exist.".into()));
        }
        Ok(record)
    }
}
