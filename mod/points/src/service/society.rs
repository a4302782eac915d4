use societies_core::{PageParams, new_id, now_rfc3339};
use societies_sql::{Row, Value};

use crate::model::{CreateSociety, Society, UpdateSociety};
use crate::service::{PointsError, PointsService};

fn row_to_society(row: &Row) -> Result<Society, PointsError> {
    let get = |name: &str| {
        row.get_str(name)
            .map(str::to_string)
            .ok_or_else(|| PointsError::Internal(format!("missing column {name}")))
    };
    let total_points = row.get_i64("total_points").unwrap_or(0);
    let used_points = row.get_i64("used_points").unwrap_or(0);

    Ok(Society {
        id: get("id")?,
        name: get("name")?,
        color_scheme: row.get_str("color_scheme").map(str::to_string),
        logo: row.get_str("logo").map(str::to_string),
        photo: row.get_str("photo").map(str::to_string),
        total_points,
        used_points,
        remaining_points: total_points - used_points,
        created_at: get("created_at")?,
        updated_at: get("updated_at")?,
    })
}

impl PointsService {
    /// Create a society. Names are unique case-insensitively.
    pub fn create_society(&self, input: CreateSociety) -> Result<Society, PointsError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(PointsError::Validation("Society name is required".into()));
        }

        let existing = self
            .sql
            .query(
                "SELECT id FROM societies WHERE name = ?1 COLLATE NOCASE",
                &[Value::text(name)],
            )
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        if !existing.is_empty() {
            return Err(PointsError::Conflict("Society already exists!".into()));
        }

        let now = now_rfc3339();
        let society = Society {
            id: new_id(),
            name: name.to_string(),
            color_scheme: input.color_scheme,
            logo: input.logo,
            photo: input.photo,
            total_points: 0,
            used_points: 0,
            remaining_points: 0,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.sql
            .exec(
                "INSERT INTO societies
                     (id, name, color_scheme, logo, photo,
                      total_points, used_points, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6, ?6)",
                &[
                    Value::text(&society.id),
                    Value::text(&society.name),
                    Value::opt_text(society.color_scheme.as_deref()),
                    Value::opt_text(society.logo.as_deref()),
                    Value::opt_text(society.photo.as_deref()),
                    Value::text(&now),
                ],
            )
            .map_err(|e| PointsError::Storage(e.to_string()))?;

        Ok(society)
    }

    /// Get a society by id.
    pub fn get_society(&self, id: &str) -> Result<Society, PointsError> {
        let rows = self
            .sql
            .query("SELECT * FROM societies WHERE id = ?1", &[Value::text(id)])
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| PointsError::NotFound("Society does not exist.".into()))?;
        row_to_society(row)
    }

    /// Get a society by name, case-insensitively.
    pub fn get_society_by_name(&self, name: &str) -> Result<Society, PointsError> {
        let rows = self
            .sql
            .query(
                "SELECT * FROM societies WHERE name = ?1 COLLATE NOCASE",
                &[Value::text(name.trim())],
            )
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| PointsError::NotFound("Society does not exist.".into()))?;
        row_to_society(row)
    }

    /// List societies, alphabetically.
    pub fn list_societies(
        &self,
        params: &PageParams,
    ) -> Result<(Vec<Society>, usize), PointsError> {
        let params = params.normalized();

        let count_rows = self
            .sql
            .query("SELECT COUNT(*) as cnt FROM societies", &[])
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        let total = count_rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize;

        let rows = self
            .sql
            .query(
                "SELECT * FROM societies ORDER BY name LIMIT ?1 OFFSET ?2",
                &[
                    Value::Integer(params.limit as i64),
                    Value::Integer(params.offset() as i64),
                ],
            )
            .map_err(|e| PointsError::Storage(e.to_string()))?;

        let mut societies = Vec::new();
        for row in &rows {
            societies.push(row_to_society(row)?);
        }
        Ok((societies, total))
    }

    /// Update a society's descriptive fields. Point balances only move
    /// through [`award_points`](Self::award_points) and
    /// [`debit_points`](Self::debit_points).
    pub fn update_society(&self, id: &str, patch: UpdateSociety) -> Result<Society, PointsError> {
        let current = self.get_society(id)?;

        let name = match patch.name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(PointsError::Validation("Society name is required".into()));
                }
                name
            }
            None => current.name,
        };

        self.sql
            .exec(
                "UPDATE societies SET name = ?1, color_scheme = ?2, logo = ?3,
                     photo = ?4, updated_at = ?5 WHERE id = ?6",
                &[
                    Value::text(&name),
                    Value::opt_text(
                        patch.color_scheme.as_deref().or(current.color_scheme.as_deref()),
                    ),
                    Value::opt_text(patch.logo.as_deref().or(current.logo.as_deref())),
                    Value::opt_text(patch.photo.as_deref().or(current.photo.as_deref())),
                    Value::text(now_rfc3339()),
                    Value::text(id),
                ],
            )
            .map_err(|e| PointsError::Storage(e.to_string()))?;

        self.get_society(id)
    }

    /// Delete a society.
    pub fn delete_society(&self, id: &str) -> Result<(), PointsError> {
        let affected = self
            .sql
            .exec("DELETE FROM societies WHERE id = ?1", &[Value::text(id)])
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(PointsError::NotFound("Society does not exist.".into()));
        }
        Ok(())
    }

    /// Assign an unassigned cohort to a society.
    pub fn add_cohort_to_society(
        &self,
        society_id: &str,
        cohort_id: &str,
    ) -> Result<(), PointsError> {
        self.get_society(society_id)?;
        let cohort = self.get_cohort(cohort_id)?;
        if cohort.society_id.is_some() {
            return Err(PointsError::Conflict(
                "Cohort is already assigned to a society.".into(),
            ));
        }

        self.sql
            .exec(
                "UPDATE cohorts SET society_id = ?1, updated_at = ?2 WHERE id = ?3",
                &[
                    Value::text(society_id),
                    Value::text(now_rfc3339()),
                    Value::text(cohort_id),
                ],
            )
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Add an approved activity's value to the society's earned total.
    pub(crate) fn award_points(&self, society_id: &str, value: i64) -> Result<(), PointsError> {
        let affected = self
            .sql
            .exec(
                "UPDATE societies
                     SET total_points = total_points + ?1, updated_at = ?2
                 WHERE id = ?3",
                &[
                    Value::Integer(value),
                    Value::text(now_rfc3339()),
                    Value::text(society_id),
                ],
            )
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(PointsError::NotFound("Society does not exist.".into()));
        }
        Ok(())
    }

    /// Spend points on a redemption approval. The balance guard lives
    /// in the UPDATE itself, so two concurrent approvals can never
    /// overdraw the society.
    pub(crate) fn debit_points(&self, society_id: &str, value: i64) -> Result<(), PointsError> {
        let affected = self
            .sql
            .exec(
                "UPDATE societies
                     SET used_points = used_points + ?1, updated_at = ?2
                 WHERE id = ?3 AND used_points + ?1 <= total_points",
                &[
                    Value::Integer(value),
                    Value::text(now_rfc3339()),
                    Value::text(society_id),
                ],
            )
            .map_err(|e| PointsError::Storage(e.to_string()))?;

        if affected == 0 {
            self.get_society(society_id)?;
            return Err(PointsError::Conflict(
                "The redemption request value exceeds the society's remaining points.".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::CreateSociety;
    use crate::service::PointsError;
    use crate::service::testutil::harness;

    fn society_input(name: &str) -> CreateSociety {
        CreateSociety {
            name: name.into(),
            color_scheme: Some("#333333".into()),
            logo: None,
            photo: None,
        }
    }

    #[test]
    fn test_society_crud() {
        let h = harness();
        let society = h.points.create_society(society_input("Phoenix")).unwrap();
        assert_eq!(society.remaining_points, 0);

        let fetched = h.points.get_society(&society.id).unwrap();
        assert_eq!(fetched.name, "Phoenix");

        let by_name = h.points.get_society_by_name("phoenix").unwrap();
        assert_eq!(by_name.id, society.id);

        h.points.delete_society(&society.id).unwrap();
        assert!(h.points.get_society(&society.id).is_err());
    }

    #[test]
    fn test_duplicate_name_conflicts() {
        let h = harness();
        h.points.create_society(society_input("Sparks")).unwrap();
        let err = h.points.create_society(society_input("sparks")).unwrap_err();
        assert!(matches!(err, PointsError::Conflict(_)));
    }

    #[test]
    fn test_award_and_debit() {
        let h = harness();
        let society = h.points.create_society(society_input("Invictus")).unwrap();

        h.points.award_points(&society.id, 300).unwrap();
        h.points.debit_points(&society.id, 100).unwrap();

        let society = h.points.get_society(&society.id).unwrap();
        assert_eq!(society.total_points, 300);
        assert_eq!(society.used_points, 100);
        assert_eq!(society.remaining_points, 200);
    }

    #[test]
    fn test_debit_guard_refuses_overdraw() {
        let h = harness();
        let society = h.points.create_society(society_input("iStelle")).unwrap();
        h.points.award_points(&society.id, 100).unwrap();

        let err = h.points.debit_points(&society.id, 101).unwrap_err();
        assert!(matches!(err, PointsError::Conflict(_)));

        // Balance untouched after the refused debit.
        let society = h.points.get_society(&society.id).unwrap();
        assert_eq!(society.used_points, 0);

        // Spending exactly the balance is allowed.
        h.points.debit_points(&society.id, 100).unwrap();
        assert_eq!(h.points.get_society(&society.id).unwrap().remaining_points, 0);
    }

    #[test]
    fn test_cohort_linking() {
        let h = harness();
        let society = h.points.create_society(society_input("Phoenix")).unwrap();
        let other = h.points.create_society(society_input("Sparks")).unwrap();
        let cohort = h.seed_cohort("Cohort 14", None);

        h.points.add_cohort_to_society(&society.id, &cohort).unwrap();

        let err = h.points.add_cohort_to_society(&other.id, &cohort).unwrap_err();
        assert!(matches!(err, PointsError::Conflict(_)));
    }
}
