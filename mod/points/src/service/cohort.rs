use societies_core::{new_id, now_rfc3339};
use societies_sql::{Row, Value};

use crate::model::{Center, Cohort, CreateCenter, CreateCohort};
use crate::service::{PointsError, PointsService};

fn row_to_cohort(row: &Row) -> Result<Cohort, PointsError> {
    let get = |name: &str| {
        row.get_str(name)
            .map(str::to_string)
            .ok_or_else(|| PointsError::Internal(format!("missing column {name}")))
    };
    Ok(Cohort {
        id: get("id")?,
        name: get("name")?,
        center_id: row.get_str("center_id").map(str::to_string),
        society_id: row.get_str("society_id").map(str::to_string),
        created_at: get("created_at")?,
        updated_at: get("updated_at")?,
    })
}

fn row_to_center(row: &Row) -> Result<Center, PointsError> {
    let get = |name: &str| {
        row.get_str(name)
            .map(str::to_string)
            .ok_or_else(|| PointsError::Internal(format!("missing column {name}")))
    };
    Ok(Center {
        id: get("id")?,
        name: get("name")?,
        created_at: get("created_at")?,
        updated_at: get("updated_at")?,
    })
}

impl PointsService {
    /// Create a cohort, optionally attached to a center.
    pub fn create_cohort(&self, input: CreateCohort) -> Result<Cohort, PointsError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(PointsError::Validation("Cohort name is required".into()));
        }
        if let Some(center_id) = input.center_id.as_deref() {
            self.get_center(center_id)?;
        }

        let now = now_rfc3339();
        let cohort = Cohort {
            id: new_id(),
            name: name.to_string(),
            center_id: input.center_id,
            society_id: None,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.sql
            .exec(
                "INSERT INTO cohorts (id, name, center_id, society_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, NULL, ?4, ?4)",
                &[
                    Value::text(&cohort.id),
                    Value::text(&cohort.name),
                    Value::opt_text(cohort.center_id.as_deref()),
                    Value::text(&now),
                ],
            )
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        Ok(cohort)
    }

    /// Get a cohort by id.
    pub fn get_cohort(&self, id: &str) -> Result<Cohort, PointsError> {
        let rows = self
            .sql
            .query("SELECT * FROM cohorts WHERE id = ?1", &[Value::text(id)])
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| PointsError::NotFound("Cohort does not exist.".into()))?;
        row_to_cohort(row)
    }

    /// List cohorts, optionally scoped to a society.
    pub fn list_cohorts(&self, society_id: Option<&str>) -> Result<Vec<Cohort>, PointsError> {
        let (sql, params): (&str, Vec<Value>) = match society_id {
            Some(id) => (
                "SELECT * FROM cohorts WHERE society_id = ?1 ORDER BY name",
                vec![Value::text(id)],
            ),
            None => ("SELECT * FROM cohorts ORDER BY name", Vec::new()),
        };
        let rows = self
            .sql
            .query(sql, &params)
            .map_err(|e| PointsError::Storage(e.to_string()))?;

        rows.iter().map(row_to_cohort).collect()
    }

    /// Create a center. Names are unique case-insensitively.
    pub fn create_center(&self, input: CreateCenter) -> Result<Center, PointsError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(PointsError::Validation("Center name is required".into()));
        }
        if self.get_center_by_name(name).is_ok() {
            return Err(PointsError::Conflict("Center already exists!".into()));
        }

        let now = now_rfc3339();
        let center = Center {
            id: new_id(),
            name: name.to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        self.sql
            .exec(
                "INSERT INTO centers (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                &[Value::text(&center.id), Value::text(&center.name), Value::text(&now)],
            )
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        Ok(center)
    }

    /// Get a center by id.
    pub fn get_center(&self, id: &str) -> Result<Center, PointsError> {
        let rows = self
            .sql
            .query("SELECT * FROM centers WHERE id = ?1", &[Value::text(id)])
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| PointsError::NotFound("Center does not exist.".into()))?;
        row_to_center(row)
    }

    /// Get a center by name, case-insensitively.
    pub fn get_center_by_name(&self, name: &str) -> Result<Center, PointsError> {
        let rows = self
            .sql
            .query(
                "SELECT * FROM centers WHERE name = ?1 COLLATE NOCASE",
                &[Value::text(name.trim())],
            )
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| PointsError::NotFound("Center does not exist.".into()))?;
        row_to_center(row)
    }

    /// List centers.
    pub fn list_centers(&self) -> Result<Vec<Center>, PointsError> {
        let rows = self
            .sql
            .query("SELECT * FROM centers ORDER BY name", &[])
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        rows.iter().map(row_to_center).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{CreateCenter, CreateCohort};
    use crate::service::PointsError;
    use crate::service::testutil::harness;

    #[test]
    fn test_center_crud() {
        let h = harness();
        let center = h.points.create_center(CreateCenter { name: "Nairobi".into() }).unwrap();
        assert_eq!(h.points.get_center(&center.id).unwrap().name, "Nairobi");
        assert_eq!(h.points.get_center_by_name("nairobi").unwrap().id, center.id);

        let err = h.points.create_center(CreateCenter { name: "NAIROBI".into() }).unwrap_err();
        assert!(matches!(err, PointsError::Conflict(_)));
    }

    #[test]
    fn test_cohort_creation_and_listing() {
        let h = harness();
        let center = h.points.create_center(CreateCenter { name: "Lagos".into() }).unwrap();
        let cohort = h
            .points
            .create_cohort(CreateCohort {
                name: "Cohort 14".into(),
                center_id: Some(center.id.clone()),
            })
            .unwrap();
        assert!(cohort.society_id.is_none());

        let err = h
            .points
            .create_cohort(CreateCohort { name: "Cohort 15".into(), center_id: Some("nope".into()) })
            .unwrap_err();
        assert!(matches!(err, PointsError::NotFound(_)));

        assert_eq!(h.points.list_cohorts(None).unwrap().len(), 1);
        assert!(h.points.list_cohorts(Some("s1")).unwrap().is_empty());
    }
}
