use deadpool_postgres::PoolError;
use tokio_postgres::types::ToSql;
use tokio_postgres::Error as PgError;
use tracing::{instrument, warn};

use crate::db::PgPool;
use crate::matching::CandidateFilter;
use crate::{Employee, ScoreValue};

#[derive(Debug, thiserror::Error)]
pub enum EmployeeFetchError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
}

/// Loads every employee with their per-variable scores, one `Employee` per
/// person. Scoring sessions use this: benchmark members must always load,
/// so the candidate filter is applied in the engine, not here.
#[instrument(skip(pool))]
pub async fn fetch_employees(pool: &PgPool) -> Result<Vec<Employee>, EmployeeFetchError> {
    fetch_employees_filtered(pool, &CandidateFilter::default()).await
}

/// Same load narrowed by org attributes in the query itself. For callers
/// that only need a sub-pool (exports, directory views); a benchmark member
/// outside the filter will not load.
#[instrument(skip(pool))]
pub async fn fetch_employees_filtered(
    pool: &PgPool,
    filter: &CandidateFilter,
) -> Result<Vec<Employee>, EmployeeFetchError> {
    let client = pool.get().await?;

    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

    if let Some(directorate) = &filter.directorate {
        params.push(directorate);
        conditions.push(format!("e.directorate = ${}", params.len()));
    }
    if let Some(position) = &filter.position {
        params.push(position);
        conditions.push(format!("e.\"position\" = ${}", params.len()));
    }
    if let Some(grade) = &filter.grade {
        params.push(grade);
        conditions.push(format!("e.grade = ${}", params.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let query = format!(
        "SELECT \
            e.employee_id,\
            e.fullname,\
            e.directorate,\
            e.\"position\",\
            e.grade,\
            s.tv_id,\
            s.score_numeric,\
            s.score_text \
        FROM tm.employees e \
        LEFT JOIN tm.employee_scores s ON s.employee_id = e.employee_id \
        {where_clause} \
        ORDER BY e.employee_id, s.tv_id"
    );

    let rows = client.query(&query, &params).await?;

    let mut employees: Vec<Employee> = Vec::new();
    for row in rows {
        let employee_id: i64 = row.get("employee_id");

        if employees
            .last()
            .map(|e| e.employee_id != employee_id)
            .unwrap_or(true)
        {
            employees.push(Employee {
                employee_id,
                fullname: row.get("fullname"),
                directorate: row.get("directorate"),
                position: row.get("position"),
                grade: row.get("grade"),
                scores: Default::default(),
            });
        }

        let Some(tv_id) = row.get::<_, Option<String>>("tv_id") else {
            continue;
        };
        let numeric: Option<f64> = row.get("score_numeric");
        let text: Option<String> = row.get("score_text");

        let value = match (numeric, text) {
            (Some(number), _) => ScoreValue::Number(number),
            (None, Some(text)) => ScoreValue::Text(text),
            (None, None) => {
                warn!(employee_id, tv_id = %tv_id, "score row with no value; skipped");
                continue;
            }
        };

        if let Some(employee) = employees.last_mut() {
            employee.scores.insert(tv_id, value);
        }
    }

    Ok(employees)
}
