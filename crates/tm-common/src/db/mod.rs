pub mod employees;
pub mod formulas;
pub mod migrations;
pub mod pool;
pub mod vacancies;

// Keep re-exports unique so downstream crates see a single symbol per helper.
pub use employees::{fetch_employees, fetch_employees_filtered, EmployeeFetchError};
pub use formulas::{fetch_formula_by_version, fetch_latest_formula, FormulaFetchError};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool_from_url, create_pool_from_url_checked, DbPoolError, PgPool};
pub use vacancies::{insert_vacancy, VacancyInsert, VacancyStorageError};
