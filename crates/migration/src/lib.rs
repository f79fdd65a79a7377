pub use sea_orm_migration::prelude::*;

mod m20260105_000001_expenses;
mod m20260105_000002_payments;
mod m20260105_000003_fx_rates;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_000001_expenses::Migration),
            Box::new(m20260105_000002_payments::Migration),
            Box::new(m20260105_000003_fx_rates::Migration),
        ]
    }
}
