use crate::libraries::storage::Database;

#[derive(Clone)]
pub struct Context {
    pub database: Database,
}

impl Context {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}
