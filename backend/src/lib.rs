pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod openapi;

pub mod datasource {
    pub mod gateway;
    pub mod surreal;
    pub mod surrealql;

    pub use gateway::Gateway;
    pub use surreal::{SurrealClient, SurrealConnector};
}

pub mod settings {
    pub mod controller;
    pub mod store;
    pub mod usecase;

    pub use store::SettingsStore;

    #[cfg(test)]
    mod controller_tests;
}

pub mod statistics {
    pub mod controller;
    pub mod engine;
    pub mod repository;
    pub mod usecase;

    #[cfg(test)]
    mod controller_tests;
    #[cfg(test)]
    mod usecase_tests;
}

pub mod players {
    pub mod controller;
    pub mod repository;
    pub mod usecase;

    #[cfg(test)]
    mod controller_tests;
    #[cfg(test)]
    mod usecase_tests;
}

pub mod users {
    pub mod controller;
    pub mod repository;
    pub mod usecase;

    #[cfg(test)]
    mod controller_tests;
}

pub mod tables {
    pub mod controller;
    pub mod repository;
    pub mod usecase;

    #[cfg(test)]
    mod controller_tests;
}

pub mod query {
    pub mod controller;
    pub mod history;
    pub mod usecase;

    pub use history::QueryHistory;

    #[cfg(test)]
    mod controller_tests;
}

#[cfg(test)]
mod test_helpers;
