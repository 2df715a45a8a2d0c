use log::{info, warn};
use shared::datasource::{Connector, DataSource};
use shared::{QueryRequest, QueryResponse, Result, SharedError};
use std::time::Instant;
use validator::Validate;

use super::history::QueryHistory;
use crate::datasource::Gateway;

pub struct QueryUseCase<'a, C: Connector> {
    gateway: &'a Gateway<C>,
    history: &'a QueryHistory,
}

impl<'a, C: Connector> QueryUseCase<'a, C> {
    pub fn new(gateway: &'a Gateway<C>, history: &'a QueryHistory) -> Self {
        Self { gateway, history }
    }

    /// Runs a console statement as typed. Only statements the database
    /// accepted are added to the history.
    pub async fn execute(&self, request: QueryRequest) -> Result<QueryResponse> {
        request.validate()?;
        let statement = request.query.trim().to_string();
        if statement.is_empty() {
            return Err(SharedError::BadRequest("Query cannot be empty".to_string()));
        }

        let started = Instant::now();
        let sent = statement.clone();
        let outcome = self
            .gateway
            .run(move |db| Box::pin(async move { db.execute(&sent).await }))
            .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => {
                info!("Console query finished in {} ms", elapsed_ms);
                self.history.record(&statement).await;
                Ok(QueryResponse { result, elapsed_ms })
            }
            Err(e) => {
                warn!("Console query failed after {} ms: {}", elapsed_ms, e);
                Err(e)
            }
        }
    }
}
