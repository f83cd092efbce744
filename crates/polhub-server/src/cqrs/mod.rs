pub use mediator::DefaultAsyncMediator;
use sqlx::PgPool;

use crate::ingest::IngestCoordinator;

pub mod middleware;

pub type AppMediator = DefaultAsyncMediator;

pub fn build_mediator(pool: PgPool, coordinator: IngestCoordinator) -> AppMediator {
    DefaultAsyncMediator::builder()
        // Uploads
        .add_handler({
            let coordinator = coordinator.clone();
            move |cmd| {
                let coordinator = coordinator.clone();
                async move { crate::features::uploads::commands::ingest_file::handle(coordinator, cmd).await }
            }
        })
        // Policies
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::policies::queries::search_user::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::policies::queries::aggregate_policies::handle(pool, query).await }
            }
        })
        // Messages
        .add_handler({
            let pool = pool.clone();
            move |cmd| {
                let pool = pool.clone();
                async move { crate::features::messages::commands::schedule::handle(pool, cmd).await }
            }
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mediator_builds() {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost".to_string());

        if let Ok(pool) = PgPool::connect(&database_url).await {
            let coordinator = IngestCoordinator::new(pool.clone(), 4);
            let _mediator = build_mediator(pool, coordinator);
        }
    }
}
