//! MongoDB connection management and the store implementation.

pub mod error;
pub mod models;
pub mod store;
pub mod transaction;

use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;

use self::error::{MongoDaoError, MongoResult};
use self::store::MongoStore;
use crate::config::MongoSettings;

struct RetryPolicy;

impl RetryPolicy {
    const MAX_ATTEMPTS: u32 = 10;
    const INITIAL_DELAY_MS: u64 = 250;

    fn initial_delay() -> Duration {
        Duration::from_millis(Self::INITIAL_DELAY_MS)
    }

    fn next_delay(current: Duration) -> Duration {
        (current * 2).min(Duration::from_secs(5))
    }
}

/// Parse the connection settings, establish a connection (with bounded
/// retries on the initial ping) and ensure indexes.
pub async fn connect(settings: &MongoSettings) -> MongoResult<MongoStore> {
    let options =
        ClientOptions::parse(&settings.uri)
            .await
            .map_err(|source| MongoDaoError::InvalidUri {
                uri: settings.uri.clone(),
                source,
            })?;

    let (client, database) = establish_connection(options, &settings.database).await?;
    let store = MongoStore::new(client, database);
    store.ensure_indexes().await?;
    Ok(store)
}

async fn establish_connection(
    options: ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options)
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut attempts = 0;
    let mut delay = RetryPolicy::initial_delay();

    loop {
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => break,
            Err(err) => {
                attempts += 1;
                if attempts >= RetryPolicy::MAX_ATTEMPTS {
                    return Err(MongoDaoError::InitialPing {
                        attempts,
                        source: err,
                    });
                }
                sleep(delay).await;
                delay = RetryPolicy::next_delay(delay);
            }
        }
    }

    Ok((client, database))
}
