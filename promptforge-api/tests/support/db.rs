use promptforge_api::{DbClient, DbConfig};

pub async fn test_db_client() -> DbClient {
    let config = DbConfig::from_env();
    let db = DbClient::from_config(&config).expect("Failed to create database client");
    db.init_schema().await.expect("Failed to create schema");
    db
}
