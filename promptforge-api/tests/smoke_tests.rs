//! End-to-end smoke tests against a real PostgreSQL database.
//!
//! Run with `--features db-tests` and `DATABASE_URL` (or the discrete
//! `PROMPTFORGE_DB_*` variables) pointing at a scratch database.

#![cfg(feature = "db-tests")]

use promptforge_api::ApiResult;
use promptforge_core::*;

#[path = "support/db.rs"]
mod db_support;

fn new_prompt(text: &str) -> NewPrompt {
    NewPrompt {
        prompt: text.to_string(),
        exp_name: Some("smoke".to_string()),
        architecture: None,
        description_type: Some("srs".to_string()),
    }
}

#[tokio::test]
async fn smoke_test_prompt_lifecycle() -> ApiResult<()> {
    let db = db_support::test_db_client().await;

    db.ping().await?;

    let first = db.insert_prompt(&new_prompt("smoke first")).await?;
    let second = db.insert_prompt(&new_prompt("smoke second")).await?;
    assert!(second.id > first.id);
    assert_eq!(second.response, None);

    let reply = r#"{"cpp":"int main(){}","uml":"@startuml\n@enduml"}"#;
    let outcome = GenerationOutcome::from_extraction(reply, &extract(reply));
    db.record_outcome(first.id, &outcome).await?;
    db.record_outcome(second.id, &GenerationOutcome::raw_only("oops")).await?;

    let cpp = db.get_artifact(first.id, ArtifactKind::Cpp).await?;
    assert_eq!(cpp.as_deref(), Some("int main(){}"));
    assert_eq!(db.get_artifact(second.id, ArtifactKind::Uml).await?, None);

    let latest = db.latest_prompt().await?.expect("latest prompt");
    assert!(latest.id >= second.id);

    let list = db.list_prompts().await?;
    let first_row = list.iter().find(|p| p.id == first.id).expect("first row");
    assert!(first_row.has_cpp && first_row.has_uml);
    let second_row = list.iter().find(|p| p.id == second.id).expect("second row");
    assert!(!second_row.has_cpp);

    let missing = db.record_outcome(i32::MAX, &GenerationOutcome::raw_only("x")).await;
    assert!(matches!(
        missing,
        Err(ForgeError::Storage(StorageError::PromptNotFound { .. }))
    ));

    Ok(())
}

#[tokio::test]
async fn smoke_test_fragment_upsert() -> ApiResult<()> {
    let db = db_support::test_db_client().await;

    db.upsert_fragment("smoke_fragment", "one").await?;
    let stored = db.upsert_fragment("smoke_fragment", "two").await?;
    assert_eq!(stored.prompt_part, "two");

    let found = db.get_fragments(&["smoke_fragment", "smoke_absent"]).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].prompt_part, "two");

    let all = db.list_fragments().await?;
    assert!(all.iter().any(|f| f.name == "smoke_fragment"));

    Ok(())
}
