use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use httpmock::{
    Method::{GET, POST},
    MockServer,
};
use serde_json::json;
use sms_toolkit::{
    config::{Config, ConfigError},
    embedding::build_embedding_client,
    indexing::{CodebaseIndexer, IndexingOptions},
    pinecone::{PineconeService, ReadinessPolicy},
};
use tempfile::TempDir;

fn config_for(server: &MockServer, root: &Path, batch_size: usize) -> Config {
    let values: HashMap<&str, String> = HashMap::from([
        ("INDEX_ROOT", root.display().to_string()),
        ("INDEX_BATCH_SIZE", batch_size.to_string()),
        ("EMBEDDING_DIMENSION", "3".to_string()),
        ("EMBEDDING_MAX_RETRIES", "0".to_string()),
        ("OPENAI_API_KEY", "sk-test".to_string()),
        ("OPENAI_BASE_URL", format!("{}/v1", server.base_url())),
        ("PINECONE_API_KEY", "pc-test".to_string()),
        ("PINECONE_INDEX_NAME", "sms-test".to_string()),
        ("PINECONE_CONTROLLER_URL", server.base_url()),
    ]);
    Config::from_lookup(|key| values.get(key).cloned()).expect("config")
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("dirs");
    fs::write(path, contents).expect("write");
}

fn describe_body(server: &MockServer) -> serde_json::Value {
    json!({
        "name": "sms-test",
        "dimension": 3,
        "metric": "cosine",
        "host": server.base_url(),
        "status": { "ready": true, "state": "Ready" }
    })
}

#[tokio::test]
async fn indexes_tree_through_http_services() {
    let server = MockServer::start_async().await;
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "Controllers/StudentsController.cs", "public class StudentsController {}");
    write(dir.path(), "ClientApp/src/app.ts", "export const app = 1;");
    write(dir.path(), "ClientApp/src/index.html", "<app-root></app-root>");
    write(dir.path(), "node_modules/pkg/index.js", "module.exports = {};");
    write(dir.path(), "NOTES.md", "   \n");

    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/indexes")
            .header("Api-Key", "pc-test");
        then.status(200)
            .json_body(json!({ "indexes": [describe_body(&server)] }));
    });
    let describe = server.mock(|when, then| {
        when.method(GET).path("/indexes/sms-test");
        then.status(200).json_body(describe_body(&server));
    });
    let embeddings = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/embeddings")
            .header("authorization", "Bearer sk-test");
        then.status(200).json_body(json!({
            "data": [{ "embedding": [0.1, 0.2, 0.3], "index": 0 }]
        }));
    });
    let upsert = server.mock(|when, then| {
        when.method(POST)
            .path("/vectors/upsert")
            .header("Api-Key", "pc-test");
        then.status(200).json_body(json!({ "upsertedCount": 2 }));
    });
    let stats = server.mock(|when, then| {
        when.method(POST).path("/describe_index_stats");
        then.status(200)
            .json_body(json!({ "totalVectorCount": 3, "dimension": 3 }));
    });

    let config = config_for(&server, dir.path(), 2);
    let credentials = config.credentials().expect("credentials");
    let embedder = build_embedding_client(&config, &credentials).expect("embedder");
    let store = PineconeService::new(&config.pinecone_controller_url, &credentials.pinecone_api_key)
        .expect("pinecone");

    let report = CodebaseIndexer::new(embedder.as_ref(), &store, IndexingOptions::from_config(&config))
        .run()
        .await
        .expect("indexing run");

    list.assert();
    describe.assert();
    embeddings.assert_hits(3);
    upsert.assert_hits(2);
    stats.assert_hits(2);

    assert!(!report.index_created);
    assert_eq!(report.embedding_model, "text-embedding-ada-002");
    assert_eq!(report.files_selected, 4);
    assert_eq!(report.metrics.files_processed, 3);
    assert_eq!(report.metrics.files_skipped, 1);
    assert_eq!(report.metrics.chunks_indexed, 3);
    assert_eq!(report.batches_flushed, 2);
    assert_eq!(report.vectors_after, 3);
}

#[tokio::test]
async fn creates_missing_index_before_writing() {
    let server = MockServer::start_async().await;
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "Program.cs", "var builder = WebApplication.CreateBuilder(args);");

    let list = server.mock(|when, then| {
        when.method(GET).path("/indexes");
        then.status(200).json_body(json!({ "indexes": [] }));
    });
    let create = server.mock(|when, then| {
        when.method(POST).path("/indexes").json_body(json!({
            "name": "sms-test",
            "dimension": 3,
            "metric": "cosine",
            "spec": { "serverless": { "cloud": "aws", "region": "us-east-1" } }
        }));
        then.status(201).json_body(describe_body(&server));
    });
    let describe = server.mock(|when, then| {
        when.method(GET).path("/indexes/sms-test");
        then.status(200).json_body(describe_body(&server));
    });
    server.mock(|when, then| {
        when.method(POST).path("/v1/embeddings");
        then.status(200).json_body(json!({
            "data": [{ "embedding": [0.3, 0.2, 0.1], "index": 0 }]
        }));
    });
    let upsert = server.mock(|when, then| {
        when.method(POST)
            .path("/vectors/upsert")
            .body_contains("\"id\":\"Program.cs::chunk_0\"");
        then.status(200).json_body(json!({ "upsertedCount": 1 }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/describe_index_stats");
        then.status(200).json_body(json!({ "totalVectorCount": 1 }));
    });

    let config = config_for(&server, dir.path(), 100);
    let credentials = config.credentials().expect("credentials");
    let embedder = build_embedding_client(&config, &credentials).expect("embedder");
    let store = PineconeService::new(&config.pinecone_controller_url, &credentials.pinecone_api_key)
        .expect("pinecone")
        .with_readiness(ReadinessPolicy {
            attempts: 3,
            interval: Duration::from_millis(10),
        });

    let report = CodebaseIndexer::new(embedder.as_ref(), &store, IndexingOptions::from_config(&config))
        .run()
        .await
        .expect("indexing run");

    list.assert();
    create.assert();
    describe.assert();
    upsert.assert();
    assert!(report.index_created);
    assert_eq!(report.vectors_after, 1);
}

#[test]
fn missing_pinecone_key_is_reported_before_any_request() {
    let values: HashMap<&str, &str> = HashMap::from([
        ("OPENAI_API_KEY", "sk-test"),
        ("PINECONE_API_KEY", "YOUR_PINECONE_API_KEY"),
    ]);
    let config = Config::from_lookup(|key| values.get(key).map(|value| value.to_string()))
        .expect("config");

    let err = config.credentials().expect_err("placeholder key");
    assert!(matches!(err, ConfigError::MissingCredential(ref name) if name == "PINECONE_API_KEY"));
    assert!(err.to_string().contains(".env"));
}
