//! End-to-end import of all three transcript formats into one store.

use agentlog_core::testing::MemoryStore;
use agentlog_core::{MessageType, Tool};
use agentlog_parsers::discover::default_source_dir;
use agentlog_parsers::{Importer, SourceDir};
use std::fs;
use std::path::Path;

fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn seed_home(home: &Path) {
    let claude = default_source_dir(home, Tool::Claude).join("-Users-alice-shop");
    write(
        &claude.join("c-1.jsonl"),
        concat!(
            r#"{"type":"user","uuid":"u1","cwd":"/Users/alice/shop","timestamp":"2025-03-01T09:00:00Z","message":{"content":"my key is sk-ant-REDACTED"}}"#,
            "\n",
            r#"{"type":"assistant","uuid":"a1","timestamp":"2025-03-01T09:00:04Z","message":{"content":[{"type":"text","text":"Rotate it."}]}}"#,
            "\n",
        ),
    );
    write(
        &claude.join("agent-side.jsonl"),
        r#"{"type":"user","message":{"content":"subagent"}}"#,
    );

    let codex = home.join(".codex/sessions/2025/03/01");
    write(
        &codex.join("rollout-2025-03-01T10-00-00-x77.jsonl"),
        concat!(
            r#"{"timestamp":"2025-03-01T10:00:00Z","type":"session_meta","payload":{"cwd":"/srv/api"}}"#,
            "\n",
            r#"{"timestamp":"2025-03-01T10:00:01Z","type":"response_item","payload":{"type":"message","role":"user","content":[{"type":"input_text","text":"list routes"}]}}"#,
            "\n",
            "{broken\n",
        ),
    );

    let gemini = default_source_dir(home, Tool::Gemini).join("0123456789abcdef/chats");
    write(
        &gemini.join("session-1.json"),
        r#"{"sessionId":"gem-1","projectHash":"0123456789abcdef","messages":[
            {"id":"g0","type":"user","timestamp":"2025-03-01T11:00:00Z","content":"what changed?"},
            {"id":"g1","type":"gemini","timestamp":"2025-03-01T11:00:02Z","content":"Two files."}
        ]}"#,
    );
    write(&gemini.join("session-2.json"), "not json");
}

#[test]
fn imports_every_format_once() {
    let home = tempfile::tempdir().unwrap();
    seed_home(home.path());

    let sources = vec![
        SourceDir::new("claude", default_source_dir(home.path(), Tool::Claude)),
        SourceDir::new("codex", home.path().join(".codex/sessions")),
        SourceDir::new("gemini", default_source_dir(home.path(), Tool::Gemini)),
    ];
    let importer = Importer::with_default_adapters();
    let store = MemoryStore::new();

    let counts = importer.import_all(&sources, &store);
    assert_eq!(counts.get("claude"), Some(&1));
    assert_eq!(counts.get("codex"), Some(&1));
    assert_eq!(counts.get("gemini"), Some(&1));
    assert_eq!(store.session_ids(), vec!["c-1", "gem-1", "x77"]);

    let claude = store.session("c-1").unwrap();
    assert_eq!(claude.tool, Tool::Claude);
    assert_eq!(claude.project.as_deref(), Some("shop"));
    assert_eq!(claude.message_count, 2);

    // Stored as-is; masking happens on display.
    let first = &store.messages("c-1")[0];
    assert!(first.content.as_deref().unwrap().contains("sk-ant-abcdef"));
    assert_eq!(
        first.masked().content.as_deref(),
        Some("my key is sk-***")
    );

    let codex = store.session("x77").unwrap();
    assert_eq!(codex.project.as_deref(), Some("api"));
    assert_eq!(codex.summary.as_deref(), Some("list routes"));

    let gemini = store.messages("gem-1");
    assert_eq!(gemini[1].kind, MessageType::Assistant);
    assert_eq!(
        store.session("gem-1").unwrap().project.as_deref(),
        Some("gemini:01234567")
    );

    let rerun = importer.import_all(&sources, &store);
    assert!(rerun.values().all(|&n| n == 0));
    assert_eq!(store.messages("c-1").len(), 2);
}

#[test]
fn disabled_and_missing_sources_import_nothing() {
    let home = tempfile::tempdir().unwrap();
    seed_home(home.path());

    let mut claude = SourceDir::new("claude", default_source_dir(home.path(), Tool::Claude));
    claude.enabled = false;
    let sources = vec![claude, SourceDir::new("gemini", home.path().join("absent"))];

    let store = MemoryStore::new();
    let counts = Importer::with_default_adapters().import_all(&sources, &store);
    assert_eq!(counts.get("claude"), None);
    assert_eq!(counts.get("gemini"), Some(&0));
    assert!(store.session_ids().is_empty());
}
