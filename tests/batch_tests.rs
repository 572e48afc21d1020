// Integration tests for preview / apply over a batch of episodes

use danmaku_rename::batch::*;
use danmaku_rename::config::ConfigBuilder;
use danmaku_rename::rule_set::RuleSet;
use danmaku_rename::rules::*;
use serde_json::json;

fn episodes() -> Vec<EpisodeItem> {
    vec![
        EpisodeItem::new(101, "[Sub] show_01", 1),
        EpisodeItem::new(102, "[Sub] show_02", 2),
        EpisodeItem::new(103, "Special", 3),
    ]
}

fn strip_group() -> RuleKind {
    RuleKind::Delete(DeleteParams {
        mode: DeleteMode::ToText,
        text: "] ".to_string(),
        case_sensitive: true,
        count: 0,
        from: 0,
    })
}

fn number_titles() -> RuleKind {
    RuleKind::Serialize(SerializeParams {
        prefix: "第".to_string(),
        suffix: "話".to_string(),
        position: SerializePosition::Replace,
        ..SerializeParams::default()
    })
}

#[test]
fn test_preview_does_not_touch_items() {
    let items = episodes();
    let mut rules = RuleSet::new();
    rules.add(strip_group()).unwrap();

    let preview = preview(&items, &rules);
    assert_eq!(items, episodes());
    assert_eq!(preview.len(), 3);
    assert_eq!(preview.get(101), Some("show_01"));
    assert_eq!(preview.get(103), Some("Special"));
    assert_eq!(preview.changed(&items), vec![101, 102]);
}

#[test]
fn test_index_is_row_position() {
    let mut items = episodes();
    items[0].episode_index = 50;
    let mut rules = RuleSet::new();
    rules.add(number_titles()).unwrap();

    let preview = preview(&items, &rules);
    assert_eq!(preview.get(101), Some("第01話"));
    assert_eq!(preview.get(102), Some("第02話"));
    assert_eq!(preview.get(103), Some("第03話"));
}

#[test]
fn test_preview_follows_rule_changes() {
    let mut session = BatchSession::new(episodes(), RuleSet::new());
    let id = session.rules_mut().add(strip_group()).unwrap();
    assert_eq!(session.preview().get(102), Some("show_02"));

    session.rules_mut().toggle(id).unwrap();
    assert_eq!(session.preview().get(102), Some("[Sub] show_02"));

    session.rules_mut().toggle(id).unwrap();
    session
        .rules_mut()
        .add(RuleKind::Case(CaseParams { mode: CaseMode::Upper }))
        .unwrap();
    assert_eq!(session.preview().get(102), Some("SHOW_02"));

    session.rules_mut().remove(id).unwrap();
    assert_eq!(session.preview().get(102), Some("[SUB] SHOW_02"));
}

#[test]
fn test_apply_and_undo() {
    let mut session = BatchSession::new(episodes(), RuleSet::new());
    session.rules_mut().add(strip_group()).unwrap();
    assert!(!session.can_undo());

    let report = session.apply();
    assert_eq!(report.changed, 2);
    assert!(report.failures.is_empty());
    assert!(!report.rules_cleared);
    assert_eq!(session.rules().len(), 1);
    assert_eq!(session.items()[0].title, "show_01");
    assert_eq!(session.items()[0].episode_index, 1);
    assert_eq!(session.items()[2].title, "Special");

    assert_eq!(session.undo(), 2);
    assert_eq!(session.items(), episodes().as_slice());
    assert_eq!(session.undo(), 0);
}

#[test]
fn test_duplicate_ids_keep_their_own_titles() {
    let items = vec![EpisodeItem::new(1, "A", 1), EpisodeItem::new(1, "B", 2)];
    let mut rules = RuleSet::new();
    rules.add(RuleKind::Case(CaseParams { mode: CaseMode::Lower })).unwrap();

    let p = preview(&items, &rules);
    assert_eq!(p.row(0), Some("a"));
    assert_eq!(p.row(1), Some("b"));
    assert_eq!(p.changed(&items), vec![1, 1]);

    let mut session = BatchSession::new(items.clone(), rules);
    assert_eq!(session.apply().changed, 2);
    let titles: Vec<&str> = session.items().iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["a", "b"]);

    assert_eq!(session.undo(), 2);
    assert_eq!(session.items(), items.as_slice());
}

#[test]
fn test_noop_apply_keeps_previous_undo() {
    let mut session = BatchSession::new(episodes(), RuleSet::new());
    session.rules_mut().add(strip_group()).unwrap();
    assert_eq!(session.apply().changed, 2);

    // Already stripped, so a second apply changes nothing.
    assert_eq!(session.apply().changed, 0);
    assert!(session.can_undo());
    assert_eq!(session.undo(), 2);
    assert_eq!(session.items(), episodes().as_slice());

    let mut fresh = BatchSession::new(episodes(), RuleSet::new());
    let id = fresh.rules_mut().add(RuleKind::Case(CaseParams { mode: CaseMode::Title })).unwrap();
    fresh.rules_mut().set_enabled(id, false).unwrap();
    assert_eq!(fresh.apply().changed, 0);
    assert!(!fresh.can_undo());
}

#[test]
fn test_clear_rules_on_apply_policy() {
    let mut session = BatchSession::new(episodes(), RuleSet::new());
    session.set_clear_rules_on_apply(true);
    session.rules_mut().add(strip_group()).unwrap();

    let report = session.apply();
    assert!(report.rules_cleared);
    assert!(session.rules().is_empty());
    assert_eq!(session.items()[1].title, "show_02");
}

#[test]
fn test_failures_do_not_stop_batch() {
    let mut rules = RuleSet::new();
    rules
        .add(RuleKind::Regex(RegexParams {
            pattern: "[".to_string(),
            replace: String::new(),
        }))
        .unwrap();
    rules.add(strip_group()).unwrap();

    let mut session = BatchSession::new(episodes(), rules);
    let report = session.apply();
    assert_eq!(report.changed, 2);
    assert_eq!(report.failures.len(), 3);
    assert!(report.failures.iter().all(|f| f.failure.rule_type == RuleType::Regex));
    assert_eq!(report.failures[2].episode_id, 103);
}

#[test]
fn test_apply_preview_keeps_other_fields() {
    let mut items: Vec<EpisodeItem> = serde_json::from_value(json!([
        { "episodeId": 7, "title": "old", "episodeIndex": 4, "sourceId": 99 }
    ]))
    .unwrap();
    let mut rules = RuleSet::new();
    rules
        .add(RuleKind::Insert(InsertParams {
            text: "new ".to_string(),
            position: InsertPosition::Start,
            index: None,
        }))
        .unwrap();

    let p = preview(&items, &rules);
    let changes = apply_preview(&mut items, &p);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].previous, "old");
    assert_eq!(changes[0].applied, "new old");
    assert_eq!(items[0].title, "new old");
    assert_eq!(items[0].episode_index, 4);
    assert_eq!(items[0].extra["sourceId"], 99);
}

#[tokio::test]
async fn test_session_from_config_and_save() {
    let dir = tempfile::tempdir().unwrap();
    let items_path = dir.path().join("episodes.json");
    let rules_path = dir.path().join("rules.json");
    let output_path = dir.path().join("renamed.txt");

    std::fs::write(
        &items_path,
        serde_json::to_string(&json!([
            { "episodeId": 1, "title": "a_b", "episodeIndex": 1 },
            { "episodeId": 2, "title": "c_d", "episodeIndex": 2 }
        ]))
        .unwrap(),
    )
    .unwrap();
    std::fs::write(
        &rules_path,
        r#"[{ "id": 1, "type": "replace", "params": { "search": "_", "replace": " ", "caseSensitive": true } }]"#,
    )
    .unwrap();

    let config = ConfigBuilder::new()
        .items(&items_path)
        .rules(Some(&rules_path))
        .output(Some(&output_path))
        .clear_rules_on_apply(true)
        .build()
        .unwrap();

    let (mut session, format) = BatchSession::from_config(&config).await.unwrap();
    assert_eq!(format, ItemsFormat::Json);
    assert!(session.clear_rules_on_apply());
    assert_eq!(session.rules().len(), 1);

    session.apply();
    save_items(&output_path, session.items()).await.unwrap();
    assert_eq!(std::fs::read_to_string(&output_path).unwrap(), "a b\nc d\n");

    let (reloaded, format) = load_items(&output_path).await.unwrap();
    assert_eq!(format, ItemsFormat::Lines);
    assert_eq!(reloaded[1], EpisodeItem::new(2, "c d", 2));
}
