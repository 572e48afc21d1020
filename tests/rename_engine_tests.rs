// Integration tests for the rename engine module

use danmaku_rename::rename_engine::{apply_all_rules, apply_all_rules_with_report, apply_rule, RenameEngine};
use danmaku_rename::rules::*;
use serde_json::json;

fn rule(value: serde_json::Value) -> Rule {
    serde_json::from_value(value).unwrap()
}

fn sample_rules() -> Vec<Rule> {
    vec![
        rule(json!({ "id": 1, "type": "replace", "enabled": true,
                     "params": { "search": "_", "replace": " ", "caseSensitive": true } })),
        rule(json!({ "id": 2, "type": "strip", "enabled": true,
                     "params": { "trimSpaces": true, "trimDuplicateSpaces": true, "chars": "" } })),
        rule(json!({ "id": 3, "type": "serialize", "enabled": true,
                     "params": { "prefix": "EP", "suffix": " ", "start": 1, "step": 1, "digits": 2, "position": "start" } })),
        rule(json!({ "id": 4, "type": "case", "enabled": true, "params": { "mode": "upper" } })),
    ]
}

#[test]
fn test_disabled_rule_is_identity() {
    let mut rules = sample_rules();
    rules.push(rule(json!({ "id": 5, "type": "regex", "params": { "pattern": "(" } })));

    for r in &mut rules {
        r.enabled = false;
        for (title, index) in [("", 0), ("  Hello__World ", 3), ("第1話", 99)] {
            assert_eq!(apply_rule(title, r, index).unwrap(), title);
        }
    }
}

#[test]
fn test_fold_order() {
    let upper = rule(json!({ "id": 1, "type": "case", "params": { "mode": "upper" } }));
    let replace = rule(json!({ "id": 2, "type": "replace",
                               "params": { "search": "a", "replace": "b", "caseSensitive": true } }));

    let title = "banana";
    let expected = apply_rule(&apply_rule(title, &upper, 0).unwrap(), &replace, 0).unwrap();
    assert_eq!(apply_all_rules(title, &[upper.clone(), replace.clone()], 0), expected);
    assert_eq!(expected, "BANANA");

    // Reversed order gives a different answer.
    assert_eq!(apply_all_rules(title, &[replace, upper], 0), "BBNBNB");
}

#[test]
fn test_replace_literal() {
    let r = rule(json!({ "id": 1, "type": "replace", "enabled": true,
                         "params": { "search": "X", "replace": "-", "caseSensitive": true } }));
    assert_eq!(apply_rule("aXbXc", &r, 0).unwrap(), "a-b-c");
    assert_eq!(apply_rule("axbxc", &r, 0).unwrap(), "axbxc");

    let r = rule(json!({ "id": 1, "type": "replace",
                         "params": { "search": "x", "replace": "-", "caseSensitive": false } }));
    assert_eq!(apply_rule("aXbxc", &r, 0).unwrap(), "a-b-c");

    let r = rule(json!({ "id": 1, "type": "replace",
                         "params": { "search": "(1)", "replace": "", "caseSensitive": false } }));
    assert_eq!(apply_rule("Title (1) 1", &r, 0).unwrap(), "Title  1");
}

#[test]
fn test_serialize_sequence() {
    let r = rule(json!({ "id": 1, "type": "serialize", "enabled": true,
                         "params": { "prefix": "S01E", "start": 1, "digits": 2, "position": "start" } }));
    assert_eq!(apply_rule("Ep", &r, 4).unwrap(), "S01E05Ep");

    let r = rule(json!({ "id": 1, "type": "serialize",
                         "params": { "prefix": "第", "suffix": "話", "start": 10, "step": 2, "digits": 3, "position": "replace" } }));
    assert_eq!(apply_rule("whatever", &r, 0).unwrap(), "第010話");
    assert_eq!(apply_rule("whatever", &r, 3).unwrap(), "第016話");

    let r = rule(json!({ "id": 1, "type": "serialize",
                         "params": { "prefix": " #", "position": "end" } }));
    assert_eq!(apply_rule("Title", &r, 0).unwrap(), "Title #01");
}

#[test]
fn test_delete_range() {
    let r = rule(json!({ "id": 1, "type": "delete", "enabled": true,
                         "params": { "mode": "range", "from": 5, "count": 5 } }));
    assert_eq!(apply_rule("HelloWorld", &r, 0).unwrap(), "Hello");

    let r = rule(json!({ "id": 1, "type": "delete", "params": { "mode": "range", "from": 1, "count": 2 } }));
    assert_eq!(apply_rule("第一話目", &r, 0).unwrap(), "第目");
    assert_eq!(apply_rule("ab", &r, 0).unwrap(), "a");
    assert_eq!(apply_rule("", &r, 0).unwrap(), "");
}

#[test]
fn test_delete_counts_characters_not_bytes() {
    let first = rule(json!({ "id": 1, "type": "delete", "params": { "mode": "first", "count": 2 } }));
    let last = rule(json!({ "id": 2, "type": "delete", "params": { "mode": "last", "count": 1 } }));
    assert_eq!(apply_rule("进击的巨人", &first, 0).unwrap(), "的巨人");
    assert_eq!(apply_rule("进击的巨人", &last, 0).unwrap(), "进击的巨");
}

#[test]
fn test_case_modes() {
    let title = rule(json!({ "id": 1, "type": "case", "enabled": true, "params": { "mode": "title" } }));
    assert_eq!(apply_rule("HELLO world", &title, 0).unwrap(), "Hello world");

    let lower = rule(json!({ "id": 2, "type": "case", "params": { "mode": "lower" } }));
    assert_eq!(apply_rule("HELLO World", &lower, 0).unwrap(), "hello world");
}

#[test]
fn test_strip_composite() {
    let r = rule(json!({ "id": 1, "type": "strip", "enabled": true,
                         "params": { "trimSpaces": true, "trimDuplicateSpaces": true, "chars": "" } }));
    assert_eq!(apply_rule("  a   b  ", &r, 0).unwrap(), "a b");

    let r = rule(json!({ "id": 1, "type": "strip",
                         "params": { "trimSpaces": false, "trimDuplicateSpaces": false, "chars": "[]" } }));
    assert_eq!(apply_rule("a[]b[]c[", &r, 0).unwrap(), "abc[");
}

#[test]
fn test_insert_positions() {
    let start = rule(json!({ "id": 1, "type": "insert", "params": { "text": "[BD] ", "position": "start" } }));
    let end = rule(json!({ "id": 2, "type": "insert", "params": { "text": " END", "position": "end" } }));
    let at = rule(json!({ "id": 3, "type": "insert", "params": { "text": "|", "position": "index", "index": 3 } }));

    assert_eq!(apply_all_rules("Title", &[start, end, at], 0), "[BD|] Title END");
}

#[test]
fn test_regex_failure_isolated() {
    let rules = vec![
        rule(json!({ "id": 1, "type": "regex", "params": { "pattern": "(unbalanced", "replace": "x" } })),
        rule(json!({ "id": 2, "type": "replace", "params": { "search": "a", "replace": "o", "caseSensitive": true } })),
    ];

    let outcome = apply_all_rules_with_report("banana", &rules, 0);
    assert_eq!(outcome.title, "bonono");
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].rule_type, RuleType::Regex);
    assert!(outcome.failures[0].message.contains("(unbalanced"));

    assert_eq!(apply_all_rules("banana", &rules, 0), "bonono");
}

#[test]
fn test_regex_replace_with_groups() {
    let r = rule(json!({ "id": 1, "type": "regex",
                         "params": { "pattern": r"^\[(?P<group>[^\]]+)\]\s*(.+)$", "replace": "$2 (${group})" } }));
    assert_eq!(apply_rule("[Subs] Title 01", &r, 0).unwrap(), "Title 01 (Subs)");
}

#[test]
fn test_toggle_round_trip() {
    let original = String::from("  my_show__ep ");
    let mut rules = sample_rules();

    let renamed = apply_all_rules(&original, &rules, 2);
    assert_eq!(renamed, "EP03 MY SHOW EP");

    for r in &mut rules {
        r.enabled = false;
    }
    assert_eq!(apply_all_rules(&original, &rules, 2), original);
    assert_eq!(original, "  my_show__ep ");
}

#[test]
fn test_engine_matches_free_functions() {
    let rules = sample_rules();
    let engine = RenameEngine::new(&rules);
    for (index, title) in ["a_b", " c  d ", ""].iter().enumerate() {
        assert_eq!(engine.rename(title, index).title, apply_all_rules(title, &rules, index));
    }
}

#[test]
fn test_deterministic() {
    let rules = sample_rules();
    let first = apply_all_rules("x_y", &rules, 7);
    for _ in 0..5 {
        assert_eq!(apply_all_rules("x_y", &rules, 7), first);
    }
}

#[test]
fn test_oversized_digits_fails_only_that_rule() {
    let rules = vec![
        rule(json!({ "id": 1, "type": "serialize", "params": { "prefix": "E", "digits": 100000 } })),
        rule(json!({ "id": 2, "type": "case", "params": { "mode": "upper" } })),
    ];

    let outcome = apply_all_rules_with_report("Ep", &rules, 0);
    assert_eq!(outcome.title, "EP");
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].rule_type, RuleType::Serialize);
    assert!(outcome.failures[0].message.contains("digits"));

    assert_eq!(apply_all_rules("Ep", &rules, 0), "EP");
    assert!(apply_rule("Ep", &rules[0], 0).is_err());
}
