//! Editing sessions driven end to end against an in-memory block list

use courseweave_editor::{Document, EditSession, Mutation, SaveOutcome};
use courseweave_model::{Block, BlockType, Mark, NodeKind, TextRun};
use courseweave_sync::Registry;
use serde_json::json;
use std::sync::Arc;

/// Stand-in for the store: assigns sequential ids to new blocks
fn persist(blocks: &[Block], next_id: &mut u32) -> Vec<Block> {
    blocks
        .iter()
        .cloned()
        .map(|mut block| {
            if block.is_unsaved() {
                *next_id += 1;
                block.id = format!("b{}", next_id);
            }
            block
        })
        .collect()
}

fn open() -> EditSession {
    let blocks: Vec<Block> = serde_json::from_value(json!([
        { "id": "b1", "type": "heading", "order": 0, "content": { "level": 1, "text": "Intro" } },
        { "id": "b2", "type": "paragraph", "order": 1, "content": { "text": "Hello" } }
    ]))
    .unwrap();
    EditSession::new("author", Document::load("doc-1", Arc::new(Registry::standard()), blocks))
}

#[test]
fn test_edit_save_cycle() -> anyhow::Result<()> {
    let mut session = open();
    let mut next_id = 2;

    let list = session
        .document
        .new_node(&BlockType::BulletedList, &json!({ "items": ["Plan", "Build"] }))?;
    session.apply(Mutation::InsertNode { index: 1, node: list })?;
    session.apply(Mutation::ReplaceRuns {
        path: vec![2],
        runs: vec![TextRun::plain("Hello "), TextRun::marked("world", vec![Mark::Bold])],
    })?;

    let ticket = session.begin_save();
    assert!(ticket.sync.changed);
    assert_eq!(ticket.sync.created, 1);

    let persisted = persist(ticket.blocks(), &mut next_id);
    assert_eq!(session.complete_save(ticket.generation, persisted)?, SaveOutcome::Applied);

    let stored = session.document.last_known();
    assert_eq!(stored[1].id, "b3");
    assert_eq!(stored[1].block_type, BlockType::BulletedList);
    assert_eq!(stored[2].id, "b2");
    assert_eq!(stored[2].order, 2);
    assert_eq!(
        stored[2].content,
        json!({
            "text": "Hello world",
            "marks": [{ "start": 6, "end": 11, "mark": { "type": "bold" } }]
        })
    );

    // nothing new on the next pass
    let again = session.begin_save();
    assert!(!again.sync.changed);
    assert_eq!(again.sync.created, 0);
    Ok(())
}

#[test]
fn test_remove_then_save_reports_deleted() -> anyhow::Result<()> {
    let mut session = open();
    session.apply(Mutation::RemoveNode { index: 0 })?;

    let ticket = session.begin_save();
    assert_eq!(ticket.sync.deleted, vec!["b1".to_string()]);
    assert_eq!(ticket.blocks()[0].order, 0);
    Ok(())
}

#[test]
fn test_unmapped_node_survives_in_tree() -> anyhow::Result<()> {
    let mut session = open();
    let embed = courseweave_model::Node::new(NodeKind::Custom("embed".into())).with_text("video");
    session.apply(Mutation::InsertNode { index: 2, node: embed })?;

    let ticket = session.begin_save();
    assert_eq!(ticket.sync.unmapped.len(), 1);
    assert_eq!(ticket.blocks().len(), 2);

    let persisted = ticket.blocks().to_vec();
    session.complete_save(ticket.generation, persisted)?;
    assert_eq!(session.document.tree().len(), 3);
    assert_eq!(session.document.tree().root[2].id, None);
    Ok(())
}

#[test]
fn test_mutation_sequence_round_trips_through_json() -> anyhow::Result<()> {
    let mutations: Vec<Mutation> = serde_json::from_value(json!([
        { "type": "move_node", "from": 1, "to": 0 },
        { "type": "update_text", "path": [1], "text": "Overview" },
        { "type": "set_attribute", "path": [1], "name": "level", "value": 2 }
    ]))?;

    let mut session = open();
    for mutation in mutations {
        session.apply(mutation)?;
    }

    let tree = session.document.tree();
    assert_eq!(tree.root[0].kind, NodeKind::Paragraph);
    assert_eq!(tree.root[1].text_content(), "Overview");
    assert_eq!(session.pending_count(), 3);

    let ticket = session.begin_save();
    assert_eq!(ticket.blocks()[1].content, json!({ "level": 2, "text": "Overview" }));
    Ok(())
}
