use courseweave_model::{Block, BlockType};
use courseweave_sync::{build_tree, extract_blocks, word_count, Registry};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

fn lesson(sections: usize) -> Vec<Block> {
    let mut blocks = Vec::new();
    for i in 0..sections {
        let order = blocks.len() as i64;
        blocks.push(Block::new(
            format!("h{}", i),
            BlockType::Heading,
            order,
            json!({ "level": 2, "text": format!("Section {}", i) }),
        ));
        blocks.push(Block::new(
            format!("p{}", i),
            BlockType::Paragraph,
            order + 1,
            json!({
                "text": "Learners compare two approaches and explain the trade-offs in their own words.",
                "marks": [{ "start": 9, "end": 16, "mark": { "type": "bold" } }]
            }),
        ));
        blocks.push(Block::new(
            format!("l{}", i),
            BlockType::BulletedList,
            order + 2,
            json!({ "items": ["Read the case", "Discuss in pairs", "Write a summary"] }),
        ));
        blocks.push(Block::new(
            format!("s{}", i),
            BlockType::ContentScreen,
            order + 3,
            json!({
                "title": format!("Screen {}", i),
                "elements": [
                    { "type": "text", "text": "Drag each item into the right bucket." },
                    { "type": "image", "assetId": format!("asset-{}", i), "alt": "Buckets" }
                ]
            }),
        ));
    }
    blocks
}

fn build_small_lesson(c: &mut Criterion) {
    let registry = Registry::standard();
    let blocks = lesson(5);

    c.bench_function("build_small_lesson", |b| {
        b.iter(|| build_tree(&registry, black_box(&blocks)))
    });
}

fn build_large_lesson(c: &mut Criterion) {
    let registry = Registry::standard();
    let blocks = lesson(250);

    c.bench_function("build_large_lesson", |b| {
        b.iter(|| build_tree(&registry, black_box(&blocks)))
    });
}

fn extract_large_lesson(c: &mut Criterion) {
    let registry = Registry::standard();
    let blocks = lesson(250);
    let tree = build_tree(&registry, &blocks);

    c.bench_function("extract_large_lesson", |b| {
        b.iter(|| extract_blocks(&registry, black_box(&tree), black_box(&blocks)))
    });
}

fn count_words(c: &mut Criterion) {
    let registry = Registry::standard();
    let tree = build_tree(&registry, &lesson(250));

    c.bench_function("count_words", |b| b.iter(|| word_count(black_box(&tree))));
}

criterion_group!(
    benches,
    build_small_lesson,
    build_large_lesson,
    extract_large_lesson,
    count_words
);
criterion_main!(benches);
