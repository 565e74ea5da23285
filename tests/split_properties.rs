use chunk_splitter::text::chunking::{
    ChunkConfig, ChunkSettings, ChunkStrategy, ChunkType, DocumentSet, Splitter, TextChunk,
    get_chunk, split, split_chunks,
};
use chunk_splitter::util::tracing::tracing_init_test;
use itertools::Itertools;

const CORPUS: [&str; 5] = [
    "The quick brown fox jumps over the lazy dog. It was not amused! Why? Nobody knows.",
    "",
    "吾輩は猫である。名前はまだ無い。どこで生れたかとんと見当がつかぬ。",
    "First paragraph line one\nline two.\n\nSecond paragraph.\n \t\nThird one 😁 with emoji.",
    "tail",
];

fn configs() -> Vec<ChunkConfig> {
    let sizes = [1, 3, 8, 20, 64];
    ChunkStrategy::ALL
        .into_iter()
        .cartesian_product(sizes)
        .flat_map(|(strategy, size)| {
            [0, size / 4, size / 2, size - 1]
                .into_iter()
                .unique()
                .map(move |overlap| {
                    ChunkConfig::new(size)
                        .with_chunk_overlap(overlap)
                        .with_chunk_strategy(strategy)
                })
        })
        .collect()
}

fn check_positions(documents: &[&str], chunks: &[TextChunk]) {
    let set = DocumentSet::new(documents);
    for (index, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_index, index);
        assert!(!chunk.is_empty());
        assert_eq!(
            set.get_chunk(Some(chunk.char_start), Some(chunk.char_end))
                .unwrap(),
            chunk.content
        );
        assert_eq!(chunk.content.chars().count(), chunk.char_length());
    }
    for (prev, next) in chunks.iter().tuple_windows() {
        // strictly advancing, and only the overlap is shared
        assert!(next.char_end > prev.char_end);
        assert!(next.char_start >= prev.char_start);
        if next.overlap_chars > 0 {
            assert_eq!(next.char_start + next.overlap_chars, prev.char_end);
        } else {
            assert!(next.char_start >= prev.char_end);
        }
    }
}

#[test]
fn test_chunks_resolve_to_their_positions() {
    tracing_init_test(tracing::Level::DEBUG);
    for config in configs() {
        let chunks = split_chunks(&CORPUS, &config).unwrap();
        assert!(!chunks.is_empty(), "{config:?}");
        check_positions(&CORPUS, &chunks);
    }
}

#[test]
fn test_chunks_respect_size_and_overlap() {
    for config in configs() {
        let chunks = split_chunks(&CORPUS, &config).unwrap();
        for chunk in &chunks {
            if chunk.chunk_type == ChunkType::Packed {
                assert!(chunk.length <= config.chunk_size, "{config:?} {chunk:?}");
            } else {
                assert!(chunk.length > config.chunk_size);
                assert_eq!(chunk.overlap_chars, 0);
            }
            let overlap = &chunk.content[..chunk.content.len() - chunk.fresh_content().len()];
            assert!(overlap.chars().count() <= config.chunk_overlap, "{config:?} {chunk:?}");
        }
    }
}

#[test]
fn test_character_chunks_reconstruct_the_input() {
    let full = CORPUS.concat();
    for config in configs()
        .into_iter()
        .filter(|c| c.chunk_strategy == ChunkStrategy::Character)
    {
        let chunks = split_chunks(&CORPUS, &config).unwrap();
        let rebuilt: String = chunks.iter().map(|c| c.fresh_content()).collect();
        assert_eq!(rebuilt, full, "{config:?}");
        assert_eq!(chunks.last().map(|c| c.char_end), Some(full.chars().count()));
    }
}

fn non_whitespace<'a>(pieces: impl IntoIterator<Item = &'a str>) -> String {
    pieces
        .into_iter()
        .flat_map(|p| p.chars())
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[test]
fn test_collapsing_strategies_only_drop_whitespace() {
    let full = CORPUS.concat();
    let total = full.chars().count();
    for config in configs()
        .into_iter()
        .filter(|c| c.chunk_strategy.collapses_whitespace())
    {
        let chunks = split_chunks(&CORPUS, &config).unwrap();
        let first = chunks.first().unwrap();
        let last = chunks.last().unwrap();
        let mut gaps = vec![
            get_chunk(&CORPUS, None, Some(first.char_start)).unwrap(),
            get_chunk(&CORPUS, Some(last.char_end), Some(total)).unwrap(),
        ];
        for (prev, next) in chunks.iter().tuple_windows() {
            if next.char_start > prev.char_end {
                gaps.push(get_chunk(&CORPUS, Some(prev.char_end), Some(next.char_start)).unwrap());
            }
        }
        for gap in &gaps {
            assert!(gap.chars().all(char::is_whitespace), "{config:?} {gap:?}");
        }
        assert_eq!(
            non_whitespace(chunks.iter().map(|c| c.fresh_content())),
            non_whitespace([full.as_str()]),
            "{config:?}"
        );
    }
}

#[test]
fn test_units_are_never_cut() {
    let config = ChunkConfig::new(40)
        .with_chunk_overlap(15)
        .with_chunk_strategy(ChunkStrategy::Sentence);
    let chunks = split(&CORPUS, &config).unwrap();
    for chunk in &chunks {
        let last = chunk.trim_end().chars().last().unwrap();
        assert!(
            ['.', '!', '?', '。'].contains(&last) || chunk.ends_with("tail"),
            "{chunk:?}"
        );
    }

    let config = ChunkConfig::new(30).with_chunk_strategy(ChunkStrategy::Paragraph);
    let chunks = split(&[CORPUS[3]], &config).unwrap();
    assert_eq!(
        chunks,
        vec![
            "First paragraph line one\nline two.",
            "Second paragraph.",
            "Third one 😁 with emoji."
        ]
    );
}

#[test]
fn test_settings_drive_splitter() {
    let settings = ChunkSettings::from_vars(vec![
        ("CHUNK_CHUNK_SIZE".to_string(), "5".to_string()),
        ("CHUNK_CHUNK_OVERLAP".to_string(), "2".to_string()),
    ])
    .unwrap();
    let splitter = Splitter::new(settings.into_config().unwrap()).unwrap();
    assert_eq!(
        splitter.split(&["abcdefgh"]).unwrap(),
        vec!["abcde", "defgh"]
    );
    assert_eq!(get_chunk(&["abc", "defgh"], Some(3), None).unwrap(), "defgh");
}
