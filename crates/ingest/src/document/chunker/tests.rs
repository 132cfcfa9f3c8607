//! Tests for the chunking engine.

use std::path::PathBuf;

use pdfrag_core::ChunkParams;

use super::helpers::count_tokens;
use super::{chunk_document, chunk_documents, Chunk};
use crate::document::{Document, DocumentMetadata};

fn make_doc(text: &str) -> Document {
    make_paged_doc(text, vec![0])
}

fn make_paged_doc(text: &str, page_boundaries: Vec<usize>) -> Document {
    Document {
        id: "doc1".to_string(),
        path: PathBuf::from("pdfs/test.pdf"),
        text: text.to_string(),
        page_boundaries,
        metadata: DocumentMetadata {
            source: "test.pdf".to_string(),
            file_path: "pdfs/test.pdf".to_string(),
            file_size: text.len() as u64,
            file_type: "pdf".to_string(),
            title: None,
            authors: None,
        },
    }
}

fn params(size: usize, overlap: usize) -> ChunkParams {
    ChunkParams::new(size, overlap).unwrap()
}

fn words(n: usize) -> String {
    (0..n).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ")
}

/// Concatenate chunks, dropping the part of each chunk already covered by
/// its predecessor.
fn reconstruct(chunks: &[Chunk]) -> String {
    let mut out = String::new();
    let mut covered = 0usize;
    for chunk in chunks {
        let skip = covered - chunk.start;
        out.push_str(&chunk.text[skip..]);
        covered = chunk.end;
    }
    out
}

// ── Coverage / reconstruction ───────────────────────────────────────

#[test]
fn reconstructs_text_for_many_parameter_choices() {
    let text = format!(
        "  Intro line.\n\n{}\nMiddle sentence here. {}! Final words?  ",
        words(137),
        words(61)
    );
    let doc = make_doc(&text);
    for (size, overlap) in [(1, 0), (2, 1), (5, 0), (7, 3), (16, 15), (50, 10), (512, 50)] {
        let chunks = chunk_document(&doc, &params(size, overlap));
        assert_eq!(reconstruct(&chunks), text, "size={size} overlap={overlap}");
        assert_eq!(chunks.first().unwrap().start, 0);
        assert_eq!(chunks.last().unwrap().end, text.len());
    }
}

#[test]
fn chunk_text_is_exact_slice() {
    let text = words(300);
    let doc = make_doc(&text);
    for chunk in chunk_document(&doc, &params(40, 8)) {
        assert_eq!(chunk.text, &text[chunk.start..chunk.end]);
        assert_eq!(chunk.token_count, count_tokens(&chunk.text));
    }
}

// ── Size and overlap bounds ─────────────────────────────────────────

#[test]
fn chunks_never_exceed_size() {
    let doc = make_doc(&words(1000));
    let chunks = chunk_document(&doc, &params(64, 16));
    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.token_count <= 64 && c.token_count > 0));
}

#[test]
fn adjacent_chunks_share_exactly_overlap_tokens() {
    let text = words(500);
    let doc = make_doc(&text);
    let chunks = chunk_document(&doc, &params(50, 10));
    for pair in chunks.windows(2) {
        let shared = &text[pair[1].start..pair[0].end];
        assert_eq!(count_tokens(shared), 10);
    }
}

#[test]
fn zero_overlap_chunks_are_contiguous() {
    let doc = make_doc(&words(120));
    let chunks = chunk_document(&doc, &params(25, 0));
    for pair in chunks.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    let total: usize = chunks.iter().map(|c| c.token_count).sum();
    assert_eq!(total, 120);
}

#[test]
fn single_small_document_is_one_chunk() {
    let doc = make_doc("The capital of France is Paris.");
    let chunks = chunk_document(&doc, &params(512, 50));
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].content(), "The capital of France is Paris.");
    assert_eq!(chunks[0].token_count, 6);
    assert_eq!(chunks[0].id, "doc1:0");
    assert_eq!(chunks[0].source, "test.pdf");
}

// ── Sentence boundaries ─────────────────────────────────────────────

#[test]
fn windows_end_on_sentence_boundary_when_possible() {
    // 10 sentences of 6 tokens each.
    let text = (0..10)
        .map(|i| format!("Sentence number {i} has six words."))
        .collect::<Vec<_>>()
        .join(" ");
    let doc = make_doc(&text);
    let chunks = chunk_document(&doc, &params(20, 0));
    for chunk in &chunks[..chunks.len() - 1] {
        assert!(chunk.content().ends_with('.'), "chunk should end a sentence: {:?}", chunk.content());
        assert_eq!(chunk.token_count, 18);
    }
}

#[test]
fn falls_back_to_hard_cut_without_sentences() {
    let doc = make_doc(&words(45));
    let chunks = chunk_document(&doc, &params(20, 0));
    let counts: Vec<usize> = chunks.iter().map(|c| c.token_count).collect();
    assert_eq!(counts, vec![20, 20, 5]);
}

// ── Metadata ────────────────────────────────────────────────────────

#[test]
fn page_numbers_follow_first_token() {
    let page1 = words(30);
    let text = format!("{page1}\n\n{}", words(30));
    let boundary = page1.len() + 2;
    let doc = make_paged_doc(&text, vec![0, boundary]);
    let chunks = chunk_document(&doc, &params(20, 0));
    assert_eq!(chunks[0].page_number, 1);
    assert_eq!(chunks.last().unwrap().page_number, 2);
    for chunk in &chunks {
        let expected = if chunk.start >= boundary { 2 } else { 1 };
        assert_eq!(chunk.page_number, expected, "chunk {} starts at {}", chunk.index, chunk.start);
    }
}

#[test]
fn indices_and_ids_are_sequential() {
    let doc = make_doc(&words(200));
    let chunks = chunk_document(&doc, &params(30, 5));
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index, i);
        assert_eq!(chunk.id, format!("doc1:{i}"));
        assert_eq!(chunk.document_id, "doc1");
    }
}

// ── Edge cases ──────────────────────────────────────────────────────

#[test]
fn empty_and_whitespace_text_yield_no_chunks() {
    assert!(chunk_document(&make_doc(""), &params(10, 2)).is_empty());
    assert!(chunk_document(&make_doc(" \n\t "), &params(10, 2)).is_empty());
}

#[test]
fn chunking_is_deterministic() {
    let doc = make_doc(&format!("{}. {}", words(333), words(77)));
    let a = chunk_document(&doc, &params(48, 12));
    let b = chunk_document(&doc, &params(48, 12));
    assert_eq!(a, b);
}

#[test]
fn chunk_documents_keeps_document_order() {
    let mut first = make_doc(&words(10));
    first.id = "first".into();
    let mut second = make_doc(&words(10));
    second.id = "second".into();
    let chunks = chunk_documents(&[first, second], &params(4, 1));
    let first_second = chunks.iter().position(|c| c.document_id == "second").unwrap();
    assert!(chunks[..first_second].iter().all(|c| c.document_id == "first"));
    assert!(chunks[first_second..].iter().all(|c| c.document_id == "second"));
}
