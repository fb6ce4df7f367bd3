//! Grouping of ranked chunk hits by source document.

use std::collections::HashMap;

use trainforge_shared::{ChunkHit, RetrievedGroup};

/// Group chunk hits by document.
///
/// Groups appear in first-seen order before ranking, chunks keep their hit
/// order, and the result is stably sorted by descending `max_similarity`.
pub fn group_hits(hits: Vec<ChunkHit>) -> Vec<RetrievedGroup> {
    let mut groups: Vec<RetrievedGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for hit in hits {
        let similarity = hit.chunk.similarity.clamp(0.0, 1.0);
        let key = hit.document_id.as_str().to_string();

        match positions.get(&key) {
            Some(&pos) => {
                let group = &mut groups[pos];
                group.max_similarity = group.max_similarity.max(similarity);
                group.chunks.push(hit.chunk);
            }
            None => {
                positions.insert(key, groups.len());
                groups.push(RetrievedGroup {
                    document_id: hit.document_id,
                    filename: hit.filename,
                    file_type: hit.file_type,
                    max_similarity: similarity,
                    chunks: vec![hit.chunk],
                });
            }
        }
    }

    groups.sort_by(|a, b| b.max_similarity.total_cmp(&a.max_similarity));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use trainforge_shared::{DocumentId, RetrievedChunk};

    fn hit(doc: &str, index: usize, similarity: f64) -> ChunkHit {
        ChunkHit {
            document_id: DocumentId(doc.to_string()),
            filename: format!("{doc}.txt"),
            file_type: ".txt".into(),
            chunk: RetrievedChunk {
                chunk_id: format!("{doc}_chunk_{index}"),
                text: format!("chunk {index} of {doc}"),
                index,
                similarity,
            },
        }
    }

    #[test]
    fn groups_sorted_by_best_match() {
        let groups = group_hits(vec![
            hit("a", 0, 0.4),
            hit("b", 3, 0.9),
            hit("a", 1, 0.5),
            hit("c", 0, 0.1),
        ]);

        let ids: Vec<&str> = groups.iter().map(|g| g.document_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert!((groups[1].max_similarity - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn chunks_keep_hit_order() {
        let groups = group_hits(vec![hit("a", 5, 0.3), hit("a", 2, 0.8), hit("a", 9, 0.1)]);
        assert_eq!(groups.len(), 1);
        let order: Vec<usize> = groups[0].chunks.iter().map(|c| c.index).collect();
        assert_eq!(order, vec![5, 2, 9]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let groups = group_hits(vec![hit("x", 0, 0.5), hit("y", 0, 0.5)]);
        assert_eq!(groups[0].document_id.as_str(), "x");
        assert_eq!(groups[1].document_id.as_str(), "y");
    }

    #[test]
    fn empty_hits_give_no_groups() {
        assert!(group_hits(Vec::new()).is_empty());
    }
}
