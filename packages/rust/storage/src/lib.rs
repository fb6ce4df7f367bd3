//! libSQL chunk store (local, offline).
//!
//! The [`Storage`] struct wraps a libSQL database holding ingested documents,
//! their chunks, and an FTS5 index over chunk text. It stands in for the
//! vector database: [`Storage::search_chunks`] selects candidates with FTS5
//! and scores them by query-term coverage.

mod migrations;

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use libsql::{Connection, Database, params};
use regex::Regex;
use tracing::{debug, instrument};

use trainforge_shared::{
    ChunkHit, DocumentChunk, DocumentId, RetrievedChunk, Result, StoredDocument, TrainforgeError,
};

/// Database file name inside the store directory.
pub const DB_FILE_NAME: &str = "trainforge.db";

/// Words too common to be useful as FTS terms.
const QUERY_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "into", "about", "are", "was", "were",
    "how", "what", "make", "create", "generate", "minute", "minutes", "please",
];

static TERM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid regex"));

fn storage_err(e: impl std::fmt::Display) -> TrainforgeError {
    TrainforgeError::Storage(e.to_string())
}

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

/// Document and chunk counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub documents: usize,
    pub chunks: usize,
    /// `(file_type, document count)`, sorted by file type.
    pub by_file_type: Vec<(String, usize)>,
}

impl Storage {
    /// Open or create a database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TrainforgeError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;

        let conn = db.connect().map_err(storage_err)?;

        let storage = Self { db, conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open `<dir>/trainforge.db`.
    pub async fn open_dir(dir: &Path) -> Result<Self> {
        Self::open(&dir.join(DB_FILE_NAME)).await
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    TrainforgeError::Storage(format!(
                        "migration v{} failed: {e}",
                        migration.version
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Document operations
    // -----------------------------------------------------------------------

    /// Insert a document with its chunks, replacing any earlier copy.
    #[instrument(skip_all, fields(document_id = %doc.id, chunks = chunks.len()))]
    pub async fn upsert_document(&self, doc: &StoredDocument, chunks: &[DocumentChunk]) -> Result<()> {
        let tx = self.conn.transaction().await.map_err(storage_err)?;

        tx.execute(
            "DELETE FROM chunks WHERE document_id = ?1",
            params![doc.id.as_str()],
        )
        .await
        .map_err(storage_err)?;

        tx.execute(
            "INSERT INTO documents (id, filename, file_type, file_size, content_length, content_hash, chunk_count, ingested_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
               filename = excluded.filename,
               file_type = excluded.file_type,
               file_size = excluded.file_size,
               content_length = excluded.content_length,
               content_hash = excluded.content_hash,
               chunk_count = excluded.chunk_count,
               ingested_at = excluded.ingested_at",
            params![
                doc.id.as_str(),
                doc.filename.as_str(),
                doc.file_type.as_str(),
                doc.file_size as i64,
                doc.content_length as i64,
                doc.content_hash.as_str(),
                doc.chunk_count as i64,
                doc.ingested_at.to_rfc3339(),
            ],
        )
        .await
        .map_err(storage_err)?;

        for chunk in chunks {
            let chunk_id = format!("{}_chunk_{}", doc.id, chunk.index);
            tx.execute(
                "INSERT INTO chunks (id, document_id, chunk_index, text, length)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    chunk_id.as_str(),
                    doc.id.as_str(),
                    chunk.index as i64,
                    chunk.text.as_str(),
                    chunk.length as i64,
                ],
            )
            .await
            .map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)?;
        debug!("document stored");
        Ok(())
    }

    /// Get a document by ID.
    pub async fn get_document(&self, id: &DocumentId) -> Result<Option<StoredDocument>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, filename, file_type, file_size, content_length, content_hash, chunk_count, ingested_at
                 FROM documents WHERE id = ?1",
                params![id.as_str()],
            )
            .await
            .map_err(storage_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_document(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    /// List all documents, ordered by filename.
    pub async fn list_documents(&self) -> Result<Vec<StoredDocument>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, filename, file_type, file_size, content_length, content_hash, chunk_count, ingested_at
                 FROM documents ORDER BY filename",
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_document(&row)?);
        }
        Ok(results)
    }

    /// Delete a document and its chunks. Returns whether it existed.
    pub async fn delete_document(&self, id: &DocumentId) -> Result<bool> {
        let tx = self.conn.transaction().await.map_err(storage_err)?;
        tx.execute(
            "DELETE FROM chunks WHERE document_id = ?1",
            params![id.as_str()],
        )
        .await
        .map_err(storage_err)?;
        let removed = tx
            .execute("DELETE FROM documents WHERE id = ?1", params![id.as_str()])
            .await
            .map_err(storage_err)?;
        tx.commit().await.map_err(storage_err)?;
        Ok(removed > 0)
    }

    /// Chunk texts of one document, in chunk order.
    pub async fn document_chunks(&self, id: &DocumentId) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT text FROM chunks WHERE document_id = ?1 ORDER BY chunk_index",
                params![id.as_str()],
            )
            .await
            .map_err(storage_err)?;

        let mut texts = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            texts.push(row.get::<String>(0).map_err(storage_err)?);
        }
        Ok(texts)
    }

    /// Document and chunk counts, with a per-file-type breakdown.
    pub async fn stats(&self) -> Result<StoreStats> {
        let documents = self.count("SELECT COUNT(*) FROM documents").await?;
        let chunks = self.count("SELECT COUNT(*) FROM chunks").await?;

        let mut rows = self
            .conn
            .query(
                "SELECT file_type, COUNT(*) FROM documents GROUP BY file_type ORDER BY file_type",
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut by_file_type = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let file_type: String = row.get(0).map_err(storage_err)?;
            let count: i64 = row.get(1).map_err(storage_err)?;
            by_file_type.push((file_type, count as usize));
        }

        Ok(StoreStats {
            documents,
            chunks,
            by_file_type,
        })
    }

    async fn count(&self, sql: &str) -> Result<usize> {
        let mut rows = self.conn.query(sql, params![]).await.map_err(storage_err)?;
        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<i64>(0).map_err(storage_err)? as usize),
            Ok(None) => Ok(0),
            Err(e) => Err(storage_err(e)),
        }
    }

    // -----------------------------------------------------------------------
    // Retrieval
    // -----------------------------------------------------------------------

    /// Find the chunks best matching `query`.
    ///
    /// FTS5 picks up to `limit` candidates containing any query term; each
    /// hit's similarity is the fraction of distinct query terms it contains.
    /// Hits come back by descending similarity, FTS rank breaking ties.
    #[instrument(skip(self))]
    pub async fn search_chunks(&self, query: &str, limit: u32) -> Result<Vec<ChunkHit>> {
        let terms = query_terms(query);
        if terms.is_empty() {
            debug!("query has no searchable terms");
            return Ok(Vec::new());
        }

        let fts_query = terms
            .iter()
            .map(|t| format!("\"{t}\""))
            .collect::<Vec<_>>()
            .join(" OR ");

        let mut rows = self
            .conn
            .query(
                "SELECT c.id, c.document_id, c.chunk_index, c.text, d.filename, d.file_type
                 FROM chunks_fts f
                 JOIN chunks c ON c.rowid = f.rowid
                 JOIN documents d ON d.id = c.document_id
                 WHERE chunks_fts MATCH ?1
                 ORDER BY rank
                 LIMIT ?2",
                params![fts_query.as_str(), limit],
            )
            .await
            .map_err(storage_err)?;

        let mut hits = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let text: String = row.get(3).map_err(storage_err)?;
            let similarity = term_coverage(&terms, &text);
            hits.push(ChunkHit {
                document_id: DocumentId(row.get::<String>(1).map_err(storage_err)?),
                filename: row.get(4).map_err(storage_err)?,
                file_type: row.get(5).map_err(storage_err)?,
                chunk: RetrievedChunk {
                    chunk_id: row.get(0).map_err(storage_err)?,
                    index: row.get::<i64>(2).map_err(storage_err)? as usize,
                    text,
                    similarity,
                },
            });
        }

        hits.sort_by(|a, b| b.chunk.similarity.total_cmp(&a.chunk.similarity));
        debug!(hits = hits.len(), "chunk search complete");
        Ok(hits)
    }
}

/// Distinct lower-cased query words longer than two characters, minus stop words.
pub fn query_terms(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    let mut seen = HashSet::new();
    TERM_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| t.chars().count() > 2 && !QUERY_STOP_WORDS.contains(t))
        .filter(|t| seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}

/// Fraction of `terms` that occur as words in `text`, in `[0, 1]`.
pub fn term_coverage(terms: &[String], text: &str) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    let lowered = text.to_lowercase();
    let words: HashSet<&str> = TERM_RE.find_iter(&lowered).map(|m| m.as_str()).collect();
    let matched = terms.iter().filter(|t| words.contains(t.as_str())).count();
    matched as f64 / terms.len() as f64
}

/// Convert a database row to a [`StoredDocument`].
fn row_to_document(row: &libsql::Row) -> Result<StoredDocument> {
    Ok(StoredDocument {
        id: DocumentId(row.get::<String>(0).map_err(storage_err)?),
        filename: row.get::<String>(1).map_err(storage_err)?,
        file_type: row.get::<String>(2).map_err(storage_err)?,
        file_size: row.get::<i64>(3).map_err(storage_err)? as usize,
        content_length: row.get::<i64>(4).map_err(storage_err)? as usize,
        content_hash: row.get::<String>(5).map_err(storage_err)?,
        chunk_count: row.get::<i64>(6).map_err(storage_err)? as usize,
        ingested_at: {
            let s: String = row.get(7).map_err(storage_err)?;
            chrono::DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .map_err(|e| TrainforgeError::Storage(format!("invalid date: {e}")))?
        },
    })
}
