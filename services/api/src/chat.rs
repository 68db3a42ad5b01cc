//! services/api/src/chat.rs
//!
//! The chat pipeline: the one place that wires ingestion, embedding, the
//! vector index, the answer model, and the history log together.
//!
//! A user moves through three states. Anonymous callers never reach this
//! module (the auth middleware rejects them). An authenticated user starts
//! untrained; a successful `train` builds an index and moves them to
//! trained; `ask` only works in the trained state. Logout (`reset`) and a
//! process restart both discard the index; it is memory-only by design.

use bytes::Bytes;
use docuchat_core::domain::QueryRecord;
use docuchat_core::index::VectorIndex;
use docuchat_core::ports::{
    AnswerService, CoreError, CoreResult, DatabaseService, EmbeddingService,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::ingest;

/// How many segments are retrieved as context for each question.
pub const RETRIEVAL_TOP_K: usize = 4;

/// A file received from the upload endpoint, still in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Summary of a successful train call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainReport {
    pub files: usize,
    pub segments: usize,
}

/// The index built by the last successful train, plus the names of the
/// files it was built from.
struct TrainedIndex {
    index: VectorIndex,
    filenames: Vec<String>,
}

/// Orchestrates the document-to-answer pipeline.
///
/// The vector index is owned here rather than living as process-global
/// state, so tests can run independent pipelines side by side. Within one
/// pipeline the index is guarded by an async mutex: concurrent trains are
/// last-writer-wins, which is acceptable for the intended
/// one-user-per-deployment model.
#[derive(Clone)]
pub struct ChatPipeline {
    db: Arc<dyn DatabaseService>,
    embedder: Arc<dyn EmbeddingService>,
    answerer: Arc<dyn AnswerService>,
    trained: Arc<Mutex<Option<TrainedIndex>>>,
}

impl ChatPipeline {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        embedder: Arc<dyn EmbeddingService>,
        answerer: Arc<dyn AnswerService>,
    ) -> Self {
        Self {
            db,
            embedder,
            answerer,
            trained: Arc::new(Mutex::new(None)),
        }
    }

    /// Ingests the uploaded files, embeds their segments, and builds a new
    /// index. The new index replaces the previous one only once it is fully
    /// built; any failure leaves the prior state untouched.
    pub async fn train(&self, files: &[UploadedFile]) -> CoreResult<TrainReport> {
        if files.is_empty() {
            return Err(CoreError::Extraction(
                "no files were uploaded".to_string(),
            ));
        }

        let mut segments = Vec::new();
        let mut filenames = Vec::with_capacity(files.len());
        for file in files {
            segments.extend(ingest::extract(&file.filename, &file.bytes)?);
            filenames.push(file.filename.clone());
        }

        let texts: Vec<String> = segments.iter().map(|s| s.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != segments.len() {
            return Err(CoreError::Upstream(format!(
                "expected {} embeddings, got {}",
                segments.len(),
                vectors.len()
            )));
        }

        let mut index = VectorIndex::new();
        for (vector, segment) in vectors.into_iter().zip(segments) {
            index.insert(vector, segment);
        }

        let report = TrainReport {
            files: filenames.len(),
            segments: index.len(),
        };
        info!(
            files = report.files,
            segments = report.segments,
            "trained new document index"
        );

        *self.trained.lock().await = Some(TrainedIndex { index, filenames });
        Ok(report)
    }

    /// Answers a question from the trained documents and appends one
    /// history record for the calling user.
    ///
    /// Fails with `NoIndex` when nothing has been trained in this process
    /// lifetime; nothing is logged in that case.
    pub async fn ask(&self, user_id: Uuid, question: &str) -> CoreResult<String> {
        let context = {
            let guard = self.trained.lock().await;
            let trained = guard.as_ref().ok_or(CoreError::NoIndex)?;

            let question_vectors = self.embedder.embed(&[question.to_string()]).await?;
            let question_vector = question_vectors.into_iter().next().ok_or_else(|| {
                CoreError::Upstream("embeddings API returned no vector for the question".to_string())
            })?;

            trained
                .index
                .search(&question_vector, RETRIEVAL_TOP_K)
                .iter()
                .map(|s| format!("[{}] {}", s.source_filename, s.text))
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        let answer = self.answerer.answer(question, &context).await?;
        self.db.append_query(user_id, question, &answer).await?;
        Ok(answer)
    }

    /// Returns the user's question/answer history, most recent first.
    pub async fn history(&self, user_id: Uuid) -> CoreResult<Vec<QueryRecord>> {
        self.db.list_queries(user_id).await
    }

    /// Names of the files behind the current index, in upload order.
    pub async fn trained_filenames(&self) -> Vec<String> {
        self.trained
            .lock()
            .await
            .as_ref()
            .map(|t| t.filenames.clone())
            .unwrap_or_default()
    }

    /// Discards the in-memory index. Called on logout; the history in the
    /// database is unaffected.
    pub async fn reset(&self) {
        *self.trained.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use docuchat_core::domain::{User, UserCredentials};
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct FakeDb {
        queries: StdMutex<HashMap<Uuid, Vec<QueryRecord>>>,
    }

    #[async_trait]
    impl DatabaseService for FakeDb {
        async fn create_user(&self, _u: &str, _h: &str) -> CoreResult<User> {
            unimplemented!("not used by pipeline tests")
        }

        async fn get_user_by_username(&self, _u: &str) -> CoreResult<UserCredentials> {
            unimplemented!("not used by pipeline tests")
        }

        async fn create_auth_session(
            &self,
            _s: &str,
            _u: Uuid,
            _e: DateTime<Utc>,
        ) -> CoreResult<()> {
            Ok(())
        }

        async fn validate_auth_session(&self, _s: &str) -> CoreResult<Uuid> {
            Err(CoreError::InvalidCredentials)
        }

        async fn delete_auth_session(&self, _s: &str) -> CoreResult<()> {
            Ok(())
        }

        async fn append_query(
            &self,
            user_id: Uuid,
            question: &str,
            answer: &str,
        ) -> CoreResult<QueryRecord> {
            let record = QueryRecord {
                id: Uuid::new_v4(),
                user_id,
                question: question.to_string(),
                answer: answer.to_string(),
                created_at: Utc::now(),
            };
            self.queries
                .lock()
                .unwrap()
                .entry(user_id)
                .or_default()
                .insert(0, record.clone());
            Ok(record)
        }

        async fn list_queries(&self, user_id: Uuid) -> CoreResult<Vec<QueryRecord>> {
            Ok(self
                .queries
                .lock()
                .unwrap()
                .get(&user_id)
                .cloned()
                .unwrap_or_default())
        }
    }

    /// Deterministic embedder: letter-frequency vectors, so lexically
    /// similar texts really are cosine-close.
    struct FakeEmbedder;

    #[async_trait]
    impl EmbeddingService for FakeEmbedder {
        async fn embed(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    let mut v = vec![0.0f32; 26];
                    for c in text.to_lowercase().chars() {
                        if c.is_ascii_lowercase() {
                            v[(c as u8 - b'a') as usize] += 1.0;
                        }
                    }
                    v
                })
                .collect())
        }
    }

    /// Echoes the retrieved context so tests can see what was retrieved.
    struct FakeAnswerer;

    #[async_trait]
    impl AnswerService for FakeAnswerer {
        async fn answer(&self, question: &str, context: &str) -> CoreResult<String> {
            Ok(format!("Q: {question} | CONTEXT: {context}"))
        }
    }

    fn pipeline() -> ChatPipeline {
        ChatPipeline::new(
            Arc::new(FakeDb::default()),
            Arc::new(FakeEmbedder),
            Arc::new(FakeAnswerer),
        )
    }

    fn csv_file(name: &str, contents: &str) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            bytes: Bytes::copy_from_slice(contents.as_bytes()),
        }
    }

    #[tokio::test]
    async fn ask_before_train_fails_and_logs_nothing() {
        let pipeline = pipeline();
        let user = Uuid::new_v4();

        let err = pipeline.ask(user, "anything?").await.unwrap_err();
        assert!(matches!(err, CoreError::NoIndex));
        assert!(pipeline.history(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn train_then_ask_appends_exactly_one_record() {
        let pipeline = pipeline();
        let user = Uuid::new_v4();

        pipeline
            .train(&[csv_file("people.csv", "name,role\nalice,admin\nbob,builder\n")])
            .await
            .unwrap();

        let answer = pipeline.ask(user, "who is alice?").await.unwrap();
        assert!(!answer.is_empty());

        let history = pipeline.history(user).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].question, "who is alice?");
        assert_eq!(history[0].answer, answer);
    }

    #[tokio::test]
    async fn retrieval_feeds_relevant_segments_to_the_answerer() {
        let pipeline = pipeline();
        pipeline
            .train(&[csv_file("people.csv", "alice alice alice\nzzzz zzzz zzzz\n")])
            .await
            .unwrap();

        let answer = pipeline.ask(Uuid::new_v4(), "alice alice").await.unwrap();
        assert!(answer.contains("alice"));
    }

    #[tokio::test]
    async fn history_is_isolated_per_user() {
        let pipeline = pipeline();
        let user_x = Uuid::new_v4();
        let user_y = Uuid::new_v4();

        pipeline
            .train(&[csv_file("doc.csv", "some,content\n")])
            .await
            .unwrap();
        pipeline.ask(user_x, "a question").await.unwrap();

        assert_eq!(pipeline.history(user_x).await.unwrap().len(), 1);
        assert!(pipeline.history(user_y).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn trained_filenames_lists_exactly_the_trained_files() {
        let pipeline = pipeline();
        pipeline
            .train(&[
                csv_file("A.csv", "a,b\n1,2\n"),
                csv_file("B.csv", "c,d\n3,4\n"),
            ])
            .await
            .unwrap();

        let names = pipeline.trained_filenames().await;
        assert_eq!(names, vec!["A.csv".to_string(), "B.csv".to_string()]);
    }

    #[tokio::test]
    async fn empty_file_list_fails_without_changing_state() {
        let pipeline = pipeline();
        let err = pipeline.train(&[]).await.unwrap_err();
        assert!(matches!(err, CoreError::Extraction(_)));
        assert!(pipeline.trained_filenames().await.is_empty());
    }

    #[tokio::test]
    async fn failed_retrain_keeps_the_previous_index() {
        let pipeline = pipeline();
        pipeline
            .train(&[csv_file("good.csv", "x,y\n1,2\n")])
            .await
            .unwrap();

        let err = pipeline
            .train(&[UploadedFile {
                filename: "slides.pptx".to_string(),
                bytes: Bytes::from_static(b"nope"),
            }])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedFormat(_)));

        // Previous training still answers.
        assert_eq!(pipeline.trained_filenames().await, vec!["good.csv".to_string()]);
        pipeline.ask(Uuid::new_v4(), "x?").await.unwrap();
    }

    #[tokio::test]
    async fn retrain_replaces_the_index_entirely() {
        let pipeline = pipeline();
        pipeline
            .train(&[csv_file("first.csv", "a,b\n")])
            .await
            .unwrap();
        pipeline
            .train(&[csv_file("second.csv", "c,d\n")])
            .await
            .unwrap();

        assert_eq!(pipeline.trained_filenames().await, vec!["second.csv".to_string()]);
    }

    #[tokio::test]
    async fn reset_discards_the_index_but_not_the_history() {
        let pipeline = pipeline();
        let user = Uuid::new_v4();

        pipeline
            .train(&[csv_file("doc.csv", "k,v\n")])
            .await
            .unwrap();
        pipeline.ask(user, "q").await.unwrap();

        pipeline.reset().await;

        let err = pipeline.ask(user, "again?").await.unwrap_err();
        assert!(matches!(err, CoreError::NoIndex));
        assert!(pipeline.trained_filenames().await.is_empty());
        // History survives the reset.
        assert_eq!(pipeline.history(user).await.unwrap().len(), 1);
    }
}
