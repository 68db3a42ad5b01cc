pub mod answer_llm;
pub mod db;
pub mod embedder;

pub use answer_llm::OpenAiAnswerAdapter;
pub use db::DbAdapter;
pub use embedder::OpenAiEmbeddingAdapter;
