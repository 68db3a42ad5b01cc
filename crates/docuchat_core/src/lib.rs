pub mod chunk;
pub mod domain;
pub mod index;
pub mod ports;

pub use chunk::{chunk_text, MAX_SEGMENT_CHARS};
pub use domain::{AuthSession, QueryRecord, Segment, User, UserCredentials};
pub use index::VectorIndex;
pub use ports::{AnswerService, CoreError, CoreResult, DatabaseService, EmbeddingService};
