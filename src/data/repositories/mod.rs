pub mod memory;
pub mod sqlite;
pub mod traits;
pub mod vocabulary;

pub use memory::{CallCounts, MemoryUnitOfWork};
pub use sqlite::SqliteUnitOfWork;
pub use traits::{RepetitionRepository, UnitOfWork, VocabularyListRepository};
pub use vocabulary::VocabularyRepository;
