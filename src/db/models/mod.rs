pub mod class;
pub mod study_session;
pub mod task;
pub mod task_type;

pub use class::Class;
pub use study_session::{StudyMode, StudySession, StudySessionStatus};
pub use task::{SchedulingMode, Task};
pub use task_type::{ColorToken, TaskType};
