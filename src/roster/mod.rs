pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use rand::RngExt;
use serde::{Deserialize, Serialize};

/// A single gradable unit with criteria text. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub criteria: String,
}

impl Task {
    pub fn new(name: &str, criteria: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            criteria: criteria.to_string(),
        }
    }
}

/// A named collection of grading tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tasks: Vec<Task>,
}

impl Exam {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            description: description.to_string(),
            tasks: Vec::new(),
        }
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }
}

/// Where exams live. The shipped implementation is process memory only;
/// callers go through this trait so a real store can back it later.
#[async_trait]
pub trait ExamStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Exam>>;
    async fn get(&self, exam_id: &str) -> Result<Option<Exam>>;
    async fn create_exam(&self, exam: Exam) -> Result<()>;
    /// Append a task to an existing exam. Fails if the exam is unknown.
    async fn add_task(&self, exam_id: &str, task: Task) -> Result<()>;
}

/// Opaque random identifier, 16 hex chars.
pub fn new_id() -> String {
    format!("{:016x}", rand::rng().random::<u64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_id_is_16_hex_chars() {
        let id = new_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn new_ids_differ() {
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn exam_starts_with_no_tasks() {
        let exam = Exam::new("Midterm", "Grade 10 mathematics");
        assert!(exam.tasks.is_empty());
        assert_eq!(exam.name, "Midterm");
    }

    #[test]
    fn exam_task_lookup() {
        let mut exam = Exam::new("Midterm", "Grade 10 mathematics");
        let task = Task::new("Q1", "Show all work.");
        let task_id = task.id.clone();
        exam.tasks.push(task);

        assert_eq!(exam.task(&task_id).unwrap().name, "Q1");
        assert!(exam.task("missing").is_none());
    }
}
