use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Exam, ExamStore, Task};

/// Process-local exam store. Everything is lost on exit.
pub struct InMemoryRoster {
    exams: RwLock<Vec<Exam>>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self {
            exams: RwLock::new(Vec::new()),
        }
    }

    /// A roster pre-populated with the two sample exams.
    pub fn seeded() -> Self {
        let exams = vec![
            Exam {
                id: "1".to_string(),
                name: "Midterm Exam".to_string(),
                description: "Mathematics Midterm Exam for Grade 10".to_string(),
                tasks: vec![
                    Task {
                        id: "1".to_string(),
                        name: "Question 1".to_string(),
                        criteria: "Show all work and explain your reasoning clearly.".to_string(),
                    },
                    Task {
                        id: "2".to_string(),
                        name: "Question 2".to_string(),
                        criteria: "Correctly apply the Pythagorean theorem.".to_string(),
                    },
                ],
            },
            Exam {
                id: "2".to_string(),
                name: "Final Exam".to_string(),
                description: "Science Final Exam for Grade 12".to_string(),
                tasks: vec![
                    Task {
                        id: "3".to_string(),
                        name: "Part 1".to_string(),
                        criteria: "Clearly explain the concept of thermodynamics.".to_string(),
                    },
                    Task {
                        id: "4".to_string(),
                        name: "Part 2".to_string(),
                        criteria: "Provide accurate examples of chemical reactions.".to_string(),
                    },
                ],
            },
        ];
        Self {
            exams: RwLock::new(exams),
        }
    }
}

impl Default for InMemoryRoster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExamStore for InMemoryRoster {
    async fn list(&self) -> Result<Vec<Exam>> {
        Ok(self.exams.read().await.clone())
    }

    async fn get(&self, exam_id: &str) -> Result<Option<Exam>> {
        Ok(self
            .exams
            .read()
            .await
            .iter()
            .find(|e| e.id == exam_id)
            .cloned())
    }

    async fn create_exam(&self, exam: Exam) -> Result<()> {
        let mut exams = self.exams.write().await;
        if exams.iter().any(|e| e.id == exam.id) {
            bail!("exam id already exists: {}", exam.id);
        }
        exams.push(exam);
        Ok(())
    }

    async fn add_task(&self, exam_id: &str, task: Task) -> Result<()> {
        let mut exams = self.exams.write().await;
        match exams.iter_mut().find(|e| e.id == exam_id) {
            Some(exam) => {
                exam.tasks.push(task);
                Ok(())
            }
            None => bail!("unknown exam: {exam_id}"),
        }
    }
}
