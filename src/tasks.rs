use crate::error::TaskError;
use std::fmt;

pub const MAX_TASKS: usize = 5;
pub const MAX_TASK_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
}

/// Insertion-ordered task list capped at [`MAX_TASKS`] entries.
#[derive(Debug, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    next_id: u64,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, text: &str) -> Result<TaskId, TaskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::Empty);
        }
        let len = text.chars().count();
        if len > MAX_TASK_CHARS {
            return Err(TaskError::TooLong {
                len,
                max: MAX_TASK_CHARS,
            });
        }
        if self.tasks.len() >= MAX_TASKS {
            return Err(TaskError::ListFull { max: MAX_TASKS });
        }

        // Ids are never reused, even after removals.
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.tasks.push(Task {
            id,
            text: text.into(),
            completed: false,
        });
        Ok(id)
    }

    /// Returns false when no task has this id.
    pub fn toggle(&mut self, id: TaskId) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    /// Returns false when no task has this id.
    pub fn remove(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tasks.len() >= MAX_TASKS
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn remaining_count(&self) -> usize {
        self.tasks.len() - self.completed_count()
    }

    pub fn to_vec(&self) -> Vec<Task> {
        self.tasks.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_trims_and_starts_incomplete() {
        let mut list = TaskList::new();
        let id = list.add("  buy milk ").unwrap();
        assert_eq!(list.len(), 1);
        let task = list.get(0).unwrap();
        assert_eq!(task.id, id);
        assert_eq!(task.text, "buy milk");
        assert!(!task.completed);
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let mut list = TaskList::new();
        assert_eq!(list.add(""), Err(TaskError::Empty));
        assert_eq!(list.add("   "), Err(TaskError::Empty));
        assert!(list.is_empty());
    }

    #[test]
    fn test_sixth_task_is_rejected() {
        let mut list = TaskList::new();
        for i in 0..MAX_TASKS {
            list.add(&format!("task {}", i)).unwrap();
        }
        assert!(list.is_full());
        assert_eq!(list.add("one more"), Err(TaskError::ListFull { max: 5 }));
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn test_text_length_limit_counts_chars() {
        let mut list = TaskList::new();
        assert!(list.add(&"é".repeat(MAX_TASK_CHARS)).is_ok());
        assert_eq!(
            list.add(&"x".repeat(MAX_TASK_CHARS + 1)),
            Err(TaskError::TooLong { len: 51, max: 50 })
        );
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_toggle_and_counts() {
        let mut list = TaskList::new();
        let a = list.add("write report").unwrap();
        list.add("review PR").unwrap();
        assert!(list.toggle(a));
        assert_eq!(list.completed_count(), 1);
        assert_eq!(list.remaining_count(), 1);
        assert!(list.toggle(a));
        assert_eq!(list.completed_count(), 0);
    }

    #[test]
    fn test_missing_id_is_noop() {
        let mut list = TaskList::new();
        let a = list.add("a").unwrap();
        assert!(list.remove(a));
        assert!(!list.remove(a));
        assert!(!list.toggle(a));
        assert!(list.is_empty());
    }

    #[test]
    fn test_ids_unique_after_removal() {
        let mut list = TaskList::new();
        let a = list.add("a").unwrap();
        list.remove(a);
        let b = list.add("b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_insertion_order() {
        let mut list = TaskList::new();
        for text in ["one", "two", "three"] {
            list.add(text).unwrap();
        }
        let second = list.get(1).unwrap().id;
        list.remove(second);
        let texts: Vec<_> = list.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["one", "three"]);
    }
}
