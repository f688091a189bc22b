// src/validation/order.rs

use crate::model::Position;
use std::collections::HashSet;

/// Why a proposed visiting order was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderValidationError {
    NoCoordinates,
    UnknownTask(Position),
    Duplicate(Position),
    Missing(Position),
    LengthMismatch { expected: usize, actual: usize },
}

impl OrderValidationError {
    pub fn hint(&self) -> String {
        match self {
            OrderValidationError::NoCoordinates => {
                "Response contained no (row,col) pairs.".to_string()
            }
            OrderValidationError::UnknownTask(pos) => {
                format!("{pos} is not one of the task cells.")
            }
            OrderValidationError::Duplicate(pos) => format!("{pos} appears more than once."),
            OrderValidationError::Missing(pos) => format!("{pos} is never visited."),
            OrderValidationError::LengthMismatch { expected, actual } => {
                format!("Expected {expected} tasks in the order, got {actual}.")
            }
        }
    }
}

/// Checks that `order` is a permutation of `tasks`. An empty result means
/// the order is acceptable.
pub fn validate_order(order: &[Position], tasks: &[Position]) -> Vec<OrderValidationError> {
    let mut errors = Vec::new();
    let task_set: HashSet<Position> = tasks.iter().copied().collect();
    let mut seen = HashSet::new();

    for &pos in order {
        if !task_set.contains(&pos) {
            errors.push(OrderValidationError::UnknownTask(pos));
        } else if !seen.insert(pos) {
            errors.push(OrderValidationError::Duplicate(pos));
        }
    }

    for &task in tasks {
        if !seen.contains(&task) {
            errors.push(OrderValidationError::Missing(task));
        }
    }

    if order.len() != task_set.len() {
        errors.push(OrderValidationError::LengthMismatch {
            expected: task_set.len(),
            actual: order.len(),
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn permutation_is_valid() {
        let tasks = [p(1, 2), p(3, 4), p(0, 0)];
        assert!(validate_order(&[p(0, 0), p(3, 4), p(1, 2)], &tasks).is_empty());
    }

    #[test]
    fn duplicates_and_strangers_are_reported() {
        let tasks = [p(1, 2), p(3, 4)];
        let errors = validate_order(&[p(1, 2), p(1, 2), p(9, 9)], &tasks);
        assert!(errors.contains(&OrderValidationError::Duplicate(p(1, 2))));
        assert!(errors.contains(&OrderValidationError::UnknownTask(p(9, 9))));
        assert!(errors.contains(&OrderValidationError::Missing(p(3, 4))));
        assert!(errors.contains(&OrderValidationError::LengthMismatch {
            expected: 2,
            actual: 3
        }));
    }

    #[test]
    fn hints_name_the_cell() {
        assert_eq!(
            OrderValidationError::Missing(p(2, 5)).hint(),
            "(2,5) is never visited."
        );
    }
}
