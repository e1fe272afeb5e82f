//! Answer validation for quiz questions.
//!
//! Choice and true/false questions compare the picked index. Sort questions
//! compare the placed word order against the expected order, optionally
//! accepting swaps inside "flexible" groups.
//!
//! Validation never fails: anything malformed is simply an incorrect answer.

use super::question::{Question, QuestionKind};

// ============================================================================
// Submissions
// ============================================================================

/// What the learner submitted for a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
  /// Index of the picked choice
  Choice(usize),
  /// Original word indices in the order they were placed
  Order(Vec<usize>),
}

/// Decide whether `submission` answers `question` correctly.
pub fn validate(question: &Question, submission: &Submission) -> bool {
  match (&question.kind, submission) {
    (QuestionKind::Choice { correct, .. }, Submission::Choice(picked))
    | (QuestionKind::TrueFalse { correct, .. }, Submission::Choice(picked)) => {
      validate_choice(*correct, *picked)
    }
    (
      QuestionKind::Sort {
        correct_order,
        flexible_order,
        ..
      },
      Submission::Order(order),
    ) => validate_order(order, correct_order, flexible_order),
    _ => false,
  }
}

/// Exact-index check. An out-of-range pick can never equal the answer index
/// of a well-formed question, so it is simply incorrect.
pub fn validate_choice(correct: usize, picked: usize) -> bool {
  picked == correct
}

/// Compare a submitted order against the expected one, then against the
/// variants permitted by `flexible_order`.
pub fn validate_order(submitted: &[usize], correct_order: &[usize], flexible_order: &[Vec<usize>]) -> bool {
  if submitted == correct_order {
    return true;
  }
  if flexible_order.is_empty() || submitted.len() != correct_order.len() {
    return false;
  }
  if flexible_order_count(correct_order, flexible_order) > MAX_FLEXIBLE_ORDERS {
    tracing::warn!("Too many flexible order variants, accepting only the exact order");
    return false;
  }

  flexible_orders(correct_order, flexible_order)
    .iter()
    .any(|order| order.as_slice() == submitted)
}

// ============================================================================
// Flexible order variants
// ============================================================================

/// Upper bound on accepted orders per sort question. Each group multiplies
/// the variant count, so lessons exceeding this are rejected at load time.
pub const MAX_FLEXIBLE_ORDERS: usize = 1024;

/// Number of orders `flexible_orders` would produce, without building them.
///
/// A group with `k` located positions multiplies the count by `1 + k(k-1)/2`.
pub fn flexible_order_count(correct_order: &[usize], flexible_order: &[Vec<usize>]) -> usize {
  flexible_order.iter().fold(1usize, |count, group| {
    let k = locate_positions(correct_order, group).len();
    if k < 2 {
      return count;
    }
    count.saturating_mul(1 + k * (k - 1) / 2)
  })
}

/// Generate every accepted order for a sort question.
///
/// Starts from `correct_order`; for each group, every variant accumulated so
/// far is copied once per pair of the group's positions with that pair
/// swapped. New variants are appended after the group is processed, so each
/// group is applied once to each existing variant.
///
/// Group members not present in `correct_order` are ignored, and a group with
/// fewer than two located positions contributes nothing.
pub fn flexible_orders(correct_order: &[usize], flexible_order: &[Vec<usize>]) -> Vec<Vec<usize>> {
  let mut valid_orders = vec![correct_order.to_vec()];

  for group in flexible_order {
    if group.len() < 2 {
      continue;
    }

    let positions = locate_positions(correct_order, group);
    if positions.len() < 2 {
      continue;
    }

    let mut new_orders = Vec::new();
    for order in &valid_orders {
      for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
          let mut swapped = order.clone();
          swapped.swap(positions[i], positions[j]);
          new_orders.push(swapped);
        }
      }
    }
    valid_orders.extend(new_orders);
  }

  valid_orders
}

/// Positions in `correct_order` holding each group member, skipping absent members.
fn locate_positions(correct_order: &[usize], group: &[usize]) -> Vec<usize> {
  group
    .iter()
    .filter_map(|member| correct_order.iter().position(|idx| idx == member))
    .collect()
}

// ============================================================================
// Tests
// ============================================================================
