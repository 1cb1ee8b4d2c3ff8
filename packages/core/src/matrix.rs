//! Live pairwise "seen together" counts across all judges.
//!
//! `M[i][j]` is the number of judges whose seen projects include both project
//! `i` and project `j`. The matrix is symmetric with a zero diagonal. All public
//! operations take the single internal lock for their whole duration.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::types::{Judge, Project, ProjectId};

#[derive(Debug, Default)]
struct Inner {
    arr: Vec<Vec<u32>>,
    /// Row/column index -> project id.
    ids: Vec<ProjectId>,
    /// Project id -> row/column index.
    index: HashMap<ProjectId, usize>,
}

impl Inner {
    fn push(&mut self, id: ProjectId) {
        if self.index.contains_key(&id) {
            return;
        }
        for row in &mut self.arr {
            row.push(0);
        }
        self.arr.push(vec![0; self.ids.len() + 1]);
        self.index.insert(id, self.ids.len());
        self.ids.push(id);
    }

    fn bump(&mut self, a: ProjectId, b: ProjectId) {
        if a == b {
            return;
        }
        let (Some(&i), Some(&j)) = (self.index.get(&a), self.index.get(&b)) else {
            return;
        };
        self.arr[i][j] += 1;
        self.arr[j][i] += 1;
    }

    fn unbump(&mut self, a: ProjectId, b: ProjectId) {
        if a == b {
            return;
        }
        let (Some(&i), Some(&j)) = (self.index.get(&a), self.index.get(&b)) else {
            return;
        };
        self.arr[i][j] = self.arr[i][j].saturating_sub(1);
        self.arr[j][i] = self.arr[j][i].saturating_sub(1);
    }

    fn overlap(&self, candidate: ProjectId, seen: &[ProjectId]) -> u64 {
        let Some(&i) = self.index.get(&candidate) else {
            return 0;
        };
        seen.iter()
            .filter_map(|p| self.index.get(p))
            .map(|&j| u64::from(self.arr[i][j]))
            .sum()
    }
}

/// Serializable copy of the matrix taken under the lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct MatrixSnapshot {
    pub project_ids: Vec<ProjectId>,
    pub counts: Vec<Vec<u32>>,
}

#[derive(Debug, Default)]
pub struct ComparisonMatrix {
    inner: Mutex<Inner>,
}

impl ComparisonMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rebuild from scratch: one index per project in the given order, then one
    /// increment per unordered pair in each judge's seen projects.
    pub fn load(&self, projects: &[Project], judges: &[Judge]) {
        let mut inner = Inner::default();
        for p in projects {
            inner.push(p.id);
        }
        for judge in judges {
            let seen = judge.seen_ids();
            for (k, &a) in seen.iter().enumerate() {
                for &b in &seen[k + 1..] {
                    inner.bump(a, b);
                }
            }
        }
        *self.lock() = inner;
    }

    /// Append a zeroed row and column for a new project.
    pub fn add(&self, id: ProjectId) {
        self.lock().push(id);
    }

    /// Drop the row and column of `id`. Returns false if the project was unknown.
    pub fn remove(&self, id: ProjectId) -> bool {
        let mut inner = self.lock();
        let Some(idx) = inner.index.remove(&id) else {
            return false;
        };
        inner.arr.remove(idx);
        for row in &mut inner.arr {
            row.remove(idx);
        }
        inner.ids.remove(idx);
        for (pos, pid) in inner.ids.clone().into_iter().enumerate().skip(idx) {
            inner.index.insert(pid, pos);
        }
        true
    }

    /// Account for a judge completing `new` after having seen `seen_prev`.
    pub fn record(&self, seen_prev: &[ProjectId], new: ProjectId) {
        let mut inner = self.lock();
        for &p in seen_prev {
            inner.bump(p, new);
        }
    }

    /// Withdraw every pair contributed by a judge who saw `seen`, e.g. when the
    /// judge is deleted.
    pub fn forget(&self, seen: &[ProjectId]) {
        let mut inner = self.lock();
        for (k, &a) in seen.iter().enumerate() {
            for &b in &seen[k + 1..] {
                inner.unbump(a, b);
            }
        }
    }

    /// Candidate whose summed overlap with `seen_prev` is smallest.
    ///
    /// Ties go to the earliest candidate, so callers that want random tie-breaks
    /// shuffle first. Returns `None` only for an empty candidate list.
    pub fn find_least_compared(
        &self,
        candidates: &[ProjectId],
        seen_prev: &[ProjectId],
    ) -> Option<ProjectId> {
        let inner = self.lock();
        let mut best: Option<(ProjectId, u64)> = None;
        for &c in candidates {
            let sum = inner.overlap(c, seen_prev);
            if best.is_none_or(|(_, b)| sum < b) {
                best = Some((c, sum));
            }
        }
        best.map(|(id, _)| id)
    }

    #[cfg(test)]
    fn get(&self, a: ProjectId, b: ProjectId) -> u32 {
        let inner = self.lock();
        match (inner.index.get(&a), inner.index.get(&b)) {
            (Some(&i), Some(&j)) => inner.arr[i][j],
            _ => 0,
        }
    }

    #[cfg(test)]
    fn contains(&self, id: ProjectId) -> bool {
        self.lock().index.contains_key(&id)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().ids.len()
    }

    pub fn clear(&self) {
        *self.lock() = Inner::default();
    }

    pub fn snapshot(&self) -> MatrixSnapshot {
        let inner = self.lock();
        MatrixSnapshot {
            project_ids: inner.ids.clone(),
            counts: inner.arr.clone(),
        }
    }
}
