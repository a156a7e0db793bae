//! In-process partitioned collection
//!
//! A [`Dataset`] is a vector of contiguous partitions processed in parallel
//! with rayon. Every transform consumes the dataset and returns a new one, so
//! a pass never mutates the collection it reads from. Partition order and the
//! order of items within a partition are preserved.

use rayon::prelude::*;

/// A collection split into partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset<T> {
    partitions: Vec<Vec<T>>,
}

impl<T: Send> Dataset<T> {
    /// Split `items` into `partitions` contiguous chunks of near-equal size.
    ///
    /// The partition count is clamped to `1..=items.len()` (one empty
    /// partition for an empty input).
    #[must_use]
    pub fn from_vec(items: Vec<T>, partitions: usize) -> Self {
        let len = items.len();
        let count = partitions.min(len).max(1);
        let base = len / count;
        let extra = len % count;

        let mut iter = items.into_iter();
        let partitions = (0..count)
            .map(|index| {
                let size = base + usize::from(index < extra);
                iter.by_ref().take(size).collect()
            })
            .collect();

        Self { partitions }
    }

    /// Number of partitions
    #[must_use]
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Total number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    /// `true` when there are no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partitions.iter().all(Vec::is_empty)
    }

    /// Borrow the partitions
    #[must_use]
    pub fn partitions(&self) -> &[Vec<T>] {
        &self.partitions
    }

    /// Parallel map where each partition gets exclusive use of its own state.
    ///
    /// `states[i]` is handed to partition `i` only, so per-partition state is
    /// never shared between threads.
    ///
    /// # Panics
    ///
    /// If `states.len()` differs from the partition count.
    pub fn map_partitions_with<S, U, F>(self, states: &mut [S], f: F) -> Dataset<U>
    where
        S: Send,
        U: Send,
        F: Fn(&mut S, T) -> U + Sync,
    {
        assert_eq!(
            states.len(),
            self.partitions.len(),
            "one state per partition is required"
        );

        let partitions = self
            .partitions
            .into_par_iter()
            .zip(states.par_iter_mut())
            .map(|(partition, state)| partition.into_iter().map(|item| f(state, item)).collect())
            .collect();

        Dataset { partitions }
    }

    /// Parallel element-wise map
    pub fn map<U, F>(self, f: F) -> Dataset<U>
    where
        U: Send,
        F: Fn(T) -> U + Sync,
    {
        let partitions = self
            .partitions
            .into_par_iter()
            .map(|partition| partition.into_iter().map(&f).collect())
            .collect();

        Dataset { partitions }
    }

    /// Fold each partition with `seq`, then combine partition results with
    /// `comb`. `comb` must be associative and `zero` its identity.
    pub fn aggregate<A, S, C>(&self, zero: A, seq: S, comb: C) -> A
    where
        T: Sync,
        A: Clone + Send + Sync,
        S: Fn(A, &T) -> A + Sync,
        C: Fn(A, A) -> A + Sync,
    {
        self.partitions
            .par_iter()
            .map(|partition| partition.iter().fold(zero.clone(), &seq))
            .reduce(|| zero.clone(), &comb)
    }

    /// Flatten back into a vector, partition by partition
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.partitions.into_iter().flatten().collect()
    }
}
