use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bucket::{Bucket, BucketKind};

/// The full collection of buckets, keyed by name. This whole value is the
/// unit of persistence: stores load and save it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    buckets: BTreeMap<String, Bucket>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.buckets.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Bucket> {
        self.buckets.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Bucket> {
        self.buckets.get_mut(name)
    }

    /// Insert a bucket under a fresh name. False (and no mutation) when the
    /// name is already taken.
    pub fn set(&mut self, name: &str, bucket: Bucket) -> bool {
        if self.exists(name) {
            return false;
        }
        self.buckets.insert(name.to_string(), bucket);
        true
    }

    pub fn create(&mut self, name: &str, kind: BucketKind) -> bool {
        self.set(name, Bucket::new(kind))
    }

    pub fn remove(&mut self, name: &str) -> Option<Bucket> {
        self.buckets.remove(name)
    }

    /// Move a bucket to a new name. Both ends are checked: false when `from`
    /// is absent or `to` is taken, and nothing moves.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if self.exists(to) {
            return false;
        }
        match self.buckets.remove(from) {
            Some(bucket) => {
                self.buckets.insert(to.to_string(), bucket);
                true
            }
            None => false,
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.buckets.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bucket)> {
        self.buckets.iter().map(|(name, bucket)| (name.as_str(), bucket))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
