// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory document store backing the test harness.

use crate::models::{Record, User};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub(crate) struct MemoryStore {
    users: DashMap<String, User>,
    /// external ID -> user, claimed once per external ID
    users_by_external_id: DashMap<String, User>,
    records: DashMap<String, Record>,
    records_unavailable: AtomicBool,
}

impl MemoryStore {
    pub(crate) fn get_user(&self, user_id: &str) -> Option<User> {
        self.users.get(user_id).map(|u| u.value().clone())
    }

    pub(crate) fn find_user_by_external_id(&self, external_id: &str) -> Option<User> {
        self.users_by_external_id
            .get(external_id)
            .map(|u| u.value().clone())
    }

    /// Insert `user` unless its external ID is already taken.
    ///
    /// Returns the stored user and whether it was newly created.
    pub(crate) fn insert_user_if_absent(&self, user: User) -> (User, bool) {
        match self.users_by_external_id.entry(user.external_id.clone()) {
            Entry::Occupied(existing) => (existing.get().clone(), false),
            Entry::Vacant(slot) => {
                self.users.insert(user.id.clone(), user.clone());
                slot.insert(user.clone());
                (user, true)
            }
        }
    }

    pub(crate) fn records_available(&self) -> bool {
        !self.records_unavailable.load(Ordering::SeqCst)
    }

    pub(crate) fn set_records_unavailable(&self, unavailable: bool) {
        self.records_unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub(crate) fn insert_record(&self, record: Record) {
        self.records.insert(record.id.clone(), record);
    }

    /// Records owned by `user_id`, highest total score first.
    pub(crate) fn records_for_user(&self, user_id: &str) -> Vec<Record> {
        let mut records: Vec<Record> = self
            .records
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
        records
    }
}
