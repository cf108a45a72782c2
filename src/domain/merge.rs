//! Import-merge for users and admin reference lists.
//!
//! Imports never replace a collection wholesale: existing records keep their
//! position, matched records are updated in place, and unmatched incoming
//! records are appended in input order.

use crate::models::{AdminItem, Role, User, IMPORT_DEFAULT_PASSWORD, MASTER_USER_ID};

/// Result of merging an incoming batch into an existing collection.
pub struct MergeOutcome<T> {
    pub records: Vec<T>,
    pub changed: bool,
}

/// Merge imported users into the existing roster.
///
/// Rows missing an id, name or email are skipped, as is any row claiming the
/// master user's id. Matched users only have name and email overwritten;
/// password and role are preserved. New users get the fixed default password
/// regardless of what the import carries.
pub fn merge_users(existing: &[User], incoming: Vec<User>) -> MergeOutcome<User> {
    let mut records = existing.to_vec();
    let mut changed = false;

    for user in incoming {
        if user.id.is_empty() || user.name.is_empty() || user.email.is_empty() {
            continue;
        }
        if user.id == MASTER_USER_ID {
            continue;
        }
        match records.iter_mut().find(|u| u.id == user.id) {
            Some(current) => {
                if current.name != user.name || current.email != user.email {
                    current.name = user.name;
                    current.email = user.email;
                    changed = true;
                }
            }
            None => {
                records.push(User {
                    id: user.id,
                    name: user.name,
                    email: user.email,
                    password: Some(IMPORT_DEFAULT_PASSWORD.to_string()),
                    role: user.role,
                });
                changed = true;
            }
        }
    }

    MergeOutcome { records, changed }
}

/// Merge imported reference items into an existing admin list. Same shape as
/// the user merge, without the master-id guard; email is optional here.
pub fn merge_admin_items(existing: &[AdminItem], incoming: Vec<AdminItem>) -> MergeOutcome<AdminItem> {
    let mut records = existing.to_vec();
    let mut changed = false;

    for item in incoming {
        if item.id.is_empty() || item.name.is_empty() {
            continue;
        }
        match records.iter_mut().find(|i| i.id == item.id) {
            Some(current) => {
                if current.name != item.name || current.email != item.email {
                    current.name = item.name;
                    current.email = item.email;
                    changed = true;
                }
            }
            None => {
                records.push(item);
                changed = true;
            }
        }
    }

    MergeOutcome { records, changed }
}
