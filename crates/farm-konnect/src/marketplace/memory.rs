//! Process-local document store with an optional JSON snapshot on disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    Listing, ListingId, Message, MessageId, Transaction, TransactionId, User, UserId,
};
use super::repository::{
    ListingFilter, ListingRepository, MessageFilter, MessageRepository, RepositoryError,
    TransactionRepository, UserFilter, UserRepository,
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Collections {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    listings: Vec<Listing>,
    #[serde(default)]
    messages: Vec<Message>,
    #[serde(default)]
    transactions: Vec<Transaction>,
}

/// Keeps documents in insertion order and mutates them in place. When a snapshot path
/// is configured, every successful mutation rewrites the snapshot before the lock is
/// released.
#[derive(Debug, Default)]
pub struct DocumentStore {
    collections: Mutex<Collections>,
    snapshot: Option<PathBuf>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by `path`, loading existing documents when the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let collections = if path.exists() {
            let raw = fs::read(&path).map_err(|err| unavailable(&path, err))?;
            serde_json::from_slice(&raw).map_err(|err| unavailable(&path, err))?
        } else {
            Collections::default()
        };

        Ok(Self {
            collections: Mutex::new(collections),
            snapshot: Some(path),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, RepositoryError> {
        self.collections
            .lock()
            .map_err(|_| RepositoryError::Unavailable("document store lock poisoned".to_string()))
    }

    fn read<T>(&self, f: impl FnOnce(&Collections) -> T) -> Result<T, RepositoryError> {
        let guard = self.lock()?;
        Ok(f(&*guard))
    }

    /// Run a mutation in place. A mutation that changed something returns how to undo
    /// it; when the snapshot cannot be written that undo runs, so memory and disk never
    /// disagree. Mutations that fail must leave the collections untouched.
    fn write<T>(
        &self,
        f: impl FnOnce(&mut Collections) -> Result<(T, Option<Revert>), RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut guard = self.lock()?;
        let (output, revert) = f(&mut *guard)?;
        let Some(revert) = revert else {
            return Ok(output);
        };
        if let Err(err) = self.persist(&*guard) {
            revert.apply(&mut *guard);
            return Err(err);
        }
        Ok(output)
    }

    fn persist(&self, collections: &Collections) -> Result<(), RepositoryError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let staging = path.with_extension("tmp");
        let file = File::create(&staging).map_err(|err| unavailable(&staging, err))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, collections)
            .map_err(|err| unavailable(&staging, err))?;
        writer.flush().map_err(|err| unavailable(&staging, err))?;
        fs::rename(&staging, path).map_err(|err| unavailable(path, err))?;
        debug!(path = %path.display(), "document snapshot written");
        Ok(())
    }
}

fn unavailable(path: &Path, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Unavailable(format!("{}: {err}", path.display()))
}

/// Inverse of a single-document mutation.
enum Undo<T> {
    Pop,
    Restore(usize, T),
    Reinsert(usize, T),
}

impl<T> Undo<T> {
    fn apply(self, documents: &mut Vec<T>) {
        match self {
            Undo::Pop => {
                documents.pop();
            }
            Undo::Restore(index, previous) => {
                if let Some(slot) = documents.get_mut(index) {
                    *slot = previous;
                }
            }
            Undo::Reinsert(index, removed) => {
                documents.insert(index.min(documents.len()), removed);
            }
        }
    }
}

enum Revert {
    Users(Undo<User>),
    Listings(Undo<Listing>),
    Messages(Undo<Message>),
    Transactions(Undo<Transaction>),
}

impl Revert {
    fn apply(self, collections: &mut Collections) {
        match self {
            Revert::Users(undo) => undo.apply(&mut collections.users),
            Revert::Listings(undo) => undo.apply(&mut collections.listings),
            Revert::Messages(undo) => undo.apply(&mut collections.messages),
            Revert::Transactions(undo) => undo.apply(&mut collections.transactions),
        }
    }
}

/// Apply `change` to the first matching document, returning its position and the
/// state it had before.
fn modify<T: Clone>(
    documents: &mut [T],
    matches: impl Fn(&T) -> bool,
    change: impl FnOnce(&mut T),
) -> Option<(usize, T)> {
    let index = documents.iter().position(matches)?;
    let slot = documents.get_mut(index)?;
    let previous = slot.clone();
    change(slot);
    Some((index, previous))
}

impl UserRepository for DocumentStore {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        self.write(|collections| {
            let duplicate = collections
                .users
                .iter()
                .any(|existing| existing.id == user.id || existing.email == user.email);
            if duplicate {
                return Err(RepositoryError::Conflict);
            }
            collections.users.push(user.clone());
            Ok((user, Some(Revert::Users(Undo::Pop))))
        })
    }

    fn modify_user(
        &self,
        id: &UserId,
        change: impl FnOnce(&mut User),
    ) -> Result<Option<User>, RepositoryError> {
        self.write(|collections| {
            let users = &mut collections.users;
            let Some((index, previous)) = modify(users, |user| user.id == *id, change) else {
                return Ok((None, None));
            };

            users[index].id = previous.id;
            let updated = users[index].clone();
            let taken = users
                .iter()
                .any(|existing| existing.id != updated.id && existing.email == updated.email);
            if taken {
                users[index] = previous;
                return Err(RepositoryError::Conflict);
            }

            let revert = Revert::Users(Undo::Restore(index, previous));
            Ok((Some(updated), Some(revert)))
        })
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.read(|collections| collections.users.iter().find(|user| user.id == *id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.read(|collections| {
            collections
                .users
                .iter()
                .find(|user| user.email == email)
                .cloned()
        })
    }

    fn users(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError> {
        self.read(|collections| {
            collections
                .users
                .iter()
                .filter(|user| filter.matches(user))
                .cloned()
                .collect()
        })
    }
}
impl ListingRepository for DocumentStore {
    fn insert_listing(&self, listing: Listing) -> Result<Listing, RepositoryError> {
        self.write(|collections| {
            if collections.listings.iter().any(|existing| existing.id == listing.id) {
                return Err(RepositoryError::Conflict);
            }
            collections.listings.push(listing.clone());
            Ok((listing, Some(Revert::Listings(Undo::Pop))))
        })
    }

    fn modify_listing(
        &self,
        id: &ListingId,
        change: impl FnOnce(&mut Listing),
    ) -> Result<Option<Listing>, RepositoryError> {
        self.write(|collections| {
            let listings = &mut collections.listings;
            let Some((index, previous)) = modify(listings, |listing| listing.id == *id, change)
            else {
                return Ok((None, None));
            };

            listings[index].id = previous.id;
            let updated = listings[index].clone();
            let revert = Revert::Listings(Undo::Restore(index, previous));
            Ok((Some(updated), Some(revert)))
        })
    }

    fn fetch_listing(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        self.read(|collections| {
            collections
                .listings
                .iter()
                .find(|listing| listing.id == *id)
                .cloned()
        })
    }

    fn remove_listing(&self, id: &ListingId) -> Result<(), RepositoryError> {
        self.write(|collections| {
            let Some(index) = collections
                .listings
                .iter()
                .position(|listing| listing.id == *id)
            else {
                return Err(RepositoryError::NotFound);
            };
            let removed = collections.listings.remove(index);
            Ok(((), Some(Revert::Listings(Undo::Reinsert(index, removed)))))
        })
    }

    fn listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, RepositoryError> {
        self.read(|collections| {
            collections
                .listings
                .iter()
                .filter(|listing| filter.matches(listing))
                .cloned()
                .collect()
        })
    }

    fn record_listing_view(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        self.modify_listing(id, |listing| listing.views += 1)
    }
}

impl MessageRepository for DocumentStore {
    fn insert_message(&self, message: Message) -> Result<Message, RepositoryError> {
        self.write(|collections| {
            if collections.messages.iter().any(|existing| existing.id == message.id) {
                return Err(RepositoryError::Conflict);
            }
            collections.messages.push(message.clone());
            Ok((message, Some(Revert::Messages(Undo::Pop))))
        })
    }

    fn modify_message(
        &self,
        id: &MessageId,
        change: impl FnOnce(&mut Message),
    ) -> Result<Option<Message>, RepositoryError> {
        self.write(|collections| {
            let messages = &mut collections.messages;
            let Some((index, previous)) = modify(messages, |message| message.id == *id, change)
            else {
                return Ok((None, None));
            };

            messages[index].id = previous.id;
            let updated = messages[index].clone();
            let revert = Revert::Messages(Undo::Restore(index, previous));
            Ok((Some(updated), Some(revert)))
        })
    }

    fn fetch_message(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError> {
        self.read(|collections| {
            collections
                .messages
                .iter()
                .find(|message| message.id == *id)
                .cloned()
        })
    }

    fn messages(&self, filter: &MessageFilter) -> Result<Vec<Message>, RepositoryError> {
        self.read(|collections| {
            collections
                .messages
                .iter()
                .filter(|message| filter.matches(message))
                .cloned()
                .collect()
        })
    }
}

impl TransactionRepository for DocumentStore {
    fn insert_transaction(&self, transaction: Transaction) -> Result<Transaction, RepositoryError> {
        self.write(|collections| {
            if collections
                .transactions
                .iter()
                .any(|existing| existing.id == transaction.id)
            {
                return Err(RepositoryError::Conflict);
            }
            collections.transactions.push(transaction.clone());
            Ok((transaction, Some(Revert::Transactions(Undo::Pop))))
        })
    }

    fn fetch_transaction(
        &self,
        id: &TransactionId,
    ) -> Result<Option<Transaction>, RepositoryError> {
        self.read(|collections| {
            collections
                .transactions
                .iter()
                .find(|transaction| transaction.id == *id)
                .cloned()
        })
    }

    fn transactions(&self) -> Result<Vec<Transaction>, RepositoryError> {
        self.read(|collections| collections.transactions.clone())
    }
}
