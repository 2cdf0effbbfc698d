//! In-memory fakes for the two external seams (object store, repositories),
//! used by the service and route tests.

#[cfg(test)]
use std::collections::{BTreeMap, HashMap, HashSet};
#[cfg(test)]
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use chrono::Utc;

#[cfg(test)]
use crate::core::error::{AppError, Result};
#[cfg(test)]
use crate::features::images::models::{Image, NewImage};
#[cfg(test)]
use crate::features::images::repository::ImageRepository;
#[cfg(test)]
use crate::features::reports::models::{NewReport, Report};
#[cfg(test)]
use crate::features::reports::repository::ReportRepository;
#[cfg(test)]
use crate::features::sections::model::Section;
#[cfg(test)]
use crate::features::sections::SectionRepository;
#[cfg(test)]
use crate::features::users::model::User;
#[cfg(test)]
use crate::features::users::UserRepository;
#[cfg(test)]
use crate::modules::storage::ObjectStore;

/// Object store backed by a map, with switches to force put/delete failures
/// and a counter for delete attempts
#[cfg(test)]
pub struct FakeObjectStore {
    base_url: String,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    delete_attempts: AtomicUsize,
    failing_deletes: Mutex<HashSet<String>>,
    fail_all_puts: AtomicBool,
}

#[cfg(test)]
impl FakeObjectStore {
    pub fn new() -> Self {
        Self {
            base_url: "http://localhost:9000/test-bucket".to_string(),
            objects: Mutex::new(HashMap::new()),
            delete_attempts: AtomicUsize::new(0),
            failing_deletes: Mutex::new(HashSet::new()),
            fail_all_puts: AtomicBool::new(false),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn delete_attempts(&self) -> usize {
        self.delete_attempts.load(Ordering::SeqCst)
    }

    pub fn reset_delete_attempts(&self) {
        self.delete_attempts.store(0, Ordering::SeqCst);
    }

    /// Every subsequent put fails with a storage error
    pub fn fail_puts(&self) {
        self.fail_all_puts.store(true, Ordering::SeqCst);
    }

    /// Deletion of the given key fails with a storage error
    pub fn fail_delete_of(&self, key: &str) {
        self.failing_deletes.lock().unwrap().insert(key.to_string());
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    pub fn key_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/", self.base_url);
        url.strip_prefix(&prefix).map(|key| key.to_string())
    }
}

#[cfg(test)]
#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<String> {
        if self.fail_all_puts.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("Put of '{}' refused", key)));
        }
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.delete_attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing_deletes.lock().unwrap().contains(key) {
            return Err(AppError::Storage(format!("Deletion of '{}' refused", key)));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        FakeObjectStore::public_url(self, key)
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        FakeObjectStore::key_from_url(self, url)
    }
}

/// Section lookup over a fixed set of ids
#[cfg(test)]
pub struct InMemorySections {
    rows: HashMap<i32, Section>,
}

#[cfg(test)]
impl InMemorySections {
    pub fn with_ids(ids: &[i32]) -> Self {
        let rows = ids
            .iter()
            .map(|&id| {
                (
                    id,
                    Section {
                        id,
                        name: format!("section-{}", id),
                        created_at: Utc::now(),
                    },
                )
            })
            .collect();
        Self { rows }
    }
}

#[cfg(test)]
#[async_trait]
impl SectionRepository for InMemorySections {
    async fn find_by_id(&self, id: i32) -> Result<Option<Section>> {
        Ok(self.rows.get(&id).cloned())
    }
}

/// User lookup over a fixed set of ids
#[cfg(test)]
pub struct InMemoryUsers {
    rows: HashMap<i32, User>,
}

#[cfg(test)]
impl InMemoryUsers {
    pub fn with_ids(ids: &[i32]) -> Self {
        let rows = ids
            .iter()
            .map(|&id| {
                (
                    id,
                    User {
                        id,
                        username: format!("user-{}", id),
                        created_at: Utc::now(),
                    },
                )
            })
            .collect();
        Self { rows }
    }
}

#[cfg(test)]
#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        Ok(self.rows.get(&id).cloned())
    }
}

/// Report rows in a BTreeMap, so iteration follows insertion order like the
/// `ORDER BY id` queries of the real repository
#[cfg(test)]
pub struct InMemoryReports {
    rows: Mutex<BTreeMap<i32, Report>>,
    next_id: AtomicI32,
}

#[cfg(test)]
impl InMemoryReports {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicI32::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl ReportRepository for InMemoryReports {
    async fn insert(&self, new: NewReport) -> Result<Report> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let report = Report {
            id,
            file_name: new.file_name,
            file_path: new.file_path,
            upload_date: Utc::now(),
            section_id: new.section_id,
            user_id: new.user_id,
        };
        self.rows.lock().unwrap().insert(id, report.clone());
        Ok(report)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Report>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_section(&self, section_id: i32) -> Result<Vec<Report>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.section_id == section_id)
            .cloned()
            .collect())
    }

    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Report>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: i32) -> Result<bool> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}

/// Image rows, same shape as [`InMemoryReports`]
#[cfg(test)]
pub struct InMemoryImages {
    rows: Mutex<BTreeMap<i32, Image>>,
    next_id: AtomicI32,
}

#[cfg(test)]
impl InMemoryImages {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicI32::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl ImageRepository for InMemoryImages {
    async fn insert(&self, new: NewImage) -> Result<Image> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let image = Image {
            id,
            img_src: new.img_src,
            img_des: None,
            section_id: new.section_id,
        };
        self.rows.lock().unwrap().insert(id, image.clone());
        Ok(image)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Image>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_section(&self, section_id: i32) -> Result<Vec<Image>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|i| i.section_id == section_id)
            .cloned()
            .collect())
    }

    async fn update_description(&self, id: i32, img_des: Option<String>) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(image) => {
                image.img_des = img_des;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: i32) -> Result<bool> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}
