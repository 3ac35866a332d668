// tests/common/mod.rs
//! Shared fixtures and an in-memory Notion for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use indexmap::IndexMap;
use notion2posts::{AppError, NotionErrorCode, NotionId, NotionRepository, NotionUser, RecordMap};
use std::collections::HashSet;
use std::sync::Mutex;

pub const ROOT_PAGE: &str = "5a5f2c1e7d3b4c8e9f213b6a0d4e8c01";
pub const BLOG_COLLECTION: &str = "c0ffee00-1111-4222-8333-444455556666";

pub const BLOG_RECORD_MAP: &str = include_str!("../fixtures/blog_record_map.json");
pub const FALLBACK_RECORD_MAP: &str = include_str!("../fixtures/fallback_record_map.json");
pub const NO_SCHEMA_RECORD_MAP: &str = include_str!("../fixtures/no_schema_record_map.json");

pub fn record_map(json: &str) -> RecordMap {
    RecordMap::from_json(json).expect("fixture record map should parse")
}

pub fn root_id() -> NotionId {
    NotionId::parse(ROOT_PAGE).expect("fixture root id should parse")
}

/// Serves one record map and a fixed user directory. User ids listed as
/// failing answer with a Notion error; unknown ids are simply absent.
pub struct FakeNotion {
    page: RecordMap,
    users: IndexMap<String, NotionUser>,
    failing_users: HashSet<String>,
    lookups: Mutex<Vec<String>>,
}

impl FakeNotion {
    pub fn new(page: RecordMap) -> Self {
        Self {
            page,
            users: IndexMap::new(),
            failing_users: HashSet::new(),
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// The blog fixture with its authors.
    pub fn blog() -> Self {
        Self::new(record_map(BLOG_RECORD_MAP))
            .with_user(NotionUser {
                id: Some("user-1".into()),
                name: Some("Jane Doe".into()),
                profile_photo: Some("https://example.com/jane.png".into()),
                ..NotionUser::default()
            })
            .with_user(NotionUser {
                id: Some("user-2".into()),
                family_name: Some("김".into()),
                given_name: Some("민지".into()),
                ..NotionUser::default()
            })
            .with_failing_user("user-broken")
    }

    pub fn with_user(mut self, user: NotionUser) -> Self {
        let id = user.id.clone().unwrap_or_default();
        self.users.insert(id, user);
        self
    }

    pub fn with_failing_user(mut self, id: &str) -> Self {
        self.failing_users.insert(id.to_string());
        self
    }

    /// Every user id looked up so far, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotionRepository for FakeNotion {
    async fn get_page(&self, _page_id: &NotionId) -> Result<RecordMap, AppError> {
        Ok(self.page.clone())
    }

    async fn get_users(
        &self,
        user_ids: &[String],
    ) -> Result<IndexMap<String, NotionUser>, AppError> {
        self.lookups.lock().unwrap().extend(user_ids.iter().cloned());

        if let Some(id) = user_ids.iter().find(|id| self.failing_users.contains(*id)) {
            return Err(AppError::NotionService {
                code: NotionErrorCode::NotFound,
                message: format!("user {} not found", id),
                status: reqwest::StatusCode::NOT_FOUND,
            });
        }

        Ok(user_ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|u| (id.clone(), u.clone())))
            .collect())
    }
}
