use serde::{Deserialize, Serialize};

use super::mood::{Emoji, MoodCategory};

/// 일기 항목: `entries` 테이블 한 행을 타입이 있는 값으로 바꾼 것
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub content: String,
    pub emoji: Option<Emoji>,
    pub mood: MoodCategory,
    pub mood_vocabulary: Option<String>,
    #[serde(skip_serializing)]
    pub classify_attempts: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub title: Option<String>,
    pub content: String,
    pub emoji: Option<String>,
}

/// `PUT /entries/{id}`: 제목/내용/이모지를 통째로 교체합니다.
#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub title: Option<String>,
    pub content: String,
    pub emoji: Option<String>,
}

/// DB에 삽입할 새 일기
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub content: String,
    pub emoji: Option<Emoji>,
    pub mood: MoodCategory,
    pub mood_vocabulary: Option<String>,
    pub created_at: String,
}

/// 빈 제목은 제목 없음(NULL)으로 저장합니다.
pub fn normalize_title(title: Option<String>) -> Option<String> {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
