//! # 감정 분류 게이트웨이
//!
//! 일기 텍스트를 외부 감정 분류 서비스로 보내 원시 라벨을 받아옵니다.
//!
//! ```text
//! POST {CLASSIFIER_BASE_URL}/analyze   { "text": "..." }
//!   → 200 OK                           { "prediction": "LABEL_2" }
//! ```
//!
//! `MoodClassifier` 트레이트로 감싸 두었기 때문에 테스트에서는 가짜 분류기를 넣을 수 있습니다.
//! 호출이 실패해도(네트워크 오류, 타임아웃, 2xx가 아닌 응답, 잘못된 본문) 저장은 막지 않습니다.
//! `assess()`가 실패를 `analysis_failed`로 바꾸고, 나중에 스윕이 다시 시도합니다.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{MoodAssessment, MoodCategory};
use crate::services::labels::LabelCatalog;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait MoodClassifier: Send + Sync {
    /// 텍스트를 분류하여 분류기 고유의 원시 라벨을 반환합니다.
    async fn classify(&self, text: &str) -> Result<String, ClassifyError>;
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    prediction: String,
}

/// HTTP로 외부 분류 서비스를 호출하는 분류기
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/analyze", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MoodClassifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<String, ClassifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalyzeRequest { text })
            .send()
            .await
            .map_err(|e| ClassifyError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| ClassifyError::Unavailable(e.to_string()))?;

        let body: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| ClassifyError::Unavailable(format!("malformed response: {e}")))?;

        Ok(body.prediction)
    }
}

/// 분류기로 보낼 텍스트: `"{title}. {content}"` (제목이 없으면 `". {content}"`)
pub fn classification_text(title: Option<&str>, content: &str) -> String {
    format!("{}. {}", title.unwrap_or(""), content)
}

/// 텍스트를 분류하고 활성 어휘로 정규화합니다.
///
/// 분류기 호출이 실패하면 경고를 남기고 `analysis_failed`를 반환합니다. 에러를 돌려주지 않습니다.
pub async fn assess(
    classifier: &dyn MoodClassifier,
    catalog: &LabelCatalog,
    text: &str,
) -> MoodAssessment {
    match classifier.classify(text).await {
        Ok(raw_label) => {
            let table = catalog.active_table();
            let mood = catalog.normalize(&raw_label);
            if mood == MoodCategory::Unknown {
                tracing::warn!(
                    raw_label = %raw_label,
                    vocabulary = %table.tag(),
                    "Classifier returned a label with no mapping"
                );
            }
            MoodAssessment {
                mood,
                vocabulary: Some(table.tag()),
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "Mood classification failed");
            MoodAssessment::failed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::labels::EMOTION_7;

    struct Fixed(Result<&'static str, &'static str>);

    #[async_trait]
    impl MoodClassifier for Fixed {
        async fn classify(&self, _text: &str) -> Result<String, ClassifyError> {
            self.0
                .map(str::to_string)
                .map_err(|e| ClassifyError::Unavailable(e.to_string()))
        }
    }

    #[test]
    fn joins_title_and_content() {
        assert_eq!(classification_text(Some("Monday"), "long day"), "Monday. long day");
        assert_eq!(classification_text(None, "long day"), ". long day");
    }

    #[test]
    fn endpoint_has_no_double_slash() {
        let classifier = HttpClassifier::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(classifier.endpoint(), "http://localhost:8000/analyze");
    }

    #[tokio::test]
    async fn assess_normalizes_with_the_active_vocabulary() {
        let catalog = LabelCatalog::builtin();
        let assessment = assess(&Fixed(Ok("LABEL_2")), &catalog, "text").await;
        assert_eq!(assessment.mood, MoodCategory::Depressed);
        assert_eq!(assessment.vocabulary.as_deref(), Some("sentiment-bert@v1"));

        let catalog = catalog.select(EMOTION_7).unwrap();
        let assessment = assess(&Fixed(Ok("joy")), &catalog, "text").await;
        assert_eq!(assessment.mood, MoodCategory::Normal);
        assert_eq!(assessment.vocabulary.as_deref(), Some("emotion-7@v1"));
    }

    #[tokio::test]
    async fn assess_keeps_unmapped_labels_as_unknown() {
        let assessment = assess(&Fixed(Ok("xyz")), &LabelCatalog::builtin(), "text").await;
        assert_eq!(assessment.mood, MoodCategory::Unknown);
        assert!(assessment.vocabulary.is_some());
    }

    #[tokio::test]
    async fn assess_turns_gateway_failure_into_the_sentinel() {
        let assessment = assess(&Fixed(Err("timeout")), &LabelCatalog::builtin(), "text").await;
        assert_eq!(assessment, MoodAssessment::failed());
    }
}
