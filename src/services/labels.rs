//! # 라벨 정규화(Label Normalizer)
//!
//! 외부 감정 분류기가 돌려주는 원시 라벨(raw label)을 `MoodCategory`로 바꿉니다.
//!
//! 분류기의 라벨 어휘(vocabulary)는 이 서비스가 통제하지 않으며 모델마다 다릅니다.
//! - `sentiment-bert`: `LABEL_0 / LABEL_1 / LABEL_2`
//! - `emotion-7`: `sadness / anger / fear / disgust / neutral / joy / surprise`
//!
//! 그래서 매핑 테이블을 코드의 `match`로 고정하지 않고, 데이터(`LabelCatalog`)로 주입합니다.
//! 새 분류기 버전은 TOML 파일(`LABEL_MAP_PATH`)에 테이블을 추가하고
//! `LABEL_VOCABULARY`로 선택하면 됩니다.
//!
//! ## TOML 형식
//! ```toml
//! active = "sentiment-bert"
//!
//! [vocabularies.sentiment-bert]
//! version = 1
//!
//! [vocabularies.sentiment-bert.labels]
//! LABEL_0 = "stressed"
//! LABEL_1 = "normal"
//! LABEL_2 = "depressed"
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use thiserror::Error;

use crate::models::MoodCategory;

/// 3-클래스 BERT 감성 모델 어휘
pub const SENTIMENT_BERT: &str = "sentiment-bert";
/// 7-클래스 감정 모델 어휘
pub const EMOTION_7: &str = "emotion-7";

#[derive(Debug, Error)]
pub enum LabelMapError {
    #[error("invalid label map: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("vocabulary '{vocabulary}': label '{label}' maps to sentinel '{mood}'")]
    SentinelTarget {
        vocabulary: String,
        label: String,
        mood: MoodCategory,
    },

    #[error("vocabulary '{vocabulary}': label '{label}' is mapped twice")]
    DuplicateLabel { vocabulary: String, label: String },

    #[error("vocabulary '{0}' is defined twice")]
    DuplicateVocabulary(String),

    #[error("unknown vocabulary: {0}")]
    UnknownVocabulary(String),

    #[error("label map defines no vocabularies")]
    Empty,
}

/// 한 어휘의 매핑 테이블 (원시 라벨 → 실제 기분 범주)
///
/// 키는 대소문자를 구분하지 않도록 소문자로 저장합니다.
/// 대상 범주는 항상 실제 범주이며, 센티널은 생성 시 거부됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    name: String,
    version: u32,
    labels: HashMap<String, MoodCategory>,
}

impl LabelTable {
    pub fn new<I, S>(name: impl Into<String>, version: u32, entries: I) -> Result<Self, LabelMapError>
    where
        I: IntoIterator<Item = (S, MoodCategory)>,
        S: AsRef<str>,
    {
        let name = name.into();
        let mut labels = HashMap::new();

        for (label, mood) in entries {
            let label = label.as_ref();
            if !mood.is_real() {
                return Err(LabelMapError::SentinelTarget {
                    vocabulary: name,
                    label: label.to_string(),
                    mood,
                });
            }
            if labels.insert(label_key(label), mood).is_some() {
                return Err(LabelMapError::DuplicateLabel {
                    vocabulary: name,
                    label: label.to_string(),
                });
            }
        }

        Ok(Self {
            name,
            version,
            labels,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 일기에 함께 저장되는 어휘 태그: `"{name}@v{version}"`
    pub fn tag(&self) -> String {
        format!("{}@v{}", self.name, self.version)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn label_key(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// 원시 라벨을 기분 범주로 정규화합니다.
///
/// 순수(pure)하고 전체(total) 함수입니다. 실패하지 않으며,
/// 테이블에 없는 라벨(빈 문자열 포함)은 `MoodCategory::Unknown`이 됩니다.
pub fn normalize(raw_label: &str, table: &LabelTable) -> MoodCategory {
    table
        .labels
        .get(&label_key(raw_label))
        .copied()
        .unwrap_or(MoodCategory::Unknown)
}

/// 주입 가능한 어휘 카탈로그: 여러 매핑 테이블과, 그중 현재 사용 중인(active) 테이블
#[derive(Debug, Clone)]
pub struct LabelCatalog {
    active: String,
    tables: BTreeMap<String, LabelTable>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    active: String,
    vocabularies: BTreeMap<String, VocabularyFile>,
}

#[derive(Debug, Deserialize)]
struct VocabularyFile {
    version: u32,
    labels: BTreeMap<String, MoodCategory>,
}

impl LabelCatalog {
    pub fn new(
        active: impl Into<String>,
        tables: impl IntoIterator<Item = LabelTable>,
    ) -> Result<Self, LabelMapError> {
        let mut by_name = BTreeMap::new();
        for table in tables {
            let name = table.name.clone();
            if by_name.insert(name.clone(), table).is_some() {
                return Err(LabelMapError::DuplicateVocabulary(name));
            }
        }
        if by_name.is_empty() {
            return Err(LabelMapError::Empty);
        }

        let active = active.into();
        if !by_name.contains_key(&active) {
            return Err(LabelMapError::UnknownVocabulary(active));
        }

        Ok(Self {
            active,
            tables: by_name,
        })
    }

    /// 내장 카탈로그: `sentiment-bert` v1 (기본 활성) + `emotion-7` v1
    pub fn builtin() -> Self {
        use MoodCategory::*;

        let sentiment_bert = LabelTable {
            name: SENTIMENT_BERT.to_string(),
            version: 1,
            labels: [("label_0", Stressed), ("label_1", Normal), ("label_2", Depressed)]
                .into_iter()
                .map(|(label, mood)| (label.to_string(), mood))
                .collect(),
        };

        let emotion_7 = LabelTable {
            name: EMOTION_7.to_string(),
            version: 1,
            labels: [
                ("joy", Normal),
                ("neutral", Normal),
                ("surprise", Normal),
                ("anger", Stressed),
                ("fear", Stressed),
                ("disgust", Stressed),
                ("sadness", Depressed),
            ]
            .into_iter()
            .map(|(label, mood)| (label.to_string(), mood))
            .collect(),
        };

        Self {
            active: SENTIMENT_BERT.to_string(),
            tables: BTreeMap::from([
                (SENTIMENT_BERT.to_string(), sentiment_bert),
                (EMOTION_7.to_string(), emotion_7),
            ]),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, LabelMapError> {
        let file: CatalogFile = toml::from_str(raw)?;
        let tables = file
            .vocabularies
            .into_iter()
            .map(|(name, vocab)| LabelTable::new(name, vocab.version, vocab.labels))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(file.active, tables)
    }

    /// 활성 어휘를 바꿉니다. 카탈로그에 없는 이름이면 에러입니다.
    pub fn select(mut self, name: &str) -> Result<Self, LabelMapError> {
        if !self.tables.contains_key(name) {
            return Err(LabelMapError::UnknownVocabulary(name.to_string()));
        }
        self.active = name.to_string();
        Ok(self)
    }

    pub fn active_table(&self) -> &LabelTable {
        // new()/select()가 active 키의 존재를 보장합니다.
        &self.tables[&self.active]
    }

    /// 활성 어휘로 정규화합니다.
    pub fn normalize(&self, raw_label: &str) -> MoodCategory {
        normalize(raw_label, self.active_table())
    }
}

impl Default for LabelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
