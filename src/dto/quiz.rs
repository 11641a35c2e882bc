//! DTO definitions for quiz management.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::dao::models::{
    MAX_QUESTIONS, OptionEntity, QuestionEntity, QuestionKind, QuizEntity, QuizSettingsEntity,
    QuizStatus,
};

/// One candidate answer inside a question payload.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionInput {
    #[validate(length(min = 1, max = 200))]
    pub value: String,
    pub is_correct: bool,
}

/// One question inside a quiz payload.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    pub kind: QuestionKind,
    #[validate(length(min = 2, max = 6), nested)]
    pub options: Vec<OptionInput>,
    #[validate(range(min = 5, max = 300))]
    pub duration_secs: u32,
    #[validate(range(min = 0, max = 10_000))]
    pub points: u32,
    #[validate(url)]
    pub media_url: Option<String>,
}

/// Cosmetic settings attached to a quiz.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettingsInput {
    #[validate(url)]
    pub lobby_music_url: Option<String>,
    #[validate(url)]
    pub podium_music_url: Option<String>,
    #[validate(url)]
    pub game_music_url: Option<String>,
    #[validate(length(max = 32))]
    pub color_label: Option<String>,
}

/// Payload creating or replacing a quiz.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuizRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    pub status: QuizStatus,
    #[validate(custom(function = validate_question_count), nested)]
    pub questions: Vec<QuestionInput>,
    #[serde(default)]
    #[validate(nested)]
    pub settings: QuizSettingsInput,
}

fn validate_question_count(questions: &[QuestionInput]) -> Result<(), ValidationError> {
    if questions.len() > MAX_QUESTIONS {
        let mut err = ValidationError::new("too_many_questions");
        err.message = Some(format!("A quiz may hold at most {MAX_QUESTIONS} questions").into());
        return Err(err);
    }
    Ok(())
}

/// Full projection of a quiz returned to its owner.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
    pub status: QuizStatus,
    pub questions: Vec<QuestionEntity>,
    pub settings: QuizSettingsEntity,
    pub created_at: String,
    pub updated_at: String,
}

impl From<QuizEntity> for QuizResponse {
    fn from(quiz: QuizEntity) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title,
            owner_id: quiz.owner_id,
            status: quiz.status,
            questions: quiz.questions,
            settings: quiz.settings,
            created_at: super::format_system_time(quiz.created_at),
            updated_at: super::format_system_time(quiz.updated_at),
        }
    }
}

/// Compact projection used by the paginated quiz list.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizListItem {
    pub id: Uuid,
    pub title: String,
    pub status: QuizStatus,
    pub question_count: usize,
    pub updated_at: String,
}

impl From<QuizEntity> for QuizListItem {
    fn from(quiz: QuizEntity) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title,
            status: quiz.status,
            question_count: quiz.questions.len(),
            updated_at: super::format_system_time(quiz.updated_at),
        }
    }
}

impl QuestionInput {
    /// Convert into the stored representation.
    pub fn into_entity(self) -> QuestionEntity {
        QuestionEntity {
            title: self.title,
            kind: self.kind,
            options: self
                .options
                .into_iter()
                .map(|option| OptionEntity {
                    value: option.value,
                    is_correct: option.is_correct,
                })
                .collect(),
            duration_secs: self.duration_secs,
            points: self.points,
            media_url: self.media_url,
        }
    }
}

impl QuizSettingsInput {
    /// Convert into the stored representation.
    pub fn into_entity(self) -> QuizSettingsEntity {
        QuizSettingsEntity {
            lobby_music_url: self.lobby_music_url,
            podium_music_url: self.podium_music_url,
            game_music_url: self.game_music_url,
            color_label: self.color_label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> QuestionInput {
        QuestionInput {
            title: "Capital of France?".into(),
            kind: QuestionKind::Choice,
            options: vec![
                OptionInput {
                    value: "Paris".into(),
                    is_correct: true,
                },
                OptionInput {
                    value: "Lyon".into(),
                    is_correct: false,
                },
            ],
            duration_secs: 20,
            points: 100,
            media_url: None,
        }
    }

    #[test]
    fn question_count_cap_enforced() {
        let questions: Vec<_> = (0..=MAX_QUESTIONS).map(|_| question()).collect();
        assert!(validate_question_count(&questions).is_err());
        assert!(validate_question_count(&questions[..MAX_QUESTIONS]).is_ok());
    }

    #[test]
    fn save_quiz_request_validates_nested_questions() {
        let request = SaveQuizRequest {
            title: "Geography".into(),
            status: QuizStatus::Draft,
            questions: vec![QuestionInput {
                title: String::new(),
                ..question()
            }],
            settings: QuizSettingsInput::default(),
        };
        assert!(request.validate().is_err());
    }
}
