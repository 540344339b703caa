use serde::{Deserialize, Deserializer};

// query strings behave like the old frontend expects: `?page=abc` means "no page given"
pub fn deserialize_lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.trim().parse::<u32>().ok()))
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(i64),
    String(String),
}

// the frontend sends ids both as numbers and as strings ("2")
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "NumberOrString")]
pub struct LenientI64(pub i64);

impl TryFrom<NumberOrString> for LenientI64 {
    type Error = String;

    fn try_from(value: NumberOrString) -> Result<Self, Self::Error> {
        match value {
            NumberOrString::Number(v) => Ok(LenientI64(v)),
            NumberOrString::String(s) => match s.trim().parse::<i64>() {
                Ok(v) => Ok(LenientI64(v)),
                Err(_) => Err(format!("Wrong value {s}, can not parse to i64")),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawQuizCategory {
    Number(i64),
    Object { id: LenientI64 },
}

/// `0`, `{"id": 0}` or a missing field mean every category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(try_from = "RawQuizCategory")]
pub enum QuizCategory {
    #[default]
    All,
    Category(i64),
}

impl TryFrom<RawQuizCategory> for QuizCategory {
    type Error = String;

    fn try_from(value: RawQuizCategory) -> Result<Self, Self::Error> {
        match value {
            RawQuizCategory::Number(0) | RawQuizCategory::Object { id: LenientI64(0) } => {
                Ok(QuizCategory::All)
            }
            RawQuizCategory::Number(v) => Err(format!("Quiz category {v} is not an object")),
            RawQuizCategory::Object { id } => Ok(QuizCategory::Category(id.0)),
        }
    }
}

impl QuizCategory {
    pub fn id(self) -> Option<i64> {
        match self {
            QuizCategory::All => None,
            QuizCategory::Category(id) => Some(id),
        }
    }
}
