use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::services::scoring::score;

/// The closed activity vocabulary used across forms, scoring and
/// filtering. Anything outside it is carried verbatim so old rows keep
/// filtering and score at the fallback rate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    JournalArticle,
    ConferenceTalk,
    AuthoredBook,
    BookChapter,
    Patent,
    ThesisSupervision,
    ResearchProject,
    Other(String),
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityType::JournalArticle => "journal_article",
            ActivityType::ConferenceTalk => "conference_talk",
            ActivityType::AuthoredBook => "authored_book",
            ActivityType::BookChapter => "book_chapter",
            ActivityType::Patent => "patent",
            ActivityType::ThesisSupervision => "thesis_supervision",
            ActivityType::ResearchProject => "research_project",
            ActivityType::Other(raw) => raw,
        }
    }

    pub fn parse(value: &str) -> ActivityType {
        match value {
            "journal_article" => ActivityType::JournalArticle,
            "conference_talk" => ActivityType::ConferenceTalk,
            "authored_book" => ActivityType::AuthoredBook,
            "book_chapter" => ActivityType::BookChapter,
            "patent" => ActivityType::Patent,
            "thesis_supervision" => ActivityType::ThesisSupervision,
            "research_project" => ActivityType::ResearchProject,
            other => ActivityType::Other(other.to_string()),
        }
    }

    /// Display label used in the export and the CV document.
    pub fn label_ar(&self) -> &str {
        match self {
            ActivityType::JournalArticle => "مقال في مجلة علمية",
            ActivityType::ConferenceTalk => "مداخلة في مؤتمر",
            ActivityType::AuthoredBook => "تأليف كتاب",
            ActivityType::BookChapter => "فصل في كتاب",
            ActivityType::Patent => "براءة اختراع",
            ActivityType::ThesisSupervision => "إشراف على أطروحة",
            ActivityType::ResearchProject => "مشروع بحثي",
            ActivityType::Other(raw) => raw,
        }
    }
}

impl From<String> for ActivityType {
    fn from(value: String) -> Self {
        ActivityType::parse(&value)
    }
}

impl From<ActivityType> for String {
    fn from(value: ActivityType) -> Self {
        value.as_str().to_string()
    }
}

/// Per-activity structured facts. Serialized into the `details` TEXT
/// column as tagged JSON; read back leniently (see [`DetailsPayload`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkDetails {
    JournalArticle {
        journal: String,
        issn: Option<String>,
        indexing: Option<String>,
        volume: Option<String>,
        issue: Option<String>,
    },
    ConferenceTalk {
        event: String,
        organizer: Option<String>,
        scope: Option<String>,
        location: Option<String>,
    },
    AuthoredBook {
        publisher: String,
        isbn: Option<String>,
        pages: Option<i32>,
    },
    BookChapter {
        book_title: String,
        publisher: Option<String>,
        isbn: Option<String>,
    },
    Patent {
        office: String,
        number: Option<String>,
    },
    ThesisSupervision {
        student: String,
        degree: Option<String>,
        institution: Option<String>,
    },
    ResearchProject {
        code: Option<String>,
        funder: Option<String>,
        role: Option<String>,
    },
}

impl WorkDetails {
    pub fn activity_type(&self) -> ActivityType {
        match self {
            WorkDetails::JournalArticle { .. } => ActivityType::JournalArticle,
            WorkDetails::ConferenceTalk { .. } => ActivityType::ConferenceTalk,
            WorkDetails::AuthoredBook { .. } => ActivityType::AuthoredBook,
            WorkDetails::BookChapter { .. } => ActivityType::BookChapter,
            WorkDetails::Patent { .. } => ActivityType::Patent,
            WorkDetails::ThesisSupervision { .. } => ActivityType::ThesisSupervision,
            WorkDetails::ResearchProject { .. } => ActivityType::ResearchProject,
        }
    }

    /// Labeled (key, value) pairs for the export's flattened details
    /// column. Empty values are dropped.
    pub fn fields(&self) -> Vec<(String, String)> {
        fn push(out: &mut Vec<(String, String)>, key: &str, value: &str) {
            if !value.is_empty() {
                out.push((key.to_string(), value.to_string()));
            }
        }
        fn push_opt(out: &mut Vec<(String, String)>, key: &str, value: &Option<String>) {
            if let Some(value) = value {
                push(out, key, value);
            }
        }

        let mut out = Vec::new();
        match self {
            WorkDetails::JournalArticle {
                journal,
                issn,
                indexing,
                volume,
                issue,
            } => {
                push(&mut out, "المجلة", journal);
                push_opt(&mut out, "ISSN", issn);
                push_opt(&mut out, "الفهرسة", indexing);
                push_opt(&mut out, "المجلد", volume);
                push_opt(&mut out, "العدد", issue);
            }
            WorkDetails::ConferenceTalk {
                event,
                organizer,
                scope,
                location,
            } => {
                push(&mut out, "المؤتمر", event);
                push_opt(&mut out, "الجهة المنظمة", organizer);
                push_opt(&mut out, "النطاق", scope);
                push_opt(&mut out, "المكان", location);
            }
            WorkDetails::AuthoredBook {
                publisher,
                isbn,
                pages,
            } => {
                push(&mut out, "الناشر", publisher);
                push_opt(&mut out, "ISBN", isbn);
                if let Some(pages) = pages {
                    push(&mut out, "عدد الصفحات", &pages.to_string());
                }
            }
            WorkDetails::BookChapter {
                book_title,
                publisher,
                isbn,
            } => {
                push(&mut out, "عنوان الكتاب", book_title);
                push_opt(&mut out, "الناشر", publisher);
                push_opt(&mut out, "ISBN", isbn);
            }
            WorkDetails::Patent { office, number } => {
                push(&mut out, "مكتب البراءات", office);
                push_opt(&mut out, "رقم البراءة", number);
            }
            WorkDetails::ThesisSupervision {
                student,
                degree,
                institution,
            } => {
                push(&mut out, "الطالب", student);
                push_opt(&mut out, "الشهادة", degree);
                push_opt(&mut out, "المؤسسة", institution);
            }
            WorkDetails::ResearchProject { code, funder, role } => {
                push_opt(&mut out, "رمز المشروع", code);
                push_opt(&mut out, "جهة التمويل", funder);
                push_opt(&mut out, "الصفة", role);
            }
        }
        out
    }
}

/// What the storage layer actually hands back: the typed payload when the
/// blob parses as one, otherwise whatever key/value bag is in there.
/// Schema-on-read; an unparseable blob is an empty bag, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailsPayload {
    Typed(WorkDetails),
    Legacy(BTreeMap<String, String>),
}

impl DetailsPayload {
    pub fn parse(raw: Option<&str>) -> DetailsPayload {
        let raw = match raw {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return DetailsPayload::Legacy(BTreeMap::new()),
        };
        if let Ok(details) = serde_json::from_str::<WorkDetails>(raw) {
            return DetailsPayload::Typed(details);
        }
        match serde_json::from_str::<BTreeMap<String, serde_json::Value>>(raw) {
            Ok(bag) => DetailsPayload::Legacy(
                bag.into_iter()
                    .map(|(k, v)| match v {
                        serde_json::Value::String(s) => (k, s),
                        other => (k, other.to_string()),
                    })
                    .collect(),
            ),
            Err(_) => DetailsPayload::Legacy(BTreeMap::new()),
        }
    }

    /// `key:value` pairs joined by " | ", empty values skipped.
    pub fn flatten(&self) -> String {
        let pairs: Vec<String> = match self {
            DetailsPayload::Typed(details) => details
                .fields()
                .into_iter()
                .map(|(k, v)| format!("{}:{}", k, v))
                .collect(),
            DetailsPayload::Legacy(bag) => bag
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| format!("{}:{}", k, v))
                .collect(),
        };
        pairs.join(" | ")
    }
}

/// One Work row joined with its owner and org placement, as every read
/// surface consumes it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WorkRecord {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub activity_type: String,
    pub classification: Option<String>,
    pub publication_date: NaiveDate,
    pub year: i32,
    pub points: i32,
    pub details: Option<String>,
    pub researcher: String,
    pub team_id: Option<i32>,
    pub department_id: Option<i32>,
    pub team: Option<String>,
    pub department: Option<String>,
}

impl WorkRecord {
    pub fn activity(&self) -> ActivityType {
        ActivityType::parse(&self.activity_type)
    }
}

/// A Work ready for insertion. `year` and `points` are derived here and
/// nowhere else; points are frozen at this moment and never recomputed.
#[derive(Debug, Clone)]
pub struct NewWork {
    pub user_id: i32,
    pub title: String,
    pub details: String,
    pub activity_type: String,
    pub classification: Option<String>,
    pub publication_date: NaiveDate,
    pub year: i32,
    pub points: i32,
}

impl NewWork {
    pub fn assemble(
        user_id: i32,
        title: String,
        details: &WorkDetails,
        activity_type: ActivityType,
        classification: Option<String>,
        publication_date: NaiveDate,
    ) -> Result<NewWork, serde_json::Error> {
        let points = score(&activity_type, classification.as_deref());
        Ok(NewWork {
            user_id,
            title,
            details: serde_json::to_string(details)?,
            activity_type: activity_type.as_str().to_string(),
            classification,
            publication_date,
            year: publication_date.year(),
            points,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkRequest {
    pub title: String,
    pub activity_type: ActivityType,
    pub classification: Option<String>,
    pub publication_date: NaiveDate,
    pub details: WorkDetails,
}

/// Title and date are the only editable fields; points stay frozen.
#[derive(Debug, Deserialize)]
pub struct UpdateWorkRequest {
    pub title: String,
    pub publication_date: NaiveDate,
}

/// Interactive report filters, applied on top of the visibility scope.
#[derive(Debug, Default, Deserialize)]
pub struct WorkQueryFilter {
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub department_id: Option<i32>,
    pub team_id: Option<i32>,
    pub activity_type: Option<String>,
}
