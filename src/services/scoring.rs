use crate::models::works::ActivityType;

/// Points awarded to a Work at creation time. The table below is the
/// institution's rule book; the result is stored on the row and never
/// recomputed, so editing this table only affects Works created after
/// the change. Tiers match exactly: the form vocabulary is closed, so
/// anything outside it lands in the unclassified bucket.
pub fn score(activity_type: &ActivityType, classification: Option<&str>) -> i32 {
    let classification = classification.unwrap_or("");

    match activity_type {
        ActivityType::JournalArticle => match classification {
            "A" | "Q1" => 100,
            "B" | "Q2" => 75,
            "C" => 50,
            _ => 25,
        },
        ActivityType::ConferenceTalk => match classification {
            "international" => 50,
            // any unrecognized scope counts like a national talk
            _ => 25,
        },
        ActivityType::AuthoredBook => 80,
        ActivityType::BookChapter => 40,
        ActivityType::Patent => 150,
        ActivityType::ThesisSupervision => 20,
        ActivityType::ResearchProject => 60,
        ActivityType::Other(_) => 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn journal_tiers_score_per_the_rule_table() {
        let journal = ActivityType::JournalArticle;
        assert_eq!(score(&journal, Some("A")), 100);
        assert_eq!(score(&journal, Some("Q1")), 100);
        assert_eq!(score(&journal, Some("B")), 75);
        assert_eq!(score(&journal, Some("Q2")), 75);
        assert_eq!(score(&journal, Some("C")), 50);
        assert_eq!(score(&journal, Some("Q3")), 25);
        assert_eq!(score(&journal, Some("unclassified")), 25);
        assert_eq!(score(&journal, None), 25);
    }

    #[test]
    fn tier_matching_is_exact() {
        let journal = ActivityType::JournalArticle;
        assert_eq!(score(&journal, Some("a")), 25);
        assert_eq!(score(&journal, Some("q1")), 25);
        assert_eq!(score(&journal, Some(" Q1 ")), 25);
    }

    #[test]
    fn conference_scope_scores_per_the_rule_table() {
        let talk = ActivityType::ConferenceTalk;
        assert_eq!(score(&talk, Some("international")), 50);
        assert_eq!(score(&talk, Some("national")), 25);
        assert_eq!(score(&talk, None), 25);
    }

    #[test]
    fn fixed_rate_activities() {
        assert_eq!(score(&ActivityType::AuthoredBook, None), 80);
        assert_eq!(score(&ActivityType::BookChapter, None), 40);
        assert_eq!(score(&ActivityType::Patent, None), 150);
        assert_eq!(score(&ActivityType::ThesisSupervision, None), 20);
        assert_eq!(score(&ActivityType::ResearchProject, None), 60);
    }

    #[test]
    fn unlisted_activity_falls_back_to_ten_points() {
        let other = ActivityType::Other("exhibition".to_string());
        assert_eq!(score(&other, None), 10);
        assert_eq!(score(&other, Some("A")), 10);
    }
}
