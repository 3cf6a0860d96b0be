use crate::backend::Backend;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{CafeError, Result};
use crate::model::{CafeId, NewReview, ReviewId, MAX_COMMENT_LEN, MAX_RATING, RATING_STEP};
use crate::session::SessionContext;
use tracing::info;

/// Checks a rating and comment before submission. Returns the payload with
/// the comment trimmed.
pub fn prepare_review(rating: f64, comment: &str) -> Result<NewReview> {
    let on_grid = (rating / RATING_STEP).fract() == 0.0;
    if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) || !on_grid {
        return Err(CafeError::Validation(
            "Rating must be between 0 and 5 in steps of 0.5".to_string(),
        ));
    }
    let comment = comment.trim();
    if comment.chars().count() > MAX_COMMENT_LEN {
        return Err(CafeError::Validation(
            "Comment is too long (max 1000 characters)".to_string(),
        ));
    }
    Ok(NewReview {
        rating,
        comment: comment.to_string(),
    })
}

pub fn add<B: Backend>(
    backend: &mut B,
    session: &SessionContext,
    cafe_id: CafeId,
    rating: f64,
    comment: &str,
) -> Result<CmdResult> {
    let current = session.require()?;
    let review = prepare_review(rating, comment)?;
    let existing = backend.fetch_reviews(cafe_id)?;
    let already_reviewed = match current.user_id {
        Some(user_id) => existing.has_reviewed(user_id),
        None => existing.reviews.iter().any(|r| r.username == current.username),
    };
    if already_reviewed {
        return Err(CafeError::Validation(
            "You have already reviewed this café".to_string(),
        ));
    }
    let receipt = backend.submit_review(cafe_id, &review)?;
    info!(cafe_id, rating, "review submitted");

    let mut result = CmdResult::default().with_message(CmdMessage::success(
        non_empty_or(receipt.message, "Review submitted successfully!"),
    ));
    if let Some(average) = receipt.new_average_rating {
        result.add_message(CmdMessage::info(format!(
            "New average rating: {:.1}",
            average
        )));
    }
    Ok(result)
}

pub fn delete<B: Backend>(
    backend: &mut B,
    session: &SessionContext,
    review_id: ReviewId,
) -> Result<CmdResult> {
    session.require()?;
    let receipt = backend.delete_review(review_id)?;
    info!(review_id, "review deleted");
    Ok(CmdResult::default().with_message(CmdMessage::success(non_empty_or(
        receipt.message,
        "Review deleted successfully",
    ))))
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::session::Session;
    use crate::test_utils::{seeded_backend, FIXTURE_PASSWORD};

    fn logged_in() -> (InMemoryBackend, SessionContext) {
        let session = SessionContext::in_memory();
        let mut backend = seeded_backend(session.clone());
        session
            .set(backend.login("amy", FIXTURE_PASSWORD).unwrap())
            .unwrap();
        (backend, session)
    }

    #[test]
    fn rating_must_sit_on_half_star_grid() {
        assert!(prepare_review(4.5, "").is_ok());
        assert!(prepare_review(0.0, "").is_ok());
        assert!(prepare_review(5.0, "").is_ok());
        assert!(prepare_review(4.3, "").is_err());
        assert!(prepare_review(5.5, "").is_err());
        assert!(prepare_review(-0.5, "").is_err());
        assert!(prepare_review(f64::NAN, "").is_err());
    }

    #[test]
    fn comment_is_trimmed_and_bounded() {
        assert_eq!(prepare_review(3.0, "  cozy  ").unwrap().comment, "cozy");
        assert!(prepare_review(3.0, &"x".repeat(1000)).is_ok());
        assert!(prepare_review(3.0, &"x".repeat(1001)).is_err());
    }

    #[test]
    fn add_requires_login() {
        let session = SessionContext::in_memory();
        let mut backend = seeded_backend(session.clone());
        assert!(matches!(
            add(&mut backend, &session, 1, 4.0, "nice"),
            Err(CafeError::NotAuthenticated)
        ));
    }

    #[test]
    fn add_reports_new_average() {
        let (mut backend, session) = logged_in();
        let result = add(&mut backend, &session, 3, 4.5, "Good espresso").unwrap();
        assert_eq!(result.messages[0].content, "Review submitted successfully!");
        assert_eq!(result.messages[1].content, "New average rating: 4.5");
    }

    #[test]
    fn invalid_review_is_not_sent() {
        let (mut backend, session) = logged_in();
        assert!(add(&mut backend, &session, 3, 4.2, "").is_err());
        assert_eq!(backend.fetch_reviews(3).unwrap().review_count, 0);
    }

    #[test]
    fn second_review_of_same_cafe_is_refused() {
        let (mut backend, session) = logged_in();
        add(&mut backend, &session, 1, 4.0, "First visit").unwrap();
        match add(&mut backend, &session, 1, 2.0, "Second visit") {
            Err(CafeError::Validation(message)) => {
                assert_eq!(message, "You have already reviewed this café")
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(backend.fetch_reviews(1).unwrap().review_count, 1);
    }

    #[test]
    fn duplicate_check_falls_back_to_username() {
        let (mut backend, session) = logged_in();
        add(&mut backend, &session, 2, 3.5, "").unwrap();
        session.set(Session::new("token-amy", "amy")).unwrap();
        assert!(matches!(
            add(&mut backend, &session, 2, 4.0, ""),
            Err(CafeError::Validation(_))
        ));
    }

    #[test]
    fn delete_own_review() {
        let (mut backend, session) = logged_in();
        add(&mut backend, &session, 1, 4.0, "").unwrap();
        let review_id = backend.fetch_reviews(1).unwrap().reviews[0].id;
        let result = delete(&mut backend, &session, review_id).unwrap();
        assert_eq!(result.messages[0].content, "Review deleted successfully");
        assert_eq!(backend.fetch_reviews(1).unwrap().review_count, 0);
    }
}
