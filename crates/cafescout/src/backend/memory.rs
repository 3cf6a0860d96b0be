use super::{Backend, UsernameChange};
use crate::error::{CafeError, Result};
use crate::model::{
    Cafe, CafeId, CafeReviews, NewReview, ProfileReview, Registration, Review, ReviewId,
    ReviewReceipt, UserId, UserProfile, UserSummary, MAX_COMMENT_LEN,
};
use crate::session::{Session, SessionContext};
use chrono::{NaiveDateTime, Utc};
use std::cell::Cell;
use std::collections::BTreeSet;

pub const TRENDING_MIN_RATING: f64 = 4.0;
pub const TRENDING_LIMIT: usize = 10;

#[derive(Debug, Clone)]
struct UserRecord {
    id: UserId,
    username: String,
    email: String,
    password: String,
    friends: BTreeSet<UserId>,
}

impl UserRecord {
    fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            review_count: None,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredReview {
    id: ReviewId,
    cafe_id: CafeId,
    user_id: UserId,
    rating: f64,
    comment: Option<String>,
    created_at: NaiveDateTime,
}

/// In-process café service for tests.
///
/// Applies the same rules as the REST service: one review per user and café,
/// trending is rating ≥ 4.0 sorted descending, user search excludes the
/// caller. A café's rating is the average of its reviews once it has any,
/// otherwise the seeded value.
///
/// Uses `Cell` for the outage flag so it can be flipped through `&self`.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    session: SessionContext,
    cafes: Vec<Cafe>,
    users: Vec<UserRecord>,
    reviews: Vec<StoredReview>,
    next_user_id: UserId,
    next_review_id: ReviewId,
    simulate_outage: Cell<bool>,
    failing_reviews: BTreeSet<CafeId>,
}

impl InMemoryBackend {
    pub fn new(session: SessionContext) -> Self {
        Self {
            session,
            next_user_id: 1,
            next_review_id: 1,
            ..Default::default()
        }
    }

    pub fn with_cafes(mut self, cafes: Vec<Cafe>) -> Self {
        self.cafes = cafes;
        self
    }

    /// Adds an account directly, bypassing registration. Returns its id.
    pub fn add_user(&mut self, username: &str, email: &str, password: &str) -> UserId {
        let id = self.next_user_id;
        self.next_user_id += 1;
        self.users.push(UserRecord {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            friends: BTreeSet::new(),
        });
        id
    }

    pub fn user_id(&self, username: &str) -> Option<UserId> {
        self.users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.id)
    }

    /// Review fetches for `cafe_id` fail with a 500; everything else works.
    pub fn fail_reviews_for(mut self, cafe_id: CafeId) -> Self {
        self.failing_reviews.insert(cafe_id);
        self
    }

    /// Every call fails with a 503 while set.
    pub fn set_simulate_outage(&self, simulate: bool) {
        self.simulate_outage.set(simulate);
    }

    fn check_online(&self) -> Result<()> {
        if self.simulate_outage.get() {
            return Err(rejected(503, "Service unavailable"));
        }
        Ok(())
    }

    fn caller(&self) -> Result<&UserRecord> {
        let session = self.session.require()?;
        self.users
            .iter()
            .find(|u| u.username == session.username)
            .ok_or_else(|| rejected(401, "Current user not found. Please log in again."))
    }

    fn user(&self, id: UserId) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == id)
    }

    fn find_cafe(&self, id: CafeId) -> Option<&Cafe> {
        self.cafes.iter().find(|c| c.cafe_id == id)
    }

    fn average_for(&self, cafe_id: CafeId) -> Option<f64> {
        let ratings: Vec<f64> = self
            .reviews
            .iter()
            .filter(|r| r.cafe_id == cafe_id)
            .map(|r| r.rating)
            .collect();
        if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        }
    }

    /// The café as the service reports it, with its current rating.
    fn rated(&self, cafe: &Cafe) -> Cafe {
        let mut cafe = cafe.clone();
        if let Some(average) = self.average_for(cafe.cafe_id) {
            cafe.overall_rating = Some(average);
        }
        cafe
    }

    fn to_review(&self, stored: &StoredReview) -> Review {
        Review {
            id: stored.id,
            rating: stored.rating,
            comment: stored.comment.clone(),
            created_at: Some(stored.created_at),
            username: self
                .user(stored.user_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            user_id: stored.user_id,
        }
    }
}

impl Backend for InMemoryBackend {
    fn login(&mut self, username: &str, password: &str) -> Result<Session> {
        self.check_online()?;
        let user = self
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .ok_or_else(|| rejected(400, "Invalid username or password!"))?;
        Ok(Session::new(format!("token-{}", user.username), &user.username).with_user_id(user.id))
    }

    fn register(&mut self, form: &Registration) -> Result<String> {
        self.check_online()?;
        let username = form.username.trim();
        let email = form.email.trim();
        let mut problems = Vec::new();
        if self.users.iter().any(|u| u.username == username) {
            problems.push("Username is already taken!");
        }
        if self.users.iter().any(|u| u.email == email) {
            problems.push("Email is already in use!");
        }
        if !problems.is_empty() {
            return Err(rejected(400, &problems.join(" ")));
        }
        self.add_user(username, email, &form.password);
        Ok("User registered successfully!".to_string())
    }

    fn fetch_cafes(&self) -> Result<Vec<Cafe>> {
        self.check_online()?;
        Ok(self.cafes.iter().map(|c| self.rated(c)).collect())
    }

    fn fetch_trending(&self) -> Result<Vec<Cafe>> {
        self.check_online()?;
        let mut trending: Vec<Cafe> = self
            .cafes
            .iter()
            .map(|c| self.rated(c))
            .filter(|c| c.overall_rating.unwrap_or(0.0) >= TRENDING_MIN_RATING)
            .collect();
        trending.sort_by(|a, b| {
            b.overall_rating
                .unwrap_or(0.0)
                .total_cmp(&a.overall_rating.unwrap_or(0.0))
        });
        trending.truncate(TRENDING_LIMIT);
        Ok(trending)
    }

    fn fetch_cafe(&self, id: CafeId) -> Result<Cafe> {
        self.check_online()?;
        self.find_cafe(id)
            .map(|c| self.rated(c))
            .ok_or_else(|| CafeError::NotFound(format!("café {}", id)))
    }

    fn fetch_reviews(&self, cafe_id: CafeId) -> Result<CafeReviews> {
        self.check_online()?;
        if self.failing_reviews.contains(&cafe_id) {
            return Err(rejected(500, "Could not load reviews"));
        }
        if self.find_cafe(cafe_id).is_none() {
            return Err(rejected(400, "Cafe not found"));
        }
        let reviews: Vec<Review> = self
            .reviews
            .iter()
            .filter(|r| r.cafe_id == cafe_id)
            .map(|r| self.to_review(r))
            .collect();
        Ok(CafeReviews {
            average_rating: self.average_for(cafe_id).unwrap_or(0.0),
            review_count: reviews.len() as u64,
            reviews,
        })
    }

    fn submit_review(&mut self, cafe_id: CafeId, review: &NewReview) -> Result<ReviewReceipt> {
        self.check_online()?;
        let user_id = self.caller()?.id;
        if self.find_cafe(cafe_id).is_none() {
            return Err(rejected(400, "Cafe not found"));
        }
        if !(0.0..=5.0).contains(&review.rating) {
            return Err(rejected(400, "Rating must be between 0 and 5"));
        }
        if review.comment.chars().count() > MAX_COMMENT_LEN {
            return Err(rejected(400, "Comment is too long (max 1000 characters)"));
        }
        if self
            .reviews
            .iter()
            .any(|r| r.cafe_id == cafe_id && r.user_id == user_id)
        {
            return Err(rejected(
                400,
                "You have already reviewed this cafe. You can only review once.",
            ));
        }

        let stored = StoredReview {
            id: self.next_review_id,
            cafe_id,
            user_id,
            rating: review.rating,
            comment: (!review.comment.is_empty()).then(|| review.comment.clone()),
            created_at: Utc::now().naive_utc(),
        };
        self.next_review_id += 1;
        let created = self.to_review(&stored);
        self.reviews.push(stored);

        Ok(ReviewReceipt {
            message: "Review submitted successfully!".to_string(),
            review: Some(created),
            new_average_rating: self.average_for(cafe_id),
        })
    }

    fn delete_review(&mut self, review_id: ReviewId) -> Result<ReviewReceipt> {
        self.check_online()?;
        let user_id = self.caller()?.id;
        let position = self
            .reviews
            .iter()
            .position(|r| r.id == review_id)
            .ok_or_else(|| rejected(400, "Review not found"))?;
        if self.reviews[position].user_id != user_id {
            return Err(rejected(403, "You can only delete your own reviews"));
        }
        let removed = self.reviews.remove(position);
        Ok(ReviewReceipt {
            message: "Review deleted successfully".to_string(),
            review: None,
            new_average_rating: self.average_for(removed.cafe_id),
        })
    }

    fn search_users(&self, query: &str) -> Result<Vec<UserSummary>> {
        self.check_online()?;
        let caller = self.caller()?;
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Err(rejected(400, "Search query cannot be empty"));
        }
        Ok(self
            .users
            .iter()
            .filter(|u| u.id != caller.id && u.username.to_lowercase().starts_with(&query))
            .map(UserRecord::summary)
            .collect())
    }

    fn friends(&self) -> Result<Vec<UserSummary>> {
        self.check_online()?;
        let caller = self.caller()?;
        Ok(caller
            .friends
            .iter()
            .filter_map(|id| self.user(*id))
            .map(|friend| {
                let count = self.reviews.iter().filter(|r| r.user_id == friend.id).count();
                UserSummary {
                    review_count: Some(count as u64),
                    ..friend.summary()
                }
            })
            .collect())
    }

    fn add_friend(&mut self, friend_id: UserId) -> Result<String> {
        self.check_online()?;
        let caller_id = self.caller()?.id;
        if caller_id == friend_id {
            return Err(rejected(400, "You cannot add yourself as a friend"));
        }
        let friend_name = self
            .user(friend_id)
            .map(|u| u.username.clone())
            .ok_or_else(|| rejected(400, &format!("User not found with ID: {}", friend_id)))?;
        let caller = self
            .users
            .iter_mut()
            .find(|u| u.id == caller_id)
            .ok_or(CafeError::NotAuthenticated)?;
        if !caller.friends.insert(friend_id) {
            return Err(rejected(
                400,
                &format!("You are already friends with {}", friend_name),
            ));
        }
        Ok(format!("Successfully added {} as a friend!", friend_name))
    }

    fn remove_friend(&mut self, friend_id: UserId) -> Result<String> {
        self.check_online()?;
        let caller_id = self.caller()?.id;
        let friend_name = self
            .user(friend_id)
            .map(|u| u.username.clone())
            .ok_or_else(|| rejected(400, "User not found"))?;
        let caller = self
            .users
            .iter_mut()
            .find(|u| u.id == caller_id)
            .ok_or(CafeError::NotAuthenticated)?;
        if !caller.friends.remove(&friend_id) {
            return Err(rejected(400, "This user is not in your friends list"));
        }
        Ok(format!("Successfully removed {} from friends", friend_name))
    }

    fn update_username(&mut self, new_username: &str) -> Result<UsernameChange> {
        self.check_online()?;
        let caller_id = self.caller()?.id;
        let new_username = new_username.trim();
        let token = format!("token-{}", new_username);
        if self
            .users
            .iter()
            .any(|u| u.username == new_username && u.id != caller_id)
        {
            return Err(rejected(
                400,
                &format!("Username '{}' is already taken", new_username),
            ));
        }
        let caller = self
            .users
            .iter_mut()
            .find(|u| u.id == caller_id)
            .ok_or(CafeError::NotAuthenticated)?;
        if caller.username == new_username {
            return Ok(UsernameChange {
                message: "No changes made".to_string(),
                new_username: new_username.to_string(),
                token,
            });
        }
        caller.username = new_username.to_string();
        Ok(UsernameChange {
            message: format!("Username successfully updated to '{}'", new_username),
            new_username: new_username.to_string(),
            token,
        })
    }

    fn current_user(&self) -> Result<UserSummary> {
        self.check_online()?;
        Ok(self.caller()?.summary())
    }

    fn user_profile(&self, user_id: UserId) -> Result<UserProfile> {
        self.check_online()?;
        self.caller()?;
        let user = self
            .user(user_id)
            .ok_or_else(|| rejected(400, "User not found"))?;
        let reviews = self
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| {
                let cafe = self.find_cafe(r.cafe_id)?;
                Some(ProfileReview {
                    id: r.id,
                    rating: r.rating,
                    comment: r.comment.clone(),
                    created_at: Some(r.created_at),
                    cafe_id: cafe.cafe_id,
                    cafe_name: cafe.name.clone(),
                    cafe_address: cafe.address.clone(),
                })
            })
            .collect();
        Ok(UserProfile {
            user: user.summary(),
            reviews,
        })
    }
}

fn rejected(status: u16, message: &str) -> CafeError {
    CafeError::Backend {
        status,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_cafes, seeded_backend};

    fn logged_in(username: &str) -> InMemoryBackend {
        let session = SessionContext::in_memory();
        let mut backend = seeded_backend(session.clone());
        let s = backend.login(username, "Latte#42").unwrap();
        session.set(s).unwrap();
        backend
    }

    #[test]
    fn login_checks_password() {
        let mut backend = seeded_backend(SessionContext::in_memory());
        let session = backend.login("amy", "Latte#42").unwrap();
        assert_eq!(session.username, "amy");
        assert!(session.user_id.is_some());
        assert!(matches!(
            backend.login("amy", "wrong"),
            Err(CafeError::Backend { status: 400, .. })
        ));
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut backend = seeded_backend(SessionContext::in_memory());
        let form = Registration {
            username: "amy".into(),
            email: "amy@example.com".into(),
            password: "Latte#42".into(),
            confirm_password: "Latte#42".into(),
        };
        match backend.register(&form) {
            Err(CafeError::Backend { message, .. }) => {
                assert_eq!(message, "Username is already taken! Email is already in use!")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn trending_is_rated_four_and_up_descending() {
        let backend = seeded_backend(SessionContext::in_memory());
        let trending = backend.fetch_trending().unwrap();
        let ratings: Vec<f64> = trending.iter().filter_map(|c| c.overall_rating).collect();
        assert!(ratings.iter().all(|r| *r >= TRENDING_MIN_RATING));
        assert!(ratings.windows(2).all(|w| w[0] >= w[1]));
        assert!(trending.len() <= TRENDING_LIMIT);
    }

    #[test]
    fn reviews_update_average_and_allow_one_per_user() {
        let mut backend = logged_in("amy");
        let review = NewReview {
            rating: 3.0,
            comment: "Decent".into(),
        };
        let receipt = backend.submit_review(1, &review).unwrap();
        assert_eq!(receipt.new_average_rating, Some(3.0));
        assert_eq!(backend.fetch_cafe(1).unwrap().overall_rating, Some(3.0));

        assert!(matches!(
            backend.submit_review(1, &review),
            Err(CafeError::Backend { status: 400, .. })
        ));
    }

    #[test]
    fn only_author_can_delete() {
        let session = SessionContext::in_memory();
        let mut backend = seeded_backend(session.clone());
        session.set(backend.login("amy", "Latte#42").unwrap()).unwrap();
        let review_id = backend
            .submit_review(
                2,
                &NewReview {
                    rating: 4.5,
                    comment: String::new(),
                },
            )
            .unwrap()
            .review
            .unwrap()
            .id;

        session.set(backend.login("ben", "Latte#42").unwrap()).unwrap();
        assert!(matches!(
            backend.delete_review(review_id),
            Err(CafeError::Backend { status: 403, .. })
        ));
    }

    #[test]
    fn review_requires_session() {
        let mut backend = seeded_backend(SessionContext::in_memory());
        let review = NewReview {
            rating: 4.0,
            comment: String::new(),
        };
        assert!(matches!(
            backend.submit_review(1, &review),
            Err(CafeError::NotAuthenticated)
        ));
    }

    #[test]
    fn search_is_prefix_and_excludes_caller() {
        let backend = logged_in("amy");
        let names: Vec<String> = backend
            .search_users("B")
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["ben", "bella"]);
        assert!(backend.search_users("amy").unwrap().is_empty());
    }

    #[test]
    fn friend_lifecycle() {
        let mut backend = logged_in("amy");
        let ben = backend.user_id("ben").unwrap();
        let amy = backend.user_id("amy").unwrap();

        assert!(backend.add_friend(amy).is_err());
        assert_eq!(
            backend.add_friend(ben).unwrap(),
            "Successfully added ben as a friend!"
        );
        assert!(backend.add_friend(ben).is_err());

        let friends = backend.friends().unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].review_count, Some(0));

        backend.remove_friend(ben).unwrap();
        assert!(backend.friends().unwrap().is_empty());
        assert!(backend.remove_friend(ben).is_err());
    }

    #[test]
    fn outage_fails_every_call() {
        let backend = InMemoryBackend::new(SessionContext::in_memory()).with_cafes(sample_cafes());
        backend.set_simulate_outage(true);
        assert!(matches!(
            backend.fetch_cafes(),
            Err(CafeError::Backend { status: 503, .. })
        ));
        backend.set_simulate_outage(false);
        assert_eq!(backend.fetch_cafes().unwrap().len(), sample_cafes().len());
    }

    #[test]
    fn username_change_issues_new_token() {
        let mut backend = logged_in("amy");
        assert!(backend.update_username("ben").is_err());
        let change = backend.update_username("amy_b").unwrap();
        assert_eq!(change.new_username, "amy_b");
        assert_eq!(change.token, "token-amy_b");
        assert!(backend.user_id("amy_b").is_some());
    }

    #[test]
    fn profile_lists_reviews_with_cafe() {
        let mut backend = logged_in("amy");
        backend
            .submit_review(
                1,
                &NewReview {
                    rating: 5.0,
                    comment: "Great".into(),
                },
            )
            .unwrap();
        let amy = backend.user_id("amy").unwrap();
        let profile = backend.user_profile(amy).unwrap();
        assert_eq!(profile.user.username, "amy");
        assert_eq!(profile.reviews.len(), 1);
        assert_eq!(profile.reviews[0].cafe_name, "Bluebird Cafe");
    }
}
