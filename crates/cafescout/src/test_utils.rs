//! Fixtures for the library's unit tests: sample cafés and a seeded
//! [`InMemoryBackend`]. Also exported behind the `test_utils` feature.

use crate::backend::InMemoryBackend;
use crate::model::{Cafe, CafeId};
use crate::session::SessionContext;

/// Password shared by every seeded account.
pub const FIXTURE_PASSWORD: &str = "Latte#42";

pub fn cafe(id: CafeId, name: &str, price: u8, rating: Option<f64>, tags: &str) -> Cafe {
    let mut cafe = Cafe::new(id, name);
    cafe.address = format!("{} Main St", id * 10);
    cafe.price = price;
    cafe.overall_rating = rating;
    cafe.tags = (!tags.is_empty()).then(|| tags.to_string());
    cafe
}

pub fn sample_cafes() -> Vec<Cafe> {
    vec![
        cafe(1, "Bluebird Cafe", 2, Some(4.5), "wifi,bathrooms,metro-friendly"),
        cafe(2, "Java House", 1, Some(4.0), "wifi,outlets"),
        cafe(3, "Downtown Coffee", 3, Some(3.8), "wifi,bathrooms,outlets,metro-friendly"),
        cafe(4, "Night Owl Roasters", 2, None, ""),
        cafe(5, "Java Junction", 2, Some(4.8), "outlets,bathrooms"),
    ]
}

/// Backend seeded with [`sample_cafes`] and the accounts `amy`, `ben` and
/// `bella`, all using [`FIXTURE_PASSWORD`].
pub fn seeded_backend(session: SessionContext) -> InMemoryBackend {
    let mut backend = InMemoryBackend::new(session).with_cafes(sample_cafes());
    for name in ["amy", "ben", "bella"] {
        backend.add_user(name, &format!("{}@example.com", name), FIXTURE_PASSWORD);
    }
    backend
}
