//! Use cases.
//!
//! Each use case is a small handle over the shared [`GhibliRepository`](crate::GhibliRepository)
//! exposing one `execute` operation. Only the film list and people resolution
//! reclassify failures into [`Error::ApiFailure`](crate::Error::ApiFailure) or
//! [`Error::FavoritesEmpty`](crate::Error::FavoritesEmpty); the others pass them through.

mod container;
mod film_detail;
mod film_list;
mod filters;
mod observe;
mod people;
mod toggle;

#[cfg(test)]
pub(crate) mod fixtures;

pub use container::ServiceContainer;
pub use film_detail::GetFilmDetail;
pub use film_list::GetFilmList;
pub use filters::GetFilters;
pub use observe::{ObserveFavoriteFilms, ObserveFilters};
pub use people::GetPeople;
pub use toggle::{ToggleFavorite, ToggleFilter, ViewFilms};
