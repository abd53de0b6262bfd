//! Dynamic SQL composition.
//!
//! Queries are plain SQL templates with `%(name)s` placeholders. Optional filters are
//! assembled with [`Criteria`], parameters collected in a [`ParameterSet`], and the
//! template is rewritten to the driver's positional form by [`to_positional`] right
//! before execution.
//!
//! # Examples
//!
//! ```
//! use courtside::query::{where_clause, Criteria};
//!
//! let (fragments, mut params) = Criteria::new()
//!     .add("name", None::<String>, "stadium.name LIKE %(name)s")
//!     .add("city_id", Some(5), "district.city_id = %(city_id)s")
//!     .compose();
//! params.insert("limit", 10);
//!
//! let sql = format!(
//!     "SELECT stadium.id FROM stadium {} LIMIT %(limit)s",
//!     where_clause(&fragments)
//! );
//! assert_eq!(
//!     sql,
//!     "SELECT stadium.id FROM stadium WHERE district.city_id = %(city_id)s LIMIT %(limit)s"
//! );
//! ```

pub mod criteria;
pub mod params;
pub mod placeholder;

#[doc(inline)]
pub use criteria::{and_where, where_clause, Criteria};
#[doc(inline)]
pub use params::ParameterSet;
#[doc(inline)]
pub use placeholder::{to_positional, PositionalQuery};
