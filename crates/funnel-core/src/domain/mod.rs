//! Domain entities - the core business objects.

mod funnel;

pub use funnel::Funnel;
