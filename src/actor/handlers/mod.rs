//! Actor actions, grouped by concern.

mod membership;
mod messaging;
mod profile;
mod queries;
