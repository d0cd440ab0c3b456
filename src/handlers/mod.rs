// Two security tiers: public (no auth) and protected (JWT auth + permission
// checks on /api/*).
pub mod protected;
pub mod public;
