// Handlers are grouped by security tier:
// public (no token) and protected (bearer token resolved into a `Caller`).
pub mod public;
pub mod protected;
