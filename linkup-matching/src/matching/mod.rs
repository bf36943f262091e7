pub mod feed;
pub mod pair;
pub mod reconcile;
pub mod seed;
pub mod tiers;
