use uuid::Uuid;

use linkup_shared::errors::{AppError, AppResult, ErrorCode};

/// Two distinct users ordered so that `low < high`.
///
/// A symmetric relationship is stored as one `matches` row keyed on this ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalPair {
    low: Uuid,
    high: Uuid,
}

impl CanonicalPair {
    pub fn new(a: Uuid, b: Uuid) -> AppResult<Self> {
        if a == b {
            return Err(AppError::new(ErrorCode::CannotSwipeSelf, "cannot swipe on yourself"));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    pub fn user_id_1(&self) -> Uuid {
        self.low
    }

    pub fn user_id_2(&self) -> Uuid {
        self.high
    }

    /// Key for `pg_advisory_xact_lock`, identical for (a, b) and (b, a).
    pub fn lock_key(&self) -> i64 {
        let fold = |id: Uuid| {
            let v = id.as_u128();
            (v as u64) ^ ((v >> 64) as u64)
        };
        fold(self.low).rotate_left(1) as i64 ^ fold(self.high) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_independent_of_argument_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let p1 = CanonicalPair::new(a, b).unwrap();
        let p2 = CanonicalPair::new(b, a).unwrap();
        assert_eq!(p1, p2);
        assert!(p1.user_id_1() < p1.user_id_2());
        assert_eq!(p1.lock_key(), p2.lock_key());
    }

    #[test]
    fn self_pair_is_rejected() {
        let a = Uuid::new_v4();
        let err = CanonicalPair::new(a, a).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::CannotSwipeSelf));
    }

    #[test]
    fn ordering_matches_byte_order() {
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(u128::MAX);
        let p = CanonicalPair::new(high, low).unwrap();
        assert_eq!(p.user_id_1(), low);
        assert_eq!(p.user_id_2(), high);
    }
}
