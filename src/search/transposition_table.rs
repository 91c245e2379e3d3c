//! Fixed-size transposition table keyed by position key.
//!
//! Direct-mapped with always-replace: each slot holds the low 32 bits of the
//! key that wrote it and a one-byte score bound. The slot index is the key
//! modulo a prime larger than `2^(KEY_BITS - 32)`, so the index and the stored
//! fragment together pin down any key of `KEY_BITS` bits (Chinese remainder
//! theorem). A fragment mismatch is therefore always a real miss, never a
//! foreign entry.

use std::num::NonZeroU8;

use crate::game_state::board_rules::{COLUMN_STRIDE, MAX_SCORE, MIN_SCORE, WIDTH};

/// Significant bits of a position key.
pub const KEY_BITS: u32 = (WIDTH * COLUMN_STRIDE) as u32;

/// Smallest table that keeps `slot index + 32-bit fragment` collision free.
pub const MIN_TABLE_LOG_SIZE: u32 = KEY_BITS - u32::BITS;
pub const MAX_TABLE_LOG_SIZE: u32 = 30;

/// One-sided bound on a position score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The score is at least this value (the node failed high).
    Lower(i32),
    /// The score is at most this value (every move was explored).
    Upper(i32),
}

impl Bound {
    // Upper bounds use 1..=SPAN, lower bounds SPAN+1..=2*SPAN; 0 marks an empty slot.
    const SPAN: i32 = MAX_SCORE - MIN_SCORE + 1;

    /// Pack into the table's one-byte value field.
    ///
    /// Scores outside `[MIN_SCORE, MAX_SCORE]` are clamped; since every real
    /// score lies in that range the clamped bound stays valid.
    #[inline]
    pub fn encode(self) -> NonZeroU8 {
        let offset = match self {
            Bound::Upper(score) => score.clamp(MIN_SCORE, MAX_SCORE) - MIN_SCORE,
            Bound::Lower(score) => score.clamp(MIN_SCORE, MAX_SCORE) - MIN_SCORE + Self::SPAN,
        };
        NonZeroU8::MIN.saturating_add(offset as u8)
    }

    #[inline]
    pub fn decode(value: u8) -> Option<Self> {
        let value = i32::from(value);
        if value == 0 || value > 2 * Self::SPAN {
            None
        } else if value > Self::SPAN {
            Some(Bound::Lower(value - Self::SPAN + MIN_SCORE - 1))
        } else {
            Some(Bound::Upper(value + MIN_SCORE - 1))
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TTStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
}

#[derive(Debug, Clone)]
pub struct TranspositionTable {
    keys: Vec<u32>,
    values: Vec<u8>,
    stats: TTStats,
}

impl TranspositionTable {
    /// Allocate `next_prime(2^log_size)` slots.
    ///
    /// `log_size` is clamped to `[MIN_TABLE_LOG_SIZE, MAX_TABLE_LOG_SIZE]`.
    pub fn new(log_size: u32) -> Self {
        let log_size = log_size.clamp(MIN_TABLE_LOG_SIZE, MAX_TABLE_LOG_SIZE);
        let count = next_prime(1u64 << log_size) as usize;
        Self {
            keys: vec![0; count],
            values: vec![0; count],
            stats: TTStats::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn stats(&self) -> TTStats {
        self.stats
    }

    /// Forget every entry and the counters.
    pub fn reset(&mut self) {
        self.keys.fill(0);
        self.values.fill(0);
        self.stats = TTStats::default();
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key % self.keys.len() as u64) as usize
    }

    /// Store `value` for `key`, overwriting whatever held the slot.
    ///
    /// 0 marks an empty slot, so only non-zero values can be stored.
    #[inline]
    pub fn put(&mut self, key: u64, value: NonZeroU8) {
        debug_assert!(key >> KEY_BITS == 0, "key wider than {KEY_BITS} bits");
        self.stats.stores += 1;
        let idx = self.index(key);
        self.keys[idx] = key as u32;
        self.values[idx] = value.get();
    }

    /// Value stored for `key`, or `None` on a miss.
    #[inline]
    pub fn get(&mut self, key: u64) -> Option<NonZeroU8> {
        self.stats.probes += 1;
        let idx = self.index(key);
        let value = NonZeroU8::new(self.values[idx]).filter(|_| self.keys[idx] == key as u32);
        if value.is_some() {
            self.stats.hits += 1;
        }
        value
    }

    #[inline]
    pub fn store_bound(&mut self, key: u64, bound: Bound) {
        self.put(key, bound.encode());
    }

    #[inline]
    pub fn probe_bound(&mut self, key: u64) -> Option<Bound> {
        self.get(key).and_then(|value| Bound::decode(value.get()))
    }
}

/// Smallest prime `>= n`.
pub fn next_prime(n: u64) -> u64 {
    let mut candidate = n.max(2);
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut divisor = 2;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU8;

    use super::{next_prime, Bound, TranspositionTable, MIN_TABLE_LOG_SIZE};
    use crate::game_state::board_rules::{MAX_SCORE, MIN_SCORE};

    fn value(v: u8) -> NonZeroU8 {
        NonZeroU8::new(v).expect("test values are non-zero")
    }

    #[test]
    fn finds_next_prime() {
        assert_eq!(next_prime(0), 2);
        assert_eq!(next_prime(8), 11);
        assert_eq!(next_prime(13), 13);
        assert_eq!(next_prime(1 << 23), 8_388_617);
    }

    #[test]
    fn size_is_clamped_and_prime() {
        let tt = TranspositionTable::new(4);
        assert_eq!(tt.len() as u64, next_prime(1 << MIN_TABLE_LOG_SIZE));
        assert!(tt.len() > 1 << MIN_TABLE_LOG_SIZE);
    }

    #[test]
    fn miss_before_put_then_round_trip() {
        let mut tt = TranspositionTable::new(MIN_TABLE_LOG_SIZE);
        let key = 0x0001_2345_6789_ABCD;
        assert_eq!(tt.get(key), None);
        tt.put(key, value(42));
        assert_eq!(tt.get(key), Some(value(42)));
        tt.put(key, value(7));
        assert_eq!(tt.get(key), Some(value(7)));
        let stats = tt.stats();
        assert_eq!(stats.probes, 3);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.stores, 2);
    }

    #[test]
    fn colliding_key_overwrites_without_leaking() {
        let mut tt = TranspositionTable::new(MIN_TABLE_LOG_SIZE);
        let size = tt.len() as u64;
        let first = 12_345;
        let second = first + size;
        let third = first + 7 * size;

        tt.put(first, value(11));
        tt.put(second, value(22));
        assert_eq!(tt.get(first), None);
        assert_eq!(tt.get(second), Some(value(22)));
        assert_eq!(tt.get(third), None);
    }

    #[test]
    fn reset_clears_entries_and_stats() {
        let mut tt = TranspositionTable::new(MIN_TABLE_LOG_SIZE);
        tt.put(99, value(5));
        tt.reset();
        assert_eq!(tt.stats().stores, 0);
        assert_eq!(tt.get(99), None);
    }

    #[test]
    fn bounds_survive_encoding() {
        for score in MIN_SCORE..=MAX_SCORE {
            for bound in [Bound::Lower(score), Bound::Upper(score)] {
                let encoded = bound.encode();
                assert!(i32::from(encoded.get()) <= 2 * (MAX_SCORE - MIN_SCORE + 1));
                assert_eq!(Bound::decode(encoded.get()), Some(bound));
            }
        }
        assert_eq!(Bound::decode(0), None);
        assert_eq!(Bound::Upper(MIN_SCORE).encode().get(), 1);
        assert_eq!(Bound::Upper(MIN_SCORE - 3).encode(), Bound::Upper(MIN_SCORE).encode());
        assert_eq!(Bound::Lower(MAX_SCORE + 2).encode(), Bound::Lower(MAX_SCORE).encode());
    }

    #[test]
    fn typed_bounds_round_trip_through_table() {
        let mut tt = TranspositionTable::new(MIN_TABLE_LOG_SIZE);
        tt.store_bound(1234, Bound::Lower(-3));
        tt.store_bound(5678, Bound::Upper(9));
        assert_eq!(tt.probe_bound(1234), Some(Bound::Lower(-3)));
        assert_eq!(tt.probe_bound(5678), Some(Bound::Upper(9)));
        assert_eq!(tt.probe_bound(91011), None);
    }
}
