//! ProbeTable: prime-sized open-addressing layer with stale-bucket
//! tombstones and a bounded-load-factor reorganisation policy.
//!
//! The table maps native addresses to chain-head handles; it knows nothing
//! about records. Buckets come in three states: *unused* (no key since the
//! last reorganisation), *occupied* (keyed, non-empty chain), and *stale*
//! (keyed, empty chain). Stale buckets keep their key so that probe
//! sequences which stepped across them while they were occupied still
//! terminate at the right bucket; they are only recycled by a
//! reorganisation, or by re-registering the same address.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::interop::Address;

/// Bucket counts for successive reorganisations. Roughly doubling primes,
/// so the double-hash probe sequence has full period; the table refuses to
/// grow past the last entry.
const PRIMES: &[u64] = &[
    521,
    1031,
    2053,
    4099,
    8209,
    16411,
    32771,
    65537,
    131_101,
    262_147,
    524_309,
    1_048_583,
    2_097_169,
    4_194_319,
    8_388_617,
    16_777_259,
    33_554_467,
    67_108_879,
    134_217_757,
    268_435_459,
    536_870_923,
    1_073_741_827,
    2_147_483_659,
];

/// The bucket array for a reorganisation could not be allocated. The table
/// is left exactly as it was; the registration that needed the space fails.
#[derive(Debug, Error)]
#[error("object map reorganisation failed: cannot allocate bucket array")]
pub struct CapacityError(#[from] TryReserveError);

#[derive(Debug)]
struct Bucket<H> {
    key: Option<Address>,
    head: Option<H>,
}

impl<H> Bucket<H> {
    const fn empty() -> Self {
        Bucket {
            key: None,
            head: None,
        }
    }
}

#[derive(Debug)]
pub struct ProbeTable<H> {
    buckets: Vec<Bucket<H>>,
    prime_idx: usize,
    /// Buckets never keyed since the last reorganisation.
    unused: usize,
    /// Keyed buckets whose chain has emptied.
    stale: usize,
}

impl<H: Copy> ProbeTable<H> {
    pub fn new() -> Self {
        let size = PRIMES[0] as usize;
        let mut buckets = Vec::with_capacity(size);
        buckets.resize_with(size, Bucket::empty);
        Self {
            buckets,
            prime_idx: 0,
            unused: size,
            stale: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    pub fn unused(&self) -> usize {
        self.unused
    }

    pub fn stale(&self) -> usize {
        self.stale
    }

    /// Index of the bucket keyed by `addr`, or of the first unused bucket on
    /// its probe path. Keyed buckets for other addresses, stale or not,
    /// are stepped over; an unused bucket is the only valid "not here".
    fn slot(&self, addr: Address) -> usize {
        let size = self.buckets.len();
        debug_assert!(self.unused > 0, "probe sequence cannot terminate");
        let h1 = addr % size;
        let h2 = size - 2 - (h1 % (size - 2));
        let mut i = h1;
        loop {
            match self.buckets[i].key {
                Some(key) if key == addr => return i,
                None => return i,
                Some(_) => i = (i + h2) % size,
            }
        }
    }

    /// Head of the chain registered at `addr`, if any.
    #[inline]
    pub fn chain_head(&self, addr: Address) -> Option<H> {
        let bucket = &self.buckets[self.slot(addr)];
        match bucket.key {
            Some(key) if key == addr => bucket.head,
            _ => None,
        }
    }

    /// Make room for a claim of `addr`, reorganising first when that claim
    /// would leave too few unused buckets (an eighth of the table). The
    /// reorganisation grows to the next prime unless dropping the stale
    /// buckets alone would free more than a quarter of the table.
    ///
    /// Runs before the claim so an allocation failure leaves the table
    /// untouched and the caller can fail its operation cleanly.
    pub fn reserve(&mut self, addr: Address) -> Result<(), CapacityError> {
        if self.buckets[self.slot(addr)].key.is_some() {
            // Re-keying an existing (possibly stale) bucket consumes no
            // unused slot, so it can never push the table over the policy.
            return Ok(());
        }
        debug_assert!(self.unused > 0);
        let unused = self.unused - 1;
        let size = self.buckets.len();
        if unused > size >> 3 {
            return Ok(());
        }
        let mut target = self.prime_idx;
        if unused + self.stale <= size >> 2 {
            if let Some(next) = self.next_prime() {
                target = next;
            }
        }
        self.rebuild(target)
    }

    /// Claim the bucket for `addr` and set its chain head. Accounting
    /// depends on the bucket's previous state: an unused bucket is consumed,
    /// a stale one is revived, an occupied one just gets a new head.
    pub fn claim(&mut self, addr: Address, head: H) {
        let i = self.slot(addr);
        let bucket = &mut self.buckets[i];
        match bucket.key {
            None => {
                bucket.key = Some(addr);
                self.unused -= 1;
            }
            Some(key) => {
                debug_assert_eq!(key, addr);
                if bucket.head.is_none() {
                    debug_assert!(self.stale > 0);
                    self.stale -= 1;
                }
            }
        }
        bucket.head = Some(head);
        debug_assert!(self.unused + self.stale <= self.buckets.len());
    }

    /// Replace the chain head at `addr`. The chain must stay non-empty; an
    /// emptied chain goes through [`clear_chain`](ProbeTable::clear_chain).
    pub fn set_head(&mut self, addr: Address, head: H) {
        let i = self.slot(addr);
        let bucket = &mut self.buckets[i];
        debug_assert_eq!(bucket.key, Some(addr));
        debug_assert!(bucket.head.is_some());
        bucket.head = Some(head);
    }

    /// Drop the chain at `addr`, leaving the bucket stale: the key stays so
    /// probe sequences crossing this bucket still find their targets.
    pub fn clear_chain(&mut self, addr: Address) {
        let i = self.slot(addr);
        let bucket = &mut self.buckets[i];
        debug_assert_eq!(bucket.key, Some(addr));
        if bucket.head.take().is_some() {
            self.stale += 1;
        }
    }

    fn next_prime(&self) -> Option<usize> {
        let next = self.prime_idx + 1;
        let prime = *PRIMES.get(next)?;
        // The tail of the sequence can exceed the address space on narrow
        // targets; treat that the same as running off the end.
        usize::try_from(prime).ok().map(|_| next)
    }

    /// Re-key every occupied bucket into a fresh array of `prime_idx`
    /// buckets. Stale buckets are dropped, which is what resets the
    /// unused count and keeps average probe length bounded.
    fn rebuild(&mut self, prime_idx: usize) -> Result<(), CapacityError> {
        let size = PRIMES[prime_idx] as usize;
        let mut fresh: Vec<Bucket<H>> = Vec::new();
        fresh.try_reserve_exact(size)?;
        fresh.resize_with(size, Bucket::empty);

        let old = std::mem::replace(&mut self.buckets, fresh);
        self.prime_idx = prime_idx;
        self.stale = 0;
        // The counts are not consulted while re-keying; `slot` only reads
        // bucket keys.
        self.unused = size;
        let mut occupied = 0;
        for bucket in old {
            if let (Some(addr), Some(head)) = (bucket.key, bucket.head) {
                let i = self.slot(addr);
                debug_assert!(self.buckets[i].key.is_none());
                self.buckets[i] = Bucket {
                    key: Some(addr),
                    head: Some(head),
                };
                occupied += 1;
            }
        }
        self.unused = size - occupied;
        Ok(())
    }
}

impl<H: Copy> Default for ProbeTable<H> {
    fn default() -> Self {
        Self::new()
    }
}
