use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::grouping::Matching;
use crate::participant::Id;
use crate::{RegroupError, Result};

/// Split `ids` into `n_chunks` contiguous chunks whose sizes differ by at
/// most one; the first `len % n_chunks` chunks take the extra member.
pub fn split_chunks(ids: &[Id], n_chunks: usize) -> Vec<Vec<Id>> {
    if n_chunks == 0 {
        return Vec::new();
    }
    let base = ids.len() / n_chunks;
    let extra = ids.len() % n_chunks;

    let mut chunks = Vec::with_capacity(n_chunks);
    let mut start = 0;
    for k in 0..n_chunks {
        let size = base + usize::from(k < extra);
        chunks.push(ids[start..start + size].to_vec());
        start += size;
    }
    chunks
}

/// One candidate: shuffle with `rng`, then cut into `len / min_size` chunks.
pub fn candidate_with_rng<R: rand::Rng + ?Sized>(ids: &[Id], min_size: usize, rng: &mut R) -> Matching {
    let mut shuffled = ids.to_vec();
    shuffled.shuffle(rng);
    Matching::new(split_chunks(&shuffled, shuffled.len() / min_size))
}

/// Draw `n_draws` random matchings. Draw `i` uses its own generator seeded
/// with `seed + i`, so results depend only on the inputs.
pub fn draw(participants: &[Id], min_size: usize, n_draws: usize, seed: u64) -> Result<Vec<Matching>> {
    if min_size == 0 {
        return Err(RegroupError::InvalidParameter("min_size must be positive".to_string()));
    }
    if participants.len() < min_size {
        return Err(RegroupError::InsufficientParticipants(format!(
            "{} participants cannot form a group of at least {}",
            participants.len(),
            min_size
        )));
    }

    debug!(
        "[candidate] drawing {} candidates over {} participants (min_size {}, seed {})",
        n_draws,
        participants.len(),
        min_size,
        seed
    );

    let candidates = (0..n_draws as u64)
        .map(|offset| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(offset));
            candidate_with_rng(participants, min_size, &mut rng)
        })
        .collect();
    Ok(candidates)
}
