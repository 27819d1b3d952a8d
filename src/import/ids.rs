use std::collections::HashSet;

use anyhow::{bail, Result};
use uuid::Uuid;

pub const SHORT_ID_LEN: usize = 8;
const MAX_ATTEMPTS: usize = 16;

type Generator = Box<dyn FnMut() -> String + Send>;

/// Hands out short random ids that collide with neither existing rows nor
/// ids already handed out in this run.
pub struct IdAllocator {
    taken: HashSet<String>,
    generate: Generator,
}

impl IdAllocator {
    pub fn new(existing: HashSet<String>) -> Self {
        Self::with_generator(existing, Box::new(short_uuid))
    }

    pub fn with_generator(existing: HashSet<String>, generate: Generator) -> Self {
        Self {
            taken: existing,
            generate,
        }
    }

    pub fn next_id(&mut self) -> Result<String> {
        for _ in 0..MAX_ATTEMPTS {
            let candidate = (self.generate)();
            if self.taken.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }
        bail!("could not draw an unused id after {MAX_ATTEMPTS} attempts")
    }
}

/// First 8 hex characters of a random v4 UUID.
pub fn short_uuid() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHORT_ID_LEN);
    id
}
