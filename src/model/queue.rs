//! Positional track queue used for next/previous/random resolution
//!
//! Every lookup here is by slot index. A caller that only has a `Track`
//! value can find its slot with [`Queue::position_of`], which returns the
//! first structural match.

use rand::Rng;

use super::types::Track;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Queue {
    tracks: Vec<Track>,
}

impl Queue {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, position: usize) -> Option<&Track> {
        self.tracks.get(position)
    }

    pub fn position_of(&self, track: &Track) -> Option<usize> {
        self.tracks.iter().position(|t| t == track)
    }

    /// Slot right after `position`, if there is one.
    pub fn next_after(&self, position: Option<usize>) -> Option<(usize, Track)> {
        let next = position? + 1;
        self.tracks.get(next).map(|t| (next, t.clone()))
    }

    /// Slot right before `position`, if there is one.
    pub fn previous_before(&self, position: Option<usize>) -> Option<(usize, Track)> {
        let prev = position?.checked_sub(1)?;
        self.tracks.get(prev).map(|t| (prev, t.clone()))
    }

    /// Uniformly random slot other than `exclude`.
    ///
    /// A single-track queue yields its only track even when it is the
    /// excluded one. An `exclude` outside the queue excludes nothing.
    pub fn random_excluding<R: Rng + ?Sized>(
        &self,
        exclude: Option<usize>,
        rng: &mut R,
    ) -> Option<(usize, Track)> {
        match self.tracks.len() {
            0 => None,
            1 => Some((0, self.tracks[0].clone())),
            len => {
                let index = match exclude.filter(|&e| e < len) {
                    Some(excluded) => {
                        let pick = rng.gen_range(0..len - 1);
                        if pick >= excluded { pick + 1 } else { pick }
                    }
                    None => rng.gen_range(0..len),
                };
                Some((index, self.tracks[index].clone()))
            }
        }
    }
}
